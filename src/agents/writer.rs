//! Writer: assembles research into a report, folding in reviewer feedback
//! when the input carries it.

use async_trait::async_trait;

use super::{Agent, FEEDBACK_MARKER, REVISION_MARKER};
use crate::task::AgentResult;

pub const DRAFT_CREATED: &str = "DRAFT_CREATED";
pub const DRAFT_REVISED: &str = "DRAFT_REVISED";

const INTRODUCTION: &str = "# Analysis Report\n\n\
    This report is based on the multi-agent research pipeline and is tailored to the user's original request.";

const CONCLUSION: &str = "## Conclusion\n\n\
    The analysis above summarizes the main findings and trade-offs. It is intended as a concise, decision-ready \
    artifact that can be adapted into documentation, presentations, or implementation plans.";

#[derive(Debug, Default)]
pub struct WriterAgent;

impl WriterAgent {
    pub fn new() -> Self {
        Self
    }

    /// Split input into (research, feedback). Feedback is `None` without the marker.
    fn split_input(input: &str) -> (&str, Option<&str>) {
        match input.split_once(FEEDBACK_MARKER) {
            Some((research, feedback)) => {
                let feedback = feedback.trim();
                let feedback = feedback
                    .strip_suffix(REVISION_MARKER)
                    .unwrap_or(feedback)
                    .trim();
                (research, Some(feedback))
            }
            None => (input, None),
        }
    }
}

#[async_trait]
impl Agent for WriterAgent {
    fn name(&self) -> &str {
        "Writer"
    }

    async fn run(&self, input: &str) -> anyhow::Result<AgentResult> {
        let (research, feedback) = Self::split_input(input);

        let mut parts = vec![
            INTRODUCTION.to_string(),
            format!(
                "## Key Research Insights\n\n\
                 The researcher produced the following structured findings, which are woven directly into this draft:\n\n\
                 {}",
                research.trim()
            ),
        ];

        if let Some(feedback) = feedback.filter(|f| !f.is_empty()) {
            parts.push(format!(
                "## Incorporated Reviewer Feedback\n\n\
                 The reviewer requested specific revisions. The following feedback has been explicitly addressed:\n\n\
                 > {feedback}\n\n\
                 The report has been tightened, clarified, and reorganized so that these concerns are clearly resolved."
            ));
        }
        parts.push(CONCLUSION.to_string());

        let status = if feedback.is_some() {
            DRAFT_REVISED
        } else {
            DRAFT_CREATED
        };

        Ok(AgentResult::new(
            self.name(),
            status,
            input,
            parts.join("\n\n"),
        ))
    }
}
