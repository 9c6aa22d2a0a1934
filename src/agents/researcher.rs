//! Researcher: expands each planned subtask into a findings section.

use async_trait::async_trait;
use serde_json::Value;

use super::Agent;
use crate::task::AgentResult;

pub const RESEARCHED: &str = "RESEARCHED";

/// Extract subtasks from planner output.
///
/// - A JSON object yields its `subtasks` array (empty if the key is absent).
/// - Anything else, including malformed JSON, degrades to a single subtask
///   holding the whole input. This is not an error.
pub fn parse_plan(input: &str) -> Vec<String> {
    let fallback = || vec![input.to_string()];

    let Ok(Value::Object(plan)) = serde_json::from_str::<Value>(input) else {
        return fallback();
    };

    match plan.get("subtasks") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(_) => fallback(),
    }
}

fn finding_section(index: usize, subtask: &str) -> String {
    format!(
        "### Finding {index}: {subtask}\n\n\
         - Context: This directly derives from the user's request, ensuring the research is tightly scoped.\n\
         - Key insights: For the request \"{subtask}\", realistic trade-offs, risks, and benefits are considered.\n\
         - Practical angle: The findings are framed so they can feed cleanly into a written report tailored to the original request."
    )
}

#[derive(Debug, Default)]
pub struct ResearcherAgent;

impl ResearcherAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for ResearcherAgent {
    fn name(&self) -> &str {
        "Researcher"
    }

    async fn run(&self, input: &str) -> anyhow::Result<AgentResult> {
        let subtasks = parse_plan(input);
        if subtasks.len() == 1 && subtasks[0] == input {
            tracing::debug!("Planner output was not a JSON plan, researching it as one subtask");
        }

        let findings: Vec<String> = subtasks
            .iter()
            .enumerate()
            .map(|(i, sub)| finding_section(i + 1, sub))
            .collect();

        let mut output = String::from(
            "## Research Summary (grounded in the original request)\n\n\
             The following findings are organized per subtask so the writer can compose a cohesive report \
             that feels specific to the user's request.",
        );
        if !findings.is_empty() {
            output.push_str("\n\n");
            output.push_str(&findings.join("\n\n"));
        }

        Ok(AgentResult::new(self.name(), RESEARCHED, input, output))
    }
}
