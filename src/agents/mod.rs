//! Pipeline agents.
//!
//! Each agent is a text-in, result-out unit with a fixed name. Agents never see
//! the `Task`; the orchestrator feeds them text and records what they return.
//!
//! Agents coordinate through two plain-text markers embedded in their input:
//! - [`FEEDBACK_MARKER`] separates a draft from reviewer feedback; the writer
//!   switches to revision mode when it is present.
//! - [`REVISION_MARKER`] tags a revised draft; the reviewer always approves
//!   input carrying it.
//!
//! Detection is plain substring presence. A structured revision context would
//! be sturdier, but any text that happens to contain a marker is currently
//! interpreted as one.

mod planner;
mod researcher;
mod review_policy;
mod reviewer;
mod writer;

pub use planner::PlannerAgent;
pub use researcher::{parse_plan, ResearcherAgent};
pub use review_policy::{
    FixedReview, RandomReview, ReviewPolicy, SharedReviewPolicy, DEFAULT_REVISION_PROBABILITY,
};
pub use reviewer::{ReviewerAgent, APPROVED, NEEDS_REVISION};
pub use writer::{WriterAgent, DRAFT_CREATED, DRAFT_REVISED};

use std::sync::Arc;

use async_trait::async_trait;

use crate::task::AgentResult;

/// Separates a draft from the reviewer feedback appended to it.
pub const FEEDBACK_MARKER: &str = "Reviewer feedback:";

/// Tags text that is the product of a revision cycle.
pub const REVISION_MARKER: &str = "[REVISION]";

/// A single pipeline step.
///
/// `run` may suspend but must not block the runtime. Returning `Err` aborts the
/// pipeline for the task being processed; it never reaches the submitter.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Name recorded in every result this agent produces.
    fn name(&self) -> &str;

    async fn run(&self, input: &str) -> anyhow::Result<AgentResult>;
}

pub type AgentRef = Arc<dyn Agent>;

/// The four agents the orchestrator sequences.
#[derive(Clone)]
pub struct AgentSet {
    pub planner: AgentRef,
    pub researcher: AgentRef,
    pub writer: AgentRef,
    pub reviewer: AgentRef,
}

impl AgentSet {
    /// The built-in agents, with the reviewer driven by `policy`.
    pub fn standard(policy: SharedReviewPolicy) -> Self {
        Self {
            planner: Arc::new(PlannerAgent::new()),
            researcher: Arc::new(ResearcherAgent::new()),
            writer: Arc::new(WriterAgent::new()),
            reviewer: Arc::new(ReviewerAgent::new(policy)),
        }
    }
}

/// Build the writer input for a revision pass.
pub fn revision_request(draft: &str, feedback: &str) -> String {
    format!("{draft}\n\n{FEEDBACK_MARKER} {feedback}\n\n{REVISION_MARKER}")
}

/// Tag a revised draft so the reviewer recognises it.
pub fn mark_revision(draft: &str) -> String {
    format!("{draft}\n\n{REVISION_MARKER}")
}

/// Truncate to at most `max` characters without splitting a code point.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_request_carries_both_markers() {
        let input = revision_request("draft body", "tighten it");
        assert!(input.starts_with("draft body"));
        assert!(input.contains("Reviewer feedback: tighten it"));
        assert!(input.ends_with(REVISION_MARKER));
    }

    #[test]
    fn test_mark_revision() {
        assert_eq!(mark_revision("text"), "text\n\n[REVISION]");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 5), "");
    }
}
