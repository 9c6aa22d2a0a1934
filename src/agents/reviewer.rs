//! Reviewer: the quality gate in front of the final report.

use async_trait::async_trait;

use super::{Agent, SharedReviewPolicy, REVISION_MARKER};
use crate::task::AgentResult;

pub const APPROVED: &str = "APPROVED";
pub const NEEDS_REVISION: &str = "NEEDS_REVISION";

const REVISED_APPROVAL: &str = "The revised draft addresses the earlier concerns with structure, clarity, and specificity.\n\
    It is now suitable to deliver as the final report.";

const REVISION_FEEDBACK: &str = "The current draft is promising but needs revision:\n\
    - Clarify the connection to the original user request in the introduction.\n\
    - Tighten redundant bullet points in the research section.\n\
    - Make the conclusion more concrete with explicit recommendations.";

const FIRST_PASS_APPROVAL: &str = "The draft is clear, well-organized, and grounded in the user's request.\n\
    It can be treated as the final report without further changes.";

/// Approves anything tagged with [`REVISION_MARKER`]; otherwise defers to its policy.
#[derive(Debug)]
pub struct ReviewerAgent {
    policy: SharedReviewPolicy,
}

impl ReviewerAgent {
    pub fn new(policy: SharedReviewPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Agent for ReviewerAgent {
    fn name(&self) -> &str {
        "Reviewer"
    }

    async fn run(&self, input: &str) -> anyhow::Result<AgentResult> {
        let (status, feedback) = if input.contains(REVISION_MARKER) {
            (APPROVED, REVISED_APPROVAL)
        } else if self.policy.needs_revision() {
            (NEEDS_REVISION, REVISION_FEEDBACK)
        } else {
            (APPROVED, FIRST_PASS_APPROVAL)
        };

        Ok(AgentResult::new(self.name(), status, input, feedback))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::agents::{mark_revision, FixedReview, RandomReview};

    #[tokio::test]
    async fn test_revision_marker_always_approves() {
        let reviewer = ReviewerAgent::new(Arc::new(FixedReview::revise()));
        let result = reviewer.run(&mark_revision("draft")).await.unwrap();
        assert_eq!(result.status, APPROVED);
        assert_eq!(result.agent_name, "Reviewer");

        for seed in 0..16 {
            let reviewer = ReviewerAgent::new(Arc::new(RandomReview::seeded(1.0, seed)));
            let result = reviewer.run(&mark_revision("draft")).await.unwrap();
            assert_eq!(result.status, APPROVED);
        }
    }

    #[tokio::test]
    async fn test_policy_decides_unmarked_drafts() {
        let strict = ReviewerAgent::new(Arc::new(FixedReview::revise()));
        let result = strict.run("draft").await.unwrap();
        assert_eq!(result.status, NEEDS_REVISION);
        assert!(result.output.contains("needs revision"));

        let lenient = ReviewerAgent::new(Arc::new(FixedReview::approve()));
        let result = lenient.run("draft").await.unwrap();
        assert_eq!(result.status, APPROVED);
        assert_eq!(result.input, "draft");
    }
}
