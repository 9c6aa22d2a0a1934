//! Planner: turns the raw request into a JSON list of research subtasks.

use async_trait::async_trait;
use serde_json::json;

use super::{truncate_chars, Agent};
use crate::task::AgentResult;

pub const PLANNED: &str = "PLANNED";

#[derive(Debug, Default)]
pub struct PlannerAgent;

impl PlannerAgent {
    pub fn new() -> Self {
        Self
    }

    fn subtasks(request: &str) -> Vec<String> {
        vec![
            format!(
                "Clarify the core goal of the request: {}",
                truncate_chars(request, 120)
            ),
            format!(
                "Break down the main aspects that must be researched for: {}",
                truncate_chars(request, 160)
            ),
            format!(
                "Identify trade-offs, constraints, and edge cases related to: {}",
                truncate_chars(request, 160)
            ),
            format!(
                "Synthesize a final perspective and recommendations grounded in the original request: {}",
                truncate_chars(request, 160)
            ),
        ]
    }
}

#[async_trait]
impl Agent for PlannerAgent {
    fn name(&self) -> &str {
        "Planner"
    }

    async fn run(&self, input: &str) -> anyhow::Result<AgentResult> {
        let plan = json!({ "subtasks": Self::subtasks(input) });
        let output = serde_json::to_string_pretty(&plan)?;

        let framed_input = format!(
            "Original request:\n{input}\n\n\
             Planning objective: turn the request into actionable research subtasks.\n"
        );

        Ok(AgentResult::new(self.name(), PLANNED, framed_input, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plan_has_four_subtasks_referencing_request() {
        let result = PlannerAgent::new()
            .run("Evaluate remote work policies")
            .await
            .unwrap();

        assert_eq!(result.agent_name, "Planner");
        assert_eq!(result.status, PLANNED);
        assert!(result.input.contains("Evaluate remote work policies"));

        let plan: serde_json::Value = serde_json::from_str(&result.output).unwrap();
        let subtasks = plan["subtasks"].as_array().unwrap();
        assert_eq!(subtasks.len(), 4);
        for subtask in subtasks {
            assert!(subtask
                .as_str()
                .unwrap()
                .contains("Evaluate remote work policies"));
        }
    }

    #[test]
    fn test_long_requests_are_truncated() {
        let request = "x".repeat(500);
        let subtasks = PlannerAgent::subtasks(&request);
        assert!(subtasks[0].ends_with(&"x".repeat(120)));
        assert!(!subtasks[0].contains(&"x".repeat(121)));
        assert!(!subtasks[1].contains(&"x".repeat(161)));
    }
}
