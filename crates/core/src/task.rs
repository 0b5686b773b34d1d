//! TaskSpec — the immutable description of what a run should accomplish.

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// The natural-language goal plus session configuration for one invocation.
///
/// Created once per invocation, owned by the caller, and passed by reference
/// into the retry runner. The prompt is free text; it may contain an explicit
/// step-by-step procedure, but no grammar is imposed on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    /// The task prompt. Never empty.
    pub prompt: String,

    /// Maximum user/assistant turns per session. `None` uses the session
    /// default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_budget: Option<u32>,

    /// Whether to run a task-specify pass that rewrites the raw prompt into
    /// a more concrete task statement before the session starts.
    #[serde(default)]
    pub specify_task: bool,
}

impl TaskSpec {
    /// Create a task from a prompt. Rejects empty or whitespace-only input.
    pub fn new(prompt: impl Into<String>) -> Result<Self, Error> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(Error::Task("task prompt must not be empty".into()));
        }
        Ok(Self {
            prompt,
            turn_budget: None,
            specify_task: false,
        })
    }

    /// Set the turn budget.
    pub fn with_turn_budget(mut self, turns: u32) -> Self {
        self.turn_budget = Some(turns);
        self
    }

    /// Enable the task-specify pass.
    pub fn with_task_specify(mut self, enabled: bool) -> Self {
        self.specify_task = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_prompt() {
        assert!(TaskSpec::new("").is_err());
        assert!(TaskSpec::new("   \n\t ").is_err());
    }

    #[test]
    fn builder_sets_fields() {
        let task = TaskSpec::new("count the ducks")
            .unwrap()
            .with_turn_budget(5)
            .with_task_specify(true);
        assert_eq!(task.prompt, "count the ducks");
        assert_eq!(task.turn_budget, Some(5));
        assert!(task.specify_task);
    }
}
