//! The role-playing session — one bounded conversational attempt at a task.
//!
//! Two roles share one provider (possibly with different models):
//! - the **user role** decomposes the task into one instruction per turn and
//!   signals completion with a terminal marker;
//! - the **assistant role** answers each instruction, calling tools in a
//!   bounded inner loop until it can give a text solution.
//!
//! Each call to [`RolePlaySession::run`] is one attempt: all conversational
//! state is created fresh inside `run` and returned in the report, so the
//! same session value can back multiple retries without state leaking
//! between them.

use std::sync::Arc;
use taskhawk_config::SessionConfig;
use taskhawk_core::error::SessionError;
use taskhawk_core::message::{Message, MessageToolCall, Role, Transcript};
use taskhawk_core::provider::{Provider, ProviderRequest, Usage};
use taskhawk_core::task::TaskSpec;
use taskhawk_core::tool::{ToolCall, ToolRegistry};
use tracing::{debug, info, warn};

/// The terminal marker the user role emits when the task is complete.
pub const TASK_DONE_MARKER: &str = "TASK_DONE";

const USER_SYSTEM_TEMPLATE: &str = "\
You are the {user_role}, directing an {assistant_role} to complete this task:

<task>{task}</task>

Rules:
- Give exactly one concrete instruction per reply. Do not solve the task yourself.
- Base each instruction on what the {assistant_role} reported so far.
- Do not repeat an instruction that already succeeded.
- When the task is fully complete and the final answer has been stated, reply \
with exactly {done_marker} and nothing else.";

const ASSISTANT_SYSTEM_TEMPLATE: &str = "\
You are the {assistant_role}. You must complete this task:

<task>{task}</task>

A {user_role} gives you one instruction at a time. Carry out each instruction, \
using your tools whenever they help, and reply with a complete solution to the \
instruction. Always explain what you did. If an instruction cannot be carried \
out, say why and suggest an alternative. Finish your reply to the final \
instruction with a clear statement of the final answer.";

const USER_KICKOFF: &str =
    "The task is stated in your instructions. Give your first instruction.";

const SPECIFY_PROMPT: &str = "\
Rewrite the following task so it is specific and self-contained: make the \
goal, the expected output, and any constraints explicit. Reply with the \
rewritten task only.

<task>{task}</task>";

/// What one attempt produced.
///
/// Exactly one of `answer` present / absent comes back on every normal
/// return; an absent answer is a legitimate outcome (turn budget exhausted,
/// user role never confirmed completion), not a fault.
#[derive(Debug)]
pub struct SessionReport {
    /// The final answer, if the exchange reached one.
    pub answer: Option<String>,

    /// Everything both roles and the tools said, in order.
    pub transcript: Transcript,

    /// Token usage accumulated over every model call in the attempt.
    pub usage: Usage,
}

/// A reusable description of how to run one attempt.
pub struct RolePlaySession {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    config: SessionConfig,
    user_model: String,
    assistant_model: String,
    temperature: f32,
    max_tokens: u32,
}

impl RolePlaySession {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        config: SessionConfig,
        user_model: impl Into<String>,
        assistant_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
            user_model: user_model.into(),
            assistant_model: assistant_model.into(),
            temperature: 0.0,
            max_tokens: 4000,
        }
    }

    /// Set the sampling temperature for both roles.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per model response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Run one attempt at the task.
    ///
    /// Returns a report on every normal completion; raises `SessionError`
    /// only for genuine faults (model call failure, tool crash), never to
    /// signal "task incomplete".
    pub async fn run(&self, task: &TaskSpec) -> Result<SessionReport, SessionError> {
        let mut usage = Usage::default();
        let mut transcript = Transcript::new();

        let prompt = if task.specify_task {
            self.specify(task, &mut usage).await?
        } else {
            task.prompt.clone()
        };

        let max_turns = task.turn_budget.unwrap_or(self.config.max_turns);
        info!(
            max_turns,
            tools = self.tools.len(),
            "session starting"
        );

        // Each role sees the exchange from its own side: the other role's
        // messages arrive as Role::User, its own as Role::Assistant.
        let mut user_view = vec![
            Message::system(self.user_system_prompt(&prompt)),
            Message::user(USER_KICKOFF),
        ];
        let mut assistant_view = vec![Message::system(self.assistant_system_prompt(&prompt))];

        let tool_defs = self.tools.definitions();

        for turn in 1..=max_turns {
            // --- User role: next instruction ---
            let instruction = self
                .complete_text(&self.user_model, &user_view, &mut usage)
                .await?;
            debug!(turn, instruction = %instruction, "user role instructed");
            transcript.push(Message::user(&instruction));
            user_view.push(Message::assistant(&instruction));

            if instruction.contains(TASK_DONE_MARKER) {
                info!(turn, "user role signaled completion");
                // The answer is the assistant's last solution, if it gave one
                let answer = transcript
                    .last_from(&Role::Assistant)
                    .map(|m| m.content.clone());
                return Ok(SessionReport {
                    answer,
                    transcript,
                    usage,
                });
            }

            // --- Assistant role: solve, with a bounded inner tool loop ---
            assistant_view.push(Message::user(&instruction));
            let solution = self
                .assistant_turn(&mut assistant_view, &tool_defs, &mut transcript, &mut usage)
                .await?;
            debug!(turn, solution = %solution, "assistant role answered");

            user_view.push(Message::user(&solution));
        }

        info!(max_turns, "turn budget exhausted without completion signal");
        Ok(SessionReport {
            answer: None,
            transcript,
            usage,
        })
    }

    /// One assistant turn: call the model, execute any requested tools,
    /// repeat until it produces text or the tool-round budget runs out.
    async fn assistant_turn(
        &self,
        assistant_view: &mut Vec<Message>,
        tool_defs: &[taskhawk_core::provider::ToolDefinition],
        transcript: &mut Transcript,
        usage: &mut Usage,
    ) -> Result<String, SessionError> {
        for _round in 0..self.config.max_tool_rounds {
            let request = ProviderRequest {
                model: self.assistant_model.clone(),
                messages: assistant_view.clone(),
                temperature: self.temperature,
                max_tokens: Some(self.max_tokens),
                tools: tool_defs.to_vec(),
            };
            let response = self.provider.complete(request).await?;
            if let Some(u) = &response.usage {
                usage.absorb(u);
            }

            let message = response.message;
            transcript.push(message.clone());
            assistant_view.push(message.clone());

            if message.tool_calls.is_empty() {
                return Ok(message.content);
            }

            for tc in &message.tool_calls {
                let result = self.invoke_tool(tc).await?;
                transcript.push(Message::tool_result(&tc.id, &result));
                assistant_view.push(Message::tool_result(&tc.id, &result));
            }
        }

        // Tool-round budget hit; force a text answer without tools.
        warn!(
            rounds = self.config.max_tool_rounds,
            "tool-round budget exhausted, forcing a text reply"
        );
        assistant_view.push(Message::user(
            "Stop using tools and reply with your best solution from what you have.",
        ));
        let request = ProviderRequest {
            model: self.assistant_model.clone(),
            messages: assistant_view.clone(),
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            tools: Vec::new(),
        };
        let response = self.provider.complete(request).await?;
        if let Some(u) = &response.usage {
            usage.absorb(u);
        }
        transcript.push(response.message.clone());
        assistant_view.push(response.message.clone());
        Ok(response.message.content)
    }

    /// Execute one tool call. A tool that reports failure stays inside the
    /// conversation (the assistant sees the error text); only a crashed
    /// invocation escalates to a session fault.
    async fn invoke_tool(&self, tc: &MessageToolCall) -> Result<String, SessionError> {
        let call = ToolCall {
            id: tc.id.clone(),
            name: tc.name.clone(),
            arguments: serde_json::from_str(&tc.arguments).unwrap_or_default(),
        };
        debug!(tool = %call.name, "assistant invoking tool");
        match self.tools.execute(&call).await {
            Ok(result) => Ok(result.output),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool reported an error");
                Ok(format!("Tool error: {e}"))
            }
        }
    }

    /// The optional task-specify pass: rewrite the raw prompt into a more
    /// concrete task statement before the session starts.
    async fn specify(&self, task: &TaskSpec, usage: &mut Usage) -> Result<String, SessionError> {
        let messages = vec![Message::user(
            SPECIFY_PROMPT.replace("{task}", &task.prompt),
        )];
        let specified = self
            .complete_text(&self.user_model, &messages, usage)
            .await?;
        debug!(specified = %specified, "task-specify pass rewrote the prompt");
        Ok(specified)
    }

    /// One plain completion (no tools) returning the text content.
    async fn complete_text(
        &self,
        model: &str,
        messages: &[Message],
        usage: &mut Usage,
    ) -> Result<String, SessionError> {
        let request = ProviderRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            tools: Vec::new(),
        };
        let response = self.provider.complete(request).await?;
        if let Some(u) = &response.usage {
            usage.absorb(u);
        }
        Ok(response.message.content)
    }

    fn user_system_prompt(&self, task: &str) -> String {
        USER_SYSTEM_TEMPLATE
            .replace("{user_role}", &self.config.user_role)
            .replace("{assistant_role}", &self.config.assistant_role)
            .replace("{task}", task)
            .replace("{done_marker}", TASK_DONE_MARKER)
    }

    fn assistant_system_prompt(&self, task: &str) -> String {
        ASSISTANT_SYSTEM_TEMPLATE
            .replace("{user_role}", &self.config.user_role)
            .replace("{assistant_role}", &self.config.assistant_role)
            .replace("{task}", task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        make_text_response, make_tool_call, make_tool_call_response, CountingTool,
        SequentialMockProvider,
    };
    use taskhawk_core::tool::ToolRegistry;

    fn session(
        provider: SequentialMockProvider,
        tools: ToolRegistry,
        max_turns: u32,
    ) -> RolePlaySession {
        let config = SessionConfig {
            max_turns,
            max_tool_rounds: 3,
            ..SessionConfig::default()
        };
        RolePlaySession::new(
            Arc::new(provider),
            Arc::new(tools),
            config,
            "mock-user",
            "mock-assistant",
        )
    }

    #[tokio::test]
    async fn completes_with_answer_when_user_signals_done() {
        // user instructs, assistant solves, user signals done
        let provider = SequentialMockProvider::new(vec![
            make_text_response("Find the answer to the question."),
            make_text_response("The answer is 42."),
            make_text_response("TASK_DONE"),
        ]);
        let s = session(provider, ToolRegistry::new(), 5);
        let task = TaskSpec::new("answer the question").unwrap();

        let report = s.run(&task).await.unwrap();
        assert_eq!(report.answer.as_deref(), Some("The answer is 42."));
        // instruction + solution land in the transcript in order
        assert_eq!(report.transcript.messages[0].role, Role::User);
        assert_eq!(report.transcript.messages[1].role, Role::Assistant);
        // three model calls at 15 tokens each (mock usage)
        assert_eq!(report.usage.total_tokens, 45);
    }

    #[tokio::test]
    async fn zero_tools_session_completes() {
        let provider = SequentialMockProvider::new(vec![
            make_text_response("State the literal string OK."),
            make_text_response("OK"),
            make_text_response("TASK_DONE"),
        ]);
        let s = session(provider, ToolRegistry::new(), 5);
        let task = TaskSpec::new("return the literal string OK").unwrap();

        let report = s.run(&task).await.unwrap();
        assert_eq!(report.answer.as_deref(), Some("OK"));
    }

    #[tokio::test]
    async fn turn_budget_exhaustion_returns_no_answer() {
        // two turns, user never signals done: 2 * (instruction + solution)
        let provider = SequentialMockProvider::new(vec![
            make_text_response("Do step one."),
            make_text_response("Step one done."),
            make_text_response("Do step two."),
            make_text_response("Step two done."),
        ]);
        let s = session(provider, ToolRegistry::new(), 2);
        let task = TaskSpec::new("never-ending task").unwrap();

        let report = s.run(&task).await.unwrap();
        assert!(report.answer.is_none());
        assert_eq!(report.transcript.len(), 4);
    }

    #[tokio::test]
    async fn done_before_any_solution_yields_no_answer() {
        let provider = SequentialMockProvider::new(vec![make_text_response("TASK_DONE")]);
        let s = session(provider, ToolRegistry::new(), 5);
        let task = TaskSpec::new("trivial").unwrap();

        let report = s.run(&task).await.unwrap();
        assert!(report.answer.is_none());
    }

    #[tokio::test]
    async fn assistant_tool_loop_executes_and_feeds_back() {
        let (tool, counter) = CountingTool::new("lookup", "looked it up: 7");
        let mut registry = ToolRegistry::new();
        registry.register_tool("test", Box::new(tool));

        let provider = SequentialMockProvider::new(vec![
            make_text_response("Look up the number."),
            make_tool_call_response(
                vec![make_tool_call("lookup", serde_json::json!({"key": "number"}))],
                "Using the lookup tool.",
            ),
            make_text_response("The number is 7."),
            make_text_response("TASK_DONE"),
        ]);
        let s = session(provider, registry, 5);
        let task = TaskSpec::new("find the number").unwrap();

        let report = s.run(&task).await.unwrap();
        assert_eq!(report.answer.as_deref(), Some("The number is 7."));
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
        // tool result is recorded in the transcript
        assert!(report
            .transcript
            .messages
            .iter()
            .any(|m| m.role == Role::Tool && m.content.contains("looked it up")));
    }

    #[tokio::test]
    async fn specify_task_consumes_one_extra_call() {
        let provider = SequentialMockProvider::new(vec![
            make_text_response("Return the string OK, verbatim, as the final answer."),
            make_text_response("State the literal string OK."),
            make_text_response("OK"),
            make_text_response("TASK_DONE"),
        ]);
        let s = session(provider, ToolRegistry::new(), 5);
        let task = TaskSpec::new("say OK").unwrap().with_task_specify(true);

        let report = s.run(&task).await.unwrap();
        assert_eq!(report.answer.as_deref(), Some("OK"));
        assert_eq!(report.usage.total_tokens, 60);
    }

    #[tokio::test]
    async fn provider_fault_raises_session_error() {
        let provider = SequentialMockProvider::failing("connection reset");
        let s = session(provider, ToolRegistry::new(), 5);
        let task = TaskSpec::new("anything").unwrap();

        let err = s.run(&task).await.unwrap_err();
        assert!(matches!(err, SessionError::Provider(_)));
        assert!(err.is_retryable());
    }
}
