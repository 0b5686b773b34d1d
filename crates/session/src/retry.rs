//! The bounded, fixed-delay retry loop around session attempts.
//!
//! Every attempt is classified into exactly one [`AttemptOutcome`]: answered,
//! completed without an answer, or failed with a fault. Failed and
//! answer-less attempts are followed by a constant delay (no backoff), and
//! the loop stops on the first answer, on a non-retryable fault, or when the
//! attempt budget runs out.

use std::future::Future;
use std::time::Duration;

use taskhawk_config::RetryConfig;
use taskhawk_core::error::SessionError;
use taskhawk_core::message::Transcript;
use taskhawk_core::provider::Usage;
use taskhawk_core::task::TaskSpec;
use thiserror::Error;
use tracing::{info, warn};

use crate::session::{RolePlaySession, SessionReport};

/// How the retry loop paces itself.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts before giving up.
    pub max_attempts: u32,

    /// Fixed delay after every attempt that did not produce an answer.
    pub delay: Duration,

    /// Optional wall-clock deadline for a single attempt.
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(10),
            attempt_timeout: None,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_secs(config.delay_secs),
            attempt_timeout: config.attempt_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// The classified result of one attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The session completed and produced a final answer.
    Answered {
        answer: String,
        transcript: Transcript,
        usage: Usage,
    },

    /// The session completed normally but never reached an answer.
    NoAnswer { transcript: Transcript, usage: Usage },

    /// The session raised a fault before completing.
    Failed { retryable: bool, reason: String },
}

impl AttemptOutcome {
    /// Classify one attempt's raw result.
    pub fn classify(result: Result<SessionReport, SessionError>) -> Self {
        match result {
            Ok(SessionReport {
                answer: Some(answer),
                transcript,
                usage,
            }) => AttemptOutcome::Answered {
                answer,
                transcript,
                usage,
            },
            Ok(SessionReport {
                answer: None,
                transcript,
                usage,
            }) => AttemptOutcome::NoAnswer { transcript, usage },
            Err(e) => AttemptOutcome::Failed {
                retryable: e.is_retryable(),
                reason: e.to_string(),
            },
        }
    }
}

/// The final result of a successful run.
#[derive(Debug)]
pub struct RunReport {
    /// The answer from the attempt that succeeded.
    pub answer: String,

    /// The 1-based attempt number that produced the answer.
    pub attempts: u32,

    /// Transcript of the successful attempt.
    pub transcript: Transcript,

    /// Token usage accumulated over all attempts, including failed ones.
    pub usage: Usage,
}

/// Why a run produced no answer.
#[derive(Debug, Error)]
pub enum RunError {
    /// Every attempt completed or failed without producing an answer.
    #[error("no answer after {attempts} attempt(s)")]
    Exhausted { attempts: u32 },

    /// An attempt hit a fault that retrying cannot fix.
    #[error("attempt {attempt} failed with a non-retryable fault: {reason}")]
    Fatal { attempt: u32, reason: String },
}

/// Drives session attempts under a [`RetryPolicy`].
pub struct RetryRunner {
    policy: RetryPolicy,
}

impl RetryRunner {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Run the task through the session until it answers or the policy is
    /// exhausted. The session value is reused across attempts; each call to
    /// [`RolePlaySession::run`] starts from a fresh conversational state.
    pub async fn run(
        &self,
        session: &RolePlaySession,
        task: &TaskSpec,
    ) -> Result<RunReport, RunError> {
        self.run_with(|_attempt| session.run(task)).await
    }

    /// The retry loop over any attempt function. `attempt_fn` receives the
    /// 1-based attempt number and produces one attempt's result.
    pub async fn run_with<F, Fut>(&self, mut attempt_fn: F) -> Result<RunReport, RunError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<SessionReport, SessionError>>,
    {
        let mut total_usage = Usage::default();

        for attempt in 1..=self.policy.max_attempts {
            info!(attempt, max_attempts = self.policy.max_attempts, "starting attempt");

            let result = self.bounded(attempt_fn(attempt)).await;
            match AttemptOutcome::classify(result) {
                AttemptOutcome::Answered {
                    answer,
                    transcript,
                    usage,
                } => {
                    total_usage.absorb(&usage);
                    info!(attempt, "attempt produced an answer");
                    return Ok(RunReport {
                        answer,
                        attempts: attempt,
                        transcript,
                        usage: total_usage,
                    });
                }
                AttemptOutcome::NoAnswer { transcript, usage } => {
                    total_usage.absorb(&usage);
                    warn!(
                        attempt,
                        transcript = %transcript.summary(200),
                        "attempt completed without an answer"
                    );
                }
                AttemptOutcome::Failed { retryable, reason } => {
                    if !retryable {
                        warn!(attempt, reason = %reason, "non-retryable fault, giving up");
                        return Err(RunError::Fatal { attempt, reason });
                    }
                    warn!(attempt, reason = %reason, "attempt failed");
                }
            }

            // The delay follows every unsuccessful attempt, the last one
            // included.
            info!(delay_secs = self.policy.delay.as_secs(), "waiting before next step");
            tokio::time::sleep(self.policy.delay).await;
        }

        Err(RunError::Exhausted {
            attempts: self.policy.max_attempts,
        })
    }

    /// Apply the per-attempt deadline, if one is configured.
    async fn bounded<Fut>(&self, attempt: Fut) -> Result<SessionReport, SessionError>
    where
        Fut: Future<Output = Result<SessionReport, SessionError>>,
    {
        match self.policy.attempt_timeout {
            Some(limit) => match tokio::time::timeout(limit, attempt).await {
                Ok(result) => result,
                Err(_) => Err(SessionError::DeadlineExceeded(limit.as_secs())),
            },
            None => attempt.await,
        }
    }
}
