//! Role-playing session and retry loop for Taskhawk.
//!
//! A [`RolePlaySession`] drives one bounded exchange between an instructing
//! user role and a tool-using assistant role. The [`RetryRunner`] wraps
//! session runs in the bounded retry state machine: classify the outcome of
//! each attempt, sleep a fixed delay on failure, stop on answer or
//! exhaustion.

pub mod retry;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use retry::{AttemptOutcome, RetryPolicy, RetryRunner, RunError, RunReport};
pub use session::{RolePlaySession, SessionReport, TASK_DONE_MARKER};
