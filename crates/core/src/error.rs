//! Error types for the Taskhawk domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Taskhawk operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Task errors ---
    #[error("Invalid task: {0}")]
    Task(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether a retry has any chance of succeeding.
    ///
    /// Authentication and configuration faults will fail the same way on
    /// every attempt; everything else is assumed transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ProviderError::AuthenticationFailed(_)
                | ProviderError::NotConfigured(_)
                | ProviderError::ModelNotFound(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Permission denied: {tool_name} — {reason}")]
    PermissionDenied { tool_name: String, reason: String },

    #[error("Toolkit initialization failed: {toolkit} — {reason}")]
    ToolkitInit { toolkit: String, reason: String },
}

/// A fault raised by a running session.
///
/// Reserved for genuine connectivity/programming faults. A session that
/// completes without producing an answer is a *normal* return
/// (`SessionReport { answer: None, .. }`), never a `SessionError`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Model call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool invocation crashed: {0}")]
    Tool(#[from] ToolError),

    #[error("Attempt deadline exceeded after {0}s")]
    DeadlineExceeded(u64),

    #[error("Session internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Whether the retry loop should try again after this fault.
    pub fn is_retryable(&self) -> bool {
        match self {
            SessionError::Provider(e) => e.is_retryable(),
            SessionError::Tool(_) => true,
            SessionError::DeadlineExceeded(_) => true,
            SessionError::Internal(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_faults_are_not_retryable() {
        let err = SessionError::Provider(ProviderError::AuthenticationFailed("bad key".into()));
        assert!(!err.is_retryable());

        let err = SessionError::Provider(ProviderError::NotConfigured("no api key".into()));
        assert!(!err.is_retryable());
    }

    #[test]
    fn transient_faults_are_retryable() {
        let err = SessionError::Provider(ProviderError::Network("connection reset".into()));
        assert!(err.is_retryable());

        let err = SessionError::Tool(ToolError::ExecutionFailed {
            tool_name: "web_search".into(),
            reason: "dns failure".into(),
        });
        assert!(err.is_retryable());

        assert!(SessionError::DeadlineExceeded(300).is_retryable());
    }

    #[test]
    fn error_display_includes_context() {
        let err = Error::from(ToolError::NotFound("spreadsheet".into()));
        assert!(err.to_string().contains("spreadsheet"));
    }
}
