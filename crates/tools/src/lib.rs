//! Built-in toolkits for Taskhawk.
//!
//! Toolkits give the assistant role the ability to act in the world: search
//! the web, fetch pages, read and write files (the artifact output path),
//! and run allowlisted shell commands.
//!
//! Each toolkit is constructed exactly once per process, before the retry
//! loop starts; whatever live resource it allocates (an HTTP client, the
//! artifact output directory) is reused across every attempt. A toolkit
//! that fails to construct aborts startup — this is deliberately fatal and
//! never retried.

pub mod exec;
pub mod files;
pub mod pathsafe;
pub mod search;

pub use exec::ExecToolkit;
pub use files::FileToolkit;
pub use search::SearchToolkit;

use taskhawk_config::ToolsConfig;
use taskhawk_core::error::ToolError;
use taskhawk_core::tool::ToolRegistry;

/// Build the default tool registry from configuration.
///
/// Registration order is part of the contract: the aggregated sequence
/// preserves each toolkit's internal tool order and concatenates toolkits
/// in the order below.
pub fn default_registry(config: &ToolsConfig) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SearchToolkit::new(
        config.http_timeout_secs,
        config.max_search_results,
    )?));
    registry.register(Box::new(FileToolkit::new(&config.output_dir)?));
    registry.register(Box::new(ExecToolkit::new(config.shell_allowlist.clone())));
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_order() {
        let config = ToolsConfig::default();
        let registry = default_registry(&config).unwrap();
        assert_eq!(
            registry.names(),
            vec!["web_search", "fetch_url", "file_read", "file_write", "shell"]
        );
    }
}
