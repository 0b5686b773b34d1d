//! LLM provider implementations for Taskhawk.
//!
//! One implementation covers nearly everything: most LLM backends expose an
//! OpenAI-compatible `/v1/chat/completions` endpoint (OpenAI, OpenRouter,
//! Ollama, vLLM, Together, Fireworks, …).

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use std::sync::Arc;
use taskhawk_core::provider::Provider;

/// Build the configured provider.
///
/// Looks up the default provider's section in `[providers]` for a key/URL
/// override; otherwise falls back to the top-level API key and the
/// well-known base URL for the provider name.
pub fn build_from_config(config: &taskhawk_config::AppConfig) -> Arc<dyn Provider> {
    let name = &config.default_provider;
    let section = config.providers.get(name);

    let api_key = section
        .and_then(|p| p.api_key.clone())
        .or_else(|| config.api_key.clone())
        .unwrap_or_default();

    let base_url = section
        .and_then(|p| p.api_url.clone())
        .unwrap_or_else(|| default_base_url(name));

    Arc::new(OpenAiCompatProvider::new(name, base_url, api_key))
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
