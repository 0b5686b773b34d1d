//! Search toolkit — web search and URL fetching over a shared HTTP client.
//!
//! `web_search` queries the DuckDuckGo instant-answer API (keyless);
//! `fetch_url` retrieves a page body for the assistant to read. Both tools
//! share the toolkit's HTTP client, which is built once at startup.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use taskhawk_core::error::ToolError;
use taskhawk_core::tool::{Tool, ToolResult, Toolkit};
use tracing::debug;

/// Toolkit exposing `web_search` and `fetch_url`.
pub struct SearchToolkit {
    client: Arc<reqwest::Client>,
    max_results: usize,
}

impl SearchToolkit {
    /// Build the toolkit and its HTTP client.
    pub fn new(timeout_secs: u64, max_results: usize) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("taskhawk/0.1")
            .build()
            .map_err(|e| ToolError::ToolkitInit {
                toolkit: "search".into(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client: Arc::new(client),
            max_results,
        })
    }
}

impl Toolkit for SearchToolkit {
    fn name(&self) -> &str {
        "search"
    }

    fn into_tools(self: Box<Self>) -> Vec<Box<dyn Tool>> {
        vec![
            Box::new(WebSearchTool {
                client: Arc::clone(&self.client),
                max_results: self.max_results,
            }),
            Box::new(FetchUrlTool {
                client: Arc::clone(&self.client),
            }),
        ]
    }
}

struct WebSearchTool {
    client: Arc<reqwest::Client>,
    max_results: usize,
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns a list of relevant results with titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return (default 3)",
                    "default": 3
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let num_results = arguments["num_results"]
            .as_u64()
            .unwrap_or(3)
            .min(self.max_results as u64) as usize;

        debug!(query = %query, "Running web search");

        let response = self
            .client
            .get("https://api.duckduckgo.com/")
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: e.to_string(),
            })?;

        let answer: InstantAnswer =
            response.json().await.map_err(|e| ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: format!("failed to parse search response: {e}"),
            })?;

        let results = flatten_results(&answer, num_results);
        if results.is_empty() {
            return Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!("No results found for '{query}'."),
            });
        }

        let output = results
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{}. {}\n   {}\n   {}", i + 1, r.title, r.url, r.snippet))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
        })
    }
}

struct SearchHit {
    title: String,
    url: String,
    snippet: String,
}

/// DuckDuckGo instant-answer payload (the fields we read).
#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(default, rename = "AbstractText")]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default, rename = "Heading")]
    heading: String,
    #[serde(default, rename = "RelatedTopics")]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(default, rename = "Text")]
    text: String,
    #[serde(default, rename = "FirstURL")]
    first_url: String,
    #[serde(default, rename = "Topics")]
    topics: Vec<RelatedTopic>,
}

fn flatten_results(answer: &InstantAnswer, limit: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    if !answer.abstract_text.is_empty() {
        hits.push(SearchHit {
            title: answer.heading.clone(),
            url: answer.abstract_url.clone(),
            snippet: answer.abstract_text.clone(),
        });
    }

    fn walk(topics: &[RelatedTopic], hits: &mut Vec<SearchHit>, limit: usize) {
        for t in topics {
            if hits.len() >= limit {
                return;
            }
            if !t.text.is_empty() && !t.first_url.is_empty() {
                hits.push(SearchHit {
                    title: t.text.chars().take(80).collect(),
                    url: t.first_url.clone(),
                    snippet: t.text.clone(),
                });
            }
            walk(&t.topics, hits, limit);
        }
    }
    walk(&answer.related_topics, &mut hits, limit);

    hits.truncate(limit);
    hits
}

struct FetchUrlTool {
    client: Arc<reqwest::Client>,
}

// Page bodies can be huge; cap what goes back into the conversation.
const MAX_FETCH_CHARS: usize = 20_000;

#[async_trait]
impl Tool for FetchUrlTool {
    fn name(&self) -> &str {
        "fetch_url"
    }

    fn description(&self) -> &str {
        "Fetch the content of a URL via HTTP GET. Returns the status code and the response body (truncated for very large pages)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to fetch (http or https)"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let url = arguments["url"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'url' argument".into()))?;

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ToolError::InvalidArguments(
                "URL must start with http:// or https://".into(),
            ));
        }

        debug!(url = %url, "Fetching URL");

        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool_name: "fetch_url".into(),
                    reason: e.to_string(),
                })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ToolError::ExecutionFailed {
            tool_name: "fetch_url".into(),
            reason: e.to_string(),
        })?;

        let mut text = body;
        if text.len() > MAX_FETCH_CHARS {
            let cut = text
                .char_indices()
                .map(|(i, _)| i)
                .take_while(|&i| i <= MAX_FETCH_CHARS)
                .last()
                .unwrap_or(0);
            text.truncate(cut);
            text.push_str("\n[truncated]");
        }

        Ok(ToolResult {
            call_id: String::new(),
            success: status < 400,
            output: format!("[status: {status}]\n{text}"),
        })
    }
}
