//! Web search tool — stub that returns mock search results.
//!
//! In production this would call a real search API (SerpAPI, Brave, etc.).
//! The stub returns plausible results in the same `{title, snippet, link}`
//! shape, so the reasoning loop can be exercised end-to-end without network
//! access.

use async_trait::async_trait;
use reagent_core::error::ToolError;
use reagent_core::schema::{ParamKind, ParamSchema};
use reagent_core::tool::Tool;
use serde::Serialize;
use serde_json::{Map, Value};

pub struct SearchTool;

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns a list of relevant results with titles, snippets, and links."
    }

    fn schema(&self) -> ParamSchema {
        [("input".to_string(), ParamKind::String)]
            .into_iter()
            .collect()
    }

    async fn invoke(
        &self,
        params: Map<String, Value>,
    ) -> std::result::Result<Value, ToolError> {
        let query = params
            .get("input")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'input' argument".into()))?;

        let results = generate_mock_results(query);
        serde_json::to_value(&results).map_err(|e| ToolError::ExecutionFailed {
            tool_name: "search".into(),
            reason: e.to_string(),
        })
    }
}

#[derive(Serialize, Clone)]
struct SearchResult {
    title: String,
    snippet: String,
    link: String,
}

fn generate_mock_results(query: &str) -> Vec<SearchResult> {
    let q = query.to_lowercase();

    // Context-aware mock results for common topics.
    let templates: Vec<(&str, Vec<SearchResult>)> = vec![
        ("france", vec![
            SearchResult {
                title: "France - Wikipedia".into(),
                snippet: "France, officially the French Republic, is a country in Western Europe. Its capital is Paris.".into(),
                link: "https://en.wikipedia.org/wiki/France".into(),
            },
            SearchResult {
                title: "Paris - Wikipedia".into(),
                snippet: "Paris is the capital and largest city of France, with an estimated population of 2.1 million.".into(),
                link: "https://en.wikipedia.org/wiki/Paris".into(),
            },
        ]),
        ("rust", vec![
            SearchResult {
                title: "The Rust Programming Language".into(),
                snippet: "Rust is a systems programming language focused on safety, speed, and concurrency.".into(),
                link: "https://doc.rust-lang.org/book/".into(),
            },
            SearchResult {
                title: "crates.io: Rust Package Registry".into(),
                snippet: "The Rust community's crate registry for sharing and discovering Rust libraries.".into(),
                link: "https://crates.io/".into(),
            },
        ]),
    ];

    for (keyword, results) in &templates {
        if q.contains(keyword) {
            return results.clone();
        }
    }

    // Generic fallback.
    (1..=3)
        .map(|i| SearchResult {
            title: format!("Result {} for: {}", i, query),
            snippet: format!(
                "This is a mock search result for the query '{}'. In production, this would contain real content.",
                query
            ),
            link: format!("https://example.com/search?q={}&p={}", urlencode(query), i),
        })
        .collect()
}

fn urlencode(s: &str) -> String {
    s.replace(' ', "+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn search_returns_results_with_expected_shape() {
        let tool = SearchTool;
        let result = tool
            .invoke(params(json!({"input": "capital of France"})))
            .await
            .unwrap();

        let results = result.as_array().unwrap();
        assert!(!results.is_empty());
        for r in results {
            assert!(r.get("title").is_some());
            assert!(r.get("snippet").is_some());
            assert!(r.get("link").is_some());
        }
    }

    #[tokio::test]
    async fn france_query_mentions_paris() {
        let tool = SearchTool;
        let result = tool
            .invoke(params(json!({"input": "capital of France"})))
            .await
            .unwrap();
        assert!(result.to_string().contains("Paris"));
    }

    #[tokio::test]
    async fn unknown_topic_gets_generic_results() {
        let tool = SearchTool;
        let result = tool
            .invoke(params(json!({"input": "zorbulon flux"})))
            .await
            .unwrap();
        let results = result.as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0]["link"].as_str().unwrap().contains("zorbulon+flux"));
    }

    #[tokio::test]
    async fn missing_input_returns_error() {
        let tool = SearchTool;
        let result = tool.invoke(Map::new()).await;
        assert!(result.is_err());
    }

    #[test]
    fn schema_requires_string_input() {
        let tool = SearchTool;
        let schema = tool.schema();
        assert_eq!(schema.get("input"), Some(&ParamKind::String));
    }
}
