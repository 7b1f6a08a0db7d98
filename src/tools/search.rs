//! Web search capability using daedra
//!
//! daedra queries DuckDuckGo, so no API key is needed.

use crate::tools::registry::Capability;
use crate::types::{AppError, Result};
use async_trait::async_trait;

/// Default number of results returned per query.
pub const DEFAULT_MAX_RESULTS: usize = 2;

/// `web_search`: top results for a query, rendered as plain text.
pub struct SearchTool {
    max_results: usize,
}

impl SearchTool {
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results: max_results.max(1),
        }
    }
}

impl Default for SearchTool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESULTS)
    }
}

/// One search hit, detached from daedra's response type.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub description: String,
}

pub fn render_results(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for '{}'.", query);
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {}\n   {}\n   {}",
                i + 1,
                hit.title,
                hit.url,
                hit.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl Capability for SearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information. Returns titles, URLs and snippets of the top results."
    }

    fn input_description(&self) -> &str {
        "The search query"
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        let query = input.trim();
        if query.is_empty() {
            return Err(AppError::CapabilityInvocation(
                "web_search needs a non-empty query".to_string(),
            ));
        }

        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: self.max_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::CapabilityInvocation(format!("Search failed: {}", e)))?;

        let hits: Vec<SearchHit> = response
            .data
            .iter()
            .take(self.max_results)
            .map(|r| SearchHit {
                title: r.title.clone(),
                url: r.url.clone(),
                description: r.description.clone(),
            })
            .collect();

        tracing::debug!(query = %query, hits = hits.len(), "Web search finished");
        Ok(render_results(query, &hits))
    }
}
