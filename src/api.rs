//! # api: interface to the remote content repository
//!
//! Defines the data shapes the repository's search endpoint returns and the
//! [`ContentApi`] trait the loader calls through. The loader owns a connected
//! handle for its lifetime; the handle performs the real work (query
//! execution, transport, remote caching).
//!
//! ## Interface & Extensibility
//! - Implement [`ContentApi`] to plug in another transport or client.
//! - All methods are async and return boxed errors, so implementation
//!   failures flow through to callers unchanged.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so consumers can generate
//!   deterministic mocks for unit/integration tests (enabled by the
//!   `test-export-mocks` feature).

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::ApiError;
use crate::predicate::Predicate;

/// Opaque JSON document as returned by the remote service.
pub type Document = serde_json::Value;

/// Per-query options forwarded to the search endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Language filter; `*` queries every language.
    pub lang: Option<String>,
    /// 1-based page to fetch.
    pub page: Option<u32>,
    /// Number of documents per page.
    pub page_size: Option<u32>,
    /// Orderings expression, passed through verbatim.
    pub orderings: Option<String>,
}

/// One page of search results, field names as the service reports them.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Document>,
    pub total_pages: u32,
    pub total_results_size: u64,
}

/// Async surface of the remote client consumed by the loader.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Execute a predicate query against the search endpoint. An empty
    /// predicate slice matches every document.
    async fn query<'a>(
        &self,
        predicates: &'a [Predicate],
        options: QueryOptions,
    ) -> Result<QueryResponse, ApiError>;

    /// Resolve a preview token to the previewed document, if any.
    async fn preview_doc<'a>(
        &self,
        token: &'a str,
        document_id: Option<&'a str>,
    ) -> Result<Option<Document>, ApiError>;
}
