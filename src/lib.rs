//! Convenience loader for a paginated content-repository API.
//!
//! Connect once, then fetch single pages, whole result sets, or predicate
//! queries. Results come back as flat document lists or id-indexed maps,
//! sanitized for embedding in generated script contexts.
//!
//! ```no_run
//! use content_loader::{FetchAllOptions, Loader, LoaderConfig};
//!
//! # async fn run() -> Result<(), content_loader::Error> {
//! let config = LoaderConfig::new("ACCESS-TOKEN", "https://repo.example.com/api/v2");
//! let mut loader = Loader::new(config)?;
//! loader.connect(None).await?;
//! let documents = loader.fetch_all(FetchAllOptions::default()).await?;
//! println!("{} documents", documents.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod loader;
pub mod logger;
pub mod predicate;
pub mod rest;

pub use api::{ContentApi, Document, QueryOptions, QueryResponse};
pub use config::{default_link_resolver, LinkResolver, LoaderConfig};
pub use error::{ApiError, Error};
pub use loader::{escape_doc, FetchAllOptions, Loader, Page};
pub use logger::{Logger, TracingLogger};
pub use predicate::Predicate;
pub use rest::{ConnectOptions, RequestContext, RestApi};

#[cfg(any(test, feature = "test-export-mocks"))]
pub use api::MockContentApi;
