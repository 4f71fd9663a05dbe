//! Loader configuration: connection settings plus the capabilities (link
//! resolver, logger) the loader uses while serving results.

use std::fmt;
use std::sync::Arc;

use crate::api::Document;
use crate::error::Error;
use crate::logger::{default_logger, Logger};

/// Maps a document to a human-navigable path. Used for general link
/// generation and for preview-token resolution.
pub type LinkResolver = Arc<dyn Fn(&Document) -> String + Send + Sync>;

/// Default resolver: the document's `uid`, or `/` when it has none.
pub fn default_link_resolver(doc: &Document) -> String {
    doc.get("uid")
        .and_then(|uid| uid.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| "/".to_string())
}

/// Immutable connection configuration. Construct once and hand it to
/// [`Loader::new`](crate::loader::Loader::new), which validates it.
#[derive(Clone)]
pub struct LoaderConfig {
    /// Access token used to authenticate against the repository API.
    pub access_token: String,
    /// Repository API endpoint, e.g. `https://repo.example.com/api/v2`.
    pub api_endpoint: String,
    /// Resolver used to turn documents into paths.
    pub link_resolver: LinkResolver,
    /// Sink for the loader's informational and error reporting.
    pub logger: Arc<dyn Logger>,
}

impl fmt::Debug for LoaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The token is a secret; only its length is loggable.
        f.debug_struct("LoaderConfig")
            .field("access_token_len", &self.access_token.len())
            .field("api_endpoint", &self.api_endpoint)
            .finish_non_exhaustive()
    }
}

impl LoaderConfig {
    /// Configuration with the default link resolver and a `tracing`-backed
    /// logger.
    pub fn new(access_token: impl Into<String>, api_endpoint: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_endpoint: api_endpoint.into(),
            link_resolver: Arc::new(default_link_resolver),
            logger: default_logger(),
        }
    }

    /// Reads `CONTENT_API_ACCESS_TOKEN` and `CONTENT_API_ENDPOINT`, loading
    /// a `.env` file first when present.
    pub fn from_env() -> Result<Self, Error> {
        dotenvy::dotenv().ok();
        let access_token =
            std::env::var("CONTENT_API_ACCESS_TOKEN").map_err(|_| Error::MissingAccessToken)?;
        let api_endpoint =
            std::env::var("CONTENT_API_ENDPOINT").map_err(|_| Error::MissingApiEndpoint)?;
        Ok(Self::new(access_token, api_endpoint))
    }

    pub fn with_link_resolver(mut self, link_resolver: LinkResolver) -> Self {
        self.link_resolver = link_resolver;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Fail fast on settings the remote service would otherwise reject much
    /// later, at the first fetch.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.access_token.trim().is_empty() {
            return Err(Error::MissingAccessToken);
        }
        if self.api_endpoint.trim().is_empty() {
            return Err(Error::MissingApiEndpoint);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_resolver_returns_uid() {
        let doc = json!({"id": "X1", "uid": "about-us"});
        assert_eq!(default_link_resolver(&doc), "about-us");
    }

    #[test]
    fn default_resolver_falls_back_to_root() {
        assert_eq!(default_link_resolver(&json!({"id": "X1"})), "/");
        assert_eq!(default_link_resolver(&json!({"uid": 42})), "/");
    }

    #[test]
    fn validate_rejects_empty_token() {
        let config = LoaderConfig::new("", "https://repo.example.com/api/v2");
        assert!(matches!(config.validate(), Err(Error::MissingAccessToken)));
    }

    #[test]
    fn validate_rejects_blank_endpoint() {
        let config = LoaderConfig::new("token", "   ");
        assert!(matches!(config.validate(), Err(Error::MissingApiEndpoint)));
    }

    #[test]
    fn validate_accepts_complete_config() {
        let config = LoaderConfig::new("token", "https://repo.example.com/api/v2");
        assert!(config.validate().is_ok());
    }
}
