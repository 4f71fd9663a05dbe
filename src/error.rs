use thiserror::Error;

/// Error raised by the remote client or transport. Boxed so any transport
/// implementation can flow through unchanged; the loader never inspects it.
pub type ApiError = Box<dyn std::error::Error + Send + Sync>;

/// Failures surfaced by the loader itself.
///
/// Remote-call failures are logged once on the configured logger's error
/// channel and then re-raised untouched as [`Error::Api`]. Configuration
/// problems fail fast at construction instead of surfacing as a confusing
/// remote rejection on the first fetch.
#[derive(Debug, Error)]
pub enum Error {
    #[error("access token must not be empty")]
    MissingAccessToken,
    #[error("API endpoint must not be empty")]
    MissingApiEndpoint,
    #[error("loader is not connected, call connect() before fetching")]
    NotConnected,
    #[error("{0}")]
    Api(ApiError),
}

impl From<ApiError> for Error {
    fn from(error: ApiError) -> Self {
        Error::Api(error)
    }
}
