//! Error types for the search proxy.

use search_federation::FederationError;

/// Top-level error type for the proxy service.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Validation or orchestration failure from the search engine.
    #[error(transparent)]
    Federation(#[from] FederationError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// HTTP server error (bind, accept loop).
    #[error("server error: {0}")]
    Server(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxyError {
    /// Whether the caller sent a bad request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Federation(e) if e.is_client_error())
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ProxyError>;
