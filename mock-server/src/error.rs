use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use wirebind_core::{ApiError, HttpMethod};

/// Failure reported by a mock handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum MockError {
    /// Registration-time: the mock registry cannot route this method.
    #[error("cannot match request {method} /{path}: unsupported method")]
    UnsupportedMethod { method: HttpMethod, path: String },

    #[error("{method} /{path} is already mocked")]
    DuplicateRoute { method: HttpMethod, path: String },

    #[error("no mock handles {method} {target}")]
    NoRoute { method: HttpMethod, target: String },

    /// The typed handler failed; its error is carried through untouched.
    #[error("handler for {operation} failed: {source}")]
    Handler {
        operation: &'static str,
        #[source]
        source: HandlerError,
    },

    #[error(transparent)]
    Codec(#[from] ApiError),

    #[error("handler produced invalid status code {0}")]
    InvalidStatus(u16),

    #[error("invalid response header {0}")]
    InvalidHeader(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Over a socket the only channel back to the caller is the response, so
/// failures become a 500 carrying the error text.
impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "mock responder failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
