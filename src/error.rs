use axum::response::{IntoResponse, Response};
use http::StatusCode;
use std::io;

/// Boxed error type carried by user-supplied filter predicates and template
/// callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Terminal failures of the listing pipeline, each carrying the HTTP status
/// the hosting pipeline should render.
///
/// Not-found and not-a-directory conditions are deliberately *not* in this
/// taxonomy: they fall through to the next handler in the chain instead of
/// producing a response here.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The request path failed to percent-decode or contained a NUL byte.
    #[error("malformed request path")]
    BadRequest,

    /// The resolved path escaped the served root.
    #[error("path is outside the served root")]
    Forbidden,

    /// None of the offered representations matched the `Accept` header.
    #[error("no acceptable representation")]
    NotAcceptable,

    /// The resolved path exceeded the filesystem's name limits.
    #[error("resolved path is too long")]
    PathTooLong,

    /// A user-supplied filter predicate failed.
    #[error("filter predicate failed: {0}")]
    Predicate(#[source] BoxError),

    /// A user-supplied template callback failed.
    #[error("template rendering failed: {0}")]
    Template(#[source] BoxError),

    /// Any other filesystem failure.
    #[error("filesystem error: {0}")]
    Io(#[from] io::Error),
}

impl IndexError {
    pub fn status(&self) -> StatusCode {
        match self {
            IndexError::BadRequest => StatusCode::BAD_REQUEST,
            IndexError::Forbidden => StatusCode::FORBIDDEN,
            IndexError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            IndexError::PathTooLong => StatusCode::URI_TOO_LONG,
            IndexError::Predicate(_) | IndexError::Template(_) | IndexError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for IndexError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(%status, error = %self, "directory index request failed");
        (status, self.to_string()).into_response()
    }
}
