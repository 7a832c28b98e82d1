//! Error types for the HTTP client facade.
//!
//! # Design
//! Failures are split by *when* they happen. `ClientError` is returned
//! synchronously from `dispatch` and means nothing was sent. `TransportError`
//! is delivered through the completion callback and carries whatever the
//! engine reported. A received HTTP status, including 4xx and 5xx, is never
//! an error at this layer.

use thiserror::Error;

/// Errors returned synchronously by `dispatch` before any I/O starts.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request's `url` is not an absolute URL.
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The worker thread that runs the request could not be started.
    #[error("failed to start request task: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Failures reported by the engine, delivered through the completion callback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The task was cancelled before the engine produced a result.
    #[error("request cancelled")]
    Cancelled,

    /// The engine gave up waiting for the server.
    #[error("request timed out")]
    TimedOut,

    /// The engine refused the request as built (bad method or header).
    #[error("engine rejected request: {0}")]
    InvalidRequest(String),

    /// Any other failure: DNS, connection refused, TLS, broken body.
    #[error("transport failure: {0}")]
    Failed(String),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(_) => TransportError::TimedOut,
            ureq::Error::Http(e) => TransportError::InvalidRequest(e.to_string()),
            ureq::Error::BadUri(uri) => TransportError::InvalidRequest(format!("bad uri: {uri}")),
            ureq::Error::Protocol(e) if rejects_request(&e) => TransportError::InvalidRequest(e.to_string()),
            other => TransportError::Failed(other.to_string()),
        }
    }
}

/// Protocol errors raised while preparing the outgoing request, as opposed to
/// ones caused by what the server sent back.
fn rejects_request(err: &ureq_proto::Error) -> bool {
    use ureq_proto::Error as P;
    matches!(
        err,
        P::BadHeader(_)
            | P::UnsupportedVersion
            | P::MethodVersionMismatch(..)
            | P::TooManyHostHeaders
            | P::TooManyContentLengthHeaders
            | P::BadHostHeader
            | P::BadAuthorizationHeader
            | P::BadContentLengthHeader
            | P::BodyNotAllowed
    )
}

impl From<ureq::http::Error> for TransportError {
    fn from(err: ureq::http::Error) -> Self {
        TransportError::InvalidRequest(err.to_string())
    }
}
