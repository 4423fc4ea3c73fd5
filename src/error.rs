use thiserror::Error;

use crate::api::HttpError;

/// Error surfaced to the host view by every controller operation.
///
/// Unrecognisable report payloads never show up here: the classifier drops
/// them instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Transport failure, no response was received.
    #[error("network error: {0}")]
    Network(String),
    /// 404 for an id that no longer exists server-side.
    #[error("not found: {0}")]
    NotFound(String),
    /// 403, acting on someone else's content.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// 401, or no credential was available for an authenticated call.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// 5xx.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
    /// Any other non-2xx status, or a 2xx body that does not acknowledge the action.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// A review/comment payload that could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// Caller input refused before any request was sent.
    #[error("invalid input: {0}")]
    Validation(String),
    /// Mutation attempted while the list is not `Ready`.
    #[error("report list is not loaded")]
    NotReady,
    /// The response arrived after a newer request for the same target.
    #[error("response for {0} superseded by a newer request")]
    Superseded(String),
    /// The owning view was unmounted; nothing was reconciled.
    #[error("controller unmounted")]
    Unmounted,
    #[error("state lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

impl ClientError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ClientError::Network(_) => 503,
            ClientError::NotFound(_) => 404,
            ClientError::Forbidden(_) => 403,
            ClientError::Unauthorized(_) => 401,
            ClientError::Server { status, .. } => *status,
            ClientError::Rejected { status, .. } => *status,
            ClientError::MalformedResponse(_) => 502,
            ClientError::Validation(_) => 400,
            ClientError::NotReady => 409,
            ClientError::Superseded(_) => 409,
            ClientError::Unmounted => 499,
            ClientError::LockPoisoned(_) => 500,
        }
    }

    /// Whether the host should offer a retry affordance.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_) | ClientError::Server { .. } | ClientError::Superseded(_)
        )
    }
}

impl From<HttpError> for ClientError {
    fn from(err: HttpError) -> Self {
        match err.status {
            None => ClientError::Network(err.message),
            Some(401) => ClientError::Unauthorized(err.message),
            Some(403) => ClientError::Forbidden(err.message),
            Some(404) => ClientError::NotFound(err.message),
            Some(status) if (500..600).contains(&status) => ClientError::Server {
                status,
                message: err.message,
            },
            Some(status) => ClientError::Rejected {
                status,
                message: err.message,
            },
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
