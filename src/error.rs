//! Error taxonomy shared by every layer of the client.

use http::StatusCode;
use thiserror::Error;

/// Why an operation was refused for lack of a valid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    /// No token was stored when the operation started.
    NoToken,
    /// The server answered 401; the stored session has been cleared.
    SessionInvalidated,
    /// The token is not one the session backend recognises.
    TokenRejected,
}

impl std::fmt::Display for UnauthenticatedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnauthenticatedReason::NoToken => f.write_str("no authentication token found"),
            UnauthenticatedReason::SessionInvalidated => {
                f.write_str("session expired, please log in again")
            }
            UnauthenticatedReason::TokenRejected => f.write_str("authentication token rejected"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("{0}")]
    Auth(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(UnauthenticatedReason),

    #[error("access denied: {0}")]
    Unauthorized(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid response payload: {0}")]
    Decode(String),
}

impl Error {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Unauthenticated(_))
    }

    /// HTTP status attached to the failure, if the server produced one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Unauthenticated(UnauthenticatedReason::SessionInvalidated) => {
                Some(StatusCode::UNAUTHORIZED)
            }
            Error::Network(e) => e.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
