//! Error taxonomy for console operations.

use onlyconfig_storage::StorageError;

/// All errors a console operation can resolve to.
///
/// None of them is fatal: pages turn [`Unauthorized`](Self::Unauthorized)
/// into a logout redirect and everything else into a user-facing alert.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// The backend answered 401; the session is no longer valid.
    #[error("unauthorized")]
    Unauthorized,

    /// Any other non-200 answer, or the request never completed.
    #[error("request failed: {message}")]
    RequestFailed {
        /// HTTP status, `None` for transport failures.
        status: Option<u16>,
        /// Short description of what went wrong.
        message: String,
    },

    /// A client-side check rejected the input; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// The session record could not be persisted or removed.
    #[error("session storage error: {0}")]
    Session(#[from] StorageError),
}

impl ConsoleError {
    /// Whether this error means the session must be dropped.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// HTTP status carried by a failed request, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => *status,
            Self::Unauthorized => Some(401),
            _ => None,
        }
    }

    pub(crate) fn http(status: u16) -> Self {
        Self::RequestFailed {
            status: Some(status),
            message: format!("HTTP {status}"),
        }
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(e: reqwest::Error) -> Self {
        Self::RequestFailed {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(e: serde_json::Error) -> Self {
        Self::RequestFailed {
            status: None,
            message: format!("invalid JSON: {e}"),
        }
    }
}
