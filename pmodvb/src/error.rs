//! Error types for the DVB daemon source

use pmosource::SourceError;
use std::time::Duration;

/// Result type alias for DVB daemon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the DVB daemon
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bus unreachable or proxy construction failed
    #[error("Cannot reach the DVB daemon: {0}")]
    Transport(String),

    /// The daemon answered a call with a fault
    #[error("{method} failed: {message}")]
    Rpc {
        method: &'static str,
        message: String,
    },

    /// A call got no answer in time
    #[error("{method} timed out after {after:?}")]
    Timeout {
        method: &'static str,
        after: Duration,
    },

    /// The request was cancelled before a call could be dispatched
    #[error("Browse cancelled")]
    Cancelled,

    /// Configuration error (from pmoconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an RPC error for `method`
    pub fn rpc(method: &'static str, msg: impl ToString) -> Self {
        Self::Rpc {
            method,
            message: msg.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<Error> for SourceError {
    fn from(err: Error) -> Self {
        match err {
            Error::Transport(_) => SourceError::SourceUnavailable(err.to_string()),
            Error::Rpc { .. } | Error::Timeout { .. } => SourceError::Remote(err.to_string()),
            Error::Cancelled | Error::Config(_) => SourceError::BrowseError(err.to_string()),
        }
    }
}

/// Advertised device-group count disagreeing with the enumerated paths.
///
/// Not fatal: the enumerated list wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("daemon advertises {advertised} device groups but enumerated {actual}")]
pub struct CountMismatch {
    pub advertised: u32,
    pub actual: usize,
}
