//! Client error types.

use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller input rejected before any request was sent.
    #[error(transparent)]
    Protocol(#[from] cdcctl_proto::Error),

    /// The request could not be sent, the service answered with a failure
    /// status where success was required, or the body was not usable.
    #[error("failed to {action}: {message}")]
    Transport {
        /// What was being attempted, including the connector name.
        action: String,
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// Underlying cause.
        message: String,
    },

    /// The client itself could not be configured.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn transport(
        action: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Error::Transport {
            action: action.into(),
            status,
            message: message.into(),
        }
    }

    /// HTTP status attached to a transport error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether the caller's input was rejected.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::Protocol(cdcctl_proto::Error::InvalidArgument(_)))
    }
}
