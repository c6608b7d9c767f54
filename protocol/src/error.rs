//! Error types for the protocol library.
//!
//! Every fallible operation in the crate returns [`Error`]. None of these are
//! retried internally: they are programming or data errors and surface to the
//! caller immediately. Retry policy belongs to whoever owns the transport.

use thiserror::Error;

use crate::codec::CodecError;

/// Errors raised by serialization, key handling, signing and memo encryption.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed key text, or bytes that are not a valid curve scalar/point.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A key checksum or memo key-material check did not match.
    #[error("checksum mismatch: {0}")]
    ChecksumMismatch(String),

    /// A value could not be written to or read from the wire format.
    ///
    /// `context` is the dotted path of the field or operation that failed,
    /// e.g. `transfer.amount`.
    #[error("serialization error at {context}: {reason}")]
    Serialization {
        /// Field or operation path that failed.
        context: String,
        /// What went wrong.
        reason: String,
    },

    /// Externally supplied signature has the wrong shape or header byte.
    #[error("signature format error: {0}")]
    SignatureFormat(String),

    /// The memo encryption self-check failed in this environment.
    #[error("this environment does not support memo encryption")]
    EnvironmentUnsupported,

    /// A builder session was asked to do something out of order.
    #[error("invalid state: cannot {action} while {state}")]
    InvalidState {
        /// Current session state.
        state: String,
        /// The action that was refused.
        action: String,
    },

    /// Invalid network configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A chain-head source or broadcaster reported a failure.
    #[error("collaborator error: {0}")]
    Collaborator(String),
}

impl Error {
    /// Shorthand for a [`Error::Serialization`] with the given context.
    pub fn serialization(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Serialization {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Prepends a field or operation name to a serialization error's path.
    ///
    /// Non-serialization errors pass through untouched. Nested objects call
    /// this on the way out, so the final path reads outermost first.
    pub fn within(self, name: &str) -> Self {
        match self {
            Self::Serialization { context, reason } => {
                let context = if context.is_empty() {
                    name.to_string()
                } else {
                    format!("{name}.{context}")
                };
                Self::Serialization { context, reason }
            }
            other => other,
        }
    }
}

impl From<CodecError> for Error {
    fn from(err: CodecError) -> Self {
        Self::serialization("", err.to_string())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
