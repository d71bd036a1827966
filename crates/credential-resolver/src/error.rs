//! Error types for credential resolution.

use std::time::Duration;
use thiserror::Error;

/// Why a parameter lookup failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupReason {
    /// The parameter name was empty.
    #[error("parameter name is empty")]
    EmptyName,

    /// The parameter does not exist in the store.
    #[error("parameter not found")]
    NotFound,

    /// The caller is not allowed to read (or decrypt) the parameter.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The store answered but the response carried no value.
    #[error("parameter has no value")]
    MissingValue,

    /// The store could not be reached or returned an unexpected error.
    #[error("transport error: {0}")]
    Transport(String),

    /// The lookup did not complete within the per-call timeout.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// Why decrypting a ciphertext blob failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecryptReason {
    /// The stored blob is not valid base64.
    #[error("ciphertext is not valid base64")]
    InvalidEncoding,

    /// The key-management service rejected the ciphertext.
    #[error("ciphertext rejected: {0}")]
    Rejected(String),

    /// The key-management service could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered without a plaintext.
    #[error("response has no plaintext")]
    MissingPlaintext,

    /// The plaintext is not valid UTF-8.
    #[error("plaintext is not valid UTF-8")]
    NotUtf8,

    /// The decrypt call did not complete within the per-call timeout.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// Errors returned by [`crate::CredentialResolver`].
///
/// Neither variant ever carries the resolved value or the ciphertext.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Parameter not found, access denied, or transport error during lookup.
    #[error("lookup of parameter '{name}' failed: {reason}")]
    Lookup { name: String, reason: LookupReason },

    /// The key-management decrypt step failed.
    #[error("decryption of parameter '{name}' failed: {reason}")]
    Decrypt { name: String, reason: DecryptReason },
}

impl ResolveError {
    /// Name of the parameter the failure relates to.
    pub fn parameter_name(&self) -> &str {
        match self {
            Self::Lookup { name, .. } | Self::Decrypt { name, .. } => name,
        }
    }
}
