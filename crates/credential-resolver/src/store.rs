//! Backend traits for parameter lookups and key-management decryption.

use crate::error::{DecryptReason, LookupReason};
use async_trait::async_trait;
use secrecy::{SecretSlice, SecretString};

/// A named lookup key into the parameter store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterRef {
    /// Parameter name, e.g. `/app/db/user`
    pub name: String,
    /// Ask the store to decrypt SecureString values before returning them
    pub decrypt: bool,
}

impl ParameterRef {
    pub fn new(name: impl Into<String>, decrypt: bool) -> Self {
        Self {
            name: name.into(),
            decrypt,
        }
    }

    /// A reference whose stored value is returned as-is.
    pub fn plain(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    /// A reference decrypted transparently by the store.
    pub fn decrypted(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }
}

/// A key-value store for configuration and secrets.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Short identifier of the backend, used in diagnostics.
    fn store_type(&self) -> &'static str;

    /// Fetch one parameter. Implementations must return the stored value verbatim.
    async fn get_parameter(&self, parameter: &ParameterRef) -> Result<SecretString, LookupReason>;
}

/// An envelope-encryption service able to decrypt ciphertext blobs.
#[async_trait]
pub trait KeyDecryptor: Send + Sync {
    /// Short identifier of the backend, used in diagnostics.
    fn decryptor_type(&self) -> &'static str;

    async fn decrypt(&self, ciphertext: Vec<u8>) -> Result<SecretSlice<u8>, DecryptReason>;
}
