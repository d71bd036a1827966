//! In-memory backends
//!
//! Used by tests.

use crate::error::{DecryptReason, LookupReason};
use crate::store::{KeyDecryptor, ParameterRef, ParameterStore};
use async_trait::async_trait;
use secrecy::{SecretSlice, SecretString};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Clone)]
enum Entry {
    Value(String),
    Denied,
}

/// Parameter store holding its values in a map.
///
/// Every lookup is recorded so tests can assert which parameters were read and
/// with which decrypt flag.
#[derive(Default)]
pub struct MemoryParameterStore {
    entries: HashMap<String, Entry>,
    calls: Mutex<Vec<ParameterRef>>,
}

impl MemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `name`.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(name.into(), Entry::Value(value.into()));
        self
    }

    /// Make lookups of `name` fail with access denied.
    pub fn with_denied(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), Entry::Denied);
        self
    }

    /// Lookups performed so far, in order.
    pub fn calls(&self) -> Vec<ParameterRef> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    fn store_type(&self) -> &'static str {
        "memory"
    }

    async fn get_parameter(&self, parameter: &ParameterRef) -> Result<SecretString, LookupReason> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(parameter.clone());
        }

        match self.entries.get(&parameter.name) {
            Some(Entry::Value(value)) => Ok(SecretString::from(value.clone())),
            Some(Entry::Denied) => Err(LookupReason::AccessDenied(format!(
                "not authorized to read {}",
                parameter.name
            ))),
            None => Err(LookupReason::NotFound),
        }
    }
}

/// Key decryptor mapping known ciphertexts to plaintexts.
#[derive(Default)]
pub struct MemoryDecryptor {
    keys: HashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryDecryptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ciphertext` as decrypting to `plaintext`.
    pub fn with_ciphertext(
        mut self,
        ciphertext: impl Into<Vec<u8>>,
        plaintext: impl Into<Vec<u8>>,
    ) -> Self {
        self.keys.insert(ciphertext.into(), plaintext.into());
        self
    }
}

#[async_trait]
impl KeyDecryptor for MemoryDecryptor {
    fn decryptor_type(&self) -> &'static str {
        "memory"
    }

    async fn decrypt(&self, ciphertext: Vec<u8>) -> Result<SecretSlice<u8>, DecryptReason> {
        self.keys
            .get(&ciphertext)
            .map(|plaintext| SecretSlice::from(plaintext.clone()))
            .ok_or_else(|| DecryptReason::Rejected("InvalidCiphertextException".to_string()))
    }
}
