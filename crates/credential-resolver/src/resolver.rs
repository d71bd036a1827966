//! Parameter resolution with per-call timeouts

use crate::error::{DecryptReason, LookupReason, ResolveError};
use crate::store::{KeyDecryptor, ParameterRef, ParameterStore};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, info};

/// Default upper bound for a single store or key-management call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves parameter names to plaintext secrets.
///
/// One outbound call per lookup, no retries. Every call is bounded by the
/// configured timeout.
pub struct CredentialResolver<S> {
    store: S,
    call_timeout: Duration,
}

impl<S: ParameterStore> CredentialResolver<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve `name`, letting the store decrypt the value when `decrypt` is set.
    ///
    /// The value is returned exactly as stored.
    pub async fn resolve(&self, name: &str, decrypt: bool) -> Result<SecretString, ResolveError> {
        self.resolve_ref(&ParameterRef::new(name, decrypt)).await
    }

    pub async fn resolve_ref(&self, parameter: &ParameterRef) -> Result<SecretString, ResolveError> {
        let lookup_failure = |reason| ResolveError::Lookup {
            name: parameter.name.clone(),
            reason,
        };

        if parameter.name.is_empty() {
            return Err(lookup_failure(LookupReason::EmptyName));
        }

        debug!(
            "Resolving parameter '{}' from {} (decrypt={})",
            parameter.name,
            self.store.store_type(),
            parameter.decrypt
        );

        let value = tokio::time::timeout(self.call_timeout, self.store.get_parameter(parameter))
            .await
            .map_err(|_| lookup_failure(LookupReason::TimedOut(self.call_timeout)))?
            .map_err(lookup_failure)?;

        info!("Resolved parameter '{}'", parameter.name);
        Ok(value)
    }

    /// Resolve `name` holding a base64 KMS ciphertext and decrypt it with `decryptor`.
    ///
    /// The store is asked for the raw value; decryption happens in a separate
    /// key-management call.
    pub async fn resolve_encrypted<K: KeyDecryptor>(
        &self,
        name: &str,
        decryptor: &K,
    ) -> Result<SecretString, ResolveError> {
        let encoded = self.resolve(name, false).await?;

        let decrypt_failure = |reason| ResolveError::Decrypt {
            name: name.to_string(),
            reason,
        };

        let ciphertext = STANDARD
            .decode(encoded.expose_secret().trim())
            .map_err(|_| decrypt_failure(DecryptReason::InvalidEncoding))?;

        debug!(
            "Decrypting parameter '{}' with {}",
            name,
            decryptor.decryptor_type()
        );

        let plaintext = tokio::time::timeout(self.call_timeout, decryptor.decrypt(ciphertext))
            .await
            .map_err(|_| decrypt_failure(DecryptReason::TimedOut(self.call_timeout)))?
            .map_err(decrypt_failure)?;

        let plaintext = String::from_utf8(plaintext.expose_secret().to_vec())
            .map_err(|_| decrypt_failure(DecryptReason::NotUtf8))?;

        info!("Decrypted parameter '{}'", name);
        Ok(SecretString::from(plaintext))
    }
}
