//! Credential resolution for rds-bootstrap
//!
//! Reads named parameters from a parameter store and returns their plaintext
//! values as [`SecretString`]s. Two flavours are supported:
//!
//! - single step: the store decrypts SecureString values itself
//!   (`GetParameter` with `WithDecryption`)
//! - two step: the parameter holds a base64 encoded KMS ciphertext which is
//!   decrypted through a [`KeyDecryptor`]
//!
//! Backends sit behind the [`ParameterStore`] and [`KeyDecryptor`] traits so the
//! AWS implementations can be swapped for the in-memory ones in tests.
//!
//! Resolved values are never logged. Only parameter names appear in diagnostics.

mod error;
mod kms;
mod memory;
mod resolver;
mod ssm;
mod store;

pub use error::{DecryptReason, LookupReason, ResolveError};
pub use kms::KmsDecryptor;
pub use memory::{MemoryDecryptor, MemoryParameterStore};
pub use resolver::{CredentialResolver, DEFAULT_CALL_TIMEOUT};
pub use ssm::SsmParameterStore;
pub use store::{KeyDecryptor, ParameterRef, ParameterStore};

pub use secrecy::{ExposeSecret, SecretString};
