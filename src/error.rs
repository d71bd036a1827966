//! Top-level error type of a bootstrap invocation.

use crate::exit;
use credential_resolver::ResolveError;
use mysql_provisioner::{PlanError, ProvisionError};
use thiserror::Error;

/// Everything that can end an invocation early.
///
/// Library code returns these; only `main` turns them into an exit code.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("configuration error: {0}")]
    Config(String),

    /// LookupFailure or DecryptFailure
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// ProvisioningFailure{step}
    #[error(transparent)]
    Provision(#[from] ProvisionError),
}

impl From<PlanError> for BootstrapError {
    fn from(err: PlanError) -> Self {
        Self::Config(err.to_string())
    }
}

impl BootstrapError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => exit::CONFIG,
            Self::Resolve(ResolveError::Lookup { .. }) => exit::LOOKUP_FAILURE,
            Self::Resolve(ResolveError::Decrypt { .. }) => exit::DECRYPT_FAILURE,
            Self::Provision(err) => exit::for_step(err.step),
        }
    }
}
