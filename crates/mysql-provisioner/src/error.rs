//! Error types for MySQL provisioning.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// One step of the provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisioningStep {
    /// Opening the admin connection
    Connect,
    CreateDatabase,
    CreateUser,
    GrantPrivileges,
}

impl ProvisioningStep {
    /// The statements issued after connecting, in execution order.
    pub const STATEMENTS: [ProvisioningStep; 3] = [
        ProvisioningStep::CreateDatabase,
        ProvisioningStep::CreateUser,
        ProvisioningStep::GrantPrivileges,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::CreateDatabase => "create-database",
            Self::CreateUser => "create-user",
            Self::GrantPrivileges => "grant-privileges",
        }
    }
}

impl fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single connection or statement call.
///
/// Messages are scrubbed of secret values before a `StatementError` leaves the
/// provisioner (see [`StatementError::scrub`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatementError {
    /// The server rejected the statement.
    #[error("server error {code} ({state}): {message}")]
    Server {
        code: u16,
        state: String,
        message: String,
    },

    /// Network or protocol failure talking to the server.
    #[error("connection error: {0}")]
    Connection(String),

    /// The call did not complete within the per-call timeout.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

impl StatementError {
    /// MySQL error code, when the server produced one.
    pub fn server_code(&self) -> Option<u16> {
        match self {
            Self::Server { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Replace every occurrence of `secrets` in the error text with `***`.
    pub fn scrub(self, secrets: &[&str]) -> Self {
        match self {
            Self::Server {
                code,
                state,
                message,
            } => Self::Server {
                code,
                state,
                message: crate::redact::scrub(&message, secrets),
            },
            Self::Connection(message) => Self::Connection(crate::redact::scrub(&message, secrets)),
            other => other,
        }
    }
}

impl From<mysql_async::Error> for StatementError {
    fn from(err: mysql_async::Error) -> Self {
        match err {
            mysql_async::Error::Server(server) => Self::Server {
                code: server.code,
                state: server.state,
                message: server.message,
            },
            other => Self::Connection(other.to_string()),
        }
    }
}

/// Errors detected while building a provisioning plan, before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("invalid {kind} '{value}': {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// A provisioning step failed; later steps were not attempted.
///
/// Steps completed before the failure are left in place.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("provisioning failed at step {step}: {cause}")]
pub struct ProvisionError {
    pub step: ProvisioningStep,
    pub cause: StatementError,
    /// Steps that succeeded before `step` failed
    pub completed: Vec<ProvisioningStep>,
}

/// MySQL error code for `CREATE DATABASE` on an existing database.
pub const ER_DB_CREATE_EXISTS: u16 = 1007;

/// MySQL error code for a failed `CREATE USER` (typically a duplicate user).
pub const ER_CANNOT_USER: u16 = 1396;

impl ProvisionError {
    /// True when the target had already been provisioned by an earlier run.
    pub fn is_already_provisioned(&self) -> bool {
        matches!(
            (self.step, self.cause.server_code()),
            (ProvisioningStep::CreateDatabase, Some(ER_DB_CREATE_EXISTS))
                | (ProvisioningStep::CreateUser, Some(ER_CANNOT_USER))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        let names: Vec<_> = ProvisioningStep::STATEMENTS
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, ["create-database", "create-user", "grant-privileges"]);
    }

    #[test]
    fn test_already_provisioned_detection() {
        let err = ProvisionError {
            step: ProvisioningStep::CreateDatabase,
            cause: StatementError::Server {
                code: ER_DB_CREATE_EXISTS,
                state: "HY000".to_string(),
                message: "Can't create database 'mydatabase'; database exists".to_string(),
            },
            completed: vec![ProvisioningStep::Connect],
        };
        assert!(err.is_already_provisioned());

        let err = ProvisionError {
            step: ProvisioningStep::GrantPrivileges,
            cause: StatementError::Connection("broken pipe".to_string()),
            completed: vec![],
        };
        assert!(!err.is_already_provisioned());
    }
}
