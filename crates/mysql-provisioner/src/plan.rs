//! Inputs of a provisioning run

use crate::error::PlanError;
use crate::sql;
use secrecy::SecretString;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Standard MySQL port.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Default upper bound for connecting and for each statement.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and as whom to connect.
///
/// The admin credentials are only used to open the connection. No connection
/// string is ever assembled from them.
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub username: SecretString,
    pub password: SecretString,
}

impl ConnectionTarget {
    pub fn new(host: impl Into<String>, username: SecretString, password: SecretString) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_MYSQL_PORT,
            username,
            password,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `host:port`, safe for diagnostics.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The database and account the provisioner creates.
#[derive(Debug)]
pub struct AppIdentity {
    pub database: String,
    pub user: String,
    /// Host part of the account, `%` for any host
    pub host_pattern: String,
    pub password: SecretString,
}

impl AppIdentity {
    /// Build an identity, validating every name before it reaches SQL.
    pub fn new(
        database: impl Into<String>,
        user: impl Into<String>,
        host_pattern: impl Into<String>,
        password: SecretString,
    ) -> Result<Self, PlanError> {
        let identity = Self {
            database: database.into(),
            user: user.into(),
            host_pattern: host_pattern.into(),
            password,
        };
        sql::validate_database_name(&identity.database)?;
        sql::validate_user_name(&identity.user)?;
        sql::validate_host_pattern(&identity.host_pattern)?;
        Ok(identity)
    }
}

/// How the statements treat objects that already exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisionMode {
    /// Plain CREATE statements; fails on an already-provisioned target
    #[default]
    Strict,
    /// CREATE ... IF NOT EXISTS; re-runs succeed
    IfNotExists,
}

impl FromStr for ProvisionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "if-not-exists" => Ok(Self::IfNotExists),
            other => Err(format!(
                "unknown provision mode '{other}' (expected 'strict' or 'if-not-exists')"
            )),
        }
    }
}

impl fmt::Display for ProvisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::IfNotExists => f.write_str("if-not-exists"),
        }
    }
}

/// What happens to earlier steps when a later one fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop at the first failure. Nothing is retried and nothing is rolled back.
    #[default]
    FailFast,
}

/// Everything one provisioning run needs.
#[derive(Debug)]
pub struct ProvisionPlan {
    pub target: ConnectionTarget,
    pub identity: AppIdentity,
    pub mode: ProvisionMode,
    pub failure_policy: FailurePolicy,
    pub call_timeout: Duration,
}

impl ProvisionPlan {
    pub fn new(target: ConnectionTarget, identity: AppIdentity) -> Self {
        Self {
            target,
            identity,
            mode: ProvisionMode::default(),
            failure_policy: FailurePolicy::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_mode(mut self, mode: ProvisionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}
