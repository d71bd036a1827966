//! MySQL first-boot provisioning for rds-bootstrap
//!
//! Opens one admin connection and runs, in order:
//!
//! 1. `CREATE DATABASE`
//! 2. `CREATE USER ... IDENTIFIED BY ...`
//! 3. `GRANT ALL PRIVILEGES ON <database>.* TO <user>`
//!
//! The first failing step ends the run with a [`ProvisionError`] naming the
//! step. Completed steps are left in place ([`FailurePolicy::FailFast`]).
//!
//! Passwords never appear in logs or errors: statements carry a redacted
//! rendering for diagnostics and server messages are scrubbed before they are
//! returned.

mod error;
mod executor;
mod plan;
mod provisioner;
mod redact;
mod report;
pub mod sql;

pub use error::{
    PlanError, ProvisionError, ProvisioningStep, StatementError, ER_CANNOT_USER,
    ER_DB_CREATE_EXISTS,
};
pub use executor::{Connector, MySQLConnection, MySQLConnector, StatementExecutor};
pub use plan::{
    AppIdentity, ConnectionTarget, FailurePolicy, ProvisionMode, ProvisionPlan,
    DEFAULT_CALL_TIMEOUT, DEFAULT_MYSQL_PORT,
};
pub use provisioner::provision;
pub use report::{ProvisioningReport, ProvisioningState};
pub use sql::Statement;
