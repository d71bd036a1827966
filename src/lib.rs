//! rds-bootstrap library
//!
//! First-boot provisioning of a MySQL database and application user.
//!
//! # Flow
//!
//! 1. Resolve the admin username and password from the parameter store
//! 2. Resolve the application user's password, either as a SecureString
//!    parameter or as a KMS ciphertext stored in a parameter
//! 3. Connect to the database host and run CREATE DATABASE, CREATE USER and
//!    GRANT in that order
//!
//! Every failure is returned as a [`BootstrapError`] carrying a distinct exit
//! code (see [`exit`]). Nothing is retried and nothing is rolled back.
//!
//! # CLI Usage
//!
//! ```bash
//! RDS_HOST=db.internal \
//! RDS_USERNAME_SSM_KEY=/app/db/user \
//! RDS_PASSWORD_SSM_KEY=/app/db/password \
//! APP_PASSWORD_CIPHERTEXT_SSM_KEY=/app/db/app-password \
//! rds-bootstrap provision
//! ```

use clap::{ArgGroup, Parser};
use mysql_provisioner::{ProvisionMode, DEFAULT_MYSQL_PORT};
use std::time::Duration;

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod exit;
pub mod testing;

pub use bootstrap::{resolve_parameter, run_provision, Decryption, ResolveOutcome};
pub use error::BootstrapError;

/// Options of the `provision` command, read once at invocation start.
#[derive(Parser, Clone, Debug)]
#[command(group(
    ArgGroup::new("app_password_source")
        .required(true)
        .args(["app_password_ssm_key", "app_password_ciphertext_ssm_key"])
))]
pub struct ProvisionOpts {
    /// Database host
    #[arg(long, env = "RDS_HOST")]
    pub rds_host: String,

    /// Database port
    #[arg(long, env = "RDS_PORT", default_value_t = DEFAULT_MYSQL_PORT)]
    pub rds_port: u16,

    /// Parameter holding the admin username
    #[arg(long, env = "RDS_USERNAME_SSM_KEY")]
    pub rds_username_ssm_key: String,

    /// Parameter holding the admin password
    #[arg(long, env = "RDS_PASSWORD_SSM_KEY")]
    pub rds_password_ssm_key: String,

    /// Database to create
    #[arg(long, env = "APP_DATABASE", default_value = "mydatabase")]
    pub app_database: String,

    /// Application user to create and grant privileges to
    #[arg(long, env = "APP_USERNAME", default_value = "myuser")]
    pub app_username: String,

    /// Host part of the application account
    #[arg(long, env = "APP_USER_HOST", default_value = "%")]
    pub app_user_host: String,

    /// SecureString parameter holding the application user's password
    #[arg(long, env = "APP_PASSWORD_SSM_KEY")]
    pub app_password_ssm_key: Option<String>,

    /// Parameter holding the application user's password as a base64 KMS ciphertext
    #[arg(long, env = "APP_PASSWORD_CIPHERTEXT_SSM_KEY")]
    pub app_password_ciphertext_ssm_key: Option<String>,

    /// Upper bound for each parameter, decrypt, connect and statement call
    /// Format: "500ms", "30s", "2m" or plain seconds
    #[arg(long, env = "CALL_TIMEOUT", default_value = "30s", value_parser = config::parse_duration)]
    pub call_timeout: Duration,

    /// How existing objects are treated: "strict" fails on them, "if-not-exists" skips them
    #[arg(long, env = "PROVISION_MODE", default_value = "strict")]
    pub mode: ProvisionMode,
}

/// Options of the `resolve` command.
#[derive(Parser, Clone, Debug)]
pub struct ResolveOpts {
    /// Parameter name, e.g. /app/db/user
    #[arg(long)]
    pub name: String,

    /// Let the parameter store decrypt a SecureString value
    #[arg(long)]
    pub decrypt: bool,

    /// Decrypt the stored base64 ciphertext with KMS
    #[arg(long, conflicts_with = "decrypt")]
    pub kms: bool,

    /// Upper bound for each parameter and decrypt call
    #[arg(long, env = "CALL_TIMEOUT", default_value = "30s", value_parser = config::parse_duration)]
    pub call_timeout: Duration,
}
