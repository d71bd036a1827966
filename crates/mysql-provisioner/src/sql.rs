//! Statement generation for the provisioning sequence.

use crate::error::{PlanError, ProvisioningStep};
use crate::plan::{AppIdentity, ProvisionMode};
use crate::redact::REDACTED;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Longest database name MySQL accepts.
pub const MAX_DATABASE_NAME_LEN: usize = 64;

/// Longest user name MySQL 5.7+ accepts.
pub const MAX_USER_NAME_LEN: usize = 32;

/// A statement of the provisioning sequence.
///
/// The executable text may embed a password, so it is kept secret; `Display`
/// and `Debug` show the redacted form.
pub struct Statement {
    pub step: ProvisioningStep,
    sql: SecretString,
    redacted: String,
}

impl Statement {
    fn public(step: ProvisioningStep, sql: String) -> Self {
        Self {
            step,
            redacted: sql.clone(),
            sql: SecretString::from(sql),
        }
    }

    /// The text sent to the server.
    pub fn sql(&self) -> &str {
        self.sql.expose_secret()
    }

    /// The text safe for diagnostics.
    pub fn redacted(&self) -> &str {
        &self.redacted
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted)
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("step", &self.step)
            .field("sql", &self.redacted)
            .finish()
    }
}

/// Check a database name for use as a backtick-quoted identifier.
pub fn validate_database_name(name: &str) -> Result<(), PlanError> {
    validate(name, "database name", MAX_DATABASE_NAME_LEN, |c| {
        c.is_ascii_alphanumeric() || c == '_' || c == '$'
    })
}

/// Check a user name for use inside a quoted account name.
pub fn validate_user_name(name: &str) -> Result<(), PlanError> {
    validate(name, "user name", MAX_USER_NAME_LEN, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
    })
}

/// Check the host part of an account name (`%`, `10.0.%`, `app.internal`).
pub fn validate_host_pattern(pattern: &str) -> Result<(), PlanError> {
    validate(pattern, "host pattern", 255, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '%' | ':')
    })
}

fn validate(
    value: &str,
    kind: &'static str,
    max_len: usize,
    allowed: impl Fn(char) -> bool,
) -> Result<(), PlanError> {
    if value.is_empty() {
        return Err(PlanError::Empty(kind));
    }
    if value.len() > max_len {
        return Err(PlanError::InvalidIdentifier {
            kind,
            value: value.to_string(),
            reason: "too long",
        });
    }
    if !value.chars().all(allowed) {
        return Err(PlanError::InvalidIdentifier {
            kind,
            value: value.to_string(),
            reason: "contains unsupported characters",
        });
    }
    Ok(())
}

/// Escape a value for use inside a single-quoted MySQL string literal.
///
/// Uses backslash escapes, so the server must not run with the
/// `NO_BACKSLASH_ESCAPES` SQL mode (it is off in the MySQL and RDS defaults).
pub fn escape_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            c => out.push(c),
        }
    }
    out
}

/// Generate CREATE DATABASE statement.
pub fn create_database(identity: &AppIdentity, mode: ProvisionMode) -> Statement {
    let if_not_exists = match mode {
        ProvisionMode::Strict => "",
        ProvisionMode::IfNotExists => "IF NOT EXISTS ",
    };
    Statement::public(
        ProvisioningStep::CreateDatabase,
        format!("CREATE DATABASE {if_not_exists}`{}`", identity.database),
    )
}

/// Generate CREATE USER statement.
pub fn create_user(identity: &AppIdentity, mode: ProvisionMode) -> Statement {
    let if_not_exists = match mode {
        ProvisionMode::Strict => "",
        ProvisionMode::IfNotExists => "IF NOT EXISTS ",
    };
    let account = format!("'{}'@'{}'", identity.user, identity.host_pattern);
    let password = escape_string_literal(identity.password.expose_secret());

    Statement {
        step: ProvisioningStep::CreateUser,
        sql: SecretString::from(format!(
            "CREATE USER {if_not_exists}{account} IDENTIFIED BY '{password}'"
        )),
        redacted: format!("CREATE USER {if_not_exists}{account} IDENTIFIED BY '{REDACTED}'"),
    }
}

/// Generate GRANT statement.
pub fn grant_privileges(identity: &AppIdentity) -> Statement {
    Statement::public(
        ProvisioningStep::GrantPrivileges,
        format!(
            "GRANT ALL PRIVILEGES ON `{}`.* TO '{}'@'{}'",
            identity.database, identity.user, identity.host_pattern
        ),
    )
}

/// The three statements in execution order.
pub fn provisioning_statements(identity: &AppIdentity, mode: ProvisionMode) -> [Statement; 3] {
    [
        create_database(identity, mode),
        create_user(identity, mode),
        grant_privileges(identity),
    ]
}
