//! End-to-end wiring tests with in-memory parameter store, KMS and database.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::Parser;
use credential_resolver::{
    CredentialResolver, ExposeSecret, LookupReason, MemoryDecryptor, MemoryParameterStore,
    ParameterRef, ResolveError,
};
use mysql_provisioner::{
    ConnectionTarget, Connector, ProvisionMode, ProvisioningState, ProvisioningStep, Statement,
    StatementError, StatementExecutor,
};
use rds_bootstrap::{exit, BootstrapError, Decryption, ProvisionOpts, ResolveOpts};
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

#[derive(Default)]
struct Recorded {
    targets: Vec<(String, String)>,
    statements: Vec<String>,
}

/// Connector accepting every statement and recording what it saw
#[derive(Clone, Default)]
struct RecordingConnector(Arc<Mutex<Recorded>>);

struct RecordingConnection(Arc<Mutex<Recorded>>);

#[async_trait]
impl Connector for RecordingConnector {
    type Connection = RecordingConnection;

    async fn connect(&self, target: &ConnectionTarget) -> Result<RecordingConnection, StatementError> {
        self.0.lock().unwrap().targets.push((
            target.address(),
            target.username.expose_secret().to_string(),
        ));
        Ok(RecordingConnection(self.0.clone()))
    }
}

#[async_trait]
impl StatementExecutor for RecordingConnection {
    async fn execute(&mut self, statement: &Statement) -> Result<(), StatementError> {
        self.0
            .lock()
            .unwrap()
            .statements
            .push(statement.sql().to_string());
        Ok(())
    }

    async fn close(self) -> Result<(), StatementError> {
        Ok(())
    }
}

fn opts(extra: &[&str]) -> ProvisionOpts {
    let mut args = vec![
        "provision",
        "--rds-host",
        "db.internal",
        "--rds-username-ssm-key",
        "/app/db/user",
        "--rds-password-ssm-key",
        "/app/db/password",
    ];
    args.extend_from_slice(extra);
    ProvisionOpts::try_parse_from(args).unwrap()
}

fn store() -> MemoryParameterStore {
    MemoryParameterStore::new()
        .with_parameter("/app/db/user", "alice")
        .with_parameter("/app/db/password", "s3cret")
        .with_parameter("/app/db/app-password", "app-pw")
}

#[tokio::test]
async fn test_provision_with_store_decrypted_app_password() {
    let opts = opts(&["--app-password-ssm-key", "/app/db/app-password"]);
    let resolver = CredentialResolver::new(store());
    let connector = RecordingConnector::default();

    let report = assert_ok!(
        rds_bootstrap::run_provision(&opts, &resolver, &MemoryDecryptor::new(), &connector).await
    );

    assert_eq!(report.state, ProvisioningState::Provisioned);
    assert_eq!(report.host, "db.internal");
    assert_eq!(report.port, 3306);
    assert_eq!(report.mode, ProvisionMode::Strict);

    // Username first, then password, then the application password
    assert_eq!(
        resolver.store().calls(),
        vec![
            ParameterRef::decrypted("/app/db/user"),
            ParameterRef::decrypted("/app/db/password"),
            ParameterRef::decrypted("/app/db/app-password"),
        ]
    );

    let recorded = connector.0.lock().unwrap();
    assert_eq!(
        recorded.targets,
        vec![("db.internal:3306".to_string(), "alice".to_string())]
    );
    assert_eq!(
        recorded.statements,
        vec![
            "CREATE DATABASE `mydatabase`".to_string(),
            "CREATE USER 'myuser'@'%' IDENTIFIED BY 'app-pw'".to_string(),
            "GRANT ALL PRIVILEGES ON `mydatabase`.* TO 'myuser'@'%'".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_provision_with_kms_encrypted_app_password() {
    let ciphertext = b"kms-envelope".to_vec();
    let store = store().with_parameter("/app/db/app-password.enc", STANDARD.encode(&ciphertext));
    let kms = MemoryDecryptor::new().with_ciphertext(ciphertext, "from-kms");
    let opts = opts(&[
        "--app-password-ciphertext-ssm-key",
        "/app/db/app-password.enc",
        "--app-database",
        "orders",
        "--app-username",
        "orders_svc",
        "--mode",
        "if-not-exists",
    ]);
    let resolver = CredentialResolver::new(store);
    let connector = RecordingConnector::default();

    let report = assert_ok!(rds_bootstrap::run_provision(&opts, &resolver, &kms, &connector).await);

    assert_eq!(report.database, "orders");
    assert_eq!(report.user, "orders_svc");
    assert_eq!(
        connector.0.lock().unwrap().statements[1],
        "CREATE USER IF NOT EXISTS 'orders_svc'@'%' IDENTIFIED BY 'from-kms'"
    );
}

#[tokio::test]
async fn test_missing_parameter_never_provisions() {
    let store = MemoryParameterStore::new().with_parameter("/app/db/password", "s3cret");
    let mut opts = opts(&["--app-password-ssm-key", "/app/db/app-password"]);
    opts.rds_username_ssm_key = "/app/db/missing".to_string();
    let resolver = CredentialResolver::new(store);
    let connector = RecordingConnector::default();

    let err = assert_err!(
        rds_bootstrap::run_provision(&opts, &resolver, &MemoryDecryptor::new(), &connector).await
    );

    match &err {
        BootstrapError::Resolve(ResolveError::Lookup { name, reason }) => {
            assert_eq!(name, "/app/db/missing");
            assert_eq!(*reason, LookupReason::NotFound);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), exit::LOOKUP_FAILURE);
    assert!(connector.0.lock().unwrap().targets.is_empty());
    // Resolution stops at the first failure
    assert_eq!(resolver.store().calls().len(), 1);
}

#[tokio::test]
async fn test_undecryptable_app_password_is_decrypt_failure() {
    let store = store().with_parameter("/app/db/app-password.enc", STANDARD.encode(b"unknown"));
    let opts = opts(&["--app-password-ciphertext-ssm-key", "/app/db/app-password.enc"]);
    let resolver = CredentialResolver::new(store);
    let connector = RecordingConnector::default();

    let err = assert_err!(
        rds_bootstrap::run_provision(&opts, &resolver, &MemoryDecryptor::new(), &connector).await
    );

    assert_eq!(err.exit_code(), exit::DECRYPT_FAILURE);
    assert!(connector.0.lock().unwrap().targets.is_empty());
}

#[tokio::test]
async fn test_invalid_app_identity_is_config_error() {
    let opts = opts(&[
        "--app-password-ssm-key",
        "/app/db/app-password",
        "--app-database",
        "bad`name",
    ]);
    let resolver = CredentialResolver::new(store());
    let connector = RecordingConnector::default();

    let err = assert_err!(
        rds_bootstrap::run_provision(&opts, &resolver, &MemoryDecryptor::new(), &connector).await
    );

    assert_eq!(err.exit_code(), exit::CONFIG);
    assert!(connector.0.lock().unwrap().targets.is_empty());
}

#[test]
fn test_app_password_source_is_required_and_exclusive() {
    let base = [
        "provision",
        "--rds-host",
        "db.internal",
        "--rds-username-ssm-key",
        "/app/db/user",
        "--rds-password-ssm-key",
        "/app/db/password",
    ];
    assert!(ProvisionOpts::try_parse_from(base).is_err());

    let both = base.iter().copied().chain([
        "--app-password-ssm-key",
        "/a",
        "--app-password-ciphertext-ssm-key",
        "/b",
    ]);
    assert!(ProvisionOpts::try_parse_from(both).is_err());
}

#[test]
fn test_provision_defaults() {
    let opts = opts(&["--app-password-ssm-key", "/app/db/app-password"]);
    assert_eq!(opts.rds_port, 3306);
    assert_eq!(opts.app_database, "mydatabase");
    assert_eq!(opts.app_username, "myuser");
    assert_eq!(opts.app_user_host, "%");
    assert_eq!(opts.call_timeout, std::time::Duration::from_secs(30));
    assert_eq!(opts.mode, ProvisionMode::Strict);
}

#[tokio::test]
async fn test_resolve_command_reports_without_value() {
    let opts = ResolveOpts::try_parse_from(["resolve", "--name", "/app/db/user"]).unwrap();
    let resolver = CredentialResolver::new(store());

    let outcome = assert_ok!(
        rds_bootstrap::resolve_parameter(&opts, &resolver, &MemoryDecryptor::new()).await
    );

    assert_eq!(outcome.decryption, Decryption::None);
    assert!(outcome.resolved);
    let json = serde_json::to_string(&outcome).unwrap();
    assert!(!json.contains("alice"));
}

#[tokio::test]
async fn test_resolve_command_missing_parameter() {
    let opts =
        ResolveOpts::try_parse_from(["resolve", "--name", "/app/db/missing", "--decrypt"]).unwrap();
    let resolver = CredentialResolver::new(store());

    let err = assert_err!(
        rds_bootstrap::resolve_parameter(&opts, &resolver, &MemoryDecryptor::new()).await
    );
    assert_eq!(err.exit_code(), exit::LOOKUP_FAILURE);
}

#[test]
fn test_every_step_has_its_own_exit_code() {
    let codes: Vec<i32> = [
        ProvisioningStep::Connect,
        ProvisioningStep::CreateDatabase,
        ProvisioningStep::CreateUser,
        ProvisioningStep::GrantPrivileges,
    ]
    .into_iter()
    .map(exit::for_step)
    .collect();
    assert_eq!(codes, vec![20, 21, 22, 23]);
}

#[test]
fn test_success_exit_code_is_distinct_from_failures() {
    let failures = [
        exit::INTERNAL,
        exit::CONFIG,
        exit::LOOKUP_FAILURE,
        exit::DECRYPT_FAILURE,
        exit::CONNECT_FAILURE,
        exit::CREATE_DATABASE_FAILURE,
        exit::CREATE_USER_FAILURE,
        exit::GRANT_FAILURE,
    ];
    assert_eq!(exit::SUCCESS, 0);
    assert!(!failures.contains(&exit::SUCCESS));
}
