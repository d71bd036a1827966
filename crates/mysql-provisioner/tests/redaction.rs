//! Diagnostics emitted during provisioning must not contain credentials.

use async_trait::async_trait;
use mysql_provisioner::{
    provision, AppIdentity, ConnectionTarget, Connector, ProvisionPlan, ProvisioningStep,
    Statement, StatementError, StatementExecutor,
};
use secrecy::SecretString;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

const ADMIN_PASSWORD: &str = "adm1n-s3cret";
const APP_PASSWORD: &str = "app-pa55word";

/// Collects formatted log lines in memory
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Accepts everything except GRANT, which fails with the statement text echoed back
struct EchoingConnector;

struct EchoingConnection;

#[async_trait]
impl Connector for EchoingConnector {
    type Connection = EchoingConnection;

    async fn connect(&self, _: &ConnectionTarget) -> Result<EchoingConnection, StatementError> {
        Ok(EchoingConnection)
    }
}

#[async_trait]
impl StatementExecutor for EchoingConnection {
    async fn execute(&mut self, statement: &Statement) -> Result<(), StatementError> {
        if statement.step == ProvisioningStep::GrantPrivileges {
            return Err(StatementError::Server {
                code: 1044,
                state: "42000".to_string(),
                message: format!(
                    "Access denied while running [{}] with {APP_PASSWORD} and {ADMIN_PASSWORD}",
                    statement.sql()
                ),
            });
        }
        Ok(())
    }

    async fn close(self) -> Result<(), StatementError> {
        Ok(())
    }
}

fn plan() -> ProvisionPlan {
    let target = ConnectionTarget::new(
        "db.internal",
        SecretString::from("admin"),
        SecretString::from(ADMIN_PASSWORD),
    );
    let identity =
        AppIdentity::new("mydatabase", "myuser", "%", SecretString::from(APP_PASSWORD)).unwrap();
    ProvisionPlan::new(target, identity)
}

#[tokio::test]
async fn test_logs_and_errors_do_not_contain_secrets() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(logs.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let plan = plan();
    let err = provision(&EchoingConnector, &plan).await.unwrap_err();

    assert_eq!(err.step, ProvisioningStep::GrantPrivileges);

    let output = logs.contents();
    // Every step is reported by name
    assert!(output.contains("create-database"), "{output}");
    assert!(output.contains("create-user"), "{output}");
    assert!(output.contains("grant-privileges"), "{output}");
    assert!(output.contains("IDENTIFIED BY '***'"), "{output}");

    for secret in [ADMIN_PASSWORD, APP_PASSWORD] {
        assert!(!output.contains(secret), "log leaked a secret: {output}");
        assert!(!err.to_string().contains(secret));
        assert!(!format!("{err:?}").contains(secret));
        assert!(!format!("{plan:?}").contains(secret));
    }
    assert!(!output.contains("mysql://"));
    assert!(!output.contains("@tcp("));
}
