//! The provisioning sequence
//!
//! ```text
//! connect → CREATE DATABASE → CREATE USER → GRANT → disconnect
//! ```
//!
//! The connection is closed on every exit path. The first failure ends the
//! run; earlier steps are not rolled back and nothing is retried.

use crate::error::{ProvisionError, ProvisioningStep, StatementError};
use crate::executor::{Connector, StatementExecutor};
use crate::plan::ProvisionPlan;
use crate::report::{ProvisioningReport, ProvisioningState};
use crate::sql::provisioning_statements;
use secrecy::ExposeSecret;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Run the provisioning sequence described by `plan`.
pub async fn provision<C: Connector>(
    connector: &C,
    plan: &ProvisionPlan,
) -> Result<ProvisioningReport, ProvisionError> {
    let mut report = ProvisioningReport::new(plan);
    let secrets = [
        plan.identity.password.expose_secret(),
        plan.target.password.expose_secret(),
        plan.target.username.expose_secret(),
    ];

    info!(
        "Provisioning database '{}' and user '{}' on {} (mode: {})",
        plan.identity.database,
        plan.identity.user,
        plan.target.address(),
        plan.mode
    );

    let mut conn = match bounded(plan.call_timeout, connector.connect(&plan.target)).await {
        Ok(conn) => conn,
        Err(cause) => {
            report.transition(ProvisioningState::Failed);
            warn!("Failed to connect to {}", plan.target.address());
            return Err(ProvisionError {
                step: ProvisioningStep::Connect,
                cause: cause.scrub(&secrets),
                completed: Vec::new(),
            });
        }
    };
    report.completed_steps.push(ProvisioningStep::Connect);
    report.transition(ProvisioningState::Provisioning);
    info!("Connected to {}", plan.target.address());

    let outcome = run_statements(&mut conn, plan, &mut report).await;

    match bounded(plan.call_timeout, conn.close()).await {
        Ok(()) => debug!("Closed connection to {}", plan.target.address()),
        Err(e) => warn!(
            "Connection to {} was not closed cleanly: {}",
            plan.target.address(),
            e.scrub(&secrets)
        ),
    }

    match outcome {
        Ok(()) => {
            report.transition(ProvisioningState::Provisioned);
            info!(
                "Provisioned database '{}' for user '{}'",
                plan.identity.database, plan.identity.user
            );
            Ok(report)
        }
        Err((step, cause)) => {
            report.transition(ProvisioningState::Failed);
            let cause = cause.scrub(&secrets);
            warn!("Provisioning step {} failed: {}", step, cause);
            Err(ProvisionError {
                step,
                cause,
                completed: report.completed_steps,
            })
        }
    }
}

async fn run_statements<E: StatementExecutor>(
    conn: &mut E,
    plan: &ProvisionPlan,
    report: &mut ProvisioningReport,
) -> Result<(), (ProvisioningStep, StatementError)> {
    for statement in provisioning_statements(&plan.identity, plan.mode) {
        debug!("Executing {}: {}", statement.step, statement);
        bounded(plan.call_timeout, conn.execute(&statement))
            .await
            .map_err(|e| (statement.step, e))?;
        report.completed_steps.push(statement.step);
        info!("Step {} completed", statement.step);
    }
    Ok(())
}

async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, StatementError>>,
) -> Result<T, StatementError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StatementError::TimedOut(limit))?
}
