//! Outcome of a provisioning run

use crate::error::ProvisioningStep;
use crate::plan::{FailurePolicy, ProvisionMode, ProvisionPlan};
use serde::Serialize;

/// Lifecycle of the provisioning target as seen by one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisioningState {
    Unprovisioned,
    Provisioning,
    Provisioned,
    Failed,
}

/// Summary of a run. Contains names only, never credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisioningReport {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub mode: ProvisionMode,
    pub failure_policy: FailurePolicy,
    pub completed_steps: Vec<ProvisioningStep>,
    pub state: ProvisioningState,
}

impl ProvisioningReport {
    pub(crate) fn new(plan: &ProvisionPlan) -> Self {
        Self {
            host: plan.target.host.clone(),
            port: plan.target.port,
            database: plan.identity.database.clone(),
            user: plan.identity.user.clone(),
            mode: plan.mode,
            failure_policy: plan.failure_policy,
            completed_steps: Vec::new(),
            state: ProvisioningState::Unprovisioned,
        }
    }

    pub(crate) fn transition(&mut self, state: ProvisioningState) {
        tracing::debug!("Provisioning state: {:?} -> {:?}", self.state, state);
        self.state = state;
    }
}
