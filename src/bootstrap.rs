//! Entry point wiring: resolve credentials, then provision.

use crate::error::BootstrapError;
use crate::{ProvisionOpts, ResolveOpts};
use credential_resolver::{CredentialResolver, KeyDecryptor, ParameterStore, SecretString};
use mysql_provisioner::{
    provision, AppIdentity, ConnectionTarget, Connector, ProvisionPlan, ProvisioningReport,
};
use serde::Serialize;
use tracing::info;

/// Run the full first-boot sequence.
///
/// Parameters are resolved one after another; the connector is only used once
/// every credential resolved.
pub async fn run_provision<S, K, C>(
    opts: &ProvisionOpts,
    resolver: &CredentialResolver<S>,
    decryptor: &K,
    connector: &C,
) -> Result<ProvisioningReport, BootstrapError>
where
    S: ParameterStore,
    K: KeyDecryptor,
    C: Connector,
{
    if opts.rds_host.is_empty() {
        return Err(BootstrapError::Config("RDS host must not be empty".to_string()));
    }

    let username = resolver.resolve(&opts.rds_username_ssm_key, true).await?;
    let password = resolver.resolve(&opts.rds_password_ssm_key, true).await?;
    let app_password = resolve_app_password(opts, resolver, decryptor).await?;

    let identity = AppIdentity::new(
        opts.app_database.clone(),
        opts.app_username.clone(),
        opts.app_user_host.clone(),
        app_password,
    )?;
    let target =
        ConnectionTarget::new(opts.rds_host.clone(), username, password).with_port(opts.rds_port);
    let plan = ProvisionPlan::new(target, identity)
        .with_mode(opts.mode)
        .with_call_timeout(opts.call_timeout);

    let report = provision(connector, &plan).await?;
    Ok(report)
}

async fn resolve_app_password<S, K>(
    opts: &ProvisionOpts,
    resolver: &CredentialResolver<S>,
    decryptor: &K,
) -> Result<SecretString, BootstrapError>
where
    S: ParameterStore,
    K: KeyDecryptor,
{
    match (
        &opts.app_password_ssm_key,
        &opts.app_password_ciphertext_ssm_key,
    ) {
        (Some(name), None) => Ok(resolver.resolve(name, true).await?),
        (None, Some(name)) => Ok(resolver.resolve_encrypted(name, decryptor).await?),
        (Some(_), Some(_)) => Err(BootstrapError::Config(
            "set only one of APP_PASSWORD_SSM_KEY and APP_PASSWORD_CIPHERTEXT_SSM_KEY".to_string(),
        )),
        (None, None) => Err(BootstrapError::Config(
            "one of APP_PASSWORD_SSM_KEY or APP_PASSWORD_CIPHERTEXT_SSM_KEY is required"
                .to_string(),
        )),
    }
}

/// How a resolved value was decrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decryption {
    None,
    Store,
    Kms,
}

/// Result of the `resolve` command. Never contains the value itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveOutcome {
    pub parameter: String,
    pub decryption: Decryption,
    pub resolved: bool,
}

/// Resolve one parameter on its own and report whether it resolved.
pub async fn resolve_parameter<S, K>(
    opts: &ResolveOpts,
    resolver: &CredentialResolver<S>,
    decryptor: &K,
) -> Result<ResolveOutcome, BootstrapError>
where
    S: ParameterStore,
    K: KeyDecryptor,
{
    let decryption = if opts.kms {
        resolver.resolve_encrypted(&opts.name, decryptor).await?;
        Decryption::Kms
    } else {
        resolver.resolve(&opts.name, opts.decrypt).await?;
        if opts.decrypt {
            Decryption::Store
        } else {
            Decryption::None
        }
    };

    info!("Parameter '{}' resolved", opts.name);
    Ok(ResolveOutcome {
        parameter: opts.name.clone(),
        decryption,
        resolved: true,
    })
}
