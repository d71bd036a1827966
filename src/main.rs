//! Command-line interface for rds-bootstrap
//!
//! # Usage Examples
//!
//! ## Provision on first boot
//! ```bash
//! # Application password stored as a SecureString parameter
//! rds-bootstrap provision \
//!   --rds-host db.internal \
//!   --rds-username-ssm-key /app/db/user \
//!   --rds-password-ssm-key /app/db/password \
//!   --app-password-ssm-key /app/db/app-password
//!
//! # Application password stored as a KMS ciphertext, tolerate a provisioned target
//! rds-bootstrap provision \
//!   --rds-host db.internal \
//!   --rds-username-ssm-key /app/db/user \
//!   --rds-password-ssm-key /app/db/password \
//!   --app-password-ciphertext-ssm-key /app/db/app-password.enc \
//!   --mode if-not-exists
//! ```
//!
//! ## Check that a parameter resolves
//! ```bash
//! rds-bootstrap resolve --name /app/db/master --kms
//! ```
//!
//! Every flag of `provision` can also be given through the environment
//! (`RDS_HOST`, `RDS_USERNAME_SSM_KEY`, ...). Exit codes are listed in
//! `rds_bootstrap::exit`.

use anyhow::Context;
use aws_config::BehaviorVersion;
use clap::{Parser, Subcommand};
use credential_resolver::{CredentialResolver, KmsDecryptor, SsmParameterStore};
use mysql_provisioner::MySQLConnector;
use rds_bootstrap::{exit, BootstrapError, ProvisionOpts, ResolveOpts};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "rds-bootstrap")]
#[command(about = "Provision a MySQL database and user from parameter store credentials")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve credentials and create the database, user and grant
    Provision {
        #[command(flatten)]
        opts: ProvisionOpts,
    },

    /// Resolve a single parameter without printing its value
    Resolve {
        #[command(flatten)]
        opts: ResolveOpts,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => exit::SUCCESS,
        Err(e) => {
            let code = e
                .downcast_ref::<BootstrapError>()
                .map(BootstrapError::exit_code)
                .unwrap_or(exit::INTERNAL);
            tracing::error!("Bootstrap failed with exit code {code}");
            eprintln!("Error: {e:#}");
            code
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let store = SsmParameterStore::from_sdk_config(&sdk_config);
    let kms = KmsDecryptor::from_sdk_config(&sdk_config);

    match cli.command {
        Commands::Provision { opts } => {
            let resolver = CredentialResolver::new(store).with_call_timeout(opts.call_timeout);
            let report =
                rds_bootstrap::run_provision(&opts, &resolver, &kms, &MySQLConnector).await?;
            print_json(&report)?;
        }
        Commands::Resolve { opts } => {
            let resolver = CredentialResolver::new(store).with_call_timeout(opts.call_timeout);
            let outcome = rds_bootstrap::resolve_parameter(&opts, &resolver, &kms).await?;
            print_json(&outcome)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}
