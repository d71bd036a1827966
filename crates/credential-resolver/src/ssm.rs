//! AWS Systems Manager Parameter Store backend

use crate::error::LookupReason;
use crate::store::{ParameterRef, ParameterStore};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use secrecy::SecretString;

/// Parameter store backed by `ssm:GetParameter`.
///
/// Creating an SDK client loads credentials and region from the environment, so
/// build one store per invocation and reuse it for every lookup.
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    /// Create a new store from the default AWS config chain
    pub async fn new() -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::from_sdk_config(&sdk_config)
    }

    /// Share an already loaded AWS config with other clients
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::from_client(aws_sdk_ssm::Client::new(sdk_config))
    }

    pub fn from_client(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    fn store_type(&self) -> &'static str {
        "ssm"
    }

    async fn get_parameter(&self, parameter: &ParameterRef) -> Result<SecretString, LookupReason> {
        let response = self
            .client
            .get_parameter()
            .name(&parameter.name)
            .with_decryption(parameter.decrypt)
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(service_err) => classify_service_error(service_err),
                None => LookupReason::Transport(DisplayErrorContext(&err).to_string()),
            })?;

        response
            .parameter
            .and_then(|p| p.value)
            .map(SecretString::from)
            .ok_or(LookupReason::MissingValue)
    }
}

/// Map a modeled `GetParameter` error onto a lookup reason.
fn classify_service_error(err: &GetParameterError) -> LookupReason {
    if err.is_parameter_not_found() || err.is_parameter_version_not_found() {
        return LookupReason::NotFound;
    }

    let message = err.message().unwrap_or_default().to_string();
    match err.code() {
        Some("AccessDeniedException") | Some("AccessDenied") => LookupReason::AccessDenied(message),
        Some(code) => LookupReason::Transport(format!("{code}: {message}")),
        None => LookupReason::Transport(DisplayErrorContext(err).to_string()),
    }
}
