//! AWS KMS decryption backend

use crate::error::DecryptReason;
use crate::store::KeyDecryptor;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_kms::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_kms::operation::decrypt::DecryptError;
use aws_sdk_kms::primitives::Blob;
use secrecy::SecretSlice;

/// Key decryptor backed by `kms:Decrypt`.
///
/// The key id is taken from the ciphertext metadata, so symmetric keys need no
/// extra configuration.
pub struct KmsDecryptor {
    client: aws_sdk_kms::Client,
}

impl KmsDecryptor {
    /// Create a new decryptor from the default AWS config chain
    pub async fn new() -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::from_sdk_config(&sdk_config)
    }

    /// Share an already loaded AWS config with other clients
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::from_client(aws_sdk_kms::Client::new(sdk_config))
    }

    pub fn from_client(client: aws_sdk_kms::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KeyDecryptor for KmsDecryptor {
    fn decryptor_type(&self) -> &'static str {
        "kms"
    }

    async fn decrypt(&self, ciphertext: Vec<u8>) -> Result<SecretSlice<u8>, DecryptReason> {
        let response = self
            .client
            .decrypt()
            .ciphertext_blob(Blob::new(ciphertext))
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(service_err) => classify_service_error(service_err),
                None => DecryptReason::Transport(DisplayErrorContext(&err).to_string()),
            })?;

        response
            .plaintext
            .map(|blob| SecretSlice::from(blob.into_inner()))
            .ok_or(DecryptReason::MissingPlaintext)
    }
}

fn classify_service_error(err: &DecryptError) -> DecryptReason {
    let message = err.message().unwrap_or_default().to_string();
    match err.code() {
        // Anything the service evaluated and refused, as opposed to failing to answer
        Some(code)
            if !matches!(
                code,
                "KMSInternalException" | "DependencyTimeoutException" | "ThrottlingException"
            ) =>
        {
            DecryptReason::Rejected(format!("{code}: {message}"))
        }
        Some(code) => DecryptReason::Transport(format!("{code}: {message}")),
        None => DecryptReason::Transport(DisplayErrorContext(err).to_string()),
    }
}
