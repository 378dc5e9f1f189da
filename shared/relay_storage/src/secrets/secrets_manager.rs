use crate::secrets::{SecretStore, SecretStoreError, SecretStoreResult};
use async_trait::async_trait;
use aws_sdk_secretsmanager::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::get_secret_value::GetSecretValueError,
    Client as SecretsManagerClient,
};
use std::sync::Arc;

/// Error code Secrets Manager returns when IAM denies `GetSecretValue`
const ACCESS_DENIED_CODE: &str = "AccessDeniedException";

/// Secret store backed by AWS Secrets Manager
pub struct SecretsManagerStore {
    client: Arc<SecretsManagerClient>,
}

impl SecretsManagerStore {
    /// Creates a new Secrets Manager store
    ///
    /// # Arguments
    ///
    /// * `client` - Pre-configured Secrets Manager client
    #[must_use]
    pub const fn new(client: Arc<SecretsManagerClient>) -> Self {
        Self { client }
    }

    fn map_error(name: &str, err: SdkError<GetSecretValueError>) -> SecretStoreError {
        if let SdkError::ServiceError(service_err) = &err {
            let inner = service_err.err();
            if matches!(inner, GetSecretValueError::ResourceNotFoundException(_)) {
                return SecretStoreError::NotFound(name.to_string());
            }
            if inner.code() == Some(ACCESS_DENIED_CODE) {
                return SecretStoreError::AccessDenied(name.to_string());
            }
        }

        SecretStoreError::Transport {
            name: name.to_string(),
            message: DisplayErrorContext(&err).to_string(),
        }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    #[tracing::instrument(skip(self))]
    async fn get_secret(&self, name: &str) -> SecretStoreResult<String> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|err| Self::map_error(name, err))?;

        output
            .secret_string()
            .map(ToString::to_string)
            .ok_or_else(|| SecretStoreError::MissingSecretString(name.to_string()))
    }
}
