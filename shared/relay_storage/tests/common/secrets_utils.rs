//! Secrets Manager test setup utilities

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_secretsmanager::{primitives::Blob, Client as SecretsManagerClient};
use relay_storage::secrets::SecretsManagerStore;
use std::sync::Arc;
use uuid::Uuid;

/// Test context that provides a Secrets Manager client and tracks created secrets
pub struct SecretsTestContext {
    pub client: Arc<SecretsManagerClient>,
    prefix: String,
    created: Vec<String>,
}

impl SecretsTestContext {
    /// Creates a context whose secret names are unique to this test run
    pub async fn new(test_name: &str) -> Self {
        // Setup LocalStack client with hardcoded credentials for CI
        let credentials = Credentials::from_keys(
            "test", // AWS_ACCESS_KEY_ID
            "test", // AWS_SECRET_ACCESS_KEY
            None,   // no session token
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url("http://localhost:4566")
            .region(aws_config::Region::new("us-east-1"))
            .credentials_provider(credentials)
            .load()
            .await;

        Self {
            client: Arc::new(SecretsManagerClient::new(&config)),
            prefix: format!("{test_name}-{}", Uuid::new_v4()),
            created: Vec::new(),
        }
    }

    /// Secret name scoped to this context
    pub fn name(&self, suffix: &str) -> String {
        format!("{}/{suffix}", self.prefix)
    }

    /// Store under test
    pub fn store(&self) -> SecretsManagerStore {
        SecretsManagerStore::new(self.client.clone())
    }

    /// Creates a string secret and returns its name
    pub async fn create_string_secret(&mut self, suffix: &str, value: &str) -> String {
        let name = self.name(suffix);
        self.client
            .create_secret()
            .name(&name)
            .secret_string(value)
            .send()
            .await
            .expect("Failed to create string secret");
        self.created.push(name.clone());
        name
    }

    /// Creates a binary-only secret and returns its name
    pub async fn create_binary_secret(&mut self, suffix: &str, value: &[u8]) -> String {
        let name = self.name(suffix);
        self.client
            .create_secret()
            .name(&name)
            .secret_binary(Blob::new(value.to_vec()))
            .send()
            .await
            .expect("Failed to create binary secret");
        self.created.push(name.clone());
        name
    }
}

impl Drop for SecretsTestContext {
    fn drop(&mut self) {
        // Clean up the secrets
        let client = self.client.clone();
        let names = std::mem::take(&mut self.created);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                for name in names {
                    let _ = client
                        .delete_secret()
                        .secret_id(&name)
                        .force_delete_without_recovery(true)
                        .send()
                        .await;
                }
            });
        }
    }
}
