use crate::secrets::{SecretStore, SecretStoreError, SecretStoreResult};
use async_trait::async_trait;

/// Environment variable holding the Slack bot token
pub const BOT_TOKEN_VAR: &str = "SLACK_BOT_TOKEN";
/// Environment variable holding the Slack channel id
pub const CHANNEL_ID_VAR: &str = "SLACK_CHANNEL_ID";

/// Secret store that assembles the credentials blob from the process environment
///
/// Every name resolves to the same blob, shaped exactly like the one kept in
/// Secrets Manager. Meant for local runs where the variables come from `.env`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretStore;

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_secret(&self, name: &str) -> SecretStoreResult<String> {
        let read = |var: &str| {
            std::env::var(var).map_err(|_| SecretStoreError::NotFound(format!("{name} ({var})")))
        };

        let blob = serde_json::json!({
            (BOT_TOKEN_VAR): read(BOT_TOKEN_VAR)?,
            (CHANNEL_ID_VAR): read(CHANNEL_ID_VAR)?,
        });

        Ok(blob.to_string())
    }
}
