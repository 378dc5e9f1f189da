//! Delivery credential resolution
//!
//! Credentials live in a single JSON secret:
//!
//! ```json
//! { "SLACK_BOT_TOKEN": "xoxb-...", "SLACK_CHANNEL_ID": "C0123456789" }
//! ```
//!
//! A [`CredentialCache`] is created per batch and fetches that secret at most
//! once, however many messages the batch holds. Nothing is kept between
//! batches.

use std::{fmt, sync::Arc};

use relay_storage::secrets::{SecretStore, SecretStoreError};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

/// Errors raised while resolving delivery credentials
///
/// Every variant is fatal for the batch being processed.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error(transparent)]
    SecretStore(#[from] SecretStoreError),

    /// The secret is not a JSON object with both credential keys.
    /// Only the position is kept so the secret value never ends up in logs.
    #[error("Secret {name} is not valid credentials JSON (line {line}, column {column})")]
    MalformedSecret {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("Secret {name} has an empty {field}")]
    EmptyField { name: String, field: &'static str },
}

/// Slack bot token and destination channel
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct DeliveryCredentials {
    #[serde(rename = "SLACK_BOT_TOKEN")]
    bot_token: String,
    #[serde(rename = "SLACK_CHANNEL_ID")]
    channel_id: String,
}

impl DeliveryCredentials {
    /// Parses and validates the credentials secret
    ///
    /// # Errors
    ///
    /// Returns `CredentialError` if the blob does not decode or a field is empty
    pub fn from_secret(name: &str, secret: &str) -> Result<Self, CredentialError> {
        let credentials: Self =
            serde_json::from_str(secret).map_err(|e| CredentialError::MalformedSecret {
                name: name.to_string(),
                line: e.line(),
                column: e.column(),
            })?;

        if credentials.bot_token.trim().is_empty() {
            return Err(CredentialError::EmptyField {
                name: name.to_string(),
                field: "SLACK_BOT_TOKEN",
            });
        }
        if credentials.channel_id.trim().is_empty() {
            return Err(CredentialError::EmptyField {
                name: name.to_string(),
                field: "SLACK_CHANNEL_ID",
            });
        }

        Ok(credentials)
    }

    #[must_use]
    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }

    #[must_use]
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }
}

impl fmt::Debug for DeliveryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryCredentials")
            .field("bot_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

/// Credentials resolved lazily and held for the lifetime of one batch
pub struct CredentialCache {
    store: Arc<dyn SecretStore>,
    secret_name: String,
    credentials: OnceCell<DeliveryCredentials>,
}

impl CredentialCache {
    #[must_use]
    pub fn new(store: Arc<dyn SecretStore>, secret_name: impl Into<String>) -> Self {
        Self {
            store,
            secret_name: secret_name.into(),
            credentials: OnceCell::new(),
        }
    }

    /// Returns the credentials, fetching the secret on first use
    ///
    /// A failed fetch is not remembered; the batch is expected to give up on
    /// the first error rather than call again.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError` if the secret cannot be fetched or parsed
    pub async fn resolve(&self) -> Result<&DeliveryCredentials, CredentialError> {
        self.credentials.get_or_try_init(|| self.fetch()).await
    }

    #[instrument(skip(self), fields(secret_name = %self.secret_name))]
    async fn fetch(&self) -> Result<DeliveryCredentials, CredentialError> {
        let secret = self.store.get_secret(&self.secret_name).await?;
        let credentials = DeliveryCredentials::from_secret(&self.secret_name, &secret)?;

        debug!(channel_id = credentials.channel_id(), "Resolved delivery credentials");

        Ok(credentials)
    }
}
