//! Secret store access for delivery credentials
//!
//! The relay only ever reads secrets by name. The production store is AWS
//! Secrets Manager; local runs can read the same blob from the process
//! environment instead.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Process environment backed secret store
pub mod env;
/// Error types for secret store operations
pub mod error;
/// AWS Secrets Manager backed secret store
pub mod secrets_manager;

use async_trait::async_trait;

pub use env::EnvSecretStore;
pub use error::{SecretStoreError, SecretStoreResult};
pub use secrets_manager::SecretsManagerStore;

/// Fetch-by-name access to secret text
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the secret string stored under `name`
    ///
    /// # Errors
    ///
    /// Returns `SecretStoreError` if the secret does not exist, cannot be read
    /// or the store cannot be reached
    async fn get_secret(&self, name: &str) -> SecretStoreResult<String>;
}
