use thiserror::Error;

/// Result type alias for secret store operations
pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Error types for secret store operations
#[derive(Error, Debug)]
pub enum SecretStoreError {
    /// No secret exists under the requested name
    #[error("Secret {0} not found")]
    NotFound(String),

    /// The caller is not allowed to read the secret
    #[error("Access denied to secret {0}")]
    AccessDenied(String),

    /// The secret exists but has no string value (binary secrets are not supported)
    #[error("Secret {0} has no string value")]
    MissingSecretString(String),

    /// The store could not be reached or returned an unexpected error
    #[error("Failed to retrieve secret {name}: {message}")]
    Transport {
        /// Secret name
        name: String,
        /// Underlying error description
        message: String,
    },
}
