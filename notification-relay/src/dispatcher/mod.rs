//! Batch dispatcher
//!
//! Turns one batch of queued build events into Slack messages and returns a
//! single verdict for the whole batch:
//!
//! ```text
//! Init -> CredentialsResolved -> Processing -> AllDelivered
//!   |                               |
//!   +-------------------------------+--------> BatchFailed
//! ```
//!
//! * Malformed events are skipped and never fail the batch; redelivery cannot
//!   repair them.
//! * A credential failure fails the batch before any message is attempted.
//! * The first delivery failure stops the batch. Later messages are not
//!   attempted and the queue redelivers the whole batch, so messages that were
//!   already delivered will be delivered again. Duplicates are accepted.
//!
//! Messages are processed one at a time, in the order they were received.

use std::sync::Arc;

use metrics::counter;
use relay_storage::secrets::SecretStore;
use relay_types::BuildEvent;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::credentials::{CredentialCache, CredentialError};
use crate::formatter;
use crate::slack_client::{ChatClient, DeliveryError};

/// One undecoded message of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchMessage {
    pub message_id: String,
    pub body: String,
}

impl BatchMessage {
    #[must_use]
    pub fn new(message_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            body: body.into(),
        }
    }
}

/// Per-message results of a batch that completed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Ids of messages posted to Slack, in order
    pub delivered: Vec<String>,
    /// Ids of malformed messages that were skipped, in order
    pub skipped: Vec<String>,
}

/// Why a batch failed as a whole
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Failed to resolve delivery credentials")]
    Credentials(#[source] CredentialError),

    #[error("Failed to deliver message {message_id} ({delivered} delivered before it)")]
    Delivery {
        message_id: String,
        /// Messages of this batch already posted, which a retry will post again
        delivered: usize,
        #[source]
        source: DeliveryError,
    },
}

/// Processes batches of build events against Slack
pub struct BatchDispatcher {
    secrets: Arc<dyn SecretStore>,
    secret_name: String,
    chat: Arc<dyn ChatClient>,
}

impl BatchDispatcher {
    #[must_use]
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        secret_name: impl Into<String>,
        chat: Arc<dyn ChatClient>,
    ) -> Self {
        Self {
            secrets,
            secret_name: secret_name.into(),
            chat,
        }
    }

    /// Delivers a batch and decides its outcome
    ///
    /// # Errors
    ///
    /// Returns `DispatchError` when the batch must be retried by the queue:
    /// credentials could not be resolved, or a delivery failed.
    #[instrument(skip_all, fields(batch_size = messages.len()))]
    pub async fn dispatch(&self, messages: &[BatchMessage]) -> Result<BatchReport, DispatchError> {
        let mut report = BatchReport::default();
        if messages.is_empty() {
            debug!("Empty batch, nothing to deliver");
            return Ok(report);
        }

        // Fresh per batch so credentials never outlive the invocation
        let cache = CredentialCache::new(Arc::clone(&self.secrets), self.secret_name.as_str());
        let credentials = match cache.resolve().await {
            Ok(credentials) => credentials,
            Err(e) => {
                error!(error = %e, "Credential resolution failed, failing batch");
                counter!("build_batch_failed", "reason" => "credentials").increment(1);
                return Err(DispatchError::Credentials(e));
            }
        };

        for message in messages {
            let event = match message.body.parse::<BuildEvent>() {
                Ok(event) => event,
                Err(e) => {
                    warn!(message_id = %message.message_id, error = %e, "Skipping malformed build event");
                    counter!("build_event_skipped").increment(1);
                    report.skipped.push(message.message_id.clone());
                    continue;
                }
            };

            let payload = formatter::format(&event);

            if let Err(e) = self.chat.send(credentials, &payload).await {
                error!(
                    message_id = %message.message_id,
                    delivered = report.delivered.len(),
                    transient = e.is_transient(),
                    error = %e,
                    "Delivery failed, aborting batch"
                );
                counter!("build_batch_failed", "reason" => "delivery").increment(1);
                return Err(DispatchError::Delivery {
                    message_id: message.message_id.clone(),
                    delivered: report.delivered.len(),
                    source: e,
                });
            }

            debug!(
                message_id = %message.message_id,
                job_name = %event.job_name,
                build_number = event.build_number,
                "Delivered build notification"
            );
            counter!("build_event_delivered").increment(1);
            report.delivered.push(message.message_id.clone());
        }

        info!(
            delivered = report.delivered.len(),
            skipped = report.skipped.len(),
            "Batch processed"
        );

        Ok(report)
    }
}
