//! Build event queue operations
//!
//! This module carries Jenkins build events through a standard SQS queue. The
//! queue owns redelivery: messages that are not deleted become visible again
//! once the visibility timeout expires, and the redrive policy moves them to
//! the dead-letter queue after the configured maximum receive count.

use crate::queue::{
    error::{QueueError, QueueResult},
    types::{QueueConfig, QueueMessage},
};
use aws_sdk_sqs::{
    types::{DeleteMessageBatchRequestEntry, MessageSystemAttributeName},
    Client as SqsClient,
};
use std::sync::Arc;

/// Maximum number of entries SQS accepts in a single batch request
const MAX_BATCH_ENTRIES: usize = 10;

/// Build event queue feeding the batch dispatcher
pub struct BuildEventQueue {
    sqs_client: Arc<SqsClient>,
    config: QueueConfig,
}

impl BuildEventQueue {
    /// Creates a new build event queue
    ///
    /// # Arguments
    ///
    /// * `sqs_client` - Pre-configured SQS client
    /// * `config` - Queue configuration including URL and default parameters
    #[must_use]
    pub const fn new(sqs_client: Arc<SqsClient>, config: QueueConfig) -> Self {
        Self { sqs_client, config }
    }

    /// Sends a raw build event body to the queue
    ///
    /// # Arguments
    ///
    /// * `body` - The event JSON exactly as received from the CI server
    ///
    /// # Returns
    ///
    /// The message ID if successful or an empty string
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the send operation fails
    pub async fn send_message(&self, body: &str) -> QueueResult<String> {
        let result = self
            .sqs_client
            .send_message()
            .queue_url(&self.config.queue_url)
            .message_body(body)
            .send()
            .await?;

        Ok(result
            .message_id()
            .map(std::string::ToString::to_string)
            .unwrap_or_default())
    }

    /// Polls one batch of messages from the queue
    ///
    /// Messages are returned in the order SQS delivered them.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the poll operation fails
    pub async fn poll_messages(&self) -> QueueResult<Vec<QueueMessage>> {
        let result = self
            .sqs_client
            .receive_message()
            .queue_url(&self.config.queue_url)
            .max_number_of_messages(self.config.default_max_messages)
            .visibility_timeout(self.config.default_visibility_timeout)
            .wait_time_seconds(self.config.default_wait_time_seconds)
            .message_system_attribute_names(MessageSystemAttributeName::ApproximateReceiveCount)
            .send()
            .await?;

        let messages = result
            .messages()
            .iter()
            .filter_map(|msg| {
                let receipt_handle = msg.receipt_handle()?.to_string();
                let message_id = msg.message_id()?.to_string();
                let receive_count = msg
                    .attributes()
                    .and_then(|attrs| {
                        attrs.get(&MessageSystemAttributeName::ApproximateReceiveCount)
                    })
                    .and_then(|count| count.parse().ok())
                    .unwrap_or(1);

                if msg.body().is_none() {
                    tracing::warn!(message_id = %message_id, "Received message without a body");
                }

                Some(QueueMessage {
                    body: msg.body().unwrap_or_default().to_string(),
                    receipt_handle,
                    message_id,
                    receive_count,
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!("Received {} build event messages", messages.len());

        Ok(messages)
    }

    /// Acknowledges a whole batch of messages
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if a delete request fails or if SQS rejects any
    /// entry. Entries that were deleted before the failure stay deleted.
    pub async fn ack_batch(&self, messages: &[QueueMessage]) -> QueueResult<()> {
        for chunk in messages.chunks(MAX_BATCH_ENTRIES) {
            let entries = chunk
                .iter()
                .enumerate()
                .map(|(idx, message)| {
                    DeleteMessageBatchRequestEntry::builder()
                        .id(idx.to_string())
                        .receipt_handle(&message.receipt_handle)
                        .build()
                })
                .collect::<Result<Vec<_>, _>>()?;

            let result = self
                .sqs_client
                .delete_message_batch()
                .queue_url(&self.config.queue_url)
                .set_entries(Some(entries))
                .send()
                .await?;

            if !result.failed().is_empty() {
                for failure in result.failed() {
                    tracing::error!(
                        entry = failure.id(),
                        code = failure.code(),
                        "SQS rejected message delete"
                    );
                }
                return Err(QueueError::PartialDelete {
                    failed: result.failed().len(),
                    total: chunk.len(),
                });
            }
        }

        Ok(())
    }
}
