use anyhow::Context;
use relay_storage::queue::{BuildEventQueue, QueueMessage};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::dispatcher::{BatchDispatcher, BatchMessage};

/// Pause after a failed receive so a broken queue does not spin the loop
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Feeds SQS batches to the dispatcher
///
/// A batch that completes is deleted from the queue. A batch that fails is
/// left alone: its messages reappear after the visibility timeout, and the
/// queue's redrive policy dead-letters them once the maximum receive count
/// is reached.
pub struct BatchConsumer {
    queue: Arc<BuildEventQueue>,
    dispatcher: Arc<BatchDispatcher>,
    shutdown: CancellationToken,
}

impl BatchConsumer {
    #[must_use]
    pub const fn new(
        queue: Arc<BuildEventQueue>,
        dispatcher: Arc<BatchDispatcher>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            shutdown,
        }
    }

    /// Runs until the shutdown token is cancelled
    ///
    /// Cancellation only interrupts the receive. A batch that was already
    /// received is dispatched and acknowledged before the loop exits.
    pub async fn start(self) {
        info!("Starting BatchConsumer");

        loop {
            let received = tokio::select! {
                result = self.queue.poll_messages() => result,
                () = self.shutdown.cancelled() => {
                    info!("Queue poller shutting down");
                    break;
                }
            };

            let result = match received {
                Ok(messages) => self.process(messages).await,
                Err(e) => Err(anyhow::Error::from(e).context("Failed to poll messages")),
            };

            if let Err(e) = result {
                error!(error = ?e, "Failed to process batch");
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
            }
        }

        info!("BatchConsumer shutdown complete");
    }

    /// Receives one batch, dispatches it and acknowledges it on success
    ///
    /// # Errors
    ///
    /// Returns an error if the queue cannot be polled or the batch cannot be
    /// acknowledged. A failed dispatch is not an error here: it is the
    /// queue's signal to redeliver.
    #[instrument(skip(self))]
    pub async fn poll_once(&self) -> anyhow::Result<()> {
        let messages = self
            .queue
            .poll_messages()
            .await
            .context("Failed to poll messages")?;

        self.process(messages).await
    }

    async fn process(&self, messages: Vec<QueueMessage>) -> anyhow::Result<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let batch = messages
            .iter()
            .map(|message| {
                if message.receive_count > 1 {
                    warn!(
                        message_id = %message.message_id,
                        receive_count = message.receive_count,
                        "Processing redelivered message"
                    );
                }
                BatchMessage::new(message.message_id.as_str(), message.body.as_str())
            })
            .collect::<Vec<_>>();

        match self.dispatcher.dispatch(&batch).await {
            Ok(_) => self.acknowledge(&messages).await,
            Err(e) => {
                warn!(
                    error = ?e,
                    batch_size = messages.len(),
                    "Batch failed, leaving it for redelivery"
                );
                Ok(())
            }
        }
    }

    async fn acknowledge(&self, messages: &[QueueMessage]) -> anyhow::Result<()> {
        self.queue
            .ack_batch(messages)
            .await
            .context("Failed to acknowledge batch")
    }
}
