use aws_sdk_sqs::error::SdkError;
use aws_sdk_sqs::operation::delete_message_batch::DeleteMessageBatchError;
use aws_sdk_sqs::operation::receive_message::ReceiveMessageError;
use aws_sdk_sqs::operation::send_message::SendMessageError;
use thiserror::Error;

/// Result type alias for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Error types for queue operations
#[derive(Error, Debug)]
pub enum QueueError {
    /// Error receiving messages from SQS
    #[error("Failed to receive messages from SQS")]
    ReceiveMessage(#[from] SdkError<ReceiveMessageError>),

    /// Error sending message to SQS
    #[error("Failed to send message to SQS")]
    SendMessage(#[from] SdkError<SendMessageError>),

    /// Error deleting a batch of messages from SQS
    #[error("Failed to delete message batch from SQS")]
    DeleteMessageBatch(#[from] SdkError<DeleteMessageBatchError>),

    /// A batch request entry could not be built
    #[error("Invalid batch entry: {0}")]
    InvalidBatchEntry(#[from] aws_sdk_sqs::error::BuildError),

    /// SQS accepted the batch delete but rejected some entries
    #[error("Failed to delete {failed} of {total} messages from SQS")]
    PartialDelete {
        /// Number of rejected entries
        failed: usize,
        /// Number of entries in the request
        total: usize,
    },
}

impl QueueError {
    /// Checks if this error represents an upstream (5xx) error
    #[must_use]
    pub fn is_upstream_error(&self) -> bool {
        match self {
            Self::ReceiveMessage(sdk_err) => Self::check_sdk_error_status(sdk_err),
            Self::SendMessage(sdk_err) => Self::check_sdk_error_status(sdk_err),
            Self::DeleteMessageBatch(sdk_err) => Self::check_sdk_error_status(sdk_err),
            Self::PartialDelete { .. } | Self::InvalidBatchEntry(_) => false,
        }
    }

    fn check_sdk_error_status<E>(sdk_err: &SdkError<E>) -> bool {
        if let SdkError::ServiceError(err) = sdk_err {
            let raw = err.raw();
            let status = raw.status();
            return status.as_u16() >= 500;
        }
        false
    }
}
