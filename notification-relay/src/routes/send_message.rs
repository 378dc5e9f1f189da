use axum::{body::Bytes, extract::State, Json};
use relay_types::BuildEvent;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dispatcher::BatchMessage;
use crate::state::{AppState, Ingest};
use crate::types::AppError;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendMessageResponse {
    pub status: String,
    /// SQS message id, when the event was queued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// Accepts one Jenkins build event
///
/// The body is validated up front in both modes, so a malformed event is
/// answered with `400` and never reaches Slack or the queue.
pub async fn handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SendMessageResponse>, AppError> {
    let event = BuildEvent::from_slice(&body)?;
    let body = String::from_utf8_lossy(&body).into_owned();

    match &state.ingest {
        Ingest::Direct(dispatcher) => {
            let message_id = format!("{}#{}", event.job_name, event.build_number);
            dispatcher
                .dispatch(&[BatchMessage::new(message_id, body)])
                .await?;

            Ok(Json(SendMessageResponse {
                status: "delivered".to_string(),
                message_id: None,
            }))
        }
        Ingest::Queued(queue) => {
            let message_id = queue.send_message(&body).await?;
            info!(
                message_id = %message_id,
                job_name = %event.job_name,
                build_number = event.build_number,
                "Queued build event"
            );

            Ok(Json(SendMessageResponse {
                status: "message queued to SQS".to_string(),
                message_id: Some(message_id),
            }))
        }
    }
}
