//! Universal error handling for the API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_storage::queue::QueueError;
use relay_types::MalformedEvent;
use serde::Serialize;

use crate::dispatcher::DispatchError;

/// API error response envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(
        status: StatusCode,
        code: &'static str,
        msg: &'static str,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody { code, message: msg },
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

impl From<MalformedEvent> for AppError {
    fn from(err: MalformedEvent) -> Self {
        tracing::warn!("Rejected build event: {err}");
        Self::new(
            StatusCode::BAD_REQUEST,
            "malformed_event",
            "Failed to decode JSON",
            false,
        )
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match &err {
            DispatchError::Credentials(e) => {
                tracing::error!("Credential error: {e}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    "Delivery credentials are unavailable",
                    false,
                )
            }
            DispatchError::Delivery { source, .. } => {
                tracing::error!("Delivery error: {source}");
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    "delivery_failed",
                    "Failed to deliver notification",
                    true,
                )
            }
        }
    }
}

impl From<QueueError> for AppError {
    fn from(err: QueueError) -> Self {
        tracing::error!(upstream = err.is_upstream_error(), "Queue error: {err}");
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "queue_unavailable",
            "Build event queue temporarily unavailable",
            true,
        )
    }
}
