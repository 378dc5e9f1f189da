use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::credentials::DeliveryCredentials;
use crate::formatter::{Block, NotificationPayload};

/// Per-request timeout for Slack calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Slack API error codes that are expected to clear up on their own
const TRANSIENT_API_ERRORS: &[&str] = &[
    "ratelimited",
    "internal_error",
    "fatal_error",
    "service_unavailable",
    "request_timeout",
];

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Failed to reach Slack: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Slack rate limited the request (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Slack responded with HTTP {0}")]
    Status(StatusCode),

    #[error("Slack rejected the message: {0}")]
    Api(String),
}

impl DeliveryError {
    /// Best guess at whether retrying could succeed.
    ///
    /// Informational only: the dispatcher fails the batch on every delivery
    /// error regardless.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::RateLimited { .. } => true,
            Self::Status(status) => status.is_server_error(),
            Self::Api(code) => TRANSIENT_API_ERRORS.contains(&code.as_str()),
        }
    }
}

/// Chat delivery seam used by the dispatcher
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Posts one message to the channel named in `credentials`
    async fn send(
        &self,
        credentials: &DeliveryCredentials,
        payload: &NotificationPayload,
    ) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    blocks: &'a [Block],
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

/// Slack Web API client for `chat.postMessage`
pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
}

impl SlackClient {
    /// Creates a client against `base_url`, e.g. `https://slack.com/api`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatClient for SlackClient {
    #[instrument(skip_all, fields(channel_id = credentials.channel_id()))]
    async fn send(
        &self,
        credentials: &DeliveryCredentials,
        payload: &NotificationPayload,
    ) -> Result<(), DeliveryError> {
        let response = self
            .http
            .post(format!("{}/chat.postMessage", self.base_url))
            .bearer_auth(credentials.bot_token())
            .json(&PostMessageRequest {
                channel: credentials.channel_id(),
                text: &payload.text,
                blocks: &payload.blocks,
            })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok());
            return Err(DeliveryError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(DeliveryError::Status(status));
        }

        // Slack reports logical failures as 200 with `ok: false`
        let body: PostMessageResponse = response.json().await?;
        if !body.ok {
            return Err(DeliveryError::Api(
                body.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        Ok(())
    }
}
