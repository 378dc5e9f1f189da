use std::{env, time::Duration};

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use relay_storage::queue::QueueConfig;

use crate::slack_client;

/// Secret holding the Slack credentials when `SECRET_NAME` is not set
pub const DEFAULT_SECRET_NAME: &str = "slacked/slack-credentials";

/// Slack Web API base URL when `SLACK_API_URL` is not set
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";

/// Deadline for a single AWS operation, retries included
const AWS_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Messages received per SQS poll, which is also the dispatch batch size
const MAX_BATCH_MESSAGES: i32 = 10;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(AWS_OPERATION_TIMEOUT)
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// Returns the build event queue configuration
    ///
    /// # Panics
    ///
    /// Panics if the `BUILD_EVENT_QUEUE_URL` environment variable is not set in production/staging
    #[must_use]
    pub fn build_event_queue_config(&self) -> QueueConfig {
        let queue_url = match self {
            Self::Production | Self::Staging => env::var("BUILD_EVENT_QUEUE_URL")
                .expect("BUILD_EVENT_QUEUE_URL environment variable is not set"),
            Self::Development => {
                "http://localhost:4566/000000000000/slacked-main-queue".to_string()
            }
        };

        QueueConfig {
            queue_url,
            default_max_messages: MAX_BATCH_MESSAGES,
            default_visibility_timeout: batch_visibility_timeout(),
            default_wait_time_seconds: 20, // Enable long polling by default
        }
    }

    /// Name of the secret holding the Slack bot token and channel id
    #[must_use]
    pub fn secret_name(&self) -> String {
        env::var("SECRET_NAME").unwrap_or_else(|_| DEFAULT_SECRET_NAME.to_string())
    }

    /// Base URL of the Slack Web API
    #[must_use]
    pub fn slack_api_url(&self) -> String {
        env::var("SLACK_API_URL").unwrap_or_else(|_| DEFAULT_SLACK_API_URL.to_string())
    }

    /// Port the HTTP server binds to
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number
    pub fn port(&self) -> Result<u16, std::num::ParseIntError> {
        env::var("PORT").map_or(Ok(8000), |p| p.parse())
    }

    /// Datadog agent host, if metrics should be exported
    #[must_use]
    pub fn dd_agent_host(&self) -> Option<String> {
        env::var("DD_AGENT_HOST").ok()
    }
}

/// Visibility timeout covering the slowest possible batch: one secret fetch
/// followed by a Slack call per message, each running into its timeout
fn batch_visibility_timeout() -> i32 {
    let worst_case = AWS_OPERATION_TIMEOUT
        + slack_client::REQUEST_TIMEOUT * MAX_BATCH_MESSAGES.unsigned_abs();
    i32::try_from(worst_case.as_secs()).unwrap_or(i32::MAX)
}
