// Not every helper is used in every test binary
#![allow(dead_code)]

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_sqs::Client as SqsClient;
use notification_relay::{
    credentials::DeliveryCredentials,
    dispatcher::{BatchDispatcher, BatchMessage},
    formatter::{Block, NotificationPayload},
    slack_client::{ChatClient, DeliveryError},
};
use relay_storage::{
    queue::{BuildEventQueue, QueueConfig},
    secrets::{SecretStore, SecretStoreError, SecretStoreResult},
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

pub const SECRET_NAME: &str = "slacked/slack-credentials";
pub const VALID_SECRET: &str = r#"{"SLACK_BOT_TOKEN":"xoxb-test","SLACK_CHANNEL_ID":"C0TEST"}"#;

/// Setup tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// A well-formed Jenkins build event body
pub fn build_event_body(job_name: &str, build_number: i64, build_result: &str) -> String {
    serde_json::json!({
        "buildUrl": format!("http://ci/job/{job_name}/{build_number}"),
        "buildResult": build_result,
        "buildNumber": build_number,
        "jobName": job_name,
    })
    .to_string()
}

/// Secret store returning a fixed secret or a fixed failure
pub struct StaticSecretStore {
    secret: Option<String>,
    calls: AtomicUsize,
}

impl StaticSecretStore {
    pub fn valid() -> Arc<Self> {
        Self::with_secret(VALID_SECRET)
    }

    pub fn with_secret(secret: &str) -> Arc<Self> {
        Arc::new(Self {
            secret: Some(secret.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn missing() -> Arc<Self> {
        Arc::new(Self {
            secret: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn get_secret(&self, name: &str) -> SecretStoreResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.secret
            .clone()
            .ok_or_else(|| SecretStoreError::NotFound(name.to_string()))
    }
}

/// Chat client that records deliveries and can fail one specific attempt
pub struct RecordingChatClient {
    /// 1-based attempt number that fails, counted across all batches
    fail_on_attempt: Option<usize>,
    attempts: AtomicUsize,
    sent: Mutex<Vec<(String, NotificationPayload)>>,
}

impl RecordingChatClient {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            fail_on_attempt: None,
            attempts: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_on(attempt: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_on_attempt: Some(attempt),
            attempts: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Channel and payload of every successful delivery, in order
    pub fn sent(&self) -> Vec<(String, NotificationPayload)> {
        self.sent.lock().unwrap().clone()
    }

    /// Plain-text fallback of every successful delivery, in order
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|(_, payload)| payload.text)
            .collect()
    }
}

#[async_trait]
impl ChatClient for RecordingChatClient {
    async fn send(
        &self,
        credentials: &DeliveryCredentials,
        payload: &NotificationPayload,
    ) -> Result<(), DeliveryError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_attempt == Some(attempt) {
            return Err(DeliveryError::Api("internal_error".to_string()));
        }

        self.sent
            .lock()
            .unwrap()
            .push((credentials.channel_id().to_string(), payload.clone()));
        Ok(())
    }
}

/// Markdown of the details section of a payload
pub fn details_text(payload: &NotificationPayload) -> String {
    payload
        .blocks
        .iter()
        .filter_map(|block| match block {
            Block::Section { text } => Some(text.text.clone()),
            Block::Divider => None,
        })
        .last()
        .expect("payload should have a details section")
}

pub fn dispatcher(
    secrets: Arc<StaticSecretStore>,
    chat: Arc<dyn ChatClient>,
) -> BatchDispatcher {
    BatchDispatcher::new(secrets, SECRET_NAME, chat)
}

pub fn batch(bodies: &[String]) -> Vec<BatchMessage> {
    bodies
        .iter()
        .enumerate()
        .map(|(idx, body)| BatchMessage::new(format!("m{}", idx + 1), body.as_str()))
        .collect()
}

/// Creates a uniquely named LocalStack queue with a 1 second visibility timeout
pub async fn localstack_queue(test_name: &str) -> Arc<BuildEventQueue> {
    setup_test_env();

    let credentials = Credentials::from_keys("test", "test", None);
    let config = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url("http://localhost:4566")
        .region(aws_config::Region::new("us-east-1"))
        .credentials_provider(credentials)
        .load()
        .await;
    let sqs_client = Arc::new(SqsClient::new(&config));

    let queue_url = sqs_client
        .create_queue()
        .queue_name(format!("{test_name}-{}", uuid::Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to create test queue")
        .queue_url()
        .expect("Queue URL not returned")
        .to_string();

    Arc::new(BuildEventQueue::new(
        sqs_client,
        QueueConfig {
            queue_url,
            default_max_messages: 10,
            default_visibility_timeout: 1,
            default_wait_time_seconds: 0,
        },
    ))
}
