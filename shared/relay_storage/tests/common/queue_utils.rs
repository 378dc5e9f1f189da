//! Queue test setup utilities

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_sqs::{types::QueueAttributeName, Client as SqsClient};
use relay_storage::queue::{BuildEventQueue, QueueConfig};
use std::sync::Arc;
use uuid::Uuid;

/// Maximum receive count configured on the test redrive policy
pub const MAX_RECEIVE_COUNT: u32 = 3;

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

/// Test context that provides SQS client and a main queue wired to a dead-letter queue
pub struct QueueTestContext {
    pub sqs_client: Arc<SqsClient>,
    pub queue_url: String,
    pub dead_letter_queue_url: String,
}

impl QueueTestContext {
    /// Creates a main queue and its dead-letter queue with unique names
    pub async fn new(test_name: &str) -> Self {
        let suffix = Uuid::new_v4();

        // Setup LocalStack client with hardcoded credentials for CI
        let credentials = Credentials::from_keys(
            "test", // AWS_ACCESS_KEY_ID
            "test", // AWS_SECRET_ACCESS_KEY
            None,   // no session token
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url("http://localhost:4566")
            .region(aws_config::Region::new("us-east-1"))
            .credentials_provider(credentials)
            .load()
            .await;

        let sqs_client = Arc::new(SqsClient::new(&config));

        let dead_letter_queue_url = sqs_client
            .create_queue()
            .queue_name(format!("{test_name}-dlq-{suffix}"))
            .send()
            .await
            .expect("Failed to create dead-letter queue")
            .queue_url()
            .expect("Queue URL not returned")
            .to_string();

        let dead_letter_queue_arn = sqs_client
            .get_queue_attributes()
            .queue_url(&dead_letter_queue_url)
            .attribute_names(QueueAttributeName::QueueArn)
            .send()
            .await
            .expect("Failed to read dead-letter queue attributes")
            .attributes()
            .and_then(|attrs| attrs.get(&QueueAttributeName::QueueArn).cloned())
            .expect("Queue ARN not returned");

        let redrive_policy = serde_json::json!({
            "deadLetterTargetArn": dead_letter_queue_arn,
            "maxReceiveCount": MAX_RECEIVE_COUNT.to_string(),
        });

        let queue_url = sqs_client
            .create_queue()
            .queue_name(format!("{test_name}-{suffix}"))
            .attributes(QueueAttributeName::RedrivePolicy, redrive_policy.to_string())
            .send()
            .await
            .expect("Failed to create test queue")
            .queue_url()
            .expect("Queue URL not returned")
            .to_string();

        Self {
            sqs_client,
            queue_url,
            dead_letter_queue_url,
        }
    }

    /// Build event queue over the main queue with the given visibility timeout
    pub fn queue(&self, visibility_timeout: i32) -> BuildEventQueue {
        BuildEventQueue::new(
            self.sqs_client.clone(),
            QueueConfig {
                queue_url: self.queue_url.clone(),
                default_max_messages: 10,
                default_visibility_timeout: visibility_timeout,
                default_wait_time_seconds: 0, // No wait for tests
            },
        )
    }

    /// Build event queue over the dead-letter queue
    pub fn dead_letter_queue(&self) -> BuildEventQueue {
        BuildEventQueue::new(
            self.sqs_client.clone(),
            QueueConfig {
                queue_url: self.dead_letter_queue_url.clone(),
                default_max_messages: 10,
                default_visibility_timeout: 30,
                default_wait_time_seconds: 0,
            },
        )
    }
}

impl Drop for QueueTestContext {
    fn drop(&mut self) {
        // Clean up the queues
        let client = self.sqs_client.clone();
        let queue_urls = [self.queue_url.clone(), self.dead_letter_queue_url.clone()];

        // Use tokio runtime to delete queues
        let handle = tokio::runtime::Handle::try_current();
        if let Ok(handle) = handle {
            handle.spawn(async move {
                for queue_url in queue_urls {
                    let _ = client.delete_queue().queue_url(&queue_url).send().await;
                }
            });
        }
    }
}
