use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use aws_sdk_sqs::Client as SqsClient;
use clap::{Parser, Subcommand, ValueEnum};
use datadog_tracing::axum::shutdown_signal;
use metrics_exporter_dogstatsd::DogStatsDBuilder;
use notification_relay::{
    batch_consumer::BatchConsumer,
    dispatcher::{BatchDispatcher, BatchMessage},
    server,
    slack_client::SlackClient,
    state::{AppState, Ingest},
    types::Environment,
};
use relay_storage::{
    queue::BuildEventQueue,
    secrets::{EnvSecretStore, SecretStore, SecretsManagerStore},
};
use relay_types::BuildEvent;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Relays Jenkins build results to Slack
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP front door
    Serve {
        /// Deliver each event immediately or hand it to the queue
        #[arg(long, env = "INGEST_MODE", value_enum, default_value_t = IngestMode::Direct)]
        mode: IngestMode,
    },
    /// Consume batches from the build event queue until interrupted
    Consume,
    /// Deliver a single event read from a file or stdin
    Send {
        /// Path to the event JSON, stdin when omitted
        #[arg(long)]
        event: Option<PathBuf>,
        /// Read SLACK_BOT_TOKEN and SLACK_CHANNEL_ID from the environment
        /// instead of Secrets Manager
        #[arg(long)]
        from_env: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IngestMode {
    Direct,
    Queue,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let env = Environment::from_env();

    match cli.command {
        Command::Serve { mode } => {
            let (_guard, tracer_shutdown) = datadog_tracing::init()?;
            init_metrics(&env)?;
            info!("Starting notification relay in {:?} environment ({:?} ingest)", env, mode);

            let ingest = match mode {
                IngestMode::Direct => Ingest::Direct(dispatcher(&env, secrets_manager(&env).await)?),
                IngestMode::Queue => Ingest::Queued(build_event_queue(&env).await),
            };

            let shutdown_token = shutdown_on_signal();
            let result = server::start(&env, AppState { ingest }, shutdown_token).await;

            // Ensure the tracer is properly shut down
            tracer_shutdown.shutdown();
            result
        }
        Command::Consume => {
            let (_guard, tracer_shutdown) = datadog_tracing::init()?;
            init_metrics(&env)?;
            info!("Starting batch consumer in {:?} environment", env);

            let queue = build_event_queue(&env).await;
            let dispatcher = dispatcher(&env, secrets_manager(&env).await)?;

            BatchConsumer::new(queue, dispatcher, shutdown_on_signal())
                .start()
                .await;

            tracer_shutdown.shutdown();
            info!("✅ Batch consumer shutdown complete");
            Ok(())
        }
        Command::Send { event, from_env } => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                )
                .init();

            let body = match event {
                Some(path) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut body = String::new();
                    tokio::io::stdin()
                        .read_to_string(&mut body)
                        .await
                        .context("Failed to read event from stdin")?;
                    body
                }
            };
            let event = body.parse::<BuildEvent>()?;

            let secrets: Arc<dyn SecretStore> = if from_env {
                Arc::new(EnvSecretStore)
            } else {
                secrets_manager(&env).await
            };

            let message_id = format!("{}#{}", event.job_name, event.build_number);
            dispatcher(&env, secrets)?
                .dispatch(&[BatchMessage::new(message_id.as_str(), body)])
                .await?;

            info!("Message for {message_id} successfully sent to channel");
            Ok(())
        }
    }
}

/// Cancels the returned token on Ctrl+C or SIGTERM
fn shutdown_on_signal() -> CancellationToken {
    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutting down notification relay...");
        signal_token.cancel();
    });
    shutdown_token
}

/// Installs the DogStatsD exporter when an agent is configured
fn init_metrics(env: &Environment) -> Result<()> {
    if let Some(dd_agent_host) = env.dd_agent_host() {
        DogStatsDBuilder::default()
            .with_remote_address(format!("{dd_agent_host}:8125"))?
            .install()?;
        info!("✅ Initialized DogStatsD metrics");
    }
    Ok(())
}

async fn secrets_manager(env: &Environment) -> Arc<dyn SecretStore> {
    let client = Arc::new(SecretsManagerClient::new(&env.aws_config().await));
    Arc::new(SecretsManagerStore::new(client))
}

async fn build_event_queue(env: &Environment) -> Arc<BuildEventQueue> {
    let sqs_client = Arc::new(SqsClient::new(&env.aws_config().await));
    Arc::new(BuildEventQueue::new(
        sqs_client,
        env.build_event_queue_config(),
    ))
}

fn dispatcher(env: &Environment, secrets: Arc<dyn SecretStore>) -> Result<Arc<BatchDispatcher>> {
    let slack = Arc::new(SlackClient::new(env.slack_api_url())?);
    Ok(Arc::new(BatchDispatcher::new(
        secrets,
        env.secret_name(),
        slack,
    )))
}
