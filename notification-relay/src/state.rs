//! Application state management

use std::sync::Arc;

use relay_storage::queue::BuildEventQueue;

use crate::dispatcher::BatchDispatcher;

/// What the HTTP front door does with an accepted build event
#[derive(Clone)]
pub enum Ingest {
    /// Deliver synchronously and answer once Slack accepted the message
    Direct(Arc<BatchDispatcher>),
    /// Enqueue for the batch consumer and answer immediately
    Queued(Arc<BuildEventQueue>),
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ingest: Ingest,
}
