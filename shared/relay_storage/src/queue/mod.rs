//! Queue operations for the build notification relay
//!
//! This module provides the SQS adapter that carries raw build event bodies
//! from the ingestion front door to the batch dispatcher.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Build event queue functionality
pub mod build_event;
/// Error types for queue operations
pub mod error;
/// Common types for queue operations
pub mod types;

pub use build_event::BuildEventQueue;
pub use error::{QueueError, QueueResult};
pub use types::{QueueConfig, QueueMessage};
