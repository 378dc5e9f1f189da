#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

pub mod batch_consumer;
pub mod credentials;
pub mod dispatcher;
pub mod formatter;
pub mod routes;
pub mod server;
pub mod slack_client;
pub mod state;
pub mod types;
