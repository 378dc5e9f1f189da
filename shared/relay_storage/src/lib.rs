//! Storage adapters for the build notification relay
//!
//! This crate wraps the AWS services the relay depends on: the SQS build
//! event queue and the secret store holding the Slack delivery credentials.

pub mod queue;
pub mod secrets;
