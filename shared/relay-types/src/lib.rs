//! Wire types shared by every build notification entry point.
//!
//! The HTTP front door, the SQS consumer and the CLI sender all decode the
//! exact same JSON schema through [`BuildEvent::from_slice`] (or `str::parse`).

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Build result that renders as a success. Matched case-sensitively.
pub const SUCCESS_KEYWORD: &str = "SUCCESS";

/// A single build-completion event as posted by Jenkins
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildEvent {
    /// Link to the build page
    pub build_url: String,
    /// Terminal build status, e.g. `SUCCESS`, `FAILURE`, `ABORTED`
    pub build_result: String,
    /// Sequential build number of the job
    pub build_number: i64,
    /// Name of the Jenkins job
    pub job_name: String,
}

/// Returned when a message body is not a valid [`BuildEvent`]
#[derive(Error, Debug)]
#[error("Malformed build event: {0}")]
pub struct MalformedEvent(#[from] serde_json::Error);

impl BuildEvent {
    /// Decodes a build event from a raw message body.
    ///
    /// Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns `MalformedEvent` if the body is not JSON or if any of the four
    /// fields is missing or has the wrong type.
    pub fn from_slice(body: &[u8]) -> Result<Self, MalformedEvent> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Whether the build result is exactly [`SUCCESS_KEYWORD`].
    ///
    /// Anything else, including `"success"` or an empty string, is a failure.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.build_result == SUCCESS_KEYWORD
    }
}

/// Text bodies, such as SQS messages, decode the same way as raw bytes.
impl FromStr for BuildEvent {
    type Err = MalformedEvent;

    fn from_str(body: &str) -> Result<Self, Self::Err> {
        Self::from_slice(body.as_bytes())
    }
}
