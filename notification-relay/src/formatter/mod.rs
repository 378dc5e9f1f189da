//! Build event to Slack message formatting
//!
//! The message is three Block Kit blocks: a greeting section, a divider and a
//! details section with the job, build number, result and build link.

use relay_types::BuildEvent;
use serde::Serialize;

const PREAMBLE: &str = "*Hello! Your Jenkins build has completed!*";
const SUCCESS_ICON: &str = ":white_check_mark:";
const FAILURE_ICON: &str = ":x:";

/// Block Kit text object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl TextObject {
    const fn mrkdwn(text: String) -> Self {
        Self {
            kind: "mrkdwn",
            text,
        }
    }
}

/// The subset of Block Kit blocks the relay sends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { text: TextObject },
    Divider,
}

/// A ready-to-send chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    /// Plain-text fallback shown in push notifications and screen readers
    pub text: String,
    pub blocks: Vec<Block>,
}

/// Formats a build event into a chat message.
///
/// The success icon is used only when the result is exactly `SUCCESS`; every
/// other value, including unknown ones, gets the failure icon.
#[must_use]
pub fn format(event: &BuildEvent) -> NotificationPayload {
    let icon = if event.is_success() {
        SUCCESS_ICON
    } else {
        FAILURE_ICON
    };

    let details = format!(
        "*{job}* #*{number}* - {icon} *{result}*\n*Build URL:* {url}",
        job = event.job_name,
        number = event.build_number,
        result = event.build_result,
        url = event.build_url,
    );

    NotificationPayload {
        text: format!(
            "Jenkins build {} #{} completed: {}",
            event.job_name, event.build_number, event.build_result
        ),
        blocks: vec![
            Block::Section {
                text: TextObject::mrkdwn(format!("{PREAMBLE}\n\n")),
            },
            Block::Divider,
            Block::Section {
                text: TextObject::mrkdwn(details),
            },
        ],
    }
}
