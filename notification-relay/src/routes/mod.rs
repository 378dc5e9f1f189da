mod health;
mod send_message;

use axum::{
    routing::{get, post},
    Router,
};

pub use send_message::SendMessageResponse;

use crate::state::AppState;

/// Creates the router with all handler routes
pub fn handler() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::handler))
        .route("/send-message", post(send_message::handler))
}
