//! Handler bodies for the HTTP API.
//!
//! Each body takes the shared [`AppState`](crate::state::AppState), the
//! inbound request and its context, and returns the response payload as a
//! JSON string. They are meant to be wrapped with [`crate::handler::handler`].

pub mod billing;
pub mod notes;

use serde::Serialize;

/// Payload returned by mutations that have nothing else to report.
#[derive(Debug, Serialize)]
pub struct Status {
    pub status: bool,
}

pub(crate) fn status_ok() -> Result<String, serde_json::Error> {
    serde_json::to_string(&Status { status: true })
}
