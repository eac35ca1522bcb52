//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod equipment;
pub mod events;
pub mod reports;
pub mod reservations;
pub mod users;

use anyhow::{Result, bail};
use resdesk_core::api::Envelope;

/// Unwraps a payload the server accepted, or fails with its error message.
fn accepted<T>(envelope: Envelope<T>, action: &str) -> Result<T> {
    if envelope.success {
        return Ok(envelope.data);
    }
    match envelope.error {
        Some(message) if !message.is_empty() => bail!(message),
        _ => bail!("{action} failed"),
    }
}
