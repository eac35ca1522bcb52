//! Access checks that run before a command body.

use anyhow::{Result, bail};
use resdesk_core::models::User;
use resdesk_core::session::AuthState;

/// Protected commands: requires an authenticated user.
pub fn require_login(state: &AuthState) -> Result<&User> {
    match state.user() {
        Some(user) => Ok(user),
        None => bail!("Not logged in. Run `resdesk login` first."),
    }
}

/// Guest-only commands (login, register).
pub fn require_guest(state: &AuthState) -> Result<()> {
    match state.user() {
        Some(user) => bail!(
            "Already logged in as {}. Run `resdesk logout` first.",
            display_username(user)
        ),
        None => Ok(()),
    }
}

/// Manager or administrator.
pub fn require_privileged(state: &AuthState) -> Result<&User> {
    let user = require_login(state)?;
    if !user.role().is_privileged() {
        bail!("Access denied. Manager or administrator role required.");
    }
    Ok(user)
}

pub fn require_admin(state: &AuthState) -> Result<&User> {
    let user = require_login(state)?;
    if !user.role().is_admin() {
        bail!("Access denied. Administrator role required.");
    }
    Ok(user)
}

fn display_username(user: &User) -> &str {
    if user.username.is_empty() {
        &user.email
    } else {
        &user.username
    }
}
