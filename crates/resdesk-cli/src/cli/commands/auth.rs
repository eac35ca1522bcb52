//! Login, registration, logout and profile.

use anyhow::{Context, Result, bail};
use resdesk_core::models::{Registration, User};

use crate::cli::context::AppContext;
use crate::cli::{guards, render};

fn greeting(user: &User) -> String {
    let name = user
        .display_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(&user.username);
    format!("Logged in as {name} ({})", user.role().label())
}

pub async fn login(ctx: &AppContext, email: Option<&str>, password: Option<&str>) -> Result<()> {
    guards::require_guest(&ctx.session.snapshot())?;

    // The password is sent exactly as typed.
    let email = email.map(str::trim).filter(|email| !email.is_empty());
    let password = password.filter(|password| !password.is_empty());
    let (Some(email), Some(password)) = (email, password) else {
        bail!("Email and password are required.");
    };

    let user = ctx
        .session
        .login(email, password)
        .await
        .context("login")?
        .context("Login failed: the server did not return a user")?;
    println!("{}", greeting(&user));
    Ok(())
}

pub async fn register(
    ctx: &AppContext,
    username: String,
    email: String,
    password: String,
    display_name: Option<String>,
) -> Result<()> {
    guards::require_guest(&ctx.session.snapshot())?;

    let registration = Registration {
        username: username.trim().to_string(),
        email: email.trim().to_string(),
        password,
        display_name: display_name.filter(|name| !name.trim().is_empty()),
    };
    if let Err(message) = registration.validate() {
        bail!(message);
    }

    let user = ctx
        .session
        .register(&registration)
        .await
        .context("register")?
        .context("Registration failed: the server did not return a user")?;
    println!("Account created. {}", greeting(&user));
    Ok(())
}

/// Ends the session on the server and deletes the saved cookies.
pub async fn logout(ctx: &AppContext) -> Result<()> {
    guards::require_login(&ctx.session.snapshot())?;
    ctx.session.logout().await.context("logout")?;
    ctx.forget()?;
    println!("Logged out.");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    let state = ctx.session.snapshot();
    let user = guards::require_login(&state)?;
    println!("{}", render::profile(user));
    Ok(())
}
