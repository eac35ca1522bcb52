//! User account command handlers.

use anyhow::{Context, Result, bail};
use resdesk_core::models::{NewUser, Role, User, UserUpdate};

use super::accepted;
use crate::cli::context::AppContext;
use crate::cli::{guards, render};

/// Fields to change on `users update`; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

impl UserChanges {
    /// Builds the request body. Role and active flag are only sent by admins.
    fn into_update(self, current: &User, as_admin: bool) -> Result<UserUpdate> {
        if !as_admin && (self.role.is_some() || self.active.is_some()) {
            bail!("Only administrators can change roles or activation.");
        }

        let mut update = UserUpdate {
            display_name: self
                .display_name
                .or_else(|| current.display_name.clone())
                .unwrap_or_default(),
            email: self.email.unwrap_or_else(|| current.email.clone()),
            password: self.password.filter(|password| !password.is_empty()),
            role_id: None,
            is_active: None,
        };
        if as_admin {
            update.role_id = Some(self.role.map_or(current.role_id, Role::id));
            update.is_active = Some(self.active.or(current.is_active).unwrap_or(true));
        }
        Ok(update)
    }
}

pub async fn list(ctx: &AppContext) -> Result<()> {
    guards::require_privileged(&ctx.session.snapshot())?;

    let envelope = ctx.api().list_users().await.context("list users")?;
    let users = accepted(envelope, "Listing users")?.users;
    if users.is_empty() {
        println!("No users found.");
    } else {
        println!("{}", render::users(&users));
    }
    Ok(())
}

async fn fetch_one(ctx: &AppContext, id: i64) -> Result<User> {
    let envelope = ctx
        .api()
        .get_user(id)
        .await
        .with_context(|| format!("get user {id}"))?;
    accepted(envelope, "Loading user")?
        .user
        .with_context(|| format!("User {id} not found"))
}

pub async fn show(ctx: &AppContext, id: i64) -> Result<()> {
    guards::require_privileged(&ctx.session.snapshot())?;
    let user = fetch_one(ctx, id).await?;
    println!("{}", render::users(std::slice::from_ref(&user)));
    Ok(())
}

pub async fn create(ctx: &AppContext, user: &NewUser) -> Result<()> {
    guards::require_admin(&ctx.session.snapshot())?;
    if user.username.trim().is_empty() || user.email.trim().is_empty() || user.password.is_empty()
    {
        bail!("Username, email and password are required.");
    }

    let envelope = ctx.api().create_user(user).await.context("create user")?;
    accepted(envelope, "Creating the user")?;
    println!("User {} created.", user.username);
    list(ctx).await
}

pub async fn update(ctx: &AppContext, id: i64, changes: UserChanges) -> Result<()> {
    let as_admin = guards::require_privileged(&ctx.session.snapshot())?
        .role()
        .is_admin();

    let current = fetch_one(ctx, id).await?;
    let update = changes.into_update(&current, as_admin)?;

    let envelope = ctx
        .api()
        .update_user(id, &update)
        .await
        .with_context(|| format!("update user {id}"))?;
    accepted(envelope, "Updating the user")?;
    println!("User {id} updated.");
    list(ctx).await
}

pub async fn delete(ctx: &AppContext, id: i64, confirmed: bool) -> Result<()> {
    guards::require_admin(&ctx.session.snapshot())?;
    if !confirmed {
        bail!("Deleting user {id} cannot be undone. Re-run with --yes to confirm.");
    }

    let envelope = ctx
        .api()
        .delete_user(id)
        .await
        .with_context(|| format!("delete user {id}"))?;
    accepted(envelope, "Deleting the user")?;
    println!("User {id} deleted.");
    list(ctx).await
}
