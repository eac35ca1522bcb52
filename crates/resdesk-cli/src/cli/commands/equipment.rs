//! Equipment command handlers.

use anyhow::{Context, Result, bail};
use resdesk_core::models::{Equipment, EquipmentForm, EquipmentStatus};

use super::accepted;
use crate::cli::context::AppContext;
use crate::cli::{guards, render};

/// Fields to change on `equipment update`; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct EquipmentChanges {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub notes: Option<String>,
}

impl EquipmentChanges {
    fn apply_to(self, mut form: EquipmentForm) -> EquipmentForm {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(sku) = self.sku {
            form.sku = sku;
        }
        if let Some(status) = self.status {
            form.status = status.to_string();
        }
        if let Some(notes) = self.notes {
            form.notes = notes;
        }
        form
    }
}

pub async fn list(ctx: &AppContext) -> Result<()> {
    guards::require_login(&ctx.session.snapshot())?;

    let envelope = ctx.api().list_equipment().await.context("list equipment")?;
    let items = accepted(envelope, "Listing equipment")?.equipment;
    if items.is_empty() {
        println!("No equipment found.");
    } else {
        println!("{}", render::equipment(&items));
    }
    Ok(())
}

async fn fetch_one(ctx: &AppContext, id: i64) -> Result<Equipment> {
    let envelope = ctx
        .api()
        .get_equipment(id)
        .await
        .with_context(|| format!("get equipment {id}"))?;
    accepted(envelope, "Loading equipment")?
        .equipment
        .with_context(|| format!("Equipment {id} not found"))
}

pub async fn show(ctx: &AppContext, id: i64) -> Result<()> {
    guards::require_login(&ctx.session.snapshot())?;
    let item = fetch_one(ctx, id).await?;
    println!("{}", render::equipment(std::slice::from_ref(&item)));
    Ok(())
}

pub async fn create(ctx: &AppContext, form: &EquipmentForm) -> Result<()> {
    guards::require_admin(&ctx.session.snapshot())?;
    if form.name.trim().is_empty() {
        bail!("Name is required.");
    }

    let envelope = ctx
        .api()
        .create_equipment(form)
        .await
        .context("create equipment")?;
    accepted(envelope, "Creating equipment")?;
    println!("Equipment created.");
    list(ctx).await
}

pub async fn update(ctx: &AppContext, id: i64, changes: EquipmentChanges) -> Result<()> {
    guards::require_privileged(&ctx.session.snapshot())?;

    let current = fetch_one(ctx, id).await?;
    let form = changes.apply_to(EquipmentForm::from(&current));

    let envelope = ctx
        .api()
        .update_equipment(id, &form)
        .await
        .with_context(|| format!("update equipment {id}"))?;
    accepted(envelope, "Updating equipment")?;
    println!("Equipment {id} updated.");
    list(ctx).await
}

pub async fn delete(ctx: &AppContext, id: i64, confirmed: bool) -> Result<()> {
    guards::require_admin(&ctx.session.snapshot())?;
    if !confirmed {
        bail!("Deleting equipment {id} cannot be undone. Re-run with --yes to confirm.");
    }

    let envelope = ctx
        .api()
        .delete_equipment(id)
        .await
        .with_context(|| format!("delete equipment {id}"))?;
    accepted(envelope, "Deleting equipment")?;
    println!("Equipment {id} deleted.");
    list(ctx).await
}
