//! Event command handlers.

use anyhow::{Context, Result, bail};
use chrono::{Duration, Local};
use resdesk_core::models::{Event, NewEvent};

use super::accepted;
use crate::cli::context::AppContext;
use crate::cli::{guards, render};

/// Look-ahead for `events upcoming`.
const UPCOMING_WINDOW_HOURS: i64 = 24;

async fn fetch(ctx: &AppContext) -> Result<Vec<Event>> {
    let envelope = ctx.api().list_events().await.context("list events")?;
    Ok(accepted(envelope, "Listing events")?.events)
}

fn print_events(events: &[Event], empty: &str) {
    if events.is_empty() {
        println!("{empty}");
    } else {
        println!("{}", render::events(events));
    }
}

pub async fn list(ctx: &AppContext) -> Result<()> {
    let events = fetch(ctx).await?;
    print_events(&events, "No events found.");
    Ok(())
}

pub async fn upcoming(ctx: &AppContext) -> Result<()> {
    let now = Local::now();
    let window = Duration::hours(UPCOMING_WINDOW_HOURS);
    let events: Vec<Event> = fetch(ctx)
        .await?
        .into_iter()
        .filter(|event| event.is_upcoming(now, window))
        .collect();
    print_events(&events, "No events in the next 24 hours.");
    Ok(())
}

pub async fn create(ctx: &AppContext, event: NewEvent) -> Result<()> {
    guards::require_privileged(&ctx.session.snapshot())?;

    let envelope = ctx.api().create_event(&event).await.context("create event")?;
    accepted(envelope, "Creating the event")?;
    println!("Event created.");
    list(ctx).await
}

pub async fn join(ctx: &AppContext, id: i64) -> Result<()> {
    guards::require_login(&ctx.session.snapshot())?;

    let events = fetch(ctx).await?;
    if let Some(event) = events.iter().find(|event| event.id == id)
        && event.allow_registration == Some(false)
    {
        bail!("Event {id} does not accept registrations.");
    }

    let envelope = ctx
        .api()
        .join_event(id)
        .await
        .with_context(|| format!("join event {id}"))?;
    accepted(envelope, "Joining the event")?;
    println!("Registered for event {id}.");
    list(ctx).await
}

pub async fn participants(ctx: &AppContext, id: i64) -> Result<()> {
    guards::require_login(&ctx.session.snapshot())?;

    let envelope = ctx
        .api()
        .event_participants(id)
        .await
        .with_context(|| format!("list participants of event {id}"))?;
    let participants = accepted(envelope, "Listing participants")?.participants;
    if participants.is_empty() {
        println!("No participants yet.");
    } else {
        println!("{}", render::participants(&participants));
    }
    Ok(())
}
