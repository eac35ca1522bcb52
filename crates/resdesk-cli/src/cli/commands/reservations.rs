//! Reservation command handlers.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use resdesk_core::fence::RefetchFence;
use resdesk_core::models::{Equipment, NewReservation, Reservation, User};

use super::accepted;
use crate::cli::context::AppContext;
use crate::cli::guards;
use crate::cli::render::{self, ReservationRow};

/// Reservations plus the equipment list used to label them.
struct ReservationsView<'a> {
    ctx: &'a AppContext,
    user: User,
    privileged: bool,
    fence: RefetchFence,
    reservations: Vec<Reservation>,
    equipment: Vec<Equipment>,
}

impl<'a> ReservationsView<'a> {
    fn new(ctx: &'a AppContext, user: User) -> Self {
        let privileged = user.role().is_privileged();
        Self {
            ctx,
            user,
            privileged,
            fence: RefetchFence::new(),
            reservations: Vec::new(),
            equipment: Vec::new(),
        }
    }

    /// Loads reservations and equipment concurrently.
    ///
    /// Equipment is only used for labels, so its failure leaves the list empty.
    ///
    /// Refetches on one view run one at a time through `&mut self`, so every
    /// ticket is still current when it is applied; the fence only drops results
    /// when callers share it across overlapping loads.
    async fn refetch(&mut self) -> Result<()> {
        let ticket = self.fence.begin();
        let ctx = self.ctx;
        let api = ctx.api();

        let (reservations, equipment) =
            tokio::join!(api.list_reservations(self.privileged), api.list_equipment());

        let reservations = accepted(
            reservations.context("list reservations")?,
            "Listing reservations",
        )?
        .reservations;
        let equipment = match equipment {
            Ok(envelope) => envelope.accepted().map(|list| list.equipment).unwrap_or_default(),
            Err(err) if err.is_cancelled() => return Err(err.into()),
            Err(err) => {
                tracing::warn!(error = %err, "equipment unavailable, labels fall back to ids");
                Vec::new()
            }
        };

        self.fence
            .apply(ticket, (reservations, equipment), |(reservations, equipment)| {
                self.reservations = reservations;
                self.equipment = equipment;
            });
        Ok(())
    }

    fn find(&self, id: i64) -> Result<&Reservation> {
        self.reservations
            .iter()
            .find(|reservation| reservation.id == id)
            .with_context(|| format!("Reservation {id} not found"))
    }

    fn equipment_label(&self, names: &HashMap<i64, &str>, reservation: &Reservation) -> String {
        if let Some(name) = reservation.equipment_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        match reservation.equipment_id {
            Some(id) => names
                .get(&id)
                .map_or_else(|| format!("#{id}"), |name| (*name).to_string()),
            None => "-".to_string(),
        }
    }

    fn actions(&self, reservation: &Reservation) -> Vec<&'static str> {
        let mut actions = Vec::new();
        if reservation.can_confirm(self.privileged) {
            actions.push("confirm");
        }
        if reservation.can_complete(self.privileged) {
            actions.push("complete");
        }
        if reservation.can_extend(self.user.id) {
            actions.push("extend");
        }
        actions
    }

    fn print(&self) {
        if self.reservations.is_empty() {
            println!("No reservations found.");
            return;
        }

        let names: HashMap<i64, &str> = self
            .equipment
            .iter()
            .map(|item| (item.id, item.name.as_str()))
            .collect();
        let rows: Vec<ReservationRow<'_>> = self
            .reservations
            .iter()
            .map(|reservation| ReservationRow {
                reservation,
                equipment: self.equipment_label(&names, reservation),
                actions: self.actions(reservation),
            })
            .collect();
        println!("{}", render::reservations(&rows, self.privileged));
    }
}

async fn open_view(ctx: &AppContext) -> Result<ReservationsView<'_>> {
    let user = guards::require_login(&ctx.session.snapshot())?.clone();
    let mut view = ReservationsView::new(ctx, user);
    view.refetch().await?;
    Ok(view)
}

pub async fn list(ctx: &AppContext) -> Result<()> {
    open_view(ctx).await?.print();
    Ok(())
}

pub async fn create(ctx: &AppContext, reservation: &NewReservation) -> Result<()> {
    let user = guards::require_login(&ctx.session.snapshot())?.clone();
    if reservation.start_time.trim().is_empty() || reservation.end_time.trim().is_empty() {
        bail!("Start and end times are required.");
    }

    let envelope = ctx
        .api()
        .create_reservation(reservation)
        .await
        .context("create reservation")?;
    accepted(envelope, "Creating the reservation")?;
    println!("Reservation requested.");

    let mut view = ReservationsView::new(ctx, user);
    view.refetch().await?;
    view.print();
    Ok(())
}

pub async fn confirm(ctx: &AppContext, id: i64) -> Result<()> {
    guards::require_privileged(&ctx.session.snapshot())?;
    let mut view = open_view(ctx).await?;
    let reservation = view.find(id)?;
    if !reservation.can_confirm(view.privileged) {
        bail!(
            "Reservation {id} cannot be confirmed (status: {}).",
            reservation.status
        );
    }

    let envelope = ctx
        .api()
        .confirm_reservation(id)
        .await
        .with_context(|| format!("confirm reservation {id}"))?;
    accepted(envelope, "Confirming the reservation")?;
    println!("Reservation {id} confirmed.");

    view.refetch().await?;
    view.print();
    Ok(())
}

pub async fn complete(ctx: &AppContext, id: i64) -> Result<()> {
    guards::require_privileged(&ctx.session.snapshot())?;
    let mut view = open_view(ctx).await?;
    let reservation = view.find(id)?;
    if !reservation.can_complete(view.privileged) {
        bail!(
            "Reservation {id} cannot be completed (status: {}).",
            reservation.status
        );
    }

    let envelope = ctx
        .api()
        .complete_reservation(id)
        .await
        .with_context(|| format!("complete reservation {id}"))?;
    accepted(envelope, "Completing the reservation")?;
    println!("Reservation {id} completed.");

    view.refetch().await?;
    view.print();
    Ok(())
}

pub async fn extend(ctx: &AppContext, id: i64, new_end_time: &str) -> Result<()> {
    if new_end_time.trim().is_empty() {
        bail!("A new end time is required.");
    }
    let mut view = open_view(ctx).await?;
    let reservation = view.find(id)?;
    if !reservation.can_extend(view.user.id) {
        bail!(
            "Reservation {id} cannot be extended: only the owner can extend a confirmed or active reservation."
        );
    }

    let envelope = ctx
        .api()
        .extend_reservation(id, new_end_time.trim())
        .await
        .with_context(|| format!("extend reservation {id}"))?;
    accepted(envelope, "Extending the reservation")?;
    println!("Reservation {id} now ends at {}.", new_end_time.trim());

    view.refetch().await?;
    view.print();
    Ok(())
}
