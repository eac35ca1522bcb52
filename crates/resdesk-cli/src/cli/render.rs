//! Table rendering for command output.

use comfy_table::{ContentArrangement, Table};
use resdesk_core::models::{Equipment, Event, Participant, Reservation, User};

const EMPTY_CELL: &str = "-";

fn or_dash(value: Option<&str>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(EMPTY_CELL)
        .to_string()
}

fn yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => EMPTY_CELL,
    }
}

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

pub fn events(events: &[Event]) -> String {
    let mut table = table(&["ID", "Title", "Type", "Starts", "Ends", "Location", "Capacity"]);
    for event in events {
        table.add_row(vec![
            event.id.to_string(),
            event.title.clone(),
            event.kind.clone(),
            event.start_at.clone(),
            event.end_at.clone(),
            or_dash(event.location.as_deref()),
            event
                .capacity
                .map_or_else(|| EMPTY_CELL.to_string(), |c| c.to_string()),
        ]);
    }
    table.to_string()
}

pub fn participants(participants: &[Participant]) -> String {
    let mut table = table(&["ID", "Username", "Display name", "Email"]);
    for participant in participants {
        table.add_row(vec![
            participant.id.to_string(),
            participant.username.clone(),
            or_dash(participant.display_name.as_deref()),
            or_dash(participant.email.as_deref()),
        ]);
    }
    table.to_string()
}

pub fn equipment(items: &[Equipment]) -> String {
    let mut table = table(&["ID", "Name", "SKU", "Status", "Notes"]);
    for item in items {
        table.add_row(vec![
            item.id.to_string(),
            item.name.clone(),
            or_dash(item.sku.as_deref()),
            item.status.clone(),
            or_dash(item.notes.as_deref()),
        ]);
    }
    table.to_string()
}

pub fn users(users: &[User]) -> String {
    let mut table = table(&["ID", "Username", "Email", "Display name", "Role", "Active"]);
    for user in users {
        table.add_row(vec![
            user.id.to_string(),
            user.username.clone(),
            user.email.clone(),
            or_dash(user.display_name.as_deref()),
            user.role().label().to_string(),
            yes_no(user.is_active).to_string(),
        ]);
    }
    table.to_string()
}

/// One reservation row: the record, its equipment label and the actions the
/// current user may take on it.
pub struct ReservationRow<'a> {
    pub reservation: &'a Reservation,
    pub equipment: String,
    pub actions: Vec<&'static str>,
}

pub fn reservations(rows: &[ReservationRow<'_>], show_owner: bool) -> String {
    let mut header = vec!["ID", "Equipment", "Start", "End", "Status"];
    if show_owner {
        header.insert(1, "User");
    }
    header.push("Actions");

    let mut table = table(&header);
    for row in rows {
        let reservation = row.reservation;
        let mut cells = vec![
            reservation.id.to_string(),
            row.equipment.clone(),
            reservation.start_time.clone(),
            reservation.end_time.clone(),
            reservation.status.clone(),
        ];
        if show_owner {
            let owner = reservation
                .username
                .clone()
                .unwrap_or_else(|| format!("#{}", reservation.user_id));
            cells.insert(1, owner);
        }
        cells.push(if row.actions.is_empty() {
            EMPTY_CELL.to_string()
        } else {
            row.actions.join(", ")
        });
        table.add_row(cells);
    }
    table.to_string()
}

/// Key/value profile card.
pub fn profile(user: &User) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["ID".to_string(), user.id.to_string()]);
    table.add_row(vec!["Username".to_string(), user.username.clone()]);
    table.add_row(vec!["Email".to_string(), user.email.clone()]);
    table.add_row(vec![
        "Display name".to_string(),
        or_dash(user.display_name.as_deref()),
    ]);
    table.add_row(vec!["Role".to_string(), user.role().label().to_string()]);
    table.to_string()
}
