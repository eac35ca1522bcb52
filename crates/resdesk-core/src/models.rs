//! Records mirrored from API responses and the request bodies sent back.
//!
//! Records are plain attribute bags: fields are kept verbatim, statuses stay
//! strings so unknown values survive a round trip through the client.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Roles and users
// ============================================================================

/// Role derived from a numeric role id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Manager,
    User,
}

impl Role {
    pub const ADMIN_ID: i64 = 1;
    pub const MANAGER_ID: i64 = 2;
    pub const USER_ID: i64 = 3;

    /// Any id other than admin or manager is a regular user.
    pub fn from_id(role_id: i64) -> Self {
        match role_id {
            Self::ADMIN_ID => Role::Admin,
            Self::MANAGER_ID => Role::Manager,
            _ => Role::User,
        }
    }

    pub fn id(self) -> i64 {
        match self {
            Role::Admin => Self::ADMIN_ID,
            Role::Manager => Self::MANAGER_ID,
            Role::User => Self::USER_ID,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Manager => "Manager",
            Role::User => "User",
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    pub fn is_manager(self) -> bool {
        self == Role::Manager
    }

    /// Admins and managers.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "admin" | "administrator" | "1" => Ok(Role::Admin),
            "manager" | "2" => Ok(Role::Manager),
            "user" | "3" => Ok(Role::User),
            other => Err(format!(
                "Unknown role: {other} (expected admin, manager or user)"
            )),
        }
    }
}

/// An account as returned by `/api/me`, `/api/login` and `/api/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_id(self.role_id)
    }
}

/// User accounts managed from the users screen share the session shape.
pub type UserAccount = User;

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Registration {
    const MIN_USERNAME_LEN: usize = 3;
    const MIN_PASSWORD_LEN: usize = 6;

    /// Client-side checks run before the form is submitted.
    ///
    /// # Errors
    /// Returns the first failing rule as a user-facing message.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.chars().count() < Self::MIN_USERNAME_LEN {
            return Err(format!(
                "Username must be at least {} characters",
                Self::MIN_USERNAME_LEN
            ));
        }
        if !looks_like_email(&self.email) {
            return Err("Invalid email".to_string());
        }
        if self.password.chars().count() < Self::MIN_PASSWORD_LEN {
            return Err(format!(
                "Password must be at least {} characters",
                Self::MIN_PASSWORD_LEN
            ));
        }
        Ok(())
    }
}

/// `local@domain.tld` with no whitespace and a single `@`.
fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .split_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role_id: i64,
    pub is_active: bool,
}

/// Body of `PUT /api/users/{id}`.
///
/// `role_id` and `is_active` are only sent by administrators.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<UserAccount>,
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub start_at: String,
    #[serde(default)]
    pub end_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_registration: Option<bool>,
}

impl Event {
    /// In progress at `now`, or starting within `window` after it.
    ///
    /// Events whose timestamps cannot be parsed are never upcoming.
    pub fn is_upcoming(&self, now: DateTime<Local>, window: Duration) -> bool {
        let (Some(start), Some(end)) = (parse_timestamp(&self.start_at), parse_timestamp(&self.end_at))
        else {
            return false;
        };
        let in_progress = start <= now && end >= now;
        let starting_soon = start >= now && start <= now + window;
        in_progress || starting_soon
    }
}

/// Parses API timestamps: RFC 3339, or naive local date-times as produced by
/// HTML `datetime-local` inputs and SQL `DATETIME` columns.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Local>> {
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Local));
    }
    NAIVE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
    })
}

/// Body of `POST /api/events`.
#[derive(Debug, Clone, Serialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub start_at: String,
    pub end_at: String,
    pub location: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub allow_registration: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParticipantList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub participants: Vec<Participant>,
}

// ============================================================================
// Equipment
// ============================================================================

/// Known equipment states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    #[default]
    Available,
    InUse,
    Maintenance,
    Retired,
}

impl EquipmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EquipmentStatus::Available => "available",
            EquipmentStatus::InUse => "in_use",
            EquipmentStatus::Maintenance => "maintenance",
            EquipmentStatus::Retired => "retired",
        }
    }
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "available" => Ok(EquipmentStatus::Available),
            "in_use" | "in-use" => Ok(EquipmentStatus::InUse),
            "maintenance" => Ok(EquipmentStatus::Maintenance),
            "retired" => Ok(EquipmentStatus::Retired),
            other => Err(format!(
                "Unknown equipment status: {other} (expected available, in_use, maintenance or retired)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `POST /api/equipment` and `PUT /api/equipment/{id}`.
///
/// `status` is a raw string so a status this client doesn't know is sent back
/// as the server reported it.
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentForm {
    pub name: String,
    pub sku: String,
    pub status: String,
    pub notes: String,
}

impl From<&Equipment> for EquipmentForm {
    /// Pre-fills an edit form with the record's values, status included.
    fn from(item: &Equipment) -> Self {
        Self {
            name: item.name.clone(),
            sku: item.sku.clone().unwrap_or_default(),
            status: item.status.clone(),
            notes: item.notes.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EquipmentList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub equipment: Vec<Equipment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EquipmentPayload {
    #[serde(default)]
    pub equipment: Option<Equipment>,
}

// ============================================================================
// Reservations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Active => "active",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    /// Confirmed or active reservations can be extended or completed.
    pub fn is_open(self) -> bool {
        matches!(self, ReservationStatus::Confirmed | ReservationStatus::Active)
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "active" => Ok(ReservationStatus::Active),
            "completed" => Ok(ReservationStatus::Completed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            other => Err(format!("Unknown reservation status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<i64>,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Reservation {
    /// Parsed status, `None` for values this client doesn't know.
    pub fn status(&self) -> Option<ReservationStatus> {
        self.status.parse().ok()
    }

    /// Managers and admins confirm pending reservations.
    pub fn can_confirm(&self, privileged: bool) -> bool {
        privileged && self.status() == Some(ReservationStatus::Pending)
    }

    /// Managers and admins complete confirmed or active reservations.
    pub fn can_complete(&self, privileged: bool) -> bool {
        privileged && self.status().is_some_and(ReservationStatus::is_open)
    }

    /// Only the owner extends, and only while the reservation is open.
    pub fn can_extend(&self, user_id: i64) -> bool {
        self.user_id == user_id && self.status().is_some_and(ReservationStatus::is_open)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReservation {
    pub start_time: String,
    pub end_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReservationExtension {
    pub new_end_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReservationList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub reservations: Vec<Reservation>,
}
