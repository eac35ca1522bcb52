//! Typed operations, one per API endpoint.

use serde::de::DeserializeOwned;

use super::{Acknowledgement, ApiClient, ApiResponse, ApiResult, Envelope, RequestError, ReportPayload};
use crate::models::{
    Credentials, EquipmentForm, EquipmentList, EquipmentPayload, EventList, NewEvent,
    NewReservation, NewUser, ParticipantList, Registration, ReservationExtension,
    ReservationList, UserList, UserPayload, UserUpdate,
};
use crate::report::{self, ReportFilters, ReportKind};

fn decode<T>(response: ApiResponse) -> ApiResult<Envelope<T>>
where
    T: DeserializeOwned + Default,
{
    Envelope::from_response(response)
}

impl ApiClient {
    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub async fn login(&self, credentials: &Credentials) -> ApiResult<Envelope<UserPayload>> {
        decode(self.post_json("/api/login", credentials).await?)
    }

    pub async fn register(&self, registration: &Registration) -> ApiResult<Envelope<UserPayload>> {
        decode(self.post_json("/api/register", registration).await?)
    }

    pub async fn logout(&self) -> ApiResult<Envelope<Acknowledgement>> {
        decode(self.post("/api/logout").await?)
    }

    /// Current identity behind the session cookie.
    pub async fn me(&self) -> ApiResult<Envelope<UserPayload>> {
        decode(self.get("/api/me").await?)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub async fn list_events(&self) -> ApiResult<Envelope<EventList>> {
        decode(self.get("/api/events").await?)
    }

    pub async fn create_event(&self, event: &NewEvent) -> ApiResult<Envelope<Acknowledgement>> {
        decode(self.post_json("/api/events", event).await?)
    }

    pub async fn join_event(&self, id: i64) -> ApiResult<Envelope<Acknowledgement>> {
        decode(self.post(&format!("/api/events/{id}/join")).await?)
    }

    pub async fn event_participants(&self, id: i64) -> ApiResult<Envelope<ParticipantList>> {
        decode(self.get(&format!("/api/events/{id}/participants")).await?)
    }

    // ------------------------------------------------------------------
    // Equipment
    // ------------------------------------------------------------------

    pub async fn list_equipment(&self) -> ApiResult<Envelope<EquipmentList>> {
        decode(self.get("/api/equipment").await?)
    }

    pub async fn get_equipment(&self, id: i64) -> ApiResult<Envelope<EquipmentPayload>> {
        decode(self.get(&format!("/api/equipment/{id}")).await?)
    }

    pub async fn create_equipment(
        &self,
        form: &EquipmentForm,
    ) -> ApiResult<Envelope<Acknowledgement>> {
        decode(self.post_json("/api/equipment", form).await?)
    }

    pub async fn update_equipment(
        &self,
        id: i64,
        form: &EquipmentForm,
    ) -> ApiResult<Envelope<Acknowledgement>> {
        decode(self.put_json(&format!("/api/equipment/{id}"), form).await?)
    }

    pub async fn delete_equipment(&self, id: i64) -> ApiResult<Envelope<Acknowledgement>> {
        decode(self.delete(&format!("/api/equipment/{id}")).await?)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn list_users(&self) -> ApiResult<Envelope<UserList>> {
        decode(self.get("/api/users").await?)
    }

    pub async fn get_user(&self, id: i64) -> ApiResult<Envelope<UserPayload>> {
        decode(self.get(&format!("/api/users/{id}")).await?)
    }

    pub async fn create_user(&self, user: &NewUser) -> ApiResult<Envelope<Acknowledgement>> {
        decode(self.post_json("/api/users", user).await?)
    }

    pub async fn update_user(
        &self,
        id: i64,
        update: &UserUpdate,
    ) -> ApiResult<Envelope<Acknowledgement>> {
        decode(self.put_json(&format!("/api/users/{id}"), update).await?)
    }

    pub async fn delete_user(&self, id: i64) -> ApiResult<Envelope<Acknowledgement>> {
        decode(self.delete(&format!("/api/users/{id}")).await?)
    }

    // ------------------------------------------------------------------
    // Reservations
    // ------------------------------------------------------------------

    /// Lists reservations; `all` asks for every user's (privileged only).
    pub async fn list_reservations(&self, all: bool) -> ApiResult<Envelope<ReservationList>> {
        let endpoint = if all {
            "/api/reservations?all=1"
        } else {
            "/api/reservations"
        };
        decode(self.get(endpoint).await?)
    }

    pub async fn create_reservation(
        &self,
        reservation: &NewReservation,
    ) -> ApiResult<Envelope<Acknowledgement>> {
        decode(self.post_json("/api/reservations", reservation).await?)
    }

    pub async fn confirm_reservation(&self, id: i64) -> ApiResult<Envelope<Acknowledgement>> {
        decode(self.post(&format!("/api/reservations/{id}/confirm")).await?)
    }

    pub async fn extend_reservation(
        &self,
        id: i64,
        new_end_time: &str,
    ) -> ApiResult<Envelope<Acknowledgement>> {
        let body = ReservationExtension {
            new_end_time: new_end_time.to_string(),
        };
        decode(
            self.post_json(&format!("/api/reservations/{id}/extend"), &body)
                .await?,
        )
    }

    pub async fn complete_reservation(&self, id: i64) -> ApiResult<Envelope<Acknowledgement>> {
        decode(self.post(&format!("/api/reservations/{id}/complete")).await?)
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    /// Absolute report URL, suitable for opening in a browser.
    pub fn report_url(&self, kind: ReportKind, filters: &ReportFilters) -> String {
        report::report_url(self.base_url(), kind, &filters.params())
    }

    /// Downloads a report document.
    ///
    /// # Errors
    /// Fails with a parse error when the server answers with JSON or no body.
    pub async fn fetch_report(
        &self,
        kind: ReportKind,
        filters: &ReportFilters,
    ) -> ApiResult<ReportPayload> {
        let endpoint = report::report_endpoint(kind, &filters.params());
        match self.get(&endpoint).await? {
            ApiResponse::Report(payload) => Ok(payload),
            ApiResponse::Json(_) | ApiResponse::Ok => Err(RequestError::parse(
                "Expected a PDF or HTML report document",
            )),
        }
    }
}
