//! The `{ success, error?, ...payload }` JSON envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ApiResponse, ApiResult, RequestError};

/// Payload of calls that return nothing beyond the envelope flags.
///
/// Any extra fields the server adds (ids, messages) are kept here.
pub type Acknowledgement = Map<String, Value>;

/// Typed view of the API's JSON envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Envelope<T> {
    /// Returns the payload only when the server reported success.
    pub fn accepted(self) -> Option<T> {
        self.success.then_some(self.data)
    }
}

impl<T> Envelope<T>
where
    T: DeserializeOwned + Default,
{
    /// Decodes a normalized response.
    ///
    /// A bodiless success decodes as `success: true` with a default payload.
    ///
    /// # Errors
    /// Returns a parse error when the JSON does not match `T` or the
    /// response is a report document.
    pub fn from_response(response: ApiResponse) -> ApiResult<Self> {
        match response {
            ApiResponse::Json(value) => serde_json::from_value(value)
                .map_err(|e| RequestError::parse(format!("Unexpected response shape: {e}"))),
            ApiResponse::Ok => Ok(Self {
                success: true,
                error: None,
                data: T::default(),
            }),
            ApiResponse::Report(report) => Err(RequestError::parse(format!(
                "Expected a JSON response, got {}",
                report.content_type
            ))),
        }
    }
}

/// Extracts the server's error message from a JSON body.
///
/// Empty strings, `null` and `false` count as "no message"; other non-string
/// values are rendered as JSON.
pub(crate) fn error_message(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) if message.is_empty() => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::EventList;

    #[test]
    fn test_error_message_variants() {
        assert_eq!(
            error_message(&json!({"error": "db down"})),
            Some("db down".to_string())
        );
        assert_eq!(error_message(&json!({"error": ""})), None);
        assert_eq!(error_message(&json!({"error": null})), None);
        assert_eq!(error_message(&json!({"success": false})), None);
        assert_eq!(
            error_message(&json!({"error": {"code": 7}})),
            Some(r#"{"code":7}"#.to_string())
        );
    }

    #[test]
    fn test_bodiless_success_decodes_as_empty_payload() {
        let envelope: Envelope<EventList> = Envelope::from_response(ApiResponse::Ok).unwrap();
        assert!(envelope.success);
        assert!(envelope.data.events.is_empty());
    }

    #[test]
    fn test_accepted_requires_success() {
        let envelope: Envelope<Acknowledgement> = Envelope::from_response(ApiResponse::Json(
            json!({"success": false, "error": "nope", "id": 3}),
        ))
        .unwrap();
        assert_eq!(envelope.error.as_deref(), Some("nope"));
        assert!(envelope.accepted().is_none());
    }

    #[test]
    fn test_acknowledgement_keeps_extra_fields() {
        let envelope: Envelope<Acknowledgement> =
            Envelope::from_response(ApiResponse::Json(json!({"success": true, "id": 12})))
                .unwrap();
        let data = envelope.accepted().unwrap();
        assert_eq!(data.get("id"), Some(&json!(12)));
        assert!(!data.contains_key("success"));
    }
}
