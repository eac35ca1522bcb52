//! Integration tests for response normalization and typed endpoints.

use std::time::Duration;

use resdesk_core::api::{ApiClient, ApiConfig, ApiResponse, RequestErrorKind};
use resdesk_core::models::{EquipmentForm, EquipmentStatus};
use resdesk_core::report::{ReportFilters, ReportKind};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(ApiConfig::new(server.uri())).unwrap()
}

#[tokio::test]
async fn test_json_success_is_returned_unchanged() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let body = json!({"success": true, "events": [{"id": 1, "title": "Open day", "type": "info"}]});
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let response = client(&server).get("/api/events").await.unwrap();
    assert_eq!(response, ApiResponse::Json(body));
}

#[tokio::test]
async fn test_server_error_message_is_surfaced() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "db down"})))
        .mount(&server)
        .await;

    let err = client(&server).list_events().await.unwrap_err();
    assert_eq!(err.to_string(), "db down");
    assert_eq!(err.kind, RequestErrorKind::HttpStatus);
    assert_eq!(err.status, Some(500));
}

#[tokio::test]
async fn test_json_error_without_message_is_returned() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events/3/join"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let envelope = client(&server).join_event(3).await.unwrap();
    assert!(!envelope.success);
    assert!(envelope.accepted().is_none());
}

#[tokio::test]
async fn test_non_json_error_uses_status() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/users/4"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server).delete_user(4).await.unwrap_err();
    assert_eq!(err.to_string(), "Error 500");
}

#[tokio::test]
async fn test_empty_success_decodes_as_success() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reservations/9/confirm"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let api = client(&server);
    assert_eq!(api.post("/api/reservations/9/confirm").await.unwrap(), ApiResponse::Ok);
    assert!(api.confirm_reservation(9).await.unwrap().success);
}

#[tokio::test]
async fn test_pdf_report_is_returned_raw() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/events"))
        .and(query_param("start_date", "2025-01-01"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;

    let filters = ReportFilters {
        start_date: Some("2025-01-01".to_string()),
        ..Default::default()
    };
    let api = client(&server);
    let report = api.fetch_report(ReportKind::Events, &filters).await.unwrap();
    assert!(report.is_pdf());
    assert_eq!(report.bytes.as_ref(), b"%PDF-1.4");
    assert_eq!(
        api.report_url(ReportKind::Events, &filters),
        format!("{}/api/reports/events?start_date=2025-01-01", server.uri())
    );
}

#[tokio::test]
async fn test_html_report_is_returned_raw() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let page = "<html><body><h1>Reservations</h1></body></html>";
    Mock::given(method("GET"))
        .and(path("/api/reports/reservations"))
        .and(query_param("status", "pending"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(page.as_bytes().to_vec(), "text/html; charset=utf-8"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let filters = ReportFilters {
        status: Some("pending".to_string()),
        ..Default::default()
    };
    let api = client(&server);
    let report = api.fetch_report(ReportKind::Reservations, &filters).await.unwrap();
    assert!(!report.is_pdf());
    assert_eq!(report.file_extension(), "html");
    assert_eq!(report.bytes.as_ref(), page.as_bytes());

    let raw = api
        .get("/api/reports/reservations?status=pending")
        .await
        .unwrap();
    assert!(matches!(raw, ApiResponse::Report(payload) if payload.content_type.starts_with("text/html")));
}

#[tokio::test]
async fn test_reservations_all_flag_and_extend_body() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reservations"))
        .and(query_param("all", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "reservations": [{
                "id": 5, "user_id": 2, "start_time": "2025-01-01T10:00",
                "end_time": "2025-01-01T12:00", "status": "pending"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/reservations/5/extend"))
        .and(body_json(json!({"new_end_time": "2025-01-01T14:00"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let list = api.list_reservations(true).await.unwrap();
    assert_eq!(list.data.reservations.len(), 1);
    assert_eq!(list.data.reservations[0].status, "pending");

    let ack = api.extend_reservation(5, "2025-01-01T14:00").await.unwrap();
    assert!(ack.success);
}

#[tokio::test]
async fn test_equipment_update_sends_json_body() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/equipment/2"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "name": "Camera", "sku": "CAM-1", "status": "maintenance", "notes": ""
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let form = EquipmentForm {
        name: "Camera".to_string(),
        sku: "CAM-1".to_string(),
        status: EquipmentStatus::Maintenance.to_string(),
        notes: String::new(),
    };
    assert!(client(&server).update_equipment(2, &form).await.unwrap().success);
}

#[tokio::test]
async fn test_transport_failure_is_reported() {
    let api = ApiClient::new(ApiConfig::new("http://127.0.0.1:9")).unwrap();
    let err = api.me().await.unwrap_err();
    assert_eq!(err.kind, RequestErrorKind::Transport);
}

#[tokio::test]
async fn test_cancellation_aborts_in_flight_request() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/equipment"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "equipment": []}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let api = client(&server).with_cancellation(token.clone());
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let err = tokio::time::timeout(Duration::from_secs(5), api.list_equipment())
        .await
        .expect("request should abort before the mock responds")
        .unwrap_err();
    assert!(err.is_cancelled());
}
