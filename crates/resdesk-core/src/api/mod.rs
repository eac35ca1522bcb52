//! HTTP client for the reservations API.
//!
//! Every call is a single attempt: no retries and no backoff. The caller
//! decides whether to try again.

mod cookies;
mod envelope;
mod error;
mod resources;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub use cookies::SessionCookies;
pub use envelope::{Acknowledgement, Envelope};
pub use error::{ApiResult, RequestError, RequestErrorKind};

/// Standard User-Agent header for resdesk requests.
pub const USER_AGENT: &str = concat!("resdesk/", env!("CARGO_PKG_VERSION"));

const JSON_CONTENT_TYPE: &str = "application/json";
const PDF_CONTENT_TYPE: &str = "application/pdf";
const HTML_CONTENT_TYPE: &str = "text/html";

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// `None` disables the per-request timeout.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Raw report document (PDF or HTML) returned by the reports endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPayload {
    pub content_type: String,
    pub bytes: Bytes,
}

impl ReportPayload {
    pub fn is_pdf(&self) -> bool {
        self.content_type.contains(PDF_CONTENT_TYPE)
    }

    /// File extension matching the payload's content type.
    pub fn file_extension(&self) -> &'static str {
        if self.is_pdf() { "pdf" } else { "html" }
    }
}

/// The three response shapes the API produces, normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// JSON body, returned unchanged.
    Json(Value),
    /// Binary or HTML report document.
    Report(ReportPayload),
    /// Success without a JSON or report body.
    Ok,
}

impl ApiResponse {
    pub fn into_json(self) -> Option<Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Report(_) | ApiResponse::Ok => None,
        }
    }
}

/// Reservations API client.
///
/// Cloning is cheap: clones share the connection pool and cookie jar.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    jar: Arc<Jar>,
    cancel: CancellationToken,
}

impl ApiClient {
    /// Creates a client with an empty cookie jar.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Self::with_cookie_jar(config, Arc::new(Jar::default()))
    }

    /// Creates a client that stores and sends cookies through `jar`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_cookie_jar(config: ApiConfig, jar: Arc<Jar>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("build HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            jar,
            cancel: CancellationToken::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns a client whose in-flight requests abort when `token` fires.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancel: token,
            ..self.clone()
        }
    }

    /// Absolute URL for an endpoint path such as `/api/events`.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub async fn get(&self, endpoint: &str) -> ApiResult<ApiResponse> {
        self.request::<()>(Method::GET, endpoint, None).await
    }

    /// POST without a body.
    pub async fn post(&self, endpoint: &str) -> ApiResult<ApiResponse> {
        self.request::<()>(Method::POST, endpoint, None).await
    }

    pub async fn post_json<B>(&self, endpoint: &str, body: &B) -> ApiResult<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    pub async fn put_json<B>(&self, endpoint: &str, body: &B) -> ApiResult<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResult<ApiResponse> {
        self.request::<()>(Method::DELETE, endpoint, None).await
    }

    /// Issues one request and normalizes the response.
    ///
    /// Aborts with [`RequestErrorKind::Cancelled`] as soon as the client's
    /// cancellation token fires, whether the request is still connecting or
    /// already reading its body.
    pub async fn request<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> ApiResult<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(endpoint);
        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!(%method, %url, "sending request");

        let exchange = async {
            let response = builder
                .send()
                .await
                .map_err(|e| RequestError::transport(&e))?;
            normalize_response(response).await
        };

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(RequestError::cancelled()),
            result = exchange => result,
        };

        if let Err(err) = &result {
            tracing::debug!(%method, %url, kind = %err.kind, status = ?err.status, "request failed");
        }
        result
    }
}

/// Normalizes a response into [`ApiResponse`].
///
/// - JSON: parsed; a non-2xx status with an `error` message fails with that
///   message, anything else is returned unchanged.
/// - PDF/HTML: raw payload.
/// - Other: generic status error on non-2xx, else [`ApiResponse::Ok`].
async fn normalize_response(response: Response) -> ApiResult<ApiResponse> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    tracing::debug!(status = status.as_u16(), content_type = %content_type, "response received");

    if content_type.contains(JSON_CONTENT_TYPE) {
        let body = response
            .bytes()
            .await
            .map_err(|e| RequestError::transport(&e))?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| RequestError::parse(format!("Invalid JSON response: {e}")))?;

        if !status.is_success()
            && let Some(message) = envelope::error_message(&value)
        {
            return Err(RequestError::http_status(status.as_u16(), message));
        }
        return Ok(ApiResponse::Json(value));
    }

    if content_type.contains(PDF_CONTENT_TYPE) || content_type.contains(HTML_CONTENT_TYPE) {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RequestError::transport(&e))?;
        return Ok(ApiResponse::Report(ReportPayload {
            content_type,
            bytes,
        }));
    }

    if !status.is_success() {
        return Err(RequestError::generic_status(status.as_u16()));
    }

    Ok(ApiResponse::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new(ApiConfig::new("http://localhost:8000/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/api/me"), "http://localhost:8000/api/me");
    }

    #[test]
    fn test_report_payload_extension() {
        let pdf = ReportPayload {
            content_type: "application/pdf".to_string(),
            bytes: Bytes::from_static(b"%PDF"),
        };
        assert!(pdf.is_pdf());
        assert_eq!(pdf.file_extension(), "pdf");

        let html = ReportPayload {
            content_type: "text/html; charset=utf-8".to_string(),
            bytes: Bytes::from_static(b"<html></html>"),
        };
        assert_eq!(html.file_extension(), "html");
    }

    #[test]
    fn test_with_cancellation_shares_jar() {
        let client = ApiClient::new(ApiConfig::new("http://localhost:8000")).unwrap();
        let token = CancellationToken::new();
        let scoped = client.with_cancellation(token.clone());
        token.cancel();

        assert!(scoped.cancellation_token().is_cancelled());
        assert!(!client.cancellation_token().is_cancelled());
        assert!(Arc::ptr_eq(client.cookie_jar(), scoped.cookie_jar()));
    }
}
