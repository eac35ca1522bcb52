//! Per-invocation state shared by API-backed commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::cookie::Jar;
use resdesk_core::api::{ApiClient, RequestError, SessionCookies};
use resdesk_core::config::Config;
use resdesk_core::session::SessionStore;
use tokio_util::sync::CancellationToken;

pub struct AppContext {
    pub session: SessionStore,
    base_url: String,
    session_path: PathBuf,
}

impl AppContext {
    /// Builds the client, restores saved cookies and probes the session.
    pub async fn open(
        config: &Config,
        base_url_override: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let base_url = config.effective_base_url(base_url_override)?;
        let session_path = SessionCookies::path();

        let jar = Arc::new(Jar::default());
        match SessionCookies::load_from(&session_path) {
            Ok(Some(saved)) => {
                saved.restore_into(&jar, &base_url)?;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %format!("{e:#}"), "ignoring unreadable session file"),
        }

        let client = ApiClient::with_cookie_jar(config.api_config(base_url.clone()), jar)
            .context("create API client")?
            .with_cancellation(cancel.clone());
        let session = SessionStore::new(client);
        session.refresh().await;
        if cancel.is_cancelled() {
            return Err(RequestError::cancelled().into());
        }

        Ok(Self {
            session,
            base_url,
            session_path,
        })
    }

    pub fn api(&self) -> &ApiClient {
        self.session.client()
    }

    /// Saves the session cookies while someone is logged in.
    pub fn persist(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            return Ok(());
        }
        let cookies = SessionCookies::capture(self.api().cookie_jar(), &self.base_url)?;
        if cookies.is_empty() {
            return Ok(());
        }
        cookies
            .save_to(&self.session_path)
            .with_context(|| format!("save session to {}", self.session_path.display()))
    }

    /// Deletes the saved session.
    pub fn forget(&self) -> Result<()> {
        SessionCookies::remove_at(&self.session_path)
    }
}
