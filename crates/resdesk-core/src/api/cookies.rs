//! Session cookie persistence across CLI invocations.
//!
//! The API authenticates with a server-issued session cookie. Between runs the
//! cookies are kept in `<home>/session.json`, scoped to the base URL they were
//! issued for.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::paths;

/// Endpoint whose URL scopes captured cookies.
const PROBE_ENDPOINT: &str = "/api/me";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookies {
    pub base_url: String,
    /// `name=value` pairs.
    #[serde(default)]
    pub cookies: Vec<String>,
}

impl SessionCookies {
    pub fn path() -> PathBuf {
        paths::session_path()
    }

    /// Reads cookies from `path`, `None` when the file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session from {}", path.display()))?;
        let session = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", path.display()))?;
        Ok(Some(session))
    }

    /// Writes cookies to `path` with restricted permissions (0600).
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }

    /// Deletes the session file if present.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove_at(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }

    /// Snapshots the cookies `jar` would send to `base_url`.
    ///
    /// # Errors
    /// Returns an error if `base_url` is not a valid URL.
    pub fn capture(jar: &Jar, base_url: &str) -> Result<Self> {
        let url = probe_url(base_url)?;
        let cookies = jar
            .cookies(&url)
            .and_then(|header| header.to_str().ok().map(str::to_string))
            .map(|header| {
                header
                    .split("; ")
                    .map(str::trim)
                    .filter(|pair| !pair.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cookies,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Loads the cookies into `jar` when they were issued for `base_url`.
    ///
    /// Returns whether anything was restored.
    ///
    /// # Errors
    /// Returns an error if `base_url` is not a valid URL.
    pub fn restore_into(&self, jar: &Jar, base_url: &str) -> Result<bool> {
        if self.base_url != base_url.trim_end_matches('/') {
            tracing::debug!(
                saved = %self.base_url,
                current = %base_url,
                "ignoring session saved for another base URL"
            );
            return Ok(false);
        }

        let url = probe_url(base_url)?;
        for cookie in &self.cookies {
            jar.add_cookie_str(&format!("{cookie}; Path=/"), &url);
        }
        Ok(!self.cookies.is_empty())
    }
}

fn probe_url(base_url: &str) -> Result<Url> {
    let raw = format!("{}{PROBE_ENDPOINT}", base_url.trim_end_matches('/'));
    Url::parse(&raw).with_context(|| format!("Invalid base URL: {base_url}"))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const BASE: &str = "http://localhost:8000";

    #[test]
    fn test_capture_and_restore_through_jar() {
        let jar = Jar::default();
        let url = probe_url(BASE).unwrap();
        jar.add_cookie_str("session=abc123; Path=/", &url);

        let saved = SessionCookies::capture(&jar, BASE).unwrap();
        assert_eq!(saved.cookies, vec!["session=abc123".to_string()]);

        let fresh = Jar::default();
        assert!(saved.restore_into(&fresh, BASE).unwrap());
        let header = fresh.cookies(&url).unwrap();
        assert_eq!(header.to_str().unwrap(), "session=abc123");
    }

    #[test]
    fn test_restore_skips_other_base_url() {
        let saved = SessionCookies {
            base_url: "http://other:9000".to_string(),
            cookies: vec!["session=x".to_string()],
        };
        let jar = Jar::default();
        assert!(!saved.restore_into(&jar, BASE).unwrap());
        assert!(jar.cookies(&probe_url(BASE).unwrap()).is_none());
    }

    #[test]
    fn test_save_load_remove() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");
        assert_eq!(SessionCookies::load_from(&path).unwrap(), None);

        let session = SessionCookies {
            base_url: BASE.to_string(),
            cookies: vec!["session=abc".to_string()],
        };
        session.save_to(&path).unwrap();
        assert_eq!(SessionCookies::load_from(&path).unwrap(), Some(session));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        SessionCookies::remove_at(&path).unwrap();
        assert!(!path.exists());
        SessionCookies::remove_at(&path).unwrap();
    }
}
