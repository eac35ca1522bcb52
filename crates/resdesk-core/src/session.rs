//! Session store: the single source of truth for who is logged in.

use std::sync::{PoisonError, RwLock};

use crate::api::{ApiClient, ApiResult};
use crate::models::{Credentials, Registration, Role, User};

/// Authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// Startup probe not finished yet
    #[default]
    Loading,
    Anonymous,
    Authenticated(User),
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            AuthState::Loading | AuthState::Anonymous => None,
        }
    }
}

/// Holds the current identity and performs the calls that change it.
///
/// Starts in [`AuthState::Loading`] until [`SessionStore::refresh`] runs.
pub struct SessionStore {
    client: ApiClient,
    state: RwLock<AuthState>,
}

impl SessionStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: RwLock::new(AuthState::Loading),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Probes `/api/me` and adopts the result.
    ///
    /// Never fails: any error is logged and treated as anonymous.
    pub async fn refresh(&self) {
        let next = match self.client.me().await {
            Ok(envelope) => envelope
                .accepted()
                .and_then(|payload| payload.user)
                .map_or(AuthState::Anonymous, AuthState::Authenticated),
            Err(err) => {
                tracing::warn!(error = %err, "session probe failed, continuing anonymously");
                AuthState::Anonymous
            }
        };
        self.set(next);
    }

    /// Logs in and adopts the returned user.
    ///
    /// Returns the user when the server accepted the credentials. A response
    /// without `success` and `user` leaves the state unchanged.
    ///
    /// # Errors
    /// Propagates request failures; the state is left unchanged.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Option<User>> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let envelope = self.client.login(&credentials).await?;
        Ok(self.adopt(envelope.accepted().and_then(|payload| payload.user)))
    }

    /// Registers an account and adopts the returned user.
    ///
    /// # Errors
    /// Propagates request failures; the state is left unchanged.
    pub async fn register(&self, registration: &Registration) -> ApiResult<Option<User>> {
        let envelope = self.client.register(registration).await?;
        Ok(self.adopt(envelope.accepted().and_then(|payload| payload.user)))
    }

    /// Logs out and clears the identity.
    ///
    /// # Errors
    /// Propagates request failures; the identity is kept in that case.
    pub async fn logout(&self) -> ApiResult<()> {
        self.client.logout().await?;
        self.set(AuthState::Anonymous);
        Ok(())
    }

    pub fn snapshot(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn user(&self) -> Option<User> {
        self.snapshot().user().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot() == AuthState::Loading
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.snapshot(), AuthState::Authenticated(_))
    }

    /// Role of the current user, `None` when anonymous.
    pub fn role(&self) -> Option<Role> {
        self.snapshot().user().map(User::role)
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(Role::is_admin)
    }

    pub fn is_manager(&self) -> bool {
        self.role().is_some_and(Role::is_manager)
    }

    pub fn is_admin_or_manager(&self) -> bool {
        self.role().is_some_and(Role::is_privileged)
    }

    fn adopt(&self, user: Option<User>) -> Option<User> {
        if let Some(user) = &user {
            tracing::info!(user_id = user.id, "session authenticated");
            self.set(AuthState::Authenticated(user.clone()));
        }
        user
    }

    fn set(&self, next: AuthState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}
