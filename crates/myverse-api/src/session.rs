use std::sync::Arc;

use myverse_core::models::{
    LoginData, PasswordChange, PreferencesInput, RegisterData, User, UserPreferences, UserUpdate,
};
use myverse_core::routes::{guard, Guard, Navigator, Route};
use myverse_core::session::{SessionEvent, SessionSnapshot, SessionStore};
use myverse_core::validation;

use crate::client::ApiClient;
use crate::error::ApiError;

/// Session lifecycle: startup validation, login/logout, profile updates.
///
/// All state lives in the shared [`SessionStore`]; this type sequences the
/// API calls and the events they produce.
#[derive(Clone)]
pub struct SessionManager {
    client: ApiClient,
}

impl SessionManager {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        self.client.session()
    }

    pub fn navigator(&self) -> &Navigator {
        self.client.navigator()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.store().read()
    }

    /// Restore and validate a persisted session. Never fails; on return the
    /// session is no longer loading.
    pub async fn initialize(&self) -> SessionSnapshot {
        if let Some((token, cached)) = self.store().persisted() {
            tracing::debug!(user = %cached.username, "validating persisted session");
            self.store().dispatch(SessionEvent::Restored { token });
            match self.client.auth().me().await {
                Ok(user) => {
                    tracing::info!(user = %user.username, "session restored");
                    self.store().dispatch(SessionEvent::Validated(user));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "persisted session rejected");
                    self.store().dispatch(SessionEvent::Invalidated);
                }
            }
        }
        self.store().dispatch(SessionEvent::Loaded);
        self.snapshot()
    }

    /// Sign in. On failure the previous session, if any, is left as it was.
    pub async fn login(&self, credentials: &LoginData) -> Result<User, ApiError> {
        validation::login(credentials)?;
        let resp = self.client.auth().login(credentials).await?;
        let user = resp.user.clone();
        self.store().dispatch(SessionEvent::SignedIn {
            token: resp.access_token,
            user: resp.user,
        });
        let next = self.store().take_redirect().unwrap_or(Route::Dashboard);
        self.navigator().navigate(next);
        Ok(user)
    }

    /// Create an account, sign in, and go to onboarding.
    pub async fn register(&self, data: &RegisterData) -> Result<User, ApiError> {
        validation::register(data)?;
        let resp = self.client.auth().register(data).await?;
        let user = resp.user.clone();
        self.store().dispatch(SessionEvent::SignedIn {
            token: resp.access_token,
            user: resp.user,
        });
        self.navigator().navigate(Route::Onboarding);
        Ok(user)
    }

    pub fn logout(&self) {
        let transition = self.store().dispatch(SessionEvent::SignedOut);
        if let Some(route) = transition.navigate {
            self.navigator().navigate(route);
        }
    }

    /// Send a partial profile update; the cached user is replaced only on success.
    pub async fn update_user(&self, update: &UserUpdate) -> Result<User, ApiError> {
        let user = self.client.auth().update_profile(update).await?;
        self.store().dispatch(SessionEvent::UserUpdated(user.clone()));
        Ok(user)
    }

    /// Re-fetch the current user; any failure signs out.
    pub async fn refresh_user(&self) -> Result<User, ApiError> {
        match self.client.auth().me().await {
            Ok(user) => {
                self.store().dispatch(SessionEvent::UserUpdated(user.clone()));
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "refreshing user failed; signing out");
                self.logout();
                Err(e)
            }
        }
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<String, ApiError> {
        validation::password_change(change)?;
        self.client.auth().change_password(change).await
    }

    pub async fn save_preferences(
        &self,
        prefs: &PreferencesInput,
    ) -> Result<Option<UserPreferences>, ApiError> {
        let saved = self.client.auth().save_preferences(prefs).await?;
        if let Some(p) = &saved {
            self.store().dispatch(SessionEvent::PreferencesUpdated(p.clone()));
        }
        Ok(saved)
    }

    /// Cached preferences, fetched from the server on a miss.
    pub async fn preferences(&self) -> Result<Option<UserPreferences>, ApiError> {
        if let Some(p) = self.store().preferences() {
            return Ok(Some(p));
        }
        let fetched = self.client.auth().preferences().await?;
        if let Some(p) = &fetched {
            self.store().dispatch(SessionEvent::PreferencesUpdated(p.clone()));
        }
        Ok(fetched)
    }

    /// Navigate to `route` through the access guards. Returns where the
    /// navigator ended up (unchanged while the session is loading).
    pub fn visit(&self, route: Route) -> Route {
        let snap = self.snapshot();
        match guard(&route, snap.is_authenticated(), snap.loading) {
            Guard::Allow => self.navigator().navigate(route),
            Guard::Wait => {}
            Guard::Redirect(Route::Login) => {
                self.store().remember_redirect(&route);
                self.navigator().navigate(Route::Login);
            }
            Guard::Redirect(to) => self.navigator().navigate(to),
        }
        self.navigator().current()
    }
}
