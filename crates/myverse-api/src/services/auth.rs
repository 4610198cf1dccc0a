use myverse_core::models::{
    AuthResponse, LoginData, PasswordChange, PreferencesInput, RegisterData, User,
    UserPreferences, UserUpdate,
};
use serde::Deserialize;

use crate::client::{ApiClient, Message};
use crate::error::ApiError;

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Deserialize)]
struct PreferencesEnvelope {
    preferences: Option<UserPreferences>,
}

/// `/auth/*` endpoints. Session bookkeeping lives in `SessionManager`.
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Sent without the current credential, so a rejection leaves an
    /// existing session alone.
    pub async fn login(&self, data: &LoginData) -> Result<AuthResponse, ApiError> {
        self.client.post_public("/auth/login", data).await
    }

    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse, ApiError> {
        self.client.post_public("/auth/register", data).await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let env: UserEnvelope = self.client.get("/auth/me").await?;
        Ok(env.user)
    }

    pub async fn update_profile(&self, update: &UserUpdate) -> Result<User, ApiError> {
        let env: UserEnvelope = self.client.put("/auth/update-profile", update).await?;
        Ok(env.user)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<String, ApiError> {
        let msg: Message = self.client.put("/auth/change-password", change).await?;
        Ok(msg.message)
    }

    pub async fn save_preferences(
        &self,
        prefs: &PreferencesInput,
    ) -> Result<Option<UserPreferences>, ApiError> {
        let env: PreferencesEnvelope = self.client.post("/auth/preferences", prefs).await?;
        Ok(env.preferences)
    }

    pub async fn preferences(&self) -> Result<Option<UserPreferences>, ApiError> {
        let env: PreferencesEnvelope = self.client.get("/auth/preferences").await?;
        Ok(env.preferences)
    }
}
