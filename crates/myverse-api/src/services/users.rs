use myverse_core::models::{UserProfile, UserStats};
use serde::Deserialize;

use crate::client::ApiClient;
use crate::error::ApiError;

#[derive(Deserialize)]
#[serde(untagged)]
enum ProfileBody {
    Wrapped { profile: UserProfile },
    Bare(UserProfile),
}

#[derive(Deserialize)]
struct StatsEnvelope {
    #[serde(default)]
    stats: UserStats,
}

pub struct UsersService {
    client: ApiClient,
}

impl UsersService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn profile(&self, user_id: i64) -> Result<UserProfile, ApiError> {
        let body: ProfileBody = self
            .client
            .get(&format!("/users/{user_id}/profile"))
            .await?;
        Ok(match body {
            ProfileBody::Wrapped { profile } | ProfileBody::Bare(profile) => profile,
        })
    }

    /// Activity counters for the signed-in user.
    pub async fn stats(&self) -> Result<UserStats, ApiError> {
        let env: StatsEnvelope = self.client.get("/users/stats").await?;
        Ok(env.stats)
    }
}
