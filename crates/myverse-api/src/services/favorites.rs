use std::collections::HashMap;

use myverse_core::models::{Favorite, NewFavorite};
use myverse_core::toast::{SharedToasts, ToastKind};
use serde::Deserialize;

use crate::client::{ApiClient, Message};
use crate::error::ApiError;

const ALREADY_FAVORITE: &str = "Already in favorites";

#[derive(Deserialize)]
struct FavoritesEnvelope {
    #[serde(default)]
    favorites: Vec<Favorite>,
}

#[derive(Deserialize)]
struct Added {
    #[serde(default)]
    message: String,
    favorite: Option<Favorite>,
}

/// Result of asking to favorite an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Added,
    AlreadyFavorite,
}

/// Local favorite markers keyed by [`myverse_core::models::favorite_key`].
/// Values hold the server id once known.
#[derive(Debug, Clone, Default)]
pub struct FavoriteSet {
    markers: HashMap<String, Option<i64>>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_favorites(favorites: &[Favorite]) -> Self {
        Self {
            markers: favorites.iter().map(|f| (f.key(), Some(f.id))).collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.markers.contains_key(key)
    }

    pub fn id_for(&self, key: &str) -> Option<i64> {
        self.markers.get(key).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    fn mark(&mut self, key: String, id: Option<i64>) {
        let slot = self.markers.entry(key).or_insert(None);
        if id.is_some() {
            *slot = id;
        }
    }

    fn unmark_id(&mut self, id: i64) {
        self.markers.retain(|_, v| *v != Some(id));
    }
}

pub struct FavoritesService {
    client: ApiClient,
}

impl FavoritesService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Favorite>, ApiError> {
        let env: FavoritesEnvelope = self.client.get("/content/favorites").await?;
        Ok(env.favorites)
    }

    pub async fn add(&self, favorite: &NewFavorite) -> Result<Message, ApiError> {
        self.client.post("/content/favorites", favorite).await
    }

    pub async fn remove(&self, favorite_id: i64) -> Result<Message, ApiError> {
        self.client
            .delete(&format!("/content/favorites/{favorite_id}"))
            .await
    }

    /// Favorite an item, keeping `set` in step and reporting through `toasts`.
    ///
    /// An item already marked locally is not re-sent. A 409 from the server
    /// marks the item and reports the conflict instead of failing.
    pub async fn favorite(
        &self,
        set: &mut FavoriteSet,
        favorite: NewFavorite,
        toasts: &SharedToasts,
    ) -> Result<FavoriteOutcome, ApiError> {
        let key = favorite.key();
        if set.contains(&key) {
            notify(toasts, ToastKind::Error, ALREADY_FAVORITE);
            return Ok(FavoriteOutcome::AlreadyFavorite);
        }

        match self
            .client
            .post::<Added, _>("/content/favorites", &favorite)
            .await
        {
            Ok(added) => {
                set.mark(key, added.favorite.map(|f| f.id));
                let msg = if added.message.is_empty() {
                    format!("{} added to favorites", favorite.content_title)
                } else {
                    added.message
                };
                notify(toasts, ToastKind::Success, msg);
                Ok(FavoriteOutcome::Added)
            }
            Err(e) if e.is_conflict() => {
                set.mark(key, None);
                let msg = match e.user_message() {
                    m if m == crate::error::CONNECTION_ERROR => ALREADY_FAVORITE.to_string(),
                    m => m,
                };
                notify(toasts, ToastKind::Error, msg);
                Ok(FavoriteOutcome::AlreadyFavorite)
            }
            Err(e) => {
                notify(toasts, ToastKind::Error, e.user_message());
                Err(e)
            }
        }
    }

    /// Remove a favorite by server id and clear its marker.
    pub async fn unfavorite(
        &self,
        set: &mut FavoriteSet,
        favorite_id: i64,
        toasts: &SharedToasts,
    ) -> Result<(), ApiError> {
        match self.remove(favorite_id).await {
            Ok(_) => {
                set.unmark_id(favorite_id);
                notify(toasts, ToastKind::Success, "Removed from favorites");
                Ok(())
            }
            Err(e) => {
                notify(toasts, ToastKind::Error, e.user_message());
                Err(e)
            }
        }
    }
}

pub(crate) fn notify(toasts: &SharedToasts, kind: ToastKind, message: impl Into<String>) {
    toasts
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .push(kind, message);
}
