use myverse_core::models::{Friend, FriendRequest, FriendSuggestion, UserSearchResult};
use myverse_core::relationship::{Relationship, RelationshipBook};
use serde::Deserialize;

use crate::client::{ApiClient, Message};
use crate::error::ApiError;

#[derive(Deserialize)]
struct FriendsEnvelope {
    #[serde(default)]
    friends: Vec<Friend>,
}

#[derive(Deserialize)]
struct RequestsEnvelope {
    #[serde(default)]
    requests: Vec<FriendRequest>,
}

#[derive(Deserialize)]
struct UsersEnvelope {
    #[serde(default)]
    users: Vec<UserSearchResult>,
}

#[derive(Deserialize)]
struct SuggestionsEnvelope {
    #[serde(default)]
    suggestions: Vec<FriendSuggestion>,
}

/// `/friends/*` endpoints. Mutating calls also update the caller's
/// [`RelationshipBook`] so status stays computed in one place.
pub struct FriendsService {
    client: ApiClient,
}

impl FriendsService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Friend>, ApiError> {
        let env: FriendsEnvelope = self.client.get("/friends").await?;
        Ok(env.friends)
    }

    /// Incoming requests.
    pub async fn requests(&self) -> Result<Vec<FriendRequest>, ApiError> {
        let env: RequestsEnvelope = self.client.get("/friends/requests").await?;
        Ok(env.requests)
    }

    /// Refresh `book` from the friends and requests endpoints.
    pub async fn sync(&self, book: &mut RelationshipBook) -> Result<(), ApiError> {
        let (friends, requests) = futures::try_join!(self.list(), self.requests())?;
        book.sync(&friends, &requests);
        tracing::debug!(
            friends = book.friend_count(),
            incoming = book.pending_incoming(),
            "relationships synced"
        );
        Ok(())
    }

    pub async fn send_request(
        &self,
        book: &mut RelationshipBook,
        user_id: i64,
    ) -> Result<Relationship, ApiError> {
        let status = book.status(user_id);
        if !status.can_request() {
            return Ok(status);
        }
        let _: Message = self
            .client
            .post("/friends/request", &serde_json::json!({ "user_id": user_id }))
            .await?;
        book.record_sent(user_id);
        Ok(book.status(user_id))
    }

    pub async fn accept(
        &self,
        book: &mut RelationshipBook,
        request_id: i64,
    ) -> Result<(), ApiError> {
        let _: Message = self
            .client
            .post_empty(&format!("/friends/requests/{request_id}/accept"))
            .await?;
        book.record_accepted(request_id);
        Ok(())
    }

    pub async fn reject(
        &self,
        book: &mut RelationshipBook,
        request_id: i64,
    ) -> Result<(), ApiError> {
        let _: Message = self
            .client
            .post_empty(&format!("/friends/requests/{request_id}/reject"))
            .await?;
        book.record_rejected(request_id);
        Ok(())
    }

    pub async fn remove(
        &self,
        book: &mut RelationshipBook,
        friend_id: i64,
    ) -> Result<(), ApiError> {
        let _: Message = self.client.delete(&format!("/friends/{friend_id}")).await?;
        book.record_removed(friend_id);
        Ok(())
    }

    /// Search users by name. A blank term returns nothing without a request.
    pub async fn search(&self, term: &str) -> Result<Vec<UserSearchResult>, ApiError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let env: UsersEnvelope = self
            .client
            .get_query("/friends/search", &[("q", term)])
            .await?;
        Ok(env.users)
    }

    pub async fn suggestions(&self) -> Result<Vec<FriendSuggestion>, ApiError> {
        let env: SuggestionsEnvelope = self.client.get("/friends/suggestions").await?;
        Ok(env.suggestions)
    }
}
