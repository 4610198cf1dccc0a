use serde::{Deserialize, Serialize};

use super::content::MediaType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friend {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub created_at: Option<String>,
    pub mutual_friends: Option<u32>,
    #[serde(default)]
    pub common_interests: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    /// A status this client does not know; never treated as pending.
    #[serde(other)]
    Unknown,
}

/// An incoming friend request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: i64,
    pub sender_id: i64,
    pub sender_username: String,
    #[serde(default)]
    pub sender_email: String,
    pub created_at: Option<String>,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendSuggestion {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub common_interests: Vec<String>,
    #[serde(default)]
    pub mutual_friends: u32,
    #[serde(default)]
    pub compatibility_score: f64,
}

/// A user found through `/friends/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSearchResult {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub created_at: Option<String>,
    #[serde(default)]
    pub favorite_genres: Vec<String>,
    pub total_favorites: Option<u32>,
    pub mutual_friends: Option<u32>,
    /// Raw server hint; interpret through `relationship::Relationship`.
    pub friendship_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentFavorite {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub poster_url: Option<String>,
    pub rating: Option<f64>,
}

/// Public profile from `/users/{id}/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub created_at: Option<String>,
    #[serde(default)]
    pub total_favorites: u32,
    #[serde(default)]
    pub total_posts: u32,
    #[serde(default)]
    pub favorite_genres: Vec<String>,
    #[serde(default)]
    pub recent_favorites: Vec<RecentFavorite>,
    pub friendship_status: Option<String>,
    #[serde(default)]
    pub mutual_friends: u32,
    #[serde(default)]
    pub common_interests: Vec<String>,
}

/// Activity counters for the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub favorite_movies: u32,
    #[serde(default)]
    pub favorite_series: u32,
    #[serde(default)]
    pub favorite_games: u32,
    #[serde(default)]
    pub forum_posts: u32,
    #[serde(default)]
    pub forum_comments: u32,
    #[serde(default)]
    pub friends: u32,
}

impl UserStats {
    pub fn total_favorites(&self) -> u32 {
        self.favorite_movies
            .saturating_add(self.favorite_series)
            .saturating_add(self.favorite_games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_favorites_saturates() {
        let stats = UserStats {
            favorite_movies: u32::MAX,
            favorite_series: 2,
            favorite_games: 1,
            ..Default::default()
        };
        assert_eq!(stats.total_favorites(), u32::MAX);

        let stats = UserStats {
            favorite_movies: 2,
            favorite_series: 1,
            ..Default::default()
        };
        assert_eq!(stats.total_favorites(), 3);
    }

    #[test]
    fn test_unrecognized_request_status() {
        let request: FriendRequest = serde_json::from_value(serde_json::json!({
            "id": 21,
            "sender_id": 8,
            "sender_username": "trinity",
            "status": "blocked",
        }))
        .unwrap();
        assert_eq!(request.status, RequestStatus::Unknown);

        let status: RequestStatus = serde_json::from_str("\"accepted\"").unwrap();
        assert_eq!(status, RequestStatus::Accepted);
    }
}
