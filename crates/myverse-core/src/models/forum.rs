use serde::{Deserialize, Serialize};

use super::user::UserSummary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub post_count: u64,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub author: Option<UserSummary>,
    pub category: Option<ForumCategory>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub comments_count: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumComment {
    pub id: i64,
    pub content: String,
    pub author: Option<UserSummary>,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub replies_count: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A post together with its comment thread.
#[derive(Debug, Clone, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: ForumPost,
    #[serde(default)]
    pub comments: Vec<ForumComment>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostPage {
    #[serde(default)]
    pub posts: Vec<ForumPost>,
    pub pagination: Option<Pagination>,
}

/// Ordering accepted by `GET /forum/posts?sort_by=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostSort {
    #[default]
    Newest,
    MostViewed,
    MostCommented,
}

impl PostSort {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Newest => "created_at",
            Self::MostViewed => "views_count",
            Self::MostCommented => "comments_count",
        }
    }
}

impl std::str::FromStr for PostSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" | "created_at" => Ok(Self::Newest),
            "views" | "views_count" => Ok(Self::MostViewed),
            "comments" | "comments_count" => Ok(Self::MostCommented),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category_id: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ForumTotals {
    #[serde(default)]
    pub total_posts: u64,
    #[serde(default)]
    pub total_comments: u64,
    #[serde(default)]
    pub total_users: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForumStats {
    #[serde(default)]
    pub stats: ForumTotals,
    #[serde(default)]
    pub popular_posts: Vec<ForumPost>,
    #[serde(default)]
    pub recent_posts: Vec<ForumPost>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_detail_flattens_post_fields() {
        let detail: PostDetail = serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": "Best sci-fi of the decade",
            "content": "Discuss.",
            "author": {"id": 1, "username": "demo"},
            "views_count": 12,
            "comments": [
                {"id": 1, "content": "Arrival", "post_id": 7},
                {"id": 2, "content": "Dune", "post_id": 7, "parent_id": 1}
            ]
        }))
        .unwrap();
        assert_eq!(detail.post.id, 7);
        assert_eq!(detail.post.views_count, 12);
        assert_eq!(detail.comments.len(), 2);
        assert_eq!(detail.comments[1].parent_id, Some(1));
    }

    #[test]
    fn test_partial_pagination_decodes() {
        let page: PostPage = serde_json::from_value(serde_json::json!({
            "posts": [],
            "pagination": {"page": 2, "has_next": true},
        }))
        .unwrap();
        let pagination = page.pagination.unwrap();
        assert_eq!(pagination.page, 2);
        assert_eq!(pagination.pages, 0);
        assert_eq!(pagination.total, 0);
        assert!(pagination.has_next);
    }

    #[test]
    fn test_sort_param() {
        assert_eq!("views".parse::<PostSort>().unwrap().as_param(), "views_count");
        assert_eq!(PostSort::default().as_param(), "created_at");
    }
}
