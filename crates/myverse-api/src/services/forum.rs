use myverse_core::models::{
    ForumCategory, ForumComment, ForumPost, ForumStats, NewComment, NewPost, PostDetail,
    PostPage, PostSort, PostUpdate,
};
use myverse_core::validation;
use serde::Deserialize;

use crate::client::{ApiClient, Message};
use crate::error::ApiError;

#[derive(Deserialize)]
struct Categories {
    #[serde(default)]
    categories: Vec<ForumCategory>,
}

#[derive(Deserialize)]
struct PostEnvelope {
    post: ForumPost,
}

#[derive(Deserialize)]
struct DetailEnvelope {
    post: PostDetail,
}

#[derive(Deserialize)]
struct CommentEnvelope {
    comment: ForumComment,
}

pub struct ForumService {
    client: ApiClient,
}

impl ForumService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn categories(&self) -> Result<Vec<ForumCategory>, ApiError> {
        let c: Categories = self.client.get("/forum/categories").await?;
        Ok(c.categories)
    }

    pub async fn posts(
        &self,
        category_id: Option<i64>,
        page: u32,
        sort: PostSort,
    ) -> Result<PostPage, ApiError> {
        let mut query = vec![
            ("page", page.max(1).to_string()),
            ("sort_by", sort.as_param().to_string()),
        ];
        if let Some(id) = category_id {
            query.push(("category_id", id.to_string()));
        }
        self.client.get_query("/forum/posts", &query).await
    }

    pub async fn post(&self, post_id: i64) -> Result<PostDetail, ApiError> {
        let env: DetailEnvelope = self.client.get(&format!("/forum/posts/{post_id}")).await?;
        Ok(env.post)
    }

    /// Validated before sending; a short title never reaches the network.
    pub async fn create_post(&self, post: &NewPost) -> Result<ForumPost, ApiError> {
        validation::topic(post)?;
        let env: PostEnvelope = self.client.post("/forum/posts", post).await?;
        Ok(env.post)
    }

    pub async fn update_post(
        &self,
        post_id: i64,
        update: &PostUpdate,
    ) -> Result<ForumPost, ApiError> {
        let env: PostEnvelope = self
            .client
            .put(&format!("/forum/posts/{post_id}"), update)
            .await?;
        Ok(env.post)
    }

    pub async fn delete_post(&self, post_id: i64) -> Result<Message, ApiError> {
        self.client.delete(&format!("/forum/posts/{post_id}")).await
    }

    pub async fn create_comment(
        &self,
        post_id: i64,
        comment: &NewComment,
    ) -> Result<ForumComment, ApiError> {
        validation::comment(comment)?;
        let env: CommentEnvelope = self
            .client
            .post(&format!("/forum/posts/{post_id}/comments"), comment)
            .await?;
        Ok(env.comment)
    }

    pub async fn update_comment(
        &self,
        comment_id: i64,
        content: &str,
    ) -> Result<ForumComment, ApiError> {
        let env: CommentEnvelope = self
            .client
            .put(
                &format!("/forum/comments/{comment_id}"),
                &serde_json::json!({ "content": content }),
            )
            .await?;
        Ok(env.comment)
    }

    pub async fn delete_comment(&self, comment_id: i64) -> Result<Message, ApiError> {
        self.client
            .delete(&format!("/forum/comments/{comment_id}"))
            .await
    }

    pub async fn stats(&self) -> Result<ForumStats, ApiError> {
        self.client.get("/forum/stats").await
    }
}
