use myverse_core::models::{NewNews, NewsArticle, NewsCategory, NewsPage};
use myverse_core::validation;
use serde::Deserialize;

use crate::client::ApiClient;
use crate::error::ApiError;

pub const NEWS_PER_PAGE: u32 = 6;
pub const FEATURED_COUNT: u32 = 3;

#[derive(Deserialize)]
struct NewsEnvelope {
    news: NewsArticle,
}

/// Filters for `GET /news`.
#[derive(Debug, Clone, Copy)]
pub struct NewsQuery {
    pub page: u32,
    pub per_page: u32,
    /// `None` lists every category.
    pub category: Option<NewsCategory>,
    pub featured: bool,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: NEWS_PER_PAGE,
            category: None,
            featured: false,
        }
    }
}

impl NewsQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.max(1).to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(category) = self.category {
            params.push(("category", category.as_param().to_string()));
        }
        if self.featured {
            params.push(("featured", "true".to_string()));
        }
        params
    }
}

pub struct NewsService {
    client: ApiClient,
}

impl NewsService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: NewsQuery) -> Result<NewsPage, ApiError> {
        self.client.get_query("/news", &query.params()).await
    }

    pub async fn featured(&self) -> Result<Vec<NewsArticle>, ApiError> {
        let page = self
            .list(NewsQuery {
                per_page: FEATURED_COUNT,
                featured: true,
                ..Default::default()
            })
            .await?;
        Ok(page.news)
    }

    /// Publish an article; text is trimmed and checked before sending.
    pub async fn create(&self, news: NewNews) -> Result<NewsArticle, ApiError> {
        let news = news.normalized();
        validation::news(&news)?;
        let env: NewsEnvelope = self.client.post("/news", &news).await?;
        Ok(env.news)
    }
}
