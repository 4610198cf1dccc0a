use myverse_core::models::{ContentItem, ForumStats, NewsArticle, SearchKind, TimeWindow, UserStats};

use crate::client::ApiClient;
use crate::error::ApiError;

/// Every dashboard section, loaded concurrently. Each section keeps its own
/// result so one failing endpoint does not blank the others.
#[derive(Debug)]
pub struct Dashboard {
    pub stats: Result<UserStats, ApiError>,
    pub recommendations: Result<Vec<ContentItem>, ApiError>,
    pub trending: Result<Vec<ContentItem>, ApiError>,
    pub featured_news: Result<Vec<NewsArticle>, ApiError>,
    pub forum: Result<ForumStats, ApiError>,
}

impl Dashboard {
    pub async fn load(client: &ApiClient) -> Self {
        let users = client.users();
        let content = client.content();
        let news = client.news();
        let forum = client.forum();

        let (stats, recommendations, trending, featured_news, forum) = futures::join!(
            users.stats(),
            content.recommendations(),
            content.trending(SearchKind::All, TimeWindow::Week),
            news.featured(),
            forum.stats(),
        );

        let dashboard = Self {
            stats,
            recommendations,
            trending,
            featured_news,
            forum,
        };
        for (section, err) in dashboard.failures() {
            tracing::warn!(section, error = %err, "dashboard section failed");
        }
        dashboard
    }

    /// Sections that failed, by name.
    pub fn failures(&self) -> Vec<(&'static str, &ApiError)> {
        [
            ("stats", self.stats.as_ref().err()),
            ("recommendations", self.recommendations.as_ref().err()),
            ("trending", self.trending.as_ref().err()),
            ("featured_news", self.featured_news.as_ref().err()),
            ("forum", self.forum.as_ref().err()),
        ]
        .into_iter()
        .filter_map(|(name, err)| err.map(|e| (name, e)))
        .collect()
    }
}
