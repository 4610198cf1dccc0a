use myverse_core::models::{ContentItem, SearchKind, SearchResponse, TimeWindow};
use serde::Deserialize;

use crate::client::ApiClient;
use crate::error::ApiError;

#[derive(Deserialize)]
struct Results {
    #[serde(default)]
    results: Vec<ContentItem>,
}

pub struct ContentService {
    client: ApiClient,
}

impl ContentService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        page: u32,
    ) -> Result<SearchResponse, ApiError> {
        let page = page.max(1).to_string();
        self.client
            .get_query(
                "/content/search",
                &[("q", query), ("type", kind.as_param()), ("page", page.as_str())],
            )
            .await
    }

    pub async fn trending(
        &self,
        kind: SearchKind,
        window: TimeWindow,
    ) -> Result<Vec<ContentItem>, ApiError> {
        let r: Results = self
            .client
            .get_query(
                "/content/trending",
                &[("type", kind.as_param()), ("time_window", window.as_param())],
            )
            .await?;
        Ok(r.results)
    }

    pub async fn recommendations(&self) -> Result<Vec<ContentItem>, ApiError> {
        let r: Results = self.client.get("/content/recommendations").await?;
        Ok(r.results)
    }
}
