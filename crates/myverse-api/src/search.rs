use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use myverse_core::models::{ContentItem, SearchKind};

use crate::client::ApiClient;
use crate::error::ApiError;

/// Results currently shown for a search view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub kind: SearchKind,
    pub page: u32,
    pub total: u64,
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query; nothing was sent.
    Skipped,
    /// A newer search started before this one finished; its response was dropped.
    Superseded,
    Updated { count: usize },
}

/// Search box state shared between the view and its in-flight requests.
///
/// Each submission takes a generation number; only the latest generation
/// may write results.
#[derive(Clone)]
pub struct Search {
    client: ApiClient,
    generation: Arc<AtomicU64>,
    results: Arc<Mutex<SearchResults>>,
}

impl Search {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            generation: Arc::new(AtomicU64::new(0)),
            results: Arc::new(Mutex::new(SearchResults::default())),
        }
    }

    pub fn results(&self) -> SearchResults {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub async fn submit(
        &self,
        query: &str,
        kind: SearchKind,
        page: u32,
    ) -> Result<SearchOutcome, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchOutcome::Skipped);
        }

        let generation = self.begin();
        let response = match self.client.content().search(query, kind, page).await {
            Ok(response) => response,
            Err(e) if self.is_current(generation) => return Err(e),
            Err(_) => return Ok(SearchOutcome::Superseded),
        };

        let count = response.results.len();
        let results = SearchResults {
            query: query.to_string(),
            kind,
            page: page.max(1),
            total: response.total_results,
            items: response.results,
        };
        if !self.publish(generation, results) {
            tracing::debug!(query, generation, "dropping superseded search response");
            return Ok(SearchOutcome::Superseded);
        }
        Ok(SearchOutcome::Updated { count })
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Store `results` if `generation` is still the latest. The check runs
    /// under the results lock so a newer submission cannot write in between.
    fn publish(&self, generation: u64, results: SearchResults) -> bool {
        let mut current = self.results.lock().unwrap_or_else(|e| e.into_inner());
        if !self.is_current(generation) {
            return false;
        }
        *current = results;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use myverse_core::routes::Navigator;
    use myverse_core::session::SessionStore;
    use myverse_core::storage::MemoryStore;

    use super::*;

    fn search() -> Search {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStore::new())));
        let client = ApiClient::new(
            "http://localhost:5000/api",
            Duration::from_secs(1),
            session,
            Navigator::default(),
        )
        .unwrap();
        Search::new(client)
    }

    fn results(query: &str) -> SearchResults {
        SearchResults {
            query: query.to_string(),
            page: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_older_generation_cannot_publish_after_newer() {
        let search = search();
        let first = search.begin();
        let second = search.begin();

        assert!(search.publish(second, results("dune")));
        assert!(!search.publish(first, results("slow query")));
        assert_eq!(search.results().query, "dune");
    }

    #[test]
    fn test_publish_waits_for_newer_writer() {
        let search = search();
        let first = search.begin();

        // A newer submission starts while the older one holds the lock.
        let guard = search.results.lock().unwrap();
        let second = search.begin();
        drop(guard);

        assert!(!search.publish(first, results("slow query")));
        assert!(search.publish(second, results("dune")));
        assert_eq!(search.results().query, "dune");
    }
}
