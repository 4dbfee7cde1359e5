//! Candidate document selection
//!
//! Matching is a case-insensitive substring test against title and
//! content, ordered by storage recency; there is no relevance scoring.
//! When nothing matches, the selector falls back to the owner's most
//! recent documents so the pipeline always has grounding material when
//! any content exists.

use async_trait::async_trait;
use std::sync::Arc;
use webloom_common::db::models::Document;
use webloom_common::{Repository, Result};

/// Maximum substring matches fed into a single answer
pub const DEFAULT_MAX_RESULTS: i64 = 10;

/// Recent documents used for grounding when nothing matches
pub const RECENT_FALLBACK_LIMIT: i64 = 5;

/// Read-only view of the document store consumed by the answer engine
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Substring search over title and content, most recently stored first
    async fn search_content(
        &self,
        query: &str,
        owner_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Document>>;

    /// Most recently stored documents
    async fn list_recent(
        &self,
        limit: i64,
        offset: i64,
        owner_id: Option<i64>,
    ) -> Result<Vec<Document>>;
}

#[async_trait]
impl DocumentSource for Repository {
    async fn search_content(
        &self,
        query: &str,
        owner_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Document>> {
        Repository::search_content(self, query, owner_id, limit).await
    }

    async fn list_recent(
        &self,
        limit: i64,
        offset: i64,
        owner_id: Option<i64>,
    ) -> Result<Vec<Document>> {
        Repository::list_recent(self, limit, offset, owner_id).await
    }
}

/// Selects the candidate documents used to ground an answer
pub struct RetrievalSelector {
    source: Arc<dyn DocumentSource>,
}

impl RetrievalSelector {
    /// Create a selector over the given document source
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self { source }
    }

    /// Select up to `max_results` candidates for a question.
    ///
    /// `owner_id = None` searches all documents; the gateway only passes
    /// it for anonymous callers, never for authenticated ones. An empty
    /// result is a valid outcome, not an error.
    pub async fn select(
        &self,
        question: &str,
        owner_id: Option<i64>,
        max_results: i64,
    ) -> Result<Vec<Document>> {
        let matches = self
            .source
            .search_content(question, owner_id, max_results)
            .await?;

        if !matches.is_empty() {
            return Ok(matches);
        }

        // No substring match; ground on whatever was stored most recently
        let recent = self
            .source
            .list_recent(RECENT_FALLBACK_LIMIT, 0, owner_id)
            .await?;

        if !recent.is_empty() {
            tracing::debug!(
                count = recent.len(),
                "No substring match; grounding on recent documents"
            );
        }

        Ok(recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn doc(id: i64, title: &str, content: &str) -> Document {
        Document {
            id,
            user_id: Some(1),
            url: format!("https://example.com/{}", id),
            title: title.to_string(),
            content: content.to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            created_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    /// Canned source that records how it was called
    struct FakeSource {
        matches: Vec<Document>,
        recent: Vec<Document>,
        search_calls: AtomicUsize,
        recent_calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(matches: Vec<Document>, recent: Vec<Document>) -> Self {
            Self {
                matches,
                recent,
                search_calls: AtomicUsize::new(0),
                recent_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentSource for FakeSource {
        async fn search_content(
            &self,
            _query: &str,
            _owner_id: Option<i64>,
            limit: i64,
        ) -> Result<Vec<Document>> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.matches.iter().take(limit as usize).cloned().collect())
        }

        async fn list_recent(
            &self,
            limit: i64,
            _offset: i64,
            _owner_id: Option<i64>,
        ) -> Result<Vec<Document>> {
            self.recent_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.recent.iter().take(limit as usize).cloned().collect())
        }
    }

    #[tokio::test]
    async fn test_matches_win_over_recency() {
        let source = Arc::new(FakeSource::new(
            vec![doc(3, "Test Page", "test content here")],
            vec![doc(9, "Recent", "unrelated")],
        ));
        let selector = RetrievalSelector::new(source.clone());

        let selected = selector.select("test", Some(1), DEFAULT_MAX_RESULTS).await.unwrap();

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, 3);
        assert_eq!(source.recent_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_truncates_to_max_results() {
        let matches: Vec<Document> = (1..=20).map(|i| doc(i, "t", "c")).collect();
        let selector = RetrievalSelector::new(Arc::new(FakeSource::new(matches, vec![])));

        let selected = selector.select("c", Some(1), DEFAULT_MAX_RESULTS).await.unwrap();
        assert_eq!(selected.len(), DEFAULT_MAX_RESULTS as usize);
    }

    #[tokio::test]
    async fn test_recency_fallback_when_nothing_matches() {
        let recent: Vec<Document> = (1..=8).map(|i| doc(i, "page", "unrelated")).collect();
        let source = Arc::new(FakeSource::new(vec![], recent));
        let selector = RetrievalSelector::new(source.clone());

        let selected = selector.select("no such words", Some(1), DEFAULT_MAX_RESULTS).await.unwrap();

        // Exactly min(5, count) recent documents, order preserved
        assert_eq!(selected.len(), RECENT_FALLBACK_LIMIT as usize);
        assert_eq!(source.recent_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_selection() {
        let selector = RetrievalSelector::new(Arc::new(FakeSource::new(vec![], vec![])));

        let selected = selector.select("anything", Some(1), DEFAULT_MAX_RESULTS).await.unwrap();
        assert!(selected.is_empty());
    }
}
