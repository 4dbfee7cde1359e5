//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations. Recency
//! queries order by `created_at DESC, id DESC`; `created_at` has second
//! resolution, so the id tie-break keeps the ordering monotonic with
//! insertion order.

use crate::db::models::{Document, User};
use crate::db::DbPool;
use crate::errors::Result;
use chrono::Utc;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

/// Turn a raw query into a `LIKE` pattern that matches it as a literal
/// substring (wildcards escaped).
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    /// Create a user, returning the new id
    pub async fn create_user(&self, email: &str, password_hash: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO users (email, password_hash) VALUES (?, ?)")
            .bind(email)
            .bind(password_hash)
            .execute(self.pool.inner())
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Find a user by (normalized) email
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool.inner())
        .await
        .map_err(Into::into)
    }

    // ========================================================================
    // Document Operations
    // ========================================================================

    /// Insert a scraped document, returning the new id.
    ///
    /// A missing or blank title becomes "Untitled"; a missing capture
    /// timestamp becomes the current time.
    pub async fn insert_document(
        &self,
        owner_id: i64,
        url: &str,
        title: Option<&str>,
        content: &str,
        timestamp: Option<&str>,
    ) -> Result<i64> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled");
        let timestamp = timestamp
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Utc::now().to_rfc3339());

        let result = sqlx::query(
            "INSERT INTO scraped_content (user_id, url, title, content, timestamp) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(owner_id)
        .bind(url)
        .bind(title)
        .bind(content)
        .bind(&timestamp)
        .execute(self.pool.inner())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Case-insensitive substring search over title and content,
    /// most recently stored first. `owner_id = None` searches all
    /// documents (store-layer capability for trusted callers only).
    pub async fn search_content(
        &self,
        query: &str,
        owner_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Document>> {
        let pattern = like_pattern(query);

        let rows = match owner_id {
            Some(owner) => {
                sqlx::query_as::<_, Document>(
                    r#"
                    SELECT id, user_id, url, title, content, timestamp, created_at
                    FROM scraped_content
                    WHERE user_id = ?
                      AND (title LIKE ? ESCAPE '\' OR content LIKE ? ESCAPE '\')
                    ORDER BY created_at DESC, id DESC
                    LIMIT ?
                    "#,
                )
                .bind(owner)
                .bind(&pattern)
                .bind(&pattern)
                .bind(limit)
                .fetch_all(self.pool.inner())
                .await?
            }
            None => {
                sqlx::query_as::<_, Document>(
                    r#"
                    SELECT id, user_id, url, title, content, timestamp, created_at
                    FROM scraped_content
                    WHERE title LIKE ? ESCAPE '\' OR content LIKE ? ESCAPE '\'
                    ORDER BY created_at DESC, id DESC
                    LIMIT ?
                    "#,
                )
                .bind(&pattern)
                .bind(&pattern)
                .bind(limit)
                .fetch_all(self.pool.inner())
                .await?
            }
        };

        Ok(rows)
    }

    /// List documents most recently stored first
    pub async fn list_recent(
        &self,
        limit: i64,
        offset: i64,
        owner_id: Option<i64>,
    ) -> Result<Vec<Document>> {
        let rows = match owner_id {
            Some(owner) => {
                sqlx::query_as::<_, Document>(
                    "SELECT id, user_id, url, title, content, timestamp, created_at \
                     FROM scraped_content WHERE user_id = ? \
                     ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
                )
                .bind(owner)
                .bind(limit)
                .bind(offset)
                .fetch_all(self.pool.inner())
                .await?
            }
            None => {
                sqlx::query_as::<_, Document>(
                    "SELECT id, user_id, url, title, content, timestamp, created_at \
                     FROM scraped_content \
                     ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(self.pool.inner())
                .await?
            }
        };

        Ok(rows)
    }

    /// Count stored documents
    pub async fn count_documents(&self, owner_id: Option<i64>) -> Result<i64> {
        let count: i64 = match owner_id {
            Some(owner) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM scraped_content WHERE user_id = ?")
                    .bind(owner)
                    .fetch_one(self.pool.inner())
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM scraped_content")
                    .fetch_one(self.pool.inner())
                    .await?
            }
        };

        Ok(count)
    }

    /// Find a document by id
    pub async fn find_document_by_id(&self, id: i64) -> Result<Option<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT id, user_id, url, title, content, timestamp, created_at \
             FROM scraped_content WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await
        .map_err(Into::into)
    }

    /// Delete a document, scoped to its owner. Returns whether a row
    /// was removed.
    pub async fn delete_document(&self, id: i64, owner_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM scraped_content WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    async fn test_repo() -> Repository {
        // A single connection keeps every query on the same in-memory db
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            connect_timeout_secs: 5,
        };
        Repository::new(DbPool::new(&config).await.unwrap())
    }

    #[tokio::test]
    async fn test_insert_defaults() {
        let repo = test_repo().await;

        let id = repo
            .insert_document(1, "https://example.com", None, "some text", None)
            .await
            .unwrap();

        let doc = repo.find_document_by_id(id).await.unwrap().unwrap();
        assert_eq!(doc.title, "Untitled");
        assert_eq!(doc.user_id, Some(1));
        assert!(!doc.timestamp.is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_title_and_content() {
        let repo = test_repo().await;

        repo.insert_document(1, "https://a", Some("Rust Guide"), "about ownership", None)
            .await
            .unwrap();
        repo.insert_document(1, "https://b", Some("Other"), "the RUST borrow checker", None)
            .await
            .unwrap();
        repo.insert_document(1, "https://c", Some("Python"), "generators", None)
            .await
            .unwrap();

        let hits = repo.search_content("rust", Some(1), 10).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_search_is_owner_scoped() {
        let repo = test_repo().await;

        repo.insert_document(1, "https://a", Some("shared words"), "alpha", None)
            .await
            .unwrap();
        repo.insert_document(2, "https://b", Some("shared words"), "beta", None)
            .await
            .unwrap();

        let hits = repo.search_content("shared", Some(1), 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].user_id, Some(1));

        // Null owner searches everything
        let hits = repo.search_content("shared", None, 10).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let repo = test_repo().await;

        repo.insert_document(1, "https://a", Some("report"), "coverage is 100% complete", None)
            .await
            .unwrap();
        repo.insert_document(1, "https://b", Some("report"), "about 100x faster", None)
            .await
            .unwrap();

        let hits = repo.search_content("100%", Some(1), 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].content.contains("100%"));
    }

    #[tokio::test]
    async fn test_recency_order_is_insertion_order() {
        let repo = test_repo().await;

        let first = repo
            .insert_document(1, "https://a", Some("one"), "x", None)
            .await
            .unwrap();
        let second = repo
            .insert_document(1, "https://b", Some("two"), "x", None)
            .await
            .unwrap();
        let third = repo
            .insert_document(1, "https://c", Some("three"), "x", None)
            .await
            .unwrap();

        let recent = repo.list_recent(10, 0, Some(1)).await.unwrap();
        let ids: Vec<i64> = recent.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![third, second, first]);

        // Search results follow the same ordering
        let hits = repo.search_content("x", Some(1), 10).await.unwrap();
        let ids: Vec<i64> = hits.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[tokio::test]
    async fn test_delete_is_owner_scoped() {
        let repo = test_repo().await;

        let id = repo
            .insert_document(1, "https://a", Some("mine"), "x", None)
            .await
            .unwrap();

        assert!(!repo.delete_document(id, 2).await.unwrap());
        assert_eq!(repo.count_documents(Some(1)).await.unwrap(), 1);

        assert!(repo.delete_document(id, 1).await.unwrap());
        assert_eq!(repo.count_documents(Some(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_users_roundtrip() {
        let repo = test_repo().await;

        let id = repo.create_user("user@example.com", "hash").await.unwrap();
        let user = repo
            .find_user_by_email("user@example.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.password_hash, "hash");
        assert!(repo.find_user_by_email("other@example.com").await.unwrap().is_none());
    }
}
