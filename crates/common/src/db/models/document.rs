//! Scraped document model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A scraped web page stored in the knowledge base.
///
/// Rows are insert-only; the only mutation is an owner-scoped delete.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Unique identifier, assigned at insert, stable for the row's lifetime
    pub id: i64,

    /// Owning user; null only for legacy/unowned records
    pub user_id: Option<i64>,

    /// Source address
    pub url: String,

    /// Display name, "Untitled" when the scraper supplied none
    pub title: String,

    /// Full extracted page text
    pub content: String,

    /// Capture time reported by the scraping client (RFC 3339)
    pub timestamp: String,

    /// Insert time assigned by the store; recency ordering key
    pub created_at: String,
}
