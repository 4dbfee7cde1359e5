//! User account model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account. Emails are stored trimmed and lowercased.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}
