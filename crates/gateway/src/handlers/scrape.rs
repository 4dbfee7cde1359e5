//! Scrape ingestion handlers
//!
//! Pages arrive pre-extracted from the browser extension; these
//! handlers only validate and persist.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::middleware::auth::AuthUser;
use crate::AppState;
use webloom_common::db::models::Document;
use webloom_common::errors::{AppError, Result};
use webloom_common::metrics;

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub content: Option<String>,

    /// Capture time reported by the extension
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
    pub data: ScrapeData,
    pub stats: ScrapeStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeData {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub content_length: usize,
    pub timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeStats {
    pub total_scraped: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<i64>,

    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub data: Vec<Document>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
    pub has_more: bool,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Store a scraped page for the authenticated user
pub async fn save_content(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ScrapeRequest>,
) -> Result<(StatusCode, Json<SaveResponse>)> {
    save_content_inner(state, auth, body)
        .await
        .map_err(|e| e.into_route_error("Failed to save scraped content"))
}

async fn save_content_inner(
    state: AppState,
    auth: AuthUser,
    body: ScrapeRequest,
) -> Result<(StatusCode, Json<SaveResponse>)> {
    let url = body.url.as_deref().unwrap_or("");
    let content = body.content.as_deref().unwrap_or("");

    if url.is_empty() || content.is_empty() {
        return Err(AppError::validation(
            "Missing required fields: url and content are required",
        ));
    }

    let title = body
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Untitled")
        .to_string();
    let timestamp = body
        .timestamp
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    let id = state
        .repo
        .insert_document(auth.id, url, Some(title.as_str()), content, Some(timestamp.as_str()))
        .await?;
    let total = state.repo.count_documents(Some(auth.id)).await?;

    metrics::record_scrape();

    tracing::info!(
        document_id = id,
        user_id = auth.id,
        content_length = content.len(),
        "Content scraped and saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(SaveResponse {
            success: true,
            message: "Content scraped and saved successfully".to_string(),
            data: ScrapeData {
                id,
                url: url.to_string(),
                title,
                content_length: content.len(),
                timestamp,
            },
            stats: ScrapeStats { total_scraped: total },
        }),
    ))
}

/// List the authenticated user's scraped pages, most recent first
pub async fn list_content(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    list_content_inner(state, auth, params)
        .await
        .map_err(|e| e.into_route_error("Failed to fetch scraped content"))
}

async fn list_content_inner(
    state: AppState,
    auth: AuthUser,
    params: ListParams,
) -> Result<Json<ListResponse>> {
    let limit = params.limit.unwrap_or(50).max(0);
    let offset = params.offset.unwrap_or(0).max(0);

    let data = state.repo.list_recent(limit, offset, Some(auth.id)).await?;
    let total = state.repo.count_documents(Some(auth.id)).await?;
    let has_more = offset + (data.len() as i64) < total;

    Ok(Json(ListResponse {
        success: true,
        data,
        pagination: Pagination {
            limit,
            offset,
            total,
            has_more,
        },
    }))
}

/// Delete one of the authenticated user's pages
pub async fn delete_content(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>> {
    let deleted = state
        .repo
        .delete_document(id, auth.id)
        .await
        .map_err(|e| e.into_route_error("Failed to delete scraped content"))?;

    if !deleted {
        return Err(AppError::NotFound {
            resource: "Content".to_string(),
        });
    }

    tracing::info!(document_id = id, user_id = auth.id, "Content deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "Content deleted".to_string(),
    }))
}
