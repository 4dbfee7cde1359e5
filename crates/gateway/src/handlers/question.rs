//! Question answering handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::middleware::auth::OptionalAuthUser;
use crate::AppState;
use webloom_answer::Citation;
use webloom_common::errors::Result;
use webloom_common::metrics;

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Serialize)]
pub struct QuestionResponse {
    pub success: bool,
    pub question: String,
    pub answer: String,
    pub references: Vec<Citation>,
    #[serde(rename = "aiPowered")]
    pub ai_powered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Answer a question grounded in the caller's scraped content.
///
/// Anonymous callers run against the unowned legacy scope; an
/// authenticated call is always scoped to the token's user, and no
/// request field can widen that.
pub async fn ask_question(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Json(body): Json<QuestionRequest>,
) -> Result<Json<QuestionResponse>> {
    let start = Instant::now();

    let question = body.question.unwrap_or_default();
    let owner_id = user.as_ref().map(|u| u.id);

    let result = state
        .pipeline
        .answer_question(&question, owner_id)
        .await
        .map_err(|e| e.into_route_error("Failed to process question"))?;

    let latency_ms = start.elapsed().as_millis() as u64;

    metrics::record_question(
        latency_ms as f64 / 1000.0,
        result.mode.as_str(),
        result.references.len(),
    );

    tracing::info!(
        mode = result.mode.as_str(),
        references = result.references.len(),
        ai_powered = result.ai_powered,
        latency_ms,
        "Question answered"
    );

    Ok(Json(QuestionResponse {
        success: true,
        question: question.trim().to_string(),
        answer: result.answer,
        references: result.references,
        ai_powered: result.ai_powered,
        note: result.note,
    }))
}
