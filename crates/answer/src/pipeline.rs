//! Question pipeline
//!
//! Orchestrates a single question: RETRIEVE -> COMPOSE -> GENERATE.
//! The remote model is tried first when it is configured and grounding
//! material exists; any generation failure falls back to the fixed
//! count-based answer. Every valid question resolves to an
//! [`AnswerResult`]; only invalid input and store failures error out.
//! The pipeline never writes documents and keeps no state across
//! requests.

use crate::compose::{compose, Citation};
use crate::generate::{build_prompt, RemoteModel};
use crate::retrieval::{DocumentSource, RetrievalSelector, DEFAULT_MAX_RESULTS};
use serde::Serialize;
use std::sync::Arc;
use webloom_common::{metrics, AppError, Result};

/// Note attached to AI-generated answers
pub const AI_NOTE: &str = "Answer generated using Gemini AI";

const NO_CONTENT_ANSWER: &str =
    "No content found in the database. Please scrape some content first using the Chrome extension.";

const AI_DISABLED_NOTE: &str =
    "Note: AI features are not enabled. Set GEMINI_API_KEY in your .env file to get AI-powered answers.";

/// Which generation path produced the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnswerMode {
    /// Remote model answered over the composed context
    #[serde(rename = "ai")]
    Ai,

    /// Candidates existed but the answer is the fixed count template
    #[serde(rename = "fallback-found")]
    FallbackFound,

    /// The owner has no stored content at all
    #[serde(rename = "fallback-empty")]
    FallbackEmpty,
}

impl AnswerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerMode::Ai => "ai",
            AnswerMode::FallbackFound => "fallback-found",
            AnswerMode::FallbackEmpty => "fallback-empty",
        }
    }
}

/// Outcome of answering one question. Constructed and discarded within
/// a single request.
#[derive(Debug)]
pub struct AnswerResult {
    /// User-facing answer text
    pub answer: String,

    /// Citations in retrieval order
    pub references: Vec<Citation>,

    /// Whether the remote model produced the answer
    pub ai_powered: bool,

    /// Generation path taken
    pub mode: AnswerMode,

    /// Optional provenance note for the response envelope
    pub note: Option<String>,
}

/// Orchestrates retrieval, composition, and answer generation
pub struct QuestionPipeline {
    selector: RetrievalSelector,
    model: Option<Arc<dyn RemoteModel>>,
}

impl QuestionPipeline {
    /// Create a pipeline over a document source and an optional remote
    /// model capability
    pub fn new(source: Arc<dyn DocumentSource>, model: Option<Arc<dyn RemoteModel>>) -> Self {
        Self {
            selector: RetrievalSelector::new(source),
            model,
        }
    }

    /// Whether a remote model is configured
    pub fn is_remote_available(&self) -> bool {
        self.model.is_some()
    }

    /// Answer a question for the given owner.
    ///
    /// Rejects empty/whitespace questions before touching the store.
    pub async fn answer_question(
        &self,
        question: &str,
        owner_id: Option<i64>,
    ) -> Result<AnswerResult> {
        if question.trim().is_empty() {
            return Err(AppError::validation("Question is required"));
        }

        // RETRIEVE
        let documents = self
            .selector
            .select(question, owner_id, DEFAULT_MAX_RESULTS)
            .await?;

        // COMPOSE
        let composed = compose(&documents);

        // GENERATE
        let (answer, mode, note) = match (&self.model, documents.is_empty()) {
            (Some(model), false) => {
                let prompt = build_prompt(question, &composed.context_block);
                match model.generate(&prompt).await {
                    Ok(text) => {
                        metrics::record_generation(true);
                        (text, AnswerMode::Ai, Some(AI_NOTE.to_string()))
                    }
                    Err(err) => {
                        metrics::record_generation(false);
                        tracing::warn!(error = %err, "Remote generation failed, using fallback answer");
                        (found_answer(documents.len(), false), AnswerMode::FallbackFound, None)
                    }
                }
            }
            (None, false) => (found_answer(documents.len(), true), AnswerMode::FallbackFound, None),
            (_, true) => (NO_CONTENT_ANSWER.to_string(), AnswerMode::FallbackEmpty, None),
        };

        Ok(AnswerResult {
            answer,
            references: composed.references,
            ai_powered: mode == AnswerMode::Ai,
            mode,
            note,
        })
    }
}

/// Fixed answer when candidates exist but the model did not run. The
/// not-enabled note is only added when the model was never configured;
/// a transient remote failure reads the same as a plain answer.
fn found_answer(count: usize, remote_unconfigured: bool) -> String {
    let base = format!(
        "Found {} content item(s). See the reference links below for more details.",
        count
    );

    if remote_unconfigured {
        format!("{}\n\n{}", base, AI_DISABLED_NOTE)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::GenerationError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use webloom_common::db::models::Document;

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

    struct FakeSource {
        matches: Vec<Document>,
        recent: Vec<Document>,
        search_calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(matches: Vec<Document>, recent: Vec<Document>) -> Arc<Self> {
            Arc::new(Self {
                matches,
                recent,
                search_calls: AtomicUsize::new(0),
            })
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
            Ok(self.recent.iter().take(limit as usize).cloned().collect())
        }
    }

    enum ModelBehavior {
        Succeed(&'static str),
        Fail,
    }

    struct FakeModel {
        behavior: ModelBehavior,
        calls: AtomicUsize,
    }

    impl FakeModel {
        fn new(behavior: ModelBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RemoteModel for FakeModel {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                ModelBehavior::Succeed(text) => Ok(text.to_string()),
                ModelBehavior::Fail => Err(GenerationError::Status {
                    status: 429,
                    body: "quota exceeded".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_whitespace_question_is_rejected_before_retrieval() {
        let source = FakeSource::new(vec![doc(1, "t", "c")], vec![]);
        let pipeline = QuestionPipeline::new(source.clone(), None);

        let err = pipeline.answer_question("   \t", Some(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "Question is required");
        assert_eq!(source.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ai_answer_over_matches() {
        let source = FakeSource::new(vec![doc(1, "Test Page", "test content here")], vec![]);
        let model = FakeModel::new(ModelBehavior::Succeed("Grounded answer [1]."));
        let pipeline = QuestionPipeline::new(source, Some(model.clone()));

        let result = pipeline.answer_question("test", Some(1)).await.unwrap();

        assert_eq!(result.answer, "Grounded answer [1].");
        assert!(result.ai_powered);
        assert_eq!(result.mode, AnswerMode::Ai);
        assert_eq!(result.note.as_deref(), Some(AI_NOTE));
        assert_eq!(result.references.len(), 1);
        assert_eq!(result.references[0].snippet, "test content here");
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_without_leaking_cause() {
        let source = FakeSource::new(vec![doc(1, "a", "x"), doc(2, "b", "y")], vec![]);
        let model = FakeModel::new(ModelBehavior::Fail);
        let pipeline = QuestionPipeline::new(source, Some(model));

        let result = pipeline.answer_question("x", Some(1)).await.unwrap();

        assert_eq!(
            result.answer,
            "Found 2 content item(s). See the reference links below for more details."
        );
        assert!(!result.ai_powered);
        assert_eq!(result.mode, AnswerMode::FallbackFound);
        assert!(result.note.is_none());
        assert!(!result.answer.contains("quota"));
        assert_eq!(result.references.len(), 2);
    }

    #[tokio::test]
    async fn test_unconfigured_model_adds_enable_note() {
        let source = FakeSource::new(vec![doc(1, "a", "x")], vec![]);
        let pipeline = QuestionPipeline::new(source, None);

        let result = pipeline.answer_question("x", Some(1)).await.unwrap();

        assert_eq!(result.mode, AnswerMode::FallbackFound);
        assert!(result.answer.starts_with("Found 1 content item(s)."));
        assert!(result.answer.ends_with(AI_DISABLED_NOTE));
    }

    #[tokio::test]
    async fn test_empty_store_skips_the_model() {
        let source = FakeSource::new(vec![], vec![]);
        let model = FakeModel::new(ModelBehavior::Succeed("should not run"));
        let pipeline = QuestionPipeline::new(source, Some(model.clone()));

        let result = pipeline.answer_question("anything", Some(1)).await.unwrap();

        assert_eq!(result.answer, NO_CONTENT_ANSWER);
        assert_eq!(result.mode, AnswerMode::FallbackEmpty);
        assert!(!result.ai_powered);
        assert!(result.references.is_empty());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ai_runs_over_recency_fallback_documents() {
        // Nothing matches the question, but recent documents exist
        let source = FakeSource::new(vec![], vec![doc(5, "Recent", "unrelated text")]);
        let model = FakeModel::new(ModelBehavior::Succeed("Answer from recent content."));
        let pipeline = QuestionPipeline::new(source, Some(model.clone()));

        let result = pipeline.answer_question("no match", Some(1)).await.unwrap();

        assert!(result.ai_powered);
        assert_eq!(result.references.len(), 1);
        assert_eq!(result.references[0].id, 5);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_identical_questions_yield_identical_references() {
        let source = FakeSource::new(vec![doc(3, "a", "x"), doc(1, "b", "x")], vec![]);
        let pipeline = QuestionPipeline::new(source, None);

        let first = pipeline.answer_question("x", Some(1)).await.unwrap();
        let second = pipeline.answer_question("x", Some(1)).await.unwrap();

        let ids = |r: &AnswerResult| r.references.iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(AnswerMode::Ai.as_str(), "ai");
        assert_eq!(AnswerMode::FallbackFound.as_str(), "fallback-found");
        assert_eq!(AnswerMode::FallbackEmpty.as_str(), "fallback-empty");
    }
}
