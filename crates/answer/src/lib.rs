//! WebLoom Answer Engine
//!
//! Turns a free-text question into a grounded, cited answer:
//! - [`retrieval`] selects candidate documents for a question
//! - [`compose`] builds the bounded model context and citation list
//! - [`generate`] / [`gemini`] hold the remote-model seam and its client
//! - [`pipeline`] orchestrates retrieve -> compose -> generate and the
//!   fallback behavior when the remote model is absent or fails
//!
//! The engine is read-only with respect to stored documents and keeps
//! no state across requests.

pub mod compose;
pub mod gemini;
pub mod generate;
pub mod pipeline;
pub mod retrieval;

// Re-export commonly used types
pub use compose::{compose, Citation, ComposedContext};
pub use gemini::GeminiClient;
pub use generate::{build_prompt, GenerationError, RemoteModel};
pub use pipeline::{AnswerMode, AnswerResult, QuestionPipeline};
pub use retrieval::{DocumentSource, RetrievalSelector};
