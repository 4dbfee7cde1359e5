//! Remote answer generation seam
//!
//! The remote model is an injected capability: the pipeline holds an
//! optional [`RemoteModel`] built once at startup, so availability is a
//! property of construction, not of process-wide globals. Failures stay
//! inside [`GenerationError`]; causes are logged by the caller and never
//! surfaced to the end user.

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a remote generation call. Recovered by falling back to
/// the non-AI answer; never retried.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("remote model is not configured")]
    NotConfigured,

    /// Transport-level failure, including the client-side timeout
    #[error("request to remote model failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("remote model returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("remote model response was malformed: {0}")]
    Malformed(String),
}

/// Text-in/text-out contract of the external language model
#[async_trait]
pub trait RemoteModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Build the instructional prompt embedding the question and the
/// composed context block.
pub fn build_prompt(question: &str, context_block: &str) -> String {
    format!(
        "You are a helpful assistant that answers questions based on the provided web content \
that was scraped from various websites.\n\
\n\
User Question: {question}\n\
\n\
Relevant Content from Scraped Sources:\n\
{context_block}\n\
\n\
Instructions:\n\
1. Answer the question based ONLY on the provided scraped content\n\
2. If the content doesn't contain enough information to answer the question, say so clearly\n\
3. Be concise and accurate\n\
4. Cite which source(s) you used for your answer\n\
5. If no relevant content is provided, suggest that the user scrape more content or rephrase their question\n\
\n\
Answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_question_and_context() {
        let prompt = build_prompt("what is rust?", "[Source 1]\nTitle: t\nURL: u\nContent: c");

        assert!(prompt.contains("User Question: what is rust?"));
        assert!(prompt.contains("[Source 1]"));
        assert!(prompt.contains("based ONLY on the provided scraped content"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_prompt_carries_empty_placeholder() {
        let prompt = build_prompt("anything", crate::compose::EMPTY_CONTEXT);
        assert!(prompt.contains("No relevant content found."));
    }
}
