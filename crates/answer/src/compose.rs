//! Context composition
//!
//! Converts selected documents into the bounded textual context handed
//! to the model plus the citation list returned to the caller. The two
//! truncations are intentionally different: citations carry a 200-char
//! snippet, the model context a 1000-char preview per source.

use serde::{Deserialize, Serialize};
use webloom_common::db::models::Document;

/// Citation snippet length in characters
pub const SNIPPET_CHARS: usize = 200;

/// Per-source content preview length in the model context
pub const PREVIEW_CHARS: usize = 1000;

/// Context placeholder when no candidates exist
pub const EMPTY_CONTEXT: &str = "No relevant content found.";

/// Reference metadata returned alongside an answer, traceable to a
/// stored document. Serialized straight onto the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub timestamp: String,
}

/// Result of composing candidates into model input
#[derive(Debug, Clone)]
pub struct ComposedContext {
    /// Labeled source blocks for the model prompt
    pub context_block: String,

    /// Citations in candidate order
    pub references: Vec<Citation>,
}

/// Build the model context and citation list from candidates, in input
/// order.
pub fn compose(documents: &[Document]) -> ComposedContext {
    if documents.is_empty() {
        return ComposedContext {
            context_block: EMPTY_CONTEXT.to_string(),
            references: Vec::new(),
        };
    }

    let references = documents
        .iter()
        .map(|doc| Citation {
            id: doc.id,
            url: doc.url.clone(),
            title: doc.title.clone(),
            snippet: excerpt(&doc.content, SNIPPET_CHARS),
            timestamp: doc.timestamp.clone(),
        })
        .collect();

    let context_block = documents
        .iter()
        .enumerate()
        .map(|(index, doc)| {
            format!(
                "[Source {}]\nTitle: {}\nURL: {}\nContent: {}",
                index + 1,
                doc.title,
                doc.url,
                excerpt(&doc.content, PREVIEW_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    ComposedContext {
        context_block,
        references,
    }
}

/// First `max_chars` characters of `text`, with an ellipsis marker when
/// truncated. Counts Unicode scalar values, never bytes.
fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}
