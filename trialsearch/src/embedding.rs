//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that maps text to a fixed-length embedding vector.
///
/// Implementations wrap a specific backend behind a unified async interface
/// and are responsible for staying within that backend's input token budget
/// (see [`truncate_to_budget`]).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Truncate `text` to at most `max_chars` characters, on a char boundary.
///
/// Used to approximate a model's token budget before a request is sent.
/// One token is roughly four characters of English text, so callers pass
/// `4 * max_tokens`; the model-side tokenizer remains the authority and a
/// truncated input may still be shortened further by the API.
pub fn truncate_to_budget(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_budget("hello", 10), "hello");
    }

    #[test]
    fn long_text_is_cut_at_the_budget() {
        assert_eq!(truncate_to_budget("hello world", 5), "hello");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "héllo wörld";
        let cut = truncate_to_budget(text, 3);
        assert_eq!(cut, "hél");
    }
}
