//! OpenAI backends: the embeddings API and the chat-completions API used
//! for intent extraction.
//!
//! This module is only available when the `openai` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::{truncate_to_budget, EmbeddingProvider};
use crate::error::{Result, SearchError};
use crate::intent::{IntentParser, SearchIntent, INTENT_SYSTEM_PROMPT};

/// The OpenAI embeddings API endpoint.
const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// The OpenAI chat completions API endpoint.
const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// The default model for embeddings.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

/// Input token budget of the embedding model, approximated in characters
/// (roughly four characters per token).
const EMBED_INPUT_BUDGET_CHARS: usize = 8191 * 4;

/// The default model for intent extraction.
const DEFAULT_INTENT_MODEL: &str = "gpt-4.1-nano";

/// Token cap for the intent response; the schema fits comfortably within it.
const INTENT_MAX_TOKENS: u32 = 500;

fn api_key_from_env() -> Result<String> {
    std::env::var("OPENAI_API_KEY").map_err(|_| SearchError::EmbeddingError {
        provider: "OpenAI".into(),
        message: "OPENAI_API_KEY environment variable not set".into(),
    })
}

async fn read_api_error(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    format!("API returned {status}: {detail}")
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── Embedding provider ─────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// Uses `reqwest` to call the `/v1/embeddings` endpoint directly. Input
/// longer than the model's token budget is truncated before sending.
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbeddingProvider {
    /// Create a new provider with the given API key and the default model
    /// (`text-embedding-3-small`, 1536 dimensions).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(SearchError::EmbeddingError {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::new(api_key_from_env()?)
    }

    /// Set the model name and its output dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = truncate_to_budget(text, EMBED_INPUT_BUDGET_CHARS);
        debug!(provider = "OpenAI", text_len = text.len(), model = %self.model, "embedding text");

        let request_body = EmbeddingRequest { model: &self.model, input: vec![text] };
        let response = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "embedding request failed");
                SearchError::EmbeddingError {
                    provider: "OpenAI".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let message = read_api_error(response).await;
            error!(provider = "OpenAI", message = %message, "embedding API error");
            return Err(SearchError::EmbeddingError { provider: "OpenAI".into(), message });
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            SearchError::EmbeddingError {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        embedding_response.data.into_iter().next().map(|d| d.embedding).ok_or_else(|| {
            SearchError::EmbeddingError {
                provider: "OpenAI".into(),
                message: "API returned empty response".into(),
            }
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Intent parser ──────────────────────────────────────────────────

/// An [`IntentParser`] backed by the OpenAI chat completions API.
///
/// Sends the fixed system instruction plus the user query with a strict
/// JSON-schema response format at temperature 0, and deserializes the
/// message content into a [`SearchIntent`].
pub struct OpenAiIntentParser {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiIntentParser {
    /// Create a new parser with the given API key and the default model
    /// (`gpt-4.1-nano`).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(SearchError::IntentError {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_INTENT_MODEL.into(),
        })
    }

    /// Create a new parser using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| SearchError::IntentError {
            provider: "OpenAI".into(),
            message: "OPENAI_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The strict response schema the model must fill.
    fn response_format() -> serde_json::Value {
        serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": "search_intent",
                "strict": true,
                "schema": {
                    "type": "object",
                    "properties": {
                        "type": { "type": "string" },
                        "criteria_sex": { "type": "string" },
                        "criteria_age": { "type": "string" },
                        "location": { "type": "string" },
                        "distance_miles": { "type": "integer" },
                        "semantic_phrases": { "type": "string" }
                    },
                    "required": [
                        "type",
                        "criteria_sex",
                        "criteria_age",
                        "location",
                        "distance_miles",
                        "semantic_phrases"
                    ],
                    "additionalProperties": false
                }
            }
        })
    }
}

#[async_trait]
impl IntentParser for OpenAiIntentParser {
    async fn parse(&self, query: &str) -> Result<SearchIntent> {
        // The semantic phrases feed the embedding model downstream, so its
        // input budget bounds the query we forward.
        let query = truncate_to_budget(query, EMBED_INPUT_BUDGET_CHARS);
        debug!(provider = "OpenAI", model = %self.model, query_len = query.len(), "parsing intent");

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: INTENT_SYSTEM_PROMPT },
                ChatMessage { role: "user", content: query },
            ],
            temperature: 0.0,
            max_tokens: INTENT_MAX_TOKENS,
            response_format: Self::response_format(),
        };

        let response = self
            .client
            .post(OPENAI_CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "intent request failed");
                SearchError::IntentError {
                    provider: "OpenAI".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let message = read_api_error(response).await;
            error!(provider = "OpenAI", message = %message, "intent API error");
            return Err(SearchError::IntentError { provider: "OpenAI".into(), message });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            SearchError::IntentError {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| SearchError::IntentError {
                provider: "OpenAI".into(),
                message: "API returned no choices".into(),
            })?;

        let intent: SearchIntent = serde_json::from_str(&content).map_err(|e| {
            error!(provider = "OpenAI", error = %e, "intent response did not match schema");
            SearchError::IntentError {
                provider: "OpenAI".into(),
                message: format!("response did not match intent schema: {e}"),
            }
        })?;

        debug!(?intent, "parsed search intent");
        Ok(intent)
    }
}
