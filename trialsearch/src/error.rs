//! Error types for the `trialsearch` crate.

use thiserror::Error;

/// Errors that can occur while serving a trial search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The language model's intent response was malformed or the call failed.
    ///
    /// Surfaced to the caller as a request failure; not retried internally.
    #[error("Intent parse error ({provider}): {message}")]
    IntentError {
        /// The language-model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A geocoding request failed.
    ///
    /// The pipeline recovers from this by skipping the distance filter;
    /// it never fails a search on its own.
    #[error("Geocoding error ({provider}): {message}")]
    GeocodeError {
        /// The geocoding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the search pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// The incoming query was empty or blank.
    #[error("empty query")]
    EmptyQuery,
}

/// A convenience result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
