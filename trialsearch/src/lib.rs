//! # trialsearch
//!
//! Natural-language search over a vector index of clinical-trial records.
//!
//! A free-text query flows through one pipeline: a language model extracts
//! structured filter intent and a semantic phrase, the filter resolver maps
//! the normalized categories onto the raw stored-value vocabulary, the
//! phrase is embedded and searched against the index under those filters,
//! an optional great-circle distance filter prunes by site location, and
//! the formatter normalizes the stored payload encodings for clients.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trialsearch::{
//!     InMemoryVectorStore, NominatimGeocoder, OpenAiEmbeddingProvider,
//!     OpenAiIntentParser, SearchConfig, SearchPipeline,
//! };
//!
//! let pipeline = SearchPipeline::builder()
//!     .config(SearchConfig::default())
//!     .intent_parser(Arc::new(OpenAiIntentParser::from_env()?))
//!     .embedding_provider(Arc::new(OpenAiEmbeddingProvider::from_env()?))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .geocoder(Arc::new(NominatimGeocoder::new()?))
//!     .build()?;
//!
//! let results = pipeline.search("breast cancer trials for women near Boston").await?;
//! ```
//!
//! The OpenAI, Qdrant, and Nominatim backends are feature-gated (`openai`,
//! `qdrant`, `nominatim`, or `full`); the in-memory store is always
//! available.

pub mod config;
pub mod embedding;
pub mod error;
pub mod filter;
pub mod format;
pub mod geo;
pub mod inmemory;
pub mod intent;
pub mod pipeline;
pub mod trial;
pub mod vectorstore;

#[cfg(feature = "nominatim")]
pub mod nominatim;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use config::{SearchConfig, SearchConfigBuilder};
pub use embedding::EmbeddingProvider;
pub use error::{Result, SearchError};
pub use filter::{build_filters, resolve, FieldFilter, FilterField};
pub use format::TrialSummary;
pub use geo::{GeoPoint, Geocoder};
pub use inmemory::InMemoryVectorStore;
pub use intent::{IntentParser, SearchIntent};
pub use pipeline::{SearchPipeline, SearchPipelineBuilder};
pub use trial::{SearchHit, TrialPoint};
pub use vectorstore::VectorStore;

#[cfg(feature = "nominatim")]
pub use nominatim::NominatimGeocoder;
#[cfg(feature = "openai")]
pub use openai::{OpenAiEmbeddingProvider, OpenAiIntentParser};
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
