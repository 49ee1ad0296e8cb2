//! The query pipeline: intent → filters → vector search → distance filter →
//! formatting.
//!
//! The pipeline degrades gracefully: a geocoding failure or an empty filter
//! set never produces an error, only a less-filtered result set. The only
//! caller-visible failures for a healthy store and embedder are a blank
//! query and an unparseable intent response.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::SearchConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, SearchError};
use crate::filter::build_filters;
use crate::format::{format_hit, TrialSummary};
use crate::geo::{filter_by_distance, Geocoder};
use crate::intent::{IntentParser, SearchIntent};
use crate::vectorstore::VectorStore;

/// The search pipeline orchestrator.
///
/// Coordinates the intent parser, filter resolver, embedding provider,
/// vector store, and geocoder for one query at a time. Construct one via
/// [`SearchPipeline::builder()`].
pub struct SearchPipeline {
    config: SearchConfig,
    intent_parser: Arc<dyn IntentParser>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    geocoder: Arc<dyn Geocoder>,
}

impl SearchPipeline {
    /// Create a new [`SearchPipelineBuilder`].
    pub fn builder() -> SearchPipelineBuilder {
        SearchPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Run one query end to end.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyQuery`] for blank input,
    /// [`SearchError::IntentError`] when the intent response is malformed,
    /// and [`SearchError::PipelineError`] when embedding or the vector
    /// search fails. Geocoding failures are recovered internally.
    pub async fn search(&self, query: &str) -> Result<Vec<TrialSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let mut intent = self.intent_parser.parse(query).await?;
        self.normalize(&mut intent);
        debug!(?intent, "resolved query intent");

        let filters = build_filters(&intent);
        let do_geo = !intent.location.is_empty() && intent.distance_miles > 0;
        let limit = if do_geo {
            // The index ranks by similarity alone, so the distance cut can
            // only run after the fetch; over-fetch to compensate.
            self.config.n_results * self.config.geo_buffer_factor
        } else {
            self.config.n_results
        };

        let embedding =
            self.embedding_provider.embed(&intent.semantic_phrases).await.map_err(|e| {
                error!(error = %e, "query embedding failed");
                SearchError::PipelineError(format!("query embedding failed: {e}"))
            })?;

        let mut hits = self
            .vector_store
            .search(&self.config.collection, &embedding, limit, &filters)
            .await
            .map_err(|e| {
                error!(collection = %self.config.collection, error = %e, "vector search failed");
                SearchError::PipelineError(format!(
                    "search failed in collection '{}': {e}",
                    self.config.collection
                ))
            })?;

        if do_geo {
            match self.geocoder.geocode(&intent.location).await {
                Ok(Some(center)) => {
                    let before = hits.len();
                    hits = filter_by_distance(hits, center, f64::from(intent.distance_miles));
                    debug!(
                        location = %intent.location,
                        radius_miles = intent.distance_miles,
                        before,
                        after = hits.len(),
                        "applied distance filter"
                    );
                }
                Ok(None) => {
                    warn!(location = %intent.location, "location not found, skipping distance filter");
                }
                Err(e) => {
                    warn!(location = %intent.location, error = %e, "geocoding failed, skipping distance filter");
                }
            }
        }

        hits.truncate(self.config.n_results);
        let results: Vec<TrialSummary> =
            hits.iter().map(|hit| format_hit(hit, &intent)).collect();

        info!(result_count = results.len(), filter_count = filters.len(), "query completed");
        Ok(results)
    }

    /// Make the intent internally consistent before it drives the search.
    ///
    /// A distance without a location is meaningless and is zeroed; a
    /// location without a distance gets the configured default radius.
    fn normalize(&self, intent: &mut SearchIntent) {
        if intent.location.is_empty() {
            intent.distance_miles = 0;
        } else if intent.distance_miles == 0 {
            intent.distance_miles = self.config.default_radius_miles;
        }
    }
}

/// Builder for constructing a [`SearchPipeline`].
///
/// The config defaults when unset; all four collaborators are required.
#[derive(Default)]
pub struct SearchPipelineBuilder {
    config: Option<SearchConfig>,
    intent_parser: Option<Arc<dyn IntentParser>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl SearchPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the intent parser.
    pub fn intent_parser(mut self, parser: Arc<dyn IntentParser>) -> Self {
        self.intent_parser = Some(parser);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the geocoder.
    pub fn geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Build the [`SearchPipeline`], validating that all collaborators are
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ConfigError`] if any required field is
    /// missing.
    pub fn build(self) -> Result<SearchPipeline> {
        let config = self.config.unwrap_or_default();
        let intent_parser = self
            .intent_parser
            .ok_or_else(|| SearchError::ConfigError("intent_parser is required".to_string()))?;
        let embedding_provider = self.embedding_provider.ok_or_else(|| {
            SearchError::ConfigError("embedding_provider is required".to_string())
        })?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| SearchError::ConfigError("vector_store is required".to_string()))?;
        let geocoder = self
            .geocoder
            .ok_or_else(|| SearchError::ConfigError("geocoder is required".to_string()))?;

        Ok(SearchPipeline { config, intent_parser, embedding_provider, vector_store, geocoder })
    }
}
