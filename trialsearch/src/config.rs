//! Configuration for the search pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Configuration parameters for the search pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Name of the vector store collection holding the trials.
    pub collection: String,
    /// Number of results to return per query.
    pub n_results: usize,
    /// Over-fetch multiplier applied to `n_results` when a distance filter
    /// will run after the vector search.
    ///
    /// The index ranks purely by similarity and knows nothing about
    /// geography, so the candidate set must be fetched before distance
    /// filtering can run. A larger factor raises recall (fewer nearby trials
    /// lost to pre-filter truncation) at the cost of a larger search; a
    /// smaller one does the opposite. The default of 10 mirrors the source
    /// system and carries no stronger justification.
    pub geo_buffer_factor: usize,
    /// Radius in miles applied when a query names a location without a
    /// distance.
    pub default_radius_miles: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            collection: "clinical_trials".to_string(),
            n_results: 10,
            geo_buffer_factor: 10,
            default_radius_miles: 50,
        }
    }
}

impl SearchConfig {
    /// Create a new builder for constructing a [`SearchConfig`].
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`SearchConfig`].
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Set the vector store collection name.
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.config.collection = collection.into();
        self
    }

    /// Set the number of results to return per query.
    pub fn n_results(mut self, n: usize) -> Self {
        self.config.n_results = n;
        self
    }

    /// Set the over-fetch multiplier used under geographic filtering.
    pub fn geo_buffer_factor(mut self, factor: usize) -> Self {
        self.config.geo_buffer_factor = factor;
        self
    }

    /// Set the radius applied when a location is given without a distance.
    pub fn default_radius_miles(mut self, miles: u32) -> Self {
        self.config.default_radius_miles = miles;
        self
    }

    /// Build the [`SearchConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ConfigError`] if:
    /// - `collection` is empty
    /// - `n_results == 0`
    /// - `geo_buffer_factor == 0`
    /// - `default_radius_miles == 0`
    pub fn build(self) -> Result<SearchConfig> {
        if self.config.collection.is_empty() {
            return Err(SearchError::ConfigError("collection must not be empty".to_string()));
        }
        if self.config.n_results == 0 {
            return Err(SearchError::ConfigError("n_results must be greater than zero".to_string()));
        }
        if self.config.geo_buffer_factor == 0 {
            return Err(SearchError::ConfigError(
                "geo_buffer_factor must be greater than zero".to_string(),
            ));
        }
        if self.config.default_radius_miles == 0 {
            return Err(SearchError::ConfigError(
                "default_radius_miles must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}
