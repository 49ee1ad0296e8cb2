//! Vector store trait for storing and searching trial embeddings.

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::FieldFilter;
use crate::trial::{SearchHit, TrialPoint};

/// A storage backend for trial embeddings with filtered similarity search.
///
/// Implementations manage named collections of [`TrialPoint`]s. Search is
/// read-only and ranked purely by vector similarity; filters are a
/// conjunction of payload [`FieldFilter`]s, each satisfied when the stored
/// value equals any member of its value set. Backends own their concurrency
/// control; queries share a store freely.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection. No-op if it already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Upsert trial points into a collection.
    async fn upsert(&self, collection: &str, points: &[TrialPoint]) -> Result<()>;

    /// Number of points stored in a collection.
    async fn count(&self, collection: &str) -> Result<u64>;

    /// Search for the `limit` most similar trials to the given embedding,
    /// restricted to points satisfying every filter.
    ///
    /// Returns results ordered by descending similarity score. An empty
    /// filter slice applies no payload restriction.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        filters: &[FieldFilter],
    ) -> Result<Vec<SearchHit>>;
}
