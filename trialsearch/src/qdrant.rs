//! Qdrant vector store backend.
//!
//! Provides [`QdrantVectorStore`] which implements [`VectorStore`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//! Trials are stored with numeric point ids (the registry identifier with
//! the `NCT` prefix stripped) in cosine-distance collections, with their
//! attributes as keyword payload fields.

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;

use crate::error::{Result, SearchError};
use crate::filter::FieldFilter;
use crate::trial::{SearchHit, TrialPoint};
use crate::vectorstore::VectorStore;

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    /// Create a new Qdrant vector store connecting to the given URL.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Create a new Qdrant vector store with default URL (`http://localhost:6334`).
    pub fn default_url() -> Result<Self> {
        Self::new("http://localhost:6334")
    }

    /// Create a new Qdrant vector store from an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> SearchError {
        SearchError::VectorStoreError { backend: "qdrant".to_string(), message: e.to_string() }
    }

    /// Extract a string from a Qdrant payload value.
    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        if collections.collections.iter().any(|c| c.name == name) {
            debug!(collection = name, "qdrant collection already exists, skipping creation");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = name, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: &[TrialPoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = points
            .iter()
            .map(|point| {
                let payload_map: serde_json::Map<String, serde_json::Value> = point
                    .payload
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect();
                let payload =
                    Payload::try_from(serde_json::Value::Object(payload_map)).unwrap_or_default();
                PointStruct::new(point.id, point.embedding.clone(), payload)
            })
            .collect();

        let count = points.len();
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, count, "upserted trials to qdrant");
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let info = self.client.collection_info(collection).await.map_err(Self::map_err)?;
        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        filters: &[FieldFilter],
    ) -> Result<Vec<SearchHit>> {
        let mut request = SearchPointsBuilder::new(collection, embedding.to_vec(), limit as u64)
            .with_payload(true);

        // An empty filter set is omitted entirely so the index can
        // short-circuit instead of evaluating a vacuous condition.
        if !filters.is_empty() {
            let conditions: Vec<Condition> = filters
                .iter()
                .map(|filter| Condition::matches(filter.key.clone(), filter.any.clone()))
                .collect();
            request = request.filter(Filter::must(conditions));
        }

        let response = self.client.search_points(request).await.map_err(Self::map_err)?;

        let hits = response
            .result
            .into_iter()
            .map(|scored| {
                let id = scored
                    .id
                    .as_ref()
                    .and_then(|pid| match &pid.point_id_options {
                        Some(PointIdOptions::Num(n)) => Some(n.to_string()),
                        Some(PointIdOptions::Uuid(s)) => Some(s.clone()),
                        None => None,
                    })
                    .unwrap_or_default();

                let payload: HashMap<String, String> = scored
                    .payload
                    .iter()
                    .filter_map(|(k, v)| Self::extract_string(v).map(|s| (k.clone(), s)))
                    .collect();

                SearchHit { id, score: scored.score, payload }
            })
            .collect();

        Ok(hits)
    }
}
