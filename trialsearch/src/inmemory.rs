//! In-memory vector store using cosine similarity.
//!
//! A zero-dependency backend suitable for development and tests: collections
//! live in a `HashMap` behind a `tokio::sync::RwLock`, and payload filters
//! are applied by direct value comparison before scoring.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Result, SearchError};
use crate::filter::FieldFilter;
use crate::trial::{SearchHit, TrialPoint};
use crate::vectorstore::VectorStore;

/// An in-memory [`VectorStore`] using cosine similarity for search.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, HashMap<u64, TrialPoint>>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(collection: &str) -> SearchError {
        SearchError::VectorStoreError {
            backend: "InMemory".to_string(),
            message: format!("collection '{collection}' does not exist"),
        }
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Whether a point's payload satisfies every filter (logical AND, each
/// filter matching when the stored value equals any of its candidates).
fn matches_filters(point: &TrialPoint, filters: &[FieldFilter]) -> bool {
    filters.iter().all(|filter| {
        point
            .payload
            .get(&filter.key)
            .is_some_and(|value| filter.any.iter().any(|candidate| candidate == value))
    })
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, _dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: &[TrialPoint]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;
        for point in points {
            store.insert(point.id, point.clone());
        }
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| Self::missing(collection))?;
        Ok(store.len() as u64)
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        filters: &[FieldFilter],
    ) -> Result<Vec<SearchHit>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| Self::missing(collection))?;

        let mut scored: Vec<SearchHit> = store
            .values()
            .filter(|point| matches_filters(point, filters))
            .map(|point| SearchHit {
                id: point.id.to_string(),
                score: cosine_similarity(&point.embedding, embedding),
                payload: point.payload.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: u64, embedding: Vec<f32>, fields: &[(&str, &str)]) -> TrialPoint {
        TrialPoint {
            id,
            embedding,
            payload: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[tokio::test]
    async fn search_orders_by_descending_similarity() {
        let store = InMemoryVectorStore::new();
        store.create_collection("trials", 2).await.unwrap();
        store
            .upsert(
                "trials",
                &[
                    point(1, vec![1.0, 0.0], &[]),
                    point(2, vec![0.0, 1.0], &[]),
                    point(3, vec![0.7, 0.7], &[]),
                ],
            )
            .await
            .unwrap();

        let hits = store.search("trials", &[1.0, 0.0], 10, &[]).await.unwrap();
        assert_eq!(hits.iter().map(|h| h.id.as_str()).collect::<Vec<_>>(), vec!["1", "3", "2"]);
    }

    #[tokio::test]
    async fn filters_are_conjunctive_match_any() {
        let store = InMemoryVectorStore::new();
        store.create_collection("trials", 2).await.unwrap();
        store
            .upsert(
                "trials",
                &[
                    point(1, vec![1.0, 0.0], &[("type", "INTERVENTIONAL"), ("criteria_sex", "ALL")]),
                    point(2, vec![1.0, 0.0], &[("type", "OBSERVATIONAL"), ("criteria_sex", "FEMALE")]),
                    point(3, vec![1.0, 0.0], &[("type", "INTERVENTIONAL"), ("criteria_sex", "MALE")]),
                ],
            )
            .await
            .unwrap();

        let filters = vec![
            FieldFilter { key: "type".into(), any: vec!["INTERVENTIONAL".into()] },
            FieldFilter { key: "criteria_sex".into(), any: vec!["ALL".into(), "FEMALE".into()] },
        ];
        let hits = store.search("trials", &[1.0, 0.0], 10, &filters).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");
    }

    #[tokio::test]
    async fn missing_payload_key_fails_the_filter() {
        let store = InMemoryVectorStore::new();
        store.create_collection("trials", 2).await.unwrap();
        store.upsert("trials", &[point(1, vec![1.0, 0.0], &[])]).await.unwrap();

        let filters = vec![FieldFilter { key: "type".into(), any: vec!["INTERVENTIONAL".into()] }];
        let hits = store.search("trials", &[1.0, 0.0], 10, &filters).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn count_reflects_upserts() {
        let store = InMemoryVectorStore::new();
        store.create_collection("trials", 2).await.unwrap();
        store
            .upsert("trials", &[point(1, vec![1.0, 0.0], &[]), point(1, vec![0.5, 0.5], &[])])
            .await
            .unwrap();
        assert_eq!(store.count("trials").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_collection_is_an_error() {
        let store = InMemoryVectorStore::new();
        assert!(store.search("missing", &[1.0], 5, &[]).await.is_err());
    }
}
