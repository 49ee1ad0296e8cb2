//! HTTP surface for the trialsearch pipeline.
//!
//! One JSON endpoint, `POST /search`, runs a free-text query through the
//! pipeline and returns the formatted results; `GET /health` reports the
//! collection size.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use trialsearch::{SearchError, SearchPipeline, TrialSummary};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<SearchPipeline>,
}

impl AppState {
    /// Create state around a built pipeline.
    pub fn new(pipeline: Arc<SearchPipeline>) -> Self {
        Self { pipeline }
    }
}

/// Body of a search request.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// The free-text query.
    #[serde(default)]
    pub query: String,
}

/// Error body returned with 4xx/5xx responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description of the failure.
    pub error: String,
}

/// Health report.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthBody {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Number of trials in the collection, zero when the store is
    /// unreachable.
    pub trials: u64,
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/search", post(search))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ErrorResponse = (StatusCode, Json<ErrorBody>);

fn bad_request(message: &str) -> ErrorResponse {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error: message.to_string() }))
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<TrialSummary>>, ErrorResponse> {
    if request.query.trim().is_empty() {
        return Err(bad_request("no query provided"));
    }

    match state.pipeline.search(&request.query).await {
        Ok(results) => Ok(Json(results)),
        Err(SearchError::EmptyQuery) => Err(bad_request("no query provided")),
        Err(e) => {
            error!(error = %e, "search request failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error: e.to_string() })))
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    let config = state.pipeline.config();
    let trials =
        state.pipeline.vector_store().count(&config.collection).await.unwrap_or_default();
    Json(HealthBody { status: "ok".to_string(), trials })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use trialsearch::error::Result;
    use trialsearch::geo::{GeoPoint, Geocoder};
    use trialsearch::intent::{IntentParser, SearchIntent};
    use trialsearch::trial::TrialPoint;
    use trialsearch::{EmbeddingProvider, InMemoryVectorStore, SearchConfig, VectorStore};

    use super::*;

    struct StubIntentParser;

    #[async_trait]
    impl IntentParser for StubIntentParser {
        async fn parse(&self, _query: &str) -> Result<SearchIntent> {
            Ok(SearchIntent { semantic_phrases: "asthma".into(), ..Default::default() })
        }
    }

    struct StubEmbedder;

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct StubGeocoder;

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn geocode(&self, _location: &str) -> Result<Option<GeoPoint>> {
            Ok(None)
        }
    }

    async fn test_app() -> Router {
        let store = InMemoryVectorStore::new();
        store.create_collection("clinical_trials", 2).await.unwrap();
        let payload: HashMap<String, String> =
            [("brief_title".to_string(), "Asthma Study".to_string())].into_iter().collect();
        store
            .upsert("clinical_trials", &[TrialPoint { id: 7, embedding: vec![1.0, 0.0], payload }])
            .await
            .unwrap();

        let pipeline = SearchPipeline::builder()
            .config(SearchConfig::default())
            .intent_parser(Arc::new(StubIntentParser))
            .embedding_provider(Arc::new(StubEmbedder))
            .vector_store(Arc::new(store))
            .geocoder(Arc::new(StubGeocoder))
            .build()
            .unwrap();
        app(AppState::new(Arc::new(pipeline)))
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn search_returns_formatted_results() {
        let app = test_app().await;
        let response =
            app.oneshot(json_request("/search", r#"{"query": "asthma trials"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let results: Vec<TrialSummary> = serde_json::from_slice(&body).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "NCT00000007");
        assert_eq!(results[0].brief_title, "Asthma Study");
        assert_eq!(results[0].lat_lon, "[]");
    }

    #[tokio::test]
    async fn blank_query_is_a_bad_request() {
        let app = test_app().await;
        let response = app.oneshot(json_request("/search", r#"{"query": "  "}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "no query provided");
    }

    #[tokio::test]
    async fn missing_query_field_is_a_bad_request() {
        let app = test_app().await;
        let response = app.oneshot(json_request("/search", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_collection_size() {
        let app = test_app().await;
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let health: HealthBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.trials, 1);
    }
}
