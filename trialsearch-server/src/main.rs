//! Binary entry point: wires the live OpenAI, Qdrant, and Nominatim
//! backends into the pipeline and serves the HTTP API.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trialsearch::{
    NominatimGeocoder, OpenAiEmbeddingProvider, OpenAiIntentParser, QdrantVectorStore,
    SearchConfig, SearchPipeline, VectorStore,
};
use trialsearch_server::{app, AppState};

#[derive(Parser)]
#[command(name = "trialsearch-server")]
#[command(version, about = "Clinical-trial semantic search API", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Qdrant gRPC URL
    #[arg(long, default_value = "http://localhost:6334")]
    qdrant_url: String,

    /// Vector store collection holding the trials
    #[arg(long, default_value = "clinical_trials")]
    collection: String,

    /// Chat model used for intent extraction
    #[arg(long, default_value = "gpt-4.1-nano")]
    intent_model: String,

    /// Embedding model for the semantic search leg
    #[arg(long, default_value = "text-embedding-3-small")]
    embedding_model: String,

    /// Dimensionality of the embedding model's vectors
    #[arg(long, default_value_t = 1536)]
    embedding_dimensions: usize,

    /// Results returned per query
    #[arg(long, default_value_t = 10)]
    n_results: usize,

    /// Over-fetch multiplier applied under geographic filtering
    #[arg(long, default_value_t = 10)]
    geo_buffer_factor: usize,

    /// Radius in miles when a query names a location without a distance
    #[arg(long, default_value_t = 50)]
    default_radius_miles: u32,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = SearchConfig::builder()
        .collection(&cli.collection)
        .n_results(cli.n_results)
        .geo_buffer_factor(cli.geo_buffer_factor)
        .default_radius_miles(cli.default_radius_miles)
        .build()?;

    let store = Arc::new(QdrantVectorStore::new(&cli.qdrant_url)?);
    let trials = store.count(&cli.collection).await.unwrap_or(0);
    info!(collection = %cli.collection, trials, "connected to vector store");

    let pipeline = SearchPipeline::builder()
        .config(config)
        .intent_parser(Arc::new(OpenAiIntentParser::from_env()?.with_model(cli.intent_model)))
        .embedding_provider(Arc::new(
            OpenAiEmbeddingProvider::from_env()?
                .with_model(cli.embedding_model, cli.embedding_dimensions),
        ))
        .vector_store(store)
        .geocoder(Arc::new(NominatimGeocoder::new()?))
        .build()?;

    let router = app(AppState::new(Arc::new(pipeline)));
    let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
    info!(addr = %cli.bind, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
