use anyhow::{bail, Result};
use axum::Router;
use clap::Parser;
use sift_core::{build_indices, DocumentStore, JsonlStore, SearchConfig, SledStore};
use sift_server::build_app;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// JSONL corpus, one document per line
    #[arg(long, conflicts_with = "db")]
    corpus: Option<String>,
    /// Document database written by `sift-indexer ingest`
    #[arg(long)]
    db: Option<String>,
    /// JSON search config (k-gram size, BM25 parameters)
    #[arg(long)]
    config: Option<String>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SearchConfig::from_json_file(path)?,
        None => SearchConfig::default(),
    };
    let store: Arc<dyn DocumentStore> = match (&args.corpus, &args.db) {
        (Some(corpus), _) => Arc::new(JsonlStore::open(corpus)?),
        (None, Some(db)) => Arc::new(SledStore::open(db)?),
        (None, None) => bail!("one of --corpus or --db is required"),
    };
    let searcher = build_indices(store.as_ref(), config)?;
    let app: Router = build_app(searcher, store);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
