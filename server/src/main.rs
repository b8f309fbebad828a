use anyhow::{bail, Result};
use axum::Router;
use clap::Parser;
use postsearch_loader::{load_corpus, CorpusSnapshot, HttpFetcher};
use postsearch_server::{build_app, AppState, Settings};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// URL of the JSON manifest listing post URLs
    #[arg(long, conflicts_with = "corpus")]
    manifest: Option<String>,
    /// Corpus snapshot written by `postsearch snapshot`
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))).init();
    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let fetcher = Arc::new(HttpFetcher::new(&settings.loader)?);
    let corpus = match (&args.manifest, &args.corpus) {
        (_, Some(path)) => CorpusSnapshot::load(path)?.posts,
        (Some(manifest), None) => load_corpus(fetcher.clone(), manifest, &settings.loader).await,
        (None, None) => bail!("either --manifest or --corpus is required"),
    };
    tracing::info!(posts = corpus.len(), "corpus loaded");

    let app: Router = build_app(AppState::new(corpus, fetcher, &settings)?);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
