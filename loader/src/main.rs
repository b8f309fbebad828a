use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use postsearch_core::{Corpus, ResultsView, SearchConfig, Widget};
use postsearch_loader::{load_corpus, CorpusSnapshot, HttpFetcher, LoaderConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "postsearch")]
#[command(about = "Load a static blog's posts and search them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[command(flatten)]
    fetch: FetchArgs,
}

#[derive(Args)]
struct FetchArgs {
    /// Maximum concurrent post fetches
    #[arg(long, global = true, default_value_t = 16)]
    concurrency: usize,
    /// Request timeout seconds
    #[arg(long, global = true, default_value_t = 12)]
    timeout_secs: u64,
    /// User-Agent sent with every request
    #[arg(long, global = true)]
    user_agent: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every post in the manifest and write a corpus snapshot
    Snapshot {
        /// URL of the JSON manifest listing post URLs
        #[arg(long)]
        manifest: String,
        /// Output snapshot path
        #[arg(long, default_value = "./corpus.json")]
        output: PathBuf,
    },
    /// Search a corpus and print matching posts with their snippets
    Search {
        #[arg(long, conflicts_with = "corpus", required_unless_present = "corpus")]
        manifest: Option<String>,
        /// Snapshot written by `snapshot`
        #[arg(long)]
        corpus: Option<PathBuf>,
        #[arg(long)]
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))).with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let mut config = LoaderConfig { concurrency: cli.fetch.concurrency, timeout_secs: cli.fetch.timeout_secs, ..LoaderConfig::default() };
    if let Some(ua) = cli.fetch.user_agent {
        config.user_agent = ua;
    }

    match cli.command {
        Commands::Snapshot { manifest, output } => {
            let corpus = fetch_corpus(&manifest, &config).await?;
            if corpus.is_empty() {
                bail!("no posts loaded from {manifest}");
            }
            CorpusSnapshot::new(manifest, corpus).save(&output)?;
            tracing::info!(output = %output.display(), "snapshot written");
            Ok(())
        }
        Commands::Search { manifest, corpus, query } => {
            let corpus = match (manifest, corpus) {
                (_, Some(path)) => read_snapshot(&path)?,
                (Some(manifest), None) => fetch_corpus(&manifest, &config).await?,
                (None, None) => bail!("either --manifest or --corpus is required"),
            };
            print_results(&corpus, &query);
            Ok(())
        }
    }
}

async fn fetch_corpus(manifest: &str, config: &LoaderConfig) -> Result<Corpus> {
    let fetcher = Arc::new(HttpFetcher::new(config)?);
    Ok(load_corpus(fetcher, manifest, config).await)
}

fn read_snapshot(path: &Path) -> Result<Corpus> {
    let snapshot = CorpusSnapshot::load(path)?;
    tracing::info!(manifest = %snapshot.manifest, created_at = %snapshot.created_at, posts = snapshot.posts.len(), "snapshot loaded");
    Ok(snapshot.posts)
}

fn print_results(corpus: &Corpus, query: &str) {
    let mut widget = Widget::new(SearchConfig::default());
    let step = widget.on_query(corpus, query);
    let Some(view) = step.results else {
        eprintln!("query too short: need at least {} characters", widget.config().min_query_chars);
        return;
    };
    let ResultsView::Items(items) = view else {
        println!("No results found.");
        return;
    };
    for item in items {
        println!("{}\n  {}", terminal_marks(&item.title_html), item.url);
        for s in item.snippets {
            println!("    {}\n      -> {}", terminal_marks(&s.html), s.href);
        }
    }
}

fn terminal_marks(html: &str) -> String {
    html.replace("<mark>", "\x1b[1m").replace("</mark>", "\x1b[0m")
}
