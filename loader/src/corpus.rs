use crate::config::LoaderConfig;
use crate::extract::Extractor;
use crate::fetch::Fetcher;
use anyhow::{Context, Result};
use postsearch_core::{Corpus, Post};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use url::Url;

/// Parse a manifest body: a JSON array of post URLs. Relative entries are
/// resolved against the manifest's own URL.
pub fn parse_manifest(body: &str, manifest_url: &str) -> Result<Vec<String>> {
    let entries: Vec<String> = serde_json::from_str(body).context("manifest is not a JSON array of URLs")?;
    let base = Url::parse(manifest_url).ok();
    Ok(entries
        .into_iter()
        .map(|e| match (Url::parse(&e), &base) {
            (Ok(_), _) | (Err(_), None) => e,
            (Err(_), Some(base)) => base.join(&e).map(|u| u.to_string()).unwrap_or(e),
        })
        .collect())
}

/// Load every post listed by the manifest.
///
/// Never fails: a broken manifest gives an empty corpus, a broken post is
/// skipped. Posts keep manifest order.
pub async fn load_corpus<F: Fetcher>(fetcher: Arc<F>, manifest_url: &str, config: &LoaderConfig) -> Corpus {
    match try_load(fetcher, manifest_url, config).await {
        Ok(corpus) => corpus,
        Err(e) => {
            tracing::error!(manifest = manifest_url, error = %format!("{e:#}"), "error loading posts");
            Corpus::default()
        }
    }
}

async fn try_load<F: Fetcher>(fetcher: Arc<F>, manifest_url: &str, config: &LoaderConfig) -> Result<Corpus> {
    let started = Instant::now();
    let body = fetcher.fetch_text(manifest_url).await.context("fetching manifest")?;
    let urls = parse_manifest(&body, manifest_url)?;
    let extractor = Arc::new(Extractor::new(&config.extract)?);
    let listed = urls.len();
    tracing::info!(manifest = manifest_url, listed, concurrency = config.concurrency, "loading posts");

    let mut slots: Vec<Option<Post>> = vec![None; listed];
    let mut queue = urls.into_iter().enumerate();
    let mut inflight = JoinSet::new();
    let limit = config.concurrency.max(1);

    loop {
        while inflight.len() < limit {
            let Some((slot, url)) = queue.next() else { break };
            let fetcher = fetcher.clone();
            let extractor = extractor.clone();
            inflight.spawn(async move {
                let post = fetcher.fetch_text(&url).await.map(|html| extractor.extract_post(&url, &html));
                (slot, url, post)
            });
        }
        let Some(joined) = inflight.join_next().await else { break };
        match joined {
            Ok((slot, _, Ok(post))) => slots[slot] = Some(post),
            Ok((_, url, Err(e))) => tracing::warn!(url = %url, error = %format!("{e:#}"), "skipping post"),
            Err(e) => tracing::warn!(error = %e, "post task aborted"),
        }
    }

    let corpus = Corpus::new(slots.into_iter().flatten().collect());
    tracing::info!(
        listed,
        loaded = corpus.len(),
        took_s = started.elapsed().as_secs_f64(),
        "corpus ready"
    );
    Ok(corpus)
}
