use anyhow::{Context, Result};
use axum::{extract::{Query, State}, http::StatusCode, routing::get, Json, Router};
use postsearch_core::{Corpus, Instruction, NavigationTarget, Post, SearchConfig, ViewMode, Widget};
use postsearch_loader::{Extractor, Fetcher, LoaderConfig, Navigator};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Optional JSON settings file; every field falls back to its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchConfig,
    pub loader: LoaderConfig,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: ViewMode,
    /// Results visible after applying `instructions`.
    pub shown: usize,
    pub took_s: f64,
    pub instructions: Vec<Instruction>,
}

#[derive(Deserialize)]
pub struct UrlParams {
    pub url: String,
}

#[derive(Serialize)]
pub struct NavigateResponse {
    pub url: String,
    pub loaded: bool,
    pub instructions: Vec<Instruction>,
}

pub struct AppState<F> {
    pub corpus: Arc<Corpus>,
    pub search: SearchConfig,
    pub navigator: Navigator<F>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self { corpus: self.corpus.clone(), search: self.search.clone(), navigator: self.navigator.clone() }
    }
}

impl<F: Fetcher> AppState<F> {
    pub fn new(corpus: Corpus, fetcher: Arc<F>, settings: &Settings) -> Result<Self> {
        let extractor = Arc::new(Extractor::new(&settings.loader.extract)?);
        Ok(Self { corpus: Arc::new(corpus), search: settings.search.clone(), navigator: Navigator::new(fetcher, extractor) })
    }
}

pub fn build_app<F: Fetcher>(state: AppState<F>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler::<F>))
        .route("/navigate", get(navigate_handler::<F>))
        .route("/post", get(post_handler::<F>))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Query transition. Its output depends only on the query text, so each
/// request runs against a fresh widget.
pub async fn search_handler<F: Fetcher>(State(state): State<AppState<F>>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let mut widget = Widget::new(state.search.clone());
    let step = widget.on_query(&state.corpus, &params.q);
    let shown = step.results.as_ref().map_or(0, |v| v.shown());
    Json(SearchResponse {
        query: params.q,
        mode: widget.mode(),
        shown,
        took_s: start.elapsed().as_secs_f64(),
        instructions: step.instructions,
    })
}

/// Follow a result link. Only posts in the corpus are fetched; anything else is refused unloaded.
pub async fn navigate_handler<F: Fetcher>(State(state): State<AppState<F>>, Query(params): Query<UrlParams>) -> Json<NavigateResponse> {
    let target = NavigationTarget::parse(&params.url);
    if state.corpus.get(&target.base).is_none() {
        tracing::warn!(url = %params.url, "navigation target not in corpus");
        return Json(NavigateResponse { url: params.url, loaded: false, instructions: Vec::new() });
    }
    let mut widget = Widget::new(state.search.clone());
    let instructions = state.navigator.activate(&mut widget, &params.url).await;
    Json(NavigateResponse { url: params.url, loaded: !instructions.is_empty(), instructions })
}

pub async fn post_handler<F: Fetcher>(State(state): State<AppState<F>>, Query(params): Query<UrlParams>) -> Result<Json<Post>, (StatusCode, String)> {
    state
        .corpus
        .get(&params.url)
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no post {}", params.url)))
}
