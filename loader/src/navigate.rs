use crate::extract::Extractor;
use crate::fetch::Fetcher;
use anyhow::{anyhow, Result};
use postsearch_core::{Instruction, NavigationTarget, Widget};
use std::sync::Arc;

/// Handles result-link activation: fetch the target page and splice its
/// content region into the current one instead of doing a full load.
pub struct Navigator<F> {
    fetcher: Arc<F>,
    extractor: Arc<Extractor>,
}

impl<F> Clone for Navigator<F> {
    fn clone(&self) -> Self {
        Self { fetcher: self.fetcher.clone(), extractor: self.extractor.clone() }
    }
}

impl<F: Fetcher> Navigator<F> {
    pub fn new(fetcher: Arc<F>, extractor: Arc<Extractor>) -> Self {
        Self { fetcher, extractor }
    }

    /// Instructions for following `href`; empty when the page could not be loaded.
    pub async fn activate(&self, widget: &mut Widget, href: &str) -> Vec<Instruction> {
        let target = NavigationTarget::parse(href);
        match self.load(&target).await {
            Ok(html) => widget.on_post_loaded(&target, html),
            Err(e) => widget.on_post_failed(&target, &e),
        }
    }

    async fn load(&self, target: &NavigationTarget) -> Result<String> {
        let html = self.fetcher.fetch_text(&target.base).await?;
        self.extractor.content_html(&html).ok_or_else(|| anyhow!("{} has no content region", target.base))
    }
}
