//! Two-state view machine: either the article or the search results is visible.
//!
//! Transitions are driven by query changes and by activating a result link.
//! Each transition yields a list of [`Instruction`]s for a [`crate::Surface`]
//! to apply; nothing here touches a display directly.

use crate::config::SearchConfig;
use crate::matcher::Matcher;
use crate::model::Corpus;
use crate::render::{render, ResultsView};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Article,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Replace the results container's markup.
    SetResults { html: String },
    /// Make `mode`'s surface visible and hide the other one.
    Show { mode: ViewMode },
    /// Replace the content container's markup.
    ReplaceContent { html: String },
    /// Push `url` onto session history without reloading.
    PushHistory { url: String },
    /// Scroll the element with `id` into view once `delay_ms` has elapsed.
    ScrollIntoView { id: String, delay_ms: u64, smooth: bool },
}

/// A link target split into the document to fetch and the fragment to scroll to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTarget {
    pub href: String,
    pub base: String,
    pub anchor: Option<String>,
}

impl NavigationTarget {
    pub fn parse(href: &str) -> Self {
        let mut parts = href.split('#');
        let base = parts.next().unwrap_or_default().to_string();
        let anchor = parts.next().filter(|a| !a.is_empty()).map(str::to_string);
        Self { href: href.to_string(), base, anchor }
    }
}

/// Outcome of a query change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStep {
    /// `None` when the query was too short and the article was restored.
    pub results: Option<ResultsView>,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, Default)]
pub struct Widget {
    mode: ViewMode,
    config: SearchConfig,
}

impl Widget {
    pub fn new(config: SearchConfig) -> Self {
        Self { mode: ViewMode::Article, config }
    }

    pub fn mode(&self) -> ViewMode { self.mode }
    pub fn config(&self) -> &SearchConfig { &self.config }

    pub fn on_query(&mut self, corpus: &Corpus, text: &str) -> QueryStep {
        let Some(matcher) = Matcher::new(text, &self.config) else {
            return QueryStep { results: None, instructions: vec![self.show(ViewMode::Article)] };
        };
        let view = render(&matcher.matches(corpus), text);
        let instructions = vec![Instruction::SetResults { html: view.to_html() }, self.show(ViewMode::Results)];
        QueryStep { results: Some(view), instructions }
    }

    /// Fetched content for `target` is ready: splice it in and return to the article.
    pub fn on_post_loaded(&mut self, target: &NavigationTarget, content_html: String) -> Vec<Instruction> {
        let mut out = vec![
            Instruction::ReplaceContent { html: content_html },
            Instruction::PushHistory { url: target.href.clone() },
            self.show(ViewMode::Article),
        ];
        if let Some(id) = &target.anchor {
            out.push(Instruction::ScrollIntoView { id: id.clone(), delay_ms: self.config.scroll_delay_ms, smooth: true });
        }
        out
    }

    /// The fetch for `target` failed. Nothing visible changes; the link can be activated again.
    pub fn on_post_failed(&mut self, target: &NavigationTarget, error: &anyhow::Error) -> Vec<Instruction> {
        tracing::warn!(url = %target.base, error = %error, "navigation fetch failed");
        Vec::new()
    }

    fn show(&mut self, mode: ViewMode) -> Instruction {
        self.mode = mode;
        Instruction::Show { mode }
    }
}
