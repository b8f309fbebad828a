//! Pure rendering of match results into the markup shown in the results container.

use crate::matcher::{MatchResult, MARK_OPEN};
use crate::text::escape_html;
use serde::Serialize;

pub const NO_RESULTS_HTML: &str = "<p>No results found.</p>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetLink {
    pub href: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    pub url: String,
    pub title_html: String,
    pub snippets: Vec<SnippetLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum ResultsView {
    NoResults,
    Items(Vec<ResultItem>),
}

/// Build the results view. A result with no snippets whose title carries no
/// highlight is left out; if every result is left out the list is simply empty.
pub fn render(results: &[MatchResult<'_>], query: &str) -> ResultsView {
    if results.is_empty() {
        tracing::debug!(query, "no results");
        return ResultsView::NoResults;
    }
    let items: Vec<ResultItem> = results
        .iter()
        .filter(|r| !r.snippets.is_empty() || r.title_html.contains(MARK_OPEN))
        .map(|r| ResultItem {
            url: r.post.url.clone(),
            title_html: r.title_html.clone(),
            snippets: r
                .snippets
                .iter()
                .map(|s| SnippetLink {
                    href: if s.anchor.is_empty() { r.post.url.clone() } else { format!("{}#{}", r.post.url, s.anchor) },
                    html: s.text.clone(),
                })
                .collect(),
        })
        .collect();
    tracing::debug!(query, matched = results.len(), shown = items.len(), "rendered results");
    ResultsView::Items(items)
}

impl ResultsView {
    /// Number of results that will be visible.
    pub fn shown(&self) -> usize {
        match self {
            Self::NoResults => 0,
            Self::Items(items) => items.len(),
        }
    }

    pub fn to_html(&self) -> String {
        let items = match self {
            Self::NoResults => return NO_RESULTS_HTML.to_string(),
            Self::Items(items) => items,
        };
        let mut out = String::new();
        for item in items {
            out.push_str(&format!(
                r#"<div class="search-result"><a href="{}" class="result-link">{}</a>"#,
                escape_html(&item.url),
                item.title_html
            ));
            for s in &item.snippets {
                out.push_str(&format!(
                    r#"<div class="search-result-snippet"><a href="{}" class="snippet-link">{}</a></div>"#,
                    escape_html(&s.href),
                    s.html
                ));
            }
            out.push_str("</div>");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Post, Snippet};

    fn post(url: &str) -> Post {
        Post { url: url.into(), title: String::new(), content: String::new(), headers: vec![] }
    }

    #[test]
    fn empty_results_render_no_results_marker() {
        let view = render(&[], "zzz");
        assert_eq!(view, ResultsView::NoResults);
        assert_eq!(view.to_html(), NO_RESULTS_HTML);
        assert_eq!(view.shown(), 0);
    }

    #[test]
    fn unhighlighted_result_without_snippets_is_dropped() {
        let (a, b) = (post("a.html"), post("b.html"));
        let results = vec![
            MatchResult { post: &a, title_html: "Plain".into(), snippets: vec![] },
            MatchResult { post: &b, title_html: "<mark>Ru</mark>st".into(), snippets: vec![] },
        ];
        let view = render(&results, "ru");
        assert_eq!(view.shown(), 1);
        let ResultsView::Items(items) = view else { panic!("expected items") };
        assert_eq!(items[0].url, "b.html");
    }

    #[test]
    fn all_dropped_gives_empty_list_not_marker() {
        let a = post("a.html");
        let results = vec![MatchResult { post: &a, title_html: "Plain".into(), snippets: vec![] }];
        let view = render(&results, "xx");
        assert_eq!(view, ResultsView::Items(vec![]));
        assert_eq!(view.to_html(), "");
    }

    #[test]
    fn snippet_links_carry_anchor_fragment() {
        let a = post("post2.html");
        let results = vec![MatchResult {
            post: &a,
            title_html: "Two".into(),
            snippets: vec![
                Snippet { text: "<mark>ab</mark>".into(), anchor: "section-3".into() },
                Snippet { text: "x <mark>ab</mark>".into(), anchor: String::new() },
            ],
        }];
        let html = render(&results, "ab").to_html();
        assert_eq!(
            html,
            concat!(
                r#"<div class="search-result"><a href="post2.html" class="result-link">Two</a>"#,
                r#"<div class="search-result-snippet"><a href="post2.html#section-3" class="snippet-link"><mark>ab</mark></a></div>"#,
                r#"<div class="search-result-snippet"><a href="post2.html" class="snippet-link">x <mark>ab</mark></a></div>"#,
                "</div>"
            )
        );
    }
}
