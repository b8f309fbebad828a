use anyhow::{anyhow, Result};
use postsearch_core::text::normalize_whitespace;
use postsearch_core::{Header, Post};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

const HEADINGS: &str = "h1, h2, h3, h4, h5, h6";

/// Where things live in a post page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// `id` of the element holding the article.
    pub content_id: String,
    /// Selector for the title, looked up inside the content root.
    pub title_selector: String,
    /// Chrome removed before text extraction; only the first match of each is dropped.
    pub strip_selectors: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            content_id: "content".to_string(),
            title_selector: ".post-title a".to_string(),
            strip_selectors: vec!["#table-of-contents".into(), ".taglist".into(), "#postamble".into()],
        }
    }
}

/// Compiled selectors for turning post HTML into a [`Post`].
pub struct Extractor {
    content: Selector,
    title: Selector,
    strip: Vec<Selector>,
    headings: Selector,
}

fn selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| anyhow!("invalid selector {s:?}: {e}"))
}

impl Extractor {
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        Ok(Self {
            content: selector(&format!("#{}", config.content_id))?,
            title: selector(&config.title_selector)?,
            strip: config.strip_selectors.iter().map(|s| selector(s)).collect::<Result<_>>()?,
            headings: selector(HEADINGS)?,
        })
    }

    /// Build the searchable record for one page. A page without a content root
    /// still yields a post, with empty title and content.
    pub fn extract_post(&self, url: &str, html: &str) -> Post {
        let mut doc = Html::parse_document(html);
        let Some(root_id) = doc.select(&self.content).next().map(|e| e.id()) else {
            tracing::warn!(url, "content root missing");
            return Post { url: url.to_string(), title: String::new(), content: String::new(), headers: Vec::new() };
        };

        // Title first: some layouts nest it inside a region that gets stripped.
        let (title, doomed) = {
            let Some(root) = doc.tree.get(root_id).and_then(ElementRef::wrap) else {
                return Post { url: url.to_string(), title: String::new(), content: String::new(), headers: Vec::new() };
            };
            let title = root
                .select(&self.title)
                .next()
                .map(|t| t.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            let doomed: Vec<_> = self.strip.iter().filter_map(|s| root.select(s).next().map(|e| e.id())).collect();
            (title, doomed)
        };
        for id in doomed {
            if let Some(mut node) = doc.tree.get_mut(id) {
                node.detach();
            }
        }

        let Some(root) = doc.tree.get(root_id).and_then(ElementRef::wrap) else {
            return Post { url: url.to_string(), title, content: String::new(), headers: Vec::new() };
        };
        let content = normalize_whitespace(&root.text().collect::<String>());
        let headers = root
            .select(&self.headings)
            .enumerate()
            .map(|(n, h)| {
                let text = normalize_whitespace(&h.text().collect::<String>());
                let index = content.find(&text);
                if index.is_none() {
                    tracing::warn!(url, heading = %text, "heading not found in content");
                }
                let id = h.value().id().map_or_else(|| format!("generated-id-{n}"), str::to_string);
                Header { id, index, text }
            })
            .collect();

        Post { url: url.to_string(), title, content, headers }
    }

    /// Inner HTML of the content root, for splicing into the current page.
    pub fn content_html(&self, html: &str) -> Option<String> {
        Html::parse_document(html).select(&self.content).next().map(|e| e.inner_html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html><head><title>site</title></head><body>
<nav>Home About</nav>
<div id="content">
  <div id="table-of-contents"><h2>Table of Contents</h2><ul><li>Setup</li></ul></div>
  <h1 class="post-title"><a href="/p.html">  Building   a Blog </a></h1>
  <div class="taglist"><a>rust</a> <a>web</a></div>
  <p>Some   intro
     text.</p>
  <h2 id="setup">Setup</h2>
  <p>Install things.</p>
  <h3>Deploy   steps</h3>
  <p>Push it.</p>
  <div id="postamble"><p>Created with Emacs</p></div>
</div>
</body></html>"#;

    fn extractor() -> Extractor {
        Extractor::new(&ExtractConfig::default()).unwrap()
    }

    #[test]
    fn strips_chrome_and_normalizes_text() {
        let post = extractor().extract_post("p.html", PAGE);
        assert_eq!(post.title, "Building   a Blog");
        assert_eq!(post.content, "Building a Blog Some intro text. Setup Install things. Deploy steps Push it.");
        assert!(!post.content.contains("Table of Contents"));
        assert!(!post.content.contains("Emacs"));
        assert!(!post.content.contains("rust"));
        assert!(!post.content.contains("Home"));
    }

    #[test]
    fn headings_are_located_in_document_order() {
        let post = extractor().extract_post("p.html", PAGE);
        let ids: Vec<&str> = post.headers.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["generated-id-0", "setup", "generated-id-2"]);
        for h in &post.headers {
            let ix = h.index.expect("heading located");
            assert!(post.content[ix..].starts_with(&h.text));
        }
        assert_eq!(post.headers[2].text, "Deploy steps");
    }

    #[test]
    fn missing_content_root_yields_empty_post() {
        let post = extractor().extract_post("bad.html", "<html><body><p>no root</p></body></html>");
        assert_eq!(post.url, "bad.html");
        assert!(post.title.is_empty() && post.content.is_empty() && post.headers.is_empty());
    }

    #[test]
    fn missing_chrome_is_tolerated() {
        let html = r#"<div id="content"><p>Just text</p></div>"#;
        let post = extractor().extract_post("p.html", html);
        assert_eq!(post.title, "");
        assert_eq!(post.content, "Just text");
    }

    #[test]
    fn content_html_returns_inner_markup() {
        let html = r#"<body><div id="content"><h2 id="s">S</h2></div></body>"#;
        assert_eq!(extractor().content_html(html).as_deref(), Some(r#"<h2 id="s">S</h2>"#));
        assert_eq!(extractor().content_html("<p>none</p>"), None);
    }

    #[test]
    fn rejects_bad_selectors() {
        let cfg = ExtractConfig { title_selector: "[[".into(), ..ExtractConfig::default() };
        assert!(Extractor::new(&cfg).is_err());
    }
}
