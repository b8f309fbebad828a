use crate::config::SearchConfig;
use crate::model::{Corpus, Post, Snippet};
use crate::text::{escape_html, normalize_whitespace, query_pattern};
use regex::Regex;

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

/// A post that matched, with its highlighted title and content snippets.
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    pub post: &'a Post,
    pub title_html: String,
    pub snippets: Vec<Snippet>,
}

/// Compiled query: plain case-insensitive substring search over titles and bodies.
///
/// Occurrences are consumed left to right and the scan resumes after the end of
/// each match, so an occurrence overlapping the previous one is not reported
/// ("aa" in "aaa" yields one snippet, not two).
#[derive(Debug, Clone)]
pub struct Matcher {
    query: String,
    pattern: Regex,
    context_chars: usize,
    ellipsis: String,
}

impl Matcher {
    /// Returns `None` for queries too short to search.
    pub fn new(query: &str, config: &SearchConfig) -> Option<Self> {
        if query.is_empty() || query.chars().count() < config.min_query_chars {
            return None;
        }
        let pattern = match query_pattern(query) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "query rejected");
                return None;
            }
        };
        Some(Self {
            query: query.to_string(),
            pattern,
            context_chars: config.context_chars,
            ellipsis: config.ellipsis.clone(),
        })
    }

    pub fn query(&self) -> &str { &self.query }

    pub fn is_match(&self, post: &Post) -> bool {
        self.pattern.is_match(&post.title) || self.pattern.is_match(&post.content)
    }

    /// All matching posts in corpus order.
    pub fn matches<'a>(&self, corpus: &'a Corpus) -> Vec<MatchResult<'a>> {
        corpus
            .posts()
            .iter()
            .filter(|post| self.is_match(post))
            .map(|post| MatchResult { post, title_html: self.highlight(&post.title), snippets: self.snippets(post) })
            .collect()
    }

    /// Escape `text` for markup and wrap each occurrence of the query in `<mark>`.
    pub fn highlight(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 16);
        let mut last = 0;
        for m in self.pattern.find_iter(text) {
            out.push_str(&escape_html(&text[last..m.start()]));
            out.push_str(MARK_OPEN);
            out.push_str(&escape_html(m.as_str()));
            out.push_str(MARK_CLOSE);
            last = m.end();
        }
        out.push_str(&escape_html(&text[last..]));
        out
    }

    pub fn snippets(&self, post: &Post) -> Vec<Snippet> {
        self.pattern
            .find_iter(&post.content)
            .filter_map(|m| self.snippet_at(post, m.start(), m.end()))
            .collect()
    }

    fn snippet_at(&self, post: &Post, match_start: usize, match_end: usize) -> Option<Snippet> {
        let content = post.content.as_str();
        let start = widen_start(content, chars_before(content, match_start, self.context_chars));
        let end = widen_end(content, chars_after(content, match_end, self.context_chars));

        let highlighted = self.highlight(&normalize_whitespace(&content[start..end]));
        if !highlighted.contains(MARK_OPEN) {
            return None;
        }

        let mut text = String::with_capacity(highlighted.len() + 2 * self.ellipsis.len());
        if start > 0 {
            text.push_str(&self.ellipsis);
        }
        text.push_str(&highlighted);
        if end < content.len() {
            text.push_str(&self.ellipsis);
        }
        let anchor = post.nearest_header(match_start).map(|h| h.id.clone()).unwrap_or_default();
        Some(Snippet { text, anchor })
    }
}

/// The §4.2 contract: every post whose title or content contains `query`, in corpus order.
pub fn matches<'a>(corpus: &'a Corpus, query: &str, config: &SearchConfig) -> Vec<MatchResult<'a>> {
    Matcher::new(query, config).map(|m| m.matches(corpus)).unwrap_or_default()
}

// Byte offset `n` chars before `from`, clamped to 0.
fn chars_before(s: &str, from: usize, n: usize) -> usize {
    if n == 0 {
        return from;
    }
    s[..from].char_indices().rev().nth(n - 1).map_or(0, |(i, _)| i)
}

// Byte offset `n` chars after `from`, clamped to the end.
fn chars_after(s: &str, from: usize, n: usize) -> usize {
    s[from..].char_indices().nth(n).map_or(s.len(), |(i, _)| from + i)
}

// Step back while the char at `start` is part of a word.
fn widen_start(s: &str, mut start: usize) -> usize {
    while start > 0 {
        match s[start..].chars().next() {
            Some(c) if !c.is_whitespace() => {}
            _ => break,
        }
        start = s[..start].char_indices().next_back().map_or(0, |(i, _)| i);
    }
    start
}

fn widen_end(s: &str, mut end: usize) -> usize {
    while let Some(c) = s[end..].chars().next() {
        if c.is_whitespace() {
            break;
        }
        end += c.len_utf8();
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Header;

    fn post(title: &str, content: &str, headers: Vec<Header>) -> Post {
        Post { url: "post.html".into(), title: title.into(), content: content.into(), headers }
    }

    fn matcher(q: &str) -> Matcher {
        Matcher::new(q, &SearchConfig::default()).unwrap()
    }

    fn strip_marks(s: &str) -> String {
        s.replace(MARK_OPEN, "").replace(MARK_CLOSE, "")
    }

    #[test]
    fn short_queries_are_rejected() {
        let cfg = SearchConfig::default();
        assert!(Matcher::new("", &cfg).is_none());
        assert!(Matcher::new("a", &cfg).is_none());
        assert!(Matcher::new("é", &cfg).is_none());
        assert!(Matcher::new("ab", &cfg).is_some());
    }

    #[test]
    fn highlight_preserves_original_case() {
        let m = matcher("hello");
        assert_eq!(m.highlight("Hello World, HELLO"), "<mark>Hello</mark> World, <mark>HELLO</mark>");
    }

    #[test]
    fn highlight_escapes_surrounding_markup() {
        let m = matcher("b&c");
        assert_eq!(m.highlight("<a> b&c"), "&lt;a&gt; <mark>b&amp;c</mark>");
    }

    #[test]
    fn special_characters_match_literally() {
        let m = matcher("c++");
        assert!(m.is_match(&post("", "I write C++ daily", vec![])));
        assert!(!m.is_match(&post("", "I write c daily", vec![])));
    }

    #[test]
    fn short_content_snippet_has_no_ellipsis() {
        let p = post("Hello World", "this is a test of hello detection", vec![]);
        let snippets = matcher("hello").snippets(&p);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].text, "this is a test of <mark>hello</mark> detection");
        assert_eq!(snippets[0].anchor, "");
    }

    #[test]
    fn distant_occurrences_yield_separate_clamped_snippets() {
        let filler = "lorem ipsum dolor sit amet ".repeat(8);
        let content = format!("{filler}a test here {filler}another test there {filler}");
        let snippets = matcher("test").snippets(&post("", content.trim(), vec![]));
        assert_eq!(snippets.len(), 2);
        for s in &snippets {
            assert!(s.text.starts_with("..."), "{}", s.text);
            assert!(s.text.ends_with("..."), "{}", s.text);
            assert_eq!(s.text.matches(MARK_OPEN).count(), 1);
        }
        assert!(snippets[0].text.contains("a <mark>test</mark> here"));
        assert!(snippets[1].text.contains("another <mark>test</mark> there"));
    }

    #[test]
    fn window_never_splits_words() {
        let content = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo \
                       lima mike november oscar papa quebec romeo sierra tango uniform";
        let p = post("", content, vec![]);
        for q in ["oscar", "mike", "juliet", "romeo", "quebec"] {
            for s in matcher(q).snippets(&p) {
                let body = strip_marks(s.text.trim_start_matches("...").trim_end_matches("..."));
                let at = content.find(&body).expect("excerpt is a slice of content");
                if at > 0 {
                    assert!(content[..at].ends_with(' '), "{q}: {body}");
                }
                let after = at + body.len();
                if after < content.len() {
                    assert!(content[after..].starts_with(' '), "{q}: {body}");
                }
            }
        }
    }

    #[test]
    fn highlighted_span_matches_source_text() {
        let content = "Rust and RUST and rust";
        let p = post("", content, vec![]);
        for s in matcher("rust").snippets(&p) {
            for part in s.text.split(MARK_OPEN).skip(1) {
                let span = part.split(MARK_CLOSE).next().unwrap();
                assert!(span.eq_ignore_ascii_case("rust"));
                assert!(content.contains(span));
            }
        }
    }

    #[test]
    fn overlapping_occurrences_are_not_both_reported() {
        let snippets = matcher("aa").snippets(&post("", "aaa", vec![]));
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].text, "<mark>aa</mark>a");
    }

    #[test]
    fn snippets_anchor_to_nearest_preceding_header() {
        let content = "Intro text here Setup install the tool Usage run the tool";
        let headers = vec![
            Header { id: "setup".into(), index: content.find("Setup"), text: "Setup".into() },
            Header { id: "usage".into(), index: content.find("Usage"), text: "Usage".into() },
        ];
        let snippets = matcher("the tool").snippets(&post("", content, headers));
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].anchor, "setup");
        assert_eq!(snippets[1].anchor, "usage");
        let intro = matcher("intro").snippets(&post("", content, vec![]));
        assert_eq!(intro[0].anchor, "");
    }

    #[test]
    fn multibyte_text_is_windowed_on_char_boundaries() {
        let content = "ñandú ".repeat(20) + "búsqueda " + &"café ".repeat(20);
        let snippets = matcher("búsqueda").snippets(&post("", content.trim(), vec![]));
        assert_eq!(snippets.len(), 1);
        assert!(snippets[0].text.contains("<mark>búsqueda</mark>"));
        assert!(snippets[0].text.starts_with("...") && snippets[0].text.ends_with("..."));
    }

    #[test]
    fn matches_filters_and_keeps_corpus_order() {
        let corpus = Corpus::new(vec![
            Post { url: "1".into(), title: "Rust notes".into(), content: "nothing".into(), headers: vec![] },
            Post { url: "2".into(), title: "Other".into(), content: "unrelated".into(), headers: vec![] },
            Post { url: "3".into(), title: "Misc".into(), content: "learning rust".into(), headers: vec![] },
        ]);
        let found: Vec<_> = matches(&corpus, "RUST", &SearchConfig::default()).into_iter().map(|r| r.post.url.as_str()).collect();
        assert_eq!(found, vec!["1", "3"]);
        assert!(matches(&corpus, "r", &SearchConfig::default()).is_empty());
    }
}
