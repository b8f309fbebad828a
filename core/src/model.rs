use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub id: String,
    /// Byte offset of `text` inside the owning post's `content`; `None` when it could not be located.
    pub index: Option<usize>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub url: String,
    pub title: String,
    /// Whitespace-normalized searchable text. Header offsets point into this exact string.
    pub content: String,
    pub headers: Vec<Header>,
}

impl Post {
    /// Header with the greatest located index not past `offset`. Earliest wins on ties.
    pub fn nearest_header(&self, offset: usize) -> Option<&Header> {
        let mut nearest: Option<(&Header, usize)> = None;
        for h in &self.headers {
            let Some(ix) = h.index else { continue };
            if ix <= offset && nearest.map_or(true, |(_, best)| ix > best) {
                nearest = Some((h, ix));
            }
        }
        nearest.map(|(h, _)| h)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Excerpt with `<mark>` around each occurrence of the query.
    pub text: String,
    /// Id of the nearest preceding header, empty when none precedes the match.
    pub anchor: String,
}

/// The posts loaded for one session. Built once, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Post>", into = "Vec<Post>")]
pub struct Corpus {
    posts: Vec<Post>,
}

impl Corpus {
    pub fn new(posts: Vec<Post>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(posts.len());
        for post in posts {
            if seen.insert(post.url.clone()) {
                kept.push(post);
            } else {
                tracing::debug!(url = %post.url, "dropping duplicate post");
            }
        }
        Self { posts: kept }
    }

    pub fn posts(&self) -> &[Post] { &self.posts }
    pub fn len(&self) -> usize { self.posts.len() }
    pub fn is_empty(&self) -> bool { self.posts.is_empty() }
    pub fn get(&self, url: &str) -> Option<&Post> { self.posts.iter().find(|p| p.url == url) }
}

impl From<Vec<Post>> for Corpus {
    fn from(posts: Vec<Post>) -> Self { Self::new(posts) }
}

impl From<Corpus> for Vec<Post> {
    fn from(corpus: Corpus) -> Self { corpus.posts }
}
