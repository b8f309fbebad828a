use serde::{Deserialize, Serialize};

/// Tunables for matching, snippet extraction and navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Queries with fewer chars than this never reach the matcher.
    pub min_query_chars: usize,
    /// Chars of context taken on each side of a match before widening to whitespace.
    pub context_chars: usize,
    pub ellipsis: String,
    /// Delay before scrolling to a fragment after content is replaced.
    pub scroll_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { min_query_chars: 2, context_chars: 30, ellipsis: "...".to_string(), scroll_delay_ms: 100 }
    }
}
