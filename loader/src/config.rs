use crate::extract::ExtractConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Maximum number of post fetches in flight.
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub extract: ExtractConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            concurrency: 16,
            timeout_secs: 12,
            user_agent: concat!("postsearch/", env!("CARGO_PKG_VERSION")).to_string(),
            extract: ExtractConfig::default(),
        }
    }
}
