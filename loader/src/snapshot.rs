use anyhow::{Context, Result};
use postsearch_core::Corpus;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use time::format_description::well_known::Rfc3339;

/// A loaded corpus written to disk, so it can be served without refetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusSnapshot {
    pub created_at: String,
    pub manifest: String,
    pub posts: Corpus,
}

impl CorpusSnapshot {
    pub fn new(manifest: impl Into<String>, posts: Corpus) -> Self {
        let created_at = time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        Self { created_at, manifest: manifest.into(), posts }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let mut out = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?);
        serde_json::to_writer_pretty(&mut out, self)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let snapshot = serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {}", path.display()))?;
        Ok(snapshot)
    }
}
