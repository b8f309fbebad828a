pub mod config;
pub mod corpus;
pub mod extract;
pub mod fetch;
pub mod navigate;
pub mod snapshot;

pub use config::LoaderConfig;
pub use corpus::{load_corpus, parse_manifest};
pub use extract::{ExtractConfig, Extractor};
pub use fetch::{Fetcher, HttpFetcher, MapFetcher};
pub use navigate::Navigator;
pub use snapshot::CorpusSnapshot;
