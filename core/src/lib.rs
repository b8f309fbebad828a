pub mod config;
pub mod matcher;
pub mod model;
pub mod render;
pub mod surface;
pub mod text;
pub mod view;

pub use config::SearchConfig;
pub use matcher::{matches, MatchResult, Matcher};
pub use model::{Corpus, Header, Post, Snippet};
pub use render::{render, ResultItem, ResultsView, SnippetLink};
pub use surface::{MemorySurface, Surface};
pub use view::{Instruction, NavigationTarget, ViewMode, Widget};
