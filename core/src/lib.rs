use serde::{Deserialize, Serialize};

pub mod boolean;
pub mod config;
pub mod index;
pub mod kgram;
pub mod lengths;
pub mod matching;
pub mod scoring;
pub mod searcher;
pub mod store;
pub mod tokenizer;

pub use config::{Bm25Params, SearchConfig};
pub use index::InvertedIndex;
pub use kgram::KGramIndex;
pub use lengths::DocumentLengths;
pub use scoring::ScoringList;
pub use searcher::{build_indices, Algorithm, IndexStats, Searcher, SearcherBuilder};
pub use store::{DocumentStore, JsonlStore, MemoryStore, SledStore};

/// Document identifiers start at 1; 0 marks a placeholder document.
pub type DocId = u32;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: DocId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub url: String,
}

impl Document {
    pub fn new(title: impl Into<String>, body: impl Into<String>, url: impl Into<String>) -> Self {
        Self { id: 0, title: title.into(), body: body.into(), url: url.into() }
    }

    /// True for the zero-valued stand-in returned when a store cannot resolve an ID.
    pub fn is_placeholder(&self) -> bool {
        self.title.is_empty() && self.body.is_empty() && self.url.is_empty()
    }
}
