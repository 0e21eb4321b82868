//! Index build and query evaluation.
//!
//! Indexes are populated through a [`SearcherBuilder`], which requires
//! documents in strictly ascending id order, and then frozen into a
//! [`Searcher`]. A `Searcher` exposes no mutation, so it can be shared across
//! threads and queried concurrently.

use crate::boolean;
use crate::config::{Bm25Params, SearchConfig};
use crate::index::{intersect_postings, InvertedIndex};
use crate::kgram::KGramIndex;
use crate::lengths::DocumentLengths;
use crate::matching::wildcard_match;
use crate::scoring::{bm25_scores, vector_space_scores};
use crate::store::DocumentStore;
use crate::tokenizer::{tokenize, tokenize_wildcard};
use crate::{DocId, Document};
use anyhow::{ensure, Result};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    #[default]
    Bm25,
    VectorSpace,
    Boolean,
    Terms,
    Fuzzy,
    Wildcard,
}

const REGISTRY: [(&str, Algorithm); 6] = [
    ("BM25", Algorithm::Bm25),
    ("Classic TF-IDF", Algorithm::VectorSpace),
    ("Boolean", Algorithm::Boolean),
    ("Terms", Algorithm::Terms),
    ("Fuzzy", Algorithm::Fuzzy),
    ("Wildcard", Algorithm::Wildcard),
];

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Bm25,
        Algorithm::VectorSpace,
        Algorithm::Boolean,
        Algorithm::Terms,
        Algorithm::Fuzzy,
        Algorithm::Wildcard,
    ];

    /// Public identifier, e.g. `"Classic TF-IDF"`.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bm25 => "BM25",
            Algorithm::VectorSpace => "Classic TF-IDF",
            Algorithm::Boolean => "Boolean",
            Algorithm::Terms => "Terms",
            Algorithm::Fuzzy => "Fuzzy",
            Algorithm::Wildcard => "Wildcard",
        }
    }

    /// Case-insensitive lookup; anything unrecognized is BM25.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        REGISTRY
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(name))
            .map(|&(_, alg)| alg)
            .unwrap_or(Algorithm::Bm25)
    }

    pub fn is_ranked(self) -> bool {
        matches!(self, Algorithm::Bm25 | Algorithm::VectorSpace)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maximum edit distance allowed for a fuzzy query token of this length.
pub fn fuzziness(term: &str) -> usize {
    match term.chars().count() {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexStats {
    pub num_documents: usize,
    pub vocabulary_size: usize,
    pub num_kgrams: usize,
    pub average_document_length: f64,
}

/// Mutable build phase. Consumed by [`SearcherBuilder::build`].
pub struct SearcherBuilder {
    config: SearchConfig,
    index: InvertedIndex,
    kgrams: KGramIndex,
    lengths: DocumentLengths,
    last_id: DocId,
}

impl SearcherBuilder {
    pub fn new(config: SearchConfig) -> Result<Self> {
        ensure!(config.kgram_size >= 1, "kgram_size must be at least 1, got {}", config.kgram_size);
        Ok(Self {
            kgrams: KGramIndex::new(config.kgram_size),
            index: InvertedIndex::new(),
            lengths: DocumentLengths::new(),
            last_id: 0,
            config,
        })
    }

    /// Indexes title and body of `doc`. Only the body counts towards length.
    ///
    /// Ids must be strictly greater than every id added before.
    pub fn add_document(&mut self, doc: &Document) -> Result<()> {
        ensure!(
            doc.id > self.last_id,
            "document id {} out of order (previous id {})",
            doc.id,
            self.last_id
        );
        self.lengths.add_document(doc.id, &doc.body);
        for field in [&doc.title, &doc.body] {
            for token in tokenize(field) {
                self.index.add_posting(&token, doc.id);
                self.kgrams.add_term(&token);
            }
        }
        self.last_id = doc.id;
        Ok(())
    }

    pub fn build(self) -> Searcher {
        Searcher { config: self.config, index: self.index, kgrams: self.kgrams, lengths: self.lengths }
    }
}

/// Walks every document in `store` once, in ascending id order, and returns
/// the frozen searcher.
pub fn build_indices(store: &dyn DocumentStore, config: SearchConfig) -> Result<Searcher> {
    let mut docs = Vec::new();
    store.apply(&mut |doc| docs.push(doc))?;
    docs.sort_by_key(|d| d.id);

    let mut builder = SearcherBuilder::new(config)?;
    for doc in &docs {
        builder.add_document(doc)?;
    }
    let searcher = builder.build();
    let stats = searcher.stats();
    tracing::info!(
        num_docs = stats.num_documents,
        vocabulary = stats.vocabulary_size,
        kgrams = stats.num_kgrams,
        "indices built"
    );
    Ok(searcher)
}

/// Read-only query phase.
#[derive(Debug, Clone)]
pub struct Searcher {
    config: SearchConfig,
    index: InvertedIndex,
    kgrams: KGramIndex,
    lengths: DocumentLengths,
}

impl Searcher {
    pub fn config(&self) -> &SearchConfig { &self.config }

    pub fn inverted_index(&self) -> &InvertedIndex { &self.index }

    pub fn kgram_index(&self) -> &KGramIndex { &self.kgrams }

    pub fn lengths(&self) -> &DocumentLengths { &self.lengths }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            num_documents: self.lengths.num_docs(),
            vocabulary_size: self.index.num_terms(),
            num_kgrams: self.kgrams.num_grams(),
            average_document_length: self.lengths.average_length(),
        }
    }

    /// Documents containing every query token.
    pub fn terms_query(&self, query: &str) -> Vec<DocId> {
        self.index.intersect(&tokenize(query))
    }

    /// `&&` / `||` expression over single-word terms.
    pub fn boolean_query(&self, query: &str) -> Vec<DocId> {
        boolean::boolean_query(&self.index, query)
    }

    /// Every token must match some vocabulary term within its fuzziness.
    pub fn fuzzy_query(&self, query: &str) -> Vec<DocId> {
        and_all(tokenize(query).iter().map(|token| {
            let terms = self.kgrams.close_terms(token, fuzziness(token));
            self.index.union(&terms)
        }))
    }

    /// Every wildcard token must match some vocabulary term.
    pub fn wildcard_query(&self, query: &str) -> Vec<DocId> {
        and_all(tokenize_wildcard(query).iter().map(|pattern| {
            let terms: Vec<&str> = self
                .kgrams
                .kgram_match(pattern)
                .into_iter()
                .filter(|term| wildcard_match(pattern, term))
                .collect();
            self.index.union(&terms)
        }))
    }

    /// Length-normalized TF-IDF ranking, best first.
    pub fn vector_space_scores(&self, query: &str) -> Vec<(DocId, f64)> {
        vector_space_scores(&self.index, &self.lengths, &tokenize(query)).sorted()
    }

    pub fn vector_space_query(&self, query: &str) -> Vec<DocId> {
        ids(self.vector_space_scores(query))
    }

    /// BM25 ranking with explicit parameters, best first.
    pub fn bm25_scores(&self, query: &str, params: Bm25Params) -> Vec<(DocId, f64)> {
        bm25_scores(&self.index, &self.lengths, &tokenize(query), params).sorted()
    }

    /// BM25 ranking with the configured parameters.
    pub fn bm25_query(&self, query: &str) -> Vec<DocId> {
        ids(self.bm25_scores(query, self.config.bm25))
    }

    /// Ordered document ids for `query` under `algorithm`.
    pub fn search(&self, query: &str, algorithm: Algorithm) -> Vec<DocId> {
        let results = match algorithm {
            Algorithm::Bm25 => self.bm25_query(query),
            Algorithm::VectorSpace => self.vector_space_query(query),
            Algorithm::Boolean => self.boolean_query(query),
            Algorithm::Terms => self.terms_query(query),
            Algorithm::Fuzzy => self.fuzzy_query(query),
            Algorithm::Wildcard => self.wildcard_query(query),
        };
        tracing::debug!(query, %algorithm, hits = results.len(), "query evaluated");
        results
    }

    /// Runs `query` and resolves the ids through `store`, keeping rank order.
    pub fn query(&self, store: &dyn DocumentStore, query: &str, algorithm: Algorithm) -> Result<Vec<Document>> {
        store.get(&self.search(query, algorithm))
    }
}

fn ids(scored: Vec<(DocId, f64)>) -> Vec<DocId> {
    scored.into_iter().map(|(id, _)| id).collect()
}

/// Intersection of every set, stopping early once it is empty.
fn and_all<I: IntoIterator<Item = Vec<DocId>>>(sets: I) -> Vec<DocId> {
    let mut acc: Option<Vec<DocId>> = None;
    for set in sets {
        let next = match acc {
            None => set,
            Some(prev) => intersect_postings(&prev, &set),
        };
        if next.is_empty() {
            return next;
        }
        acc = Some(next);
    }
    acc.unwrap_or_default()
}
