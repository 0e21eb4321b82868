//! Ranked retrieval: TF-IDF vector-space scoring and Okapi BM25.

use crate::config::Bm25Params;
use crate::index::InvertedIndex;
use crate::lengths::DocumentLengths;
use crate::DocId;
use std::collections::HashMap;

/// Per-query accumulator of document scores.
///
/// The first score for a document inserts it; later ones add to it.
/// [`ScoringList::sorted`] orders by score descending, then id ascending.
#[derive(Debug, Default, Clone)]
pub struct ScoringList {
    doc_ids: Vec<DocId>,
    scores: Vec<f64>,
    positions: HashMap<DocId, usize>,
}

impl ScoringList {
    pub fn new() -> Self { Self::default() }

    pub fn accumulate(&mut self, doc_id: DocId, score: f64) {
        match self.positions.get(&doc_id) {
            Some(&pos) => self.scores[pos] += score,
            None => {
                self.positions.insert(doc_id, self.doc_ids.len());
                self.doc_ids.push(doc_id);
                self.scores.push(score);
            }
        }
    }

    pub fn map_scores<F: FnMut(DocId, f64) -> f64>(&mut self, mut f: F) {
        for (id, score) in self.doc_ids.iter().zip(self.scores.iter_mut()) {
            *score = f(*id, *score);
        }
    }

    pub fn len(&self) -> usize { self.doc_ids.len() }

    pub fn is_empty(&self) -> bool { self.doc_ids.is_empty() }

    /// (doc id, score) pairs, best first. Ties break on ascending id.
    pub fn sorted(self) -> Vec<(DocId, f64)> {
        let mut pairs: Vec<(DocId, f64)> = self.doc_ids.into_iter().zip(self.scores).collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        pairs
    }

    /// Document ids, best first.
    pub fn ranked_ids(self) -> Vec<DocId> {
        self.sorted().into_iter().map(|(id, _)| id).collect()
    }
}

/// Sum of `tf * idf` per query term, divided by the document's body length.
pub fn vector_space_scores<S: AsRef<str>>(
    index: &InvertedIndex,
    lengths: &DocumentLengths,
    query_terms: &[S],
) -> ScoringList {
    let mut scores = ScoringList::new();
    for term in query_terms {
        let term = term.as_ref();
        let idf = index.inverse_document_frequency(term);
        for (doc_id, tf) in index.postings_with_frequencies(term) {
            scores.accumulate(doc_id, f64::from(tf) * idf);
        }
    }
    // Empty bodies (title-only matches) are left unnormalized.
    scores.map_scores(|doc_id, score| score / f64::from(lengths.doc_length(doc_id).max(1)));
    scores
}

/// Okapi BM25 with caller-supplied `k1` and `b`.
pub fn bm25_scores<S: AsRef<str>>(
    index: &InvertedIndex,
    lengths: &DocumentLengths,
    query_terms: &[S],
    params: Bm25Params,
) -> ScoringList {
    let Bm25Params { k1, b } = params;
    let avg_len = lengths.average_length();
    let mut scores = ScoringList::new();
    for term in query_terms {
        let term = term.as_ref();
        let idf = index.inverse_document_frequency(term);
        for (doc_id, tf) in index.postings_with_frequencies(term) {
            let tf = f64::from(tf);
            let ratio = if avg_len > 0.0 { f64::from(lengths.doc_length(doc_id)) / avg_len } else { 1.0 };
            let norm = k1 * ((1.0 - b) + b * ratio);
            scores.accumulate(doc_id, idf * (k1 + 1.0) * tf / (norm + tf));
        }
    }
    scores
}
