use crate::tokenizer::word_count;
use crate::DocId;
use std::collections::HashMap;

/// Body word counts keyed by document id plus a running total.
///
/// Ids need not be contiguous; unknown ids read as length 0 and do not count
/// towards the average.
#[derive(Debug, Default, Clone)]
pub struct DocumentLengths {
    lengths: HashMap<DocId, u32>,
    total_length: u64,
}

impl DocumentLengths {
    pub fn new() -> Self { Self::default() }

    /// Records the word count of `body` for `doc_id` and returns it.
    /// Id 0 is the placeholder id and is never recorded.
    pub fn add_document(&mut self, doc_id: DocId, body: &str) -> u32 {
        let length = word_count(body) as u32;
        if doc_id == 0 {
            return length;
        }
        if let Some(old) = self.lengths.insert(doc_id, length) {
            self.total_length -= u64::from(old);
        }
        self.total_length += u64::from(length);
        length
    }

    /// Length of `doc_id`, 0 when unknown.
    pub fn doc_length(&self, doc_id: DocId) -> u32 {
        self.lengths.get(&doc_id).copied().unwrap_or(0)
    }

    /// Mean body length over recorded documents, 0 when empty.
    pub fn average_length(&self) -> f64 {
        if self.lengths.is_empty() {
            return 0.0;
        }
        self.total_length as f64 / self.lengths.len() as f64
    }

    pub fn num_docs(&self) -> usize { self.lengths.len() }

    pub fn total_length(&self) -> u64 { self.total_length }
}
