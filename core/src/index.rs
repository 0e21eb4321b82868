use crate::DocId;
use std::collections::{BTreeSet, HashMap};

/// Postings for one term. `frequencies[i]` is the occurrence count of the
/// term in document `doc_ids[i]`; `doc_ids` is ascending and duplicate-free.
#[derive(Debug, Default, Clone)]
struct Postings {
    doc_ids: Vec<DocId>,
    frequencies: Vec<u32>,
}

#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    postings: HashMap<String, Postings>, // keyed by lowercased token
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Records one occurrence of `term` in `doc_id`.
    ///
    /// Documents must be fed in non-decreasing ID order: a repeat of the last
    /// posting bumps its frequency, anything else appends.
    pub fn add_posting(&mut self, term: &str, doc_id: DocId) {
        if term.is_empty() {
            return;
        }
        let entry = self.postings.entry(term.to_string()).or_default();
        match entry.doc_ids.last().copied() {
            Some(last) if last == doc_id => {
                if let Some(freq) = entry.frequencies.last_mut() {
                    *freq += 1;
                }
            }
            last => {
                debug_assert!(last.map_or(true, |l| l < doc_id), "postings must be added in ascending doc id order");
                entry.doc_ids.push(doc_id);
                entry.frequencies.push(1);
            }
        }
    }

    /// Postings of `term`, empty for unknown terms.
    pub fn postings_list(&self, term: &str) -> &[DocId] {
        self.postings.get(term).map(|p| p.doc_ids.as_slice()).unwrap_or(&[])
    }

    /// (doc id, term frequency) pairs of `term` in ascending doc id order.
    pub fn postings_with_frequencies<'a>(&'a self, term: &str) -> impl Iterator<Item = (DocId, u32)> + 'a {
        self.postings
            .get(term)
            .into_iter()
            .flat_map(|p| p.doc_ids.iter().copied().zip(p.frequencies.iter().copied()))
    }

    /// Documents containing every term. Shortest postings lists are merged first.
    pub fn intersect<S: AsRef<str>>(&self, terms: &[S]) -> Vec<DocId> {
        let mut terms: Vec<&str> = terms.iter().map(|t| t.as_ref()).collect();
        if terms.is_empty() {
            return Vec::new();
        }
        terms.sort_by_key(|t| self.postings_list(t).len());

        let mut result = self.postings_list(terms[0]).to_vec();
        for term in &terms[1..] {
            if result.is_empty() {
                break;
            }
            result = intersect_postings(&result, self.postings_list(term));
        }
        result
    }

    /// Documents containing at least one of the terms, ascending.
    pub fn union<S: AsRef<str>>(&self, terms: &[S]) -> Vec<DocId> {
        let set: BTreeSet<DocId> = terms
            .iter()
            .flat_map(|t| self.postings_list(t.as_ref()).iter().copied())
            .collect();
        set.into_iter().collect()
    }

    /// Occurrence count of `term` in `doc_id`, 0 when absent.
    pub fn term_frequency(&self, term: &str, doc_id: DocId) -> u32 {
        self.postings_with_frequencies(term)
            .find(|&(id, _)| id == doc_id)
            .map(|(_, freq)| freq)
            .unwrap_or(0)
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings_list(term).len()
    }

    /// `log10(N / df)` where N is the number of distinct terms in the index.
    /// Returns 0 for an empty index or an unknown term.
    pub fn inverse_document_frequency(&self, term: &str) -> f64 {
        let doc_freq = self.document_frequency(term);
        let n = self.postings.len();
        if n == 0 || doc_freq == 0 {
            return 0.0;
        }
        (n as f64 / doc_freq as f64).log10()
    }

    /// Number of distinct terms.
    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.postings.is_empty() }
}

/// Two-pointer intersection of two ascending, duplicate-free lists.
pub fn intersect_postings(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut result = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    result
}

/// Deduplicating merge of two ascending, duplicate-free lists.
pub fn union_postings(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut result = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => {
                result.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                result.push(b[j]);
                j += 1;
            }
        }
    }
    result.extend_from_slice(&a[i..]);
    result.extend_from_slice(&b[j..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> InvertedIndex {
        let mut ii = InvertedIndex::new();
        let docs = [
            (1, "the cat sat on the mat"),
            (2, "the dog sat"),
            (3, "a cat and a dog"),
        ];
        for (id, text) in docs {
            for word in text.split(' ') {
                ii.add_posting(word, id);
            }
        }
        ii
    }

    #[test]
    fn postings_are_sorted_with_aligned_frequencies() {
        let ii = sample_index();
        assert_eq!(ii.postings_list("the"), &[1, 2]);
        assert_eq!(ii.postings_list("cat"), &[1, 3]);
        assert_eq!(ii.term_frequency("the", 1), 2);
        assert_eq!(ii.term_frequency("the", 2), 1);
        assert_eq!(ii.term_frequency("a", 3), 2);
        assert_eq!(ii.term_frequency("the", 3), 0);
        assert!(ii.postings_list("unicorn").is_empty());
    }

    #[test]
    fn repeated_posting_for_same_document_is_idempotent_on_ids() {
        let mut ii = InvertedIndex::new();
        ii.add_posting("x", 4);
        ii.add_posting("x", 4);
        ii.add_posting("x", 4);
        ii.add_posting("", 4);
        assert_eq!(ii.postings_list("x"), &[4]);
        assert_eq!(ii.term_frequency("x", 4), 3);
        assert_eq!(ii.num_terms(), 1);
    }

    #[test]
    fn intersect_and_union_terms() {
        let ii = sample_index();
        assert_eq!(ii.intersect(&["cat", "sat"]), vec![1]);
        assert_eq!(ii.intersect(&["dog", "cat", "a"]), vec![3]);
        assert_eq!(ii.intersect(&["cat", "unicorn"]), Vec::<DocId>::new());
        assert_eq!(ii.intersect::<&str>(&[]), Vec::<DocId>::new());
        assert_eq!(ii.union(&["mat", "dog"]), vec![1, 2, 3]);
        assert_eq!(ii.union(&["unicorn"]), Vec::<DocId>::new());
    }

    #[test]
    fn pairwise_merges_match_set_semantics() {
        let a = [1, 3, 5, 7, 9];
        let b = [2, 3, 4, 9, 10];
        assert_eq!(intersect_postings(&a, &b), vec![3, 9]);
        assert_eq!(intersect_postings(&b, &a), vec![3, 9]);
        assert_eq!(union_postings(&a, &b), vec![1, 2, 3, 4, 5, 7, 9, 10]);
        assert_eq!(union_postings(&b, &a), vec![1, 2, 3, 4, 5, 7, 9, 10]);
        assert!(intersect_postings(&[], &b).is_empty());
        assert_eq!(union_postings(&[], &b), b.to_vec());
    }

    #[test]
    fn idf_uses_vocabulary_size() {
        let ii = sample_index();
        // 8 distinct terms; "cat" appears in 2 documents.
        assert_eq!(ii.num_terms(), 8);
        let expected = (8.0f64 / 2.0).log10();
        assert_eq!(ii.inverse_document_frequency("cat"), expected);
        assert_eq!(ii.inverse_document_frequency("unicorn"), 0.0);
        assert_eq!(InvertedIndex::new().inverse_document_frequency("cat"), 0.0);
    }
}
