//! K-gram index over the vocabulary, used to generate candidate terms for
//! fuzzy and wildcard lookups.
//!
//! Terms are interned once and each gram maps to the ascending list of term
//! ids containing it, so re-adding a known term is a single hash lookup.

use crate::matching::{edit_distance, has_wildcard};
use std::collections::HashMap;

/// Sentinel used to pad boundary grams.
pub const PADDING: char = '$';

type TermId = u32;

/// Builds the padded k-grams of `term`.
///
/// The term is padded with `k - 1` sentinels on each side and a window of
/// width `k` slides over it, giving `|term| + k - 1` grams. A term shorter
/// than `k - 1` characters yields the single gram `[term]`.
pub fn build_kgrams(term: &str, k: usize) -> Vec<String> {
    let len = term.chars().count();
    if k == 0 || len < k - 1 {
        return vec![term.to_string()];
    }
    let pad = std::iter::repeat(PADDING).take(k - 1);
    let padded: Vec<char> = pad.clone().chain(term.chars()).chain(pad).collect();
    padded.windows(k).map(|w| w.iter().collect()).collect()
}

#[derive(Debug, Clone)]
pub struct KGramIndex {
    k: usize,
    terms: Vec<String>,
    term_ids: HashMap<String, TermId>,
    grams: HashMap<String, Vec<TermId>>,
}

impl KGramIndex {
    /// `k` must be at least 1.
    pub fn new(k: usize) -> Self {
        debug_assert!(k >= 1, "k-gram length must be at least 1");
        Self { k: k.max(1), terms: Vec::new(), term_ids: HashMap::new(), grams: HashMap::new() }
    }

    pub fn k(&self) -> usize { self.k }

    /// Registers `term` under each of its k-grams. Known terms are skipped.
    pub fn add_term(&mut self, term: &str) {
        if self.term_ids.contains_key(term) {
            return;
        }
        let id = self.terms.len() as TermId;
        self.terms.push(term.to_string());
        self.term_ids.insert(term.to_string(), id);
        for gram in build_kgrams(term, self.k) {
            let list = self.grams.entry(gram).or_default();
            // A term can repeat a gram ("aaaa"); ids only grow so checking the tail suffices.
            if list.last() != Some(&id) {
                list.push(id);
            }
        }
    }

    /// Terms sharing at least one gram with `query`, with the number of shared grams.
    pub fn kgram_overlap(&self, query: &str) -> HashMap<&str, usize> {
        let mut counts: HashMap<TermId, usize> = HashMap::new();
        for gram in build_kgrams(query, self.k) {
            for &id in self.term_ids_for(&gram) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts.into_iter().map(|(id, count)| (self.term(id), count)).collect()
    }

    /// Terms containing every literal gram of the wildcard pattern `query`.
    ///
    /// Grams containing `*` or `?` are ignored. The result is a candidate set
    /// only; callers must confirm each term with an exact wildcard match.
    pub fn kgram_match(&self, query: &str) -> Vec<&str> {
        let literal: Vec<String> = build_kgrams(query, self.k)
            .into_iter()
            .filter(|g| !has_wildcard(g))
            .collect();
        if literal.is_empty() {
            let mut all: Vec<&str> = self.terms.iter().map(String::as_str).collect();
            all.sort_unstable();
            return all;
        }

        let mut counts: HashMap<TermId, usize> = HashMap::new();
        for gram in &literal {
            for &id in self.term_ids_for(gram) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        let mut terms: Vec<&str> = counts
            .into_iter()
            .filter(|&(_, count)| count == literal.len())
            .map(|(id, _)| self.term(id))
            .collect();
        terms.sort_unstable();
        terms
    }

    /// Vocabulary terms within `max_edit_distance` of `query`.
    ///
    /// Edit distance is only computed for candidates whose gram overlap
    /// reaches [`lower_bound_overlap`].
    pub fn close_terms(&self, query: &str, max_edit_distance: usize) -> Vec<&str> {
        let query_len = query.chars().count();
        let mut terms: Vec<&str> = self
            .kgram_overlap(query)
            .into_iter()
            .filter(|&(term, overlap)| {
                let bound = lower_bound_overlap(query_len, term.chars().count(), max_edit_distance, self.k);
                overlap as i64 >= bound && edit_distance(query, term) <= max_edit_distance
            })
            .map(|(term, _)| term)
            .collect();
        terms.sort_unstable();
        terms
    }

    /// Number of distinct indexed terms.
    pub fn num_terms(&self) -> usize { self.terms.len() }

    /// Number of distinct grams.
    pub fn num_grams(&self) -> usize { self.grams.len() }

    fn term_ids_for(&self, gram: &str) -> &[TermId] {
        self.grams.get(gram).map(Vec::as_slice).unwrap_or(&[])
    }

    fn term(&self, id: TermId) -> &str {
        &self.terms[id as usize]
    }
}

/// Minimum number of shared grams two strings of the given lengths can have
/// while being within `max_edit_distance` of each other. May be negative.
pub fn lower_bound_overlap(len_a: usize, len_b: usize, max_edit_distance: usize, k: usize) -> i64 {
    len_a.max(len_b) as i64 - 1 - (max_edit_distance as i64 - 1) * k as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(words: &[&str]) -> KGramIndex {
        let mut ki = KGramIndex::new(3);
        for w in words {
            ki.add_term(w);
        }
        ki
    }

    #[test]
    fn kgrams_of_hello() {
        let grams = build_kgrams("hello", 3);
        assert_eq!(grams, vec!["$$h", "$he", "hel", "ell", "llo", "lo$", "o$$"]);
    }

    #[test]
    fn kgram_count_is_len_plus_k_minus_one() {
        for k in 1..=4 {
            for term in ["ab", "abc", "search", "coefficient"] {
                if term.len() >= k - 1 {
                    assert_eq!(build_kgrams(term, k).len(), term.len() + k - 1, "{term} k={k}");
                }
            }
        }
        assert_eq!(build_kgrams("he", 3), vec!["$$h", "$he", "he$", "e$$"]);
    }

    #[test]
    fn short_term_is_a_single_gram() {
        assert_eq!(build_kgrams("a", 3), vec!["a"]);
        assert_eq!(build_kgrams("ab", 4), vec!["ab"]);
    }

    #[test]
    fn add_term_is_idempotent() {
        let mut ki = index_of(&["hello", "hello", "help"]);
        assert_eq!(ki.num_terms(), 2);
        assert_eq!(ki.k(), 3);
        ki.add_term("help");
        let overlap = ki.kgram_overlap("hello");
        assert_eq!(overlap["hello"], 7);
        // $$h, $he, hel
        assert_eq!(overlap["help"], 3);
    }

    #[test]
    fn repeated_grams_register_once() {
        let ki = index_of(&["aaaa"]);
        let overlap = ki.kgram_overlap("aaa");
        // grams of "aaa": $$a, $aa, aaa, aa$, a$$ all belong to "aaaa"
        assert_eq!(overlap["aaaa"], 5);
    }

    #[test]
    fn wildcard_candidates_contain_every_literal_gram() {
        let ki = index_of(&["time", "tame", "timber", "lime"]);
        assert_eq!(ki.kgram_match("t*e"), vec!["tame", "time"]);
        assert_eq!(ki.kgram_match("tim*"), vec!["timber", "time"]);
        assert_eq!(ki.kgram_match("*ime"), vec!["lime", "time"]);
        assert!(ki.kgram_match("zzz*").is_empty());
    }

    #[test]
    fn pure_wildcard_yields_whole_vocabulary() {
        let ki = index_of(&["b", "a", "c"]);
        assert_eq!(ki.kgram_match("*"), vec!["a", "b", "c"]);
        assert_eq!(ki.kgram_match("?"), vec!["a", "b", "c"]);
    }

    #[test]
    fn close_terms_within_distance() {
        let ki = index_of(&["statistic", "statistics", "static", "plastic"]);
        assert_eq!(ki.close_terms("statistik", 2), vec!["statistic", "statistics"]);
        assert_eq!(ki.close_terms("statistic", 0), vec!["statistic"]);
        assert!(ki.close_terms("zebra", 1).is_empty());
    }

    #[test]
    fn lower_bound_matches_gram_count_at_zero_distance() {
        // With distance 0 the bound equals the full gram count |s| + k - 1.
        assert_eq!(lower_bound_overlap(5, 5, 0, 3), 7);
        assert_eq!(lower_bound_overlap(5, 3, 1, 3), 4);
        assert!(lower_bound_overlap(3, 2, 2, 3) < 0);
    }
}
