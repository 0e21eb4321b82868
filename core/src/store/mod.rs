//! Document storage collaborators.
//!
//! The search core only ever sees documents through [`DocumentStore`]: it
//! walks every document once at build time and resolves ranked ids back to
//! records at query time.

use crate::{DocId, Document};
use anyhow::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;

mod jsonl;
mod sled_store;

pub use jsonl::JsonlStore;
pub use sled_store::SledStore;

pub trait DocumentStore: Send + Sync {
    /// Calls `visit` exactly once per stored document, in no particular order.
    fn apply(&self, visit: &mut dyn FnMut(Document)) -> Result<()>;

    /// Documents for `ids`, in the same order. Unknown ids resolve to
    /// `Document::default()` so the result always has `ids.len()` entries.
    fn get(&self, ids: &[DocId]) -> Result<Vec<Document>>;

    /// Persists `document` under a fresh id (largest stored id + 1) and returns it.
    fn save(&self, document: Document) -> Result<DocId>;
}

/// In-process store, safe to share between a producer saving documents and
/// readers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<DocId, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Store built from `docs`, assigning ids 1, 2, ... in iteration order.
    pub fn from_documents<I: IntoIterator<Item = Document>>(docs: I) -> Self {
        let mut map = BTreeMap::new();
        for (i, mut doc) in docs.into_iter().enumerate() {
            doc.id = i as DocId + 1;
            map.insert(doc.id, doc);
        }
        Self { docs: RwLock::new(map) }
    }

    pub fn len(&self) -> usize { self.docs.read().len() }

    pub fn is_empty(&self) -> bool { self.docs.read().is_empty() }
}

impl DocumentStore for MemoryStore {
    fn apply(&self, visit: &mut dyn FnMut(Document)) -> Result<()> {
        // Snapshot so `visit` may call back into the store.
        let docs: Vec<Document> = self.docs.read().values().cloned().collect();
        docs.into_iter().for_each(visit);
        Ok(())
    }

    fn get(&self, ids: &[DocId]) -> Result<Vec<Document>> {
        let docs = self.docs.read();
        Ok(ids.iter().map(|id| docs.get(id).cloned().unwrap_or_default()).collect())
    }

    fn save(&self, mut document: Document) -> Result<DocId> {
        let mut docs = self.docs.write();
        let id = docs.keys().next_back().map_or(1, |last| last + 1);
        document.id = id;
        docs.insert(id, document);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_contract() {
        let store = MemoryStore::from_documents(vec![
            Document::new("Cohen's kappa", "agreement statistic", "u1"),
            Document::new("Latent semantic analysis", "language processing", "u2"),
        ]);
        let id = store.save(Document::new("Code-division multiple access", "technologies", "u3")).unwrap();
        assert_eq!(id, 3);

        let docs = store.get(&[2, 1, 3, 9]).unwrap();
        let titles: Vec<&str> = docs.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Latent semantic analysis", "Cohen's kappa", "Code-division multiple access", ""]);
        assert!(docs[3].is_placeholder());
        assert_eq!(docs[3].id, 0);

        let mut seen = Vec::new();
        store.apply(&mut |d| seen.push(d.id)).unwrap();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
