use super::DocumentStore;
use crate::{DocId, Document};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::path::Path;

/// Persistent store on an embedded sled database.
///
/// Keys are big-endian ids so iteration follows id order; values are
/// bincode-encoded documents.
pub struct SledStore {
    db: sled::Db,
    write_lock: Mutex<()>,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path).with_context(|| format!("opening document db {}", path.display()))?;
        Ok(Self { db, write_lock: Mutex::new(()) })
    }

    pub fn len(&self) -> usize { self.db.len() }

    pub fn is_empty(&self) -> bool { self.db.is_empty() }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<Document> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl DocumentStore for SledStore {
    fn apply(&self, visit: &mut dyn FnMut(Document)) -> Result<()> {
        for entry in self.db.iter() {
            let (_, value) = entry?;
            visit(Self::decode(&value)?);
        }
        Ok(())
    }

    fn get(&self, ids: &[DocId]) -> Result<Vec<Document>> {
        let mut docs = Vec::with_capacity(ids.len());
        for id in ids {
            let doc = match self.db.get(id.to_be_bytes())? {
                Some(value) => Self::decode(&value)?,
                None => Document::default(),
            };
            docs.push(doc);
        }
        Ok(docs)
    }

    fn save(&self, mut document: Document) -> Result<DocId> {
        let _guard = self.write_lock.lock();
        let id = match self.db.last()? {
            Some((key, _)) => {
                let bytes: [u8; 4] = key.as_ref().try_into().context("corrupt document key")?;
                DocId::from_be_bytes(bytes) + 1
            }
            None => 1,
        };
        document.id = id;
        self.db.insert(id.to_be_bytes(), bincode::serialize(&document)?)?;
        Ok(id)
    }
}
