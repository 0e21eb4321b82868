use super::DocumentStore;
use crate::{DocId, Document};
use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Flat-file store holding one JSON document per line.
///
/// Records without an `id` (or with id 0) take their 1-based line position
/// among non-blank lines, so a plain corpus dump can be used as-is. Every
/// resulting id must be unique within the file.
pub struct JsonlStore {
    path: PathBuf,
    /// `None` once the id space is exhausted.
    next_id: Mutex<Option<DocId>>,
}

impl JsonlStore {
    /// Opens `path`, creating an empty file if it does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        }
        let store = Self { path, next_id: Mutex::new(Some(1)) };
        let mut max_id = 0;
        let mut first_seen: HashMap<DocId, usize> = HashMap::new();
        let mut duplicate = None;
        store.for_each_record(|lineno, doc| {
            max_id = max_id.max(doc.id);
            if let Some(&first) = first_seen.get(&doc.id) {
                duplicate.get_or_insert((lineno, doc.id, first));
            } else {
                first_seen.insert(doc.id, lineno);
            }
        })?;
        if let Some((lineno, id, first)) = duplicate {
            bail!("{}:{}: document id {} already used on line {}", store.path.display(), lineno, id, first);
        }
        *store.next_id.lock() = max_id.checked_add(1);
        Ok(store)
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Visits each record with its 1-based line number.
    fn for_each_record<F: FnMut(usize, Document)>(&self, mut f: F) -> Result<()> {
        let file = File::open(&self.path).with_context(|| format!("opening {}", self.path.display()))?;
        let mut position: DocId = 0;
        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            position += 1;
            let mut doc: Document = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}: invalid document", self.path.display(), lineno + 1))?;
            if doc.id == 0 {
                doc.id = position;
            }
            f(lineno + 1, doc);
        }
        Ok(())
    }
}

impl DocumentStore for JsonlStore {
    fn apply(&self, visit: &mut dyn FnMut(Document)) -> Result<()> {
        self.for_each_record(|_, doc| visit(doc))
    }

    fn get(&self, ids: &[DocId]) -> Result<Vec<Document>> {
        let mut found: HashMap<DocId, Document> = ids.iter().map(|&id| (id, Document::default())).collect();
        self.for_each_record(|_, doc| {
            if let Some(slot) = found.get_mut(&doc.id) {
                *slot = doc;
            }
        })?;
        Ok(ids.iter().map(|id| found.get(id).cloned().unwrap_or_default()).collect())
    }

    fn save(&self, mut document: Document) -> Result<DocId> {
        let mut next_id = self.next_id.lock();
        let Some(id) = *next_id else {
            bail!("{}: document ids exhausted", self.path.display());
        };
        document.id = id;
        let mut f = OpenOptions::new().append(true).open(&self.path)?;
        let line = serde_json::to_string(&document)?;
        writeln!(f, "{line}")?;
        *next_id = id.checked_add(1);
        Ok(id)
    }
}
