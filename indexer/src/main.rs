use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use sift_core::{build_indices, Algorithm, Document, DocumentStore, SearchConfig, SledStore};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    url: Option<String>,
}

impl From<InputDoc> for Document {
    fn from(doc: InputDoc) -> Self {
        Document::new(doc.title, doc.body, doc.url.unwrap_or_default())
    }
}

#[derive(Parser)]
#[command(name = "sift-indexer")]
#[command(about = "Load documents into a store and query them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save documents from JSON/JSONL files or a directory into the document db
    Ingest {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Document db directory
        #[arg(long)]
        db: String,
    },
    /// Build the indices from the document db and run one query
    Query {
        /// Document db directory
        #[arg(long)]
        db: String,
        /// Query text
        #[arg(long)]
        q: String,
        /// BM25, "Classic TF-IDF", Boolean, Terms, Fuzzy or Wildcard
        #[arg(long, default_value = "BM25")]
        alg: String,
        /// Maximum number of results to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// JSON search config (k-gram size, BM25 parameters)
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { input, db } => {
            let store = SledStore::open(&db)?;
            let saved = ingest(Path::new(&input), &store)?;
            store.flush()?;
            tracing::info!(saved, db = %db, "ingest complete");
            Ok(())
        }
        Commands::Query { db, q, alg, limit, config } => {
            let config = match config {
                Some(path) => SearchConfig::from_json_file(path)?,
                None => SearchConfig::default(),
            };
            let store = SledStore::open(&db)?;
            let stdout = std::io::stdout();
            run_query(&store, config, &q, Algorithm::from_name(&alg), limit, &mut stdout.lock())
        }
    }
}

/// Saves every document found under `input` into `store`, files in path order.
fn ingest(input: &Path, store: &dyn DocumentStore) -> Result<usize> {
    let mut saved = 0;
    for file in input_files(input) {
        let result = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            ingest_jsonl(&file, store)
        } else {
            ingest_json(&file, store)
        };
        match result {
            Ok(n) => {
                tracing::info!(file = %file.display(), docs = n, "ingested file");
                saved += n;
            }
            Err(err) => tracing::warn!(file = %file.display(), error = %err, "skipping unreadable file"),
        }
    }
    Ok(saved)
}

fn input_files(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

fn ingest_jsonl(file: &Path, store: &dyn DocumentStore) -> Result<usize> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    let mut n = 0;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        store.save(doc.into())?;
        n += 1;
    }
    Ok(n)
}

fn ingest_json(file: &Path, store: &dyn DocumentStore) -> Result<usize> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let docs = match json {
        serde_json::Value::Array(arr) => arr,
        serde_json::Value::Object(_) => vec![json],
        _ => Vec::new(),
    };
    let mut n = 0;
    for v in docs {
        let doc: InputDoc = serde_json::from_value(v)?;
        store.save(doc.into())?;
        n += 1;
    }
    Ok(n)
}

fn run_query<W: Write>(
    store: &dyn DocumentStore,
    config: SearchConfig,
    q: &str,
    algorithm: Algorithm,
    limit: usize,
    out: &mut W,
) -> Result<()> {
    let searcher = build_indices(store, config)?;
    let ids = searcher.search(q, algorithm);
    tracing::info!(query = q, %algorithm, total_hits = ids.len(), "query complete");
    let shown = &ids[..ids.len().min(limit)];
    for (rank, doc) in store.get(shown)?.into_iter().enumerate() {
        if doc.is_placeholder() { continue; }
        let line = serde_json::json!({ "rank": rank + 1, "doc_id": doc.id, "title": doc.title, "url": doc.url });
        writeln!(out, "{line}")?;
    }
    Ok(())
}
