use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sift_core::{build_indices, Document, DocumentStore, JsonlStore, MemoryStore, SearchConfig};
use std::sync::Arc;
use tower::ServiceExt;

fn build_tiny_app() -> Router {
    let store = MemoryStore::from_documents(vec![
        Document::new("Doc 1", "Rust is great. rust systems programming.", "https://example.com/1"),
        Document::new("Doc 2", "Learning rust and other languages today.", "https://example.com/2"),
        Document::new("Doc 3", "Gardening tips for spring.", "https://example.com/3"),
    ]);
    let searcher = build_indices(&store, SearchConfig::default()).unwrap();
    sift_server::build_app(searcher, Arc::new(store))
}

async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn doc_ids(json: &Value) -> Vec<u64> {
    json["results"].as_array().unwrap().iter().map(|r| r["doc_id"].as_u64().unwrap()).collect()
}

#[tokio::test]
async fn search_defaults_to_bm25_ranking() {
    let (status, json) = call(build_tiny_app(), "/search?q=rust").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["algorithm"], "BM25");
    assert_eq!(json["ranked"], true);
    assert_eq!(json["total_hits"], 2);
    assert_eq!(doc_ids(&json), vec![1, 2]);
    let snippet = json["results"][0]["snippet"].as_str().unwrap();
    assert!(snippet.contains("<em>Rust</em>"));
}

#[tokio::test]
async fn search_dispatches_by_algorithm_name() {
    let (_, json) = call(build_tiny_app(), "/search?q=rust%20%7C%7C%20gardening&alg=boolean").await;
    assert_eq!(json["algorithm"], "Boolean");
    assert_eq!(json["ranked"], false);
    assert_eq!(doc_ids(&json), vec![1, 2, 3]);

    let (_, json) = call(build_tiny_app(), "/search?q=gardnening&alg=Fuzzy").await;
    assert_eq!(doc_ids(&json), vec![3]);

    let (_, json) = call(build_tiny_app(), "/search?q=sys*&alg=Wildcard").await;
    assert_eq!(doc_ids(&json), vec![1]);

    let (_, json) = call(build_tiny_app(), "/search?q=rust&alg=unknown").await;
    assert_eq!(json["algorithm"], "BM25");
}

#[tokio::test]
async fn search_paginates() {
    let store = MemoryStore::from_documents((0..25).map(|i| Document::new(format!("Doc {i}"), "common words", "")));
    let searcher = build_indices(&store, SearchConfig::default()).unwrap();
    let app = sift_server::build_app(searcher, Arc::new(store));

    let (_, json) = call(app.clone(), "/search?q=common&alg=Terms&page=2").await;
    assert_eq!(json["total_hits"], 25);
    assert_eq!(doc_ids(&json), (11..=20).collect::<Vec<u64>>());
    assert_eq!(json["next_page"], 3);
    assert_eq!(json["prev_page"], 1);

    let (_, json) = call(app, "/search?q=common&alg=Terms&page=3").await;
    assert_eq!(doc_ids(&json).len(), 5);
    assert_eq!(json["next_page"], Value::Null);
}

#[tokio::test]
async fn out_of_range_page_is_empty() {
    let (status, json) = call(build_tiny_app(), "/search?q=rust&page=18446744073709551615").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_hits"], 2);
    assert!(doc_ids(&json).is_empty());
    assert_eq!(json["next_page"], Value::Null);
    assert_eq!(json["prev_page"], Value::Null);
}

#[tokio::test]
async fn unparsable_page_means_first_page() {
    let (status, json) = call(build_tiny_app(), "/search?q=rust&page=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["page"], 1);
    assert_eq!(doc_ids(&json), vec![1, 2]);
}

#[tokio::test]
async fn doc_and_stats_endpoints() {
    let (status, json) = call(build_tiny_app(), "/doc/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Doc 2");

    let (_, json) = call(build_tiny_app(), "/doc/99").await;
    assert_eq!(json["error"], "not found");

    let (_, json) = call(build_tiny_app(), "/stats").await;
    assert_eq!(json["num_documents"], 3);
}

#[tokio::test]
async fn serves_a_jsonl_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.jsonl");
    let store = JsonlStore::open(&path).unwrap();
    store.save(Document::new("Okapi BM25", "a ranking function", "u1")).unwrap();
    store.save(Document::new("Tf-idf", "term frequency weighting", "u2")).unwrap();

    let searcher = build_indices(&store, SearchConfig::default()).unwrap();
    let app = sift_server::build_app(searcher, Arc::new(store));
    let (_, json) = call(app, "/search?q=weighting&alg=Classic%20TF-IDF").await;
    assert_eq!(json["algorithm"], "Classic TF-IDF");
    assert_eq!(doc_ids(&json), vec![2]);
}
