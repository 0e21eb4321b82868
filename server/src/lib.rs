use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use sift_core::tokenizer::tokenize;
use sift_core::{Algorithm, DocId, Document, DocumentStore, IndexStats, Searcher};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const RESULTS_PER_PAGE: usize = 10;
const SNIPPET_BEFORE: usize = 100;
const SNIPPET_LEN: usize = 300;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

/// 1-based page from the raw query value; anything unparsable is page 1.
pub fn page_number(raw: Option<&str>) -> usize {
    raw.and_then(|p| p.trim().parse::<usize>().ok()).filter(|&p| p >= 1).unwrap_or(1)
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub algorithm: &'static str,
    pub ranked: bool,
    pub page: usize,
    pub total_hits: usize,
    pub took_s: f64,
    pub next_page: Option<usize>,
    pub prev_page: Option<usize>,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub title: String,
    pub url: String,
    pub snippet: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub searcher: Arc<Searcher>,
    pub store: Arc<dyn DocumentStore>,
}

pub fn build_app(searcher: Searcher, store: Arc<dyn DocumentStore>) -> Router {
    let app_state = AppState { searcher: Arc::new(searcher), store };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/stats", get(stats_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let algorithm = params.alg.as_deref().map(Algorithm::from_name).unwrap_or_default();
    let page = page_number(params.page.as_deref());

    let ids = state.searcher.search(&params.q, algorithm);
    let total_hits = ids.len();
    let page_ids = paginate(&ids, page);
    let docs = state
        .store
        .get(page_ids)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let terms = tokenize(&params.q);
    let results = docs
        .into_iter()
        .filter(|d| !d.is_placeholder())
        .map(|d| {
            let snippet = snippet(&d.body, &terms);
            SearchHit { doc_id: d.id, title: d.title, url: d.url, snippet }
        })
        .collect();

    let next_page = page
        .checked_mul(RESULTS_PER_PAGE)
        .filter(|&shown| total_hits > shown)
        .and_then(|_| page.checked_add(1));
    let prev_page = (page > 1 && !page_ids.is_empty()).then_some(page - 1);
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse {
        query: params.q,
        algorithm: algorithm.name(),
        ranked: algorithm.is_ranked(),
        page,
        total_hits,
        took_s: elapsed.as_secs_f64(),
        next_page,
        prev_page,
        results,
    }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Json<serde_json::Value> {
    let doc = state.store.get(&[doc_id]).ok().and_then(|mut docs| docs.pop());
    match doc.filter(|d| !d.is_placeholder()) {
        Some(Document { title, body, url, .. }) => {
            Json(serde_json::json!({ "doc_id": doc_id, "title": title, "url": url, "text": body }))
        }
        None => Json(serde_json::json!({ "error": "not found" })),
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.searcher.stats())
}

/// The ids shown on 1-based `page`; empty past the end.
pub fn paginate(ids: &[DocId], page: usize) -> &[DocId] {
    match (page.max(1) - 1).checked_mul(RESULTS_PER_PAGE) {
        Some(start) if start < ids.len() => &ids[start..(start + RESULTS_PER_PAGE).min(ids.len())],
        _ => &[],
    }
}

/// Window of `body` around the first query term, with matches wrapped in `<em>`.
fn snippet(body: &str, terms: &[String]) -> Option<String> {
    if body.is_empty() { return None; }
    let terms: Vec<String> = terms.iter().filter(|t| !t.is_empty()).map(|t| regex::escape(t)).collect();
    if terms.is_empty() {
        return Some(body.chars().take(SNIPPET_LEN).collect());
    }
    let pat = regex::RegexBuilder::new(&terms.join("|"))
        .case_insensitive(true)
        .build()
        .ok()?;
    let window = match pat.find(body) {
        Some(m) => {
            let start = floor_char_boundary(body, m.start().saturating_sub(SNIPPET_BEFORE));
            let end = floor_char_boundary(body, (start + SNIPPET_LEN).min(body.len()));
            &body[start..end]
        }
        None => &body[..floor_char_boundary(body, SNIPPET_LEN.min(body.len()))],
    };
    Some(pat.replace_all(window, "<em>$0</em>").into_owned())
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
