//! End-to-end retrieval through the real HTTP embedding client.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use embedsearch_common::EmbedSearchError;
use embedsearch_embedding::OllamaClient;
use embedsearch_vector::{
    render, DocumentStore, MemoryDocumentStore, RetrievalEngine, RetrievalOptions,
};
use serde_json::{json, Value};

struct FakeModel {
    vectors: HashMap<String, Vec<f32>>,
    /// 0 means answer normally
    forced_status: AtomicU16,
}

async fn handle_embeddings(
    State(model): State<Arc<FakeModel>>,
    Json(request): Json<Value>,
) -> (StatusCode, String) {
    let forced = model.forced_status.load(Ordering::SeqCst);
    if forced != 0 {
        let status = StatusCode::from_u16(forced).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "forced failure".to_string());
    }

    let prompt = request["prompt"].as_str().unwrap_or_default();
    let embedding = model
        .vectors
        .get(prompt)
        .cloned()
        .unwrap_or_else(|| vec![0.0, 0.0, 1.0]);
    (StatusCode::OK, json!({ "embedding": embedding }).to_string())
}

async fn start_fake_model(vectors: &[(&str, Vec<f32>)]) -> (SocketAddr, Arc<FakeModel>) {
    let model = Arc::new(FakeModel {
        vectors: vectors
            .iter()
            .map(|(text, v)| (text.to_string(), v.clone()))
            .collect(),
        forced_status: AtomicU16::new(0),
    });

    let app = Router::new()
        .route("/api/embeddings", post(handle_embeddings))
        .with_state(Arc::clone(&model));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake model");
    let addr = listener.local_addr().expect("Failed to get local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake model failed");
    });

    (addr, model)
}

fn engine_for(addr: SocketAddr, store: Arc<MemoryDocumentStore>) -> RetrievalEngine {
    let client = OllamaClient::new(format!("http://{}", addr), "nomic-embed-text").unwrap();
    RetrievalEngine::new(Arc::new(client), store, RetrievalOptions::default())
}

#[tokio::test]
async fn insert_then_query_ranks_identical_text_first() {
    let (addr, _model) = start_fake_model(&[
        ("hello world", vec![0.9, 0.1, 0.0]),
        ("hello there", vec![0.8, 0.3, 0.1]),
        ("tax forms", vec![-0.2, 0.1, 0.9]),
    ])
    .await;
    let store = Arc::new(MemoryDocumentStore::new());
    let engine = engine_for(addr, Arc::clone(&store));

    let hello = engine.insert("hello world").await.unwrap();
    engine.insert("hello there").await.unwrap();
    engine.insert("tax forms").await.unwrap();

    let outcome = engine.query("hello world").await.unwrap();
    assert_eq!(outcome.results[0].document_id, hello);
    assert!(outcome.results[0].verified_similarity >= 0.99);
    assert!(outcome.results.iter().all(|r| r.text != "tax forms"));

    let rendered = render::render_outcome(&outcome);
    assert!(rendered.starts_with("Similar texts:"));
    assert!(rendered.contains("Text: hello world"));
}

#[tokio::test]
async fn server_error_during_insert_creates_no_row() {
    let (addr, model) = start_fake_model(&[("kept", vec![1.0, 0.0, 0.0])]).await;
    let store = Arc::new(MemoryDocumentStore::new());
    let engine = engine_for(addr, Arc::clone(&store));

    engine.insert("kept").await.unwrap();
    let before = store.count().await.unwrap();

    model.forced_status.store(500, Ordering::SeqCst);
    match engine.insert("lost").await {
        Err(EmbedSearchError::Service { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "forced failure");
        }
        other => panic!("expected service error, got {:?}", other),
    }

    assert_eq!(store.count().await.unwrap(), before);
}

#[tokio::test]
async fn corrupted_row_among_five_is_isolated() {
    let vectors: Vec<(&str, Vec<f32>)> = vec![
        ("query", vec![1.0, 0.0, 0.0]),
        ("one", vec![1.0, 0.0, 0.0]),
        ("two", vec![1.0, 0.1, 0.0]),
        ("three", vec![1.0, 0.2, 0.0]),
        ("four", vec![1.0, 0.0, 0.2]),
        ("five", vec![1.0, 0.1, 0.1]),
    ];
    let (addr, _model) = start_fake_model(&vectors).await;
    let store = Arc::new(MemoryDocumentStore::new());
    let engine = engine_for(addr, Arc::clone(&store));

    let mut ids = Vec::new();
    for text in ["one", "two", "three", "four", "five"] {
        ids.push(engine.insert(text).await.unwrap());
    }
    store.corrupt_raw(ids[3], "[1,0.0,zero]").await.unwrap();

    let outcome = engine.query("query").await.unwrap();
    assert_eq!(outcome.results.len(), 4);
    assert_eq!(outcome.row_errors.len(), 1);
    assert_eq!(outcome.row_errors[0].document_id, ids[3]);

    let rendered = render::render_outcome(&outcome);
    assert_eq!(rendered.lines().filter(|l| l.starts_with("!!")).count(), 1);
}
