//! PostgreSQL backend tests.
//!
//! These need a database with the pgvector extension and are ignored by
//! default. Run them with
//! `EMBEDSEARCH_TEST_DATABASE_URL=postgres://... cargo test -p embedsearch-vector -- --ignored`.

use embedsearch_common::{AppConfig, EmbedSearchError};
use embedsearch_vector::{DocumentStore, PgDocumentStore};
use sqlx::postgres::PgPoolOptions;

fn database_url() -> String {
    std::env::var("EMBEDSEARCH_TEST_DATABASE_URL")
        .expect("EMBEDSEARCH_TEST_DATABASE_URL must point at a pgvector database")
}

async fn fresh_table(url: &str, table: &str) -> PgDocumentStore {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(url)
        .await
        .expect("connect to test database");

    sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
        .execute(&pool)
        .await
        .expect("pgvector extension");
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
        .execute(&pool)
        .await
        .expect("drop table");
    sqlx::query(&format!(
        "CREATE TABLE {} (id SERIAL PRIMARY KEY, text TEXT NOT NULL, embedding vector(3) NOT NULL)",
        table
    ))
    .execute(&pool)
    .await
    .expect("create table");

    PgDocumentStore::with_pool(pool, table).expect("store")
}

#[tokio::test]
#[ignore = "needs PostgreSQL with pgvector (EMBEDSEARCH_TEST_DATABASE_URL)"]
async fn insert_query_and_count() {
    let url = database_url();
    let store = fresh_table(&url, "embedsearch_test_docs").await;
    store.verify_schema().await.unwrap();

    let first = store.insert("hello world", &[1.0, 0.0, 0.0]).await.unwrap();
    let second = store.insert("", &[0.9, 0.1, 0.0]).await.unwrap();
    store.insert("opposite", &[-1.0, 0.0, 0.0]).await.unwrap();
    assert!(second > first);
    assert_eq!(store.count().await.unwrap(), 3);

    let candidates = store.query_candidates(&[1.0, 0.0, 0.0], 0.5).await.unwrap();
    let ids: Vec<_> = candidates.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![first, second]);
    assert_eq!(candidates[0].raw_embedding, "[1,0,0]");
    assert!(candidates[0].store_distance.abs() < 1e-6);
}

#[tokio::test]
#[ignore = "needs PostgreSQL with pgvector (EMBEDSEARCH_TEST_DATABASE_URL)"]
async fn missing_column_is_schema_error() {
    let url = database_url();
    let pool = PgPoolOptions::new().connect(&url).await.unwrap();
    sqlx::query("DROP TABLE IF EXISTS embedsearch_test_broken")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("CREATE TABLE embedsearch_test_broken (id SERIAL PRIMARY KEY, text TEXT)")
        .execute(&pool)
        .await
        .unwrap();

    let store = PgDocumentStore::with_pool(pool, "embedsearch_test_broken").unwrap();
    let err = store.verify_schema().await.unwrap_err();
    assert!(matches!(err, EmbedSearchError::Schema(ref m) if m.contains("embedding")));

    let err = store.query_candidates(&[1.0, 0.0, 0.0], 0.5).await.unwrap_err();
    assert!(matches!(err, EmbedSearchError::Schema(_)), "{:?}", err);
}

#[tokio::test]
#[ignore = "needs PostgreSQL with pgvector (EMBEDSEARCH_TEST_DATABASE_URL)"]
async fn connect_uses_config() {
    let url = database_url();
    let config = AppConfig {
        database_url: url,
        documents_table: "embedsearch_test_missing".to_string(),
        ..AppConfig::default()
    };

    let store = PgDocumentStore::connect(&config).await.unwrap();
    let err = store.verify_schema().await.unwrap_err();
    assert!(matches!(err, EmbedSearchError::Schema(_)));
}
