use std::collections::HashSet;

use async_trait::async_trait;
use embedsearch_common::config::is_sql_identifier;
use embedsearch_common::{AppConfig, EmbedSearchError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::{debug, info};

use crate::codec;
use crate::store::DocumentStore;
use crate::types::{Candidate, DocumentId};

/// Columns every documents table must carry
const REQUIRED_COLUMNS: [&str; 3] = ["id", "text", "embedding"];

/// PostgreSQL + pgvector document store
///
/// Vectors travel as pgvector text literals cast with `::vector`, and come back
/// through `embedding::text`, so no pgvector client type is needed.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    table: String,
}

impl PgDocumentStore {
    /// Connect a pool using application configuration
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
            .map_err(map_sqlx_error)?;

        info!(
            "Connected to PostgreSQL (pool size {}, table {})",
            config.db_max_connections, config.documents_table
        );
        Self::with_pool(pool, &config.documents_table)
    }

    /// Wrap an existing pool
    pub fn with_pool(pool: PgPool, table: &str) -> Result<Self> {
        if !is_sql_identifier(table) {
            return Err(EmbedSearchError::config(format!(
                "Documents table '{}' is not a plain SQL identifier",
                table
            )));
        }

        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    /// Check that the documents table exposes `id`, `text` and `embedding`
    pub async fn verify_schema(&self) -> Result<()> {
        let rows = sqlx::query(
            "SELECT column_name::text FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1",
        )
        .bind(self.table.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let columns = rows
            .iter()
            .map(|row| row.try_get::<String, _>(0))
            .collect::<std::result::Result<HashSet<_>, _>>()
            .map_err(map_sqlx_error)?;

        if columns.is_empty() {
            return Err(EmbedSearchError::schema(format!(
                "table '{}' does not exist",
                self.table
            )));
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();
        if !missing.is_empty() {
            return Err(EmbedSearchError::schema(format!(
                "table '{}' is missing column(s): {}",
                self.table,
                missing.join(", ")
            )));
        }

        debug!("Schema of '{}' verified", self.table);
        Ok(())
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (text, embedding) VALUES ($1, $2::vector) RETURNING id::bigint",
            self.table
        )
    }

    fn candidates_sql(&self) -> String {
        format!(
            "SELECT id::bigint AS id, text, (embedding <=> $1::vector)::float8 AS distance, \
             embedding::text AS embedding \
             FROM {} \
             WHERE (embedding <=> $1::vector) <= $2 \
             ORDER BY distance ASC, id ASC",
            self.table
        )
    }

    fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM {}", self.table)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, text: &str, embedding: &[f32]) -> Result<DocumentId> {
        let row = sqlx::query(&self.insert_sql())
            .bind(text)
            .bind(codec::encode(embedding))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let id: i64 = row.try_get(0).map_err(map_sqlx_error)?;
        debug!("Inserted document {} into {}", id, self.table);
        Ok(id)
    }

    async fn query_candidates(
        &self,
        query_embedding: &[f32],
        max_distance: f64,
    ) -> Result<Vec<Candidate>> {
        let rows = sqlx::query(&self.candidates_sql())
            .bind(codec::encode(query_embedding))
            .bind(max_distance)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let candidates = rows
            .iter()
            .map(|row| -> std::result::Result<Candidate, sqlx::Error> {
                Ok(Candidate {
                    id: row.try_get("id")?,
                    text: row.try_get("text")?,
                    store_distance: row.try_get("distance")?,
                    raw_embedding: row.try_get("embedding")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(map_sqlx_error)?;

        debug!(
            "{} candidate(s) within distance {} in {}",
            candidates.len(),
            max_distance,
            self.table
        );
        Ok(candidates)
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(&self.count_sql())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(count.max(0) as u64)
    }
}

/// Classify a sqlx failure
///
/// Undefined table/column/type (42P01, 42703, 42704) and missing result
/// columns are schema problems; everything else is persistence.
pub fn map_sqlx_error(err: sqlx::Error) -> EmbedSearchError {
    match &err {
        sqlx::Error::ColumnNotFound(column) => {
            EmbedSearchError::schema(format!("column '{}' not found", column))
        }
        sqlx::Error::Database(db)
            if matches!(db.code().as_deref(), Some("42P01" | "42703" | "42704")) =>
        {
            EmbedSearchError::schema(db.message().to_string())
        }
        _ => EmbedSearchError::persistence(err.to_string()),
    }
}
