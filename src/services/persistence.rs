//! Persistence collaborator for page documents.
//!
//! DESIGN
//! ======
//! The page store talks to storage only through `PageRepository`: list, get,
//! create, update. `MemoryPageRepository` backs tests and database-less runs;
//! `PgPageRepository` stores each document as `jsonb` next to the indexed
//! columns (slug, status) that Postgres needs for constraints.
//!
//! ERROR HANDLING
//! ==============
//! Failures propagate to the store operation that triggered them. There is
//! no retry here; a database error is reported as retryable so callers can
//! decide. A unique-index violation (another writer took the slug) is a
//! conflict, not a transient failure.

use std::collections::HashMap;

use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::state::PageDocument;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("page already exists: {0}")]
    Conflict(Uuid),
    #[error("page not found in storage: {0}")]
    Missing(Uuid),
    #[error("unique constraint violated: {}", .constraint.as_deref().unwrap_or("unknown"))]
    UniqueViolation { constraint: Option<String> },
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("page document encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error()
            && db_err.is_unique_violation()
        {
            return Self::UniqueViolation { constraint: db_err.constraint().map(str::to_owned) };
        }
        Self::Database(err)
    }
}

impl PersistenceError {
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

/// Storage operations the page store depends on.
#[async_trait::async_trait]
pub trait PageRepository: Send + Sync {
    /// All stored pages, oldest first.
    async fn list(&self) -> Result<Vec<PageDocument>, PersistenceError>;

    async fn get(&self, id: Uuid) -> Result<Option<PageDocument>, PersistenceError>;

    /// Insert a new page. Fails with `Conflict` if the id exists.
    async fn create(&self, doc: &PageDocument) -> Result<(), PersistenceError>;

    /// Replace a stored page. Fails with `Missing` if the id is unknown.
    async fn update(&self, id: Uuid, doc: &PageDocument) -> Result<(), PersistenceError>;
}

// =============================================================================
// IN-MEMORY
// =============================================================================

#[derive(Default)]
pub struct MemoryPageRepository {
    pages: RwLock<HashMap<Uuid, PageDocument>>,
}

impl MemoryPageRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PageRepository for MemoryPageRepository {
    async fn list(&self) -> Result<Vec<PageDocument>, PersistenceError> {
        let pages = self.pages.read().await;
        let mut all: Vec<PageDocument> = pages.values().cloned().collect();
        all.sort_by_key(|p| (p.created_at, p.id));
        Ok(all)
    }

    async fn get(&self, id: Uuid) -> Result<Option<PageDocument>, PersistenceError> {
        Ok(self.pages.read().await.get(&id).cloned())
    }

    async fn create(&self, doc: &PageDocument) -> Result<(), PersistenceError> {
        let mut pages = self.pages.write().await;
        if pages.contains_key(&doc.id) {
            return Err(PersistenceError::Conflict(doc.id));
        }
        pages.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, doc: &PageDocument) -> Result<(), PersistenceError> {
        let mut pages = self.pages.write().await;
        let Some(slot) = pages.get_mut(&id) else {
            return Err(PersistenceError::Missing(id));
        };
        *slot = doc.clone();
        Ok(())
    }
}

// =============================================================================
// POSTGRES
// =============================================================================

pub struct PgPageRepository {
    pool: PgPool,
}

impl PgPageRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PageRepository for PgPageRepository {
    async fn list(&self) -> Result<Vec<PageDocument>, PersistenceError> {
        let rows = sqlx::query_scalar::<_, serde_json::Value>("SELECT document FROM pages ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(PersistenceError::from))
            .collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<PageDocument>, PersistenceError> {
        let row = sqlx::query_scalar::<_, serde_json::Value>("SELECT document FROM pages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(serde_json::from_value)
            .transpose()
            .map_err(PersistenceError::from)
    }

    async fn create(&self, doc: &PageDocument) -> Result<(), PersistenceError> {
        let document = serde_json::to_value(doc)?;
        let result = sqlx::query(
            "INSERT INTO pages (id, slug, status, document, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, now(), now()) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(doc.id)
        .bind(&doc.slug)
        .bind(doc.status.as_str())
        .bind(&document)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::Conflict(doc.id));
        }
        Ok(())
    }

    async fn update(&self, id: Uuid, doc: &PageDocument) -> Result<(), PersistenceError> {
        let document = serde_json::to_value(doc)?;
        let result = sqlx::query(
            "UPDATE pages SET slug = $2, status = $3, document = $4, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&doc.slug)
        .bind(doc.status.as_str())
        .bind(&document)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::Missing(id));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
