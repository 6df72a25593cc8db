//! PostgreSQL-backed store.

mod folder;
mod resource;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use assetdeck_core::error::{AppError, ErrorKind};
use assetdeck_core::result::AppResult;

use crate::store::{AssetStore, AssetTx};

/// Asset store over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgAssetStore {
    pool: PgPool,
}

impl PgAssetStore {
    /// Create a new store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetStore for PgAssetStore {
    fn backend(&self) -> &str {
        "postgres"
    }

    async fn begin(&self) -> AppResult<Box<dyn AssetTx>> {
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}

/// An open PostgreSQL transaction. sqlx rolls it back on drop.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl AssetTx for PgTx {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })
    }
}

/// Map a sqlx error, turning unique violations into conflicts.
fn map_write_err(e: sqlx::Error, context: &str, conflict: impl FnOnce() -> String) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::conflict(conflict())
        }
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), e),
    }
}

/// Map a sqlx error from a read query.
fn map_read_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// `LIKE` pattern matching every proper descendant of `path`.
fn descendant_pattern(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len() + 2);
    for ch in path.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push_str(".%");
    escaped
}
