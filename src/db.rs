use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::{DbError, DbResult};
use crate::schema;

/// Handle onto the SQLite store. Constructed once at startup via
/// [`Database::connect`] and cloned into every handler through the
/// application state; cloning shares the underlying pool.
///
/// The pool is capped at a single connection so mutating
/// check-then-act sequences serialize instead of racing each other on
/// the uniqueness constraints.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if absent) the database file, enable foreign-key
    /// enforcement and apply every table definition in dependency
    /// order. Any failure here is fatal to startup.
    pub async fn connect(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!(path = %path.display(), error = %e, "failed to open database");
                DbError::Connect {
                    path: path.display().to_string(),
                    source: e,
                }
            })?;

        for &(table, ddl) in schema::TABLES {
            sqlx::query(ddl).execute(&pool).await.map_err(|e| {
                tracing::error!(table, error = %e, "failed to apply schema");
                DbError::Schema { table, source: e }
            })?;
        }

        tracing::info!(path = %path.display(), "set up the tables");
        Ok(Self { pool })
    }

    /// Close the pool. Operations invoked afterwards fail with
    /// [`DbError::NotConnected`].
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("closed database connection");
    }

    pub(crate) fn pool(&self) -> DbResult<&SqlitePool> {
        if self.pool.is_closed() {
            return Err(DbError::NotConnected);
        }
        Ok(&self.pool)
    }

    /// Insert a user row and return its generated id. Password hashing
    /// and authentication live outside this crate; the stored hash is
    /// whatever the caller supplies.
    pub async fn insert_user(&self, email: &str, hashed_pw: &str) -> DbResult<i64> {
        let res = sqlx::query("INSERT INTO users (email, hashed_pw) VALUES (?1, ?2)")
            .bind(email)
            .bind(hashed_pw)
            .execute(self.pool()?)
            .await?;
        Ok(res.last_insert_rowid())
    }
}
