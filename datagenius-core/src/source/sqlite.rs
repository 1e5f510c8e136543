//! SQLite row source.
//!
//! # Connection Strings
//! - `sqlite:///path/to/database.db` or `sqlite://./relative.db`
//! - `sqlite::memory:` or `:memory:`
//! - a bare path ending in `.db`, `.sqlite` or `.sqlite3`
//!
//! SQLite is dynamically typed, so values are decoded by their runtime
//! storage class: INTEGER and REAL become numbers, TEXT stays text, BLOBs are
//! base64-encoded with a `base64:` prefix.
//!
//! A read-only source opens its database with `SQLITE_OPEN_READONLY` and also
//! sets `PRAGMA query_only` on every connection it checks out, which covers
//! pools handed over through [`SqliteSource::from_pool`].

use std::future::Future;
use std::str::FromStr;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Executor, Row, Sqlite, SqlitePool, ValueRef};

use super::{
    RowSource, SampleLimit, SourceConfig, is_select_only, quote_identifier, validate_table_name,
};
use crate::Result;
use crate::error::DataGeniusError;
use crate::models::{Cell, TableData};

const DESCRIBE_HEADERS: [&str; 3] = ["column_name", "data_type", "is_nullable"];

/// SQLite-backed [`RowSource`].
pub struct SqliteSource {
    pool: SqlitePool,
    config: SourceConfig,
}

impl std::fmt::Debug for SqliteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSource")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SqliteSource {
    /// Opens a pool for `connection_string`.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid, the connection string
    /// cannot be parsed or the database cannot be opened.
    pub async fn connect(connection_string: &str, config: &SourceConfig) -> Result<Self> {
        config.validate()?;

        let normalized = normalize_connection_string(connection_string);
        let options = SqliteConnectOptions::from_str(&normalized)
            .map_err(|e| {
                DataGeniusError::configuration(format!("Invalid SQLite connection string: {}", e))
            })?
            .read_only(config.read_only);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await
            .map_err(DataGeniusError::connection_failed)?;

        tracing::debug!("Opened SQLite source (read_only: {})", config.read_only);
        Ok(Self {
            pool,
            config: config.clone(),
        })
    }

    /// Wraps an existing pool. With `config.read_only` set, connections are
    /// switched to `query_only` as they are used.
    pub fn from_pool(pool: SqlitePool, config: SourceConfig) -> Self {
        Self { pool, config }
    }

    /// The configuration this source was opened with.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Runs `future` under the configured query timeout.
    async fn timed<T, F>(&self, operation: &str, future: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        let limit = self.config.query_timeout;
        match tokio::time::timeout(limit, future).await {
            Ok(result) => result.map_err(|e| DataGeniusError::query_failed(operation, e)),
            Err(_) => Err(DataGeniusError::timeout(operation, limit.as_secs())),
        }
    }

    /// Checks out a connection, enforcing `query_only` for read-only sources.
    async fn acquire(&self, operation: &str) -> Result<PoolConnection<Sqlite>> {
        let mut conn = self.timed(operation, self.pool.acquire()).await?;
        if self.config.read_only {
            self.timed(
                operation,
                sqlx::query("PRAGMA query_only = ON").execute(&mut *conn),
            )
            .await?;
        }
        Ok(conn)
    }

    /// Fetches `sql` into a table, keeping column order. Zero-row results
    /// still carry their headers.
    async fn fetch_table(&self, operation: &str, sql: &str) -> Result<TableData> {
        let mut conn = self.acquire(operation).await?;
        let rows = self
            .timed(operation, sqlx::query(sql).fetch_all(&mut *conn))
            .await?;

        let headers: Vec<String> = match rows.first() {
            Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
            None => {
                let described = self.timed(operation, (&mut *conn).describe(sql)).await?;
                described
                    .columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect()
            }
        };

        let rows = rows.iter().map(row_to_cells).collect();
        Ok(TableData::new(headers, rows))
    }
}

#[async_trait]
impl RowSource for SqliteSource {
    fn source_type(&self) -> &'static str {
        "sqlite"
    }

    async fn test_connection(&self) -> Result<()> {
        let mut conn = self.acquire("Connection test").await?;
        let value: i64 = self
            .timed(
                "Connection test",
                sqlx::query_scalar("SELECT 1").fetch_one(&mut *conn),
            )
            .await?;

        if value != 1 {
            return Err(DataGeniusError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let mut conn = self.acquire("List tables").await?;
        let names: Vec<String> = self
            .timed(
                "List tables",
                sqlx::query_scalar(
                    "SELECT name FROM sqlite_master \
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                     ORDER BY name",
                )
                .fetch_all(&mut *conn),
            )
            .await?;
        tracing::debug!("Found {} tables", names.len());
        Ok(names)
    }

    async fn describe_table(&self, table: &str) -> Result<TableData> {
        validate_table_name(table)?;
        let query = match table.split_once('.') {
            Some((schema, name)) => format!(
                "PRAGMA {}.table_info('{}')",
                quote_identifier(schema),
                name.replace('\'', "''")
            ),
            None => format!("PRAGMA table_info('{}')", table.replace('\'', "''")),
        };
        let mut conn = self.acquire("Describe table").await?;
        let rows = self
            .timed("Describe table", sqlx::query(&query).fetch_all(&mut *conn))
            .await?;

        if rows.is_empty() {
            return Err(DataGeniusError::configuration(format!(
                "Table '{}' not found",
                table
            )));
        }

        let columns = rows
            .iter()
            .map(|row| {
                let name: String = row.try_get("name").unwrap_or_default();
                let data_type: String = row.try_get("type").unwrap_or_default();
                let not_null: i64 = row.try_get("notnull").unwrap_or(0);
                let pk: i64 = row.try_get("pk").unwrap_or(0);
                // INTEGER PRIMARY KEY aliases rowid and can never be NULL
                let nullable = not_null == 0
                    && !(pk > 0 && data_type.eq_ignore_ascii_case("INTEGER"));
                vec![
                    Cell::Text(name),
                    Cell::Text(data_type),
                    Cell::text(if nullable { "YES" } else { "NO" }),
                ]
            })
            .collect();

        Ok(TableData::new(DESCRIBE_HEADERS, columns))
    }

    async fn sample_rows(&self, table: &str, limit: SampleLimit) -> Result<TableData> {
        validate_table_name(table)?;
        let query = format!(
            "SELECT * FROM {} LIMIT {}",
            quote_identifier(table),
            limit.get()
        );
        let sample = self.fetch_table("Sample rows", &query).await?;
        tracing::debug!("Sampled {} rows from '{}'", sample.row_count(), table);
        Ok(sample)
    }

    async fn run_select(&self, query: &str) -> Result<TableData> {
        if !is_select_only(query) {
            return Err(DataGeniusError::query_rejected(
                "Only single SELECT statements are allowed",
            ));
        }
        self.fetch_table("Run query", query).await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_cells(row: &SqliteRow) -> Vec<Cell> {
    (0..row.columns().len())
        .map(|index| decode_cell(row, index))
        .collect()
}

/// Decodes one value by its storage class.
fn decode_cell(row: &SqliteRow, index: usize) -> Cell {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Cell::Null,
        Ok(_) => {}
        Err(_) => return Cell::Null,
    }

    if let Ok(v) = row.try_get::<i64, _>(index) {
        return Cell::Number(v as f64);
    }
    if let Ok(v) = row.try_get::<f64, _>(index) {
        return Cell::Number(v);
    }
    if let Ok(v) = row.try_get::<String, _>(index) {
        return Cell::Text(v);
    }
    if let Ok(v) = row.try_get::<Vec<u8>, _>(index) {
        return Cell::Text(format!("base64:{}", BASE64.encode(v)));
    }
    Cell::Null
}

/// Normalizes connection string to SQLite URL format.
fn normalize_connection_string(connection_string: &str) -> String {
    if connection_string == ":memory:" {
        return "sqlite::memory:".to_string();
    }

    if connection_string.starts_with("sqlite:") {
        return connection_string.to_string();
    }

    format!("sqlite://{}", connection_string)
}
