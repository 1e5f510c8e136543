//! Row sources: read-only access to tables that feed the analyses.
//!
//! A [`RowSource`] is constructed explicitly, handed to whoever needs rows,
//! and closed by its owner. Every result comes back as a [`TableData`] with
//! column order preserved, so it can be passed straight to the analyzer.
//!
//! # Security
//! - [`RowSource::run_select`] accepts a single `SELECT` statement, optionally
//!   behind a `WITH` clause
//! - Sources opened read-only refuse writes on every connection
//! - Table names are validated as identifiers before being interpolated
//! - Connection URLs are redacted before they reach logs or errors

use std::iter::Peekable;
use std::str::Chars;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::{DataGeniusError, redact_database_url};
use crate::models::TableData;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSource;

/// Identifier rule for table names, optionally schema-qualified.
static TABLE_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").ok()
});

/// Configuration for row source connections.
///
/// # Example
/// ```rust
/// use datagenius_core::source::SourceConfig;
/// use std::time::Duration;
///
/// let config = SourceConfig::default().with_query_timeout(Duration::from_secs(5));
/// assert!(config.validate().is_ok());
/// assert!(config.read_only);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Time allowed to open a connection
    pub connect_timeout: Duration,
    /// Time allowed for a single query
    pub query_timeout: Duration,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Open the source in read-only mode
    pub read_only: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(30),
            max_connections: 1,
            read_only: true,
        }
    }
}

impl SourceConfig {
    /// Sets the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-query timeout.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Sets the pool size.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Opens the source read-only (the default) or writable.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Validates connection parameters.
    ///
    /// # Errors
    /// Returns a configuration error if a timeout is zero or the pool size is
    /// outside `1..=100`.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(DataGeniusError::configuration(
                "max_connections must be greater than 0",
            ));
        }

        if self.max_connections > 100 {
            return Err(DataGeniusError::configuration(
                "max_connections should not exceed 100",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(DataGeniusError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.query_timeout.is_zero() {
            return Err(DataGeniusError::configuration(
                "query_timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Number of rows requested from [`RowSource::sample_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleLimit(u32);

impl SampleLimit {
    /// Rows sampled when no count is given.
    pub const DEFAULT: u32 = 5;
    /// Upper bound on a single sample.
    pub const MAX: u32 = 5000;

    /// Clamps a requested count to `1..=MAX`; zero means the default.
    pub fn clamp(requested: u32) -> Self {
        if requested == 0 {
            return Self(Self::DEFAULT);
        }
        Self(requested.min(Self::MAX))
    }

    /// The clamped row count.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for SampleLimit {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<u32> for SampleLimit {
    fn from(requested: u32) -> Self {
        Self::clamp(requested)
    }
}

/// Keywords that can open the main statement after a `WITH` clause.
const STATEMENT_KEYWORDS: [&str; 6] = [
    "select", "insert", "update", "delete", "replace", "values",
];

/// True iff `query` is a single `SELECT`, or a `WITH` whose main statement is
/// a `SELECT`.
///
/// One trailing `;` is allowed. Any other `;` outside quotes and comments
/// marks a second statement and rejects the query.
pub fn is_select_only(query: &str) -> bool {
    let trimmed = query.trim_end();
    let single = trimmed.strip_suffix(';').unwrap_or(trimmed);
    let Some(words) = top_level_words(single) else {
        return false;
    };

    match words.first().map(String::as_str) {
        Some("select") => true,
        Some("with") => words
            .iter()
            .skip(1)
            .find(|word| STATEMENT_KEYWORDS.contains(&word.as_str()))
            .is_some_and(|word| word == "select"),
        _ => false,
    }
}

/// Lower-cased words outside quotes, comments and parentheses, or `None`
/// when the text contains a statement separator.
fn top_level_words(sql: &str) -> Option<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut depth = 0_usize;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
            if depth == 0 {
                current.push(c.to_ascii_lowercase());
            }
            continue;
        }
        if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }

        match c {
            '\'' | '"' | '`' => skip_past(&mut chars, c),
            '[' => skip_past(&mut chars, ']'),
            '-' if chars.peek() == Some(&'-') => skip_past(&mut chars, '\n'),
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                skip_block_comment(&mut chars);
            }
            '(' => depth = depth.saturating_add(1),
            ')' => depth = depth.saturating_sub(1),
            ';' => return None,
            _ => {}
        }
    }

    if !current.is_empty() {
        words.push(current);
    }
    Some(words)
}

/// Consumes characters up to and including `end`. A doubled quote inside a
/// string simply reopens it on the next pass.
fn skip_past(chars: &mut Peekable<Chars<'_>>, end: char) {
    for c in chars.by_ref() {
        if c == end {
            break;
        }
    }
}

fn skip_block_comment(chars: &mut Peekable<Chars<'_>>) {
    let mut previous = '\0';
    for c in chars.by_ref() {
        if previous == '*' && c == '/' {
            break;
        }
        previous = c;
    }
}

/// Rejects anything that is not a plain (optionally schema-qualified) SQL
/// identifier.
pub fn validate_table_name(table: &str) -> Result<()> {
    let valid = TABLE_NAME
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(table));
    if valid {
        Ok(())
    } else {
        Err(DataGeniusError::configuration(format!(
            "Invalid table name '{}'",
            table
        )))
    }
}

/// Double-quotes an identifier, escaping embedded quotes.
pub(crate) fn quote_identifier(identifier: &str) -> String {
    identifier
        .split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Read-only access to a tabular data source.
///
/// # Object Safety
/// This trait is object-safe, so sources can be held as
/// `Box<dyn RowSource>`.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Short name of the backing engine, e.g. `sqlite`.
    fn source_type(&self) -> &'static str;

    /// Verifies the source answers a trivial query.
    async fn test_connection(&self) -> Result<()>;

    /// User tables, sorted by name.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Columns of `table` as rows of `column_name`, `data_type` and
    /// `is_nullable` (`YES`/`NO`), in declaration order.
    async fn describe_table(&self, table: &str) -> Result<TableData>;

    /// Up to `limit` rows of `table`.
    async fn sample_rows(&self, table: &str, limit: SampleLimit) -> Result<TableData>;

    /// Runs a read-only query.
    ///
    /// # Errors
    /// Returns [`DataGeniusError::QueryRejected`] unless
    /// [`is_select_only`] accepts the query.
    async fn run_select(&self, query: &str) -> Result<TableData>;

    /// Releases the underlying connections.
    async fn close(&self);
}

/// Opens a row source for a connection URL.
///
/// # Errors
/// Returns a configuration error for unsupported schemes or when the needed
/// feature is not compiled in.
pub async fn create_source(url: &str, config: &SourceConfig) -> Result<Box<dyn RowSource>> {
    config.validate()?;
    tracing::info!("Opening row source {}", redact_database_url(url));

    let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();
    if scheme == "sqlite" || is_sqlite_path(url) {
        return open_sqlite(url, config).await;
    }

    Err(DataGeniusError::configuration(format!(
        "Unsupported data source: {}",
        redact_database_url(url)
    )))
}

#[cfg(feature = "sqlite")]
async fn open_sqlite(url: &str, config: &SourceConfig) -> Result<Box<dyn RowSource>> {
    Ok(Box::new(SqliteSource::connect(url, config).await?))
}

#[cfg(not(feature = "sqlite"))]
async fn open_sqlite(_url: &str, _config: &SourceConfig) -> Result<Box<dyn RowSource>> {
    Err(DataGeniusError::configuration(
        "SQLite support not compiled in (enable the 'sqlite' feature)",
    ))
}

fn is_sqlite_path(url: &str) -> bool {
    url == ":memory:"
        || [".db", ".sqlite", ".sqlite3"]
            .iter()
            .any(|ext| url.ends_with(ext))
}
