//! Storage traits and error types
//!
//! This module defines the interface a document store backend must offer
//! and the records that cross it.

use crate::model::{ExtractionMethod, ExtractionRecord};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Index creation failed: {0}")]
    Index(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StorageError {
    /// True when the store itself could not be reached (busy, locked or
    /// unopenable), as opposed to a problem with one document
    pub fn is_unavailable(&self) -> bool {
        match self {
            StorageError::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy
                    | rusqlite::ErrorCode::DatabaseLocked
                    | rusqlite::ErrorCode::CannotOpen
            ),
            _ => false,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A document about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub file: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub method: ExtractionMethod,
    pub size_bytes: u64,
    pub char_count: usize,
    pub uploaded_at: DateTime<Utc>,
    /// Name of the record artifact the document was loaded from
    pub source_file: String,
}

impl NewDocument {
    pub fn from_record(record: &ExtractionRecord, source_file: &str) -> Self {
        Self {
            file: record.file.clone(),
            timestamp: record.timestamp,
            text: record.text.clone(),
            method: record.method,
            size_bytes: record.size_bytes,
            char_count: record.char_count,
            uploaded_at: Utc::now(),
            source_file: source_file.to_string(),
        }
    }
}

/// A persisted document with its store-assigned id
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: i64,
    pub file: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub method: ExtractionMethod,
    pub size_bytes: u64,
    pub char_count: usize,
    pub uploaded_at: DateTime<Utc>,
    pub source_file: String,
}

/// One full-text search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub file: String,
    pub method: ExtractionMethod,
    pub timestamp: DateTime<Utc>,
    /// Relevance, higher is better
    pub score: f64,
    /// Text around the match, matches wrapped in `[...]`
    pub snippet: String,
}

/// Trait for document store implementations
///
/// Lookup is by `file`, which is unique across the store.
pub trait DocumentStore {
    /// Round-trips a trivial query to prove the store is reachable
    fn ping(&self) -> StorageResult<()>;

    /// Creates the unique `file` index, the `timestamp` index and the
    /// full-text index on `text` if they are missing
    ///
    /// Every index is attempted even if an earlier one fails; the first
    /// failure is returned.
    fn ensure_indexes(&mut self) -> StorageResult<()>;

    fn find_by_file(&self, file: &str) -> StorageResult<Option<StoredDocument>>;

    /// Inserts every document in one round-trip, returning how many were written
    fn insert_many(&mut self, documents: &[NewDocument]) -> StorageResult<usize>;

    /// Replaces every stored field of document `id`
    fn replace(&mut self, id: i64, document: &NewDocument) -> StorageResult<()>;

    fn count(&self) -> StorageResult<u64>;

    /// Document counts grouped by extraction method
    fn count_by_method(&self) -> StorageResult<Vec<(ExtractionMethod, u64)>>;

    /// First `limit` documents ordered by file name
    fn list(&self, limit: usize) -> StorageResult<Vec<StoredDocument>>;

    /// Full-text search over `text`, best matches first
    fn search(&self, term: &str, limit: usize) -> StorageResult<Vec<SearchHit>>;
}
