//! SQLite document store
//!
//! This module provides a SQLite-based implementation of the DocumentStore
//! trait, with FTS5 for full-text search.

use crate::model::ExtractionMethod;
use crate::storage::schema::{self, initialize_schema};
use crate::storage::traits::{
    DocumentStore, NewDocument, SearchHit, StorageError, StorageResult, StoredDocument,
};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::Duration;

const DOCUMENT_COLUMNS: &str =
    "id, file, timestamp, text, method, size_bytes, char_count, uploaded_at, source_file";

/// SQLite storage backend
pub struct SqliteDocumentStore {
    conn: Connection,
    location: String,
}

impl SqliteDocumentStore {
    /// Opens (or creates) the database and checks it is usable
    ///
    /// Any failure here is reported as [`HarvestError::StoreUnavailable`].
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, HarvestError> {
        let location = path.display().to_string();
        let unavailable = |reason: String| HarvestError::StoreUnavailable {
            location: location.clone(),
            reason,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
            }
        }

        let conn = Connection::open(path).map_err(|e| unavailable(e.to_string()))?;
        conn.busy_timeout(busy_timeout)
            .map_err(|e| unavailable(e.to_string()))?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )
        .map_err(|e| unavailable(e.to_string()))?;

        Self::from_connection(conn, location.clone()).map_err(|e| unavailable(e.to_string()))
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, ":memory:".to_string())
    }

    fn from_connection(conn: Connection, location: String) -> StorageResult<Self> {
        initialize_schema(&conn)?;
        let store = Self { conn, location };
        store.ping()?;
        Ok(store)
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

fn parse_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_method(row: &Row<'_>, idx: usize) -> rusqlite::Result<ExtractionMethod> {
    let raw: String = row.get(idx)?;
    ExtractionMethod::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown extraction method '{}'", raw).into(),
        )
    })
}

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<StoredDocument> {
    Ok(StoredDocument {
        id: row.get(0)?,
        file: row.get(1)?,
        timestamp: parse_time(row, 2)?,
        text: row.get(3)?,
        method: parse_method(row, 4)?,
        size_bytes: row.get::<_, i64>(5)? as u64,
        char_count: row.get::<_, i64>(6)? as usize,
        uploaded_at: parse_time(row, 7)?,
        source_file: row.get(8)?,
    })
}

/// Quotes each whitespace-separated term so FTS5 syntax is never interpreted
fn fts_query(term: &str) -> String {
    term.split_whitespace()
        .map(|token| format!("\"{}\"", token.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

impl DocumentStore for SqliteDocumentStore {
    fn ping(&self) -> StorageResult<()> {
        let one: i64 = self.conn.query_row("SELECT 1", [], |row| row.get(0))?;
        if one == 1 {
            Ok(())
        } else {
            Err(StorageError::Database("unexpected ping result".to_string()))
        }
    }

    fn ensure_indexes(&mut self) -> StorageResult<()> {
        let failures = schema::ensure_indexes(&self.conn);

        for (name, error) in &failures {
            tracing::warn!("Could not create index on {}: {}", name, error);
        }

        match failures.into_iter().next() {
            Some((name, error)) => Err(StorageError::Index(format!("{}: {}", name, error))),
            None => {
                tracing::debug!("Indexes on file, timestamp and text are in place");
                Ok(())
            }
        }
    }

    fn find_by_file(&self, file: &str) -> StorageResult<Option<StoredDocument>> {
        let sql = format!(
            "SELECT {} FROM documents WHERE file = ?1 ORDER BY id LIMIT 1",
            DOCUMENT_COLUMNS
        );
        let document = self
            .conn
            .query_row(&sql, params![file], document_from_row)
            .optional()?;
        Ok(document)
    }

    fn insert_many(&mut self, documents: &[NewDocument]) -> StorageResult<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO documents (file, timestamp, text, method, size_bytes, char_count, uploaded_at, source_file)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for doc in documents {
                stmt.execute(params![
                    doc.file,
                    doc.timestamp.to_rfc3339(),
                    doc.text,
                    doc.method.as_str(),
                    doc.size_bytes as i64,
                    doc.char_count as i64,
                    doc.uploaded_at.to_rfc3339(),
                    doc.source_file,
                ])?;
            }
        }
        tx.commit()?;

        Ok(documents.len())
    }

    fn replace(&mut self, id: i64, doc: &NewDocument) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE documents
             SET file = ?1, timestamp = ?2, text = ?3, method = ?4, size_bytes = ?5,
                 char_count = ?6, uploaded_at = ?7, source_file = ?8
             WHERE id = ?9",
            params![
                doc.file,
                doc.timestamp.to_rfc3339(),
                doc.text,
                doc.method.as_str(),
                doc.size_bytes as i64,
                doc.char_count as i64,
                doc.uploaded_at.to_rfc3339(),
                doc.source_file,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::Database(format!("document {} not found", id)));
        }
        Ok(())
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_by_method(&self) -> StorageResult<Vec<(ExtractionMethod, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT method, COUNT(*) FROM documents GROUP BY method ORDER BY COUNT(*) DESC, method",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((parse_method(row, 0)?, row.get::<_, i64>(1)? as u64))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    fn list(&self, limit: usize) -> StorageResult<Vec<StoredDocument>> {
        let sql = format!(
            "SELECT {} FROM documents ORDER BY file LIMIT ?1",
            DOCUMENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], document_from_row)?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?);
        }
        Ok(documents)
    }

    fn search(&self, term: &str, limit: usize) -> StorageResult<Vec<SearchHit>> {
        let query = fts_query(term);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            "SELECT d.file, d.method, d.timestamp,
                    bm25(documents_fts),
                    snippet(documents_fts, 0, '[', ']', '...', 16)
             FROM documents_fts
             JOIN documents d ON d.id = documents_fts.rowid
             WHERE documents_fts MATCH ?1
             ORDER BY bm25(documents_fts)
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![query, limit as i64], |row| {
            Ok(SearchHit {
                file: row.get(0)?,
                method: parse_method(row, 1)?,
                timestamp: parse_time(row, 2)?,
                // bm25 is lower-is-better
                score: -row.get::<_, f64>(3)?,
                snippet: row.get(4)?,
            })
        })?;

        let mut hits = Vec::new();
        for row in rows {
            hits.push(row?);
        }
        Ok(hits)
    }
}
