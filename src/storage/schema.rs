//! Database schema definitions
//!
//! The `documents` table is created on open. Its indexes are created
//! separately by [`ensure_indexes`] before the first write.

use rusqlite::Connection;

/// SQL for the documents table
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    text TEXT NOT NULL,
    method TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    char_count INTEGER NOT NULL,
    uploaded_at TEXT NOT NULL,
    source_file TEXT NOT NULL
);
"#;

pub const FILE_INDEX_SQL: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_documents_file ON documents(file);";

pub const TIMESTAMP_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_documents_timestamp ON documents(timestamp);";

/// External-content FTS5 index over `documents.text`, kept in sync by triggers
pub const FULL_TEXT_SQL: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS documents_fts USING fts5(
    text,
    content='documents',
    content_rowid='id'
);

CREATE TRIGGER IF NOT EXISTS documents_fts_insert AFTER INSERT ON documents BEGIN
    INSERT INTO documents_fts(rowid, text) VALUES (new.id, new.text);
END;

CREATE TRIGGER IF NOT EXISTS documents_fts_delete AFTER DELETE ON documents BEGIN
    INSERT INTO documents_fts(documents_fts, rowid, text) VALUES ('delete', old.id, old.text);
END;

CREATE TRIGGER IF NOT EXISTS documents_fts_update AFTER UPDATE ON documents BEGIN
    INSERT INTO documents_fts(documents_fts, rowid, text) VALUES ('delete', old.id, old.text);
    INSERT INTO documents_fts(rowid, text) VALUES (new.id, new.text);
END;
"#;

/// Initializes the documents table
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Whether a table (or virtual table) exists
pub fn table_exists(conn: &Connection, name: &str) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Creates every index, attempting all of them
///
/// Returns the name and error of each index that could not be created.
pub fn ensure_indexes(conn: &Connection) -> Vec<(&'static str, rusqlite::Error)> {
    let mut failures = Vec::new();

    for (name, sql) in [
        ("file (unique)", FILE_INDEX_SQL),
        ("timestamp", TIMESTAMP_INDEX_SQL),
    ] {
        if let Err(e) = conn.execute_batch(sql) {
            failures.push((name, e));
        }
    }

    if let Err(e) = ensure_full_text(conn) {
        failures.push(("text (full-text)", e));
    }

    failures
}

fn ensure_full_text(conn: &Connection) -> Result<(), rusqlite::Error> {
    let existed = table_exists(conn, "documents_fts")?;
    conn.execute_batch(FULL_TEXT_SQL)?;
    if !existed {
        // Index rows written before the full-text table existed
        conn.execute_batch("INSERT INTO documents_fts(documents_fts) VALUES ('rebuild');")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
        assert!(table_exists(&conn, "documents").unwrap());
    }

    #[test]
    fn test_indexes_created_and_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        assert!(ensure_indexes(&conn).is_empty());
        assert!(ensure_indexes(&conn).is_empty());
        assert!(table_exists(&conn, "documents_fts").unwrap());

        let indexes: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_documents_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 2);
    }

    #[test]
    fn test_unique_index_failure_is_reported_not_fatal() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        for _ in 0..2 {
            conn.execute(
                "INSERT INTO documents (file, timestamp, text, method, size_bytes, char_count, uploaded_at, source_file)
                 VALUES ('dup.pdf', 't', 'x', 'OCR', 1, 1, 't', 'r')",
                [],
            )
            .unwrap();
        }

        let failures = ensure_indexes(&conn);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "file (unique)");
        assert!(table_exists(&conn, "documents_fts").unwrap());
    }

    #[test]
    fn test_rebuild_indexes_existing_rows() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO documents (file, timestamp, text, method, size_bytes, char_count, uploaded_at, source_file)
             VALUES ('a.pdf', 't', 'resolución sanitaria', 'OCR', 1, 1, 't', 'r')",
            [],
        )
        .unwrap();

        ensure_indexes(&conn);

        let hits: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM documents_fts WHERE documents_fts MATCH 'sanitaria'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(hits, 1);
    }
}
