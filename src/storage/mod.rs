//! Storage module for the persistence stage
//!
//! This module handles all document store operations, including:
//! - SQLite database initialization and schema management
//! - Unique, timestamp and full-text indexes
//! - Insert / update / skip decisions keyed by source filename
//! - Store inspection (counts, listing, full-text search)

mod persist;
mod schema;
mod sqlite;
mod traits;

pub use persist::{load_records, PersistSummary, Persister};
pub use sqlite::SqliteDocumentStore;
pub use traits::{
    DocumentStore, NewDocument, SearchHit, StorageError, StorageResult, StoredDocument,
};

use crate::config::StoreConfig;
use crate::HarvestError;
use std::path::Path;
use std::time::Duration;

/// Opens the configured document store
///
/// # Returns
///
/// * `Ok(SqliteDocumentStore)` - Store reachable and schema in place
/// * `Err(HarvestError::StoreUnavailable)` - Store could not be opened
pub fn open_store(config: &StoreConfig) -> Result<SqliteDocumentStore, HarvestError> {
    SqliteDocumentStore::open(
        Path::new(&config.database_path),
        Duration::from_millis(config.busy_timeout_ms),
    )
}

/// Converts a storage failure, reporting busy or locked stores as
/// [`HarvestError::StoreUnavailable`]
pub fn classify_store_error(location: &str, err: StorageError) -> HarvestError {
    if err.is_unavailable() {
        HarvestError::StoreUnavailable {
            location: location.to_string(),
            reason: err.to_string(),
        }
    } else {
        HarvestError::Storage(err)
    }
}
