//! Persistence stage
//!
//! Loads extraction records from disk and writes them into a
//! [`DocumentStore`], deciding insert / update / skip by `file`.

use crate::model::{ExtractionMethod, ExtractionRecord};
use crate::state::{ErrorLedger, Stage};
use crate::storage::traits::{DocumentStore, NewDocument, StorageResult};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Outcome counts of one persistence run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Writes extraction records into a document store in batches
pub struct Persister<'a, S: DocumentStore> {
    store: &'a mut S,
    batch_size: usize,
}

impl<'a, S: DocumentStore> Persister<'a, S> {
    pub fn new(store: &'a mut S, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Persists `(source_file, record)` pairs
    ///
    /// Index creation failures are logged and do not stop the run. A store
    /// error while writing aborts the run; batches flushed before it stay
    /// committed.
    pub fn persist_all(
        &mut self,
        records: &[(String, ExtractionRecord)],
    ) -> StorageResult<PersistSummary> {
        if let Err(e) = self.store.ensure_indexes() {
            tracing::warn!("Continuing without full index set: {}", e);
        }

        let mut summary = PersistSummary::default();
        let mut pending: Vec<NewDocument> = Vec::new();
        let mut pending_by_file: HashMap<String, usize> = HashMap::new();

        for (source_file, record) in records {
            if record.method == ExtractionMethod::Failed {
                tracing::debug!("Not persisting failed record {}", source_file);
                continue;
            }

            let incoming = NewDocument::from_record(record, source_file);

            if let Some(&slot) = pending_by_file.get(&record.file) {
                if pending[slot].text == incoming.text {
                    summary.skipped += 1;
                } else {
                    pending[slot] = incoming;
                    summary.updated += 1;
                }
                continue;
            }

            match self.store.find_by_file(&record.file)? {
                None => {
                    pending_by_file.insert(record.file.clone(), pending.len());
                    pending.push(incoming);

                    if pending.len() >= self.batch_size {
                        summary.inserted += self.flush(&mut pending)?;
                        pending_by_file.clear();
                    }
                }
                Some(existing) if existing.text == incoming.text => {
                    tracing::debug!("{} unchanged, skipping", record.file);
                    summary.skipped += 1;
                }
                Some(existing) => {
                    self.store.replace(existing.id, &incoming)?;
                    tracing::info!("Updated {} (text changed)", record.file);
                    summary.updated += 1;
                }
            }
        }

        if !pending.is_empty() {
            summary.inserted += self.flush(&mut pending)?;
        }

        tracing::info!(
            "Persistence finished: {} inserted, {} updated, {} skipped",
            summary.inserted,
            summary.updated,
            summary.skipped
        );

        Ok(summary)
    }

    fn flush(&mut self, pending: &mut Vec<NewDocument>) -> StorageResult<usize> {
        let written = self.store.insert_many(pending)?;
        tracing::info!("Inserted batch of {} documents", written);
        pending.clear();
        Ok(written)
    }
}

/// Reads every `record_*.json` in `dir`, sorted by name
///
/// Unreadable or malformed files are recorded in the ledger and skipped.
/// A missing directory yields no records.
pub fn load_records(
    dir: &Path,
    ledger: &ErrorLedger,
) -> std::io::Result<Vec<(String, ExtractionRecord)>> {
    if !dir.exists() {
        tracing::warn!("Records directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with("record_") && name.ends_with(".json"))
        .collect();
    names.sort();

    let mut records = Vec::with_capacity(names.len());
    for name in names {
        match ExtractionRecord::load(&dir.join(&name)) {
            Ok(record) => records.push((name, record)),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", name, e);
                ledger.record(Stage::Persist, &name, e.to_string());
            }
        }
    }

    tracing::info!("Loaded {} records from {}", records.len(), dir.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteDocumentStore;
    use tempfile::TempDir;

    fn record(file: &str, text: &str) -> (String, ExtractionRecord) {
        (
            "record_001.json".to_string(),
            ExtractionRecord::new(file, text.to_string(), ExtractionMethod::Ocr, 100),
        )
    }

    fn store() -> SqliteDocumentStore {
        SqliteDocumentStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_same_record_twice_in_one_run() {
        let mut store = store();
        let mut persister = Persister::new(&mut store, 100);

        let rec = record("doc1.pdf", "Resolución sobre dispositivos médicos");
        let summary = persister.persist_all(&[rec.clone(), rec]).unwrap();

        assert_eq!(
            summary,
            PersistSummary {
                inserted: 1,
                updated: 0,
                skipped: 1
            }
        );
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_rerun_skips_everything() {
        let mut store = store();
        let records = vec![record("a.pdf", "uno"), record("b.pdf", "dos")];

        Persister::new(&mut store, 100)
            .persist_all(&records)
            .unwrap();
        let second = Persister::new(&mut store, 100)
            .persist_all(&records)
            .unwrap();

        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_changed_text_replaces_document() {
        let mut store = store();
        Persister::new(&mut store, 100)
            .persist_all(&[record("a.pdf", "versión uno")])
            .unwrap();

        let summary = Persister::new(&mut store, 100)
            .persist_all(&[record("a.pdf", "versión dos")])
            .unwrap();

        assert_eq!(summary.updated, 1);
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.find_by_file("a.pdf").unwrap().unwrap().text, "versión dos");
    }

    #[test]
    fn test_pending_copy_replaced_before_flush() {
        let mut store = store();
        let summary = Persister::new(&mut store, 100)
            .persist_all(&[record("a.pdf", "borrador"), record("a.pdf", "final")])
            .unwrap();

        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(store.find_by_file("a.pdf").unwrap().unwrap().text, "final");
    }

    #[test]
    fn test_batches_flush_at_batch_size() {
        let mut store = store();
        let records: Vec<_> = (0..5)
            .map(|i| record(&format!("doc{}.pdf", i), &format!("texto {}", i)))
            .collect();

        let summary = Persister::new(&mut store, 2)
            .persist_all(&records)
            .unwrap();

        assert_eq!(summary.inserted, 5);
        assert_eq!(store.count().unwrap(), 5);
    }

    #[test]
    fn test_failed_records_never_written() {
        let mut store = store();
        let failed = (
            "record_009.json".to_string(),
            ExtractionRecord::new("bad.pdf", String::new(), ExtractionMethod::Failed, 10),
        );

        let summary = Persister::new(&mut store, 100)
            .persist_all(&[failed])
            .unwrap();

        assert_eq!(summary, PersistSummary::default());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_load_records_sorted_and_malformed_recorded() {
        let dir = TempDir::new().unwrap();
        ExtractionRecord::new("b.pdf", "b".repeat(60), ExtractionMethod::Ocr, 1)
            .save(dir.path(), 2)
            .unwrap();
        ExtractionRecord::new("a.pdf", "a".repeat(60), ExtractionMethod::PdfTextLayer, 1)
            .save(dir.path(), 1)
            .unwrap();
        fs::write(dir.path().join("record_003.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let ledger = ErrorLedger::new();
        let records = load_records(dir.path(), &ledger).unwrap();

        let names: Vec<&str> = records.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["record_001.json", "record_002.json"]);
        assert_eq!(records[0].1.file, "a.pdf");
        assert_eq!(ledger.count_for(Stage::Persist), 1);
    }

    #[test]
    fn test_load_records_missing_dir() {
        let dir = TempDir::new().unwrap();
        let records = load_records(&dir.path().join("absent"), &ErrorLedger::new()).unwrap();
        assert!(records.is_empty());
    }
}
