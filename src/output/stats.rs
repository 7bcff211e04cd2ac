//! Statistics and inspection output for the document store
//!
//! This module provides functionality for extracting and displaying
//! document store contents: counts, search results, single documents.

use crate::model::ExtractionMethod;
use crate::storage::{DocumentStore, SearchHit, StorageResult, StoredDocument};

/// Characters of text shown in previews
const PREVIEW_CHARS: usize = 200;

/// Document store statistics summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Total number of stored documents
    pub total_documents: u64,

    /// Count of documents by extraction method, largest first
    pub by_method: Vec<(ExtractionMethod, u64)>,

    /// First documents by file name
    pub sample: Vec<StoredDocument>,
}

/// Loads statistics from the store
///
/// # Arguments
///
/// * `store` - The store to query
/// * `sample_size` - How many documents to include as a preview
pub fn load_statistics(
    store: &dyn DocumentStore,
    sample_size: usize,
) -> StorageResult<StoreStatistics> {
    Ok(StoreStatistics {
        total_documents: store.count()?,
        by_method: store.count_by_method()?,
        sample: store.list(sample_size)?,
    })
}

/// Formats statistics for the terminal
pub fn format_statistics(stats: &StoreStatistics) -> String {
    let mut out = String::new();

    out.push_str("=== Document Store Statistics ===\n\n");
    out.push_str(&format!("Total documents: {}\n", stats.total_documents));
    out.push('\n');

    if !stats.by_method.is_empty() {
        out.push_str("By extraction method:\n");
        for (method, count) in &stats.by_method {
            let percentage = if stats.total_documents > 0 {
                (*count as f64 / stats.total_documents as f64) * 100.0
            } else {
                0.0
            };
            out.push_str(&format!("  {}: {} ({:.1}%)\n", method, count, percentage));
        }
        out.push('\n');
    }

    if !stats.sample.is_empty() {
        out.push_str("Documents:\n");
        for doc in &stats.sample {
            out.push_str(&format!(
                "  - {} [{}] {} chars, {} bytes\n",
                doc.file, doc.method, doc.char_count, doc.size_bytes
            ));
        }
    }

    out
}

pub fn print_statistics(stats: &StoreStatistics) {
    print!("{}", format_statistics(stats));
}

/// Formats full-text search results
pub fn format_search_hits(term: &str, hits: &[SearchHit]) -> String {
    let mut out = String::new();

    if hits.is_empty() {
        out.push_str(&format!("No documents match '{}'\n", term));
        return out;
    }

    out.push_str(&format!("{} documents match '{}':\n\n", hits.len(), term));
    for (rank, hit) in hits.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} [{}] score {:.3}\n",
            rank + 1,
            hit.file,
            hit.method,
            hit.score
        ));
        out.push_str(&format!("   {}\n", hit.snippet.replace('\n', " ")));
    }

    out
}

pub fn print_search_hits(term: &str, hits: &[SearchHit]) {
    print!("{}", format_search_hits(term, hits));
}

/// Formats one stored document with a text preview
pub fn format_document(doc: &StoredDocument) -> String {
    let mut out = String::new();

    out.push_str(&format!("File:        {}\n", doc.file));
    out.push_str(&format!("Method:      {}\n", doc.method));
    out.push_str(&format!("Extracted:   {}\n", doc.timestamp.to_rfc3339()));
    out.push_str(&format!("Uploaded:    {}\n", doc.uploaded_at.to_rfc3339()));
    out.push_str(&format!("Record:      {}\n", doc.source_file));
    out.push_str(&format!("Size:        {} bytes\n", doc.size_bytes));
    out.push_str(&format!("Characters:  {}\n", doc.char_count));
    out.push('\n');

    let preview: String = doc.text.chars().take(PREVIEW_CHARS).collect();
    out.push_str(&preview);
    if doc.char_count > PREVIEW_CHARS {
        out.push_str("...");
    }
    out.push('\n');

    out
}

pub fn print_document(doc: &StoredDocument) {
    print!("{}", format_document(doc));
}
