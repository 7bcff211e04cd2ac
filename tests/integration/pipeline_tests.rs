//! Integration tests for extraction and persistence
//!
//! Extraction runs against stub strategies so the tests do not depend on
//! Poppler or Tesseract being installed.

mod common;

use common::{config_for, mount_page, PDF_BYTES};
use normativa_harvest::extraction::{ExtractionError, ExtractionPipeline, TextExtractor};
use normativa_harvest::model::{ExtractionMethod, ExtractionRecord};
use normativa_harvest::pipeline::Pipeline;
use normativa_harvest::storage::{open_store, DocumentStore, Persister};
use normativa_harvest::HarvestError;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OCR_TEXT: &str =
    "RESOLUCIÓN NÚMERO 2020 por la cual se adoptan medidas sanitarias en establecimientos";

/// Strategy returning fixed text and counting its calls
struct Fixed {
    method: ExtractionMethod,
    text: &'static str,
    calls: Arc<AtomicUsize>,
}

impl Fixed {
    fn boxed(method: ExtractionMethod, text: &'static str) -> (Box<dyn TextExtractor>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategy = Self {
            method,
            text,
            calls: calls.clone(),
        };
        (Box::new(strategy), calls)
    }
}

impl TextExtractor for Fixed {
    fn method(&self) -> ExtractionMethod {
        self.method
    }

    fn name(&self) -> &str {
        "fixed"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn extract(&self, _pdf_path: &Path) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.to_string())
    }
}

/// Text layer that yields almost nothing, as for a scanned PDF
fn scanned_pdf_tiers(pipeline: &Pipeline) -> (ExtractionPipeline, Arc<AtomicUsize>) {
    let (text_layer, _) = Fixed::boxed(ExtractionMethod::PdfTextLayer, "  \n 1 \n ");
    let (ocr, ocr_calls) = Fixed::boxed(ExtractionMethod::Ocr, OCR_TEXT);
    let extractor = ExtractionPipeline::new(
        vec![text_layer, ocr],
        pipeline.config().extraction.min_text_chars,
        pipeline.ledger().clone(),
    );
    (extractor, ocr_calls)
}

#[tokio::test]
async fn test_end_to_end_pipeline() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());

    mount_page(&server, "/Normativa/index.aspx", &["a.aspx", "docs/doc1.pdf"]).await;
    mount_page(&server, "/Normativa/a.aspx", &[]).await;
    Mock::given(method("GET"))
        .and(path("/Normativa/docs/doc1.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PDF_BYTES))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(config.clone()).unwrap();

    let crawl = pipeline.run_crawl(None).await.unwrap();
    assert_eq!(crawl.get("links collected"), Some(2));

    let download = pipeline.run_download().await.unwrap();
    assert_eq!(download.get("fetched"), Some(1));
    assert!(Path::new(&config.output.documents_dir).join("doc1.pdf").exists());

    let (extractor, ocr_calls) = scanned_pdf_tiers(&pipeline);
    let extract = pipeline.run_extract_with(extractor).await.unwrap();
    assert_eq!(extract.get("ocr"), Some(1));
    assert_eq!(ocr_calls.load(Ordering::SeqCst), 1);

    let record_path = Path::new(&config.output.records_dir).join("record_001.json");
    let record = ExtractionRecord::load(&record_path).unwrap();
    assert_eq!(record.file, "doc1.pdf");
    assert_eq!(record.method, ExtractionMethod::Ocr);
    assert_eq!(record.text, OCR_TEXT);
    assert_eq!(record.size_bytes, PDF_BYTES.len() as u64);

    let persist = pipeline.run_persist().unwrap();
    assert_eq!(persist.get("inserted"), Some(1));

    let rerun = pipeline.run_persist().unwrap();
    assert_eq!(rerun.get("inserted"), Some(0));
    assert_eq!(rerun.get("skipped"), Some(1));

    let store = open_store(&config.store).unwrap();
    let stored = store.find_by_file("doc1.pdf").unwrap().unwrap();
    assert_eq!(stored.method, ExtractionMethod::Ocr);
    assert_eq!(stored.source_file, "record_001.json");

    let hits = store.search("sanitarias", 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].file, "doc1.pdf");
}

#[tokio::test]
async fn test_extraction_failure_writes_no_record() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());

    let documents = Path::new(&config.output.documents_dir);
    std::fs::create_dir_all(documents).unwrap();
    std::fs::write(documents.join("vacio.pdf"), PDF_BYTES).unwrap();

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let (text_layer, _) = Fixed::boxed(ExtractionMethod::PdfTextLayer, "");
    let (ocr, _) = Fixed::boxed(ExtractionMethod::Ocr, "ilegible");
    let extractor = ExtractionPipeline::new(vec![text_layer, ocr], 50, pipeline.ledger().clone());

    let report = pipeline.run_extract_with(extractor).await.unwrap();

    assert_eq!(report.get("failed"), Some(1));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].subject, "vacio.pdf");
    let records = Path::new(&config.output.records_dir);
    assert!(!records.exists() || std::fs::read_dir(records).unwrap().next().is_none());
}

#[tokio::test]
async fn test_persist_same_record_twice() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());

    let record = ExtractionRecord::new("doc1.pdf", OCR_TEXT.to_string(), ExtractionMethod::Ocr, 64);
    let batch = vec![
        ("record_001.json".to_string(), record.clone()),
        ("record_002.json".to_string(), record),
    ];

    let mut store = open_store(&config.store).unwrap();
    let summary = Persister::new(&mut store, 100).persist_all(&batch).unwrap();

    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test]
async fn test_persist_updates_changed_text() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());
    let records = Path::new(&config.output.records_dir);

    ExtractionRecord::new("doc1.pdf", "a".repeat(60), ExtractionMethod::PdfTextLayer, 10)
        .save(records, 1)
        .unwrap();

    let pipeline = Pipeline::new(config.clone()).unwrap();
    assert_eq!(pipeline.run_persist().unwrap().get("inserted"), Some(1));

    ExtractionRecord::new("doc1.pdf", "b".repeat(60), ExtractionMethod::Ocr, 10)
        .save(records, 1)
        .unwrap();

    let report = pipeline.run_persist().unwrap();
    assert_eq!(report.get("updated"), Some(1));

    let store = open_store(&config.store).unwrap();
    assert_eq!(store.count().unwrap(), 1);
    let stored = store.find_by_file("doc1.pdf").unwrap().unwrap();
    assert_eq!(stored.text, "b".repeat(60));
    assert_eq!(stored.method, ExtractionMethod::Ocr);
}

#[tokio::test]
async fn test_malformed_record_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());
    let records = Path::new(&config.output.records_dir);

    ExtractionRecord::new("doc1.pdf", OCR_TEXT.to_string(), ExtractionMethod::Ocr, 10)
        .save(records, 1)
        .unwrap();
    std::fs::write(records.join("record_002.json"), "{\"file\": ").unwrap();

    let pipeline = Pipeline::new(config).unwrap();
    let report = pipeline.run_persist().unwrap();

    assert_eq!(report.get("records loaded"), Some(1));
    assert_eq!(report.get("inserted"), Some(1));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].subject, "record_002.json");
}

#[tokio::test]
async fn test_compliance_blocks_fast_interval() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = config_for(&server, dir.path());
    config.politeness.min_request_interval_ms = 200;

    let pipeline = Pipeline::new(config).unwrap();
    let result = pipeline.run_crawl(None).await;

    assert!(matches!(
        result,
        Err(normativa_harvest::HarvestError::Compliance(_))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_locked_store_is_unavailable() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = config_for(&server, dir.path());
    config.store.busy_timeout_ms = 100;

    {
        let mut store = open_store(&config.store).unwrap();
        store.ensure_indexes().unwrap();
    }
    ExtractionRecord::new("doc1.pdf", OCR_TEXT.to_string(), ExtractionMethod::Ocr, 10)
        .save(Path::new(&config.output.records_dir), 1)
        .unwrap();

    let writer = rusqlite::Connection::open(&config.store.database_path).unwrap();
    writer.execute_batch("BEGIN IMMEDIATE").unwrap();

    let pipeline = Pipeline::new(config).unwrap();
    let err = pipeline.run_persist().unwrap_err();

    assert!(matches!(err, HarvestError::StoreUnavailable { .. }), "got {:?}", err);
    assert!(err.is_fatal());

    writer.execute_batch("ROLLBACK").unwrap();
}
