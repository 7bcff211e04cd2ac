use super::{PdfTextLayer, TesseractOcr, TextExtractor};
use crate::config::ExtractionConfig;
use crate::model::{ExtractionMethod, ExtractionRecord};
use crate::politeness::warn_on_personal_data;
use crate::state::{ErrorLedger, Stage};
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Text produced for one document, or `None` with method FAILED
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub text: Option<String>,
    pub method: ExtractionMethod,
}

impl ExtractionOutcome {
    fn failed() -> Self {
        Self {
            text: None,
            method: ExtractionMethod::Failed,
        }
    }
}

/// Counts from one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub processed: usize,
    pub text_layer: usize,
    pub ocr: usize,
    pub failed: usize,
    /// Record files written, in sequence order
    pub records: Vec<PathBuf>,
}

impl ExtractSummary {
    pub fn extracted(&self) -> usize {
        self.text_layer + self.ocr
    }
}

struct Tier {
    extractor: Box<dyn TextExtractor>,
    available: bool,
}

/// Ordered extraction strategies with a shared acceptance threshold
pub struct ExtractionPipeline {
    tiers: Vec<Tier>,
    min_chars: usize,
    ledger: ErrorLedger,
}

impl ExtractionPipeline {
    /// Builds a pipeline over `strategies`, tried in the given order
    ///
    /// Availability is probed once here; unavailable tiers are skipped.
    pub fn new(strategies: Vec<Box<dyn TextExtractor>>, min_chars: usize, ledger: ErrorLedger) -> Self {
        let tiers = strategies
            .into_iter()
            .map(|extractor| {
                let available = extractor.is_available();
                if !available {
                    tracing::warn!("Extraction tier '{}' is not available", extractor.name());
                }
                Tier {
                    extractor,
                    available,
                }
            })
            .collect();

        Self {
            tiers,
            min_chars,
            ledger,
        }
    }

    /// Text layer first, then OCR
    pub fn from_config(config: &ExtractionConfig, ledger: ErrorLedger) -> Self {
        Self::new(
            vec![
                Box::new(PdfTextLayer::new()),
                Box::new(TesseractOcr::new(config)),
            ],
            config.min_text_chars,
            ledger,
        )
    }

    /// Tries each tier in order and keeps the first acceptable text
    ///
    /// Text is accepted when, after trimming, it is longer than the
    /// configured minimum (in characters).
    pub fn extract_text(&self, pdf_path: &Path) -> ExtractionOutcome {
        for tier in self.tiers.iter().filter(|t| t.available) {
            let name = tier.extractor.name();
            match tier.extractor.extract(pdf_path) {
                Ok(raw) => {
                    let text = raw.trim();
                    let chars = text.chars().count();
                    if chars > self.min_chars {
                        return ExtractionOutcome {
                            text: Some(text.to_string()),
                            method: tier.extractor.method(),
                        };
                    }
                    tracing::debug!(
                        "{} produced {} characters for {}, trying next tier",
                        name,
                        chars,
                        pdf_path.display()
                    );
                }
                Err(e) => {
                    tracing::debug!("{} failed on {}: {}", name, pdf_path.display(), e);
                }
            }
        }

        ExtractionOutcome::failed()
    }

    /// Extracts every PDF in `documents_dir` into `records_dir`
    ///
    /// Files are processed in name order and numbered from 1; each success
    /// is written as `record_NNN.json`. Failures are recorded and skipped.
    pub fn process_directory(&self, documents_dir: &Path, records_dir: &Path) -> Result<ExtractSummary> {
        let documents = list_documents(documents_dir)?;
        let mut summary = ExtractSummary::default();

        if documents.is_empty() {
            tracing::info!("No PDF files to process in {}", documents_dir.display());
            return Ok(summary);
        }

        tracing::info!("Extracting text from {} PDFs", documents.len());
        fs::create_dir_all(records_dir)?;

        for (index, path) in documents.iter().enumerate() {
            let sequence = index + 1;
            let file = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            summary.processed += 1;

            tracing::info!("[{}/{}] {}", sequence, documents.len(), file);

            match self.process_one(path, &file, records_dir, sequence) {
                Ok(Some((record_path, method))) => {
                    match method {
                        ExtractionMethod::PdfTextLayer => summary.text_layer += 1,
                        ExtractionMethod::Ocr => summary.ocr += 1,
                        ExtractionMethod::Failed => {}
                    }
                    summary.records.push(record_path);
                }
                Ok(None) => {
                    tracing::warn!("Could not extract text from {}", file);
                    self.ledger.record(
                        Stage::Extract,
                        &file,
                        format!("no tier produced more than {} characters", self.min_chars),
                    );
                    summary.failed += 1;
                }
                Err(e) => {
                    tracing::error!("Error processing {}: {}", file, e);
                    self.ledger.record(Stage::Extract, &file, e.to_string());
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            "Extraction finished: {} text layer, {} OCR, {} failed",
            summary.text_layer,
            summary.ocr,
            summary.failed
        );

        Ok(summary)
    }

    fn process_one(
        &self,
        path: &Path,
        file: &str,
        records_dir: &Path,
        sequence: usize,
    ) -> Result<Option<(PathBuf, ExtractionMethod)>> {
        let size_bytes = fs::metadata(path)?.len();
        let outcome = self.extract_text(path);

        let Some(text) = outcome.text else {
            return Ok(None);
        };

        warn_on_personal_data(file, &text);

        let record = ExtractionRecord::new(file, text, outcome.method, size_bytes);
        let record_path = record.save(records_dir, sequence)?;
        tracing::info!(
            "Saved {} ({}, {} chars)",
            record_path.display(),
            record.method,
            record.char_count
        );

        Ok(Some((record_path, outcome.method)))
    }
}

/// Lists `*.pdf` files (any case) in `dir`, sorted by name
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut documents: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    documents.sort();
    Ok(documents)
}
