//! Text extraction from downloaded PDFs
//!
//! Extraction is an ordered list of [`TextExtractor`] strategies. The
//! default order is the embedded text layer (`pdftotext`) followed by OCR
//! of rendered pages (`pdftoppm` + `tesseract`).

mod pdftotext;
mod pipeline;
mod strategy;
mod tesseract;

pub use pdftotext::PdfTextLayer;
pub use pipeline::{ExtractSummary, ExtractionOutcome, ExtractionPipeline};
pub use strategy::{check_binary, ExtractionError, TextExtractor};
pub use tesseract::TesseractOcr;
