use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::HarvestError;

/// Which extraction tier produced a record's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionMethod {
    /// Embedded text layer of the PDF
    PdfTextLayer,

    /// Rendered page images run through OCR
    Ocr,

    /// Every tier was exhausted
    Failed,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PdfTextLayer => "PDF_TEXT_LAYER",
            Self::Ocr => "OCR",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PDF_TEXT_LAYER" => Some(Self::PdfTextLayer),
            "OCR" => Some(Self::Ocr),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text extracted from one downloaded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Local filename of the source document (the deduplication key)
    pub file: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub method: ExtractionMethod,
    pub size_bytes: u64,
    pub char_count: usize,
}

impl ExtractionRecord {
    pub fn new(file: impl Into<String>, text: String, method: ExtractionMethod, size_bytes: u64) -> Self {
        let char_count = text.chars().count();
        Self {
            file: file.into(),
            timestamp: Utc::now(),
            text,
            method,
            size_bytes,
            char_count,
        }
    }

    /// Name of the record artifact for a 1-based sequence number
    pub fn artifact_name(sequence: usize) -> String {
        format!("record_{:03}.json", sequence)
    }

    /// Writes the record as `record_NNN.json` inside `dir`
    pub fn save(&self, dir: &Path, sequence: usize) -> Result<PathBuf, HarvestError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::artifact_name(sequence));
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self, HarvestError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
