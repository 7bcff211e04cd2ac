use super::strategy::{check_binary, handle_cmd_output, ExtractionError, TextExtractor};
use crate::model::ExtractionMethod;
use std::path::Path;
use std::process::Command;

/// Reads the PDF's embedded text layer with Poppler's `pdftotext`
#[derive(Debug, Default, Clone)]
pub struct PdfTextLayer;

impl PdfTextLayer {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextLayer {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::PdfTextLayer
    }

    fn name(&self) -> &str {
        "pdftotext"
    }

    fn is_available(&self) -> bool {
        check_binary("pdftotext")
    }

    fn extract(&self, pdf_path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new("pdftotext")
            .args(["-enc", "UTF-8"])
            .arg(pdf_path)
            .arg("-") // Output to stdout
            .output();

        handle_cmd_output(output, "pdftotext (install poppler-utils)", "pdftotext failed")
    }
}
