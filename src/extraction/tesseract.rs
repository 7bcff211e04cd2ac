use super::strategy::{
    check_binary, check_cmd_status, handle_cmd_output, ExtractionError, TextExtractor,
};
use crate::config::ExtractionConfig;
use crate::model::ExtractionMethod;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// OCR of rendered pages: `pdftoppm` to PNG, then `tesseract` per page
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    language: String,
    extra_args: Vec<String>,
    dpi: u32,
}

impl TesseractOcr {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            language: config.ocr_language.clone(),
            extra_args: config.ocr_args.clone(),
            dpi: config.render_dpi,
        }
    }

    /// Renders every page into `output_dir`, returning the images in page order
    fn render_pages(&self, pdf_path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
        let dpi = self.dpi.to_string();
        let status = Command::new("pdftoppm")
            .args(["-png", "-r", &dpi])
            .arg(pdf_path)
            .arg(output_dir.join("page"))
            .status();

        check_cmd_status(
            status,
            "pdftoppm (install poppler-utils)",
            "pdftoppm failed to render PDF pages",
        )?;

        // pdftoppm pads page numbers to the width of the last one, so a
        // lexical sort is page order
        let mut images: Vec<PathBuf> = std::fs::read_dir(output_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("png"))
            .collect();
        images.sort();

        if images.is_empty() {
            return Err(ExtractionError::ExtractionFailed(
                "pdftoppm produced no page images".to_string(),
            ));
        }

        Ok(images)
    }

    fn run_tesseract(&self, image_path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .args(&self.extra_args)
            .output();

        handle_cmd_output(output, "tesseract (install tesseract-ocr)", "tesseract failed")
    }
}

/// Joins per-page OCR output, marking each page and dropping blank ones
pub(crate) fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| format!("--- Page {} ---\n{}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl TextExtractor for TesseractOcr {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Ocr
    }

    fn name(&self) -> &str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract") && check_binary("pdftoppm")
    }

    fn extract(&self, pdf_path: &Path) -> Result<String, ExtractionError> {
        let temp_dir = TempDir::new()?;
        let images = self.render_pages(pdf_path, temp_dir.path())?;

        let mut pages = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            match self.run_tesseract(image) {
                Ok(text) => pages.push(text),
                Err(e @ ExtractionError::ToolNotFound(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!("OCR failed on page {} of {}: {}", i + 1, pdf_path.display(), e);
                    pages.push(String::new());
                }
            }
        }

        Ok(join_pages(&pages))
    }
}
