//! Pipeline orchestrator
//!
//! One entry point per stage plus [`Pipeline::run_all`]. Each entry point
//! runs the compliance precondition first, then reads the previous stage's
//! durable output, so stages can be run on their own.

use crate::config::Config;
use crate::crawler::{fetch_page, Crawler, FetchResult, LinkExtractor};
use crate::download::{load_manifest, DownloadManager};
use crate::extraction::{check_binary, ExtractionPipeline};
use crate::output::{EnvironmentReport, RunSummary, SeedStatus, StageReport};
use crate::politeness::{ComplianceCheck, PolitenessGate};
use crate::state::{ErrorLedger, Stage};
use crate::storage::{classify_store_error, load_records, open_store, Persister};
use crate::{HarvestError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// External programs the extraction stage shells out to
pub const REQUIRED_TOOLS: [&str; 3] = ["pdftotext", "pdftoppm", "tesseract"];

/// Shared state for every stage of one run
pub struct Pipeline {
    config: Config,
    gate: Arc<PolitenessGate>,
    ledger: ErrorLedger,
}

impl Pipeline {
    /// Builds the pipeline and its politeness gate from configuration
    pub fn new(config: Config) -> Result<Self> {
        let gate = Arc::new(PolitenessGate::new(&config)?);
        Ok(Self::with_gate(config, gate))
    }

    pub fn with_gate(config: Config, gate: Arc<PolitenessGate>) -> Self {
        Self {
            config,
            gate,
            ledger: ErrorLedger::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &ErrorLedger {
        &self.ledger
    }

    /// Crawls from the configured seed and writes the manifest
    pub async fn run_crawl(&self, max_pages: Option<usize>) -> Result<StageReport> {
        ComplianceCheck::run(&self.config)?;
        let start = Instant::now();

        let source = LinkExtractor::new(
            Arc::clone(&self.gate),
            &self.config.site,
            self.ledger.clone(),
        );
        let crawler = Crawler::new(
            source,
            &self.config.output.manifest_path,
            self.ledger.clone(),
        );
        let outcome = crawler.run(&self.config.site.seed_url, max_pages).await?;

        Ok(StageReport::new(Stage::Crawl, start.elapsed())
            .count("pages visited", outcome.pages_visited)
            .count("links collected", outcome.manifest.total_links)
            .count("documents", outcome.manifest.documents().count())
            .with_errors(self.ledger.entries_for(Stage::Crawl)))
    }

    /// Downloads every document listed in the manifest
    pub async fn run_download(&self) -> Result<StageReport> {
        ComplianceCheck::run(&self.config)?;
        let start = Instant::now();

        let manifest = load_manifest(Path::new(&self.config.output.manifest_path))?;
        let manager = DownloadManager::new(
            Arc::clone(&self.gate),
            &self.config.output.documents_dir,
            self.config.download.max_workers,
            self.ledger.clone(),
        );
        let summary = manager.run(&manifest.links).await?;

        Ok(StageReport::new(Stage::Download, start.elapsed())
            .count("fetched", summary.fetched)
            .count("already present", summary.skipped)
            .count("failed", summary.failed)
            .with_errors(self.ledger.entries_for(Stage::Download)))
    }

    /// Extracts text from every downloaded document with the configured tools
    pub async fn run_extract(&self) -> Result<StageReport> {
        let extractor = ExtractionPipeline::from_config(&self.config.extraction, self.ledger.clone());
        self.run_extract_with(extractor).await
    }

    /// Extracts text using the given extraction pipeline
    ///
    /// The external tools block, so the work runs on the blocking pool.
    pub async fn run_extract_with(&self, extractor: ExtractionPipeline) -> Result<StageReport> {
        ComplianceCheck::run(&self.config)?;
        let start = Instant::now();

        let documents_dir = PathBuf::from(&self.config.output.documents_dir);
        let records_dir = PathBuf::from(&self.config.output.records_dir);

        let summary = tokio::task::spawn_blocking(move || {
            extractor.process_directory(&documents_dir, &records_dir)
        })
        .await
        .map_err(|e| HarvestError::Extraction {
            file: self.config.output.documents_dir.clone(),
            message: format!("extraction task failed: {}", e),
        })??;

        Ok(StageReport::new(Stage::Extract, start.elapsed())
            .count("processed", summary.processed)
            .count("text layer", summary.text_layer)
            .count("ocr", summary.ocr)
            .count("failed", summary.failed)
            .with_errors(self.ledger.entries_for(Stage::Extract)))
    }

    /// Loads every record file and writes it into the document store
    pub fn run_persist(&self) -> Result<StageReport> {
        ComplianceCheck::run(&self.config)?;
        let start = Instant::now();

        let mut store = open_store(&self.config.store)?;
        let records = load_records(Path::new(&self.config.output.records_dir), &self.ledger)?;

        let summary = Persister::new(&mut store, self.config.store.batch_size)
            .persist_all(&records)
            .map_err(|e| classify_store_error(&self.config.store.database_path, e))?;

        Ok(StageReport::new(Stage::Persist, start.elapsed())
            .count("records loaded", records.len())
            .count("inserted", summary.inserted)
            .count("updated", summary.updated)
            .count("skipped", summary.skipped)
            .with_errors(self.ledger.entries_for(Stage::Persist)))
    }

    /// Checks the extraction tools, creates the output directories and
    /// requests the seed page once through the politeness gate
    pub async fn check_environment(&self) -> Result<EnvironmentReport> {
        ComplianceCheck::run(&self.config)?;

        let tools = REQUIRED_TOOLS
            .iter()
            .map(|&name| (name, check_binary(name)))
            .collect();

        let output = &self.config.output;
        tokio::fs::create_dir_all(&output.documents_dir).await?;
        tokio::fs::create_dir_all(&output.records_dir).await?;
        if let Some(parent) = Path::new(&output.manifest_path).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let seed_url = self.config.site.seed_url.clone();
        let seed = if self.gate.admit(&seed_url).await? {
            match fetch_page(self.gate.client(), &seed_url).await {
                FetchResult::Success { status_code, .. } => SeedStatus::Reachable(status_code),
                FetchResult::HttpError { status_code } => SeedStatus::HttpError(status_code),
                FetchResult::NetworkError { error } => SeedStatus::Unreachable(error),
            }
        } else {
            SeedStatus::Disallowed
        };

        Ok(EnvironmentReport {
            tools,
            seed_url,
            seed,
        })
    }

    /// Runs every stage in order, stopping at the first fatal error
    pub async fn run_all(&self, max_pages: Option<usize>) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        summary.push(self.run_crawl(max_pages).await?);
        summary.push(self.run_download().await?);
        summary.push(self.run_extract().await?);
        summary.push(self.run_persist()?);

        tracing::info!(
            "Pipeline complete with {} recorded errors",
            summary.total_errors()
        );

        Ok(summary)
    }
}
