use crate::crawler::classify_error;
use crate::model::Link;
use crate::politeness::PolitenessGate;
use crate::state::{ErrorLedger, Stage};
use crate::url::document_filename;
use crate::{HarvestError, Result};
use futures_util::StreamExt;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Semaphore;

/// Counts from one download run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Every document now present locally, fetched or skipped
    pub paths: Vec<PathBuf>,
    /// Documents fetched over the network in this run
    pub fetched: usize,
    /// Documents already on disk
    pub skipped: usize,
    /// Documents that failed or were disallowed
    pub failed: usize,
}

/// What happened to one link
enum Outcome {
    Fetched(PathBuf, u64),
    AlreadyPresent(PathBuf),
    Disallowed,
}

/// Bounded pool of document downloads
pub struct DownloadManager {
    gate: Arc<PolitenessGate>,
    documents_dir: PathBuf,
    semaphore: Arc<Semaphore>,
    ledger: ErrorLedger,
}

impl DownloadManager {
    pub fn new(
        gate: Arc<PolitenessGate>,
        documents_dir: impl Into<PathBuf>,
        max_workers: usize,
        ledger: ErrorLedger,
    ) -> Self {
        Self {
            gate,
            documents_dir: documents_dir.into(),
            semaphore: Arc::new(Semaphore::new(max_workers.max(1))),
            ledger,
        }
    }

    /// Downloads every document link and returns the stored paths
    pub async fn download_all(&self, links: &[Link]) -> Result<Vec<PathBuf>> {
        Ok(self.run(links).await?.paths)
    }

    /// Downloads every document link, reporting fetched/skipped/failed counts
    ///
    /// Page links are ignored. A failing link is recorded in the ledger and
    /// left out of the result; its siblings carry on. A policy violation is
    /// returned once every task has finished.
    pub async fn run(&self, links: &[Link]) -> Result<DownloadSummary> {
        fs::create_dir_all(&self.documents_dir).await?;

        let mut names = HashSet::new();
        let documents: Vec<Link> = links
            .iter()
            .filter(|link| link.is_document())
            .filter(|link| {
                let fresh = names.insert(document_filename(&link.url));
                if !fresh {
                    tracing::debug!("Skipping {}: filename already claimed", link.url);
                }
                fresh
            })
            .cloned()
            .collect();

        tracing::info!(
            "Downloading {} documents into {}",
            documents.len(),
            self.documents_dir.display()
        );

        let mut handles = Vec::with_capacity(documents.len());
        for link in documents {
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| HarvestError::Fetch {
                    url: link.url.clone(),
                    message: format!("worker pool closed: {}", e),
                })?;

            let gate = Arc::clone(&self.gate);
            let dir = self.documents_dir.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let result = download_one(&gate, &link, &dir).await;
                (link, result)
            }));
        }

        let mut summary = DownloadSummary::default();
        let mut fatal = None;

        for handle in handles {
            let (link, result) = match handle.await {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!("Download task panicked: {}", e);
                    summary.failed += 1;
                    continue;
                }
            };

            match result {
                Ok(Outcome::Fetched(path, bytes)) => {
                    tracing::info!("Downloaded {} ({} bytes)", path.display(), bytes);
                    summary.fetched += 1;
                    summary.paths.push(path);
                }
                Ok(Outcome::AlreadyPresent(path)) => {
                    tracing::debug!("Already present: {}", path.display());
                    summary.skipped += 1;
                    summary.paths.push(path);
                }
                Ok(Outcome::Disallowed) => {
                    tracing::warn!("Skipping {}: disallowed by robots.txt", link.url);
                    self.ledger
                        .record(Stage::Download, &link.url, "disallowed by robots.txt");
                    summary.failed += 1;
                }
                Err(e) if e.is_fatal() => {
                    summary.failed += 1;
                    fatal.get_or_insert(e);
                }
                Err(e) => {
                    tracing::warn!("Failed to download {}: {}", link.url, e);
                    self.ledger.record(Stage::Download, &link.url, e.to_string());
                    summary.failed += 1;
                }
            }
        }

        if let Some(e) = fatal {
            return Err(e);
        }

        tracing::info!(
            "Downloads finished: {} fetched, {} already present, {} failed",
            summary.fetched,
            summary.skipped,
            summary.failed
        );

        Ok(summary)
    }
}

/// Materializes one document, skipping the network if it is already on disk
async fn download_one(gate: &PolitenessGate, link: &Link, dir: &Path) -> Result<Outcome> {
    let name = document_filename(&link.url);
    let destination = dir.join(&name);

    if fs::metadata(&destination).await.is_ok() {
        return Ok(Outcome::AlreadyPresent(destination));
    }

    if !gate.admit(&link.url).await? {
        return Ok(Outcome::Disallowed);
    }

    let response = gate
        .client()
        .get(&link.url)
        .send()
        .await
        .map_err(|e| HarvestError::Fetch {
            url: link.url.clone(),
            message: classify_error(&e),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::Fetch {
            url: link.url.clone(),
            message: format!("HTTP {}", status.as_u16()),
        });
    }

    let partial = dir.join(format!("{}.part", name));
    let mut file = File::create(&partial).await?;

    let bytes = match stream_to_file(&mut file, response, &link.url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&partial).await {
                tracing::debug!("Could not remove {}: {}", partial.display(), cleanup);
            }
            return Err(e);
        }
    };
    drop(file);

    fs::rename(&partial, &destination).await?;
    Ok(Outcome::Fetched(destination, bytes))
}

/// Streams the response body to `file` chunk by chunk, returning bytes written
async fn stream_to_file(file: &mut File, response: reqwest::Response, url: &str) -> Result<u64> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| HarvestError::Fetch {
            url: url.to_string(),
            message: format!("Body interrupted: {}", e),
        })?;
        writer.write_all(&chunk).await?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await?;
    Ok(bytes_written)
}
