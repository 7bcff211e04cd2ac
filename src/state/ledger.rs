use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Pipeline stage a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Crawl,
    Download,
    Extract,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Crawl => "crawl",
            Self::Download => "download",
            Self::Extract => "extract",
            Self::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// One recorded per-item failure
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub stage: Stage,
    /// URL or filename the failure concerns
    pub subject: String,
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.subject, self.message)
    }
}

/// Run-level, append-only list of per-item failures
///
/// Cloning shares the same underlying list, so every stage and every
/// download worker can record into one ledger.
#[derive(Debug, Clone, Default)]
pub struct ErrorLedger {
    entries: Arc<Mutex<Vec<LedgerEntry>>>,
}

impl ErrorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LedgerEntry>> {
        // A panic while holding the lock cannot leave a half-pushed entry
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, stage: Stage, subject: impl Into<String>, message: impl Into<String>) {
        self.lock().push(LedgerEntry {
            stage,
            subject: subject.into(),
            message: message.into(),
            recorded_at: Utc::now(),
        });
    }

    /// Copy of every entry, in recording order
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Entries recorded by one stage, in recording order
    pub fn entries_for(&self, stage: Stage) -> Vec<LedgerEntry> {
        self.lock()
            .iter()
            .filter(|e| e.stage == stage)
            .cloned()
            .collect()
    }

    pub fn count_for(&self, stage: Stage) -> usize {
        self.lock().iter().filter(|e| e.stage == stage).count()
    }
}
