//! Append-only audit trail of checked requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One audit line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub action: String,
    pub outcome: String,
    pub user_agent: String,
}

/// JSON-lines audit log
///
/// Writes are best effort: a failure is logged and the caller carries on.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    user_agent: String,
    write_lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>, user_agent: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            user_agent: user_agent.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, url: &str, action: &str, outcome: &str) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            url: url.to_string(),
            action: action.to_string(),
            outcome: outcome.to_string(),
            user_agent: self.user_agent.clone(),
        };

        if let Err(e) = self.append(&entry) {
            tracing::warn!("Failed to write audit log {}: {}", self.path.display(), e);
        }
    }

    fn append(&self, entry: &AuditEntry) -> std::io::Result<()> {
        let line = serde_json::to_string(entry)?;
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }

    /// Reads every entry back, skipping lines that do not parse
    pub fn read_entries(&self) -> std::io::Result<Vec<AuditEntry>> {
        let content = fs::read_to_string(&self.path)?;
        Ok(content
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }
}
