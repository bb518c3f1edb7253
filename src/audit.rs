use crate::error::{DeepSignalError, Result};
use crate::types::report::AnalysisReport;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// One persisted scoring step. `prev_hash` is the SHA-256 of the previous line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: String,
    pub candidate_id: String,
    pub metric: String,
    pub raw_score: f64,
    pub weight: f64,
    pub weighted: f64,
    pub evidence: String,
    pub prev_hash: String,
}

/// Append-only JSON-lines trail of score traces. Existing lines are never rewritten.
pub struct AuditLog {
    path: PathBuf,
    last_hash: String,
}

impl AuditLog {
    pub fn open(path: &Path) -> Result<Self> {
        let last_hash = match fs::read_to_string(path) {
            Ok(content) => content
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .map_or_else(|| GENESIS_HASH.to_string(), |line| sha256_hex(line.as_bytes())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => GENESIS_HASH.to_string(),
            Err(error) => return Err(DeepSignalError::Io(error)),
        };

        Ok(Self {
            path: path.to_path_buf(),
            last_hash,
        })
    }

    /// Appends one line per trace row of `report`; returns how many were written.
    pub fn record(&mut self, report: &AnalysisReport) -> Result<usize> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let timestamp = report.generated_at.to_rfc3339();
        for trace in &report.trace {
            let entry = AuditEntry {
                timestamp: timestamp.clone(),
                candidate_id: report.candidate_id.clone(),
                metric: trace.metric.clone(),
                raw_score: trace.raw_score,
                weight: trace.weight,
                weighted: trace.weighted,
                evidence: trace.evidence.clone(),
                prev_hash: self.last_hash.clone(),
            };
            let line = serde_json::to_string(&entry)?;
            writeln!(file, "{line}")?;
            self.last_hash = sha256_hex(line.as_bytes());
        }
        file.flush()?;

        debug!(
            path = %self.path.display(),
            entries = report.trace.len(),
            "audit entries appended"
        );
        Ok(report.trace.len())
    }
}

/// Checks every line's `prev_hash` against its predecessor. Returns the entry count.
pub fn verify_chain(path: &Path) -> Result<usize> {
    let content = fs::read_to_string(path)?;
    let mut expected = GENESIS_HASH.to_string();
    let mut count = 0;

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry: AuditEntry = serde_json::from_str(line)?;
        if entry.prev_hash != expected {
            return Err(DeepSignalError::AuditChain(index + 1));
        }
        expected = sha256_hex(line.as_bytes());
        count += 1;
    }
    Ok(count)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}
