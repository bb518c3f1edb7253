use crate::error::{DeepSignalError, Result};
use crate::orchestrator::Orchestrator;
use crate::types::candidate::CandidateProfile;
use crate::types::report::AnalysisReport;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: Result<AnalysisReport>,
}

/// Every `*.json` file under `root`, sorted so output order is stable.
pub fn list_candidate_files(root: &Path) -> Vec<PathBuf> {
    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
        .collect::<Vec<_>>();
    files.sort();
    files
}

pub fn load_candidate(path: &Path) -> Result<CandidateProfile> {
    if !path.is_file() {
        return Err(DeepSignalError::InputNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    CandidateProfile::from_json(&content)
}

fn analyze_file(orchestrator: &Orchestrator, path: &Path, as_of: DateTime<Utc>) -> BatchOutcome {
    let result = load_candidate(path)
        .and_then(|candidate| orchestrator.analyze_at(&candidate, as_of));
    if let Err(error) = &result {
        debug!(path = %path.display(), %error, "candidate not analysed");
    }
    BatchOutcome {
        path: path.to_path_buf(),
        result,
    }
}

/// Analyses `files` in parallel. Outcomes keep the input order.
pub fn run(
    orchestrator: &Orchestrator,
    files: &[PathBuf],
    as_of: DateTime<Utc>,
) -> Vec<BatchOutcome> {
    info!(files = files.len(), "starting batch");
    files
        .par_iter()
        .map(|path| analyze_file(orchestrator, path, as_of))
        .collect()
}
