pub mod snapshot_dir;

use crate::types::code_host::CodeHostSnapshot;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

pub use snapshot_dir::SnapshotDir;

/// Reasons a code-hosting profile could not be obtained. None of these are fatal to an
/// analysis; the GitHub agent degrades to a low-confidence report instead.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("profile not found")]
    NotFound,

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("invalid username")]
    InvalidUsername,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// External collaborator that supplies public code-hosting data for a username.
pub trait ProfileSource: Send + Sync {
    fn fetch(&self, username: &str) -> Result<CodeHostSnapshot, FetchError>;

    fn describe(&self) -> String;

    fn is_available(&self) -> bool {
        true
    }
}

/// Used when no source is configured; every fetch fails as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl ProfileSource for Unavailable {
    fn fetch(&self, _username: &str) -> Result<CodeHostSnapshot, FetchError> {
        Err(FetchError::Unavailable(
            "no code-hosting source configured".to_string(),
        ))
    }

    fn describe(&self) -> String {
        "none".to_string()
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Runs `source.fetch` on a worker thread and waits at most `timeout` for it.
/// A fetch still running at the deadline is abandoned; its result is dropped.
pub fn fetch_with_timeout(
    source: Arc<dyn ProfileSource>,
    username: &str,
    timeout: Duration,
) -> Result<CodeHostSnapshot, FetchError> {
    let (tx, rx) = mpsc::channel();
    let username = username.to_string();
    thread::Builder::new()
        .name("code-host-fetch".to_string())
        .spawn(move || {
            let _ = tx.send(source.fetch(&username));
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(FetchError::Timeout(timeout)),
        Err(RecvTimeoutError::Disconnected) => Err(FetchError::Unavailable(
            "fetch worker exited without a result".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::code_host::ProfileMeta;

    struct Slow(Duration);

    impl ProfileSource for Slow {
        fn fetch(&self, _username: &str) -> Result<CodeHostSnapshot, FetchError> {
            thread::sleep(self.0);
            Ok(CodeHostSnapshot {
                profile: ProfileMeta {
                    created_at: None,
                    public_repos: 0,
                    followers: 0,
                },
                repositories: vec![],
                commits: vec![],
            })
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    struct Panicking;

    impl ProfileSource for Panicking {
        fn fetch(&self, _username: &str) -> Result<CodeHostSnapshot, FetchError> {
            panic!("source blew up");
        }

        fn describe(&self) -> String {
            "panicking".to_string()
        }
    }

    #[test]
    fn fast_fetch_returns_snapshot() {
        let source: Arc<dyn ProfileSource> = Arc::new(Slow(Duration::from_millis(1)));
        let result = fetch_with_timeout(source, "octo", Duration::from_secs(5));
        assert!(result.is_ok());
    }

    #[test]
    fn slow_fetch_times_out() {
        let source: Arc<dyn ProfileSource> = Arc::new(Slow(Duration::from_secs(2)));
        let result = fetch_with_timeout(source, "octo", Duration::from_millis(50));
        assert!(matches!(result, Err(FetchError::Timeout(_))));
    }

    #[test]
    fn panicking_source_reports_unavailable() {
        let source: Arc<dyn ProfileSource> = Arc::new(Panicking);
        let result = fetch_with_timeout(source, "octo", Duration::from_secs(5));
        assert!(matches!(result, Err(FetchError::Unavailable(_))));
    }

    #[test]
    fn unavailable_source_never_fetches() {
        assert!(!Unavailable.is_available());
        assert!(matches!(
            Unavailable.fetch("octo"),
            Err(FetchError::Unavailable(_))
        ));
    }
}
