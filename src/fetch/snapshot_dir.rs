use super::{FetchError, ProfileSource};
use crate::types::code_host::CodeHostSnapshot;
use std::path::PathBuf;

/// Reads `<username>.json` snapshots from a directory populated by an external fetcher.
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Code-hosting usernames are alphanumeric with single inner hyphens.
fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= 39
        && !username.starts_with('-')
        && !username.ends_with('-')
        && username
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}

impl ProfileSource for SnapshotDir {
    fn fetch(&self, username: &str) -> Result<CodeHostSnapshot, FetchError> {
        let username = username.trim();
        if !is_valid_username(username) {
            return Err(FetchError::InvalidUsername);
        }

        let path = self.root.join(format!("{}.json", username.to_lowercase()));
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound)
            }
            Err(error) => return Err(FetchError::Io(error)),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn describe(&self) -> String {
        format!("snapshots in {}", self.root.display())
    }

    fn is_available(&self) -> bool {
        self.root.is_dir()
    }
}
