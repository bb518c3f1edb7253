use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Public code-hosting data as handed over by the fetch collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeHostSnapshot {
    pub profile: ProfileMeta,
    #[serde(default)]
    pub repositories: Vec<RepositoryMeta>,
    #[serde(default)]
    pub commits: Vec<CommitMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMeta {
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMeta {
    pub name: String,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub stars: u32,
    pub created_at: DateTime<Utc>,
    /// Bytes of source per language as reported by the host.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub languages: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitMeta {
    pub message: String,
    pub authored_at: DateTime<Utc>,
}
