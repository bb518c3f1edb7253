use crate::guardrails::pii::PiiKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeepSignalError {
    /// The rejected identifier is intentionally not carried by this variant.
    #[error(
        "candidate id rejected: it looks like {0}; resubmit with an anonymous identifier such as CAND-12345"
    )]
    PiiDetected(PiiKind),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("input not found: {0}")]
    InputNotFound(String),

    #[error("invalid candidate profile: {0}")]
    InvalidProfile(String),

    #[error("audit log chain broken at line {0}")]
    AuditChain(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("toml render error: {0}")]
    TomlRender(#[from] toml::ser::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeepSignalError>;
