use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    SkillDecay,
    UnverifiedSkills,
    GreenWashing,
    ForkRatio,
    CommitQuality,
    NoData,
}

impl RiskCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SkillDecay => "skill_decay",
            Self::UnverifiedSkills => "unverified_skills",
            Self::GreenWashing => "green_washing",
            Self::ForkRatio => "fork_ratio",
            Self::CommitQuality => "commit_quality",
            Self::NoData => "no_data",
        }
    }
}

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactor {
    pub category: RiskCategory,
    pub severity: RiskLevel,
    pub description: String,
    /// Always <= 0.
    pub score_impact: f64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
}

impl RiskFactor {
    pub fn new(
        category: RiskCategory,
        severity: RiskLevel,
        description: impl Into<String>,
        score_impact: f64,
    ) -> Self {
        Self {
            category,
            severity,
            description: description.into(),
            score_impact: -score_impact.abs(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentReport {
    /// Stable key used for weighting, e.g. `resume` or `github`.
    pub agent: String,
    pub agent_name: String,
    pub score: f64,
    pub confidence: f64,
    pub risk_factors: Vec<RiskFactor>,
    pub signals: BTreeMap<String, Value>,
}

impl AgentReport {
    pub fn signal_f64(&self, key: &str) -> Option<f64> {
        self.signals.get(key).and_then(Value::as_f64)
    }
}

/// One row of the scoring trace a caller may persist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreTrace {
    pub metric: String,
    pub raw_score: f64,
    pub weight: f64,
    pub weighted: f64,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub candidate_id: String,
    pub credit_score: f64,
    pub risk_level: RiskLevel,
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<RiskFactor>,
    pub agent_reports: BTreeMap<String, AgentReport>,
    pub trace: Vec<ScoreTrace>,
    pub metadata: BTreeMap<String, Value>,
    pub generated_at: DateTime<Utc>,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
