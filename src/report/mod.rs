pub mod json;
pub mod md;

use crate::error::DeepSignalError;
use crate::types::report::AnalysisReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
}

pub fn render(report: &AnalysisReport, format: OutputFormat) -> Result<String, DeepSignalError> {
    match format {
        OutputFormat::Json => json::to_json(report).map_err(DeepSignalError::Json),
        OutputFormat::Md => Ok(md::to_markdown(report)),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::types::report::{
        AgentReport, AnalysisReport, RiskCategory, RiskFactor, RiskLevel, ScoreTrace,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::collections::BTreeMap;

    pub fn sample_report() -> AnalysisReport {
        let risk = RiskFactor::new(
            RiskCategory::GreenWashing,
            RiskLevel::High,
            "High green-washing risk detected (score: 65/100)",
            25.0,
        );
        let github = AgentReport {
            agent: "github".to_string(),
            agent_name: "Agent B: GitHub Analysis".to_string(),
            score: 41.5,
            confidence: 0.85,
            risk_factors: vec![risk.clone()],
            signals: BTreeMap::from([("data_available".to_string(), json!(true))]),
        };

        AnalysisReport {
            candidate_id: "CAND-12345".to_string(),
            credit_score: 38.25,
            risk_level: RiskLevel::Critical,
            key_findings: vec!["High green-washing indicators detected (65/100)".to_string()],
            recommendations: vec![
                "Proceed with caution - significant concerns identified".to_string(),
            ],
            risk_factors: vec![risk],
            agent_reports: BTreeMap::from([("github".to_string(), github)]),
            trace: vec![
                ScoreTrace {
                    metric: "github".to_string(),
                    raw_score: 41.5,
                    weight: 0.43,
                    weighted: 17.64,
                    evidence: "Agent B: GitHub Analysis: weight 0.50 x confidence 0.85"
                        .to_string(),
                },
                ScoreTrace {
                    metric: "risk_penalty".to_string(),
                    raw_score: 25.0,
                    weight: 1.0,
                    weighted: -25.0,
                    evidence: "1 risk factor(s)".to_string(),
                },
            ],
            metadata: BTreeMap::from([("total_penalty".to_string(), json!(25.0))]),
            generated_at: Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap(),
        }
    }
}
