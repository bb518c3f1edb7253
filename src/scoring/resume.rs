use super::decay::{average_decay, skill_decay_scores};
use super::verification::{verify_skills, VerificationOutcome};
use super::Agent;
use crate::types::candidate::CandidateProfile;
use crate::types::config::{ResumeThresholds, ScoringSettings, RESUME_AGENT};
use crate::types::report::{round2, AgentReport, RiskCategory, RiskFactor, RiskLevel};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

const AGENT_NAME: &str = "Agent A: Resume Verification";
const CONFIDENCE_STEP: f64 = 0.33;
const NO_DATA_IMPACT: f64 = 10.0;
const UNVERIFIED_RISK_IMPACT_PER_SKILL: f64 = 3.0;

pub struct ResumeAgent {
    half_life_months: f64,
    thresholds: ResumeThresholds,
}

impl ResumeAgent {
    pub fn new(settings: &ScoringSettings) -> Self {
        Self {
            half_life_months: settings.half_life_months,
            thresholds: settings.resume,
        }
    }

    fn no_data_report(&self, reason: &str) -> AgentReport {
        debug!(agent = RESUME_AGENT, reason, "resume data insufficient");
        let mut signals = BTreeMap::new();
        signals.insert("data_available".to_string(), Value::Bool(false));
        signals.insert("reason".to_string(), Value::from(reason));

        AgentReport {
            agent: RESUME_AGENT.to_string(),
            agent_name: AGENT_NAME.to_string(),
            score: 0.0,
            confidence: 0.0,
            risk_factors: vec![RiskFactor::new(
                RiskCategory::NoData,
                RiskLevel::Medium,
                format!("Resume analysis unavailable: {reason}"),
                NO_DATA_IMPACT,
            )
            .with_detail("reason", reason)],
            signals,
        }
    }

    fn decay_risks(&self, scores: &[(String, f64)]) -> Vec<RiskFactor> {
        scores
            .iter()
            .filter(|(_, score)| *score < self.thresholds.decay_medium_below)
            .map(|(name, score)| {
                let (severity, impact) = if *score < self.thresholds.decay_high_below {
                    (RiskLevel::High, 10.0)
                } else {
                    (RiskLevel::Medium, 5.0)
                };
                RiskFactor::new(
                    RiskCategory::SkillDecay,
                    severity,
                    format!(
                        "Skill '{name}' shows significant decay (score: {:.2})",
                        score
                    ),
                    impact,
                )
                .with_detail("skill", name.as_str())
                .with_detail("decay_score", round2(*score))
            })
            .collect()
    }
}

fn verification_risk(outcome: &VerificationOutcome) -> Option<RiskFactor> {
    if outcome.unverified.is_empty() {
        return None;
    }
    let rate = outcome.rate();
    let severity = if rate < 0.5 {
        RiskLevel::High
    } else if rate <= 0.8 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };
    let count = outcome.unverified.len();
    Some(
        RiskFactor::new(
            RiskCategory::UnverifiedSkills,
            severity,
            format!("{count} skill(s) not verified in work experience"),
            UNVERIFIED_RISK_IMPACT_PER_SKILL * count as f64,
        )
        .with_detail("unverified_skills", outcome.unverified.clone())
        .with_detail("verification_rate", round2(rate * 100.0)),
    )
}

impl Agent for ResumeAgent {
    fn key(&self) -> &'static str {
        RESUME_AGENT
    }

    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn analyze(&self, candidate: &CandidateProfile, as_of: DateTime<Utc>) -> AgentReport {
        if candidate.skills.is_empty() {
            return self.no_data_report("candidate lists no skills");
        }
        if candidate.work_experience.is_empty() {
            return self.no_data_report("candidate lists no work experience");
        }

        let decay_scores = skill_decay_scores(&candidate.skills, self.half_life_months, as_of);
        let Some(average) = average_decay(&decay_scores) else {
            return self.no_data_report("no skill carries a last-used date");
        };

        let outcome = verify_skills(&candidate.skills, &candidate.work_experience);
        let penalty = self.thresholds.unverified_penalty * outcome.unverified.len() as f64;
        let score = (average - penalty).clamp(0.0, 100.0);

        let mut risk_factors = self.decay_risks(&decay_scores);
        risk_factors.extend(verification_risk(&outcome));

        // Each check adds an independent, equal share of confidence.
        let confidence = [
            !decay_scores.is_empty(),
            !candidate.work_experience.is_empty(),
            !outcome.verified.is_empty(),
        ]
        .iter()
        .filter(|present| **present)
        .count() as f64
            * CONFIDENCE_STEP;

        let mut per_skill = Map::new();
        for (name, value) in &decay_scores {
            per_skill.insert(name.clone(), json!(round2(*value)));
        }
        let mut signals = BTreeMap::new();
        signals.insert("data_available".to_string(), Value::Bool(true));
        signals.insert("skill_decay_scores".to_string(), Value::Object(per_skill));
        signals.insert(
            "average_skill_decay_score".to_string(),
            json!(round2(average)),
        );
        signals.insert(
            "skill_verification".to_string(),
            json!({
                "total_skills": outcome.total(),
                "verified_skills": outcome.verified,
                "unverified_skills": outcome.unverified,
                "verification_rate": round2(outcome.rate() * 100.0),
            }),
        );
        signals.insert("unverified_penalty".to_string(), json!(round2(penalty)));

        debug!(
            agent = RESUME_AGENT,
            score,
            confidence,
            risks = risk_factors.len(),
            "resume analysis complete"
        );

        AgentReport {
            agent: RESUME_AGENT.to_string(),
            agent_name: AGENT_NAME.to_string(),
            score: round2(score),
            confidence: round2(confidence),
            risk_factors,
            signals,
        }
    }
}
