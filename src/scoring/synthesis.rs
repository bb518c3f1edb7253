use crate::types::config::{RiskCutoffs, ScoringSettings, GITHUB_AGENT, RESUME_AGENT};
use crate::types::report::{
    round2, AgentReport, AnalysisReport, RiskCategory, RiskFactor, RiskLevel, ScoreTrace,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const SCORE_TIERS: [(f64, &str); 4] = [
    (80.0, "Strong candidate - proceed with interview process"),
    (65.0, "Good candidate - verify key technical claims in interview"),
    (50.0, "Moderate candidate - conduct thorough technical assessment"),
    (0.0, "Proceed with caution - significant concerns identified"),
];

const ELEVATED_RISK_RECOMMENDATION: &str =
    "Recommend detailed reference checks and skill verification";

const LIMITED_DATA_FINDING: &str = "Limited data available for detailed analysis";

fn category_recommendation(category: RiskCategory) -> &'static str {
    match category {
        RiskCategory::SkillDecay => {
            "Verify current proficiency in decayed skills with a practical exercise"
        }
        RiskCategory::UnverifiedSkills => {
            "Ask for specific project examples demonstrating claimed skills"
        }
        RiskCategory::GreenWashing => {
            "Request specific code samples and conduct live coding assessment"
        }
        RiskCategory::ForkRatio => {
            "Ask the candidate to walk through original work rather than forked repositories"
        }
        RiskCategory::CommitQuality => {
            "Review a sample of the candidate's commits and pull requests in depth"
        }
        RiskCategory::NoData => "Collect the missing resume or code-hosting data before deciding",
    }
}

/// First match wins: CRITICAL, HIGH, MEDIUM, otherwise LOW.
pub fn risk_level(score: f64, risks: &[RiskFactor], cutoffs: &RiskCutoffs) -> RiskLevel {
    let count = |severity: RiskLevel| risks.iter().filter(|r| r.severity == severity).count();
    let critical = count(RiskLevel::Critical);
    let high = count(RiskLevel::High);
    let medium = count(RiskLevel::Medium);

    if score < cutoffs.critical_below || critical > 0 {
        RiskLevel::Critical
    } else if score < cutoffs.high_below || high >= 2 {
        RiskLevel::High
    } else if score < cutoffs.medium_below || high >= 1 || medium >= 2 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn signal_findings(report: &AgentReport) -> Vec<String> {
    let mut findings = Vec::new();
    if report.signals.get("data_available") != Some(&Value::Bool(true)) {
        return findings;
    }

    match report.agent.as_str() {
        RESUME_AGENT => {
            if let Some(decay) = report.signal_f64("average_skill_decay_score") {
                if decay >= 70.0 {
                    findings.push(format!(
                        "Strong skill currency with average decay score of {decay:.1}/100"
                    ));
                } else if decay < 40.0 {
                    findings.push(format!(
                        "Concerning skill decay detected (average score {decay:.1}/100)"
                    ));
                }
            }
            let rate = report
                .signals
                .get("skill_verification")
                .and_then(|verification| verification["verification_rate"].as_f64());
            if let Some(rate) = rate {
                if rate >= 80.0 {
                    findings.push(format!("High skill verification rate ({rate:.0}%)"));
                } else if rate < 50.0 {
                    findings.push(format!("Low skill verification rate ({rate:.0}%)"));
                }
            }
        }
        GITHUB_AGENT => {
            let green_washing = report
                .signals
                .get("greenwashing")
                .and_then(|greenwashing| greenwashing["score"].as_f64());
            if let Some(score) = green_washing {
                if score < 30.0 {
                    findings.push(
                        "Genuine GitHub contributions verified - low green-washing risk"
                            .to_string(),
                    );
                } else if score > 60.0 {
                    findings.push(format!(
                        "High green-washing indicators detected ({score:.0}/100)"
                    ));
                }
            }
            let repos = report.signals.get("repositories").unwrap_or(&Value::Null);
            let owned = repos["owned_repos"].as_u64().unwrap_or(0);
            let stars = repos["total_stars"].as_u64().unwrap_or(0);
            if owned > 10 && stars > 50 {
                findings.push(format!(
                    "Strong GitHub presence with {owned} owned repos and {stars} stars"
                ));
            }
        }
        _ => {}
    }
    findings
}

fn push_unique(finding: String, findings: &mut Vec<String>) {
    if !findings.contains(&finding) {
        findings.push(finding);
    }
}

fn most_severe<'a>(risks: impl Iterator<Item = &'a RiskFactor>) -> Vec<&'a RiskFactor> {
    let mut ranked = risks.collect::<Vec<_>>();
    // Stable sort keeps emission order among equal impacts.
    ranked.sort_by(|a, b| a.score_impact.total_cmp(&b.score_impact));
    ranked
}

pub struct Synthesizer {
    settings: ScoringSettings,
}

impl Synthesizer {
    pub fn new(settings: &ScoringSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// Confidence-weighted mean of agent scores, or `None` when every effective weight is 0.
    fn weighted_average(&self, reports: &[AgentReport]) -> (Option<f64>, Vec<ScoreTrace>) {
        let mut trace = Vec::with_capacity(reports.len() + 1);
        let mut total_weight = 0.0;
        let mut total = 0.0;

        for report in reports {
            let configured = self.settings.weight_for(&report.agent);
            let effective = configured * report.confidence;
            total_weight += effective;
            total += report.score * effective;
            trace.push(ScoreTrace {
                metric: report.agent.clone(),
                raw_score: report.score,
                weight: round2(effective),
                weighted: round2(report.score * effective),
                evidence: format!(
                    "{}: weight {:.2} x confidence {:.2}",
                    report.agent_name, configured, report.confidence
                ),
            });
        }

        if total_weight > 0.0 {
            (Some(total / total_weight), trace)
        } else {
            (None, trace)
        }
    }

    fn key_findings(&self, reports: &[AgentReport], risks: &[RiskFactor]) -> Vec<String> {
        let mut findings: Vec<String> = Vec::new();

        for report in reports {
            for finding in signal_findings(report) {
                push_unique(finding, &mut findings);
            }
            if let Some(top) = most_severe(report.risk_factors.iter()).first() {
                push_unique(top.description.clone(), &mut findings);
            }
        }
        for risk in most_severe(risks.iter()) {
            if risk.score_impact < 0.0 {
                push_unique(risk.description.clone(), &mut findings);
            }
        }

        findings.truncate(self.settings.max_findings);
        if findings.is_empty() {
            findings.push(LIMITED_DATA_FINDING.to_string());
        }
        findings
    }

    fn recommendations(&self, score: f64, level: RiskLevel, risks: &[RiskFactor]) -> Vec<String> {
        let mut recommendations = SCORE_TIERS
            .iter()
            .find(|(floor, _)| score >= *floor)
            .map(|(_, text)| vec![text.to_string()])
            .unwrap_or_default();

        if level >= RiskLevel::High {
            recommendations.push(ELEVATED_RISK_RECOMMENDATION.to_string());
        }

        let active = risks
            .iter()
            .filter(|risk| risk.severity >= RiskLevel::High)
            .map(|risk| risk.category)
            .collect::<BTreeSet<_>>();
        recommendations.extend(
            active
                .into_iter()
                .map(|category| category_recommendation(category).to_string()),
        );

        recommendations
    }

    /// Combines agent reports into the final analysis. Deterministic for identical input.
    pub fn synthesize(
        &self,
        candidate_id: &str,
        reports: &[AgentReport],
        generated_at: DateTime<Utc>,
    ) -> AnalysisReport {
        let (average, mut trace) = self.weighted_average(reports);

        let mut risk_factors = reports
            .iter()
            .flat_map(|report| report.risk_factors.iter().cloned())
            .collect::<Vec<_>>();
        let penalty: f64 = risk_factors.iter().map(|risk| risk.score_impact.abs()).sum();

        let base = match average {
            Some(average) => average,
            None => {
                risk_factors.push(RiskFactor::new(
                    RiskCategory::NoData,
                    RiskLevel::Medium,
                    "No agent produced data with non-zero confidence",
                    0.0,
                ));
                0.0
            }
        };
        let credit_score = round2((base - penalty).clamp(0.0, 100.0));

        trace.push(ScoreTrace {
            metric: "risk_penalty".to_string(),
            raw_score: round2(penalty),
            weight: 1.0,
            weighted: round2(-penalty),
            evidence: format!("{} risk factor(s)", risk_factors.len()),
        });

        let level = risk_level(credit_score, &risk_factors, &self.settings.risk);
        let key_findings = self.key_findings(reports, &risk_factors);
        let recommendations = self.recommendations(credit_score, level, &risk_factors);

        let average_confidence = if reports.is_empty() {
            0.0
        } else {
            reports.iter().map(|report| report.confidence).sum::<f64>() / reports.len() as f64
        };
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "agents_used".to_string(),
            json!(reports.iter().map(|r| r.agent.as_str()).collect::<Vec<_>>()),
        );
        metadata.insert("total_risk_factors".to_string(), json!(risk_factors.len()));
        metadata.insert(
            "average_confidence".to_string(),
            json!(round2(average_confidence)),
        );
        metadata.insert("total_penalty".to_string(), json!(round2(penalty)));
        metadata.insert(
            "weighted_average".to_string(),
            average.map_or(Value::Null, |value| json!(round2(value))),
        );

        debug!(
            credit_score,
            risk_level = %level,
            penalty,
            "synthesis complete"
        );

        AnalysisReport {
            candidate_id: candidate_id.to_string(),
            credit_score,
            risk_level: level,
            key_findings,
            recommendations,
            risk_factors,
            agent_reports: reports
                .iter()
                .map(|report| (report.agent.clone(), report.clone()))
                .collect(),
            trace,
            metadata,
            generated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(agent: &str, score: f64, confidence: f64, risks: Vec<RiskFactor>) -> AgentReport {
        AgentReport {
            agent: agent.to_string(),
            agent_name: format!("Agent {agent}"),
            score,
            confidence,
            risk_factors: risks,
            signals: BTreeMap::new(),
        }
    }

    fn synthesizer() -> Synthesizer {
        Synthesizer::new(&ScoringSettings::default())
    }

    #[test]
    fn weights_scores_by_confidence() {
        let reports = vec![
            report(RESUME_AGENT, 90.0, 0.99, vec![]),
            report(GITHUB_AGENT, 50.0, 0.10, vec![]),
        ];
        let analysis = synthesizer().synthesize("CAND-1", &reports, Utc::now());
        let expected = (90.0 * 0.495 + 50.0 * 0.05) / (0.495 + 0.05);
        assert!((analysis.credit_score - expected).abs() < 0.01);
        assert_eq!(analysis.agent_reports.len(), 2);
        assert_eq!(analysis.trace.len(), 3);
        assert_eq!(analysis.metadata["agents_used"], json!(["resume", "github"]));
    }

    #[test]
    fn zero_confidence_everywhere_scores_zero_with_no_data() {
        let reports = vec![
            report(RESUME_AGENT, 80.0, 0.0, vec![]),
            report(GITHUB_AGENT, 70.0, 0.0, vec![]),
        ];
        let analysis = synthesizer().synthesize("CAND-2", &reports, Utc::now());
        assert_eq!(analysis.credit_score, 0.0);
        assert_eq!(analysis.risk_level, RiskLevel::Critical);
        assert!(analysis
            .risk_factors
            .iter()
            .any(|risk| risk.category == RiskCategory::NoData));
        assert_eq!(analysis.metadata["weighted_average"], Value::Null);
    }

    #[test]
    fn penalties_clamp_at_zero() {
        let risks = (0..15)
            .map(|_| RiskFactor::new(RiskCategory::GreenWashing, RiskLevel::Low, "bad", 10.0))
            .collect();
        let reports = vec![report(GITHUB_AGENT, 60.0, 0.85, risks)];
        let analysis = synthesizer().synthesize("CAND-3", &reports, Utc::now());
        assert_eq!(analysis.credit_score, 0.0);
        assert_eq!(analysis.metadata["total_penalty"], json!(150.0));
    }

    #[test]
    fn critical_factor_forces_critical_level_despite_high_score() {
        let risks = vec![RiskFactor::new(
            RiskCategory::SkillDecay,
            RiskLevel::Critical,
            "severe",
            0.0,
        )];
        assert_eq!(
            risk_level(95.0, &risks, &RiskCutoffs::default()),
            RiskLevel::Critical
        );
    }

    #[test]
    fn risk_level_precedence() {
        let cutoffs = RiskCutoffs::default();
        let high = RiskFactor::new(RiskCategory::GreenWashing, RiskLevel::High, "h", 0.0);
        let medium = RiskFactor::new(RiskCategory::ForkRatio, RiskLevel::Medium, "m", 0.0);

        assert_eq!(risk_level(39.9, &[], &cutoffs), RiskLevel::Critical);
        assert_eq!(risk_level(54.9, &[], &cutoffs), RiskLevel::High);
        assert_eq!(
            risk_level(90.0, &[high.clone(), high.clone()], &cutoffs),
            RiskLevel::High
        );
        assert_eq!(risk_level(69.9, &[], &cutoffs), RiskLevel::Medium);
        assert_eq!(risk_level(90.0, &[high], &cutoffs), RiskLevel::Medium);
        assert_eq!(
            risk_level(90.0, &[medium.clone(), medium.clone()], &cutoffs),
            RiskLevel::Medium
        );
        assert_eq!(risk_level(90.0, &[medium], &cutoffs), RiskLevel::Low);
        assert_eq!(risk_level(70.0, &[], &cutoffs), RiskLevel::Low);
    }

    #[test]
    fn recommendations_follow_score_tier_and_categories() {
        let risks = vec![
            RiskFactor::new(RiskCategory::GreenWashing, RiskLevel::High, "gw", 25.0),
            RiskFactor::new(RiskCategory::UnverifiedSkills, RiskLevel::High, "unv", 9.0),
            RiskFactor::new(RiskCategory::GreenWashing, RiskLevel::High, "gw2", 1.0),
        ];
        let reports = vec![report(RESUME_AGENT, 100.0, 1.0, risks)];
        let analysis = synthesizer().synthesize("CAND-4", &reports, Utc::now());

        // 100 - 35 = 65 -> "Good" tier, two HIGH factors -> HIGH overall.
        assert_eq!(analysis.credit_score, 65.0);
        assert_eq!(analysis.risk_level, RiskLevel::High);
        assert_eq!(
            analysis.recommendations,
            vec![
                SCORE_TIERS[1].1.to_string(),
                ELEVATED_RISK_RECOMMENDATION.to_string(),
                category_recommendation(RiskCategory::UnverifiedSkills).to_string(),
                category_recommendation(RiskCategory::GreenWashing).to_string(),
            ]
        );
    }

    #[test]
    fn findings_are_bounded_and_ranked() {
        let risks = (1..=10)
            .map(|index| {
                RiskFactor::new(
                    RiskCategory::SkillDecay,
                    RiskLevel::Low,
                    format!("risk {index}"),
                    f64::from(index),
                )
            })
            .collect();
        let reports = vec![report(RESUME_AGENT, 100.0, 1.0, risks)];
        let analysis = synthesizer().synthesize("CAND-5", &reports, Utc::now());
        assert_eq!(analysis.key_findings.len(), 5);
        assert_eq!(analysis.key_findings[0], "risk 10");
        assert_eq!(analysis.key_findings[1], "risk 9");
    }

    #[test]
    fn no_signals_yields_limited_data_finding() {
        let reports = vec![report(RESUME_AGENT, 80.0, 1.0, vec![])];
        let analysis = synthesizer().synthesize("CAND-6", &reports, Utc::now());
        assert_eq!(analysis.key_findings, vec![LIMITED_DATA_FINDING.to_string()]);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        assert_eq!(analysis.recommendations, vec![SCORE_TIERS[0].1.to_string()]);
    }

    #[test]
    fn synthesis_is_deterministic() {
        let reports = vec![
            report(
                RESUME_AGENT,
                72.5,
                0.66,
                vec![RiskFactor::new(
                    RiskCategory::UnverifiedSkills,
                    RiskLevel::Medium,
                    "1 skill(s) not verified in work experience",
                    3.0,
                )],
            ),
            report(GITHUB_AGENT, 61.0, 0.85, vec![]),
        ];
        let now = Utc::now();
        let first = synthesizer().synthesize("CAND-7", &reports, now);
        let second = synthesizer().synthesize("CAND-7", &reports, now);
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_agents_carry_no_weight() {
        let reports = vec![
            report(RESUME_AGENT, 80.0, 1.0, vec![]),
            report("portfolio", 0.0, 1.0, vec![]),
        ];
        let analysis = synthesizer().synthesize("CAND-8", &reports, Utc::now());
        assert_eq!(analysis.credit_score, 80.0);
    }
}
