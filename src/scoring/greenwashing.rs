use super::repository::{evaluate, RepositoryMetrics};
use super::Agent;
use crate::fetch::{fetch_with_timeout, ProfileSource};
use crate::types::candidate::CandidateProfile;
use crate::types::config::{GreenWashingThresholds, ScoringSettings, GITHUB_AGENT};
use crate::types::report::{round2, AgentReport, RiskCategory, RiskFactor, RiskLevel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const AGENT_NAME: &str = "Agent B: GitHub Analysis";
const FETCHED_CONFIDENCE: f64 = 0.85;
const NO_DATA_CONFIDENCE: f64 = 0.10;
const NO_DATA_SCORE: f64 = 50.0;
const NO_DATA_IMPACT: f64 = 10.0;

const HIGH_FORK_POINTS: f64 = 30.0;
const MODERATE_FORK_POINTS: f64 = 15.0;
const LOW_ENGAGEMENT_POINTS: f64 = 20.0;
const RAPID_CREATION_POINTS: f64 = 25.0;
const POOR_COMMITS_POINTS: f64 = 20.0;
const LOW_ACTIVITY_POINTS: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GreenWashing {
    pub score: f64,
    pub indicators: Vec<&'static str>,
    pub band: RiskLevel,
}

/// 0-30 LOW, 31-60 MEDIUM, 61-100 HIGH.
pub fn band(score: f64) -> RiskLevel {
    if score > 60.0 {
        RiskLevel::High
    } else if score > 30.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn detect(metrics: &RepositoryMetrics, thresholds: &GreenWashingThresholds) -> GreenWashing {
    let mut indicators = Vec::new();
    let mut score: f64 = 0.0;

    if metrics.fork_ratio > thresholds.high_fork_ratio {
        indicators.push("high_fork_ratio");
        score += HIGH_FORK_POINTS;
    } else if metrics.fork_ratio > thresholds.moderate_fork_ratio {
        indicators.push("moderate_fork_ratio");
        score += MODERATE_FORK_POINTS;
    }

    if metrics.owned_repos >= thresholds.engagement_min_repos as usize
        && metrics.avg_stars_per_repo < thresholds.engagement_floor
    {
        indicators.push("low_engagement");
        score += LOW_ENGAGEMENT_POINTS;
    }

    if metrics.repos_created_in_window >= thresholds.velocity_repos as usize {
        indicators.push("rapid_repo_creation");
        score += RAPID_CREATION_POINTS;
    }

    if metrics.commits_analyzed > 0 && metrics.low_quality_ratio > thresholds.low_quality_ratio {
        indicators.push("poor_commit_quality");
        score += POOR_COMMITS_POINTS;
    }

    if metrics.recent_commit_count < thresholds.activity_floor as usize {
        indicators.push("low_recent_activity");
        score += LOW_ACTIVITY_POINTS;
    }

    let score = score.clamp(0.0, 100.0);
    GreenWashing {
        score,
        indicators,
        band: band(score),
    }
}

/// Base 50, capped bonuses for owned repos, stars and activity, minus green-washing
/// and fork-ratio penalties.
pub fn github_score(metrics: &RepositoryMetrics, green_washing: &GreenWashing) -> f64 {
    let mut score: f64 = 50.0;
    score += (metrics.owned_repos as f64 * 2.0).min(20.0);
    score += (metrics.total_stars as f64 / 10.0).min(15.0);
    score += (metrics.recent_commit_count as f64).min(15.0);
    score -= green_washing.score * 0.5;
    score -= metrics.fork_ratio * 0.2;
    score.clamp(0.0, 100.0)
}

fn github_risks(
    metrics: &RepositoryMetrics,
    green_washing: &GreenWashing,
    thresholds: &GreenWashingThresholds,
) -> Vec<RiskFactor> {
    let mut risks = Vec::new();

    match green_washing.band {
        RiskLevel::High => risks.push(
            RiskFactor::new(
                RiskCategory::GreenWashing,
                RiskLevel::High,
                format!(
                    "High green-washing score detected ({:.0})",
                    green_washing.score
                ),
                25.0,
            )
            .with_detail("indicators", green_washing.indicators.clone()),
        ),
        RiskLevel::Medium => risks.push(
            RiskFactor::new(
                RiskCategory::GreenWashing,
                RiskLevel::Medium,
                format!(
                    "Moderate green-washing indicators detected ({:.0})",
                    green_washing.score
                ),
                15.0,
            )
            .with_detail("indicators", green_washing.indicators.clone()),
        ),
        _ => {}
    }

    if metrics.fork_ratio > thresholds.high_fork_ratio {
        risks.push(
            RiskFactor::new(
                RiskCategory::ForkRatio,
                RiskLevel::Medium,
                format!(
                    "Very high fork ratio ({:.1}%) - mostly copied repositories",
                    metrics.fork_ratio
                ),
                10.0,
            )
            .with_detail("fork_ratio", round2(metrics.fork_ratio))
            .with_detail("forked_repos", metrics.forked_repos),
        );
    }

    if metrics.commits_analyzed > 0 && metrics.low_quality_ratio > thresholds.low_quality_ratio {
        risks.push(
            RiskFactor::new(
                RiskCategory::CommitQuality,
                RiskLevel::Medium,
                format!(
                    "High ratio of low-quality commits ({:.1}%)",
                    metrics.low_quality_ratio
                ),
                10.0,
            )
            .with_detail("low_quality_ratio", round2(metrics.low_quality_ratio)),
        );
    }

    risks
}

pub struct GithubAgent {
    source: Arc<dyn ProfileSource>,
    thresholds: GreenWashingThresholds,
    timeout: Duration,
}

impl GithubAgent {
    pub fn new(settings: &ScoringSettings, source: Arc<dyn ProfileSource>) -> Self {
        Self {
            source,
            thresholds: settings.green_washing,
            timeout: Duration::from_secs(settings.fetch_timeout_secs),
        }
    }

    fn no_data_report(&self, reason: &str) -> AgentReport {
        let mut signals = BTreeMap::new();
        signals.insert("data_available".to_string(), Value::Bool(false));
        signals.insert("reason".to_string(), Value::from(reason));

        AgentReport {
            agent: GITHUB_AGENT.to_string(),
            agent_name: AGENT_NAME.to_string(),
            score: NO_DATA_SCORE,
            confidence: NO_DATA_CONFIDENCE,
            risk_factors: vec![RiskFactor::new(
                RiskCategory::NoData,
                RiskLevel::Medium,
                format!("GitHub analysis unavailable: {reason}"),
                NO_DATA_IMPACT,
            )
            .with_detail("reason", reason)],
            signals,
        }
    }
}

impl Agent for GithubAgent {
    fn key(&self) -> &'static str {
        GITHUB_AGENT
    }

    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn analyze(&self, candidate: &CandidateProfile, as_of: DateTime<Utc>) -> AgentReport {
        if !candidate.has_code_host_account() {
            return self.no_data_report("no GitHub username provided");
        }
        let username = candidate
            .github_username
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();

        let snapshot = match fetch_with_timeout(Arc::clone(&self.source), username, self.timeout)
        {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(agent = GITHUB_AGENT, %error, "code-hosting fetch failed");
                return self.no_data_report(&format!("fetch failed ({error})"));
            }
        };

        let metrics = evaluate(&snapshot, &self.thresholds, as_of);
        let green_washing = detect(&metrics, &self.thresholds);
        let risk_factors = github_risks(&metrics, &green_washing, &self.thresholds);
        let score = github_score(&metrics, &green_washing);

        let mut signals = BTreeMap::new();
        signals.insert("data_available".to_string(), Value::Bool(true));
        signals.insert(
            "profile".to_string(),
            json!({
                "account_age_days": metrics.account_age_days,
                "public_repos": snapshot.profile.public_repos,
                "followers": metrics.followers,
            }),
        );
        signals.insert(
            "repositories".to_string(),
            json!({
                "total_repos": metrics.total_repos,
                "owned_repos": metrics.owned_repos,
                "forked_repos": metrics.forked_repos,
                "fork_ratio": round2(metrics.fork_ratio),
                "total_stars": metrics.total_stars,
                "avg_stars_per_repo": round2(metrics.avg_stars_per_repo),
                "primary_languages": metrics
                    .primary_languages
                    .iter()
                    .map(|entry| {
                        json!({"language": entry.language, "share": round2(entry.share)})
                    })
                    .collect::<Vec<_>>(),
                "repos_created_in_window": metrics.repos_created_in_window,
            }),
        );
        signals.insert(
            "contributions".to_string(),
            json!({
                "recent_commit_count": metrics.recent_commit_count,
                "commits_analyzed": metrics.commits_analyzed,
                "low_quality_commits": metrics.low_quality_commits,
                "low_quality_ratio": round2(metrics.low_quality_ratio),
            }),
        );
        signals.insert(
            "greenwashing".to_string(),
            serde_json::to_value(&green_washing).unwrap_or(Value::Null),
        );

        debug!(
            agent = GITHUB_AGENT,
            score,
            green_washing = green_washing.score,
            "github analysis complete"
        );

        AgentReport {
            agent: GITHUB_AGENT.to_string(),
            agent_name: AGENT_NAME.to_string(),
            score: round2(score),
            confidence: FETCHED_CONFIDENCE,
            risk_factors,
            signals,
        }
    }
}
