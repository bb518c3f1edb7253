use crate::error::Result;
use crate::fetch::ProfileSource;
use crate::guardrails::validate_candidate_id;
use crate::scoring::greenwashing::GithubAgent;
use crate::scoring::resume::ResumeAgent;
use crate::scoring::synthesis::Synthesizer;
use crate::scoring::Agent;
use crate::types::candidate::CandidateProfile;
use crate::types::config::{ScoringSettings, GITHUB_AGENT};
use crate::types::report::{AgentReport, AnalysisReport, RiskCategory, RiskFactor, RiskLevel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use tracing::{error, info, info_span};

const SYNTHESIZER_KEY: &str = "synthesis";
const SYNTHESIZER_NAME: &str = "Agent C: Synthesizer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentStatus {
    pub key: String,
    pub name: String,
    pub status: String,
}

/// Runs the PII gate, the independent agents, and the synthesizer for one candidate at a time.
pub struct Orchestrator {
    agents: Vec<Box<dyn Agent>>,
    synthesizer: Synthesizer,
    source: Arc<dyn ProfileSource>,
}

impl Orchestrator {
    pub fn new(settings: &ScoringSettings, source: Arc<dyn ProfileSource>) -> Self {
        let agents: Vec<Box<dyn Agent>> = vec![
            Box::new(ResumeAgent::new(settings)),
            Box::new(GithubAgent::new(settings, Arc::clone(&source))),
        ];
        Self {
            agents,
            synthesizer: Synthesizer::new(settings),
            source,
        }
    }

    pub fn analyze(&self, candidate: &CandidateProfile) -> Result<AnalysisReport> {
        self.analyze_at(candidate, Utc::now())
    }

    /// Scores `candidate` as of `as_of`. Fails only when the candidate id looks like PII.
    pub fn analyze_at(
        &self,
        candidate: &CandidateProfile,
        as_of: DateTime<Utc>,
    ) -> Result<AnalysisReport> {
        validate_candidate_id(&candidate.candidate_id)?;

        let span = info_span!("analysis", candidate = %candidate.candidate_id);
        let _guard = span.enter();

        let reports = self.run_agents(candidate, as_of);
        let report = self
            .synthesizer
            .synthesize(&candidate.candidate_id, &reports, as_of);

        info!(
            credit_score = report.credit_score,
            risk_level = %report.risk_level,
            "analysis complete"
        );
        Ok(report)
    }

    // Agents share nothing mutable, so each runs on its own scoped thread.
    fn run_agents(&self, candidate: &CandidateProfile, as_of: DateTime<Utc>) -> Vec<AgentReport> {
        thread::scope(|scope| {
            let handles = self
                .agents
                .iter()
                .map(|agent| {
                    let handle = scope.spawn(move || agent.analyze(candidate, as_of));
                    (agent.as_ref(), handle)
                })
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|(agent, handle)| {
                    handle
                        .join()
                        .unwrap_or_else(|_| panicked_report(agent.key(), agent.name()))
                })
                .collect()
        })
    }

    pub fn agent_status(&self) -> Vec<AgentStatus> {
        let mut statuses = self
            .agents
            .iter()
            .map(|agent| AgentStatus {
                key: agent.key().to_string(),
                name: agent.name().to_string(),
                status: "ready".to_string(),
            })
            .collect::<Vec<_>>();

        if let Some(github) = statuses
            .iter_mut()
            .find(|status| status.key == GITHUB_AGENT)
        {
            github.status = if self.source.is_available() {
                format!("ready ({})", self.source.describe())
            } else {
                "limited (no code-hosting source)".to_string()
            };
        }

        statuses.push(AgentStatus {
            key: SYNTHESIZER_KEY.to_string(),
            name: SYNTHESIZER_NAME.to_string(),
            status: "ready".to_string(),
        });
        statuses
    }
}

fn panicked_report(key: &str, name: &str) -> AgentReport {
    error!(agent = key, "agent panicked; treating as no data");
    AgentReport {
        agent: key.to_string(),
        agent_name: name.to_string(),
        score: 0.0,
        confidence: 0.0,
        risk_factors: vec![RiskFactor::new(
            RiskCategory::NoData,
            RiskLevel::Medium,
            format!("{name} failed to produce a report"),
            10.0,
        )],
        signals: BTreeMap::from([("data_available".to_string(), Value::Bool(false))]),
    }
}
