pub mod decay;
pub mod greenwashing;
pub mod repository;
pub mod resume;
pub mod synthesis;
pub mod verification;

use crate::types::candidate::CandidateProfile;
use crate::types::report::AgentReport;
use chrono::{DateTime, Utc};

/// A scoring agent turns one candidate into one report. Implementations must not fail:
/// missing or unreachable data degrades confidence and adds a `no_data` risk factor.
pub trait Agent: Send + Sync {
    /// Key used to look up the agent's synthesis weight.
    fn key(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn analyze(&self, candidate: &CandidateProfile, as_of: DateTime<Utc>) -> AgentReport;
}
