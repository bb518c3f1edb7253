use crate::error::{DeepSignalError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub proficiency: Option<Proficiency>,
    /// `None` means unknown; such skills are left out of decay averaging.
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default)]
    pub years_experience: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    /// Anonymized organization label.
    pub organization: String,
    pub position: String,
    pub start_date: DateTime<Utc>,
    /// `None` for the current position.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub skills_used: Vec<String>,
}

/// Anonymized candidate input. Built once per analysis and shared read-only by every agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub candidate_id: String,
    #[serde(default)]
    pub github_username: Option<String>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    pub resume_text: Option<String>,
}

impl CandidateProfile {
    pub fn from_json(content: &str) -> Result<Self> {
        let profile: CandidateProfile = serde_json::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Structural checks only; identifier screening lives in the PII guardrail.
    pub fn validate(&self) -> Result<()> {
        for skill in &self.skills {
            if skill.name.trim().is_empty() {
                return Err(DeepSignalError::InvalidProfile(
                    "skill names must be non-empty".to_string(),
                ));
            }
            if !(skill.years_experience.is_finite() && skill.years_experience >= 0.0) {
                return Err(DeepSignalError::InvalidProfile(format!(
                    "skill '{}' has negative years_experience",
                    skill.name
                )));
            }
        }

        for (index, experience) in self.work_experience.iter().enumerate() {
            if let Some(end) = experience.end_date {
                if end < experience.start_date {
                    return Err(DeepSignalError::InvalidProfile(format!(
                        "work_experience[{index}] ends before it starts"
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn has_code_host_account(&self) -> bool {
        self.github_username
            .as_deref()
            .is_some_and(|username| !username.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_profile_with_defaults() {
        let profile = CandidateProfile::from_json(
            r#"{
  "candidate_id": "CAND-001",
  "skills": [
    { "name": "Rust", "proficiency": "expert", "last_used": "2024-01-01T00:00:00Z", "years_experience": 4.5 },
    { "name": "Go" }
  ],
  "work_experience": [
    { "organization": "ORG-A", "position": "Engineer", "start_date": "2020-01-01T00:00:00Z", "skills_used": ["Rust"] }
  ]
}"#,
        )
        .expect("profile should parse");

        assert_eq!(profile.candidate_id, "CAND-001");
        assert_eq!(profile.skills.len(), 2);
        assert_eq!(profile.skills[0].proficiency, Some(Proficiency::Expert));
        assert!(profile.skills[1].last_used.is_none());
        assert_eq!(profile.skills[1].years_experience, 0.0);
        assert!(profile.work_experience[0].end_date.is_none());
        assert!(!profile.has_code_host_account());
    }

    #[test]
    fn reject_experience_ending_before_start() {
        let err = CandidateProfile::from_json(
            r#"{
  "candidate_id": "CAND-002",
  "work_experience": [
    { "organization": "ORG-A", "position": "Engineer",
      "start_date": "2022-01-01T00:00:00Z", "end_date": "2021-01-01T00:00:00Z" }
  ]
}"#,
        )
        .expect_err("inverted dates should fail");
        assert!(err.to_string().contains("ends before it starts"));
    }

    #[test]
    fn reject_negative_years_experience() {
        let err = CandidateProfile::from_json(
            r#"{ "candidate_id": "CAND-003", "skills": [ { "name": "C", "years_experience": -1.0 } ] }"#,
        )
        .expect_err("negative years should fail");
        assert!(matches!(err, DeepSignalError::InvalidProfile(_)));
    }

    #[test]
    fn blank_username_is_not_an_account() {
        let profile = CandidateProfile {
            candidate_id: "CAND-004".to_string(),
            github_username: Some("   ".to_string()),
            skills: vec![],
            work_experience: vec![],
            resume_text: None,
        };
        assert!(!profile.has_code_host_account());
    }
}
