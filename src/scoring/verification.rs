use crate::types::candidate::{Skill, WorkExperience};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationOutcome {
    pub verified: Vec<String>,
    pub unverified: Vec<String>,
}

impl VerificationOutcome {
    pub fn total(&self) -> usize {
        self.verified.len() + self.unverified.len()
    }

    /// Fraction in [0, 1]. A candidate without skills has nothing left unverified.
    pub fn rate(&self) -> f64 {
        match self.total() {
            0 => 1.0,
            total => self.verified.len() as f64 / total as f64,
        }
    }
}

/// A skill counts as verified when any role lists it (case-insensitive).
pub fn verify_skills(skills: &[Skill], experience: &[WorkExperience]) -> VerificationOutcome {
    let used = experience
        .iter()
        .flat_map(|role| role.skills_used.iter())
        .map(|name| name.trim().to_lowercase())
        .collect::<HashSet<_>>();

    let mut seen = HashSet::new();
    let mut verified = Vec::new();
    let mut unverified = Vec::new();
    for skill in skills {
        let key = skill.name.trim().to_lowercase();
        if !seen.insert(key.clone()) {
            continue;
        }
        if used.contains(&key) {
            verified.push(skill.name.clone());
        } else {
            unverified.push(skill.name.clone());
        }
    }

    VerificationOutcome {
        verified,
        unverified,
    }
}
