use crate::types::candidate::Skill;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

const SECONDS_PER_MONTH: f64 = 30.0 * 86_400.0;

/// Whole and fractional months between `last_used` and `as_of`, never negative.
pub fn months_since(last_used: DateTime<Utc>, as_of: DateTime<Utc>) -> f64 {
    let seconds = as_of.signed_duration_since(last_used).num_seconds().max(0);
    seconds as f64 / SECONDS_PER_MONTH
}

/// `100 * e^(-λt)` with `λ = ln 2 / half_life_months`.
pub fn decay_score(months_elapsed: f64, half_life_months: f64) -> f64 {
    let lambda = std::f64::consts::LN_2 / half_life_months;
    100.0 * (-lambda * months_elapsed.max(0.0)).exp()
}

/// Decay score for every skill with a known last-used date, in first-listed order.
/// Repeated listings (case-insensitive) collapse to one, dated by the most recent use.
pub fn skill_decay_scores(
    skills: &[Skill],
    half_life_months: f64,
    as_of: DateTime<Utc>,
) -> Vec<(String, f64)> {
    let mut latest: Vec<(String, DateTime<Utc>)> = Vec::new();
    let mut index = HashMap::<String, usize>::new();
    for skill in skills {
        let Some(last_used) = skill.last_used else {
            continue;
        };
        let key = skill.name.trim().to_lowercase();
        match index.get(&key) {
            Some(&slot) => {
                let known = &mut latest[slot].1;
                *known = (*known).max(last_used);
            }
            None => {
                index.insert(key, latest.len());
                latest.push((skill.name.clone(), last_used));
            }
        }
    }

    latest
        .into_iter()
        .map(|(name, last_used)| {
            let months = months_since(last_used, as_of);
            (name, decay_score(months, half_life_months))
        })
        .collect()
}

pub fn average_decay(scores: &[(String, f64)]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().map(|(_, score)| score).sum::<f64>() / scores.len() as f64)
}
