use crate::types::code_host::{CodeHostSnapshot, CommitMeta, RepositoryMeta};
use crate::types::config::GreenWashingThresholds;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

const GENERIC_MESSAGES: [&str; 6] = ["update", "fix", "changes", "wip", "test", "."];
const MERGE_PREFIXES: [&str; 2] = ["merge pull request", "merge branch"];
const MIN_MESSAGE_LEN: usize = 10;
const LANGUAGE_SAMPLE_REPOS: usize = 20;
const PRIMARY_LANGUAGES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    pub language: String,
    pub share: f64,
}

/// Raw sub-scores over one code-hosting snapshot. Ratios are percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryMetrics {
    pub account_age_days: Option<i64>,
    pub followers: u32,
    pub total_repos: usize,
    pub owned_repos: usize,
    pub forked_repos: usize,
    pub fork_ratio: f64,
    pub total_stars: u64,
    pub avg_stars_per_repo: f64,
    pub primary_languages: Vec<LanguageShare>,
    pub repos_created_in_window: usize,
    pub recent_commit_count: usize,
    pub commits_analyzed: usize,
    pub low_quality_commits: usize,
    pub low_quality_ratio: f64,
}

pub fn is_low_quality_message(message: &str) -> bool {
    let subject = message.lines().next().unwrap_or_default().trim().to_lowercase();
    // Covers empty and single-character subjects too.
    subject.chars().count() < MIN_MESSAGE_LEN
        || GENERIC_MESSAGES.contains(&subject.as_str())
        || MERGE_PREFIXES
            .iter()
            .any(|prefix| subject.starts_with(prefix))
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Largest languages by byte share across the first owned repositories, biggest first.
pub fn primary_languages(owned: &[&RepositoryMeta]) -> Vec<LanguageShare> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for repo in owned.iter().take(LANGUAGE_SAMPLE_REPOS) {
        for (language, bytes) in &repo.languages {
            let total = totals.entry(language.as_str()).or_default();
            *total = total.saturating_add(*bytes);
        }
    }
    let all_bytes = totals.values().fold(0u64, |acc, bytes| acc.saturating_add(*bytes));
    if all_bytes == 0 {
        return Vec::new();
    }

    let mut ranked = totals.into_iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(PRIMARY_LANGUAGES)
        .map(|(language, bytes)| LanguageShare {
            language: language.to_string(),
            share: percentage_u64(bytes, all_bytes),
        })
        .collect()
}

fn percentage_u64(part: u64, whole: u64) -> f64 {
    part as f64 / whole as f64 * 100.0
}

/// Start of a look-back window, saturating at the earliest representable instant.
fn window_start(as_of: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    as_of
        .checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn recent_commits<'a>(
    commits: &'a [CommitMeta],
    as_of: DateTime<Utc>,
    window_days: u32,
) -> impl Iterator<Item = &'a CommitMeta> {
    let since = window_start(as_of, window_days);
    commits
        .iter()
        .filter(move |commit| commit.authored_at >= since && commit.authored_at <= as_of)
}

pub fn evaluate(
    snapshot: &CodeHostSnapshot,
    thresholds: &GreenWashingThresholds,
    as_of: DateTime<Utc>,
) -> RepositoryMetrics {
    let repos = &snapshot.repositories;
    let forked_repos = repos.iter().filter(|repo| repo.fork).count();
    let owned = repos.iter().filter(|repo| !repo.fork).collect::<Vec<_>>();
    let total_stars = owned.iter().map(|repo| u64::from(repo.stars)).sum::<u64>();
    let avg_stars_per_repo = if owned.is_empty() {
        0.0
    } else {
        total_stars as f64 / owned.len() as f64
    };

    let velocity_since = window_start(as_of, thresholds.velocity_window_days);
    let repos_created_in_window = repos
        .iter()
        .filter(|repo| repo.created_at >= velocity_since)
        .count();

    let recent_commit_count =
        recent_commits(&snapshot.commits, as_of, thresholds.activity_window_days).count();
    let commits_analyzed = snapshot.commits.len();
    let low_quality_commits = snapshot
        .commits
        .iter()
        .filter(|commit| is_low_quality_message(&commit.message))
        .count();

    RepositoryMetrics {
        account_age_days: snapshot
            .profile
            .created_at
            .map(|created| as_of.signed_duration_since(created).num_days().max(0)),
        followers: snapshot.profile.followers,
        total_repos: repos.len(),
        owned_repos: owned.len(),
        forked_repos,
        fork_ratio: percentage(forked_repos, repos.len()),
        total_stars,
        avg_stars_per_repo,
        primary_languages: primary_languages(&owned),
        repos_created_in_window,
        recent_commit_count,
        commits_analyzed,
        low_quality_commits,
        low_quality_ratio: percentage(low_quality_commits, commits_analyzed),
    }
}
