use crate::error::DeepSignalError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const RESUME_AGENT: &str = "resume";
pub const GITHUB_AGENT: &str = "github";

/// Upper bound for the look-back windows, roughly a century.
pub const MAX_WINDOW_DAYS: u32 = 36_500;

/// On-disk shape of `deepsignal.toml`; every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeepSignalConfig {
    pub decay: Option<DecayConfig>,
    pub resume: Option<ResumeConfig>,
    pub weights: Option<HashMap<String, f64>>,
    pub green_washing: Option<GreenWashingConfig>,
    pub risk: Option<RiskConfig>,
    pub synthesis: Option<SynthesisConfig>,
    pub fetch: Option<FetchConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecayConfig {
    pub half_life_months: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeConfig {
    pub unverified_penalty: Option<f64>,
    pub decay_medium_below: Option<f64>,
    pub decay_high_below: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GreenWashingConfig {
    pub high_fork_ratio: Option<f64>,
    pub moderate_fork_ratio: Option<f64>,
    pub engagement_floor: Option<f64>,
    pub engagement_min_repos: Option<u32>,
    pub velocity_repos: Option<u32>,
    pub velocity_window_days: Option<u32>,
    pub low_quality_ratio: Option<f64>,
    pub activity_floor: Option<u32>,
    pub activity_window_days: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    pub critical_below: Option<f64>,
    pub high_below: Option<f64>,
    pub medium_below: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    pub max_findings: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResumeThresholds {
    pub unverified_penalty: f64,
    pub decay_medium_below: f64,
    pub decay_high_below: f64,
}

impl Default for ResumeThresholds {
    fn default() -> Self {
        Self {
            unverified_penalty: 5.0,
            decay_medium_below: 30.0,
            decay_high_below: 15.0,
        }
    }
}

/// Fork ratios and quality ratios are percentages in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GreenWashingThresholds {
    pub high_fork_ratio: f64,
    pub moderate_fork_ratio: f64,
    pub engagement_floor: f64,
    pub engagement_min_repos: u32,
    pub velocity_repos: u32,
    pub velocity_window_days: u32,
    pub low_quality_ratio: f64,
    pub activity_floor: u32,
    pub activity_window_days: u32,
}

impl Default for GreenWashingThresholds {
    fn default() -> Self {
        Self {
            high_fork_ratio: 70.0,
            moderate_fork_ratio: 50.0,
            engagement_floor: 1.0,
            engagement_min_repos: 5,
            velocity_repos: 20,
            velocity_window_days: 182,
            low_quality_ratio: 60.0,
            activity_floor: 5,
            activity_window_days: 90,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskCutoffs {
    pub critical_below: f64,
    pub high_below: f64,
    pub medium_below: f64,
}

impl Default for RiskCutoffs {
    fn default() -> Self {
        Self {
            critical_below: 40.0,
            high_below: 55.0,
            medium_below: 70.0,
        }
    }
}

/// Resolved, immutable settings handed to every scoring component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringSettings {
    pub half_life_months: f64,
    pub resume: ResumeThresholds,
    pub weights: BTreeMap<String, f64>,
    pub green_washing: GreenWashingThresholds,
    pub risk: RiskCutoffs,
    pub max_findings: usize,
    pub fetch_timeout_secs: u64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            half_life_months: 18.0,
            resume: ResumeThresholds::default(),
            weights: DeepSignalConfig::default_weights(),
            green_washing: GreenWashingThresholds::default(),
            risk: RiskCutoffs::default(),
            max_findings: 5,
            fetch_timeout_secs: 10,
        }
    }
}

impl ScoringSettings {
    pub fn weight_for(&self, agent: &str) -> f64 {
        self.weights.get(agent).copied().unwrap_or(0.0)
    }
}

impl DeepSignalConfig {
    pub fn default_weights() -> BTreeMap<String, f64> {
        BTreeMap::from([
            (RESUME_AGENT.to_string(), 0.5),
            (GITHUB_AGENT.to_string(), 0.5),
        ])
    }

    pub fn weights(&self) -> BTreeMap<String, f64> {
        let mut weights = Self::default_weights();
        if let Some(overrides) = &self.weights {
            for (key, value) in overrides {
                weights.insert(key.clone(), *value);
            }
        }
        weights
    }

    pub fn settings(&self) -> ScoringSettings {
        let defaults = ScoringSettings::default();

        let resume = match &self.resume {
            Some(resume) => ResumeThresholds {
                unverified_penalty: resume
                    .unverified_penalty
                    .unwrap_or(defaults.resume.unverified_penalty),
                decay_medium_below: resume
                    .decay_medium_below
                    .unwrap_or(defaults.resume.decay_medium_below),
                decay_high_below: resume
                    .decay_high_below
                    .unwrap_or(defaults.resume.decay_high_below),
            },
            None => defaults.resume,
        };

        let green_washing = match &self.green_washing {
            Some(gw) => {
                let d = defaults.green_washing;
                GreenWashingThresholds {
                    high_fork_ratio: gw.high_fork_ratio.unwrap_or(d.high_fork_ratio),
                    moderate_fork_ratio: gw.moderate_fork_ratio.unwrap_or(d.moderate_fork_ratio),
                    engagement_floor: gw.engagement_floor.unwrap_or(d.engagement_floor),
                    engagement_min_repos: gw
                        .engagement_min_repos
                        .unwrap_or(d.engagement_min_repos),
                    velocity_repos: gw.velocity_repos.unwrap_or(d.velocity_repos),
                    velocity_window_days: gw
                        .velocity_window_days
                        .unwrap_or(d.velocity_window_days),
                    low_quality_ratio: gw.low_quality_ratio.unwrap_or(d.low_quality_ratio),
                    activity_floor: gw.activity_floor.unwrap_or(d.activity_floor),
                    activity_window_days: gw
                        .activity_window_days
                        .unwrap_or(d.activity_window_days),
                }
            }
            None => defaults.green_washing,
        };

        let risk = match &self.risk {
            Some(risk) => RiskCutoffs {
                critical_below: risk.critical_below.unwrap_or(defaults.risk.critical_below),
                high_below: risk.high_below.unwrap_or(defaults.risk.high_below),
                medium_below: risk.medium_below.unwrap_or(defaults.risk.medium_below),
            },
            None => defaults.risk,
        };

        ScoringSettings {
            half_life_months: self
                .decay
                .as_ref()
                .and_then(|decay| decay.half_life_months)
                .unwrap_or(defaults.half_life_months),
            resume,
            weights: self.weights(),
            green_washing,
            risk,
            max_findings: self
                .synthesis
                .as_ref()
                .and_then(|synthesis| synthesis.max_findings)
                .unwrap_or(defaults.max_findings),
            fetch_timeout_secs: self
                .fetch
                .as_ref()
                .and_then(|fetch| fetch.timeout_secs)
                .unwrap_or(defaults.fetch_timeout_secs),
        }
    }

    pub fn validate(&self) -> Result<(), DeepSignalError> {
        if let Some(weights) = &self.weights {
            const ALLOWED_WEIGHT_KEYS: [&str; 2] = [RESUME_AGENT, GITHUB_AGENT];
            let mut unknown = weights
                .keys()
                .filter(|key| !ALLOWED_WEIGHT_KEYS.contains(&key.as_str()))
                .cloned()
                .collect::<Vec<_>>();
            if !unknown.is_empty() {
                unknown.sort();
                return Err(DeepSignalError::Configuration(format!(
                    "weights contains unknown key(s): {}",
                    unknown.join(", ")
                )));
            }
        }

        self.settings().validate()
    }
}

impl ScoringSettings {
    pub fn validate(&self) -> Result<(), DeepSignalError> {
        if !(self.half_life_months.is_finite() && self.half_life_months > 0.0) {
            return Err(DeepSignalError::Configuration(format!(
                "decay.half_life_months must be greater than 0 (found {})",
                self.half_life_months
            )));
        }

        if self
            .weights
            .values()
            .any(|weight| !(0.0..=1.0).contains(weight))
        {
            return Err(DeepSignalError::Configuration(
                "weights values must be between 0.0 and 1.0".to_string(),
            ));
        }
        let weight_sum: f64 = self.weights.values().sum();
        if weight_sum <= 0.0 {
            return Err(DeepSignalError::Configuration(
                "weights must not all be zero".to_string(),
            ));
        }

        let resume = &self.resume;
        for (name, value) in [
            ("resume.unverified_penalty", resume.unverified_penalty),
            ("resume.decay_medium_below", resume.decay_medium_below),
            ("resume.decay_high_below", resume.decay_high_below),
            ("green_washing.engagement_floor", self.green_washing.engagement_floor),
        ] {
            if !value.is_finite() {
                return Err(DeepSignalError::Configuration(format!(
                    "{name} must be a finite number (found {value})"
                )));
            }
        }
        if resume.unverified_penalty < 0.0 {
            return Err(DeepSignalError::Configuration(
                "resume.unverified_penalty must not be negative".to_string(),
            ));
        }
        if resume.decay_high_below > resume.decay_medium_below {
            return Err(DeepSignalError::Configuration(
                "resume.decay_high_below must not exceed resume.decay_medium_below".to_string(),
            ));
        }

        let gw = &self.green_washing;
        for (name, value) in [
            ("green_washing.high_fork_ratio", gw.high_fork_ratio),
            ("green_washing.moderate_fork_ratio", gw.moderate_fork_ratio),
            ("green_washing.low_quality_ratio", gw.low_quality_ratio),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(DeepSignalError::Configuration(format!(
                    "{name} must be a percentage between 0 and 100"
                )));
            }
        }
        if gw.moderate_fork_ratio > gw.high_fork_ratio {
            return Err(DeepSignalError::Configuration(
                "green_washing.moderate_fork_ratio must not exceed green_washing.high_fork_ratio"
                    .to_string(),
            ));
        }
        if gw.engagement_floor < 0.0 {
            return Err(DeepSignalError::Configuration(
                "green_washing.engagement_floor must not be negative".to_string(),
            ));
        }
        for (name, days) in [
            ("green_washing.velocity_window_days", gw.velocity_window_days),
            ("green_washing.activity_window_days", gw.activity_window_days),
        ] {
            if !(1..=MAX_WINDOW_DAYS).contains(&days) {
                return Err(DeepSignalError::Configuration(format!(
                    "{name} must be between 1 and {MAX_WINDOW_DAYS} (found {days})"
                )));
            }
        }

        let risk = &self.risk;
        if !(0.0..=100.0).contains(&risk.critical_below)
            || !(0.0..=100.0).contains(&risk.medium_below)
            || !(risk.critical_below < risk.high_below && risk.high_below < risk.medium_below)
        {
            return Err(DeepSignalError::Configuration(
                "risk cutoffs must satisfy 0 <= critical_below < high_below < medium_below <= 100"
                    .to_string(),
            ));
        }

        if self.max_findings == 0 {
            return Err(DeepSignalError::Configuration(
                "synthesis.max_findings must be greater than 0".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(DeepSignalError::Configuration(
                "fetch.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let cfg: DeepSignalConfig = toml::from_str("").expect("empty config should parse");
        let settings = cfg.settings();
        assert_eq!(settings, ScoringSettings::default());
        assert_eq!(settings.half_life_months, 18.0);
        assert_eq!(settings.weight_for(RESUME_AGENT), 0.5);
        assert_eq!(settings.weight_for(GITHUB_AGENT), 0.5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_full_config_overrides_defaults() {
        let toml_str = r#"
[decay]
half_life_months = 24.0

[resume]
unverified_penalty = 4.0

[weights]
resume = 0.7
github = 0.3

[green_washing]
high_fork_ratio = 80
engagement_min_repos = 3
activity_floor = 10

[risk]
critical_below = 35
high_below = 50
medium_below = 65

[synthesis]
max_findings = 3

[fetch]
timeout_secs = 2
"#;
        let cfg: DeepSignalConfig = toml::from_str(toml_str).expect("full config should parse");
        assert!(cfg.validate().is_ok());

        let settings = cfg.settings();
        assert_eq!(settings.half_life_months, 24.0);
        assert_eq!(settings.resume.unverified_penalty, 4.0);
        assert_eq!(settings.resume.decay_medium_below, 30.0);
        assert_eq!(settings.weight_for(RESUME_AGENT), 0.7);
        assert_eq!(settings.green_washing.high_fork_ratio, 80.0);
        assert_eq!(settings.green_washing.moderate_fork_ratio, 50.0);
        assert_eq!(settings.green_washing.engagement_min_repos, 3);
        assert_eq!(settings.green_washing.activity_floor, 10);
        assert_eq!(settings.risk.critical_below, 35.0);
        assert_eq!(settings.max_findings, 3);
        assert_eq!(settings.fetch_timeout_secs, 2);
    }

    #[test]
    fn validate_rejects_negative_half_life() {
        let cfg: DeepSignalConfig = toml::from_str(
            r#"
[decay]
half_life_months = -3.0
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(matches!(err, DeepSignalError::Configuration(_)));
        assert!(err.to_string().contains("half_life_months"));
    }

    #[test]
    fn validate_rejects_weight_outside_unit_interval() {
        let cfg: DeepSignalConfig = toml::from_str(
            r#"
[weights]
resume = 1.5
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("between 0.0 and 1.0"));
    }

    #[test]
    fn validate_rejects_all_zero_weights() {
        let cfg: DeepSignalConfig = toml::from_str(
            r#"
[weights]
resume = 0.0
github = 0.0
"#,
        )
        .expect("config should parse");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_weight_keys() {
        let cfg: DeepSignalConfig = toml::from_str(
            r#"
[weights]
resume = 0.5
github = 0.5
linkedin = 0.1
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("unknown key"));
        assert!(err.to_string().contains("linkedin"));
    }

    #[test]
    fn validate_rejects_unordered_risk_cutoffs() {
        let cfg: DeepSignalConfig = toml::from_str(
            r#"
[risk]
critical_below = 60
high_below = 55
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("risk cutoffs"));
    }

    #[test]
    fn validate_rejects_inverted_fork_thresholds() {
        let cfg: DeepSignalConfig = toml::from_str(
            r#"
[green_washing]
high_fork_ratio = 40
"#,
        )
        .expect("config should parse");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_windows() {
        for section in [
            "[green_washing]\nvelocity_window_days = 4000000000\n",
            "[green_washing]\nactivity_window_days = 36501\n",
            "[green_washing]\nvelocity_window_days = 0\n",
        ] {
            let cfg: DeepSignalConfig = toml::from_str(section).expect("config should parse");
            let err = cfg.validate().expect_err("validation should fail");
            assert!(err.to_string().contains("window_days"), "{section}: {err}");
        }

        let cfg: DeepSignalConfig =
            toml::from_str("[green_washing]\nvelocity_window_days = 36500\n")
                .expect("config should parse");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_finite_thresholds() {
        for section in [
            "[resume]\nunverified_penalty = nan\n",
            "[resume]\ndecay_medium_below = inf\n",
            "[resume]\ndecay_high_below = nan\n",
            "[green_washing]\nengagement_floor = nan\n",
        ] {
            let cfg: DeepSignalConfig = toml::from_str(section).expect("config should parse");
            let err = cfg.validate().expect_err("validation should fail");
            assert!(err.to_string().contains("finite"), "{section}: {err}");
        }
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let cfg: DeepSignalConfig = toml::from_str(
            r#"
[fetch]
timeout_secs = 0
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("fetch.timeout_secs"));
    }
}
