use crate::error::{DeepSignalError, Result};
use crate::types::config::{DeepSignalConfig, ScoringSettings};
use std::path::{Path, PathBuf};
use toml::map::Map;
use toml::Value;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "deepsignal.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".deepsignal/local.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/deepsignal/config.toml";

/// Resolves settings from the global file, then `explicit` (or `./deepsignal.toml`), then
/// the local override next to it. No files at all means defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<ScoringSettings> {
    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_settings_with_global(Path::new("."), explicit, global.as_deref())
}

pub(crate) fn load_settings_with_global(
    root: &Path,
    explicit: Option<&Path>,
    global_path: Option<&Path>,
) -> Result<ScoringSettings> {
    let repo_path = match explicit {
        Some(path) if !path.exists() => {
            return Err(DeepSignalError::InputNotFound(path.display().to_string()))
        }
        Some(path) => path.to_path_buf(),
        None => root.join(DEFAULT_CONFIG_FILE),
    };
    let local_root = repo_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(root);

    let mut merged = Value::Table(Map::new());
    if let Some(path) = global_path {
        merge_file_if_exists(&mut merged, path)?;
    }
    merge_file_if_exists(&mut merged, &repo_path)?;
    merge_file_if_exists(&mut merged, &local_root.join(DEFAULT_LOCAL_FILE))?;

    let cfg: DeepSignalConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| DeepSignalError::ConfigParse(e.to_string()))?;
    cfg.validate()?;
    Ok(cfg.settings())
}

fn merge_file_if_exists(merged: &mut Value, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    debug!(path = %path.display(), "merging config layer");
    let value = read_toml_value(path)?;
    merge_toml(merged, value);
    Ok(())
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| DeepSignalError::ConfigParse(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}

/// Renders effective settings in the same section layout `deepsignal.toml` accepts.
pub fn render_settings(settings: &ScoringSettings) -> Result<String> {
    let mut root = Map::new();

    let mut decay = Map::new();
    decay.insert(
        "half_life_months".to_string(),
        Value::Float(settings.half_life_months),
    );
    root.insert("decay".to_string(), Value::Table(decay));
    root.insert("resume".to_string(), Value::try_from(settings.resume)?);
    root.insert("weights".to_string(), Value::try_from(&settings.weights)?);
    root.insert(
        "green_washing".to_string(),
        Value::try_from(settings.green_washing)?,
    );
    root.insert("risk".to_string(), Value::try_from(settings.risk)?);

    let mut synthesis = Map::new();
    synthesis.insert(
        "max_findings".to_string(),
        Value::Integer(settings.max_findings as i64),
    );
    root.insert("synthesis".to_string(), Value::Table(synthesis));

    let mut fetch = Map::new();
    fetch.insert(
        "timeout_secs".to_string(),
        Value::Integer(settings.fetch_timeout_secs as i64),
    );
    root.insert("fetch".to_string(), Value::Table(fetch));

    Ok(toml::to_string(&Value::Table(root))?)
}
