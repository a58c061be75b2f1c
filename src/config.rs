//! Editor configuration.
//!
//! An optional TOML file; resolution order is `--config` flag, then the
//! `DIET_BUILDER_CONFIG` environment variable, then built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::nutrition::constants::{
    DEFAULT_PORTION_GRAMS, MIN_QUERY_LEN, SAVE_REDIRECT_DELAY_MS, SEARCH_DEBOUNCE_MS,
};

pub const CONFIG_ENV_VAR: &str = "DIET_BUILDER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub debounce_ms: u64,
    pub min_query_len: usize,
    pub save_redirect_delay_ms: u64,
    pub default_grams: f64,
    pub store_path: PathBuf,
    pub catalog_path: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: SEARCH_DEBOUNCE_MS,
            min_query_len: MIN_QUERY_LEN,
            save_redirect_delay_ms: SAVE_REDIRECT_DELAY_MS,
            default_grams: DEFAULT_PORTION_GRAMS,
            store_path: PathBuf::from("diet_plans.json"),
            catalog_path: PathBuf::from("food_catalog.csv"),
        }
    }
}

impl EditorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn save_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.save_redirect_delay_ms)
    }
}

/// Parse a config file. Missing keys take their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EditorConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        PlanError::InvalidInput(format!("cannot read config {}: {}", path.display(), e))
    })?;
    let config: EditorConfig = toml::from_str(&content)?;
    if config.min_query_len == 0 {
        return Err(PlanError::InvalidInput(
            "min_query_len must be at least 1".to_string(),
        ));
    }
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Resolve the config: explicit path, then environment, then defaults.
pub fn resolve_config(flag: Option<&Path>) -> Result<EditorConfig> {
    if let Some(path) = flag {
        return load_config(path);
    }
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => load_config(PathBuf::from(path)),
        _ => Ok(EditorConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"debounce_ms = 150\nstore_path = \"/tmp/plans.json\"\n")
            .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(150));
        assert_eq!(config.store_path, PathBuf::from("/tmp/plans.json"));
        assert_eq!(config.min_query_len, MIN_QUERY_LEN);
        assert_eq!(config.default_grams, DEFAULT_PORTION_GRAMS);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"min_query_len = 0\n").unwrap();
        assert!(load_config(file.path()).is_err());

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"debounce_ms = \"fast\"\n").unwrap();
        assert!(matches!(load_config(file.path()), Err(PlanError::Config(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        assert!(resolve_config(Some(Path::new("/nonexistent/diet.toml"))).is_err());
    }
}
