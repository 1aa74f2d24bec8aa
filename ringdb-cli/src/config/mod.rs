//! Run configuration
//!
//! Loaded from TOML (`--config <path>`, else `<config dir>/ringdb/config.toml`
//! when present) with defaults for every field. CLI flags are applied on top.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::schema::{DEFAULT_PREVIEW_ROWS, DEFAULT_THRESHOLD, DROP_THRESHOLD};

/// Application directory name under the platform config dir
const APP_DIR: &str = "ringdb";
const CONFIG_FILE: &str = "config.toml";

/// Complete configuration of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thresholds: ThresholdConfig,
    pub sanitize: SanitizeConfig,
    pub output: OutputConfig,
    pub run: RunConfig,
    /// Default `env_logger` filter
    pub log_level: String,
}

/// Similarity thresholds for name reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub sheet: f64,
    pub column: f64,
    /// Drop-site request lists are noisier
    pub drop_site: f64,
}

/// Header sanitizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeConfig {
    /// Leading rows scanned for a real header
    pub preview_rows: usize,
}

/// Output naming and placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Label in update file names (`<date>-Week <w>-<label>-<version>.xlsx`)
    pub label: String,
    /// chrono format of the date stamp in file names and `date_updated`
    pub date_format: String,
}

/// Failure policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Abort the run on an ambiguous Length entry instead of skipping the ring
    pub strict_ambiguity: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            sanitize: SanitizeConfig::default(),
            output: OutputConfig::default(),
            run: RunConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            sheet: DEFAULT_THRESHOLD,
            column: DEFAULT_THRESHOLD,
            drop_site: DROP_THRESHOLD,
        }
    }
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            label: "TBG".to_string(),
            date_format: "%Y%m%d".to_string(),
        }
    }
}

impl Config {
    /// Default config file location, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from an explicit path, else the default location, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_file(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.directory = dir.into();
        self
    }

    pub fn with_strict_ambiguity(mut self, strict: bool) -> Self {
        self.run.strict_ambiguity = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[thresholds]\ncolumn = 0.9\n\n[run]\nstrict_ambiguity = true").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.thresholds.column, 0.9);
        assert_eq!(config.thresholds.sheet, 0.85);
        assert_eq!(config.thresholds.drop_site, 0.7);
        assert!(config.run.strict_ambiguity);
        assert_eq!(config.output.label, "TBG");
        assert_eq!(config.sanitize.preview_rows, 5);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default()
            .with_output_dir("/tmp/out")
            .with_strict_ambiguity(true);
        assert_eq!(config.output.directory, PathBuf::from("/tmp/out"));
        assert!(config.run.strict_ambiguity);
    }
}
