//! Configuration management for corinfo
//!
//! Config file location:
//! - Linux: ~/.config/corinfo/config.toml
//! - macOS: ~/Library/Application Support/org.corinfo.corinfo/config.toml
//! - Windows: %APPDATA%/corinfo/corinfo/config/config.toml
//!
//! You can override the config location by setting `CORINFO_CONFIG_PATH`
//! or passing `--config`.

use anyhow::{Context, Result};
use clap::ValueEnum;
use corinfo::Sources;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Diagnostic source locations
    #[serde(default)]
    pub sources: Sources,

    /// Output preferences
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from file or fall back to defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = Self::config_path(explicit)?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

            let config: Config = toml::from_str(&content).with_context(|| {
                format!("Failed to parse config from {}", config_path.display())
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        let config_path = Self::config_path(explicit)?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, toml)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(config_path)
    }

    /// Get the configuration file path
    pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        if let Ok(path) = std::env::var("CORINFO_CONFIG_PATH") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let proj_dirs = ProjectDirs::from("org", "corinfo", "corinfo")
            .context("Could not determine project directories")?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

/// Output preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Number of consecutive snapshots to take
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            repeat: default_repeat(),
        }
    }
}

fn default_repeat() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sources, Sources::default());
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.output.repeat, 1);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();

        assert!(toml.contains("[sources]"));
        assert!(toml.contains("cpuinfo_path"));
        assert!(toml.contains("frequency_value"));
        assert!(toml.contains("[output]"));
        assert!(toml.contains("format = \"text\""));
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[sources]\ncpuinfo_path = \"/tmp/fake-cpuinfo\"\n\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.sources.cpuinfo_path, PathBuf::from("/tmp/fake-cpuinfo"));
        assert_eq!(config.sources.frequency_value, "~MHz");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.repeat, 1);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[output]\nformat = \"yaml\"\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.output.repeat = 3;
        let written = config.save(Some(&path)).unwrap();
        assert_eq!(written, path);

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }
}
