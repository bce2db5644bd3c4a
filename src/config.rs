use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use crate::models::DEFAULT_STAGE_SLUG;
use crate::nav::Role;

/// Default dedup window for stage-move idempotency markers (5 minutes)
pub const DEFAULT_DEDUP_WINDOW_SECS: i64 = 300;

/// Runtime configuration read from `~/.vant/rc`
///
/// The rc file is a list of `key=value` lines. Blank lines and lines starting
/// with `#` are ignored, as are unknown keys.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_location: Option<PathBuf>,
    pub pipeline: PipelineConfig,
    pub role: Role,
}

/// Pipeline settings shared by the backend and the board view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Slug of the stage new leads are placed in
    pub default_stage: String,
    /// Stage slugs left out of the board view
    pub hidden_stages: Vec<String>,
    /// Idempotency markers older than this do not suppress a move
    pub dedup_window_secs: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_stage: DEFAULT_STAGE_SLUG.to_string(),
            hidden_stages: vec!["closed_lost".to_string()],
            dedup_window_secs: DEFAULT_DEDUP_WINDOW_SECS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_location: None,
            pipeline: PipelineConfig::default(),
            role: Role::Advisor,
        }
    }
}

impl Config {
    /// Directory holding the rc file and default database
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Failed to determine home directory")?;
        Ok(home.join(".vant"))
    }

    /// Path of the configuration file
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("rc"))
    }

    /// Load configuration from `~/.vant/rc`, falling back to defaults when
    /// the file does not exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content, path.parent())
    }

    /// Parse rc file content. Relative `data.location` paths resolve against
    /// `base_dir` when given.
    pub fn parse(content: &str, base_dir: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        for (line_no, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                anyhow::bail!("Invalid config line {}: '{}' (expected key=value)", line_no + 1, line);
            };
            let value = value.trim();

            match key.trim() {
                "data.location" => {
                    let path = PathBuf::from(value);
                    config.data_location = Some(match base_dir {
                        Some(dir) if path.is_relative() => dir.join(path),
                        _ => path,
                    });
                }
                "pipeline.default_stage" => {
                    if value.is_empty() {
                        anyhow::bail!("pipeline.default_stage cannot be empty");
                    }
                    config.pipeline.default_stage = value.to_string();
                }
                "pipeline.hidden_stages" => {
                    config.pipeline.hidden_stages = value
                        .split(',')
                        .map(|s| s.trim())
                        .filter(|s| !s.is_empty())
                        .map(|s| s.to_string())
                        .collect();
                }
                "pipeline.dedup_window_secs" => {
                    config.pipeline.dedup_window_secs = value.parse::<i64>()
                        .ok()
                        .filter(|secs| *secs >= 0)
                        .with_context(|| format!("Invalid pipeline.dedup_window_secs: '{}'", value))?;
                }
                "user.role" => {
                    config.role = Role::from_str(value)
                        .with_context(|| format!("Unknown role in config: '{}'", value))?;
                }
                other => {
                    log::debug!("Ignoring unknown config key '{}'", other);
                }
            }
        }

        Ok(config)
    }
}
