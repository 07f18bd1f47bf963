//! `checkpoint.toml` loading and CLI overrides.
//!
//! ```toml
//! [checkpoint]
//! interval = 10
//! actions = ["echo", "ttyout=%c"]
//!
//! [simulate]
//! archive = "archive.tar"
//! blocks = 100
//! record_size = 10240
//! mode = "write"
//! delay_ms = 0
//! ```
//!
//! Every field is optional. Unknown fields are reported and ignored.

use crate::cli::Cli;
use crate::log;
use crate::simulate::{BLOCK_SIZE, DEFAULT_RECORD_SIZE, Mode};
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "checkpoint.toml";

// ============================================================================
// ConfigError
// ============================================================================

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}

// ============================================================================
// Sections
// ============================================================================

/// `[checkpoint]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Records between firings. Unset means checkpoints only run when
    /// actions are configured, every 10 records.
    pub interval: Option<u64>,
    /// Action specs, compiled in order.
    pub actions: Vec<String>,
}

/// `[simulate]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulateConfig {
    pub archive: String,
    pub blocks: u64,
    pub record_size: u64,
    pub mode: Mode,
    pub delay_ms: u64,
}

impl Default for SimulateConfig {
    fn default() -> Self {
        Self {
            archive: "archive.tar".into(),
            blocks: 100,
            record_size: DEFAULT_RECORD_SIZE,
            mode: Mode::default(),
            delay_ms: 0,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub checkpoint: CheckpointConfig,
    pub simulate: SimulateConfig,
}

// ============================================================================
// Loading
// ============================================================================

impl Config {
    /// Load the config file and apply CLI overrides.
    ///
    /// Without `--config`, a missing `checkpoint.toml` means defaults. An
    /// explicit path must exist.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_path(&expand_path(path))?,
            None => {
                let path = Path::new(DEFAULT_CONFIG);
                if path.exists() {
                    Self::from_path(path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        crate::debug!("config"; "loaded {}", path.display());
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        log!("warning"; "unknown fields in {}, ignoring:", path.display());
        for field in fields {
            eprintln!("- {field}");
        }
    }

    // ========================================================================
    // CLI overrides
    // ========================================================================

    /// CLI values win over the file; CLI actions run after the file's.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.checkpoint.is_some() {
            self.checkpoint.interval = cli.checkpoint;
        }
        self.checkpoint
            .actions
            .extend(cli.checkpoint_action.iter().cloned());

        Self::update_option(&mut self.simulate.archive, cli.archive.as_ref());
        Self::update_option(&mut self.simulate.blocks, cli.blocks.as_ref());
        Self::update_option(&mut self.simulate.record_size, cli.record_size.as_ref());
        Self::update_option(&mut self.simulate.mode, cli.mode.as_ref());
        Self::update_option(&mut self.simulate.delay_ms, cli.delay_ms.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    pub fn validate(&self) -> Result<()> {
        let size = self.simulate.record_size;
        if size == 0 || size % BLOCK_SIZE != 0 {
            return Err(ConfigError::Validation(format!(
                "record_size must be a positive multiple of {BLOCK_SIZE}, got {size}"
            ))
            .into());
        }
        Ok(())
    }

    /// Interval to hand to the engine; 0 when checkpoints were not requested.
    pub fn interval(&self) -> u64 {
        self.checkpoint.interval.unwrap_or(0)
    }
}

/// Expand `~` in a user-supplied path.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

// ============================================================================
// Tests
// ============================================================================
