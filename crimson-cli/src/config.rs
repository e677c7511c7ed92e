//! Configuration handling for the crimson CLI
//!
//! Supports loading configuration from crimson.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crimson_core::{AlignmentMode, MapperOptions, ScoreParams, StrandModel};

use crate::error::CliError;

pub const DEFAULT_CONFIG_FILE: &str = "crimson.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub align: AlignConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// K-mer length (1..=16)
    #[serde(default = "default_k")]
    pub k: u32,

    /// Number of consecutive k-mers per minimizer window
    #[serde(default = "default_w")]
    pub w: u32,

    /// Fraction of the most frequent minimizers dropped from the index
    #[serde(default = "default_filter_fraction")]
    pub filter_fraction: f64,

    /// Second strand encoding used for canonical k-mers
    #[serde(default)]
    pub strand_model: StrandModel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignConfig {
    /// Compute a base-level alignment for every mapped fragment
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub mode: AlignmentMode,

    #[serde(rename = "match", default = "default_match")]
    pub match_score: i32,

    #[serde(default = "default_mismatch")]
    pub mismatch: i32,

    #[serde(default = "default_gap")]
    pub gap: i32,

    /// Affine gap opening; affine scoring needs both open and extend nonzero
    #[serde(default)]
    pub gap_open: i32,

    #[serde(default)]
    pub gap_extend: i32,

    /// Largest DP grid size (cells) that will be aligned
    #[serde(default = "default_max_cells")]
    pub max_cells: u64,
}

fn default_k() -> u32 { 15 }
fn default_w() -> u32 { 10 }
fn default_filter_fraction() -> f64 { 0.001 }
fn default_match() -> i32 { 3 }
fn default_mismatch() -> i32 { -5 }
fn default_gap() -> i32 { -4 }
fn default_max_cells() -> u64 { 100_000_000 }

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            w: default_w(),
            filter_fraction: default_filter_fraction(),
            strand_model: StrandModel::default(),
        }
    }
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: AlignmentMode::default(),
            match_score: default_match(),
            mismatch: default_mismatch(),
            gap: default_gap(),
            gap_open: 0,
            gap_extend: 0,
            max_cells: default_max_cells(),
        }
    }
}

impl AlignConfig {
    pub fn score_params(&self) -> ScoreParams {
        ScoreParams::linear(self.match_score, self.mismatch, self.gap).with_affine(self.gap_open, self.gap_extend)
    }

    pub fn mapper_options(&self) -> MapperOptions {
        MapperOptions {
            align: self.enabled,
            mode: self.mode,
            score: self.score_params(),
            max_align_cells: self.max_cells,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::file_not_found(path.to_path_buf()).into());
        }
        let content = std::fs::read_to_string(path)
            .map_err(CliError::from)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(CliError::from)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(CliError::from)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Default configuration rendered as TOML
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default())
            .map_err(CliError::from)
            .context("Failed to serialize default configuration")
    }
}
