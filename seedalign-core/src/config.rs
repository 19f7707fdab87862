//! Configuration handling for the aligner
//!
//! Supports loading configuration from seedalign.toml files. Every field has
//! a default, so partial files are accepted.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::alignment::{AlignError, AlignResult};
use crate::chain::{DEFAULT_DIAGONAL_WEIGHT, DEFAULT_LENGTH_WEIGHT, DEFAULT_SEED_LEN};
use crate::gaps::{GAP, NEUTRAL_QUALITY};
use crate::seed::packed::{DEFAULT_MAX_KEY_LEN, MAX_KEY_LEN_LIMIT};
use crate::seed::utils::MAX_PACKED_K;
use crate::seed::{FinderKind, FinderParams};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "seedalign.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlignConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seed length for the whole-sequence search space
    #[serde(default = "default_initial_seed_len")]
    pub initial_seed_len: usize,

    /// Weight of match length in the score
    #[serde(default = "default_length_weight")]
    pub length_weight: f64,

    /// Weight of the diagonal distance in the score
    #[serde(default = "default_diagonal_weight")]
    pub diagonal_weight: f64,

    /// Upper-case matched spans in the output
    #[serde(default = "default_true")]
    pub upcase_matches: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Seed finder to use
    #[serde(default)]
    pub finder: FinderKind,

    /// Step between indexed subject windows (hash_index)
    #[serde(default = "default_step")]
    pub index_step: usize,

    /// Cap on the bucket key length (packed_key)
    #[serde(default = "default_max_key_len")]
    pub max_key_len: usize,

    /// Step between query windows, 0 for the seed length (unique_index)
    #[serde(default)]
    pub query_step: usize,

    /// Step between subject windows (unique_index)
    #[serde(default = "default_step")]
    pub subject_step: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Symbol written at every gap
    #[serde(default = "default_gap_symbol")]
    pub gap_symbol: char,

    /// Quality symbol written alongside every gap
    #[serde(default = "default_neutral_quality")]
    pub neutral_quality: char,
}

// Default value functions
fn default_initial_seed_len() -> usize { DEFAULT_SEED_LEN }
fn default_length_weight() -> f64 { DEFAULT_LENGTH_WEIGHT }
fn default_diagonal_weight() -> f64 { DEFAULT_DIAGONAL_WEIGHT }
fn default_true() -> bool { true }
fn default_step() -> usize { 1 }
fn default_max_key_len() -> usize { DEFAULT_MAX_KEY_LEN }
fn default_gap_symbol() -> char { GAP as char }
fn default_neutral_quality() -> char { NEUTRAL_QUALITY as char }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_seed_len: default_initial_seed_len(),
            length_weight: default_length_weight(),
            diagonal_weight: default_diagonal_weight(),
            upcase_matches: true,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            finder: FinderKind::default(),
            index_step: default_step(),
            max_key_len: default_max_key_len(),
            query_step: 0,
            subject_step: default_step(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            gap_symbol: default_gap_symbol(),
            neutral_quality: default_neutral_quality(),
        }
    }
}

impl OutputConfig {
    pub fn gap_byte(&self) -> u8 {
        self.gap_symbol as u8
    }

    pub fn neutral_quality_byte(&self) -> u8 {
        self.neutral_quality as u8
    }
}

impl AlignConfig {
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

    /// Load and validate configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: AlignConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }

    /// Check value ranges the engine relies on.
    pub fn validate(&self) -> AlignResult<()> {
        let invalid = |msg: String| Err(AlignError::InvalidParams(msg));

        if self.engine.initial_seed_len == 0 {
            return invalid("initial_seed_len must be at least 1".to_string());
        }
        if self.engine.length_weight.is_nan() || self.engine.length_weight <= 0.0 {
            return invalid(format!(
                "length_weight must be positive, got {}",
                self.engine.length_weight
            ));
        }
        if !self.engine.diagonal_weight.is_finite() {
            return invalid("diagonal_weight must be finite".to_string());
        }
        if self.seed.index_step == 0 || self.seed.subject_step == 0 {
            return invalid("index_step and subject_step must be at least 1".to_string());
        }
        if self.seed.max_key_len == 0 || self.seed.max_key_len > MAX_KEY_LEN_LIMIT {
            return invalid(format!(
                "max_key_len must be between 1 and {}, got {}",
                MAX_KEY_LEN_LIMIT, self.seed.max_key_len
            ));
        }
        if self.seed.finder == FinderKind::UniqueIndex && self.engine.initial_seed_len > MAX_PACKED_K {
            return invalid(format!(
                "unique_index supports seed lengths up to {}, got {}",
                MAX_PACKED_K, self.engine.initial_seed_len
            ));
        }
        for (what, symbol) in [
            ("gap_symbol", self.output.gap_symbol),
            ("neutral_quality", self.output.neutral_quality),
        ] {
            if !symbol.is_ascii_graphic() {
                return invalid(format!("{} must be a printable ASCII symbol, got {:?}", what, symbol));
            }
        }

        Ok(())
    }

    /// Seed finder parameters for this configuration.
    pub fn finder_params(&self) -> FinderParams {
        FinderParams {
            kind: self.seed.finder,
            index_step: self.seed.index_step,
            max_key_len: self.seed.max_key_len,
            query_step: self.seed.query_step,
            subject_step: self.seed.subject_step,
        }
    }
}
