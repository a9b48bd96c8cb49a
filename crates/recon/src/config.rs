use serde::Deserialize;

use crate::error::ReconError;
use crate::model::KeySpec;

pub const DEFAULT_THRESHOLD: u8 = 80;
pub const DEFAULT_LIMIT: usize = 1;

// ---------------------------------------------------------------------------
// Engine parameters
// ---------------------------------------------------------------------------

/// Matching knobs shared by every reconciliation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeParams {
    /// Minimum similarity (0-100) for a candidate to count as a match.
    pub threshold: u8,
    /// Candidates kept per query. Values above 1 turn the match string into
    /// a comma-joined list, which rarely equals any single right key.
    pub limit: usize,
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl MergeParams {
    pub fn validate(&self) -> Result<(), ReconError> {
        if self.threshold > 100 {
            return Err(ReconError::InvalidParameter(format!(
                "threshold must be between 0 and 100, got {}",
                self.threshold
            )));
        }
        if self.limit == 0 {
            return Err(ReconError::InvalidParameter(
                "limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MergeConfig {
    pub name: String,
    pub key: Vec<String>,
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Path to the stop-word JSON resource, relative to the config file.
    #[serde(default)]
    pub stop_words: Option<String>,
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub file: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    pub json: Option<String>,
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MergeConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: MergeConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        self.key_spec()?;
        self.params().validate()?;

        if self.sources.is_empty() {
            return Err(ReconError::EmptySources);
        }

        for (i, source) in self.sources.iter().enumerate() {
            if source.name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "source #{} has an empty name",
                    i + 1
                )));
            }
            if source.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "source '{}' has an empty file path",
                    source.name
                )));
            }
            if self.sources[..i].iter().any(|s| s.name == source.name) {
                return Err(ReconError::ConfigValidation(format!(
                    "source name '{}' is used more than once",
                    source.name
                )));
            }
        }

        Ok(())
    }

    pub fn key_spec(&self) -> Result<KeySpec, ReconError> {
        KeySpec::new(self.key.iter().cloned())
    }

    pub fn params(&self) -> MergeParams {
        MergeParams {
            threshold: self.threshold,
            limit: self.limit,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
