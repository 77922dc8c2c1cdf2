use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MatchError, Result};

/// Default minimum title score for a confident match
pub const DEFAULT_TITLE_SIMILARITY_THRESHOLD: f64 = 80.0;

/// Default field delimiter for input and output tables
pub const DEFAULT_DELIMITER: char = ';';

/// Run-wide decision parameters for the group resolver.
///
/// `gap` has no default: it must be supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// `TITLE_SIMILARITY_THRESHOLD`, scores at or above it are `OK`
    pub threshold: f64,

    /// `DYNAMIC_THRESHOLD_GAP`, required margin between best and runner-up
    pub gap: f64,
}

impl MatchConfig {
    /// Create a validated config
    pub fn new(threshold: f64, gap: f64) -> Result<Self> {
        if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
            return Err(MatchError::Config(format!(
                "TITLE_SIMILARITY_THRESHOLD must be within 0..=100, got {}",
                threshold
            )));
        }
        if !gap.is_finite() || gap <= 0.0 {
            return Err(MatchError::Config(format!(
                "DYNAMIC_THRESHOLD_GAP must be a positive number, got {}",
                gap
            )));
        }
        Ok(Self { threshold, gap })
    }

    /// Config with the default threshold and the given gap
    pub fn with_gap(gap: f64) -> Result<Self> {
        Self::new(DEFAULT_TITLE_SIMILARITY_THRESHOLD, gap)
    }
}

/// Optional YAML config file.
///
/// ```yaml
/// title_similarity_threshold: 80
/// dynamic_threshold_gap: 15
/// delimiter: ";"
/// workers: 4
/// columns: [KundenNr, SearchString, title, street, phone]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub title_similarity_threshold: Option<f64>,

    #[serde(default)]
    pub dynamic_threshold_gap: Option<f64>,

    #[serde(default)]
    pub delimiter: Option<char>,

    /// Size of the rayon pool used for group resolution
    #[serde(default)]
    pub workers: Option<usize>,

    /// Original columns to keep in the output partitions
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

impl FileConfig {
    /// Load from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MatchError::Config(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Build a [`MatchConfig`], letting explicit overrides win over file values
    pub fn match_config(&self, threshold: Option<f64>, gap: Option<f64>) -> Result<MatchConfig> {
        let threshold = threshold
            .or(self.title_similarity_threshold)
            .unwrap_or(DEFAULT_TITLE_SIMILARITY_THRESHOLD);
        let gap = gap.or(self.dynamic_threshold_gap).ok_or_else(|| {
            MatchError::Config("DYNAMIC_THRESHOLD_GAP must be supplied".to_string())
        })?;
        MatchConfig::new(threshold, gap)
    }

    /// Delimiter as a single byte
    pub fn delimiter_byte(&self, delimiter: Option<char>) -> Result<u8> {
        delimiter_byte(delimiter.or(self.delimiter).unwrap_or(DEFAULT_DELIMITER))
    }
}

/// Validate a delimiter for the csv crate, which only handles single bytes
pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(MatchError::Config(format!(
            "Delimiter must be a single ASCII character, got '{}'",
            delimiter
        )))
    }
}
