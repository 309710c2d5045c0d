//! Configuration for the reconciliation pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the porec pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PorecConfig {
    /// Header/row extraction configuration.
    pub extraction: ExtractionConfig,

    /// Matching and resolution configuration.
    pub matching: MatchingConfig,
}

/// Extraction tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// How many lines past a header label to scan for a bare value.
    pub header_lookahead_lines: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            header_lookahead_lines: 2,
        }
    }
}

/// Matching and resolution tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum Jaccard token overlap for the branch-alias similarity
    /// fallback. A candidate must score strictly above this to be accepted.
    pub branch_score_threshold: f32,

    /// Lowest order number ever assigned; numbering starts here even on an
    /// empty database.
    pub order_number_floor: u64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            branch_score_threshold: 0.5,
            order_number_floor: 1,
        }
    }
}

impl PorecConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
