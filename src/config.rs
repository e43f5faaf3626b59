//! Search configuration.
//!
//! [`SearchConfig`] is passed to the engine at construction. It can be built in
//! code, or loaded from a JSON file where every field is optional:
//!
//! ```json
//! { "time_budget_ms": 100, "max_depth": 4 }
//! ```

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("max_depth must be at least 1")]
    InvalidDepth,
}

/// Configurable knobs for the alpha-beta engine.
///
/// - `time_budget_ms`: wall-clock budget per move. Checked between depth iterations only.
/// - `max_depth`: optional hard cap on the iterative-deepening depth (in plies).
/// - `pruning`: alpha-beta cutoffs; disabling gives plain minimax at the same depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub time_budget_ms: u64,
    pub max_depth: Option<u32>,
    pub pruning: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { time_budget_ms: 20, max_depth: Some(3), pruning: true }
    }
}

impl SearchConfig {
    /// Per-move time budget.
    #[inline]
    pub fn time_budget(&self) -> Duration { Duration::from_millis(self.time_budget_ms) }

    /// Parse a config from JSON text. Missing fields take their defaults.
    ///
    /// ```
    /// use minimax_2048::config::SearchConfig;
    /// let cfg = SearchConfig::from_json_str(r#"{ "max_depth": null }"#).unwrap();
    /// assert_eq!(cfg.max_depth, None);
    /// assert_eq!(cfg.time_budget_ms, 20);
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: SearchConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.max_depth {
            Some(0) => Err(ConfigError::InvalidDepth),
            _ => Ok(()),
        }
    }
}
