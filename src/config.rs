//! Engine configuration.
//!
//! Handles loading tuning thresholds from environment variables and .env files.

use dotenv::dotenv;
use std::env;
use crate::error::{Error, Result};

/// Tunable thresholds for the alignment engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// How many external words past the cursor the primary pass may skip
    pub lookahead_window: usize,
    /// Minimum matched/countable word ratio for a recovered line to be committed
    pub recovery_min_match_ratio: f64,
    /// Jaccard threshold for matching lyric lines against a baseline chord sheet
    pub line_match_threshold: f64,
    /// Anchors required before a piecewise transform is preferred over a constant offset
    pub min_anchor_count: usize,
    /// Anchors whose shift strays this far from the median shift are discarded
    pub anchor_outlier_ms: f64,
    /// Upper bound on a word duration inferred from the gap to the next word
    pub max_word_duration_ms: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookahead_window: 8,
            recovery_min_match_ratio: 0.5,
            line_match_threshold: crate::constants::matching::DEFAULT_THRESHOLD,
            min_anchor_count: 3,
            anchor_outlier_ms: 2_000.0,
            max_word_duration_ms: 2_000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();

        let mut config = Self::default();

        if let Some(window) = read_var::<usize>("CHORDSYNC_LOOKAHEAD_WINDOW")? {
            config.lookahead_window = window;
        }

        if let Some(ratio) = read_var::<f64>("CHORDSYNC_RECOVERY_MIN_RATIO")? {
            config.recovery_min_match_ratio = ratio;
        }

        if let Some(threshold) = read_var::<f64>("CHORDSYNC_LINE_MATCH_THRESHOLD")? {
            config.line_match_threshold = threshold;
        }

        if let Some(count) = read_var::<usize>("CHORDSYNC_MIN_ANCHORS")? {
            config.min_anchor_count = count;
        }

        if let Some(ms) = read_var::<f64>("CHORDSYNC_ANCHOR_OUTLIER_MS")? {
            config.anchor_outlier_ms = ms;
        }

        if let Some(ms) = read_var::<i64>("CHORDSYNC_MAX_WORD_DURATION_MS")? {
            config.max_word_duration_ms = ms;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that every threshold is inside its meaningful range
    pub fn validate(&self) -> Result<()> {
        if self.lookahead_window == 0 {
            return Err(Error::config(
                "lookahead window must be at least 1",
                "Set CHORDSYNC_LOOKAHEAD_WINDOW to a positive integer",
            ));
        }
        if !(0.0..=1.0).contains(&self.recovery_min_match_ratio) {
            return Err(Error::config(
                format!("recovery ratio {} is outside [0, 1]", self.recovery_min_match_ratio),
                "Set CHORDSYNC_RECOVERY_MIN_RATIO to a fraction such as 0.5",
            ));
        }
        if !(0.0..1.0).contains(&self.line_match_threshold) {
            return Err(Error::config(
                format!("line match threshold {} is outside [0, 1)", self.line_match_threshold),
                "Set CHORDSYNC_LINE_MATCH_THRESHOLD to a fraction below 1",
            ));
        }
        if self.anchor_outlier_ms.is_nan() || self.anchor_outlier_ms <= 0.0 {
            return Err(Error::config(
                "anchor outlier distance must be positive",
                "Set CHORDSYNC_ANCHOR_OUTLIER_MS to a positive number of milliseconds",
            ));
        }
        if self.max_word_duration_ms <= 0 {
            return Err(Error::config(
                "maximum word duration must be positive",
                "Set CHORDSYNC_MAX_WORD_DURATION_MS to a positive number of milliseconds",
            ));
        }
        Ok(())
    }
}

/// Read and parse an optional environment variable
fn read_var<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>> {
    let Ok(raw) = env::var(key) else {
        return Ok(None);
    };

    raw.trim().parse::<T>().map(Some).map_err(|_| {
        Error::config(
            format!("{key}={raw:?} is not a valid number"),
            "Remove the variable or set it to a plain numeric value",
        )
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.line_match_threshold > 0.0);
    }

    #[test]
    fn validate_rejects_zero_lookahead() {
        let config = EngineConfig { lookahead_window: 0, ..EngineConfig::default() };
        match config.validate() {
            Err(Error::Config { hint, .. }) => assert!(hint.contains("LOOKAHEAD")),
            other => panic!("Expected config error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_ratio_out_of_range() {
        let config = EngineConfig { recovery_min_match_ratio: 1.5, ..EngineConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn read_var_missing_is_none() {
        let value = read_var::<usize>("CHORDSYNC_TEST_SURELY_UNSET_VARIABLE").unwrap();
        assert!(value.is_none());
    }
}
