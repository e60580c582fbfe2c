//! Engine configuration, fixed for the lifetime of an engine.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Smallest window that still leaves a closed slice behind the open one
/// plus one slice of history.
pub const MIN_WINDOW_LEN: usize = 3;

/// Configuration for [`ProductionAnalytics`](crate::ProductionAnalytics).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyticsConfig {
    /// Number of slices retained per data source (W).
    pub window_len: usize,
    /// Seconds covered by one slice.
    pub slice_duration_secs: f64,
    /// Older closed slices consulted when zero-filling `current_rates` (K).
    pub lookback: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            window_len: 100,
            slice_duration_secs: 10.0,
            lookback: 10,
        }
    }
}

/// Errors from building or loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("window length {window_len} is too short (minimum {MIN_WINDOW_LEN})")]
    WindowTooShort { window_len: usize },

    #[error("lookback {lookback} exceeds window length minus {MIN_WINDOW_LEN} ({max})")]
    LookbackTooDeep { lookback: usize, max: usize },

    #[error("slice duration must be a positive number of seconds, got {0}")]
    InvalidSliceDuration(f64),

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalyticsConfig {
    /// Check the window/lookback relationship and the slice duration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_len < MIN_WINDOW_LEN {
            return Err(ConfigError::WindowTooShort {
                window_len: self.window_len,
            });
        }
        let max = self.max_history_offset();
        if self.lookback > max {
            return Err(ConfigError::LookbackTooDeep {
                lookback: self.lookback,
                max,
            });
        }
        if !self.slice_duration_secs.is_finite() || self.slice_duration_secs <= 0.0 {
            return Err(ConfigError::InvalidSliceDuration(self.slice_duration_secs));
        }
        Ok(())
    }

    /// Largest offset accepted by `past_rate`. Only meaningful once validated.
    pub fn max_history_offset(&self) -> usize {
        self.window_len.saturating_sub(MIN_WINDOW_LEN)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Self::parse_toml(input, Path::new("<inline>"))
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content, path)
    }

    fn parse_toml(input: &str, file: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse {
            file: file.to_path_buf(),
            detail: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.window_len, 100);
        assert_eq!(config.slice_duration_secs, 10.0);
        assert_eq!(config.lookback, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn window_of_two_is_rejected() {
        let config = AnalyticsConfig {
            window_len: 2,
            lookback: 0,
            ..AnalyticsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WindowTooShort { window_len: 2 })
        ));
    }

    #[test]
    fn minimum_window_with_zero_lookback_is_accepted() {
        let config = AnalyticsConfig {
            window_len: 3,
            lookback: 0,
            ..AnalyticsConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.max_history_offset(), 0);
    }

    #[test]
    fn lookback_deeper_than_window_is_rejected() {
        let config = AnalyticsConfig {
            window_len: 5,
            lookback: 3,
            ..AnalyticsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LookbackTooDeep { lookback: 3, max: 2 })
        ));
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        for duration in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = AnalyticsConfig {
                slice_duration_secs: duration,
                ..AnalyticsConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidSliceDuration(_))),
                "duration {duration} should be rejected"
            );
        }
    }

    #[test]
    fn parse_toml_with_defaults() {
        let config = AnalyticsConfig::from_toml_str("window_len = 20\n").unwrap();
        assert_eq!(config.window_len, 20);
        assert_eq!(config.slice_duration_secs, 10.0);
        assert_eq!(config.lookback, 10);
    }

    #[test]
    fn parse_toml_full() {
        let input = r#"
            window_len = 8
            slice_duration_secs = 1.5
            lookback = 4
        "#;
        let config = AnalyticsConfig::from_toml_str(input).unwrap();
        assert_eq!(
            config,
            AnalyticsConfig {
                window_len: 8,
                slice_duration_secs: 1.5,
                lookback: 4,
            }
        );
    }

    #[test]
    fn parse_toml_validates() {
        let err = AnalyticsConfig::from_toml_str("window_len = 1\nlookback = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::WindowTooShort { window_len: 1 }));
    }

    #[test]
    fn parse_toml_rejects_unknown_fields() {
        let err = AnalyticsConfig::from_toml_str("window = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = AnalyticsConfig::load(Path::new("/nonexistent/shapeflow.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
