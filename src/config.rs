//! Avoidance configuration — loaded from ~/.yband/config.yaml or an explicit path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kinematics::{feed_to_speed, AvoidanceWindow, TieBreak};

/// Rewriter settings. Every field falls back to its default when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    /// Lower edge of the forbidden Y-speed band (units/s).
    pub min: f64,
    /// Upper edge of the forbidden Y-speed band (units/s).
    pub max: f64,
    /// Distance past the chosen edge a corrected Y-speed lands (units/s).
    pub margin: f64,
    pub tie_break: TieBreak,
    /// Put the intended feed rate back on the move after a corrected one.
    pub restore_feed_rate: bool,
    /// Decimal places written for F values.
    pub feed_decimals: usize,
    /// Decimal places written for E values.
    pub extrusion_decimals: usize,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            min: 90.0,
            max: 110.0,
            margin: 1.0,
            tie_break: TieBreak::Lower,
            restore_feed_rate: true,
            feed_decimals: 1,
            extrusion_decimals: 5,
        }
    }
}

/// Standard config location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".yband").join("config.yaml"))
}

impl AvoidanceConfig {
    /// Load from `path`, or from the standard location when `path` is `None`.
    ///
    /// A missing standard file yields the defaults. An explicit path that
    /// cannot be read, or any file that is not valid YAML, is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| Error::file_access(&path, e))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject windows and margins that cannot produce a sensible rewrite.
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(Error::Config("window bounds must be finite".into()));
        }
        if self.min < 0.0 {
            return Err(Error::Config(format!(
                "minimum speed {} must not be negative",
                self.min
            )));
        }
        if self.min > self.max {
            return Err(Error::Config(format!(
                "minimum speed {} is above maximum {}",
                self.min, self.max
            )));
        }
        if !(self.margin.is_finite() && self.margin > 0.0) {
            return Err(Error::Config(format!(
                "margin {} must be a positive number",
                self.margin
            )));
        }
        // Rounding F must not be able to undo the margin.
        let feed_step = 10f64.powi(-(self.feed_decimals.min(9) as i32));
        if self.margin <= feed_to_speed(feed_step / 2.0) {
            return Err(Error::Config(format!(
                "margin {} is smaller than the F rounding at {} decimals",
                self.margin, self.feed_decimals
            )));
        }
        Ok(())
    }

    pub fn window(&self) -> AvoidanceWindow {
        AvoidanceWindow::new(self.min, self.max, self.margin, self.tie_break)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AvoidanceConfig::default();
        assert_eq!(config.min, 90.0);
        assert_eq!(config.max, 110.0);
        assert_eq!(config.margin, 1.0);
        assert_eq!(config.tie_break, TieBreak::Lower);
        assert!(config.restore_feed_rate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_config() {
        let config = AvoidanceConfig::from_yaml("min: 40\nmax: 55.5\n").unwrap();
        assert_eq!(config.min, 40.0);
        assert_eq!(config.max, 55.5);
        assert_eq!(config.margin, 1.0);
        assert_eq!(config.feed_decimals, 1);
    }

    #[test]
    fn parse_yaml_config() {
        let yaml = r#"
min: 60
max: 75
margin: 0.1
tie_break: upper
restore_feed_rate: false
feed_decimals: 0
extrusion_decimals: 4
"#;
        let config = AvoidanceConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.tie_break, TieBreak::Upper);
        assert_eq!(config.margin, 0.1);
        assert!(!config.restore_feed_rate);
        assert_eq!(config.feed_decimals, 0);
        assert_eq!(config.extrusion_decimals, 4);
    }

    #[test]
    fn invalid_yaml_is_config_error() {
        let err = AvoidanceConfig::from_yaml("min: [1, 2]").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn serialize_deserialize() {
        let config = AvoidanceConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = AvoidanceConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn validate_rejects_bad_windows() {
        let inverted = AvoidanceConfig {
            min: 120.0,
            max: 100.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let negative = AvoidanceConfig {
            min: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let no_margin = AvoidanceConfig {
            margin: 0.0,
            ..Default::default()
        };
        assert!(no_margin.validate().is_err());

        let nan = AvoidanceConfig {
            max: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn validate_rejects_margin_below_feed_rounding() {
        let coarse = AvoidanceConfig {
            margin: 0.005,
            feed_decimals: 0,
            ..Default::default()
        };
        assert!(coarse.validate().is_err());

        let fine = AvoidanceConfig {
            margin: 0.005,
            feed_decimals: 2,
            ..Default::default()
        };
        assert!(fine.validate().is_ok());
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "min: 30\nmax: 35\n").unwrap();

        let config = AvoidanceConfig::load(Some(&path)).unwrap();
        assert_eq!(config.min, 30.0);
        assert_eq!(config.max, 35.0);
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        assert!(matches!(
            AvoidanceConfig::load(Some(&path)),
            Err(Error::FileAccess { .. })
        ));
    }

    #[test]
    fn window_mirrors_config() {
        let config = AvoidanceConfig {
            min: 10.0,
            max: 20.0,
            margin: 0.5,
            tie_break: TieBreak::Upper,
            ..Default::default()
        };
        let window = config.window();
        assert_eq!(window.min, 10.0);
        assert_eq!(window.max, 20.0);
        assert_eq!(window.margin, 0.5);
        assert_eq!(window.tie_break, TieBreak::Upper);
    }
}
