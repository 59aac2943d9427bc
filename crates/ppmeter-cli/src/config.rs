//! TOML configuration file for repeated runs.
//!
//! Every value is optional; command-line flags win over the file, the file
//! wins over the built-in defaults:
//!
//! ```toml
//! # ppmeter.toml
//! [engine]
//! alpha = 0.1
//! padding = 0.05
//!
//! [domain]
//! start = 0
//! end = 600
//!
//! [csv]
//! delimiter = ";"
//! skip_header = true
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use ppmeter_core::{Domain, DEFAULT_DOMAIN_END};
use ppmeter_source::CsvOptions;
use ppmeter_time::{EngineConfig, DEFAULT_ALPHA, DEFAULT_PADDING};

/// Root of a ppmeter.toml file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub domain: DomainSection,
    #[serde(default)]
    pub csv: CsvSection,
}

/// Smoothing and axis padding.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    pub alpha: Option<f64>,
    pub padding: Option<f64>,
}

/// Evaluation domain for bands and axis hints, in seconds.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainSection {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

/// Trial file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CsvSection {
    pub delimiter: Option<char>,
    pub skip_header: Option<bool>,
}

/// Values given on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub alpha: Option<f64>,
    pub from: Option<f64>,
    pub to: Option<f64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Engine configuration with `overrides` applied on top of the file.
    pub fn engine_config(&self, overrides: &Overrides) -> Result<EngineConfig> {
        let alpha = overrides
            .alpha
            .or(self.engine.alpha)
            .unwrap_or(DEFAULT_ALPHA);
        let padding = self.engine.padding.unwrap_or(DEFAULT_PADDING);
        let start = overrides.from.or(self.domain.start).unwrap_or(0.0);
        let end = overrides
            .to
            .or(self.domain.end)
            .unwrap_or(DEFAULT_DOMAIN_END);

        let domain = Domain::new(start, end).context("Invalid evaluation domain")?;
        let config = EngineConfig::default()
            .with_alpha(alpha)
            .with_padding(padding)
            .with_domain(domain);
        config.validate().context("Invalid engine configuration")?;
        Ok(config)
    }

    /// CSV layout for trial files.
    pub fn csv_options(&self) -> Result<CsvOptions> {
        let mut options = CsvOptions::default();
        if let Some(delimiter) = self.csv.delimiter {
            if !delimiter.is_ascii() {
                bail!("CSV delimiter must be a single ASCII character, got {delimiter:?}");
            }
            options.delimiter = delimiter as u8;
        }
        if let Some(skip_header) = self.csv.skip_header {
            options.has_header = skip_header;
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [engine]
            alpha = 0.25
            padding = 0.1

            [domain]
            start = 0
            end = 3600

            [csv]
            delimiter = ","
            skip_header = false
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.engine.alpha, Some(0.25));
        assert_eq!(config.engine.padding, Some(0.1));
        assert_eq!(config.domain.end, Some(3600.0));

        let engine = config.engine_config(&Overrides::default()).unwrap();
        assert_eq!(engine.alpha, 0.25);
        assert_eq!(engine.padding, 0.1);
        assert_eq!(engine.domain.endpoints(), [0.0, 3600.0]);

        let csv = config.csv_options().unwrap();
        assert_eq!(csv.delimiter, b',');
        assert!(!csv.has_header);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(
            config.engine_config(&Overrides::default()).unwrap(),
            EngineConfig::default()
        );
        assert_eq!(config.csv_options().unwrap(), CsvOptions::default());
    }

    #[test]
    fn test_flags_override_file() {
        let config = Config::from_str("[engine]\nalpha = 0.5\n[domain]\nend = 900").unwrap();
        let overrides = Overrides {
            alpha: Some(1.0),
            from: Some(60.0),
            to: None,
        };

        let engine = config.engine_config(&overrides).unwrap();
        assert_eq!(engine.alpha, 1.0);
        assert_eq!(engine.domain.endpoints(), [60.0, 900.0]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = Config::from_str("[engine]\nalpha = 0.0").unwrap();
        assert!(config.engine_config(&Overrides::default()).is_err());

        let config = Config::from_str("[domain]\nstart = 600\nend = 0").unwrap();
        assert!(config.engine_config(&Overrides::default()).is_err());

        let config = Config::from_str("[csv]\ndelimiter = \"§\"").unwrap();
        assert!(config.csv_options().is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_str("[engine]\nbeta = 1").is_err());
        assert!(Config::from_str("[csv]\ndelimiter = \";;\"").is_err());
    }
}
