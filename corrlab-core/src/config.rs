//! Pipeline configuration.
//!
//! Both stages take an explicit [`PipelineConfig`] rather than reading
//! ambient globals, so tests can run synthetic symbol sets against temp
//! directories. The default config is the production six-symbol set; a
//! TOML file can replace any of it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A logical symbol name mapped to the data provider's ticker string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSpec {
    pub name: String,
    pub ticker: String,
}

impl SymbolSpec {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }
}

/// Configuration for one fetch-and-aggregate run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// All symbols to fetch, in output order.
    pub symbols: Vec<SymbolSpec>,

    /// The symbol whose weekly candles and correlation-to-others are the
    /// subject of the output.
    pub primary: String,

    /// Symbols correlated against the primary asset's returns.
    pub correlation_assets: Vec<String>,

    /// Rolling window lengths, in weekly return observations.
    pub windows: Vec<usize>,

    /// First calendar day to request from the provider.
    pub start_date: NaiveDate,

    /// Directory holding one `<Symbol>.csv` per symbol.
    pub data_dir: PathBuf,

    /// Path of the output JSON artifact.
    pub output_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symbols: vec![
                SymbolSpec::new("BTC", "BTC-USD"),
                SymbolSpec::new("SPY", "SPY"),
                SymbolSpec::new("QQQ", "QQQ"),
                SymbolSpec::new("IGV", "IGV"),
                SymbolSpec::new("GLD", "GLD"),
                SymbolSpec::new("DXY", "DX-Y.NYB"),
            ],
            primary: "BTC".to_string(),
            correlation_assets: vec![
                "SPY".to_string(),
                "QQQ".to_string(),
                "IGV".to_string(),
                "GLD".to_string(),
                "DXY".to_string(),
            ],
            windows: vec![13, 26, 52],
            start_date: NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
            data_dir: PathBuf::from("data"),
            output_path: PathBuf::from("data.json"),
        }
    }
}

impl PipelineConfig {
    /// Load a config from a TOML file and validate it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency. `Default` always passes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid("no symbols configured".into()));
        }
        for spec in &self.symbols {
            if spec.name.is_empty() || spec.ticker.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "symbol '{}' has an empty name or ticker",
                    spec.name
                )));
            }
        }
        if !self.symbols.iter().any(|s| s.name == self.primary) {
            return Err(ConfigError::Invalid(format!(
                "primary asset '{}' is not a configured symbol",
                self.primary
            )));
        }
        for asset in &self.correlation_assets {
            if !self.symbols.iter().any(|s| s.name == *asset) {
                return Err(ConfigError::Invalid(format!(
                    "correlation asset '{asset}' is not a configured symbol"
                )));
            }
            if asset == &self.primary {
                return Err(ConfigError::Invalid(format!(
                    "primary asset '{asset}' cannot also be a correlation asset"
                )));
            }
        }
        if self.windows.is_empty() {
            return Err(ConfigError::Invalid("no correlation windows".into()));
        }
        if let Some(w) = self.windows.iter().find(|&&w| w < 2) {
            return Err(ConfigError::Invalid(format!(
                "correlation window {w} is too short (minimum 2)"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
