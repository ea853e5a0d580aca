//! Application configuration
//!
//! The configuration is embedded from `config.toml` at build time. It holds
//! the fixed model identifier and sampling temperature, the video size
//! ceiling and the fonts used for PDF export. Secrets never live here; see
//! [`crate::credentials`].

use crate::error::AppError;
use serde::Deserialize;
use std::path::PathBuf;

const CONFIG_TOML: &str = include_str!("../config.toml");

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Config {
    pub(crate) analysis: AnalysisConfig,
    pub(crate) video: VideoConfig,
    pub(crate) export: ExportConfig,
}

/// Remote model settings
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnalysisConfig {
    /// Model identifier (e.g. "gemini-3-pro-preview")
    pub(crate) model: String,
    /// Low sampling temperature for consistent coaching output
    pub(crate) temperature: f32,
    /// REST base URL, without trailing slash
    pub(crate) api_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VideoConfig {
    pub(crate) max_size_bytes: u64,
}

/// Fonts for PDF export
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExportConfig {
    pub(crate) font_dir: PathBuf,
    pub(crate) font_family: String,
}

impl Config {
    /// Load configuration from the embedded config.toml
    pub(crate) fn load() -> Result<Self, AppError> {
        Self::from_toml(CONFIG_TOML)
    }

    pub(crate) fn from_toml(source: &str) -> Result<Self, AppError> {
        let config: Config =
            toml::from_str(source).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.analysis.model.trim().is_empty() {
            return Err(AppError::Config("analysis.model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.analysis.temperature) {
            return Err(AppError::Config(format!(
                "analysis.temperature must be within 0.0..=2.0, got {}",
                self.analysis.temperature
            )));
        }
        if self.video.max_size_bytes == 0 {
            return Err(AppError::Config(
                "video.max_size_bytes must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_loads() {
        let config = Config::load().expect("embedded config should parse");
        assert_eq!(config.analysis.model, "gemini-3-pro-preview");
        assert!((config.analysis.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.video.max_size_bytes, 25 * 1024 * 1024);
        assert!(config
            .analysis
            .api_base_url
            .starts_with("https://generativelanguage.googleapis.com"));
    }

    #[test]
    fn test_rejects_out_of_range_temperature() {
        let source = CONFIG_TOML.replace("temperature = 0.2", "temperature = 5.0");
        let result = Config::from_toml(&source);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = Config::from_toml("[analysis\nmodel = ");
        assert!(result.is_err());
    }
}
