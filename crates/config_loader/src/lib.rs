//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse YAML/TOML/JSON configuration files
//! - Apply `key.path=value` command-line overrides
//! - Validate configuration legality
//! - Generate `PipelineConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::{ConfigLoader, Override};
//! use std::path::Path;
//!
//! let overrides: Vec<Override> = vec!["main.execute_steps=download".parse().unwrap()];
//! let config = ConfigLoader::load_from_path(Path::new("config.yaml"), &overrides).unwrap();
//! println!("Project: {}", config.main.project_name);
//! ```

mod overrides;
mod parser;
mod validator;

pub use contracts::PipelineConfig;
pub use overrides::Override;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.yaml / .yml / .toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Malformed override
    /// - Validation failure
    pub fn load_from_path(
        path: &Path,
        overrides: &[Override],
    ) -> Result<PipelineConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format, overrides)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Malformed override
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
        overrides: &[Override],
    ) -> Result<PipelineConfig, ContractError> {
        Self::parse_and_validate(content, format, overrides)
    }

    /// Serialize PipelineConfig to YAML string
    pub fn to_yaml(config: &PipelineConfig) -> Result<String, ContractError> {
        serde_yaml::to_string(config)
            .map_err(|e| ContractError::config_parse(format!("YAML serialize error: {e}")))
    }

    /// Serialize PipelineConfig to TOML string
    ///
    /// Fails when the configuration holds a null value (TOML has none).
    pub fn to_toml(config: &PipelineConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize PipelineConfig to JSON string
    pub fn to_json(config: &PipelineConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse, override and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
        overrides: &[Override],
    ) -> Result<PipelineConfig, ContractError> {
        let mut tree = parser::parse(content, format)?;
        overrides::apply_all(&mut tree, overrides)?;
        let config = parser::into_config(tree)?;
        validator::validate(&config)?;
        Ok(config)
    }
}
