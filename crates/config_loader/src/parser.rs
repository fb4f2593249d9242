//! Configuration parsing
//!
//! YAML is the primary format; TOML and JSON are accepted as well. Every
//! format is first parsed into a generic YAML tree so command-line overrides
//! can be applied before the typed schema is materialized.

use contracts::{ContractError, PipelineConfig};
use serde_yaml::Value;

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format (recommended)
    Yaml,
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse YAML content into a generic tree
pub fn parse_yaml(content: &str) -> Result<Value, ContractError> {
    serde_yaml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("YAML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse TOML content into a generic tree
pub fn parse_toml(content: &str) -> Result<Value, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON content into a generic tree
pub fn parse_json(content: &str) -> Result<Value, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse content according to its format
pub fn parse(content: &str, format: ConfigFormat) -> Result<Value, ContractError> {
    match format {
        ConfigFormat::Yaml => parse_yaml(content),
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

/// Materialize the typed schema from a (possibly overridden) tree
pub fn into_config(tree: Value) -> Result<PipelineConfig, ContractError> {
    serde_yaml::from_value(tree).map_err(|e| ContractError::ConfigParse {
        message: format!("invalid configuration: {e}"),
        source: Some(Box::new(e)),
    })
}
