//! Layered error definitions
//!
//! Categorized by source: config / serialization / stage

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error source carried by contract errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Serialization Errors =====
    /// Derived configuration could not be encoded or written
    #[error("failed to write derived config '{}': {message}", path.display())]
    Serialization {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    // ===== Stage Errors =====
    /// External stage job terminated abnormally
    #[error("stage '{stage}' failed: {message}")]
    StageExecution {
        stage: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create serialization error
    pub fn serialization(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: Option<BoxError>,
    ) -> Self {
        Self::Serialization {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// Create stage execution error
    pub fn stage_execution(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageExecution {
            stage: stage.into(),
            message: message.into(),
            source: None,
        }
    }

    /// True for parse and validation errors, which are raised before any stage runs
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse { .. } | Self::ConfigValidation { .. }
        )
    }

    /// Name of the failed stage, if this is a stage execution error
    pub fn failed_stage(&self) -> Option<&str> {
        match self {
            Self::StageExecution { stage, .. } => Some(stage),
            _ => None,
        }
    }
}
