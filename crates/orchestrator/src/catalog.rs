//! Artifact naming convention
//!
//! Every artifact the pipeline exchanges, derived from static stage output
//! names plus the configured model export name. Consumers always request
//! `latest`; nothing here checks that an artifact exists.

use contracts::{ArtifactRef, ContractError, PipelineConfig, EXPORT_ARTIFACT_KEY, MODEL_SECTION};

pub const RAW_DATA_NAME: &str = "raw_data";
pub const RAW_DATA_FORMAT: &str = "parquet";

pub const PREPROCESSED_NAME: &str = "preprocessed_data";
pub const PREPROCESSED_FORMAT: &str = "csv";

/// Prefix of the train/test split artifacts
pub const SEGREGATED_ROOT: &str = "data";
pub const SEGREGATED_TYPE: &str = "segregated_data";
pub const SEGREGATED_FORMAT: &str = "csv";

/// References exchanged between stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCatalog {
    /// download output
    pub raw_data: ArtifactRef,
    /// preprocess output
    pub preprocessed: ArtifactRef,
    /// segregate training split
    pub train_data: ArtifactRef,
    /// segregate test split
    pub test_data: ArtifactRef,
    /// random_forest output
    pub model_export: ArtifactRef,
}

impl ArtifactCatalog {
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ContractError> {
        let export = config.model.export_artifact().ok_or_else(|| {
            ContractError::config_validation(
                format!("{MODEL_SECTION}.{EXPORT_ARTIFACT_KEY}"),
                "required key is missing",
            )
        })?;

        Ok(Self {
            raw_data: ArtifactRef::new(RAW_DATA_NAME, RAW_DATA_FORMAT),
            preprocessed: ArtifactRef::new(PREPROCESSED_NAME, PREPROCESSED_FORMAT),
            train_data: ArtifactRef::new(format!("{SEGREGATED_ROOT}_train"), SEGREGATED_FORMAT),
            test_data: ArtifactRef::new(format!("{SEGREGATED_ROOT}_test"), SEGREGATED_FORMAT),
            model_export: ArtifactRef::named(export),
        })
    }

    /// All references, for reporting
    pub fn iter(&self) -> impl Iterator<Item = &ArtifactRef> {
        [
            &self.raw_data,
            &self.preprocessed,
            &self.train_data,
            &self.test_data,
            &self.model_export,
        ]
        .into_iter()
    }
}
