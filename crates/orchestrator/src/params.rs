//! Parameter builder
//!
//! Turns the configuration and the artifact catalog into the string
//! parameter mapping each stage job receives. Parameter keys are the stage
//! projects' command-line interface and must not change.

use contracts::{ContractError, PipelineConfig, StageParams};
use serde_yaml::Value;

use crate::catalog::{
    ArtifactCatalog, PREPROCESSED_NAME, RAW_DATA_NAME, SEGREGATED_ROOT, SEGREGATED_TYPE,
};
use crate::derived::DerivedConfig;
use crate::stages::StageDescriptor;

/// Whether building parameters may touch the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialize {
    /// Write the derived config before handing out its path
    Write,
    /// Only report where the derived config would be written
    PathOnly,
}

/// Everything a stage's parameter function can read
#[derive(Debug, Clone, Copy)]
pub struct StageInputs<'a> {
    pub config: &'a PipelineConfig,
    pub artifacts: &'a ArtifactCatalog,
    pub derived: &'a DerivedConfig,
    pub materialize: Materialize,
}

/// Builds stage parameters for one run
#[derive(Debug)]
pub struct ParamBuilder<'a> {
    config: &'a PipelineConfig,
    artifacts: &'a ArtifactCatalog,
    derived: &'a DerivedConfig,
}

impl<'a> ParamBuilder<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        artifacts: &'a ArtifactCatalog,
        derived: &'a DerivedConfig,
    ) -> Self {
        Self {
            config,
            artifacts,
            derived,
        }
    }

    /// Parameters for `descriptor`
    pub fn build(
        &self,
        descriptor: &StageDescriptor,
        materialize: Materialize,
    ) -> Result<StageParams, ContractError> {
        let inputs = StageInputs {
            config: self.config,
            artifacts: self.artifacts,
            derived: self.derived,
            materialize,
        };
        (descriptor.param_fn)(&inputs)
    }
}

/// Render a configuration scalar as a stage parameter
///
/// Strings are passed verbatim, numbers and booleans in their YAML spelling,
/// null as `null`.
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn params<const N: usize>(pairs: [(&str, String); N]) -> StageParams {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

pub(crate) fn download(inputs: &StageInputs<'_>) -> Result<StageParams, ContractError> {
    let output = &inputs.artifacts.raw_data;
    Ok(params([
        ("file_url", inputs.config.data.file_url.clone()),
        ("artifact_name", output.file_name()),
        ("artifact_type", RAW_DATA_NAME.to_string()),
        ("artifact_description", "Data as downloaded".to_string()),
    ]))
}

pub(crate) fn preprocess(inputs: &StageInputs<'_>) -> Result<StageParams, ContractError> {
    let artifacts = inputs.artifacts;
    Ok(params([
        ("input_artifact", artifacts.raw_data.to_string()),
        ("artifact_name", artifacts.preprocessed.file_name()),
        ("artifact_type", PREPROCESSED_NAME.to_string()),
        (
            "artifact_description",
            "Data with preprocessing applied".to_string(),
        ),
    ]))
}

pub(crate) fn check_data(inputs: &StageInputs<'_>) -> Result<StageParams, ContractError> {
    let data = &inputs.config.data;
    Ok(params([
        ("reference_artifact", data.reference_dataset.clone()),
        ("sample_artifact", inputs.artifacts.preprocessed.to_string()),
        ("ks_alpha", data.ks_alpha.to_string()),
    ]))
}

pub(crate) fn segregate(inputs: &StageInputs<'_>) -> Result<StageParams, ContractError> {
    let config = inputs.config;
    Ok(params([
        ("input_artifact", inputs.artifacts.preprocessed.to_string()),
        ("artifact_root", SEGREGATED_ROOT.to_string()),
        ("artifact_type", SEGREGATED_TYPE.to_string()),
        ("test_size", config.data.test_size.to_string()),
        ("random_state", config.main.random_seed.to_string()),
        ("stratify", render_scalar(&config.data.stratify)),
    ]))
}

pub(crate) fn random_forest(inputs: &StageInputs<'_>) -> Result<StageParams, ContractError> {
    let config = inputs.config;
    let model_config = match inputs.materialize {
        Materialize::Write => inputs.derived.write(config.model.as_mapping())?,
        Materialize::PathOnly => inputs.derived.path(),
    };

    Ok(params([
        ("train_data", inputs.artifacts.train_data.to_string()),
        ("model_config", model_config.display().to_string()),
        ("export_artifact", inputs.artifacts.model_export.file_name()),
        ("random_seed", config.main.random_seed.to_string()),
        ("val_size", config.data.val_size.to_string()),
        ("stratify", render_scalar(&config.data.stratify)),
    ]))
}

pub(crate) fn evaluate(inputs: &StageInputs<'_>) -> Result<StageParams, ContractError> {
    let artifacts = inputs.artifacts;
    Ok(params([
        ("model_export", artifacts.model_export.to_string()),
        ("test_data", artifacts.test_data.to_string()),
    ]))
}
