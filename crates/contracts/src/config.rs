//! PipelineConfig - Config Loader output
//!
//! Typed view of the hierarchical run configuration: project identity and
//! step selection (`main`), data parameters (`data`) and the free-form model
//! section handed to the training stage (`random_forest_pipeline`).

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use validator::Validate;

use crate::ExecuteSteps;

/// Key of the model section, both in the config file and in error paths
pub const MODEL_SECTION: &str = "random_forest_pipeline";

/// Key inside the model section naming the exported model artifact
pub const EXPORT_ARTIFACT_KEY: &str = "export_artifact";

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    /// Project identity and step selection
    #[validate(nested)]
    pub main: MainConfig,

    /// Data source and split parameters
    #[validate(nested)]
    pub data: DataConfig,

    /// Training stage section, forwarded verbatim as the derived config
    #[serde(rename = "random_forest_pipeline")]
    pub model: ModelSection,
}

/// `main` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MainConfig {
    /// Tracking project every stage run is grouped under
    #[validate(length(min = 1, message = "project_name cannot be empty"))]
    pub project_name: String,

    /// Run group inside the tracking project
    #[validate(length(min = 1, message = "experiment_name cannot be empty"))]
    pub experiment_name: String,

    /// Stages to execute (comma-separated string or sequence); required
    pub execute_steps: ExecuteSteps,

    /// Seed forwarded to the split and training stages
    pub random_seed: i64,
}

/// `data` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DataConfig {
    /// Source URL fetched by the download stage
    #[validate(length(min = 1, message = "file_url cannot be empty"))]
    pub file_url: String,

    /// Externally produced reference dataset (artifact reference, passed verbatim)
    #[validate(length(min = 1, message = "reference_dataset cannot be empty"))]
    pub reference_dataset: String,

    /// Significance level of the KS test run by check_data
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub ks_alpha: f64,

    /// Fraction of rows held out as the test split
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub test_size: f64,

    /// Fraction of training rows held out for validation
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub val_size: f64,

    /// Column to stratify on; a scalar (column name, boolean or null).
    /// The key is required, an explicit `null` disables stratification.
    pub stratify: Value,
}

/// Free-form model section
///
/// Carries arbitrary hyperparameters; only `export_artifact` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSection(Mapping);

impl ModelSection {
    pub fn new(mapping: Mapping) -> Self {
        Self(mapping)
    }

    /// Name of the model artifact the training stage exports
    pub fn export_artifact(&self) -> Option<&str> {
        self.0.get(EXPORT_ARTIFACT_KEY).and_then(Value::as_str)
    }

    /// Raw section, exactly as configured
    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }
}

impl From<Mapping> for ModelSection {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}
