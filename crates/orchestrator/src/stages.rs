//! Stage descriptor table
//!
//! One static entry per stage, in pipeline order. The table is the only
//! dependency graph: a stage may consume any output of the stages above it.

use contracts::{ContractError, StageName, StageParams};

use crate::params::{self, StageInputs};

/// Builds a stage's parameter mapping
pub type ParamFn = fn(&StageInputs<'_>) -> Result<StageParams, ContractError>;

/// Static definition of one pipeline stage
#[derive(Debug, Clone, Copy)]
pub struct StageDescriptor {
    pub name: StageName,
    /// Job project directory under the project root
    pub job_id: &'static str,
    /// Human-readable summary, used by `plan`
    pub description: &'static str,
    pub param_fn: ParamFn,
}

/// Every stage, in pipeline order
pub static STAGES: [StageDescriptor; 6] = [
    StageDescriptor {
        name: StageName::Download,
        job_id: "download",
        description: "Fetch the raw dataset",
        param_fn: params::download,
    },
    StageDescriptor {
        name: StageName::Preprocess,
        job_id: "preprocess",
        description: "Clean the raw dataset",
        param_fn: params::preprocess,
    },
    StageDescriptor {
        name: StageName::CheckData,
        job_id: "check_data",
        description: "Compare the preprocessed data with the reference dataset",
        param_fn: params::check_data,
    },
    StageDescriptor {
        name: StageName::Segregate,
        job_id: "segregate",
        description: "Split the preprocessed data into train and test sets",
        param_fn: params::segregate,
    },
    StageDescriptor {
        name: StageName::RandomForest,
        job_id: "random_forest",
        description: "Train and export the model",
        param_fn: params::random_forest,
    },
    StageDescriptor {
        name: StageName::Evaluate,
        job_id: "evaluate",
        description: "Score the exported model on the test split",
        param_fn: params::evaluate,
    },
];

/// Descriptor of `name`
pub fn descriptor(name: StageName) -> &'static StageDescriptor {
    // STAGES follows the StageName declaration order
    &STAGES[name as usize]
}
