//! StageInvoker trait - Orchestrator output interface
//!
//! Defines how one stage is handed to the external job runtime.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::{ContractError, StageName};

/// Entry point every stage project exposes
pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Parameters passed to a stage; values are always strings
pub type StageParams = BTreeMap<String, String>;

/// Run-grouping metadata attached to every stage job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunGroup {
    /// Tracking project (`main.project_name`)
    pub project: String,
    /// Run group inside the project (`main.experiment_name`)
    pub group: String,
}

/// One stage job, fully resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInvocation {
    /// Stage being run
    pub stage: StageName,
    /// External job identifier (project directory name)
    pub job_id: String,
    /// Directory the job identifier is resolved against
    pub working_dir: PathBuf,
    /// Entry point inside the job project
    pub entry_point: String,
    /// Parameter mapping
    pub parameters: StageParams,
    /// Grouping metadata for the tracking backend
    pub run_group: RunGroup,
}

impl StageInvocation {
    /// Directory holding the stage project
    pub fn job_dir(&self) -> PathBuf {
        self.working_dir.join(&self.job_id)
    }
}

/// Executes stage jobs
///
/// `invoke` resolves once the job has terminated. Any abnormal termination
/// must be reported as [`ContractError::StageExecution`]; implementations
/// never retry.
#[trait_variant::make(StageInvoker: Send)]
pub trait LocalStageInvoker {
    /// Invoker name (used for logging)
    fn name(&self) -> &str;

    /// Run one stage job to completion
    async fn invoke(&self, invocation: &StageInvocation) -> Result<(), ContractError>;
}
