//! Error types for pipeline runs.

use contracts::{ContractError, StageName};
use thiserror::Error;

use crate::report::RunReport;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Configuration rejected before any stage ran
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// A selected stage could not be prepared or its job failed
    #[error("pipeline aborted at stage '{stage}'")]
    StageFailed {
        stage: StageName,
        /// Outcome of every stage up to and including the failure
        report: Box<RunReport>,
        #[source]
        source: ContractError,
    },
}

impl OrchestratorError {
    /// Partial report, when the pipeline got as far as running stages
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            OrchestratorError::StageFailed { report, .. } => Some(report.as_ref()),
            OrchestratorError::Contract(_) => None,
        }
    }

    /// Underlying contract error
    pub fn contract(&self) -> &ContractError {
        match self {
            OrchestratorError::Contract(e) => e,
            OrchestratorError::StageFailed { source, .. } => source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
