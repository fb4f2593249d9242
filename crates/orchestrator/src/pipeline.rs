//! Pipeline orchestrator - walks the stage table and invokes selected stages.
//!
//! Stages run strictly one after another. The first failure stops the run;
//! nothing already produced is rolled back.

use std::path::{Path, PathBuf};
use std::time::Instant;

use contracts::{
    ContractError, PipelineConfig, RunGroup, StageInvocation, StageInvoker, StageName,
    StageParams, StepSelection, DEFAULT_ENTRY_POINT,
};
use observability::{
    record_active_stage, record_pipeline_finished, record_stage_invocation, record_stage_skipped,
    StageStatus,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::catalog::ArtifactCatalog;
use crate::derived::DerivedConfig;
use crate::error::{OrchestratorError, Result};
use crate::params::{Materialize, ParamBuilder};
use crate::report::{PipelineState, RunReport, StageOutcome};
use crate::stages::{StageDescriptor, STAGES};

/// Where stages live and how they are entered
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory holding one job project per stage
    pub project_root: PathBuf,
    /// Directory receiving the derived model configuration
    pub derived_config_dir: PathBuf,
    /// Entry point invoked in every job project
    pub entry_point: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            derived_config_dir: PathBuf::from("."),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        }
    }
}

/// A stage as it would be invoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStage {
    pub stage: StageName,
    pub job_id: &'static str,
    pub description: &'static str,
    pub job_dir: PathBuf,
    pub parameters: StageParams,
}

/// Main pipeline orchestrator
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    selection: StepSelection,
    artifacts: ArtifactCatalog,
    derived: DerivedConfig,
    project_root: PathBuf,
    entry_point: String,
    state: PipelineState,
}

impl Pipeline {
    /// Resolve the step selection and artifact names for `config`
    ///
    /// Every configuration error surfaces here, before any stage runs.
    pub fn new(config: PipelineConfig, options: PipelineOptions) -> Result<Self> {
        let selection = StepSelection::resolve(&config.main.execute_steps)?;
        let artifacts = ArtifactCatalog::from_config(&config)?;
        let derived = DerivedConfig::in_dir(&options.derived_config_dir)?;
        let project_root = absolute(&options.project_root)?;

        if selection.is_empty() {
            warn!("Step selection is empty - no stage will run");
        }

        debug!(
            selected = ?selection.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            project_root = %project_root.display(),
            derived_config = %derived.path().display(),
            "Pipeline prepared"
        );

        Ok(Self {
            config,
            selection,
            artifacts,
            derived,
            project_root,
            entry_point: options.entry_point,
            state: PipelineState::Pending,
        })
    }

    pub fn selection(&self) -> &StepSelection {
        &self.selection
    }

    pub fn artifacts(&self) -> &ArtifactCatalog {
        &self.artifacts
    }

    pub fn derived_config(&self) -> &DerivedConfig {
        &self.derived
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Selected stages with their parameters, without invoking anything
    ///
    /// The derived config is not written; its path is still reported.
    pub fn plan(&self) -> std::result::Result<Vec<PlannedStage>, ContractError> {
        self.selected()
            .map(|descriptor| -> std::result::Result<_, ContractError> {
                Ok(PlannedStage {
                    stage: descriptor.name,
                    job_id: descriptor.job_id,
                    description: descriptor.description,
                    job_dir: self.project_root.join(descriptor.job_id),
                    parameters: self.builder().build(descriptor, Materialize::PathOnly)?,
                })
            })
            .collect()
    }

    /// Run every selected stage in pipeline order
    ///
    /// Returns the report when all selected stages completed. On the first
    /// failure the remaining stages are marked not reached and the error
    /// carries the partial report.
    pub async fn run<I: StageInvoker>(&mut self, invoker: &I) -> Result<RunReport> {
        let started = Instant::now();
        let mut report = RunReport::new();

        info!(
            invoker = invoker.name(),
            stages = self.selection.len(),
            "Starting pipeline"
        );

        for (index, descriptor) in STAGES.iter().enumerate() {
            let stage = descriptor.name;

            if !self.selection.contains(stage) {
                debug!(stage = %stage, "Stage not selected, skipping");
                record_stage_skipped(stage);
                report.record(stage, StageOutcome::Skipped);
                continue;
            }

            self.state = PipelineState::Running(stage);
            record_active_stage(Some(index));
            info!(stage = %stage, job = descriptor.job_id, "Running stage");

            let stage_started = Instant::now();
            let result = self.run_stage(descriptor, invoker).await;
            let elapsed = stage_started.elapsed();

            match result {
                Ok(()) => {
                    record_stage_invocation(stage, StageStatus::Success, elapsed);
                    info!(
                        stage = %stage,
                        elapsed_secs = elapsed.as_secs_f64(),
                        "Stage completed"
                    );
                    report.record(stage, StageOutcome::Completed { elapsed });
                }
                Err(source) => {
                    record_stage_invocation(stage, StageStatus::Failure, elapsed);
                    error!(stage = %stage, error = %source, "Stage failed, aborting pipeline");

                    report.record(
                        stage,
                        StageOutcome::Failed {
                            elapsed,
                            message: source.to_string(),
                        },
                    );
                    for later in &STAGES[index + 1..] {
                        let outcome = if self.selection.contains(later.name) {
                            StageOutcome::NotReached
                        } else {
                            StageOutcome::Skipped
                        };
                        report.record(later.name, outcome);
                    }

                    self.state = PipelineState::Failed(stage);
                    report.state = self.state;
                    report.duration = started.elapsed();
                    record_active_stage(None);
                    record_pipeline_finished(false, report.duration);

                    return Err(OrchestratorError::StageFailed {
                        stage,
                        report: Box::new(report),
                        source,
                    });
                }
            }
        }

        self.state = PipelineState::Completed;
        report.state = self.state;
        report.duration = started.elapsed();
        record_active_stage(None);
        record_pipeline_finished(true, report.duration);

        info!(
            completed = report.completed().count(),
            duration_secs = report.duration.as_secs_f64(),
            "Pipeline completed"
        );

        Ok(report)
    }

    /// Build parameters then invoke; a serialization failure means the job
    /// is never started.
    async fn run_stage<I: StageInvoker>(
        &self,
        descriptor: &StageDescriptor,
        invoker: &I,
    ) -> std::result::Result<(), ContractError> {
        let parameters = self.builder().build(descriptor, Materialize::Write)?;
        let invocation = self.invocation(descriptor, parameters);
        debug!(params = ?invocation.parameters, "Stage parameters");
        invoker.invoke(&invocation).await
    }

    fn invocation(&self, descriptor: &StageDescriptor, parameters: StageParams) -> StageInvocation {
        StageInvocation {
            stage: descriptor.name,
            job_id: descriptor.job_id.to_string(),
            working_dir: self.project_root.clone(),
            entry_point: self.entry_point.clone(),
            parameters,
            run_group: RunGroup {
                project: self.config.main.project_name.clone(),
                group: self.config.main.experiment_name.clone(),
            },
        }
    }

    fn selected(&self) -> impl Iterator<Item = &'static StageDescriptor> + '_ {
        STAGES
            .iter()
            .filter(|descriptor| self.selection.contains(descriptor.name))
    }

    fn builder(&self) -> ParamBuilder<'_> {
        ParamBuilder::new(&self.config, &self.artifacts, &self.derived)
    }
}

fn absolute(path: &Path) -> std::result::Result<PathBuf, ContractError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_config;
    use contracts::ExecuteSteps;
    use stage_runner::MockInvoker;

    fn options(dir: &Path) -> PipelineOptions {
        PipelineOptions {
            project_root: dir.to_path_buf(),
            derived_config_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    fn all_steps() -> ExecuteSteps {
        ExecuteSteps::List(StageName::ALL.map(|s| s.as_str().to_string()).to_vec())
    }

    fn pipeline(steps: ExecuteSteps, dir: &Path) -> Pipeline {
        let mut config = sample_config();
        config.main.execute_steps = steps;
        Pipeline::new(config, options(dir)).unwrap()
    }

    #[tokio::test]
    async fn test_runs_all_stages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(all_steps(), dir.path());
        let invoker = MockInvoker::new();

        let report = pipeline.run(&invoker).await.unwrap();

        assert_eq!(invoker.invoked_stages(), StageName::ALL);
        assert_eq!(pipeline.state(), PipelineState::Completed);
        assert!(report.is_success());
        assert_eq!(report.completed().count(), 6);
    }

    #[tokio::test]
    async fn test_selection_never_reorders() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(ExecuteSteps::Csv("preprocess,download".into()), dir.path());
        let invoker = MockInvoker::new();

        let report = pipeline.run(&invoker).await.unwrap();

        assert_eq!(
            invoker.invoked_stages(),
            [StageName::Download, StageName::Preprocess]
        );
        assert_eq!(
            report.outcome(StageName::Evaluate),
            Some(&StageOutcome::Skipped)
        );
    }

    #[tokio::test]
    async fn test_failure_stops_later_stages() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(all_steps(), dir.path());
        let invoker = MockInvoker::failing(StageName::CheckData);

        let err = pipeline.run(&invoker).await.unwrap_err();

        assert_eq!(
            invoker.invoked_stages(),
            [StageName::Download, StageName::Preprocess, StageName::CheckData]
        );
        assert_eq!(pipeline.state(), PipelineState::Failed(StageName::CheckData));
        assert_eq!(err.contract().failed_stage(), Some("check_data"));

        let report = err.report().unwrap();
        assert!(matches!(
            report.outcome(StageName::CheckData),
            Some(StageOutcome::Failed { .. })
        ));
        for stage in [StageName::Segregate, StageName::RandomForest, StageName::Evaluate] {
            assert_eq!(report.outcome(stage), Some(&StageOutcome::NotReached));
        }
    }

    #[tokio::test]
    async fn test_unselected_stages_after_failure_stay_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let steps = ExecuteSteps::List(vec!["download".into(), "segregate".into()]);
        let mut pipeline = pipeline(steps, dir.path());
        let invoker = MockInvoker::failing(StageName::Download);

        let err = pipeline.run(&invoker).await.unwrap_err();
        let report = err.report().unwrap();

        assert_eq!(report.outcome(StageName::Preprocess), Some(&StageOutcome::Skipped));
        assert_eq!(report.outcome(StageName::Segregate), Some(&StageOutcome::NotReached));
    }

    #[tokio::test]
    async fn test_skipped_upstream_does_not_change_references() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(ExecuteSteps::Csv("segregate".into()), dir.path());
        let invoker = MockInvoker::new();

        pipeline.run(&invoker).await.unwrap();

        let invocation = invoker.invocation_for(StageName::Segregate).unwrap();
        assert_eq!(
            invocation.parameters["input_artifact"],
            "preprocessed_data.csv:latest"
        );
        assert_eq!(invoker.invocations().len(), 1);
    }

    #[tokio::test]
    async fn test_random_forest_gets_derived_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(ExecuteSteps::Csv("random_forest".into()), dir.path());
        let invoker = MockInvoker::new();

        pipeline.run(&invoker).await.unwrap();

        let invocation = invoker.invocation_for(StageName::RandomForest).unwrap();
        let path = PathBuf::from(&invocation.parameters["model_config"]);
        assert!(path.is_absolute());
        assert_eq!(&pipeline.derived_config().read().unwrap(), sample_config().model.as_mapping());
    }

    #[tokio::test]
    async fn test_invocation_carries_run_group_and_location() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(ExecuteSteps::Csv("download".into()), dir.path());
        let invoker = MockInvoker::new();

        pipeline.run(&invoker).await.unwrap();

        let invocation = invoker.invocation_for(StageName::Download).unwrap();
        assert_eq!(invocation.run_group.project, "exercise_14");
        assert_eq!(invocation.run_group.group, "dev");
        assert_eq!(invocation.entry_point, "main");
        assert_eq!(invocation.job_dir(), dir.path().join("download"));
    }

    #[tokio::test]
    async fn test_empty_selection_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(ExecuteSteps::List(Vec::new()), dir.path());
        let invoker = MockInvoker::new();

        let report = pipeline.run(&invoker).await.unwrap();

        assert!(invoker.invocations().is_empty());
        assert!(report.is_success());
        assert!(report
            .stages
            .iter()
            .all(|r| r.outcome == StageOutcome::Skipped));
    }

    #[tokio::test]
    async fn test_serialization_failure_prevents_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = sample_config();
        config.main.execute_steps = ExecuteSteps::Csv("random_forest,evaluate".into());
        let options = PipelineOptions {
            derived_config_dir: dir.path().join("missing"),
            ..options(dir.path())
        };
        let mut pipeline = Pipeline::new(config, options).unwrap();
        let invoker = MockInvoker::new();

        let err = pipeline.run(&invoker).await.unwrap_err();

        assert!(matches!(err.contract(), ContractError::Serialization { .. }));
        assert!(invoker.invocations().is_empty());
        assert_eq!(
            err.report().unwrap().outcome(StageName::Evaluate),
            Some(&StageOutcome::NotReached)
        );
    }

    #[test]
    fn test_plan_lists_selected_stages_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(ExecuteSteps::Csv("evaluate, random_forest".into()), dir.path());

        let plan = pipeline.plan().unwrap();

        let stages: Vec<_> = plan.iter().map(|p| p.stage).collect();
        assert_eq!(stages, [StageName::RandomForest, StageName::Evaluate]);
        assert_eq!(plan[1].parameters["model_export"], "model_export:latest");
        assert_eq!(plan[0].job_dir, dir.path().join("random_forest"));
        assert!(!pipeline.derived_config().path().exists());
        assert_eq!(pipeline.state(), PipelineState::Pending);
    }

    #[test]
    fn test_unknown_stage_rejected_at_construction() {
        let mut config = sample_config();
        config.main.execute_steps = ExecuteSteps::Csv("download,train".into());
        let err = Pipeline::new(config, PipelineOptions::default()).unwrap_err();
        assert!(err.contract().is_configuration());
        assert!(err.report().is_none());
    }
}
