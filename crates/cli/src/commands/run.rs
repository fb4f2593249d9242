//! `run` command implementation.

use anyhow::{Context, Result};
use orchestrator::{OrchestratorError, Pipeline, PipelineOptions};
use stage_runner::{ProcessInvoker, ProcessInvokerConfig};
use tracing::info;

use super::load_config;
use crate::cli::RunArgs;

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let config = load_config(&args.source)?;

    info!(
        project = %config.main.project_name,
        experiment = %config.main.experiment_name,
        "Configuration loaded"
    );

    // Initialize Metrics (optional)
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let options = PipelineOptions {
        project_root: args.project_root.clone(),
        derived_config_dir: args.derived_config_dir.clone(),
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(config, options).context("Invalid pipeline configuration")?;

    let invoker = ProcessInvoker::new(ProcessInvokerConfig {
        program: args.runner.clone(),
        ..Default::default()
    });

    match pipeline.run(&invoker).await {
        Ok(report) => {
            report.print_summary();
            info!("Stagehand finished");
            Ok(())
        }
        Err(e) => {
            if let OrchestratorError::StageFailed { report, .. } = &e {
                report.print_summary();
            }
            Err(e).context("Pipeline execution failed")
        }
    }
}
