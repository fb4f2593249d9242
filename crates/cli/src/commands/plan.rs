//! `plan` command implementation.

use anyhow::{Context, Result};
use orchestrator::{Pipeline, PipelineOptions, PlannedStage};
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::PlanArgs;

#[derive(Serialize)]
struct PlanOutput {
    project: String,
    experiment: String,
    derived_config: String,
    /// Every artifact reference the stages exchange
    artifacts: Vec<String>,
    stages: Vec<PlannedStage>,
}

/// Execute the `plan` command
pub fn run_plan(args: &PlanArgs) -> Result<()> {
    let output = build_plan(args)?;

    info!(stages = output.stages.len(), "Plan built");

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize plan")?;
        println!("{}", json);
    } else {
        print_plan(&output);
    }

    Ok(())
}

fn build_plan(args: &PlanArgs) -> Result<PlanOutput> {
    let config = load_config(&args.source)?;
    let options = PipelineOptions {
        project_root: args.project_root.clone(),
        derived_config_dir: args.derived_config_dir.clone(),
        ..Default::default()
    };
    let pipeline = Pipeline::new(config.clone(), options).context("Invalid pipeline configuration")?;
    let stages = pipeline.plan().context("Failed to build stage parameters")?;

    Ok(PlanOutput {
        project: config.main.project_name,
        experiment: config.main.experiment_name,
        derived_config: pipeline.derived_config().path().display().to_string(),
        artifacts: pipeline.artifacts().iter().map(ToString::to_string).collect(),
        stages,
    })
}

fn print_plan(output: &PlanOutput) {
    println!("\n=== Pipeline Plan ===\n");
    println!("Project: {} (group: {})", output.project, output.experiment);
    println!("Artifacts: {}", output.artifacts.join(", "));

    if output.stages.is_empty() {
        println!("\nNo stages selected.");
        println!();
        return;
    }

    for (i, planned) in output.stages.iter().enumerate() {
        println!("\n{}. {} - {}", i + 1, planned.stage, planned.description);
        println!("   Job: {}", planned.job_dir.display());
        for (key, value) in &planned.parameters {
            println!("   - {} = {}", key, value);
        }
    }

    println!();
}
