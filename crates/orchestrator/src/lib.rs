//! # Orchestrator
//!
//! Decides which stages run, derives what each one receives, and invokes
//! them in the fixed pipeline order.
//!
//! Responsibilities:
//! - Stage descriptor table (name, job directory, parameter function)
//! - Artifact naming convention linking stage outputs to inputs
//! - Derived model configuration written for the training stage
//! - Sequential, fail-fast execution with a per-stage report
//!
//! ## Example
//!
//! ```ignore
//! use orchestrator::{Pipeline, PipelineOptions};
//! use stage_runner::ProcessInvoker;
//!
//! let mut pipeline = Pipeline::new(config, PipelineOptions::default())?;
//! let report = pipeline.run(&ProcessInvoker::default()).await?;
//! report.print_summary();
//! ```

pub mod catalog;
pub mod derived;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod report;
pub mod stages;

pub use catalog::ArtifactCatalog;
pub use derived::{DerivedConfig, DERIVED_CONFIG_FILE};
pub use error::OrchestratorError;
pub use params::render_scalar;
pub use pipeline::{Pipeline, PipelineOptions, PlannedStage};
pub use report::{PipelineState, RunReport, StageOutcome, StageRecord};
pub use stages::{descriptor, StageDescriptor, STAGES};

#[cfg(test)]
pub(crate) mod test_support {
    use contracts::PipelineConfig;

    pub fn sample_config() -> PipelineConfig {
        serde_yaml::from_str(
            r#"
main:
  project_name: exercise_14
  experiment_name: dev
  execute_steps: download,preprocess,check_data,segregate,random_forest,evaluate
  random_seed: 42
data:
  file_url: https://example.com/genres_mod.parquet
  reference_dataset: exercise_14/preprocessed_data.csv:latest
  ks_alpha: 0.05
  test_size: 0.3
  val_size: 0.3
  stratify: genre
random_forest_pipeline:
  export_artifact: model_export
  random_forest:
    n_estimators: 100
    max_depth: 13
    criterion: gini
    oob_score: false
  tfidf:
    max_features: 10
"#,
        )
        .unwrap()
    }
}
