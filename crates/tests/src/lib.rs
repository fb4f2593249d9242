//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Covers:
//! - Contract snapshots (stage order, artifact naming)
//! - Config file -> overrides -> orchestrator -> mock invoker
//! - Derived config written for the training stage

#[cfg(test)]
mod contract_tests {
    use contracts::{ArtifactRef, StageName};

    #[test]
    fn test_stage_order_snapshot() {
        let names: Vec<_> = StageName::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            [
                "download",
                "preprocess",
                "check_data",
                "segregate",
                "random_forest",
                "evaluate"
            ]
        );
    }

    #[test]
    fn test_artifact_reference_syntax() {
        let reference: ArtifactRef = "exercise_14/preprocessed_data.csv:latest".parse().unwrap();
        assert_eq!(reference.format(), Some("csv"));
        assert!(reference.is_latest());
        assert_eq!(
            reference.to_string(),
            "exercise_14/preprocessed_data.csv:latest"
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::path::Path;

    use config_loader::{ConfigLoader, Override};
    use contracts::{ContractError, PipelineConfig, StageName};
    use orchestrator::{OrchestratorError, Pipeline, PipelineOptions, PipelineState, StageOutcome};
    use stage_runner::MockInvoker;

    const CONFIG: &str = r#"
main:
  project_name: exercise_14
  experiment_name: dev
  execute_steps:
    - download
    - preprocess
    - check_data
    - segregate
    - random_forest
    - evaluate
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
    min_samples_split: 2
    criterion: gini
    oob_score: false
    class_weight: balanced
  tfidf:
    max_features: 10
  features:
    numerical: [danceability, energy, loudness]
    categorical: [time_signature, key]
    nlp: [text_feature]
"#;

    fn load(dir: &Path, overrides: &[&str]) -> PipelineConfig {
        let path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let overrides: Vec<Override> = overrides.iter().map(|o| o.parse().unwrap()).collect();
        ConfigLoader::load_from_path(&path, &overrides).unwrap()
    }

    fn options(dir: &Path) -> PipelineOptions {
        PipelineOptions {
            project_root: dir.to_path_buf(),
            derived_config_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    /// End-to-end: config file -> Pipeline -> MockInvoker
    #[tokio::test]
    async fn test_e2e_full_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(dir.path(), &[]);
        let mut pipeline = Pipeline::new(config.clone(), options(dir.path())).unwrap();
        let invoker = MockInvoker::new();

        let report = pipeline.run(&invoker).await.unwrap();

        assert_eq!(invoker.invoked_stages(), StageName::ALL);
        assert_eq!(report.state, PipelineState::Completed);

        // Each consumer references exactly what its producer published
        let download = invoker.invocation_for(StageName::Download).unwrap();
        let preprocess = invoker.invocation_for(StageName::Preprocess).unwrap();
        assert_eq!(
            preprocess.parameters["input_artifact"],
            format!("{}:latest", download.parameters["artifact_name"])
        );

        let check = invoker.invocation_for(StageName::CheckData).unwrap();
        let segregate = invoker.invocation_for(StageName::Segregate).unwrap();
        let expected = format!("{}:latest", preprocess.parameters["artifact_name"]);
        assert_eq!(check.parameters["sample_artifact"], expected);
        assert_eq!(segregate.parameters["input_artifact"], expected);

        let training = invoker.invocation_for(StageName::RandomForest).unwrap();
        let evaluate = invoker.invocation_for(StageName::Evaluate).unwrap();
        assert_eq!(
            evaluate.parameters["model_export"],
            format!("{}:latest", training.parameters["export_artifact"])
        );

        // Derived config mirrors the model section
        let written: serde_yaml::Mapping = serde_yaml::from_str(
            &std::fs::read_to_string(&training.parameters["model_config"]).unwrap(),
        )
        .unwrap();
        assert_eq!(&written, config.model.as_mapping());
    }

    /// Command-line style override narrows the run
    #[tokio::test]
    async fn test_e2e_override_selection() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(dir.path(), &["main.execute_steps=evaluate,segregate"]);
        let mut pipeline = Pipeline::new(config, options(dir.path())).unwrap();
        let invoker = MockInvoker::new();

        let report = pipeline.run(&invoker).await.unwrap();

        assert_eq!(
            invoker.invoked_stages(),
            [StageName::Segregate, StageName::Evaluate]
        );
        assert_eq!(
            report.outcome(StageName::RandomForest),
            Some(&StageOutcome::Skipped)
        );
        assert!(!dir.path().join(orchestrator::DERIVED_CONFIG_FILE).exists());
    }

    #[tokio::test]
    async fn test_e2e_override_changes_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(
            dir.path(),
            &[
                "main.execute_steps=segregate",
                "data.test_size=0.25",
                "main.random_seed=7",
                "data.stratify=null",
            ],
        );
        let mut pipeline = Pipeline::new(config, options(dir.path())).unwrap();
        let invoker = MockInvoker::new();

        pipeline.run(&invoker).await.unwrap();

        let params = invoker.invocation_for(StageName::Segregate).unwrap().parameters;
        assert_eq!(params["test_size"], "0.25");
        assert_eq!(params["random_state"], "7");
        assert_eq!(params["stratify"], "null");
    }

    /// A failing stage stops the run and the error carries the report
    #[tokio::test]
    async fn test_e2e_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(dir.path(), &[]);
        let mut pipeline = Pipeline::new(config, options(dir.path())).unwrap();
        let invoker = MockInvoker::failing(StageName::Segregate);

        let err = pipeline.run(&invoker).await.unwrap_err();

        let OrchestratorError::StageFailed { stage, report, source } = err else {
            panic!("expected a stage failure");
        };
        assert_eq!(stage, StageName::Segregate);
        assert!(matches!(source, ContractError::StageExecution { .. }));
        assert_eq!(report.completed().count(), 3);
        assert_eq!(
            report.outcome(StageName::Evaluate),
            Some(&StageOutcome::NotReached)
        );
        assert!(!invoker.invoked_stages().contains(&StageName::RandomForest));
    }

    #[test]
    fn test_e2e_invalid_override_rejected_before_running() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, CONFIG).unwrap();

        let overrides = ["data.val_size=1.5".parse::<Override>().unwrap()];
        let err = ConfigLoader::load_from_path(&path, &overrides).unwrap_err();
        assert!(err.is_configuration());
    }
}
