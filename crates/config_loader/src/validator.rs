//! Configuration validation
//!
//! Rules:
//! - Schema rules declared on the contract types (non-empty identity and
//!   URL strings, split ratios and `ks_alpha` strictly inside (0, 1))
//! - `random_forest_pipeline.export_artifact` present and a non-empty string
//! - `data.stratify` is a scalar
//! - `data.reference_dataset` is a well-formed artifact reference
//! - every name in `main.execute_steps` is a known stage

use contracts::{
    ArtifactRef, ContractError, PipelineConfig, StepSelection, EXPORT_ARTIFACT_KEY, MODEL_SECTION,
};
use serde_yaml::Value;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// Validate a PipelineConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &PipelineConfig) -> Result<(), ContractError> {
    validate_schema(config)?;
    validate_model_section(config)?;
    validate_stratify(config)?;
    validate_reference_dataset(config)?;
    validate_step_selection(config)?;
    Ok(())
}

/// Schema rules declared with `#[validate(..)]`
fn validate_schema(config: &PipelineConfig) -> Result<(), ContractError> {
    config.validate().map_err(|errors| match first_violation(&errors, "") {
        Some((field, message)) => ContractError::config_validation(field, message),
        None => ContractError::config_validation("<root>", errors.to_string()),
    })
}

/// Walk nested validation errors in key order and report the first one
fn first_violation(errors: &ValidationErrors, prefix: &str) -> Option<(String, String)> {
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in entries {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        let found = match kind {
            ValidationErrorsKind::Field(list) => {
                list.first().map(|error| (path.clone(), describe(error)))
            }
            ValidationErrorsKind::Struct(nested) => first_violation(nested, &path),
            ValidationErrorsKind::List(items) => items
                .iter()
                .find_map(|(idx, nested)| first_violation(nested, &format!("{path}[{idx}]"))),
        };

        if found.is_some() {
            return found;
        }
    }
    None
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "range" => format!(
            "must be > {} and < {}, got {}",
            param(error, "exclusive_min"),
            param(error, "exclusive_max"),
            param(error, "value")
        ),
        code => format!("failed '{code}' check"),
    }
}

fn param(error: &ValidationError, key: &str) -> String {
    error
        .params
        .get(key)
        .map(|v| v.to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// The model section must name the artifact the training stage exports
fn validate_model_section(config: &PipelineConfig) -> Result<(), ContractError> {
    let field = format!("{MODEL_SECTION}.{EXPORT_ARTIFACT_KEY}");
    match config.model.as_mapping().get(EXPORT_ARTIFACT_KEY) {
        None => Err(ContractError::config_validation(field, "required key is missing")),
        Some(Value::String(name)) if name.trim().is_empty() => Err(
            ContractError::config_validation(field, "export_artifact cannot be empty"),
        ),
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(ContractError::config_validation(
            field,
            "export_artifact must be a string",
        )),
    }
}

/// `stratify` is forwarded as a single string parameter
fn validate_stratify(config: &PipelineConfig) -> Result<(), ContractError> {
    match &config.data.stratify {
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => {
            Err(ContractError::config_validation(
                "data.stratify",
                "stratify must be a column name, a boolean or null",
            ))
        }
        _ => Ok(()),
    }
}

fn validate_reference_dataset(config: &PipelineConfig) -> Result<(), ContractError> {
    config
        .data
        .reference_dataset
        .parse::<ArtifactRef>()
        .map(|_| ())
        .map_err(|e| ContractError::config_validation("data.reference_dataset", e.to_string()))
}

/// Unknown stage names are rejected before anything runs
fn validate_step_selection(config: &PipelineConfig) -> Result<(), ContractError> {
    StepSelection::resolve(&config.main.execute_steps).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DataConfig, ExecuteSteps, MainConfig, ModelSection};
    use serde_yaml::Mapping;

    fn minimal_config() -> PipelineConfig {
        let mut model = Mapping::new();
        model.insert("export_artifact".into(), "model_export".into());
        model.insert("numerical_pipe".into(), Value::Mapping(Mapping::new()));

        PipelineConfig {
            main: MainConfig {
                project_name: "exercise_14".into(),
                experiment_name: "dev".into(),
                execute_steps: ExecuteSteps::Csv("download,preprocess".into()),
                random_seed: 42,
            },
            data: DataConfig {
                file_url: "https://example.com/genres_mod.parquet".into(),
                reference_dataset: "exercise_14/preprocessed_data.csv:latest".into(),
                ks_alpha: 0.05,
                test_size: 0.3,
                val_size: 0.3,
                stratify: Value::String("genre".into()),
            },
            model: ModelSection::new(model),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&minimal_config()).is_ok());
    }

    #[test]
    fn test_empty_project_name() {
        let mut config = minimal_config();
        config.main.project_name = String::new();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("main.project_name"), "got: {err}");
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_ratio_out_of_range() {
        let mut config = minimal_config();
        config.data.val_size = 1.5;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("data.val_size"), "got: {err}");
        assert!(err.contains("1.5"), "got: {err}");
    }

    #[test]
    fn test_ks_alpha_zero_rejected() {
        let mut config = minimal_config();
        config.data.ks_alpha = 0.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("data.ks_alpha"), "got: {err}");
    }

    #[test]
    fn test_missing_export_artifact() {
        let mut config = minimal_config();
        config.model = ModelSection::default();
        let err = validate(&config).unwrap_err().to_string();
        assert!(
            err.contains("random_forest_pipeline.export_artifact"),
            "got: {err}"
        );
    }

    #[test]
    fn test_non_string_export_artifact() {
        let mut config = minimal_config();
        let mut model = Mapping::new();
        model.insert("export_artifact".into(), Value::Number(3.into()));
        config.model = ModelSection::new(model);
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("must be a string"), "got: {err}");
    }

    #[test]
    fn test_stratify_must_be_scalar() {
        let mut config = minimal_config();
        config.data.stratify = Value::Sequence(vec!["genre".into()]);
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("data.stratify"), "got: {err}");

        config.data.stratify = Value::Null;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_unknown_stage_rejected() {
        let mut config = minimal_config();
        config.main.execute_steps = ExecuteSteps::Csv("download,trian".into());
        let err = validate(&config).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("trian"), "got: {err}");
    }
}
