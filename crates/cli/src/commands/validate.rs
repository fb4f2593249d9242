//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{ContractError, PipelineConfig, StepSelection};
use serde::Serialize;
use tracing::info;

use crate::cli::{ResolvedFormat, ValidateArgs};

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
    /// Effective configuration, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<String>,
}

#[derive(Serialize)]
struct ConfigSummary {
    project: String,
    experiment: String,
    selected_stages: Vec<&'static str>,
    export_artifact: Option<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.source.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let source = &args.source;
    let config_path = source.config.display().to_string();

    // Check file exists
    if !source.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", source.config.display())),
            warnings: None,
            summary: None,
            resolved: None,
        };
    }

    let loaded = ConfigLoader::load_from_path(&source.config, &source.overrides)
        .and_then(|config| {
            let selection = StepSelection::resolve(&config.main.execute_steps)?;
            Ok((config, selection))
        });

    match loaded {
        Ok((config, selection)) => {
            let mut warnings = collect_warnings(&config, &selection);

            let resolved = args.resolved.and_then(|format| match render(&config, format) {
                Ok(text) => Some(text),
                Err(e) => {
                    warnings.push(format!("cannot print resolved configuration: {e}"));
                    None
                }
            });

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    project: config.main.project_name.clone(),
                    experiment: config.main.experiment_name.clone(),
                    selected_stages: selection.iter().map(|s| s.as_str()).collect(),
                    export_artifact: config.model.export_artifact().map(str::to_string),
                }),
                resolved,
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
            resolved: None,
        },
    }
}

/// Serialize the effective configuration
fn render(config: &PipelineConfig, format: ResolvedFormat) -> Result<String, ContractError> {
    match format {
        ResolvedFormat::Yaml => ConfigLoader::to_yaml(config),
        ResolvedFormat::Toml => ConfigLoader::to_toml(config),
        ResolvedFormat::Json => ConfigLoader::to_json(config),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &PipelineConfig, selection: &StepSelection) -> Vec<String> {
    let mut warnings = Vec::new();

    if selection.is_empty() {
        warnings.push("main.execute_steps selects no stage - nothing will run".to_string());
    }

    if config.data.stratify.is_null() {
        warnings.push("data.stratify is null - stages receive the string 'null'".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Project: {}", summary.project);
            println!("  Experiment: {}", summary.experiment);
            println!("  Stages: {}", summary.selected_stages.join(", "));
            if let Some(ref export) = summary.export_artifact {
                println!("  Model export: {}", export);
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }

        if let Some(ref resolved) = result.resolved {
            println!("\n--- Resolved configuration ---\n{}", resolved.trim_end());
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
