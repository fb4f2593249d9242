//! Command implementations.

mod plan;
mod run;
mod validate;

use anyhow::{Context, Result};
use contracts::PipelineConfig;
use tracing::info;

use crate::cli::ConfigArgs;

pub use plan::run_plan;
pub use run::run_pipeline;
pub use validate::run_validate;

/// Load, override and validate the configuration named by `source`
pub(crate) fn load_config(source: &ConfigArgs) -> Result<PipelineConfig> {
    info!(
        config = %source.config.display(),
        overrides = source.overrides.len(),
        "Loading configuration"
    );

    if !source.config.exists() {
        anyhow::bail!("Configuration file not found: {}", source.config.display());
    }

    config_loader::ConfigLoader::load_from_path(&source.config, &source.overrides)
        .with_context(|| format!("Failed to load config from {}", source.config.display()))
}
