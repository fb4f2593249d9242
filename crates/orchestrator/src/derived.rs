//! Derived configuration file
//!
//! The training stage reads its hyperparameters from a standalone YAML
//! snapshot of the model section rather than from the orchestrator's
//! in-memory config. The file lives at a fixed name, so concurrent runs
//! sharing a directory overwrite each other's snapshot.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::ContractError;
use serde_yaml::Mapping;
use tracing::debug;

/// File name of the derived model configuration
pub const DERIVED_CONFIG_FILE: &str = "random_forest_config.yml";

/// Location of the derived model configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedConfig {
    path: PathBuf,
}

impl DerivedConfig {
    /// Derived config inside `dir`; relative directories are resolved against
    /// the process working directory so the stage receives an absolute path.
    pub fn in_dir(dir: &Path) -> Result<Self, ContractError> {
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir()?.join(dir)
        };
        Ok(Self {
            path: dir.join(DERIVED_CONFIG_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `section` to the derived config file
    ///
    /// The file is created or truncated; the handle is closed when this
    /// returns, whether or not encoding succeeded.
    pub fn write(&self, section: &Mapping) -> Result<&Path, ContractError> {
        let file = File::create(&self.path).map_err(|e| self.error("cannot create file", e))?;
        let mut writer = BufWriter::new(file);

        serde_yaml::to_writer(&mut writer, section)
            .map_err(|e| self.error("cannot encode section as YAML", e))?;
        writer
            .flush()
            .map_err(|e| self.error("cannot flush file", e))?;

        debug!(path = %self.path.display(), keys = section.len(), "Derived config written");
        Ok(&self.path)
    }

    /// Read the derived config back
    #[cfg(test)]
    pub(crate) fn read(&self) -> Result<Mapping, ContractError> {
        let file = File::open(&self.path).map_err(|e| self.error("cannot open file", e))?;
        serde_yaml::from_reader(std::io::BufReader::new(file))
            .map_err(|e| self.error("cannot decode YAML", e))
    }

    fn error<E>(&self, message: &str, source: E) -> ContractError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ContractError::serialization(
            &self.path,
            format!("{message}: {source}"),
            Some(Box::new(source)),
        )
    }
}
