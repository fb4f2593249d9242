//! ArtifactRef - versioned artifact names exchanged between stages
//!
//! Textual form is `<name>.<format>:<version>`, or `<name>:<version>` when the
//! name already carries everything the store needs (e.g. an exported model).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ContractError;

/// Version alias resolved by the artifact store to the most recent upload
pub const LATEST: &str = "latest";

/// Reference to a named, versioned artifact in the external store.
///
/// # Examples
/// ```
/// use contracts::ArtifactRef;
///
/// let raw = ArtifactRef::new("raw_data", "parquet");
/// assert_eq!(raw.file_name(), "raw_data.parquet");
/// assert_eq!(raw.to_string(), "raw_data.parquet:latest");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactRef {
    name: String,
    format: Option<String>,
    version: String,
}

impl ArtifactRef {
    /// Reference `<name>.<format>` at version `latest`
    pub fn new(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: Some(format.into()),
            version: LATEST.to_string(),
        }
    }

    /// Reference a bare artifact name at version `latest`
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: None,
            version: LATEST.to_string(),
        }
    }

    /// Same artifact pinned to another version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_latest(&self) -> bool {
        self.version == LATEST
    }

    /// Artifact name without the version tag, as a producing stage declares it
    pub fn file_name(&self) -> String {
        match &self.format {
            Some(format) => format!("{}.{}", self.name, format),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_name(), self.version)
    }
}

impl FromStr for ArtifactRef {
    type Err = ContractError;

    /// Parse `<name>[.<format>][:<version>]`; a missing version means `latest`.
    ///
    /// The format is the text after the last `.` of the final path segment, so
    /// project-qualified names such as `exercise_5/raw.csv:v2` parse as expected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (file, version) = match s.rsplit_once(':') {
            Some((file, version)) => (file, version),
            None => (s, LATEST),
        };

        if file.is_empty() || version.is_empty() {
            return Err(ContractError::config_parse(format!(
                "invalid artifact reference '{s}'"
            )));
        }

        let segment_start = file.rfind('/').map_or(0, |i| i + 1);
        let artifact = match file[segment_start..].rfind('.') {
            Some(dot) if dot > 0 => {
                let split = segment_start + dot;
                Self::new(&file[..split], &file[split + 1..])
            }
            _ => Self::named(file),
        };

        Ok(artifact.with_version(version))
    }
}

impl Serialize for ArtifactRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ArtifactRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_format() {
        let r = ArtifactRef::new("preprocessed_data", "csv");
        assert_eq!(r.to_string(), "preprocessed_data.csv:latest");
        assert!(r.is_latest());
    }

    #[test]
    fn test_display_bare_name() {
        let r = ArtifactRef::named("model_export");
        assert_eq!(r.to_string(), "model_export:latest");
        assert_eq!(r.format(), None);
    }

    #[test]
    fn test_pinned_version() {
        let r = ArtifactRef::new("raw_data", "parquet").with_version("v3");
        assert_eq!(r.to_string(), "raw_data.parquet:v3");
        assert!(!r.is_latest());
    }

    #[test]
    fn test_parse() {
        let r: ArtifactRef = "data_train.csv:latest".parse().unwrap();
        assert_eq!(r.name(), "data_train");
        assert_eq!(r.format(), Some("csv"));
        assert_eq!(r.version(), "latest");

        let r: ArtifactRef = "exercise_5/preprocessed_data.csv:v1".parse().unwrap();
        assert_eq!(r.name(), "exercise_5/preprocessed_data");
        assert_eq!(r.version(), "v1");

        let r: ArtifactRef = "model_export".parse().unwrap();
        assert_eq!(r, ArtifactRef::named("model_export"));
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!("".parse::<ArtifactRef>().is_err());
        assert!(":latest".parse::<ArtifactRef>().is_err());
        assert!("raw.csv:".parse::<ArtifactRef>().is_err());
    }

    #[test]
    fn test_serde_uses_textual_form() {
        let r = ArtifactRef::new("raw_data", "parquet");
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, "\"raw_data.parquet:latest\"");
        let back: ArtifactRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
