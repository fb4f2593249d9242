//! Stage names and step selection
//!
//! The pipeline order is the declaration order of [`StageName`]; a
//! [`StepSelection`] filters that order and never reorders it.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;

use crate::ContractError;

/// Config path of the step selection value, used in error messages
pub const EXECUTE_STEPS_FIELD: &str = "main.execute_steps";

/// Pipeline stage, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageName {
    Download,
    Preprocess,
    CheckData,
    Segregate,
    RandomForest,
    Evaluate,
}

impl StageName {
    /// Every stage, in the fixed pipeline order
    pub const ALL: [StageName; 6] = [
        StageName::Download,
        StageName::Preprocess,
        StageName::CheckData,
        StageName::Segregate,
        StageName::RandomForest,
        StageName::Evaluate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Download => "download",
            StageName::Preprocess => "preprocess",
            StageName::CheckData => "check_data",
            StageName::Segregate => "segregate",
            StageName::RandomForest => "random_forest",
            StageName::Evaluate => "evaluate",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageName {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| {
                ContractError::config_validation(
                    EXECUTE_STEPS_FIELD,
                    format!(
                        "unknown stage '{s}', expected one of: {}",
                        Self::ALL.map(|stage| stage.as_str()).join(", ")
                    ),
                )
            })
    }
}

impl Serialize for StageName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Configured step selection, as written by the user
///
/// Either a comma-separated string (command-line friendly) or a sequence of
/// stage names. Anything else is rejected while deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExecuteSteps {
    Csv(String),
    List(Vec<String>),
}

impl TryFrom<Value> for ExecuteSteps {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(ExecuteSteps::Csv(s)),
            Value::Sequence(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(format!(
                        "execute_steps entries must be stage names, got {}",
                        describe(&other)
                    )),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ExecuteSteps::List),
            other => Err(format!(
                "execute_steps must be a comma-separated string or a sequence of stage names, got {}",
                describe(&other)
            )),
        }
    }
}

impl<'de> Deserialize<'de> for ExecuteSteps {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ExecuteSteps::try_from(value).map_err(serde::de::Error::custom)
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Stages selected for this run, kept in pipeline order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepSelection(BTreeSet<StageName>);

impl StepSelection {
    /// Normalize the configured value into the canonical selection.
    ///
    /// String tokens are trimmed and empty tokens ignored. Unknown names fail
    /// with a validation error on `main.execute_steps`.
    pub fn resolve(steps: &ExecuteSteps) -> Result<Self, ContractError> {
        let names: Vec<&str> = match steps {
            ExecuteSteps::Csv(csv) => csv.split(',').map(str::trim).collect(),
            ExecuteSteps::List(list) => list.iter().map(|s| s.trim()).collect(),
        };

        names
            .into_iter()
            .filter(|name| !name.is_empty())
            .map(StageName::from_str)
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    /// Selection containing every stage
    pub fn all() -> Self {
        Self(StageName::ALL.into_iter().collect())
    }

    pub fn contains(&self, stage: StageName) -> bool {
        self.0.contains(&stage)
    }

    /// Selected stages in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = StageName> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<StageName> for StepSelection {
    fn from_iter<T: IntoIterator<Item = StageName>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
