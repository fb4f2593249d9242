//! Command-line overrides
//!
//! `key.path=value` pairs applied to the parsed tree before the typed schema
//! is built. The value is read as a YAML flow scalar, so `42` stays an
//! integer, `true` a boolean and `download,preprocess` a plain string.

use std::fmt;
use std::str::FromStr;

use contracts::ContractError;
use serde_yaml::{Mapping, Value};

/// One `key.path=value` override
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    path: Vec<String>,
    value: Value,
}

impl Override {
    pub fn new(path: &str, value: Value) -> Result<Self, ContractError> {
        let segments: Vec<String> = path.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ContractError::config_parse(format!(
                "invalid override key '{path}'"
            )));
        }
        Ok(Self {
            path: segments,
            value,
        })
    }

    /// Dotted key
    pub fn key(&self) -> String {
        self.path.join(".")
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Apply to `tree`, creating missing intermediate mappings
    pub fn apply(&self, tree: &mut Value) -> Result<(), ContractError> {
        let (leaf, parents) = self
            .path
            .split_last()
            .ok_or_else(|| ContractError::config_parse("empty override key"))?;

        let mut node = tree;
        for (depth, segment) in parents.iter().enumerate() {
            let mapping = as_mapping_mut(node, &self.path[..depth])?;
            node = mapping
                .entry(Value::String(segment.clone()))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
        }

        as_mapping_mut(node, parents)?.insert(Value::String(leaf.clone()), self.value.clone());
        Ok(())
    }
}

fn as_mapping_mut<'a>(
    node: &'a mut Value,
    path: &[String],
) -> Result<&'a mut Mapping, ContractError> {
    match node {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(ContractError::config_parse(format!(
            "cannot override below '{}': not a mapping",
            if path.is_empty() {
                "<root>".to_string()
            } else {
                path.join(".")
            }
        ))),
    }
}

impl FromStr for Override {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, raw) = s.split_once('=').ok_or_else(|| {
            ContractError::config_parse(format!("override '{s}' must have the form key=value"))
        })?;
        Self::new(key, parse_value(raw))
    }
}

impl fmt::Display for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = serde_yaml::to_string(&self.value).unwrap_or_default();
        write!(f, "{}={}", self.key(), value.trim_end())
    }
}

/// Read the right-hand side of an override
///
/// Anything that is not valid YAML (or is empty) is kept as a plain string.
fn parse_value(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::String(String::new());
    }
    serde_yaml::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Apply every override in order
pub fn apply_all(tree: &mut Value, overrides: &[Override]) -> Result<(), ContractError> {
    for item in overrides {
        item.apply(tree)?;
        tracing::debug!(key = %item.key(), "Applied config override");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Value {
        serde_yaml::from_str(
            r#"
main:
  execute_steps: [download]
  random_seed: 42
data:
  test_size: 0.3
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_scalar_types() {
        let o: Override = "main.random_seed=7".parse().unwrap();
        assert_eq!(o.value(), &Value::Number(7.into()));

        let o: Override = "data.stratify=false".parse().unwrap();
        assert_eq!(o.value(), &Value::Bool(false));

        let o: Override = "main.execute_steps=download,preprocess".parse().unwrap();
        assert_eq!(o.value(), &Value::String("download,preprocess".into()));

        let o: Override = "main.execute_steps=[download, segregate]".parse().unwrap();
        assert!(o.value().is_sequence());
    }

    #[test]
    fn test_apply_replaces_nested_value() {
        let mut t = tree();
        let o: Override = "main.execute_steps=evaluate".parse().unwrap();
        o.apply(&mut t).unwrap();
        assert_eq!(t["main"]["execute_steps"], Value::String("evaluate".into()));
        assert_eq!(t["main"]["random_seed"], Value::Number(42.into()));
    }

    #[test]
    fn test_apply_creates_missing_sections() {
        let mut t = tree();
        let o: Override = "random_forest_pipeline.random_forest.max_depth=13"
            .parse()
            .unwrap();
        o.apply(&mut t).unwrap();
        assert_eq!(
            t["random_forest_pipeline"]["random_forest"]["max_depth"],
            Value::Number(13.into())
        );
    }

    #[test]
    fn test_apply_through_scalar_fails() {
        let mut t = tree();
        let o: Override = "data.test_size.inner=1".parse().unwrap();
        let err = o.apply(&mut t).unwrap_err();
        assert!(err.to_string().contains("data.test_size"), "got: {err}");
    }

    #[test]
    fn test_malformed_overrides() {
        assert!("main.random_seed".parse::<Override>().is_err());
        assert!("=3".parse::<Override>().is_err());
        assert!("main..seed=3".parse::<Override>().is_err());
    }

    #[test]
    fn test_display() {
        let o: Override = "main.random_seed=7".parse().unwrap();
        assert_eq!(o.to_string(), "main.random_seed=7");
    }
}
