// src/config/de.rs
// Conversion of parsed YAML into engine values.

use crate::value::Value;
use serde_yaml::Value as Yaml;
use std::collections::HashMap;

/// Converts a YAML node into a [`Value`].
///
/// Mapping keys must be scalars; they are stringified. Tags are ignored.
pub fn yaml_to_value(yaml: Yaml) -> Result<Value, String> {
  Ok(match yaml {
    Yaml::Null => Value::Null,
    Yaml::Bool(b) => Value::Bool(b),
    Yaml::Number(n) => match n.as_i64() {
      Some(i) => Value::Int(i),
      None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
    },
    Yaml::String(s) => Value::Str(s),
    Yaml::Sequence(items) => Value::List(
      items
        .into_iter()
        .map(yaml_to_value)
        .collect::<Result<_, _>>()?,
    ),
    Yaml::Mapping(mapping) => {
      let mut map = HashMap::with_capacity(mapping.len());
      for (key, value) in mapping {
        map.insert(key_to_string(key)?, yaml_to_value(value)?);
      }
      Value::Map(map)
    }
    Yaml::Tagged(tagged) => yaml_to_value(tagged.value)?,
  })
}

fn key_to_string(key: Yaml) -> Result<String, String> {
  match key {
    Yaml::String(s) => Ok(s),
    Yaml::Number(n) => Ok(n.to_string()),
    Yaml::Bool(b) => Ok(b.to_string()),
    other => Err(format!("mapping keys must be scalars, found {other:?}")),
  }
}
