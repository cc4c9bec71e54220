// src/config/processed.rs
use crate::config::de::yaml_to_value;
use crate::config::raw::{BindingRaw, ConfigRaw, DescriptorRaw};
use crate::descriptor::{Descriptor, ParamSpec};
use crate::error::ConfigError;
use crate::registry::Binding;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const SUPPORTED_VERSION: u32 = 1;

/// A validated configuration: container settings plus bindings to store.
#[derive(Debug, Clone, Default)]
pub struct ContainerConfig {
  pub interface_suffix: Option<String>,
  pub self_identifier: Option<String>,
  pub bindings: Vec<(String, Binding)>,
}

impl ContainerConfig {
  pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
    let raw: ConfigRaw = serde_yaml::from_str(yaml)?;
    process_raw_config(raw)
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let file = File::open(path.as_ref())?;
    let raw: ConfigRaw = serde_yaml::from_reader(BufReader::new(file))?;
    process_raw_config(raw)
  }

  pub fn binding(&self, id: &str) -> Option<&Binding> {
    self
      .bindings
      .iter()
      .find(|(bound, _)| bound == id)
      .map(|(_, binding)| binding)
  }
}

pub fn process_raw_config(raw: ConfigRaw) -> Result<ContainerConfig, ConfigError> {
  if raw.version != SUPPORTED_VERSION {
    return Err(ConfigError::UnsupportedVersion(raw.version));
  }

  let mut bindings = Vec::with_capacity(raw.bindings.len());
  for (id, binding) in raw.bindings {
    if id.is_empty() {
      return Err(ConfigError::InvalidBinding {
        id,
        message: "identifiers must not be empty".to_owned(),
      });
    }
    let binding = match binding {
      BindingRaw::Descriptor(descriptor) => process_descriptor(&id, descriptor)?,
      BindingRaw::Reference(reference) => Binding::Reference(reference.alias),
      BindingRaw::Value(yaml) => {
        let value = yaml_to_value(yaml).map_err(|message| ConfigError::InvalidBinding {
          id: id.clone(),
          message,
        })?;
        Binding::Value(value)
      }
    };
    bindings.push((id, binding));
  }

  Ok(ContainerConfig {
    interface_suffix: raw.container.interface_suffix,
    self_identifier: raw.container.self_identifier.filter(|id| !id.is_empty()),
    bindings,
  })
}

fn process_descriptor(id: &str, raw: DescriptorRaw) -> Result<Binding, ConfigError> {
  let invalid = |message: String| ConfigError::InvalidBinding {
    id: id.to_owned(),
    message,
  };
  let mut descriptor = Descriptor {
    class: raw.class.filter(|class| !class.is_empty()),
    params: Vec::with_capacity(raw.params.len()),
  };
  for (index, entry) in raw.params.into_iter().enumerate() {
    if entry.len() != 1 {
      return Err(invalid(format!(
        "parameter #{index} must have exactly one `kind:name` key, found {}",
        entry.len()
      )));
    }
    for (key, literal) in entry {
      let value = yaml_to_value(literal).map_err(&invalid)?;
      descriptor.params.push(ParamSpec::parse(&key, value));
    }
  }
  Ok(Binding::Descriptor(descriptor))
}
