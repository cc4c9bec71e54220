use serde::Deserialize;
use std::collections::BTreeMap;

// --- Top Level Config ---
#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigRaw {
  #[serde(default = "default_version")]
  pub version: u32,
  #[serde(default)]
  pub container: ContainerSettingsRaw,
  // Sorted so bindings are applied in a stable order.
  #[serde(default)]
  pub bindings: BTreeMap<String, BindingRaw>,
}

fn default_version() -> u32 {
  1
}

// --- Container Settings ---
#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ContainerSettingsRaw {
  #[serde(default)]
  pub interface_suffix: Option<String>,
  #[serde(default)]
  pub self_identifier: Option<String>,
}

// --- Bindings ---
#[derive(Debug, Deserialize, PartialEq)]
#[serde(untagged)] // Tried in order: descriptor, reference, anything else
pub enum BindingRaw {
  // `params` is required, so override maps fall through to the next shapes.
  Descriptor(DescriptorRaw),
  Reference(ReferenceRaw),
  Value(serde_yaml::Value),
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DescriptorRaw {
  #[serde(default, alias = "className", alias = "classname")]
  pub class: Option<String>,
  #[serde(alias = "parameters")]
  pub params: Vec<BTreeMap<String, serde_yaml::Value>>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReferenceRaw {
  // A lone `alias` key always wins over an override map with the same key.
  pub alias: String,
}
