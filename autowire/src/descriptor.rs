//! Structured descriptors: data-only recipes for constructing a class.
//!
//! On the wire a descriptor is a record with an optional `class` and an ordered
//! `params` list. Each entry is a single-key map `{ "<kind>:<name>": <literal> }`
//! where `<kind>` is one of `val`, `env`, `obj`, `arg` and `:<name>` is optional.

use crate::value::Value;
use std::collections::HashMap;

/// How a descriptor parameter obtains its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
  /// The literal itself.
  Val,
  /// The process environment variable named by the literal.
  Env,
  /// The container entry named by the literal.
  Obj,
  /// A caller-supplied argument.
  Arg,
  /// Unrecognized tag; takes the next unclaimed positional caller argument.
  Other,
}

impl ParamKind {
  pub fn parse(tag: &str) -> Self {
    match tag {
      "val" | "value" => ParamKind::Val,
      "env" | "environment" => ParamKind::Env,
      "obj" | "object" => ParamKind::Obj,
      "arg" | "argument" => ParamKind::Arg,
      _ => ParamKind::Other,
    }
  }
}

/// One parameter entry of a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
  pub kind: ParamKind,
  pub name: Option<String>,
  pub value: Value,
}

impl ParamSpec {
  /// Parses a `<kind>[:<name>]` key with its literal.
  pub fn parse(key: &str, value: Value) -> Self {
    let (tag, name) = match key.split_once(':') {
      Some((tag, name)) => (tag, Some(name).filter(|name| !name.is_empty())),
      None => (key, None),
    };
    Self {
      kind: ParamKind::parse(tag),
      name: name.map(str::to_owned),
      value,
    }
  }

  pub fn val(value: impl Into<Value>) -> Self {
    Self::of(ParamKind::Val, value.into())
  }

  pub fn env(var: &str) -> Self {
    Self::of(ParamKind::Env, Value::from(var))
  }

  pub fn obj(id: &str) -> Self {
    Self::of(ParamKind::Obj, Value::from(id))
  }

  pub fn arg(key: &str) -> Self {
    Self::of(ParamKind::Arg, Value::from(key))
  }

  /// Binds the entry to a named constructor parameter.
  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  fn of(kind: ParamKind, value: Value) -> Self {
    Self {
      kind,
      name: None,
      value,
    }
  }
}

/// A target class plus ordered parameter specs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptor {
  pub class: Option<String>,
  pub params: Vec<ParamSpec>,
}

impl Descriptor {
  /// A descriptor that builds the identifier it is bound to.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn for_class(class: impl Into<String>) -> Self {
    Self {
      class: Some(class.into()),
      params: Vec::new(),
    }
  }

  pub fn param(mut self, spec: ParamSpec) -> Self {
    self.params.push(spec);
    self
  }

  /// The class to build when bound under `id`.
  pub fn target<'a>(&'a self, id: &'a str) -> &'a str {
    self.class.as_deref().unwrap_or(id)
  }

  /// Recognizes the descriptor shape in a raw map value.
  ///
  /// The map needs a `params` (or `parameters`) list whose entries are
  /// single-key maps; `class`/`className`/`classname` is optional.
  pub fn from_value(value: &Value) -> Option<Self> {
    let map = value.as_map()?;
    let params = match map.get("params").or_else(|| map.get("parameters"))? {
      Value::List(items) => items,
      _ => return None,
    };
    let class = match ["class", "className", "classname"]
      .iter()
      .find_map(|key| map.get(*key))
    {
      Some(Value::Str(class)) => Some(class.clone()),
      Some(_) => return None,
      None => None,
    };
    let params = params
      .iter()
      .map(|entry| single_entry(entry.as_map()?))
      .collect::<Option<Vec<_>>>()?;
    Some(Self { class, params })
  }
}

fn single_entry(map: &HashMap<String, Value>) -> Option<ParamSpec> {
  if map.len() != 1 {
    return None;
  }
  map
    .iter()
    .next()
    .map(|(key, value)| ParamSpec::parse(key, value.clone()))
}
