//! Caller-supplied arguments and the bound argument lists handed to constructors.

use crate::error::BoxError;
use crate::value::{Instance, Value};
use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use thiserror::Error;

/// Arguments supplied by the caller of `get_with`/`call`, by name and by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
  named: HashMap<String, Value>,
  positional: VecDeque<Value>,
}

impl Arguments {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a named argument, builder style.
  pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.insert(name, value);
    self
  }

  /// Adds a positional argument, builder style.
  pub fn with_positional(mut self, value: impl Into<Value>) -> Self {
    self.push(value);
    self
  }

  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
    self.named.insert(name.into(), value.into());
  }

  pub fn push(&mut self, value: impl Into<Value>) {
    self.positional.push_back(value.into());
  }

  pub fn is_empty(&self) -> bool {
    self.named.is_empty() && self.positional.is_empty()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.named.contains_key(name)
  }

  pub(crate) fn take_named(&mut self, name: &str) -> Option<Value> {
    self.named.remove(name)
  }

  pub(crate) fn take_positional(&mut self) -> Option<Value> {
    self.positional.pop_front()
  }

  /// Inserts every entry of `defaults` whose name is not supplied yet.
  pub(crate) fn merge_defaults(&mut self, defaults: &HashMap<String, Value>) {
    for (name, value) in defaults {
      self
        .named
        .entry(name.clone())
        .or_insert_with(|| value.clone());
    }
  }
}

/// Errors raised by the typed accessors of [`BoundArguments`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
  #[error("argument `{0}` was not bound")]
  Missing(String),

  #[error("argument `{name}` is a {found}, expected {expected}")]
  Mismatch {
    name: String,
    expected: String,
    found: &'static str,
  },
}

/// The argument list computed by the parameter binder, in declaration order.
///
/// Parameters that were deliberately left unbound (optional parameters the
/// constructor is expected to default on its own) are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
  entries: Vec<(String, Value)>,
}

impl BoundArguments {
  pub fn new() -> Self {
    Self::default()
  }

  pub(crate) fn push(&mut self, name: impl Into<String>, value: Value) {
    self.entries.push((name.into(), value));
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn is_bound(&self, name: &str) -> bool {
    self.get(name).is_some()
  }

  pub fn get(&self, name: &str) -> Option<&Value> {
    self
      .entries
      .iter()
      .find(|(entry, _)| entry == name)
      .map(|(_, value)| value)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self
      .entries
      .iter()
      .map(|(name, value)| (name.as_str(), value))
  }

  pub fn names(&self) -> Vec<&str> {
    self.entries.iter().map(|(name, _)| name.as_str()).collect()
  }

  pub fn into_values(self) -> Vec<Value> {
    self.entries.into_iter().map(|(_, value)| value).collect()
  }

  pub fn value(&self, name: &str) -> Result<&Value, BoxError> {
    self
      .get(name)
      .ok_or_else(|| ArgumentError::Missing(name.to_owned()).into())
  }

  pub fn instance(&self, name: &str) -> Result<&Instance, BoxError> {
    let value = self.value(name)?;
    value
      .as_instance()
      .ok_or_else(|| mismatch(name, "object", value))
  }

  pub fn object<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, BoxError> {
    let value = self.value(name)?;
    value
      .downcast::<T>()
      .ok_or_else(|| mismatch(name, std::any::type_name::<T>(), value))
  }

  /// Like [`object`](Self::object), but a missing or null argument yields `None`.
  pub fn optional_object<T: Any + Send + Sync>(
    &self,
    name: &str,
  ) -> Result<Option<Arc<T>>, BoxError> {
    match self.get(name) {
      None | Some(Value::Null) => Ok(None),
      Some(_) => self.object::<T>(name).map(Some),
    }
  }

  pub fn int(&self, name: &str) -> Result<i64, BoxError> {
    let value = self.value(name)?;
    value.as_int().ok_or_else(|| mismatch(name, "int", value))
  }

  pub fn float(&self, name: &str) -> Result<f64, BoxError> {
    let value = self.value(name)?;
    value.as_float().ok_or_else(|| mismatch(name, "float", value))
  }

  pub fn bool(&self, name: &str) -> Result<bool, BoxError> {
    let value = self.value(name)?;
    value.as_bool().ok_or_else(|| mismatch(name, "bool", value))
  }

  pub fn str(&self, name: &str) -> Result<&str, BoxError> {
    let value = self.value(name)?;
    value.as_str().ok_or_else(|| mismatch(name, "string", value))
  }
}

fn mismatch(name: &str, expected: &str, found: &Value) -> BoxError {
  ArgumentError::Mismatch {
    name: name.to_owned(),
    expected: expected.to_owned(),
    found: found.kind_name(),
  }
  .into()
}
