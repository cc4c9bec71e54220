//! Bindings and the identifier-keyed storage that holds them.

use crate::container::Container;
use crate::descriptor::Descriptor;
use crate::error::BoxError;
use crate::value::{Instance, Value};
use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type FactoryFn = dyn Fn(&Container, &str, Option<&str>) -> Result<Value, BoxError> + Send + Sync;

/// A deferred callback producing the value of an identifier.
///
/// It is invoked with the container, the identifier being resolved and the
/// alias that triggered the resolution, if any.
#[derive(Clone)]
pub struct Factory(Arc<FactoryFn>);

impl Factory {
  pub fn new<F>(factory: F) -> Self
  where
    F: Fn(&Container, &str, Option<&str>) -> Result<Value, BoxError> + Send + Sync + 'static,
  {
    Self(Arc::new(factory))
  }

  pub(crate) fn call(
    &self,
    container: &Container,
    id: &str,
    alias: Option<&str>,
  ) -> Result<Value, BoxError> {
    (self.0)(container, id, alias)
  }

  pub fn ptr_eq(&self, other: &Factory) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl fmt::Debug for Factory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Factory({:p})", Arc::as_ptr(&self.0))
  }
}

/// What is stored under an identifier.
#[derive(Debug, Clone)]
pub enum Binding {
  /// A raw value as supplied by the user: an object, a type name, a map of
  /// parameter overrides, or a scalar usable only as a parameter override.
  Value(Value),
  /// A memoized resolution result, returned as-is.
  Resolved(Value),
  Factory(Factory),
  /// Another identifier to resolve in place of this one.
  Reference(String),
  /// Parameter-name to value overrides used when constructing the identifier.
  Overrides(HashMap<String, Value>),
  Descriptor(Descriptor),
}

impl Binding {
  pub fn factory<F>(factory: F) -> Self
  where
    F: Fn(&Container, &str, Option<&str>) -> Result<Value, BoxError> + Send + Sync + 'static,
  {
    Binding::Factory(Factory::new(factory))
  }

  pub fn reference(id: impl Into<String>) -> Self {
    Binding::Reference(id.into())
  }

  pub fn overrides<I, K, V>(entries: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
  {
    Binding::Overrides(
      entries
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect(),
    )
  }

  pub fn kind_name(&self) -> &'static str {
    match self {
      Binding::Value(value) => value.kind_name(),
      Binding::Resolved(_) => "resolved",
      Binding::Factory(_) => "factory",
      Binding::Reference(_) => "reference",
      Binding::Overrides(_) => "overrides",
      Binding::Descriptor(_) => "descriptor",
    }
  }
}

impl From<Value> for Binding {
  fn from(value: Value) -> Self {
    Binding::Value(value)
  }
}

impl From<Instance> for Binding {
  fn from(instance: Instance) -> Self {
    Binding::Value(Value::Object(instance))
  }
}

impl From<&str> for Binding {
  fn from(value: &str) -> Self {
    Binding::Value(Value::from(value))
  }
}

impl From<String> for Binding {
  fn from(value: String) -> Self {
    Binding::Value(Value::Str(value))
  }
}

impl From<i64> for Binding {
  fn from(value: i64) -> Self {
    Binding::Value(Value::Int(value))
  }
}

impl From<i32> for Binding {
  fn from(value: i32) -> Self {
    Binding::Value(Value::from(value))
  }
}

impl From<bool> for Binding {
  fn from(value: bool) -> Self {
    Binding::Value(Value::Bool(value))
  }
}

impl From<Factory> for Binding {
  fn from(factory: Factory) -> Self {
    Binding::Factory(factory)
  }
}

impl From<Descriptor> for Binding {
  fn from(descriptor: Descriptor) -> Self {
    Binding::Descriptor(descriptor)
  }
}

/// The mutable identifier-to-binding map.
///
/// Bindings are cloned out on read, so no map guard is ever held while a
/// binding is being interpreted.
#[derive(Default)]
pub(crate) struct Registry {
  entries: DashMap<String, Binding>,
}

impl Registry {
  pub(crate) fn has(&self, id: &str) -> bool {
    self.entries.contains_key(id)
  }

  pub(crate) fn get_raw(&self, id: &str) -> Option<Binding> {
    self.entries.get(id).map(|entry| entry.value().clone())
  }

  pub(crate) fn set(&self, id: impl Into<String>, binding: Binding) {
    self.entries.insert(id.into(), binding);
  }

  /// Memoizes a resolution result.
  pub(crate) fn cache(&self, id: &str, value: Value) {
    self.entries.insert(id.to_owned(), Binding::Resolved(value));
  }

  /// Overrides bound directly under `id`, if that is what it holds.
  pub(crate) fn overrides(&self, id: &str) -> Option<HashMap<String, Value>> {
    match self.get_raw(id)? {
      Binding::Overrides(map) => Some(map),
      Binding::Value(value) if Descriptor::from_value(&value).is_some() => None,
      Binding::Value(Value::Map(map)) => Some(map),
      _ => None,
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }
}
