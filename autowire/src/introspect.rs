//! The type-metadata contract the resolver consumes.
//!
//! Rust has no runtime reflection over constructor signatures, so the engine
//! asks an [`Introspector`] for them. [`ClassTable`](crate::ClassTable) is the
//! registration-table implementation shipped with the crate; anything else that
//! can describe parameters and build objects can be plugged in instead.

use crate::arguments::BoundArguments;
use crate::error::BoxError;
use crate::value::{Instance, Value};
use once_cell::sync::Lazy;
use std::collections::HashSet;

static BUILTIN_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  [
    "bool", "boolean", "int", "integer", "float", "double", "string", "mixed", "array",
    "iterable", "callable", "object", "null", "false", "true", "void", "never",
  ]
  .into_iter()
  .collect()
});

/// Returns true for scalar/pseudo types the container never constructs.
pub fn is_builtin_type(type_name: &str) -> bool {
  BUILTIN_TYPES.contains(type_name)
}

/// A declared parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
  Named(String),
  Union(Vec<String>),
  Intersection(Vec<String>),
}

impl DeclaredType {
  pub fn members(&self) -> &[String] {
    match self {
      DeclaredType::Named(name) => std::slice::from_ref(name),
      DeclaredType::Union(members) | DeclaredType::Intersection(members) => members,
    }
  }

  /// True when every member is a builtin type.
  pub fn is_builtin(&self) -> bool {
    self.members().iter().all(|member| is_builtin_type(member))
  }

  /// The builtin type name to coerce to, for a single named builtin type.
  pub fn coercion_target(&self) -> Option<&str> {
    match self {
      DeclaredType::Named(name) if is_builtin_type(name) => Some(name),
      _ => None,
    }
  }

  fn admits_null(&self) -> bool {
    self
      .members()
      .iter()
      .any(|member| member == "null" || member == "mixed")
  }
}

/// One formal parameter of a constructor or method.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
  pub name: String,
  pub ty: Option<DeclaredType>,
  pub optional: bool,
  pub default: Option<Value>,
  pub allows_null: bool,
  /// The parameter defaults to an object the callee builds itself.
  pub self_buildable: bool,
}

impl Parameter {
  /// An untyped, required parameter.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ty: None,
      optional: false,
      default: None,
      allows_null: false,
      self_buildable: false,
    }
  }

  /// Declares a single named type. A leading `?` marks it nullable.
  pub fn typed(mut self, type_name: &str) -> Self {
    match type_name.strip_prefix('?') {
      Some(inner) => {
        self.allows_null = true;
        self.ty = Some(DeclaredType::Named(inner.to_owned()));
      }
      None => {
        self.ty = Some(DeclaredType::Named(type_name.to_owned()));
      }
    }
    self.refresh_nullability();
    self
  }

  pub fn union<I, S>(mut self, members: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.ty = Some(DeclaredType::Union(
      members.into_iter().map(Into::into).collect(),
    ));
    self.refresh_nullability();
    self
  }

  pub fn intersection<I, S>(mut self, members: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.ty = Some(DeclaredType::Intersection(
      members.into_iter().map(Into::into).collect(),
    ));
    self
  }

  pub fn nullable(mut self) -> Self {
    self.allows_null = true;
    self
  }

  pub fn optional(mut self) -> Self {
    self.optional = true;
    self
  }

  /// Makes the parameter optional with the given default value.
  pub fn default_value(mut self, value: impl Into<Value>) -> Self {
    let value = value.into();
    if value.is_null() {
      self.allows_null = true;
    }
    self.optional = true;
    self.default = Some(value);
    self
  }

  /// Makes the parameter optional, defaulting to an object the callee constructs.
  pub fn self_buildable(mut self) -> Self {
    self.optional = true;
    self.self_buildable = true;
    self
  }

  fn refresh_nullability(&mut self) {
    if self.ty.as_ref().is_some_and(DeclaredType::admits_null) {
      self.allows_null = true;
    }
  }
}

/// The ordered parameter list of a constructor or a method.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
  pub params: Vec<Parameter>,
}

impl Signature {
  pub fn new(params: Vec<Parameter>) -> Self {
    Self { params }
  }
}

/// Supplies type metadata and performs the actual construction and invocation.
///
/// Identifiers passed to [`signature`](Introspector::signature) are either a
/// type name (its constructor) or `Type::method`.
pub trait Introspector: Send + Sync {
  fn is_loadable(&self, type_name: &str) -> bool;

  fn has_method(&self, type_name: &str, method: &str) -> bool;

  fn signature(&self, identifier: &str) -> Option<Signature>;

  fn instantiate(&self, type_name: &str, args: BoundArguments) -> Result<Value, BoxError>;

  fn invoke(
    &self,
    receiver: &Instance,
    method: &str,
    args: BoundArguments,
  ) -> Result<Value, BoxError>;
}
