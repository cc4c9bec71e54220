//! Parameter plans and the binding of constructor/method arguments.
//!
//! For every formal parameter, in declaration order, the binder takes the first
//! of:
//!
//! 1. an explicitly supplied argument (named, or the next positional one for
//!    builtin/untyped parameters), coerced for builtin types;
//! 2. a registry override, most specific key first: `<alias>::<param>`,
//!    `<id>::<param>`, `<alias>::<type>`, `<id>::<type>`, `<type>::<param>`,
//!    `<type>`, then the suffix-stripped `<type>`;
//! 3. the declared default of an optional parameter;
//! 4. the declared type, resolved through the container;
//! 5. null, if the type admits it;
//!
//! and fails with `MissingParameter` otherwise.

use crate::arguments::{Arguments, BoundArguments};
use crate::container::Container;
use crate::error::{Error, Result};
use crate::introspect::{DeclaredType, Parameter, Signature};
use crate::registry::Binding;
use crate::value::{coerce, Value};
use tracing::trace;

/// A formal parameter as seen by the binder.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedParameter {
  pub name: String,
  pub declared: Option<DeclaredType>,
  /// Untyped, or typed with builtin types only.
  pub builtin: bool,
  pub optional: bool,
  pub default: Option<Value>,
  pub allows_null: bool,
  pub self_buildable: bool,
}

impl From<&Parameter> for PlannedParameter {
  fn from(param: &Parameter) -> Self {
    Self {
      name: param.name.clone(),
      declared: param.ty.clone(),
      builtin: param.ty.as_ref().map_or(true, DeclaredType::is_builtin),
      optional: param.optional,
      default: param.default.clone(),
      allows_null: param.allows_null,
      self_buildable: param.self_buildable,
    }
  }
}

/// The derived, cached binding plan of one constructor or method.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterPlan {
  target: String,
  params: Vec<PlannedParameter>,
}

impl ParameterPlan {
  pub fn from_signature(target: impl Into<String>, signature: &Signature) -> Self {
    Self {
      target: target.into(),
      params: signature.params.iter().map(PlannedParameter::from).collect(),
    }
  }

  /// `Type` for a constructor, `Type::method` for a method.
  pub fn target(&self) -> &str {
    &self.target
  }

  pub fn params(&self) -> &[PlannedParameter] {
    &self.params
  }

  pub fn param(&self, index: usize) -> Option<&PlannedParameter> {
    self.params.get(index)
  }

  pub fn len(&self) -> usize {
    self.params.len()
  }

  pub fn is_empty(&self) -> bool {
    self.params.is_empty()
  }
}

/// The identifiers a binding happens for: the entry being built and the alias
/// that requested it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'a> {
  pub(crate) id: &'a str,
  pub(crate) alias: Option<&'a str>,
}

impl Scope<'_> {
  fn is_self(&self, type_name: &str) -> bool {
    type_name == self.id || self.alias == Some(type_name)
  }
}

pub(crate) struct Binder<'c> {
  container: &'c Container,
}

impl<'c> Binder<'c> {
  pub(crate) fn new(container: &'c Container) -> Self {
    Self { container }
  }

  pub(crate) fn bind(
    &self,
    plan: &ParameterPlan,
    mut args: Arguments,
    scope: Scope<'_>,
  ) -> Result<BoundArguments> {
    let mut bound = BoundArguments::new();

    for param in plan.params() {
      let type_name = self.select_type(param);

      if let Some(value) = args.take_named(&param.name) {
        bound.push(&param.name, self.explicit(param, type_name.as_deref(), value, scope)?);
        continue;
      }
      if param.builtin {
        if let Some(value) = args.take_positional() {
          bound.push(&param.name, coerce_for(param, value));
          continue;
        }
      }

      if let Some(value) = self.registry_override(param, type_name.as_deref(), scope)? {
        bound.push(&param.name, value);
        continue;
      }

      if param.optional {
        if let Some(default) = &param.default {
          bound.push(&param.name, default.clone());
          continue;
        }
        if param.self_buildable {
          continue;
        }
      }

      if let Some(type_name) = type_name.as_deref() {
        if scope.is_self(type_name) {
          return Err(Error::SelfReferentialParameter {
            id: scope.id.to_owned(),
            parameter: param.name.clone(),
          });
        }
        if self.container.has(type_name) {
          trace!(id = scope.id, parameter = %param.name, type_name, "autowiring parameter");
          bound.push(&param.name, self.container.resolve(type_name, None, Arguments::new())?);
          continue;
        }
      }

      if param.allows_null {
        bound.push(&param.name, Value::Null);
        continue;
      }
      if param.optional {
        continue;
      }

      return Err(Error::MissingParameter {
        id: scope.id.to_owned(),
        parameter: param.name.clone(),
      });
    }

    Ok(bound)
  }

  /// The object type to wire a parameter with; `None` for builtin/untyped ones.
  ///
  /// For unions and intersections the first member already bound in the
  /// registry wins, then the first resolvable member, then the last member.
  fn select_type(&self, param: &PlannedParameter) -> Option<String> {
    if param.builtin {
      return None;
    }
    let members = param.declared.as_ref()?.members();
    let objects = || members.iter().filter(|member| !crate::is_builtin_type(member));
    objects()
      .find(|member| self.container.registry().has(member))
      .or_else(|| objects().find(|member| self.container.has(member)))
      .or_else(|| members.last().filter(|member| !crate::is_builtin_type(member)))
      .cloned()
  }

  fn explicit(
    &self,
    param: &PlannedParameter,
    type_name: Option<&str>,
    value: Value,
    scope: Scope<'_>,
  ) -> Result<Value> {
    if param.builtin {
      return Ok(coerce_for(param, value));
    }
    match value {
      Value::Str(reference)
        if type_name.is_some()
          && !scope.is_self(&reference)
          && self.container.has(&reference) =>
      {
        self.container.resolve(&reference, None, Arguments::new())
      }
      other => Ok(other),
    }
  }

  fn registry_override(
    &self,
    param: &PlannedParameter,
    type_name: Option<&str>,
    scope: Scope<'_>,
  ) -> Result<Option<Value>> {
    let name = &param.name;
    let mut scoped = Vec::with_capacity(4);
    if let Some(alias) = scope.alias {
      scoped.push(format!("{alias}::{name}"));
    }
    scoped.push(format!("{}::{name}", scope.id));
    if let Some(type_name) = type_name {
      if let Some(alias) = scope.alias {
        scoped.push(format!("{alias}::{type_name}"));
      }
      scoped.push(format!("{}::{type_name}", scope.id));
      scoped.push(format!("{type_name}::{name}"));
    }

    let registry = self.container.registry();
    if let Some(key) = scoped.into_iter().find(|key| registry.has(key)) {
      trace!(id = scope.id, parameter = %name, key = %key, "parameter override");
      return self.override_value(param, &key, scope).map(Some);
    }

    let Some(type_name) = type_name else {
      return Ok(None);
    };
    if scope.is_self(type_name) {
      return Ok(None);
    }
    if registry.has(type_name) {
      return self
        .container
        .resolve(type_name, None, Arguments::new())
        .map(Some);
    }
    match self.container.transform().fallback(type_name) {
      Some(stripped) if registry.has(stripped) && !scope.is_self(stripped) => self
        .container
        .resolve(stripped, Some(type_name), Arguments::new())
        .map(Some),
      _ => Ok(None),
    }
  }

  fn override_value(&self, param: &PlannedParameter, key: &str, scope: Scope<'_>) -> Result<Value> {
    match self.container.registry().get_raw(key) {
      Some(Binding::Value(Value::Str(reference)))
        if !param.builtin
          && reference != key
          && !scope.is_self(&reference)
          && self.container.has(&reference) =>
      {
        self.container.resolve(&reference, Some(key), Arguments::new())
      }
      Some(Binding::Value(value)) | Some(Binding::Resolved(value)) => Ok(coerce_for(param, value)),
      Some(_) => self.container.resolve(key, None, Arguments::new()),
      None => Err(Error::not_found(key)),
    }
  }
}

fn coerce_for(param: &PlannedParameter, value: Value) -> Value {
  match param.declared.as_ref().and_then(DeclaredType::coercion_target) {
    Some(target) => coerce(target, value),
    None => value,
  }
}
