//! The value-interpretation pipeline.
//!
//! A stored binding is handed to each [`Interpreter`] in order until one of
//! them produces a value. If every stage declines, resolution fails with
//! `InvalidBinding`: a bare scalar cannot satisfy a construction request.

use crate::arguments::{Arguments, BoundArguments};
use crate::container::Container;
use crate::descriptor::{Descriptor, ParamKind};
use crate::error::{Error, Result};
use crate::registry::Binding;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Everything a stage needs to interpret one binding.
pub struct Interpretation<'a> {
  pub container: &'a Container,
  /// The identifier the binding is stored under.
  pub id: &'a str,
  /// The identifier that requested this one, if it was reached through an alias.
  pub alias: Option<&'a str>,
  pub binding: &'a Binding,
  /// Arguments supplied by the caller of the resolution.
  pub args: &'a Arguments,
}

/// The verdict of one stage.
#[derive(Debug)]
pub enum Outcome {
  /// Not this stage's shape; try the next one.
  Declined,
  /// A value to return and memoize under the identifier.
  Resolved(Value),
  /// A value to return without memoizing, because the identifier was re-bound
  /// while producing it.
  Rebound(Value),
}

pub trait Interpreter: Send + Sync {
  fn name(&self) -> &'static str;

  fn interpret(&self, cx: &Interpretation<'_>) -> Result<Outcome>;
}

/// An ordered chain of interpreters; the first stage that accepts wins.
#[derive(Clone)]
pub struct Pipeline {
  stages: Vec<Arc<dyn Interpreter>>,
}

impl Pipeline {
  /// The built-in stages, in order.
  pub fn standard() -> Self {
    Self {
      stages: vec![
        Arc::new(MemoizedValue),
        Arc::new(FactoryCall),
        Arc::new(ExistingObject),
        Arc::new(TypeAlias),
        Arc::new(CallablePair),
        Arc::new(StructuredDescriptor),
        Arc::new(ConstructWithOverrides),
      ],
    }
  }

  pub fn empty() -> Self {
    Self { stages: Vec::new() }
  }

  pub fn push(&mut self, stage: Arc<dyn Interpreter>) {
    self.stages.push(stage);
  }

  pub fn prepend(&mut self, stage: Arc<dyn Interpreter>) {
    self.stages.insert(0, stage);
  }

  pub fn stage_names(&self) -> Vec<&'static str> {
    self.stages.iter().map(|stage| stage.name()).collect()
  }

  pub(crate) fn run(&self, cx: &Interpretation<'_>) -> Result<Outcome> {
    for stage in &self.stages {
      match stage.interpret(cx)? {
        Outcome::Declined => continue,
        outcome => return Ok(outcome),
      }
    }
    Ok(Outcome::Declined)
  }
}

impl Default for Pipeline {
  fn default() -> Self {
    Self::standard()
  }
}

impl fmt::Debug for Pipeline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.stage_names()).finish()
  }
}

/// Returns memoized results untouched.
pub struct MemoizedValue;

impl Interpreter for MemoizedValue {
  fn name(&self) -> &'static str {
    "memoized"
  }

  fn interpret(&self, cx: &Interpretation<'_>) -> Result<Outcome> {
    match cx.binding {
      Binding::Resolved(value) => Ok(Outcome::Resolved(value.clone())),
      _ => Ok(Outcome::Declined),
    }
  }
}

/// Invokes a factory once with `(container, id, alias)`; the result is not chained.
pub struct FactoryCall;

impl Interpreter for FactoryCall {
  fn name(&self) -> &'static str {
    "factory"
  }

  fn interpret(&self, cx: &Interpretation<'_>) -> Result<Outcome> {
    let Binding::Factory(factory) = cx.binding else {
      return Ok(Outcome::Declined);
    };
    debug!(id = cx.id, alias = ?cx.alias, "invoking factory");
    let value = factory
      .call(cx.container, cx.id, cx.alias)
      .map_err(|source| {
        Error::absorb(source, |source| Error::InvocationFailure {
          id: cx.id.to_owned(),
          source,
        })
      })?;
    match cx.container.registry().get_raw(cx.id) {
      Some(Binding::Factory(current)) if current.ptr_eq(factory) => Ok(Outcome::Resolved(value)),
      _ => Ok(Outcome::Rebound(value)),
    }
  }
}

/// Objects are already constructed.
pub struct ExistingObject;

impl Interpreter for ExistingObject {
  fn name(&self) -> &'static str {
    "object"
  }

  fn interpret(&self, cx: &Interpretation<'_>) -> Result<Outcome> {
    match cx.binding {
      Binding::Value(value @ Value::Object(_)) => Ok(Outcome::Resolved(value.clone())),
      _ => Ok(Outcome::Declined),
    }
  }
}

/// Explicit references, and strings naming another constructible type.
pub struct TypeAlias;

impl Interpreter for TypeAlias {
  fn name(&self) -> &'static str {
    "alias"
  }

  fn interpret(&self, cx: &Interpretation<'_>) -> Result<Outcome> {
    let target = match cx.binding {
      Binding::Reference(target) if target != cx.id => target,
      Binding::Value(Value::Str(target))
        if target != cx.id && cx.container.is_constructible(target) =>
      {
        target
      }
      _ => return Ok(Outcome::Declined),
    };
    cx.container
      .resolve(target, Some(cx.id), cx.args.clone())
      .map(Outcome::Resolved)
  }
}

/// Two-element `[type, method]` or `[object, method]` lists.
///
/// `[type, method]` resolves the member identifier `type::method`; an object
/// receiver has the method called on it directly. Both bind the method's
/// parameters from the caller's arguments.
pub struct CallablePair;

impl Interpreter for CallablePair {
  fn name(&self) -> &'static str {
    "callable"
  }

  fn interpret(&self, cx: &Interpretation<'_>) -> Result<Outcome> {
    let Binding::Value(Value::List(items)) = cx.binding else {
      return Ok(Outcome::Declined);
    };
    let container = cx.container;
    match items.as_slice() {
      [Value::Str(type_name), Value::Str(method)] => {
        let member = format!("{type_name}::{method}");
        if member == cx.id || !container.is_constructible(&member) {
          return Ok(Outcome::Declined);
        }
        debug!(id = cx.id, member = %member, "resolving callable pair");
        container
          .resolve(&member, Some(cx.id), cx.args.clone())
          .map(Outcome::Resolved)
      }
      [receiver @ Value::Object(instance), Value::Str(method)]
        if container.introspector().has_method(instance.type_name(), method) =>
      {
        debug!(id = cx.id, class = instance.type_name(), method = %method, "calling callable pair");
        container
          .call(receiver, method, cx.args.clone())
          .map(Outcome::Resolved)
      }
      _ => Ok(Outcome::Declined),
    }
  }
}

/// Builds a class from a structured descriptor.
pub struct StructuredDescriptor;

impl Interpreter for StructuredDescriptor {
  fn name(&self) -> &'static str {
    "descriptor"
  }

  fn interpret(&self, cx: &Interpretation<'_>) -> Result<Outcome> {
    let descriptor = match cx.binding {
      Binding::Descriptor(descriptor) => descriptor.clone(),
      Binding::Value(value) => match Descriptor::from_value(value) {
        Some(descriptor) if cx.container.introspector().is_loadable(descriptor.target(cx.id)) => {
          descriptor
        }
        _ => return Ok(Outcome::Declined),
      },
      _ => return Ok(Outcome::Declined),
    };
    build_descriptor(cx, &descriptor).map(Outcome::Resolved)
  }
}

fn build_descriptor(cx: &Interpretation<'_>, descriptor: &Descriptor) -> Result<Value> {
  let container = cx.container;
  let target = descriptor.target(cx.id);
  if !container.introspector().is_loadable(target) {
    return Err(Error::not_found(target));
  }
  let plan = container.parameters(target)?;
  let mut args = cx.args.clone();
  let mut bound = BoundArguments::new();

  for (index, spec) in descriptor.params.iter().enumerate() {
    let name = match (&spec.name, plan.param(index)) {
      (Some(name), _) => name.clone(),
      (None, Some(param)) => param.name.clone(),
      (None, None) => index.to_string(),
    };
    if spec.name.is_some() {
      if let Some(value) = args.take_named(&name) {
        bound.push(name, value);
        continue;
      }
    }
    let value = match spec.kind {
      ParamKind::Val => spec.value.clone(),
      ParamKind::Env => spec
        .value
        .as_str()
        .and_then(|var| container.env().read(var))
        .map_or(Value::Null, Value::Str),
      ParamKind::Obj => match &spec.value {
        Value::Str(id) => container.resolve(id, None, Arguments::new())?,
        other => other.clone(),
      },
      ParamKind::Arg => match spec.value.as_str() {
        Some(key) if args.contains(key) => args.take_named(key).unwrap_or_default(),
        Some(key) if container.has(key) => container.resolve(key, None, Arguments::new())?,
        _ => args.take_positional().unwrap_or_default(),
      },
      ParamKind::Other => args.take_positional().unwrap_or_default(),
    };
    bound.push(name, value);
  }

  debug!(id = cx.id, class = target, args = bound.len(), "building descriptor");
  container
    .introspector()
    .instantiate(target, bound)
    .map_err(|source| {
      Error::absorb(source, |source| Error::InvocationFailure {
        id: cx.id.to_owned(),
        source,
      })
    })
}

/// Constructs the identifier itself, with any bound parameter overrides.
///
/// A null binding registers the identifier for construction with no overrides.
///
/// When the identifier is not constructible but its suffix-stripped form is
/// (an interface carrying overrides for its implementation), that type is
/// built instead with the identifier as alias.
pub struct ConstructWithOverrides;

impl Interpreter for ConstructWithOverrides {
  fn name(&self) -> &'static str {
    "construct"
  }

  fn interpret(&self, cx: &Interpretation<'_>) -> Result<Outcome> {
    match cx.binding {
      Binding::Overrides(_) => {}
      Binding::Value(Value::Map(_) | Value::Null) => {}
      Binding::Value(Value::Str(target)) if target == cx.id => {}
      Binding::Reference(target) if target == cx.id => {}
      _ => return Ok(Outcome::Declined),
    }
    let container = cx.container;
    if container.is_constructible(cx.id) {
      return container
        .construct(cx.id, cx.alias, cx.args.clone())
        .map(Outcome::Resolved);
    }
    match container.transform().fallback(cx.id) {
      Some(stripped) if container.is_constructible(stripped) => container
        .resolve(stripped, Some(cx.id), cx.args.clone())
        .map(Outcome::Resolved),
      _ => Err(Error::not_found(cx.id)),
    }
  }
}
