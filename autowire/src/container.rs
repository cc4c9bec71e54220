//! The main `Container` struct, its builder, and the resolution algorithm.

use crate::arguments::Arguments;
use crate::binder::{Binder, ParameterPlan, Scope};
use crate::class_table::ClassTable;
use crate::config::ContainerConfig;
use crate::core::{split_member, ResolutionGuard};
use crate::env::{EnvReader, ProcessEnv};
use crate::error::{BoxError, Error, Result};
use crate::interpret::{Interpretation, Interpreter, Outcome, Pipeline};
use crate::introspect::Introspector;
use crate::registry::{Binding, Registry};
use crate::transform::{IdentifierTransform, InterfaceSuffix};
use crate::value::{Instance, Value};
use dashmap::DashMap;
use parking_lot::ReentrantMutex;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// The identifier under which a container resolves to itself by default.
pub const SELF_IDENTIFIER: &str = "Container";

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

struct Inner {
  id: u64,
  registry: Registry,
  plans: DashMap<String, Arc<ParameterPlan>>,
  introspector: Arc<dyn Introspector>,
  env: Arc<dyn EnvReader>,
  transform: Arc<dyn IdentifierTransform>,
  pipeline: Pipeline,
  self_id: String,
  // Held for each top-level operation; re-entrant so factories may call back in.
  lock: ReentrantMutex<()>,
}

/// The dependency-resolution container.
///
/// `Container` is a cheap handle: clones share the same registry. Create one
/// at start-up and pass it to whatever needs to resolve identifiers.
#[derive(Clone)]
pub struct Container {
  inner: Arc<Inner>,
}

impl Default for Container {
  fn default() -> Self {
    Self::builder().build()
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("id", &self.inner.id)
      .field("bindings", &self.inner.registry.len())
      .field("self_id", &self.inner.self_id)
      .field("pipeline", &self.inner.pipeline)
      .finish()
  }
}

impl Container {
  /// A container with no known types; only explicit bindings resolve.
  pub fn new() -> Self {
    Self::default()
  }

  /// A container constructing types described by `introspector`.
  pub fn with_types(introspector: impl Introspector + 'static) -> Self {
    Self::builder().types(introspector).build()
  }

  pub fn builder() -> ContainerBuilder {
    ContainerBuilder::new()
  }

  // --- PUBLIC API ---

  /// Whether `id` can be resolved: it is bound, it is the container's own
  /// identifier, it names a constructible type or method, or its
  /// suffix-stripped form is one of those. Never constructs anything.
  pub fn has(&self, id: &str) -> bool {
    self.resolvable_directly(id)
      || self
        .inner
        .transform
        .fallback(id)
        .is_some_and(|stripped| self.resolvable_directly(stripped))
  }

  /// Resolves `id` to a value, constructing and memoizing it as needed.
  pub fn get(&self, id: &str) -> Result<Value> {
    self.get_with(id, Arguments::new())
  }

  /// Resolves `id`, binding `args` to the constructor or method parameters.
  pub fn get_with(&self, id: &str, args: Arguments) -> Result<Value> {
    let _lock = self.inner.lock.lock();
    self.resolve(id, None, args)
  }

  /// Resolves `id` and downcasts the resulting object.
  pub fn get_object<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
    let value = self.get(id)?;
    value.downcast::<T>().ok_or_else(|| Error::UnexpectedType {
      id: id.to_owned(),
      expected: std::any::type_name::<T>().to_owned(),
    })
  }

  /// Stores `binding` under `id`, replacing whatever was there.
  pub fn set(&self, id: impl Into<String>, binding: impl Into<Binding>) {
    let _lock = self.inner.lock.lock();
    self.inner.registry.set(id, binding.into());
  }

  /// Stores a factory under `id`.
  pub fn set_factory<F>(&self, id: impl Into<String>, factory: F)
  where
    F: Fn(&Container, &str, Option<&str>) -> Result<Value, BoxError> + Send + Sync + 'static,
  {
    self.set(id, Binding::factory(factory));
  }

  /// Calls `method` on `target`, binding its parameters like a constructor's.
  ///
  /// `target` is an object, or an identifier string resolving to one. The
  /// result is never memoized.
  pub fn call(&self, target: &Value, method: &str, args: Arguments) -> Result<Value> {
    let _lock = self.inner.lock.lock();
    let receiver = match target {
      Value::Str(id) => self.resolve(id, None, Arguments::new())?,
      other => other.clone(),
    };
    let scope_id = match &receiver {
      Value::Object(instance) => format!("{}::{}", instance.type_name(), method),
      other => {
        return Err(Error::UnexpectedType {
          id: format!("{}::{}", other.kind_name(), method),
          expected: "object".to_owned(),
        })
      }
    };
    self.invoke_method(&receiver, &scope_id, method, None, args)
  }

  /// Constructs `class` with bound parameters without memoizing the result.
  pub fn instantiate(&self, class: &str, alias: Option<&str>, args: Arguments) -> Result<Value> {
    let _lock = self.inner.lock.lock();
    self.build_object(class, alias, args)
  }

  /// The cached parameter plan of `target` (`Type` or `Type::method`).
  pub fn parameters(&self, target: &str) -> Result<Arc<ParameterPlan>> {
    if let Some(plan) = self.inner.plans.get(target) {
      return Ok(plan.value().clone());
    }
    let signature = self
      .inner
      .introspector
      .signature(target)
      .ok_or_else(|| Error::not_found(target))?;
    let plan = Arc::new(ParameterPlan::from_signature(target, &signature));
    self.inner.plans.insert(target.to_owned(), plan.clone());
    Ok(plan)
  }

  /// Stores every binding of `config`.
  pub fn apply(&self, config: ContainerConfig) {
    let _lock = self.inner.lock.lock();
    debug!(bindings = config.bindings.len(), "applying container configuration");
    for (id, binding) in config.bindings {
      self.inner.registry.set(id, binding);
    }
  }

  /// Whether `type_name` (or `Type::method`) can be built from type metadata.
  pub fn is_constructible(&self, id: &str) -> bool {
    let introspector = &self.inner.introspector;
    match split_member(id) {
      (type_name, None) => introspector.is_loadable(type_name),
      (type_name, Some(method)) => {
        introspector.has_method(type_name, method)
          || self
            .inner
            .transform
            .fallback(type_name)
            .is_some_and(|stripped| introspector.has_method(stripped, method))
      }
    }
  }

  pub fn self_identifier(&self) -> &str {
    &self.inner.self_id
  }

  pub fn introspector(&self) -> &dyn Introspector {
    self.inner.introspector.as_ref()
  }

  pub fn env(&self) -> &dyn EnvReader {
    self.inner.env.as_ref()
  }

  pub fn transform(&self) -> &dyn IdentifierTransform {
    self.inner.transform.as_ref()
  }

  /// The number of stored bindings, memoized results included.
  pub fn len(&self) -> usize {
    self.inner.registry.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Whether both handles share the same registry.
  pub fn same(&self, other: &Container) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }

  // --- RESOLUTION ---

  pub(crate) fn registry(&self) -> &Registry {
    &self.inner.registry
  }

  /// The recursive lookup: binding, self reference, type metadata, then the
  /// suffix convention. Successful results are memoized under `id`.
  pub(crate) fn resolve(&self, id: &str, alias: Option<&str>, args: Arguments) -> Result<Value> {
    let _guard = ResolutionGuard::enter(self.inner.id, id)?;

    if let Some(binding) = self.inner.registry.get_raw(id) {
      trace!(id, alias, binding = binding.kind_name(), "registry hit");
      let cx = Interpretation {
        container: self,
        id,
        alias,
        binding: &binding,
        args: &args,
      };
      return match self.inner.pipeline.run(&cx)? {
        Outcome::Resolved(value) => {
          self.memoize(id, &value);
          Ok(value)
        }
        Outcome::Rebound(value) => Ok(value),
        Outcome::Declined => Err(Error::InvalidBinding {
          id: id.to_owned(),
          binding: binding.kind_name(),
        }),
      };
    }

    if id == self.inner.self_id {
      return Ok(Value::Object(Instance::new(id, self.clone())));
    }

    if self.is_constructible(id) {
      trace!(id, alias, "constructing from type metadata");
      let value = self.construct(id, alias, args)?;
      self.memoize(id, &value);
      return Ok(value);
    }

    if let Some(stripped) = self.inner.transform.fallback(id) {
      if self.resolvable_directly(stripped) {
        trace!(id, stripped, "interface convention fallback");
        let value = self.resolve(stripped, Some(id), args)?;
        self.memoize(id, &value);
        return Ok(value);
      }
    }

    trace!(id, "not found");
    Err(Error::not_found(id))
  }

  /// Builds `id` from type metadata: a class instance, or a method result.
  pub(crate) fn construct(&self, id: &str, alias: Option<&str>, args: Arguments) -> Result<Value> {
    match split_member(id) {
      (class, None) => self.build_object(class, alias, args),
      (type_name, Some(method)) => {
        let receiver = self.resolve(type_name, None, Arguments::new())?;
        self.invoke_method(&receiver, id, method, alias, args)
      }
    }
  }

  fn build_object(&self, class: &str, alias: Option<&str>, mut args: Arguments) -> Result<Value> {
    if let Some(alias) = alias {
      if let Some(overrides) = self.inner.registry.overrides(alias) {
        args.merge_defaults(&overrides);
      }
    }
    if let Some(overrides) = self.inner.registry.overrides(class) {
      args.merge_defaults(&overrides);
    }
    let plan = self.parameters(class)?;
    let bound = Binder::new(self).bind(&plan, args, Scope { id: class, alias })?;
    debug!(class, alias, args = bound.len(), "instantiating");
    self
      .inner
      .introspector
      .instantiate(class, bound)
      .map_err(|source| {
        Error::absorb(source, |source| Error::ConstructionFailure {
          id: class.to_owned(),
          source,
        })
      })
  }

  fn invoke_method(
    &self,
    receiver: &Value,
    scope_id: &str,
    method: &str,
    alias: Option<&str>,
    args: Arguments,
  ) -> Result<Value> {
    let Value::Object(instance) = receiver else {
      return Err(Error::UnexpectedType {
        id: scope_id.to_owned(),
        expected: "object".to_owned(),
      });
    };
    let plan = self.parameters(&format!("{}::{}", instance.type_name(), method))?;
    let bound = Binder::new(self).bind(&plan, args, Scope { id: scope_id, alias })?;
    debug!(id = scope_id, method, args = bound.len(), "invoking method");
    self
      .inner
      .introspector
      .invoke(instance, method, bound)
      .map_err(|source| {
        Error::absorb(source, |source| Error::InvocationFailure {
          id: scope_id.to_owned(),
          source,
        })
      })
  }

  fn resolvable_directly(&self, id: &str) -> bool {
    self.inner.registry.has(id) || id == self.inner.self_id || self.is_constructible(id)
  }

  fn memoize(&self, id: &str, value: &Value) {
    debug!(id, kind = value.kind_name(), "memoized");
    self.inner.registry.cache(id, value.clone());
  }
}

/// Assembles a [`Container`].
pub struct ContainerBuilder {
  introspector: Option<Arc<dyn Introspector>>,
  env: Arc<dyn EnvReader>,
  transform: Arc<dyn IdentifierTransform>,
  pipeline: Pipeline,
  self_id: String,
  bindings: Vec<(String, Binding)>,
}

impl Default for ContainerBuilder {
  fn default() -> Self {
    Self::new()
  }
}

impl ContainerBuilder {
  pub fn new() -> Self {
    Self {
      introspector: None,
      env: Arc::new(ProcessEnv),
      transform: Arc::new(InterfaceSuffix::default()),
      pipeline: Pipeline::standard(),
      self_id: SELF_IDENTIFIER.to_owned(),
      bindings: Vec::new(),
    }
  }

  /// The type metadata source. Defaults to an empty [`ClassTable`].
  pub fn types(mut self, introspector: impl Introspector + 'static) -> Self {
    self.introspector = Some(Arc::new(introspector));
    self
  }

  pub fn shared_types(mut self, introspector: Arc<dyn Introspector>) -> Self {
    self.introspector = Some(introspector);
    self
  }

  pub fn env(mut self, env: impl EnvReader + 'static) -> Self {
    self.env = Arc::new(env);
    self
  }

  pub fn transform(mut self, transform: impl IdentifierTransform + 'static) -> Self {
    self.transform = Arc::new(transform);
    self
  }

  pub fn interface_suffix(self, suffix: &str) -> Self {
    self.transform(InterfaceSuffix::new(suffix))
  }

  pub fn self_identifier(mut self, id: impl Into<String>) -> Self {
    self.self_id = id.into();
    self
  }

  /// Appends a stage; it runs only when every earlier stage declines.
  pub fn interpreter(mut self, stage: impl Interpreter + 'static) -> Self {
    self.pipeline.push(Arc::new(stage));
    self
  }

  /// Prepends a stage; it sees every binding first.
  pub fn interpreter_first(mut self, stage: impl Interpreter + 'static) -> Self {
    self.pipeline.prepend(Arc::new(stage));
    self
  }

  pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
    self.pipeline = pipeline;
    self
  }

  pub fn bind(mut self, id: impl Into<String>, binding: impl Into<Binding>) -> Self {
    self.bindings.push((id.into(), binding.into()));
    self
  }

  /// Applies the settings and bindings of a loaded configuration.
  pub fn config(mut self, config: ContainerConfig) -> Self {
    if let Some(suffix) = &config.interface_suffix {
      self = self.interface_suffix(suffix);
    }
    if let Some(self_id) = &config.self_identifier {
      self.self_id = self_id.clone();
    }
    self.bindings.extend(config.bindings);
    self
  }

  pub fn build(self) -> Container {
    let registry = Registry::default();
    for (id, binding) in self.bindings {
      registry.set(id, binding);
    }
    let introspector = self
      .introspector
      .unwrap_or_else(|| Arc::new(ClassTable::new()));
    Container {
      inner: Arc::new(Inner {
        id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
        registry,
        plans: DashMap::new(),
        introspector,
        env: self.env,
        transform: self.transform,
        pipeline: self.pipeline,
        self_id: self.self_id,
        lock: ReentrantMutex::new(()),
      }),
    }
  }
}
