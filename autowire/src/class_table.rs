//! A registration table implementing [`Introspector`] for plain Rust types.

use crate::arguments::BoundArguments;
use crate::core::split_member;
use crate::error::BoxError;
use crate::introspect::{Introspector, Parameter, Signature};
use crate::value::{Instance, Value};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Constructor = Arc<dyn Fn(&BoundArguments) -> Result<Instance, BoxError> + Send + Sync>;
type Handler = Arc<dyn Fn(&Instance, &BoundArguments) -> Result<Value, BoxError> + Send + Sync>;

struct MethodDef {
  params: Vec<Parameter>,
  handler: Handler,
}

/// The description of one constructible type: its constructor parameters,
/// how to build it from bound arguments, and its callable methods.
pub struct ClassDef {
  name: Arc<str>,
  params: Vec<Parameter>,
  constructor: Option<Constructor>,
  methods: HashMap<String, MethodDef>,
}

impl ClassDef {
  pub fn new(name: &str) -> Self {
    Self {
      name: Arc::from(name),
      params: Vec::new(),
      constructor: None,
      methods: HashMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Appends a constructor parameter.
  pub fn param(mut self, param: Parameter) -> Self {
    self.params.push(param);
    self
  }

  /// Sets the constructor. The built value is tagged with this class's name.
  pub fn constructor<T, F>(mut self, build: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&BoundArguments) -> Result<T, BoxError> + Send + Sync + 'static,
  {
    let name = self.name.clone();
    self.constructor = Some(Arc::new(move |args: &BoundArguments| {
      build(args).map(|value| Instance::new(name.clone(), value))
    }));
    self
  }

  /// Registers a method callable on instances built as `T`.
  pub fn method<T, F>(
    mut self,
    method: &str,
    params: impl IntoIterator<Item = Parameter>,
    body: F,
  ) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&T, &BoundArguments) -> Result<Value, BoxError> + Send + Sync + 'static,
  {
    let class = self.name.clone();
    let method_name = method.to_owned();
    let handler: Handler = Arc::new(move |receiver: &Instance, args: &BoundArguments| {
      let this = receiver.downcast_ref::<T>().ok_or_else(|| {
        format!(
          "receiver of {}::{} is a {}, not the registered type",
          class,
          method_name,
          receiver.type_name()
        )
      })?;
      body(this, args)
    });
    self.methods.insert(
      method.to_owned(),
      MethodDef {
        params: params.into_iter().collect(),
        handler,
      },
    );
    self
  }
}

impl fmt::Debug for ClassDef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ClassDef")
      .field("name", &self.name)
      .field("params", &self.params)
      .field("constructor", &self.constructor.is_some())
      .field("methods", &self.methods.keys().collect::<Vec<_>>())
      .finish()
  }
}

/// A table of [`ClassDef`]s, keyed by type identifier.
#[derive(Default, Debug)]
pub struct ClassTable {
  classes: HashMap<String, ClassDef>,
}

impl ClassTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a class, builder style. A later definition replaces an earlier one.
  pub fn class(mut self, def: ClassDef) -> Self {
    self.register(def);
    self
  }

  pub fn register(&mut self, def: ClassDef) {
    self.classes.insert(def.name().to_owned(), def);
  }

  pub fn len(&self) -> usize {
    self.classes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.classes.is_empty()
  }
}

impl Introspector for ClassTable {
  fn is_loadable(&self, type_name: &str) -> bool {
    self.classes.contains_key(type_name)
  }

  fn has_method(&self, type_name: &str, method: &str) -> bool {
    self
      .classes
      .get(type_name)
      .is_some_and(|class| class.methods.contains_key(method))
  }

  fn signature(&self, identifier: &str) -> Option<Signature> {
    let (type_name, member) = split_member(identifier);
    let class = self.classes.get(type_name)?;
    match member {
      None => Some(Signature::new(class.params.clone())),
      Some(method) => class
        .methods
        .get(method)
        .map(|def| Signature::new(def.params.clone())),
    }
  }

  fn instantiate(&self, type_name: &str, args: BoundArguments) -> Result<Value, BoxError> {
    let class = self
      .classes
      .get(type_name)
      .ok_or_else(|| format!("{} is not a registered class", type_name))?;
    let constructor = class
      .constructor
      .as_ref()
      .ok_or_else(|| format!("{} has no registered constructor", type_name))?;
    constructor(&args).map(Value::Object)
  }

  fn invoke(
    &self,
    receiver: &Instance,
    method: &str,
    args: BoundArguments,
  ) -> Result<Value, BoxError> {
    let def = self
      .classes
      .get(receiver.type_name())
      .and_then(|class| class.methods.get(method))
      .ok_or_else(|| format!("{}::{} is not a registered method", receiver.type_name(), method))?;
    (def.handler)(receiver, &args)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Counter {
    start: i64,
  }

  fn table() -> ClassTable {
    ClassTable::new().class(
      ClassDef::new("App\\Counter")
        .param(Parameter::new("start").typed("int"))
        .constructor(|args| {
          Ok(Counter {
            start: args.int("start")?,
          })
        })
        .method::<Counter, _>(
          "plus",
          [Parameter::new("n").typed("int")],
          |this, args| Ok(Value::Int(this.start + args.int("n")?)),
        ),
    )
  }

  #[test]
  fn describes_constructor_and_methods() {
    let table = table();
    assert!(table.is_loadable("App\\Counter"));
    assert!(table.has_method("App\\Counter", "plus"));
    assert!(!table.has_method("App\\Counter", "minus"));
    assert_eq!(table.signature("App\\Counter").unwrap().params.len(), 1);
    assert_eq!(table.signature("App\\Counter::plus").unwrap().params[0].name, "n");
    assert!(table.signature("App\\Counter::minus").is_none());
    assert!(table.signature("App\\Missing").is_none());
  }

  #[test]
  fn builds_and_invokes() {
    let table = table();
    let mut args = BoundArguments::new();
    args.push("start", Value::Int(40));
    let counter = table.instantiate("App\\Counter", args).unwrap();
    let instance = counter.as_instance().unwrap();
    assert_eq!(instance.type_name(), "App\\Counter");

    let mut args = BoundArguments::new();
    args.push("n", Value::Int(2));
    assert_eq!(table.invoke(instance, "plus", args).unwrap(), Value::Int(42));
  }
}
