//! The dynamic values that flow through the resolution engine.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A shared, type-erased object tagged with the type identifier it was built as.
///
/// Cloning an `Instance` clones the handle, not the object. Two instances are
/// the same object when [`Instance::ptr_eq`] holds.
#[derive(Clone)]
pub struct Instance {
  type_name: Arc<str>,
  inner: Arc<dyn Any + Send + Sync>,
}

impl Instance {
  pub fn new<T: Any + Send + Sync>(type_name: impl Into<Arc<str>>, value: T) -> Self {
    Self::from_arc(type_name, Arc::new(value))
  }

  pub fn from_arc<T: Any + Send + Sync>(type_name: impl Into<Arc<str>>, value: Arc<T>) -> Self {
    Self {
      type_name: type_name.into(),
      inner: value,
    }
  }

  /// The identifier of the type this object was built as.
  pub fn type_name(&self) -> &str {
    &self.type_name
  }

  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.inner.clone().downcast::<T>().ok()
  }

  pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
    self.inner.downcast_ref::<T>()
  }

  pub fn is<T: Any + Send + Sync>(&self) -> bool {
    self.inner.is::<T>()
  }

  pub fn ptr_eq(&self, other: &Instance) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Instance({} @ {:p})", self.type_name, Arc::as_ptr(&self.inner))
  }
}

/// A value produced or consumed by the container.
#[derive(Clone, Default)]
pub enum Value {
  #[default]
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
  List(Vec<Value>),
  Map(HashMap<String, Value>),
  Object(Instance),
}

impl Value {
  /// Wraps `value` into a new shared object tagged with `type_name`.
  pub fn object<T: Any + Send + Sync>(type_name: impl Into<Arc<str>>, value: T) -> Self {
    Value::Object(Instance::new(type_name, value))
  }

  pub fn kind_name(&self) -> &'static str {
    match self {
      Value::Null => "null",
      Value::Bool(_) => "bool",
      Value::Int(_) => "int",
      Value::Float(_) => "float",
      Value::Str(_) => "string",
      Value::List(_) => "list",
      Value::Map(_) => "map",
      Value::Object(_) => "object",
    }
  }

  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  pub fn is_scalar(&self) -> bool {
    matches!(
      self,
      Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
    )
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Str(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_int(&self) -> Option<i64> {
    match self {
      Value::Int(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_float(&self) -> Option<f64> {
    match self {
      Value::Float(f) => Some(*f),
      Value::Int(i) => Some(*i as f64),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_instance(&self) -> Option<&Instance> {
    match self {
      Value::Object(instance) => Some(instance),
      _ => None,
    }
  }

  pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
    match self {
      Value::Map(map) => Some(map),
      _ => None,
    }
  }

  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.as_instance().and_then(Instance::downcast::<T>)
  }

  /// Scripting-style truthiness: `""`, `"0"`, zero, null and empty containers are false.
  pub fn to_bool(&self) -> bool {
    match self {
      Value::Null => false,
      Value::Bool(b) => *b,
      Value::Int(i) => *i != 0,
      Value::Float(f) => *f != 0.0,
      Value::Str(s) => !(s.is_empty() || s == "0"),
      Value::List(items) => !items.is_empty(),
      Value::Map(map) => !map.is_empty(),
      Value::Object(_) => true,
    }
  }

  /// Integer conversion; strings contribute their leading numeric prefix.
  pub fn to_int(&self) -> i64 {
    match self {
      Value::Null => 0,
      Value::Bool(b) => i64::from(*b),
      Value::Int(i) => *i,
      Value::Float(f) => float_to_int(*f),
      Value::Str(s) => {
        let prefix = numeric_prefix(s);
        prefix
          .parse::<i64>()
          .unwrap_or_else(|_| prefix.parse::<f64>().map(float_to_int).unwrap_or(0))
      }
      Value::List(items) => i64::from(!items.is_empty()),
      Value::Map(map) => i64::from(!map.is_empty()),
      Value::Object(_) => 1,
    }
  }

  pub fn to_float(&self) -> f64 {
    match self {
      Value::Float(f) => *f,
      Value::Str(s) => numeric_prefix(s).parse::<f64>().unwrap_or(0.0),
      other => other.to_int() as f64,
    }
  }

  /// String conversion for scalars and null. Lists, maps and objects have no
  /// string form and yield `None`.
  pub fn to_text(&self) -> Option<String> {
    match self {
      Value::Null => Some(String::new()),
      Value::Bool(true) => Some("1".to_owned()),
      Value::Bool(false) => Some(String::new()),
      Value::Int(i) => Some(i.to_string()),
      Value::Float(f) => Some(format_float(*f)),
      Value::Str(s) => Some(s.clone()),
      Value::List(_) | Value::Map(_) | Value::Object(_) => None,
    }
  }
}

fn float_to_int(f: f64) -> i64 {
  if f.is_finite() {
    f.trunc() as i64
  } else {
    0
  }
}

fn format_float(f: f64) -> String {
  if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
    format!("{}", f as i64)
  } else {
    format!("{}", f)
  }
}

// Longest prefix of `s` (after leading whitespace) shaped like a decimal number.
fn numeric_prefix(s: &str) -> &str {
  let s = s.trim_start();
  let bytes = s.as_bytes();
  let mut end = 0;
  if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
    end = 1;
  }
  let int_start = end;
  while end < bytes.len() && bytes[end].is_ascii_digit() {
    end += 1;
  }
  let mut digits = end - int_start;
  if end < bytes.len() && bytes[end] == b'.' {
    let frac_start = end + 1;
    let mut frac_end = frac_start;
    while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
      frac_end += 1;
    }
    if digits > 0 || frac_end > frac_start {
      digits += frac_end - frac_start;
      end = frac_end;
    }
  }
  if digits == 0 {
    return "";
  }
  if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
    let mut exp_end = end + 1;
    if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
      exp_end += 1;
    }
    let exp_digits_start = exp_end;
    while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
      exp_end += 1;
    }
    if exp_end > exp_digits_start {
      end = exp_end;
    }
  }
  &s[..end]
}

/// Coerces `value` to the builtin type `type_name`.
///
/// `bool|boolean`, `int|integer`, `float|double` and `string` convert; `mixed`
/// and every other type name leave the value untouched. Non-scalar values are
/// left untouched by the string conversion.
pub fn coerce(type_name: &str, value: Value) -> Value {
  match type_name {
    "bool" | "boolean" => Value::Bool(value.to_bool()),
    "int" | "integer" => Value::Int(value.to_int()),
    "float" | "double" => Value::Float(value.to_float()),
    "string" => match value.to_text() {
      Some(text) => Value::Str(text),
      None => value,
    },
    _ => value,
  }
}

impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Null, Value::Null) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Int(a), Value::Int(b)) => a == b,
      (Value::Float(a), Value::Float(b)) => a == b,
      (Value::Str(a), Value::Str(b)) => a == b,
      (Value::List(a), Value::List(b)) => a == b,
      (Value::Map(a), Value::Map(b)) => a == b,
      (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
      _ => false,
    }
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => write!(f, "Null"),
      Value::Bool(b) => write!(f, "Bool({})", b),
      Value::Int(i) => write!(f, "Int({})", i),
      Value::Float(x) => write!(f, "Float({})", x),
      Value::Str(s) => write!(f, "Str({:?})", s),
      Value::List(items) => f.debug_tuple("List").field(items).finish(),
      Value::Map(map) => f.debug_tuple("Map").field(map).finish(),
      Value::Object(instance) => instance.fmt(f),
    }
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self {
    Value::Int(i)
  }
}

impl From<i32> for Value {
  fn from(i: i32) -> Self {
    Value::Int(i64::from(i))
  }
}

impl From<u16> for Value {
  fn from(i: u16) -> Self {
    Value::Int(i64::from(i))
  }
}

impl From<f64> for Value {
  fn from(f: f64) -> Self {
    Value::Float(f)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::Str(s.to_owned())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::Str(s)
  }
}

impl From<Instance> for Value {
  fn from(instance: Instance) -> Self {
    Value::Object(instance)
  }
}

impl From<Vec<Value>> for Value {
  fn from(items: Vec<Value>) -> Self {
    Value::List(items)
  }
}

impl From<HashMap<String, Value>> for Value {
  fn from(map: HashMap<String, Value>) -> Self {
    Value::Map(map)
  }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(value: Option<T>) -> Self {
    value.map_or(Value::Null, Into::into)
  }
}
