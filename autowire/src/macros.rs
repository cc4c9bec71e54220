//! Public macros for ergonomic argument building and resolution.

/// Builds [`Arguments`](crate::Arguments) from `name => value` pairs.
///
/// Values are converted with `Into<Value>`. A bare list of expressions,
/// `args![a, b]`, builds positional arguments instead.
///
/// # Examples
///
/// ```
/// use fibre_autowire::args;
///
/// let named = args! { "host" => "localhost", "port" => 8080 };
/// assert!(named.contains("port"));
///
/// let positional = args![1, "two"];
/// assert!(!positional.is_empty());
/// ```
#[macro_export]
macro_rules! args {
  () => {
    $crate::Arguments::new()
  };

  // Arm for named arguments: args! { "name" => value, ... }
  ($($name:expr => $value:expr),+ $(,)?) => {{
    let mut arguments = $crate::Arguments::new();
    $(arguments.insert($name, $value);)+
    arguments
  }};

  // Arm for positional arguments: args![a, b, ...]
  ($($value:expr),+ $(,)?) => {{
    let mut arguments = $crate::Arguments::new();
    $(arguments.push($value);)+
    arguments
  }};
}

/// Resolves an identifier from a container and downcasts the object.
///
/// # Panics
///
/// This macro will panic if the identifier cannot be resolved or the result is
/// not an object of the requested type. For a non-panicking version, use
/// `container.get_object::<T>(...)` directly.
///
/// # Examples
///
/// ```
/// use fibre_autowire::{resolve, ClassDef, ClassTable, Container};
///
/// struct Clock;
///
/// let types = ClassTable::new().class(ClassDef::new("App\\Clock").constructor(|_| Ok(Clock)));
/// let container = Container::with_types(types);
///
/// let clock = resolve!(container, Clock, "App\\Clock");
/// assert!(std::sync::Arc::ptr_eq(&clock, &resolve!(container, Clock, "App\\Clock")));
/// ```
#[macro_export]
macro_rules! resolve {
  ($container:expr, $type:ty, $id:expr) => {
    $container
      .get_object::<$type>($id)
      .unwrap_or_else(|error| {
        panic!(
          "Failed to resolve required service '{}' as {}: {}",
          $id,
          std::any::type_name::<$type>(),
          error
        )
      })
  };
}
