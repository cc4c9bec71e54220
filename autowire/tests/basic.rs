mod common;

use common::{container, Database, Greeter, Logger};
use fibre_autowire::{args, Binding, Container, Error, ErrorKind, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn test_class_resolution_is_idempotent() {
  // Arrange
  let container = container();
  container.set("App\\Database::dsn", "sqlite::memory:");

  // Act
  let first = container.get_object::<Database>("App\\Database").unwrap();
  let second = container.get_object::<Database>("App\\Database").unwrap();

  // Assert
  assert!(Arc::ptr_eq(&first, &second));
  assert_eq!(first.dsn, "sqlite::memory:");
}

#[test]
fn test_alias_is_transparent_and_caches_both_keys() {
  // Arrange
  let container = container();
  container.set("App\\LoggerInterface", "App\\Logger");

  // Act
  let via_alias = container.get_object::<Logger>("App\\LoggerInterface").unwrap();
  let direct = container.get_object::<Logger>("App\\Logger").unwrap();

  // Assert
  assert!(Arc::ptr_eq(&via_alias, &direct));
  assert_eq!(container.get("App\\LoggerInterface").unwrap(), container.get("App\\Logger").unwrap());
}

#[test]
fn test_explicit_reference_binding() {
  // Arrange
  let container = container();
  container.set("logger", Binding::reference("App\\Logger"));

  // Act
  let logger = container.get_object::<Logger>("logger").unwrap();

  // Assert
  assert!(Arc::ptr_eq(&logger, &container.get_object::<Logger>("App\\Logger").unwrap()));
}

#[test]
fn test_factory_is_invoked_once() {
  // Arrange
  let container = container();
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = calls.clone();
  container.set_factory("Greeter", move |_, _, _| {
    counter.fetch_add(1, Ordering::SeqCst);
    Ok(Value::from("hello"))
  });

  // Act
  let first = container.get("Greeter").unwrap();
  let second = container.get("Greeter").unwrap();

  // Assert
  assert_eq!(first, Value::from("hello"));
  assert_eq!(second, Value::from("hello"));
  assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_factory_receives_identifier_and_alias() {
  // Arrange
  let container = container();
  let seen = Arc::new(Mutex::new(Vec::new()));
  let recorder = seen.clone();
  container.set_factory("store", move |_, id, alias| {
    recorder
      .lock()
      .unwrap()
      .push((id.to_owned(), alias.map(str::to_owned)));
    Ok(Value::from("redis"))
  });
  container.set("App\\StoreInterface", Binding::reference("store"));

  // Act
  let value = container.get("App\\StoreInterface").unwrap();

  // Assert
  assert_eq!(value, Value::from("redis"));
  assert_eq!(
    *seen.lock().unwrap(),
    vec![("store".to_owned(), Some("App\\StoreInterface".to_owned()))]
  );
}

#[test]
fn test_factory_can_resolve_other_entries() {
  // Arrange
  let container = container();
  container.set("App\\Logger::level", "warning");
  container.set_factory("log.level", |c, _, _| {
    let logger = c.get_object::<Logger>("App\\Logger")?;
    Ok(Value::from(logger.level.clone()))
  });

  // Act
  let level = container.get("log.level").unwrap();

  // Assert
  assert_eq!(level, Value::from("warning"));
}

#[test]
fn test_user_scalar_cannot_be_resolved() {
  // Arrange
  let container = container();
  container.set("x", 42);

  // Act
  let error = container.get("x").unwrap_err();

  // Assert
  assert_eq!(error.kind(), ErrorKind::NotFound);
  assert_eq!(error.id(), "x");
  assert!(matches!(error, Error::InvalidBinding { binding: "int", .. }));
}

#[test]
fn test_unknown_identifier_is_not_found() {
  let container = container();

  let error = container.get("App\\Missing").unwrap_err();

  assert!(matches!(&error, Error::NotFound { id } if id == "App\\Missing"));
  assert_eq!(error.kind().code(), 4);
  assert_eq!(error.to_string(), "No entry was found for App\\Missing identifier.");
}

#[test]
fn test_container_resolves_itself() {
  // Arrange
  let container = container();

  // Act
  let resolved = container.get_object::<Container>("Container").unwrap();

  // Assert
  assert!(resolved.same(&container));
  assert!(container.has("Container"));
  // The self reference is not memoized.
  assert!(container.is_empty());
}

#[test]
fn test_custom_self_identifier() {
  let container = Container::builder()
    .types(common::types())
    .self_identifier("Psr\\Container\\ContainerInterface")
    .build();

  let resolved = container
    .get_object::<Container>("Psr\\Container\\ContainerInterface")
    .unwrap();

  assert!(resolved.same(&container));
  assert!(!container.has("Container"));
}

#[test]
fn test_interface_convention_without_binding() {
  // Arrange
  let container = container();

  // Act
  let logger = container.get_object::<Logger>("App\\LoggerInterface").unwrap();

  // Assert
  assert_eq!(logger.level, "info");
  assert!(Arc::ptr_eq(&logger, &container.get_object::<Logger>("App\\Logger").unwrap()));
}

#[test]
fn test_has_reports_convention_without_side_effects() {
  let container = container();

  assert!(container.has("App\\Logger"));
  assert!(container.has("App\\LoggerInterface"));
  assert!(container.has("App\\Greeter::greet"));
  assert!(!container.has("App\\Greeter::shout"));
  assert!(!container.has("App\\Unknown"));
  assert!(!container.has("App\\UnknownInterface"));
  assert!(container.is_empty());

  container.set("db.port", 5432);
  assert!(container.has("db.port"));
}

#[test]
fn test_get_object_with_wrong_type() {
  let container = container();

  let error = container.get_object::<Database>("App\\Logger").err().unwrap();

  assert!(matches!(error, Error::UnexpectedType { ref id, .. } if id == "App\\Logger"));
  assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[test]
fn test_set_replaces_a_memoized_entry() {
  // Arrange
  let container = container();
  let original = container.get_object::<Logger>("App\\Logger").unwrap();

  // Act
  container.set(
    "App\\Logger",
    Value::object(
      "App\\Logger",
      Logger {
        level: "trace".to_owned(),
      },
    ),
  );
  let replaced = container.get_object::<Logger>("App\\Logger").unwrap();

  // Assert
  assert!(!Arc::ptr_eq(&original, &replaced));
  assert_eq!(replaced.level, "trace");
}

#[test]
fn test_existing_objects_are_returned_as_is() {
  let container = container();
  let greeter = Value::object(
    "App\\Greeter",
    Greeter {
      greeting: "Hi".to_owned(),
    },
  );
  container.set("greeter", greeter.clone());

  assert_eq!(container.get("greeter").unwrap(), greeter);
  assert_eq!(container.get("greeter").unwrap(), greeter);
}

#[test]
fn test_call_binds_method_parameters_without_caching() {
  // Arrange
  let container = container();
  let target = Value::from("App\\Greeter");

  // Act
  let ada = container
    .call(&target, "greet", args! { "name" => "Ada" })
    .unwrap();
  let bob = container
    .call(&target, "greet", args! { "name" => "Bob", "punctuation" => "?" })
    .unwrap();

  // Assert
  assert_eq!(ada, Value::from("Hello, Ada!"));
  assert_eq!(bob, Value::from("Hello, Bob?"));
}

#[test]
fn test_call_on_an_object_autowires_method_parameters() {
  let container = container();
  container.set("App\\Logger::level", "notice");
  let greeter = container.get("App\\Greeter").unwrap();

  let loudness = container.call(&greeter, "loudness", args!()).unwrap();

  assert_eq!(loudness, Value::from("NOTICE"));
}

#[test]
fn test_call_on_a_scalar_is_rejected() {
  let container = container();

  let error = container
    .call(&Value::Int(3), "greet", args!())
    .unwrap_err();

  assert!(matches!(error, Error::UnexpectedType { .. }));
}

#[test]
fn test_method_identifier_is_resolved_and_memoized() {
  // Arrange
  let container = container();

  // Act
  let first = container
    .get_with("App\\Greeter::greet", args! { "name" => "Cy" })
    .unwrap();
  let second = container.get("App\\Greeter::greet").unwrap();

  // Assert
  assert_eq!(first, Value::from("Hello, Cy!"));
  assert_eq!(second, Value::from("Hello, Cy!"));
}

#[test]
fn test_method_identifier_through_interface() {
  let container = container();
  container.set("App\\GreeterInterface::greet::name", "Dee");

  let greeting = container.get("App\\GreeterInterface::greet").unwrap();

  assert_eq!(greeting, Value::from("Hello, Dee!"));
}

#[test]
fn test_type_and_method_pair_resolves_the_member() {
  // Arrange
  let container = container();
  container.set(
    "hello",
    Value::List(vec![Value::from("App\\Greeter"), Value::from("greet")]),
  );

  // Act
  let greeting = container
    .get_with("hello", args! { "name" => "Ann" })
    .unwrap();

  // Assert
  assert_eq!(greeting, Value::from("Hello, Ann!"));
  assert_eq!(container.get("hello").unwrap(), greeting);
}

#[test]
fn test_object_and_method_pair_calls_the_object() {
  // Arrange
  let container = container();
  let greeter = Value::object(
    "App\\Greeter",
    Greeter {
      greeting: "Hi".to_owned(),
    },
  );
  container.set("hi", Value::List(vec![greeter, Value::from("greet")]));

  // Act
  let greeting = container
    .get_with("hi", args! { "name" => "Bo", "punctuation" => "." })
    .unwrap();

  // Assert
  assert_eq!(greeting, Value::from("Hi, Bo."));
}

#[test]
fn test_list_that_is_not_a_callable_pair_is_invalid() {
  let container = container();
  container.set(
    "pair",
    Value::List(vec![Value::from("App\\Greeter"), Value::from("shout")]),
  );

  let error = container.get("pair").unwrap_err();

  assert!(matches!(error, Error::InvalidBinding { binding: "list", .. }));
}

#[test]
fn test_instantiate_does_not_memoize() {
  let container = container();

  let first = container.instantiate("App\\Logger", None, args!()).unwrap();
  let second = container.instantiate("App\\Logger", None, args!()).unwrap();

  assert_ne!(first, second);
  assert!(container.is_empty());
}

#[test]
fn test_clones_share_the_registry() {
  let container = container();
  let handle = container.clone();

  handle.set("App\\Logger::level", "error");
  let logger = container.get_object::<Logger>("App\\Logger").unwrap();

  assert!(handle.same(&container));
  assert_eq!(logger.level, "error");
  assert!(!Container::new().same(&container));
}
