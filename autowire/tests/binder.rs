mod common;

use common::{container, database, Cache, Database, Logger, Mailer, Report, Repository};
use fibre_autowire::{args, Binding, Error, ErrorKind, Value};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn test_explicit_arguments_are_coerced_to_builtin_types() {
  // Arrange
  let container = container();
  let payload = Value::List(vec![Value::from("raw"), Value::Int(1)]);

  // Act
  let report = container
    .get_with(
      "App\\Report",
      args! { "payload" => payload.clone(), "flag" => "0", "count" => "14" },
    )
    .unwrap()
    .downcast::<Report>()
    .unwrap();

  // Assert
  assert!(!report.flag);
  assert_eq!(report.count, 14);
  assert_eq!(report.payload, payload);
}

#[test]
fn test_registry_overrides_are_coerced_and_mixed_passes_through() {
  // Arrange
  let container = container();
  container.set("App\\Report::payload", "0");
  container.set("App\\Report::flag", "yes");
  container.set("App\\Report::count", "7 apples");

  // Act
  let report = container.get_object::<Report>("App\\Report").unwrap();

  // Assert
  assert_eq!(report.payload, Value::from("0"));
  assert!(report.flag);
  assert_eq!(report.count, 7);
}

#[test]
fn test_id_scoped_override_beats_type_bindings() {
  // Arrange
  let container = container();
  let x = database("x://");
  let y = database("y://");
  let z = database("z://");
  container.set("App\\Repository::db", x.clone());
  container.set("App\\DatabaseInterface::db", z);
  container.set("App\\DatabaseInterface", y);

  // Act
  let repository = container.get_object::<Repository>("App\\Repository").unwrap();

  // Assert
  assert_eq!(repository.db.dsn, "x://");
  assert!(Arc::ptr_eq(&repository.db, &x.downcast::<Database>().unwrap()));
}

#[test]
fn test_type_scoped_override_beats_plain_type_binding() {
  let container = container();
  container.set("App\\DatabaseInterface::db", database("z://"));
  container.set("App\\DatabaseInterface", database("y://"));

  let repository = container.get_object::<Repository>("App\\Repository").unwrap();

  assert_eq!(repository.db.dsn, "z://");
}

#[test]
fn test_type_binding_is_used_without_scoped_overrides() {
  let container = container();
  container.set("App\\DatabaseInterface", database("y://"));

  let repository = container.get_object::<Repository>("App\\Repository").unwrap();

  assert_eq!(repository.db.dsn, "y://");
}

#[test]
fn test_stripped_type_binding_is_the_last_override() {
  // Arrange: only the implementation is bound, the parameter asks for the interface.
  let container = container();
  let y = database("y://");
  container.set("App\\Database", y.clone());

  // Act
  let repository = container.get_object::<Repository>("App\\Repository").unwrap();

  // Assert
  assert!(Arc::ptr_eq(&repository.db, &y.downcast::<Database>().unwrap()));
}

#[test]
fn test_alias_scoped_override_applies_only_through_the_alias() {
  // Arrange
  let aliased = container();
  aliased.set("App\\LoggerInterface", "App\\Logger");
  aliased.set("App\\LoggerInterface::level", "debug");
  let direct = container();
  direct.set("App\\LoggerInterface::level", "debug");

  // Act
  let through_alias = aliased.get_object::<Logger>("App\\LoggerInterface").unwrap();
  let without_alias = direct.get_object::<Logger>("App\\Logger").unwrap();

  // Assert
  assert_eq!(through_alias.level, "debug");
  assert_eq!(without_alias.level, "info");
}

#[test]
fn test_alias_parameter_key_beats_id_parameter_key() {
  // Arrange
  let container = container();
  container.set("App\\LoggerInterface", "App\\Logger");
  container.set("App\\LoggerInterface::level", "debug");
  container.set("App\\Logger::level", "warning");

  // Act
  let logger = container.get_object::<Logger>("App\\LoggerInterface").unwrap();

  // Assert
  assert_eq!(logger.level, "debug");
}

#[test]
fn test_id_type_key_beats_type_parameter_key() {
  // Arrange
  let container = container();
  container.set("App\\Repository::App\\DatabaseInterface", database("idtype://"));
  container.set("App\\DatabaseInterface::db", database("typeparam://"));

  // Act
  let repository = container.get_object::<Repository>("App\\Repository").unwrap();

  // Assert
  assert_eq!(repository.db.dsn, "idtype://");
}

#[test]
fn test_id_parameter_key_beats_id_type_key() {
  let container = container();
  container.set("App\\Repository::db", database("idparam://"));
  container.set("App\\Repository::App\\DatabaseInterface", database("idtype://"));

  let repository = container.get_object::<Repository>("App\\Repository").unwrap();

  assert_eq!(repository.db.dsn, "idparam://");
}

#[test]
fn test_alias_type_key_beats_id_type_key() {
  // Arrange: the repository is reached through its unbound interface.
  let container = container();
  container.set(
    "App\\RepositoryInterface::App\\DatabaseInterface",
    database("aliastype://"),
  );
  container.set("App\\Repository::App\\DatabaseInterface", database("idtype://"));

  // Act
  let repository = container
    .get_object::<Repository>("App\\RepositoryInterface")
    .unwrap();

  // Assert
  assert_eq!(repository.db.dsn, "aliastype://");
}

#[test]
fn test_defaults_and_nullable_parameters() {
  let container = container();

  let mailer = container.get_object::<Mailer>("App\\Mailer").unwrap();

  assert_eq!(mailer.host, "localhost");
  assert_eq!(mailer.port, 25);
  assert!(!mailer.secure);
  assert!(mailer.logger.is_none());
}

#[test]
fn test_positional_arguments_feed_builtin_parameters_in_order() {
  let container = container();

  let mailer = container
    .get_with("App\\Mailer", args!["smtp.example.com", "2525"])
    .unwrap()
    .downcast::<Mailer>()
    .unwrap();

  assert_eq!(mailer.host, "smtp.example.com");
  assert_eq!(mailer.port, 2525);
  assert!(!mailer.secure);
}

#[test]
fn test_missing_builtin_parameter_is_reported_by_name() {
  // Arrange
  let container = container();

  // Act
  let error = container.get("App\\Database").unwrap_err();

  // Assert
  assert_eq!(error.kind(), ErrorKind::NotFound);
  match error {
    Error::MissingParameter { id, parameter } => {
      assert_eq!(id, "App\\Database");
      assert_eq!(parameter, "dsn");
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn test_missing_parameter_surfaces_through_dependents() {
  let container = container();

  let error = container.get("App\\Repository").err().unwrap();

  assert!(matches!(error, Error::MissingParameter { ref id, .. } if id == "App\\Database"));
}

#[test]
fn test_union_prefers_a_bound_member() {
  // Arrange
  let container = container();
  let memory = Value::object("App\\MemoryStore", common::MemoryStore);
  container.set("App\\MemoryStore", memory);

  // Act
  let cache = container.get_object::<Cache>("App\\Cache").unwrap();

  // Assert
  assert_eq!(cache.store.type_name(), "App\\MemoryStore");
}

#[test]
fn test_union_falls_back_to_first_resolvable_member() {
  let container = container();

  let cache = container.get_object::<Cache>("App\\Cache").unwrap();

  assert_eq!(cache.store.type_name(), "App\\RedisStore");
}

#[test]
fn test_explicit_identifier_string_for_object_parameter() {
  // Arrange
  let container = container();
  container.set("App\\Database::dsn", "pgsql://primary");

  // Act
  let repository = container
    .get_with("App\\Repository", args! { "db" => "App\\Database" })
    .unwrap()
    .downcast::<Repository>()
    .unwrap();

  // Assert
  let database = container.get_object::<Database>("App\\Database").unwrap();
  assert!(Arc::ptr_eq(&repository.db, &database));
}

#[test]
fn test_override_map_binding_constructs_the_identifier() {
  // Arrange
  let container = container();
  container.set(
    "App\\Mailer",
    Binding::overrides([("host", "mx.example.com"), ("port", "587")]),
  );

  // Act
  let mailer = container.get_object::<Mailer>("App\\Mailer").unwrap();

  // Assert
  assert_eq!(mailer.host, "mx.example.com");
  assert_eq!(mailer.port, 587);
}

#[test]
fn test_caller_arguments_beat_bound_overrides() {
  let container = container();
  container.set("App\\Mailer", Binding::overrides([("port", 587)]));

  let mailer = container
    .get_with("App\\Mailer", args! { "port" => 465 })
    .unwrap()
    .downcast::<Mailer>()
    .unwrap();

  assert_eq!(mailer.port, 465);
}

#[test]
fn test_alias_overrides_beat_class_overrides() {
  // Arrange
  let container = container();
  container.set("App\\Mailer", Binding::overrides([("host", "class.example")]));
  container.set(
    "App\\MailerInterface",
    Binding::overrides([("host", "interface.example")]),
  );

  // Act
  let mailer = container
    .get_object::<Mailer>("App\\MailerInterface")
    .unwrap();

  // Assert
  assert_eq!(mailer.host, "interface.example");
}

#[test]
fn test_parameter_plans_are_cached() {
  let container = container();

  let first = container.parameters("App\\Mailer").unwrap();
  let second = container.parameters("App\\Mailer").unwrap();

  assert!(Arc::ptr_eq(&first, &second));
  assert_eq!(first.target(), "App\\Mailer");
  let names: Vec<_> = first.params().iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, vec!["host", "port", "secure", "logger"]);
  assert!(first.param(0).unwrap().builtin);
  assert!(!first.param(3).unwrap().builtin);
  assert!(first.param(3).unwrap().allows_null);
}

#[test]
fn test_method_plans_are_addressed_by_member_identifier() {
  let container = container();

  let plan = container.parameters("App\\Greeter::greet").unwrap();

  assert_eq!(plan.len(), 2);
  assert!(plan.param(1).unwrap().optional);
  assert!(container.parameters("App\\Greeter::shout").is_err());
}
