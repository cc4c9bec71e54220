//! # Fibre Autowire
//!
//! A reflection-driven dependency-resolution engine: ask for an identifier,
//! get back a fully constructed value.
//!
//! Constructor and method parameters are bound automatically from caller
//! arguments, scoped overrides stored in the container, declared defaults and
//! the declared parameter types, which are themselves resolved recursively.
//!
//! ## Core Concepts
//!
//! - **Container**: holds bindings (values, factories, references, parameter
//!   overrides, structured descriptors) and memoizes resolution results.
//! - **Introspector**: supplies type metadata and performs construction.
//!   [`ClassTable`] is the provided registration-table implementation.
//! - **Binder**: computes the argument list of a constructor or method.
//! - **Pipeline**: the ordered [`Interpreter`] stages that turn a stored
//!   binding into a value. Custom stages can be added through the builder.
//! - **Convention**: `<Name>Interface` falls back to `<Name>` when unbound.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_autowire::{ClassDef, ClassTable, Container, Parameter};
//! use std::sync::Arc;
//!
//! struct Config {
//!     dsn: String,
//! }
//!
//! struct Database {
//!     config: Arc<Config>,
//!     pool: i64,
//! }
//!
//! let types = ClassTable::new()
//!     .class(
//!         ClassDef::new("App\\Config")
//!             .param(Parameter::new("dsn").typed("string"))
//!             .constructor(|args| Ok(Config { dsn: args.str("dsn")?.to_owned() })),
//!     )
//!     .class(
//!         ClassDef::new("App\\Database")
//!             .param(Parameter::new("config").typed("App\\Config"))
//!             .param(Parameter::new("pool").typed("int").default_value(4))
//!             .constructor(|args| {
//!                 Ok(Database { config: args.object("config")?, pool: args.int("pool")? })
//!             }),
//!     );
//!
//! let container = Container::with_types(types);
//! // A scoped override: the `dsn` parameter of `App\Config`.
//! container.set("App\\Config::dsn", "sqlite::memory:");
//!
//! let db = container.get_object::<Database>("App\\DatabaseInterface").unwrap();
//! assert_eq!(db.config.dsn, "sqlite::memory:");
//! assert_eq!(db.pool, 4);
//!
//! // Results are memoized.
//! let again = container.get_object::<Database>("App\\Database").unwrap();
//! assert!(Arc::ptr_eq(&db, &again));
//! ```
//!
//! ## YAML Configuration
//!
//! [`ContainerConfig`] loads bindings from a document such as:
//!
//! ```yaml
//! version: 1
//! container:
//!   interface_suffix: Interface
//! bindings:
//!   App\Logger: ~                  # construct on demand
//!   App\Logger::level: debug       # scoped parameter override
//!   App\LoggerInterface:
//!     alias: App\FileLogger        # reference to another entry
//!   App\Mailer:                    # parameter overrides for the class
//!     host: mx.example.com
//!   hello: [App\Greeter, greet]    # method result
//!   db:                            # structured descriptor
//!     class: App\Database
//!     params:
//!       - "env:dsn": DATABASE_URL
//! ```
//!
//! Each binding is read as a descriptor, then a reference, then a plain value.
//! A mapping whose only key is `alias` is therefore always a reference; to
//! override a constructor parameter named `alias`, bind `<id>::alias` instead.

mod arguments;
mod binder;
mod class_table;
pub mod config;
mod container;
mod core;
mod descriptor;
mod env;
mod error;
mod interpret;
mod introspect;
mod macros;
mod registry;
mod transform;
mod value;

pub use arguments::{ArgumentError, Arguments, BoundArguments};
pub use binder::{ParameterPlan, PlannedParameter};
pub use class_table::{ClassDef, ClassTable};
pub use config::ContainerConfig;
pub use container::{Container, ContainerBuilder, SELF_IDENTIFIER};
pub use descriptor::{Descriptor, ParamKind, ParamSpec};
pub use env::{EnvReader, ProcessEnv, StaticEnv};
pub use error::{BoxError, ConfigError, Error, ErrorKind, Result};
pub use interpret::{
  CallablePair, ConstructWithOverrides, ExistingObject, FactoryCall, Interpretation, Interpreter,
  MemoizedValue, Outcome, Pipeline, StructuredDescriptor, TypeAlias,
};
pub use introspect::{is_builtin_type, DeclaredType, Introspector, Parameter, Signature};
pub use registry::{Binding, Factory};
pub use transform::{IdentifierTransform, InterfaceSuffix};
pub use value::{coerce, Instance, Value};
