#![allow(dead_code)]

use fibre_autowire::{BoxError, ClassDef, ClassTable, Container, Instance, Parameter, Value};
use std::sync::Arc;

// --- Shared Test Fixtures ---

#[derive(Debug)]
pub struct Logger {
  pub level: String,
}

pub struct Database {
  pub dsn: String,
  pub logger: Arc<Logger>,
}

pub struct Repository {
  pub db: Arc<Database>,
}

pub struct Mailer {
  pub host: String,
  pub port: i64,
  pub secure: bool,
  pub logger: Option<Arc<Logger>>,
}

pub struct Report {
  pub payload: Value,
  pub flag: bool,
  pub count: i64,
}

pub struct Greeter {
  pub greeting: String,
}

// Only ever registered, never built: its constructor requires itself.
pub struct Node;

pub struct Chicken;
pub struct Egg;

pub struct RedisStore;
pub struct MemoryStore;

pub struct Cache {
  pub store: Instance,
}

/// The type metadata every integration test builds its container from.
pub fn types() -> ClassTable {
  ClassTable::new()
    .class(
      ClassDef::new("App\\Logger")
        .param(Parameter::new("level").typed("string").default_value("info"))
        .constructor(|args| {
          Ok(Logger {
            level: args.str("level")?.to_owned(),
          })
        }),
    )
    .class(
      ClassDef::new("App\\Database")
        .param(Parameter::new("dsn").typed("string"))
        .param(Parameter::new("logger").typed("App\\LoggerInterface"))
        .constructor(|args| {
          Ok(Database {
            dsn: args.str("dsn")?.to_owned(),
            logger: args.object("logger")?,
          })
        }),
    )
    .class(
      ClassDef::new("App\\Repository")
        .param(Parameter::new("db").typed("App\\DatabaseInterface"))
        .constructor(|args| {
          Ok(Repository {
            db: args.object("db")?,
          })
        }),
    )
    .class(
      ClassDef::new("App\\Mailer")
        .param(Parameter::new("host").typed("string").default_value("localhost"))
        .param(Parameter::new("port").typed("int").default_value(25))
        .param(Parameter::new("secure").typed("bool").default_value(false))
        .param(Parameter::new("logger").typed("?App\\AuditLogger"))
        .constructor(|args| {
          Ok(Mailer {
            host: args.str("host")?.to_owned(),
            port: args.int("port")?,
            secure: args.bool("secure")?,
            logger: args.optional_object("logger")?,
          })
        }),
    )
    .class(
      ClassDef::new("App\\Report")
        .param(Parameter::new("payload").typed("mixed"))
        .param(Parameter::new("flag").typed("bool"))
        .param(Parameter::new("count").typed("int"))
        .constructor(|args| {
          Ok(Report {
            payload: args.value("payload")?.clone(),
            flag: args.bool("flag")?,
            count: args.int("count")?,
          })
        }),
    )
    .class(
      ClassDef::new("App\\Greeter")
        .param(Parameter::new("greeting").typed("string").default_value("Hello"))
        .constructor(|args| {
          Ok(Greeter {
            greeting: args.str("greeting")?.to_owned(),
          })
        })
        .method::<Greeter, _>(
          "greet",
          [
            Parameter::new("name").typed("string"),
            Parameter::new("punctuation").typed("string").default_value("!"),
          ],
          |greeter, args| {
            Ok(Value::from(format!(
              "{}, {}{}",
              greeter.greeting,
              args.str("name")?,
              args.str("punctuation")?
            )))
          },
        )
        .method::<Greeter, _>(
          "loudness",
          [Parameter::new("logger").typed("App\\LoggerInterface")],
          |_, args| {
            let logger = args.object::<Logger>("logger")?;
            Ok(Value::from(logger.level.to_uppercase()))
          },
        ),
    )
    .class(
      ClassDef::new("App\\Node")
        .param(Parameter::new("next").typed("App\\Node"))
        .constructor(|_| Ok(Node)),
    )
    .class(
      ClassDef::new("App\\Chicken")
        .param(Parameter::new("egg").typed("App\\Egg"))
        .constructor(|_| Ok(Chicken)),
    )
    .class(
      ClassDef::new("App\\Egg")
        .param(Parameter::new("chicken").typed("App\\Chicken"))
        .constructor(|_| Ok(Egg)),
    )
    .class(
      ClassDef::new("App\\Broken")
        .constructor(|_| -> Result<Node, BoxError> { Err("disk on fire".into()) }),
    )
    .class(ClassDef::new("App\\RedisStore").constructor(|_| Ok(RedisStore)))
    .class(ClassDef::new("App\\MemoryStore").constructor(|_| Ok(MemoryStore)))
    .class(
      ClassDef::new("App\\Cache")
        .param(Parameter::new("store").union(["App\\RedisStore", "App\\MemoryStore"]))
        .constructor(|args| {
          Ok(Cache {
            store: args.instance("store")?.clone(),
          })
        }),
    )
}

pub fn container() -> Container {
  Container::with_types(types())
}

/// A standalone database object, as application code would bind it.
pub fn database(dsn: &str) -> Value {
  Value::object(
    "App\\Database",
    Database {
      dsn: dsn.to_owned(),
      logger: Arc::new(Logger {
        level: "info".to_owned(),
      }),
    },
  )
}
