// examples/wiring.rs
//
// Run with `RUST_LOG=fibre_autowire=trace cargo run --example wiring` to watch
// each resolution step.

use fibre_autowire::{args, ClassDef, ClassTable, Container, ContainerConfig, Parameter, Value};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// --- Application types ---

struct Clock;

impl Clock {
  fn now(&self) -> &'static str {
    "2024-01-01T00:00:00Z"
  }
}

struct Store {
  url: String,
  pool_size: i64,
}

struct Notifier {
  store: Arc<Store>,
  clock: Arc<Clock>,
  channel: String,
}

fn types() -> ClassTable {
  ClassTable::new()
    .class(ClassDef::new("App\\Clock").constructor(|_| Ok(Clock)))
    .class(
      ClassDef::new("App\\Store")
        .param(Parameter::new("url").typed("string"))
        .param(Parameter::new("pool_size").typed("int").default_value(4))
        .constructor(|args| {
          Ok(Store {
            url: args.str("url")?.to_owned(),
            pool_size: args.int("pool_size")?,
          })
        }),
    )
    .class(
      ClassDef::new("App\\Notifier")
        .param(Parameter::new("store").typed("App\\StoreInterface"))
        .param(Parameter::new("clock").typed("App\\ClockInterface"))
        .param(Parameter::new("channel").typed("string").default_value("email"))
        .constructor(|args| {
          Ok(Notifier {
            store: args.object("store")?,
            clock: args.object("clock")?,
            channel: args.str("channel")?.to_owned(),
          })
        })
        .method::<Notifier, _>(
          "notify",
          [Parameter::new("recipient").typed("string")],
          |notifier, args| {
            Ok(Value::from(format!(
              "[{}] {} via {} (store {}, pool {})",
              notifier.clock.now(),
              args.str("recipient")?,
              notifier.channel,
              notifier.store.url,
              notifier.store.pool_size
            )))
          },
        ),
    )
}

const CONFIG: &str = r#"
bindings:
  App\Store::url: "postgres://localhost/app"
  App\Store::pool_size: "16"
  App\Notifier::channel: sms
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = ContainerConfig::from_yaml_str(CONFIG)?;
  let container = Container::builder().types(types()).config(config).build();

  let notifier = container.get("App\\Notifier")?;
  let message = container.call(&notifier, "notify", args! { "recipient" => "+15550100" })?;
  println!("{}", message.as_str().unwrap_or_default());

  // The whole graph was memoized along the way.
  for id in ["App\\Notifier", "App\\StoreInterface", "App\\Store", "App\\ClockInterface"] {
    println!("{id}: memoized = {}", container.get(id)? == container.get(id)?);
  }
  Ok(())
}
