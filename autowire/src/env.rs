//! Environment lookups for `env`-tagged descriptor parameters.

use std::collections::HashMap;

/// Reads a named environment variable.
pub trait EnvReader: Send + Sync {
  fn read(&self, name: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvReader for ProcessEnv {
  fn read(&self, name: &str) -> Option<String> {
    std::env::var(name).ok()
  }
}

/// A fixed set of variables, independent of the process environment.
#[derive(Debug, Default, Clone)]
pub struct StaticEnv {
  vars: HashMap<String, String>,
}

impl StaticEnv {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.vars.insert(name.into(), value.into());
    self
  }
}

impl EnvReader for StaticEnv {
  fn read(&self, name: &str) -> Option<String> {
    self.vars.get(name).cloned()
  }
}
