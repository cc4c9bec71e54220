//! The interface-to-implementation naming convention.

/// Maps an identifier that has no binding of its own to a fallback identifier.
pub trait IdentifierTransform: Send + Sync {
  fn fallback<'a>(&self, id: &'a str) -> Option<&'a str>;
}

/// Resolves `<Name><suffix>` to `<Name>`, e.g. `App\LoggerInterface` to `App\Logger`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSuffix {
  suffix: String,
}

impl InterfaceSuffix {
  pub const DEFAULT: &'static str = "Interface";

  pub fn new(suffix: impl Into<String>) -> Self {
    Self {
      suffix: suffix.into(),
    }
  }

  pub fn suffix(&self) -> &str {
    &self.suffix
  }
}

impl Default for InterfaceSuffix {
  fn default() -> Self {
    Self::new(Self::DEFAULT)
  }
}

impl IdentifierTransform for InterfaceSuffix {
  fn fallback<'a>(&self, id: &'a str) -> Option<&'a str> {
    if self.suffix.is_empty() {
      return None;
    }
    id.strip_suffix(self.suffix.as_str())
      .filter(|stripped| !stripped.is_empty() && !stripped.ends_with('\\'))
  }
}
