use thiserror::Error;

/// A boxed error raised by a collaborator (a factory, a constructor, a method body).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The coarse category of an engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  /// The identifier, or one of its parameters, has no resolvable value.
  NotFound,
  /// An identifier or a parameter refers back to something already being resolved.
  CircularDependency,
  /// The type introspector or the underlying constructor failed.
  ConstructionFailure,
  /// A factory callback, a method body or a structured descriptor build failed.
  InvocationFailure,
}

impl ErrorKind {
  /// A stable numeric code for the kind.
  pub fn code(self) -> u32 {
    match self {
      ErrorKind::ConstructionFailure => 1,
      ErrorKind::CircularDependency => 2,
      ErrorKind::InvocationFailure => 3,
      ErrorKind::NotFound => 4,
    }
  }
}

/// The main error type for `fibre_autowire`.
///
/// Every variant carries the identifier it was raised for. Errors coming back
/// from user code are wrapped exactly once: if a callback returns an `Error`
/// produced by a nested resolution, it is passed through untouched.
#[derive(Debug, Error)]
pub enum Error {
  #[error("No entry was found for {id} identifier.")]
  NotFound { id: String },

  #[error("Error while retrieving the entry {id}, a {binding} binding cannot satisfy a resolution.")]
  InvalidBinding { id: String, binding: &'static str },

  #[error("Error while retrieving the entry {id}, parameter missing: ${parameter}.")]
  MissingParameter { id: String, parameter: String },

  #[error("Error while retrieving the entry {id}, the resolved value is not a {expected}.")]
  UnexpectedType { id: String, expected: String },

  #[error("Circular dependency detected while resolving {id}: {}", .path.join(" -> "))]
  CircularDependency { id: String, path: Vec<String> },

  #[error("Circular dependency detected while resolving {id}: parameter ${parameter} requires {id} itself.")]
  SelfReferentialParameter { id: String, parameter: String },

  #[error("Error while constructing the entry {id}: {source}")]
  ConstructionFailure {
    id: String,
    #[source]
    source: BoxError,
  },

  #[error("Error while invoking the entry {id}: {source}")]
  InvocationFailure {
    id: String,
    #[source]
    source: BoxError,
  },
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::NotFound { .. }
      | Error::InvalidBinding { .. }
      | Error::MissingParameter { .. }
      | Error::UnexpectedType { .. } => ErrorKind::NotFound,
      Error::CircularDependency { .. } | Error::SelfReferentialParameter { .. } => {
        ErrorKind::CircularDependency
      }
      Error::ConstructionFailure { .. } => ErrorKind::ConstructionFailure,
      Error::InvocationFailure { .. } => ErrorKind::InvocationFailure,
    }
  }

  /// The identifier the failure was raised for.
  pub fn id(&self) -> &str {
    match self {
      Error::NotFound { id }
      | Error::InvalidBinding { id, .. }
      | Error::MissingParameter { id, .. }
      | Error::UnexpectedType { id, .. }
      | Error::CircularDependency { id, .. }
      | Error::SelfReferentialParameter { id, .. }
      | Error::ConstructionFailure { id, .. }
      | Error::InvocationFailure { id, .. } => id,
    }
  }

  pub(crate) fn not_found(id: impl Into<String>) -> Self {
    Error::NotFound { id: id.into() }
  }

  /// Converts a collaborator error into an engine error, passing engine errors through.
  pub(crate) fn absorb(source: BoxError, wrap: impl FnOnce(BoxError) -> Error) -> Error {
    match source.downcast::<Error>() {
      Ok(engine) => *engine,
      Err(foreign) => wrap(foreign),
    }
  }
}

/// A specialized `Result` type for `fibre_autowire` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while loading a container configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read configuration file: {0}")]
  Read(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  Parse(#[from] serde_yaml::Error),

  #[error("Unsupported configuration version {0}, expected 1")]
  UnsupportedVersion(u32),

  #[error("Invalid binding for '{id}': {message}")]
  InvalidBinding { id: String, message: String },
}
