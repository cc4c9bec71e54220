//! Core, non-public helpers: identifier parsing and the resolution path.

use crate::error::{Error, Result};
use std::cell::RefCell;

thread_local! {
  // The identifiers currently being resolved on this thread, tagged with the
  // container they belong to. This is what detects circular dependencies.
  static RESOLVING_STACK: RefCell<Vec<(u64, String)>> = const { RefCell::new(Vec::new()) };
}

/// An RAII guard marking an identifier as "being resolved".
///
/// Entering an identifier that is already on the current thread's path for the
/// same container yields `CircularDependency`. Dropping the guard removes the
/// entry again, on success and on error alike.
pub(crate) struct ResolutionGuard {
  container: u64,
  id: String,
}

impl ResolutionGuard {
  pub(crate) fn enter(container: u64, id: &str) -> Result<Self> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if stack
        .iter()
        .any(|(owner, active)| *owner == container && active == id)
      {
        let path = stack
          .iter()
          .filter(|(owner, _)| *owner == container)
          .map(|(_, active)| active.clone())
          .chain(std::iter::once(id.to_owned()))
          .collect();
        return Err(Error::CircularDependency {
          id: id.to_owned(),
          path,
        });
      }
      stack.push((container, id.to_owned()));
      Ok(())
    })?;
    Ok(Self {
      container,
      id: id.to_owned(),
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(index) = stack
        .iter()
        .rposition(|(owner, active)| *owner == self.container && *active == self.id)
      {
        stack.remove(index);
      }
    });
  }
}

/// Splits `Type::member` into its type and member parts.
pub(crate) fn split_member(identifier: &str) -> (&str, Option<&str>) {
  match identifier.split_once("::") {
    Some((type_name, member)) if !type_name.is_empty() && !member.is_empty() => {
      (type_name, Some(member))
    }
    _ => (identifier, None),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::ErrorKind;

  #[test]
  fn reentering_is_a_cycle() {
    let _outer = ResolutionGuard::enter(7, "A").unwrap();
    let _inner = ResolutionGuard::enter(7, "B").unwrap();
    let err = ResolutionGuard::enter(7, "A").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::CircularDependency);
    match err {
      Error::CircularDependency { path, .. } => assert_eq!(path, vec!["A", "B", "A"]),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn guards_are_scoped_per_container_and_released() {
    {
      let _a = ResolutionGuard::enter(1, "A").unwrap();
      assert!(ResolutionGuard::enter(2, "A").is_ok());
    }
    assert!(ResolutionGuard::enter(1, "A").is_ok());
  }

  #[test]
  fn member_identifiers() {
    assert_eq!(split_member("App\\Foo"), ("App\\Foo", None));
    assert_eq!(split_member("App\\Foo::bar"), ("App\\Foo", Some("bar")));
    assert_eq!(split_member("App\\Foo::bar::x"), ("App\\Foo", Some("bar::x")));
    assert_eq!(split_member("::bar"), ("::bar", None));
  }
}
