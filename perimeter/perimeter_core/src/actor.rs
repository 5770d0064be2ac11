//! The ambient acting identity of a request.
//!
//! A [`CurrentActor`] is created once per request and shared (through
//! [`crate::render::RenderContext`]) with everything that runs on behalf of
//! that request. Delegated rendering swaps the identity with
//! [`CurrentActor::scope`] or [`CurrentActor::run_as`]; the previous identity
//! is restored when the returned [`ActorScope`] is dropped, which also happens
//! on early return and during unwinding.

use parking_lot::RwLock;
use tracing::trace;

use crate::types::Actor;

/// Holder of the identity a request is currently acting as.
#[derive(Debug, Default)]
pub struct CurrentActor {
    actor: RwLock<Option<Actor>>,
}

impl CurrentActor {
    /// Create the cell for a request made by `actor` (`None` for anonymous).
    pub fn new(actor: Option<Actor>) -> Self {
        Self {
            actor: RwLock::new(actor),
        }
    }

    /// The identity currently in effect.
    pub fn get(&self) -> Option<Actor> {
        self.actor.read().clone()
    }

    /// Act as `actor` until the returned guard is dropped.
    #[must_use = "the previous actor is restored as soon as the scope is dropped"]
    pub fn scope(&self, actor: Actor) -> ActorScope<'_> {
        let previous = std::mem::replace(&mut *self.actor.write(), Some(actor));
        trace!(previous = ?previous, "entering delegated actor scope");
        ActorScope {
            cell: self,
            previous: Some(previous),
        }
    }

    /// Run `f` while acting as `actor`, restoring the previous identity on
    /// every exit path.
    pub fn run_as<R>(&self, actor: Actor, f: impl FnOnce() -> R) -> R {
        let _scope = self.scope(actor);
        f()
    }
}

/// Guard returned by [`CurrentActor::scope`].
#[derive(Debug)]
pub struct ActorScope<'a> {
    cell: &'a CurrentActor,
    previous: Option<Option<Actor>>,
}

impl Drop for ActorScope<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self.cell.actor.write() = previous;
            trace!("left delegated actor scope");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ActorName;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn actor(name: &str) -> Actor {
        Actor::new(ActorName::new(name).unwrap())
    }

    #[test]
    fn test_run_as_restores() {
        let current = CurrentActor::new(Some(actor("viewer")));

        let seen = current.run_as(actor("granter"), || current.get());

        assert_eq!(seen, Some(actor("granter")));
        assert_eq!(current.get(), Some(actor("viewer")));
    }

    #[test]
    fn test_restores_anonymous() {
        let current = CurrentActor::new(None);
        {
            let _scope = current.scope(actor("granter"));
            assert_eq!(current.get(), Some(actor("granter")));
        }
        assert_eq!(current.get(), None);
    }

    #[test]
    fn test_nested_scopes_unwind_in_order() {
        let current = CurrentActor::new(Some(actor("viewer")));
        current.run_as(actor("outer"), || {
            current.run_as(actor("inner"), || {
                assert_eq!(current.get(), Some(actor("inner")));
            });
            assert_eq!(current.get(), Some(actor("outer")));
        });
        assert_eq!(current.get(), Some(actor("viewer")));
    }

    #[test]
    fn test_restores_on_error_and_panic() {
        let current = CurrentActor::new(Some(actor("viewer")));

        let result: Result<(), &str> = current.run_as(actor("granter"), || Err("render failed"));
        assert!(result.is_err());
        assert_eq!(current.get(), Some(actor("viewer")));

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            current.run_as::<()>(actor("granter"), || panic!("renderer panicked"))
        }));
        assert!(outcome.is_err());
        assert_eq!(current.get(), Some(actor("viewer")));
    }
}
