//! # Raise builder: a fluent, single-use dispatch request.
//!
//! [`Raise::event`] starts a request; the builder then selects the target
//! (the global per-type channel, or a specific [`EventRegistry`] instance —
//! mutually exclusive, last set wins), toggles polymorphism (meaningful for
//! registry targets only), and optionally attaches a guard predicate. The
//! terminal call picks the protocol and consumes the builder.
//!
//! The guard is evaluated at raise time, not at build time. A guard that
//! returns `false` makes the raise a complete no-op: no container is
//! touched, no snapshot is taken, and `Ok(())` is returned.
//!
//! ## Example
//! ```rust
//! use evoke::{Event, EventRegistry, HandlerFn, Raise};
//!
//! struct Deploy {
//!     canary: bool,
//! }
//! impl Event for Deploy {}
//!
//! let registry = EventRegistry::new();
//! registry.bindings::<Deploy>().register(HandlerFn::sync(|_: &Deploy| Ok(()))).unwrap();
//!
//! Raise::event(Deploy { canary: true })
//!     .via(&registry)
//!     .when(|e| e.canary)
//!     .sync()
//!     .unwrap();
//! ```

use crate::core::channel::Channel;
use crate::core::registry::EventRegistry;
use crate::error::DispatchError;
use crate::events::Event;

/// Entry point for building a raise request.
pub struct Raise;

impl Raise {
    /// Starts a request for `event`, targeting the global channel for its
    /// type until [`RaiseBuilder::via`] says otherwise.
    pub fn event<E: Event>(event: E) -> RaiseBuilder<'static, E> {
        RaiseBuilder {
            event,
            target: Target::GlobalChannel,
            polymorphic: true,
            guard: None,
        }
    }
}

enum Target<'r> {
    /// The process-wide per-type channel (exact-type dispatch).
    GlobalChannel,
    /// A specific registry instance (polymorphic dispatch available).
    Registry(&'r EventRegistry),
}

/// Fluent, single-use raise request. See the module docs for semantics.
pub struct RaiseBuilder<'r, E: Event> {
    event: E,
    target: Target<'r>,
    polymorphic: bool,
    guard: Option<Box<dyn Fn(&E) -> bool + Send + Sync>>,
}

impl<'r, E: Event> RaiseBuilder<'r, E> {
    /// Targets a specific registry instance (replaces any earlier target).
    pub fn via<'r2>(self, registry: &'r2 EventRegistry) -> RaiseBuilder<'r2, E> {
        RaiseBuilder {
            event: self.event,
            target: Target::Registry(registry),
            polymorphic: self.polymorphic,
            guard: self.guard,
        }
    }

    /// Targets the global per-type channel (replaces any earlier target).
    pub fn global_channel(self) -> RaiseBuilder<'static, E> {
        RaiseBuilder {
            event: self.event,
            target: Target::GlobalChannel,
            polymorphic: self.polymorphic,
            guard: self.guard,
        }
    }

    /// Switches polymorphic routing on or off (default on).
    ///
    /// Only meaningful for registry targets; a global-channel raise always
    /// dispatches to the exact-type channel alone.
    #[must_use]
    pub fn polymorphic(mut self, polymorphic: bool) -> Self {
        self.polymorphic = polymorphic;
        self
    }

    /// Attaches a guard predicate, evaluated when the terminal call runs.
    #[must_use]
    pub fn when<F>(mut self, pred: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Box::new(pred));
        self
    }

    fn should_raise(&self) -> bool {
        self.guard.as_ref().map_or(true, |g| g(&self.event))
    }

    /// Issues the raise synchronously.
    pub fn sync(self) -> Result<(), DispatchError> {
        if !self.should_raise() {
            return Ok(());
        }
        match self.target {
            Target::GlobalChannel => Channel::<E>::raise_sync(self.event),
            Target::Registry(registry) => registry.raise_sync_with(self.event, self.polymorphic),
        }
    }

    /// Issues the raise sequential-asynchronously.
    pub async fn sequential(self) -> Result<(), DispatchError> {
        if !self.should_raise() {
            return Ok(());
        }
        match self.target {
            Target::GlobalChannel => Channel::<E>::raise_sequential(self.event).await,
            Target::Registry(registry) => {
                registry.raise_sequential_with(self.event, self.polymorphic).await
            }
        }
    }

    /// Issues the raise concurrent-asynchronously.
    pub async fn concurrent(self) -> Result<(), DispatchError> {
        if !self.should_raise() {
            return Ok(());
        }
        match self.target {
            Target::GlobalChannel => Channel::<E>::raise_concurrent(self.event).await,
            Target::Registry(registry) => {
                registry.raise_concurrent_with(self.event, self.polymorphic).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerFn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Guarded(bool);
    impl Event for Guarded {}

    #[test]
    fn false_guard_is_a_complete_no_op() {
        let registry = EventRegistry::new();
        Raise::event(Guarded(false)).via(&registry).when(|e| e.0).sync().unwrap();
        // No container was touched: not even a lazily-created channel.
        assert!(registry.is_empty());
    }

    #[test]
    fn guard_runs_at_raise_time_against_the_payload() {
        let registry = EventRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in_handler = Arc::clone(&hits);
        registry
            .bindings::<Guarded>()
            .register(HandlerFn::sync(move |_: &Guarded| {
                hits_in_handler.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();

        Raise::event(Guarded(true)).via(&registry).when(|e| e.0).sync().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn last_set_target_wins() {
        let registry = EventRegistry::new();
        // Set the registry target, then override it back to the global
        // channel; the registry instance must stay untouched.
        Raise::event(Guarded(true)).via(&registry).global_channel().sync().unwrap();
        assert!(registry.is_empty());
    }
}
