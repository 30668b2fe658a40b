//! # Channel: the process-wide per-type dispatch point.
//!
//! [`Channel<E>`] exposes the whole [`BindingSet`] surface at a static
//! scope, backed by the process-wide registry returned by [`global()`].
//! The first access for a type lazily creates its channel and registers it
//! with the global registry exactly once; the façade itself carries no
//! state beyond that delegation.
//!
//! ## Example
//! ```rust
//! use evoke::{Channel, Event, HandlerFn};
//!
//! struct CacheInvalidated {
//!     key: String,
//! }
//! impl Event for CacheInvalidated {}
//!
//! let binding = Channel::<CacheInvalidated>::register(HandlerFn::sync(|e: &CacheInvalidated| {
//!     let _ = &e.key; // drop the entry...
//!     Ok(())
//! }))
//! .unwrap();
//!
//! Channel::<CacheInvalidated>::raise_sync(CacheInvalidated { key: "user:7".into() }).unwrap();
//! Channel::<CacheInvalidated>::deregister(&binding);
//! ```

use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use crate::core::binding::Binding;
use crate::core::registry::EventRegistry;
use crate::core::set::{BindingSet, ChannelStats, RegisterOpts};
use crate::error::DispatchError;
use crate::events::Event;
use crate::handlers::HandlerFn;

static GLOBAL: OnceLock<EventRegistry> = OnceLock::new();

/// The process-wide [`EventRegistry`] backing [`Channel`].
///
/// Constructed lazily on first access. A host-environment mode transition
/// that needs a clean slate calls `global().clear_all()` explicitly; there
/// is no implicit reset.
pub fn global() -> &'static EventRegistry {
    GLOBAL.get_or_init(EventRegistry::new)
}

/// Static per-type façade over the global registry's channel for `E`.
///
/// Every associated function delegates to `global().bindings::<E>()`; see
/// [`BindingSet`] for the exact contracts.
pub struct Channel<E: Event + ?Sized> {
    _marker: PhantomData<E>,
}

impl<E: Event + ?Sized> Channel<E> {
    /// The underlying container, for callers that want to hold it directly.
    pub fn bindings() -> Arc<BindingSet<E>> {
        global().bindings::<E>()
    }

    /// See [`BindingSet::register`].
    pub fn register(handler: HandlerFn<E>) -> Result<Binding<E>, DispatchError> {
        Self::bindings().register(handler)
    }

    /// See [`BindingSet::register_with`].
    pub fn register_with(
        handler: HandlerFn<E>,
        opts: RegisterOpts,
    ) -> Result<Binding<E>, DispatchError> {
        Self::bindings().register_with(handler, opts)
    }

    /// See [`BindingSet::register_binding`].
    pub fn register_binding(binding: Binding<E>) -> Result<Binding<E>, DispatchError> {
        Self::bindings().register_binding(binding)
    }

    /// See [`BindingSet::deregister`].
    pub fn deregister(binding: &Binding<E>) {
        Self::bindings().deregister(binding);
    }

    /// See [`BindingSet::deregister_handler`].
    pub fn deregister_handler(handler: &HandlerFn<E>) {
        Self::bindings().deregister_handler(handler);
    }

    /// See [`BindingSet::clear_all`].
    pub fn clear_all() {
        Self::bindings().clear_all();
    }

    /// See [`BindingSet::len`].
    pub fn len() -> usize {
        Self::bindings().len()
    }

    /// See [`BindingSet::is_empty`].
    pub fn is_empty() -> bool {
        Self::bindings().is_empty()
    }

    /// See [`BindingSet::stats`].
    pub fn stats() -> ChannelStats {
        Self::bindings().stats()
    }

    /// See [`BindingSet::raise_sync`]. Exact-type dispatch only; use an
    /// [`EventRegistry`] raise for polymorphic routing.
    pub fn raise_sync(event: E) -> Result<(), DispatchError>
    where
        E: Sized,
    {
        Self::bindings().raise_sync(event)
    }

    /// See [`BindingSet::raise_sequential`].
    pub async fn raise_sequential(event: E) -> Result<(), DispatchError>
    where
        E: Sized,
    {
        Self::bindings().raise_sequential(event).await
    }

    /// See [`BindingSet::raise_concurrent`].
    pub async fn raise_concurrent(event: E) -> Result<(), DispatchError>
    where
        E: Sized,
    {
        Self::bindings().raise_concurrent(event).await
    }
}
