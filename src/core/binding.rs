//! # Binding: one registered handler plus its priority.
//!
//! A [`Binding`] is the immutable record a container creates at
//! registration time and hands back to the caller as the deregistration
//! handle. It wraps exactly one [`HandlerFn`] and a priority; the id is an
//! opaque, globally unique sequence number.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::events::Event;
use crate::handlers::HandlerFn;

/// Global sequence counter for binding ids.
static BINDING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Opaque identity of one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

impl BindingId {
    fn next() -> Self {
        BindingId(BINDING_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// One registered handler with its priority and identity.
///
/// Owned by the container that created it; the clone returned to the caller
/// is an opaque handle for later deregistration. Higher priority runs
/// earlier; ties run in registration order.
#[derive(Debug)]
pub struct Binding<E: Event + ?Sized> {
    handler: HandlerFn<E>,
    priority: i32,
    id: BindingId,
}

impl<E: Event + ?Sized> Binding<E> {
    /// Creates a new binding record around `handler`.
    ///
    /// Normally called through a container's `register*` operations; build
    /// one directly only to pre-construct bindings for
    /// [`BindingSet::register_binding`](crate::BindingSet::register_binding).
    pub fn new(handler: HandlerFn<E>, priority: i32) -> Self {
        Self { handler, priority, id: BindingId::next() }
    }

    /// The wrapped handler.
    pub fn handler(&self) -> &HandlerFn<E> {
        &self.handler
    }

    /// Dispatch priority (descending; default registrations use 0).
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Opaque identity of this binding.
    pub fn id(&self) -> BindingId {
        self.id
    }
}

impl<E: Event + ?Sized> Clone for Binding<E> {
    fn clone(&self) -> Self {
        Self { handler: self.handler.clone(), priority: self.priority, id: self.id }
    }
}
