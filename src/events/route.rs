//! # Capability routes for polymorphic dispatch.
//!
//! A [`Route`] maps a concrete event type to one capability interface it
//! implements. The capability type is erased behind an internal target
//! trait; what remains is "given the payload and a registry, raise on the
//! capability's channel with the chosen protocol".
//!
//! Routes carry a plain coercion function (`fn(Arc<E>) -> Arc<C>`), captured
//! at declaration time where the concrete type parameter is still known.
//! This keeps runtime type introspection entirely out of the core engine:
//! resolving a capability channel is a `TypeId` map lookup, nothing more.
//!
//! A route whose capability channel was never registered resolves to `None`
//! and the raise skips it — an unresolved target is a documented no-op, not
//! an error.

use std::any::TypeId;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::EventRegistry;
use crate::error::DispatchError;
use crate::events::Event;

/// One declared capability of a concrete event type.
///
/// Built with [`Route::capability`]; consumed by the registry during a
/// polymorphic raise.
pub struct Route<E: Event> {
    target: Box<dyn RouteTarget<E>>,
}

impl<E: Event> Route<E> {
    /// Declares that `E` widens into the capability interface `C`.
    ///
    /// `coerce` is the unsizing step, typically just `|e| e`:
    ///
    /// ```rust,ignore
    /// Route::capability::<dyn OrderEvent>(|e| e)
    /// ```
    pub fn capability<C>(coerce: fn(Arc<E>) -> Arc<C>) -> Self
    where
        C: Event + ?Sized,
    {
        Self { target: Box::new(CapabilityRoute { coerce }) }
    }

    /// Type key of the capability channel this route resolves to.
    pub fn key(&self) -> TypeId {
        self.target.key()
    }

    /// Human-readable name of the capability type.
    pub fn name(&self) -> &'static str {
        self.target.name()
    }

    pub(crate) fn raise_sync(
        &self,
        registry: &EventRegistry,
        event: Arc<E>,
    ) -> Option<Result<(), DispatchError>> {
        self.target.raise_sync(registry, event)
    }

    pub(crate) async fn raise_sequential(
        &self,
        registry: &EventRegistry,
        event: Arc<E>,
    ) -> Option<Result<(), DispatchError>> {
        self.target.raise_sequential(registry, event).await
    }

    pub(crate) async fn raise_concurrent(
        &self,
        registry: &EventRegistry,
        event: Arc<E>,
    ) -> Option<Result<(), DispatchError>> {
        self.target.raise_concurrent(registry, event).await
    }
}

/// Dispatch seam between a concrete event type and one erased capability.
///
/// Every method returns `None` when the capability channel does not exist in
/// the target registry (unresolved target, no-op).
#[async_trait]
trait RouteTarget<E: Event>: Send + Sync {
    fn key(&self) -> TypeId;

    fn name(&self) -> &'static str;

    fn raise_sync(
        &self,
        registry: &EventRegistry,
        event: Arc<E>,
    ) -> Option<Result<(), DispatchError>>;

    async fn raise_sequential(
        &self,
        registry: &EventRegistry,
        event: Arc<E>,
    ) -> Option<Result<(), DispatchError>>;

    async fn raise_concurrent(
        &self,
        registry: &EventRegistry,
        event: Arc<E>,
    ) -> Option<Result<(), DispatchError>>;
}

/// Route into the channel of capability `C`, with the coercion captured
/// while `E` was still a known concrete type.
struct CapabilityRoute<E: Event, C: Event + ?Sized> {
    coerce: fn(Arc<E>) -> Arc<C>,
}

#[async_trait]
impl<E: Event, C: Event + ?Sized> RouteTarget<E> for CapabilityRoute<E, C> {
    fn key(&self) -> TypeId {
        TypeId::of::<C>()
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    fn raise_sync(
        &self,
        registry: &EventRegistry,
        event: Arc<E>,
    ) -> Option<Result<(), DispatchError>> {
        let set = registry.get::<C>()?;
        Some(set.raise_sync_arc((self.coerce)(event)))
    }

    async fn raise_sequential(
        &self,
        registry: &EventRegistry,
        event: Arc<E>,
    ) -> Option<Result<(), DispatchError>> {
        let set = registry.get::<C>()?;
        Some(set.raise_sequential_arc((self.coerce)(event)).await)
    }

    async fn raise_concurrent(
        &self,
        registry: &EventRegistry,
        event: Arc<E>,
    ) -> Option<Result<(), DispatchError>> {
        let set = registry.get::<C>()?;
        Some(set.raise_concurrent_arc((self.coerce)(event)).await)
    }
}
