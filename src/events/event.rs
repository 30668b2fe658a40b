//! # The `Event` marker trait.
//!
//! Any `'static + Send + Sync` value can be an event payload. Payloads are
//! immutable once raised: the engine shares them between handlers as
//! `Arc<E>`, so no `Clone` bound is required.
//!
//! ## Capability interfaces
//! An event type may additionally satisfy any number of capability
//! interfaces, used purely for routing. A capability is a regular trait
//! whose trait object is registered as an event type in its own right:
//!
//! ```rust
//! use evoke::{Event, Route};
//!
//! trait OrderEvent: Send + Sync {
//!     fn order_id(&self) -> u64;
//! }
//! impl Event for dyn OrderEvent {}
//!
//! struct OrderPlaced {
//!     id: u64,
//! }
//! impl OrderEvent for OrderPlaced {
//!     fn order_id(&self) -> u64 {
//!         self.id
//!     }
//! }
//! impl Event for OrderPlaced {
//!     fn routes() -> Vec<Route<Self>> {
//!         vec![Route::capability::<dyn OrderEvent>(|e| e)]
//!     }
//! }
//! ```
//!
//! A polymorphic raise of `OrderPlaced` then reaches handlers registered for
//! `OrderPlaced` *and* handlers registered for `dyn OrderEvent`.

use std::any::Any;

use crate::events::Route;

/// Marker capability for event payloads.
///
/// Implemented for concrete payload types and for the trait objects of
/// capability interfaces. The default [`Event::routes`] declares no
/// capabilities; override it on concrete types that participate in
/// polymorphic dispatch.
pub trait Event: Any + Send + Sync {
    /// The capability routes of this concrete event type, in dispatch order.
    ///
    /// Returning an empty vector (the default) means a polymorphic raise
    /// only reaches the exact-type channel.
    fn routes() -> Vec<Route<Self>>
    where
        Self: Sized,
    {
        Vec::new()
    }
}
