//! # Event types and polymorphic routing.
//!
//! This module provides the [`Event`] marker trait that every payload type
//! implements, and the [`Route`] declarations a concrete event type uses to
//! opt into polymorphic dispatch across its capability interfaces.
//!
//! ## Architecture
//! ```text
//! Payload flow:
//!   raise(OrderPlaced) ──► registry
//!                            ├──► BindingSet<OrderPlaced>      (exact type)
//!                            └──► OrderPlaced::routes()
//!                                   └──► BindingSet<dyn OrderEvent>  (capability)
//! ```
//!
//! A capability interface is an ordinary trait whose trait object is itself
//! an event type (`impl Event for dyn OrderEvent {}`). The concrete type
//! declares how its payload widens into each capability with a plain
//! coercion function; the core engine never inspects runtime types.

mod event;
mod route;

pub use event::Event;
pub use route::Route;
