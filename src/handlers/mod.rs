//! # Handlers: the caller-facing registration inputs.
//!
//! A handler is accepted in one of four interchangeable shapes — sync or
//! async, with or without the event payload — unified behind the
//! [`HandlerFn`] tagged union. The container dispatches by matching on the
//! tag; there is no signature overloading anywhere in the engine.
//!
//! For object-shaped subscribers, the [`EventHandler`] trait is the
//! extension point: implement it on your type and register the `Arc` with
//! [`HandlerFn::from_handler`]. Registering the same receiver twice
//! deduplicates to one binding.
//!
//! ## Implementing a custom handler
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use evoke::{Event, EventHandler, HandlerError};
//!
//! struct Tick(u64);
//! impl Event for Tick {}
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl EventHandler<Tick> for Metrics {
//!     async fn on_event(&self, event: Arc<Tick>) -> Result<(), HandlerError> {
//!         let _ = event.0; // increment a counter...
//!         Ok(())
//!     }
//! }
//! ```

mod handler;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use handler::{HandlerFn, HandlerKind};
pub use subscribe::EventHandler;

#[cfg(feature = "logging")]
pub use log::LogHandler;

pub(crate) use handler::HandlerId;
