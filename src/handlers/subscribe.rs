//! # Object-shaped handler trait.
//!
//! [`EventHandler`] is the extension point for subscribers that carry state
//! or implement several concerns behind one receiver. It plugs into a
//! container through [`HandlerFn::from_handler`](crate::HandlerFn::from_handler),
//! which derives handler identity from the receiver `Arc` — so the same
//! object registered twice results in exactly one binding.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Event;

/// Contract for object-shaped event handlers.
///
/// Invoked from whichever raise protocol the caller chose; a sync raise
/// drives the body to completion on the calling thread. Implementations
/// should avoid blocking the async runtime (prefer async I/O and
/// cooperative waits).
#[async_trait]
pub trait EventHandler<E: Event + ?Sized>: Send + Sync + 'static {
    /// Handle a single event.
    ///
    /// The payload is shared; handlers never take ownership of it.
    async fn on_event(&self, event: Arc<E>) -> Result<(), HandlerError>;

    /// Human-readable name (for errors/introspection).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
