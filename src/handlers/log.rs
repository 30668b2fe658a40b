//! # Simple logging handler for debugging and demos.
//!
//! [`LogHandler`] prints every event it receives to stdout in a
//! human-readable format.
//!
//! ## Output format
//! ```text
//! [event] type=demo::OrderPlaced payload=OrderPlaced { id: 7 }
//! ```
//!
//! Enabled via the `logging` feature. Not intended for production use —
//! implement a custom [`EventHandler`] for structured logging or metrics
//! collection.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Event;
use crate::handlers::EventHandler;

/// Simple stdout logging handler.
pub struct LogHandler;

#[async_trait]
impl<E> EventHandler<E> for LogHandler
where
    E: Event + Debug + ?Sized,
{
    async fn on_event(&self, event: Arc<E>) -> Result<(), HandlerError> {
        println!("[event] type={} payload={:?}", std::any::type_name::<E>(), event);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
