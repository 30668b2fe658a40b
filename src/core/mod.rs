//! # Core dispatch engine.
//!
//! The pieces, leaves first:
//! - [`Binding`] — one handler plus priority and identity.
//! - [`BindingSet`] — the per-type container: registration, dedup,
//!   priority order, replay cache, and the three raise protocols with
//!   snapshot-based mutation safety.
//! - [`EventRegistry`] — many typed channels in one instance, plus
//!   polymorphic raise across capability interfaces.
//! - [`Channel`] / [`global`] — the process-wide per-type dispatch point.
//! - [`Raise`] / [`RaiseBuilder`] — the fluent raise request.

mod binding;
mod builder;
mod channel;
mod registry;
mod set;

pub use binding::{Binding, BindingId};
pub use builder::{Raise, RaiseBuilder};
pub use channel::{global, Channel};
pub use registry::EventRegistry;
pub use set::{BindingSet, ChannelStats, RegisterOpts};
