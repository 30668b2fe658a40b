//! # evoke
//!
//! **Evoke** is a typed in-process publish/subscribe dispatch library for Rust.
//!
//! Producers raise a strongly-typed event value; independently registered
//! handlers — sync or async, with or without the payload — run in priority
//! order. It is the mechanism by which decoupled components communicate
//! without direct references.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   producer   │   │   producer   │   │   producer   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Raise (builder)  /  Channel<E>  /  EventRegistry                 │
//! │  - resolves the target channel(s), optionally polymorphically     │
//! └──────┬──────────────────────┬──────────────────────┬──────────────┘
//!        ▼                      ▼                      ▼
//! ┌──────────────┐      ┌──────────────┐       ┌──────────────┐
//! │ BindingSet<A>│      │ BindingSet<B>│       │BindingSet<dyn│
//! │ (exact type) │      │ (exact type) │       │  Capability> │
//! └──────┬───────┘      └──────────────┘       └──────────────┘
//!        │ snapshot, priority-descending, stable ties
//!        ├──► binding #1 (priority 10)
//!        ├──► binding #2 (priority 5)
//!        └──► binding #3 (priority 0)
//! ```
//!
//! ### A raise, step by step
//! ```text
//! raise_*(event)
//!   ├─► cache event as last-raised value (replay-on-registration)
//!   ├─► re-sort lazily if a registration changed the ordering
//!   ├─► take an immutable snapshot of the bindings
//!   ├─► invoke per protocol:
//!   │     sync        — in order, on the calling thread, fail-fast
//!   │     sequential  — in order, awaiting each, fail-fast
//!   │     concurrent  — all started, all finish, failures aggregated
//!   └─► apply removals deferred while the pass was active
//! ```
//! Registrations and deregistrations issued by a handler during its own
//! invocation never perturb the current pass; they are visible starting
//! with the next raise.
//!
//! ## Features
//! | Area            | Description                                              | Key types / traits                 |
//! |-----------------|----------------------------------------------------------|------------------------------------|
//! | **Events**      | Typed payloads; capability interfaces for routing.       | [`Event`], [`Route`]               |
//! | **Handlers**    | Four shapes behind one tagged union; object handlers.    | [`HandlerFn`], [`EventHandler`]    |
//! | **Containers**  | Per-type bindings with snapshot-safe mutation.           | [`BindingSet`], [`Binding`]        |
//! | **Registry**    | Many types per instance; polymorphic raise.              | [`EventRegistry`]                  |
//! | **Global scope**| One process-wide channel per type.                       | [`Channel`], [`global`]            |
//! | **Raising**     | Fluent request with guard and protocol selection.        | [`Raise`], [`RaiseBuilder`]        |
//! | **Errors**      | Typed failures that always reach the raise caller.       | [`DispatchError`], [`HandlerError`]|
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogHandler`] _(demo/reference only)_.
//!
//! ## Concurrency model
//! "Concurrent" dispatch means multiple handler futures in flight
//! *cooperatively within one raise call*, not parallel OS threads. A
//! container assumes one logical caller drives each raise; bookkeeping is
//! internally locked but pass semantics are not serialized across genuinely
//! parallel raisers. The engine provides no cancellation or timeouts: a
//! handler that never completes blocks its pass.
//!
//! ## Example
//! ```rust
//! use evoke::{Channel, Event, HandlerFn, RegisterOpts};
//!
//! #[derive(Debug)]
//! struct UserRegistered {
//!     name: &'static str,
//! }
//! impl Event for UserRegistered {}
//!
//! // A sync handler at default priority...
//! let greeter = Channel::<UserRegistered>::register(HandlerFn::sync(|e: &UserRegistered| {
//!     println!("hello, {}", e.name);
//!     Ok(())
//! }))
//! .unwrap();
//!
//! // ...and an async one that should run first.
//! Channel::<UserRegistered>::register_with(
//!     HandlerFn::async_fn(|e: std::sync::Arc<UserRegistered>| async move {
//!         let _ = e.name; // write an audit record...
//!         Ok(())
//!     }),
//!     RegisterOpts::priority(10),
//! )
//! .unwrap();
//!
//! Channel::<UserRegistered>::raise_sync(UserRegistered { name: "ada" }).unwrap();
//! Channel::<UserRegistered>::deregister(&greeter);
//! ```

mod core;
mod error;
mod events;
mod handlers;

// ---- Public re-exports ----

pub use core::{
    global, Binding, BindingId, BindingSet, Channel, ChannelStats, EventRegistry, Raise,
    RaiseBuilder, RegisterOpts,
};
pub use error::{DispatchError, HandlerError};
pub use events::{Event, Route};
pub use handlers::{EventHandler, HandlerFn, HandlerKind};

// Optional: expose a simple built-in logging handler (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use handlers::LogHandler;
