//! # BindingSet: the per-event-type binding container.
//!
//! [`BindingSet`] owns the ordered bindings for one event type and
//! implements registration, deduplication, priority ordering, the
//! last-raised replay cache, and the three raise protocols.
//!
//! ## What it guarantees
//! - Dispatch order is priority-descending, stable on ties (registration
//!   order).
//! - Every raise iterates an immutable **snapshot** taken at raise start:
//!   registrations made by a handler during the pass never execute in that
//!   pass, and deregistrations made during the pass are deferred until the
//!   pass completes.
//! - [`BindingSet::len`] during an active pass reflects only completed
//!   removals; deferred ones still count until the pass ends.
//! - Handler failures are never swallowed; they reach the raise caller.
//!
//! ## What it does **not** guarantee
//! - Safety against raises issued from genuinely parallel callers: the set
//!   assumes a single logical caller per raise (or external
//!   synchronization). The internal lock protects bookkeeping, not pass
//!   semantics.
//! - Cancellation or timeouts: a handler that never completes blocks its
//!   pass indefinitely — in the sync protocol too, since a sync raise
//!   drives async bodies to completion on the calling thread.
//!
//! ## Diagram
//! ```text
//!    raise_*(event)
//!        │ lock: cache value, sort if dirty, snapshot, depth += 1
//!        ├──► snapshot[0].handler   (priority 10)
//!        ├──► snapshot[1].handler   (priority 5)
//!        └──► snapshot[n].handler   (priority ...)
//!        │ lock: depth -= 1, apply pending removals
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use futures::future::join_all;

use crate::core::binding::{Binding, BindingId};
use crate::error::DispatchError;
use crate::events::Event;
use crate::handlers::{HandlerFn, HandlerId};

/// Options for [`BindingSet::register_with`].
#[derive(Debug, Clone, Copy)]
pub struct RegisterOpts {
    /// Dispatch priority; higher runs earlier. Default 0.
    pub priority: i32,
    /// Immediately invoke the new binding with the last raised value, if one
    /// is cached. The replay runs outside of, and is not counted as, a
    /// dispatch pass. Default false.
    pub replay: bool,
}

impl Default for RegisterOpts {
    fn default() -> Self {
        Self { priority: 0, replay: false }
    }
}

impl RegisterOpts {
    /// Options with the given priority and no replay.
    pub fn priority(priority: i32) -> Self {
        Self { priority, replay: false }
    }

    /// Enables replay of the last raised value.
    #[must_use]
    pub fn with_replay(mut self) -> Self {
        self.replay = true;
        self
    }
}

/// Read-only view of one channel, for monitoring surfaces.
#[derive(Debug, Clone)]
pub struct ChannelStats {
    /// Fully qualified event type name.
    pub event_type: &'static str,
    /// Number of live bindings (deferred removals still count during an
    /// active pass).
    pub bindings: usize,
    /// Display names of the registered handlers, in dispatch order.
    pub handlers: Vec<Arc<str>>,
    /// Wall-clock time of the most recent raise, if any.
    pub last_raised_at: Option<SystemTime>,
}

struct State<E: Event + ?Sized> {
    /// Ordered bindings, priority descending, ties in registration order.
    bindings: Vec<Binding<E>>,
    /// Handler identity → binding, for O(1) dedup and deregistration.
    index: HashMap<HandlerId, Binding<E>>,
    /// Removals requested while a pass was active.
    pending_removal: Vec<BindingId>,
    /// Most recent event value, for replay-on-registration.
    last_raised: Option<Arc<E>>,
    last_raised_at: Option<SystemTime>,
    /// A registration invalidated the ordering; re-sort on next raise.
    dirty_sort: bool,
    /// Number of active passes; removals are deferred while > 0. A depth
    /// (rather than a flag) keeps deferral correct for reentrant raises
    /// issued from inside a handler.
    dispatch_depth: u32,
}

impl<E: Event + ?Sized> State<E> {
    fn remove_now(&mut self, id: BindingId) {
        let Some(pos) = self.bindings.iter().position(|b| b.id() == id) else {
            return;
        };
        let binding = self.bindings.remove(pos);
        let key = binding.handler().id();
        // The index entry may have been repointed by register_binding.
        if self.index.get(&key).is_some_and(|current| current.id() == id) {
            self.index.remove(&key);
        }
    }
}

/// Binding container for one event type.
///
/// Created once per event type (usually lazily, through an
/// [`EventRegistry`](crate::EventRegistry) or the global
/// [`Channel`](crate::Channel)) and lives as long as its owner.
pub struct BindingSet<E: Event + ?Sized> {
    state: Mutex<State<E>>,
}

impl<E: Event + ?Sized> Default for BindingSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event + ?Sized> BindingSet<E> {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                bindings: Vec::new(),
                index: HashMap::new(),
                pending_removal: Vec::new(),
                last_raised: None,
                last_raised_at: None,
                dirty_sort: false,
                dispatch_depth: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `handler` with default options (priority 0, no replay).
    ///
    /// If the same handler identity is already registered, the existing
    /// binding is returned unchanged and nothing is added.
    pub fn register(&self, handler: HandlerFn<E>) -> Result<Binding<E>, DispatchError> {
        self.register_with(handler, RegisterOpts::default())
    }

    /// Registers `handler` with explicit options.
    ///
    /// Deduplicates by handler identity: a second registration of the same
    /// callable (and, for object handlers, the same receiver) returns the
    /// existing binding — its priority is **never** updated by a later
    /// call. Otherwise the new binding is appended and ordering is marked
    /// for a lazy re-sort.
    ///
    /// With `replay = true` and a cached last-raised value, the new binding
    /// is invoked immediately (blocking form) with that value, outside any
    /// dispatch pass; a replay failure is reported from this call as
    /// [`DispatchError::HandlerFailed`].
    pub fn register_with(
        &self,
        handler: HandlerFn<E>,
        opts: RegisterOpts,
    ) -> Result<Binding<E>, DispatchError> {
        let (binding, replay) = {
            let mut st = self.lock();
            if let Some(existing) = st.index.get(&handler.id()) {
                return Ok(existing.clone());
            }
            let binding = Binding::new(handler, opts.priority);
            st.index.insert(binding.handler().id(), binding.clone());
            st.bindings.push(binding.clone());
            st.dirty_sort = true;
            let replay = if opts.replay { st.last_raised.clone() } else { None };
            (binding, replay)
        };
        if let Some(event) = replay {
            binding
                .handler()
                .call_blocking(&event)
                .map_err(|err| DispatchError::handler_failed(binding.handler().name(), err))?;
        }
        Ok(binding)
    }

    /// Registers a pre-built binding directly, bypassing handler dedup.
    ///
    /// The binding is always appended. Re-registering a binding id that is
    /// still present fails with [`DispatchError::InvalidHandler`].
    pub fn register_binding(&self, binding: Binding<E>) -> Result<Binding<E>, DispatchError> {
        let mut st = self.lock();
        if st.bindings.iter().any(|b| b.id() == binding.id()) {
            return Err(DispatchError::invalid_handler("binding is already registered"));
        }
        st.index.insert(binding.handler().id(), binding.clone());
        st.bindings.push(binding.clone());
        st.dirty_sort = true;
        Ok(binding)
    }

    /// Deregisters by binding handle.
    ///
    /// While a pass is active the removal is deferred (idempotently) and
    /// applied once the pass completes; the binding still executes if it is
    /// part of the current snapshot. Otherwise removal is immediate.
    /// Unknown bindings are a no-op.
    pub fn deregister(&self, binding: &Binding<E>) {
        self.remove_by_id(binding.id());
    }

    /// Deregisters by handler identity.
    pub fn deregister_handler(&self, handler: &HandlerFn<E>) {
        let id = {
            let st = self.lock();
            st.index.get(&handler.id()).map(|b| b.id())
        };
        if let Some(id) = id {
            self.remove_by_id(id);
        }
    }

    fn remove_by_id(&self, id: BindingId) {
        let mut st = self.lock();
        if st.dispatch_depth > 0 {
            if !st.pending_removal.contains(&id) {
                st.pending_removal.push(id);
            }
            return;
        }
        st.remove_now(id);
    }

    /// Removes every binding and cached state immediately, even while a
    /// pass is active. An in-flight pass keeps running against its own
    /// snapshot, but [`BindingSet::len`] reports empty right away.
    pub fn clear_all(&self) {
        let mut st = self.lock();
        st.bindings.clear();
        st.index.clear();
        st.pending_removal.clear();
        st.last_raised = None;
        st.last_raised_at = None;
        st.dirty_sort = false;
    }

    /// Number of live bindings. During an active pass this includes
    /// bindings with a pending (deferred) removal.
    pub fn len(&self) -> usize {
        self.lock().bindings.len()
    }

    /// True if the container holds no bindings.
    pub fn is_empty(&self) -> bool {
        self.lock().bindings.is_empty()
    }

    /// The most recent raised value, if any.
    pub fn last_raised(&self) -> Option<Arc<E>> {
        self.lock().last_raised.clone()
    }

    /// Read-only snapshot for monitoring surfaces.
    pub fn stats(&self) -> ChannelStats {
        let st = self.lock();
        ChannelStats {
            event_type: std::any::type_name::<E>(),
            bindings: st.bindings.len(),
            handlers: st.bindings.iter().map(|b| Arc::clone(b.handler().name())).collect(),
            last_raised_at: st.last_raised_at,
        }
    }

    /// Raises `event` synchronously.
    ///
    /// Bindings run in snapshot order on the calling thread; async bodies
    /// are driven to completion before the next binding starts, so a sync
    /// raise never leaves an in-flight handler. The first failure aborts
    /// the remaining bindings of the pass and propagates after pending
    /// removals are applied.
    pub fn raise_sync(&self, event: E) -> Result<(), DispatchError>
    where
        E: Sized,
    {
        self.raise_sync_arc(Arc::new(event))
    }

    /// [`BindingSet::raise_sync`] for an already-shared payload (required
    /// for unsized capability payloads).
    pub fn raise_sync_arc(&self, event: Arc<E>) -> Result<(), DispatchError> {
        let snapshot = self.begin_pass(&event);
        let _guard = PassGuard { set: self };
        for binding in &snapshot {
            if let Err(err) = binding.handler().call_blocking(&event) {
                return Err(DispatchError::handler_failed(binding.handler().name(), err));
            }
        }
        Ok(())
    }

    /// Raises `event` asynchronously, awaiting each binding in turn.
    ///
    /// Same ordering and snapshot contract as the sync protocol; the first
    /// failing handler aborts the remaining handlers in the pass.
    pub async fn raise_sequential(&self, event: E) -> Result<(), DispatchError>
    where
        E: Sized,
    {
        self.raise_sequential_arc(Arc::new(event)).await
    }

    /// [`BindingSet::raise_sequential`] for an already-shared payload.
    pub async fn raise_sequential_arc(&self, event: Arc<E>) -> Result<(), DispatchError> {
        let snapshot = self.begin_pass(&event);
        let _guard = PassGuard { set: self };
        for binding in &snapshot {
            if let Err(err) = binding.handler().call(Arc::clone(&event)).await {
                return Err(DispatchError::handler_failed(binding.handler().name(), err));
            }
        }
        Ok(())
    }

    /// Raises `event` asynchronously, starting every binding without
    /// waiting between them.
    ///
    /// All bindings of the snapshot are started cooperatively within this
    /// call; the pass then waits for all of them. Failures do not interrupt
    /// already-started handlers — they run to completion, and the pass then
    /// surfaces [`DispatchError::HandlerFailed`] (one failure) or
    /// [`DispatchError::PassFailed`] (several).
    pub async fn raise_concurrent(&self, event: E) -> Result<(), DispatchError>
    where
        E: Sized,
    {
        self.raise_concurrent_arc(Arc::new(event)).await
    }

    /// [`BindingSet::raise_concurrent`] for an already-shared payload.
    pub async fn raise_concurrent_arc(&self, event: Arc<E>) -> Result<(), DispatchError> {
        let snapshot = self.begin_pass(&event);
        let _guard = PassGuard { set: self };
        let started = snapshot.len();
        let invocations: Vec<_> = snapshot
            .iter()
            .map(|binding| binding.handler().call(Arc::clone(&event)))
            .collect();
        let results = join_all(invocations).await;

        let mut failures = snapshot.iter().zip(results).filter_map(|(binding, result)| {
            result.err().map(|err| (Arc::clone(binding.handler().name()), err))
        });
        let Some((handler, source)) = failures.next() else {
            return Ok(());
        };
        let rest = failures.count();
        if rest == 0 {
            return Err(DispatchError::HandlerFailed { handler, source });
        }
        Err(DispatchError::PassFailed { failed: rest + 1, started, handler, source })
    }

    /// Caches the value, lazily re-sorts, takes the snapshot and enters the
    /// pass. Never suspends; the lock is released before any handler runs.
    fn begin_pass(&self, event: &Arc<E>) -> Vec<Binding<E>> {
        let mut st = self.lock();
        st.last_raised = Some(Arc::clone(event));
        st.last_raised_at = Some(SystemTime::now());
        if st.dirty_sort {
            // Stable: equal priorities keep registration order.
            st.bindings.sort_by(|a, b| b.priority().cmp(&a.priority()));
            st.dirty_sort = false;
        }
        st.dispatch_depth += 1;
        st.bindings.clone()
    }

    fn end_pass(&self) {
        let mut st = self.lock();
        st.dispatch_depth = st.dispatch_depth.saturating_sub(1);
        if st.dispatch_depth == 0 && !st.pending_removal.is_empty() {
            let pending = std::mem::take(&mut st.pending_removal);
            for id in pending {
                st.remove_now(id);
            }
        }
    }
}

/// Unwinds a pass even when the raise future is dropped mid-await or a
/// handler failure returns early: pending removals always get applied.
struct PassGuard<'a, E: Event + ?Sized> {
    set: &'a BindingSet<E>,
}

impl<E: Event + ?Sized> Drop for PassGuard<'_, E> {
    fn drop(&mut self) {
        self.set.end_pass();
    }
}
