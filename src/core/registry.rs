//! # EventRegistry: many event types behind one instance.
//!
//! [`EventRegistry`] hosts one [`BindingSet`] per event type, created lazily
//! on first use, and adds **polymorphic raise** on top of plain delegation:
//! an event dispatches to its exact-type channel and to every registered
//! capability channel its concrete type declares via
//! [`Event::routes`](crate::Event::routes).
//!
//! ## Architecture
//! ```text
//! registry.raise_sync(OrderPlaced { .. })
//!     ├──► BindingSet<OrderPlaced>       exact type, created lazily
//!     └──► for route in OrderPlaced::routes()
//!             └──► BindingSet<dyn OrderEvent>   only if already registered
//! ```
//!
//! ## Rules
//! - A capability route with no registered channel is skipped silently: an
//!   unresolved target is a documented no-op, never an error.
//! - Within each channel, priority order holds. Across channels of one
//!   polymorphic raise the order is unspecified (exact type first is an
//!   implementation detail, not a contract).
//! - A failing channel pass aborts the remaining channels of a
//!   sync/sequential raise; nothing is rolled back — handlers that already
//!   ran stay run.
//! - Lifecycle reset is an explicit [`EventRegistry::clear_all`] sweep.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::core::set::{BindingSet, ChannelStats};
use crate::error::DispatchError;
use crate::events::Event;

/// Type-erased view over one channel, for registry-wide sweeps and
/// monitoring.
trait ErasedChannel: Send + Sync + 'static {
    fn clear_all(&self);
    fn len(&self) -> usize;
    fn stats(&self) -> ChannelStats;
}

impl<E: Event + ?Sized> ErasedChannel for BindingSet<E> {
    fn clear_all(&self) {
        BindingSet::clear_all(self);
    }

    fn len(&self) -> usize {
        BindingSet::len(self)
    }

    fn stats(&self) -> ChannelStats {
        BindingSet::stats(self)
    }
}

struct Entry {
    /// The typed `Arc<BindingSet<E>>`, recoverable by downcast.
    set: Arc<dyn Any + Send + Sync>,
    /// The same set behind the erased sweep/monitoring surface.
    erased: Arc<dyn ErasedChannel>,
    name: &'static str,
}

/// Container of per-type channels with polymorphic dispatch.
///
/// Independent instances are fully isolated from each other and from the
/// process-wide registry behind [`global()`](crate::global).
pub struct EventRegistry {
    entries: Mutex<HashMap<TypeId, Entry>>,
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TypeId, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The channel for `E`, created lazily on first use.
    pub fn bindings<E: Event + ?Sized>(&self) -> Arc<BindingSet<E>> {
        let mut entries = self.lock();
        let entry = entries.entry(TypeId::of::<E>()).or_insert_with(|| {
            let set: Arc<BindingSet<E>> = Arc::new(BindingSet::new());
            let erased: Arc<dyn ErasedChannel> = set.clone();
            let set: Arc<dyn Any + Send + Sync> = set;
            Entry { set, erased, name: std::any::type_name::<E>() }
        });
        match Arc::clone(&entry.set).downcast::<BindingSet<E>>() {
            Ok(set) => set,
            Err(_) => unreachable!("entry keyed by TypeId holds its own set type"),
        }
    }

    /// The channel for `E`, if one was ever created in this registry.
    pub fn get<E: Event + ?Sized>(&self) -> Option<Arc<BindingSet<E>>> {
        let entries = self.lock();
        let entry = entries.get(&TypeId::of::<E>())?;
        match Arc::clone(&entry.set).downcast::<BindingSet<E>>() {
            Ok(set) => Some(set),
            Err(_) => unreachable!("entry keyed by TypeId holds its own set type"),
        }
    }

    /// Raises synchronously with polymorphic routing (the default).
    pub fn raise_sync<E: Event>(&self, event: E) -> Result<(), DispatchError> {
        self.raise_sync_with(event, true)
    }

    /// Raises synchronously; `polymorphic = false` restricts dispatch to
    /// the exact declared type of `event`.
    pub fn raise_sync_with<E: Event>(
        &self,
        event: E,
        polymorphic: bool,
    ) -> Result<(), DispatchError> {
        let event = Arc::new(event);
        self.bindings::<E>().raise_sync_arc(Arc::clone(&event))?;
        if polymorphic {
            for route in E::routes() {
                if let Some(result) = route.raise_sync(self, Arc::clone(&event)) {
                    result?;
                }
            }
        }
        Ok(())
    }

    /// Raises sequential-asynchronously with polymorphic routing.
    pub async fn raise_sequential<E: Event>(&self, event: E) -> Result<(), DispatchError> {
        self.raise_sequential_with(event, true).await
    }

    /// Sequential-async raise with an explicit polymorphism switch.
    pub async fn raise_sequential_with<E: Event>(
        &self,
        event: E,
        polymorphic: bool,
    ) -> Result<(), DispatchError> {
        let event = Arc::new(event);
        self.bindings::<E>().raise_sequential_arc(Arc::clone(&event)).await?;
        if polymorphic {
            for route in E::routes() {
                if let Some(result) = route.raise_sequential(self, Arc::clone(&event)).await {
                    result?;
                }
            }
        }
        Ok(())
    }

    /// Raises concurrent-asynchronously with polymorphic routing.
    pub async fn raise_concurrent<E: Event>(&self, event: E) -> Result<(), DispatchError> {
        self.raise_concurrent_with(event, true).await
    }

    /// Concurrent-async raise with an explicit polymorphism switch.
    ///
    /// Every resolved channel runs its concurrent pass jointly with the
    /// others; started handlers always run to completion. After all passes
    /// settle, the first observed channel failure is surfaced.
    pub async fn raise_concurrent_with<E: Event>(
        &self,
        event: E,
        polymorphic: bool,
    ) -> Result<(), DispatchError> {
        let event = Arc::new(event);
        let exact = self.bindings::<E>();
        if !polymorphic {
            return exact.raise_concurrent_arc(event).await;
        }

        let routes = E::routes();
        let mut passes: Vec<BoxFuture<'_, Option<Result<(), DispatchError>>>> =
            Vec::with_capacity(routes.len() + 1);
        let exact_event = Arc::clone(&event);
        passes.push(async move { Some(exact.raise_concurrent_arc(exact_event).await) }.boxed());
        for route in &routes {
            let route_event = Arc::clone(&event);
            passes.push(async move { route.raise_concurrent(self, route_event).await }.boxed());
        }

        let mut first_failure = None;
        for result in join_all(passes).await.into_iter().flatten() {
            if let Err(err) = result {
                first_failure.get_or_insert(err);
            }
        }
        match first_failure {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Number of event types with a channel in this registry.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if no channel was ever created.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted type names of every registered channel.
    pub fn names(&self) -> Vec<&'static str> {
        let entries = self.lock();
        let mut names: Vec<&'static str> = entries.values().map(|e| e.name).collect();
        names.sort_unstable();
        names
    }

    /// Clears every channel in the registry (explicit lifecycle reset).
    ///
    /// Channels stay registered; only their bindings and cached state go.
    pub fn clear_all(&self) {
        let channels: Vec<Arc<dyn ErasedChannel>> =
            self.lock().values().map(|e| Arc::clone(&e.erased)).collect();
        for channel in channels {
            channel.clear_all();
        }
    }

    /// Read-only stats for every channel, sorted by type name.
    pub fn stats(&self) -> Vec<ChannelStats> {
        let channels: Vec<Arc<dyn ErasedChannel>> =
            self.lock().values().map(|e| Arc::clone(&e.erased)).collect();
        let mut stats: Vec<ChannelStats> = channels.iter().map(|c| c.stats()).collect();
        stats.sort_unstable_by_key(|s| s.event_type);
        stats
    }

    /// Stats for the channel whose type name matches `name`, if any.
    ///
    /// This is the name-keyed surface consumed by integration layers that
    /// resolve channels from serialized type names; the dispatch engine
    /// itself never goes through it.
    pub fn stats_by_name(&self, name: &str) -> Option<ChannelStats> {
        let channel = {
            let entries = self.lock();
            entries.values().find(|e| e.name == name).map(|e| Arc::clone(&e.erased))
        };
        channel.map(|c| c.stats())
    }

    /// Clears the channel whose type name matches `name`. Returns whether a
    /// channel was found.
    pub fn clear_by_name(&self, name: &str) -> bool {
        let channel = {
            let entries = self.lock();
            entries.values().find(|e| e.name == name).map(|e| Arc::clone(&e.erased))
        };
        match channel {
            Some(c) => {
                c.clear_all();
                true
            }
            None => false,
        }
    }
}
