//! # The handler tagged union and its identity.
//!
//! [`HandlerFn`] wraps exactly one callable in one of four shapes
//! ([`HandlerKind`]). The engine never overloads on signatures: every
//! registration input is constructed explicitly through one of the
//! constructors here and dispatched by matching on the tag.
//!
//! ## Identity
//! Two registrations are "the same handler" when they wrap the same erased
//! callable (or, for [`HandlerFn::from_handler`], the same receiver object)
//! in the same shape. Cloning a `HandlerFn` preserves identity; building a
//! new one from a textually identical closure does not. Identity is
//! partitioned by kind, so a sync and an async handler never collide.
//!
//! ## Invocation
//! - The async protocols drive [`HandlerFn::call`], which yields a boxed
//!   future regardless of shape (sync bodies run inline at poll time).
//! - The sync protocol drives [`HandlerFn::call_blocking`], which executes
//!   async bodies to completion on the calling thread before returning, so
//!   a sync raise never leaves an in-flight handler.
//!
//! Panics inside handler bodies are caught and reported as
//! [`HandlerError::Panicked`] rather than unwinding through the engine.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use futures::executor::block_on;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::HandlerError;
use crate::events::Event;
use crate::handlers::EventHandler;

type SyncFn<E> = Arc<dyn Fn(&E) -> Result<(), HandlerError> + Send + Sync>;
type SyncUnitFn = Arc<dyn Fn() -> Result<(), HandlerError> + Send + Sync>;
type AsyncFn<E> = Arc<dyn Fn(Arc<E>) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;
type AsyncUnitFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

/// The four handler shapes a container accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Synchronous, receives the payload by reference.
    Sync,
    /// Synchronous, ignores the payload.
    SyncUnit,
    /// Asynchronous, receives the shared payload.
    Async,
    /// Asynchronous, ignores the payload.
    AsyncUnit,
}

/// Dedup/deregister key: callable address partitioned by shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HandlerId {
    kind: HandlerKind,
    addr: usize,
}

enum Callable<E: Event + ?Sized> {
    Sync(SyncFn<E>),
    SyncUnit(SyncUnitFn),
    Async(AsyncFn<E>),
    AsyncUnit(AsyncUnitFn),
}

/// One registered callable plus its identity and display name.
///
/// Cheap to clone; clones share the underlying callable and compare equal
/// for deduplication purposes.
pub struct HandlerFn<E: Event + ?Sized> {
    callable: Callable<E>,
    ident: usize,
    name: Arc<str>,
}

impl<E: Event + ?Sized> HandlerFn<E> {
    /// Wraps a synchronous handler that receives the payload.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&E) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let name: Arc<str> = Arc::from(std::any::type_name::<F>());
        let erased: SyncFn<E> = Arc::new(f);
        let ident = erased_addr(Arc::as_ptr(&erased).cast::<()>());
        Self { callable: Callable::Sync(erased), ident, name }
    }

    /// Wraps a synchronous handler that ignores the payload.
    pub fn sync_unit<F>(f: F) -> Self
    where
        F: Fn() -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let name: Arc<str> = Arc::from(std::any::type_name::<F>());
        let erased: SyncUnitFn = Arc::new(f);
        let ident = erased_addr(Arc::as_ptr(&erased).cast::<()>());
        Self { callable: Callable::SyncUnit(erased), ident, name }
    }

    /// Wraps an asynchronous handler that receives the shared payload.
    ///
    /// `f` is called once per invocation and must produce a fresh future
    /// each time; shared state goes into an explicit `Arc` inside the
    /// closure.
    pub fn async_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let name: Arc<str> = Arc::from(std::any::type_name::<F>());
        let erased: AsyncFn<E> = Arc::new(move |event| f(event).boxed());
        let ident = erased_addr(Arc::as_ptr(&erased).cast::<()>());
        Self { callable: Callable::Async(erased), ident, name }
    }

    /// Wraps an asynchronous handler that ignores the payload.
    pub fn async_unit<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let name: Arc<str> = Arc::from(std::any::type_name::<F>());
        let erased: AsyncUnitFn = Arc::new(move || f().boxed());
        let ident = erased_addr(Arc::as_ptr(&erased).cast::<()>());
        Self { callable: Callable::AsyncUnit(erased), ident, name }
    }

    /// Wraps an [`EventHandler`] object.
    ///
    /// Identity is derived from the receiver, not from the adapter closure:
    /// registering the same `Arc` twice — even through two separate
    /// `from_handler` calls — deduplicates to one binding.
    pub fn from_handler(handler: Arc<dyn EventHandler<E>>) -> Self {
        let ident = erased_addr(Arc::as_ptr(&handler).cast::<()>());
        let name: Arc<str> = Arc::from(handler.name());
        let erased: AsyncFn<E> = Arc::new(move |event| {
            let handler = Arc::clone(&handler);
            async move { handler.on_event(event).await }.boxed()
        });
        Self { callable: Callable::Async(erased), ident, name }
    }

    /// Overrides the display name used in errors and introspection.
    #[must_use]
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// The shape tag of this handler.
    pub fn kind(&self) -> HandlerKind {
        match self.callable {
            Callable::Sync(_) => HandlerKind::Sync,
            Callable::SyncUnit(_) => HandlerKind::SyncUnit,
            Callable::Async(_) => HandlerKind::Async,
            Callable::AsyncUnit(_) => HandlerKind::AsyncUnit,
        }
    }

    /// Display name used in errors and introspection.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub(crate) fn id(&self) -> HandlerId {
        HandlerId { kind: self.kind(), addr: self.ident }
    }

    /// Invokes the handler in blocking form: sync bodies run inline, async
    /// bodies are executed to completion on the calling thread.
    pub(crate) fn call_blocking(&self, event: &Arc<E>) -> Result<(), HandlerError> {
        match &self.callable {
            Callable::Sync(f) => flatten(catch_unwind(AssertUnwindSafe(|| f(event)))),
            Callable::SyncUnit(f) => flatten(catch_unwind(AssertUnwindSafe(|| f()))),
            Callable::Async(f) => {
                let fut = match catch_unwind(AssertUnwindSafe(|| f(Arc::clone(event)))) {
                    Ok(fut) => fut,
                    Err(panic) => return Err(panicked(panic)),
                };
                flatten(block_on(AssertUnwindSafe(fut).catch_unwind()))
            }
            Callable::AsyncUnit(f) => {
                let fut = match catch_unwind(AssertUnwindSafe(|| f())) {
                    Ok(fut) => fut,
                    Err(panic) => return Err(panicked(panic)),
                };
                flatten(block_on(AssertUnwindSafe(fut).catch_unwind()))
            }
        }
    }

    /// Invokes the handler in asynchronous form, yielding a `'static` boxed
    /// future. Sync bodies run inline at first poll.
    pub(crate) fn call(&self, event: Arc<E>) -> BoxFuture<'static, Result<(), HandlerError>> {
        match &self.callable {
            Callable::Sync(f) => {
                let f = Arc::clone(f);
                async move { flatten(catch_unwind(AssertUnwindSafe(|| f(&event)))) }.boxed()
            }
            Callable::SyncUnit(f) => {
                let f = Arc::clone(f);
                async move { flatten(catch_unwind(AssertUnwindSafe(|| f()))) }.boxed()
            }
            Callable::Async(f) => {
                let f = Arc::clone(f);
                async move {
                    let fut = match catch_unwind(AssertUnwindSafe(|| f(event))) {
                        Ok(fut) => fut,
                        Err(panic) => return Err(panicked(panic)),
                    };
                    flatten(AssertUnwindSafe(fut).catch_unwind().await)
                }
                .boxed()
            }
            Callable::AsyncUnit(f) => {
                let f = Arc::clone(f);
                async move {
                    let fut = match catch_unwind(AssertUnwindSafe(|| f())) {
                        Ok(fut) => fut,
                        Err(panic) => return Err(panicked(panic)),
                    };
                    flatten(AssertUnwindSafe(fut).catch_unwind().await)
                }
                .boxed()
            }
        }
    }
}

impl<E: Event + ?Sized> Clone for HandlerFn<E> {
    fn clone(&self) -> Self {
        let callable = match &self.callable {
            Callable::Sync(f) => Callable::Sync(Arc::clone(f)),
            Callable::SyncUnit(f) => Callable::SyncUnit(Arc::clone(f)),
            Callable::Async(f) => Callable::Async(Arc::clone(f)),
            Callable::AsyncUnit(f) => Callable::AsyncUnit(Arc::clone(f)),
        };
        Self { callable, ident: self.ident, name: Arc::clone(&self.name) }
    }
}

impl<E: Event + ?Sized> fmt::Debug for HandlerFn<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFn")
            .field("kind", &self.kind())
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn erased_addr(ptr: *const ()) -> usize {
    ptr as usize
}

fn flatten(result: Result<Result<(), HandlerError>, Box<dyn Any + Send>>) -> Result<(), HandlerError> {
    match result {
        Ok(inner) => inner,
        Err(panic) => Err(panicked(panic)),
    }
}

fn panicked(payload: Box<dyn Any + Send>) -> HandlerError {
    let msg = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    HandlerError::Panicked(msg)
}
