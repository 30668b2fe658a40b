//! End-to-end tests for the async raise protocols, polymorphic routing,
//! the global channel, and the raise builder.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use evoke::{
    BindingSet, Channel, DispatchError, Event, EventHandler, EventRegistry, HandlerError,
    HandlerFn, Raise, RegisterOpts, Route,
};

type Log = Arc<Mutex<Vec<&'static str>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn push(log: &Log, entry: &'static str) {
    log.lock().unwrap().push(entry);
}

fn logged(log: &Log) -> Vec<&'static str> {
    log.lock().unwrap().clone()
}

struct Tick;
impl Event for Tick {}

fn delayed(log: &Log, entry: &'static str, delay: Duration) -> HandlerFn<Tick> {
    let log = Arc::clone(log);
    HandlerFn::async_fn(move |_: Arc<Tick>| {
        let log = Arc::clone(&log);
        async move {
            tokio::time::sleep(delay).await;
            push(&log, entry);
            Ok(())
        }
    })
}

#[tokio::test]
async fn concurrent_completion_order_follows_delays_not_registration() {
    let set = BindingSet::<Tick>::new();
    let log = new_log();

    // The slow handler is registered first; completion order must still be
    // fast-then-slow.
    set.register(delayed(&log, "slow", Duration::from_millis(100))).unwrap();
    set.register(delayed(&log, "fast", Duration::from_millis(50))).unwrap();

    set.raise_concurrent(Tick).await.unwrap();
    assert_eq!(logged(&log), vec!["fast", "slow"]);
}

#[tokio::test]
async fn sequential_raise_awaits_in_priority_order() {
    let set = BindingSet::<Tick>::new();
    let log = new_log();

    set.register(delayed(&log, "second", Duration::ZERO)).unwrap();
    set.register_with(
        delayed(&log, "first", Duration::from_millis(50)),
        RegisterOpts::priority(10),
    )
    .unwrap();

    set.raise_sequential(Tick).await.unwrap();
    // Sequential means the 50ms handler fully completes before the next
    // binding starts, despite its delay.
    assert_eq!(logged(&log), vec!["first", "second"]);
}

#[tokio::test]
async fn sequential_raise_fails_fast() {
    let set = BindingSet::<Tick>::new();
    let log = new_log();

    set.register_with(
        HandlerFn::async_fn(|_: Arc<Tick>| async { Err("boom".into()) }).named("exploder"),
        RegisterOpts::priority(10),
    )
    .unwrap();
    let log_in_handler = Arc::clone(&log);
    set.register(HandlerFn::async_fn(move |_: Arc<Tick>| {
        let log = Arc::clone(&log_in_handler);
        async move {
            push(&log, "late");
            Ok(())
        }
    }))
    .unwrap();

    let err = set.raise_sequential(Tick).await.unwrap_err();
    assert_eq!(err.as_label(), "handler_failed");
    assert!(logged(&log).is_empty());
}

#[tokio::test]
async fn concurrent_raise_lets_started_handlers_finish_and_aggregates() {
    let set = BindingSet::<Tick>::new();
    let log = new_log();

    set.register(HandlerFn::async_fn(|_: Arc<Tick>| async { Err("first".into()) }).named("a"))
        .unwrap();
    set.register(HandlerFn::async_fn(|_: Arc<Tick>| async { Err("second".into()) }).named("b"))
        .unwrap();
    // A slow success: it must run to completion even though siblings fail.
    set.register(delayed(&log, "survivor", Duration::from_millis(50))).unwrap();

    let err = set.raise_concurrent(Tick).await.unwrap_err();
    assert_eq!(logged(&log), vec!["survivor"]);
    match err {
        DispatchError::PassFailed { failed, started, handler, source } => {
            assert_eq!(failed, 2);
            assert_eq!(started, 3);
            assert_eq!(&*handler, "a");
            assert!(matches!(source, HandlerError::Failed(msg) if msg == "first"));
        }
        other => panic!("expected PassFailed, got {other}"),
    }
}

#[tokio::test]
async fn concurrent_raise_with_single_failure_reports_the_handler() {
    let set = BindingSet::<Tick>::new();
    set.register(HandlerFn::async_fn(|_: Arc<Tick>| async { Ok(()) })).unwrap();
    set.register(HandlerFn::async_fn(|_: Arc<Tick>| async { Err("boom".into()) }).named("only"))
        .unwrap();

    let err = set.raise_concurrent(Tick).await.unwrap_err();
    match err {
        DispatchError::HandlerFailed { handler, .. } => assert_eq!(&*handler, "only"),
        other => panic!("expected HandlerFailed, got {other}"),
    }
}

// ---- Polymorphic routing ----

trait OrderEvent: Send + Sync {
    fn order_id(&self) -> u64;
}
impl Event for dyn OrderEvent {}

struct OrderPlaced {
    id: u64,
}
impl OrderEvent for OrderPlaced {
    fn order_id(&self) -> u64 {
        self.id
    }
}
impl Event for OrderPlaced {
    fn routes() -> Vec<Route<Self>> {
        vec![Route::capability::<dyn OrderEvent>(|e| e)]
    }
}

struct Seen {
    derived: Mutex<Vec<u64>>,
    base: Mutex<Vec<u64>>,
}

fn wire_order_handlers(registry: &EventRegistry) -> Arc<Seen> {
    let seen = Arc::new(Seen { derived: Mutex::new(Vec::new()), base: Mutex::new(Vec::new()) });

    let derived = Arc::clone(&seen);
    registry
        .bindings::<OrderPlaced>()
        .register(HandlerFn::sync(move |e: &OrderPlaced| {
            derived.derived.lock().unwrap().push(e.id);
            Ok(())
        }))
        .unwrap();

    let base = Arc::clone(&seen);
    registry
        .bindings::<dyn OrderEvent>()
        .register(HandlerFn::sync(move |e: &(dyn OrderEvent + 'static)| {
            base.base.lock().unwrap().push(e.order_id());
            Ok(())
        }))
        .unwrap();

    seen
}

#[test]
fn polymorphic_raise_reaches_exact_and_capability_handlers() {
    let registry = EventRegistry::new();
    let seen = wire_order_handlers(&registry);

    registry.raise_sync(OrderPlaced { id: 7 }).unwrap();
    assert_eq!(*seen.derived.lock().unwrap(), vec![7]);
    assert_eq!(*seen.base.lock().unwrap(), vec![7]);
}

#[test]
fn polymorphic_opt_out_reaches_only_the_exact_type() {
    let registry = EventRegistry::new();
    let seen = wire_order_handlers(&registry);

    registry.raise_sync_with(OrderPlaced { id: 8 }, false).unwrap();
    assert_eq!(*seen.derived.lock().unwrap(), vec![8]);
    assert!(seen.base.lock().unwrap().is_empty());
}

#[test]
fn unresolved_capability_channel_is_a_no_op() {
    let registry = EventRegistry::new();
    // Only the exact-type channel exists; the declared capability route
    // resolves to nothing and must not error.
    registry.raise_sync(OrderPlaced { id: 9 }).unwrap();
}

#[tokio::test]
async fn polymorphic_raise_works_across_async_protocols() {
    let registry = EventRegistry::new();
    let seen = wire_order_handlers(&registry);

    registry.raise_sequential(OrderPlaced { id: 1 }).await.unwrap();
    registry.raise_concurrent(OrderPlaced { id: 2 }).await.unwrap();

    assert_eq!(*seen.derived.lock().unwrap(), vec![1, 2]);
    assert_eq!(*seen.base.lock().unwrap(), vec![1, 2]);
}

// ---- Object handlers ----

struct Collector {
    calls: AtomicUsize,
}

#[async_trait]
impl EventHandler<Tick> for Collector {
    async fn on_event(&self, _event: Arc<Tick>) -> Result<(), HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

#[tokio::test]
async fn same_receiver_registered_twice_dedups_to_one_binding() {
    let set = BindingSet::<Tick>::new();
    let collector = Arc::new(Collector { calls: AtomicUsize::new(0) });

    let receiver: Arc<dyn EventHandler<Tick>> = collector.clone();
    // Two separate adapters around the same receiver object.
    set.register(HandlerFn::from_handler(Arc::clone(&receiver))).unwrap();
    set.register(HandlerFn::from_handler(receiver)).unwrap();
    assert_eq!(set.len(), 1);

    set.raise_sequential(Tick).await.unwrap();
    assert_eq!(collector.calls.load(Ordering::SeqCst), 1);
}

// ---- Global channel ----

struct GlobalOnly(u32);
impl Event for GlobalOnly {}

#[test]
fn global_channel_is_shared_and_replays() {
    Channel::<GlobalOnly>::raise_sync(GlobalOnly(3)).unwrap();

    let hits = Arc::new(AtomicUsize::new(0));
    let hits_in_handler = Arc::clone(&hits);
    Channel::<GlobalOnly>::register_with(
        HandlerFn::sync(move |e: &GlobalOnly| {
            assert_eq!(e.0, 3);
            hits_in_handler.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
        RegisterOpts::default().with_replay(),
    )
    .unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // The channel registered itself with the global registry.
    let name = std::any::type_name::<GlobalOnly>();
    assert!(evoke::global().names().contains(&name));

    Channel::<GlobalOnly>::clear_all();
    assert!(Channel::<GlobalOnly>::is_empty());
}

// ---- Builder ----

struct Gated {
    open: bool,
}
impl Event for Gated {}

#[tokio::test]
async fn builder_guard_gates_all_protocols() {
    let registry = EventRegistry::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_in_handler = Arc::clone(&hits);
    registry
        .bindings::<Gated>()
        .register(HandlerFn::sync(move |_: &Gated| {
            hits_in_handler.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }))
        .unwrap();

    Raise::event(Gated { open: false }).via(&registry).when(|e| e.open).sync().unwrap();
    Raise::event(Gated { open: false }).via(&registry).when(|e| e.open).sequential().await.unwrap();
    Raise::event(Gated { open: false }).via(&registry).when(|e| e.open).concurrent().await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    Raise::event(Gated { open: true }).via(&registry).when(|e| e.open).sequential().await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn builder_polymorphic_toggle_matches_registry_raises() {
    let registry = EventRegistry::new();
    let seen = wire_order_handlers(&registry);

    Raise::event(OrderPlaced { id: 4 }).via(&registry).sync().unwrap();
    Raise::event(OrderPlaced { id: 5 }).via(&registry).polymorphic(false).sync().unwrap();

    assert_eq!(*seen.derived.lock().unwrap(), vec![4, 5]);
    assert_eq!(*seen.base.lock().unwrap(), vec![4]);
}
