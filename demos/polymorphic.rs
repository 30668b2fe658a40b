//! Polymorphic routing: one raise reaches the exact-type channel and every
//! registered capability channel the event declares.
//!
//! Run with: `cargo run --example polymorphic`

use evoke::{Event, EventRegistry, HandlerFn, Raise, Route};

trait AlertEvent: Send + Sync {
    fn severity(&self) -> u8;
}
impl Event for dyn AlertEvent {}

struct DiskFull {
    mount: &'static str,
    used_pct: u8,
}
impl AlertEvent for DiskFull {
    fn severity(&self) -> u8 {
        if self.used_pct > 95 { 2 } else { 1 }
    }
}
impl Event for DiskFull {
    fn routes() -> Vec<Route<Self>> {
        vec![Route::capability::<dyn AlertEvent>(|e| e)]
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = EventRegistry::new();

    // A handler for the concrete type...
    registry.bindings::<DiskFull>().register(HandlerFn::sync(|e: &DiskFull| {
        println!("[disk] mount={} used={}%", e.mount, e.used_pct);
        Ok(())
    }))?;

    // ...and one for the capability interface, shared by every alert kind.
    registry.bindings::<dyn AlertEvent>().register(HandlerFn::sync(|e: &(dyn AlertEvent + 'static)| {
        println!("[alert] severity={}", e.severity());
        Ok(())
    }))?;

    // Default: both handlers run.
    registry.raise_sync(DiskFull { mount: "/data", used_pct: 97 })?;

    // Opt out of polymorphism: only the DiskFull handler runs.
    Raise::event(DiskFull { mount: "/tmp", used_pct: 60 })
        .via(&registry)
        .polymorphic(false)
        .sync()?;

    for stats in registry.stats() {
        println!("channel {} has {} binding(s)", stats.event_type, stats.bindings);
    }
    Ok(())
}
