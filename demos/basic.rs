//! Basic usage: register handlers at different priorities and raise with
//! each of the three protocols.
//!
//! Run with: `cargo run --example basic`

use std::sync::Arc;
use std::time::Duration;

use evoke::{Channel, Event, HandlerFn, RegisterOpts};

#[derive(Debug)]
struct JobFinished {
    name: &'static str,
    took: Duration,
}
impl Event for JobFinished {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Runs first: priority 10.
    Channel::<JobFinished>::register_with(
        HandlerFn::sync(|e: &JobFinished| {
            println!("[audit] job={} took={:?}", e.name, e.took);
            Ok(())
        })
        .named("audit"),
        RegisterOpts::priority(10),
    )?;

    // Runs second: default priority, async body.
    Channel::<JobFinished>::register(
        HandlerFn::async_fn(|e: Arc<JobFinished>| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            println!("[notify] job={}", e.name);
            Ok(())
        })
        .named("notify"),
    )?;

    // Sequential: audit completes before notify starts.
    Channel::<JobFinished>::raise_sequential(JobFinished {
        name: "import",
        took: Duration::from_secs(3),
    })
    .await?;

    // Concurrent: both started together, pass waits for both.
    Channel::<JobFinished>::raise_concurrent(JobFinished {
        name: "compact",
        took: Duration::from_secs(1),
    })
    .await?;

    // Late subscribers can replay the last value instead of missing it.
    Channel::<JobFinished>::register_with(
        HandlerFn::sync(|e: &JobFinished| {
            println!("[late] saw last job={}", e.name);
            Ok(())
        })
        .named("late"),
        RegisterOpts::default().with_replay(),
    )?;

    println!("bindings = {}", Channel::<JobFinished>::len());
    Ok(())
}
