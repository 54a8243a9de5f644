//! Entity loader - entity-dispatch demo
//!
//! Builds an action set from a JSON descriptor, runs its thunk against an
//! action channel and feeds the channel into a store, the same way an
//! application main loop would:
//!
//! 1. Descriptor (JSON + service) -> `build()` -> types, creators, thunk
//! 2. Thunk dispatches REQUEST, awaits the service, dispatches RESPONSE/ERROR
//! 3. Main loop drains the channel into the store
//! 4. Final root state is printed as JSON
//!
//! # Usage
//!
//! ```sh
//! RUST_LOG=debug cargo run -p entity-loader -- --entity user --kind load
//! cargo run -p entity-loader -- --entity order --kind save --fail
//! ```

use std::error::Error;
use std::time::Duration;

use clap::Parser;
use entity_dispatch::prelude::*;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "entity-loader")]
#[command(about = "Run a built entity action against a store")]
struct Args {
    /// Entity name (becomes the entityPath)
    #[arg(long, short, default_value = "user")]
    entity: String,

    /// Operation: load, save or delete
    #[arg(long, short, default_value = "load")]
    kind: String,

    /// Make the simulated service reject
    #[arg(long)]
    fail: bool,

    /// Simulated service latency in milliseconds
    #[arg(long, default_value = "50")]
    delay_ms: u64,

    /// Comma-separated glob patterns of action types to log
    #[arg(long)]
    log_include: Option<String>,

    /// Comma-separated glob patterns of action types to skip
    #[arg(long)]
    log_exclude: Option<String>,

    /// Disable the built-in action logger
    #[arg(long)]
    no_log: bool,
}

fn simulated_service(delay: Duration, fail: bool) -> Service {
    Service::new(move |args: Vec<Value>| async move {
        tokio::time::sleep(delay).await;
        if fail {
            Err(json!({"error": "service unavailable", "args": args}))
        } else {
            Ok(json!({"id": args.first().cloned().unwrap_or(Value::Null), "loaded": true}))
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let descriptor: Descriptor =
        serde_json::from_value(json!({"name": args.entity, "type": args.kind}))?;
    let actions = descriptor
        .with_service(simulated_service(
            Duration::from_millis(args.delay_ms),
            args.fail,
        ))
        .build()?;

    println!("types:    {:?}", actions.types.keys().collect::<Vec<_>>());
    println!("creators: {:?}", actions.creators.keys().collect::<Vec<_>>());

    let options = StoreOptions {
        log_actions: !args.no_log,
        logger: ActionLoggerConfig::new(args.log_include.as_deref(), args.log_exclude.as_deref()),
        ..StoreOptions::default()
    };
    let mut store = create_store_with(Dataset::new(), vec![], vec![], options);

    let (action_tx, mut action_rx) = mpsc::unbounded_channel();
    let thunk = actions.action.call(vec![json!(42)]);
    let task = tokio::spawn(thunk.run(action_tx));

    // Channel closes once the thunk has dispatched its terminal action
    while let Some(action) = action_rx.recv().await {
        let changed = store.dispatch(action);
        tracing::info!(changed, "dispatched");
    }

    let outcome = task.await?;
    println!("outcome:  {outcome:?}");
    println!("state:    {}", serde_json::to_string_pretty(store.state())?);

    for (entity, status) in store.state().entities.iter() {
        println!(
            "entity {entity}: {:?} {:?} (update #{})",
            status.operation, status.phase, status.updated
        );
    }

    if let Some(log) = store.action_log() {
        for entry in log.entries() {
            println!(
                "log #{} {} ({}) changed={:?}",
                entry.sequence,
                entry.action_type,
                entry.elapsed_display(),
                entry.state_changed
            );
        }
    }

    Ok(())
}
