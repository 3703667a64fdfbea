//! Walkthrough of the two ways to read a `Maybe`.
//!
//! Run with: cargo run -p maybe-core --example usage
//!
//! Set `RUST_LOG=maybe_core=trace` to see faults being minted.

use maybe_core::{Fault, Maybe, fail, succeed};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn log_fault(fault: &Fault) {
    warn!(fault_id = %fault.id(), timestamp = %fault.timestamp(), "{fault}");
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Positional access
    let answer: Maybe<i32> = succeed(42);
    let (fault, value) = answer.into_slots();
    info!(?fault, ?value, "succeed(42)");

    let broken: Maybe<i32> = fail("error");
    let (fault, value) = broken.into_slots();
    info!(label = ?fault.as_ref().and_then(Fault::label), ?value, "fail(\"error\")");

    // Handler dispatch: `failed` yields the value, or nothing after handling the fault
    let greeting: Maybe<&str> = succeed("hello");
    let value = greeting.failed(log_fault);
    info!(?value, "succeed(\"hello\").failed(..) does not log");

    let broken: Maybe<&str> = fail("error");
    let value = broken.failed(log_fault);
    info!(?value, "fail(\"error\").failed(..) logs the fault");

    // `succeeded` yields the fault, or nothing after handling the value
    let greeting: Maybe<&str> = succeed("hello");
    let fault = greeting.succeeded(|value| info!(value, "handled success"));
    info!(fault = ?fault.map(Fault::id), "succeed(\"hello\").succeeded(..)");

    let broken: Maybe<&str> = fail("error");
    let fault = broken.succeeded(|value| info!(value, "handled success"));
    info!(fault = ?fault.map(Fault::id), "fail(\"error\").succeeded(..) returns the fault");
}
