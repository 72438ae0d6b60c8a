// src/lib.rs

pub mod actions;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::actions::{ActionChain, ActionRegistry};
use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::{ConfigFile, WatchEntry};
use crate::engine::AsyncWatcher;
use crate::types::{DispatchStyle, RegistrationId};

pub use crate::engine::{Handler, Payload, Watcher};
pub use crate::errors::WatcherError;
pub use crate::types::{Change, EventKind, TriggerMode};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - one action chain per watch entry
/// - the polling loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;
    let registry = ActionRegistry::builtin();

    if args.dry_run {
        print_dry_run(&cfg, &registry)?;
        return Ok(());
    }

    let mut watcher = AsyncWatcher::new();
    register_entries(&mut watcher, &registry, &cfg)?;

    if args.once {
        watcher.check().await?;
        return Ok(());
    }

    let (stop_tx, stop_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = stop_tx.send(()).await;
    });

    println!("Running... Press Ctrl+C to stop");
    let cycles = poll_loop(&mut watcher, args.poll_interval(), stop_rx).await;
    debug!(cycles, "poll loop finished");
    println!("Stopped by user");
    Ok(())
}

/// Register every config entry, in file order, with `WithChanges` dispatch.
pub fn register_entries(
    watcher: &mut AsyncWatcher,
    registry: &ActionRegistry,
    cfg: &ConfigFile,
) -> errors::Result<Vec<RegistrationId>> {
    cfg.entries()
        .iter()
        .map(|entry| register_entry(watcher, registry, entry))
        .collect()
}

pub fn register_entry(
    watcher: &mut AsyncWatcher,
    registry: &ActionRegistry,
    entry: &WatchEntry,
) -> errors::Result<RegistrationId> {
    info!("Registering: {}", entry.describe());
    let chain = ActionChain::from_specs(registry, &entry.actions)?;
    watcher.register(
        entry.source.clone(),
        chain.into_handler(),
        entry.trigger,
        DispatchStyle::WithChanges,
    )
}

/// Check on every tick until `stop` receives a message. Returns the number
/// of cycles run.
///
/// A failing cycle is logged and the loop carries on. A dropped sender does
/// not stop the loop.
pub async fn poll_loop(
    watcher: &mut AsyncWatcher,
    interval: Duration,
    mut stop: mpsc::Receiver<()>,
) -> u64 {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut cycles = 0u64;
    loop {
        tokio::select! {
            Some(()) = stop.recv() => break,
            _ = ticker.tick() => {
                if let Err(err) = watcher.check().await {
                    error!(error = %err, "check cycle failed");
                }
                cycles += 1;
            }
        }
    }
    cycles
}

/// Print each entry with its trigger mode and actions. Action names are
/// resolved so an unknown action fails the dry run too.
fn print_dry_run(cfg: &ConfigFile, registry: &ActionRegistry) -> errors::Result<()> {
    println!("watcher-fs dry-run");
    println!();
    println!("watch entries ({}):", cfg.entries().len());
    for (index, entry) in cfg.entries().iter().enumerate() {
        ActionChain::from_specs(registry, &entry.actions)?;

        println!("  - #{index} {}", entry.source);
        println!("      trigger_type: {}", entry.trigger);
        if entry.actions.is_empty() {
            println!("      actions: (none)");
        } else {
            let labels: Vec<String> = entry.actions.iter().map(|a| a.label()).collect();
            println!("      actions: {}", labels.join(", "));
        }
    }

    debug!("dry-run complete (nothing registered)");
    Ok(())
}
