//! Top-level control loop.
//!
//! # Responsibilities
//! - Load configuration and construct pools from it
//! - Start check, node and reconciler tasks for one configuration
//!   generation
//! - Cascade shutdown and wait for every task to finish before exiting or
//!   rebuilding
//!
//! Shutdown is a broadcast signal plus a counted wait on the `JoinSet`:
//! checks may be mid-flight against live backends and are allowed to
//! finish or cancel before the generation is considered drained.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time;

use crate::config::load_config;
use crate::lbpool::Pool;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::{SignalEvent, Signals};
use crate::pfctl::{Reconciler, TableBackend};

/// Pause before retrying after an unusable configuration file.
const RELOAD_BACKOFF: Duration = Duration::from_secs(5);

pub struct Supervisor {
    config_path: PathBuf,
    table: Arc<dyn TableBackend>,
}

impl Supervisor {
    pub fn new(config_path: PathBuf, table: Arc<dyn TableBackend>) -> Self {
        Self { config_path, table }
    }

    /// Run configuration generations until a shutdown signal arrives.
    pub async fn run(self) -> std::io::Result<()> {
        let mut signals = Signals::new()?;

        loop {
            let config = match load_config(&self.config_path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!(error = %e, "configuration not loaded, retrying");
                    tokio::select! {
                        _ = time::sleep(RELOAD_BACKOFF) => continue,
                        event = signals.recv() => {
                            if event == SignalEvent::Shutdown {
                                return Ok(());
                            }
                            continue;
                        }
                    }
                }
            };

            let pools: Vec<Arc<Pool>> =
                config.pools.iter().flat_map(|cfg| Pool::from_config(cfg)).collect();
            if pools.is_empty() {
                tracing::warn!("configuration contains no usable pools");
            }

            let shutdown = Shutdown::new();
            let mut tasks = JoinSet::new();
            for pool in &pools {
                pool.spawn(&mut tasks, &shutdown);
            }
            let reconciler = Reconciler::new(pools, Arc::clone(&self.table));
            tasks.spawn(reconciler.run(shutdown.subscribe()));

            tracing::info!(tasks = tasks.len(), "generation started");

            let event = signals.recv().await;
            shutdown.trigger();
            while tasks.join_next().await.is_some() {}
            tracing::info!("generation drained");

            match event {
                SignalEvent::Shutdown => return Ok(()),
                SignalEvent::Reload => {
                    tracing::info!("reloading configuration");
                }
            }
        }
    }
}
