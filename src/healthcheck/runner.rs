//! Check scheduling and hysteresis.
//!
//! # State machine
//! ```text
//! probe Good,  previous not Good → reset failures, emit Good
//! probe !Good, failures < max_failed → failures += 1
//!                                      emit Bad when failures == max_failed
//! ```
//!
//! Recovery is immediate (a single Good probe), failure is debounced
//! (max_failed consecutive probes), and emissions are edge-triggered: a
//! node hears about each hard-state transition exactly once.

use std::net::IpAddr;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time;

use crate::config::schema::CheckConfig;
use crate::healthcheck::dummy::DummyProbe;
use crate::healthcheck::probe::Probe;
use crate::healthcheck::result::{CheckEvent, CheckResult, ProbeError, ProbeOutcome};

/// Everything needed to run one check: the probe plus its schedule.
#[derive(Debug, Clone)]
pub struct CheckSpec {
    pub probe: Probe,
    pub interval: Duration,
    pub timeout: Duration,
    pub max_failed: u32,
}

impl CheckSpec {
    /// Build a spec from configuration; `None` when the probe itself cannot
    /// be built (unknown type, missing fields).
    pub fn from_config(cfg: &CheckConfig, target: IpAddr) -> Option<Self> {
        let probe = Probe::from_config(cfg, target)?;
        Some(Self {
            probe,
            interval: cfg.interval(),
            timeout: cfg.timeout(),
            max_failed: cfg.max_failed,
        })
    }

    /// The synthetic always-Good check given to nodes that ended up with no
    /// configured checks, so such nodes stay eligible for traffic.
    pub fn always_good() -> Self {
        Self {
            probe: Probe::Dummy(DummyProbe::always_good()),
            interval: Duration::from_secs(1),
            timeout: Duration::from_millis(1000),
            max_failed: 3,
        }
    }
}

/// The per-check scheduling loop and its hysteresis state.
pub struct HealthCheck {
    check_idx: usize,
    spec: CheckSpec,
    node: String,
    target: IpAddr,
    events: mpsc::UnboundedSender<CheckEvent>,

    failures: u32,
    prev: CheckResult,
}

impl HealthCheck {
    pub fn new(
        check_idx: usize,
        spec: CheckSpec,
        node: String,
        target: IpAddr,
        events: mpsc::UnboundedSender<CheckEvent>,
    ) -> Self {
        tracing::debug!(node = %node, target = %target, check = spec.probe.kind(), "healthcheck created");
        Self { check_idx, spec, node, target, events, failures: 0, prev: CheckResult::Unknown }
    }

    /// Endless probe loop. Exits only on shutdown; a shutdown received while
    /// a probe is in flight drops (cancels) the attempt.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            let outcome = tokio::select! {
                outcome = self.attempt() => outcome,
                _ = shutdown.recv() => return,
            };

            if let Some(emit) = self.transition(outcome.result) {
                self.log_transition(emit, &outcome);
                let _ = self.events.send(CheckEvent { check_idx: self.check_idx, result: emit });
            }

            tokio::select! {
                _ = time::sleep(self.spec.interval) => {}
                _ = shutdown.recv() => return,
            }
        }
    }

    /// One probe attempt bounded by the configured timeout.
    async fn attempt(&self) -> ProbeOutcome {
        match time::timeout(self.spec.timeout, self.spec.probe.run()).await {
            Ok(outcome) => outcome,
            Err(_) => ProbeOutcome::bad(ProbeError::Timeout),
        }
    }

    /// Apply the hysteresis rule to one probe result. Returns the hard-state
    /// message to emit, if this result crossed an edge.
    fn transition(&mut self, result: CheckResult) -> Option<CheckResult> {
        let mut emit = None;

        if self.prev != CheckResult::Good && result == CheckResult::Good {
            self.failures = 0;
            emit = Some(CheckResult::Good);
        }

        if result != CheckResult::Good && self.failures < self.spec.max_failed {
            self.failures += 1;
            if self.failures == self.spec.max_failed {
                emit = Some(CheckResult::Bad);
            }
        }

        self.prev = result;
        emit
    }

    fn log_transition(&self, emit: CheckResult, outcome: &ProbeOutcome) {
        match emit {
            CheckResult::Good => tracing::info!(
                node = %self.node,
                target = %self.target,
                check = self.spec.probe.kind(),
                "action: passed"
            ),
            _ => tracing::info!(
                node = %self.node,
                target = %self.target,
                check = self.spec.probe.kind(),
                failures = self.failures,
                max_failed = self.spec.max_failed,
                reason = outcome.cause.as_ref().map(|e| e.to_string()),
                "action: failed"
            ),
        }
    }
}
