//! Probe result types shared by all check variants.

use thiserror::Error;

/// Outcome of a single probe attempt.
///
/// `Unknown` is the value before any probe has completed. `Error` and `Bad`
/// are both treated as "not good" by the hysteresis logic; `Error` means the
/// check itself could not be performed and carries a cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    Unknown,
    Error,
    Bad,
    Good,
}

impl CheckResult {
    pub fn is_good(self) -> bool {
        self == CheckResult::Good
    }
}

/// Why a probe attempt did not come back Good.
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    #[error("bad HTTP status code {0}")]
    HttpStatus(u16),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("probe timed out")]
    Timeout,

    #[error("command exited with code {0}")]
    ExitCode(i32),

    #[error("failed to run command: {0}")]
    Exec(String),
}

/// A probe result together with its optional cause.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub result: CheckResult,
    pub cause: Option<ProbeError>,
}

impl ProbeOutcome {
    pub fn good() -> Self {
        Self { result: CheckResult::Good, cause: None }
    }

    pub fn bad(cause: ProbeError) -> Self {
        Self { result: CheckResult::Bad, cause: Some(cause) }
    }

    pub fn error(cause: ProbeError) -> Self {
        Self { result: CheckResult::Error, cause: Some(cause) }
    }
}

/// Hard-state message sent from a check runner to its node.
///
/// Emitted edge-triggered: once on recovery, once per failure run when the
/// failure counter first reaches the configured maximum.
#[derive(Debug, Clone, Copy)]
pub struct CheckEvent {
    /// Stable index of the check within its node.
    pub check_idx: usize,
    /// Good on recovery, Bad on reaching the failure threshold.
    pub result: CheckResult,
}
