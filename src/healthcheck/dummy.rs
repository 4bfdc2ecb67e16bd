//! Dummy check returning a fixed result.
//!
//! Used as the always-Good fallback for nodes without configured checks and
//! for policy-only pools.

use crate::healthcheck::result::{CheckResult, ProbeOutcome};

#[derive(Debug, Clone)]
pub struct DummyProbe {
    result: CheckResult,
}

impl DummyProbe {
    pub fn new(result: CheckResult) -> Self {
        Self { result }
    }

    /// The fallback check for nodes with no configured checks.
    pub fn always_good() -> Self {
        Self { result: CheckResult::Good }
    }

    pub async fn run(&self) -> ProbeOutcome {
        ProbeOutcome { result: self.result, cause: None }
    }
}
