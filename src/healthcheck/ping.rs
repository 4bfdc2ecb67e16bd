//! ICMP reachability check.
//!
//! Spawns the system `ping` utility for a single echo request rather than
//! opening a raw socket, which would require extra privileges.

use std::net::IpAddr;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::healthcheck::result::{ProbeError, ProbeOutcome};

#[derive(Debug, Clone)]
pub struct PingProbe {
    target: IpAddr,
    timeout: Duration,
}

impl PingProbe {
    pub fn new(target: IpAddr, timeout: Duration) -> Self {
        Self { target, timeout }
    }

    pub async fn run(&self) -> ProbeOutcome {
        // ping -W takes whole seconds; the runner additionally bounds the
        // attempt with the configured timeout.
        let wait_secs = self.timeout.as_secs().max(1);

        let output = Command::new("ping")
            .arg("-c")
            .arg("1")
            .arg("-W")
            .arg(wait_secs.to_string())
            .arg(self.target.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => ProbeOutcome::good(),
            Ok(out) => ProbeOutcome::bad(ProbeError::ExitCode(out.status.code().unwrap_or(-1))),
            Err(e) => ProbeOutcome::error(ProbeError::Exec(e.to_string())),
        }
    }
}
