//! External script check.
//!
//! Runs a configured command through the shell; exit code 0 counts as Good.

use std::process::Stdio;

use tokio::process::Command;

use crate::healthcheck::result::{ProbeError, ProbeOutcome};

#[derive(Debug, Clone)]
pub struct ScriptProbe {
    command: String,
}

impl ScriptProbe {
    pub fn new(command: String) -> Self {
        Self { command }
    }

    pub async fn run(&self) -> ProbeOutcome {
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
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
