//! pf table control.
//!
//! The packet filter is a black box reached through its control utility;
//! everything the core needs is listing a table and adding or removing
//! members. The trait seam keeps the reconciler testable without a pf.

use std::collections::HashSet;
use std::net::IpAddr;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum TableError {
    /// The control utility ran but failed; carries its combined output.
    #[error("pfctl: {0}")]
    Tool(String),

    /// The control utility could not be started at all.
    #[error("failed to run pfctl: {0}")]
    Exec(String),
}

/// Membership operations on one named pf table.
#[async_trait]
pub trait TableBackend: Send + Sync {
    async fn list(&self, table: &str) -> Result<HashSet<IpAddr>, TableError>;
    async fn add(&self, table: &str, addrs: &[IpAddr]) -> Result<(), TableError>;
    async fn remove(&self, table: &str, addrs: &[IpAddr]) -> Result<(), TableError>;
}

/// The real thing: shells out to the pfctl binary.
pub struct PfctlTable {
    pfctl_path: PathBuf,
    /// With dry-run on, mutations are logged and not executed.
    dry_run: bool,
}

impl PfctlTable {
    pub fn new(dry_run: bool) -> Self {
        Self { pfctl_path: PathBuf::from("/sbin/pfctl"), dry_run }
    }

    async fn run(&self, args: &[String]) -> Result<String, TableError> {
        let output = Command::new(&self.pfctl_path)
            .args(args)
            .output()
            .await
            .map_err(|e| TableError::Exec(e.to_string()))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(combined)
        } else {
            Err(TableError::Tool(combined))
        }
    }

    async fn change(&self, verb: &str, table: &str, addrs: &[IpAddr]) -> Result<(), TableError> {
        if self.dry_run {
            tracing::info!(table, verb, addrs = ?addrs, "dry-run: pfctl call suppressed");
            return Ok(());
        }

        let mut args = vec!["-t".to_string(), table.to_string(), "-T".to_string(), verb.to_string()];
        args.extend(addrs.iter().map(|a| a.to_string()));
        self.run(&args).await?;
        Ok(())
    }
}

#[async_trait]
impl TableBackend for PfctlTable {
    async fn list(&self, table: &str) -> Result<HashSet<IpAddr>, TableError> {
        let out = self
            .run(&["-t".to_string(), table.to_string(), "-Ts".to_string()])
            .await?;
        Ok(parse_table_listing(&out))
    }

    async fn add(&self, table: &str, addrs: &[IpAddr]) -> Result<(), TableError> {
        self.change("add", table, addrs).await
    }

    async fn remove(&self, table: &str, addrs: &[IpAddr]) -> Result<(), TableError> {
        self.change("delete", table, addrs).await
    }
}

/// Parse `pfctl -t <name> -Ts` output: one address per line, indented.
fn parse_table_listing(out: &str) -> HashSet<IpAddr> {
    out.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            match line.parse() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    tracing::debug!(line, "ignoring unparseable table entry");
                    None
                }
            }
        })
        .collect()
}
