//! Shared utilities for integration testing.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use pfguard::pfctl::{TableBackend, TableError};

/// One recorded call against the mock table backend.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum TableOp {
    List(String),
    Add(String, Vec<IpAddr>),
    Remove(String, Vec<IpAddr>),
}

/// In-memory pf table with a call log and injectable list failures.
#[derive(Default)]
pub struct MockTable {
    state: Mutex<HashMap<String, HashSet<IpAddr>>>,
    ops: Mutex<Vec<TableOp>>,
    fail_lists: Mutex<u32>,
}

#[allow(dead_code)]
impl MockTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, table: &str, addrs: &[&str]) {
        let set = addrs.iter().map(|a| a.parse().unwrap()).collect();
        self.state.lock().unwrap().insert(table.to_string(), set);
    }

    /// Make the next `n` list calls fail.
    pub fn fail_next_lists(&self, n: u32) {
        *self.fail_lists.lock().unwrap() = n;
    }

    pub fn members(&self, table: &str) -> HashSet<IpAddr> {
        self.state.lock().unwrap().get(table).cloned().unwrap_or_default()
    }

    pub fn ops(&self) -> Vec<TableOp> {
        self.ops.lock().unwrap().clone()
    }
}

#[async_trait]
impl TableBackend for MockTable {
    async fn list(&self, table: &str) -> Result<HashSet<IpAddr>, TableError> {
        self.ops.lock().unwrap().push(TableOp::List(table.to_string()));
        {
            let mut failures = self.fail_lists.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(TableError::Tool("injected failure".into()));
            }
        }
        Ok(self.members(table))
    }

    async fn add(&self, table: &str, addrs: &[IpAddr]) -> Result<(), TableError> {
        self.ops.lock().unwrap().push(TableOp::Add(table.to_string(), addrs.to_vec()));
        let mut state = self.state.lock().unwrap();
        state.entry(table.to_string()).or_default().extend(addrs.iter().copied());
        Ok(())
    }

    async fn remove(&self, table: &str, addrs: &[IpAddr]) -> Result<(), TableError> {
        self.ops.lock().unwrap().push(TableOp::Remove(table.to_string(), addrs.to_vec()));
        let mut state = self.state.lock().unwrap();
        if let Some(set) = state.get_mut(table) {
            for addr in addrs {
                set.remove(addr);
            }
        }
        Ok(())
    }
}

/// Start a mock backend answering every request with the status produced by
/// the closure.
#[allow(dead_code)]
pub async fn start_status_backend<F, Fut>(addr: SocketAddr, status: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = u16> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let status = std::sync::Arc::new(status);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let status = status.clone();
                    tokio::spawn(async move {
                        let code = status().await;
                        let reason = match code {
                            200 => "OK",
                            301 => "Moved Permanently",
                            503 => "Service Unavailable",
                            _ => "Unknown",
                        };
                        let response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                            code, reason
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}
