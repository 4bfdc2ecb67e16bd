//! Full-stack tests: checks, nodes, pool policy and reconciler running as
//! real tasks against mock backends.

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time;

use pfguard::config::schema::{CheckConfig, DegradeAction, NodeConfig, PoolConfig};
use pfguard::lbpool::Pool;
use pfguard::lifecycle::Shutdown;
use pfguard::pfctl::{Reconciler, TableBackend};

mod common;
use common::MockTable;

fn dummy_check() -> CheckConfig {
    CheckConfig { kind: "dummy".into(), interval: 0, ..CheckConfig::default() }
}

fn node(name: &str, ip: &str) -> NodeConfig {
    NodeConfig {
        name: name.into(),
        ip4: Some(ip.parse().unwrap()),
        ip6: None,
        backup: false,
        healthchecks: None,
    }
}

fn build_pool(cfg: &PoolConfig) -> Arc<Pool> {
    let mut pools = Pool::from_config(cfg);
    assert_eq!(pools.len(), 1);
    pools.remove(0)
}

/// Poll until the table matches the expected membership or the deadline
/// passes.
async fn wait_for_members(table: &MockTable, name: &str, expected: &HashSet<IpAddr>) {
    for _ in 0..200 {
        if &table.members(name) == expected {
            return;
        }
        time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "table {} never reached {:?}, last state {:?}",
        name,
        expected,
        table.members(name)
    );
}

async fn drain(shutdown: Shutdown, mut tasks: JoinSet<()>) {
    shutdown.trigger();
    while tasks.join_next().await.is_some() {}
}

#[tokio::test]
async fn max_cap_rules_when_enough_nodes_are_healthy() {
    // min_nodes=2, max_nodes=1, three always-good nodes: the cap wins and
    // exactly one node, first in configuration order, serves.
    let cfg = PoolConfig {
        name: "www".into(),
        ip4: Some("192.0.2.10".parse().unwrap()),
        ip6: None,
        pf_name: "www_pool".into(),
        min_nodes: 2,
        max_nodes: 1,
        min_nodes_action: DegradeAction::ForceUp,
        healthchecks: vec![dummy_check()],
        nodes: vec![
            node("x", "10.0.0.1"),
            node("y", "10.0.0.2"),
            node("z", "10.0.0.3"),
        ],
    };

    let table = Arc::new(MockTable::new());
    let pool = build_pool(&cfg);

    let shutdown = Shutdown::new();
    let mut tasks = JoinSet::new();
    pool.spawn(&mut tasks, &shutdown);
    let reconciler = Reconciler::new(vec![pool], table.clone() as Arc<dyn TableBackend>);
    tasks.spawn(reconciler.run(shutdown.subscribe()));

    let expected: HashSet<IpAddr> = ["10.0.0.1".parse().unwrap()].into();
    wait_for_members(&table, "www_pool_4", &expected).await;

    drain(shutdown, tasks).await;
}

#[tokio::test]
async fn http_backend_failure_drains_the_table() {
    // One node probed over HTTP. The backend answers 200 first, then
    // flips to 503; with ForceDown the table must drain.
    let backend_addr: SocketAddr = "127.0.0.1:29181".parse().unwrap();
    let status = Arc::new(AtomicU16::new(200));
    let status_for_backend = status.clone();
    common::start_status_backend(backend_addr, move || {
        let status = status_for_backend.clone();
        async move { status.load(Ordering::SeqCst) }
    })
    .await;

    let cfg = PoolConfig {
        name: "api".into(),
        ip4: Some("192.0.2.20".parse().unwrap()),
        ip6: None,
        pf_name: "api_pool".into(),
        min_nodes: 1,
        max_nodes: 0,
        min_nodes_action: DegradeAction::ForceDown,
        healthchecks: vec![CheckConfig {
            kind: "http".into(),
            interval: 0,
            timeout: 1000,
            max_failed: 1,
            url: Some("/health".into()),
            port: Some(backend_addr.port()),
            ..CheckConfig::default()
        }],
        nodes: vec![node("api1", "127.0.0.1")],
    };

    let table = Arc::new(MockTable::new());
    let pool = build_pool(&cfg);

    let shutdown = Shutdown::new();
    let mut tasks = JoinSet::new();
    pool.spawn(&mut tasks, &shutdown);
    let reconciler = Reconciler::new(vec![pool], table.clone() as Arc<dyn TableBackend>);
    tasks.spawn(reconciler.run(shutdown.subscribe()));

    // Healthy backend: the node enters the table.
    let up: HashSet<IpAddr> = ["127.0.0.1".parse().unwrap()].into();
    wait_for_members(&table, "api_pool_4", &up).await;

    // Backend degrades: max_failed=1 marks the check Bad on the next
    // probe, ForceDown empties the wanted set, the table drains.
    status.store(503, Ordering::SeqCst);
    wait_for_members(&table, "api_pool_4", &HashSet::new()).await;

    drain(shutdown, tasks).await;
}

#[tokio::test]
async fn shutdown_drains_every_task() {
    let cfg = PoolConfig {
        name: "www".into(),
        ip4: Some("192.0.2.10".parse().unwrap()),
        ip6: None,
        pf_name: "www_pool".into(),
        min_nodes: 0,
        max_nodes: 0,
        min_nodes_action: DegradeAction::ForceUp,
        healthchecks: vec![dummy_check()],
        nodes: vec![node("x", "10.0.0.1"), node("y", "10.0.0.2")],
    };

    let table = Arc::new(MockTable::new());
    let pool = build_pool(&cfg);

    let shutdown = Shutdown::new();
    let mut tasks = JoinSet::new();
    pool.spawn(&mut tasks, &shutdown);
    let reconciler = Reconciler::new(vec![pool], table.clone() as Arc<dyn TableBackend>);
    tasks.spawn(reconciler.run(shutdown.subscribe()));

    // 2 nodes * (1 check + 1 node task) + reconciler.
    assert_eq!(tasks.len(), 5);

    shutdown.trigger();
    let drained = time::timeout(Duration::from_secs(5), async {
        while tasks.join_next().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok(), "tasks did not drain after shutdown");
}
