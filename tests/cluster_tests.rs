//! Multi-node cluster scenario: three nodes form a mesh, elect the lowest
//! node ID as leader, and re-elect after the leader goes silent.
//!
//! Each node gets its own dedicated multi-thread runtime so a hard failure
//! can be simulated by shutting that runtime down, killing its listener and
//! background loops outright rather than going through the graceful `leave`
//! path.

#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use orbit_rt::{ClusterConfig, ClusterManager};
use orbit_rt::util::NodeId;

const N1_PORT: u16 = 28946;
const N2_PORT: u16 = 28947;
const N3_PORT: u16 = 28948;

fn config(node_id: u64, port: u16, seeds: Vec<String>) -> ClusterConfig {
    ClusterConfig::builder()
        .with_node_id(NodeId::new(node_id))
        .with_bind("127.0.0.1", port)
        .with_seed_nodes(seeds)
        .with_heartbeat_interval(Duration::from_millis(30))
        .with_suspicion(Duration::from_millis(80), 2)
        .build()
        .unwrap()
}

fn wait_until(mut predicate: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    predicate()
}

#[test]
fn failure_detected_leader_change() {
    let rt1 = tokio::runtime::Runtime::new().unwrap();
    let rt2 = tokio::runtime::Runtime::new().unwrap();
    let rt3 = tokio::runtime::Runtime::new().unwrap();

    let n1 = ClusterManager::new(config(1, N1_PORT, Vec::new()));
    let n2 = ClusterManager::new(config(2, N2_PORT, vec![format!("127.0.0.1:{N1_PORT}")]));
    let n3 = ClusterManager::new(config(
        3,
        N3_PORT,
        vec![format!("127.0.0.1:{N1_PORT}"), format!("127.0.0.1:{N2_PORT}")],
    ));

    rt1.block_on(n1.start()).unwrap();
    rt2.block_on(n2.start()).unwrap();
    rt3.block_on(n3.start()).unwrap();

    let mesh_formed = wait_until(
        || n2.health().total_nodes == 3 && n3.health().total_nodes == 3,
        Duration::from_secs(2),
    );
    assert!(mesh_formed, "nodes did not discover each other in time");

    assert_eq!(n1.health().leader_id, Some(NodeId::new(1)));
    assert_eq!(n2.health().leader_id, Some(NodeId::new(1)));
    assert_eq!(n3.health().leader_id, Some(NodeId::new(1)));

    // Hard failure: tear down N1's runtime without a graceful leave, so N2
    // and N3 must notice via missed heartbeats rather than a Leave message.
    rt1.shutdown_background();

    let reelected = wait_until(
        || n2.health().leader_id == Some(NodeId::new(2)) && n3.health().leader_id == Some(NodeId::new(2)),
        Duration::from_secs(3),
    );
    assert!(reelected, "surviving nodes did not converge on the new leader");

    assert_eq!(n2.health().failed_nodes, 1);
    assert_eq!(n3.health().failed_nodes, 1);

    rt2.block_on(n2.leave());
    rt3.block_on(n3.leave());
}

const CHAIN_N1_PORT: u16 = 28949;
const CHAIN_N2_PORT: u16 = 28950;
const CHAIN_N3_PORT: u16 = 28951;

#[test]
fn transitive_gossip_via_seed_snapshot() {
    let rt1 = tokio::runtime::Runtime::new().unwrap();
    let rt2 = tokio::runtime::Runtime::new().unwrap();
    let rt3 = tokio::runtime::Runtime::new().unwrap();

    let n1 = ClusterManager::new(config(1, CHAIN_N1_PORT, Vec::new()));
    let n2 = ClusterManager::new(config(2, CHAIN_N2_PORT, vec![format!("127.0.0.1:{CHAIN_N1_PORT}")]));
    // N3 never dials N1 directly; it can only learn about node 1 through
    // the membership snapshot N2 carries in its join reply.
    let n3 = ClusterManager::new(config(3, CHAIN_N3_PORT, vec![format!("127.0.0.1:{CHAIN_N2_PORT}")]));

    rt1.block_on(n1.start()).unwrap();
    rt2.block_on(n2.start()).unwrap();

    let n2_knows_n1 = wait_until(|| n2.health().total_nodes == 2, Duration::from_secs(2));
    assert!(n2_knows_n1, "N2 did not learn about N1 before N3 joined");

    rt3.block_on(n3.start()).unwrap();

    let n3_learned_transitively = wait_until(
        || n3.health().total_nodes == 3 && n3.health().leader_id == Some(NodeId::new(1)),
        Duration::from_secs(2),
    );
    assert!(
        n3_learned_transitively,
        "N3 did not discover N1 through N2's join-snapshot gossip"
    );

    rt1.block_on(n1.leave());
    rt2.block_on(n2.leave());
    rt3.block_on(n3.leave());
}
