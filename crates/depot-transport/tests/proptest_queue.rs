//! Property-based tests for the transport queue and batch sizing.

use depot_core::id::{AgentId, NodeId, ResourceType};
use depot_transport::actions::batch_amount;
use depot_transport::job::{Job, JobKind, LabResource};
use depot_transport::queue::TransportQueue;
use proptest::prelude::*;
use slotmap::SlotMap;
use std::collections::HashSet;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
enum QueueOp {
    Add(u8, usize),
    RemoveKind(u8),
    Assign(usize),
}

fn arb_ops(max_ops: usize) -> impl Strategy<Value = Vec<QueueOp>> {
    proptest::collection::vec(
        prop_oneof![
            (0..9u8, 0..4usize).prop_map(|(k, n)| QueueOp::Add(k, n)),
            (0..9u8).prop_map(QueueOp::RemoveKind),
            (0..4usize).prop_map(QueueOp::Assign),
        ],
        1..=max_ops,
    )
}

fn make_job(kind: u8, node: NodeId) -> Job {
    let r = ResourceType(1);
    match kind {
        0 => Job::FillExtension,
        1 => Job::FillTower { tower: node },
        2 => Job::FillNuker {
            nuker: node,
            resource: r,
        },
        3 => Job::FillPowerSpawn {
            power_spawn: node,
            resource: r,
        },
        4 => Job::LabIn {
            resources: vec![LabResource {
                lab: node,
                resource: r,
                amount: 100,
            }],
        },
        5 => Job::LabOut { labs: vec![node] },
        6 => Job::BoostGetResource {
            resources: vec![LabResource {
                lab: node,
                resource: r,
                amount: 900,
            }],
        },
        7 => Job::BoostGetEnergy { labs: vec![node] },
        _ => Job::BoostClear { labs: vec![node] },
    }
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// No two pending jobs ever share a key, and every assignment points at
    /// a pending job.
    #[test]
    fn queue_keys_stay_unique(ops in arb_ops(60)) {
        let mut nodes = SlotMap::<NodeId, ()>::with_key();
        let node_ids: Vec<NodeId> = (0..4).map(|_| nodes.insert(())).collect();
        let mut agents = SlotMap::<AgentId, ()>::with_key();
        let agent_ids: Vec<AgentId> = (0..4).map(|_| agents.insert(())).collect();
        let mut queue = TransportQueue::new();

        for op in ops {
            match op {
                QueueOp::Add(k, n) => {
                    let job = make_job(k, node_ids[n]);
                    let kind = job.kind();
                    let before = queue.len();
                    let id = queue.add(job.clone());
                    prop_assert!(queue.has_pending(kind));
                    prop_assert!(queue.len() <= before + 1);
                    // Publishing again is a no-op.
                    prop_assert_eq!(queue.add(job), id);
                }
                QueueOp::RemoveKind(k) => {
                    let kind = make_job(k, node_ids[0]).kind();
                    while let Some((id, _)) = queue.find(kind) {
                        prop_assert!(queue.remove(id).is_some());
                    }
                    prop_assert!(!queue.has_pending(kind));
                }
                QueueOp::Assign(a) => {
                    if let Some(id) = queue.assign(agent_ids[a]) {
                        prop_assert!(queue.get(id).is_some());
                    } else {
                        prop_assert!(queue.is_empty());
                    }
                }
            }

            let keys: Vec<_> = queue.jobs().map(|q| q.job.key()).collect();
            let unique: HashSet<_> = keys.iter().copied().collect();
            prop_assert_eq!(keys.len(), unique.len());
            for agent in &agent_ids {
                if let Some(id) = queue.assigned(*agent) {
                    prop_assert!(queue.get(id).is_some());
                }
            }
        }
    }

    /// Assignment always picks a job of the highest pending priority.
    #[test]
    fn assignment_takes_highest_priority(kinds in proptest::collection::vec(0..9u8, 1..9)) {
        let mut nodes = SlotMap::<NodeId, ()>::with_key();
        let node = nodes.insert(());
        let mut agents = SlotMap::<AgentId, ()>::with_key();
        let agent = agents.insert(());
        let mut queue = TransportQueue::new();
        for k in &kinds {
            queue.add(make_job(*k, node));
        }
        let best = queue.jobs().map(|q| q.job.kind().priority()).max();
        let id = queue.assign(agent).unwrap();
        let kind: JobKind = queue.get(id).unwrap().kind();
        prop_assert_eq!(Some(kind.priority()), best);
    }

    #[test]
    fn batch_amount_is_minimum_or_abandoned(
        carrier in 0..200u32,
        source in 0..200u32,
        dest in 0..200u32,
    ) {
        let min = carrier.min(source).min(dest);
        match batch_amount(carrier, source, dest) {
            Some(amount) => {
                prop_assert_eq!(amount, min);
                prop_assert!(amount > 0);
            }
            None => prop_assert_eq!(min, 0),
        }
    }
}
