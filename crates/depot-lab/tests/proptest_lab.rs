//! Property-based tests for lab roles, batch arithmetic and boost lab
//! assignment.

use depot_core::config::Settings;
use depot_core::id::NodeId;
use depot_core::test_utils::*;
use depot_lab::reaction::{achievable_amount, batch_size};
use depot_lab::roles::{LabRole, LabRoles};
use depot_lab::{BoostSpec, BoostTaskId, LabController};
use depot_transport::queue::TransportQueue;
use proptest::prelude::*;
use slotmap::SlotMap;
use std::collections::HashSet;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
enum LabOp {
    AddTask(usize),
    Finish(usize),
    Remove(usize),
    Tick,
}

fn arb_ops(max_ops: usize) -> impl Strategy<Value = Vec<LabOp>> {
    proptest::collection::vec(
        prop_oneof![
            (1..=4usize).prop_map(LabOp::AddTask),
            (0..4usize).prop_map(LabOp::Finish),
            (0..4usize).prop_map(LabOp::Remove),
            Just(LabOp::Tick),
            Just(LabOp::Tick),
        ],
        1..=max_ops,
    )
}

const BOOSTS: [&str; 4] = ["UH", "KO", "GH", "XGH2O"];

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn roles_are_exclusive(
        n in 2..12usize,
        boost in proptest::collection::vec(0..12usize, 0..6),
        base in (0..12usize, 0..12usize),
    ) {
        let mut sm = SlotMap::<NodeId, ()>::with_key();
        let labs: Vec<NodeId> = (0..n).map(|_| sm.insert(())).collect();
        let extra = sm.insert(());
        let pick = |i: usize| labs.get(i).copied().unwrap_or(extra);
        let boost_labs: Vec<NodeId> = boost.iter().map(|i| pick(*i)).collect();
        let roles = LabRoles::derive(&labs, boost_labs.iter().copied(), Some([pick(base.0), pick(base.1)]));

        prop_assert_eq!(roles.len(), n);
        let reacting: HashSet<NodeId> = roles.with_role(LabRole::Reaction).into_iter().collect();
        for lab in &boost_labs {
            prop_assert!(!reacting.contains(lab));
            if labs.contains(lab) {
                prop_assert_eq!(roles.role(*lab), Some(LabRole::Boost));
            }
        }
        prop_assert!(roles.count(LabRole::Base) <= 2);
    }

    #[test]
    fn batch_respects_every_limit(
        a in 0..10_000u32,
        b in 0..10_000u32,
        granularity in 1..20u32,
        max_batch in 1..5_000u32,
        shortfall in 1..5_000u32,
    ) {
        let achievable = achievable_amount([a, b], granularity);
        prop_assert_eq!(achievable % granularity, 0);
        prop_assert!(achievable <= a.min(b));
        prop_assert!(a.min(b) - achievable < granularity);

        let batch = batch_size(max_batch, achievable, shortfall);
        prop_assert!(batch <= max_batch && batch <= achievable && batch <= shortfall);
    }

    /// However tasks come and go, no lab serves two tasks and every lab a
    /// task holds is marked as boosting.
    #[test]
    fn boost_labs_never_shared(ops in arb_ops(40)) {
        let (mut world, layout) = standard_world();
        let settings = Settings::default();
        let mut lab = LabController::new(layout.room.clone(), &settings.lab, world.registry()).unwrap();
        lab.set_base_labs(&world, layout.labs[0], layout.labs[1]).unwrap();
        let mut queue = TransportQueue::new();
        let mut tasks: Vec<BoostTaskId> = Vec::new();
        let mut tick = 0;

        for op in ops {
            match op {
                LabOp::AddTask(n) => {
                    let specs: Vec<BoostSpec> =
                        BOOSTS[..n].iter().map(|r| BoostSpec::new(res(r), 90)).collect();
                    tasks.push(lab.add_boost_task(&specs).unwrap());
                }
                LabOp::Finish(i) => {
                    if let Some(id) = tasks.get(i) {
                        let _ = lab.finish_boost(*id);
                    }
                }
                LabOp::Remove(i) => {
                    if i < tasks.len() {
                        let id = tasks.remove(i);
                        let _ = lab.remove_boost_task(&world, &mut queue, id);
                    }
                }
                LabOp::Tick => {
                    tick += 10;
                    world.set_tick(tick);
                    lab.run(&mut world, &mut queue, &settings);
                    // Carriers are instant here: every job is done at once.
                    let done: Vec<_> = queue.jobs().map(|q| q.id).collect();
                    for id in done {
                        queue.remove(id);
                    }
                }
            }

            let mut seen = HashSet::new();
            for id in &tasks {
                if let Some(task) = lab.boost_task(*id) {
                    for held in task.labs() {
                        prop_assert!(seen.insert(held), "lab shared between tasks");
                        prop_assert_eq!(lab.roles().role(held), Some(LabRole::Boost));
                    }
                }
            }
            prop_assert_eq!(lab.roles().count(LabRole::Boost), seen.len());
        }
    }
}
