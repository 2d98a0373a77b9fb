//! Integration test: a boost task from request to cleanup
//!
//! A room with two carriers and an empty set of labs receives a boost task
//! for two substances. The carriers load the borrowed labs from the
//! terminal, top them up with energy, an agent walks over and is boosted,
//! and finishing the task returns every unused unit to the terminal.

use depot_core::config::Settings;
use depot_core::id::{AgentId, ResourceType};
use depot_core::node::Position;
use depot_core::registry::Registry;
use depot_core::sim::SimWorld;
use depot_core::test_utils::*;
use depot_core::world::WorldView;
use depot_lab::roles::LabRole;
use depot_lab::{BoostSpec, BoostState};
use depot_room::Colony;
use depot_transport::carrier::CarrierMemory;
use depot_transport::job::{JobId, JobKind};
use std::collections::BTreeSet;

const STOCK: u32 = 3000;

fn settings() -> Settings {
    let mut settings = Settings::default();
    // Keep storage energy out of the nuker and power spawn.
    settings.transport.energy_reserve = u32::MAX;
    settings
}

fn prepared() -> (SimWorld, RoomLayout, Colony, Vec<AgentId>) {
    let (mut world, layout) = standard_world();
    fill(&mut world, layout.storage, energy(), 200_000);
    fill(&mut world, layout.spawn, energy(), 300);
    for ext in layout.extensions.clone() {
        fill(&mut world, ext, energy(), 50);
    }
    for tower in layout.towers.clone() {
        fill(&mut world, tower, energy(), 1000);
    }
    fill(&mut world, layout.terminal, res("XGH2O"), STOCK);
    fill(&mut world, layout.terminal, res("XLHO2"), STOCK);

    let mut colony = Colony::new(settings(), Registry::standard()).unwrap();
    let room = colony.add_room(layout.room.clone()).unwrap();
    let mut carriers = Vec::new();
    for x in [24, 26] {
        let carrier = spawn_carrier(&mut world, &layout.room, Position::new(x, 24));
        room.add_carrier(carrier, CarrierMemory::default());
        carriers.push(carrier);
    }
    (world, layout, colony, carriers)
}

/// Every unit of `resource` in the room, wherever it sits.
fn total(world: &SimWorld, layout: &RoomLayout, carriers: &[AgentId], resource: ResourceType) -> u32 {
    let nodes: u32 = [layout.storage, layout.terminal]
        .iter()
        .chain(&layout.labs)
        .filter_map(|id| world.node(*id))
        .map(|n| n.store.used(resource))
        .sum();
    let carried: u32 = carriers
        .iter()
        .filter_map(|id| world.agent(*id))
        .map(|a| a.store.used(resource))
        .sum();
    nodes + carried + world.dropped(&layout.room, resource)
}

#[test]
fn boost_task_end_to_end() {
    let (mut world, layout, mut colony, carriers) = prepared();
    let specs = [
        BoostSpec::new(res("XGH2O"), 400),
        BoostSpec::new(res("XLHO2"), 400),
    ];
    let task = colony
        .room_mut(&layout.room)
        .unwrap()
        .lab_mut()
        .add_boost_task(&specs)
        .unwrap();

    // -- Preparation: GetLab -> GetResource -> GetEnergy -> WaitBoost -------
    let mut states = vec![BoostState::GetLab];
    let mut lab_in_jobs: BTreeSet<JobId> = BTreeSet::new();
    for _ in 0..500 {
        colony.step(&mut world);
        let room = colony.room(&layout.room).unwrap();
        let queue = room.queue();
        if let Some((id, _)) = queue.find(JobKind::LabIn) {
            lab_in_jobs.insert(id);
        }
        let energy_jobs = queue
            .jobs()
            .filter(|q| q.job.kind() == JobKind::BoostGetEnergy)
            .count();
        assert!(energy_jobs <= 1);

        let state = room.lab().boost_state(task).unwrap();
        if states.last() != Some(&state) {
            states.push(state);
        }
        world.advance();
        if state == BoostState::WaitBoost {
            break;
        }
    }
    assert_eq!(
        states,
        vec![
            BoostState::GetLab,
            BoostState::GetResource,
            BoostState::GetEnergy,
            BoostState::WaitBoost,
        ]
    );
    assert_eq!(lab_in_jobs.len(), 1);

    let room = colony.room(&layout.room).unwrap();
    assert_eq!(room.lab().roles().count(LabRole::Boost), 2);
    let slots = room.lab().boost_task(task).unwrap().slots.clone();
    let boost_labs: Vec<_> = slots.iter().filter_map(|s| s.lab).collect();
    for slot in &slots {
        let store = &world.node(slot.lab.unwrap()).unwrap().store;
        assert_eq!(store.used(slot.resource), slot.amount);
        assert!(store.used(energy()) >= 1000);
    }

    // -- Boosting -----------------------------------------------------------
    let settings = colony.settings().clone();
    let unit = spawn_unit(&mut world, &layout.room, Position::new(30, 20));
    let mut done = false;
    for _ in 0..50 {
        let room = colony.room_mut(&layout.room).unwrap();
        done = room.boost_agent(&mut world, unit, task, &settings);
        if done {
            break;
        }
        colony.step(&mut world);
        world.advance();
    }
    assert!(done);
    let boosts = &world.agent(unit).unwrap().boosts;
    assert!(boosts.contains(&res("XGH2O")));
    assert!(boosts.contains(&res("XLHO2")));

    // -- Cleanup ------------------------------------------------------------
    colony
        .room_mut(&layout.room)
        .unwrap()
        .lab_mut()
        .finish_boost(task)
        .unwrap();
    for _ in 0..500 {
        colony.step(&mut world);
        world.advance();
        let room = colony.room(&layout.room).unwrap();
        if room.lab().boost_state(task).is_none() && room.queue().is_empty() {
            break;
        }
    }
    let room = colony.room(&layout.room).unwrap();
    assert_eq!(room.lab().boost_state(task), None);
    assert_eq!(room.lab().roles().count(LabRole::Boost), 0);
    for lab in &boost_labs {
        assert_eq!(world.node(*lab).unwrap().store.mineral_type(), None);
    }
    // Each boost used exactly one dose of each substance.
    for spec in &specs {
        assert_eq!(
            total(&world, &layout, &carriers, spec.resource),
            STOCK - depot_core::sim::BOOST_MINERAL_COST
        );
    }
}

#[test]
fn cancelled_task_returns_everything() {
    let (mut world, layout, mut colony, carriers) = prepared();
    let task = colony
        .room_mut(&layout.room)
        .unwrap()
        .lab_mut()
        .add_boost_task(&[BoostSpec::new(res("XGH2O"), 300)])
        .unwrap();

    // Cancel while the substance is still being carried in.
    for _ in 0..300 {
        colony.step(&mut world);
        world.advance();
        let loaded = colony
            .room(&layout.room)
            .unwrap()
            .lab()
            .boost_task(task)
            .and_then(|t| t.slots[0].lab)
            .is_some_and(|lab| world.node(lab).unwrap().store.used(res("XGH2O")) > 0);
        if loaded {
            break;
        }
    }
    let lab = colony
        .room(&layout.room)
        .unwrap()
        .lab()
        .boost_task(task)
        .and_then(|t| t.slots[0].lab)
        .unwrap();
    colony
        .room_mut(&layout.room)
        .unwrap()
        .remove_boost_task(&world, task)
        .unwrap();

    for _ in 0..300 {
        colony.step(&mut world);
        world.advance();
        if colony.room(&layout.room).unwrap().queue().is_empty() {
            break;
        }
    }

    let room = colony.room(&layout.room).unwrap();
    assert!(room.queue().is_empty());
    assert_eq!(room.lab().roles().role(lab), Some(LabRole::Reaction));
    assert_eq!(world.node(lab).unwrap().store.mineral_type(), None);
    assert_eq!(total(&world, &layout, &carriers, res("XGH2O")), STOCK);
}
