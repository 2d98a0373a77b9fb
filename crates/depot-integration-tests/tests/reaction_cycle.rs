//! Integration test: one full reaction cycle
//!
//! The room wants 500 OH and holds 1000 each of H and O in the terminal.
//! A single carrier loads the base labs, the reaction labs run until the
//! inputs are used up, and the product is carried back to the terminal.

use depot_core::config::{ReactionTarget, Settings};
use depot_core::node::Position;
use depot_core::registry::Registry;
use depot_core::sim::SimWorld;
use depot_core::test_utils::*;
use depot_core::world::WorldView;
use depot_lab::reaction::ReactionState;
use depot_room::Colony;
use depot_transport::carrier::CarrierMemory;

fn prepared(h: u32, o: u32) -> (SimWorld, RoomLayout, Colony) {
    let (mut world, layout) = standard_world();
    fill(&mut world, layout.storage, energy(), 100_000);
    fill(&mut world, layout.spawn, energy(), 300);
    for ext in layout.extensions.clone() {
        fill(&mut world, ext, energy(), 50);
    }
    for tower in layout.towers.clone() {
        fill(&mut world, tower, energy(), 1000);
    }
    fill(&mut world, layout.terminal, res("H"), h);
    fill(&mut world, layout.terminal, res("O"), o);

    let mut settings = Settings::default();
    settings.transport.energy_reserve = u32::MAX;
    settings.lab.targets = vec![ReactionTarget::new("OH", 500)];
    let mut colony = Colony::new(settings, Registry::standard()).unwrap();
    let room = colony.add_room(layout.room.clone()).unwrap();
    room.lab_mut()
        .set_base_labs(&world, layout.labs[0], layout.labs[1])
        .unwrap();
    let carrier = spawn_carrier(&mut world, &layout.room, Position::new(24, 24));
    room.add_carrier(carrier, CarrierMemory::default());
    (world, layout, colony)
}

#[test]
fn product_reaches_terminal() {
    let (mut world, layout, mut colony) = prepared(1000, 1000);

    let mut seen = Vec::new();
    for _ in 0..1000 {
        colony.step(&mut world);
        world.advance();
        let state = colony.room(&layout.room).unwrap().lab().status().state;
        if seen.last() != Some(&state) {
            seen.push(state);
        }
        let terminal = &world.node(layout.terminal).unwrap().store;
        if terminal.used(res("OH")) == 500 && state == ReactionState::GetTarget {
            break;
        }
    }

    assert_eq!(
        seen,
        vec![
            ReactionState::GetResource,
            ReactionState::Working,
            ReactionState::PutResource,
            ReactionState::GetTarget,
        ]
    );
    let terminal = &world.node(layout.terminal).unwrap().store;
    assert_eq!(terminal.used(res("OH")), 500);
    assert_eq!(terminal.used(res("H")), 500);
    assert_eq!(terminal.used(res("O")), 500);
    for lab in &layout.labs {
        assert_eq!(world.node(*lab).unwrap().store.mineral_type(), None);
    }

    // The target is met, so the next scan publishes nothing.
    for _ in 0..30 {
        colony.step(&mut world);
        world.advance();
    }
    let room = colony.room(&layout.room).unwrap();
    assert!(room.queue().is_empty());
    assert_eq!(room.lab().status().state, ReactionState::GetTarget);
}

#[test]
fn missing_input_publishes_nothing() {
    let (mut world, layout, mut colony) = prepared(1000, 0);
    for _ in 0..100 {
        colony.step(&mut world);
        world.advance();
    }
    let room = colony.room(&layout.room).unwrap();
    assert!(room.queue().is_empty());
    assert_eq!(room.lab().status().state, ReactionState::GetTarget);
    assert_eq!(world.node(layout.terminal).unwrap().store.used(res("H")), 1000);
}
