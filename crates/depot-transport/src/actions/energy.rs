//! Energy jobs: spawn/extension fill, tower fill, boost lab energy.

use super::{CarrierCtx, closest};
use crate::carrier::Step;
use depot_core::action::ActionResult;
use depot_core::id::{NodeId, ResourceType};
use depot_core::node::NodeKind;
use depot_core::world::WorldView;
use tracing::warn;

const E: ResourceType = ResourceType::ENERGY;

/// Shared acquire phase: fill up with energy from the energy source.
pub(super) fn acquire(ctx: &mut CarrierCtx<'_>) -> Step {
    if ctx.carried(E) > 0 {
        return Step::Advance;
    }
    if ctx.energy_source().is_none() {
        warn!(room = %ctx.room, agent = ?ctx.agent, "no energy source, job dropped");
        return Step::Finish;
    }
    match ctx.take_energy() {
        ActionResult::Full => {
            // Full of something else.
            ctx.purge(|r| r.is_energy());
            Step::Continue
        }
        other => ctx.dispatch("take_energy", other),
    }
}

fn deliver(ctx: &mut CarrierCtx<'_>, target: NodeId, label: &'static str) -> Step {
    match ctx.transfer(target, E, None) {
        ActionResult::Ok => Step::Continue,
        other => ctx.dispatch(label, other),
    }
}

// ---------------------------------------------------------------------------
// Spawns and extensions
// ---------------------------------------------------------------------------

fn needs_energy(world: &dyn WorldView, id: NodeId) -> bool {
    world
        .node(id)
        .is_some_and(|n| n.kind.is_spawn_support() && n.store.free_capacity(E) > 0)
}

pub(super) fn deliver_extension(ctx: &mut CarrierCtx<'_>) -> Step {
    if ctx.carried(E) == 0 {
        return Step::Advance;
    }
    let from = ctx.pos();
    let world: &dyn WorldView = &*ctx.world;
    let room = &ctx.room;
    let metric = ctx.settings.distance;
    let target = ctx.memory.fill_target.resolve(
        |id| needs_energy(world, id),
        || {
            let candidates = world
                .nodes(room, NodeKind::Extension)
                .into_iter()
                .chain(world.nodes(room, NodeKind::Spawn))
                .filter(|id| needs_energy(world, *id));
            closest(world, from, candidates, metric)
        },
    );
    let Some(target) = target else {
        return Step::Finish;
    };
    deliver(ctx, target, "fill_extension")
}

// ---------------------------------------------------------------------------
// Towers
// ---------------------------------------------------------------------------

pub(super) fn deliver_tower(ctx: &mut CarrierCtx<'_>, requester: NodeId) -> Step {
    if ctx.carried(E) == 0 {
        return Step::Advance;
    }
    let from = ctx.pos();
    let world: &dyn WorldView = &*ctx.world;
    let room = &ctx.room;
    let metric = ctx.settings.distance;
    let threshold = ctx.settings.tower_threshold;
    let below = |id: NodeId| {
        world
            .node(id)
            .is_some_and(|n| n.kind == NodeKind::Tower && n.store.used(E) <= threshold)
    };
    let target = ctx.memory.fill_target.resolve(&below, || {
        if below(requester) {
            return Some(requester);
        }
        let towers = world
            .nodes(room, NodeKind::Tower)
            .into_iter()
            .filter(|id| below(*id));
        closest(world, from, towers, metric)
    });
    let Some(target) = target else {
        return Step::Finish;
    };
    deliver(ctx, target, "fill_tower")
}

// ---------------------------------------------------------------------------
// Boost lab energy
// ---------------------------------------------------------------------------

pub(super) fn deliver_boost_energy(ctx: &mut CarrierCtx<'_>, labs: &[NodeId]) -> Step {
    if ctx.carried(E) == 0 {
        return Step::Advance;
    }
    let target = labs.iter().copied().find(|id| {
        ctx.world
            .node(*id)
            .is_some_and(|n| n.store.used(E) < n.store.capacity_for(E))
    });
    let Some(target) = target else {
        return Step::Finish;
    };
    deliver(ctx, target, "boost_get_energy")
}

#[cfg(test)]
mod tests {
    use crate::carrier::{CarrierMemory, CarrierStatus, run_carrier};
    use crate::job::{Job, JobKind};
    use crate::queue::TransportQueue;
    use depot_core::config::TransportSettings;
    use depot_core::node::Position;
    use depot_core::sim::SimWorld;
    use depot_core::test_utils::*;
    use depot_core::world::WorldView;

    fn run_ticks(
        world: &mut SimWorld,
        carrier: depot_core::id::AgentId,
        memory: &mut CarrierMemory,
        queue: &mut TransportQueue,
        ticks: usize,
    ) {
        let settings = TransportSettings::default();
        for _ in 0..ticks {
            run_carrier(carrier, memory, world, queue, &settings).unwrap();
            world.advance();
        }
    }

    // -----------------------------------------------------------------------
    // Test 1: extensions and spawn fill, job finishes when all are full
    // -----------------------------------------------------------------------

    #[test]
    fn fills_every_spawn_support_structure() {
        let (mut world, layout) = standard_world();
        fill(&mut world, layout.storage, energy(), 10_000);
        let carrier = spawn_carrier(&mut world, &layout.room, Position::new(25, 26));
        let mut memory = CarrierMemory::default();
        let mut queue = TransportQueue::new();
        queue.add(Job::FillExtension);

        run_ticks(&mut world, carrier, &mut memory, &mut queue, 200);

        for ext in &layout.extensions {
            assert_eq!(world.node(*ext).unwrap().store.used(energy()), 50);
        }
        assert_eq!(world.node(layout.spawn).unwrap().store.used(energy()), 300);
        assert!(!queue.has_pending(JobKind::FillExtension));
    }

    // -----------------------------------------------------------------------
    // Test 2: tower fill prefers requester and stops above threshold
    // -----------------------------------------------------------------------

    #[test]
    fn fills_requesting_tower_first() {
        let (mut world, layout) = standard_world();
        fill(&mut world, layout.storage, energy(), 10_000);
        fill(&mut world, layout.towers[0], energy(), 950);
        fill(&mut world, layout.towers[1], energy(), 850);
        let carrier = spawn_carrier(&mut world, &layout.room, Position::new(25, 26));
        let mut memory = CarrierMemory::default();
        let mut queue = TransportQueue::new();
        queue.add(Job::FillTower {
            tower: layout.towers[0],
        });

        run_ticks(&mut world, carrier, &mut memory, &mut queue, 60);

        assert_eq!(world.node(layout.towers[0]).unwrap().store.used(energy()), 950);
        assert_eq!(world.node(layout.towers[1]).unwrap().store.used(energy()), 950);
        assert!(!queue.has_pending(JobKind::FillTower));
    }

    // -----------------------------------------------------------------------
    // Test 3: stale cache is discarded
    // -----------------------------------------------------------------------

    #[test]
    fn cached_extension_that_vanished_is_replaced() {
        let (mut world, layout) = standard_world();
        fill(&mut world, layout.storage, energy(), 10_000);
        let carrier = spawn_carrier(&mut world, &layout.room, Position::new(30, 29));
        let _ = world.agent_mut(carrier).unwrap().store.add(energy(), 100);
        let mut memory = CarrierMemory::default();
        let mut queue = TransportQueue::new();
        let id = queue.add(Job::FillExtension);
        memory.job = Some(id);
        memory.phase = crate::carrier::Phase::Deliver;
        memory.fill_target.set(layout.extensions[0]);
        world.remove_node(layout.extensions[0]);

        let settings = TransportSettings::default();
        let status = run_carrier(carrier, &mut memory, &mut world, &mut queue, &settings).unwrap();
        assert_eq!(status, CarrierStatus::Working(JobKind::FillExtension));
        let cached = memory.fill_target.get().unwrap();
        assert_ne!(cached, layout.extensions[0]);
        assert!(world.node(cached).is_some());
    }

    // -----------------------------------------------------------------------
    // Test 4: boost energy stops when every lab is full
    // -----------------------------------------------------------------------

    #[test]
    fn boost_energy_fills_listed_labs() {
        let (mut world, layout) = standard_world();
        fill(&mut world, layout.storage, energy(), 100_000);
        let labs = vec![layout.labs[2], layout.labs[3]];
        let carrier = spawn_carrier(&mut world, &layout.room, Position::new(24, 24));
        let mut memory = CarrierMemory::default();
        let mut queue = TransportQueue::new();
        queue.add(Job::BoostGetEnergy { labs: labs.clone() });

        run_ticks(&mut world, carrier, &mut memory, &mut queue, 800);

        for lab in labs {
            assert_eq!(world.node(lab).unwrap().store.used(energy()), 2000);
        }
        assert_eq!(world.node(layout.labs[4]).unwrap().store.used(energy()), 0);
        assert!(!queue.has_pending(JobKind::BoostGetEnergy));
    }

    // -----------------------------------------------------------------------
    // Test 5: an empty source ends the acquire phase
    // -----------------------------------------------------------------------

    #[test]
    fn empty_source_does_not_hold_the_carrier() {
        let (mut world, layout) = standard_world();
        let carrier = spawn_carrier(&mut world, &layout.room, Position::new(24, 24));
        let mut memory = CarrierMemory::default();
        let mut queue = TransportQueue::new();
        queue.add(Job::FillExtension);
        let settings = TransportSettings::default();

        run_carrier(carrier, &mut memory, &mut world, &mut queue, &settings).unwrap();
        assert_eq!(memory.phase, crate::carrier::Phase::Deliver);

        // Nothing carried: straight back to acquire for another look.
        world.advance();
        run_carrier(carrier, &mut memory, &mut world, &mut queue, &settings).unwrap();
        assert_eq!(memory.phase, crate::carrier::Phase::Acquire);
        assert!(queue.has_pending(JobKind::FillExtension));
    }
}
