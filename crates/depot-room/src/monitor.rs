//! Structure monitor: publishes the fill jobs a room needs.

use depot_core::config::TransportSettings;
use depot_core::id::{NodeId, ResourceType, RoomName};
use depot_core::node::NodeKind;
use depot_core::store::Capacity;
use depot_core::world::{self, WorldView};
use depot_transport::job::Job;
use depot_transport::queue::TransportQueue;

/// Look over the room's structures and publish fill jobs. Publication is
/// idempotent, so scanning while jobs are pending is harmless.
pub fn scan(
    world: &dyn WorldView,
    room: &RoomName,
    queue: &mut TransportQueue,
    settings: &TransportSettings,
) {
    if needs_spawn_energy(world, room) {
        queue.add(Job::FillExtension);
    }
    if let Some(tower) = hungry_tower(world, room, settings.tower_threshold) {
        queue.add(Job::FillTower { tower });
    }
    if let Some(nuker) = world::singleton(world, room, NodeKind::Nuker) {
        if let Some(resource) = supply_need(world, room, nuker, settings) {
            queue.add(Job::FillNuker { nuker, resource });
        }
    }
    if let Some(power_spawn) = world::singleton(world, room, NodeKind::PowerSpawn) {
        if let Some(resource) = supply_need(world, room, power_spawn, settings) {
            queue.add(Job::FillPowerSpawn {
                power_spawn,
                resource,
            });
        }
    }
}

fn needs_spawn_energy(world: &dyn WorldView, room: &RoomName) -> bool {
    [NodeKind::Spawn, NodeKind::Extension]
        .into_iter()
        .flat_map(|kind| world.nodes(room, kind))
        .filter_map(|id| world.node(id))
        .any(|n| n.store.free_capacity(ResourceType::ENERGY) > 0)
}

fn hungry_tower(world: &dyn WorldView, room: &RoomName, threshold: u32) -> Option<NodeId> {
    world.nodes(room, NodeKind::Tower).into_iter().find(|id| {
        world
            .node(*id)
            .is_some_and(|n| n.store.used(ResourceType::ENERGY) <= threshold)
    })
}

/// First resource slot of `node` with room to spare whose source can cover
/// it: energy from storage above the reserve, anything else from the
/// terminal.
fn supply_need(
    world: &dyn WorldView,
    room: &RoomName,
    node: NodeId,
    settings: &TransportSettings,
) -> Option<ResourceType> {
    let store = &world.node(node)?.store;
    let Capacity::PerResource(limits) = store.capacity() else {
        return None;
    };
    limits
        .keys()
        .copied()
        .filter(|r| store.free_capacity(*r) > 0)
        .find(|r| {
            if r.is_energy() {
                world::storage(world, room)
                    .is_some_and(|s| world::amount_in(world, s, *r) > settings.energy_reserve)
            } else {
                world::terminal(world, room).is_some_and(|t| world::amount_in(world, t, *r) > 0)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::test_utils::*;
    use depot_transport::job::JobKind;

    #[test]
    fn empty_room_wants_spawn_energy_and_towers() {
        let (world, layout) = standard_world();
        let mut queue = TransportQueue::new();
        scan(&world, &layout.room, &mut queue, &TransportSettings::default());
        assert!(queue.has_pending(JobKind::FillExtension));
        let Some((_, Job::FillTower { tower })) = queue.find(JobKind::FillTower) else {
            panic!("tower fill not published");
        };
        assert_eq!(*tower, layout.towers[0]);
        // Nothing in storage or terminal: no supply jobs.
        assert!(!queue.has_pending(JobKind::FillNuker));
        assert!(!queue.has_pending(JobKind::FillPowerSpawn));
    }

    #[test]
    fn full_structures_need_nothing() {
        let (mut world, layout) = standard_world();
        fill(&mut world, layout.spawn, energy(), 300);
        for ext in layout.extensions.clone() {
            fill(&mut world, ext, energy(), 50);
        }
        for tower in layout.towers.clone() {
            fill(&mut world, tower, energy(), 950);
        }
        let mut queue = TransportQueue::new();
        scan(&world, &layout.room, &mut queue, &TransportSettings::default());
        assert!(queue.is_empty());
    }

    #[test]
    fn supply_respects_energy_reserve() {
        let (mut world, layout) = standard_world();
        fill(&mut world, layout.storage, energy(), 40_000);
        fill(&mut world, layout.terminal, res("power"), 50);
        let settings = TransportSettings::default();
        let mut queue = TransportQueue::new();
        scan(&world, &layout.room, &mut queue, &settings);

        // Storage is under the reserve, so the power spawn gets power only.
        let Some((_, Job::FillPowerSpawn { resource, .. })) = queue.find(JobKind::FillPowerSpawn)
        else {
            panic!("power spawn fill not published");
        };
        assert_eq!(*resource, res("power"));
        assert!(!queue.has_pending(JobKind::FillNuker));

        fill(&mut world, layout.storage, energy(), 20_000);
        scan(&world, &layout.room, &mut queue, &settings);
        let Some((_, Job::FillNuker { resource, .. })) = queue.find(JobKind::FillNuker) else {
            panic!("nuker fill not published");
        };
        assert!(resource.is_energy());
    }
}
