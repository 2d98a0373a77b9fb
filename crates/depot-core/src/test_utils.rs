//! World builders for tests and benchmarks: a fully built room, resource
//! lookups by name, and carrier spawning. Compiled for unit tests and for
//! any crate that enables the `test-utils` feature.

use crate::agent::Agent;
use crate::id::{AgentId, NodeId, ResourceType, RoomName};
use crate::node::{NodeKind, Position, ResourceNode};
use crate::registry::Registry;
use crate::sim::{LAB_ENERGY_CAPACITY, LAB_MINERAL_CAPACITY, SimWorld};
use crate::store::Store;

// ===========================================================================
// Resource constructors
// ===========================================================================

pub fn energy() -> ResourceType {
    ResourceType::ENERGY
}

/// Look up a resource of the standard registry by name.
///
/// # Panics
/// Panics if `name` is not a standard resource.
pub fn res(name: &str) -> ResourceType {
    Registry::standard()
        .resource(name)
        .unwrap_or_else(|| panic!("unknown resource {name}"))
}

pub fn room() -> RoomName {
    RoomName::new("W1N1")
}

// ===========================================================================
// Room layout
// ===========================================================================

pub const CARRIER_CAPACITY: u32 = 100;
pub const CARRIER_TTL: u32 = 1500;

/// Node ids of a fully built room.
#[derive(Debug, Clone)]
pub struct RoomLayout {
    pub room: RoomName,
    pub storage: NodeId,
    pub terminal: NodeId,
    pub spawn: NodeId,
    pub extensions: Vec<NodeId>,
    pub towers: Vec<NodeId>,
    /// Ten labs; the first two sit within reaction range of all others.
    pub labs: Vec<NodeId>,
    pub nuker: NodeId,
    pub power_spawn: NodeId,
}

const LAB_POSITIONS: [(i32, i32); 10] = [
    (20, 20),
    (21, 20),
    (19, 21),
    (20, 22),
    (21, 22),
    (22, 21),
    (19, 19),
    (22, 19),
    (20, 18),
    (21, 18),
];

fn place(
    world: &mut SimWorld,
    room: &RoomName,
    kind: NodeKind,
    (x, y): (i32, i32),
    store: Store,
) -> NodeId {
    world.add_node(ResourceNode::new(
        kind,
        room.clone(),
        Position::new(x, y),
        store,
    ))
}

/// Build a room with storage, terminal, spawn, three extensions, two towers,
/// ten labs, a nuker and a power spawn. Everything starts empty.
pub fn build_room(world: &mut SimWorld, room: RoomName) -> RoomLayout {
    let e = ResourceType::ENERGY;
    let ghodium = world.registry().resource("G").unwrap_or(ResourceType(0));
    let power = world.registry().resource("power").unwrap_or(ResourceType(0));

    let storage = place(world, &room, NodeKind::Storage, (25, 25), Store::general(1_000_000));
    let terminal = place(world, &room, NodeKind::Terminal, (23, 25), Store::general(300_000));
    let spawn = place(world, &room, NodeKind::Spawn, (30, 30), Store::single(e, 300));
    let extensions = [(31, 30), (32, 30), (31, 31)]
        .into_iter()
        .map(|pos| place(world, &room, NodeKind::Extension, pos, Store::single(e, 50)))
        .collect();
    let towers = [(28, 20), (28, 30)]
        .into_iter()
        .map(|pos| place(world, &room, NodeKind::Tower, pos, Store::single(e, 1000)))
        .collect();
    let labs = LAB_POSITIONS
        .into_iter()
        .map(|pos| {
            place(
                world,
                &room,
                NodeKind::Lab,
                pos,
                Store::lab(LAB_ENERGY_CAPACITY, LAB_MINERAL_CAPACITY),
            )
        })
        .collect();
    let nuker = place(
        world,
        &room,
        NodeKind::Nuker,
        (15, 15),
        Store::per_resource([(e, 300_000), (ghodium, 5_000)]),
    );
    let power_spawn = place(
        world,
        &room,
        NodeKind::PowerSpawn,
        (16, 16),
        Store::per_resource([(e, 5_000), (power, 100)]),
    );

    RoomLayout {
        room,
        storage,
        terminal,
        spawn,
        extensions,
        towers,
        labs,
        nuker,
        power_spawn,
    }
}

/// A standard world with one room built by [`build_room`].
pub fn standard_world() -> (SimWorld, RoomLayout) {
    let mut world = SimWorld::new(Registry::standard());
    let layout = build_room(&mut world, room());
    (world, layout)
}

// ===========================================================================
// Stores and agents
// ===========================================================================

/// Put `amount` of `resource` into `node`, panicking if it does not fit.
pub fn fill(world: &mut SimWorld, node: NodeId, resource: ResourceType, amount: u32) {
    let store = &mut world.node_mut(node).expect("node exists").store;
    assert_eq!(store.add(resource, amount), 0, "fill overflowed");
}

pub fn spawn_carrier(world: &mut SimWorld, room: &RoomName, pos: Position) -> AgentId {
    world.add_agent(Agent::new(room.clone(), pos, CARRIER_CAPACITY, CARRIER_TTL))
}

/// A capacity-less unit waiting to be boosted.
pub fn spawn_unit(world: &mut SimWorld, room: &RoomName, pos: Position) -> AgentId {
    world.add_agent(Agent::new(room.clone(), pos, 0, CARRIER_TTL))
}
