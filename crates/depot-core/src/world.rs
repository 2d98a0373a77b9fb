//! The per-tick world context.
//!
//! Every controller and carrier step receives a `&mut dyn WorldView` instead
//! of reaching into global state. Reads go through [`WorldView::node`] and
//! [`WorldView::agent`]; every mutation is one of the action primitives,
//! each returning an [`ActionResult`].

use crate::action::ActionResult;
use crate::agent::Agent;
use crate::id::{AgentId, NodeId, ResourceType, RoomName};
use crate::node::{NodeKind, Position, ResourceNode};

pub trait WorldView {
    /// Current global tick.
    fn tick(&self) -> u64;

    /// Whether the room is currently visible.
    fn has_room(&self, room: &RoomName) -> bool;

    fn node(&self, id: NodeId) -> Option<&ResourceNode>;

    /// All nodes of `kind` in `room`, in id order.
    fn nodes(&self, room: &RoomName, kind: NodeKind) -> Vec<NodeId>;

    fn agent(&self, id: AgentId) -> Option<&Agent>;

    /// Take `resource` from `node` into the agent. `None` takes as much as fits.
    fn withdraw(
        &mut self,
        agent: AgentId,
        node: NodeId,
        resource: ResourceType,
        amount: Option<u32>,
    ) -> ActionResult;

    /// Give `resource` from the agent to `node`. `None` gives as much as fits.
    fn transfer(
        &mut self,
        agent: AgentId,
        node: NodeId,
        resource: ResourceType,
        amount: Option<u32>,
    ) -> ActionResult;

    /// Drop carried resource on the ground. It is lost to the scheduler.
    fn drop_resource(
        &mut self,
        agent: AgentId,
        resource: ResourceType,
        amount: Option<u32>,
    ) -> ActionResult;

    /// Movement collaborator. Idempotent; closes distance over several ticks.
    fn move_toward(&mut self, agent: AgentId, target: Position, range: u32);

    /// Combine the minerals of two input labs inside `lab`.
    fn run_reaction(&mut self, lab: NodeId, input_a: NodeId, input_b: NodeId) -> ActionResult;

    /// Apply the mineral held by `lab` to an adjacent agent.
    fn boost_agent(&mut self, lab: NodeId, agent: AgentId) -> ActionResult;
}

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

/// The first node of `kind` in `room`. Rooms hold at most one storage,
/// terminal, nuker and power spawn.
pub fn singleton(world: &dyn WorldView, room: &RoomName, kind: NodeKind) -> Option<NodeId> {
    world.nodes(room, kind).into_iter().next()
}

pub fn storage(world: &dyn WorldView, room: &RoomName) -> Option<NodeId> {
    singleton(world, room, NodeKind::Storage)
}

pub fn terminal(world: &dyn WorldView, room: &RoomName) -> Option<NodeId> {
    singleton(world, room, NodeKind::Terminal)
}

/// Amount of `resource` held by `node`, zero if the node is gone.
pub fn amount_in(world: &dyn WorldView, node: NodeId, resource: ResourceType) -> u32 {
    world.node(node).map_or(0, |n| n.store.used(resource))
}

/// Room-wide stock of `resource` across storage and terminal.
pub fn stock(world: &dyn WorldView, room: &RoomName, resource: ResourceType) -> u32 {
    [storage(world, room), terminal(world, room)]
        .into_iter()
        .flatten()
        .map(|id| amount_in(world, id, resource))
        .sum()
}

/// Whether `id` still resolves to a node of `kind`.
pub fn is_kind(world: &dyn WorldView, id: NodeId, kind: NodeKind) -> bool {
    world.node(id).is_some_and(|n| n.kind == kind)
}
