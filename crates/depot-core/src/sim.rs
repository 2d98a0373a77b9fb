//! In-memory reference world.
//!
//! [`SimWorld`] owns every node and agent in slotmaps and applies the action
//! primitives with the usual rules: withdraw, transfer and boost need the
//! agent within range 1, a reaction needs both input labs within range 2 of
//! the reacting lab, and labs cool down after each reaction.

use crate::action::ActionResult;
use crate::agent::Agent;
use crate::id::{AgentId, NodeId, ResourceType, RoomName};
use crate::node::{NodeKind, Position, ResourceNode};
use crate::registry::Registry;
use crate::world::WorldView;
use slotmap::SlotMap;
use std::collections::{BTreeMap, BTreeSet};

pub const ACTION_RANGE: u32 = 1;
pub const REACTION_RANGE: u32 = 2;
/// Units of each input consumed (and product created) per reaction.
pub const REACTION_AMOUNT: u32 = 5;
pub const REACTION_COOLDOWN: u32 = 10;
pub const BOOST_MINERAL_COST: u32 = 30;
pub const BOOST_ENERGY_COST: u32 = 20;
pub const LAB_ENERGY_CAPACITY: u32 = 2000;
pub const LAB_MINERAL_CAPACITY: u32 = 3000;

#[derive(Debug, Clone)]
pub struct SimWorld {
    tick: u64,
    registry: Registry,
    rooms: BTreeSet<RoomName>,
    nodes: SlotMap<NodeId, ResourceNode>,
    agents: SlotMap<AgentId, Agent>,
    dropped: BTreeMap<(RoomName, ResourceType), u32>,
}

impl SimWorld {
    pub fn new(registry: Registry) -> Self {
        Self {
            tick: 0,
            registry,
            rooms: BTreeSet::new(),
            nodes: SlotMap::with_key(),
            agents: SlotMap::with_key(),
            dropped: BTreeMap::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn add_room(&mut self, room: RoomName) {
        self.rooms.insert(room);
    }

    /// Hide a room, as if vision were lost.
    pub fn remove_room(&mut self, room: &RoomName) {
        self.rooms.remove(room);
    }

    pub fn add_node(&mut self, node: ResourceNode) -> NodeId {
        self.rooms.insert(node.room.clone());
        self.nodes.insert(node)
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<ResourceNode> {
        self.nodes.remove(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut ResourceNode> {
        self.nodes.get_mut(id)
    }

    pub fn add_agent(&mut self, agent: Agent) -> AgentId {
        self.agents.insert(agent)
    }

    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent> {
        self.agents.remove(id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.keys().collect()
    }

    /// Total of `resource` dropped on the ground in `room` so far.
    pub fn dropped(&self, room: &RoomName, resource: ResourceType) -> u32 {
        self.dropped
            .get(&(room.clone(), resource))
            .copied()
            .unwrap_or(0)
    }

    /// End the tick: cool labs down, age agents, remove the expired ones.
    pub fn advance(&mut self) {
        self.tick += 1;
        for node in self.nodes.values_mut() {
            node.cooldown = node.cooldown.saturating_sub(1);
        }
        for agent in self.agents.values_mut() {
            agent.ticks_to_live = agent.ticks_to_live.saturating_sub(1);
        }
        self.agents.retain(|_, agent| agent.ticks_to_live > 0);
    }

    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    fn in_range(&self, agent: AgentId, node: NodeId) -> Option<bool> {
        let a = self.agents.get(agent)?;
        let n = self.nodes.get(node)?;
        Some(a.pos.range_to(n.pos) <= ACTION_RANGE)
    }
}

impl WorldView for SimWorld {
    fn tick(&self) -> u64 {
        self.tick
    }

    fn has_room(&self, room: &RoomName) -> bool {
        self.rooms.contains(room)
    }

    fn node(&self, id: NodeId) -> Option<&ResourceNode> {
        self.nodes.get(id)
    }

    fn nodes(&self, room: &RoomName, kind: NodeKind) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.kind == kind && &n.room == room)
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        ids
    }

    fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    fn withdraw(
        &mut self,
        agent: AgentId,
        node: NodeId,
        resource: ResourceType,
        amount: Option<u32>,
    ) -> ActionResult {
        let Some(in_range) = self.in_range(agent, node) else {
            return if self.agents.contains_key(agent) {
                ActionResult::InvalidTarget
            } else {
                ActionResult::InvalidArgs
            };
        };
        if !in_range {
            return ActionResult::NotInRange;
        }
        let (Some(source), Some(carrier)) = (self.nodes.get(node), self.agents.get(agent)) else {
            return ActionResult::InvalidTarget;
        };
        let available = source.store.used(resource);
        let room = carrier.store.free_capacity(resource);
        let quantity = match amount {
            Some(0) => return ActionResult::InvalidArgs,
            Some(a) if a > available => return ActionResult::NotEnoughResources,
            Some(a) if a > room => return ActionResult::Full,
            Some(a) => a,
            None if available == 0 => return ActionResult::NotEnoughResources,
            None if room == 0 => return ActionResult::Full,
            None => available.min(room),
        };

        let removed = self
            .nodes
            .get_mut(node)
            .map_or(0, |n| n.store.remove(resource, quantity));
        if let Some(carrier) = self.agents.get_mut(agent) {
            let _ = carrier.store.add(resource, removed);
        }
        ActionResult::Ok
    }

    fn transfer(
        &mut self,
        agent: AgentId,
        node: NodeId,
        resource: ResourceType,
        amount: Option<u32>,
    ) -> ActionResult {
        let Some(in_range) = self.in_range(agent, node) else {
            return if self.agents.contains_key(agent) {
                ActionResult::InvalidTarget
            } else {
                ActionResult::InvalidArgs
            };
        };
        let (Some(target), Some(carrier)) = (self.nodes.get(node), self.agents.get(agent)) else {
            return ActionResult::InvalidTarget;
        };
        if !target.store.accepts(resource) {
            return ActionResult::InvalidTarget;
        }
        if !in_range {
            return ActionResult::NotInRange;
        }
        let carried = carrier.store.used(resource);
        let room = target.store.free_capacity(resource);
        let quantity = match amount {
            Some(0) => return ActionResult::InvalidArgs,
            Some(a) if a > carried => return ActionResult::NotEnoughResources,
            Some(a) if a > room => return ActionResult::Full,
            Some(a) => a,
            None if carried == 0 => return ActionResult::NotEnoughResources,
            None if room == 0 => return ActionResult::Full,
            None => carried.min(room),
        };

        let removed = self
            .agents
            .get_mut(agent)
            .map_or(0, |a| a.store.remove(resource, quantity));
        if let Some(target) = self.nodes.get_mut(node) {
            let _ = target.store.add(resource, removed);
        }
        ActionResult::Ok
    }

    fn drop_resource(
        &mut self,
        agent: AgentId,
        resource: ResourceType,
        amount: Option<u32>,
    ) -> ActionResult {
        let Some(carrier) = self.agents.get_mut(agent) else {
            return ActionResult::InvalidArgs;
        };
        let carried = carrier.store.used(resource);
        if carried == 0 {
            return ActionResult::NotEnoughResources;
        }
        let removed = carrier.store.remove(resource, amount.unwrap_or(carried));
        *self
            .dropped
            .entry((carrier.room.clone(), resource))
            .or_insert(0) += removed;
        ActionResult::Ok
    }

    fn move_toward(&mut self, agent: AgentId, target: Position, range: u32) {
        if let Some(a) = self.agents.get_mut(agent) {
            if a.pos.range_to(target) > range {
                a.pos = a.pos.step_toward(target);
            }
        }
    }

    fn run_reaction(&mut self, lab: NodeId, input_a: NodeId, input_b: NodeId) -> ActionResult {
        if lab == input_a || lab == input_b || input_a == input_b {
            return ActionResult::InvalidArgs;
        }
        let labs = [lab, input_a, input_b].map(|id| self.nodes.get(id));
        let [Some(reactor), Some(a), Some(b)] = labs else {
            return ActionResult::InvalidTarget;
        };
        if [reactor, a, b].iter().any(|n| n.kind != NodeKind::Lab) {
            return ActionResult::InvalidTarget;
        }
        if reactor.cooldown > 0 {
            return ActionResult::Tired;
        }
        if reactor.pos.range_to(a.pos) > REACTION_RANGE
            || reactor.pos.range_to(b.pos) > REACTION_RANGE
        {
            return ActionResult::NotInRange;
        }
        let (Some(mineral_a), Some(mineral_b)) = (a.store.mineral_type(), b.store.mineral_type())
        else {
            return ActionResult::NotEnoughResources;
        };
        if a.store.used(mineral_a) < REACTION_AMOUNT || b.store.used(mineral_b) < REACTION_AMOUNT {
            return ActionResult::NotEnoughResources;
        }
        let Some(product) = self.registry.product_of(mineral_a, mineral_b) else {
            return ActionResult::InvalidArgs;
        };
        if reactor.store.free_capacity(product) < REACTION_AMOUNT {
            return ActionResult::Full;
        }

        for (id, mineral) in [(input_a, mineral_a), (input_b, mineral_b)] {
            if let Some(n) = self.nodes.get_mut(id) {
                let _ = n.store.remove(mineral, REACTION_AMOUNT);
            }
        }
        if let Some(reactor) = self.nodes.get_mut(lab) {
            let _ = reactor.store.add(product, REACTION_AMOUNT);
            reactor.cooldown = REACTION_COOLDOWN;
        }
        ActionResult::Ok
    }

    fn boost_agent(&mut self, lab: NodeId, agent: AgentId) -> ActionResult {
        let Some(in_range) = self.in_range(agent, lab) else {
            return if self.agents.contains_key(agent) {
                ActionResult::InvalidTarget
            } else {
                ActionResult::InvalidArgs
            };
        };
        let (Some(source), Some(target)) = (self.nodes.get(lab), self.agents.get(agent)) else {
            return ActionResult::InvalidTarget;
        };
        if source.kind != NodeKind::Lab {
            return ActionResult::InvalidTarget;
        }
        if !in_range {
            return ActionResult::NotInRange;
        }
        let Some(mineral) = source.store.mineral_type() else {
            return ActionResult::NotFound;
        };
        if source.store.used(mineral) < BOOST_MINERAL_COST || target.is_boosted_with(mineral) {
            return ActionResult::NotFound;
        }
        if source.store.used(ResourceType::ENERGY) < BOOST_ENERGY_COST {
            return ActionResult::NotEnoughResources;
        }

        if let Some(source) = self.nodes.get_mut(lab) {
            let _ = source.store.remove(mineral, BOOST_MINERAL_COST);
            let _ = source.store.remove(ResourceType::ENERGY, BOOST_ENERGY_COST);
        }
        if let Some(target) = self.agents.get_mut(agent) {
            target.boosts.push(mineral);
        }
        ActionResult::Ok
    }
}
