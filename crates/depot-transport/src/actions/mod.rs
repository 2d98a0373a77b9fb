//! Acquire/deliver logic for every job kind.
//!
//! Each step function runs once per tick for one carrier and returns a
//! [`Step`]. Nothing here touches the queue: finishing a job is signalled
//! with [`Step::Finish`] and applied by the carrier driver.

mod boost;
mod energy;
mod lab;
mod supply;

use crate::carrier::{CarrierMemory, Phase, Step};
use crate::job::Job;
use depot_core::action::{ActionResult, ResultClass};
use depot_core::agent::Agent;
use depot_core::config::TransportSettings;
use depot_core::id::{AgentId, NodeId, ResourceType, RoomName};
use depot_core::node::{DistanceMetric, Position, nearest};
use depot_core::world::{self, WorldView};
use tracing::warn;

/// Everything a step function may read or mutate.
pub struct CarrierCtx<'a> {
    pub world: &'a mut dyn WorldView,
    pub agent: AgentId,
    pub room: RoomName,
    pub memory: &'a mut CarrierMemory,
    pub settings: &'a TransportSettings,
}

/// Run one step of `job` in the carrier's current phase.
pub fn run(job: &Job, ctx: &mut CarrierCtx<'_>) -> Step {
    match (job, ctx.memory.phase) {
        (Job::FillExtension, Phase::Acquire) => energy::acquire(ctx),
        (Job::FillExtension, Phase::Deliver) => energy::deliver_extension(ctx),
        (Job::FillTower { .. }, Phase::Acquire) => energy::acquire(ctx),
        (Job::FillTower { tower }, Phase::Deliver) => energy::deliver_tower(ctx, *tower),
        (Job::BoostGetEnergy { .. }, Phase::Acquire) => energy::acquire(ctx),
        (Job::BoostGetEnergy { labs }, Phase::Deliver) => energy::deliver_boost_energy(ctx, labs),
        (Job::FillNuker { nuker, resource }, phase) => supply::step(ctx, phase, *nuker, *resource),
        (
            Job::FillPowerSpawn {
                power_spawn,
                resource,
            },
            phase,
        ) => supply::step(ctx, phase, *power_spawn, *resource),
        (Job::LabIn { resources }, Phase::Acquire) => lab::acquire_in(ctx, resources),
        (Job::LabIn { resources }, Phase::Deliver) => lab::deliver_in(ctx, resources),
        (Job::LabOut { labs }, Phase::Acquire) => lab::acquire_out(ctx, labs),
        (Job::LabOut { labs }, Phase::Deliver) => lab::deliver_out(ctx, labs),
        (Job::BoostGetResource { resources }, Phase::Acquire) => {
            boost::acquire_reload(ctx, resources)
        }
        (Job::BoostGetResource { resources }, Phase::Deliver) => {
            boost::deliver_reload(ctx, resources)
        }
        (Job::BoostClear { labs }, Phase::Acquire) => boost::acquire_clear(ctx, labs),
        (Job::BoostClear { .. }, Phase::Deliver) => boost::deliver_clear(ctx),
    }
}

/// Transfer amount for a single-shot fill: the smallest of what the carrier
/// can hold, what the source has, and what the destination can take.
/// `None` when any of them is zero.
pub fn batch_amount(carrier_free: u32, source_available: u32, dest_free: u32) -> Option<u32> {
    let amount = carrier_free.min(source_available).min(dest_free);
    (amount > 0).then_some(amount)
}

/// Nearest existing node among `candidates`.
pub(crate) fn closest(
    world: &dyn WorldView,
    from: Position,
    candidates: impl IntoIterator<Item = NodeId>,
    metric: DistanceMetric,
) -> Option<NodeId> {
    nearest(
        from,
        candidates
            .into_iter()
            .filter_map(|id| world.node(id).map(|n| (id, n.pos))),
        metric,
    )
}

/// The mineral a lab currently holds, `None` if it is empty or gone.
pub(crate) fn lab_mineral(world: &dyn WorldView, lab: NodeId) -> Option<ResourceType> {
    world.node(lab).and_then(|n| n.store.mineral_type())
}

impl CarrierCtx<'_> {
    pub fn agent(&self) -> Option<&Agent> {
        self.world.agent(self.agent)
    }

    pub fn pos(&self) -> Position {
        self.agent().map(|a| a.pos).unwrap_or_default()
    }

    pub fn carried(&self, resource: ResourceType) -> u32 {
        self.agent().map_or(0, |a| a.store.used(resource))
    }

    pub fn free(&self, resource: ResourceType) -> u32 {
        self.agent().map_or(0, |a| a.store.free_capacity(resource))
    }

    pub fn carried_resource(&self) -> Option<ResourceType> {
        self.agent().and_then(Agent::carried_resource)
    }

    pub fn is_empty(&self) -> bool {
        self.agent().is_none_or(|a| a.store.is_empty())
    }

    pub fn amount_in(&self, node: NodeId, resource: ResourceType) -> u32 {
        world::amount_in(&*self.world, node, resource)
    }

    pub fn storage(&self) -> Option<NodeId> {
        world::storage(&*self.world, &self.room)
    }

    pub fn terminal(&self) -> Option<NodeId> {
        world::terminal(&*self.world, &self.room)
    }

    /// Where this carrier draws and returns energy: its configured source if
    /// that still exists, otherwise the room storage.
    pub fn energy_source(&self) -> Option<NodeId> {
        self.memory
            .source
            .filter(|id| self.world.node(*id).is_some())
            .or_else(|| self.storage())
    }

    /// Nearest of `candidates` by the configured metric.
    pub fn nearest(&self, candidates: impl IntoIterator<Item = NodeId>) -> Option<NodeId> {
        closest(&*self.world, self.pos(), candidates, self.settings.distance)
    }

    // -----------------------------------------------------------------------
    // Actions that walk toward their node when out of range
    // -----------------------------------------------------------------------

    pub fn withdraw(&mut self, node: NodeId, resource: ResourceType, amount: Option<u32>) -> ActionResult {
        let result = self.world.withdraw(self.agent, node, resource, amount);
        self.close_in(node, result);
        result
    }

    pub fn transfer(&mut self, node: NodeId, resource: ResourceType, amount: Option<u32>) -> ActionResult {
        let result = self.world.transfer(self.agent, node, resource, amount);
        self.close_in(node, result);
        result
    }

    fn close_in(&mut self, node: NodeId, result: ActionResult) {
        if result == ActionResult::NotInRange {
            if let Some(pos) = self.world.node(node).map(|n| n.pos) {
                self.world.move_toward(self.agent, pos, 1);
            }
        }
    }

    /// Withdraw energy from the carrier's energy source.
    pub fn take_energy(&mut self) -> ActionResult {
        match self.energy_source() {
            Some(source) => self.withdraw(source, ResourceType::ENERGY, None),
            None => ActionResult::InvalidTarget,
        }
    }

    /// Get rid of every carried resource `keep` rejects: energy goes to
    /// storage, anything else to the terminal, and whatever does not fit is
    /// dropped. Returns true once nothing unwanted is carried.
    pub fn purge(&mut self, keep: impl Fn(ResourceType) -> bool) -> bool {
        let Some(agent) = self.agent() else {
            return true;
        };
        let Some((resource, amount)) = agent.store.resources().find(|(r, _)| !keep(*r)) else {
            return true;
        };

        let spill = if resource.is_energy() {
            self.storage()
        } else {
            self.terminal()
        };
        let fits = spill.is_some_and(|id| {
            self.world
                .node(id)
                .is_some_and(|n| n.store.free_capacity(resource) >= amount)
        });
        match spill {
            Some(id) if fits => {
                self.transfer(id, resource, None);
            }
            _ => {
                self.world.drop_resource(self.agent, resource, None);
            }
        }
        false
    }

    /// Purge carried energy only.
    pub fn purge_energy(&mut self) -> bool {
        self.purge(|r| !r.is_energy())
    }

    /// Classify a result for the common case: success and exhaustion both
    /// end the phase, range problems wait for movement, the rest is logged.
    pub fn dispatch(&self, label: &'static str, result: ActionResult) -> Step {
        match result.class() {
            ResultClass::Success | ResultClass::Exhausted => Step::Advance,
            ResultClass::Transient => Step::Continue,
            ResultClass::Unexpected => {
                self.unexpected(label, result);
                Step::Continue
            }
        }
    }

    pub fn unexpected(&self, label: &'static str, result: ActionResult) {
        warn!(room = %self.room, agent = ?self.agent, step = label, %result, "unexpected action result");
    }
}
