//! Everything a lab pipeline step touches in one tick.

use crate::roles::{LabRole, LabRoles};
use depot_core::config::Settings;
use depot_core::id::{NodeId, ResourceType, RoomName};
use depot_core::world::{self, WorldView};
use depot_transport::job::{Job, JobKind};
use depot_transport::queue::TransportQueue;

pub(crate) struct LabEnv<'a> {
    pub world: &'a mut dyn WorldView,
    pub queue: &'a mut TransportQueue,
    pub room: &'a RoomName,
    pub roles: &'a mut LabRoles,
    pub base: Option<[NodeId; 2]>,
    pub settings: &'a Settings,
}

/// Whether a step polled every `interval` ticks runs at `tick`.
pub(crate) fn due(tick: u64, interval: u64) -> bool {
    interval <= 1 || tick % interval == 0
}

impl LabEnv<'_> {
    pub fn tick(&self) -> u64 {
        self.world.tick()
    }

    /// The configured base labs, if both still exist and neither is lent
    /// to a boost task.
    pub fn base_labs(&self) -> Option<[NodeId; 2]> {
        let base = self.base?;
        base.iter()
            .all(|id| self.roles.role(*id) == Some(LabRole::Base))
            .then_some(base)
    }

    /// Configured base labs still in the base role, including one left
    /// behind when its partner is lent out.
    pub fn remaining_base_labs(&self) -> Vec<NodeId> {
        self.base
            .into_iter()
            .flatten()
            .filter(|id| self.roles.role(*id) == Some(LabRole::Base))
            .collect()
    }

    pub fn reaction_labs(&self) -> Vec<NodeId> {
        self.roles.with_role(LabRole::Reaction)
    }

    pub fn exists(&self, lab: NodeId) -> bool {
        self.world.node(lab).is_some()
    }

    pub fn mineral(&self, lab: NodeId) -> Option<ResourceType> {
        self.world.node(lab).and_then(|n| n.store.mineral_type())
    }

    pub fn held(&self, lab: NodeId, resource: ResourceType) -> u32 {
        world::amount_in(&*self.world, lab, resource)
    }

    /// Room stock across storage and terminal.
    pub fn stock(&self, resource: ResourceType) -> u32 {
        world::stock(&*self.world, self.room, resource)
    }

    pub fn has_pending(&self, kind: JobKind) -> bool {
        self.queue.has_pending(kind)
    }

    pub fn publish(&mut self, job: Job) {
        self.queue.add(job);
    }
}
