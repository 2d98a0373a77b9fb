//! The boost pipeline: borrow labs from reactions, load them with boost
//! substances and energy, wait for agents, then hand the labs back.

use crate::env::LabEnv;
use crate::reaction::ReactionMemory;
use crate::roles::LabRole;
use depot_core::id::{NodeId, ResourceType};
use depot_transport::job::{Job, JobKind, LabResource};
use depot_transport::queue::TransportQueue;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BoostTaskId(pub u64);

impl fmt::Display for BoostTaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "boost#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoostState {
    #[default]
    GetLab,
    GetResource,
    GetEnergy,
    WaitBoost,
    ClearResource,
}

impl fmt::Display for BoostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoostState::GetLab => "get_lab",
            BoostState::GetResource => "get_resource",
            BoostState::GetEnergy => "get_energy",
            BoostState::WaitBoost => "wait_boost",
            BoostState::ClearResource => "clear_resource",
        })
    }
}

/// One substance a boost task needs, as requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostSpec {
    pub resource: ResourceType,
    pub amount: u32,
}

impl BoostSpec {
    pub fn new(resource: ResourceType, amount: u32) -> Self {
        Self { resource, amount }
    }
}

/// A requested substance plus the lab assigned to hold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostSlot {
    pub resource: ResourceType,
    pub amount: u32,
    pub lab: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostTask {
    pub id: BoostTaskId,
    pub slots: Vec<BoostSlot>,
    pub state: BoostState,
}

impl BoostTask {
    pub fn new(id: BoostTaskId, specs: &[BoostSpec]) -> Self {
        let slots = specs
            .iter()
            .map(|s| BoostSlot {
                resource: s.resource,
                amount: s.amount,
                lab: None,
            })
            .collect();
        Self {
            id,
            slots,
            state: BoostState::GetLab,
        }
    }

    /// Labs assigned so far, in slot order.
    pub fn labs(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().filter_map(|s| s.lab)
    }

    /// (lab, resource, amount) for every assigned slot.
    pub fn lab_resources(&self) -> Vec<LabResource> {
        self.slots
            .iter()
            .filter_map(|s| {
                s.lab.map(|lab| LabResource {
                    lab,
                    resource: s.resource,
                    amount: s.amount,
                })
            })
            .collect()
    }
}

/// Per-lab progress of one agent through a boost task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostEntry {
    pub lab: NodeId,
    pub boosted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostingRecord {
    pub task: BoostTaskId,
    /// Labs in id order.
    pub entries: Vec<BoostEntry>,
}

impl BoostingRecord {
    pub fn new(task: &BoostTask) -> Self {
        let mut labs: Vec<NodeId> = task.labs().collect();
        labs.sort();
        Self {
            task: task.id,
            entries: labs
                .into_iter()
                .map(|lab| BoostEntry {
                    lab,
                    boosted: false,
                })
                .collect(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|e| e.boosted)
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// What the controller does with a task after its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Keep,
    Remove,
}

pub(crate) fn step(task: &mut BoostTask, env: &mut LabEnv<'_>, reaction: &mut ReactionMemory) -> Outcome {
    match task.state {
        BoostState::GetLab => get_lab(task, env, reaction),
        BoostState::GetResource => get_resource(task, env),
        BoostState::GetEnergy => get_energy(task, env),
        BoostState::WaitBoost => {}
        BoostState::ClearResource => return clear_resource(task, env),
    }
    Outcome::Keep
}

fn get_lab(task: &mut BoostTask, env: &mut LabEnv<'_>, reaction: &mut ReactionMemory) {
    if env.has_pending(JobKind::LabOut) {
        return;
    }
    let need = task.slots.iter().filter(|s| s.lab.is_none()).count();
    let reaction_labs = env.reaction_labs();

    let taken: Vec<NodeId> = if reaction_labs.len() >= need {
        reaction_labs.into_iter().take(need).collect()
    } else {
        let base = env.base_labs().into_iter().flatten();
        let pool: Vec<NodeId> = reaction_labs.into_iter().chain(base).collect();
        if pool.len() < need {
            debug!(room = %env.room, task = %task.id, need, available = pool.len(), "not enough labs to boost");
            return;
        }
        info!(room = %env.room, task = %task.id, "boost takes base labs, reactions stopped");
        reaction.force_put_resource();
        pool.into_iter().take(need).collect()
    };

    let mut free = taken.iter().copied();
    for slot in task.slots.iter_mut().filter(|s| s.lab.is_none()) {
        if let Some(lab) = free.next() {
            slot.lab = Some(lab);
            env.roles.set(lab, LabRole::Boost);
        }
    }

    let dirty: Vec<NodeId> = taken
        .into_iter()
        .filter(|lab| env.mineral(*lab).is_some())
        .collect();
    if !dirty.is_empty() {
        env.publish(Job::LabOut { labs: dirty });
    }

    if task.slots.iter().all(|s| s.lab.is_some()) {
        task.state = BoostState::GetResource;
        debug!(room = %env.room, task = %task.id, "boost labs assigned");
    }
}

fn get_resource(task: &mut BoostTask, env: &mut LabEnv<'_>) {
    if env.has_pending(JobKind::LabIn) || env.has_pending(JobKind::LabOut) {
        return;
    }
    let mut residue = Vec::new();
    for slot in &task.slots {
        let Some(lab) = slot.lab.filter(|lab| env.exists(*lab)) else {
            info!(room = %env.room, task = %task.id, "boost lab lost, clearing task");
            task.state = BoostState::ClearResource;
            return;
        };
        if env.mineral(lab).is_some_and(|m| m != slot.resource) {
            residue.push(lab);
        }
    }
    if !residue.is_empty() {
        env.publish(Job::LabOut { labs: residue });
        return;
    }

    let ready = task
        .slots
        .iter()
        .all(|s| s.lab.is_some_and(|lab| env.held(lab, s.resource) >= s.amount));
    if ready {
        task.state = BoostState::GetEnergy;
        info!(room = %env.room, task = %task.id, "boost substances loaded");
        return;
    }
    env.publish(Job::LabIn {
        resources: task.lab_resources(),
    });
}

fn get_energy(task: &mut BoostTask, env: &mut LabEnv<'_>) {
    let threshold = env.settings.lab.boost_energy;
    let labs: Vec<NodeId> = task.labs().collect();
    let short = labs
        .iter()
        .any(|lab| env.exists(*lab) && env.held(*lab, ResourceType::ENERGY) < threshold);
    if short {
        if !env.has_pending(JobKind::BoostGetEnergy) {
            env.publish(Job::BoostGetEnergy { labs });
        }
        return;
    }
    task.state = BoostState::WaitBoost;
    info!(room = %env.room, task = %task.id, "boost ready");
}

fn clear_resource(task: &mut BoostTask, env: &mut LabEnv<'_>) -> Outcome {
    let labs: Vec<NodeId> = task.labs().collect();
    narrow_loads(env.queue, &labs);
    if env.has_pending(JobKind::LabOut) {
        return Outcome::Keep;
    }
    let dirty: Vec<NodeId> = task
        .labs()
        .filter(|lab| env.mineral(*lab).is_some())
        .collect();
    if dirty.is_empty() {
        info!(room = %env.room, task = %task.id, "boost task finished");
        return Outcome::Remove;
    }
    env.publish(Job::LabOut { labs: dirty });
    Outcome::Keep
}

/// Republish pending loads (substances in, or a boost reload) without the
/// entries aimed at `labs`, so they cannot refill labs that are being
/// emptied. A load left with no entries is finished by its carrier.
pub(crate) fn narrow_loads(queue: &mut TransportQueue, labs: &[NodeId]) {
    for kind in [JobKind::LabIn, JobKind::BoostGetResource] {
        let narrowed = queue.find(kind).and_then(|(_, job)| match job {
            Job::LabIn { resources } | Job::BoostGetResource { resources }
                if resources.iter().any(|r| labs.contains(&r.lab)) =>
            {
                let kept: Vec<LabResource> = resources
                    .iter()
                    .copied()
                    .filter(|r| !labs.contains(&r.lab))
                    .collect();
                Some(match job {
                    Job::LabIn { .. } => Job::LabIn { resources: kept },
                    _ => Job::BoostGetResource { resources: kept },
                })
            }
            _ => None,
        });
        if let Some(job) = narrowed {
            let id = queue.add(job);
            debug!(job = %id, %kind, "lab load narrowed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn record_orders_labs_by_id() {
        let mut sm = SlotMap::<NodeId, ()>::with_key();
        let a = sm.insert(());
        let b = sm.insert(());
        let c = sm.insert(());
        let mut task = BoostTask::new(
            BoostTaskId(1),
            &[
                BoostSpec::new(ResourceType(3), 30),
                BoostSpec::new(ResourceType(4), 60),
                BoostSpec::new(ResourceType(5), 90),
            ],
        );
        task.slots[0].lab = Some(c);
        task.slots[1].lab = Some(a);
        task.slots[2].lab = Some(b);

        let record = BoostingRecord::new(&task);
        let labs: Vec<NodeId> = record.entries.iter().map(|e| e.lab).collect();
        assert_eq!(labs, vec![a, b, c]);
        assert!(!record.is_complete());
    }

    #[test]
    fn lab_resources_skip_unassigned_slots() {
        let mut sm = SlotMap::<NodeId, ()>::with_key();
        let lab = sm.insert(());
        let mut task = BoostTask::new(
            BoostTaskId(0),
            &[BoostSpec::new(ResourceType(3), 30), BoostSpec::new(ResourceType(4), 60)],
        );
        task.slots[1].lab = Some(lab);
        assert_eq!(
            task.lab_resources(),
            vec![LabResource {
                lab,
                resource: ResourceType(4),
                amount: 60
            }]
        );
        assert_eq!(task.state, BoostState::GetLab);
    }
}
