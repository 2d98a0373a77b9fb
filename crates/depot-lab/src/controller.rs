//! Per-room lab controller: owns the reaction pipeline, the boost tasks and
//! the lab roles both pipelines share.

use crate::boost::{self, BoostSpec, BoostState, BoostTask, BoostTaskId, BoostingRecord, Outcome};
use crate::env::{LabEnv, due};
use crate::error::LabError;
use crate::reaction::{self, ReactionMemory, ReactionState, ResolvedTarget, resolve_targets};
use crate::roles::{LabRole, LabRoles};
use depot_core::action::ActionResult;
use depot_core::config::{LabSettings, Settings};
use depot_core::id::{AgentId, NodeId, RoomName};
use depot_core::node::NodeKind;
use depot_core::registry::Registry;
use depot_core::sim::{ACTION_RANGE, LAB_MINERAL_CAPACITY};
use depot_core::world::{self, WorldView};
use depot_transport::job::Job;
use depot_transport::queue::TransportQueue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::{debug, info};

// ===========================================================================
// Memory
// ===========================================================================

/// Everything the controller persists between ticks. Roles and resolved
/// targets are derived from this plus the world and settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabMemory {
    pub reaction: ReactionMemory,
    pub base: Option<[NodeId; 2]>,
    pub tasks: BTreeMap<BoostTaskId, BoostTask>,
    pub records: BTreeMap<AgentId, BoostingRecord>,
    pub next_task: u64,
    /// Tick of the last [`LabController::run`]; a second run in the same
    /// tick is a no-op.
    pub last_run: Option<u64>,
}

/// Snapshot for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabStatus {
    pub room: RoomName,
    pub paused: bool,
    pub state: ReactionState,
    pub target: Option<String>,
    pub pending: u32,
    pub base_labs: Option<[NodeId; 2]>,
    pub reaction_labs: usize,
    pub boost_labs: usize,
    pub tasks: Vec<(BoostTaskId, BoostState)>,
}

impl fmt::Display for LabStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.room)?;
        if self.paused {
            f.write_str("paused")?;
        } else {
            write!(f, "{}", self.state)?;
            if let Some(target) = &self.target {
                write!(f, " {target}")?;
            }
            if self.pending > 0 {
                write!(f, " x{}", self.pending)?;
            }
        }
        write!(
            f,
            ", {} reacting, {} boosting, {} tasks",
            self.reaction_labs,
            self.boost_labs,
            self.tasks.len()
        )
    }
}

// ===========================================================================
// Controller
// ===========================================================================

#[derive(Debug, Clone)]
pub struct LabController {
    room: RoomName,
    targets: Vec<ResolvedTarget>,
    memory: LabMemory,
    roles: LabRoles,
}

impl LabController {
    pub fn new(room: RoomName, settings: &LabSettings, registry: &Registry) -> Result<Self, LabError> {
        Self::restore(room, LabMemory::default(), settings, registry)
    }

    /// Rebuild a controller from persisted memory. Roles are derived on the
    /// next [`run`](Self::run).
    pub fn restore(
        room: RoomName,
        memory: LabMemory,
        settings: &LabSettings,
        registry: &Registry,
    ) -> Result<Self, LabError> {
        Ok(Self {
            room,
            targets: resolve_targets(&settings.targets, registry)?,
            memory,
            roles: LabRoles::default(),
        })
    }

    pub fn room(&self) -> &RoomName {
        &self.room
    }

    pub fn memory(&self) -> &LabMemory {
        &self.memory
    }

    pub fn roles(&self) -> &LabRoles {
        &self.roles
    }

    pub fn targets(&self) -> &[ResolvedTarget] {
        &self.targets
    }

    /// Recompute every lab's role from the labs present, the labs held by
    /// boost tasks and the base pair.
    pub fn refresh_roles(&mut self, world: &dyn WorldView) {
        self.roles = derive_roles(world, &self.room, &self.memory.tasks, self.memory.base);
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance the boost tasks, then the reaction pipeline.
    pub fn run(&mut self, world: &mut dyn WorldView, queue: &mut TransportQueue, settings: &Settings) {
        let tick = world.tick();
        if self.memory.last_run == Some(tick) {
            return;
        }
        self.memory.last_run = Some(tick);
        self.refresh_roles(&*world);

        let LabMemory {
            reaction: pipeline,
            base,
            tasks,
            records,
            ..
        } = &mut self.memory;
        let mut env = LabEnv {
            world,
            queue,
            room: &self.room,
            roles: &mut self.roles,
            base: *base,
            settings,
        };

        if !tasks.is_empty() && due(tick, settings.lab.boost_interval) {
            let mut finished = Vec::new();
            for task in tasks.values_mut() {
                if boost::step(task, &mut env, pipeline) == Outcome::Remove {
                    finished.push(task.id);
                }
            }
            if !finished.is_empty() {
                tasks.retain(|id, _| !finished.contains(id));
                records.retain(|_, r| !finished.contains(&r.task));
                *env.roles = derive_roles(&*env.world, env.room, tasks, *base);
            }
        }

        if !pipeline.paused {
            reaction::step(pipeline, &mut env, &self.targets);
        }
    }

    // -----------------------------------------------------------------------
    // Reaction control
    // -----------------------------------------------------------------------

    pub fn pause(&mut self) {
        self.memory.reaction.paused = true;
        info!(room = %self.room, "reactions paused");
    }

    pub fn resume(&mut self) {
        self.memory.reaction.paused = false;
        info!(room = %self.room, "reactions resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.memory.reaction.paused
    }

    /// Nominate the two labs that hold reaction inputs. A batch in progress
    /// is abandoned and drained.
    pub fn set_base_labs(&mut self, world: &dyn WorldView, a: NodeId, b: NodeId) -> Result<(), LabError> {
        if a == b {
            return Err(LabError::SameBaseLab);
        }
        for id in [a, b] {
            let in_room = world
                .node(id)
                .is_some_and(|n| n.kind == NodeKind::Lab && n.room == self.room);
            if !in_room {
                return Err(LabError::NotALab(id));
            }
        }
        self.memory.base = Some([a, b]);
        if self.memory.reaction.state != ReactionState::GetTarget {
            self.memory.reaction.force_put_resource();
        }
        self.refresh_roles(world);
        info!(room = %self.room, base = ?[a, b], "base labs set");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Boost tasks
    // -----------------------------------------------------------------------

    /// Queue a boost task. Labs are assigned on the next boost poll.
    pub fn add_boost_task(&mut self, specs: &[BoostSpec]) -> Result<BoostTaskId, LabError> {
        if specs.is_empty() {
            return Err(LabError::EmptyBoostSpec);
        }
        let mut seen = HashSet::new();
        for spec in specs {
            if spec.amount == 0 || spec.amount > LAB_MINERAL_CAPACITY {
                return Err(LabError::InvalidAmount {
                    resource: spec.resource,
                    amount: spec.amount,
                    max: LAB_MINERAL_CAPACITY,
                });
            }
            if spec.resource.is_energy() {
                return Err(LabError::UnknownResource(spec.resource.to_string()));
            }
            if !seen.insert(spec.resource) {
                return Err(LabError::DuplicateResource(spec.resource));
            }
        }

        let id = BoostTaskId(self.memory.next_task);
        self.memory.next_task += 1;
        self.memory.tasks.insert(id, BoostTask::new(id, specs));
        info!(room = %self.room, task = %id, substances = specs.len(), "boost task added");
        Ok(id)
    }

    /// Cancel a task outright, sending its leftovers back to the terminal.
    pub fn remove_boost_task(
        &mut self,
        world: &dyn WorldView,
        queue: &mut TransportQueue,
        id: BoostTaskId,
    ) -> Result<(), LabError> {
        let task = self.memory.tasks.remove(&id).ok_or(LabError::UnknownTask(id))?;
        let labs: Vec<NodeId> = task.labs().collect();
        boost::narrow_loads(queue, &labs);
        let dirty: Vec<NodeId> = task
            .labs()
            .filter(|lab| world.node(*lab).is_some_and(|n| n.store.mineral_type().is_some()))
            .collect();
        if !dirty.is_empty() {
            queue.add(Job::BoostClear { labs: dirty });
        }
        self.memory.records.retain(|_, r| r.task != id);
        self.refresh_roles(world);
        info!(room = %self.room, task = %id, "boost task removed");
        Ok(())
    }

    pub fn boost_state(&self, id: BoostTaskId) -> Option<BoostState> {
        self.memory.tasks.get(&id).map(|t| t.state)
    }

    pub fn boost_task(&self, id: BoostTaskId) -> Option<&BoostTask> {
        self.memory.tasks.get(&id)
    }

    /// Stop boosting and start returning the task's labs.
    pub fn finish_boost(&mut self, id: BoostTaskId) -> Result<(), LabError> {
        let task = self.memory.tasks.get_mut(&id).ok_or(LabError::UnknownTask(id))?;
        task.state = BoostState::ClearResource;
        info!(room = %self.room, task = %id, "boost finished");
        Ok(())
    }

    /// Drive one agent through a ready boost task. Returns `true` once the
    /// agent has nothing left to receive, or the task no longer exists.
    /// Returns `false` while the task is still being prepared.
    pub fn boost_agent(
        &mut self,
        world: &mut dyn WorldView,
        queue: &mut TransportQueue,
        agent: AgentId,
        task_id: BoostTaskId,
        settings: &Settings,
    ) -> bool {
        let LabMemory { tasks, records, .. } = &mut self.memory;
        let Some(task) = tasks.get(&task_id) else {
            records.remove(&agent);
            return true;
        };
        if world.agent(agent).is_none() {
            records.remove(&agent);
            return true;
        }
        if task.state != BoostState::WaitBoost {
            return false;
        }

        let record = records
            .entry(agent)
            .or_insert_with(|| BoostingRecord::new(task));
        if record.task != task_id {
            *record = BoostingRecord::new(task);
        }

        let mut moving = false;
        let mut reload = false;
        for entry in record.entries.iter_mut().filter(|e| !e.boosted) {
            let Some(pos) = world.node(entry.lab).map(|n| n.pos) else {
                entry.boosted = true;
                continue;
            };
            match world.boost_agent(entry.lab, agent) {
                ActionResult::Ok => {
                    entry.boosted = true;
                    reload |= needs_reload(&*world, &self.room, entry.lab, settings);
                }
                ActionResult::NotFound => entry.boosted = true,
                _ => {}
            }
            if !moving && !entry.boosted {
                world.move_toward(agent, pos, ACTION_RANGE);
                moving = true;
            }
        }

        if reload {
            queue.add(Job::BoostGetResource {
                resources: task.lab_resources(),
            });
        }
        if record.is_complete() {
            records.remove(&agent);
            info!(room = %self.room, agent = ?agent, task = %task_id, "agent boosted");
            return true;
        }
        false
    }

    // -----------------------------------------------------------------------
    // Reporting
    // -----------------------------------------------------------------------

    pub fn status(&self) -> LabStatus {
        let reaction = &self.memory.reaction;
        let target = match reaction.state {
            ReactionState::GetTarget => None,
            _ => reaction.cursor.get(&self.targets).map(|t| t.name.clone()),
        };
        LabStatus {
            room: self.room.clone(),
            paused: reaction.paused,
            state: reaction.state,
            target,
            pending: reaction.pending,
            base_labs: self.memory.base,
            reaction_labs: self.roles.count(LabRole::Reaction),
            boost_labs: self.roles.count(LabRole::Boost),
            tasks: self
                .memory
                .tasks
                .values()
                .map(|t| (t.id, t.state))
                .collect(),
        }
    }
}

fn derive_roles(
    world: &dyn WorldView,
    room: &RoomName,
    tasks: &BTreeMap<BoostTaskId, BoostTask>,
    base: Option<[NodeId; 2]>,
) -> LabRoles {
    let labs = world.nodes(room, NodeKind::Lab);
    LabRoles::derive(&labs, tasks.values().flat_map(BoostTask::labs), base)
}

/// A boost lab dropped below the reload limit and the terminal can top it up.
fn needs_reload(world: &dyn WorldView, room: &RoomName, lab: NodeId, settings: &Settings) -> bool {
    let Some(mineral) = world.node(lab).and_then(|n| n.store.mineral_type()) else {
        return false;
    };
    let below = world::amount_in(world, lab, mineral) < settings.transport.boost_reload_limit;
    let stocked = world::terminal(world, room)
        .is_some_and(|t| world::amount_in(world, t, mineral) > 0);
    if below && stocked {
        debug!(room = %room, lab = ?lab, resource = %mineral, "boost lab needs reload");
    }
    below && stocked
}
