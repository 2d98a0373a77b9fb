//! The reaction pipeline: pick a target compound, load the two base labs,
//! run reactions until an input runs dry, then drain every lab back to the
//! terminal.

use crate::cursor::RingCursor;
use crate::env::{LabEnv, due};
use crate::error::LabError;
use depot_core::action::ActionResult;
use depot_core::config::{LabSettings, ReactionTarget};
use depot_core::id::{NodeId, ResourceType};
use depot_core::registry::Registry;
use depot_transport::job::{Job, JobKind, LabResource};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionState {
    #[default]
    GetTarget,
    GetResource,
    Working,
    PutResource,
}

impl ReactionState {
    /// Ticks between polls of this state.
    pub fn interval(self, settings: &LabSettings) -> u64 {
        match self {
            ReactionState::GetTarget => settings.get_target_interval,
            ReactionState::GetResource => settings.get_resource_interval,
            ReactionState::Working => settings.working_interval,
            ReactionState::PutResource => settings.put_resource_interval,
        }
    }
}

impl fmt::Display for ReactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReactionState::GetTarget => "get_target",
            ReactionState::GetResource => "get_resource",
            ReactionState::Working => "working",
            ReactionState::PutResource => "put_resource",
        })
    }
}

/// Persisted reaction pipeline state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionMemory {
    pub state: ReactionState,
    /// Position in the target list.
    pub cursor: RingCursor,
    /// Amount loaded into each base lab for the current batch; 0 when idle.
    pub pending: u32,
    /// Working is skipped before this tick.
    pub cooldown_until: u64,
    pub paused: bool,
}

impl ReactionMemory {
    /// Abandon the current batch and drain the labs.
    pub fn force_put_resource(&mut self) {
        self.state = ReactionState::PutResource;
        self.pending = 0;
    }

    fn next_target(&mut self, len: usize) {
        self.state = ReactionState::GetTarget;
        self.pending = 0;
        self.cursor.advance(len);
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// A configured target resolved against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub name: String,
    pub product: ResourceType,
    pub inputs: [ResourceType; 2],
    pub amount: u32,
}

pub fn resolve_targets(
    targets: &[ReactionTarget],
    registry: &Registry,
) -> Result<Vec<ResolvedTarget>, LabError> {
    targets
        .iter()
        .map(|t| {
            let product = registry
                .resource(&t.target)
                .ok_or_else(|| LabError::UnknownResource(t.target.clone()))?;
            let inputs = registry
                .reaction_inputs(product)
                .ok_or_else(|| LabError::NoRecipe(t.target.clone()))?;
            Ok(ResolvedTarget {
                name: t.target.clone(),
                product,
                inputs,
                amount: t.amount,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Batch arithmetic
// ---------------------------------------------------------------------------

/// The largest multiple of `granularity` both inputs can cover.
pub fn achievable_amount(stocks: [u32; 2], granularity: u32) -> u32 {
    let min = stocks[0].min(stocks[1]);
    if granularity == 0 {
        return min;
    }
    min - min % granularity
}

/// Amount to load for one batch: capped by the batch limit, by what the
/// inputs allow, and by the remaining shortfall.
pub fn batch_size(max_batch: u32, achievable: u32, shortfall: u32) -> u32 {
    max_batch.min(achievable).min(shortfall)
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

pub(crate) fn step(memory: &mut ReactionMemory, env: &mut LabEnv<'_>, targets: &[ResolvedTarget]) {
    if !due(env.tick(), memory.state.interval(&env.settings.lab)) {
        return;
    }
    match memory.state {
        ReactionState::GetTarget => get_target(memory, env, targets),
        ReactionState::GetResource => get_resource(memory, env, targets),
        ReactionState::Working => working(memory, env),
        ReactionState::PutResource => put_resource(memory, env, targets.len()),
    }
}

fn get_target(memory: &mut ReactionMemory, env: &mut LabEnv<'_>, targets: &[ResolvedTarget]) {
    if env.base_labs().is_none() {
        return;
    }
    let Some(target) = memory.cursor.get(targets) else {
        memory.next_target(targets.len());
        return;
    };

    let current = env.stock(target.product);
    if current >= target.amount {
        debug!(room = %env.room, target = %target.name, current, "target stocked");
        memory.next_target(targets.len());
        return;
    }

    let stocks = target.inputs.map(|r| env.stock(r));
    let lab = &env.settings.lab;
    let achievable = achievable_amount(stocks, lab.granularity);
    if achievable == 0 {
        debug!(room = %env.room, target = %target.name, "inputs short");
        memory.next_target(targets.len());
        return;
    }

    memory.pending = batch_size(lab.max_batch, achievable, target.amount - current);
    memory.state = ReactionState::GetResource;
    info!(room = %env.room, target = %target.name, amount = memory.pending, "reaction target");
}

fn get_resource(memory: &mut ReactionMemory, env: &mut LabEnv<'_>, targets: &[ResolvedTarget]) {
    if env.has_pending(JobKind::LabIn) {
        return;
    }
    let (Some(base), Some(target)) = (env.base_labs(), memory.cursor.get(targets)) else {
        memory.force_put_resource();
        return;
    };
    let amount = memory.pending;

    let loaded = base
        .iter()
        .zip(target.inputs)
        .all(|(lab, input)| env.held(*lab, input) >= amount);
    if loaded {
        memory.state = ReactionState::Working;
        debug!(room = %env.room, target = %target.name, "base labs loaded");
        return;
    }

    let short = base
        .iter()
        .zip(target.inputs)
        .any(|(lab, input)| env.stock(input) + env.held(*lab, input) < amount);
    if short {
        warn!(room = %env.room, target = %target.name, amount, "inputs ran short, target skipped");
        memory.next_target(targets.len());
        return;
    }

    let resources = base
        .iter()
        .zip(target.inputs)
        .map(|(lab, resource)| LabResource {
            lab: *lab,
            resource,
            amount,
        })
        .collect();
    env.publish(Job::LabIn { resources });
}

fn working(memory: &mut ReactionMemory, env: &mut LabEnv<'_>) {
    let tick = env.tick();
    if tick < memory.cooldown_until {
        return;
    }
    let Some([a, b]) = env.base_labs() else {
        memory.state = ReactionState::PutResource;
        return;
    };

    for lab in env.reaction_labs() {
        match env.world.run_reaction(lab, a, b) {
            ActionResult::Ok => {}
            ActionResult::Tired => {
                let cooldown = env.world.node(lab).map_or(0, |n| n.cooldown);
                memory.cooldown_until = tick + u64::from(cooldown) + 1;
                return;
            }
            ActionResult::NotEnoughResources => {
                debug!(room = %env.room, "base labs exhausted");
                memory.state = ReactionState::PutResource;
                return;
            }
            other => warn!(room = %env.room, lab = ?lab, result = %other, "reaction failed"),
        }
    }
}

fn put_resource(memory: &mut ReactionMemory, env: &mut LabEnv<'_>, target_count: usize) {
    if env.has_pending(JobKind::LabOut) {
        return;
    }
    let mut labs: Vec<NodeId> = env.reaction_labs();
    labs.extend(env.remaining_base_labs());
    labs.retain(|lab| env.mineral(*lab).is_some());
    if !labs.is_empty() {
        env.publish(Job::LabOut { labs });
        return;
    }
    debug!(room = %env.room, "labs drained");
    memory.next_target(target_count);
}
