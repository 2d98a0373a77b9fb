//! The carrier phase machine.
//!
//! A carrier alternates between [`Phase::Acquire`] (pick up) and
//! [`Phase::Deliver`] (drop off) for whatever job the queue hands it. Each
//! tick runs exactly one step of the current phase; the step's [`Step`]
//! result drives the transition.

use crate::actions::{self, CarrierCtx};
use crate::cache::{Cached, TargetCache};
use crate::job::{JobId, JobKind};
use crate::queue::TransportQueue;
use depot_core::action::ActionResult;
use depot_core::config::TransportSettings;
use depot_core::id::{AgentId, NodeId, ResourceType};
use depot_core::world::WorldView;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Phase machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Acquire,
    Deliver,
}

/// What a step function asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Stay in this phase and run it again next tick.
    Continue,
    /// Phase complete: switch to the other phase.
    Advance,
    /// The job's completion predicate holds: remove it from the queue.
    Finish,
}

impl Phase {
    /// Pure transition function. `Finish` returns to `Acquire` for the next
    /// job.
    pub fn next(self, step: Step) -> Phase {
        match (self, step) {
            (phase, Step::Continue) => phase,
            (Phase::Acquire, Step::Advance) => Phase::Deliver,
            (Phase::Deliver, Step::Advance) => Phase::Acquire,
            (_, Step::Finish) => Phase::Acquire,
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Per-carrier state persisted between ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierMemory {
    pub job: Option<JobId>,
    pub phase: Phase,
    /// Cached delivery target for extension, tower, nuker and power spawn
    /// fills.
    pub fill_target: TargetCache,
    /// Cached boost substance being reloaded.
    pub task_resource: Cached<ResourceType>,
    /// Configured energy source. Storage when unset or gone.
    pub source: Option<NodeId>,
}

impl CarrierMemory {
    pub fn with_source(source: NodeId) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    /// Start over for a new (or no) job.
    pub fn reset(&mut self, job: Option<JobId>) {
        self.job = job;
        self.phase = Phase::Acquire;
        self.fill_target.clear();
        self.task_resource.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierStatus {
    Working(JobKind),
    Idle,
    /// Near end of life, still emptying its store.
    Retiring,
    /// Empty and near end of life. The room should forget it.
    Retired,
}

#[derive(Debug, thiserror::Error)]
pub enum CarrierError {
    #[error("carrier {0:?} not found")]
    AgentNotFound(AgentId),
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Run one tick for one carrier.
pub fn run_carrier(
    agent: AgentId,
    memory: &mut CarrierMemory,
    world: &mut dyn WorldView,
    queue: &mut TransportQueue,
    settings: &TransportSettings,
) -> Result<CarrierStatus, CarrierError> {
    let (room, ticks_to_live) = world
        .agent(agent)
        .map(|a| (a.room.clone(), a.ticks_to_live))
        .ok_or(CarrierError::AgentNotFound(agent))?;

    let mut ctx = CarrierCtx {
        world,
        agent,
        room,
        memory,
        settings,
    };

    if ticks_to_live <= settings.death_limit {
        queue.release(agent);
        ctx.memory.reset(None);
        return Ok(death_prepare(&mut ctx));
    }

    let Some(job_id) = queue.assign(agent) else {
        match ctx.agent().and_then(|a| a.store.mineral_type()) {
            Some(mineral) => return_cargo(&mut ctx, mineral),
            None if ctx.memory.job.is_some() => ctx.memory.reset(None),
            None => {}
        }
        debug!(room = %ctx.room, agent = ?agent, "carrier idle");
        return Ok(CarrierStatus::Idle);
    };
    if ctx.memory.job != Some(job_id) {
        ctx.memory.reset(Some(job_id));
    }

    let Some(job) = queue.get(job_id) else {
        return Ok(CarrierStatus::Idle);
    };
    let kind = job.kind();
    let step = actions::run(job, &mut ctx);

    match step {
        Step::Finish => {
            queue.remove(job_id);
            ctx.memory.reset(None);
            debug!(room = %ctx.room, agent = ?agent, job = %job_id, %kind, "job finished");
        }
        Step::Advance | Step::Continue => {
            ctx.memory.phase = ctx.memory.phase.next(step);
        }
    }
    Ok(CarrierStatus::Working(kind))
}

/// Empty the carrier before it expires.
fn death_prepare(ctx: &mut CarrierCtx<'_>) -> CarrierStatus {
    let Some(resource) = ctx
        .agent()
        .and_then(|a| a.store.resources().next().map(|(r, _)| r))
    else {
        info!(room = %ctx.room, agent = ?ctx.agent, "carrier retired");
        return CarrierStatus::Retired;
    };
    stow(ctx, resource);
    CarrierStatus::Retiring
}

/// Cargo left over from a job another carrier finished. The interrupted
/// delivery is completed while its target has room; otherwise the cargo is
/// stowed.
fn return_cargo(ctx: &mut CarrierCtx<'_>, resource: ResourceType) {
    let target = match ctx.memory.phase {
        Phase::Deliver => ctx.memory.fill_target.get(),
        Phase::Acquire => None,
    };
    let target = target.filter(|id| {
        ctx.world
            .node(*id)
            .is_some_and(|n| n.store.free_capacity(resource) > 0)
    });
    let Some(target) = target else {
        ctx.memory.reset(None);
        stow(ctx, resource);
        return;
    };
    match ctx.transfer(target, resource, None) {
        ActionResult::NotInRange => {}
        ActionResult::Ok => ctx.memory.reset(None),
        _ => ctx.memory.fill_target.clear(),
    }
}

/// Take one carried resource home: minerals to the terminal, energy to the
/// carrier's energy source. Whatever does not fit there is dropped.
fn stow(ctx: &mut CarrierCtx<'_>, resource: ResourceType) {
    let target = if resource.is_energy() {
        ctx.energy_source()
    } else {
        ctx.terminal().or_else(|| ctx.energy_source())
    };
    let Some(target) = target else {
        return;
    };
    match ctx.transfer(target, resource, None) {
        ActionResult::Ok | ActionResult::NotInRange => {}
        ActionResult::Full => {
            ctx.world.drop_resource(ctx.agent, resource, None);
        }
        other => ctx.unexpected("stow", other),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
