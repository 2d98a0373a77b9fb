//! Boost lab jobs: reloading boost substances and clearing leftovers.

use super::{CarrierCtx, batch_amount, lab_mineral};
use crate::carrier::Step;
use crate::job::LabResource;
use depot_core::action::ActionResult;
use depot_core::id::{NodeId, ResourceType};
use depot_core::world::{self, WorldView};
use tracing::warn;

// ---------------------------------------------------------------------------
// Reload
// ---------------------------------------------------------------------------

fn entry_for(resources: &[LabResource], resource: ResourceType) -> Option<&LabResource> {
    resources.iter().find(|e| e.resource == resource)
}

pub(super) fn acquire_reload(ctx: &mut CarrierCtx<'_>, resources: &[LabResource]) -> Step {
    let Some(terminal) = ctx.terminal() else {
        warn!(room = %ctx.room, agent = ?ctx.agent, "boost reload without terminal, job dropped");
        return Step::Finish;
    };
    let limit = ctx.settings.boost_reload_limit;
    let world: &dyn WorldView = &*ctx.world;
    let resource = ctx.memory.task_resource.resolve(
        |r| entry_for(resources, r).is_some_and(|e| world.node(e.lab).is_some()),
        || {
            resources
                .iter()
                .find(|e| {
                    world::amount_in(world, terminal, e.resource) > 0
                        && world
                            .node(e.lab)
                            .is_some_and(|n| n.store.used(e.resource) < limit)
                })
                .map(|e| e.resource)
        },
    );
    let Some(resource) = resource else {
        return Step::Finish;
    };

    if !ctx.purge(|r| r == resource) {
        return Step::Continue;
    }
    if ctx.carried(resource) > 0 {
        return Step::Advance;
    }

    let lab_free = entry_for(resources, resource)
        .and_then(|e| ctx.world.node(e.lab))
        .map_or(0, |n| n.store.free_capacity(resource));
    let available = ctx.amount_in(terminal, resource);
    let Some(amount) = batch_amount(ctx.free(resource), available, lab_free) else {
        ctx.memory.task_resource.clear();
        return Step::Continue;
    };

    match ctx.withdraw(terminal, resource, Some(amount)) {
        ActionResult::Ok | ActionResult::Full => Step::Advance,
        ActionResult::NotInRange => Step::Continue,
        other => {
            ctx.unexpected("boost_reload_withdraw", other);
            Step::Continue
        }
    }
}

pub(super) fn deliver_reload(ctx: &mut CarrierCtx<'_>, resources: &[LabResource]) -> Step {
    let Some(resource) = ctx.memory.task_resource.get() else {
        return Step::Advance;
    };
    let Some(lab) = entry_for(resources, resource).map(|e| e.lab) else {
        ctx.memory.task_resource.clear();
        return Step::Advance;
    };

    match ctx.transfer(lab, resource, None) {
        ActionResult::Ok | ActionResult::Full | ActionResult::InvalidTarget => {
            ctx.memory.task_resource.clear();
            Step::Advance
        }
        ActionResult::NotInRange => Step::Continue,
        ActionResult::NotEnoughResources | ActionResult::InvalidArgs => Step::Advance,
        other => {
            ctx.unexpected("boost_reload_transfer", other);
            Step::Continue
        }
    }
}

// ---------------------------------------------------------------------------
// Clear
// ---------------------------------------------------------------------------

pub(super) fn acquire_clear(ctx: &mut CarrierCtx<'_>, labs: &[NodeId]) -> Step {
    let world = &*ctx.world;
    let Some((lab, mineral)) = labs
        .iter()
        .find_map(|id| lab_mineral(world, *id).map(|m| (*id, m)))
    else {
        let holding = ctx
            .agent()
            .and_then(|a| a.store.mineral_type())
            .is_some();
        return if holding { Step::Advance } else { Step::Finish };
    };
    if !ctx.purge_energy() {
        return Step::Continue;
    }

    match ctx.withdraw(lab, mineral, None) {
        ActionResult::Ok | ActionResult::Full => Step::Advance,
        ActionResult::NotInRange => Step::Continue,
        other => {
            ctx.unexpected("boost_clear_withdraw", other);
            Step::Continue
        }
    }
}

pub(super) fn deliver_clear(ctx: &mut CarrierCtx<'_>) -> Step {
    let Some(terminal) = ctx.terminal() else {
        warn!(room = %ctx.room, agent = ?ctx.agent, "boost clear without terminal, job dropped");
        return Step::Finish;
    };
    let Some(carried) = ctx.carried_resource() else {
        return Step::Advance;
    };
    match ctx.transfer(terminal, carried, None) {
        ActionResult::Ok => Step::Advance,
        other => ctx.dispatch("boost_clear_transfer", other),
    }
}
