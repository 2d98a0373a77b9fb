//! Single-shot fills of nukers and power spawns: one withdraw, one deposit.

use super::{CarrierCtx, batch_amount};
use crate::carrier::{Phase, Step};
use depot_core::action::ActionResult;
use depot_core::id::{NodeId, ResourceType};
use tracing::warn;

pub(super) fn step(
    ctx: &mut CarrierCtx<'_>,
    phase: Phase,
    target: NodeId,
    resource: ResourceType,
) -> Step {
    match phase {
        Phase::Acquire => acquire(ctx, target, resource),
        Phase::Deliver => deliver(ctx, target, resource),
    }
}

fn acquire(ctx: &mut CarrierCtx<'_>, target: NodeId, resource: ResourceType) -> Step {
    if ctx.carried(resource) > 0 {
        return Step::Advance;
    }

    let source = if resource.is_energy() {
        ctx.energy_source()
    } else {
        ctx.terminal()
    };
    let target_free = ctx
        .world
        .node(target)
        .map(|n| n.store.free_capacity(resource));
    let (Some(source), Some(target_free)) = (source, target_free) else {
        warn!(room = %ctx.room, agent = ?ctx.agent, %resource, "supply source or target missing, job dropped");
        return Step::Finish;
    };

    if !ctx.purge_energy() {
        return Step::Continue;
    }

    let available = ctx.amount_in(source, resource);
    let Some(amount) = batch_amount(ctx.free(resource), available, target_free) else {
        warn!(room = %ctx.room, agent = ?ctx.agent, %resource, "nothing to supply, job dropped");
        return Step::Finish;
    };

    match ctx.withdraw(source, resource, Some(amount)) {
        ActionResult::Ok => {
            ctx.memory.fill_target.set(target);
            Step::Advance
        }
        ActionResult::NotInRange => Step::Continue,
        other => {
            ctx.unexpected("supply_withdraw", other);
            Step::Continue
        }
    }
}

fn deliver(ctx: &mut CarrierCtx<'_>, target: NodeId, resource: ResourceType) -> Step {
    if ctx.world.node(target).is_none() {
        return Step::Finish;
    }
    match ctx.transfer(target, resource, None) {
        ActionResult::Ok | ActionResult::NotEnoughResources | ActionResult::Full => Step::Finish,
        ActionResult::NotInRange => Step::Continue,
        other => {
            ctx.unexpected("supply_transfer", other);
            Step::Continue
        }
    }
}
