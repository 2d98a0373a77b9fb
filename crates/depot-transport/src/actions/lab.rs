//! Lab material jobs: substances in from the terminal, compounds back out.

use super::{CarrierCtx, batch_amount, lab_mineral};
use crate::carrier::Step;
use crate::job::LabResource;
use depot_core::action::ActionResult;
use depot_core::id::NodeId;
use depot_core::world::WorldView;
use tracing::warn;

/// Lab state for an entry: (held amount, free room), `None` if the lab is gone.
fn lab_fill(world: &dyn WorldView, entry: &LabResource) -> Option<(u32, u32)> {
    world.node(entry.lab).map(|n| {
        (
            n.store.used(entry.resource),
            n.store.free_capacity(entry.resource),
        )
    })
}

fn unmet(world: &dyn WorldView, entry: &LabResource) -> bool {
    lab_fill(world, entry).is_some_and(|(held, _)| held < entry.amount)
}

/// First entry whose lab still exists and holds less than requested.
fn next_unmet(world: &dyn WorldView, resources: &[LabResource]) -> Option<LabResource> {
    resources.iter().copied().find(|e| unmet(world, e))
}

// ---------------------------------------------------------------------------
// Lab in
// ---------------------------------------------------------------------------

pub(super) fn acquire_in(ctx: &mut CarrierCtx<'_>, resources: &[LabResource]) -> Step {
    let Some(terminal) = ctx.terminal() else {
        warn!(room = %ctx.room, agent = ?ctx.agent, "lab in without terminal, job dropped");
        return Step::Finish;
    };
    let Some(entry) = next_unmet(&*ctx.world, resources) else {
        return Step::Finish;
    };
    if !ctx.purge(|r| r == entry.resource) {
        return Step::Continue;
    }
    if ctx.carried(entry.resource) > 0 {
        return Step::Advance;
    }

    let (held, lab_free) = lab_fill(&*ctx.world, &entry).unwrap_or_default();
    let wanted = entry.amount.saturating_sub(held).min(lab_free);
    let available = ctx.amount_in(terminal, entry.resource);
    let Some(amount) = batch_amount(ctx.free(entry.resource), available, wanted) else {
        warn!(
            room = %ctx.room,
            lab = ?entry.lab,
            resource = %entry.resource,
            available,
            wanted,
            "lab in cannot proceed, job dropped"
        );
        return Step::Finish;
    };

    match ctx.withdraw(terminal, entry.resource, Some(amount)) {
        ActionResult::Ok => Step::Advance,
        ActionResult::NotEnoughResources => Step::Finish,
        ActionResult::NotInRange => Step::Continue,
        other => {
            ctx.unexpected("lab_in_withdraw", other);
            Step::Continue
        }
    }
}

pub(super) fn deliver_in(ctx: &mut CarrierCtx<'_>, resources: &[LabResource]) -> Step {
    let Some(carried) = ctx.carried_resource() else {
        return Step::Advance;
    };
    let world = &*ctx.world;
    let entry = resources
        .iter()
        .copied()
        .find(|e| e.resource == carried && unmet(world, e));
    let Some(entry) = entry else {
        // Nothing wants what we hold. The acquire phase returns it.
        return match next_unmet(world, resources) {
            Some(_) => Step::Advance,
            None => Step::Finish,
        };
    };

    let (held, lab_free) = lab_fill(world, &entry).unwrap_or_default();
    let amount = ctx
        .carried(carried)
        .min(entry.amount.saturating_sub(held))
        .min(lab_free);
    if amount == 0 {
        return Step::Finish;
    }
    match ctx.transfer(entry.lab, carried, Some(amount)) {
        ActionResult::Ok | ActionResult::NotEnoughResources => Step::Advance,
        ActionResult::Full | ActionResult::InvalidTarget => Step::Finish,
        ActionResult::NotInRange => Step::Continue,
        other => {
            ctx.unexpected("lab_in_transfer", other);
            Step::Continue
        }
    }
}

// ---------------------------------------------------------------------------
// Lab out
// ---------------------------------------------------------------------------

pub(super) fn acquire_out(ctx: &mut CarrierCtx<'_>, labs: &[NodeId]) -> Step {
    let world = &*ctx.world;
    let Some((lab, mineral)) = labs
        .iter()
        .find_map(|id| lab_mineral(world, *id).map(|m| (*id, m)))
    else {
        return Step::Advance;
    };
    if !ctx.purge_energy() {
        return Step::Continue;
    }

    match ctx.withdraw(lab, mineral, None) {
        ActionResult::Ok => {
            let full = ctx.agent().is_none_or(|a| a.store.free_total() == 0);
            if full { Step::Advance } else { Step::Continue }
        }
        ActionResult::Full => Step::Advance,
        ActionResult::NotInRange => Step::Continue,
        other => {
            ctx.unexpected("lab_out_withdraw", other);
            Step::Continue
        }
    }
}

pub(super) fn deliver_out(ctx: &mut CarrierCtx<'_>, labs: &[NodeId]) -> Step {
    let Some(terminal) = ctx.terminal() else {
        warn!(room = %ctx.room, agent = ?ctx.agent, "lab out without terminal, job dropped");
        return Step::Finish;
    };
    let Some(carried) = ctx.carried_resource() else {
        let world = &*ctx.world;
        let remaining = labs.iter().any(|id| lab_mineral(world, *id).is_some());
        return if remaining { Step::Advance } else { Step::Finish };
    };
    match ctx.transfer(terminal, carried, None) {
        ActionResult::Ok => Step::Continue,
        other => ctx.dispatch("lab_out_transfer", other),
    }
}
