use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a node action primitive (withdraw, transfer, react, boost).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionResult {
    Ok,
    NotInRange,
    NotEnoughResources,
    Full,
    InvalidTarget,
    InvalidArgs,
    NotFound,
    /// The acting node is still cooling down.
    Tired,
}

/// Coarse handling class for an [`ActionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultClass {
    /// The action happened.
    Success,
    /// Not enough to take, or no room to give. Re-evaluate targets.
    Exhausted,
    /// Retry next tick without changing state.
    Transient,
    /// Log and stay in the current phase.
    Unexpected,
}

impl ActionResult {
    pub fn is_ok(self) -> bool {
        self == ActionResult::Ok
    }

    pub fn class(self) -> ResultClass {
        match self {
            ActionResult::Ok => ResultClass::Success,
            ActionResult::NotEnoughResources | ActionResult::Full => ResultClass::Exhausted,
            ActionResult::NotInRange | ActionResult::Tired => ResultClass::Transient,
            ActionResult::InvalidTarget | ActionResult::InvalidArgs | ActionResult::NotFound => {
                ResultClass::Unexpected
            }
        }
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionResult::Ok => "ok",
            ActionResult::NotInRange => "not_in_range",
            ActionResult::NotEnoughResources => "not_enough_resources",
            ActionResult::Full => "full",
            ActionResult::InvalidTarget => "invalid_target",
            ActionResult::InvalidArgs => "invalid_args",
            ActionResult::NotFound => "not_found",
            ActionResult::Tired => "tired",
        };
        f.write_str(s)
    }
}
