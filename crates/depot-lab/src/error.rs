use crate::boost::BoostTaskId;
use depot_core::id::{NodeId, ResourceType};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LabError {
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    #[error("{0} has no reaction recipe")]
    NoRecipe(String),
    #[error("boost task needs at least one substance")]
    EmptyBoostSpec,
    #[error("boost amount {amount} of {resource} is outside 1..={max}")]
    InvalidAmount {
        resource: ResourceType,
        amount: u32,
        max: u32,
    },
    #[error("{0} requested twice in one boost task")]
    DuplicateResource(ResourceType),
    #[error("{0:?} is not a lab in this room")]
    NotALab(NodeId),
    #[error("base labs must be two different labs")]
    SameBaseLab,
    #[error("unknown boost task: {0}")]
    UnknownTask(BoostTaskId),
}
