use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Identifies a capacity-bearing node (structure) in the world.
    pub struct NodeId;

    /// Identifies a mobile agent (carrier, boosted unit, ...).
    pub struct AgentId;
}

/// Identifies a resource type in the registry. Cheap to copy and compare.
///
/// Id 0 is always energy; everything else is assigned by the
/// [`Registry`](crate::registry::Registry) in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceType(pub u32);

impl ResourceType {
    pub const ENERGY: ResourceType = ResourceType(0);

    pub fn is_energy(self) -> bool {
        self == Self::ENERGY
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource#{}", self.0)
    }
}

/// Name of a room. Rooms own their transport queue and lab controller.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomName(pub String);

impl RoomName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
