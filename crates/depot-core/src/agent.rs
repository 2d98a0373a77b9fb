use crate::id::{ResourceType, RoomName};
use crate::node::Position;
use crate::store::Store;
use serde::{Deserialize, Serialize};

/// A mobile agent: a carrier, or a unit waiting to be boosted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub room: RoomName,
    pub pos: Position,
    pub store: Store,
    /// Remaining lifetime in ticks. The agent is gone when this hits zero.
    pub ticks_to_live: u32,
    /// Substances already applied to this agent.
    pub boosts: Vec<ResourceType>,
}

impl Agent {
    pub fn new(room: RoomName, pos: Position, capacity: u32, ticks_to_live: u32) -> Self {
        Self {
            room,
            pos,
            store: Store::general(capacity),
            ticks_to_live,
            boosts: Vec::new(),
        }
    }

    pub fn is_boosted_with(&self, resource: ResourceType) -> bool {
        self.boosts.contains(&resource)
    }

    /// First carried resource, energy last.
    pub fn carried_resource(&self) -> Option<ResourceType> {
        self.store
            .mineral_type()
            .or_else(|| (self.store.used(ResourceType::ENERGY) > 0).then_some(ResourceType::ENERGY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carried_resource_prefers_minerals() {
        let mut agent = Agent::new(RoomName::new("W1N1"), Position::new(0, 0), 100, 1500);
        assert_eq!(agent.carried_resource(), None);
        let _ = agent.store.add(ResourceType::ENERGY, 10);
        assert_eq!(agent.carried_resource(), Some(ResourceType::ENERGY));
        let _ = agent.store.add(ResourceType(4), 10);
        assert_eq!(agent.carried_resource(), Some(ResourceType(4)));
    }
}
