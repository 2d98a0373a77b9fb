//! Every room the colony controls, stepped together.

use crate::memory::{MemoryError, RoomMemory};
use crate::room::{Room, RoomError, RoomReport};
use depot_core::config::{ConfigError, Settings};
use depot_core::id::RoomName;
use depot_core::registry::Registry;
use depot_core::world::WorldView;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ColonyReport {
    pub rooms: BTreeMap<RoomName, RoomReport>,
    /// Rooms whose step failed this tick.
    pub failed: Vec<RoomName>,
}

#[derive(Debug)]
pub struct Colony {
    settings: Settings,
    registry: Registry,
    rooms: BTreeMap<RoomName, Room>,
}

impl Colony {
    pub fn new(settings: Settings, registry: Registry) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            settings,
            registry,
            rooms: BTreeMap::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Start managing a room. An existing room of the same name is kept.
    pub fn add_room(&mut self, name: RoomName) -> Result<&mut Room, RoomError> {
        match self.rooms.entry(name) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let room = Room::new(entry.key().clone(), &self.settings, &self.registry)?;
                info!(room = %entry.key(), "room added");
                Ok(entry.insert(room))
            }
        }
    }

    pub fn remove_room(&mut self, name: &RoomName) -> Option<Room> {
        self.rooms.remove(name)
    }

    pub fn room(&self, name: &RoomName) -> Option<&Room> {
        self.rooms.get(name)
    }

    pub fn room_mut(&mut self, name: &RoomName) -> Option<&mut Room> {
        self.rooms.get_mut(name)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Step every room. A failing room is logged and skipped; the others
    /// still run.
    pub fn step(&mut self, world: &mut dyn WorldView) -> ColonyReport {
        let mut report = ColonyReport::default();
        for (name, room) in self.rooms.iter_mut() {
            match room.step(world, &self.settings) {
                Ok(r) => {
                    report.rooms.insert(name.clone(), r);
                }
                Err(e) => {
                    warn!(room = %name, error = %e, "room step failed");
                    report.failed.push(name.clone());
                }
            }
        }
        report
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Encode every room's memory.
    pub fn save(&self, tick: u64) -> Result<BTreeMap<RoomName, Vec<u8>>, MemoryError> {
        self.rooms
            .iter()
            .map(|(name, room)| Ok((name.clone(), room.to_memory(tick).encode()?)))
            .collect()
    }

    /// Replace (or add) a room from an encoded memory blob.
    pub fn load_room(&mut self, data: &[u8]) -> Result<RoomName, LoadError> {
        let memory = RoomMemory::decode(data)?;
        let room = Room::from_memory(memory, &self.settings, &self.registry)?;
        let name = room.name().clone();
        info!(room = %name, "room restored");
        self.rooms.insert(name.clone(), room);
        Ok(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error(transparent)]
    Room(#[from] RoomError),
}
