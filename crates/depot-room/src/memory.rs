//! Persisted room state.
//!
//! A [`RoomMemory`] holds everything a room needs to resume after a restart:
//! the lab controller's memory, the transport queue and every carrier's
//! memory. It is encoded with `bitcode` behind a versioned header. Lab roles
//! and resolved reaction targets are not stored; they are derived again from
//! the world and the settings.

use depot_core::id::{AgentId, RoomName};
use depot_lab::LabMemory;
use depot_transport::carrier::CarrierMemory;
use depot_transport::queue::TransportQueue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a room memory blob.
pub const MEMORY_MAGIC: u32 = 0xDE90_0001;

/// Current format version. Increment when breaking the layout.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", MEMORY_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("memory from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryHeader {
    pub magic: u32,
    pub version: u32,
    /// Tick the memory was taken at.
    pub tick: u64,
}

impl MemoryHeader {
    pub fn new(tick: u64) -> Self {
        Self {
            magic: MEMORY_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), MemoryError> {
        if self.magic != MEMORY_MAGIC {
            return Err(MemoryError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(MemoryError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(MemoryError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Room memory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMemory {
    pub header: MemoryHeader,
    pub room: RoomName,
    pub lab: LabMemory,
    pub queue: TransportQueue,
    pub carriers: BTreeMap<AgentId, CarrierMemory>,
}

impl RoomMemory {
    pub fn encode(&self) -> Result<Vec<u8>, MemoryError> {
        bitcode::serialize(self).map_err(|e| MemoryError::Encode(e.to_string()))
    }

    /// Decode a blob, rejecting it unless the header matches this build.
    pub fn decode(data: &[u8]) -> Result<Self, MemoryError> {
        let memory: RoomMemory =
            bitcode::deserialize(data).map_err(|e| MemoryError::Decode(e.to_string()))?;
        memory.header.validate()?;
        Ok(memory)
    }
}
