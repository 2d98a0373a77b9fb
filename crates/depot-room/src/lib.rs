//! Depot Room -- ties the transport queue, carriers and lab controller of
//! each room together and steps the whole colony once per tick.
//!
//! # Key Types
//!
//! - [`room::Room`] -- one room's queue, lab controller and carriers.
//! - [`colony::Colony`] -- all rooms; a failing room never stops the others.
//! - [`monitor`] -- publishes spawn, tower, nuker and power spawn fills.
//! - [`memory::RoomMemory`] -- versioned `bitcode` snapshot of a room.

pub mod colony;
pub mod memory;
pub mod monitor;
pub mod room;

pub use colony::{Colony, ColonyReport};
pub use memory::{MemoryError, RoomMemory};
pub use room::{Room, RoomError, RoomReport};
