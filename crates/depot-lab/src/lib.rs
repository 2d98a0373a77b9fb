//! Depot Lab -- the per-room lab controller.
//!
//! Two pipelines share one pool of labs:
//!
//! - the **reaction** pipeline ([`reaction`]) picks an under-stocked target
//!   compound, has carriers load the two base labs, runs reactions on every
//!   other lab, then has the results carried back to the terminal;
//! - the **boost** pipeline ([`boost`]) borrows labs for a boost task, loads
//!   them with substances and energy, applies them to agents, and returns
//!   the labs when the task ends.
//!
//! Both talk to carriers only through the room's
//! [`TransportQueue`](depot_transport::queue::TransportQueue).
//! [`controller::LabController`] owns the state and runs boost before
//! reaction each tick.

pub mod boost;
pub mod controller;
pub mod cursor;
mod env;
pub mod error;
pub mod reaction;
pub mod roles;

pub use boost::{BoostSpec, BoostState, BoostTaskId};
pub use controller::{LabController, LabMemory, LabStatus};
pub use error::LabError;
