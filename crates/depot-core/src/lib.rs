//! Depot Core -- the world model shared by the transport scheduler and the
//! lab pipelines.
//!
//! # Key Types
//!
//! - [`id`] -- `NodeId` / `AgentId` slotmap keys, `ResourceType`, `RoomName`.
//! - [`registry::Registry`] -- Immutable registry of resources and reaction
//!   recipes (frozen at startup).
//! - [`store::Store`] -- Capacity-bounded resource amounts held by a node or
//!   agent.
//! - [`node::ResourceNode`] -- A structure tagged by [`node::NodeKind`].
//! - [`world::WorldView`] -- The per-tick world context passed into every
//!   component; [`sim::SimWorld`] is the in-memory implementation.
//! - [`config::Settings`] -- Thresholds, intervals and reaction targets,
//!   loadable from RON, TOML or JSON.

pub mod action;
pub mod agent;
pub mod config;
pub mod id;
pub mod node;
pub mod registry;
pub mod sim;
pub mod store;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
