//! Depot Transport -- the per-room carrier scheduler.
//!
//! Controllers publish [`job::Job`]s into a [`queue::TransportQueue`]; every
//! carrier asks the queue for a job each tick and runs one step of the
//! matching acquire/deliver logic through [`carrier::run_carrier`].
//!
//! # Key Types
//!
//! - [`job::Job`] / [`job::JobKind`] -- What needs moving, keyed for
//!   idempotent publication.
//! - [`queue::TransportQueue`] -- Pending jobs and carrier assignments.
//! - [`carrier::CarrierMemory`] -- Phase and cached targets of one carrier.
//! - [`cache::Cached`] -- Revalidate-or-search memo cell.

pub mod actions;
pub mod cache;
pub mod carrier;
pub mod job;
pub mod queue;
