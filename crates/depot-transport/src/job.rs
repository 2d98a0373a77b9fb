//! Transport jobs.
//!
//! A job is a standing request for carrier work in one room. Singleton jobs
//! (tower fill, lab in/out, boost phases) exist at most once per room; list
//! jobs carry the full set of labs they concern and are replaced wholesale
//! when republished.

use depot_core::id::{NodeId, ResourceType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a job within one room's queue. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JobKind {
    FillExtension,
    FillTower,
    FillNuker,
    FillPowerSpawn,
    LabIn,
    LabOut,
    BoostGetResource,
    BoostGetEnergy,
    BoostClear,
}

impl JobKind {
    /// Assignment priority. Higher runs first.
    pub fn priority(self) -> u8 {
        match self {
            JobKind::FillExtension => 9,
            JobKind::FillTower => 8,
            JobKind::BoostGetEnergy => 7,
            JobKind::BoostGetResource => 6,
            JobKind::LabIn => 5,
            JobKind::LabOut => 4,
            JobKind::BoostClear => 3,
            JobKind::FillPowerSpawn => 2,
            JobKind::FillNuker => 1,
        }
    }

    /// List jobs are replaced on republish instead of ignored.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            JobKind::LabIn
                | JobKind::LabOut
                | JobKind::BoostGetResource
                | JobKind::BoostGetEnergy
                | JobKind::BoostClear
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            JobKind::FillExtension => "fill_extension",
            JobKind::FillTower => "fill_tower",
            JobKind::FillNuker => "fill_nuker",
            JobKind::FillPowerSpawn => "fill_power_spawn",
            JobKind::LabIn => "lab_in",
            JobKind::LabOut => "lab_out",
            JobKind::BoostGetResource => "boost_get_resource",
            JobKind::BoostGetEnergy => "boost_get_energy",
            JobKind::BoostClear => "boost_clear",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A substance to move into a specific lab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabResource {
    pub lab: NodeId,
    pub resource: ResourceType,
    /// Quantity the lab should hold once the job is done.
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Job {
    /// Keep spawns and extensions full of energy.
    FillExtension,
    /// Refill towers, starting with the one that asked.
    FillTower { tower: NodeId },
    FillNuker {
        nuker: NodeId,
        resource: ResourceType,
    },
    FillPowerSpawn {
        power_spawn: NodeId,
        resource: ResourceType,
    },
    /// Move substances from the terminal into labs, in list order.
    LabIn { resources: Vec<LabResource> },
    /// Drain every listed lab holding a mineral into the terminal.
    LabOut { labs: Vec<NodeId> },
    /// Reload boost labs that fell below the reload limit.
    BoostGetResource { resources: Vec<LabResource> },
    /// Top up boost labs with energy.
    BoostGetEnergy { labs: Vec<NodeId> },
    /// Return leftover boost material to the terminal.
    BoostClear { labs: Vec<NodeId> },
}

/// Deduplication identity of a job within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub kind: JobKind,
    pub target: Option<NodeId>,
}

impl Job {
    pub fn kind(&self) -> JobKind {
        match self {
            Job::FillExtension => JobKind::FillExtension,
            Job::FillTower { .. } => JobKind::FillTower,
            Job::FillNuker { .. } => JobKind::FillNuker,
            Job::FillPowerSpawn { .. } => JobKind::FillPowerSpawn,
            Job::LabIn { .. } => JobKind::LabIn,
            Job::LabOut { .. } => JobKind::LabOut,
            Job::BoostGetResource { .. } => JobKind::BoostGetResource,
            Job::BoostGetEnergy { .. } => JobKind::BoostGetEnergy,
            Job::BoostClear { .. } => JobKind::BoostClear,
        }
    }

    /// Nuker and power spawn fills are keyed by their structure; every
    /// other kind is a per-room singleton.
    pub fn key(&self) -> JobKey {
        let target = match self {
            Job::FillNuker { nuker, .. } => Some(*nuker),
            Job::FillPowerSpawn { power_spawn, .. } => Some(*power_spawn),
            _ => None,
        };
        JobKey {
            kind: self.kind(),
            target,
        }
    }
}
