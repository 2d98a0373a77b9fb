//! Lab roles: which labs feed reactions, which run them, and which are lent
//! out for boosting.

use depot_core::id::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabRole {
    /// Holds one of the two reaction inputs.
    Base,
    /// Runs reactions from the base labs.
    Reaction,
    /// Lent to a boost task.
    Boost,
}

impl fmt::Display for LabRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LabRole::Base => "base",
            LabRole::Reaction => "reaction",
            LabRole::Boost => "boost",
        })
    }
}

/// The role of every lab in a room. Each lab has exactly one role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabRoles {
    roles: BTreeMap<NodeId, LabRole>,
}

impl LabRoles {
    /// Derive roles from scratch: everything reacts, boost labs are taken
    /// out first, and base labs keep their role unless lent to a boost.
    pub fn derive(
        labs: &[NodeId],
        boost_labs: impl IntoIterator<Item = NodeId>,
        base_labs: Option<[NodeId; 2]>,
    ) -> Self {
        let mut roles: BTreeMap<NodeId, LabRole> =
            labs.iter().map(|id| (*id, LabRole::Reaction)).collect();
        for lab in boost_labs {
            if let Some(role) = roles.get_mut(&lab) {
                *role = LabRole::Boost;
            }
        }
        for lab in base_labs.into_iter().flatten() {
            if let Some(role) = roles.get_mut(&lab) {
                if *role != LabRole::Boost {
                    *role = LabRole::Base;
                }
            }
        }
        Self { roles }
    }

    pub fn role(&self, lab: NodeId) -> Option<LabRole> {
        self.roles.get(&lab).copied()
    }

    /// Reassign a known lab. Unknown labs are ignored.
    pub fn set(&mut self, lab: NodeId, role: LabRole) {
        if let Some(current) = self.roles.get_mut(&lab) {
            *current = role;
        }
    }

    /// Labs holding `role`, in id order.
    pub fn with_role(&self, role: LabRole) -> Vec<NodeId> {
        self.roles
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn count(&self, role: LabRole) -> usize {
        self.roles.values().filter(|r| **r == role).count()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, LabRole)> + '_ {
        self.roles.iter().map(|(id, role)| (*id, *role))
    }
}
