use crate::id::ResourceType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a store bounds what it can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capacity {
    /// One shared pool for every resource (storage, terminal, carriers).
    Total(u32),
    /// Independent limits per resource; anything unlisted is refused
    /// (extensions, towers, nukers, power spawns).
    PerResource(BTreeMap<ResourceType, u32>),
    /// Separate energy pool plus one mineral slot that holds a single
    /// non-energy resource at a time (labs).
    Lab { energy: u32, mineral: u32 },
}

/// Resource amounts held by a node or agent, bounded by a [`Capacity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    amounts: BTreeMap<ResourceType, u32>,
    capacity: Capacity,
}

impl Store {
    pub fn new(capacity: Capacity) -> Self {
        Self {
            amounts: BTreeMap::new(),
            capacity,
        }
    }

    pub fn general(capacity: u32) -> Self {
        Self::new(Capacity::Total(capacity))
    }

    pub fn single(resource: ResourceType, capacity: u32) -> Self {
        Self::new(Capacity::PerResource(BTreeMap::from([(resource, capacity)])))
    }

    pub fn per_resource(limits: impl IntoIterator<Item = (ResourceType, u32)>) -> Self {
        Self::new(Capacity::PerResource(limits.into_iter().collect()))
    }

    pub fn lab(energy: u32, mineral: u32) -> Self {
        Self::new(Capacity::Lab { energy, mineral })
    }

    pub fn capacity(&self) -> &Capacity {
        &self.capacity
    }

    /// Quantity of a specific resource.
    pub fn used(&self, resource: ResourceType) -> u32 {
        self.amounts.get(&resource).copied().unwrap_or(0)
    }

    /// Total quantity across all resources.
    pub fn total(&self) -> u32 {
        self.amounts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Whether this store can ever hold `resource`.
    pub fn accepts(&self, resource: ResourceType) -> bool {
        match &self.capacity {
            Capacity::Total(_) | Capacity::Lab { .. } => true,
            Capacity::PerResource(limits) => limits.contains_key(&resource),
        }
    }

    /// Upper bound on `resource` if the store were otherwise empty.
    pub fn capacity_for(&self, resource: ResourceType) -> u32 {
        match &self.capacity {
            Capacity::Total(total) => *total,
            Capacity::PerResource(limits) => limits.get(&resource).copied().unwrap_or(0),
            Capacity::Lab { energy, mineral } => {
                if resource.is_energy() {
                    *energy
                } else {
                    *mineral
                }
            }
        }
    }

    /// Room left for `resource` given what is already stored.
    pub fn free_capacity(&self, resource: ResourceType) -> u32 {
        match &self.capacity {
            Capacity::Total(total) => total.saturating_sub(self.total()),
            Capacity::PerResource(limits) => limits
                .get(&resource)
                .map(|limit| limit.saturating_sub(self.used(resource)))
                .unwrap_or(0),
            Capacity::Lab { energy, mineral } => {
                if resource.is_energy() {
                    return energy.saturating_sub(self.used(resource));
                }
                match self.mineral_type() {
                    Some(held) if held != resource => 0,
                    _ => mineral.saturating_sub(self.used(resource)),
                }
            }
        }
    }

    /// Room left across the whole store, ignoring per-resource limits.
    pub fn free_total(&self) -> u32 {
        let limit = match &self.capacity {
            Capacity::Total(total) => *total,
            Capacity::PerResource(limits) => limits.values().sum(),
            Capacity::Lab { energy, mineral } => energy + mineral,
        };
        limit.saturating_sub(self.total())
    }

    /// The first non-energy resource held, if any. For labs this is the
    /// single mineral occupying the mineral slot.
    pub fn mineral_type(&self) -> Option<ResourceType> {
        self.amounts.keys().copied().find(|r| !r.is_energy())
    }

    /// Resources currently held, in id order.
    pub fn resources(&self) -> impl Iterator<Item = (ResourceType, u32)> + '_ {
        self.amounts.iter().map(|(r, a)| (*r, *a))
    }

    /// Add resources. Returns the amount that didn't fit.
    #[must_use = "overflow count indicates resources that did not fit"]
    pub fn add(&mut self, resource: ResourceType, quantity: u32) -> u32 {
        let to_add = quantity.min(self.free_capacity(resource));
        if to_add > 0 {
            *self.amounts.entry(resource).or_insert(0) += to_add;
        }
        quantity - to_add
    }

    /// Remove resources. Returns the amount actually removed.
    #[must_use = "returns the quantity actually removed, which may be less than requested"]
    pub fn remove(&mut self, resource: ResourceType, quantity: u32) -> u32 {
        let Some(held) = self.amounts.get_mut(&resource) else {
            return 0;
        };
        let to_remove = quantity.min(*held);
        *held -= to_remove;
        if *held == 0 {
            self.amounts.remove(&resource);
        }
        to_remove
    }
}
