//! Resource and reaction registry.
//!
//! Resources are registered by name and receive dense [`ResourceType`] ids;
//! energy is always id 0. Reactions combine two inputs into one product and
//! are looked up both ways: by product (what the reaction pipeline needs to
//! stock) and by input pair (what a lab produces when it runs).

use crate::id::ResourceType;
use std::collections::HashMap;

/// Name under which energy is pre-registered.
pub const ENERGY_NAME: &str = "energy";

/// A two-input reaction recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaction {
    pub inputs: [ResourceType; 2],
    pub product: ResourceType,
}

/// Builder for constructing an immutable [`Registry`].
#[derive(Debug)]
pub struct RegistryBuilder {
    names: Vec<String>,
    name_to_id: HashMap<String, ResourceType>,
    reactions: Vec<Reaction>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            names: Vec::new(),
            name_to_id: HashMap::new(),
            reactions: Vec::new(),
        };
        builder.register_resource(ENERGY_NAME);
        builder
    }

    /// Register a resource type. Registering an existing name returns its id.
    pub fn register_resource(&mut self, name: &str) -> ResourceType {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = ResourceType(self.names.len() as u32);
        self.names.push(name.to_string());
        self.name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register a reaction by resource names. All three must already exist.
    pub fn register_reaction(
        &mut self,
        a: &str,
        b: &str,
        product: &str,
    ) -> Result<(), RegistryError> {
        let lookup = |name: &str| {
            self.name_to_id
                .get(name)
                .copied()
                .ok_or_else(|| RegistryError::NotFound(name.to_string()))
        };
        let reaction = Reaction {
            inputs: [lookup(a)?, lookup(b)?],
            product: lookup(product)?,
        };
        self.reactions.push(reaction);
        Ok(())
    }

    pub fn resource(&self, name: &str) -> Option<ResourceType> {
        self.name_to_id.get(name).copied()
    }

    /// Finalize the registry, rejecting products with two different recipes.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut seen = HashMap::new();
        for reaction in &self.reactions {
            if seen.insert(reaction.product, ()).is_some() {
                return Err(RegistryError::DuplicateReaction(
                    self.names[reaction.product.0 as usize].clone(),
                ));
            }
        }
        Ok(self.assemble())
    }

    fn assemble(self) -> Registry {
        let mut by_product = HashMap::new();
        let mut by_inputs = HashMap::new();
        for reaction in &self.reactions {
            by_product.insert(reaction.product, *reaction);
            let [a, b] = reaction.inputs;
            by_inputs.insert(ordered_pair(a, b), reaction.product);
        }

        Registry {
            names: self.names,
            name_to_id: self.name_to_id,
            by_product,
            by_inputs,
        }
    }
}

fn ordered_pair(a: ResourceType, b: ResourceType) -> (ResourceType, ResourceType) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Immutable registry. Frozen after build().
#[derive(Debug, Clone)]
pub struct Registry {
    names: Vec<String>,
    name_to_id: HashMap<String, ResourceType>,
    by_product: HashMap<ResourceType, Reaction>,
    by_inputs: HashMap<(ResourceType, ResourceType), ResourceType>,
}

impl Registry {
    /// The standard mineral chain: base minerals, ghodium, and the three
    /// compound tiers.
    pub fn standard() -> Self {
        let mut b = RegistryBuilder::new();
        b.register_resource("power");
        for base in BASE_MINERALS {
            b.register_resource(base);
        }
        for (x, y, product) in STANDARD_REACTIONS {
            let product = b.register_resource(product);
            let inputs = [b.register_resource(x), b.register_resource(y)];
            b.reactions.push(Reaction { inputs, product });
        }
        b.assemble()
    }

    pub fn resource(&self, name: &str) -> Option<ResourceType> {
        self.name_to_id.get(name).copied()
    }

    pub fn name(&self, resource: ResourceType) -> Option<&str> {
        self.names.get(resource.0 as usize).map(String::as_str)
    }

    /// The reaction producing `product`, if any.
    pub fn reaction_for(&self, product: ResourceType) -> Option<&Reaction> {
        self.by_product.get(&product)
    }

    /// The two inputs needed for `product`, in base-lab order.
    pub fn reaction_inputs(&self, product: ResourceType) -> Option<[ResourceType; 2]> {
        self.by_product.get(&product).map(|r| r.inputs)
    }

    /// What two inputs combine into, regardless of order.
    pub fn product_of(&self, a: ResourceType, b: ResourceType) -> Option<ResourceType> {
        self.by_inputs.get(&ordered_pair(a, b)).copied()
    }

    pub fn resource_count(&self) -> usize {
        self.names.len()
    }

    pub fn reaction_count(&self) -> usize {
        self.by_product.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("more than one reaction produces {0}")]
    DuplicateReaction(String),
}

const BASE_MINERALS: [&str; 7] = ["H", "O", "U", "L", "K", "Z", "X"];

const STANDARD_REACTIONS: [(&str, &str, &str); 34] = [
    ("H", "O", "OH"),
    ("Z", "K", "ZK"),
    ("U", "L", "UL"),
    ("ZK", "UL", "G"),
    ("U", "H", "UH"),
    ("U", "O", "UO"),
    ("K", "H", "KH"),
    ("K", "O", "KO"),
    ("L", "H", "LH"),
    ("L", "O", "LO"),
    ("Z", "H", "ZH"),
    ("Z", "O", "ZO"),
    ("G", "H", "GH"),
    ("G", "O", "GO"),
    ("UH", "OH", "UH2O"),
    ("UO", "OH", "UHO2"),
    ("KH", "OH", "KH2O"),
    ("KO", "OH", "KHO2"),
    ("LH", "OH", "LH2O"),
    ("LO", "OH", "LHO2"),
    ("ZH", "OH", "ZH2O"),
    ("ZO", "OH", "ZHO2"),
    ("GH", "OH", "GH2O"),
    ("GO", "OH", "GHO2"),
    ("UH2O", "X", "XUH2O"),
    ("UHO2", "X", "XUHO2"),
    ("KH2O", "X", "XKH2O"),
    ("KHO2", "X", "XKHO2"),
    ("LH2O", "X", "XLH2O"),
    ("LHO2", "X", "XLHO2"),
    ("ZH2O", "X", "XZH2O"),
    ("ZHO2", "X", "XZHO2"),
    ("GH2O", "X", "XGH2O"),
    ("GHO2", "X", "XGHO2"),
];
