use serde::{Deserialize, Serialize};

/// A remembered choice that is revalidated before every use.
///
/// The cached value is dropped as soon as `valid` rejects it, and the
/// fallback search runs in its place. A search that finds nothing leaves
/// the cell empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cached<T> {
    value: Option<T>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T: Copy> Cached<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<T> {
        self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    /// Return the cached value if it still passes `valid`, else run `search`
    /// and cache its result.
    pub fn resolve(
        &mut self,
        valid: impl Fn(T) -> bool,
        search: impl FnOnce() -> Option<T>,
    ) -> Option<T> {
        if let Some(value) = self.value {
            if valid(value) {
                return Some(value);
            }
            self.value = None;
        }
        self.value = search();
        self.value
    }
}

/// Cached delivery target of a carrier.
pub type TargetCache = Cached<depot_core::id::NodeId>;
