use serde::{Deserialize, Serialize};

/// A persisted position in an ordered list that wraps around at the end.
///
/// The list itself is not stored; callers pass its length (or the list) on
/// every call, so a list that shrank is handled by [`RingCursor::get`]
/// returning `None` until the cursor is advanced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingCursor {
    index: usize,
}

impl RingCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        items.get(self.index)
    }

    /// Move to the next item, wrapping to the front. Returns the new index.
    pub fn advance(&mut self, len: usize) -> usize {
        self.index = if len == 0 { 0 } else { (self.index + 1) % len };
        self.index
    }
}
