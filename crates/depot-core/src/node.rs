//! Capacity-bearing nodes and positions.
//!
//! Every structure a carrier can take from or give to is a
//! [`ResourceNode`]: a [`NodeKind`] tag, a position, and a [`Store`].
//! Callers match on the kind instead of probing for capabilities.

use crate::id::{NodeId, RoomName};
use crate::store::Store;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Node kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Spawn,
    Extension,
    Tower,
    Storage,
    Terminal,
    Container,
    Lab,
    Nuker,
    PowerSpawn,
}

impl NodeKind {
    /// Nodes that keep spawning supplied with energy.
    pub fn is_spawn_support(self) -> bool {
        matches!(self, NodeKind::Spawn | NodeKind::Extension)
    }

    /// Nodes a carrier may draw energy from.
    pub fn is_energy_source(self) -> bool {
        matches!(
            self,
            NodeKind::Storage | NodeKind::Terminal | NodeKind::Container
        )
    }
}

// ---------------------------------------------------------------------------
// Positions and distance
// ---------------------------------------------------------------------------

/// A room-local tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance, the range used by every node action.
    pub fn range_to(self, other: Position) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }

    /// One tile closer to `target` along both axes.
    pub fn step_toward(self, target: Position) -> Position {
        Position {
            x: self.x + (target.x - self.x).signum(),
            y: self.y + (target.y - self.y).signum(),
        }
    }
}

/// Metric used when picking the nearest of several candidate nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Chebyshev,
    Manhattan,
}

impl DistanceMetric {
    pub fn distance(self, a: Position, b: Position) -> u32 {
        match self {
            DistanceMetric::Chebyshev => a.range_to(b),
            DistanceMetric::Manhattan => {
                (a.x - b.x).unsigned_abs() + (a.y - b.y).unsigned_abs()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ResourceNode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub kind: NodeKind,
    pub room: RoomName,
    pub pos: Position,
    pub store: Store,
    /// Ticks until the node can act again (labs after a reaction).
    pub cooldown: u32,
}

impl ResourceNode {
    pub fn new(kind: NodeKind, room: RoomName, pos: Position, store: Store) -> Self {
        Self {
            kind,
            room,
            pos,
            store,
            cooldown: 0,
        }
    }
}

/// Pick the candidate closest to `from`. Ties go to the earliest candidate.
pub fn nearest(
    from: Position,
    candidates: impl IntoIterator<Item = (NodeId, Position)>,
    metric: DistanceMetric,
) -> Option<NodeId> {
    candidates
        .into_iter()
        .min_by_key(|(_, pos)| metric.distance(from, *pos))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn chebyshev_range() {
        let a = Position::new(10, 10);
        assert_eq!(a.range_to(Position::new(13, 11)), 3);
        assert_eq!(a.range_to(a), 0);
    }

    #[test]
    fn manhattan_differs_from_chebyshev() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(DistanceMetric::Chebyshev.distance(a, b), 4);
        assert_eq!(DistanceMetric::Manhattan.distance(a, b), 7);
    }

    #[test]
    fn step_toward_moves_diagonally() {
        let a = Position::new(0, 0);
        assert_eq!(a.step_toward(Position::new(5, -2)), Position::new(1, -1));
        assert_eq!(a.step_toward(a), a);
    }

    #[test]
    fn nearest_picks_closest_and_first_on_tie() {
        let mut sm = SlotMap::<NodeId, ()>::with_key();
        let (a, b, c) = (sm.insert(()), sm.insert(()), sm.insert(()));
        let from = Position::new(0, 0);
        let picked = nearest(
            from,
            [
                (a, Position::new(5, 5)),
                (b, Position::new(2, 0)),
                (c, Position::new(0, 2)),
            ],
            DistanceMetric::Chebyshev,
        );
        assert_eq!(picked, Some(b));
        assert_eq!(nearest(from, [], DistanceMetric::Chebyshev), None);
    }

    #[test]
    fn kind_groups() {
        assert!(NodeKind::Extension.is_spawn_support());
        assert!(NodeKind::Spawn.is_spawn_support());
        assert!(!NodeKind::Tower.is_spawn_support());
        assert!(NodeKind::Storage.is_energy_source());
        assert!(!NodeKind::Lab.is_energy_source());
    }
}
