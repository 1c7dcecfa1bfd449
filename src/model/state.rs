//! Solver state: one position per portal.

use super::geometry::BlockPos;
use super::problem::Problem;
use std::collections::BTreeMap;

/// A position assignment, indexed parallel to the problem's portal list.
///
/// States are cloned, never aliased, whenever two variants must be
/// compared; only the annealer mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    positions: Vec<BlockPos>,
}

impl State {
    pub fn new(positions: Vec<BlockPos>) -> Self {
        Self { positions }
    }

    pub fn position(&self, portal: usize) -> BlockPos {
        self.positions[portal]
    }

    pub fn set_position(&mut self, portal: usize, pos: BlockPos) {
        self.positions[portal] = pos;
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Name-keyed snapshot for reporting.
    pub fn to_map(&self, problem: &Problem) -> BTreeMap<String, BlockPos> {
        problem
            .portals()
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), self.positions[i]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Axis, Dimension, Portal};

    #[test]
    fn test_clone_is_independent() {
        let mut a = State::new(vec![BlockPos::new(1, 2, 3)]);
        let b = a.clone();
        a.set_position(0, BlockPos::new(9, 9, 9));
        assert_eq!(b.position(0), BlockPos::new(1, 2, 3));
        assert_ne!(a, b);
    }

    #[test]
    fn test_to_map_uses_portal_names() {
        let mut problem = Problem::new(1.0);
        problem
            .add_portal(Portal::new("north", Dimension::A, Axis::X))
            .unwrap();
        problem
            .add_portal(Portal::new("south", Dimension::B, Axis::Z))
            .unwrap();
        let state = State::new(vec![BlockPos::new(0, 1, 2), BlockPos::new(3, 4, 5)]);
        let map = state.to_map(&problem);
        assert_eq!(map["north"], BlockPos::new(0, 1, 2));
        assert_eq!(map["south"], BlockPos::new(3, 4, 5));
    }
}
