//! Geometric primitives: positions, regions, axes, dimensions.

use std::fmt;

/// One of the two coordinate universes a portal can live in.
///
/// The two dimensions are related by a fixed, direction-dependent
/// horizontal scale factor (see [`LinkRules`](super::LinkRules)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dimension {
    A,
    B,
}

impl Dimension {
    /// The dimension on the other side of a crossing.
    pub fn other(self) -> Self {
        match self {
            Dimension::A => Dimension::B,
            Dimension::B => Dimension::A,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::A => write!(f, "A"),
            Dimension::B => write!(f, "B"),
        }
    }
}

/// Horizontal facing axis of a portal.
///
/// An entity probing through a portal spreads along the axis
/// perpendicular to the facing: facing X spreads along Z and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Z => write!(f, "Z"),
        }
    }
}

/// An integer block position. Y is the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean distance to another block position, in i64 to
    /// stay exact for far-apart coordinates.
    pub fn distance_sq(&self, other: BlockPos) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        let dz = self.z as i64 - other.z as i64;
        dx * dx + dy * dy + dz * dz
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Axis-aligned box with inclusive integer corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl Region {
    pub fn new(min: BlockPos, max: BlockPos) -> Self {
        Self { min, max }
    }

    /// `min <= max` on every axis.
    pub fn is_well_formed(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn contains(&self, p: BlockPos) -> bool {
        self.min.x <= p.x
            && p.x <= self.max.x
            && self.min.y <= p.y
            && p.y <= self.max.y
            && self.min.z <= p.z
            && p.z <= self.max.z
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_contains_boundary() {
        let r = Region::new(BlockPos::new(0, 0, 0), BlockPos::new(4, 4, 4));
        assert!(r.contains(BlockPos::new(0, 0, 0)));
        assert!(r.contains(BlockPos::new(4, 4, 4)));
        assert!(!r.contains(BlockPos::new(5, 4, 4)));
        assert!(!r.contains(BlockPos::new(0, -1, 0)));
    }

    #[test]
    fn test_region_well_formed() {
        let good = Region::new(BlockPos::new(-1, 0, -1), BlockPos::new(1, 0, 1));
        assert!(good.is_well_formed());
        let bad = Region::new(BlockPos::new(2, 0, 0), BlockPos::new(1, 0, 0));
        assert!(!bad.is_well_formed());
    }

    #[test]
    fn test_distance_sq_exact_for_large_coordinates() {
        let a = BlockPos::new(1_000_000, 0, 0);
        let b = BlockPos::new(-1_000_000, 0, 0);
        assert_eq!(a.distance_sq(b), 4_000_000_000_000);
    }

    #[test]
    fn test_dimension_other_is_involution() {
        assert_eq!(Dimension::A.other(), Dimension::B);
        assert_eq!(Dimension::B.other().other(), Dimension::B);
    }
}
