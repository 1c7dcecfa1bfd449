//! Problem and state model.
//!
//! The [`Problem`] is the immutable input: portals with containment
//! regions, desired links, optimization goals, and the per-dimension
//! linking constants. A [`State`] assigns one integer position to each
//! portal and is the only thing the solver mutates.

mod geometry;
mod problem;
mod state;

pub use geometry::{Axis, BlockPos, Dimension, Region};
pub use problem::{DesiredLink, LinkRules, OptimizationGoal, Portal, Problem};
pub use state::State;
