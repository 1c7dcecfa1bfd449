//! Portal placement optimizer.
//!
//! Assigns integer 3-D coordinates to a set of named portals so that a
//! bidirectional nearest-neighbor linking predicate holds between
//! declared pairs, while minimizing a weighted sum of distance
//! objectives. The two coordinate universes (Dimensions A and B) are
//! related by a fixed horizontal scale factor, and a link resolves the
//! way the destination side actually matches: rescale, floor, then pick
//! the nearest candidate within a square search radius, ties to the
//! lower portal.
//!
//! Solving is two-stage simulated annealing:
//!
//! - **Stage 1 (feasibility)**: anneals on the violation count alone,
//!   hot and slow-cooling, with large jumps between inclusive regions.
//! - **Stage 2 (optimization)**: restarts the temperature and anneals
//!   on the weighted distance objective over feasible states only —
//!   infeasible proposals are rejected before scoring.
//!
//! # Example
//!
//! ```
//! use portalopt::{parse_problem, AnnealConfig, Annealer};
//!
//! let problem = parse_problem(
//!     "ENTITY_SIZE 0.6\n\
//!      PORTAL over A X\n\
//!      PORTAL under B X\n\
//!      POS over INC 0 60 0 0 60 0\n\
//!      POS under INC 0 60 0 0 60 0\n\
//!      LINK over under\n\
//!      LINK under over\n",
//! )?;
//!
//! let config = AnnealConfig::default().with_seed(7);
//! let result = Annealer::new(&problem, config).solve();
//! assert!(result.is_success(), "{}", result.message);
//! assert!(result.report.is_clean());
//! # Ok::<(), portalopt::ParseError>(())
//! ```

pub mod anneal;
pub mod cost;
pub mod error;
pub mod link;
pub mod model;
pub mod neighbor;
pub mod parse;
pub mod verify;

pub use anneal::{
    AnnealConfig, Annealer, Progress, SolveHooks, SolveResult, SolveStatus, Stage, StageConfig,
};
pub use cost::{CostBreakdown, CostModel};
pub use error::ParseError;
pub use link::link_holds;
pub use model::{Axis, BlockPos, Dimension, LinkRules, Portal, Problem, Region, State};
pub use parse::parse_problem;
pub use verify::{report, Report};
