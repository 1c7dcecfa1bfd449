//! Two-stage simulated annealing.
//!
//! Stage 1 searches for any feasible assignment by annealing on the
//! violation count with large jumps between inclusive regions; Stage 2
//! restarts the temperature and anneals on the full weighted objective,
//! rejecting infeasible proposals outright.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

mod config;
mod runner;

pub use config::{AnnealConfig, StageConfig};
pub use runner::{Annealer, Progress, SolveHooks, SolveResult, SolveStatus, Stage};
