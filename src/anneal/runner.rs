//! Two-stage annealing loop.
//!
//! Stage 1 anneals on the violation count alone until a feasible state
//! appears (or every attempt is exhausted). Stage 2 starts from that
//! feasible state and anneals on the full cost, rejecting any
//! infeasible proposal outright: feasibility is a hard filter there,
//! never a penalty to outweigh.

use super::config::AnnealConfig;
use crate::cost::CostModel;
use crate::model::{BlockPos, Problem, State};
use crate::neighbor;
use crate::verify::{self, Report};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Which stage a progress snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Feasibility,
    Optimization,
}

/// Progress snapshot handed to the progress hook.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub stage: Stage,
    /// Iterations consumed in the current stage.
    pub iteration: usize,
    /// Iteration budget of the current stage.
    pub iteration_bound: usize,
    pub temperature: f64,
    /// Best violation count (Stage 1) or best full cost (Stage 2).
    pub best_metric: f64,
}

/// Observational hooks into a solve run.
///
/// The status and progress callbacks carry no control feedback; the
/// cancel flag, polled at the progress cadence, aborts the run and
/// returns the best state seen so far. Batch callers use
/// [`SolveHooks::none`].
#[derive(Default)]
pub struct SolveHooks<'a> {
    status: Option<Box<dyn FnMut(&str) + 'a>>,
    progress: Option<Box<dyn FnMut(Progress) + 'a>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> SolveHooks<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, f: impl FnMut(&str) + 'a) -> Self {
        self.status = Some(Box::new(f));
        self
    }

    pub fn with_progress(mut self, f: impl FnMut(Progress) + 'a) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn emit_status(&mut self, message: &str) {
        if let Some(f) = self.status.as_mut() {
            f(message);
        }
    }

    fn emit_progress(&mut self, progress: Progress) {
        if let Some(f) = self.progress.as_mut() {
            f(progress);
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Terminal status of a solve run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SolveStatus {
    /// A feasible state was found and optimized.
    Optimized,
    /// No feasible state in any Stage-1 attempt; the result carries the
    /// lowest-violation state seen.
    Infeasible,
    /// Some portal has no valid start position.
    InitializationFailed,
    /// Cancelled externally; best-effort state returned.
    Cancelled,
    /// The recorded best state failed the finalization re-check. A bug
    /// in the feasibility filter, not a user error.
    InternalError,
}

/// Outcome of a solve run. The position map and report are present
/// even on failure, as best effort.
#[derive(Debug)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub message: String,
    pub positions: BTreeMap<String, BlockPos>,
    pub report: Report,
    /// Full cost of the returned state, when the objective was scored.
    pub best_cost: Option<f64>,
    /// Link violations of the returned state.
    pub link_violations: usize,
    /// Iterations consumed across both stages.
    pub iterations: usize,
}

impl SolveResult {
    pub fn is_success(&self) -> bool {
        self.status == SolveStatus::Optimized
    }
}

enum Stage1Outcome {
    Feasible(State),
    /// Best-effort state and its violation count, if any attempt got
    /// off the ground.
    Exhausted(Option<(State, usize)>),
    Cancelled(Option<State>),
    InitFailed(String),
}

struct Stage2Run {
    best: State,
    best_cost: f64,
    cancelled: bool,
}

/// Two-stage simulated-annealing solver for a single problem.
pub struct Annealer<'a> {
    problem: &'a Problem,
    config: AnnealConfig,
}

impl<'a> Annealer<'a> {
    pub fn new(problem: &'a Problem, config: AnnealConfig) -> Self {
        Self { problem, config }
    }

    /// Runs the solver without hooks.
    pub fn solve(&self) -> SolveResult {
        self.solve_with_hooks(SolveHooks::none())
    }

    /// Runs the solver with observational hooks.
    pub fn solve_with_hooks(&self, mut hooks: SolveHooks) -> SolveResult {
        self.config.validate().expect("invalid AnnealConfig");

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        let cost = CostModel::new(self.problem);
        let mut iterations = 0usize;

        hooks.emit_status("stage 1: searching for a feasible assignment");
        let feasible = match self.run_stage1(&cost, &mut rng, &mut hooks, &mut iterations) {
            Stage1Outcome::Feasible(state) => state,
            Stage1Outcome::Exhausted(best) => {
                return self.finish_infeasible(best, iterations);
            }
            Stage1Outcome::Cancelled(best) => {
                return self.finish_cancelled(best, iterations);
            }
            Stage1Outcome::InitFailed(message) => {
                warn!(%message, "initialization failed");
                return SolveResult {
                    status: SolveStatus::InitializationFailed,
                    message: format!("initialization failed: {message}"),
                    positions: BTreeMap::new(),
                    report: Report::default(),
                    best_cost: None,
                    link_violations: 0,
                    iterations,
                };
            }
        };

        info!(iterations, "stage 1 reached a feasible assignment");
        hooks.emit_status("stage 2: optimizing over feasible states");
        let run = self.run_stage2(&cost, feasible, &mut rng, &mut hooks, &mut iterations);

        let report = verify::report(self.problem, &run.best);
        let positions = run.best.to_map(self.problem);
        if !report.is_clean() {
            // The hard filter let an infeasible state through.
            error!(
                position_violations = report.position_violations.len(),
                link_violations = report.link_violations.len(),
                "finalization re-check failed"
            );
            let link_violations = report.link_violations.len();
            return SolveResult {
                status: SolveStatus::InternalError,
                message: "internal error: optimized state failed the finalization re-check"
                    .into(),
                positions,
                report,
                best_cost: Some(run.best_cost),
                link_violations,
                iterations,
            };
        }

        if run.cancelled {
            return SolveResult {
                status: SolveStatus::Cancelled,
                message: "cancelled during optimization; returning best feasible state".into(),
                positions,
                report,
                best_cost: Some(run.best_cost),
                link_violations: 0,
                iterations,
            };
        }

        info!(best_cost = run.best_cost, iterations, "solve complete");
        SolveResult {
            status: SolveStatus::Optimized,
            message: format!(
                "optimized {} portal(s): cost {:.3} after {} iterations",
                self.problem.portal_count(),
                run.best_cost,
                iterations
            ),
            positions,
            report,
            best_cost: Some(run.best_cost),
            link_violations: 0,
            iterations,
        }
    }

    fn run_stage1(
        &self,
        cost: &CostModel,
        rng: &mut StdRng,
        hooks: &mut SolveHooks,
        iterations: &mut usize,
    ) -> Stage1Outcome {
        let stage = self.config.stage1;
        let mut best: Option<(State, usize)> = None;
        let mut ever_initialized = false;

        for attempt in 0..self.config.stage1_attempts {
            let mut current = match neighbor::initialize(self.problem, rng) {
                Ok(state) => state,
                Err(message) => {
                    if ever_initialized {
                        // An earlier attempt worked; treat this one as
                        // unlucky and move on.
                        debug!(attempt, %message, "initialization retry failed, skipping attempt");
                        continue;
                    }
                    return Stage1Outcome::InitFailed(message);
                }
            };
            ever_initialized = true;

            let mut current_violations = cost.evaluate(&current, 0.0).violations();
            record_best(&mut best, &current, current_violations);
            if current_violations == 0 {
                return Stage1Outcome::Feasible(current);
            }

            let mut temperature = stage.initial_temperature;
            for iteration in 0..stage.max_iterations {
                if iteration % self.config.progress_interval == 0 {
                    if hooks.cancelled() {
                        return Stage1Outcome::Cancelled(best.map(|(s, _)| s));
                    }
                    hooks.emit_progress(Progress {
                        stage: Stage::Feasibility,
                        iteration,
                        iteration_bound: stage.max_iterations,
                        temperature,
                        best_metric: best
                            .as_ref()
                            .map_or(f64::INFINITY, |(_, v)| *v as f64),
                    });
                }
                *iterations += 1;

                if let Some(candidate) =
                    neighbor::propose(self.problem, &current, true, self.config.jump_probability, rng)
                {
                    let violations = cost.evaluate(&candidate, 0.0).violations();
                    record_best(&mut best, &candidate, violations);

                    let accept = if violations <= current_violations {
                        true
                    } else {
                        let delta = (violations - current_violations) as f64;
                        let p = self.config.base_worse_accept * (-delta / temperature).exp();
                        rng.random_range(0.0..1.0) < p
                    };
                    if accept {
                        current = candidate;
                        current_violations = violations;
                        if current_violations == 0 {
                            debug!(attempt, iteration, "feasible state found");
                            return Stage1Outcome::Feasible(current);
                        }
                    }
                }

                // Cools every iteration, accepted or not.
                temperature *= stage.cooling;
                if temperature < stage.min_temperature {
                    break;
                }
            }
            debug!(
                attempt,
                best_violations = best.as_ref().map_or(usize::MAX, |(_, v)| *v),
                "attempt exhausted without feasibility"
            );
        }

        Stage1Outcome::Exhausted(best)
    }

    fn run_stage2(
        &self,
        cost: &CostModel,
        start: State,
        rng: &mut StdRng,
        hooks: &mut SolveHooks,
        iterations: &mut usize,
    ) -> Stage2Run {
        let stage = self.config.stage2;
        let mut current_cost = cost.evaluate(&start, 1.0).total;
        let mut current = start;
        let mut best = current.clone();
        let mut best_cost = current_cost;
        let mut cancelled = false;

        let mut temperature = stage.initial_temperature;
        for iteration in 0..stage.max_iterations {
            if iteration % self.config.progress_interval == 0 {
                if hooks.cancelled() {
                    cancelled = true;
                    break;
                }
                hooks.emit_progress(Progress {
                    stage: Stage::Optimization,
                    iteration,
                    iteration_bound: stage.max_iterations,
                    temperature,
                    best_metric: best_cost,
                });
            }
            *iterations += 1;

            if let Some(candidate) = neighbor::propose(self.problem, &current, false, 0.0, rng) {
                // Hard feasibility filter: infeasible candidates never
                // reach the probabilistic step.
                let feasibility = cost.evaluate(&candidate, 0.0);
                if feasibility.is_feasible() {
                    let candidate_cost = cost.evaluate(&candidate, 1.0).total;
                    let delta = candidate_cost - current_cost;
                    let accept =
                        delta < 0.0 || rng.random_range(0.0..1.0) < (-delta / temperature).exp();
                    if accept {
                        current = candidate;
                        current_cost = candidate_cost;
                        debug_assert_eq!(
                            cost.evaluate(&current, 0.0).violations(),
                            0,
                            "accepted an infeasible state in stage 2"
                        );
                        if current_cost < best_cost {
                            best = current.clone();
                            best_cost = current_cost;
                        }
                    }
                }
            }

            temperature *= stage.cooling;
            if temperature < stage.min_temperature {
                break;
            }
        }

        Stage2Run {
            best,
            best_cost,
            cancelled,
        }
    }

    fn finish_infeasible(
        &self,
        best: Option<(State, usize)>,
        iterations: usize,
    ) -> SolveResult {
        match best {
            Some((state, violations)) => {
                warn!(violations, "no feasible assignment found");
                let report = verify::report(self.problem, &state);
                let positions = state.to_map(self.problem);
                let link_violations = report.link_violations.len();
                SolveResult {
                    status: SolveStatus::Infeasible,
                    message: format!(
                        "no feasible assignment found: best attempt leaves {violations} violation(s)"
                    ),
                    positions,
                    report,
                    best_cost: None,
                    link_violations,
                    iterations,
                }
            }
            None => SolveResult {
                status: SolveStatus::Infeasible,
                message: "no feasible assignment found: no attempt produced a state".into(),
                positions: BTreeMap::new(),
                report: Report::default(),
                best_cost: None,
                link_violations: 0,
                iterations,
            },
        }
    }

    fn finish_cancelled(&self, best: Option<State>, iterations: usize) -> SolveResult {
        let (positions, report, link_violations) = match best {
            Some(state) => {
                let report = verify::report(self.problem, &state);
                let violations = report.link_violations.len();
                (state.to_map(self.problem), report, violations)
            }
            None => (BTreeMap::new(), Report::default(), 0),
        };
        SolveResult {
            status: SolveStatus::Cancelled,
            message: "cancelled during feasibility search; returning best state so far".into(),
            positions,
            report,
            best_cost: None,
            link_violations,
            iterations,
        }
    }
}

fn record_best(best: &mut Option<(State, usize)>, state: &State, violations: usize) {
    let improved = best.as_ref().is_none_or(|(_, v)| violations < *v);
    if improved {
        *best = Some((state.clone(), violations));
    }
}
