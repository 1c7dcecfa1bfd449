//! Cost aggregation over a state.
//!
//! The single scalar combines hard-constraint violations with the
//! weighted distance objective. With the objective disabled (weight 0)
//! the total literally counts link violations, which is what the
//! feasibility stage anneals on.

use crate::link::count_link_violations;
use crate::model::{OptimizationGoal, Problem, State};

/// Penalty per violated link when the objective term is enabled.
pub const LINK_VIOLATION_PENALTY: f64 = 1e9;

/// Penalty per position-constraint violation. States produced by
/// initialization and neighbor generation never violate containment,
/// so this term is expected to stay zero.
pub const REGION_VIOLATION_PENALTY: f64 = 1e6;

/// Itemized cost of a state. Carrying the counts alongside the total
/// gives callers a feasibility signal without recomputation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    pub link_violations: usize,
    pub region_violations: usize,
    /// Weighted sum of squared goal distances (0 when disabled).
    pub objective: f64,
    pub total: f64,
}

impl CostBreakdown {
    pub fn is_feasible(&self) -> bool {
        self.link_violations == 0 && self.region_violations == 0
    }

    pub fn violations(&self) -> usize {
        self.link_violations + self.region_violations
    }
}

/// Evaluates states against a problem.
pub struct CostModel<'a> {
    problem: &'a Problem,
}

impl<'a> CostModel<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Self { problem }
    }

    /// Scores a state. `objective_weight` of 0 disables the distance
    /// objective; a positive value (normally 1) enables it and switches
    /// link violations from plain counting to the large penalty.
    pub fn evaluate(&self, state: &State, objective_weight: f64) -> CostBreakdown {
        let link_violations = count_link_violations(self.problem, state);
        let region_violations = self
            .problem
            .portals()
            .iter()
            .enumerate()
            .filter(|(idx, portal)| !portal.admits(state.position(*idx)))
            .count();

        let enabled = objective_weight > 0.0;
        let link_penalty = if enabled { LINK_VIOLATION_PENALTY } else { 1.0 };
        let mut total = link_violations as f64 * link_penalty
            + region_violations as f64 * REGION_VIOLATION_PENALTY;

        let mut objective = 0.0;
        if enabled {
            for goal in &self.problem.goals {
                objective += goal.weight() * self.goal_distance_sq(goal, state);
            }
            total += objective_weight * objective;
        }

        CostBreakdown {
            link_violations,
            region_violations,
            objective,
            total,
        }
    }

    /// Unweighted squared distance of a goal's operands, both mapped
    /// into the Dimension-A frame (B positions scaled horizontally,
    /// vertical unchanged).
    pub fn goal_distance_sq(&self, goal: &OptimizationGoal, state: &State) -> f64 {
        match goal {
            OptimizationGoal::Pair { a, b, .. } => {
                distance_sq(self.a_frame(*a, state), self.a_frame(*b, state))
            }
            OptimizationGoal::Point { portal, target, .. } => {
                distance_sq(self.a_frame(*portal, state), *target)
            }
        }
    }

    fn a_frame(&self, portal: usize, state: &State) -> [f64; 3] {
        let pos = state.position(portal);
        let scale = self
            .problem
            .rules
            .to_a_frame(self.problem.portal(portal).dimension);
        [pos.x as f64 * scale, pos.y as f64, pos.z as f64 * scale]
    }
}

fn distance_sq(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Axis, BlockPos, Dimension, Portal, Region};

    fn isolated_pair() -> Problem {
        // Two portals too far apart for any candidate search to
        // succeed, so both links are always violated.
        let mut problem = Problem::new(0.6);
        problem
            .add_portal(Portal::new("a", Dimension::A, Axis::X))
            .unwrap();
        problem
            .add_portal(Portal::new("b", Dimension::B, Axis::X))
            .unwrap();
        problem
            .add_inclusive("a", Region::new(BlockPos::new(0, 60, 0), BlockPos::new(0, 60, 0)))
            .unwrap();
        problem
            .add_inclusive(
                "b",
                Region::new(BlockPos::new(9000, 60, 9000), BlockPos::new(9000, 60, 9000)),
            )
            .unwrap();
        problem.add_link("a", "b").unwrap();
        problem.add_link("b", "a").unwrap();
        problem
    }

    fn pinned_state() -> State {
        State::new(vec![BlockPos::new(0, 60, 0), BlockPos::new(9000, 60, 9000)])
    }

    #[test]
    fn test_weight_zero_counts_violations() {
        let problem = isolated_pair();
        let cost = CostModel::new(&problem);
        let breakdown = cost.evaluate(&pinned_state(), 0.0);
        assert_eq!(breakdown.link_violations, 2);
        assert_eq!(breakdown.region_violations, 0);
        assert_eq!(breakdown.total, 2.0);
        assert_eq!(breakdown.objective, 0.0);
    }

    #[test]
    fn test_weight_zero_is_independent_of_goals() {
        let mut problem = isolated_pair();
        let state = pinned_state();
        let bare = CostModel::new(&problem).evaluate(&state, 0.0).total;
        problem.add_goal_pair("a", "b", 5.0).unwrap();
        problem
            .add_goal_point("a", [100.0, 0.0, 100.0], 3.0)
            .unwrap();
        let with_goals = CostModel::new(&problem).evaluate(&state, 0.0).total;
        assert_eq!(bare, with_goals);
    }

    #[test]
    fn test_enabled_weight_applies_link_penalty() {
        let problem = isolated_pair();
        let cost = CostModel::new(&problem);
        let breakdown = cost.evaluate(&pinned_state(), 1.0);
        assert_eq!(breakdown.link_violations, 2);
        assert!(breakdown.total >= 2.0 * LINK_VIOLATION_PENALTY);
    }

    #[test]
    fn test_region_violation_detected_and_penalized() {
        let problem = isolated_pair();
        let cost = CostModel::new(&problem);
        // `a` forced out of its only inclusive region.
        let state = State::new(vec![BlockPos::new(5, 60, 5), BlockPos::new(9000, 60, 9000)]);
        let breakdown = cost.evaluate(&state, 0.0);
        assert_eq!(breakdown.region_violations, 1);
        assert!(breakdown.total >= REGION_VIOLATION_PENALTY);
        assert!(!breakdown.is_feasible());
    }

    #[test]
    fn test_goal_weight_scales_linearly() {
        let mut w1 = isolated_pair();
        w1.add_goal_point("a", [10.0, 60.0, 10.0], 1.0).unwrap();
        let mut w2 = isolated_pair();
        w2.add_goal_point("a", [10.0, 60.0, 10.0], 2.0).unwrap();

        let state = pinned_state();
        let o1 = CostModel::new(&w1).evaluate(&state, 1.0).objective;
        let o2 = CostModel::new(&w2).evaluate(&state, 1.0).objective;
        assert_eq!(o1, 200.0);
        assert_eq!(o2, 2.0 * o1);
    }

    #[test]
    fn test_pair_goal_maps_b_into_a_frame() {
        let mut problem = isolated_pair();
        problem.add_goal_pair("a", "b", 1.0).unwrap();
        let cost = CostModel::new(&problem);
        let breakdown = cost.evaluate(&pinned_state(), 1.0);
        // b at (9000, 60, 9000) in B maps to (72000, 60, 72000) in the
        // A frame; a sits at the A-frame origin at the same height.
        let expected = 2.0 * 72000.0_f64 * 72000.0;
        assert!((breakdown.objective - expected).abs() < 1e-6);
    }
}
