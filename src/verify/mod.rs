//! Final-state verification and diagnostics.
//!
//! Recomputes everything from scratch: containment violations, link
//! violations, per-goal distances, and cross-dimension probe distances
//! for every ordered portal pair (declared or not), which helps
//! diagnose near-miss links.

use crate::cost::CostModel;
use crate::link::{link_holds, probe_points, target_block};
use crate::model::{OptimizationGoal, Problem, State};

/// Distances for one optimization goal.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GoalReport {
    pub description: String,
    pub weight: f64,
    pub distance: f64,
    pub distance_sq: f64,
}

/// Distance from one portal's rescaled center-probe target to another
/// portal's actual position.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProbeDiagnostic {
    pub from: String,
    pub to: String,
    pub distance: f64,
    pub distance_sq: f64,
}

/// Everything recomputed for a final state.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Report {
    /// Portals whose position violates their containment rule.
    pub position_violations: Vec<String>,
    /// Desired links that do not hold, as (source, destination) names.
    pub link_violations: Vec<(String, String)>,
    pub goals: Vec<GoalReport>,
    /// One entry per ordered cross-dimension portal pair.
    pub probes: Vec<ProbeDiagnostic>,
}

impl Report {
    /// No violated constraints of either kind.
    pub fn is_clean(&self) -> bool {
        self.position_violations.is_empty() && self.link_violations.is_empty()
    }
}

fn describe_goal(problem: &Problem, goal: &OptimizationGoal) -> String {
    match goal {
        OptimizationGoal::Pair { a, b, .. } => {
            format!("{} <-> {}", problem.portal(*a).name, problem.portal(*b).name)
        }
        OptimizationGoal::Point { portal, target, .. } => format!(
            "{} -> ({}, {}, {})",
            problem.portal(*portal).name,
            target[0],
            target[1],
            target[2]
        ),
    }
}

/// Builds the full report for a final state.
pub fn report(problem: &Problem, state: &State) -> Report {
    let position_violations = problem
        .portals()
        .iter()
        .enumerate()
        .filter(|(idx, portal)| !portal.admits(state.position(*idx)))
        .map(|(_, portal)| portal.name.clone())
        .collect();

    let link_violations = problem
        .links
        .iter()
        .filter(|link| !link_holds(problem, link, state))
        .map(|link| {
            (
                problem.portal(link.source).name.clone(),
                problem.portal(link.dest).name.clone(),
            )
        })
        .collect();

    let cost = CostModel::new(problem);
    let goals = problem
        .goals
        .iter()
        .map(|goal| {
            let distance_sq = cost.goal_distance_sq(goal, state);
            GoalReport {
                description: describe_goal(problem, goal),
                weight: goal.weight(),
                distance: distance_sq.sqrt(),
                distance_sq,
            }
        })
        .collect();

    let mut probes = Vec::new();
    for (i, from) in problem.portals().iter().enumerate() {
        for (j, to) in problem.portals().iter().enumerate() {
            if from.dimension == to.dimension {
                continue;
            }
            let center = probe_points(state.position(i), from.facing, problem.entity_width)[0];
            let target = target_block(center, problem.rules.scale_into(to.dimension));
            let distance_sq = target.distance_sq(state.position(j)) as f64;
            probes.push(ProbeDiagnostic {
                from: from.name.clone(),
                to: to.name.clone(),
                distance: distance_sq.sqrt(),
                distance_sq,
            });
        }
    }

    Report {
        position_violations,
        link_violations,
        goals,
        probes,
    }
}
