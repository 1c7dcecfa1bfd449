//! State initialization and single-portal move proposals.

use crate::model::{BlockPos, Portal, Problem, Region, State};
use rand::Rng;

/// Attempts per portal when drawing an initial position.
const INIT_ATTEMPTS: usize = 1000;

/// Attempts when redrawing a portal for a large jump.
const JUMP_ATTEMPTS: usize = 32;

/// Attempts when proposing a small move.
const MOVE_ATTEMPTS: usize = 16;

/// Maximum per-axis magnitude of a small move.
const MAX_STEP: i32 = 4;

fn random_point_in<R: Rng>(region: &Region, rng: &mut R) -> BlockPos {
    BlockPos::new(
        rng.random_range(region.min.x..=region.max.x),
        rng.random_range(region.min.y..=region.max.y),
        rng.random_range(region.min.z..=region.max.z),
    )
}

/// Draws a position satisfying the portal's containment rule: a
/// uniformly chosen inclusive region, a uniform point inside it,
/// rejected while it falls in an exclusive region.
fn draw_position<R: Rng>(portal: &Portal, attempts: usize, rng: &mut R) -> Option<BlockPos> {
    for _ in 0..attempts {
        let region = &portal.inclusive[rng.random_range(0..portal.inclusive.len())];
        let pos = random_point_in(region, rng);
        if !portal.exclusive.iter().any(|r| r.contains(pos)) {
            return Some(pos);
        }
    }
    None
}

/// Independent random start for every portal.
///
/// Fails with the offending portal's name when a draw budget is
/// exhausted; no partially initialized state escapes.
pub fn initialize<R: Rng>(problem: &Problem, rng: &mut R) -> Result<State, String> {
    let mut positions = Vec::with_capacity(problem.portal_count());
    for portal in problem.portals() {
        match draw_position(portal, INIT_ATTEMPTS, rng) {
            Some(pos) => positions.push(pos),
            None => {
                return Err(format!(
                    "no valid start position for portal `{}` after {INIT_ATTEMPTS} attempts",
                    portal.name
                ))
            }
        }
    }
    Ok(State::new(positions))
}

fn nonzero_step<R: Rng>(rng: &mut R) -> i32 {
    let magnitude = rng.random_range(1..=MAX_STEP);
    if rng.random_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

/// Proposes a state differing from `state` in exactly one portal's
/// position, or `None` when no admissible move was found within the
/// retry budget (the caller treats that as a skipped iteration).
///
/// With `allow_jumps` set, a `jump_probability` coin flip first tries a
/// fresh containment-rule draw for the chosen portal; otherwise (or if
/// the draw budget runs out) a small random offset is applied.
pub fn propose<R: Rng>(
    problem: &Problem,
    state: &State,
    allow_jumps: bool,
    jump_probability: f64,
    rng: &mut R,
) -> Option<State> {
    if problem.portal_count() == 0 {
        return None;
    }
    let idx = rng.random_range(0..problem.portal_count());
    let portal = problem.portal(idx);
    let current = state.position(idx);

    if allow_jumps && jump_probability > 0.0 && rng.random_bool(jump_probability) {
        if let Some(pos) = draw_position(portal, JUMP_ATTEMPTS, rng) {
            // A redraw may land on the current position; that is not a
            // move, so fall through to the small-move path instead.
            if pos != current {
                let mut next = state.clone();
                next.set_position(idx, pos);
                return Some(next);
            }
        }
    }

    for _ in 0..MOVE_ATTEMPTS {
        let candidate = BlockPos::new(
            current.x + nonzero_step(rng),
            current.y + nonzero_step(rng),
            current.z + nonzero_step(rng),
        );
        if portal.admits(candidate) {
            let mut next = state.clone();
            next.set_position(idx, candidate);
            return Some(next);
        }
    }
    None
}
