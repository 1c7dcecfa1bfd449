//! Link validity predicate.
//!
//! Replicates the destination-side nearest-candidate matching rule: an
//! entity probing outward from the source portal is rescaled into the
//! destination dimension and must resolve to the declared destination
//! portal at all three probe points. Pure and deterministic.

use crate::model::{Axis, BlockPos, DesiredLink, Dimension, Problem, State};

/// The three probe points of an entity at `pos` facing `facing`.
///
/// Block center (+0.5 on x and z, +0.0 vertically) plus two points
/// offset by half the footprint width along the axis perpendicular to
/// the facing.
pub(crate) fn probe_points(pos: BlockPos, facing: Axis, width: f64) -> [[f64; 3]; 3] {
    let cx = pos.x as f64 + 0.5;
    let cy = pos.y as f64;
    let cz = pos.z as f64 + 0.5;
    let half = width / 2.0;
    match facing {
        Axis::X => [[cx, cy, cz], [cx, cy, cz - half], [cx, cy, cz + half]],
        Axis::Z => [[cx, cy, cz], [cx - half, cy, cz], [cx + half, cy, cz]],
    }
}

/// The floored, rescaled search anchor of a probe. Horizontal axes are
/// scaled into the destination frame; the vertical axis is untouched.
pub(crate) fn target_block(probe: [f64; 3], scale: f64) -> BlockPos {
    BlockPos::new(
        (probe[0] * scale).floor() as i32,
        probe[1].floor() as i32,
        (probe[2] * scale).floor() as i32,
    )
}

/// The destination-dimension portal a probe resolves to, if any.
///
/// Candidates are portals in `dest_dim` within the square search radius
/// of the target on x and z (no vertical restriction). The nearest by
/// squared distance wins; ties prefer the lower y, then the problem's
/// portal declaration order.
fn resolve_probe(
    problem: &Problem,
    state: &State,
    dest_dim: Dimension,
    target: BlockPos,
) -> Option<usize> {
    let radius = problem.rules.search_radius(dest_dim) as i64;
    let mut best: Option<(usize, i64, i32)> = None;
    for (idx, portal) in problem.portals().iter().enumerate() {
        if portal.dimension != dest_dim {
            continue;
        }
        let pos = state.position(idx);
        if (pos.x as i64 - target.x as i64).abs() > radius
            || (pos.z as i64 - target.z as i64).abs() > radius
        {
            continue;
        }
        let dist_sq = pos.distance_sq(target);
        let closer = match best {
            None => true,
            Some((_, best_dist, best_y)) => {
                dist_sq < best_dist || (dist_sq == best_dist && pos.y < best_y)
            }
        };
        if closer {
            best = Some((idx, dist_sq, pos.y));
        }
    }
    best.map(|(idx, _, _)| idx)
}

/// Whether the desired link holds in `state`: all three probes must
/// resolve to the declared destination.
pub fn link_holds(problem: &Problem, link: &DesiredLink, state: &State) -> bool {
    let source = problem.portal(link.source);
    let dest_dim = problem.portal(link.dest).dimension;
    let scale = problem.rules.scale_into(dest_dim);
    let probes = probe_points(state.position(link.source), source.facing, problem.entity_width);
    probes.iter().all(|&probe| {
        let target = target_block(probe, scale);
        resolve_probe(problem, state, dest_dim, target) == Some(link.dest)
    })
}

/// Number of desired links that do not hold.
pub fn count_link_violations(problem: &Problem, state: &State) -> usize {
    problem
        .links
        .iter()
        .filter(|link| !link_holds(problem, link, state))
        .count()
}

/// Desired links that do not hold, in declaration order.
pub fn violated_links<'a>(problem: &'a Problem, state: &State) -> Vec<&'a DesiredLink> {
    problem
        .links
        .iter()
        .filter(|link| !link_holds(problem, link, state))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Portal, Region};

    /// Source in Dimension A at the origin plus B-dimension candidates
    /// at the given positions; one link from the source to `dest`.
    fn candidate_problem(candidates: &[BlockPos], dest: usize) -> (Problem, State) {
        let mut problem = Problem::new(0.6);
        problem
            .add_portal(Portal::new("src", Dimension::A, Axis::X))
            .unwrap();
        problem
            .add_inclusive("src", Region::new(BlockPos::new(0, 0, 0), BlockPos::new(0, 0, 0)))
            .unwrap();
        for i in 0..candidates.len() {
            let name = format!("c{i}");
            problem
                .add_portal(Portal::new(&name, Dimension::B, Axis::X))
                .unwrap();
            problem
                .add_inclusive(
                    &name,
                    Region::new(BlockPos::new(-64, -64, -64), BlockPos::new(64, 64, 64)),
                )
                .unwrap();
        }
        problem.add_link("src", &format!("c{dest}")).unwrap();

        let mut positions = vec![BlockPos::new(0, 0, 0)];
        positions.extend_from_slice(candidates);
        (problem, State::new(positions))
    }

    #[test]
    fn test_tie_break_prefers_lower_y() {
        // All three candidates sit at squared distance 25 from the
        // target block (0, 0, 0); only (3, -4, 0) has a lower y.
        let candidates = [
            BlockPos::new(5, 0, 0),
            BlockPos::new(0, 0, 5),
            BlockPos::new(3, -4, 0),
        ];
        let (problem, state) = candidate_problem(&candidates, 2);
        assert!(link_holds(&problem, &problem.links[0], &state));
    }

    #[test]
    fn test_equal_distance_higher_y_loses() {
        // Same distances, but the declared destination is (3, 4, 0):
        // the lower-y candidates win the tie, so the link fails.
        let candidates = [
            BlockPos::new(5, 0, 0),
            BlockPos::new(0, 0, 5),
            BlockPos::new(3, 4, 0),
        ];
        let (problem, state) = candidate_problem(&candidates, 2);
        assert!(!link_holds(&problem, &problem.links[0], &state));
    }

    #[test]
    fn test_no_candidate_in_radius_fails() {
        // Default B-destination radius is 16; the only candidate is
        // far outside it on the horizontal axes.
        let candidates = [BlockPos::new(500, 0, 500)];
        let (problem, state) = candidate_problem(&candidates, 0);
        assert!(!link_holds(&problem, &problem.links[0], &state));
    }

    #[test]
    fn test_vertical_offset_does_not_exclude_candidates() {
        // No vertical restriction on the candidate search.
        let candidates = [BlockPos::new(0, 120, 0)];
        let (problem, state) = candidate_problem(&candidates, 0);
        assert!(link_holds(&problem, &problem.links[0], &state));
    }

    #[test]
    fn test_predicate_is_pure() {
        let candidates = [BlockPos::new(2, 0, 2), BlockPos::new(9, 0, 9)];
        let (problem, state) = candidate_problem(&candidates, 0);
        let first = link_holds(&problem, &problem.links[0], &state);
        for _ in 0..10 {
            assert_eq!(link_holds(&problem, &problem.links[0], &state), first);
        }
    }

    #[test]
    fn test_wide_entity_probe_can_cross_block_boundary() {
        // A B-side source at z = 0 with a wide footprint probes z at
        // -0.5 and 1.5 after the x8 rescale lands blocks apart, so a
        // candidate matching only the center probe is not enough.
        let mut problem = Problem::new(2.0);
        problem
            .add_portal(Portal::new("src", Dimension::B, Axis::X))
            .unwrap();
        problem
            .add_inclusive("src", Region::new(BlockPos::new(0, 0, 0), BlockPos::new(0, 0, 0)))
            .unwrap();
        problem
            .add_portal(Portal::new("near", Dimension::A, Axis::X))
            .unwrap();
        problem
            .add_inclusive(
                "near",
                Region::new(BlockPos::new(-256, -64, -256), BlockPos::new(256, 64, 256)),
            )
            .unwrap();
        problem
            .add_portal(Portal::new("far", Dimension::A, Axis::X))
            .unwrap();
        problem
            .add_inclusive(
                "far",
                Region::new(BlockPos::new(-256, -64, -256), BlockPos::new(256, 64, 256)),
            )
            .unwrap();
        problem.add_link("src", "near").unwrap();

        // Probes at z in {-0.5, 0.5, 1.5} scale x8 to targets with
        // z in {-4, 4, 12}. `far` is nearest to the z = 12 probe.
        let state = State::new(vec![
            BlockPos::new(0, 0, 0),
            BlockPos::new(4, 0, 4),
            BlockPos::new(4, 0, 12),
        ]);
        assert!(!link_holds(&problem, &problem.links[0], &state));
    }

    #[test]
    fn test_count_and_list_violations_agree() {
        let candidates = [BlockPos::new(2, 0, 2), BlockPos::new(500, 0, 500)];
        let (problem, state) = candidate_problem(&candidates, 1);
        assert_eq!(count_link_violations(&problem, &state), 1);
        let violated = violated_links(&problem, &state);
        assert_eq!(violated.len(), 1);
        assert_eq!(violated[0].dest, 2);
    }
}
