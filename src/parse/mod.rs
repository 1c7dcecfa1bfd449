//! Line-oriented textual problem grammar.
//!
//! ```text
//! ENTITY_SIZE <float>                                    ; must be > 0
//! PORTAL <name> <A|B> <X|Z>
//! POS <name> <INC|EXC> <minX minY minZ maxX maxY maxZ>   ; min <= max per axis
//! LINK <source> <dest>                                   ; dimensions must differ
//! OPTIMIZE <p1> <p2> [weight]                            ; weight >= 0, default 1
//! OPTIMIZE_POS <p> <x> <y> <z> [weight]
//! ```
//!
//! Blank lines and lines starting with `#` are ignored; directives are
//! case-insensitive. A malformed line aborts parsing with its 1-based
//! line number and raw text, and no partially populated problem ever
//! escapes.

use crate::error::ParseError;
use crate::model::{Axis, BlockPos, Dimension, Portal, Problem, Region};

/// Parses a textual problem description into a validated [`Problem`].
pub fn parse_problem(input: &str) -> Result<Problem, ParseError> {
    let mut problem = Problem::new(0.0);
    let mut entity_size: Option<f64> = None;

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let directive = tokens[0].to_ascii_uppercase();
        let args = &tokens[1..];

        let result = match directive.as_str() {
            "ENTITY_SIZE" => parse_entity_size(args, &mut entity_size),
            "PORTAL" => parse_portal(args, &mut problem),
            "POS" => parse_pos(args, &mut problem),
            "LINK" => parse_link(args, &mut problem),
            "OPTIMIZE" => parse_optimize(args, &mut problem),
            "OPTIMIZE_POS" => parse_optimize_pos(args, &mut problem),
            other => Err(format!("unknown directive `{other}`")),
        };

        if let Err(message) = result {
            return Err(ParseError::at(line_no, message, raw));
        }
    }

    match entity_size {
        Some(size) => problem.entity_width = size,
        None => return Err(ParseError::Invalid("missing ENTITY_SIZE".into())),
    }
    problem.validate().map_err(ParseError::Invalid)?;
    Ok(problem)
}

fn parse_entity_size(args: &[&str], entity_size: &mut Option<f64>) -> Result<(), String> {
    let [size] = expect_args::<1>(args)?;
    let size: f64 = parse_num(size, "entity size")?;
    if size <= 0.0 {
        return Err(format!("entity size must be > 0, got {size}"));
    }
    if entity_size.replace(size).is_some() {
        return Err("duplicate ENTITY_SIZE".into());
    }
    Ok(())
}

fn parse_portal(args: &[&str], problem: &mut Problem) -> Result<(), String> {
    let [name, dim, face] = expect_args::<3>(args)?;
    let dimension = match dim.to_ascii_uppercase().as_str() {
        "A" => Dimension::A,
        "B" => Dimension::B,
        other => return Err(format!("dimension must be A or B, got `{other}`")),
    };
    let facing = match face.to_ascii_uppercase().as_str() {
        "X" => Axis::X,
        "Z" => Axis::Z,
        other => return Err(format!("facing axis must be X or Z, got `{other}`")),
    };
    problem.add_portal(Portal::new(name, dimension, facing))?;
    Ok(())
}

fn parse_pos(args: &[&str], problem: &mut Problem) -> Result<(), String> {
    let [name, kind, ax, ay, az, bx, by, bz] = expect_args::<8>(args)?;
    let region = Region::new(
        BlockPos::new(
            parse_num(ax, "min x")?,
            parse_num(ay, "min y")?,
            parse_num(az, "min z")?,
        ),
        BlockPos::new(
            parse_num(bx, "max x")?,
            parse_num(by, "max y")?,
            parse_num(bz, "max z")?,
        ),
    );
    match kind.to_ascii_uppercase().as_str() {
        "INC" => problem.add_inclusive(name, region),
        "EXC" => problem.add_exclusive(name, region),
        other => Err(format!("region kind must be INC or EXC, got `{other}`")),
    }
}

fn parse_link(args: &[&str], problem: &mut Problem) -> Result<(), String> {
    let [source, dest] = expect_args::<2>(args)?;
    problem.add_link(source, dest)
}

fn parse_optimize(args: &[&str], problem: &mut Problem) -> Result<(), String> {
    let (required, weight) = split_weight::<2>(args)?;
    let [a, b] = required;
    problem.add_goal_pair(a, b, weight)
}

fn parse_optimize_pos(args: &[&str], problem: &mut Problem) -> Result<(), String> {
    let (required, weight) = split_weight::<4>(args)?;
    let [portal, x, y, z] = required;
    let target = [
        parse_num(x, "target x")?,
        parse_num(y, "target y")?,
        parse_num(z, "target z")?,
    ];
    problem.add_goal_point(portal, target, weight)
}

/// Exactly `N` arguments.
fn expect_args<'a, const N: usize>(args: &[&'a str]) -> Result<[&'a str; N], String> {
    <[&str; N]>::try_from(args)
        .map_err(|_| format!("expected {N} argument(s), got {}", args.len()))
}

/// Exactly `N` arguments plus an optional trailing weight (default 1).
fn split_weight<'a, const N: usize>(args: &[&'a str]) -> Result<([&'a str; N], f64), String> {
    if args.len() == N + 1 {
        let weight = parse_num(args[N], "weight")?;
        Ok((expect_args::<N>(&args[..N])?, weight))
    } else {
        Ok((expect_args::<N>(args)?, 1.0))
    }
}

fn parse_num<T: std::str::FromStr>(token: &str, what: &str) -> Result<T, String> {
    token
        .parse()
        .map_err(|_| format!("invalid {what} `{token}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptimizationGoal;

    const GOOD: &str = "\
# portal pair with one goal
ENTITY_SIZE 0.6

portal overworld A X
PORTAL nether B Z
POS overworld INC -10 50 -10 10 70 10
POS overworld EXC 0 60 0 2 62 2
POS nether inc -5 50 -5 5 70 5
LINK overworld nether
LINK nether overworld
OPTIMIZE overworld nether
OPTIMIZE_POS nether 100 64 -100 2.5
";

    #[test]
    fn test_parse_full_problem() {
        let problem = parse_problem(GOOD).unwrap();
        assert!((problem.entity_width - 0.6).abs() < 1e-12);
        assert_eq!(problem.portal_count(), 2);
        assert_eq!(problem.links.len(), 2);
        assert_eq!(problem.goals.len(), 2);
        assert_eq!(problem.portal(0).exclusive.len(), 1);
        assert_eq!(problem.portal(1).dimension, Dimension::B);
        assert_eq!(problem.portal(1).facing, Axis::Z);
    }

    #[test]
    fn test_default_and_explicit_weight() {
        let problem = parse_problem(GOOD).unwrap();
        assert_eq!(problem.goals[0].weight(), 1.0);
        match &problem.goals[1] {
            OptimizationGoal::Point { target, weight, .. } => {
                assert_eq!(*target, [100.0, 64.0, -100.0]);
                assert_eq!(*weight, 2.5);
            }
            other => panic!("expected point goal, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_line_reports_number_and_text() {
        let input = "ENTITY_SIZE 0.6\nPORTAL p A X\nPOS p INC 0 0 0 1 1\n";
        match parse_problem(input) {
            Err(ParseError::Line { line, text, .. }) => {
                assert_eq!(line, 3);
                assert!(text.contains("POS p INC"));
            }
            other => panic!("expected line error, got {other:?}"),
        }
    }

    #[test]
    fn test_same_dimension_link_is_a_parse_error() {
        let input = "\
ENTITY_SIZE 1
PORTAL p A X
PORTAL q A X
POS p INC 0 0 0 1 1 1
POS q INC 0 0 0 1 1 1
LINK p q
";
        match parse_problem(input) {
            Err(ParseError::Line { line, .. }) => assert_eq!(line, 6),
            other => panic!("expected line error, got {other:?}"),
        }
    }

    #[test]
    fn test_region_min_above_max_rejected() {
        let input = "ENTITY_SIZE 1\nPORTAL p A X\nPOS p INC 5 0 0 1 1 1\n";
        assert!(matches!(
            parse_problem(input),
            Err(ParseError::Line { line: 3, .. })
        ));
    }

    #[test]
    fn test_missing_entity_size_rejected() {
        let input = "PORTAL p A X\nPOS p INC 0 0 0 1 1 1\n";
        assert!(matches!(parse_problem(input), Err(ParseError::Invalid(_))));
    }

    #[test]
    fn test_portal_without_inclusive_region_rejected() {
        let input = "ENTITY_SIZE 1\nPORTAL p A X\n";
        match parse_problem(input) {
            Err(ParseError::Invalid(message)) => assert!(message.contains("p")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_directive_rejected() {
        let input = "ENTITY_SIZE 1\nTELEPORT p q\n";
        assert!(matches!(
            parse_problem(input),
            Err(ParseError::Line { line: 2, .. })
        ));
    }

    #[test]
    fn test_nonpositive_entity_size_rejected() {
        assert!(parse_problem("ENTITY_SIZE 0\n").is_err());
        assert!(parse_problem("ENTITY_SIZE -1.5\n").is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let input = "\
ENTITY_SIZE 1
PORTAL p A X
PORTAL q B X
POS p INC 0 0 0 1 1 1
POS q INC 0 0 0 1 1 1
OPTIMIZE p q -2
";
        assert!(matches!(
            parse_problem(input),
            Err(ParseError::Line { line: 6, .. })
        ));
    }
}
