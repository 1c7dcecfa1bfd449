//! Problem definition: portals, desired links, optimization goals,
//! and the per-dimension linking constants.

use super::geometry::{Axis, BlockPos, Dimension, Region};
use std::collections::HashMap;

/// A named entity whose integer position is to be solved.
///
/// The position itself lives in [`State`](super::State); the portal only
/// carries the constraints it must satisfy.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Portal {
    pub name: String,
    pub dimension: Dimension,
    pub facing: Axis,
    /// The position must lie inside at least one of these.
    pub inclusive: Vec<Region>,
    /// The position must lie outside all of these.
    pub exclusive: Vec<Region>,
}

impl Portal {
    pub fn new(name: impl Into<String>, dimension: Dimension, facing: Axis) -> Self {
        Self {
            name: name.into(),
            dimension,
            facing,
            inclusive: Vec::new(),
            exclusive: Vec::new(),
        }
    }

    /// The containment rule: inside at least one inclusive region and
    /// outside every exclusive region.
    pub fn admits(&self, pos: BlockPos) -> bool {
        self.inclusive.iter().any(|r| r.contains(pos))
            && !self.exclusive.iter().any(|r| r.contains(pos))
    }
}

/// An ordered linking requirement between two portals in different
/// dimensions. Indices refer to the owning problem's portal list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DesiredLink {
    pub source: usize,
    pub dest: usize,
}

/// A weighted distance objective over final positions.
///
/// Point targets are expressed in Dimension-A coordinates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptimizationGoal {
    /// Minimize the squared distance between two portals.
    Pair { a: usize, b: usize, weight: f64 },
    /// Minimize the squared distance from a portal to a fixed point.
    Point {
        portal: usize,
        target: [f64; 3],
        weight: f64,
    },
}

impl OptimizationGoal {
    pub fn weight(&self) -> f64 {
        match self {
            OptimizationGoal::Pair { weight, .. } => *weight,
            OptimizationGoal::Point { weight, .. } => *weight,
        }
    }
}

/// Per-dimension linking constants.
///
/// Supplied with the problem, never derived. The two scale factors form
/// a matched inverse pair; the search radius is a square horizontal
/// radius keyed on the destination dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkRules {
    /// Horizontal scale applied to coordinates crossing A -> B.
    pub scale_a_to_b: f64,
    /// Horizontal scale applied to coordinates crossing B -> A.
    pub scale_b_to_a: f64,
    /// Candidate search radius when the destination is Dimension A.
    pub search_radius_a: i32,
    /// Candidate search radius when the destination is Dimension B.
    pub search_radius_b: i32,
}

impl Default for LinkRules {
    fn default() -> Self {
        Self {
            scale_a_to_b: 0.125,
            scale_b_to_a: 8.0,
            search_radius_a: 128,
            search_radius_b: 16,
        }
    }
}

impl LinkRules {
    /// Horizontal scale applied to a probe crossing into `dest`.
    pub fn scale_into(&self, dest: Dimension) -> f64 {
        match dest {
            Dimension::A => self.scale_b_to_a,
            Dimension::B => self.scale_a_to_b,
        }
    }

    /// Candidate search radius in the destination dimension.
    pub fn search_radius(&self, dest: Dimension) -> i32 {
        match dest {
            Dimension::A => self.search_radius_a,
            Dimension::B => self.search_radius_b,
        }
    }

    /// Horizontal scale mapping a position in `dim` into the
    /// Dimension-A frame.
    pub fn to_a_frame(&self, dim: Dimension) -> f64 {
        match dim {
            Dimension::A => 1.0,
            Dimension::B => self.scale_b_to_a,
        }
    }
}

/// Immutable problem definition.
///
/// Portals keep their declaration order; that order is the final
/// deterministic tie-breaker in the linking predicate.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Problem {
    /// Footprint width of the probing entity. Must be positive.
    pub entity_width: f64,
    portals: Vec<Portal>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<String, usize>,
    pub links: Vec<DesiredLink>,
    pub goals: Vec<OptimizationGoal>,
    pub rules: LinkRules,
}

impl Problem {
    pub fn new(entity_width: f64) -> Self {
        Self {
            entity_width,
            portals: Vec::new(),
            index: HashMap::new(),
            links: Vec::new(),
            goals: Vec::new(),
            rules: LinkRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: LinkRules) -> Self {
        self.rules = rules;
        self
    }

    /// Adds a portal. Names must be unique.
    pub fn add_portal(&mut self, portal: Portal) -> Result<usize, String> {
        if self.index.contains_key(&portal.name) {
            return Err(format!("duplicate portal `{}`", portal.name));
        }
        let idx = self.portals.len();
        self.index.insert(portal.name.clone(), idx);
        self.portals.push(portal);
        Ok(idx)
    }

    pub fn portal_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn portal(&self, idx: usize) -> &Portal {
        &self.portals[idx]
    }

    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    pub fn portal_count(&self) -> usize {
        self.portals.len()
    }

    fn resolve(&self, name: &str) -> Result<usize, String> {
        self.portal_index(name)
            .ok_or_else(|| format!("undefined portal `{name}`"))
    }

    /// Adds an inclusive region to a named portal.
    pub fn add_inclusive(&mut self, name: &str, region: Region) -> Result<(), String> {
        if !region.is_well_formed() {
            return Err(format!("region min exceeds max: {region}"));
        }
        let idx = self.resolve(name)?;
        self.portals[idx].inclusive.push(region);
        Ok(())
    }

    /// Adds an exclusive region to a named portal.
    pub fn add_exclusive(&mut self, name: &str, region: Region) -> Result<(), String> {
        if !region.is_well_formed() {
            return Err(format!("region min exceeds max: {region}"));
        }
        let idx = self.resolve(name)?;
        self.portals[idx].exclusive.push(region);
        Ok(())
    }

    /// Adds a desired link. The endpoints must exist and must live in
    /// different dimensions.
    pub fn add_link(&mut self, source: &str, dest: &str) -> Result<(), String> {
        let source = self.resolve(source)?;
        let dest = self.resolve(dest)?;
        if self.portals[source].dimension == self.portals[dest].dimension {
            return Err(format!(
                "link endpoints `{}` and `{}` are both in dimension {}",
                self.portals[source].name, self.portals[dest].name, self.portals[source].dimension
            ));
        }
        self.links.push(DesiredLink { source, dest });
        Ok(())
    }

    /// Adds a portal-pair distance goal.
    pub fn add_goal_pair(&mut self, a: &str, b: &str, weight: f64) -> Result<(), String> {
        if weight < 0.0 {
            return Err(format!("goal weight must be non-negative, got {weight}"));
        }
        let a = self.resolve(a)?;
        let b = self.resolve(b)?;
        self.goals.push(OptimizationGoal::Pair { a, b, weight });
        Ok(())
    }

    /// Adds a portal-to-point distance goal. The target is in
    /// Dimension-A coordinates.
    pub fn add_goal_point(
        &mut self,
        portal: &str,
        target: [f64; 3],
        weight: f64,
    ) -> Result<(), String> {
        if weight < 0.0 {
            return Err(format!("goal weight must be non-negative, got {weight}"));
        }
        let portal = self.resolve(portal)?;
        self.goals.push(OptimizationGoal::Point {
            portal,
            target,
            weight,
        });
        Ok(())
    }

    /// Validates the problem for consistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.entity_width <= 0.0 {
            return Err(format!(
                "entity width must be positive, got {}",
                self.entity_width
            ));
        }
        for portal in &self.portals {
            if portal.inclusive.is_empty() {
                return Err(format!("portal `{}` has no inclusive region", portal.name));
            }
            for region in portal.inclusive.iter().chain(&portal.exclusive) {
                if !region.is_well_formed() {
                    return Err(format!(
                        "portal `{}`: region min exceeds max: {region}",
                        portal.name
                    ));
                }
            }
        }
        for link in &self.links {
            if self.portals[link.source].dimension == self.portals[link.dest].dimension {
                return Err(format!(
                    "link `{}` -> `{}` does not cross dimensions",
                    self.portals[link.source].name, self.portals[link.dest].name
                ));
            }
        }
        for goal in &self.goals {
            if goal.weight() < 0.0 {
                return Err("goal weight must be non-negative".into());
            }
        }
        Ok(())
    }
}
