//! Annealer configuration.

/// Parameters for one annealing stage.
///
/// Cooling is geometric and applied every iteration regardless of
/// acceptance; the loop stops at the temperature floor or the
/// iteration budget, whichever comes first.
#[derive(Debug, Clone, Copy)]
pub struct StageConfig {
    pub initial_temperature: f64,
    /// Absolute temperature floor.
    pub min_temperature: f64,
    /// Geometric cooling factor in (0, 1). Higher = slower cooling.
    pub cooling: f64,
    /// Hard iteration budget for the stage.
    pub max_iterations: usize,
}

impl StageConfig {
    pub fn new(
        initial_temperature: f64,
        min_temperature: f64,
        cooling: f64,
        max_iterations: usize,
    ) -> Self {
        Self {
            initial_temperature,
            min_temperature,
            cooling,
            max_iterations,
        }
    }

    fn validate(&self, stage: &str) -> Result<(), String> {
        if self.initial_temperature <= 0.0 {
            return Err(format!("{stage}: initial_temperature must be positive"));
        }
        if self.min_temperature <= 0.0 {
            return Err(format!("{stage}: min_temperature must be positive"));
        }
        if self.min_temperature >= self.initial_temperature {
            return Err(format!(
                "{stage}: min_temperature must be less than initial_temperature"
            ));
        }
        if self.cooling <= 0.0 || self.cooling >= 1.0 {
            return Err(format!(
                "{stage}: cooling must be in (0, 1), got {}",
                self.cooling
            ));
        }
        Ok(())
    }
}

/// Configuration for the two-stage annealer.
///
/// # Builder Pattern
///
/// ```
/// use portalopt::anneal::{AnnealConfig, StageConfig};
///
/// let config = AnnealConfig::default()
///     .with_stage1(StageConfig::new(200.0, 1e-3, 0.9995, 100_000))
///     .with_stage1_attempts(4)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct AnnealConfig {
    /// Feasibility search: hotter, slower cooling, large jumps enabled.
    pub stage1: StageConfig,
    /// Feasible optimization: cooler, faster cooling, small moves only.
    pub stage2: StageConfig,
    /// Independent Stage-1 attempts before the run is declared
    /// infeasible.
    pub stage1_attempts: usize,
    /// Base factor on the Stage-1 worse-move acceptance probability.
    pub base_worse_accept: f64,
    /// Probability that a Stage-1 proposal is a large jump.
    pub jump_probability: f64,
    /// Iterations between progress-hook invocations and cancel polls.
    pub progress_interval: usize,
    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            stage1: StageConfig::new(100.0, 1e-3, 0.9997, 150_000),
            stage2: StageConfig::new(50.0, 1e-3, 0.998, 100_000),
            stage1_attempts: 8,
            base_worse_accept: 0.5,
            jump_probability: 0.1,
            progress_interval: 1000,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_stage1(mut self, stage: StageConfig) -> Self {
        self.stage1 = stage;
        self
    }

    pub fn with_stage2(mut self, stage: StageConfig) -> Self {
        self.stage2 = stage;
        self
    }

    pub fn with_stage1_attempts(mut self, attempts: usize) -> Self {
        self.stage1_attempts = attempts;
        self
    }

    pub fn with_base_worse_accept(mut self, p: f64) -> Self {
        self.base_worse_accept = p;
        self
    }

    pub fn with_jump_probability(mut self, p: f64) -> Self {
        self.jump_probability = p;
        self
    }

    pub fn with_progress_interval(mut self, n: usize) -> Self {
        self.progress_interval = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.stage1.validate("stage1")?;
        self.stage2.validate("stage2")?;
        if self.stage1_attempts == 0 {
            return Err("stage1_attempts must be at least 1".into());
        }
        if self.base_worse_accept <= 0.0 || self.base_worse_accept > 1.0 {
            return Err(format!(
                "base_worse_accept must be in (0, 1], got {}",
                self.base_worse_accept
            ));
        }
        if !(0.0..=1.0).contains(&self.jump_probability) {
            return Err(format!(
                "jump_probability must be in [0, 1], got {}",
                self.jump_probability
            ));
        }
        if self.progress_interval == 0 {
            return Err("progress_interval must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AnnealConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bad_cooling_rejected() {
        let config =
            AnnealConfig::default().with_stage2(StageConfig::new(10.0, 1e-3, 1.5, 1000));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_min_temperature_above_initial_rejected() {
        let config =
            AnnealConfig::default().with_stage1(StageConfig::new(1.0, 2.0, 0.99, 1000));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = AnnealConfig::default().with_stage1_attempts(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_jump_probability_bounds() {
        assert!(AnnealConfig::default()
            .with_jump_probability(1.0)
            .validate()
            .is_ok());
        assert!(AnnealConfig::default()
            .with_jump_probability(1.1)
            .validate()
            .is_err());
    }
}
