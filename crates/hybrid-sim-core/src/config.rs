use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunables for stat derivation, breeding and the optimizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    /// Symmetric per-stat variation factor range.
    pub enable_variation: bool,
    pub variation_min: f64,
    pub variation_max: f64,
    /// Per-stat, per-individual point-mutation probability.
    pub stat_mutation_rate: f64,
    pub stat_mutation_min: f64,
    pub stat_mutation_max: f64,
    /// When false, alleles always transmit as themselves.
    pub enable_allele_mutation: bool,
    pub breeding_attempts: usize,
    /// Size (cm) at which Thaumacyst capacity equals the allele base.
    pub thaumacyst_reference_size: f64,
    /// Lower bound of the current/max fill fraction.
    pub thaumacyst_fill_min: f64,
    pub population_size: usize,
    pub baseline_samples: usize,
    pub producer_trials: usize,
    pub producer_threshold: f64,
    pub chunk_size: usize,
    pub litter_mode: bool,
    pub max_litter: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            enable_variation: true,
            variation_min: 0.9,
            variation_max: 1.1,
            stat_mutation_rate: 1e-4,
            stat_mutation_min: 0.5,
            stat_mutation_max: 1.5,
            enable_allele_mutation: true,
            breeding_attempts: 10,
            thaumacyst_reference_size: 170.0,
            thaumacyst_fill_min: 0.6,
            population_size: 20,
            baseline_samples: 100,
            producer_trials: 20,
            producer_threshold: 0.4,
            chunk_size: 10,
            litter_mode: false,
            max_litter: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} range is empty or negative: [{min}, {max}]")]
    InvalidRange {
        name: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("{name} must be positive")]
    NonPositive { name: &'static str },
    #[error("population_size ({actual}) must be between {min} and {max}")]
    PopulationSize {
        min: usize,
        max: usize,
        actual: usize,
    },
}

impl SimConfig {
    pub const MIN_POPULATION: usize = 2;
    pub const MAX_POPULATION: usize = 10_000;
    pub const MAX_BREEDING_ATTEMPTS: usize = 1_000;

    /// A configuration with no randomness in stat derivation or allele
    /// transmission beyond parental allele choice.
    pub fn deterministic() -> Self {
        Self {
            enable_variation: false,
            stat_mutation_rate: 0.0,
            enable_allele_mutation: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("variation", self.variation_min, self.variation_max)?;
        check_range(
            "stat_mutation",
            self.stat_mutation_min,
            self.stat_mutation_max,
        )?;
        check_range("thaumacyst_fill", self.thaumacyst_fill_min, 1.0)?;
        check_probability("stat_mutation_rate", self.stat_mutation_rate)?;
        check_probability("producer_threshold", self.producer_threshold)?;
        if !(self.thaumacyst_reference_size > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "thaumacyst_reference_size",
            });
        }
        if self.breeding_attempts == 0 || self.breeding_attempts > Self::MAX_BREEDING_ATTEMPTS {
            return Err(ConfigError::NonPositive {
                name: "breeding_attempts",
            });
        }
        if !(Self::MIN_POPULATION..=Self::MAX_POPULATION).contains(&self.population_size) {
            return Err(ConfigError::PopulationSize {
                min: Self::MIN_POPULATION,
                max: Self::MAX_POPULATION,
                actual: self.population_size,
            });
        }
        for (name, value) in [
            ("baseline_samples", self.baseline_samples),
            ("producer_trials", self.producer_trials),
            ("chunk_size", self.chunk_size),
            ("max_litter", self.max_litter),
        ] {
            if value == 0 {
                return Err(ConfigError::NonPositive { name });
            }
        }
        Ok(())
    }
}

fn check_range(name: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if !(min.is_finite() && max.is_finite()) || min < 0.0 || min > max {
        return Err(ConfigError::InvalidRange { name, min, max });
    }
    Ok(())
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidProbability { name, value });
    }
    Ok(())
}
