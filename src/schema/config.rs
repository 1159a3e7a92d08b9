//! Configuration types for the genetic training algorithm.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{FitnessAssignmentMethod, MutationMethod, RecombinationMethod, SelectionMethod};

/// Magnitude used as "unreachable" for performance goals and as the evaluation sentinel.
pub const PERFORMANCE_SENTINEL: f64 = 1.0e99;

/// Top-level configuration for a genetic training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticAlgorithmConfig {
    /// Number of individuals. Zero, or an even number of at least 4.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Fitness assignment policy.
    #[serde(default)]
    pub fitness_assignment: FitnessAssignmentMethod,
    /// Selection policy.
    #[serde(default)]
    pub selection: SelectionMethod,
    /// Recombination policy.
    #[serde(default)]
    pub recombination: RecombinationMethod,
    /// Mutation policy.
    #[serde(default)]
    pub mutation: MutationMethod,
    /// Distribution used to draw fresh individuals.
    #[serde(default)]
    pub initialization: Initialization,
    /// Number of best individuals always selected as parents.
    #[serde(default = "default_elitism_size")]
    pub elitism_size: usize,
    /// Fitness spread of linear ranking.
    #[serde(default = "default_selective_pressure")]
    pub selective_pressure: f64,
    /// Widens the interpolation range of recombination beyond the parents.
    #[serde(default = "default_recombination_size")]
    pub recombination_size: f64,
    /// Per-gene probability of perturbation.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Magnitude of perturbations.
    #[serde(default = "default_mutation_range")]
    pub mutation_range: f64,
    /// When training stops.
    #[serde(default)]
    pub stopping: StoppingCriteria,
    /// Per-generation values retained in the results.
    #[serde(default)]
    pub history: HistoryChannels,
    /// Progress is logged every `display_period` generations.
    #[serde(default = "default_display_period")]
    pub display_period: usize,
    /// Evaluate individuals on the rayon thread pool.
    #[serde(default = "default_parallel_evaluation")]
    pub parallel_evaluation: bool,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for GeneticAlgorithmConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            fitness_assignment: FitnessAssignmentMethod::default(),
            selection: SelectionMethod::default(),
            recombination: RecombinationMethod::default(),
            mutation: MutationMethod::default(),
            initialization: Initialization::default(),
            elitism_size: default_elitism_size(),
            selective_pressure: default_selective_pressure(),
            recombination_size: default_recombination_size(),
            mutation_rate: default_mutation_rate(),
            mutation_range: default_mutation_range(),
            stopping: StoppingCriteria::default(),
            history: HistoryChannels::default(),
            display_period: default_display_period(),
            parallel_evaluation: default_parallel_evaluation(),
            random_seed: None,
        }
    }
}

fn default_population_size() -> usize {
    20
}
fn default_elitism_size() -> usize {
    2
}
fn default_selective_pressure() -> f64 {
    1.5
}
fn default_recombination_size() -> f64 {
    0.25
}
fn default_mutation_rate() -> f64 {
    0.1
}
fn default_mutation_range() -> f64 {
    0.1
}
fn default_display_period() -> usize {
    10
}
fn default_parallel_evaluation() -> bool {
    true
}

/// Stopping thresholds, checked once per generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoppingCriteria {
    /// Stop when the best performance ever is at or below this value.
    #[serde(default = "default_unreachable_goal")]
    pub best_performance_goal: f64,
    /// Stop when the population mean performance is at or below this value.
    #[serde(default = "default_unreachable_goal")]
    pub mean_performance_goal: f64,
    /// Stop when the performance standard deviation is at or below this value.
    #[serde(default)]
    pub standard_deviation_performance_goal: f64,
    /// Stop when generalization performance got worse more often than this.
    #[serde(default = "default_maximum_generalization_decreases")]
    pub maximum_generalization_performance_decreases: usize,
    /// Stop when this generation is reached.
    #[serde(default = "default_maximum_generations")]
    pub maximum_generations_number: usize,
    /// Stop when this many seconds have elapsed.
    #[serde(default = "default_maximum_time")]
    pub maximum_time: f64,
}

impl Default for StoppingCriteria {
    fn default() -> Self {
        Self {
            best_performance_goal: default_unreachable_goal(),
            mean_performance_goal: default_unreachable_goal(),
            standard_deviation_performance_goal: 0.0,
            maximum_generalization_performance_decreases: default_maximum_generalization_decreases(
            ),
            maximum_generations_number: default_maximum_generations(),
            maximum_time: default_maximum_time(),
        }
    }
}

fn default_unreachable_goal() -> f64 {
    -PERFORMANCE_SENTINEL
}
fn default_maximum_generalization_decreases() -> usize {
    1_000_000
}
fn default_maximum_generations() -> usize {
    1000
}
fn default_maximum_time() -> f64 {
    1000.0
}

/// Distribution used to draw the genes of fresh individuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Initialization {
    /// Every gene from `N(mean, standard_deviation)`.
    Normal {
        #[serde(default)]
        mean: f64,
        #[serde(default = "default_standard_deviation")]
        standard_deviation: f64,
    },
    /// Every gene from `U[minimum, maximum]`.
    Uniform { minimum: f64, maximum: f64 },
    /// Gene `j` from `N(mean[j], standard_deviation[j])`.
    NormalPerGene {
        mean: Vec<f64>,
        standard_deviation: Vec<f64>,
    },
    /// Gene `j` from `U[minimum[j], maximum[j]]`.
    UniformPerGene { minimum: Vec<f64>, maximum: Vec<f64> },
}

impl Default for Initialization {
    fn default() -> Self {
        Self::Normal {
            mean: 0.0,
            standard_deviation: default_standard_deviation(),
        }
    }
}

fn default_standard_deviation() -> f64 {
    1.0
}

impl Initialization {
    /// Check the distribution parameters against the individual dimension.
    pub fn validate(&self, dimension: usize) -> Result<(), ConfigError> {
        match self {
            Initialization::Normal {
                mean,
                standard_deviation,
            } => check_normal(*mean, *standard_deviation),
            Initialization::Uniform { minimum, maximum } => check_uniform(*minimum, *maximum),
            Initialization::NormalPerGene {
                mean,
                standard_deviation,
            } => {
                check_length(mean.len(), dimension)?;
                check_length(standard_deviation.len(), dimension)?;
                mean.iter()
                    .zip(standard_deviation)
                    .try_for_each(|(&m, &s)| check_normal(m, s))
            }
            Initialization::UniformPerGene { minimum, maximum } => {
                check_length(minimum.len(), dimension)?;
                check_length(maximum.len(), dimension)?;
                minimum
                    .iter()
                    .zip(maximum)
                    .try_for_each(|(&lo, &hi)| check_uniform(lo, hi))
            }
        }
    }
}

fn check_normal(mean: f64, standard_deviation: f64) -> Result<(), ConfigError> {
    if !mean.is_finite() || !standard_deviation.is_finite() || standard_deviation < 0.0 {
        return Err(ConfigError::InvalidDistribution(format!(
            "normal(mean = {mean}, standard deviation = {standard_deviation})"
        )));
    }
    Ok(())
}

fn check_uniform(minimum: f64, maximum: f64) -> Result<(), ConfigError> {
    if minimum > maximum || !sampleable_span(minimum, maximum) {
        return Err(ConfigError::InvalidDistribution(format!(
            "uniform(minimum = {minimum}, maximum = {maximum})"
        )));
    }
    Ok(())
}

/// A per-generation value that can be retained in the training history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HistoryChannel {
    /// Gene matrix, captured before evaluation.
    Population,
    /// Row norms, captured before evaluation.
    PopulationNorms,
    /// Norm of the best individual found so far.
    BestNorm,
    /// Mean row norm.
    MeanNorm,
    /// Standard deviation of the row norms.
    StandardDeviationNorm,
    /// Best performance found so far.
    BestPerformance,
    /// Mean performance of the generation.
    MeanPerformance,
    /// Standard deviation of the generation's performance.
    StandardDeviationPerformance,
    /// Generalization performance of the best individual.
    GeneralizationPerformance,
    /// Seconds since training started.
    ElapsedTime,
}

impl HistoryChannel {
    /// All channels.
    pub const ALL: [HistoryChannel; 10] = [
        HistoryChannel::Population,
        HistoryChannel::PopulationNorms,
        HistoryChannel::BestNorm,
        HistoryChannel::MeanNorm,
        HistoryChannel::StandardDeviationNorm,
        HistoryChannel::BestPerformance,
        HistoryChannel::MeanPerformance,
        HistoryChannel::StandardDeviationPerformance,
        HistoryChannel::GeneralizationPerformance,
        HistoryChannel::ElapsedTime,
    ];

    /// Whether the channel is captured before the population is evaluated.
    pub fn is_snapshot(self) -> bool {
        matches!(
            self,
            HistoryChannel::Population | HistoryChannel::PopulationNorms
        )
    }
}

/// Set of enabled history channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryChannels(BTreeSet<HistoryChannel>);

impl HistoryChannels {
    /// No channels.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every channel.
    pub fn all() -> Self {
        HistoryChannel::ALL.into_iter().collect()
    }

    /// Builder-style insert.
    pub fn with(mut self, channel: HistoryChannel) -> Self {
        self.0.insert(channel);
        self
    }

    /// Enable a channel.
    pub fn insert(&mut self, channel: HistoryChannel) -> bool {
        self.0.insert(channel)
    }

    /// Disable a channel.
    pub fn remove(&mut self, channel: HistoryChannel) -> bool {
        self.0.remove(&channel)
    }

    pub fn contains(&self, channel: HistoryChannel) -> bool {
        self.0.contains(&channel)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = HistoryChannel> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<HistoryChannel> for HistoryChannels {
    fn from_iter<I: IntoIterator<Item = HistoryChannel>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Population size must be zero or an even number of at least 4, got {size}")]
    InvalidPopulationSize { size: usize },
    #[error("Elitism size {elitism} exceeds half of the population size {population}")]
    InvalidElitismSize { elitism: usize, population: usize },
    #[error("Selective pressure must be positive and finite, got {0}")]
    InvalidSelectivePressure(f64),
    #[error("Recombination size must be non-negative and finite, got {0}")]
    InvalidRecombinationSize(f64),
    #[error("Mutation rate must be within [0, 1], got {0}")]
    InvalidMutationRate(f64),
    #[error("Mutation range must be non-negative and finite, got {0}")]
    InvalidMutationRange(f64),
    #[error("{name} goal must be a number, got {value}")]
    InvalidGoal { name: &'static str, value: f64 },
    #[error("Maximum number of generations must be at least 1")]
    InvalidMaximumGenerations,
    #[error("Maximum time must be non-negative and finite, got {0}")]
    InvalidMaximumTime(f64),
    #[error("Display period must be at least 1")]
    InvalidDisplayPeriod,
    #[error("Expected a vector of length {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Individual index {index} out of bounds for population of {size}")]
    IndexOutOfBounds { index: usize, size: usize },
    #[error("Parameter count must be non-zero for a non-empty population")]
    ZeroDimension,
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),
    #[error("Population is empty; set a population size before training")]
    EmptyPopulation,
    #[error("Unsupported {kind} method: {value}")]
    UnsupportedPolicy { kind: &'static str, value: String },
}

/// Population sizes must be zero (cleared) or even and at least 4.
pub fn check_population_size(size: usize) -> Result<(), ConfigError> {
    if size == 0 || (size >= 4 && size % 2 == 0) {
        Ok(())
    } else {
        Err(ConfigError::InvalidPopulationSize { size })
    }
}

/// Elites may fill at most half of the population.
pub fn check_elitism_size(elitism: usize, population: usize) -> Result<(), ConfigError> {
    if elitism > population / 2 {
        return Err(ConfigError::InvalidElitismSize {
            elitism,
            population,
        });
    }
    Ok(())
}

pub fn check_selective_pressure(value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSelectivePressure(value))
    }
}

/// The blend factor is drawn from `[-value, 1 + value]`, so that span must stay finite.
pub fn check_recombination_size(value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && sampleable_span(-value, 1.0 + value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidRecombinationSize(value))
    }
}

pub fn check_mutation_rate(value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidMutationRate(value))
    }
}

/// Uniform noise is drawn from `[-value, value]`, so that span must stay finite.
pub fn check_mutation_range(value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && sampleable_span(-value, value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidMutationRange(value))
    }
}

pub fn check_goal(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_nan() {
        return Err(ConfigError::InvalidGoal { name, value });
    }
    Ok(())
}

pub fn check_maximum_generations(value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidMaximumGenerations);
    }
    Ok(())
}

pub fn check_maximum_time(value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidMaximumTime(value))
    }
}

pub fn check_display_period(value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidDisplayPeriod);
    }
    Ok(())
}

/// Whether `rand` can build a uniform float distribution over `[low, high]`.
///
/// The sampler scales by `(high - low) / (1 - EPSILON)`, which has to be finite.
fn sampleable_span(low: f64, high: f64) -> bool {
    low.is_finite() && high.is_finite() && ((high - low) / (1.0 - f64::EPSILON)).is_finite()
}

fn check_length(actual: usize, expected: usize) -> Result<(), ConfigError> {
    if actual != expected {
        return Err(ConfigError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

impl StoppingCriteria {
    /// Validate stopping thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_goal("Best performance", self.best_performance_goal)?;
        check_goal("Mean performance", self.mean_performance_goal)?;
        check_goal(
            "Standard deviation performance",
            self.standard_deviation_performance_goal,
        )?;
        check_maximum_generations(self.maximum_generations_number)?;
        check_maximum_time(self.maximum_time)
    }
}

impl GeneticAlgorithmConfig {
    /// Validate the whole configuration for individuals of `dimension` genes.
    pub fn validate(&self, dimension: usize) -> Result<(), ConfigError> {
        check_population_size(self.population_size)?;
        if self.population_size > 0 && dimension == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if self.population_size > 0 {
            check_elitism_size(self.elitism_size, self.population_size)?;
        }
        check_selective_pressure(self.selective_pressure)?;
        check_recombination_size(self.recombination_size)?;
        check_mutation_rate(self.mutation_rate)?;
        check_mutation_range(self.mutation_range)?;
        check_display_period(self.display_period)?;
        self.initialization.validate(dimension)?;
        self.stopping.validate()
    }
}
