//! Benchmark objective and run file configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::GeneticAlgorithmConfig;

/// Analytic test function minimized by the benchmark objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BenchmarkFunction {
    /// Sum of squares. Minimum 0 at the origin.
    #[default]
    Sphere,
    /// Rosenbrock valley. Minimum 0 at `(1, ..., 1)`.
    Rosenbrock,
    /// Rastrigin function. Minimum 0 at the origin, many local minima.
    Rastrigin,
}

/// Benchmark objective definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Function to minimize.
    #[serde(default)]
    pub function: BenchmarkFunction,
    /// Number of parameters.
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// When set, generalization performance is the function evaluated at the parameters
    /// shifted by this offset.
    #[serde(default)]
    pub generalization_offset: Option<f64>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            function: BenchmarkFunction::default(),
            dimension: default_dimension(),
            generalization_offset: None,
        }
    }
}

fn default_dimension() -> usize {
    4
}

/// Run file consumed by the command-line runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunConfig {
    /// Objective to train.
    #[serde(default)]
    pub objective: BenchmarkConfig,
    /// Genetic algorithm settings.
    #[serde(default)]
    pub algorithm: GeneticAlgorithmConfig,
    /// Where to write the results document.
    #[serde(default)]
    pub output: Option<PathBuf>,
}
