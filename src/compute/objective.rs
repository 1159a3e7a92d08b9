//! Objective interface consumed by the trainer, plus analytic benchmark objectives.

use std::f64::consts::PI;

use crate::schema::{BenchmarkConfig, BenchmarkFunction};

/// Model parameters paired with the functional that scores them.
///
/// Lower performance is better. `evaluate` is called concurrently from the evaluation pool,
/// so implementations must be `Sync` and must not rely on the parameters set through
/// `set_parameters`.
pub trait PerformanceFunctional: Sync {
    /// Number of parameters of the model (dimension of an individual).
    fn parameter_count(&self) -> usize;

    /// Performance of the model with the given parameters.
    fn evaluate(&self, parameters: &[f64]) -> f64;

    /// Load parameters into the model.
    fn set_parameters(&mut self, parameters: &[f64]);

    /// Performance of the currently loaded parameters on held-out data, if any.
    fn generalization_performance(&self) -> Option<f64> {
        None
    }
}

/// Analytic test function with a fixed dimension.
#[derive(Debug, Clone)]
pub struct BenchmarkObjective {
    function: BenchmarkFunction,
    parameters: Vec<f64>,
    generalization_offset: Option<f64>,
}

impl BenchmarkObjective {
    /// Create an objective of `dimension` parameters, all zero.
    pub fn new(function: BenchmarkFunction, dimension: usize) -> Self {
        Self {
            function,
            parameters: vec![0.0; dimension],
            generalization_offset: None,
        }
    }

    /// Create an objective from its configuration.
    pub fn from_config(config: &BenchmarkConfig) -> Self {
        Self {
            generalization_offset: config.generalization_offset,
            ..Self::new(config.function, config.dimension)
        }
    }

    /// Report generalization performance at the parameters shifted by `offset`.
    pub fn with_generalization_offset(mut self, offset: f64) -> Self {
        self.generalization_offset = Some(offset);
        self
    }

    /// Currently loaded parameters.
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    pub fn function(&self) -> BenchmarkFunction {
        self.function
    }
}

impl PerformanceFunctional for BenchmarkObjective {
    fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    fn evaluate(&self, parameters: &[f64]) -> f64 {
        benchmark_value(self.function, parameters)
    }

    /// The parameter count is fixed at construction; `parameters` must match it.
    fn set_parameters(&mut self, parameters: &[f64]) {
        debug_assert_eq!(
            parameters.len(),
            self.parameters.len(),
            "parameter vector length must match the objective dimension"
        );
        self.parameters.copy_from_slice(parameters);
    }

    fn generalization_performance(&self) -> Option<f64> {
        let offset = self.generalization_offset?;
        let shifted: Vec<f64> = self.parameters.iter().map(|p| p + offset).collect();
        Some(benchmark_value(self.function, &shifted))
    }
}

/// Value of a benchmark function at `x`.
pub fn benchmark_value(function: BenchmarkFunction, x: &[f64]) -> f64 {
    match function {
        BenchmarkFunction::Sphere => x.iter().map(|v| v * v).sum(),
        BenchmarkFunction::Rosenbrock => x
            .windows(2)
            .map(|w| {
                let a = w[1] - w[0] * w[0];
                let b = 1.0 - w[0];
                100.0 * a * a + b * b
            })
            .sum(),
        BenchmarkFunction::Rastrigin => {
            10.0 * x.len() as f64
                + x.iter()
                    .map(|v| v * v - 10.0 * (2.0 * PI * v).cos())
                    .sum::<f64>()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minima() {
        assert_eq!(benchmark_value(BenchmarkFunction::Sphere, &[0.0; 5]), 0.0);
        assert_eq!(benchmark_value(BenchmarkFunction::Rosenbrock, &[1.0; 5]), 0.0);
        assert!(benchmark_value(BenchmarkFunction::Rastrigin, &[0.0; 5]).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_value() {
        assert!((benchmark_value(BenchmarkFunction::Sphere, &[1.0, 2.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_generalization_uses_loaded_parameters() {
        let mut objective =
            BenchmarkObjective::new(BenchmarkFunction::Sphere, 2).with_generalization_offset(1.0);
        objective.set_parameters(&[1.0, -1.0]);
        // (1 + 1)^2 + (-1 + 1)^2
        assert_eq!(objective.generalization_performance(), Some(4.0));
        assert_eq!(objective.parameters(), &[1.0, -1.0]);
    }

    #[test]
    #[should_panic]
    fn test_set_parameters_keeps_dimension() {
        let mut objective = BenchmarkObjective::new(BenchmarkFunction::Sphere, 3);
        objective.set_parameters(&[1.0, 2.0, 3.0]);
        assert_eq!(objective.parameter_count(), 3);
        objective.set_parameters(&[1.0, 2.0]);
    }

    #[test]
    fn test_no_generalization_by_default() {
        let objective = BenchmarkObjective::new(BenchmarkFunction::Rastrigin, 3);
        assert_eq!(objective.parameter_count(), 3);
        assert_eq!(objective.generalization_performance(), None);
    }
}
