//! evotrain - Evolutionary training of model parameter vectors.
//!
//! This crate trains the parameters of a model with a genetic algorithm: a population of
//! candidate parameter vectors is ranked, selected, recombined and mutated until one of the
//! configured stopping criteria holds.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, policies, results and JSON persistence
//! - `compute`: Objectives, statistics and the genetic algorithm itself
//!
//! # Example
//!
//! ```rust,no_run
//! use evotrain::{
//!     schema::{BenchmarkFunction, GeneticAlgorithmConfig, HistoryChannel, HistoryChannels},
//!     compute::{BenchmarkObjective, evolution::GeneticAlgorithm},
//! };
//!
//! // Create configuration
//! let config = GeneticAlgorithmConfig {
//!     population_size: 40,
//!     history: HistoryChannels::none().with(HistoryChannel::BestPerformance),
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//!
//! // Train a 10-parameter sphere
//! let objective = BenchmarkObjective::new(BenchmarkFunction::Sphere, 10);
//! let mut ga = GeneticAlgorithm::new(objective, config).unwrap();
//! let results = ga.train().unwrap();
//!
//! println!("Best performance: {}", results.final_best_performance);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{GeneticAlgorithm, TrainingError};
pub use compute::{BenchmarkObjective, PerformanceFunctional};
pub use schema::{GeneticAlgorithmConfig, StopReason, TrainingResults};
