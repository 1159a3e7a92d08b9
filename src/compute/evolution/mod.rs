//! Genetic algorithm for training model parameter vectors.
//!
//! A population of candidate parameter vectors is scored by a [`PerformanceFunctional`]
//! (lower is better) and improved generation by generation.
//!
//! # Overview
//!
//! - **Population** (`population`): gene matrix plus performance, fitness and selection vectors
//! - **Fitness Assignment** (`fitness`): performance to fitness by linear ranking
//! - **Selection** (`selection`): roulette wheel with elitism, always half of the population
//! - **Recombination** (`recombination`): line and intermediate crossover
//! - **Mutation** (`mutation`): normal and uniform perturbation
//! - **Training** (`training`): the generational loop with stopping criteria and history
//!
//! # Example
//!
//! ```rust,no_run
//! use evotrain::compute::BenchmarkObjective;
//! use evotrain::compute::evolution::GeneticAlgorithm;
//! use evotrain::schema::{BenchmarkFunction, GeneticAlgorithmConfig};
//!
//! let objective = BenchmarkObjective::new(BenchmarkFunction::Rastrigin, 8);
//! let mut ga = GeneticAlgorithm::new(objective, GeneticAlgorithmConfig::default()).unwrap();
//!
//! let results = ga
//!     .train_with_callback(|report| {
//!         println!("Generation {}: best performance = {:.4}",
//!             report.generation, report.best_performance);
//!     })
//!     .unwrap();
//!
//! println!("{} after {} generations", results.stop_reason, results.generations_number);
//! ```
//!
//! [`PerformanceFunctional`]: crate::compute::PerformanceFunctional

mod error;
mod fitness;
mod mutation;
mod population;
mod recombination;
mod selection;
mod training;

pub use error::TrainingError;
pub use fitness::{ascending_ranks, assign_fitness, linear_ranking};
pub use mutation::mutate;
pub use population::Population;
pub use recombination::recombine;
pub use selection::{elite_indices, roulette_wheel, select};
pub use training::{GeneticAlgorithm, satisfied_stop_conditions};
