//! Generational training loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::compute::PerformanceFunctional;
use crate::compute::statistics::{mean, norm, standard_deviation};
use crate::schema::{
    ConfigError, FitnessAssignmentMethod, GenerationReport, GeneticAlgorithmConfig,
    HistoryChannel, HistoryChannels, Initialization, MutationMethod, PERFORMANCE_SENTINEL,
    PopulationSnapshot, RecombinationMethod, SelectionMethod, StopReason, StoppingCriteria,
    TrainingHistory, TrainingPhase, TrainingResults, check_display_period, check_elitism_size,
    check_goal, check_maximum_generations, check_maximum_time, check_mutation_range,
    check_mutation_rate, check_population_size, check_recombination_size,
    check_selective_pressure,
};

use super::fitness::assign_fitness;
use super::mutation::mutate;
use super::recombination::recombine;
use super::selection::select;
use super::{Population, TrainingError};

/// Genetic algorithm training the parameters of a [`PerformanceFunctional`].
pub struct GeneticAlgorithm<F> {
    functional: F,
    config: GeneticAlgorithmConfig,
    population: Population,
    rng: StdRng,
    cancelled: Arc<AtomicBool>,
    phase: TrainingPhase,
}

impl<F: PerformanceFunctional> GeneticAlgorithm<F> {
    /// Create a trainer and draw the initial population.
    pub fn new(functional: F, config: GeneticAlgorithmConfig) -> Result<Self, ConfigError> {
        let dimension = functional.parameter_count();
        config.validate(dimension)?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let population = Population::random(
            config.population_size,
            dimension,
            &config.initialization,
            &mut rng,
        )?;

        Ok(Self {
            functional,
            config,
            population,
            rng,
            cancelled: Arc::new(AtomicBool::new(false)),
            phase: TrainingPhase::Initializing,
        })
    }

    /// Get cancellation handle.
    ///
    /// Setting the flag stops a running `train` at the next generation boundary.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Current phase of the training loop.
    pub fn phase(&self) -> TrainingPhase {
        self.phase
    }

    pub fn config(&self) -> &GeneticAlgorithmConfig {
        &self.config
    }

    pub fn functional(&self) -> &F {
        &self.functional
    }

    pub fn functional_mut(&mut self) -> &mut F {
        &mut self.functional
    }

    /// Consume the trainer and return the functional with the best parameters loaded.
    pub fn into_functional(self) -> F {
        self.functional
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    // ------------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------------

    /// Replace the functional. The population is redrawn for its parameter count.
    pub fn set_functional(&mut self, functional: F) -> Result<(), ConfigError> {
        let dimension = functional.parameter_count();
        self.config.validate(dimension)?;
        self.population = Population::random(
            self.config.population_size,
            dimension,
            &self.config.initialization,
            &mut self.rng,
        )?;
        self.functional = functional;
        Ok(())
    }

    /// Resize the population and redraw it. Zero clears it.
    pub fn set_population_size(&mut self, size: usize) -> Result<(), ConfigError> {
        check_population_size(size)?;
        if size > 0 {
            check_elitism_size(self.config.elitism_size, size)?;
        }
        self.population = Population::random(
            size,
            self.functional.parameter_count(),
            &self.config.initialization,
            &mut self.rng,
        )?;
        self.config.population_size = size;
        Ok(())
    }

    /// Change the initialization distribution and redraw the population.
    pub fn set_initialization(&mut self, initialization: Initialization) -> Result<(), ConfigError> {
        let dimension = self.functional.parameter_count();
        initialization.validate(dimension)?;
        self.population.initialize(&initialization, &mut self.rng)?;
        self.config.initialization = initialization;
        Ok(())
    }

    /// Reseed the generator and redraw the population. `None` seeds from entropy.
    pub fn set_random_seed(&mut self, seed: Option<u64>) -> Result<(), ConfigError> {
        self.rng = StdRng::seed_from_u64(seed.unwrap_or_else(rand::random));
        self.config.random_seed = seed;
        self.population
            .initialize(&self.config.initialization, &mut self.rng)
    }

    pub fn set_fitness_assignment_method(&mut self, method: FitnessAssignmentMethod) {
        self.config.fitness_assignment = method;
    }

    pub fn set_selection_method(&mut self, method: SelectionMethod) {
        self.config.selection = method;
    }

    pub fn set_recombination_method(&mut self, method: RecombinationMethod) {
        self.config.recombination = method;
    }

    pub fn set_mutation_method(&mut self, method: MutationMethod) {
        self.config.mutation = method;
    }

    pub fn set_elitism_size(&mut self, elitism_size: usize) -> Result<(), ConfigError> {
        if self.config.population_size > 0 {
            check_elitism_size(elitism_size, self.config.population_size)?;
        }
        self.config.elitism_size = elitism_size;
        Ok(())
    }

    pub fn set_selective_pressure(&mut self, value: f64) -> Result<(), ConfigError> {
        check_selective_pressure(value)?;
        self.config.selective_pressure = value;
        Ok(())
    }

    pub fn set_recombination_size(&mut self, value: f64) -> Result<(), ConfigError> {
        check_recombination_size(value)?;
        self.config.recombination_size = value;
        Ok(())
    }

    pub fn set_mutation_rate(&mut self, value: f64) -> Result<(), ConfigError> {
        check_mutation_rate(value)?;
        self.config.mutation_rate = value;
        Ok(())
    }

    pub fn set_mutation_range(&mut self, value: f64) -> Result<(), ConfigError> {
        check_mutation_range(value)?;
        self.config.mutation_range = value;
        Ok(())
    }

    pub fn set_best_performance_goal(&mut self, value: f64) -> Result<(), ConfigError> {
        check_goal("Best performance", value)?;
        self.config.stopping.best_performance_goal = value;
        Ok(())
    }

    pub fn set_mean_performance_goal(&mut self, value: f64) -> Result<(), ConfigError> {
        check_goal("Mean performance", value)?;
        self.config.stopping.mean_performance_goal = value;
        Ok(())
    }

    pub fn set_standard_deviation_performance_goal(
        &mut self,
        value: f64,
    ) -> Result<(), ConfigError> {
        check_goal("Standard deviation performance", value)?;
        self.config.stopping.standard_deviation_performance_goal = value;
        Ok(())
    }

    pub fn set_maximum_generalization_performance_decreases(&mut self, value: usize) {
        self.config
            .stopping
            .maximum_generalization_performance_decreases = value;
    }

    pub fn set_maximum_generations_number(&mut self, value: usize) -> Result<(), ConfigError> {
        check_maximum_generations(value)?;
        self.config.stopping.maximum_generations_number = value;
        Ok(())
    }

    /// Wall-clock budget in seconds.
    pub fn set_maximum_time(&mut self, seconds: f64) -> Result<(), ConfigError> {
        check_maximum_time(seconds)?;
        self.config.stopping.maximum_time = seconds;
        Ok(())
    }

    /// Replace all stopping thresholds at once.
    pub fn set_stopping_criteria(&mut self, stopping: StoppingCriteria) -> Result<(), ConfigError> {
        stopping.validate()?;
        self.config.stopping = stopping;
        Ok(())
    }

    pub fn set_history_channels(&mut self, channels: HistoryChannels) {
        self.config.history = channels;
    }

    pub fn set_display_period(&mut self, period: usize) -> Result<(), ConfigError> {
        check_display_period(period)?;
        self.config.display_period = period;
        Ok(())
    }

    pub fn set_parallel_evaluation(&mut self, enabled: bool) {
        self.config.parallel_evaluation = enabled;
    }

    // ------------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------------

    pub fn population_size(&self) -> usize {
        self.config.population_size
    }

    pub fn fitness_assignment_method(&self) -> FitnessAssignmentMethod {
        self.config.fitness_assignment
    }

    pub fn selection_method(&self) -> SelectionMethod {
        self.config.selection
    }

    pub fn recombination_method(&self) -> RecombinationMethod {
        self.config.recombination
    }

    pub fn mutation_method(&self) -> MutationMethod {
        self.config.mutation
    }

    pub fn initialization(&self) -> &Initialization {
        &self.config.initialization
    }

    pub fn elitism_size(&self) -> usize {
        self.config.elitism_size
    }

    pub fn selective_pressure(&self) -> f64 {
        self.config.selective_pressure
    }

    pub fn recombination_size(&self) -> f64 {
        self.config.recombination_size
    }

    pub fn mutation_rate(&self) -> f64 {
        self.config.mutation_rate
    }

    pub fn mutation_range(&self) -> f64 {
        self.config.mutation_range
    }

    pub fn stopping_criteria(&self) -> &StoppingCriteria {
        &self.config.stopping
    }

    pub fn history_channels(&self) -> &HistoryChannels {
        &self.config.history
    }

    pub fn display_period(&self) -> usize {
        self.config.display_period
    }

    pub fn parallel_evaluation(&self) -> bool {
        self.config.parallel_evaluation
    }

    pub fn random_seed(&self) -> Option<u64> {
        self.config.random_seed
    }

    // ------------------------------------------------------------------------
    // Generation steps
    // ------------------------------------------------------------------------

    /// Score every individual with the functional.
    ///
    /// Fails with the lowest index whose performance is non-finite or outside the sentinel
    /// range.
    pub fn evaluate_population(&mut self) -> Result<(), TrainingError> {
        let functional = &self.functional;
        let dimension = self.population.dimension().max(1);
        let genes = self.population.genes();

        let performance: Vec<f64> = if self.config.parallel_evaluation {
            genes
                .par_chunks(dimension)
                .map(|row| functional.evaluate(row))
                .collect()
        } else {
            genes
                .chunks(dimension)
                .map(|row| functional.evaluate(row))
                .collect()
        };

        if let Some((index, &value)) = performance
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || v.abs() >= PERFORMANCE_SENTINEL)
        {
            return Err(TrainingError::NonFiniteScore { index, value });
        }

        self.population.set_performance(performance)?;
        Ok(())
    }

    /// Turn the current performance vector into fitness.
    pub fn perform_fitness_assignment(&mut self) -> Result<(), TrainingError> {
        let fitness = assign_fitness(
            self.config.fitness_assignment,
            self.population.performance(),
            self.config.selective_pressure,
        );
        self.population.set_fitness(fitness)?;
        Ok(())
    }

    /// Reset and redraw the selection mask from the current fitness.
    pub fn perform_selection(&mut self) -> Result<(), TrainingError> {
        self.population.reset_selection();
        let mask = select(
            self.config.selection,
            self.population.fitness(),
            self.config.elitism_size,
            &mut self.rng,
        )?;
        self.population.set_selection(mask)?;
        Ok(())
    }

    /// Replace the population with the offspring of the selected parents.
    pub fn perform_recombination(&mut self) -> Result<(), TrainingError> {
        let offspring = recombine(
            self.config.recombination,
            &self.population,
            self.config.recombination_size,
            &mut self.rng,
        )?;
        self.population.replace_genes(offspring)?;
        Ok(())
    }

    /// Mutate the population in place.
    pub fn perform_mutation(&mut self) -> Result<(), TrainingError> {
        let mutated = mutate(
            self.config.mutation,
            self.population.genes_mut(),
            self.config.mutation_rate,
            self.config.mutation_range,
            &mut self.rng,
        )?;
        debug!("Mutated {mutated} genes");
        Ok(())
    }

    /// Fitness assignment, selection, recombination and mutation.
    pub fn evolve_population(&mut self) -> Result<(), TrainingError> {
        self.perform_fitness_assignment()?;
        self.perform_selection()?;
        self.perform_recombination()?;
        self.perform_mutation()
    }

    // ------------------------------------------------------------------------
    // Training
    // ------------------------------------------------------------------------

    /// Train until a stopping condition holds (blocking).
    pub fn train(&mut self) -> Result<TrainingResults, TrainingError> {
        self.train_with_callback(|_| {})
    }

    /// Train, calling `callback` once per generation after the stopping check.
    ///
    /// A run that ends with an error leaves the phase at [`TrainingPhase::Failed`].
    pub fn train_with_callback<C>(&mut self, callback: C) -> Result<TrainingResults, TrainingError>
    where
        C: FnMut(&GenerationReport),
    {
        let result = self.run_generations(callback);
        if result.is_err() {
            self.phase = TrainingPhase::Failed;
        }
        result
    }

    fn run_generations<C>(&mut self, mut callback: C) -> Result<TrainingResults, TrainingError>
    where
        C: FnMut(&GenerationReport),
    {
        self.phase = TrainingPhase::Initializing;
        if self.population.is_empty() {
            return Err(ConfigError::EmptyPopulation.into());
        }

        let start_time = Instant::now();
        let channels = self.config.history.clone();
        let stopping = self.config.stopping.clone();
        let display_period = self.config.display_period;

        let mut history = TrainingHistory::default();
        let mut best_performance = PERFORMANCE_SENTINEL;
        let mut best_parameters = self.population.individual(0)?.to_vec();
        let mut generalization: Option<f64> = None;
        let mut generalization_failures = 0;

        info!(
            "Training {} parameters with a population of {} (max {} generations)",
            self.population.dimension(),
            self.population.size(),
            stopping.maximum_generations_number
        );

        let mut generation = 0;
        loop {
            self.phase = TrainingPhase::Evaluating;
            let mut snapshot = PopulationSnapshot {
                genes: channels
                    .contains(HistoryChannel::Population)
                    .then(|| self.population.snapshot()),
                norms: self.population.calculate_norms(),
            };
            self.evaluate_population()?;

            if let Some(index) = self.population.best_index()
                && self.population.performance()[index] < best_performance
            {
                best_performance = self.population.performance()[index];
                best_parameters = self.population.individual(index)?.to_vec();
                self.functional.set_parameters(&best_parameters);

                let current = self.functional.generalization_performance();
                if let (Some(previous), Some(value)) = (generalization, current)
                    && value > previous
                {
                    generalization_failures += 1;
                }
                generalization = current;
                debug!("Generation {generation}: new best performance {best_performance:.6e}");
            }

            let performance = self.population.performance();
            let mut report = GenerationReport {
                generation,
                best_performance,
                mean_performance: mean(performance),
                standard_deviation_performance: standard_deviation(performance),
                generalization_performance: generalization,
                best_norm: norm(&best_parameters),
                mean_norm: mean(&snapshot.norms),
                standard_deviation_norm: standard_deviation(&snapshot.norms),
                generalization_failures,
                elapsed_seconds: start_time.elapsed().as_secs_f64(),
                stop_reason: None,
            };
            debug!(
                "Generation {generation}: mean {:.6e}, std {:.6e}, mean norm {:.4}",
                report.mean_performance, report.standard_deviation_performance, report.mean_norm
            );

            self.phase = TrainingPhase::CheckingStop;
            let cancelled = self.cancelled.load(Ordering::Relaxed);
            let satisfied = satisfied_stop_conditions(&stopping, &report, cancelled);
            report.stop_reason = satisfied.first().copied();

            history.record(&channels, &mut snapshot, &report);
            callback(&report);

            if generation % display_period == 0 && report.stop_reason.is_none() {
                info!(
                    "Generation {generation}: best {:.6e}, mean {:.6e}, elapsed {:.2}s",
                    report.best_performance, report.mean_performance, report.elapsed_seconds
                );
            }

            if let Some(stop_reason) = report.stop_reason {
                self.phase = TrainingPhase::Finalizing;
                if stop_reason == StopReason::Cancelled {
                    warn!("Training cancelled at generation {generation}");
                    self.cancelled.store(false, Ordering::Relaxed);
                }
                info!(
                    "Generation {generation}: {stop_reason} Best performance {:.6e}",
                    report.best_performance
                );

                self.functional.set_parameters(&best_parameters);
                let results = TrainingResults {
                    final_mean_norm: report.mean_norm,
                    final_standard_deviation_norm: report.standard_deviation_norm,
                    final_best_norm: report.best_norm,
                    final_mean_performance: report.mean_performance,
                    final_standard_deviation_performance: report.standard_deviation_performance,
                    final_best_performance: report.best_performance,
                    final_generalization_performance: report.generalization_performance,
                    elapsed_time: start_time.elapsed().as_secs_f64(),
                    generations_number: generation,
                    stop_reason,
                    satisfied_stop_conditions: satisfied,
                    best_parameters,
                    history,
                };
                self.phase = TrainingPhase::Complete;
                return Ok(results);
            }

            self.phase = TrainingPhase::Evolving;
            self.evolve_population()?;
            generation += 1;
        }
    }
}

/// Every stopping condition that holds for `report`, in reporting priority.
pub fn satisfied_stop_conditions(
    stopping: &StoppingCriteria,
    report: &GenerationReport,
    cancelled: bool,
) -> Vec<StopReason> {
    let checks = [
        (StopReason::Cancelled, cancelled),
        (
            StopReason::PerformanceGoal,
            report.best_performance <= stopping.best_performance_goal,
        ),
        (
            StopReason::MeanPerformanceGoal,
            report.mean_performance <= stopping.mean_performance_goal,
        ),
        (
            StopReason::StandardDeviationPerformanceGoal,
            report.standard_deviation_performance <= stopping.standard_deviation_performance_goal,
        ),
        (
            StopReason::MaximumGeneralizationPerformanceDecreases,
            report.generalization_failures > stopping.maximum_generalization_performance_decreases,
        ),
        (
            StopReason::MaximumTime,
            report.elapsed_seconds >= stopping.maximum_time,
        ),
        (
            StopReason::MaximumGenerations,
            report.generation >= stopping.maximum_generations_number,
        ),
    ];
    checks
        .into_iter()
        .filter_map(|(reason, holds)| holds.then_some(reason))
        .collect()
}
