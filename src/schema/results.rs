//! Progress, history and result types produced by a training run.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{HistoryChannel, HistoryChannels};

/// Reason training stopped.
///
/// Variants are declared in reporting priority: when several conditions hold in the same
/// generation, the first one listed here is the reported reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StopReason {
    /// A stop was requested through the cancel handle.
    Cancelled,
    /// Best performance ever reached the goal.
    PerformanceGoal,
    /// Mean performance reached the goal.
    MeanPerformanceGoal,
    /// Performance standard deviation reached the goal.
    StandardDeviationPerformanceGoal,
    /// Generalization performance got worse too many times.
    MaximumGeneralizationPerformanceDecreases,
    /// Wall-clock budget exhausted.
    MaximumTime,
    /// Generation budget exhausted.
    MaximumGenerations,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            StopReason::Cancelled => "Training cancelled.",
            StopReason::PerformanceGoal => "Performance goal reached.",
            StopReason::MeanPerformanceGoal => "Mean performance goal reached.",
            StopReason::StandardDeviationPerformanceGoal => {
                "Standard deviation of performance goal reached."
            }
            StopReason::MaximumGeneralizationPerformanceDecreases => {
                "Maximum generalization performance decreases reached."
            }
            StopReason::MaximumTime => "Maximum training time reached.",
            StopReason::MaximumGenerations => "Maximum number of generations reached.",
        };
        f.write_str(message)
    }
}

/// Current phase of the training loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TrainingPhase {
    /// Not yet started, or preparing a run.
    #[default]
    Initializing,
    /// Scoring the population.
    Evaluating,
    /// Checking the stopping conditions.
    CheckingStop,
    /// Running fitness assignment, selection, recombination and mutation.
    Evolving,
    /// Building the results record.
    Finalizing,
    /// The last run finished.
    Complete,
    /// The last run ended with an error.
    Failed,
}

/// Statistics of one evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generation index, starting at 0.
    pub generation: usize,
    /// Best performance found so far.
    pub best_performance: f64,
    /// Mean performance of this generation.
    pub mean_performance: f64,
    /// Standard deviation of this generation's performance.
    pub standard_deviation_performance: f64,
    /// Generalization performance of the best individual, if the objective provides one.
    pub generalization_performance: Option<f64>,
    /// Norm of the best individual found so far.
    pub best_norm: f64,
    /// Mean individual norm.
    pub mean_norm: f64,
    /// Standard deviation of individual norms.
    pub standard_deviation_norm: f64,
    /// Times the generalization performance got worse.
    pub generalization_failures: usize,
    /// Seconds since training started.
    pub elapsed_seconds: f64,
    /// Set when this generation ends the run.
    pub stop_reason: Option<StopReason>,
}

/// Population data captured before evaluation.
#[derive(Debug, Clone, Default)]
pub struct PopulationSnapshot {
    /// Gene matrix, only captured when the population channel is enabled.
    pub genes: Option<Vec<Vec<f64>>>,
    /// Row norms.
    pub norms: Vec<f64>,
}

/// Per-generation history, one vector per channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub population: Vec<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub population_norms: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub best_norm: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mean_norm: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub standard_deviation_norm: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub best_performance: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mean_performance: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub standard_deviation_performance: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generalization_performance: Vec<Option<f64>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elapsed_time: Vec<f64>,
}

impl TrainingHistory {
    /// Append this generation's value for every enabled channel.
    pub fn record(
        &mut self,
        channels: &HistoryChannels,
        snapshot: &mut PopulationSnapshot,
        report: &GenerationReport,
    ) {
        for channel in channels.iter() {
            match channel {
                HistoryChannel::Population => {
                    if let Some(genes) = snapshot.genes.take() {
                        self.population.push(genes);
                    }
                }
                HistoryChannel::PopulationNorms => {
                    self.population_norms.push(snapshot.norms.clone());
                }
                HistoryChannel::BestNorm => self.best_norm.push(report.best_norm),
                HistoryChannel::MeanNorm => self.mean_norm.push(report.mean_norm),
                HistoryChannel::StandardDeviationNorm => {
                    self.standard_deviation_norm
                        .push(report.standard_deviation_norm);
                }
                HistoryChannel::BestPerformance => {
                    self.best_performance.push(report.best_performance);
                }
                HistoryChannel::MeanPerformance => {
                    self.mean_performance.push(report.mean_performance);
                }
                HistoryChannel::StandardDeviationPerformance => {
                    self.standard_deviation_performance
                        .push(report.standard_deviation_performance);
                }
                HistoryChannel::GeneralizationPerformance => {
                    self.generalization_performance
                        .push(report.generalization_performance);
                }
                HistoryChannel::ElapsedTime => self.elapsed_time.push(report.elapsed_seconds),
            }
        }
    }
}

/// Final result of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResults {
    /// Mean individual norm of the final population.
    pub final_mean_norm: f64,
    /// Standard deviation of individual norms of the final population.
    pub final_standard_deviation_norm: f64,
    /// Norm of the best individual found.
    pub final_best_norm: f64,
    /// Mean performance of the final population.
    pub final_mean_performance: f64,
    /// Standard deviation of performance of the final population.
    pub final_standard_deviation_performance: f64,
    /// Best performance found during the run.
    pub final_best_performance: f64,
    /// Generalization performance of the best individual.
    pub final_generalization_performance: Option<f64>,
    /// Time taken (in seconds).
    pub elapsed_time: f64,
    /// Generation at which training stopped.
    pub generations_number: usize,
    /// Reported reason for stopping.
    pub stop_reason: StopReason,
    /// Every stopping condition that held in the final generation, in priority order.
    pub satisfied_stop_conditions: Vec<StopReason>,
    /// Parameters of the best individual found.
    pub best_parameters: Vec<f64>,
    /// Retained per-generation history.
    pub history: TrainingHistory,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(generation: usize) -> GenerationReport {
        GenerationReport {
            generation,
            best_performance: 1.0,
            mean_performance: 2.0,
            standard_deviation_performance: 0.5,
            generalization_performance: None,
            best_norm: 3.0,
            mean_norm: 4.0,
            standard_deviation_norm: 0.25,
            generalization_failures: 0,
            elapsed_seconds: 0.1,
            stop_reason: None,
        }
    }

    #[test]
    fn test_record_only_enabled_channels() {
        let channels = HistoryChannels::none()
            .with(HistoryChannel::MeanPerformance)
            .with(HistoryChannel::Population);
        let mut history = TrainingHistory::default();

        for generation in 0..3 {
            let mut snapshot = PopulationSnapshot {
                genes: Some(vec![vec![1.0, 2.0]; 4]),
                norms: vec![1.0; 4],
            };
            history.record(&channels, &mut snapshot, &report(generation));
        }

        assert_eq!(history.mean_performance, vec![2.0; 3]);
        assert_eq!(history.population.len(), 3);
        assert!(history.best_performance.is_empty());
        assert!(history.population_norms.is_empty());
    }

    #[test]
    fn test_stop_reason_priority_order() {
        let mut reasons = vec![
            StopReason::MaximumGenerations,
            StopReason::StandardDeviationPerformanceGoal,
            StopReason::PerformanceGoal,
        ];
        reasons.sort();
        assert_eq!(reasons[0], StopReason::PerformanceGoal);
        assert_eq!(
            StopReason::MaximumGenerations.to_string(),
            "Maximum number of generations reached."
        );
    }

    #[test]
    fn test_generalization_history_serializes_missing_values() {
        let channels = HistoryChannels::none().with(HistoryChannel::GeneralizationPerformance);
        let mut history = TrainingHistory::default();
        history.record(&channels, &mut PopulationSnapshot::default(), &report(0));

        let json = serde_json::to_string(&history).unwrap();
        let parsed: TrainingHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.generalization_performance, vec![None]);
    }
}
