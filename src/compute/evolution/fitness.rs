//! Fitness assignment: turns raw performance (lower is better) into selection fitness.

use crate::schema::FitnessAssignmentMethod;

/// Compute fitness for every individual with the given policy.
pub fn assign_fitness(
    method: FitnessAssignmentMethod,
    performance: &[f64],
    selective_pressure: f64,
) -> Vec<f64> {
    match method {
        FitnessAssignmentMethod::LinearRanking => linear_ranking(performance, selective_pressure),
    }
}

/// Linear ranking.
///
/// The worst individual (highest performance) gets rank 1 and the best gets rank `n`;
/// `fitness = selective_pressure * rank`. Among equal performances the lower index ranks
/// higher, so the result is fully deterministic.
pub fn linear_ranking(performance: &[f64], selective_pressure: f64) -> Vec<f64> {
    let ranks = ascending_ranks(performance);
    ranks
        .into_iter()
        .map(|rank| selective_pressure * rank as f64)
        .collect()
}

/// Rank of every individual, 1 for the worst up to `n` for the best.
pub fn ascending_ranks(performance: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..performance.len()).collect();
    // Worst first; on ties the higher index comes first so the lower index ends up ranked higher.
    order.sort_by(|&a, &b| {
        performance[b]
            .total_cmp(&performance[a])
            .then_with(|| b.cmp(&a))
    });

    let mut ranks = vec![0; performance.len()];
    for (position, &index) in order.iter().enumerate() {
        ranks[index] = position + 1;
    }
    ranks
}
