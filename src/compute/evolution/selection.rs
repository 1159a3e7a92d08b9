//! Parent selection: marks exactly half of the population as parents.

use rand::Rng;

use super::TrainingError;
use crate::schema::{ConfigError, SelectionMethod};

/// Select parents with the given policy and return the selection mask.
///
/// The mask has exactly `fitness.len() / 2` true entries.
pub fn select<R>(
    method: SelectionMethod,
    fitness: &[f64],
    elitism_size: usize,
    rng: &mut R,
) -> Result<Vec<bool>, TrainingError>
where
    R: Rng + ?Sized,
{
    match method {
        SelectionMethod::RouletteWheel => roulette_wheel(fitness, elitism_size, rng),
    }
}

/// Indices of the `count` fittest individuals; ties go to the lower index.
pub fn elite_indices(fitness: &[f64], count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..fitness.len()).collect();
    order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]).then_with(|| a.cmp(&b)));
    order.truncate(count);
    order
}

/// Roulette wheel selection with elitism.
///
/// The `elitism_size` fittest individuals are always selected. The rest of the quota is
/// filled by fitness-proportionate draws; drawing an already selected individual is retried
/// and does not count.
pub fn roulette_wheel<R>(
    fitness: &[f64],
    elitism_size: usize,
    rng: &mut R,
) -> Result<Vec<bool>, TrainingError>
where
    R: Rng + ?Sized,
{
    let n = fitness.len();
    let expected = n / 2;

    if elitism_size > expected {
        return Err(ConfigError::InvalidElitismSize {
            elitism: elitism_size,
            population: n,
        }
        .into());
    }
    if fitness.iter().any(|f| !f.is_finite() || *f < 0.0) {
        return Err(TrainingError::SelectionInvariantViolation {
            expected,
            actual: 0,
        });
    }

    let mut mask = vec![false; n];
    for index in elite_indices(fitness, elitism_size) {
        mask[index] = true;
    }
    let mut selected = elitism_size;

    if selected < expected {
        // Only individuals with positive fitness can be hit by the wheel.
        let reachable = fitness
            .iter()
            .zip(&mask)
            .filter(|&(&f, &taken)| !taken && f > 0.0)
            .count();
        if reachable < expected - selected {
            return Err(TrainingError::SelectionInvariantViolation {
                expected,
                actual: selected + reachable,
            });
        }

        let cumulative: Vec<f64> = fitness
            .iter()
            .scan(0.0, |sum, &f| {
                *sum += f;
                Some(*sum)
            })
            .collect();
        let total = cumulative[n - 1];
        if !(total / (1.0 - f64::EPSILON)).is_finite() {
            return Err(TrainingError::SelectionInvariantViolation {
                expected,
                actual: selected,
            });
        }

        while selected < expected {
            let draw = rng.gen_range(0.0..total);
            let index = cumulative.partition_point(|&c| c <= draw).min(n - 1);
            if !mask[index] {
                mask[index] = true;
                selected += 1;
            }
        }
    }

    let actual = mask.iter().filter(|&&s| s).count();
    if actual != expected {
        return Err(TrainingError::SelectionInvariantViolation { expected, actual });
    }
    Ok(mask)
}
