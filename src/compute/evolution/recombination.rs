//! Recombination: selected parents produce the next generation.

use rand::Rng;

use super::{Population, TrainingError};
use crate::schema::{RecombinationMethod, check_recombination_size};

/// Produce a full generation of offspring from the selected parents.
///
/// Every selected individual, in population order, acts as first parent for exactly two
/// offspring. The second parent is drawn uniformly from the selected set, excluding the first
/// parent. Returns the offspring gene buffer, row-major, in the population's shape.
pub fn recombine<R>(
    method: RecombinationMethod,
    population: &Population,
    recombination_size: f64,
    rng: &mut R,
) -> Result<Vec<f64>, TrainingError>
where
    R: Rng + ?Sized,
{
    check_recombination_size(recombination_size)?;

    let size = population.size();
    let parents: Vec<usize> = population
        .selection()
        .iter()
        .enumerate()
        .filter_map(|(i, &s)| s.then_some(i))
        .collect();

    // Two offspring per parent must refill the population exactly.
    if parents.len() * 2 != size || parents.len() == 1 {
        return Err(TrainingError::RecombinationInvariantViolation {
            expected: size,
            actual: parents.len() * 2,
        });
    }

    let dimension = population.dimension();
    let mut offspring = Vec::with_capacity(size * dimension);

    for &first in &parents {
        let p1 = population.individual(first)?;
        for _ in 0..2 {
            let second = loop {
                let candidate = parents[rng.gen_range(0..parents.len())];
                if candidate != first {
                    break candidate;
                }
            };
            let p2 = population.individual(second)?;
            match method {
                RecombinationMethod::Intermediate => {
                    intermediate(p1, p2, recombination_size, rng, &mut offspring)
                }
                RecombinationMethod::Line => line(p1, p2, recombination_size, rng, &mut offspring),
            }
        }
    }

    let produced = offspring.len() / dimension.max(1);
    if produced != size {
        return Err(TrainingError::RecombinationInvariantViolation {
            expected: size,
            actual: produced,
        });
    }
    Ok(offspring)
}

/// One child with an independent blend factor per gene.
fn intermediate<R>(p1: &[f64], p2: &[f64], size: f64, rng: &mut R, out: &mut Vec<f64>)
where
    R: Rng + ?Sized,
{
    out.extend(p1.iter().zip(p2).map(|(&a, &b)| {
        let alpha = rng.gen_range(-size..=1.0 + size);
        alpha * a + (1.0 - alpha) * b
    }));
}

/// One child on the line through both parents.
fn line<R>(p1: &[f64], p2: &[f64], size: f64, rng: &mut R, out: &mut Vec<f64>)
where
    R: Rng + ?Sized,
{
    let alpha = rng.gen_range(-size..=1.0 + size);
    out.extend(
        p1.iter()
            .zip(p2)
            .map(|(&a, &b)| alpha * a + (1.0 - alpha) * b),
    );
}
