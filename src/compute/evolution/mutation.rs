//! Mutation: random in-place perturbation of genes.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::schema::{ConfigError, MutationMethod, check_mutation_range, check_mutation_rate};

/// Perturb each gene with probability `rate`.
///
/// A mutated gene receives an additive `N(0, range)` sample (Normal) or a `U[-range, range]`
/// sample (Uniform). Returns the number of genes that were mutated.
pub fn mutate<R>(
    method: MutationMethod,
    genes: &mut [f64],
    rate: f64,
    range: f64,
    rng: &mut R,
) -> Result<usize, ConfigError>
where
    R: Rng + ?Sized,
{
    check_mutation_rate(rate)?;
    check_mutation_range(range)?;

    let normal = Normal::new(0.0, range)
        .map_err(|e| ConfigError::InvalidDistribution(format!("normal(0, {range}): {e}")))?;

    let mut mutated = 0;
    for gene in genes.iter_mut() {
        if rng.r#gen::<f64>() >= rate {
            continue;
        }
        *gene += match method {
            MutationMethod::Normal => normal.sample(rng),
            MutationMethod::Uniform => rng.gen_range(-range..=range),
        };
        mutated += 1;
    }
    Ok(mutated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_zero_rate_leaves_genes() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut genes = vec![1.0, 2.0, 3.0];
        let count = mutate(MutationMethod::Normal, &mut genes, 0.0, 1.0, &mut rng).unwrap();
        assert_eq!(count, 0);
        assert_eq!(genes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_full_rate_touches_every_gene() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut genes = vec![0.0; 16];
        let count = mutate(MutationMethod::Normal, &mut genes, 1.0, 1.0, &mut rng).unwrap();
        assert_eq!(count, 16);
        assert!(genes.iter().any(|&g| g != 0.0));
    }

    #[test]
    fn test_zero_range_is_identity() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut genes = vec![0.5; 8];
        mutate(MutationMethod::Uniform, &mut genes, 1.0, 0.0, &mut rng).unwrap();
        mutate(MutationMethod::Normal, &mut genes, 1.0, 0.0, &mut rng).unwrap();
        assert_eq!(genes, vec![0.5; 8]);
    }

    #[test]
    fn test_invalid_parameters() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut genes = vec![0.0; 4];
        assert_eq!(
            mutate(MutationMethod::Normal, &mut genes, 1.5, 0.1, &mut rng),
            Err(ConfigError::InvalidMutationRate(1.5))
        );
        assert_eq!(
            mutate(MutationMethod::Uniform, &mut genes, 0.5, -0.1, &mut rng),
            Err(ConfigError::InvalidMutationRange(-0.1))
        );
    }

    #[test]
    fn test_unsampleable_range_is_an_error() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut genes = vec![0.0; 4];
        assert_eq!(
            mutate(MutationMethod::Uniform, &mut genes, 1.0, 1.0e308, &mut rng),
            Err(ConfigError::InvalidMutationRange(1.0e308))
        );
        assert_eq!(genes, vec![0.0; 4]);
    }

    proptest! {
        #[test]
        fn prop_uniform_mutation_is_bounded(
            genes in prop::collection::vec(-100.0f64..100.0, 1..64),
            rate in 0.0f64..=1.0,
            range in 0.0f64..5.0,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut mutated = genes.clone();
            mutate(MutationMethod::Uniform, &mut mutated, rate, range, &mut rng).unwrap();
            for (before, after) in genes.iter().zip(&mutated) {
                prop_assert!((after - before).abs() <= range + 1e-9);
            }
        }
    }
}
