//! Population store: the gene matrix and its per-individual score vectors.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::compute::statistics::norm;
use crate::schema::{ConfigError, Initialization, check_population_size};

/// Individuals of one generation plus their parallel performance, fitness and selection
/// vectors.
///
/// Genes are stored row-major in one contiguous buffer: individual `i` occupies
/// `genes[i * dimension..(i + 1) * dimension]`. All row access goes through bounds-checked
/// accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    size: usize,
    dimension: usize,
    genes: Vec<f64>,
    performance: Vec<f64>,
    fitness: Vec<f64>,
    selection: Vec<bool>,
}

impl Population {
    /// An empty population for individuals of `dimension` genes.
    pub fn empty(dimension: usize) -> Self {
        Self {
            size: 0,
            dimension,
            genes: Vec::new(),
            performance: Vec::new(),
            fitness: Vec::new(),
            selection: Vec::new(),
        }
    }

    /// A population of `size` all-zero individuals.
    pub fn zeros(size: usize, dimension: usize) -> Result<Self, ConfigError> {
        check_population_size(size)?;
        if size > 0 && dimension == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        Ok(Self {
            size,
            dimension,
            genes: vec![0.0; size * dimension],
            performance: vec![0.0; size],
            fitness: vec![0.0; size],
            selection: vec![false; size],
        })
    }

    /// A population of `size` individuals drawn from `initialization`.
    pub fn random<R>(
        size: usize,
        dimension: usize,
        initialization: &Initialization,
        rng: &mut R,
    ) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
    {
        let mut population = Self::zeros(size, dimension)?;
        population.initialize(initialization, rng)?;
        Ok(population)
    }

    /// Build a population from explicit rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, ConfigError> {
        let dimension = rows.first().map_or(0, Vec::len);
        let mut population = Self::zeros(rows.len(), dimension)?;
        for (i, row) in rows.iter().enumerate() {
            population.set_individual(i, row)?;
        }
        Ok(population)
    }

    /// Number of individuals.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of genes per individual.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Genes of individual `index`.
    pub fn individual(&self, index: usize) -> Result<&[f64], ConfigError> {
        let range = self.row_range(index)?;
        Ok(&self.genes[range])
    }

    /// Overwrite the genes of individual `index`.
    pub fn set_individual(&mut self, index: usize, values: &[f64]) -> Result<(), ConfigError> {
        if values.len() != self.dimension {
            return Err(ConfigError::DimensionMismatch {
                expected: self.dimension,
                actual: values.len(),
            });
        }
        let range = self.row_range(index)?;
        self.genes[range].copy_from_slice(values);
        Ok(())
    }

    fn row_range(&self, index: usize) -> Result<std::ops::Range<usize>, ConfigError> {
        if index >= self.size {
            return Err(ConfigError::IndexOutOfBounds {
                index,
                size: self.size,
            });
        }
        let start = index * self.dimension;
        Ok(start..start + self.dimension)
    }

    /// Iterate over individuals in population order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> {
        self.genes.chunks_exact(self.dimension.max(1))
    }

    /// Whole gene buffer, row-major.
    pub fn genes(&self) -> &[f64] {
        &self.genes
    }

    pub fn genes_mut(&mut self) -> &mut [f64] {
        &mut self.genes
    }

    /// Replace the whole gene buffer with a new generation of the same shape.
    pub fn replace_genes(&mut self, genes: Vec<f64>) -> Result<(), ConfigError> {
        if genes.len() != self.genes.len() {
            return Err(ConfigError::DimensionMismatch {
                expected: self.genes.len(),
                actual: genes.len(),
            });
        }
        self.genes = genes;
        Ok(())
    }

    /// Copy of the gene matrix as one vector per individual.
    pub fn snapshot(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    /// Euclidean norm of every individual.
    pub fn calculate_norms(&self) -> Vec<f64> {
        self.rows().map(norm).collect()
    }

    pub fn performance(&self) -> &[f64] {
        &self.performance
    }

    pub fn set_performance(&mut self, values: Vec<f64>) -> Result<(), ConfigError> {
        check_vector_length(values.len(), self.size)?;
        self.performance = values;
        Ok(())
    }

    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    pub fn set_fitness(&mut self, values: Vec<f64>) -> Result<(), ConfigError> {
        check_vector_length(values.len(), self.size)?;
        self.fitness = values;
        Ok(())
    }

    pub fn selection(&self) -> &[bool] {
        &self.selection
    }

    pub fn set_selection(&mut self, mask: Vec<bool>) -> Result<(), ConfigError> {
        check_vector_length(mask.len(), self.size)?;
        self.selection = mask;
        Ok(())
    }

    /// Mark every individual as unselected.
    pub fn reset_selection(&mut self) {
        self.selection.fill(false);
    }

    /// Number of individuals marked as parents.
    pub fn selected_count(&self) -> usize {
        self.selection.iter().filter(|&&s| s).count()
    }

    /// Index of the individual with the lowest performance (first one on ties).
    pub fn best_index(&self) -> Option<usize> {
        self.performance
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &p)| match best {
                Some((_, b)) if b <= p => best,
                _ => Some((i, p)),
            })
            .map(|(i, _)| i)
    }

    // ------------------------------------------------------------------------
    // Random initialization
    // ------------------------------------------------------------------------

    /// Redraw every gene from `initialization`.
    pub fn initialize<R>(
        &mut self,
        initialization: &Initialization,
        rng: &mut R,
    ) -> Result<(), ConfigError>
    where
        R: Rng + ?Sized,
    {
        match initialization {
            Initialization::Normal {
                mean,
                standard_deviation,
            } => self.initialize_normal(*mean, *standard_deviation, rng),
            Initialization::Uniform { minimum, maximum } => {
                self.initialize_uniform(*minimum, *maximum, rng)
            }
            Initialization::NormalPerGene {
                mean,
                standard_deviation,
            } => self.initialize_normal_per_gene(mean, standard_deviation, rng),
            Initialization::UniformPerGene { minimum, maximum } => {
                self.initialize_uniform_per_gene(minimum, maximum, rng)
            }
        }
    }

    /// Every gene from `U[minimum, maximum]`.
    pub fn initialize_uniform<R>(
        &mut self,
        minimum: f64,
        maximum: f64,
        rng: &mut R,
    ) -> Result<(), ConfigError>
    where
        R: Rng + ?Sized,
    {
        Initialization::Uniform { minimum, maximum }.validate(self.dimension)?;
        for gene in &mut self.genes {
            *gene = rng.gen_range(minimum..=maximum);
        }
        Ok(())
    }

    /// Every gene from `N(mean, standard_deviation)`.
    pub fn initialize_normal<R>(
        &mut self,
        mean: f64,
        standard_deviation: f64,
        rng: &mut R,
    ) -> Result<(), ConfigError>
    where
        R: Rng + ?Sized,
    {
        let normal = normal(mean, standard_deviation)?;
        for gene in &mut self.genes {
            *gene = normal.sample(rng);
        }
        Ok(())
    }

    /// Gene `j` of every individual from `U[minimum[j], maximum[j]]`.
    pub fn initialize_uniform_per_gene<R>(
        &mut self,
        minimum: &[f64],
        maximum: &[f64],
        rng: &mut R,
    ) -> Result<(), ConfigError>
    where
        R: Rng + ?Sized,
    {
        Initialization::UniformPerGene {
            minimum: minimum.to_vec(),
            maximum: maximum.to_vec(),
        }
        .validate(self.dimension)?;

        let dimension = self.dimension.max(1);
        for row in self.genes.chunks_exact_mut(dimension) {
            for ((gene, &lo), &hi) in row.iter_mut().zip(minimum).zip(maximum) {
                *gene = rng.gen_range(lo..=hi);
            }
        }
        Ok(())
    }

    /// Gene `j` of every individual from `N(mean[j], standard_deviation[j])`.
    pub fn initialize_normal_per_gene<R>(
        &mut self,
        mean: &[f64],
        standard_deviation: &[f64],
        rng: &mut R,
    ) -> Result<(), ConfigError>
    where
        R: Rng + ?Sized,
    {
        if mean.len() != self.dimension || standard_deviation.len() != self.dimension {
            return Err(ConfigError::DimensionMismatch {
                expected: self.dimension,
                actual: if mean.len() != self.dimension {
                    mean.len()
                } else {
                    standard_deviation.len()
                },
            });
        }
        let distributions = mean
            .iter()
            .zip(standard_deviation)
            .map(|(&m, &s)| normal(m, s))
            .collect::<Result<Vec<_>, _>>()?;

        let dimension = self.dimension.max(1);
        for row in self.genes.chunks_exact_mut(dimension) {
            for (gene, distribution) in row.iter_mut().zip(&distributions) {
                *gene = distribution.sample(rng);
            }
        }
        Ok(())
    }
}

fn normal(mean: f64, standard_deviation: f64) -> Result<Normal<f64>, ConfigError> {
    if !mean.is_finite() || !standard_deviation.is_finite() {
        return Err(ConfigError::InvalidDistribution(format!(
            "normal(mean = {mean}, standard deviation = {standard_deviation})"
        )));
    }
    Normal::new(mean, standard_deviation).map_err(|e| {
        ConfigError::InvalidDistribution(format!(
            "normal(mean = {mean}, standard deviation = {standard_deviation}): {e}"
        ))
    })
}

fn check_vector_length(actual: usize, expected: usize) -> Result<(), ConfigError> {
    if actual != expected {
        return Err(ConfigError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_rejects_odd_and_small_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        for size in [3, 5] {
            let err = Population::random(size, 3, &Initialization::default(), &mut rng);
            assert_eq!(err, Err(ConfigError::InvalidPopulationSize { size }));
        }
    }

    #[test]
    fn test_zero_size_is_empty() {
        let population = Population::zeros(0, 5).unwrap();
        assert!(population.is_empty());
        assert!(population.performance().is_empty());
        assert!(population.fitness().is_empty());
        assert!(population.selection().is_empty());
        assert_eq!(population.rows().count(), 0);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert_eq!(Population::zeros(4, 0), Err(ConfigError::ZeroDimension));
    }

    #[test]
    fn test_individual_access_is_bounds_checked() {
        let mut population = Population::zeros(4, 2).unwrap();
        population.set_individual(3, &[1.0, 2.0]).unwrap();
        assert_eq!(population.individual(3).unwrap(), &[1.0, 2.0]);
        assert_eq!(
            population.individual(4),
            Err(ConfigError::IndexOutOfBounds { index: 4, size: 4 })
        );
        assert_eq!(
            population.set_individual(0, &[1.0]),
            Err(ConfigError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_norms() {
        let population = Population::from_rows(&[
            vec![3.0, 4.0],
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, -2.0],
        ])
        .unwrap();
        assert_eq!(population.calculate_norms(), vec![5.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_uniform_initialization_within_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut population = Population::zeros(10, 6).unwrap();
        population.initialize_uniform(-0.5, 2.0, &mut rng).unwrap();
        assert!(population.genes().iter().all(|g| (-0.5..=2.0).contains(g)));
    }

    #[test]
    fn test_per_gene_uniform_initialization() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut population = Population::zeros(8, 3).unwrap();
        population
            .initialize_uniform_per_gene(&[0.0, 10.0, -1.0], &[1.0, 11.0, -1.0], &mut rng)
            .unwrap();
        for row in population.rows() {
            assert!((0.0..=1.0).contains(&row[0]));
            assert!((10.0..=11.0).contains(&row[1]));
            assert_eq!(row[2], -1.0);
        }
    }

    #[test]
    fn test_per_gene_length_mismatch() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut population = Population::zeros(4, 3).unwrap();
        assert_eq!(
            population.initialize_normal_per_gene(&[0.0; 2], &[1.0; 3], &mut rng),
            Err(ConfigError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert!(
            population
                .initialize_uniform_per_gene(&[0.0; 3], &[1.0; 4], &mut rng)
                .is_err()
        );
    }

    #[test]
    fn test_best_index_prefers_lower_index_on_ties() {
        let mut population = Population::zeros(4, 1).unwrap();
        population.set_performance(vec![3.0, 1.0, 1.0, 2.0]).unwrap();
        assert_eq!(population.best_index(), Some(1));
        assert_eq!(Population::empty(3).best_index(), None);
    }

    #[test]
    fn test_replace_genes_checks_shape() {
        let mut population = Population::zeros(4, 2).unwrap();
        assert!(population.replace_genes(vec![1.0; 8]).is_ok());
        assert!(population.replace_genes(vec![1.0; 6]).is_err());
    }

    proptest! {
        #[test]
        fn prop_population_shape(half in 2usize..40, dimension in 1usize..12, seed in any::<u64>()) {
            let size = half * 2;
            let mut rng = StdRng::seed_from_u64(seed);
            let population =
                Population::random(size, dimension, &Initialization::default(), &mut rng).unwrap();
            prop_assert_eq!(population.size(), size);
            prop_assert_eq!(population.rows().count(), size);
            prop_assert!(population.rows().all(|row| row.len() == dimension));
            prop_assert_eq!(population.performance().len(), size);
            prop_assert_eq!(population.fitness().len(), size);
            prop_assert_eq!(population.selection().len(), size);
        }
    }
}
