//! Benchmarks for one genetic algorithm generation.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use evotrain::{
    compute::{BenchmarkObjective, evolution::GeneticAlgorithm},
    schema::{BenchmarkFunction, GeneticAlgorithmConfig, RecombinationMethod},
};

fn trainer(
    population_size: usize,
    dimension: usize,
    parallel_evaluation: bool,
) -> GeneticAlgorithm<BenchmarkObjective> {
    let config = GeneticAlgorithmConfig {
        population_size,
        parallel_evaluation,
        random_seed: Some(42),
        ..Default::default()
    };
    let objective = BenchmarkObjective::new(BenchmarkFunction::Rastrigin, dimension);
    GeneticAlgorithm::new(objective, config).unwrap()
}

fn bench_generation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation_step");

    for size in [20, 100, 500, 2000] {
        let mut ga = trainer(size, 64, true);
        ga.evaluate_population().unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                black_box(&mut ga).evolve_population().unwrap();
                ga.evaluate_population().unwrap();
            });
        });
    }

    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");

    for parallel in [false, true] {
        let mut ga = trainer(1000, 256, parallel);
        let label = if parallel { "parallel" } else { "sequential" };

        group.bench_with_input(BenchmarkId::from_parameter(label), &parallel, |b, _| {
            b.iter(|| {
                black_box(&mut ga).evaluate_population().unwrap();
            });
        });
    }

    group.finish();
}

fn bench_recombination(c: &mut Criterion) {
    let mut group = c.benchmark_group("recombination");

    for method in [RecombinationMethod::Line, RecombinationMethod::Intermediate] {
        let mut ga = trainer(500, 64, true);
        ga.set_recombination_method(method);
        ga.evaluate_population().unwrap();
        ga.perform_fitness_assignment().unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(method), &method, |b, _| {
            b.iter(|| {
                ga.perform_selection().unwrap();
                black_box(&mut ga).perform_recombination().unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_generation_step,
    bench_evaluation,
    bench_recombination
);
criterion_main!(benches);
