//! evotrain CLI - Train a benchmark objective from a JSON run file.

use std::path::PathBuf;

use evotrain::{
    compute::{BenchmarkObjective, evolution::GeneticAlgorithm},
    schema::{
        BenchmarkConfig, BenchmarkFunction, GeneticAlgorithmConfig, HistoryChannel,
        HistoryChannels, RunConfig, StoppingCriteria,
    },
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <run.json>", args[0]);
        eprintln!();
        eprintln!("Train a benchmark objective with a genetic algorithm.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  run.json  Path to run configuration file");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let run = RunConfig::load_json(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading run file: {}", e);
        std::process::exit(1);
    });

    let objective = BenchmarkObjective::from_config(&run.objective);
    let mut ga = GeneticAlgorithm::new(objective, run.algorithm).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    println!("Genetic Algorithm Training");
    println!("==========================");
    println!(
        "Objective: {:?} ({} parameters)",
        run.objective.function, run.objective.dimension
    );
    println!(
        "Population: {} (elitism {})",
        ga.population_size(),
        ga.elitism_size()
    );
    println!(
        "Policies: {} / {} / {} / {}",
        ga.fitness_assignment_method(),
        ga.selection_method(),
        ga.recombination_method(),
        ga.mutation_method()
    );
    println!();

    let results = ga.train().unwrap_or_else(|e| {
        eprintln!("Training failed: {}", e);
        std::process::exit(1);
    });

    println!("{}", results.stop_reason);
    println!("  Generations: {}", results.generations_number);
    println!("  Best performance: {:.6e}", results.final_best_performance);
    println!(
        "  Mean performance: {:.6e} (std {:.6e})",
        results.final_mean_performance, results.final_standard_deviation_performance
    );
    if let Some(generalization) = results.final_generalization_performance {
        println!("  Generalization performance: {:.6e}", generalization);
    }
    println!(
        "  Mean norm: {:.6} (std {:.6}), best norm {:.6}",
        results.final_mean_norm, results.final_standard_deviation_norm, results.final_best_norm
    );
    println!("  Time: {:.2}s", results.elapsed_time);

    if let Some(output) = &run.output {
        if let Err(e) = results.save_json(output) {
            eprintln!("Error writing results: {}", e);
            std::process::exit(1);
        }
        println!();
        println!("Results written to {}", output.display());
    }
}

fn print_example_config() {
    let run = RunConfig {
        objective: BenchmarkConfig {
            function: BenchmarkFunction::Rastrigin,
            dimension: 6,
            generalization_offset: Some(0.05),
        },
        algorithm: GeneticAlgorithmConfig {
            population_size: 40,
            stopping: StoppingCriteria {
                best_performance_goal: 1.0e-3,
                maximum_generations_number: 500,
                ..Default::default()
            },
            history: HistoryChannels::none()
                .with(HistoryChannel::BestPerformance)
                .with(HistoryChannel::MeanPerformance),
            random_seed: Some(42),
            ..Default::default()
        },
        output: Some(PathBuf::from("results.json")),
    };

    println!("Example run configuration (run.json):");
    match serde_json::to_string_pretty(&run) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example: {}", e),
    }
}
