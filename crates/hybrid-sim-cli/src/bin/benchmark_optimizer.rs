use hybrid_sim_core::optimizer::{Objective, OptimizerRequest, OptimizerState, StepSize};
use hybrid_sim_core::{Engine, MemoryStore, RecordStore, SimConfig, Species};
use std::time::Instant;

fn main() {
    let population_size = 200;
    let generations = 20;
    println!(
        "Benchmarking {} generations with a population of {}",
        generations, population_size
    );

    let config = SimConfig {
        population_size,
        baseline_samples: 200,
        seed: 42,
        ..SimConfig::default()
    };
    let engine = match Engine::new(config) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("invalid config: {err}");
            return;
        }
    };
    let objective = match Objective::parse(["+Strength", "-Size"]) {
        Ok(objective) => objective,
        Err(err) => {
            eprintln!("invalid objective: {err}");
            return;
        }
    };

    // Open-ended search vs. one target species (adds producer-pair estimation)
    for species in [Vec::new(), vec![Species::Dragon]] {
        let label = if species.is_empty() { "any species" } else { "dragon only" };
        let mut store = MemoryStore::new();
        let request = OptimizerRequest::new(generations, objective.clone()).with_species(species);

        let start = Instant::now();
        let state = match OptimizerState::start(&engine, &mut store, request) {
            Ok(state) => state,
            Err(err) => {
                eprintln!("{label}: {err}");
                continue;
            }
        };
        let setup = start.elapsed();
        println!("[{label}] start (seeding, producer pairs, baselines): {:?}", setup);

        let start = Instant::now();
        let state = state.step(&engine, &mut store, StepSize::ToCompletion);
        let run = start.elapsed();
        println!("[{label}] {} generations: {:?}", state.generation(), run);
        println!(
            "[{label}] avg time per generation: {:?}",
            run / generations as u32
        );

        let births: usize = state.history().iter().map(|m| m.births).sum();
        let miscarriages: usize = state.history().iter().map(|m| m.miscarriages).sum();
        println!(
            "[{label}] {} births, {} miscarriages, {} alive",
            births,
            miscarriages,
            store.len()
        );
    }
}
