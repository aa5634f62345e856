//! Command implementations shared by one-shot invocations and the shell.

use crate::render;
use crate::store::FileStore;
use anyhow::{bail, Context};
use clap::{Args, Subcommand};
use hybrid_sim_core::optimizer::{
    Comparison, Condition, Objective, OptimizerRequest, OptimizerSession, StepOutcome, StepSize,
};
use hybrid_sim_core::{check_condition, Engine, MemoryStore, RecordStore, Species, StatKey, Variant};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::collections::BTreeMap;

#[derive(Debug, Subcommand)]
pub enum Action {
    /// List known species, then saved individuals
    List,
    /// Derive a random individual from the catalog
    Random {
        #[arg(long)]
        save: bool,
    },
    /// Breed two species or saved individuals
    Breed {
        first: String,
        second: String,
        #[arg(long)]
        save: bool,
    },
    /// Count species over N random catalog draws
    Simulate { draws: usize },
    /// Print a saved individual
    Show { name: String },
    /// Run the optimizer to completion
    Optimize {
        #[command(flatten)]
        params: OptimizeArgs,
        /// Save the best individual into the store
        #[arg(long)]
        save_best: bool,
    },
    /// Test a condition: `variant giant`, `species dragon`, `strength >= 300`
    Check {
        /// Evaluate against the running optimizer population
        #[arg(long)]
        population: bool,
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        condition: Vec<String>,
    },
}

#[derive(Debug, Args)]
pub struct OptimizeArgs {
    #[arg(short, long)]
    pub generations: usize,
    /// Objective terms such as `+Strength` or `-Size`, comma separated or repeated
    #[arg(short, long, required = true, allow_hyphen_values = true)]
    pub objective: Vec<String>,
    /// Restrict the search to these species
    #[arg(short, long, value_delimiter = ',')]
    pub species: Vec<String>,
    #[arg(long)]
    pub chunk: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
}

impl OptimizeArgs {
    fn request(&self) -> anyhow::Result<OptimizerRequest> {
        let objective = Objective::parse(self.objective.iter().map(String::as_str))?;
        let species = self
            .species
            .iter()
            .map(|s| s.parse::<Species>())
            .collect::<Result<Vec<_>, _>>()?;
        let mut request = OptimizerRequest::new(self.generations, objective).with_species(species);
        if let Some(chunk) = self.chunk {
            request = request.with_chunk_size(chunk);
        }
        if let Some(seed) = self.seed {
            request = request.with_seed(seed);
        }
        Ok(request)
    }
}

#[derive(Debug, Subcommand)]
pub enum OptAction {
    /// Open a session and seed its population
    Start(OptimizeArgs),
    /// Advance by the chunk size, or by N generations
    Step { generations: Option<usize> },
    Status,
    /// Drop the session, keeping its population for `check --population`
    Stop,
    Finalize,
}

/// Everything a command can touch: the engine, saved individuals, the
/// optimizer population and its session.
pub struct App {
    engine: Engine,
    store: FileStore,
    population: MemoryStore,
    session: OptimizerSession,
    rng: ChaCha12Rng,
}

impl App {
    pub fn new(engine: Engine, store: FileStore) -> Self {
        let rng = ChaCha12Rng::seed_from_u64(engine.config().seed);
        Self {
            engine,
            store,
            population: MemoryStore::new(),
            session: OptimizerSession::new(),
            rng,
        }
    }

    pub fn save(&mut self) -> anyhow::Result<()> {
        self.store.save()
    }

    pub fn run(&mut self, action: Action) -> anyhow::Result<String> {
        match action {
            Action::List => {
                let mut out = render::species_catalog(self.engine.catalog());
                out.push_str("saved individuals:\n");
                out.push_str(&render::listing(&self.store.values()));
                Ok(out)
            }
            Action::Random { save } => {
                let record = self.engine.random_individual(&self.store, &mut self.rng);
                Ok(self.keep(record, save))
            }
            Action::Breed {
                first,
                second,
                save,
            } => {
                let record = self
                    .engine
                    .breed_named(&first, &second, &self.store, &mut self.rng)?;
                Ok(self.keep(record, save))
            }
            Action::Simulate { draws } => {
                if draws == 0 {
                    bail!("draw count must be positive");
                }
                let mut counts: BTreeMap<Species, usize> = BTreeMap::new();
                for _ in 0..draws {
                    let (_, species) = self.engine.catalog().sample_any(&mut self.rng);
                    *counts.entry(species).or_default() += 1;
                }
                let counts: Vec<(Species, usize)> = counts.into_iter().collect();
                Ok(render::frequencies(&counts, draws))
            }
            Action::Show { name } => self
                .store
                .get(&name)
                .map(render::record)
                .with_context(|| format!("no saved individual named {name:?}")),
            Action::Optimize { params, save_best } => {
                if self.session.is_running() {
                    bail!("an optimizer session is running in this shell; stop it first");
                }
                let request = params.request()?;
                let summary = hybrid_sim_core::optimizer::run(
                    &self.engine,
                    &mut self.population,
                    request,
                )?;
                let mut out = render::summary(&summary);
                if save_best {
                    if let Some(best) = summary
                        .best_overall
                        .as_ref()
                        .and_then(|b| self.population.get(&b.name))
                    {
                        out.push_str(&format!("saved {}\n", best.name));
                        self.store.put(best.clone());
                    }
                }
                Ok(out)
            }
            Action::Check {
                population,
                condition,
            } => {
                let condition = parse_condition(&condition)?;
                let store: &dyn RecordStore = if population {
                    &self.population
                } else {
                    &self.store
                };
                let verdict = if check_condition(&condition, store) {
                    "yes"
                } else {
                    "no"
                };
                Ok(format!("{condition}: {verdict}\n"))
            }
        }
    }

    pub fn optimizer(&mut self, action: OptAction) -> anyhow::Result<String> {
        let engine = &self.engine;
        match action {
            OptAction::Start(params) => {
                let status = self
                    .session
                    .start(engine, &mut self.population, params.request()?)?;
                Ok(render::status(&status))
            }
            OptAction::Step { generations } => {
                let size = generations.map_or(StepSize::Chunk, StepSize::Generations);
                match self.session.step(engine, &mut self.population, size)? {
                    StepOutcome::Running(status) => Ok(render::status(&status)),
                    StepOutcome::Finished(summary) => Ok(render::summary(&summary)),
                }
            }
            OptAction::Status => Ok(render::status(&self.session.status(&self.population)?)),
            OptAction::Stop => {
                self.session.stop()?;
                info!("optimizer session stopped");
                Ok("stopped\n".to_string())
            }
            OptAction::Finalize => {
                let summary = self.session.finalize(engine, &self.population)?;
                Ok(render::summary(&summary))
            }
        }
    }

    fn keep(&mut self, record: hybrid_sim_core::IndividualRecord, save: bool) -> String {
        let mut out = render::record(&record);
        if save {
            out.push_str(&format!("saved {}\n", record.name));
            self.store.put(record);
        }
        out
    }
}

/// `variant NAME`, `species NAME`, or `STAT CMP THRESHOLD` where the stat
/// name may span several words.
pub fn parse_condition(tokens: &[String]) -> anyhow::Result<Condition> {
    let Some((head, rest)) = tokens.split_first() else {
        bail!("empty condition");
    };
    let rest_joined = rest.join(" ");
    match head.to_lowercase().as_str() {
        "variant" => Variant::from_name(&rest_joined)
            .map(Condition::VariantExists)
            .with_context(|| format!("unknown variant {rest_joined:?}")),
        "species" => Ok(Condition::SpeciesExists(rest_joined.parse::<Species>()?)),
        _ => {
            let [stat @ .., cmp, threshold] = tokens else {
                bail!("expected `STAT CMP THRESHOLD`");
            };
            let stat_name = stat.join(" ");
            let stat = StatKey::from_name(&stat_name)
                .with_context(|| format!("unknown stat {stat_name:?}"))?;
            let cmp = Comparison::from_symbol(cmp)
                .with_context(|| format!("unknown comparison {cmp:?}"))?;
            let threshold: f64 = threshold
                .parse()
                .with_context(|| format!("threshold {threshold:?} is not a number"))?;
            Ok(Condition::Stat {
                stat,
                cmp,
                threshold,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn parses_each_condition_form() {
        assert_eq!(
            parse_condition(&tokens("variant giant")).expect("variant"),
            Condition::VariantExists(Variant::Giant)
        );
        assert_eq!(
            parse_condition(&tokens("species Satyr")).expect("species"),
            Condition::SpeciesExists(Species::SatyrFaun)
        );
        assert_eq!(
            parse_condition(&tokens("land speed >= 40.5")).expect("stat"),
            Condition::Stat {
                stat: StatKey::LandSpeed,
                cmp: Comparison::Ge,
                threshold: 40.5,
            }
        );
    }

    #[test]
    fn rejects_malformed_conditions() {
        assert!(parse_condition(&[]).is_err());
        assert!(parse_condition(&tokens("variant goblin")).is_err());
        assert!(parse_condition(&tokens("strength ~ 3")).is_err());
        assert!(parse_condition(&tokens("strength >= lots")).is_err());
        assert!(parse_condition(&tokens(">= 3")).is_err());
    }
}
