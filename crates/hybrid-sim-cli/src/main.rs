mod app;
mod render;
mod shell;
mod store;

use anyhow::Context;
use app::{Action, App};
use clap::{Parser, Subcommand};
use env_logger::Env;
use hybrid_sim_core::{Engine, RecordStore, SimConfig};
use std::fs;
use std::path::{Path, PathBuf};
use store::FileStore;

#[derive(Debug, Parser)]
#[command(name = "hybrid-sim", version, about = "Breed chimeric creatures and optimize their stats")]
struct Cli {
    /// JSON file with `SimConfig` overrides
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the configured seed
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Where saved individuals live
    #[arg(long, global = true, default_value = "hybrids.json")]
    store: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Action(Action),
    /// Interactive prompt; the optimizer runs in steps under `opt`
    Shell,
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> anyhow::Result<SimConfig> {
    let mut config = match path {
        Some(path) => {
            let data = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.seed)?;
    let engine = Engine::new(config).context("invalid configuration")?;
    let store = FileStore::load(&cli.store)?;
    log::debug!("{} saved individual(s) in {}", store.len(), store.path().display());
    let mut app = App::new(engine, store);

    match cli.command {
        Command::Shell => shell::run(&mut app),
        Command::Action(action) => {
            print!("{}", app.run(action)?);
            app.save()
        }
    }
}
