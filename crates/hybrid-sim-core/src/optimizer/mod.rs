//! Chunked evolutionary search over the record store.
//!
//! An [`OptimizerState`] is an owned value: [`OptimizerState::start`] builds
//! it, [`OptimizerState::step`] consumes and returns it, and
//! [`OptimizerState::finalize`] turns it into a summary. Between calls it is
//! plain serialisable data. [`OptimizerSession`] wraps the same protocol for
//! hosts that want an Idle/Running state machine.

pub mod condition;
mod generation;
pub mod metrics;
pub mod scoring;

pub use condition::{check_condition, Comparison, Condition};
pub use metrics::*;
pub use scoring::BaselineCache;

use crate::breeding::Engine;
use crate::catalog::Species;
use crate::config::ConfigError;
use crate::error::OptimizerError;
use crate::record::{IndividualRecord, RecordStore};
use crate::stats::StatKey;
use log::info;
use scoring::{compare_scores, score};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Maximize,
    Minimize,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Maximize => 1.0,
            Direction::Minimize => -1.0,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Direction::Maximize => '+',
            Direction::Minimize => '-',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveTerm {
    pub stat: StatKey,
    pub direction: Direction,
}

impl ObjectiveTerm {
    pub fn new(stat: StatKey, direction: Direction) -> Self {
        Self { stat, direction }
    }

    /// Parse `+Strength`, `-size` or `Land Speed` (maximise by default).
    pub fn parse(text: &str) -> Result<Self, OptimizerError> {
        let text = text.trim();
        let (direction, name) = match text.chars().next() {
            Some('+') => (Direction::Maximize, &text[1..]),
            Some('-') => (Direction::Minimize, &text[1..]),
            _ => (Direction::Maximize, text),
        };
        let stat = StatKey::from_name(name)
            .filter(|s| *s != StatKey::Diet)
            .ok_or_else(|| OptimizerError::UnknownStat(name.trim().to_string()))?;
        Ok(Self::new(stat, direction))
    }
}

impl fmt::Display for ObjectiveTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.direction.symbol(), self.stat)
    }
}

/// Ordered stat objective; earlier terms dominate later ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    terms: Vec<ObjectiveTerm>,
}

impl Objective {
    /// Diet has no numeric view and is refused.
    pub fn new(terms: Vec<ObjectiveTerm>) -> Result<Self, OptimizerError> {
        if terms.is_empty() {
            return Err(OptimizerError::EmptyObjective);
        }
        if let Some(t) = terms.iter().find(|t| t.stat == StatKey::Diet) {
            return Err(OptimizerError::UnknownStat(t.stat.label().to_string()));
        }
        Ok(Self { terms })
    }

    pub fn parse<'a>(specs: impl IntoIterator<Item = &'a str>) -> Result<Self, OptimizerError> {
        let terms = specs
            .into_iter()
            .flat_map(|s| s.split(','))
            .filter(|s| !s.trim().is_empty())
            .map(ObjectiveTerm::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(terms)
    }

    pub fn terms(&self) -> &[ObjectiveTerm] {
        &self.terms
    }

    pub fn stats(&self) -> Vec<StatKey> {
        self.terms.iter().map(|t| t.stat).collect()
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

/// Parameters of a new session.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizerRequest {
    pub target_generations: usize,
    pub objective: Objective,
    /// Target species; empty means any.
    pub species: Vec<Species>,
    pub chunk_size: Option<usize>,
    pub seed: Option<u64>,
}

impl OptimizerRequest {
    pub fn new(target_generations: usize, objective: Objective) -> Self {
        Self {
            target_generations,
            objective,
            species: Vec::new(),
            chunk_size: None,
            seed: None,
        }
    }

    pub fn with_species(mut self, species: Vec<Species>) -> Self {
        self.species = species;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// How far a `step` call advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepSize {
    /// The session's configured chunk size.
    Chunk,
    Generations(usize),
    ToCompletion,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizerState {
    objective: Objective,
    species: Vec<Species>,
    generation: usize,
    target_generations: usize,
    population_size: usize,
    chunk_size: usize,
    seed: u64,
    producer_pairs: Vec<(Species, Species)>,
    baselines: BaselineCache,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    report: Option<BaselineReport>,
    #[serde(default)]
    history: Vec<GenerationMetrics>,
}

impl OptimizerState {
    /// Clear `store`, seed a fresh population into it and open a session at
    /// generation 0.
    pub fn start(
        engine: &Engine,
        store: &mut dyn RecordStore,
        request: OptimizerRequest,
    ) -> Result<Self, OptimizerError> {
        if request.target_generations == 0 {
            return Err(OptimizerError::ZeroGenerations);
        }
        if request.objective.terms().is_empty() {
            return Err(OptimizerError::EmptyObjective);
        }
        let config = engine.config();
        let chunk_size = request.chunk_size.unwrap_or(config.chunk_size);
        if chunk_size == 0 {
            return Err(ConfigError::NonPositive { name: "chunk_size" }.into());
        }
        let mut species = request.species;
        let mut seen = BTreeSet::new();
        species.retain(|s| seen.insert(*s));

        let seed = request.seed.unwrap_or(config.seed);
        let producer_pairs = scoring::producer_pairs(engine, &species, seed);
        let mut state = Self {
            objective: request.objective,
            species,
            generation: 0,
            target_generations: request.target_generations,
            population_size: config.population_size,
            chunk_size,
            seed,
            producer_pairs,
            baselines: BaselineCache::new(config.baseline_samples, seed),
            report: None,
            history: Vec::new(),
        };

        store.clear();
        generation::seed_population(&state, engine, store);
        state.ensure_baselines(engine, &*store);
        if let [target] = state.species[..] {
            let stats = state.objective.stats();
            state.baselines.ensure(engine, target, &stats);
            state.report = Some(BaselineReport {
                species: target,
                samples: config.baseline_samples,
                stats: stats
                    .iter()
                    .filter_map(|&s| state.baselines.get(target, s).cloned())
                    .collect(),
            });
        }
        info!(
            "optimizer started: {} generations, objective [{}], {} producer pair(s), population {}",
            state.target_generations,
            state.objective,
            state.producer_pairs.len(),
            store.len()
        );
        Ok(state)
    }

    /// Advance up to `size` generations, never past the target.
    pub fn step(mut self, engine: &Engine, store: &mut dyn RecordStore, size: StepSize) -> Self {
        let budget = match size {
            StepSize::Chunk => self.chunk_size,
            StepSize::Generations(n) => n,
            StepSize::ToCompletion => usize::MAX,
        };
        let remaining = self.target_generations.saturating_sub(self.generation);
        for _ in 0..budget.min(remaining) {
            let metrics = generation::run_generation(&mut self, engine, store);
            info!(
                "generation {}/{}: {} pair(s), {} birth(s), {} miscarriage(s), best {}",
                metrics.generation,
                self.target_generations,
                metrics.pairs,
                metrics.births,
                metrics.miscarriages,
                metrics.best_name.as_deref().unwrap_or("-")
            );
            self.history.push(metrics);
            self.generation += 1;
        }
        self
    }

    pub fn is_complete(&self) -> bool {
        self.generation >= self.target_generations
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn target_generations(&self) -> usize {
        self.target_generations
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn producer_pairs(&self) -> &[(Species, Species)] {
        &self.producer_pairs
    }

    pub fn baseline_report(&self) -> Option<&BaselineReport> {
        self.report.as_ref()
    }

    pub fn history(&self) -> &[GenerationMetrics] {
        &self.history
    }

    /// Progress snapshot; uses only baselines cached so far.
    pub fn status(&self, store: &dyn RecordStore) -> OptimizerStatus {
        let best = self
            .rank(store)
            .into_iter()
            .next()
            .map(|(score, record)| RankedIndividual::new(record, score, &self.objective.stats()));
        OptimizerStatus {
            generation: self.generation,
            target_generations: self.target_generations,
            population_size: store.len(),
            best,
            last_generation: self.history.last().cloned(),
        }
    }

    /// Close the session and report the winners.
    pub fn finalize(mut self, engine: &Engine, store: &dyn RecordStore) -> OptimizerSummary {
        self.ensure_baselines(engine, store);
        let stats = self.objective.stats();
        let ranked = self.rank(store);
        let best_overall = ranked
            .first()
            .map(|(score, record)| RankedIndividual::new(record, score.clone(), &stats));
        let best_of_target = match self.species[..] {
            [target] => ranked
                .iter()
                .find(|(_, r)| r.species == target)
                .map(|(score, record)| RankedIndividual::new(record, score.clone(), &stats)),
            _ => None,
        };
        info!(
            "optimizer finished after {} generation(s); best {}",
            self.generation,
            best_overall.as_ref().map_or("-", |b| b.name.as_str())
        );
        OptimizerSummary {
            generations: self.generation,
            best_overall,
            best_of_target,
            baseline: self.report,
            history: self.history,
        }
    }

    fn is_target(&self, species: Species) -> bool {
        self.species.contains(&species)
    }

    fn ensure_baselines(&mut self, engine: &Engine, store: &dyn RecordStore) {
        let present: BTreeSet<Species> = store.values().iter().map(|r| r.species).collect();
        let stats = self.objective.stats();
        for species in present {
            self.baselines.ensure(engine, species, &stats);
        }
    }

    /// Every record with its score, best first; ties by name.
    fn rank<'s>(&self, store: &'s dyn RecordStore) -> Vec<(Vec<f64>, &'s IndividualRecord)> {
        let mut ranked: Vec<(Vec<f64>, &IndividualRecord)> = store
            .values()
            .into_iter()
            .map(|r| (score(r, &self.objective, &self.baselines), r))
            .collect();
        ranked.sort_by(|(sa, ra), (sb, rb)| {
            compare_scores(sb, sa).then_with(|| ra.key().cmp(&rb.key()))
        });
        ranked
    }
}

/// Result of a session step.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    Running(OptimizerStatus),
    Finished(OptimizerSummary),
}

/// Holds at most one running [`OptimizerState`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSession {
    state: Option<OptimizerState>,
}

impl OptimizerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&OptimizerState> {
        self.state.as_ref()
    }

    pub fn start(
        &mut self,
        engine: &Engine,
        store: &mut dyn RecordStore,
        request: OptimizerRequest,
    ) -> Result<OptimizerStatus, OptimizerError> {
        if self.state.is_some() {
            return Err(OptimizerError::SessionAlreadyRunning);
        }
        let state = OptimizerState::start(engine, store, request)?;
        let status = state.status(&*store);
        self.state = Some(state);
        Ok(status)
    }

    /// Advance the running session; finalizes it once the target is reached.
    pub fn step(
        &mut self,
        engine: &Engine,
        store: &mut dyn RecordStore,
        size: StepSize,
    ) -> Result<StepOutcome, OptimizerError> {
        let state = self
            .state
            .take()
            .ok_or(OptimizerError::NoActiveSession)?
            .step(engine, store, size);
        if state.is_complete() {
            return Ok(StepOutcome::Finished(state.finalize(engine, &*store)));
        }
        let status = state.status(&*store);
        self.state = Some(state);
        Ok(StepOutcome::Running(status))
    }

    pub fn status(&self, store: &dyn RecordStore) -> Result<OptimizerStatus, OptimizerError> {
        self.state
            .as_ref()
            .map(|s| s.status(store))
            .ok_or(OptimizerError::NoActiveSession)
    }

    /// Discard the session. Records already in the store stay.
    pub fn stop(&mut self) -> Result<(), OptimizerError> {
        self.state
            .take()
            .map(|_| ())
            .ok_or(OptimizerError::NoActiveSession)
    }

    pub fn finalize(
        &mut self,
        engine: &Engine,
        store: &dyn RecordStore,
    ) -> Result<OptimizerSummary, OptimizerError> {
        let state = self.state.take().ok_or(OptimizerError::NoActiveSession)?;
        Ok(state.finalize(engine, store))
    }
}

/// Start, run to completion and finalize in one call.
pub fn run(
    engine: &Engine,
    store: &mut dyn RecordStore,
    request: OptimizerRequest,
) -> Result<OptimizerSummary, OptimizerError> {
    let state = OptimizerState::start(engine, store, request)?.step(engine, store, StepSize::ToCompletion);
    Ok(state.finalize(engine, &*store))
}
