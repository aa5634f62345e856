use super::metrics::GenerationMetrics;
use super::scoring::{stream_rng, Stream};
use super::OptimizerState;
use crate::breeding::{Engine, Parent};
use crate::catalog::Species;
use crate::config::SimConfig;
use crate::error::BreedError;
use crate::record::{IndividualRecord, RecordStore};
use crate::stats::StatKey;
use log::{debug, warn};
use rand::seq::SliceRandom;
use std::collections::BTreeSet;

/// Fill an empty store with the initial population: target species first
/// (round-robin), then members of likely producer pairs, then anything.
pub(super) fn seed_population(state: &OptimizerState, engine: &Engine, store: &mut dyn RecordStore) {
    let mut rng = stream_rng(state.seed, Stream::Seeding, 0);
    let n = state.population_size;

    if !state.species.is_empty() {
        for i in 0..n.div_ceil(2) {
            let species = state.species[i % state.species.len()];
            let record = engine.individual_of(species, &*store, &mut rng);
            store.put(record);
        }
    }

    let producer_quota = n * 3 / 4;
    let mut pairs = state.producer_pairs.clone();
    pairs.shuffle(&mut rng);
    let members = pairs.iter().flat_map(|&(a, b)| [a, b]);
    for species in members {
        if store.len() >= producer_quota {
            break;
        }
        let record = engine.individual_of(species, &*store, &mut rng);
        store.put(record);
    }

    while store.len() < n {
        let record = engine.random_individual(&*store, &mut rng);
        store.put(record);
    }
    debug!("seeded population of {}", store.len());
}

impl OptimizerState {
    fn producer_pair(&self, a: Species, b: Species) -> bool {
        let key = if a.index() <= b.index() { (a, b) } else { (b, a) };
        self.producer_pairs.contains(&key)
    }

    fn pairing_eligible(&self, species: Species) -> bool {
        self.species.is_empty()
            || self.is_target(species)
            || self
                .producer_pairs
                .iter()
                .any(|&(a, b)| a == species || b == species)
    }

    fn compatible(&self, a: Species, b: Species) -> bool {
        self.species.is_empty() || (a == b && self.is_target(a)) || self.producer_pair(a, b)
    }
}

fn litter_size(config: &SimConfig, a: &IndividualRecord, b: &IndividualRecord) -> usize {
    if !config.litter_mode {
        return 1;
    }
    let litter = |r: &IndividualRecord| r.stats.scalar(StatKey::LitterSize).unwrap_or(1.0);
    let mean = (litter(a) + litter(b)) / 2.0;
    (mean.round().max(1.0) as usize).clamp(1, config.max_litter)
}

/// Greedy non-overlapping pairing over a shuffled order.
fn choose_pairs(
    parents: &[IndividualRecord],
    order: &[usize],
    max_pairs: usize,
    compatible: impl Fn(Species, Species) -> bool,
) -> Vec<(usize, usize)> {
    let mut taken = vec![false; parents.len()];
    let mut pairs = Vec::new();
    for (pos, &i) in order.iter().enumerate() {
        if pairs.len() >= max_pairs {
            break;
        }
        if taken[i] {
            continue;
        }
        let partner = order[pos + 1..]
            .iter()
            .copied()
            .find(|&j| !taken[j] && compatible(parents[i].species, parents[j].species));
        if let Some(j) = partner {
            taken[i] = true;
            taken[j] = true;
            pairs.push((i, j));
        }
    }
    pairs
}

/// Breed, rescore and truncate once.
pub(super) fn run_generation(
    state: &mut OptimizerState,
    engine: &Engine,
    store: &mut dyn RecordStore,
) -> GenerationMetrics {
    let mut rng = stream_rng(state.seed, Stream::Generation, state.generation as u64);
    let parents: Vec<IndividualRecord> = store
        .values()
        .into_iter()
        .filter(|r| state.pairing_eligible(r.species))
        .cloned()
        .collect();
    let mut order: Vec<usize> = (0..parents.len()).collect();
    order.shuffle(&mut rng);
    let pairs = choose_pairs(&parents, &order, state.population_size / 2, |a, b| {
        state.compatible(a, b)
    });
    if pairs.is_empty() {
        warn!(
            "generation {}: no compatible pairs among {} eligible individual(s)",
            state.generation,
            parents.len()
        );
    }

    let mut births = 0;
    let mut miscarriages = 0;
    for &(i, j) in &pairs {
        let (a, b) = (&parents[i], &parents[j]);
        for _ in 0..litter_size(engine.config(), a, b) {
            match engine.breed(Parent::Record(a), Parent::Record(b), &*store, &mut rng) {
                Ok(child) => {
                    births += 1;
                    store.put(child);
                }
                Err(BreedError::Miscarriage { .. }) => miscarriages += 1,
                Err(err) => warn!("{} x {}: {err}", a.name, b.name),
            }
        }
    }

    state.ensure_baselines(engine, &*store);
    let ranked = state.rank(&*store);
    let keep = survivors(&ranked, state.population_size, |s| state.is_target(s));
    let best_name = ranked.first().map(|(_, r)| r.name.clone());
    let best_score = ranked.first().map(|(s, _)| s.clone()).unwrap_or_default();
    let mut distinct = BTreeSet::new();
    let mut doomed = Vec::new();
    for (idx, (_, record)) in ranked.iter().enumerate() {
        if keep.contains(&idx) {
            distinct.insert(record.species);
        } else {
            doomed.push(record.key());
        }
    }
    for key in doomed {
        store.remove(&key);
    }

    GenerationMetrics {
        generation: state.generation + 1,
        pairs: pairs.len(),
        births,
        miscarriages,
        population_size: store.len(),
        distinct_species: distinct.len(),
        best_name,
        best_score,
    }
}

/// Indices (into best-first `ranked`) of the records that stay: the top `n`,
/// with the best target-species record swapped in for the last slot if it
/// would otherwise be cut.
fn survivors(
    ranked: &[(Vec<f64>, &IndividualRecord)],
    n: usize,
    is_target: impl Fn(Species) -> bool,
) -> BTreeSet<usize> {
    let mut keep: BTreeSet<usize> = (0..ranked.len().min(n)).collect();
    let best_target = ranked.iter().position(|(_, r)| is_target(r.species));
    if let Some(pos) = best_target {
        if pos >= n && n > 0 {
            keep.remove(&(n - 1));
            keep.insert(pos);
        }
    }
    keep
}
