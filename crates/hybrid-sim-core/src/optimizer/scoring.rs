use super::metrics::BaselineStat;
use super::Objective;
use crate::breeding::Engine;
use crate::catalog::Species;
use crate::genome::{cross, Transmission};
use crate::record::IndividualRecord;
use crate::stats::StatKey;
use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Independent random streams derived from the session seed.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Stream {
    Seeding = 1,
    Generation = 2,
    Baseline = 3,
    Producer = 4,
}

pub(crate) fn stream_rng(seed: u64, stream: Stream, index: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(
        seed.wrapping_add((stream as u64) << 40)
            .wrapping_add(index),
    )
}

/// Per-species stat baselines from freshly sampled individuals, filled the
/// first time a species is scored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineCache {
    samples: usize,
    seed: u64,
    by_species: BTreeMap<Species, BTreeMap<StatKey, BaselineStat>>,
}

impl BaselineCache {
    pub fn new(samples: usize, seed: u64) -> Self {
        Self {
            samples,
            seed,
            by_species: BTreeMap::new(),
        }
    }

    pub fn get(&self, species: Species, stat: StatKey) -> Option<&BaselineStat> {
        self.by_species.get(&species)?.get(&stat)
    }

    /// Make sure every `stats` baseline of `species` is cached.
    pub fn ensure(&mut self, engine: &Engine, species: Species, stats: &[StatKey]) {
        let cached = self.by_species.entry(species).or_default();
        let missing: Vec<StatKey> = stats
            .iter()
            .copied()
            .filter(|s| !cached.contains_key(s))
            .collect();
        if missing.is_empty() {
            return;
        }
        debug!(
            "sampling {} {species} individuals for {} baseline stat(s)",
            self.samples,
            missing.len()
        );
        let mut rng = stream_rng(self.seed, Stream::Baseline, species.index() as u64);
        let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(self.samples); missing.len()];
        for _ in 0..self.samples {
            let block = engine.sample_stats(species, &mut rng);
            for (slot, stat) in values.iter_mut().zip(&missing) {
                slot.push(block.scalar(*stat).unwrap_or(0.0));
            }
        }
        for (stat, samples) in missing.into_iter().zip(values) {
            cached.insert(stat, BaselineStat::from_samples(stat, &samples));
        }
    }

    /// Average used to normalise `stat` for `species`; 1 when unknown or zero.
    pub fn normaliser(&self, species: Species, stat: StatKey) -> f64 {
        match self.get(species, stat) {
            Some(b) if b.avg != 0.0 => b.avg,
            _ => 1.0,
        }
    }
}

/// `direction * raw / baseline` per objective term, in objective order.
pub fn score(record: &IndividualRecord, objective: &Objective, cache: &BaselineCache) -> Vec<f64> {
    objective
        .terms()
        .iter()
        .map(|term| {
            let raw = record.stats.scalar(term.stat).unwrap_or(0.0);
            term.direction.sign() * raw / cache.normaliser(record.species, term.stat)
        })
        .collect()
}

/// Lexicographic comparison of score tuples.
pub fn compare_scores(a: &[f64], b: &[f64]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.total_cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Unordered species pairs whose crosses land in `targets` at least
/// `producer_threshold` of the time.
pub fn producer_pairs(engine: &Engine, targets: &[Species], seed: u64) -> Vec<(Species, Species)> {
    if targets.is_empty() {
        return Vec::new();
    }
    let config = engine.config();
    let trials = config.producer_trials;
    let threshold = config.producer_threshold;
    let mut pairs = Vec::new();
    for (i, &a) in Species::ALL.iter().enumerate() {
        for &b in &Species::ALL[i..] {
            pairs.push((a, b));
        }
    }
    let catalog = engine.catalog();
    let via = Transmission::Mutating(engine.mutation());
    pairs
        .into_par_iter()
        .enumerate()
        .filter_map(|(idx, (a, b))| {
            let mut rng = stream_rng(seed, Stream::Producer, idx as u64);
            let hits = (0..trials)
                .filter(|_| {
                    let ga = catalog.sample_genotype(a, &mut rng);
                    let gb = catalog.sample_genotype(b, &mut rng);
                    let child = cross((&ga, via), (&gb, via), &mut rng);
                    catalog
                        .resolve(&child)
                        .is_some_and(|s| targets.contains(&s))
                })
                .count();
            (hits as f64 >= threshold * trials as f64).then_some((a, b))
        })
        .collect()
}
