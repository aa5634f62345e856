pub mod rules;

use crate::allele::{Allele, Locus};
use crate::catalog::Species;
use crate::config::SimConfig;
use crate::stats::{round3, HeadStats, MutationLog, StatBlock, StatKey, StatValue};
use rand::Rng;
use std::collections::BTreeMap;

/// Output of stat derivation.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedStats {
    pub stats: StatBlock,
    pub mutations: MutationLog,
}

/// Allele-derived expectations for a species before any individual
/// variation. Variant thresholds are measured against these.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeciesBaseline {
    pub size: f64,
    pub strength: f64,
    pub magic_production: f64,
    pub magic_capacity: f64,
}

impl SpeciesBaseline {
    pub fn of(species: Species, reference_size: f64) -> Self {
        let expressed = species.triple();
        let size = rules::mean_over(&Locus::ALL, expressed, |a| a.profile().size);
        let strength_factor = rules::corrective_multipliers(species)
            .iter()
            .filter(|(k, _)| *k == StatKey::Strength)
            .map(|(_, f)| *f)
            .product::<f64>();
        let strength = mean_base(species, StatKey::Strength, expressed) * strength_factor;
        let magic_production = mean_base(species, StatKey::ThaumicProduction, expressed);
        let magic_capacity =
            mean_base(species, StatKey::Thaumacyst, expressed) * size / reference_size;
        Self {
            size,
            strength,
            magic_production,
            magic_capacity,
        }
    }
}

fn mean_base(species: Species, stat: StatKey, expressed: [Allele; 3]) -> f64 {
    rules::mean_over(rules::sources(species, stat), expressed, |a| {
        rules::allele_base(stat, a)
    })
}

/// Applies symmetric variation and rare point mutation, collecting notes.
struct Roller<'a, R: Rng + ?Sized> {
    config: &'a SimConfig,
    rng: &'a mut R,
    mutations: MutationLog,
}

impl<'a, R: Rng + ?Sized> Roller<'a, R> {
    fn variation_factor(&mut self) -> f64 {
        if !self.config.enable_variation {
            return 1.0;
        }
        self.rng
            .random_range(self.config.variation_min..=self.config.variation_max)
    }

    fn vary(&mut self, base: f64) -> f64 {
        round3(base * self.variation_factor())
    }

    fn maybe_mutate(&mut self, label: &str, value: StatValue) -> StatValue {
        let rate = self.config.stat_mutation_rate;
        if rate <= 0.0 || self.rng.random::<f64>() >= rate {
            return value;
        }
        match value {
            StatValue::Flag(before) => {
                let after = !before;
                self.mutations.insert(
                    label.to_string(),
                    format!("{label} mutated from {before} to {after}"),
                );
                StatValue::Flag(after)
            }
            StatValue::Diet(_) => value,
            numeric => {
                let factor = self
                    .rng
                    .random_range(self.config.stat_mutation_min..=self.config.stat_mutation_max);
                let mutated = numeric.scaled(factor);
                self.mutations.insert(
                    label.to_string(),
                    format!(
                        "{label} mutated: multiplied by {} (from {numeric} to {mutated})",
                        round3(factor)
                    ),
                );
                mutated
            }
        }
    }

    /// Value of a source-ruled stat from the expressed alleles at `loci`.
    fn sourced(
        &mut self,
        label: &str,
        stat: StatKey,
        loci: &[Locus],
        expressed: [Allele; 3],
    ) -> StatValue {
        let mean = |value: &dyn Fn(Allele) -> f64| rules::mean_over(loci, expressed, value);
        let value = match stat {
            StatKey::Diet => {
                let locus = loci.first().copied().unwrap_or(Locus::Top);
                return StatValue::Diet(expressed[locus.index()].profile().diet);
            }
            k if k.is_flag() => StatValue::Flag(mean(&|a| rules::allele_base(k, a)) >= 0.5),
            StatKey::VisualAcuity => StatValue::Acuity {
                cpd: self.vary(mean(&|a| a.profile().senses.visual_acuity)),
            },
            StatKey::HearingRange => {
                let low = self.vary(mean(&|a| a.profile().senses.hearing_low_hz));
                let high = self.vary(mean(&|a| a.profile().senses.hearing_high_hz));
                StatValue::Range {
                    low: low.min(high),
                    high: high.max(low),
                }
            }
            k => StatValue::Number(self.vary(mean(&|a| rules::allele_base(k, a)))),
        };
        self.maybe_mutate(label, value)
    }

    fn number(&mut self, stat: StatKey, base: f64) -> StatValue {
        let value = StatValue::Number(self.vary(base));
        self.maybe_mutate(stat.label(), value)
    }
}

/// Compute the full stat block of an individual of `species` whose expressed
/// (top, mid, bottom) alleles are `expressed`.
///
/// Pure apart from the draws taken from `rng`.
pub fn derive_stats<R: Rng + ?Sized>(
    species: Species,
    expressed: [Allele; 3],
    config: &SimConfig,
    rng: &mut R,
) -> DerivedStats {
    let mut roller = Roller {
        config,
        rng,
        mutations: MutationLog::new(),
    };
    let mut stats = StatBlock::new();
    let multi_headed = rules::is_multi_headed(species);

    for stat in rules::SOURCED {
        if multi_headed && stat.is_head_stat() {
            continue;
        }
        let loci = rules::sources(species, stat);
        let value = roller.sourced(stat.label(), stat, loci, expressed);
        stats.insert(stat, value);
    }

    if multi_headed {
        for locus in Locus::ALL {
            let allele = expressed[locus.index()];
            let mut head = HeadStats {
                allele,
                values: BTreeMap::new(),
            };
            for stat in StatKey::HEAD {
                let label = head.label(stat);
                let value = roller.sourced(&label, stat, &[locus], expressed);
                head.values.insert(stat, value);
            }
            stats.push_head(head);
        }
    }

    let size_base = rules::mean_over(&Locus::ALL, expressed, |a| a.profile().size);
    let size_value = roller.number(StatKey::Size, size_base);
    stats.insert(StatKey::Size, size_value);
    let size = size_value.scalar().unwrap_or(size_base);

    let capacity_base = rules::mean_over(rules::sources(species, StatKey::Thaumacyst), expressed, |a| {
        a.profile().magic_capacity
    });
    let max = round3(roller.vary(capacity_base) * size / config.thaumacyst_reference_size);
    let fill = if config.enable_variation {
        roller.rng.random_range(config.thaumacyst_fill_min..=1.0)
    } else {
        1.0
    };
    let thaumacyst = roller.maybe_mutate(
        StatKey::Thaumacyst.label(),
        StatValue::Capacity {
            current: round3(max * fill),
            max,
        },
    );
    stats.insert(StatKey::Thaumacyst, thaumacyst);

    let (maturation_base, lifespan_base) = rules::lifecycle(species).unwrap_or((0.0, 0.0));
    let maturation = roller.number(StatKey::MaturationAge, maturation_base);
    stats.insert(StatKey::MaturationAge, maturation);
    let lifespan = roller.number(StatKey::Lifespan, lifespan_base);
    stats.insert(StatKey::Lifespan, lifespan);

    let maturation_years = maturation.scalar().unwrap_or(0.0);
    let growth = if maturation_years > 0.0 {
        round3(size / maturation_years)
    } else {
        0.0
    };
    let growth = roller.maybe_mutate(StatKey::GrowthRate.label(), StatValue::Number(growth));
    stats.insert(StatKey::GrowthRate, growth);

    for stat in [StatKey::GestationPeriod, StatKey::LitterSize] {
        let base = expressed
            .iter()
            .zip(rules::REPRODUCTION_WEIGHTS)
            .map(|(&a, w)| w * rules::allele_base(stat, a))
            .sum::<f64>();
        let value = roller.number(stat, base);
        stats.insert(stat, value);
    }

    for &(stat, factor) in rules::corrective_multipliers(species) {
        stats.scale(stat, factor);
    }

    DerivedStats {
        stats,
        mutations: roller.mutations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn derive_plain(species: Species) -> DerivedStats {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        derive_stats(species, species.triple(), &SimConfig::deterministic(), &mut rng)
    }

    #[test]
    fn dragon_without_randomness_is_exact_and_repeatable() {
        let config = SimConfig::deterministic();
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let first = derive_stats(Species::Dragon, Species::Dragon.triple(), &config, &mut rng);
        assert_eq!(first.stats.number(StatKey::Strength), Some(300.0));
        assert_eq!(first.stats.number(StatKey::FlightSpeed), Some(50.0));
        assert_eq!(first.stats.flag(StatKey::FireBreathing), Some(true));
        assert!(first.mutations.is_empty());
        for _ in 0..1000 {
            let again = derive_stats(Species::Dragon, Species::Dragon.triple(), &config, &mut rng);
            assert_eq!(again, first);
        }
    }

    #[test]
    fn every_species_gets_a_complete_block() {
        for species in Species::ALL {
            let derived = derive_plain(species);
            for key in StatKey::ALL {
                assert!(derived.stats.contains(key), "{species} missing {key}");
            }
            if rules::is_multi_headed(species) {
                assert_eq!(derived.stats.heads().len(), 3);
                for head in derived.stats.heads() {
                    assert_eq!(head.values.len(), StatKey::HEAD.len());
                }
            } else {
                assert!(derived.stats.heads().is_empty());
            }
        }
    }

    #[test]
    fn value_shapes_match_stat_kinds() {
        for species in Species::ALL {
            let derived = derive_plain(species);
            let mut all: Vec<(StatKey, StatValue)> =
                derived.stats.iter().map(|(k, v)| (k, *v)).collect();
            for head in derived.stats.heads() {
                all.extend(head.values.iter().map(|(k, v)| (*k, *v)));
            }
            for (key, value) in all {
                match value {
                    StatValue::Flag(_) => assert!(key.is_flag(), "{key} is a flag"),
                    StatValue::Capacity { .. } => assert_eq!(key, StatKey::Thaumacyst),
                    StatValue::Acuity { .. } => assert_eq!(key, StatKey::VisualAcuity),
                    StatValue::Range { .. } => assert_eq!(key, StatKey::HearingRange),
                    StatValue::Diet(_) => assert_eq!(key, StatKey::Diet),
                    StatValue::Number(_) => assert!(!key.is_flag()),
                }
            }
        }
    }

    #[test]
    fn chimera_heads_follow_each_locus() {
        let derived = derive_plain(Species::Chimera);
        let heads = derived.stats.heads();
        assert_eq!(heads[0].allele, Allele::Li);
        assert_eq!(heads[1].allele, Allele::Go);
        assert_eq!(heads[2].allele, Allele::Sn);
        assert_eq!(heads[1].values.get(&StatKey::Iq), Some(&StatValue::Number(60.0)));
        assert!(derived.stats.get(StatKey::Iq).is_none());
        // Body stats still come from source rules.
        assert_eq!(derived.stats.flag(StatKey::Venom), Some(true));
        assert_eq!(derived.stats.number(StatKey::Strength), Some(220.0));
    }

    #[test]
    fn reproduction_stats_blend_loci() {
        let derived = derive_plain(Species::Mermaid);
        // 0.15 * 270 + 0.15 * 270 + 0.7 * 30
        assert_eq!(derived.stats.number(StatKey::GestationPeriod), Some(102.0));
    }

    #[test]
    fn growth_rate_is_size_over_maturation() {
        let derived = derive_plain(Species::Horse);
        let size = derived.stats.number(StatKey::Size).expect("size");
        let growth = derived.stats.number(StatKey::GrowthRate).expect("growth");
        assert_eq!(growth, round3(size / 4.0));
    }

    #[test]
    fn satyr_gets_corrective_bonus() {
        let derived = derive_plain(Species::SatyrFaun);
        assert_eq!(derived.stats.number(StatKey::Strength), Some(90.0));
        assert_eq!(derived.stats.number(StatKey::Climbing), Some(22.5));
    }

    #[test]
    fn thaumacyst_scales_with_size() {
        let derived = derive_plain(Species::Human);
        assert_eq!(
            derived.stats.get(StatKey::Thaumacyst),
            Some(&StatValue::Capacity {
                current: 50.0,
                max: 50.0
            })
        );
        let derived = derive_plain(Species::Fish);
        let max = derived.stats.scalar(StatKey::Thaumacyst).expect("capacity");
        assert_eq!(max, round3(5.0 * 15.0 / 170.0));
    }

    #[test]
    fn variation_stays_within_range() {
        let config = SimConfig {
            stat_mutation_rate: 0.0,
            ..SimConfig::default()
        };
        let mut rng = ChaCha12Rng::seed_from_u64(77);
        for _ in 0..200 {
            let derived = derive_stats(Species::Lion, Species::Lion.triple(), &config, &mut rng);
            let strength = derived.stats.number(StatKey::Strength).expect("strength");
            assert!((198.0..=242.0).contains(&strength), "{strength}");
            if let Some(StatValue::Capacity { current, max }) =
                derived.stats.get(StatKey::Thaumacyst)
            {
                assert!(current <= max);
            } else {
                panic!("thaumacyst missing");
            }
        }
    }

    #[test]
    fn forced_mutation_is_logged() {
        let config = SimConfig {
            enable_variation: false,
            stat_mutation_rate: 1.0,
            ..SimConfig::default()
        };
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let derived = derive_stats(Species::Snake, Species::Snake.triple(), &config, &mut rng);
        assert_eq!(derived.stats.flag(StatKey::Venom), Some(false));
        assert!(derived.mutations.contains_key("Venom"));
        assert!(derived.mutations["Strength"].contains("multiplied by"));
        let strength = derived.stats.number(StatKey::Strength).expect("strength");
        assert!((7.5..=22.5).contains(&strength));
    }

    #[test]
    fn baseline_reflects_allele_means() {
        let b = SpeciesBaseline::of(Species::Centaur, 170.0);
        assert!((b.size - (170.0 + 170.0 + 160.0) / 3.0).abs() < 1e-9);
        assert_eq!(b.strength, 60.0);
        assert!((b.magic_production - 4.0).abs() < 1e-9);
    }
}
