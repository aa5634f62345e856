use crate::allele::Allele;
use crate::catalog::Species;
use crate::phenotype::SpeciesBaseline;
use crate::stats::{StatBlock, StatKey};
use serde::{Deserialize, Serialize};
use std::fmt;

const HIGH_MAGIC_RATIO: f64 = 1.2;
const GIANT_SIZE_RATIO: f64 = 3.0;
const TITAN_SIZE_RATIO: f64 = 2.5;
const FAIRY_SIZE_RATIO: f64 = 0.6;
const ELVEN_SIZE_RATIO: f64 = 1.2;
const DWARVEN_SIZE_RATIO: f64 = 0.8;
const DWARVEN_STRENGTH_RATIO: f64 = 1.2;
const PEGASUS_PRODUCTION_BOOST: f64 = 2.0;
const PEGASUS_CAPACITY_BOOST: f64 = 3.0;

/// Human-topped species that never take the fey or dwarven forms.
const HUMANOID_EXCLUDED: [Species; 2] = [Species::Harpy, Species::Manticore];

/// Named sub-classification applied on top of a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Giant,
    Titan,
    Fairy,
    Elven,
    Dwarven,
    Unicorn,
}

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::Giant,
        Variant::Titan,
        Variant::Fairy,
        Variant::Elven,
        Variant::Dwarven,
        Variant::Unicorn,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Giant => "Giant",
            Self::Titan => "Titan",
            Self::Fairy => "Fairy",
            Self::Elven => "Elven",
            Self::Dwarven => "Dwarven",
            Self::Unicorn => "Unicorn",
        }
    }

    pub fn lifespan_multiplier(self) -> f64 {
        match self {
            Self::Giant => 3.0,
            Self::Titan => 10.0,
            Self::Fairy => 4.5,
            Self::Elven => 7.5,
            Self::Dwarven => 4.0,
            Self::Unicorn => 40.0,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.label().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rungs of the classification ladder, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rung {
    Giant,
    Titan,
    Fey,
    Dwarven,
    PegasusMagic,
    Unicorn,
}

const LADDER: [Rung; 6] = [
    Rung::Giant,
    Rung::Titan,
    Rung::Fey,
    Rung::Dwarven,
    Rung::PegasusMagic,
    Rung::Unicorn,
];

struct Subject {
    species: Species,
    top: Allele,
    size_ratio: f64,
    strength_ratio: f64,
    high_magic: bool,
}

impl Subject {
    fn humanoid(&self) -> bool {
        self.top == Allele::Hu && !HUMANOID_EXCLUDED.contains(&self.species)
    }

    fn fey_form(&self) -> Option<Variant> {
        if !(self.humanoid() && self.high_magic) {
            return None;
        }
        if self.size_ratio <= FAIRY_SIZE_RATIO {
            Some(Variant::Fairy)
        } else if self.size_ratio >= ELVEN_SIZE_RATIO {
            Some(Variant::Elven)
        } else {
            None
        }
    }
}

impl Rung {
    fn matches(self, s: &Subject) -> bool {
        match self {
            Rung::Giant => s.size_ratio >= GIANT_SIZE_RATIO,
            Rung::Titan => s.size_ratio >= TITAN_SIZE_RATIO && s.high_magic,
            Rung::Fey => s.fey_form().is_some(),
            Rung::Dwarven => {
                s.humanoid()
                    && s.size_ratio <= DWARVEN_SIZE_RATIO
                    && s.strength_ratio >= DWARVEN_STRENGTH_RATIO
            }
            Rung::PegasusMagic => s.species == Species::Pegasus,
            Rung::Unicorn => s.top == Allele::Ho && s.high_magic && s.species != Species::Pegasus,
        }
    }

    fn variant(self, s: &Subject) -> Option<Variant> {
        match self {
            Rung::Giant => Some(Variant::Giant),
            Rung::Titan => Some(Variant::Titan),
            Rung::Fey => s.fey_form(),
            Rung::Dwarven => Some(Variant::Dwarven),
            Rung::PegasusMagic => None,
            Rung::Unicorn => Some(Variant::Unicorn),
        }
    }
}

fn ratio(value: Option<f64>, baseline: f64) -> f64 {
    match value {
        Some(v) if baseline > 0.0 => v / baseline,
        _ => 1.0,
    }
}

/// Production or capacity at least 1.2x the species' allele-average baseline.
pub fn is_high_magic(stats: &StatBlock, baseline: &SpeciesBaseline) -> bool {
    let production = stats.scalar(StatKey::ThaumicProduction).unwrap_or(0.0);
    let capacity = stats.scalar(StatKey::Thaumacyst).unwrap_or(0.0);
    (baseline.magic_production > 0.0
        && production >= HIGH_MAGIC_RATIO * baseline.magic_production)
        || (baseline.magic_capacity > 0.0
            && capacity >= HIGH_MAGIC_RATIO * baseline.magic_capacity)
}

/// Walk the variant ladder. The first matching rung wins; it may set a
/// prefix and rescales lifespan, or (pegasus) boosts magic without a name.
pub fn classify_variant(
    species: Species,
    expressed_top: Allele,
    mut stats: StatBlock,
    baseline: &SpeciesBaseline,
) -> (Option<Variant>, StatBlock) {
    let high_magic = is_high_magic(&stats, baseline);
    let subject = Subject {
        species,
        top: expressed_top,
        size_ratio: ratio(stats.scalar(StatKey::Size), baseline.size),
        strength_ratio: ratio(stats.scalar(StatKey::Strength), baseline.strength),
        high_magic,
    };
    let Some(rung) = LADDER.iter().copied().find(|r| r.matches(&subject)) else {
        return (None, stats);
    };
    let variant = rung.variant(&subject);

    match variant {
        Some(v) => stats.scale(StatKey::Lifespan, v.lifespan_multiplier()),
        None => {
            stats.scale(StatKey::ThaumicProduction, PEGASUS_PRODUCTION_BOOST);
            stats.scale(StatKey::Thaumacyst, PEGASUS_CAPACITY_BOOST);
        }
    }
    (variant, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatValue;

    fn block(size: f64, strength: f64, production: f64, capacity: f64) -> StatBlock {
        let mut stats = StatBlock::new();
        stats.insert(StatKey::Size, StatValue::Number(size));
        stats.insert(StatKey::Strength, StatValue::Number(strength));
        stats.insert(StatKey::ThaumicProduction, StatValue::Number(production));
        stats.insert(
            StatKey::Thaumacyst,
            StatValue::Capacity {
                current: capacity,
                max: capacity,
            },
        );
        stats.insert(StatKey::Lifespan, StatValue::Number(100.0));
        stats
    }

    fn baseline() -> SpeciesBaseline {
        SpeciesBaseline {
            size: 100.0,
            strength: 50.0,
            magic_production: 10.0,
            magic_capacity: 100.0,
        }
    }

    fn lifespan(stats: &StatBlock) -> f64 {
        stats.number(StatKey::Lifespan).expect("lifespan")
    }

    #[test]
    fn ordinary_individuals_have_no_variant() {
        let stats = block(100.0, 50.0, 10.0, 100.0);
        let (variant, out) = classify_variant(Species::Human, Allele::Hu, stats.clone(), &baseline());
        assert_eq!(variant, None);
        assert_eq!(out, stats);
    }

    #[test]
    fn huge_plain_individual_is_giant() {
        let (variant, out) =
            classify_variant(Species::Dragon, Allele::Dr, block(310.0, 50.0, 10.0, 100.0), &baseline());
        assert_eq!(variant, Some(Variant::Giant));
        assert_eq!(lifespan(&out), 300.0);
    }

    #[test]
    fn large_magical_individual_is_titan() {
        let (variant, out) =
            classify_variant(Species::Human, Allele::Hu, block(270.0, 50.0, 13.0, 100.0), &baseline());
        assert_eq!(variant, Some(Variant::Titan));
        assert_eq!(lifespan(&out), 1000.0);
        let (plain, _) =
            classify_variant(Species::Human, Allele::Hu, block(270.0, 50.0, 10.0, 100.0), &baseline());
        assert_eq!(plain, None);
    }

    #[test]
    fn giant_wins_regardless_of_magic() {
        let (variant, _) =
            classify_variant(Species::Human, Allele::Hu, block(310.0, 50.0, 13.0, 400.0), &baseline());
        assert_eq!(variant, Some(Variant::Giant));
    }

    #[test]
    fn oversized_derived_individuals_become_giants() {
        use crate::breeding::Engine;
        use crate::config::SimConfig;
        use rand::SeedableRng;
        use rand_chacha::ChaCha12Rng;

        let engine = Engine::new(SimConfig {
            variation_min: 0.5,
            variation_max: 4.0,
            stat_mutation_rate: 0.0,
            enable_allele_mutation: false,
            ..SimConfig::default()
        })
        .expect("valid config");
        let mut rng = ChaCha12Rng::seed_from_u64(17);
        let mut giants = 0;
        let mut titans = 0;
        for species in [Species::Human, Species::Dragon, Species::Horse] {
            let baseline = engine.baseline(species);
            for _ in 0..500 {
                let genotype = engine.catalog().sample_genotype(species, &mut rng);
                let (variant, stats, _) = engine.phenotype(&genotype, species, &mut rng);
                let size = stats.scalar(StatKey::Size).expect("size");
                let ratio = size / baseline.size;
                match variant {
                    Some(Variant::Giant) => {
                        giants += 1;
                        assert!(ratio >= GIANT_SIZE_RATIO);
                    }
                    Some(Variant::Titan) => {
                        titans += 1;
                        assert!((TITAN_SIZE_RATIO..GIANT_SIZE_RATIO).contains(&ratio));
                    }
                    _ => assert!(ratio < GIANT_SIZE_RATIO),
                }
            }
        }
        assert!(giants > 0, "no giants among oversized individuals");
        assert!(titans > 0, "no titans between 2.5x and 3x");
    }

    #[test]
    fn magical_humans_become_fey() {
        let b = baseline();
        let (small, _) = classify_variant(Species::Human, Allele::Hu, block(55.0, 50.0, 13.0, 0.0), &b);
        let (tall, out) = classify_variant(Species::Centaur, Allele::Hu, block(125.0, 50.0, 0.0, 130.0), &b);
        let (middling, _) = classify_variant(Species::Human, Allele::Hu, block(100.0, 50.0, 13.0, 0.0), &b);
        assert_eq!(small, Some(Variant::Fairy));
        assert_eq!(tall, Some(Variant::Elven));
        assert_eq!(lifespan(&out), 750.0);
        assert_eq!(middling, None);
    }

    #[test]
    fn excluded_species_skip_humanoid_rungs() {
        let b = baseline();
        for species in HUMANOID_EXCLUDED {
            let (fey, _) = classify_variant(species, Allele::Hu, block(55.0, 50.0, 13.0, 0.0), &b);
            let (dwarf, _) = classify_variant(species, Allele::Hu, block(70.0, 70.0, 0.0, 0.0), &b);
            assert_eq!(fey, None);
            assert_eq!(dwarf, None);
        }
    }

    #[test]
    fn short_strong_human_is_dwarven_without_magic() {
        let (variant, out) =
            classify_variant(Species::Human, Allele::Hu, block(75.0, 61.0, 0.0, 0.0), &baseline());
        assert_eq!(variant, Some(Variant::Dwarven));
        assert_eq!(lifespan(&out), 400.0);
    }

    #[test]
    fn small_magical_strong_human_prefers_fairy_over_dwarven() {
        let (variant, _) =
            classify_variant(Species::Human, Allele::Hu, block(50.0, 80.0, 20.0, 0.0), &baseline());
        assert_eq!(variant, Some(Variant::Fairy));
    }

    #[test]
    fn pegasus_gains_magic_without_a_name() {
        let (variant, out) =
            classify_variant(Species::Pegasus, Allele::Ho, block(100.0, 50.0, 13.0, 100.0), &baseline());
        assert_eq!(variant, None);
        assert_eq!(out.number(StatKey::ThaumicProduction), Some(26.0));
        assert_eq!(out.scalar(StatKey::Thaumacyst), Some(300.0));
        assert_eq!(lifespan(&out), 100.0);
    }

    #[test]
    fn magical_horse_is_unicorn() {
        let (variant, out) =
            classify_variant(Species::Horse, Allele::Ho, block(100.0, 50.0, 13.0, 0.0), &baseline());
        assert_eq!(variant, Some(Variant::Unicorn));
        assert_eq!(lifespan(&out), 4000.0);
    }

    #[test]
    fn at_most_one_rung_applies() {
        // Sweep a grid of ratios; the applied outcome must be the first
        // matching rung and lifespan is rescaled at most once.
        let b = baseline();
        for &(species, top) in &[
            (Species::Human, Allele::Hu),
            (Species::Horse, Allele::Ho),
            (Species::Pegasus, Allele::Ho),
            (Species::Dragon, Allele::Dr),
        ] {
            for size in [40.0, 75.0, 100.0, 130.0, 260.0, 320.0] {
                for strength in [40.0, 70.0] {
                    for production in [5.0, 15.0] {
                        let stats = block(size, strength, production, 50.0);
                        let (variant, out) = classify_variant(species, top, stats.clone(), &b);
                        let expected = match variant {
                            Some(v) => 100.0 * v.lifespan_multiplier(),
                            None => 100.0,
                        };
                        assert_eq!(lifespan(&out), expected);
                        let high = is_high_magic(&stats, &b);
                        let subject = Subject {
                            species,
                            top,
                            size_ratio: size / b.size,
                            strength_ratio: strength / b.strength,
                            high_magic: high,
                        };
                        let first = LADDER.iter().copied().find(|r| r.matches(&subject));
                        assert_eq!(variant, first.and_then(|r| r.variant(&subject)));
                    }
                }
            }
        }
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!(Variant::from_name("giant"), Some(Variant::Giant));
        assert_eq!(Variant::from_name(" Unicorn "), Some(Variant::Unicorn));
        assert_eq!(Variant::from_name("gnome"), None);
    }
}
