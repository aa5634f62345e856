use crate::allele::{Allele, Locus};
use crate::genome::{AllelePair, Genotype};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named phenotype: the creature a triple of expressed alleles resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Human,
    Centaur,
    Mermaid,
    Horse,
    Hippocampus,
    Fish,
    SatyrFaun,
    Naga,
    Minotaur,
    Harpy,
    Griffin,
    Chimera,
    CockatriceBasilisk,
    Hippogriff,
    Manticore,
    Pegasus,
    Goat,
    Snake,
    Bull,
    Bird,
    Lion,
    Ipotane,
    Dragon,
    Tengu,
}

impl Species {
    pub const COUNT: usize = 24;

    pub const ALL: [Species; Self::COUNT] = [
        Species::Human,
        Species::Centaur,
        Species::Mermaid,
        Species::Horse,
        Species::Hippocampus,
        Species::Fish,
        Species::SatyrFaun,
        Species::Naga,
        Species::Minotaur,
        Species::Harpy,
        Species::Griffin,
        Species::Chimera,
        Species::CockatriceBasilisk,
        Species::Hippogriff,
        Species::Manticore,
        Species::Pegasus,
        Species::Goat,
        Species::Snake,
        Species::Bull,
        Species::Bird,
        Species::Lion,
        Species::Ipotane,
        Species::Dragon,
        Species::Tengu,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Centaur => "centaur",
            Self::Mermaid => "mermaid",
            Self::Horse => "horse",
            Self::Hippocampus => "hippocampus",
            Self::Fish => "fish",
            Self::SatyrFaun => "satyr/faun",
            Self::Naga => "naga",
            Self::Minotaur => "minotaur",
            Self::Harpy => "harpy",
            Self::Griffin => "griffin",
            Self::Chimera => "chimera",
            Self::CockatriceBasilisk => "cockatrice/basilisk",
            Self::Hippogriff => "hippogriff",
            Self::Manticore => "manticore",
            Self::Pegasus => "pegasus",
            Self::Goat => "goat",
            Self::Snake => "snake",
            Self::Bull => "bull",
            Self::Bird => "bird",
            Self::Lion => "lion",
            Self::Ipotane => "ipotane",
            Self::Dragon => "dragon",
            Self::Tengu => "tengu",
        }
    }

    /// Expressed (top, mid, bottom) alleles that define this species.
    pub fn triple(self) -> [Allele; 3] {
        use Allele::*;
        match self {
            Self::Human => [Hu, Hu, Hu],
            Self::Centaur => [Hu, Hu, Ho],
            Self::Mermaid => [Hu, Hu, Fi],
            Self::Horse => [Ho, Ho, Ho],
            Self::Hippocampus => [Ho, Ho, Fi],
            Self::Fish => [Fi, Fi, Fi],
            Self::SatyrFaun => [Hu, Hu, Go],
            Self::Naga => [Hu, Hu, Sn],
            Self::Minotaur => [Bu, Hu, Bu],
            Self::Harpy => [Hu, Bi, Bi],
            Self::Griffin => [Bi, Bi, Li],
            Self::Chimera => [Li, Go, Sn],
            Self::CockatriceBasilisk => [Bi, Dr, Sn],
            Self::Hippogriff => [Bi, Bi, Ho],
            Self::Manticore => [Hu, Li, Dr],
            Self::Pegasus => [Ho, Bi, Ho],
            Self::Goat => [Go, Go, Go],
            Self::Snake => [Sn, Sn, Sn],
            Self::Bull => [Bu, Bu, Bu],
            Self::Bird => [Bi, Bi, Bi],
            Self::Lion => [Li, Li, Li],
            Self::Ipotane => [Ho, Hu, Hu],
            Self::Dragon => [Dr, Dr, Dr],
            Self::Tengu => [Bi, Bi, Hu],
        }
    }

    /// Species whose expressed triple is exactly `triple`, if any.
    pub fn from_triple(triple: [Allele; 3]) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.triple() == triple)
    }

    /// Case-insensitive lookup by label; either half of a slashed label
    /// ("satyr", "basilisk") is accepted too.
    pub fn from_name(name: &str) -> Option<Self> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        Self::ALL.iter().copied().find(|s| {
            let label = s.label();
            label == needle || label.split('/').any(|part| part == needle)
        })
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown species '{0}'")]
pub struct UnknownSpecies(pub String);

impl FromStr for Species {
    type Err = UnknownSpecies;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownSpecies(s.to_string()))
    }
}

/// Immutable genetics tables built once at startup: per-locus dominance
/// orders and the enumeration of every canonical genotype that resolves to a
/// known species.
#[derive(Clone, Debug)]
pub struct PhenotypeCatalog {
    dominance: [[Allele; Allele::COUNT]; 3],
    by_species: Vec<Vec<Genotype>>,
    all: Vec<(Genotype, Species)>,
}

impl PhenotypeCatalog {
    pub fn new() -> Self {
        let dominance = Locus::ALL.map(dominance_order);
        let mut catalog = Self {
            dominance,
            by_species: vec![Vec::new(); Species::COUNT],
            all: Vec::new(),
        };

        let pairs = AllelePair::all();
        for &top in &pairs {
            for &mid in &pairs {
                for &bottom in &pairs {
                    let genotype = Genotype::new(top, mid, bottom);
                    if let Some(species) = catalog.resolve(&genotype) {
                        catalog.by_species[species.index()].push(genotype);
                        catalog.all.push((genotype, species));
                    }
                }
            }
        }
        catalog
    }

    /// All alleles, most dominant first, for `locus`.
    pub fn dominance_order(&self, locus: Locus) -> &[Allele; Allele::COUNT] {
        &self.dominance[locus.index()]
    }

    /// The allele of `pair` ranked highest in `locus`'s dominance order.
    pub fn express(&self, pair: AllelePair, locus: Locus) -> Allele {
        self.dominance_order(locus)
            .iter()
            .copied()
            .find(|&a| pair.contains(a))
            .unwrap_or(pair.alleles()[0])
    }

    /// Expressed (top, mid, bottom) alleles of `genotype`.
    pub fn expressed(&self, genotype: &Genotype) -> [Allele; 3] {
        Locus::ALL.map(|locus| self.express(genotype.pair(locus), locus))
    }

    /// Species the genotype expresses, or `None` when the expressed triple is
    /// not in the catalog.
    pub fn resolve(&self, genotype: &Genotype) -> Option<Species> {
        Species::from_triple(self.expressed(genotype))
    }

    /// Every canonical genotype that resolves to `species`.
    pub fn genotypes(&self, species: Species) -> &[Genotype] {
        &self.by_species[species.index()]
    }

    /// Every (genotype, species) pair with a known species.
    pub fn all_genotypes(&self) -> &[(Genotype, Species)] {
        &self.all
    }

    /// A representative genotype of `species`, uniform over its enumeration.
    pub fn sample_genotype<R: Rng + ?Sized>(&self, species: Species, rng: &mut R) -> Genotype {
        let options = self.genotypes(species);
        options
            .choose(rng)
            .copied()
            .unwrap_or_else(|| {
                let [t, m, b] = species.triple();
                Genotype::homozygous(t, m, b)
            })
    }

    /// A uniformly random entry of the full enumeration.
    pub fn sample_any<R: Rng + ?Sized>(&self, rng: &mut R) -> (Genotype, Species) {
        self.all.choose(rng).copied().unwrap_or_else(|| {
            let [t, m, b] = Species::Human.triple();
            (Genotype::homozygous(t, m, b), Species::Human)
        })
    }
}

impl Default for PhenotypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Rank alleles by how many catalog species use them at `locus`, most first;
/// ties keep canonical allele order.
fn dominance_order(locus: Locus) -> [Allele; Allele::COUNT] {
    let mut counts = [0usize; Allele::COUNT];
    for species in Species::ALL {
        counts[species.triple()[locus.index()].index()] += 1;
    }
    let mut order = Allele::ALL;
    order.sort_by(|a, b| {
        counts[b.index()]
            .cmp(&counts[a.index()])
            .then(a.index().cmp(&b.index()))
    });
    order
}
