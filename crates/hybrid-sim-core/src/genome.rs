use crate::allele::{Allele, Locus};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unordered pair of alleles at one locus, stored sorted so that (A,B) and
/// (B,A) compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AllelePair([Allele; 2]);

impl AllelePair {
    /// Number of distinct canonical pairs (9 choose 2 with repetition).
    pub const COUNT: usize = Allele::COUNT * (Allele::COUNT + 1) / 2;

    pub fn new(a: Allele, b: Allele) -> Self {
        if a <= b {
            Self([a, b])
        } else {
            Self([b, a])
        }
    }

    pub fn homozygous(allele: Allele) -> Self {
        Self([allele, allele])
    }

    pub fn alleles(&self) -> [Allele; 2] {
        self.0
    }

    pub fn contains(&self, allele: Allele) -> bool {
        self.0[0] == allele || self.0[1] == allele
    }

    pub fn is_homozygous(&self) -> bool {
        self.0[0] == self.0[1]
    }

    /// Every canonical pair, in canonical order.
    pub fn all() -> Vec<AllelePair> {
        let mut pairs = Vec::with_capacity(Self::COUNT);
        for (i, &a) in Allele::ALL.iter().enumerate() {
            for &b in &Allele::ALL[i..] {
                pairs.push(Self([a, b]));
            }
        }
        pairs
    }
}

impl fmt::Display for AllelePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0[0], self.0[1])
    }
}

/// The three locus pairs of an individual.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Genotype {
    pub top: AllelePair,
    pub mid: AllelePair,
    pub bottom: AllelePair,
}

impl Genotype {
    pub fn new(top: AllelePair, mid: AllelePair, bottom: AllelePair) -> Self {
        Self { top, mid, bottom }
    }

    pub fn homozygous(top: Allele, mid: Allele, bottom: Allele) -> Self {
        Self::new(
            AllelePair::homozygous(top),
            AllelePair::homozygous(mid),
            AllelePair::homozygous(bottom),
        )
    }

    pub fn pair(&self, locus: Locus) -> AllelePair {
        match locus {
            Locus::Top => self.top,
            Locus::Mid => self.mid,
            Locus::Bottom => self.bottom,
        }
    }

    fn pair_mut(&mut self, locus: Locus) -> &mut AllelePair {
        match locus {
            Locus::Top => &mut self.top,
            Locus::Mid => &mut self.mid,
            Locus::Bottom => &mut self.bottom,
        }
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "top {} / mid {} / bottom {}",
            self.top, self.mid, self.bottom
        )
    }
}

/// Per-allele point-mutation model used when an allele is transmitted.
///
/// Transmitting allele `a` keeps it with probability `1 - rate(a)` and
/// otherwise yields one of the other `K - 1` alleles uniformly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MutationModel {
    rates: [f64; Allele::COUNT],
}

impl MutationModel {
    /// Rates taken from the allele table.
    pub fn from_table() -> Self {
        let mut rates = [0.0; Allele::COUNT];
        for allele in Allele::ALL {
            rates[allele.index()] = allele.profile().mutation_rate;
        }
        Self { rates }
    }

    /// Every allele transmits as itself.
    pub fn disabled() -> Self {
        Self {
            rates: [0.0; Allele::COUNT],
        }
    }

    pub fn with_rates(rates: [f64; Allele::COUNT]) -> Self {
        debug_assert!(
            rates.iter().all(|r| (0.0..=1.0).contains(r)),
            "mutation rates must be probabilities"
        );
        Self { rates }
    }

    pub fn rate(&self, allele: Allele) -> f64 {
        self.rates[allele.index()]
    }

    /// Probability that transmitting `from` yields `to`.
    pub fn probability(&self, from: Allele, to: Allele) -> f64 {
        let rate = self.rate(from);
        if from == to {
            1.0 - rate
        } else {
            rate / (Allele::COUNT - 1) as f64
        }
    }

    /// Draw from `allele`'s mutation distribution.
    pub fn transmit<R: Rng + ?Sized>(&self, allele: Allele, rng: &mut R) -> Allele {
        let rate = self.rate(allele);
        if rate <= 0.0 || rng.random::<f64>() >= rate {
            return allele;
        }
        let mut idx = rng.random_range(0..Allele::COUNT - 1);
        if idx >= allele.index() {
            idx += 1;
        }
        Allele::ALL[idx]
    }

    /// Pick one allele of `pair` uniformly, then pass it through its
    /// mutation distribution.
    pub fn inherit<R: Rng + ?Sized>(&self, pair: AllelePair, rng: &mut R) -> Allele {
        let chosen = pick(pair, rng);
        self.transmit(chosen, rng)
    }
}

impl Default for MutationModel {
    fn default() -> Self {
        Self::from_table()
    }
}

/// How parental alleles reach the offspring.
#[derive(Clone, Copy, Debug)]
pub enum Transmission<'a> {
    /// Stored allele is passed on unchanged.
    Verbatim,
    /// Stored allele goes through the mutation distribution first.
    Mutating(&'a MutationModel),
}

impl Transmission<'_> {
    /// One allele of `pair` as it reaches the offspring.
    pub fn pass_on<R: Rng + ?Sized>(self, pair: AllelePair, rng: &mut R) -> Allele {
        match self {
            Transmission::Verbatim => pick(pair, rng),
            Transmission::Mutating(model) => model.inherit(pair, rng),
        }
    }
}

fn pick<R: Rng + ?Sized>(pair: AllelePair, rng: &mut R) -> Allele {
    pair.alleles()[rng.random_range(0..2)]
}

/// Produce an offspring genotype: per locus, one transmitted allele from
/// each parent, independently of the other loci.
pub fn breed<R: Rng + ?Sized>(
    a: &Genotype,
    b: &Genotype,
    transmission: Transmission<'_>,
    rng: &mut R,
) -> Genotype {
    cross((a, transmission), (b, transmission), rng)
}

/// Like [`breed`], but each parent carries its own transmission rule.
pub fn cross<R: Rng + ?Sized>(
    (a, via_a): (&Genotype, Transmission<'_>),
    (b, via_b): (&Genotype, Transmission<'_>),
    rng: &mut R,
) -> Genotype {
    let mut child = *a;
    for locus in Locus::ALL {
        let from_a = via_a.pass_on(a.pair(locus), rng);
        let from_b = via_b.pass_on(b.pair(locus), rng);
        *child.pair_mut(locus) = AllelePair::new(from_a, from_b);
    }
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn pairs_are_canonical() {
        assert_eq!(
            AllelePair::new(Allele::Dr, Allele::Hu),
            AllelePair::new(Allele::Hu, Allele::Dr)
        );
        assert_eq!(
            AllelePair::new(Allele::Dr, Allele::Hu).alleles(),
            [Allele::Hu, Allele::Dr]
        );
    }

    #[test]
    fn all_pairs_enumerates_combinations_with_replacement() {
        let pairs = AllelePair::all();
        assert_eq!(pairs.len(), AllelePair::COUNT);
        assert_eq!(pairs.len(), 45);
        let mut sorted = pairs.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 45, "no duplicate pairs");
    }

    #[test]
    fn mutation_distribution_sums_to_one() {
        let model = MutationModel::with_rates([0.3; Allele::COUNT]);
        for from in Allele::ALL {
            let total: f64 = Allele::ALL.iter().map(|&to| model.probability(from, to)).sum();
            assert!((total - 1.0).abs() < 1e-12, "{from}: {total}");
        }
    }

    #[test]
    fn homozygous_inheritance_keeps_allele_at_one_minus_rate() {
        let rate = 0.2;
        let mut rates = [0.0; Allele::COUNT];
        rates[Allele::Fi.index()] = rate;
        let model = MutationModel::with_rates(rates);
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        let trials = 20_000;
        let kept = (0..trials)
            .filter(|_| model.inherit(AllelePair::homozygous(Allele::Fi), &mut rng) == Allele::Fi)
            .count();
        let freq = kept as f64 / trials as f64;
        assert!((freq - (1.0 - rate)).abs() < 0.02, "kept frequency {freq}");
    }

    #[test]
    fn mutated_alleles_never_equal_the_source() {
        let model = MutationModel::with_rates([1.0; Allele::COUNT]);
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        for allele in Allele::ALL {
            for _ in 0..50 {
                assert_ne!(model.transmit(allele, &mut rng), allele);
            }
        }
    }

    #[test]
    fn disabled_model_is_identity() {
        let model = MutationModel::disabled();
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        for allele in Allele::ALL {
            assert_eq!(model.transmit(allele, &mut rng), allele);
        }
    }

    #[test]
    fn breeding_is_deterministic_for_fixed_seed() {
        let a = Genotype::new(
            AllelePair::new(Allele::Hu, Allele::Bi),
            AllelePair::new(Allele::Ho, Allele::Li),
            AllelePair::new(Allele::Sn, Allele::Fi),
        );
        let b = Genotype::homozygous(Allele::Dr, Allele::Go, Allele::Bu);
        let model = MutationModel::from_table();
        let mut rng_a = ChaCha12Rng::seed_from_u64(123);
        let mut rng_b = ChaCha12Rng::seed_from_u64(123);
        for _ in 0..20 {
            assert_eq!(
                breed(&a, &b, Transmission::Mutating(&model), &mut rng_a),
                breed(&a, &b, Transmission::Mutating(&model), &mut rng_b)
            );
        }
    }

    #[test]
    fn verbatim_offspring_only_carry_parental_alleles() {
        let a = Genotype::new(
            AllelePair::new(Allele::Hu, Allele::Bi),
            AllelePair::new(Allele::Ho, Allele::Li),
            AllelePair::new(Allele::Sn, Allele::Fi),
        );
        let b = Genotype::homozygous(Allele::Dr, Allele::Go, Allele::Bu);
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        for _ in 0..200 {
            let child = breed(&a, &b, Transmission::Verbatim, &mut rng);
            for locus in Locus::ALL {
                let [x, y] = child.pair(locus).alleles();
                let parental = [a.pair(locus).alleles(), b.pair(locus).alleles()].concat();
                assert!(parental.contains(&x) && parental.contains(&y));
                assert!(
                    b.pair(locus).contains(x) || b.pair(locus).contains(y),
                    "one allele from each parent"
                );
            }
        }
    }

    #[test]
    fn top_locus_follows_parental_top_alleles_only() {
        // Top pairs are both (Hu, Bi); mid/bottom differ wildly.
        let a = Genotype::new(
            AllelePair::new(Allele::Hu, Allele::Bi),
            AllelePair::homozygous(Allele::Fi),
            AllelePair::homozygous(Allele::Sn),
        );
        let b = Genotype::new(
            AllelePair::new(Allele::Hu, Allele::Bi),
            AllelePair::homozygous(Allele::Dr),
            AllelePair::homozygous(Allele::Li),
        );
        let model = MutationModel::disabled();
        let mut rng = ChaCha12Rng::seed_from_u64(2024);
        let trials = 8_000;
        let mut homo_hu = 0usize;
        let mut hetero = 0usize;
        for _ in 0..trials {
            let child = breed(&a, &b, Transmission::Mutating(&model), &mut rng);
            if child.top == AllelePair::homozygous(Allele::Hu) {
                homo_hu += 1;
            } else if child.top == AllelePair::new(Allele::Hu, Allele::Bi) {
                hetero += 1;
            }
        }
        let homo_freq = homo_hu as f64 / trials as f64;
        let hetero_freq = hetero as f64 / trials as f64;
        assert!((homo_freq - 0.25).abs() < 0.03, "Hu/Hu {homo_freq}");
        assert!((hetero_freq - 0.5).abs() < 0.03, "Hu/Bi {hetero_freq}");
    }
}
