//! Breeding calls: parent resolution, bounded retry and record assembly.

use crate::allele::Allele;
use crate::catalog::{PhenotypeCatalog, Species};
use crate::config::{ConfigError, SimConfig};
use crate::error::BreedError;
use crate::genome::{cross, Genotype, MutationModel, Transmission};
use crate::naming::unique_name;
use crate::phenotype::{derive_stats, DerivedStats, SpeciesBaseline};
use crate::record::{IndividualRecord, Lineage, RecordStore};
use crate::stats::{MutationLog, StatBlock};
use crate::variant::{classify_variant, Variant};
use log::debug;
use rand::Rng;

/// One side of a cross.
#[derive(Clone, Copy, Debug)]
pub enum Parent<'a> {
    /// A stored individual; its alleles are passed on verbatim.
    Record(&'a IndividualRecord),
    /// A species representative, resampled every attempt and passed through
    /// the mutation distribution.
    Species(Species),
}

impl Parent<'_> {
    fn label(&self) -> String {
        match self {
            Parent::Record(record) => record.name.clone(),
            Parent::Species(species) => species.label().to_string(),
        }
    }
}

/// Genetics engine: the immutable catalog plus the active configuration.
/// Constructed once and shared by reference.
#[derive(Clone, Debug)]
pub struct Engine {
    catalog: PhenotypeCatalog,
    config: SimConfig,
    mutation: MutationModel,
}

impl Engine {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mutation = if config.enable_allele_mutation {
            MutationModel::from_table()
        } else {
            MutationModel::disabled()
        };
        Ok(Self {
            catalog: PhenotypeCatalog::new(),
            config,
            mutation,
        })
    }

    pub fn catalog(&self) -> &PhenotypeCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn mutation(&self) -> &MutationModel {
        &self.mutation
    }

    pub fn derive<R: Rng + ?Sized>(
        &self,
        species: Species,
        expressed: [Allele; 3],
        rng: &mut R,
    ) -> DerivedStats {
        derive_stats(species, expressed, &self.config, rng)
    }

    pub fn baseline(&self, species: Species) -> SpeciesBaseline {
        SpeciesBaseline::of(species, self.config.thaumacyst_reference_size)
    }

    /// Derive, classify and name an individual. Reads `store` only to keep
    /// the name unique; the record is not inserted.
    pub fn build_record<R: Rng + ?Sized>(
        &self,
        genotype: Genotype,
        species: Species,
        lineage: Lineage,
        store: &dyn RecordStore,
        rng: &mut R,
    ) -> IndividualRecord {
        let (variant, stats, mutations) = self.phenotype(&genotype, species, rng);
        let name = unique_name(Some(species), store, rng);
        IndividualRecord {
            name,
            genotype,
            species,
            variant,
            stats,
            mutations,
            lineage,
        }
    }

    /// Derived and variant-classified stats of `genotype`.
    pub fn phenotype<R: Rng + ?Sized>(
        &self,
        genotype: &Genotype,
        species: Species,
        rng: &mut R,
    ) -> (Option<Variant>, StatBlock, MutationLog) {
        let expressed = self.catalog.expressed(genotype);
        let DerivedStats { stats, mutations } = self.derive(species, expressed, rng);
        let (variant, stats) =
            classify_variant(species, expressed[0], stats, &self.baseline(species));
        (variant, stats, mutations)
    }

    /// Stats of a fresh, unnamed individual of `species`.
    pub fn sample_stats<R: Rng + ?Sized>(&self, species: Species, rng: &mut R) -> StatBlock {
        let genotype = self.catalog.sample_genotype(species, rng);
        self.phenotype(&genotype, species, rng).1
    }

    /// A uniformly random catalog genotype, fully derived.
    pub fn random_individual<R: Rng + ?Sized>(
        &self,
        store: &dyn RecordStore,
        rng: &mut R,
    ) -> IndividualRecord {
        let (genotype, species) = self.catalog.sample_any(rng);
        self.build_record(genotype, species, Lineage::Original, store, rng)
    }

    /// A random genotype of `species`, fully derived.
    pub fn individual_of<R: Rng + ?Sized>(
        &self,
        species: Species,
        store: &dyn RecordStore,
        rng: &mut R,
    ) -> IndividualRecord {
        let genotype = self.catalog.sample_genotype(species, rng);
        self.build_record(genotype, species, Lineage::Original, store, rng)
    }

    /// Cross two species by name.
    pub fn breed_from_species<R: Rng + ?Sized>(
        &self,
        a: &str,
        b: &str,
        store: &dyn RecordStore,
        rng: &mut R,
    ) -> Result<IndividualRecord, BreedError> {
        let a = parse_species(a)?;
        let b = parse_species(b)?;
        self.breed(Parent::Species(a), Parent::Species(b), store, rng)
    }

    /// Cross two stored individuals by name.
    pub fn breed_from_records<R: Rng + ?Sized>(
        &self,
        a: &str,
        b: &str,
        store: &dyn RecordStore,
        rng: &mut R,
    ) -> Result<IndividualRecord, BreedError> {
        let a = store
            .get(a)
            .ok_or_else(|| BreedError::UnknownIndividual(a.to_string()))?;
        let b = store
            .get(b)
            .ok_or_else(|| BreedError::UnknownIndividual(b.to_string()))?;
        self.breed(Parent::Record(a), Parent::Record(b), store, rng)
    }

    /// Resolve each name as a stored individual first, then as a species.
    pub fn breed_named<R: Rng + ?Sized>(
        &self,
        a: &str,
        b: &str,
        store: &dyn RecordStore,
        rng: &mut R,
    ) -> Result<IndividualRecord, BreedError> {
        let a = resolve_parent(a, store)?;
        let b = resolve_parent(b, store)?;
        self.breed(a, b, store, rng)
    }

    /// Retry the cross until the offspring resolves to a known species, up
    /// to `breeding_attempts` times.
    pub fn breed<R: Rng + ?Sized>(
        &self,
        a: Parent<'_>,
        b: Parent<'_>,
        store: &dyn RecordStore,
        rng: &mut R,
    ) -> Result<IndividualRecord, BreedError> {
        let attempts = self.config.breeding_attempts;
        for attempt in 1..=attempts {
            let (genotype_a, via_a) = self.side(a, rng);
            let (genotype_b, via_b) = self.side(b, rng);
            let child = cross((&genotype_a, via_a), (&genotype_b, via_b), rng);
            if let Some(species) = self.catalog.resolve(&child) {
                return Ok(self.build_record(child, species, lineage(a, b), store, rng));
            }
            debug!(
                "cross {} x {} attempt {attempt}/{attempts}: {child} has no species",
                a.label(),
                b.label()
            );
        }
        Err(BreedError::Miscarriage { attempts })
    }

    fn side<R: Rng + ?Sized>(&self, parent: Parent<'_>, rng: &mut R) -> (Genotype, Transmission<'_>) {
        match parent {
            Parent::Record(record) => (record.genotype, Transmission::Verbatim),
            Parent::Species(species) => (
                self.catalog.sample_genotype(species, rng),
                Transmission::Mutating(&self.mutation),
            ),
        }
    }
}

fn parse_species(name: &str) -> Result<Species, BreedError> {
    Species::from_name(name).ok_or_else(|| BreedError::UnknownSpecies(name.to_string()))
}

fn resolve_parent<'s>(name: &str, store: &'s dyn RecordStore) -> Result<Parent<'s>, BreedError> {
    match store.get(name) {
        Some(record) => Ok(Parent::Record(record)),
        None => parse_species(name).map(Parent::Species),
    }
}

fn lineage(a: Parent<'_>, b: Parent<'_>) -> Lineage {
    match (a, b) {
        (Parent::Species(x), Parent::Species(y)) => Lineage::SpeciesCross { parents: [x, y] },
        _ => Lineage::Bred {
            parents: [a.label(), b.label()],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::AllelePair;
    use crate::record::MemoryStore;
    use crate::stats::StatKey;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn engine(config: SimConfig) -> Engine {
        Engine::new(config).expect("valid config")
    }

    fn stored(engine: &Engine, name: &str, genotype: Genotype, store: &mut MemoryStore) {
        let species = engine.catalog().resolve(&genotype).unwrap_or(Species::Human);
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let mut record = engine.build_record(genotype, species, Lineage::Original, &*store, &mut rng);
        record.name = name.to_string();
        store.put(record);
    }

    #[test]
    fn all_human_parents_always_breed_humans() {
        let engine = engine(SimConfig::deterministic());
        let mut store = MemoryStore::new();
        let human = Genotype::homozygous(Allele::Hu, Allele::Hu, Allele::Hu);
        stored(&engine, "Adam", human, &mut store);
        stored(&engine, "Eve", human, &mut store);
        let mut rng = ChaCha12Rng::seed_from_u64(99);
        for _ in 0..200 {
            let child = engine
                .breed_from_records("adam", "eve", &store, &mut rng)
                .expect("viable");
            assert_eq!(child.species, Species::Human);
            assert_eq!(child.genotype, human);
        }
    }

    #[test]
    fn unknown_species_names_are_rejected_without_side_effects() {
        let engine = engine(SimConfig::default());
        let mut store = MemoryStore::new();
        stored(
            &engine,
            "Ember",
            Genotype::homozygous(Allele::Dr, Allele::Dr, Allele::Dr),
            &mut store,
        );
        let before = store.clone();
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let err = engine
            .breed_from_species("unicorn", "kraken", &store, &mut rng)
            .expect_err("no such species");
        assert_eq!(err, BreedError::UnknownSpecies("unicorn".into()));
        assert_eq!(store, before);
    }

    #[test]
    fn missing_individual_is_reported() {
        let engine = engine(SimConfig::default());
        let store = MemoryStore::new();
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        assert_eq!(
            engine.breed_from_records("nobody", "nobody", &store, &mut rng),
            Err(BreedError::UnknownIndividual("nobody".into()))
        );
    }

    #[test]
    fn unresolvable_parents_miscarry_after_bounded_attempts() {
        let engine = engine(SimConfig::deterministic());
        let mut store = MemoryStore::new();
        // Expresses (Fi, Dr, Hu), which is not in the catalog.
        let orphan = Genotype::new(
            AllelePair::homozygous(Allele::Fi),
            AllelePair::homozygous(Allele::Dr),
            AllelePair::homozygous(Allele::Hu),
        );
        stored(&engine, "Odd", orphan, &mut store);
        stored(&engine, "Odder", orphan, &mut store);
        let before = store.clone();
        let mut rng = ChaCha12Rng::seed_from_u64(4);
        assert_eq!(
            engine.breed_from_records("odd", "odder", &store, &mut rng),
            Err(BreedError::Miscarriage { attempts: 10 })
        );
        assert_eq!(store, before);
    }

    #[test]
    fn mixed_parents_resolve_records_before_species() {
        let engine = engine(SimConfig::deterministic());
        let mut store = MemoryStore::new();
        stored(
            &engine,
            "Dragon",
            Genotype::homozygous(Allele::Hu, Allele::Hu, Allele::Hu),
            &mut store,
        );
        let mut rng = ChaCha12Rng::seed_from_u64(8);
        // "dragon" names the stored (human) record, "human" the species.
        let child = engine
            .breed_named("dragon", "human", &store, &mut rng)
            .expect("viable");
        assert_eq!(child.species, Species::Human);
        assert_eq!(
            child.lineage,
            Lineage::Bred {
                parents: ["Dragon".into(), "human".into()]
            }
        );
    }

    #[test]
    fn species_cross_records_lineage_and_full_stats() {
        let engine = engine(SimConfig::default());
        let store = MemoryStore::new();
        let mut rng = ChaCha12Rng::seed_from_u64(21);
        let child = (0..50)
            .find_map(|_| engine.breed_from_species("horse", "bird", &store, &mut rng).ok())
            .expect("a viable cross within 50 tries");
        assert!(matches!(child.lineage, Lineage::SpeciesCross { .. }));
        assert!(child.stats.contains(StatKey::Strength));
        assert!(!child.name.is_empty());
        assert_eq!(engine.catalog().resolve(&child.genotype), Some(child.species));
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = SimConfig {
            breeding_attempts: 0,
            ..SimConfig::default()
        };
        assert!(Engine::new(config).is_err());
    }
}
