//! Genetics of chimeric creatures: a nine-allele, three-locus genome,
//! dominance-based species resolution, stat derivation with variation and
//! mutation, variant classification, and a generational optimizer that
//! breeds toward stat objectives.

pub mod allele;
pub mod breeding;
pub mod catalog;
pub mod config;
pub mod error;
pub mod genome;
pub mod naming;
pub mod optimizer;
pub mod phenotype;
pub mod record;
pub mod stats;
pub mod variant;

pub use allele::{Allele, Diet, Locus};
pub use breeding::{Engine, Parent};
pub use catalog::{PhenotypeCatalog, Species};
pub use config::{ConfigError, SimConfig};
pub use error::{BreedError, OptimizerError};
pub use genome::{AllelePair, Genotype, MutationModel};
pub use optimizer::{
    check_condition, Comparison, Condition, Objective, OptimizerRequest, OptimizerSession,
    OptimizerState, OptimizerSummary, StepOutcome, StepSize,
};
pub use phenotype::{derive_stats, DerivedStats};
pub use record::{IndividualRecord, Lineage, MemoryStore, RecordStore};
pub use stats::{StatBlock, StatKey, StatValue};
pub use variant::{classify_variant, Variant};
