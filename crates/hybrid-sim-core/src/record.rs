//! Individual records and the store they live in.
//!
//! Records are immutable once derived. Breeding reads two of them and puts a
//! new one; nothing edits a stored record in place.

use crate::catalog::Species;
use crate::genome::Genotype;
use crate::stats::{MutationLog, StatBlock};
use crate::variant::Variant;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where an individual came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Lineage {
    /// Sampled straight from the catalog.
    Original,
    /// Offspring of two species-level representatives.
    SpeciesCross { parents: [Species; 2] },
    /// Offspring of two stored individuals.
    Bred { parents: [String; 2] },
}

impl Lineage {
    pub fn parent_names(&self) -> Vec<String> {
        match self {
            Lineage::Original => Vec::new(),
            Lineage::SpeciesCross { parents } => parents.iter().map(|s| s.to_string()).collect(),
            Lineage::Bred { parents } => parents.to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndividualRecord {
    pub name: String,
    pub genotype: Genotype,
    pub species: Species,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
    pub stats: StatBlock,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mutations: MutationLog,
    pub lineage: Lineage,
}

impl IndividualRecord {
    /// Species label with the variant prefix, e.g. "Giant dragon".
    pub fn display_species(&self) -> String {
        match self.variant {
            Some(v) => format!("{} {}", v.label(), self.species.label()),
            None => self.species.label().to_string(),
        }
    }

    /// Store key for this record.
    pub fn key(&self) -> String {
        store_key(&self.name)
    }
}

/// Lowercased, trimmed lookup key.
pub fn store_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Collection of saved individuals keyed by lowercase name.
///
/// The core only reads and writes through this trait; persistence is the
/// implementor's concern.
pub trait RecordStore {
    fn get(&self, name: &str) -> Option<&IndividualRecord>;

    /// Insert or replace, keyed by the record's lowercase name.
    fn put(&mut self, record: IndividualRecord);

    fn remove(&mut self, name: &str) -> Option<IndividualRecord>;

    /// All records in key order.
    fn values(&self) -> Vec<&IndividualRecord>;

    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// In-memory store backed by an ordered map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    records: BTreeMap<String, IndividualRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_records(self) -> BTreeMap<String, IndividualRecord> {
        self.records
    }
}

impl FromIterator<IndividualRecord> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = IndividualRecord>>(iter: I) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.put(record);
        }
        store
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, name: &str) -> Option<&IndividualRecord> {
        self.records.get(&store_key(name))
    }

    fn put(&mut self, record: IndividualRecord) {
        self.records.insert(record.key(), record);
    }

    fn remove(&mut self, name: &str) -> Option<IndividualRecord> {
        self.records.remove(&store_key(name))
    }

    fn values(&self) -> Vec<&IndividualRecord> {
        self.records.values().collect()
    }

    fn clear(&mut self) {
        self.records.clear();
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
