use anyhow::Context;
use hybrid_sim_core::record::{IndividualRecord, MemoryStore, RecordStore};
use std::fs;
use std::path::{Path, PathBuf};

/// Saved individuals persisted as one pretty-printed JSON object keyed by
/// lowercase name.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    records: MemoryStore,
    dirty: bool,
}

impl FileStore {
    /// Open `path`; a missing file is an empty store.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let records = if path.exists() {
            let data = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("parsing saved individuals in {}", path.display()))?
        } else {
            MemoryStore::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            records,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write back if anything changed since load or the last save.
    pub fn save(&mut self) -> anyhow::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, json).with_context(|| format!("writing {}", self.path.display()))?;
        self.dirty = false;
        Ok(())
    }
}

impl RecordStore for FileStore {
    fn get(&self, name: &str) -> Option<&IndividualRecord> {
        self.records.get(name)
    }

    fn put(&mut self, record: IndividualRecord) {
        self.dirty = true;
        self.records.put(record);
    }

    fn remove(&mut self, name: &str) -> Option<IndividualRecord> {
        let removed = self.records.remove(name);
        self.dirty |= removed.is_some();
        removed
    }

    fn values(&self) -> Vec<&IndividualRecord> {
        self.records.values()
    }

    fn clear(&mut self) {
        self.dirty |= !self.records.is_empty();
        self.records.clear();
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hybrid_sim_core::{Engine, SimConfig, Species};
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hybrid-sim-{tag}-{}.json", std::process::id()))
    }

    #[test]
    fn missing_file_is_empty() {
        let store = FileStore::load(&temp_path("missing")).expect("load");
        assert!(store.is_empty());
    }

    #[test]
    fn saved_records_load_back() {
        let path = temp_path("roundtrip");
        let engine = Engine::new(SimConfig::default()).expect("valid config");
        let mut rng = ChaCha12Rng::seed_from_u64(6);
        let mut store = FileStore::load(&path).expect("load");
        let record = engine.individual_of(Species::Griffin, &store, &mut rng);
        let name = record.name.clone();
        store.put(record);
        store.save().expect("save");

        let reopened = FileStore::load(&path).expect("reload");
        let loaded = reopened.get(&name.to_uppercase()).expect("record by any case");
        assert_eq!(loaded.species, Species::Griffin);
        assert_eq!(loaded.genotype, store.get(&name).expect("original").genotype);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn corrupt_file_reports_its_path() {
        let path = temp_path("corrupt");
        fs::write(&path, "{not json").expect("write");
        let err = FileStore::load(&path).expect_err("corrupt store");
        assert!(format!("{err:#}").contains(&path.display().to_string()));
        fs::remove_file(&path).ok();
    }
}
