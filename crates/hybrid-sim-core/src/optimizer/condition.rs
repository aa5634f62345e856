use crate::catalog::Species;
use crate::record::RecordStore;
use crate::stats::StatKey;
use crate::variant::Variant;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparison {
    pub const ALL: [Comparison; 5] = [
        Comparison::Le,
        Comparison::Ge,
        Comparison::Eq,
        Comparison::Lt,
        Comparison::Gt,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Eq => "==",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.symbol() == symbol.trim())
    }

    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Lt => value < threshold,
            Comparison::Le => value <= threshold,
            Comparison::Gt => value > threshold,
            Comparison::Ge => value >= threshold,
            Comparison::Eq => value == threshold,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Predicate over the record store.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Some record carries this variant.
    VariantExists(Variant),
    /// Some record is exactly this species, without a variant prefix.
    SpeciesExists(Species),
    /// Some record's stat satisfies `stat cmp threshold`.
    Stat {
        stat: StatKey,
        cmp: Comparison,
        threshold: f64,
    },
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::VariantExists(v) => write!(f, "a {v} exists"),
            Condition::SpeciesExists(s) => write!(f, "a {s} exists"),
            Condition::Stat {
                stat,
                cmp,
                threshold,
            } => write!(f, "some {stat} {cmp} {threshold}"),
        }
    }
}

pub fn check_condition(condition: &Condition, store: &dyn RecordStore) -> bool {
    let records = store.values();
    match *condition {
        Condition::VariantExists(variant) => records.iter().any(|r| r.variant == Some(variant)),
        Condition::SpeciesExists(species) => records
            .iter()
            .any(|r| r.species == species && r.variant.is_none()),
        Condition::Stat {
            stat,
            cmp,
            threshold,
        } => records
            .iter()
            .filter_map(|r| r.stats.scalar(stat))
            .any(|v| cmp.holds(v, threshold)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::sample_record;
    use crate::record::MemoryStore;
    use crate::stats::StatValue;

    fn store() -> MemoryStore {
        let mut giant = sample_record("Big Ember", Species::Dragon);
        giant.variant = Some(Variant::Giant);
        giant.stats.insert(StatKey::Size, StatValue::Number(950.0));
        let mut horse = sample_record("Dobbin", Species::Horse);
        horse.stats.insert(StatKey::Size, StatValue::Number(160.0));
        [giant, horse].into_iter().collect()
    }

    #[test]
    fn variant_and_species_conditions() {
        let store = store();
        assert!(check_condition(&Condition::VariantExists(Variant::Giant), &store));
        assert!(!check_condition(&Condition::VariantExists(Variant::Unicorn), &store));
        assert!(check_condition(&Condition::SpeciesExists(Species::Horse), &store));
        // Only a Giant dragon is present.
        assert!(!check_condition(&Condition::SpeciesExists(Species::Dragon), &store));
    }

    #[test]
    fn stat_conditions_compare_against_threshold() {
        let store = store();
        let cond = |cmp, threshold| Condition::Stat {
            stat: StatKey::Size,
            cmp,
            threshold,
        };
        assert!(check_condition(&cond(Comparison::Ge, 950.0), &store));
        assert!(!check_condition(&cond(Comparison::Gt, 950.0), &store));
        assert!(check_condition(&cond(Comparison::Lt, 161.0), &store));
        assert!(check_condition(&cond(Comparison::Eq, 160.0), &store));
        assert!(!check_condition(&cond(Comparison::Le, 100.0), &store));
    }

    #[test]
    fn symbols_parse_longest_first() {
        assert_eq!(Comparison::from_symbol(">="), Some(Comparison::Ge));
        assert_eq!(Comparison::from_symbol("<"), Some(Comparison::Lt));
        assert_eq!(Comparison::from_symbol("=>"), None);
    }
}
