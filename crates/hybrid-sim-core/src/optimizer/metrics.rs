use crate::catalog::Species;
use crate::record::IndividualRecord;
use crate::stats::StatKey;
use serde::{Deserialize, Serialize};

/// min/avg/max of one stat over freshly sampled individuals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaselineStat {
    pub stat: StatKey,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl BaselineStat {
    pub fn from_samples(stat: StatKey, samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self {
                stat,
                min: 0.0,
                avg: 0.0,
                max: 0.0,
            };
        }
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = samples.iter().sum::<f64>() / samples.len() as f64;
        Self { stat, min, avg, max }
    }
}

/// Random baseline of the single target species, recorded at session start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaselineReport {
    pub species: Species,
    pub samples: usize,
    pub stats: Vec<BaselineStat>,
}

impl BaselineReport {
    pub fn get(&self, stat: StatKey) -> Option<&BaselineStat> {
        self.stats.iter().find(|s| s.stat == stat)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GenerationMetrics {
    pub generation: usize,
    pub pairs: usize,
    pub births: usize,
    pub miscarriages: usize,
    pub population_size: usize,
    pub distinct_species: usize,
    pub best_name: Option<String>,
    pub best_score: Vec<f64>,
}

/// A scored individual as reported to callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedIndividual {
    pub name: String,
    pub species: String,
    pub score: Vec<f64>,
    /// Raw objective stat values, in objective order.
    pub values: Vec<(StatKey, f64)>,
}

impl RankedIndividual {
    pub(crate) fn new(record: &IndividualRecord, score: Vec<f64>, stats: &[StatKey]) -> Self {
        Self {
            name: record.name.clone(),
            species: record.display_species(),
            score,
            values: stats
                .iter()
                .map(|&s| (s, record.stats.scalar(s).unwrap_or(0.0)))
                .collect(),
        }
    }

    pub fn value(&self, stat: StatKey) -> Option<f64> {
        self.values.iter().find(|(s, _)| *s == stat).map(|(_, v)| *v)
    }
}

/// Read-only progress snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizerStatus {
    pub generation: usize,
    pub target_generations: usize,
    pub population_size: usize,
    pub best: Option<RankedIndividual>,
    pub last_generation: Option<GenerationMetrics>,
}

impl OptimizerStatus {
    pub fn is_complete(&self) -> bool {
        self.generation >= self.target_generations
    }
}

/// Emitted once when a session finishes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSummary {
    pub generations: usize,
    pub best_overall: Option<RankedIndividual>,
    /// Best individual of the target species when exactly one is named.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_of_target: Option<RankedIndividual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<BaselineReport>,
    #[serde(default)]
    pub history: Vec<GenerationMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_stat_summarises_samples() {
        let stat = BaselineStat::from_samples(StatKey::Strength, &[3.0, 1.0, 2.0]);
        assert_eq!((stat.min, stat.avg, stat.max), (1.0, 2.0, 3.0));
        let empty = BaselineStat::from_samples(StatKey::Strength, &[]);
        assert_eq!(empty.avg, 0.0);
    }

    #[test]
    fn metrics_deserialize_with_missing_fields() {
        let metrics: GenerationMetrics =
            serde_json::from_str(r#"{"generation": 4, "births": 7}"#).expect("valid json");
        assert_eq!(metrics.generation, 4);
        assert_eq!(metrics.births, 7);
        assert!(metrics.best_name.is_none());
    }
}
