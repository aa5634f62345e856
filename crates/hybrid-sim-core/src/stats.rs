use crate::allele::{Allele, Diet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Every stat an individual can carry. The display label is attached to the
/// variant; control flow never branches on the label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatKey {
    Iq,
    Eq,
    Dexterity,
    Strength,
    LandSpeed,
    SwimSpeed,
    JumpHeight,
    FlightSpeed,
    Climbing,
    Bite,
    Venom,
    FireBreathing,
    Petrification,
    Charm,
    Size,
    Diet,
    VisualField,
    VisualAcuity,
    SmellStrength,
    SmellAcuity,
    SmellDistance,
    HearingRange,
    HearingDistance,
    ThaumicProduction,
    Thaumacyst,
    MaturationAge,
    Lifespan,
    GrowthRate,
    GestationPeriod,
    LitterSize,
}

impl StatKey {
    pub const ALL: [StatKey; 30] = [
        StatKey::Iq,
        StatKey::Eq,
        StatKey::Dexterity,
        StatKey::Strength,
        StatKey::LandSpeed,
        StatKey::SwimSpeed,
        StatKey::JumpHeight,
        StatKey::FlightSpeed,
        StatKey::Climbing,
        StatKey::Bite,
        StatKey::Venom,
        StatKey::FireBreathing,
        StatKey::Petrification,
        StatKey::Charm,
        StatKey::Size,
        StatKey::Diet,
        StatKey::VisualField,
        StatKey::VisualAcuity,
        StatKey::SmellStrength,
        StatKey::SmellAcuity,
        StatKey::SmellDistance,
        StatKey::HearingRange,
        StatKey::HearingDistance,
        StatKey::ThaumicProduction,
        StatKey::Thaumacyst,
        StatKey::MaturationAge,
        StatKey::Lifespan,
        StatKey::GrowthRate,
        StatKey::GestationPeriod,
        StatKey::LitterSize,
    ];

    /// Stats a three-headed creature carries once per head.
    pub const HEAD: [StatKey; 10] = [
        StatKey::Iq,
        StatKey::Eq,
        StatKey::Diet,
        StatKey::VisualField,
        StatKey::VisualAcuity,
        StatKey::SmellStrength,
        StatKey::SmellAcuity,
        StatKey::SmellDistance,
        StatKey::HearingRange,
        StatKey::HearingDistance,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Iq => "IQ",
            Self::Eq => "EQ",
            Self::Dexterity => "Dexterity",
            Self::Strength => "Strength",
            Self::LandSpeed => "Land Speed",
            Self::SwimSpeed => "Swim Speed",
            Self::JumpHeight => "Jump Height",
            Self::FlightSpeed => "Flight Speed",
            Self::Climbing => "Climbing",
            Self::Bite => "Bite",
            Self::Venom => "Venom",
            Self::FireBreathing => "Fire Breathing",
            Self::Petrification => "Petrification",
            Self::Charm => "Charm",
            Self::Size => "Size",
            Self::Diet => "Diet",
            Self::VisualField => "Visual Field",
            Self::VisualAcuity => "Visual Acuity",
            Self::SmellStrength => "Smell Strength",
            Self::SmellAcuity => "Smell Acuity",
            Self::SmellDistance => "Smell Distance",
            Self::HearingRange => "Hearing Range",
            Self::HearingDistance => "Hearing Distance",
            Self::ThaumicProduction => "Thaumic Production",
            Self::Thaumacyst => "Thaumacyst",
            Self::MaturationAge => "Maturation Age",
            Self::Lifespan => "Lifespan",
            Self::GrowthRate => "Growth Rate",
            Self::GestationPeriod => "Gestation Period",
            Self::LitterSize => "Litter Size",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Iq => " IQ",
            Self::Eq => " EQ",
            Self::Dexterity => " (unitless)",
            Self::Strength => " kg",
            Self::LandSpeed | Self::SwimSpeed | Self::FlightSpeed | Self::Climbing => " km/h",
            Self::JumpHeight => " m",
            Self::Bite => " psi",
            Self::Size => " cm",
            Self::VisualField => " deg",
            Self::SmellStrength => "M receptors",
            Self::SmellDistance | Self::HearingDistance => " m",
            Self::HearingRange => " Hz",
            Self::ThaumicProduction => " thaums/day",
            Self::Thaumacyst => " thaums",
            Self::MaturationAge | Self::Lifespan => " years",
            Self::GrowthRate => " cm/year",
            Self::GestationPeriod => " days",
            Self::Venom
            | Self::FireBreathing
            | Self::Petrification
            | Self::Charm
            | Self::Diet
            | Self::VisualAcuity
            | Self::SmellAcuity
            | Self::LitterSize => "",
        }
    }

    pub fn is_flag(self) -> bool {
        matches!(
            self,
            Self::Venom | Self::FireBreathing | Self::Petrification | Self::Charm
        )
    }

    pub fn is_head_stat(self) -> bool {
        Self::HEAD.contains(&self)
    }

    /// Lookup by label, ignoring case, spaces and underscores
    /// ("land speed", "LandSpeed", "land_speed").
    pub fn from_name(name: &str) -> Option<Self> {
        let squash = |s: &str| {
            s.chars()
                .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
                .collect::<String>()
                .to_lowercase()
        };
        let needle = squash(name);
        Self::ALL.iter().copied().find(|k| squash(k.label()) == needle)
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Round to three decimals, the precision every derived number is kept at.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Structured stat value. Composite shapes keep their numbers; the
/// "current/max", "cpd, 20/x" and "lo-hi" strings only exist in `Display`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatValue {
    Number(f64),
    Flag(bool),
    Capacity { current: f64, max: f64 },
    Acuity { cpd: f64 },
    Range { low: f64, high: f64 },
    Diet(Diet),
}

impl StatValue {
    /// Numeric component used for scoring and threshold checks.
    pub fn scalar(&self) -> Option<f64> {
        match *self {
            Self::Number(v) => Some(v),
            Self::Flag(b) => Some(if b { 1.0 } else { 0.0 }),
            Self::Capacity { max, .. } => Some(max),
            Self::Acuity { cpd } => Some(cpd),
            Self::Range { high, .. } => Some(high),
            Self::Diet(_) => None,
        }
    }

    /// Multiply every numeric component by `factor`. Flags and diets are
    /// left untouched.
    pub fn scaled(self, factor: f64) -> Self {
        match self {
            Self::Number(v) => Self::Number(round3(v * factor)),
            Self::Capacity { current, max } => Self::Capacity {
                current: round3(current * factor),
                max: round3(max * factor),
            },
            Self::Acuity { cpd } => Self::Acuity {
                cpd: round3(cpd * factor),
            },
            Self::Range { low, high } => Self::Range {
                low: round3(low * factor),
                high: round3(high * factor),
            },
            other @ (Self::Flag(_) | Self::Diet(_)) => other,
        }
    }

    /// Snellen denominator for an acuity in cycles per degree (30 cpd = 20/20).
    pub fn snellen_denominator(cpd: f64) -> f64 {
        if cpd <= 0.0 {
            return f64::INFINITY;
        }
        (600.0 / cpd).round()
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Number(v) => write!(f, "{}", round3(v)),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Capacity { current, max } => write!(f, "{}/{}", round3(current), round3(max)),
            Self::Acuity { cpd } => write!(
                f,
                "{} cpd, 20/{}",
                round3(cpd),
                Self::snellen_denominator(cpd)
            ),
            Self::Range { low, high } => write!(f, "{}-{}", round3(low), round3(high)),
            Self::Diet(d) => f.write_str(d.as_str()),
        }
    }
}

/// Head-specific stats of one head of a multi-headed creature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeadStats {
    pub allele: Allele,
    pub values: BTreeMap<StatKey, StatValue>,
}

impl HeadStats {
    pub fn label(&self, key: StatKey) -> String {
        format!("{} Head {}", self.allele.archetype(), key.label())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    values: BTreeMap<StatKey, StatValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    heads: Vec<HeadStats>,
}

impl StatBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: StatKey, value: StatValue) {
        self.values.insert(key, value);
    }

    pub fn push_head(&mut self, head: HeadStats) {
        self.heads.push(head);
    }

    pub fn get(&self, key: StatKey) -> Option<&StatValue> {
        self.values.get(&key)
    }

    pub fn get_mut(&mut self, key: StatKey) -> Option<&mut StatValue> {
        self.values.get_mut(&key)
    }

    pub fn contains(&self, key: StatKey) -> bool {
        self.values.contains_key(&key) || self.heads.iter().any(|h| h.values.contains_key(&key))
    }

    pub fn number(&self, key: StatKey) -> Option<f64> {
        match self.values.get(&key) {
            Some(StatValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn flag(&self, key: StatKey) -> Option<bool> {
        match self.values.get(&key) {
            Some(StatValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view of `key`. Head stats of a multi-headed creature
    /// report the mean over its heads.
    pub fn scalar(&self, key: StatKey) -> Option<f64> {
        if let Some(v) = self.values.get(&key) {
            return v.scalar();
        }
        let head_values: Vec<f64> = self
            .heads
            .iter()
            .filter_map(|h| h.values.get(&key).and_then(StatValue::scalar))
            .collect();
        if head_values.is_empty() {
            None
        } else {
            Some(head_values.iter().sum::<f64>() / head_values.len() as f64)
        }
    }

    /// Multiply a stat in place; missing keys are ignored.
    pub fn scale(&mut self, key: StatKey, factor: f64) {
        if let Some(v) = self.values.get_mut(&key) {
            *v = v.scaled(factor);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKey, &StatValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn heads(&self) -> &[HeadStats] {
        &self.heads
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.heads.is_empty()
    }
}

/// Stat label -> human-readable description of a point mutation.
pub type MutationLog = BTreeMap<String, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_back() {
        for key in StatKey::ALL {
            assert_eq!(StatKey::from_name(key.label()), Some(key));
        }
        assert_eq!(StatKey::from_name("land_speed"), Some(StatKey::LandSpeed));
        assert_eq!(StatKey::from_name("FIRE BREATHING"), Some(StatKey::FireBreathing));
        assert_eq!(StatKey::from_name("charisma"), None);
    }

    #[test]
    fn composite_values_render_from_structured_data() {
        let cap = StatValue::Capacity {
            current: 40.5,
            max: 50.0,
        };
        assert_eq!(cap.to_string(), "40.5/50");
        assert_eq!(cap.scalar(), Some(50.0));

        let acuity = StatValue::Acuity { cpd: 30.0 };
        assert_eq!(acuity.to_string(), "30 cpd, 20/20");
        assert_eq!(acuity.scalar(), Some(30.0));

        let range = StatValue::Range {
            low: 20.0,
            high: 20_000.0,
        };
        assert_eq!(range.to_string(), "20-20000");
        assert_eq!(range.scalar(), Some(20_000.0));
    }

    #[test]
    fn scaling_leaves_flags_alone() {
        assert_eq!(StatValue::Flag(true).scaled(3.0), StatValue::Flag(true));
        assert_eq!(StatValue::Number(2.0).scaled(1.5), StatValue::Number(3.0));
    }

    #[test]
    fn head_stats_report_mean_scalar() {
        let mut block = StatBlock::new();
        for (allele, iq) in [(Allele::Li, 70.0), (Allele::Go, 60.0), (Allele::Sn, 20.0)] {
            let mut values = BTreeMap::new();
            values.insert(StatKey::Iq, StatValue::Number(iq));
            block.push_head(HeadStats { allele, values });
        }
        assert_eq!(block.scalar(StatKey::Iq), Some(50.0));
        assert!(block.contains(StatKey::Iq));
        assert_eq!(block.heads()[0].label(StatKey::Iq), "Lion Head IQ");
    }
}
