//! Which loci feed each stat, per species.

use crate::allele::{Allele, Locus};
use crate::catalog::Species;
use crate::stats::StatKey;

const NONE: &[Locus] = &[];
const TOP: &[Locus] = &[Locus::Top];
const MID: &[Locus] = &[Locus::Mid];
const BOTTOM: &[Locus] = &[Locus::Bottom];
const MID_BOTTOM: &[Locus] = &[Locus::Mid, Locus::Bottom];
const ALL_LOCI: &[Locus] = &[Locus::Top, Locus::Mid, Locus::Bottom];

/// Stats whose base value comes from source rules, in derivation order.
pub const SOURCED: [StatKey; 23] = [
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
    StatKey::Diet,
    StatKey::VisualField,
    StatKey::VisualAcuity,
    StatKey::SmellStrength,
    StatKey::SmellAcuity,
    StatKey::SmellDistance,
    StatKey::HearingRange,
    StatKey::HearingDistance,
    StatKey::ThaumicProduction,
];

/// Rule shared by most species.
pub fn default_sources(stat: StatKey) -> &'static [Locus] {
    use StatKey::*;
    match stat {
        Iq | Eq | Dexterity | Strength | Bite | Venom | FireBreathing | Diet => TOP,
        LandSpeed | SwimSpeed | JumpHeight | Climbing => BOTTOM,
        VisualField | VisualAcuity | SmellStrength | SmellAcuity | SmellDistance
        | HearingRange | HearingDistance => TOP,
        ThaumicProduction | Thaumacyst => ALL_LOCI,
        FlightSpeed | Petrification | Charm => NONE,
        Size | MaturationAge | Lifespan | GrowthRate | GestationPeriod | LitterSize => NONE,
    }
}

fn species_override(species: Species, stat: StatKey) -> Option<&'static [Locus]> {
    use Species::*;
    use StatKey::*;
    let sources = match (species, stat) {
        (Mermaid, Charm) => BOTTOM,
        (Naga, FlightSpeed) => TOP,
        (Naga, Venom | Charm) => BOTTOM,
        (Harpy, Dexterity | FlightSpeed) => MID,
        (Harpy, LandSpeed | SwimSpeed | JumpHeight) => TOP,
        (Griffin, Strength) => BOTTOM,
        (Griffin, FlightSpeed) => TOP,
        (Chimera, Venom) => BOTTOM,
        (CockatriceBasilisk, Strength | Venom) => BOTTOM,
        (CockatriceBasilisk, FlightSpeed) => TOP,
        (CockatriceBasilisk, Petrification) => MID_BOTTOM,
        (Hippogriff, Strength) => BOTTOM,
        (Hippogriff, FlightSpeed) => TOP,
        (Manticore, Dexterity | Strength | LandSpeed | SwimSpeed | JumpHeight) => MID,
        (Manticore, Venom) => BOTTOM,
        (Pegasus, FlightSpeed) => MID,
        (Bird, FlightSpeed) => TOP,
        (Ipotane, Iq | Eq | Dexterity | Strength | Diet) => MID,
        (Dragon, FlightSpeed) => TOP,
        (Tengu, Iq | Eq | Dexterity | Strength | Diet) => BOTTOM,
        (Tengu, LandSpeed | SwimSpeed | JumpHeight) => BOTTOM,
        (Tengu, FlightSpeed) => MID,
        _ => return None,
    };
    Some(sources)
}

/// Loci whose expressed alleles contribute to `stat` for `species`.
/// An empty slice means no contribution (base 0).
pub fn sources(species: Species, stat: StatKey) -> &'static [Locus] {
    species_override(species, stat).unwrap_or_else(|| default_sources(stat))
}

/// Species that carry one set of head stats per locus allele.
pub fn is_multi_headed(species: Species) -> bool {
    species == Species::Chimera
}

/// Corrective multipliers applied after generic derivation.
pub fn corrective_multipliers(species: Species) -> &'static [(StatKey, f64)] {
    match species {
        Species::SatyrFaun => &[
            (StatKey::Dexterity, 1.5),
            (StatKey::Strength, 1.5),
            (StatKey::Climbing, 1.5),
        ],
        _ => &[],
    }
}

/// Base (maturation age, lifespan) in years.
pub fn lifecycle(species: Species) -> Option<(f64, f64)> {
    use Species::*;
    let entry = match species {
        Human => (18.0, 80.0),
        Centaur => (16.0, 90.0),
        Mermaid => (16.0, 120.0),
        Horse => (4.0, 28.0),
        Hippocampus => (5.0, 40.0),
        Fish => (1.0, 5.0),
        SatyrFaun => (15.0, 110.0),
        Naga => (20.0, 150.0),
        Minotaur => (14.0, 70.0),
        Harpy => (12.0, 60.0),
        Griffin => (8.0, 100.0),
        Chimera => (6.0, 50.0),
        CockatriceBasilisk => (3.0, 30.0),
        Hippogriff => (6.0, 60.0),
        Manticore => (10.0, 90.0),
        Pegasus => (5.0, 60.0),
        Goat => (1.0, 15.0),
        Snake => (3.0, 20.0),
        Bull => (2.0, 20.0),
        Bird => (1.0, 10.0),
        Lion => (4.0, 15.0),
        Ipotane => (10.0, 70.0),
        Dragon => (100.0, 1000.0),
        Tengu => (15.0, 200.0),
    };
    Some(entry)
}

/// Weights of (top, mid, bottom) for gestation period and litter size.
pub const REPRODUCTION_WEIGHTS: [f64; 3] = [0.15, 0.15, 0.70];

/// Per-allele base value of a numeric or flag stat; flags map to 0/1.
pub fn allele_base(stat: StatKey, allele: Allele) -> f64 {
    let p = allele.profile();
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    match stat {
        StatKey::Iq => p.iq,
        StatKey::Eq => p.eq,
        StatKey::Dexterity => p.dexterity,
        StatKey::Strength => p.strength,
        StatKey::LandSpeed => p.land_speed,
        StatKey::SwimSpeed => p.swim_speed,
        StatKey::JumpHeight => p.jump_height,
        StatKey::FlightSpeed => p.flight_speed,
        StatKey::Climbing => p.climbing,
        StatKey::Bite => p.bite,
        StatKey::Venom => flag(p.venom),
        StatKey::FireBreathing => flag(p.fire_breathing),
        StatKey::Petrification => flag(p.petrification),
        StatKey::Charm => flag(p.charm),
        StatKey::Size => p.size,
        StatKey::VisualField => p.senses.visual_field,
        StatKey::VisualAcuity => p.senses.visual_acuity,
        StatKey::SmellStrength => p.senses.smell_strength,
        StatKey::SmellAcuity => p.senses.smell_acuity,
        StatKey::SmellDistance => p.senses.smell_distance,
        StatKey::HearingRange => p.senses.hearing_high_hz,
        StatKey::HearingDistance => p.senses.hearing_distance,
        StatKey::ThaumicProduction => p.magic_production,
        StatKey::Thaumacyst => p.magic_capacity,
        StatKey::GestationPeriod => p.gestation,
        StatKey::LitterSize => p.litter_size,
        StatKey::Diet | StatKey::MaturationAge | StatKey::Lifespan | StatKey::GrowthRate => 0.0,
    }
}

/// Mean of `value` over the expressed alleles at `loci`; 0 when empty.
pub fn mean_over(loci: &[Locus], expressed: [Allele; 3], value: impl Fn(Allele) -> f64) -> f64 {
    if loci.is_empty() {
        return 0.0;
    }
    loci.iter()
        .map(|l| value(expressed[l.index()]))
        .sum::<f64>()
        / loci.len() as f64
}
