use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the nine archetype symbols an individual can carry at a locus.
///
/// Variant order is the canonical allele order; it is used as the dominance
/// tiebreak and as the sort key for canonical pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Allele {
    Hu,
    Ho,
    Fi,
    Go,
    Sn,
    Bu,
    Bi,
    Li,
    Dr,
}

impl Allele {
    pub const COUNT: usize = 9;

    pub const ALL: [Allele; Self::COUNT] = [
        Allele::Hu,
        Allele::Ho,
        Allele::Fi,
        Allele::Go,
        Allele::Sn,
        Allele::Bu,
        Allele::Bi,
        Allele::Li,
        Allele::Dr,
    ];

    /// Position in the canonical allele list.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Hu => "Hu",
            Self::Ho => "Ho",
            Self::Fi => "Fi",
            Self::Go => "Go",
            Self::Sn => "Sn",
            Self::Bu => "Bu",
            Self::Bi => "Bi",
            Self::Li => "Li",
            Self::Dr => "Dr",
        }
    }

    /// Archetype name, used for head labels ("Lion Head IQ").
    pub fn archetype(self) -> &'static str {
        match self {
            Self::Hu => "Human",
            Self::Ho => "Horse",
            Self::Fi => "Fish",
            Self::Go => "Goat",
            Self::Sn => "Snake",
            Self::Bu => "Bull",
            Self::Bi => "Bird",
            Self::Li => "Lion",
            Self::Dr => "Dragon",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.symbol().eq_ignore_ascii_case(symbol))
    }

    /// Static base data for this allele.
    pub fn profile(self) -> &'static AlleleProfile {
        &ALLELE_TABLE[self.index()]
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Gene position. Each individual carries one unordered allele pair per locus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locus {
    Top,
    Mid,
    Bottom,
}

impl Locus {
    pub const ALL: [Locus; 3] = [Locus::Top, Locus::Mid, Locus::Bottom];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Mid => "mid",
            Self::Bottom => "bottom",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diet {
    Herbivore,
    Omnivore,
    Carnivore,
}

impl Diet {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Herbivore => "herbivore",
            Self::Omnivore => "omnivore",
            Self::Carnivore => "carnivore",
        }
    }
}

/// Sense-organ base values contributed by an allele's head.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SenseProfile {
    /// Degrees of horizontal visual field.
    pub visual_field: f64,
    /// Cycles per degree.
    pub visual_acuity: f64,
    /// Millions of olfactory receptors.
    pub smell_strength: f64,
    /// Discrimination index, 0-100.
    pub smell_acuity: f64,
    /// Metres.
    pub smell_distance: f64,
    pub hearing_low_hz: f64,
    pub hearing_high_hz: f64,
    /// Metres.
    pub hearing_distance: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlleleProfile {
    pub allele: Allele,
    pub mutation_rate: f64,
    pub iq: f64,
    pub eq: f64,
    pub dexterity: f64,
    pub strength: f64,
    pub land_speed: f64,
    pub swim_speed: f64,
    pub jump_height: f64,
    pub flight_speed: f64,
    pub climbing: f64,
    pub bite: f64,
    pub venom: bool,
    pub fire_breathing: bool,
    pub petrification: bool,
    pub charm: bool,
    /// Centimetres.
    pub size: f64,
    pub diet: Diet,
    pub senses: SenseProfile,
    /// Thaums per day.
    pub magic_production: f64,
    /// Thaumacyst capacity in thaums at the reference size.
    pub magic_capacity: f64,
    /// Days.
    pub gestation: f64,
    pub litter_size: f64,
}

const fn senses(
    visual_field: f64,
    visual_acuity: f64,
    smell_strength: f64,
    smell_acuity: f64,
    smell_distance: f64,
    hearing_low_hz: f64,
    hearing_high_hz: f64,
    hearing_distance: f64,
) -> SenseProfile {
    SenseProfile {
        visual_field,
        visual_acuity,
        smell_strength,
        smell_acuity,
        smell_distance,
        hearing_low_hz,
        hearing_high_hz,
        hearing_distance,
    }
}

pub static ALLELE_TABLE: [AlleleProfile; Allele::COUNT] = [
    AlleleProfile {
        allele: Allele::Hu,
        mutation_rate: 1e-6,
        iq: 100.0,
        eq: 90.0,
        dexterity: 85.0,
        strength: 60.0,
        land_speed: 8.0,
        swim_speed: 3.0,
        jump_height: 0.6,
        flight_speed: 0.0,
        climbing: 2.0,
        bite: 200.0,
        venom: false,
        fire_breathing: false,
        petrification: false,
        charm: false,
        size: 170.0,
        diet: Diet::Omnivore,
        senses: senses(180.0, 30.0, 6.0, 10.0, 10.0, 20.0, 20_000.0, 100.0),
        magic_production: 5.0,
        magic_capacity: 50.0,
        gestation: 270.0,
        litter_size: 1.0,
    },
    AlleleProfile {
        allele: Allele::Ho,
        mutation_rate: 1e-6,
        iq: 50.0,
        eq: 40.0,
        dexterity: 50.0,
        strength: 200.0,
        land_speed: 45.0,
        swim_speed: 8.0,
        jump_height: 1.2,
        flight_speed: 0.0,
        climbing: 1.0,
        bite: 350.0,
        venom: false,
        fire_breathing: false,
        petrification: false,
        charm: false,
        size: 160.0,
        diet: Diet::Herbivore,
        senses: senses(350.0, 20.0, 100.0, 40.0, 500.0, 55.0, 33_500.0, 400.0),
        magic_production: 2.0,
        magic_capacity: 20.0,
        gestation: 340.0,
        litter_size: 1.0,
    },
    AlleleProfile {
        allele: Allele::Fi,
        mutation_rate: 1e-5,
        iq: 10.0,
        eq: 10.0,
        dexterity: 20.0,
        strength: 5.0,
        land_speed: 0.5,
        swim_speed: 20.0,
        jump_height: 0.3,
        flight_speed: 0.0,
        climbing: 0.1,
        bite: 50.0,
        venom: false,
        fire_breathing: false,
        petrification: false,
        charm: true,
        size: 15.0,
        diet: Diet::Omnivore,
        senses: senses(300.0, 5.0, 20.0, 60.0, 300.0, 20.0, 3_000.0, 50.0),
        magic_production: 1.0,
        magic_capacity: 5.0,
        gestation: 30.0,
        litter_size: 300.0,
    },
    AlleleProfile {
        allele: Allele::Go,
        mutation_rate: 1e-6,
        iq: 60.0,
        eq: 55.0,
        dexterity: 75.0,
        strength: 70.0,
        land_speed: 20.0,
        swim_speed: 3.0,
        jump_height: 1.0,
        flight_speed: 0.0,
        climbing: 15.0,
        bite: 250.0,
        venom: false,
        fire_breathing: false,
        petrification: false,
        charm: false,
        size: 120.0,
        diet: Diet::Herbivore,
        senses: senses(320.0, 15.0, 60.0, 35.0, 200.0, 70.0, 37_000.0, 300.0),
        magic_production: 3.0,
        magic_capacity: 30.0,
        gestation: 150.0,
        litter_size: 2.0,
    },
    AlleleProfile {
        allele: Allele::Sn,
        mutation_rate: 1e-5,
        iq: 25.0,
        eq: 20.0,
        dexterity: 65.0,
        strength: 15.0,
        land_speed: 1.0,
        swim_speed: 2.0,
        jump_height: 0.1,
        flight_speed: 0.0,
        climbing: 3.0,
        bite: 300.0,
        venom: true,
        fire_breathing: false,
        petrification: true,
        charm: true,
        size: 250.0,
        diet: Diet::Carnivore,
        senses: senses(150.0, 4.0, 80.0, 70.0, 800.0, 50.0, 1_000.0, 20.0),
        magic_production: 4.0,
        magic_capacity: 40.0,
        gestation: 60.0,
        litter_size: 12.0,
    },
    AlleleProfile {
        allele: Allele::Bu,
        mutation_rate: 1e-6,
        iq: 30.0,
        eq: 25.0,
        dexterity: 40.0,
        strength: 250.0,
        land_speed: 25.0,
        swim_speed: 4.0,
        jump_height: 0.8,
        flight_speed: 0.0,
        climbing: 1.0,
        bite: 800.0,
        venom: false,
        fire_breathing: false,
        petrification: false,
        charm: false,
        size: 200.0,
        diet: Diet::Herbivore,
        senses: senses(330.0, 12.0, 90.0, 45.0, 600.0, 23.0, 35_000.0, 350.0),
        magic_production: 1.0,
        magic_capacity: 15.0,
        gestation: 283.0,
        litter_size: 1.0,
    },
    AlleleProfile {
        allele: Allele::Bi,
        mutation_rate: 1e-6,
        iq: 40.0,
        eq: 35.0,
        dexterity: 80.0,
        strength: 15.0,
        land_speed: 10.0,
        swim_speed: 8.0,
        jump_height: 0.5,
        flight_speed: 60.0,
        climbing: 5.0,
        bite: 100.0,
        venom: false,
        fire_breathing: false,
        petrification: false,
        charm: false,
        size: 50.0,
        diet: Diet::Omnivore,
        senses: senses(300.0, 60.0, 2.0, 5.0, 5.0, 200.0, 12_000.0, 300.0),
        magic_production: 3.0,
        magic_capacity: 20.0,
        gestation: 21.0,
        litter_size: 4.0,
    },
    AlleleProfile {
        allele: Allele::Li,
        mutation_rate: 1e-6,
        iq: 70.0,
        eq: 60.0,
        dexterity: 70.0,
        strength: 220.0,
        land_speed: 60.0,
        swim_speed: 12.0,
        jump_height: 2.0,
        flight_speed: 0.0,
        climbing: 4.0,
        bite: 700.0,
        venom: false,
        fire_breathing: false,
        petrification: false,
        charm: false,
        size: 130.0,
        diet: Diet::Carnivore,
        senses: senses(200.0, 11.0, 100.0, 50.0, 1_000.0, 45.0, 64_000.0, 2_000.0),
        magic_production: 2.0,
        magic_capacity: 25.0,
        gestation: 110.0,
        litter_size: 3.0,
    },
    AlleleProfile {
        allele: Allele::Dr,
        mutation_rate: 1e-6,
        iq: 120.0,
        eq: 115.0,
        dexterity: 85.0,
        strength: 300.0,
        land_speed: 50.0,
        swim_speed: 15.0,
        jump_height: 3.0,
        flight_speed: 50.0,
        climbing: 6.0,
        bite: 900.0,
        venom: true,
        fire_breathing: true,
        petrification: true,
        charm: false,
        size: 300.0,
        diet: Diet::Carnivore,
        senses: senses(270.0, 90.0, 150.0, 85.0, 3_000.0, 15.0, 40_000.0, 5_000.0),
        magic_production: 20.0,
        magic_capacity: 300.0,
        gestation: 400.0,
        litter_size: 2.0,
    },
];
