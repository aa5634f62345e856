use crate::catalog::Species;
use crate::record::RecordStore;
use rand::seq::IndexedRandom;
use rand::Rng;

const NAME_ATTEMPTS: usize = 10;

struct Words {
    adjectives: &'static [&'static str],
    nouns: &'static [&'static str],
}

static GENERIC: Words = Words {
    adjectives: &["Mystic", "Shadow", "Radiant", "Ancient", "Wandering"],
    nouns: &["Entity", "Being", "Spirit", "Wraith", "Stranger"],
};

fn words(species: Species) -> &'static Words {
    use Species::*;
    static HUMAN: Words = Words {
        adjectives: &["Noble", "Valiant", "Wise", "Stalwart", "Resolute", "Humble"],
        nouns: &["Knight", "Scholar", "Baron", "Champion", "Warden", "Pilgrim"],
    };
    static CENTAUR: Words = Words {
        adjectives: &["Wild", "Gallant", "Thundering", "Fierce"],
        nouns: &["Archer", "Hunter", "Outrider", "Stallion"],
    };
    static MERMAID: Words = Words {
        adjectives: &["Luminous", "Oceanic", "Pearled", "Singing"],
        nouns: &["Siren", "Maiden", "Enchantress", "Tidecaller"],
    };
    static HORSE: Words = Words {
        adjectives: &["Swift", "Dappled", "Majestic", "Sure-footed"],
        nouns: &["Steed", "Charger", "Mustang", "Courser"],
    };
    static HIPPOCAMPUS: Words = Words {
        adjectives: &["Tidal", "Deep", "Foaming", "Azure"],
        nouns: &["Triton", "Mariner", "Wavestrider", "Seasteed"],
    };
    static FISH: Words = Words {
        adjectives: &["Glimmering", "Silver", "Abyssal", "Sleek"],
        nouns: &["Fin", "Scale", "Darter", "Swimmer"],
    };
    static SATYR: Words = Words {
        adjectives: &["Revelrous", "Impish", "Piping", "Mischievous"],
        nouns: &["Faun", "Reveler", "Piper", "Satyr"],
    };
    static NAGA: Words = Words {
        adjectives: &["Coiled", "Serpentine", "Sly", "Hooded"],
        nouns: &["Asp", "Cobra", "Oracle", "Viper"],
    };
    static MINOTAUR: Words = Words {
        adjectives: &["Rampaging", "Colossal", "Horned", "Brazen"],
        nouns: &["Behemoth", "Taurus", "Warden", "Goliath"],
    };
    static HARPY: Words = Words {
        adjectives: &["Screeching", "Tempestuous", "Ragged", "Shrill"],
        nouns: &["Raptor", "Stormcaller", "Screamer", "Harrier"],
    };
    static GRIFFIN: Words = Words {
        adjectives: &["Golden", "Regal", "Imperial", "Keen-eyed"],
        nouns: &["Sky King", "Sentinel", "Griffin", "Talon"],
    };
    static CHIMERA: Words = Words {
        adjectives: &["Fused", "Nightmare", "Three-headed", "Snarling"],
        nouns: &["Abomination", "Beast", "Horror", "Chimera"],
    };
    static COCKATRICE: Words = Words {
        adjectives: &["Petrifying", "Cursed", "Baleful", "Sinister"],
        nouns: &["Basilisk", "Gorgon", "Cockatrice", "Glare"],
    };
    static HIPPOGRIFF: Words = Words {
        adjectives: &["Skyborne", "Aerial", "Proud", "Valiant"],
        nouns: &["Windrider", "Cloudstrider", "Sky Knight", "Hippogriff"],
    };
    static MANTICORE: Words = Words {
        adjectives: &["Dread", "Savage", "Barbed", "Terrifying"],
        nouns: &["Scourge", "Fury", "Stinger", "Manticore"],
    };
    static PEGASUS: Words = Words {
        adjectives: &["Celestial", "Ethereal", "Radiant", "Winged"],
        nouns: &["Zephyr", "Cloudrider", "Starwing", "Pegasus"],
    };
    static GOAT: Words = Words {
        adjectives: &["Stubborn", "Rocky", "Spirited", "Nimble"],
        nouns: &["Billy", "Capricorn", "Crag", "Climber"],
    };
    static SNAKE: Words = Words {
        adjectives: &["Sinuous", "Slithering", "Creeping", "Venomous"],
        nouns: &["Adder", "Serpent", "Mamba", "Viper"],
    };
    static BULL: Words = Words {
        adjectives: &["Massive", "Raging", "Sturdy", "Titanic"],
        nouns: &["Rampager", "Ox", "Goliath", "Bison"],
    };
    static BIRD: Words = Words {
        adjectives: &["Feathered", "Soaring", "Glorious", "Swift"],
        nouns: &["Skycaller", "Songbird", "Kestrel", "Avian"],
    };
    static LION: Words = Words {
        adjectives: &["Regal", "Mighty", "Tawny", "Imperial"],
        nouns: &["King", "Roarer", "Majesty", "Pride"],
    };
    static IPOTANE: Words = Words {
        adjectives: &["Enigmatic", "Mystic", "Noble", "Hoofed"],
        nouns: &["Maned Steed", "Wanderer", "Unity", "Strider"],
    };
    static DRAGON: Words = Words {
        adjectives: &["Fiery", "Ancient", "Infernal", "Blazing", "Scaled", "Smouldering"],
        nouns: &["Wyrm", "Drake", "Ember", "Sovereign", "Flame", "Hoarder"],
    };
    static TENGU: Words = Words {
        adjectives: &["Cunning", "Ethereal", "Sleek", "Mischievous"],
        nouns: &["Trickster", "Raven", "Shade", "Harbinger"],
    };

    match species {
        Human => &HUMAN,
        Centaur => &CENTAUR,
        Mermaid => &MERMAID,
        Horse => &HORSE,
        Hippocampus => &HIPPOCAMPUS,
        Fish => &FISH,
        SatyrFaun => &SATYR,
        Naga => &NAGA,
        Minotaur => &MINOTAUR,
        Harpy => &HARPY,
        Griffin => &GRIFFIN,
        Chimera => &CHIMERA,
        CockatriceBasilisk => &COCKATRICE,
        Hippogriff => &HIPPOGRIFF,
        Manticore => &MANTICORE,
        Pegasus => &PEGASUS,
        Goat => &GOAT,
        Snake => &SNAKE,
        Bull => &BULL,
        Bird => &BIRD,
        Lion => &LION,
        Ipotane => &IPOTANE,
        Dragon => &DRAGON,
        Tengu => &TENGU,
    }
}

fn draw<R: Rng + ?Sized>(words: &Words, rng: &mut R) -> String {
    let adjective = words.adjectives.choose(rng).copied().unwrap_or("Nameless");
    let noun = words.nouns.choose(rng).copied().unwrap_or("One");
    format!("{adjective} {noun}")
}

/// A species-flavoured "Adjective Noun" name not yet present in `store`.
/// After a few collisions a numeric suffix is appended until the name is free.
pub fn unique_name<R: Rng + ?Sized>(
    species: Option<Species>,
    store: &dyn RecordStore,
    rng: &mut R,
) -> String {
    let words = species.map(words).unwrap_or(&GENERIC);
    for _ in 0..NAME_ATTEMPTS {
        let name = draw(words, rng);
        if !store.contains(&name) {
            return name;
        }
    }
    let base = draw(words, rng);
    let mut suffix = rng.random_range(1..=1000u32);
    loop {
        let name = format!("{base} {suffix}");
        if !store.contains(&name) {
            return name;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::sample_record;
    use crate::record::MemoryStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn names_are_two_species_words() {
        let store = MemoryStore::new();
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        let name = unique_name(Some(Species::Dragon), &store, &mut rng);
        let (adjective, noun) = name.split_once(' ').expect("two words");
        assert!(DRAGON_WORDS.0.contains(&adjective));
        assert!(DRAGON_WORDS.1.contains(&noun));
    }

    const DRAGON_WORDS: (&[&str], &[&str]) = (
        &["Fiery", "Ancient", "Infernal", "Blazing", "Scaled", "Smouldering"],
        &["Wyrm", "Drake", "Ember", "Sovereign", "Flame", "Hoarder"],
    );

    #[test]
    fn names_stay_unique_when_word_space_is_exhausted() {
        let mut store = MemoryStore::new();
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        // Fish have 16 two-word combinations; ask for far more.
        for _ in 0..60 {
            let name = unique_name(Some(Species::Fish), &store, &mut rng);
            assert!(!store.contains(&name), "{name} reused");
            store.put(sample_record(&name, Species::Fish));
        }
        assert_eq!(store.len(), 60);
    }

    #[test]
    fn unknown_species_uses_generic_words() {
        let store = MemoryStore::new();
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let name = unique_name(None, &store, &mut rng);
        let adjective = name.split(' ').next().unwrap_or_default();
        assert!(GENERIC.adjectives.contains(&adjective));
    }
}
