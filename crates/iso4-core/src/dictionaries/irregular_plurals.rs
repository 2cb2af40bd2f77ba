//! Irregular noun dictionaries for lemmatization.
//!
//! Contains plurals that suffix rules cannot reduce, and nouns ending in
//! `s` that are already in their base form.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Irregular plural → singular forms common in publication titles.
pub static IRREGULAR_PLURALS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut map = HashMap::new();

        // Vowel change and -en plurals
        map.extend([
            ("men", "man"),
            ("women", "woman"),
            ("children", "child"),
            ("feet", "foot"),
            ("teeth", "tooth"),
            ("geese", "goose"),
            ("mice", "mouse"),
            ("oxen", "ox"),
            ("people", "person"),
        ]);

        // Latin and Greek plurals
        map.extend([
            ("analyses", "analysis"),
            ("annales", "annal"),
            ("appendices", "appendix"),
            ("axes", "axis"),
            ("bacteria", "bacterium"),
            ("bases", "basis"),
            ("crises", "crisis"),
            ("criteria", "criterion"),
            ("curricula", "curriculum"),
            ("data", "datum"),
            ("diagnoses", "diagnosis"),
            ("foci", "focus"),
            ("formulae", "formula"),
            ("fungi", "fungus"),
            ("genera", "genus"),
            ("hypotheses", "hypothesis"),
            ("indices", "index"),
            ("matrices", "matrix"),
            ("media", "medium"),
            ("memoranda", "memorandum"),
            ("nuclei", "nucleus"),
            ("phenomena", "phenomenon"),
            ("radii", "radius"),
            ("spectra", "spectrum"),
            ("stimuli", "stimulus"),
            ("strata", "stratum"),
            ("syntheses", "synthesis"),
            ("theses", "thesis"),
            ("vertebrae", "vertebra"),
        ]);

        // -ves plurals
        map.extend([
            ("halves", "half"),
            ("knives", "knife"),
            ("leaves", "leaf"),
            ("lives", "life"),
            ("selves", "self"),
            ("shelves", "shelf"),
            ("wives", "wife"),
            ("wolves", "wolf"),
        ]);

        map
    });

/// Nouns ending in `s` that are already singular (or have no singular).
pub static INVARIANT_NOUNS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "acoustics",
        "aeronautics",
        "athletics",
        "biomechanics",
        "dynamics",
        "economics",
        "electronics",
        "ethics",
        "genetics",
        "graphics",
        "informatics",
        "linguistics",
        "logistics",
        "mathematics",
        "mechanics",
        "news",
        "optics",
        "physics",
        "politics",
        "robotics",
        "series",
        "species",
        "statistics",
        "thermodynamics",
    ]
    .into_iter()
    .collect()
});

/// Look up the singular form of an irregular plural.
pub fn irregular_singular(word: &str) -> Option<&'static str> {
    IRREGULAR_PLURALS.get(word).copied()
}

/// Check if a noun ending in `s` should be left as is.
pub fn is_invariant_noun(word: &str) -> bool {
    INVARIANT_NOUNS.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irregular_plurals() {
        assert_eq!(irregular_singular("children"), Some("child"));
        assert_eq!(irregular_singular("phenomena"), Some("phenomenon"));
        assert_eq!(irregular_singular("analyses"), Some("analysis"));
        assert_eq!(irregular_singular("journals"), None);
    }

    #[test]
    fn invariant_nouns() {
        assert!(is_invariant_noun("physics"));
        assert!(is_invariant_noun("series"));
        assert!(!is_invariant_noun("letters"));
    }
}
