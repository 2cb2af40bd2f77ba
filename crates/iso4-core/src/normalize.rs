//! Lookup-key normalization and capitalization detection.
//!
//! Title words and LTWA patterns go through the same [`normalize_word`] so
//! that "Physics:", "physics" and the LTWA row "physic-" meet on common
//! ground. Everything is compared in Unicode compatibility-decomposed form
//! (NFKD); the final title is recomposed by the formatter.

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::lexicon::{Abbreviation, NOT_ABBREVIATED};

/// A single leading hyphen or a trailing run of punctuation.
static EDGE_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-|\p{P}+$").expect("valid regex"));

/// Capitalization style of a title word, reapplied to its abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Capitalization {
    /// `journal`
    Lowercase,
    /// `JOURNAL`
    Uppercase,
    /// `Journal`
    Titlecase,
}

impl Capitalization {
    /// Detect the capitalization of a raw title word.
    ///
    /// Anything starting with a capital letter counts as title case, so a
    /// multi-word term like "United states" still renders as "U. S.".
    pub fn detect(word: &str) -> Self {
        if word == word.to_uppercase() {
            Self::Uppercase
        } else if word.chars().next().is_some_and(char::is_uppercase) {
            Self::Titlecase
        } else {
            Self::Lowercase
        }
    }

    /// Apply this style to a single space-free word.
    pub fn apply(self, word: &str) -> String {
        match self {
            Self::Lowercase => word.to_string(),
            Self::Uppercase => word.to_uppercase(),
            Self::Titlecase => title_case(word),
        }
    }
}

/// Upper-case the first character and lower-case the rest.
fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Canonicalize a title word or LTWA pattern into a lookup key.
///
/// Decomposes (NFKD), then for each space-separated part strips one leading
/// hyphen and any trailing punctuation, trims and lower-cases. Parts are
/// re-joined with single spaces.
pub fn normalize_word(word: &str) -> String {
    let decomposed: String = word.nfkd().collect();
    decomposed
        .split(' ')
        .map(|part| EDGE_PUNCTUATION.replace_all(part, "").trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Canonicalize an LTWA abbreviation column.
///
/// Surrounding hyphens and spaces and the trailing period are removed from
/// each part; periods are added back at output time. The literal `n.a.`
/// marker becomes [`Abbreviation::NotAbbreviated`].
pub fn normalize_abbreviation(abbreviation: &str) -> Abbreviation {
    let abbreviation = abbreviation.trim();
    if abbreviation == NOT_ABBREVIATED {
        return Abbreviation::NotAbbreviated;
    }
    let normalized = abbreviation
        .split(' ')
        .map(|part| {
            part.trim_matches(|c: char| c == '-' || c == ' ')
                .trim_end_matches('.')
                .to_lowercase()
                .nfkd()
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ");
    Abbreviation::Abbreviated(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_punctuation_and_lowercases() {
        assert_eq!(normalize_word("Physics:"), "physics");
        assert_eq!(normalize_word("JOURNAL,"), "journal");
        assert_eq!(normalize_word("review..."), "review");
    }

    #[test]
    fn normalize_strips_pattern_hyphens() {
        assert_eq!(normalize_word("physic-"), "physic");
        assert_eq!(normalize_word("-graphy"), "graphy");
        assert_eq!(normalize_word("-physic-"), "physic");
    }

    #[test]
    fn normalize_keeps_internal_punctuation() {
        assert_eq!(normalize_word("non-linear"), "non-linear");
        assert_eq!(normalize_word("l'academie"), "l'academie");
    }

    #[test]
    fn normalize_multi_word_terms_part_by_part() {
        assert_eq!(normalize_word("United States,"), "united states");
        assert_eq!(normalize_word("South-Africa"), "south-africa");
    }

    #[test]
    fn normalize_decomposes_accents() {
        let key = normalize_word("Für");
        assert_eq!(key, "fu\u{308}r");
        assert_eq!(key, normalize_word("fu\u{308}r"));
    }

    #[test]
    fn abbreviation_strips_period_and_hyphens() {
        assert_eq!(
            normalize_abbreviation("Phys."),
            Abbreviation::Abbreviated("phys".to_string())
        );
        assert_eq!(
            normalize_abbreviation("-ogr."),
            Abbreviation::Abbreviated("ogr".to_string())
        );
        assert_eq!(
            normalize_abbreviation("U. S."),
            Abbreviation::Abbreviated("u s".to_string())
        );
    }

    #[test]
    fn abbreviation_marker_passes_through() {
        assert_eq!(normalize_abbreviation("n.a."), Abbreviation::NotAbbreviated);
    }

    #[test]
    fn capitalization_detection() {
        assert_eq!(Capitalization::detect("JOURNAL"), Capitalization::Uppercase);
        assert_eq!(Capitalization::detect("Journal"), Capitalization::Titlecase);
        assert_eq!(Capitalization::detect("journal"), Capitalization::Lowercase);
        assert_eq!(Capitalization::detect("United states"), Capitalization::Titlecase);
        assert_eq!(Capitalization::detect("eLife"), Capitalization::Lowercase);
    }

    #[test]
    fn capitalization_apply() {
        assert_eq!(Capitalization::Uppercase.apply("phys."), "PHYS.");
        assert_eq!(Capitalization::Titlecase.apply("phys."), "Phys.");
        assert_eq!(Capitalization::Titlecase.apply("mCGRAW"), "Mcgraw");
        assert_eq!(Capitalization::Lowercase.apply("phys."), "phys.");
    }
}
