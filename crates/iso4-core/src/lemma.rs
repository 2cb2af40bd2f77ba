//! Noun lemmatization.
//!
//! The LTWA lists words in their dictionary form, so a title word that is
//! not found as written is retried as its lemma ("Proceedings" →
//! "proceeding"). [`NounLemmatizer`] is a WordNet-style detachment
//! lemmatizer for English nouns backed by a small irregular-plural
//! dictionary; callers with a better morphology source can plug it in
//! through the [`Lemmatizer`] trait.

use crate::dictionaries::irregular_plurals::{irregular_singular, is_invariant_noun};

/// Produces the base form of a normalized (lower-case, decomposed) word.
pub trait Lemmatizer: Send + Sync {
    /// Return the lemma of `word`, or `word` itself when it has none.
    fn lemmatize(&self, word: &str) -> String;
}

/// Plural suffix rules, most specific first: `(suffix, replacement)`.
const DETACHMENT_RULES: &[(&str, &str)] = &[
    ("ies", "y"),
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("zes", "z"),
];

/// Endings where a final `s` is not a plural marker.
const NON_PLURAL_ENDINGS: &[&str] = &["ss", "us", "is"];

/// Words this short are never reduced.
const MIN_LEMMA_INPUT: usize = 4;

/// WordNet-style noun lemmatizer with an irregular-plural dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct NounLemmatizer;

impl Lemmatizer for NounLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        if word.contains(' ') || word.chars().count() < MIN_LEMMA_INPUT {
            return word.to_string();
        }
        if let Some(singular) = irregular_singular(word) {
            return singular.to_string();
        }
        if is_invariant_noun(word) {
            return word.to_string();
        }
        for (suffix, replacement) in DETACHMENT_RULES {
            if let Some(stem) = word.strip_suffix(suffix) {
                return format!("{stem}{replacement}");
            }
        }
        if NON_PLURAL_ENDINGS.iter().any(|ending| word.ends_with(ending)) {
            return word.to_string();
        }
        word.strip_suffix('s').unwrap_or(word).to_string()
    }
}
