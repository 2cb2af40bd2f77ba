//! Core library for iso4.
//!
//! Abbreviates publication titles according to ISO 4 and the CIEPS
//! List of Title Word Abbreviations (LTWA): "Journal of Applied Physics"
//! becomes "J. Appl. Phys.".
//!
//! # Modules
//!
//! - [`lexicon`] - The compiled LTWA table, conflict map, multi-word terms and stopwords
//! - [`tokenizer`] - Title splitting that keeps multi-word terms intact
//! - [`normalize`] - Lookup keys and capitalization detection
//! - [`lemma`] - Noun lemmatization used as a fallback lookup key
//! - [`matcher`] - Word-to-abbreviation resolution
//! - [`format`] - Output capitalization and periods
//! - [`abbreviator`] - The title abbreviation pipeline
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```
//! use iso4_core::{AbbreviateOptions, Abbreviator};
//!
//! let abbreviator = Abbreviator::bundled();
//! let short = abbreviator
//!     .abbreviate("Journal of Applied Physics", &AbbreviateOptions::default())
//!     .expect("no ambiguous words");
//! assert_eq!(short, "J. Appl. Phys.");
//! ```
#![deny(unsafe_code)]

pub mod abbreviator;
pub mod config;
pub mod dictionaries;
pub mod error;
pub mod format;
pub mod lemma;
pub mod lexicon;
pub mod matcher;
pub mod normalize;
pub mod tokenizer;

pub use abbreviator::{AbbreviateOptions, AbbreviationReport, Abbreviator, WordReport};
pub use config::{Config, ConfigLoader, ConfigSources, LogLevel};
pub use error::{
    AbbreviationError, AbbreviationResult, ConfigError, ConfigResult, LexiconError,
    LexiconResult,
};
pub use lemma::{Lemmatizer, NounLemmatizer};
pub use lexicon::{
    Abbreviation, Lexicon, LexiconCache, LexiconSource, LexiconStats, LookupEntry, MatchKind,
};
pub use matcher::{ConflictScan, MatchOutcome, MatchSource};
pub use normalize::Capitalization;

use std::collections::BTreeSet;

/// Default maximum input size in bytes (5 MiB) for title files.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;

/// Abbreviate a title with the bundled LTWA data.
///
/// Convenience wrapper over [`Abbreviator::bundled`]. `languages` holds
/// ISO 639-2/B codes and is only consulted for words whose abbreviation
/// depends on the title's language.
///
/// # Errors
///
/// Returns [`AbbreviationError::Ambiguous`] when a language-dependent word
/// cannot be resolved to exactly one of `languages`.
pub fn abbreviate<I, S>(title: &str, periods: bool, languages: I) -> AbbreviationResult<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let options = AbbreviateOptions {
        periods,
        languages: languages.into_iter().map(Into::into).collect::<BTreeSet<_>>(),
    };
    Abbreviator::bundled().abbreviate(title, &options)
}
