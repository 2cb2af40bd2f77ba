//! The compiled LTWA lexicon.
//!
//! A [`Lexicon`] holds everything the abbreviator looks up:
//!
//! - the main table, keyed by [`MatchKind`] then by normalized word or fragment,
//! - the conflict map for words whose abbreviation depends on the language,
//! - the multi-word terms the tokenizer must keep together,
//! - the stopwords dropped from every title.
//!
//! It is built once from a [`LexiconSource`] (or reloaded from a
//! [`LexiconCache`]) and never mutated afterwards, so one instance can be
//! shared behind an [`Arc`] by any number of callers.

mod build;
mod cache;
mod source;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, LazyLock};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::LexiconResult;
use crate::normalize::normalize_word;
use crate::tokenizer::Tokenizer;

pub use cache::LexiconCache;
pub use source::{LexiconSource, SourceEntry};

/// Version tag of the bundled LTWA data.
pub const LTWA_VERSION: &str = "20170914";

/// Marker used in the LTWA for words that are never abbreviated.
pub const NOT_ABBREVIATED: &str = "n.a.";

/// How an LTWA entry matches a title word, from its hyphenation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    /// `word-`: the title word starts with the fragment.
    Prefix,
    /// `-word`: the title word ends with the fragment.
    Suffix,
    /// `-word-`: the title word contains the fragment.
    Infix,
    /// `word`: the title word equals the entry.
    FullWord,
}

impl MatchKind {
    /// All kinds, in lookup order after full words.
    pub const FRAGMENTS: [Self; 3] = [Self::Prefix, Self::Suffix, Self::Infix];

    /// Classify a raw LTWA pattern by its leading and trailing hyphens.
    pub fn from_pattern(pattern: &str) -> Self {
        match (pattern.starts_with('-'), pattern.ends_with('-')) {
            (true, true) => Self::Infix,
            (true, false) => Self::Suffix,
            (false, true) => Self::Prefix,
            (false, false) => Self::FullWord,
        }
    }

    /// Whether `word` matches a key of this kind.
    pub fn matches(self, word: &str, key: &str) -> bool {
        match self {
            Self::Prefix => word.starts_with(key),
            Self::Suffix => word.ends_with(key),
            Self::Infix => word.contains(key),
            Self::FullWord => word == key,
        }
    }

    /// Returns the kind as a kebab-case string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::Suffix => "suffix",
            Self::Infix => "infix",
            Self::FullWord => "full-word",
        }
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The abbreviation recorded for an LTWA entry.
///
/// Stored normalized: lower-case, decomposed, without the trailing period.
/// Serializes to the plain string, with `n.a.` for [`Self::NotAbbreviated`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Abbreviation {
    /// The word is shortened to this form.
    Abbreviated(String),
    /// The LTWA says the word is kept in full.
    NotAbbreviated,
}

impl Abbreviation {
    /// The abbreviated text, or `None` for words kept in full.
    pub fn as_abbreviated(&self) -> Option<&str> {
        match self {
            Self::Abbreviated(text) => Some(text),
            Self::NotAbbreviated => None,
        }
    }
}

impl From<String> for Abbreviation {
    fn from(value: String) -> Self {
        if value == NOT_ABBREVIATED {
            Self::NotAbbreviated
        } else {
            Self::Abbreviated(value)
        }
    }
}

impl From<Abbreviation> for String {
    fn from(value: Abbreviation) -> Self {
        match value {
            Abbreviation::Abbreviated(text) => text,
            Abbreviation::NotAbbreviated => NOT_ABBREVIATED.to_string(),
        }
    }
}

impl std::fmt::Display for Abbreviation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Abbreviated(text) => f.write_str(text),
            Self::NotAbbreviated => f.write_str(NOT_ABBREVIATED),
        }
    }
}

/// Unambiguous entries: kind → normalized key → abbreviation.
pub type LtwaTable = BTreeMap<MatchKind, BTreeMap<String, Abbreviation>>;

/// Language-dependent entries: kind → normalized key → language → abbreviation.
pub type ConflictMap = BTreeMap<MatchKind, BTreeMap<String, BTreeMap<String, Abbreviation>>>;

/// The serializable part of a lexicon, as built from the source table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconData {
    /// Version of the source data this was built from.
    pub version: String,
    /// Unambiguous entries.
    pub table: LtwaTable,
    /// Language-dependent entries.
    pub conflicts: ConflictMap,
    /// Normalized multi-word terms, sorted and deduplicated.
    pub multi_word_terms: Vec<String>,
}

/// Entry counts for one match kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct KindStats {
    /// Unambiguous entries.
    pub entries: usize,
    /// Language-dependent entries.
    pub conflicts: usize,
}

/// Summary of a lexicon's contents.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LexiconStats {
    /// Source data version.
    pub version: String,
    /// Counts per match kind.
    pub kinds: BTreeMap<MatchKind, KindStats>,
    /// Number of multi-word terms.
    pub multi_word_terms: usize,
    /// Number of stopwords.
    pub stopwords: usize,
}

/// One lexicon entry that matches a looked-up word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LookupEntry {
    /// Table the entry lives in.
    pub kind: MatchKind,
    /// Normalized word or fragment.
    pub key: String,
    /// Abbreviation per language; a single `"*"` key for unambiguous entries.
    #[schemars(with = "BTreeMap<String, String>")]
    pub abbreviations: BTreeMap<String, Abbreviation>,
    /// Whether the abbreviation depends on the title's language.
    pub conflict: bool,
}

static BUNDLED: LazyLock<Arc<Lexicon>> = LazyLock::new(|| {
    Arc::new(
        Lexicon::build(&LexiconSource::bundled()).expect("bundled LTWA data is well-formed"),
    )
});

/// The immutable lookup state shared by every abbreviation call.
#[derive(Debug, Clone)]
pub struct Lexicon {
    data: LexiconData,
    stopwords: BTreeSet<String>,
    tokenizer: Tokenizer,
}

impl Lexicon {
    /// Build a lexicon from source data.
    #[tracing::instrument(skip(source), fields(version = %source.version()))]
    pub fn build(source: &LexiconSource) -> LexiconResult<Self> {
        let entries = source.entries()?;
        let data = build::build_data(source.version(), &entries);
        let lexicon = Self::from_data(data, source.stopwords())?;
        tracing::info!(
            rows = entries.len(),
            multi_word_terms = lexicon.data.multi_word_terms.len(),
            "LTWA lexicon built"
        );
        Ok(lexicon)
    }

    /// The lexicon compiled from the bundled data, built on first use.
    pub fn bundled() -> Arc<Self> {
        Arc::clone(&BUNDLED)
    }

    /// Load the lexicon described by a configuration.
    ///
    /// Without `ltwa_path` or `stopwords_path` this is the bundled lexicon.
    /// Otherwise the configured files are read and compiled, going through
    /// the lexicon cache unless `no_cache` is set.
    pub fn from_config(config: &Config) -> LexiconResult<Arc<Self>> {
        if config.ltwa_path.is_none() && config.stopwords_path.is_none() {
            return Ok(Self::bundled());
        }
        let source = LexiconSource::from_config(config)?;
        let cache = if config.no_cache {
            None
        } else {
            LexiconCache::from_config(config)
        };
        let lexicon = match cache {
            Some(cache) => cache.load_or_build(&source)?,
            None => Self::build(&source)?,
        };
        Ok(Arc::new(lexicon))
    }

    /// Assemble a lexicon from already-built data.
    pub fn from_data(data: LexiconData, stopwords: BTreeSet<String>) -> LexiconResult<Self> {
        let tokenizer = Tokenizer::new(&data.multi_word_terms)?;
        Ok(Self {
            data,
            stopwords,
            tokenizer,
        })
    }

    /// The serializable table, conflict map and multi-word terms.
    pub const fn data(&self) -> &LexiconData {
        &self.data
    }

    /// Source data version.
    pub fn version(&self) -> &str {
        &self.data.version
    }

    /// Unambiguous entries.
    pub const fn table(&self) -> &LtwaTable {
        &self.data.table
    }

    /// Language-dependent entries.
    pub const fn conflicts(&self) -> &ConflictMap {
        &self.data.conflicts
    }

    /// Normalized multi-word terms.
    pub fn multi_word_terms(&self) -> &[String] {
        &self.data.multi_word_terms
    }

    /// Normalized stopwords.
    pub const fn stopwords(&self) -> &BTreeSet<String> {
        &self.stopwords
    }

    /// Whether a normalized word is dropped from titles.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// The title tokenizer compiled for this lexicon's multi-word terms.
    pub const fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Count entries per match kind.
    pub fn stats(&self) -> LexiconStats {
        let mut kinds = BTreeMap::new();
        for kind in [MatchKind::FullWord, MatchKind::Prefix, MatchKind::Suffix, MatchKind::Infix] {
            kinds.insert(
                kind,
                KindStats {
                    entries: self.data.table.get(&kind).map_or(0, BTreeMap::len),
                    conflicts: self.data.conflicts.get(&kind).map_or(0, BTreeMap::len),
                },
            );
        }
        LexiconStats {
            version: self.data.version.clone(),
            kinds,
            multi_word_terms: self.data.multi_word_terms.len(),
            stopwords: self.stopwords.len(),
        }
    }

    /// Every entry, plain or language-dependent, that matches `word`.
    ///
    /// `word` is normalized first. Entries are listed full words first, then
    /// prefixes, suffixes and infixes, each in key order.
    pub fn lookup(&self, word: &str) -> Vec<LookupEntry> {
        let word = normalize_word(word);
        let mut found = Vec::new();
        for kind in [MatchKind::FullWord, MatchKind::Prefix, MatchKind::Suffix, MatchKind::Infix] {
            if let Some(entries) = self.data.table.get(&kind) {
                found.extend(
                    entries
                        .iter()
                        .filter(|(key, _)| kind.matches(&word, key))
                        .map(|(key, abbreviation)| LookupEntry {
                            kind,
                            key: key.clone(),
                            abbreviations: BTreeMap::from([(
                                "*".to_string(),
                                abbreviation.clone(),
                            )]),
                            conflict: false,
                        }),
                );
            }
            if let Some(entries) = self.data.conflicts.get(&kind) {
                found.extend(
                    entries
                        .iter()
                        .filter(|(key, _)| kind.matches(&word, key))
                        .map(|(key, variants)| LookupEntry {
                            kind,
                            key: key.clone(),
                            abbreviations: variants.clone(),
                            conflict: true,
                        }),
                );
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_kind_from_hyphenation() {
        assert_eq!(MatchKind::from_pattern("physic-"), MatchKind::Prefix);
        assert_eq!(MatchKind::from_pattern("-graphy"), MatchKind::Suffix);
        assert_eq!(MatchKind::from_pattern("-physic-"), MatchKind::Infix);
        assert_eq!(MatchKind::from_pattern("journal"), MatchKind::FullWord);
        assert_eq!(MatchKind::from_pattern("united states"), MatchKind::FullWord);
    }

    #[test]
    fn match_kind_matching() {
        assert!(MatchKind::Prefix.matches("physics", "physic"));
        assert!(MatchKind::Suffix.matches("oceanography", "graphy"));
        assert!(MatchKind::Infix.matches("astrophysical", "physic"));
        assert!(!MatchKind::FullWord.matches("journals", "journal"));
    }

    #[test]
    fn abbreviation_string_round_trip() {
        let json = serde_json::to_string(&Abbreviation::NotAbbreviated).unwrap();
        assert_eq!(json, "\"n.a.\"");
        let parsed: Abbreviation = serde_json::from_str("\"phys\"").unwrap();
        assert_eq!(parsed, Abbreviation::Abbreviated("phys".to_string()));
    }

    #[test]
    fn bundled_lexicon_is_shared() {
        let a = Lexicon::bundled();
        let b = Lexicon::bundled();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.version(), LTWA_VERSION);
    }

    #[test]
    fn bundled_lexicon_has_every_kind() {
        let stats = Lexicon::bundled().stats();
        assert!(stats.kinds[&MatchKind::FullWord].entries > 0);
        assert!(stats.kinds[&MatchKind::Prefix].entries > 0);
        assert!(stats.kinds[&MatchKind::Suffix].entries > 0);
        assert!(stats.kinds[&MatchKind::Infix].entries > 0);
        assert!(stats.kinds[&MatchKind::FullWord].conflicts > 0);
        assert!(stats.multi_word_terms > 0);
        assert!(stats.stopwords > 0);
    }

    #[test]
    fn lookup_lists_all_matching_entries() {
        let lexicon = Lexicon::bundled();
        let entries = lexicon.lookup("Electronics");
        let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
        assert!(keys.contains(&"electr"));
        assert!(keys.contains(&"electronic"));
        assert!(entries.iter().all(|e| e.kind == MatchKind::Prefix));
    }

    #[test]
    fn lookup_reports_conflicts() {
        let entries = Lexicon::bundled().lookup("labor");
        let conflict = entries.iter().find(|e| e.conflict).expect("labor is a conflict");
        assert_eq!(conflict.kind, MatchKind::FullWord);
        assert!(conflict.abbreviations.contains_key("eng"));
        assert!(conflict.abbreviations.contains_key("spa"));
    }

    #[test]
    fn stopwords_are_normalized() {
        let lexicon = Lexicon::bundled();
        assert!(lexicon.is_stopword("of"));
        assert!(lexicon.is_stopword(&normalize_word("für")));
    }
}
