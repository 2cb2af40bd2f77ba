//! Error types for iso4-core.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::lexicon::MatchKind;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or building the LTWA lexicon.
///
/// These are startup-time failures; once a lexicon exists, abbreviating
/// never produces them.
#[derive(Error, Debug)]
pub enum LexiconError {
    /// A data file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A source row does not have the expected shape.
    #[error("malformed LTWA row at line {line}: {reason}")]
    MalformedRow {
        /// 1-based line number in the source table.
        line: usize,
        /// What is wrong with the row.
        reason: String,
    },

    /// The multi-word tokenizer pattern failed to compile.
    #[error("failed to compile tokenizer pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The lexicon could not be serialized for the cache.
    #[error("failed to encode lexicon cache: {0}")]
    CacheEncode(#[from] serde_json::Error),

    /// The cache file could not be written.
    #[error("failed to write lexicon cache {path}: {source}")]
    CacheWrite {
        /// Destination path of the cache file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`LexiconError`].
pub type LexiconResult<T> = Result<T, LexiconError>;

/// Errors that can occur while abbreviating a title.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbbreviationError {
    /// A word or fragment has language-dependent abbreviations and the
    /// requested languages select none or more than one of them.
    #[error("{}", describe_ambiguity(.word, .fragment.as_deref(), .languages))]
    Ambiguous {
        /// The normalized title word.
        word: String,
        /// The matched prefix, suffix or infix (absent for full words).
        fragment: Option<String>,
        /// Which conflict table the entry lives in.
        kind: MatchKind,
        /// Every language that would resolve the ambiguity, sorted.
        languages: Vec<String>,
    },
}

/// Result type alias using [`AbbreviationError`].
pub type AbbreviationResult<T> = Result<T, AbbreviationError>;

fn describe_ambiguity(word: &str, fragment: Option<&str>, languages: &[String]) -> String {
    let languages = languages.join(", ");
    match fragment {
        Some(fragment) => format!(
            "ambiguous fragment ({fragment}) in title word: {word}; must disambiguate between languages: {languages}"
        ),
        None => format!(
            "ambiguous word in title: {word}; must disambiguate between languages: {languages}"
        ),
    }
}
