//! The title abbreviation pipeline.
//!
//! A title is tokenized, each word is normalized, stopwords are dropped, the
//! rest are resolved by the [`Matcher`] and rendered by the formatter. A
//! title that is a single word is returned untouched.

use std::collections::BTreeSet;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::AbbreviationResult;
use crate::format::{assemble, format_word};
use crate::lemma::{Lemmatizer, NounLemmatizer};
use crate::lexicon::Lexicon;
use crate::matcher::{ConflictScan, MatchOutcome, Matcher};
use crate::normalize::{Capitalization, normalize_word};

/// Per-call abbreviation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AbbreviateOptions {
    /// Append a period to each abbreviated part.
    pub periods: bool,
    /// ISO 639-2/B codes used to pick between language-dependent
    /// abbreviations.
    pub languages: BTreeSet<String>,
}

impl Default for AbbreviateOptions {
    fn default() -> Self {
        Self {
            periods: true,
            languages: BTreeSet::new(),
        }
    }
}

impl AbbreviateOptions {
    /// Options with periods and no disambiguation languages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether abbreviated parts end with a period.
    #[must_use]
    pub const fn with_periods(mut self, periods: bool) -> Self {
        self.periods = periods;
        self
    }

    /// Add a disambiguation language.
    #[must_use]
    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.languages.insert(code.into());
        self
    }

    /// Add several disambiguation languages.
    #[must_use]
    pub fn with_languages<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages.extend(codes.into_iter().map(Into::into));
        self
    }
}

/// How one title word was handled.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WordReport {
    /// The word as it appeared in the title.
    pub text: String,
    /// Lookup key.
    pub normalized: String,
    /// Lemma tried after the normalized form, when it differs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    /// Capitalization reapplied to the output.
    pub capitalization: Capitalization,
    /// Dropped as a stopword.
    pub stopword: bool,
    /// The lexicon entry used, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<MatchOutcome>,
    /// Rendered text, absent for stopwords.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// A title's abbreviation together with the per-word decisions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AbbreviationReport {
    /// The input title.
    pub title: String,
    /// The abbreviated title.
    pub abbreviation: String,
    /// The title was a single word and was returned unchanged.
    pub single_word: bool,
    /// One entry per tokenized word, in title order.
    pub words: Vec<WordReport>,
}

/// Abbreviates titles against a shared lexicon.
///
/// Cheap to create from an existing [`Lexicon`]; safe to share between
/// threads.
pub struct Abbreviator {
    matcher: Matcher,
    lemmatizer: Box<dyn Lemmatizer>,
}

impl std::fmt::Debug for Abbreviator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Abbreviator")
            .field("version", &self.matcher.lexicon().version())
            .field("conflict_scan", &self.matcher.conflict_scan())
            .finish_non_exhaustive()
    }
}

impl Abbreviator {
    /// An abbreviator over `lexicon` with the default lemmatizer.
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            matcher: Matcher::new(lexicon),
            lemmatizer: Box::new(NounLemmatizer),
        }
    }

    /// An abbreviator over the bundled LTWA data.
    pub fn bundled() -> Self {
        Self::new(Lexicon::bundled())
    }

    /// Set how competing conflict fragments are resolved.
    #[must_use]
    pub fn with_conflict_scan(mut self, conflict_scan: ConflictScan) -> Self {
        self.matcher = self.matcher.with_conflict_scan(conflict_scan);
        self
    }

    /// Replace the lemmatizer used for the fallback lookup key.
    #[must_use]
    pub fn with_lemmatizer(mut self, lemmatizer: Box<dyn Lemmatizer>) -> Self {
        self.lemmatizer = lemmatizer;
        self
    }

    /// The lexicon in use.
    pub fn lexicon(&self) -> &Arc<Lexicon> {
        self.matcher.lexicon()
    }

    /// How competing conflict fragments are resolved.
    pub const fn conflict_scan(&self) -> ConflictScan {
        self.matcher.conflict_scan()
    }

    /// Abbreviate a title.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AbbreviationError::Ambiguous`] when a word's
    /// abbreviation depends on a language that `options.languages` does not
    /// pin down. No partial result is produced.
    #[tracing::instrument(
        skip(self, options),
        fields(periods = options.periods, languages = ?options.languages)
    )]
    pub fn abbreviate(
        &self,
        title: &str,
        options: &AbbreviateOptions,
    ) -> AbbreviationResult<String> {
        let report = self.explain(title, options)?;
        tracing::debug!(abbreviation = %report.abbreviation, "title abbreviated");
        Ok(report.abbreviation)
    }

    /// Abbreviate a title and report how every word was handled.
    ///
    /// # Errors
    ///
    /// Same as [`Self::abbreviate`].
    pub fn explain(
        &self,
        title: &str,
        options: &AbbreviateOptions,
    ) -> AbbreviationResult<AbbreviationReport> {
        // Multi-word terms are stored decomposed, so split the decomposed title.
        let decomposed: String = title.nfkd().collect();
        let tokens = self.lexicon().tokenizer().split(&decomposed);

        if let [only] = tokens.as_slice()
            && !only.contains(char::is_whitespace)
        {
            return Ok(AbbreviationReport {
                title: title.to_string(),
                abbreviation: title.to_string(),
                single_word: true,
                words: Vec::new(),
            });
        }

        let words = tokens
            .into_iter()
            .map(|token| self.process_word(token, options))
            .collect::<AbbreviationResult<Vec<_>>>()?;
        let abbreviation = assemble(words.iter().filter_map(|word| word.output.as_deref()));

        Ok(AbbreviationReport {
            title: title.to_string(),
            abbreviation,
            single_word: false,
            words,
        })
    }

    fn process_word(
        &self,
        token: &str,
        options: &AbbreviateOptions,
    ) -> AbbreviationResult<WordReport> {
        let normalized = normalize_word(token);
        let capitalization = Capitalization::detect(token);

        if normalized.is_empty() || self.lexicon().is_stopword(&normalized) {
            return Ok(WordReport {
                text: token.nfkc().collect(),
                normalized,
                lemma: None,
                capitalization,
                stopword: true,
                matched: None,
                output: None,
            });
        }

        let lemma = Some(self.lemmatizer.lemmatize(&normalized))
            .filter(|lemma| *lemma != normalized);
        let mut candidates = vec![normalized.as_str()];
        if let Some(lemma) = &lemma {
            candidates.push(lemma);
        }

        let matched = self.matcher.resolve(&candidates, &options.languages)?;
        let output = format_word(
            &normalized,
            matched.as_ref().map(|outcome| &outcome.abbreviation),
            capitalization,
            options.periods,
        );

        Ok(WordReport {
            text: token.nfkc().collect(),
            normalized,
            lemma,
            capitalization,
            stopword: false,
            matched,
            output: Some(output),
        })
    }
}
