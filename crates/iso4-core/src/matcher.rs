//! Resolution of one title word against the lexicon.
//!
//! Each candidate key (the normalized word, then its lemma) goes through two
//! stages:
//!
//! 1. The conflict map: full words first, then prefix, suffix and infix
//!    fragments in alphabetical order. A conflict entry resolves only when
//!    exactly one of its languages was requested; anything else is an
//!    [`AbbreviationError::Ambiguous`].
//! 2. The main table: exact full word, then prefix, suffix and infix
//!    fragments from longest to shortest. The first hit wins.
//!
//! The first candidate that produces a result ends the search.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{AbbreviationError, AbbreviationResult};
use crate::lexicon::{Abbreviation, Lexicon, MatchKind};

/// Which fragment wins when several conflict fragments of one kind match.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ConflictScan {
    /// Keep scanning and let the alphabetically last matching fragment win.
    #[default]
    LastMatch,
    /// Stop at the first matching fragment.
    FirstMatch,
}

impl ConflictScan {
    /// Returns the scan mode as a kebab-case string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LastMatch => "last-match",
            Self::FirstMatch => "first-match",
        }
    }
}

impl std::fmt::Display for ConflictScan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a match came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "from", rename_all = "kebab-case")]
pub enum MatchSource {
    /// The unambiguous table.
    Table,
    /// The conflict map, resolved through a requested language.
    Conflict {
        /// The language that selected the abbreviation.
        language: String,
    },
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => f.write_str("table"),
            Self::Conflict { language } => write!(f, "conflict, {language}"),
        }
    }
}

/// A resolved word: what matched and what it abbreviates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MatchOutcome {
    /// Normalized abbreviation, or `n.a.`.
    #[schemars(with = "String")]
    pub abbreviation: Abbreviation,
    /// Table the matching entry lives in.
    pub kind: MatchKind,
    /// The matching word or fragment.
    pub key: String,
    /// The lookup key that matched (normalized form or lemma).
    pub candidate: String,
    /// Table or conflict map.
    #[serde(flatten)]
    pub source: MatchSource,
}

/// Looks words up in a lexicon.
///
/// Fragment keys are ordered once, longest first, when the matcher is
/// created.
#[derive(Debug, Clone)]
pub struct Matcher {
    lexicon: Arc<Lexicon>,
    scan_order: BTreeMap<MatchKind, Vec<String>>,
    conflict_scan: ConflictScan,
}

impl Matcher {
    /// Create a matcher over `lexicon`.
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        let scan_order = MatchKind::FRAGMENTS
            .into_iter()
            .map(|kind| {
                let mut keys: Vec<String> = lexicon
                    .table()
                    .get(&kind)
                    .map(|entries| entries.keys().cloned().collect())
                    .unwrap_or_default();
                keys.sort_by(|a, b| {
                    b.chars()
                        .count()
                        .cmp(&a.chars().count())
                        .then_with(|| a.cmp(b))
                });
                (kind, keys)
            })
            .collect();
        Self {
            lexicon,
            scan_order,
            conflict_scan: ConflictScan::default(),
        }
    }

    /// Set how competing conflict fragments are resolved.
    #[must_use]
    pub const fn with_conflict_scan(mut self, conflict_scan: ConflictScan) -> Self {
        self.conflict_scan = conflict_scan;
        self
    }

    /// The configured conflict scan mode.
    pub const fn conflict_scan(&self) -> ConflictScan {
        self.conflict_scan
    }

    /// The lexicon this matcher reads.
    pub const fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    /// Resolve the first candidate that matches anything.
    ///
    /// Returns `Ok(None)` when no candidate matches.
    ///
    /// # Errors
    ///
    /// Returns [`AbbreviationError::Ambiguous`] when a candidate hits a
    /// conflict entry that `languages` does not narrow to exactly one
    /// language.
    pub fn resolve<S: AsRef<str>>(
        &self,
        candidates: &[S],
        languages: &BTreeSet<String>,
    ) -> AbbreviationResult<Option<MatchOutcome>> {
        for candidate in candidates {
            let candidate = candidate.as_ref();
            if let Some(outcome) = self.resolve_conflict(candidate, languages)? {
                return Ok(Some(outcome));
            }
            if let Some(outcome) = self.lookup_table(candidate) {
                return Ok(Some(outcome));
            }
        }
        Ok(None)
    }

    fn resolve_conflict(
        &self,
        candidate: &str,
        languages: &BTreeSet<String>,
    ) -> AbbreviationResult<Option<MatchOutcome>> {
        let conflicts = self.lexicon.conflicts();

        if let Some(variants) = conflicts
            .get(&MatchKind::FullWord)
            .and_then(|entries| entries.get(candidate))
        {
            return pick_language(candidate, MatchKind::FullWord, candidate, variants, languages)
                .map(Some);
        }

        let mut result = None;
        for kind in MatchKind::FRAGMENTS {
            if result.is_some() {
                break;
            }
            let Some(entries) = conflicts.get(&kind) else {
                continue;
            };
            for (fragment, variants) in entries {
                if !kind.matches(candidate, fragment) {
                    continue;
                }
                result = Some(pick_language(candidate, kind, fragment, variants, languages)?);
                if self.conflict_scan == ConflictScan::FirstMatch {
                    break;
                }
            }
        }
        Ok(result)
    }

    fn lookup_table(&self, candidate: &str) -> Option<MatchOutcome> {
        let table = self.lexicon.table();
        let outcome = |kind: MatchKind, key: &str, abbreviation: &Abbreviation| MatchOutcome {
            abbreviation: abbreviation.clone(),
            kind,
            key: key.to_string(),
            candidate: candidate.to_string(),
            source: MatchSource::Table,
        };

        if let Some(abbreviation) = table
            .get(&MatchKind::FullWord)
            .and_then(|entries| entries.get(candidate))
        {
            return Some(outcome(MatchKind::FullWord, candidate, abbreviation));
        }

        for kind in MatchKind::FRAGMENTS {
            let (Some(keys), Some(entries)) = (self.scan_order.get(&kind), table.get(&kind)) else {
                continue;
            };
            if let Some(key) = keys.iter().find(|key| kind.matches(candidate, key))
                && let Some(abbreviation) = entries.get(key)
            {
                return Some(outcome(kind, key, abbreviation));
            }
        }
        None
    }
}

/// Select the single requested language of a conflict entry.
fn pick_language(
    candidate: &str,
    kind: MatchKind,
    key: &str,
    variants: &BTreeMap<String, Abbreviation>,
    languages: &BTreeSet<String>,
) -> AbbreviationResult<MatchOutcome> {
    let mut selected = variants
        .iter()
        .filter(|(language, _)| languages.contains(*language));
    match (selected.next(), selected.next()) {
        (Some((language, abbreviation)), None) => {
            tracing::debug!(candidate, key, %language, "resolved conflict entry");
            Ok(MatchOutcome {
                abbreviation: abbreviation.clone(),
                kind,
                key: key.to_string(),
                candidate: candidate.to_string(),
                source: MatchSource::Conflict {
                    language: language.clone(),
                },
            })
        }
        _ => Err(AbbreviationError::Ambiguous {
            word: candidate.to_string(),
            fragment: (kind != MatchKind::FullWord).then(|| key.to_string()),
            kind,
            languages: variants.keys().cloned().collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexiconSource;

    const FIXTURE: &str = "\
labor\tlab.\teng
labor\tn.a.\tspa, lat
electr-\telectr.\teng
electronic-\telectron.\teng
energy\tn.a.\teng
-graphy\t-gr.\teng
-ography\t-ogr.\teng
-physic-\t-phys.\teng
proceeding\tproc.\teng
ingeni-\ting.\tfre
ingeni-\tingen.\tspa, ita
inge-\tin.\tdan
inge-\tig.\tswe
-logie\t-log.\tfre
-logie\t-logie\tger
-techn-\t-tech.\teng
-techn-\t-techn.\tger
";

    fn matcher() -> Matcher {
        let source = LexiconSource::from_strings("test", FIXTURE, "");
        Matcher::new(Arc::new(Lexicon::build(&source).unwrap()))
    }

    fn langs(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|code| (*code).to_string()).collect()
    }

    fn resolve(
        matcher: &Matcher,
        word: &str,
        codes: &[&str],
    ) -> AbbreviationResult<Option<MatchOutcome>> {
        matcher.resolve(&[word], &langs(codes))
    }

    fn abbr(text: &str) -> Abbreviation {
        Abbreviation::Abbreviated(text.to_string())
    }

    #[test]
    fn full_word_table_match() {
        let outcome = resolve(&matcher(), "proceeding", &[]).unwrap().unwrap();
        assert_eq!(outcome.abbreviation, abbr("proc"));
        assert_eq!(outcome.kind, MatchKind::FullWord);
        assert_eq!(outcome.source, MatchSource::Table);
    }

    #[test]
    fn longest_prefix_wins() {
        let outcome = resolve(&matcher(), "electronics", &[]).unwrap().unwrap();
        assert_eq!(outcome.key, "electronic");
        assert_eq!(outcome.abbreviation, abbr("electron"));

        let outcome = resolve(&matcher(), "electrical", &[]).unwrap().unwrap();
        assert_eq!(outcome.key, "electr");
    }

    #[test]
    fn longest_suffix_wins() {
        let outcome = resolve(&matcher(), "oceanography", &[]).unwrap().unwrap();
        assert_eq!(outcome.kind, MatchKind::Suffix);
        assert_eq!(outcome.key, "ography");
    }

    #[test]
    fn infix_match() {
        let outcome = resolve(&matcher(), "astrophysical", &[]).unwrap().unwrap();
        assert_eq!(outcome.kind, MatchKind::Infix);
        assert_eq!(outcome.abbreviation, abbr("phys"));
    }

    #[test]
    fn not_abbreviated_entries_still_match() {
        let outcome = resolve(&matcher(), "energy", &[]).unwrap().unwrap();
        assert_eq!(outcome.abbreviation, Abbreviation::NotAbbreviated);
    }

    #[test]
    fn no_match_is_none() {
        assert!(resolve(&matcher(), "army", &[]).unwrap().is_none());
    }

    #[test]
    fn later_candidates_are_tried() {
        let outcome = matcher()
            .resolve(&["proceedings", "proceeding"], &BTreeSet::new())
            .unwrap()
            .unwrap();
        assert_eq!(outcome.candidate, "proceeding");
    }

    #[test]
    fn full_word_conflict_resolves_with_one_language() {
        let outcome = resolve(&matcher(), "labor", &["eng", "ger"]).unwrap().unwrap();
        assert_eq!(outcome.abbreviation, abbr("lab"));
        assert_eq!(
            outcome.source,
            MatchSource::Conflict {
                language: "eng".to_string()
            }
        );
    }

    #[test]
    fn full_word_conflict_without_languages_is_ambiguous() {
        let err = resolve(&matcher(), "labor", &[]).unwrap_err();
        let AbbreviationError::Ambiguous {
            word,
            fragment,
            languages,
            ..
        } = err;
        assert_eq!(word, "labor");
        assert!(fragment.is_none());
        assert_eq!(languages, vec!["eng", "lat", "spa"]);
    }

    #[test]
    fn full_word_conflict_with_two_languages_is_ambiguous() {
        assert!(resolve(&matcher(), "labor", &["eng", "spa"]).is_err());
    }

    #[test]
    fn prefix_conflict_reports_fragment() {
        let err = resolve(&matcher(), "ingenieria", &[]).unwrap_err();
        let AbbreviationError::Ambiguous { fragment, kind, .. } = err;
        assert_eq!(kind, MatchKind::Prefix);
        assert_eq!(fragment.as_deref(), Some("inge"));
    }

    #[test]
    fn conflict_wins_over_table() {
        let outcome = resolve(&matcher(), "ingenieria", &["spa", "swe"]).unwrap().unwrap();
        assert!(matches!(outcome.source, MatchSource::Conflict { .. }));
    }

    #[test]
    fn last_matching_conflict_fragment_wins_by_default() {
        // "inge" sorts before "ingeni"; both match, the later one wins.
        let outcome = resolve(&matcher(), "ingenieria", &["spa", "swe"]).unwrap().unwrap();
        assert_eq!(outcome.key, "ingeni");
        assert_eq!(outcome.abbreviation, abbr("ingen"));
    }

    #[test]
    fn first_match_scan_stops_at_first_fragment() {
        let matcher = matcher().with_conflict_scan(ConflictScan::FirstMatch);
        let outcome = resolve(&matcher, "ingenieria", &["spa", "swe"]).unwrap().unwrap();
        assert_eq!(outcome.key, "inge");
        assert_eq!(outcome.abbreviation, abbr("ig"));
    }

    #[test]
    fn any_unresolvable_fragment_fails_in_last_match_mode() {
        // "inge" resolves through swe; "ingeni" has no requested language.
        assert!(resolve(&matcher(), "ingenieria", &["swe"]).is_err());
    }

    #[test]
    fn first_match_mode_ignores_later_fragments() {
        let matcher = matcher().with_conflict_scan(ConflictScan::FirstMatch);
        let outcome = resolve(&matcher, "ingenieria", &["swe"]).unwrap().unwrap();
        assert_eq!(outcome.abbreviation, abbr("ig"));
    }

    #[test]
    fn suffix_conflict_resolves_with_one_language() {
        let outcome = resolve(&matcher(), "biologie", &["fre"]).unwrap().unwrap();
        assert_eq!(outcome.kind, MatchKind::Suffix);
        assert_eq!(outcome.key, "logie");
        assert_eq!(outcome.abbreviation, abbr("log"));
        assert_eq!(
            outcome.source,
            MatchSource::Conflict {
                language: "fre".to_string()
            }
        );
    }

    #[test]
    fn infix_conflict_resolves_with_one_language() {
        let outcome = resolve(&matcher(), "biotechnology", &["ger"]).unwrap().unwrap();
        assert_eq!(outcome.kind, MatchKind::Infix);
        assert_eq!(outcome.key, "techn");
        assert_eq!(outcome.abbreviation, abbr("techn"));
    }

    #[test]
    fn suffix_conflict_error_names_fragment_and_kind() {
        let err = resolve(&matcher(), "biologie", &["eng"]).unwrap_err();
        let AbbreviationError::Ambiguous {
            word,
            fragment,
            kind,
            languages,
        } = err;
        assert_eq!(word, "biologie");
        assert_eq!(fragment.as_deref(), Some("logie"));
        assert_eq!(kind, MatchKind::Suffix);
        assert_eq!(languages, vec!["fre", "ger"]);
    }

    #[test]
    fn infix_conflict_error_names_fragment_and_kind() {
        let err = resolve(&matcher(), "biotechnology", &[]).unwrap_err();
        let AbbreviationError::Ambiguous {
            fragment,
            kind,
            languages,
            ..
        } = err;
        assert_eq!(fragment.as_deref(), Some("techn"));
        assert_eq!(kind, MatchKind::Infix);
        assert_eq!(languages, vec!["eng", "ger"]);
    }

    #[test]
    fn resolved_prefix_conflict_skips_suffix_and_infix_conflicts() {
        // The suffix "logie" and infix "techn" have no requested language,
        // but the prefix conflicts resolve first.
        let outcome = resolve(&matcher(), "ingenieurtechnologie", &["spa", "swe"])
            .unwrap()
            .unwrap();
        assert_eq!(outcome.kind, MatchKind::Prefix);
        assert_eq!(outcome.key, "ingeni");

        assert!(resolve(&matcher(), "biotechnologie", &["spa", "swe"]).is_err());
    }

    #[test]
    fn conflict_reached_through_later_candidate() {
        let outcome = matcher()
            .resolve(&["biologies", "biologie"], &langs(&["ger"]))
            .unwrap()
            .unwrap();
        assert_eq!(outcome.candidate, "biologie");
        assert_eq!(outcome.kind, MatchKind::Suffix);
        assert_eq!(outcome.abbreviation, abbr("logie"));

        let err = matcher()
            .resolve(&["biologies", "biologie"], &BTreeSet::new())
            .unwrap_err();
        let AbbreviationError::Ambiguous { word, .. } = err;
        assert_eq!(word, "biologie");
    }

    #[test]
    fn conflict_scan_names() {
        assert_eq!(ConflictScan::default(), ConflictScan::LastMatch);
        assert_eq!(ConflictScan::FirstMatch.to_string(), "first-match");
    }
}
