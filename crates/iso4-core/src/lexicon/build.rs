//! Two-pass compilation of LTWA rows into a [`LexiconData`].
//!
//! The first pass files every row under its [`MatchKind`] and notes any
//! key seen twice as a conflict. The second pass moves conflicting keys out
//! of the main table into the per-language conflict map.

use std::collections::{BTreeMap, BTreeSet};

use super::{Abbreviation, ConflictMap, LexiconData, LtwaTable, MatchKind, SourceEntry};
use crate::normalize::{normalize_abbreviation, normalize_word};

/// A normalized row, ready to be filed.
struct Row<'a> {
    kind: MatchKind,
    key: String,
    abbreviation: Abbreviation,
    entry: &'a SourceEntry,
}

pub(super) fn build_data(version: &str, entries: &[SourceEntry]) -> LexiconData {
    let rows: Vec<Row<'_>> = entries
        .iter()
        .filter_map(|entry| {
            let key = normalize_word(&entry.pattern);
            if key.is_empty() {
                tracing::warn!(pattern = %entry.pattern, "skipping LTWA row with empty key");
                return None;
            }
            Some(Row {
                kind: MatchKind::from_pattern(&entry.pattern),
                key,
                abbreviation: normalize_abbreviation(&entry.abbreviation),
                entry,
            })
        })
        .collect();

    // Pass 1: file rows, remembering duplicated keys and multi-word terms.
    let mut table = LtwaTable::new();
    let mut duplicated: BTreeSet<(MatchKind, String)> = BTreeSet::new();
    let mut multi_word_terms = BTreeSet::new();
    for row in &rows {
        let entries = table.entry(row.kind).or_default();
        if entries.contains_key(&row.key) {
            duplicated.insert((row.kind, row.key.clone()));
        } else if row.key.contains(' ') {
            multi_word_terms.insert(row.key.clone());
        }
        entries.insert(row.key.clone(), row.abbreviation.clone());
    }

    // Pass 2: split duplicated keys out by language.
    let mut conflicts = ConflictMap::new();
    for (kind, key) in &duplicated {
        let duplicates: Vec<&Row<'_>> = rows
            .iter()
            .filter(|row| row.kind == *kind && &row.key == key)
            .collect();
        let mut variants: BTreeMap<String, Abbreviation> = BTreeMap::new();
        for row in &duplicates {
            for language in row.entry.language_codes() {
                variants.insert(language.to_string(), row.abbreviation.clone());
            }
        }

        // Only duplicates that disagree across at least two languages are
        // language-dependent. Agreeing duplicates, or ones naming fewer than
        // two languages, stay in the table.
        let distinct = variants.values().collect::<BTreeSet<_>>().len();
        if variants.len() >= 2 && distinct >= 2 {
            if let Some(entries) = table.get_mut(kind) {
                entries.remove(key);
            }
            conflicts
                .entry(*kind)
                .or_default()
                .insert(key.clone(), variants);
        } else {
            let settled = variants
                .into_values()
                .next()
                .or_else(|| duplicates.last().map(|row| row.abbreviation.clone()));
            tracing::debug!(%kind, %key, "duplicate LTWA entry has a single abbreviation");
            if let Some(abbreviation) = settled {
                table.entry(*kind).or_default().insert(key.clone(), abbreviation);
            }
        }
    }
    table.retain(|_, entries| !entries.is_empty());

    LexiconData {
        version: version.to_string(),
        table,
        conflicts,
        multi_word_terms: multi_word_terms.into_iter().collect(),
    }
}
