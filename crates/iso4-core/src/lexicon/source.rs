//! LTWA source data: the tab-separated table and the stopword list.

use std::borrow::Cow;
use std::collections::BTreeSet;

use camino::Utf8Path;

use crate::config::Config;
use crate::error::{LexiconError, LexiconResult};
use crate::normalize::normalize_word;

use super::LTWA_VERSION;

const BUNDLED_LTWA: &str = include_str!("../../data/ltwa.tsv");
const BUNDLED_STOPWORDS: &str = include_str!("../../data/stopwords.txt");

/// One row of the LTWA table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Word, multi-word term or hyphenated fragment, as written in the LTWA.
    pub pattern: String,
    /// Abbreviation, or `n.a.`.
    pub abbreviation: String,
    /// Comma-separated ISO 639-2/B language codes.
    pub languages: String,
}

impl SourceEntry {
    /// The language codes of this row, trimmed, in source order.
    pub fn language_codes(&self) -> impl Iterator<Item = &str> {
        self.languages
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

/// The raw text an LTWA lexicon is compiled from.
#[derive(Debug, Clone)]
pub struct LexiconSource {
    version: String,
    ltwa: Cow<'static, str>,
    stopwords: Cow<'static, str>,
}

impl LexiconSource {
    /// The LTWA sample and stopword list shipped with the crate.
    pub fn bundled() -> Self {
        Self {
            version: LTWA_VERSION.to_string(),
            ltwa: Cow::Borrowed(BUNDLED_LTWA),
            stopwords: Cow::Borrowed(BUNDLED_STOPWORDS),
        }
    }

    /// Source data held in memory.
    pub fn from_strings(
        version: impl Into<String>,
        ltwa: impl Into<String>,
        stopwords: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            ltwa: Cow::Owned(ltwa.into()),
            stopwords: Cow::Owned(stopwords.into()),
        }
    }

    /// Read source data from files.
    ///
    /// A path left unset falls back to the bundled table or stopword list. The
    /// version defaults to the table's file stem (e.g. `LTWA_20170914`).
    pub fn from_files(
        ltwa_path: Option<&Utf8Path>,
        stopwords_path: Option<&Utf8Path>,
        version: Option<&str>,
    ) -> LexiconResult<Self> {
        let ltwa = match ltwa_path {
            Some(path) => Cow::Owned(read_file(path)?),
            None => Cow::Borrowed(BUNDLED_LTWA),
        };
        let stopwords = match stopwords_path {
            Some(path) => Cow::Owned(read_file(path)?),
            None => Cow::Borrowed(BUNDLED_STOPWORDS),
        };
        let version = version
            .map(str::to_string)
            .or_else(|| ltwa_path.and_then(Utf8Path::file_stem).map(str::to_string))
            .unwrap_or_else(|| LTWA_VERSION.to_string());
        Ok(Self {
            version,
            ltwa,
            stopwords,
        })
    }

    /// Read the source files named by a configuration.
    pub fn from_config(config: &Config) -> LexiconResult<Self> {
        Self::from_files(
            config.ltwa_path.as_deref(),
            config.stopwords_path.as_deref(),
            config.ltwa_version.as_deref(),
        )
    }

    /// Version tag used to key the lexicon cache.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub(super) fn ltwa_text(&self) -> &str {
        &self.ltwa
    }

    pub(super) fn stopwords_text(&self) -> &str {
        &self.stopwords
    }

    /// Parse the LTWA table into rows.
    ///
    /// Blank lines and `#` comment lines are skipped. Every other line must
    /// have three tab-separated fields and a non-empty pattern.
    pub fn entries(&self) -> LexiconResult<Vec<SourceEntry>> {
        let mut entries = Vec::new();
        for (index, line) in self.ltwa.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let [pattern, abbreviation, languages] = fields.as_slice() else {
                return Err(LexiconError::MalformedRow {
                    line: index + 1,
                    reason: format!("expected 3 tab-separated fields, found {}", fields.len()),
                });
            };
            if pattern.trim().is_empty() {
                return Err(LexiconError::MalformedRow {
                    line: index + 1,
                    reason: "empty word".to_string(),
                });
            }
            entries.push(SourceEntry {
                pattern: pattern.trim().to_string(),
                abbreviation: abbreviation.trim().to_string(),
                languages: languages.trim().to_string(),
            });
        }
        Ok(entries)
    }

    /// The normalized stopword set, one word per line.
    pub fn stopwords(&self) -> BTreeSet<String> {
        self.stopwords
            .lines()
            .map(normalize_word)
            .filter(|word| !word.is_empty())
            .collect()
    }
}

fn read_file(path: &Utf8Path) -> LexiconResult<String> {
    std::fs::read_to_string(path.as_std_path()).map_err(|source| LexiconError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_rows_and_skips_comments() {
        let source = LexiconSource::from_strings(
            "test",
            "# header\njournal\tj.\teng, fre\n\nphysic-\tphys.\teng\r\n",
            "of\n",
        );
        let entries = source.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].pattern, "journal");
        assert_eq!(entries[0].language_codes().collect::<Vec<_>>(), vec!["eng", "fre"]);
        assert_eq!(entries[1].languages, "eng");
    }

    #[test]
    fn rejects_rows_with_missing_fields() {
        let source = LexiconSource::from_strings("test", "journal\tj.\teng\nphysic-\tphys.\n", "");
        let err = source.entries().unwrap_err();
        assert!(matches!(err, LexiconError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn rejects_empty_pattern() {
        let source = LexiconSource::from_strings("test", " \tj.\teng\n", "");
        assert!(matches!(
            source.entries(),
            Err(LexiconError::MalformedRow { line: 1, .. })
        ));
    }

    #[test]
    fn stopwords_are_normalized_and_deduplicated() {
        let source = LexiconSource::from_strings("test", "", "Of\nof\n\nFür\n");
        let stopwords = source.stopwords();
        assert_eq!(stopwords.len(), 2);
        assert!(stopwords.contains("of"));
        assert!(stopwords.contains("fu\u{308}r"));
    }

    #[test]
    fn bundled_source_parses() {
        let source = LexiconSource::bundled();
        assert_eq!(source.version(), LTWA_VERSION);
        assert!(!source.entries().unwrap().is_empty());
    }

    #[test]
    fn file_source_uses_file_stem_as_version() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("LTWA_20240101.tsv");
        std::fs::write(&path, "journal\tj.\teng\n").unwrap();
        let path = camino::Utf8PathBuf::try_from(path).unwrap();

        let source = LexiconSource::from_files(Some(&path), None, None).unwrap();
        assert_eq!(source.version(), "LTWA_20240101");
        assert_eq!(source.entries().unwrap().len(), 1);
        assert!(source.stopwords().contains("of"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = LexiconSource::from_files(
            Some(Utf8Path::new("/nonexistent/ltwa.tsv")),
            None,
            Some("x"),
        )
        .unwrap_err();
        assert!(matches!(err, LexiconError::Io { .. }));
    }
}
