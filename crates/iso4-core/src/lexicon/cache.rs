//! On-disk cache of compiled lexicons.
//!
//! Compiling the full LTWA export (tens of thousands of rows) takes long
//! enough to notice on every CLI run, so the compiled [`LexiconData`] and
//! stopwords are stored as JSON under the user cache directory, one file per
//! data version. A file written by a different crate version, cache format
//! or source text is treated as a miss and rebuilt.

use std::collections::BTreeSet;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{Lexicon, LexiconData, LexiconSource};
use crate::config::{Config, user_cache_dir};
use crate::error::{LexiconError, LexiconResult};

/// Bumped whenever the layout of [`CachedLexicon`] changes.
const CACHE_FORMAT: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
struct CachedLexicon {
    format: u32,
    crate_version: String,
    fingerprint: String,
    data: LexiconData,
    stopwords: BTreeSet<String>,
}

/// A directory of compiled lexicons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconCache {
    dir: Utf8PathBuf,
}

impl LexiconCache {
    /// A cache rooted at `dir`. The directory is created on first store.
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The platform cache directory (`~/.cache/iso4/` on Linux).
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn user_default() -> Option<Self> {
        user_cache_dir().map(Self::new)
    }

    /// The cache named by `cache_dir`, or the platform default.
    pub fn from_config(config: &Config) -> Option<Self> {
        config
            .cache_dir
            .clone()
            .map(Self::new)
            .or_else(Self::user_default)
    }

    /// The cache directory.
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// File holding the lexicon compiled from data `version`.
    pub fn path_for(&self, version: &str) -> Utf8PathBuf {
        let stem: String = version
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if stem.starts_with("LTWA_") {
            self.dir.join(format!("{stem}.json"))
        } else {
            self.dir.join(format!("LTWA_{stem}.json"))
        }
    }

    /// Read the compiled lexicon for `source`, if a valid one is cached.
    ///
    /// Unreadable, stale or corrupt files are misses, never errors.
    pub fn load(&self, source: &LexiconSource) -> Option<Lexicon> {
        let path = self.path_for(source.version());
        let text = std::fs::read_to_string(path.as_std_path()).ok()?;
        let cached: CachedLexicon = match serde_json::from_str(&text) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::debug!(%path, error = %e, "ignoring unreadable lexicon cache");
                return None;
            }
        };
        if cached.format != CACHE_FORMAT
            || cached.crate_version != env!("CARGO_PKG_VERSION")
            || cached.fingerprint != fingerprint(source)
        {
            tracing::debug!(%path, "lexicon cache is stale");
            return None;
        }
        match Lexicon::from_data(cached.data, cached.stopwords) {
            Ok(lexicon) => Some(lexicon),
            Err(e) => {
                tracing::debug!(%path, error = %e, "cached lexicon failed to load");
                None
            }
        }
    }

    /// Write a compiled lexicon for `source`, replacing any previous file.
    ///
    /// The file is written to a temporary sibling and renamed into place, so
    /// concurrent readers never see a partial file.
    pub fn store(&self, source: &LexiconSource, lexicon: &Lexicon) -> LexiconResult<Utf8PathBuf> {
        let path = self.path_for(source.version());
        let cached = CachedLexicon {
            format: CACHE_FORMAT,
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            fingerprint: fingerprint(source),
            data: lexicon.data().clone(),
            stopwords: lexicon.stopwords().clone(),
        };
        let json = serde_json::to_vec(&cached)?;

        let write_err = |source| LexiconError::CacheWrite {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(self.dir.as_std_path()).map_err(write_err)?;
        let mut tmp = tempfile::NamedTempFile::new_in(self.dir.as_std_path()).map_err(write_err)?;
        tmp.write_all(&json).map_err(write_err)?;
        tmp.persist(path.as_std_path())
            .map_err(|e| write_err(e.error))?;

        tracing::debug!(%path, bytes = json.len(), "lexicon cache written");
        Ok(path)
    }

    /// Load the cached lexicon for `source`, or build and cache it.
    ///
    /// A failure to write the cache is logged and otherwise ignored.
    #[tracing::instrument(skip_all, fields(version = %source.version(), dir = %self.dir))]
    pub fn load_or_build(&self, source: &LexiconSource) -> LexiconResult<Lexicon> {
        if let Some(lexicon) = self.load(source) {
            tracing::debug!("lexicon cache hit");
            return Ok(lexicon);
        }
        let lexicon = Lexicon::build(source)?;
        if let Err(e) = self.store(source, &lexicon) {
            tracing::warn!(error = %e, "could not write lexicon cache");
        }
        Ok(lexicon)
    }
}

/// SHA-256 of the LTWA text and stopword list, each prefixed by its length.
fn fingerprint(source: &LexiconSource) -> String {
    let mut hasher = Sha256::new();
    for text in [source.ltwa_text(), source.stopwords_text()] {
        hasher.update((text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache_in(tmp: &TempDir) -> LexiconCache {
        LexiconCache::new(Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap())
    }

    fn source(ltwa: &str) -> LexiconSource {
        LexiconSource::from_strings("20170914", ltwa, "of\n")
    }

    #[test]
    fn path_is_keyed_by_version() {
        let cache = LexiconCache::new("/cache");
        assert_eq!(cache.path_for("20170914").as_str(), "/cache/LTWA_20170914.json");
        assert_eq!(cache.path_for("LTWA_2024").as_str(), "/cache/LTWA_2024.json");
        assert_eq!(cache.path_for("../x").as_str(), "/cache/LTWA_.._x.json");
    }

    #[test]
    fn store_then_load_hits() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(&tmp);
        let source = source("journal\tj.\teng\nunited states\tu. s.\teng\n");
        let built = Lexicon::build(&source).unwrap();

        let path = cache.store(&source, &built).unwrap();
        assert!(path.is_file());

        let loaded = cache.load(&source).expect("cache hit");
        assert_eq!(loaded.data(), built.data());
        assert_eq!(loaded.stopwords(), built.stopwords());
        assert_eq!(
            loaded.tokenizer().split("The United States"),
            vec!["The", "United States"]
        );
    }

    #[test]
    fn changed_source_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(&tmp);
        let original = source("journal\tj.\teng\n");
        cache
            .store(&original, &Lexicon::build(&original).unwrap())
            .unwrap();

        assert!(cache.load(&source("journal\tjour.\teng\n")).is_none());
    }

    #[test]
    fn fingerprint_is_stable() {
        assert_eq!(
            fingerprint(&source("journal\tj.\teng\n")),
            "f71b418d7520bc85283506dc31c7ccc55fcec71064477f27c21d54c057b21396"
        );
    }

    #[test]
    fn fingerprint_separates_table_from_stopwords() {
        let joined = LexiconSource::from_strings("v", "ab", "c");
        let split = LexiconSource::from_strings("v", "a", "bc");
        assert_ne!(fingerprint(&joined), fingerprint(&split));
    }

    #[test]
    fn corrupt_file_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(&tmp);
        let source = source("journal\tj.\teng\n");
        std::fs::write(cache.path_for(source.version()).as_std_path(), "{not json").unwrap();

        assert!(cache.load(&source).is_none());
        let lexicon = cache.load_or_build(&source).unwrap();
        assert_eq!(lexicon.table().len(), 1);
        assert!(cache.load(&source).is_some());
    }

    #[test]
    fn unwritable_cache_still_builds() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let cache = LexiconCache::new(Utf8PathBuf::try_from(blocker.join("sub")).unwrap());

        let lexicon = cache.load_or_build(&source("journal\tj.\teng\n")).unwrap();
        assert_eq!(lexicon.version(), "20170914");
    }
}
