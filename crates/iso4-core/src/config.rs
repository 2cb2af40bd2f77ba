//! Layered settings for iso4.
//!
//! Sources are merged with figment, later layers winning:
//!
//! 1. built-in defaults (periods on, no languages, bundled LTWA)
//! 2. the user file `config.<ext>` in the platform config directory
//! 3. the project files `.iso4.<ext>` then `iso4.<ext>` from the nearest
//!    directory above the working directory that has any, without crossing
//!    a `.git` directory
//! 4. files passed explicitly, e.g. with `--config`
//! 5. `ISO4_*` environment variables (`ISO4_LANGUAGES=[eng,fre]`)
//!
//! `<ext>` is `toml`, `yaml`, `yml` or `json`; files of several formats in
//! one directory are all merged in that order.
//!
//! ```no_run
//! use camino::Utf8Path;
//! use iso4_core::config::ConfigLoader;
//!
//! let (config, sources) = ConfigLoader::new()
//!     .with_project_search(Utf8Path::new("."))
//!     .load()?;
//! let options = config.abbreviate_options();
//! println!("{:?} from {:?}", options.languages, sources.primary_file());
//! # Ok::<(), iso4_core::ConfigError>(())
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::abbreviator::AbbreviateOptions;
use crate::error::{ConfigError, ConfigResult};
use crate::matcher::ConflictScan;

/// Every iso4 setting, with defaults for anything left unset.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Default tracing level when neither `RUST_LOG` nor `-v`/`-q` is given.
    pub log_level: LogLevel,
    /// Directory for JSONL log files. File logging is off when unset.
    pub log_dir: Option<Utf8PathBuf>,
    /// Append periods to abbreviated words (default: `true`).
    pub periods: bool,
    /// Default disambiguation languages (ISO 639-2/B codes, e.g. `["eng"]`).
    pub languages: Vec<String>,
    /// How competing language-dependent fragments are resolved.
    pub conflict_scan: ConflictScan,
    /// LTWA table in tab-separated `word<TAB>abbreviation<TAB>languages`
    /// layout. The bundled sample is used when unset.
    pub ltwa_path: Option<Utf8PathBuf>,
    /// Stopword list, one word per line. The bundled list is used when unset.
    pub stopwords_path: Option<Utf8PathBuf>,
    /// Version tag of the LTWA data at `ltwa_path` (defaults to its file stem).
    pub ltwa_version: Option<String>,
    /// Directory for compiled lexicon caches (falls back to the platform
    /// cache directory).
    pub cache_dir: Option<Utf8PathBuf>,
    /// Always rebuild the lexicon instead of using the cache.
    pub no_cache: bool,
    /// Size cap for `abbreviate --file` inputs; 5 MiB when unset.
    pub max_input_bytes: Option<usize>,
    /// Read title files of any size, ignoring `max_input_bytes`.
    pub disable_input_limit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_dir: None,
            periods: true,
            languages: Vec::new(),
            conflict_scan: ConflictScan::default(),
            ltwa_path: None,
            stopwords_path: None,
            ltwa_version: None,
            cache_dir: None,
            no_cache: false,
            max_input_bytes: None,
            disable_input_limit: false,
        }
    }
}

impl Config {
    /// The abbreviation options this configuration sets by default.
    pub fn abbreviate_options(&self) -> AbbreviateOptions {
        AbbreviateOptions::new()
            .with_periods(self.periods)
            .with_languages(self.languages.iter().cloned())
    }

    /// The effective input size limit, or `None` when disabled.
    pub fn input_limit(&self) -> Option<usize> {
        (!self.disable_input_limit)
            .then(|| self.max_input_bytes.unwrap_or(crate::DEFAULT_MAX_INPUT_BYTES))
    }
}

/// Default log verbosity.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-word matching detail.
    Debug,
    /// Lifecycle events such as configuration and lexicon loading.
    #[default]
    Info,
    /// Recoverable problems, e.g. an unwritable cache.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// The level as a tracing filter directive.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// The files a [`Config`] was merged from, for `info` and `doctor`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigSources {
    /// Project files from the nearest directory, lowest precedence first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project_files: Vec<Utf8PathBuf>,
    /// The user file, if one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_file: Option<Utf8PathBuf>,
    /// Files given explicitly, in the order given.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigSources {
    /// The file with the final say: the last explicit file, else the last
    /// project file, else the user file.
    pub fn primary_file(&self) -> Option<&Utf8Path> {
        self.explicit_files
            .last()
            .or_else(|| self.project_files.last())
            .or(self.user_file.as_ref())
            .map(Utf8PathBuf::as_path)
    }
}

/// Formats in merge order.
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

const APP_NAME: &str = "iso4";

const ENV_PREFIX: &str = "ISO4_";

/// Collects and merges the configuration layers.
#[derive(Debug)]
pub struct ConfigLoader {
    project_search_root: Option<Utf8PathBuf>,
    include_user_config: bool,
    boundary_marker: Option<String>,
    explicit_files: Vec<Utf8PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// A loader that reads the user file and stops project search at `.git`.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Look for project files from `path` upwards.
    #[must_use]
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Turn the user config layer on or off.
    #[must_use]
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Stop project search at a directory holding `marker`, or never stop
    /// with `None`.
    #[must_use]
    pub fn with_boundary_marker(mut self, marker: Option<&str>) -> Self {
        self.boundary_marker = marker.map(str::to_string);
        self
    }

    /// Merge `path` above every discovered file.
    #[must_use]
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Merge all layers into a [`Config`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::Deserialize`] when a file cannot be parsed or a value
    /// has the wrong type (e.g. an unknown `conflict_scan`).
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<(Config, ConfigSources)> {
        let sources = ConfigSources {
            user_file: self
                .include_user_config
                .then(find_user_config)
                .flatten(),
            project_files: self
                .project_search_root
                .as_deref()
                .map(|root| self.find_project_configs(root))
                .unwrap_or_default(),
            explicit_files: self.explicit_files,
        };
        tracing::debug!(?sources, "merging configuration");

        let figment = sources
            .user_file
            .iter()
            .chain(&sources.project_files)
            .chain(&sources.explicit_files)
            .fold(
                Figment::from(Serialized::defaults(Config::default())),
                merge_file,
            )
            .merge(Env::prefixed(ENV_PREFIX).lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::info!(
            log_level = config.log_level.as_str(),
            periods = config.periods,
            languages = ?config.languages,
            conflict_scan = %config.conflict_scan,
            "configuration loaded"
        );
        Ok((config, sources))
    }

    /// The project files of the nearest directory at or above `start` that
    /// has any: dotfiles first, then regular names, each in extension order.
    fn find_project_configs(&self, start: &Utf8Path) -> Vec<Utf8PathBuf> {
        for dir in start.ancestors() {
            let found: Vec<Utf8PathBuf> = [".", ""]
                .iter()
                .flat_map(|dot| {
                    CONFIG_EXTENSIONS
                        .iter()
                        .map(move |ext| dir.join(format!("{dot}{APP_NAME}.{ext}")))
                })
                .filter(|path| path.is_file())
                .collect();
            if !found.is_empty() {
                return found;
            }
            // A config beside the marker still counts; nothing above it does.
            if dir != start
                && self
                    .boundary_marker
                    .as_ref()
                    .is_some_and(|marker| dir.join(marker).exists())
            {
                break;
            }
        }
        Vec::new()
    }
}

fn find_user_config() -> Option<Utf8PathBuf> {
    let dir = user_config_dir()?;
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
}

fn merge_file(figment: Figment, path: &Utf8PathBuf) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
        Some("json") => figment.merge(Json::file_exact(path.as_str())),
        _ => figment.merge(Toml::file_exact(path.as_str())),
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Where the user config file lives (`~/.config/iso4` on Linux).
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(project_dirs()?.config_dir().to_path_buf()).ok()
}

/// Where compiled lexicons are cached (`~/.cache/iso4` on Linux).
pub fn user_cache_dir() -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(project_dirs()?.cache_dir().to_path_buf()).ok()
}
