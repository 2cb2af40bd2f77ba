//! Doctor command: diagnose configuration, data files and the cache.

use anyhow::bail;
use camino::Utf8Path;
use clap::Args;
use iso4_core::config::{Config, ConfigSources};
use iso4_core::{Lexicon, LexiconCache, LexiconSource};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

/// Arguments for the `doctor` subcommand.
#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Ok,
    Warn,
    Fail,
}

#[derive(Debug, Serialize)]
struct Check {
    name: &'static str,
    status: Status,
    detail: String,
}

impl Check {
    fn ok(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: Status::Ok,
            detail: detail.into(),
        }
    }

    fn warn(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: Status::Warn,
            detail: detail.into(),
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: Status::Fail,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    cwd: String,
    checks: Vec<Check>,
}

/// Run every check and print the results.
#[instrument(name = "cmd_doctor", skip_all, fields(cwd = %cwd))]
pub fn cmd_doctor(
    _args: DoctorArgs,
    global_json: bool,
    config: &Config,
    sources: &ConfigSources,
    cwd: &Utf8Path,
) -> anyhow::Result<()> {
    debug!("executing doctor command");

    let report = DoctorReport {
        cwd: cwd.to_string(),
        checks: run_checks(config, sources),
    };
    let failures = report
        .checks
        .iter()
        .filter(|check| check.status == Status::Fail)
        .count();

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}: {}", "Working directory".dimmed(), report.cwd);
        for check in &report.checks {
            let status = match check.status {
                Status::Ok => "ok".green().to_string(),
                Status::Warn => "warn".yellow().to_string(),
                Status::Fail => "FAIL".red().bold().to_string(),
            };
            println!("[{status:^4}] {:<10} {}", check.name.bold(), check.detail);
        }
    }

    if failures > 0 {
        bail!("doctor found {failures} problem(s)");
    }
    Ok(())
}

fn run_checks(config: &Config, sources: &ConfigSources) -> Vec<Check> {
    vec![
        check_config(sources),
        check_ltwa(config),
        check_stopwords(config),
        check_languages(config),
        check_lexicon(config),
        check_cache(config),
    ]
}

fn check_config(sources: &ConfigSources) -> Check {
    match sources.primary_file() {
        Some(path) => Check::ok("config", format!("loaded {path}")),
        None => Check::ok("config", "no config file found, using defaults"),
    }
}

fn check_ltwa(config: &Config) -> Check {
    let Some(ref path) = config.ltwa_path else {
        return Check::ok("ltwa", "bundled sample table");
    };
    match LexiconSource::from_files(Some(path.as_path()), None, config.ltwa_version.as_deref())
        .and_then(|source| source.entries())
    {
        Ok(entries) if entries.is_empty() => Check::warn("ltwa", format!("{path} has no rows")),
        Ok(entries) => Check::ok("ltwa", format!("{path}: {} rows", entries.len())),
        Err(e) => Check::fail("ltwa", e.to_string()),
    }
}

fn check_stopwords(config: &Config) -> Check {
    let Some(ref path) = config.stopwords_path else {
        return Check::ok("stopwords", "bundled list");
    };
    match LexiconSource::from_files(None, Some(path.as_path()), None) {
        Ok(source) => {
            let count = source.stopwords().len();
            if count == 0 {
                Check::warn("stopwords", format!("{path} lists no stopwords"))
            } else {
                Check::ok("stopwords", format!("{path}: {count} words"))
            }
        }
        Err(e) => Check::fail("stopwords", e.to_string()),
    }
}

fn check_languages(config: &Config) -> Check {
    let invalid: Vec<&str> = config
        .languages
        .iter()
        .map(String::as_str)
        .filter(|code| !is_language_code(code))
        .collect();
    if !invalid.is_empty() {
        Check::warn(
            "languages",
            format!("not ISO 639-2/B codes: {}", invalid.join(", ")),
        )
    } else if config.languages.is_empty() {
        Check::ok("languages", "none configured")
    } else {
        Check::ok("languages", config.languages.join(", "))
    }
}

fn is_language_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_lowercase())
}

fn check_lexicon(config: &Config) -> Check {
    match Lexicon::from_config(config) {
        Ok(lexicon) => {
            let stats = lexicon.stats();
            let entries: usize = stats.kinds.values().map(|k| k.entries).sum();
            let conflicts: usize = stats.kinds.values().map(|k| k.conflicts).sum();
            Check::ok(
                "lexicon",
                format!(
                    "LTWA {}: {entries} entries, {conflicts} conflicts",
                    stats.version
                ),
            )
        }
        Err(e) => Check::fail("lexicon", e.to_string()),
    }
}

fn check_cache(config: &Config) -> Check {
    if config.no_cache {
        return Check::ok("cache", "disabled");
    }
    let Some(cache) = LexiconCache::from_config(config) else {
        return Check::warn("cache", "no cache directory could be determined");
    };
    let dir = cache.dir();
    match std::fs::metadata(dir.as_std_path()) {
        Ok(meta) if !meta.is_dir() => Check::fail("cache", format!("{dir} is not a directory")),
        Ok(meta) if meta.permissions().readonly() => {
            Check::warn("cache", format!("{dir} is read-only"))
        }
        Ok(_) => Check::ok("cache", dir.to_string()),
        Err(_) => Check::ok("cache", format!("{dir} (created on first use)")),
    }
}
