//! Info command implementation

use clap::Args;
use iso4_core::config::{Config, ConfigSources};
use iso4_core::lexicon::LTWA_VERSION;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    homepage: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
    bundled_ltwa: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            homepage: env!("CARGO_PKG_HOMEPAGE"),
            license: env!("CARGO_PKG_LICENSE"),
            bundled_ltwa: LTWA_VERSION,
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    periods: bool,
    languages: Vec<String>,
    conflict_scan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ltwa_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stopwords_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_dir: Option<String>,
    no_cache: bool,
}

impl ConfigInfo {
    fn from_config(config: &Config, sources: &ConfigSources) -> Self {
        Self {
            config_file: sources.primary_file().map(|p| p.to_string()),
            log_level: config.log_level.as_str().to_string(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            periods: config.periods,
            languages: config.languages.clone(),
            conflict_scan: config.conflict_scan.as_str().to_string(),
            ltwa_path: config.ltwa_path.as_ref().map(|p| p.to_string()),
            stopwords_path: config.stopwords_path.as_ref().map(|p| p.to_string()),
            cache_dir: iso4_core::LexiconCache::from_config(config).map(|c| c.dir().to_string()),
            no_cache: config.no_cache,
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
}

/// Print package information
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `sources` - Config source metadata from loading
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    sources: &ConfigSources,
) -> anyhow::Result<()> {
    let info = PackageInfo::new();

    debug!(json_output = global_json, "executing info command");

    let config_info = ConfigInfo::from_config(config, sources);
    let full_info = FullInfo {
        package: info,
        config: config_info,
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&full_info)?);
        return Ok(());
    }

    let package = &full_info.package;
    println!("{} {}", package.name.bold(), package.version.green());
    if !package.description.is_empty() {
        println!("{}", package.description);
    }
    if !package.license.is_empty() {
        println!("{}: {}", "License".dimmed(), package.license);
    }
    if !package.repository.is_empty() {
        println!("{}: {}", "Repository".dimmed(), package.repository.cyan());
    }
    println!("{}: {}", "Bundled LTWA".dimmed(), package.bundled_ltwa);

    let config = &full_info.config;
    println!();
    println!("{}", "Configuration".bold().underline());
    if let Some(ref path) = config.config_file {
        println!("{}: {}", "Config file".dimmed(), path.cyan());
    } else {
        println!("{}: {}", "Config file".dimmed(), "none loaded".yellow());
    }
    println!("{}: {}", "Log level".dimmed(), config.log_level);
    if let Some(ref dir) = config.log_dir {
        println!("{}: {}", "Log directory".dimmed(), dir);
    }

    println!();
    println!("{}", "Abbreviation".bold().underline());
    println!("{}: {}", "Periods".dimmed(), config.periods);
    if config.languages.is_empty() {
        println!("{}: {}", "Languages".dimmed(), "(not set)".dimmed());
    } else {
        println!("{}: {}", "Languages".dimmed(), config.languages.join(", "));
    }
    println!("{}: {}", "Conflict scan".dimmed(), config.conflict_scan);

    println!();
    println!("{}", "Lexicon".bold().underline());
    print_opt("LTWA table", config.ltwa_path.as_deref(), "bundled");
    print_opt("Stopwords", config.stopwords_path.as_deref(), "bundled");
    if config.no_cache {
        println!("{}: {}", "Cache".dimmed(), "disabled".yellow());
    } else {
        print_opt("Cache directory", config.cache_dir.as_deref(), "(unavailable)");
    }

    Ok(())
}

/// Print an optional value or a dimmed fallback.
fn print_opt(label: &str, value: Option<&str>, fallback: &str) {
    match value {
        Some(v) => println!("{}: {}", label.dimmed(), v),
        None => println!("{}: {}", label.dimmed(), fallback.dimmed()),
    }
}
