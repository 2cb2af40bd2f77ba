//! Lexicon command: statistics and cache maintenance.

use anyhow::{Context, bail};
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, info, instrument};

use iso4_core::{Config, Lexicon, LexiconCache, LexiconSource, LexiconStats};

/// Arguments for the `lexicon` subcommand.
#[derive(Args, Debug, Default)]
pub struct LexiconArgs {
    /// Compile the configured LTWA data and overwrite its cache file.
    #[arg(long)]
    pub rebuild_cache: bool,
}

#[derive(Debug, Serialize)]
struct LexiconReport {
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_file: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    rebuilt: bool,
    #[serde(flatten)]
    stats: LexiconStats,
}

/// Print lexicon statistics, optionally rebuilding the cache first.
#[instrument(name = "cmd_lexicon", skip_all, fields(rebuild = args.rebuild_cache))]
pub fn cmd_lexicon(args: LexiconArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(ltwa_path = ?config.ltwa_path, "executing lexicon command");

    let cache = LexiconCache::from_config(config);
    let source_label = config
        .ltwa_path
        .as_ref()
        .map_or_else(|| "bundled".to_string(), ToString::to_string);

    let (stats, cache_file) = if args.rebuild_cache {
        if config.no_cache {
            bail!("the lexicon cache is disabled (no_cache = true)");
        }
        let Some(ref cache) = cache else {
            bail!("no cache directory available; set cache_dir in the configuration");
        };
        let source = LexiconSource::from_config(config).context("failed to read LTWA data")?;
        let lexicon = Lexicon::build(&source).context("failed to build LTWA lexicon")?;
        let path = cache
            .store(&source, &lexicon)
            .context("failed to write lexicon cache")?;
        info!(path = %path, "lexicon cache rebuilt");
        (lexicon.stats(), Some(path.to_string()))
    } else {
        let lexicon = super::load_lexicon(config)?;
        let cache_file = match (&cache, &config.ltwa_path) {
            (Some(cache), Some(_)) if !config.no_cache => {
                Some(cache.path_for(lexicon.version()).to_string())
            }
            _ => None,
        };
        (lexicon.stats(), cache_file)
    };

    let report = LexiconReport {
        source: source_label,
        cache_file,
        rebuilt: args.rebuild_cache,
        stats,
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} {}", "LTWA".bold(), report.stats.version.green());
    println!("{}: {}", "Source".dimmed(), report.source);
    if let Some(ref path) = report.cache_file {
        let label = if report.rebuilt { "Cache written" } else { "Cache file" };
        println!("{}: {}", label.dimmed(), path.cyan());
    }
    println!();
    println!(
        "{:<10} {:>8} {:>10}",
        "Kind".bold().underline(),
        "Entries".bold().underline(),
        "Conflicts".bold().underline()
    );
    for (kind, counts) in &report.stats.kinds {
        println!("{:<10} {:>8} {:>10}", kind.as_str(), counts.entries, counts.conflicts);
    }
    println!();
    println!("{}: {}", "Multi-word terms".dimmed(), report.stats.multi_word_terms);
    println!("{}: {}", "Stopwords".dimmed(), report.stats.stopwords);

    Ok(())
}
