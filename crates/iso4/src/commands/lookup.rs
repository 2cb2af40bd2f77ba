//! Lookup command: which LTWA entries match a word.

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use iso4_core::lemma::{Lemmatizer, NounLemmatizer};
use iso4_core::normalize::normalize_word;
use iso4_core::{Config, LookupEntry};

/// Arguments for the `lookup` subcommand.
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// The word to look up.
    pub word: String,
}

#[derive(Debug, Serialize)]
struct LookupReport {
    word: String,
    normalized: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    lemma: Option<String>,
    stopword: bool,
    entries: Vec<LookupEntry>,
}

/// Show every table and conflict entry matching a word or its lemma.
#[instrument(name = "cmd_lookup", skip_all, fields(word = %args.word))]
pub fn cmd_lookup(args: LookupArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let lexicon = super::load_lexicon(config)?;
    let normalized = normalize_word(&args.word);
    let lemma = Some(NounLemmatizer.lemmatize(&normalized)).filter(|lemma| *lemma != normalized);

    let mut entries = lexicon.lookup(&normalized);
    if let Some(ref lemma) = lemma {
        for entry in lexicon.lookup(lemma) {
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
    }
    debug!(%normalized, entries = entries.len(), "executing lookup command");

    let report = LookupReport {
        stopword: lexicon.is_stopword(&normalized),
        word: args.word,
        normalized,
        lemma,
        entries,
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print!("{}", report.word.bold());
    if report.normalized != report.word {
        print!(" {}", format!("({})", report.normalized).dimmed());
    }
    println!();
    if let Some(ref lemma) = report.lemma {
        println!("{}: {}", "Lemma".dimmed(), lemma);
    }
    if report.stopword {
        println!("{}", "stopword, removed from titles".yellow());
    }
    if report.entries.is_empty() {
        println!("{}", "no LTWA entry".yellow());
    }
    for entry in &report.entries {
        let label = if entry.conflict {
            format!("{} {}", entry.kind, "conflict".red())
        } else {
            entry.kind.to_string()
        };
        println!("{} {}", entry.key.cyan(), label.dimmed());
        for (language, abbreviation) in &entry.abbreviations {
            println!("  {language:<6} {abbreviation}");
        }
    }

    Ok(())
}
