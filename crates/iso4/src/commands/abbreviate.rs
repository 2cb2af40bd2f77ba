//! Abbreviate command: titles in, ISO 4 abbreviations out.

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use iso4_core::{
    AbbreviateOptions, AbbreviationError, Abbreviator, Config, ConflictScan, WordReport,
};

/// Arguments for the `abbreviate` subcommand.
#[derive(Args, Debug, Default)]
pub struct AbbreviateArgs {
    /// Titles to abbreviate.
    #[arg(required_unless_present = "file")]
    pub titles: Vec<String>,

    /// Read titles from a file, one per line.
    #[arg(short, long, value_name = "PATH", conflicts_with = "titles")]
    pub file: Option<Utf8PathBuf>,

    /// Omit the period after each abbreviated word.
    #[arg(long)]
    pub no_periods: bool,

    /// Language of the title, used for words whose abbreviation depends on
    /// it (ISO 639-2/B code, repeatable). Replaces configured languages.
    #[arg(short, long = "lang", value_name = "CODE")]
    pub languages: Vec<String>,

    /// Show how each word was resolved.
    #[arg(long)]
    pub explain: bool,

    /// Which fragment conflict decides when several match.
    #[arg(long, value_enum)]
    pub conflict_scan: Option<ConflictScan>,
}

impl AbbreviateArgs {
    fn options(&self, config: &Config) -> AbbreviateOptions {
        let mut options = config.abbreviate_options();
        if self.no_periods {
            options.periods = false;
        }
        if !self.languages.is_empty() {
            options.languages = self.languages.iter().map(|code| code.trim().to_string()).collect();
        }
        options
    }
}

/// The result for one input title.
#[derive(Debug, Serialize)]
struct TitleOutcome {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    abbreviation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// Languages that would resolve an ambiguity.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    words: Option<Vec<WordReport>>,
}

impl TitleOutcome {
    fn run(abbreviator: &Abbreviator, title: &str, options: &AbbreviateOptions, explain: bool) -> Self {
        match abbreviator.explain(title, options) {
            Ok(report) => Self {
                title: report.title,
                abbreviation: Some(report.abbreviation),
                error: None,
                languages: Vec::new(),
                words: explain.then_some(report.words),
            },
            Err(err) => {
                let languages = match &err {
                    AbbreviationError::Ambiguous { languages, .. } => languages.clone(),
                };
                Self {
                    title: title.to_string(),
                    abbreviation: None,
                    error: Some(err.to_string()),
                    languages,
                    words: None,
                }
            }
        }
    }
}

/// Abbreviate each title and print the results.
///
/// Every title is attempted; the command fails afterwards if any of them
/// was ambiguous.
#[instrument(name = "cmd_abbreviate", skip_all, fields(file = ?args.file, titles))]
pub fn cmd_abbreviate(
    args: AbbreviateArgs,
    global_json: bool,
    config: &Config,
    max_input: Option<usize>,
) -> anyhow::Result<()> {
    let titles: Vec<String> = match args.file {
        Some(ref path) => super::read_input_file(path, max_input)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        None => args.titles.clone(),
    };
    tracing::Span::current().record("titles", titles.len());

    let options = args.options(config);
    let mut abbreviator = super::load_abbreviator(config)?;
    if let Some(scan) = args.conflict_scan {
        abbreviator = abbreviator.with_conflict_scan(scan);
    }
    debug!(
        periods = options.periods,
        languages = ?options.languages,
        conflict_scan = %abbreviator.conflict_scan(),
        "executing abbreviate command"
    );

    let progress = if args.file.is_some() && !global_json {
        let bar = ProgressBar::new(titles.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} {pos}/{len} titles {wide_bar}")
                .context("invalid progress bar template")?,
        );
        Some(bar)
    } else {
        None
    };

    let mut outcomes = Vec::with_capacity(titles.len());
    for title in &titles {
        outcomes.push(TitleOutcome::run(&abbreviator, title, &options, args.explain));
        if let Some(ref bar) = progress {
            bar.inc(1);
        }
    }
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();

    if global_json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            print_outcome(outcome, args.explain);
        }
    }

    if failed > 0 {
        if let [only] = outcomes.as_slice()
            && let Some(ref error) = only.error
        {
            bail!("{error}");
        }
        bail!(
            "{failed} of {} titles could not be abbreviated; pass --lang to choose a language",
            outcomes.len()
        );
    }

    Ok(())
}

fn print_outcome(outcome: &TitleOutcome, explain: bool) {
    match (&outcome.abbreviation, &outcome.error) {
        (Some(abbreviation), _) if explain => {
            println!("{} {} {}", outcome.title.bold(), "=>".dimmed(), abbreviation.green());
            if let Some(ref words) = outcome.words {
                for word in words {
                    print_word(word);
                }
            }
            println!();
        }
        (Some(abbreviation), _) => println!("{abbreviation}"),
        (None, Some(error)) => {
            eprintln!("{} {}: {}", "ERROR".red().bold(), outcome.title, error);
        }
        (None, None) => {}
    }
}

fn print_word(word: &WordReport) {
    let detail = if word.stopword {
        "stopword, dropped".dimmed().to_string()
    } else if let Some(ref matched) = word.matched {
        let via = if matched.candidate == word.normalized {
            String::new()
        } else {
            format!(" via {}", matched.candidate)
        };
        format!(
            "{} {}{} ({})",
            matched.kind.cyan(),
            matched.key,
            via,
            matched.source
        )
    } else {
        "no match".yellow().to_string()
    };
    let output = word.output.as_deref().unwrap_or("-");
    println!("  {:<24} {:<16} {}", word.text, output, detail);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(titles: &[&str]) -> AbbreviateArgs {
        AbbreviateArgs {
            titles: titles.iter().map(|t| t.to_string()).collect(),
            ..AbbreviateArgs::default()
        }
    }

    #[test]
    fn flags_override_config() {
        let config = Config {
            languages: vec!["fre".to_string()],
            ..Config::default()
        };
        let mut args = args(&["Labor History"]);
        args.no_periods = true;
        args.languages = vec!["eng".to_string()];

        let options = args.options(&config);
        assert!(!options.periods);
        assert_eq!(options.languages.into_iter().collect::<Vec<_>>(), vec!["eng"]);
    }

    #[test]
    fn config_languages_apply_without_flags() {
        let config = Config {
            languages: vec!["eng".to_string()],
            periods: false,
            ..Config::default()
        };
        let options = args(&["Labor History"]).options(&config);
        assert!(!options.periods);
        assert!(options.languages.contains("eng"));
    }

    #[test]
    fn outcome_reports_ambiguity_languages() {
        let abbreviator = Abbreviator::bundled();
        let outcome = TitleOutcome::run(
            &abbreviator,
            "Labor History",
            &AbbreviateOptions::default(),
            false,
        );
        assert!(outcome.abbreviation.is_none());
        assert_eq!(outcome.languages, vec!["eng", "lat", "spa"]);
    }

    #[test]
    fn outcome_keeps_words_only_when_explaining() {
        let abbreviator = Abbreviator::bundled();
        let options = AbbreviateOptions::default();
        let plain = TitleOutcome::run(&abbreviator, "Journal of Applied Physics", &options, false);
        assert_eq!(plain.abbreviation.as_deref(), Some("J. Appl. Phys."));
        assert!(plain.words.is_none());

        let explained =
            TitleOutcome::run(&abbreviator, "Journal of Applied Physics", &options, true);
        assert_eq!(explained.words.map(|w| w.len()), Some(4));
    }

    #[test]
    fn cmd_succeeds_for_plain_titles() {
        let result = cmd_abbreviate(
            args(&["Journal of Applied Physics", "Physics"]),
            false,
            &Config::default(),
            None,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn cmd_fails_on_ambiguity() {
        let err = cmd_abbreviate(args(&["Labor History"]), true, &Config::default(), None)
            .unwrap_err();
        assert!(err.to_string().contains("eng, lat, spa"));
    }
}
