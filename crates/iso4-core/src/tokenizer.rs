//! Title tokenization.
//!
//! Titles split on whitespace, except that multi-word LTWA terms such as
//! "united states" stay together as one unit. The pattern is compiled once
//! per lexicon from its multi-word term list.

use regex::Regex;

use crate::error::LexiconResult;

/// Splits titles into word units, keeping multi-word terms intact.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    pattern: Regex,
}

impl Tokenizer {
    /// Compile a tokenizer for the given normalized multi-word terms.
    ///
    /// Terms match case-insensitively and only when bounded by whitespace or
    /// the ends of the title. Longer terms are tried first.
    pub fn new<I, S>(terms: I) -> LexiconResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms: Vec<String> = terms
            .into_iter()
            .map(|term| term.as_ref().to_string())
            .filter(|term| !term.trim().is_empty())
            .collect();
        terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));
        terms.dedup();

        let pattern = if terms.is_empty() {
            r"\s+".to_string()
        } else {
            let alternatives = terms
                .iter()
                .map(|term| regex::escape(term))
                .collect::<Vec<_>>()
                .join("|");
            format!(r"(?i)(?:^|\s+)(?P<term>{alternatives})(?:\s|$)|\s+")
        };

        tracing::debug!(terms = terms.len(), "compiled title tokenizer");
        Ok(Self {
            pattern: Regex::new(&pattern)?,
        })
    }

    /// Split a title into its word units, in order.
    ///
    /// Whitespace-only fragments are discarded. A matched multi-word term is
    /// returned without the whitespace that delimited it.
    pub fn split<'a>(&self, title: &'a str) -> Vec<&'a str> {
        let mut fragments = Vec::new();
        let mut last = 0;
        let mut pos = 0;

        while pos < title.len() {
            let Some(caps) = self.pattern.captures_at(title, pos) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            fragments.push(&title[last..whole.start()]);
            if let Some(term) = caps.name("term") {
                fragments.push(term.as_str());
                // The trailing delimiter may open the next term.
                last = term.end();
                pos = term.end();
            } else {
                last = whole.end();
                pos = whole.end();
            }
        }
        fragments.push(&title[last..]);

        fragments
            .into_iter()
            .filter(|fragment| !fragment.trim().is_empty())
            .collect()
    }
}
