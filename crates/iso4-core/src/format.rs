//! Output formatting: capitalization, periods and final assembly.

use unicode_normalization::UnicodeNormalization;

use crate::lexicon::Abbreviation;
use crate::normalize::Capitalization;

/// Render one title word.
///
/// A matched abbreviation is written part by part in the word's
/// capitalization, each part followed by a period when `periods` is set.
/// Unmatched words and words the LTWA keeps in full (`source` is the
/// normalized word) only get the capitalization.
pub fn format_word(
    source: &str,
    abbreviation: Option<&Abbreviation>,
    capitalization: Capitalization,
    periods: bool,
) -> String {
    match abbreviation.and_then(Abbreviation::as_abbreviated) {
        Some(abbreviated) => abbreviated
            .split(' ')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut part = capitalization.apply(part);
                if periods {
                    part.push('.');
                }
                part
            })
            .collect::<Vec<_>>()
            .join(" "),
        None => source
            .split(' ')
            .map(|part| capitalization.apply(part))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Join rendered words with single spaces and recompose (NFKC).
pub fn assemble<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = words
        .into_iter()
        .map(|word| word.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    joined.nfkc().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abbr(text: &str) -> Abbreviation {
        Abbreviation::Abbreviated(text.to_string())
    }

    #[test]
    fn periods_follow_each_part() {
        let text = format_word("united states", Some(&abbr("u s")), Capitalization::Titlecase, true);
        assert_eq!(text, "U. S.");
    }

    #[test]
    fn periods_can_be_omitted() {
        let text = format_word("proceeding", Some(&abbr("proc")), Capitalization::Titlecase, false);
        assert_eq!(text, "Proc");
    }

    #[test]
    fn capitalization_is_applied() {
        assert_eq!(
            format_word("journal", Some(&abbr("j")), Capitalization::Uppercase, true),
            "J."
        );
        assert_eq!(
            format_word("physics", Some(&abbr("phys")), Capitalization::Lowercase, true),
            "phys."
        );
    }

    #[test]
    fn unmatched_words_never_get_periods() {
        assert_eq!(format_word("army", None, Capitalization::Titlecase, true), "Army");
        assert_eq!(
            format_word(
                "energy",
                Some(&Abbreviation::NotAbbreviated),
                Capitalization::Uppercase,
                true
            ),
            "ENERGY"
        );
    }

    #[test]
    fn unmatched_multi_word_terms_capitalize_each_part() {
        assert_eq!(
            format_word("new zealand", None, Capitalization::Titlecase, true),
            "New Zealand"
        );
    }

    #[test]
    fn assemble_recomposes() {
        assert_eq!(assemble(["Zeitschrift", "fu\u{308}r"]), "Zeitschrift für");
        assert_eq!(assemble(Vec::<String>::new()), "");
    }
}
