//! Word and sentence segmentation for English text

use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// A surface token before tagging
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawToken {
    pub text: String,
    pub whitespace: bool,
    /// First token of a sentence
    pub sentence_start: bool,
}

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "st", "jr", "sr", "vs", "etc", "inc", "ltd",
];

const CLITICS: &[&str] = &["'s", "'re", "'ve", "'ll", "'d", "'m"];

/// Whether a token closes a sentence
pub(crate) fn is_sentence_end(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| matches!(c, '.' | '!' | '?' | '…'))
}

/// Split `text` into word, clitic and punctuation tokens.
///
/// Word and sentence boundaries follow UAX #29. Abbreviation periods and
/// dotted acronyms are glued back onto their word, runs of terminal
/// punctuation become one token, and clitics are split off.
pub(crate) fn tokenize(text: &str) -> Vec<RawToken> {
    let normalized = text.replace('’', "'");
    let sentence_starts: HashSet<usize> = normalized
        .split_sentence_bound_indices()
        .map(|(offset, _)| offset)
        .collect();

    let mut tokens: Vec<RawToken> = Vec::new();
    let mut glued = false;
    for (offset, segment) in normalized.split_word_bound_indices() {
        if segment.chars().all(char::is_whitespace) {
            if let Some(last) = tokens.last_mut() {
                last.whitespace = true;
            }
            glued = false;
            continue;
        }

        if glued {
            if let Some(last) = tokens.last_mut() {
                if absorbs(&last.text, segment) {
                    last.text.push_str(segment);
                    continue;
                }
            }
        }

        let sentence_start = tokens.is_empty()
            || (sentence_starts.contains(&offset)
                && !tokens.last().is_some_and(|t| is_abbreviation(&t.text)));
        for (k, piece) in split_clitics(segment).into_iter().enumerate() {
            tokens.push(RawToken {
                text: piece,
                whitespace: false,
                sentence_start: sentence_start && k == 0,
            });
        }
        glued = true;
    }
    tokens
}

/// Whether `segment` directly following `prev` belongs to the same token
fn absorbs(prev: &str, segment: &str) -> bool {
    if is_sentence_end(prev) && is_sentence_end(segment) {
        return true;
    }
    segment == "." && (ABBREVIATIONS.contains(&prev.to_lowercase().as_str()) || is_acronym(prev))
}

/// "U.S" before its closing period
fn is_acronym(word: &str) -> bool {
    word.contains('.')
        && !word.ends_with('.')
        && word.chars().all(|c| c == '.' || c.is_alphabetic())
}

fn is_abbreviation(token: &str) -> bool {
    token
        .strip_suffix('.')
        .is_some_and(|core| ABBREVIATIONS.contains(&core.to_lowercase().as_str()))
}

fn split_clitics(word: &str) -> Vec<String> {
    let lower = word.to_lowercase();
    if lower.ends_with("n't") && word.len() > 3 {
        let cut = word.len() - 3;
        return vec![word[..cut].to_string(), word[cut..].to_string()];
    }
    for clitic in CLITICS {
        if lower.ends_with(clitic) && word.len() > clitic.len() {
            let cut = word.len() - clitic.len();
            return vec![word[..cut].to_string(), word[cut..].to_string()];
        }
    }
    vec![word.to_string()]
}

/// Token ranges of sentences
pub(crate) fn sentence_bounds(tokens: &[RawToken]) -> Vec<(usize, usize)> {
    let mut bounds = Vec::new();
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.sentence_start && i > start {
            bounds.push((start, i));
            start = i;
        }
    }
    if start < tokens.len() {
        bounds.push((start, tokens.len()));
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        tokenize(text).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_punctuation_is_split() {
        assert_eq!(
            texts("Hello, world (again)!"),
            vec!["Hello", ",", "world", "(", "again", ")", "!"]
        );
    }

    #[test]
    fn test_clitics() {
        assert_eq!(texts("We don't know"), vec!["We", "do", "n't", "know"]);
        assert_eq!(texts("It’s late"), vec!["It", "'s", "late"]);
        assert_eq!(texts("can't"), vec!["ca", "n't"]);
    }

    #[test]
    fn test_abbreviations_keep_period() {
        assert_eq!(texts("Dr. Smith left."), vec!["Dr.", "Smith", "left", "."]);
        assert_eq!(texts("the U.S. team"), vec!["the", "U.S.", "team"]);
    }

    #[test]
    fn test_ellipsis_is_one_token() {
        assert_eq!(texts("Wait... what?!"), vec!["Wait", "...", "what", "?!"]);
    }

    #[test]
    fn test_whitespace_flags() {
        let tokens = tokenize("Hi there.");
        let flags: Vec<bool> = tokens.iter().map(|t| t.whitespace).collect();
        assert_eq!(flags, vec![true, false, false]);
    }

    #[test]
    fn test_dashes_separate_words() {
        assert_eq!(
            texts("We met in Paris—today we leave."),
            vec!["We", "met", "in", "Paris", "—", "today", "we", "leave", "."]
        );
        assert_eq!(texts("well-known"), vec!["well", "-", "known"]);
    }

    #[test]
    fn test_numbers_stay_whole() {
        assert_eq!(texts("It cost 3.50 today."), vec!["It", "cost", "3.50", "today", "."]);
    }

    #[test]
    fn test_abbreviation_does_not_end_sentence() {
        let tokens = tokenize("Dr. Smith left. Mr. Jones stayed.");
        assert_eq!(sentence_bounds(&tokens), vec![(0, 4), (4, 8)]);
    }

    #[test]
    fn test_sentence_bounds() {
        let tokens = tokenize("One. Two three! Four");
        assert_eq!(sentence_bounds(&tokens), vec![(0, 2), (2, 5), (5, 6)]);
    }
}
