//! Part-of-speech lens: category counts, ratios and word lists

use crate::parsed::{ParsedDoc, Pos, Token};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MODAL_LEMMAS: &[&str] = &[
    "can", "could", "may", "might", "must", "shall", "should", "will", "would",
];

pub const NOMINALIZATION_SUFFIXES: &[&str] = &[
    "tion", "sion", "ment", "ance", "ence", "ity", "ness", "er", "or", "al", "age", "dom",
    "hood", "ism", "ist", "ship", "ure",
];

/// Grammatical categories reported by the lens
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PosCategory {
    Noun,
    Verb,
    Adj,
    Adv,
    Pron,
    AuxModal,
    Adp,
    Conj,
}

impl PosCategory {
    pub const ALL: [PosCategory; 8] = [
        PosCategory::Noun,
        PosCategory::Verb,
        PosCategory::Adj,
        PosCategory::Adv,
        PosCategory::Pron,
        PosCategory::AuxModal,
        PosCategory::Adp,
        PosCategory::Conj,
    ];

    /// Whether `token` belongs to this category
    #[must_use]
    pub fn matches(self, token: &Token) -> bool {
        match self {
            PosCategory::Noun => matches!(token.pos, Pos::Noun | Pos::Propn),
            PosCategory::Verb => token.pos == Pos::Verb,
            PosCategory::Adj => token.pos == Pos::Adj,
            PosCategory::Adv => token.pos == Pos::Adv,
            PosCategory::Pron => token.pos == Pos::Pron,
            PosCategory::AuxModal => is_modal(token),
            PosCategory::Adp => token.pos == Pos::Adp,
            PosCategory::Conj => matches!(token.pos, Pos::Cconj | Pos::Sconj),
        }
    }
}

fn is_modal(token: &Token) -> bool {
    token.tag.eq_ignore_ascii_case("MD") || MODAL_LEMMAS.contains(&token.lemma_lower().as_str())
}

fn content_tokens(doc: &ParsedDoc) -> impl Iterator<Item = &Token> {
    doc.tokens.iter().filter(|t| !t.is_punct() && !t.is_space())
}

/// Derived ratios over the counted categories
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PosRatios {
    pub verb_noun_ratio: f64,
    pub modal_density: f64,
    pub pronoun_share: f64,
    pub adj_adv_ratio: f64,
    pub nominalization_density: f64,
}

/// Count tokens per category, skipping punctuation and whitespace.
///
/// A token is counted in every category it matches. Categories with no
/// tokens are absent.
#[must_use]
pub fn compute_pos_counts(doc: &ParsedDoc) -> BTreeMap<PosCategory, usize> {
    let mut counts = BTreeMap::new();
    for token in content_tokens(doc) {
        for category in PosCategory::ALL {
            if category.matches(token) {
                *counts.entry(category).or_insert(0) += 1;
            }
        }
    }
    counts
}

#[must_use]
pub fn compute_pos_ratios(doc: &ParsedDoc, counts: &BTreeMap<PosCategory, usize>) -> PosRatios {
    let count = |c: PosCategory| counts.get(&c).copied().unwrap_or(0) as f64;
    let tokens = content_tokens(doc).count().max(1) as f64;

    let noun = count(PosCategory::Noun);
    let adj = count(PosCategory::Adj);
    let adv = count(PosCategory::Adv);

    let nominalizations = doc
        .tokens
        .iter()
        .filter(|t| t.pos == Pos::Noun)
        .filter(|t| {
            let lower = t.lower();
            NOMINALIZATION_SUFFIXES.iter().any(|s| lower.ends_with(s))
        })
        .count() as f64;

    PosRatios {
        verb_noun_ratio: if noun > 0.0 {
            count(PosCategory::Verb) / noun
        } else {
            0.0
        },
        modal_density: count(PosCategory::AuxModal) / tokens,
        pronoun_share: count(PosCategory::Pron) / tokens,
        adj_adv_ratio: if adv > 0.0 { adj / adv } else { adj },
        nominalization_density: nominalizations / tokens,
    }
}

/// Surface words per category; each token goes to the first category it matches.
#[must_use]
pub fn collect_pos_words(doc: &ParsedDoc) -> BTreeMap<PosCategory, Vec<String>> {
    let mut words: BTreeMap<PosCategory, Vec<String>> = BTreeMap::new();
    for token in content_tokens(doc) {
        if let Some(category) = PosCategory::ALL.into_iter().find(|c| c.matches(token)) {
            words.entry(category).or_default().push(token.text.clone());
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed::Sentence;

    /// "The regulation will quickly change our market and they know it."
    fn doc() -> ParsedDoc {
        let tokens = vec![
            Token::new("The", Pos::Det),
            Token::new("regulation", Pos::Noun),
            Token::new("will", Pos::Aux).with_tag("MD"),
            Token::new("quickly", Pos::Adv),
            Token::new("change", Pos::Verb),
            Token::new("our", Pos::Pron).with_tag("PRP$"),
            Token::new("market", Pos::Noun),
            Token::new("and", Pos::Cconj),
            Token::new("they", Pos::Pron),
            Token::new("know", Pos::Verb),
            Token::new("it", Pos::Pron).no_space(),
            Token::new(".", Pos::Punct),
        ];
        ParsedDoc::new(
            tokens,
            vec![Sentence {
                start: 0,
                end: 12,
                root: 4,
            }],
            Vec::new(),
        )
    }

    #[test]
    fn test_counts_skip_punctuation() {
        let counts = compute_pos_counts(&doc());
        assert_eq!(counts[&PosCategory::Noun], 2);
        assert_eq!(counts[&PosCategory::Verb], 2);
        assert_eq!(counts[&PosCategory::Pron], 3);
        assert_eq!(counts[&PosCategory::AuxModal], 1);
        assert_eq!(counts[&PosCategory::Adv], 1);
        assert_eq!(counts[&PosCategory::Conj], 1);
        assert!(!counts.contains_key(&PosCategory::Adj));
        assert!(!counts.contains_key(&PosCategory::Adp));
    }

    #[test]
    fn test_ratios() {
        let doc = doc();
        let ratios = compute_pos_ratios(&doc, &compute_pos_counts(&doc));
        // 11 content tokens
        assert_eq!(ratios.verb_noun_ratio, 1.0);
        assert!((ratios.modal_density - 1.0 / 11.0).abs() < 1e-12);
        assert!((ratios.pronoun_share - 3.0 / 11.0).abs() < 1e-12);
        assert_eq!(ratios.adj_adv_ratio, 0.0);
        // "regulation"; "market" ends in none of the suffixes
        assert!((ratios.nominalization_density - 1.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_adj_adv_ratio_without_adverbs() {
        let tokens = vec![
            Token::new("big", Pos::Adj),
            Token::new("red", Pos::Adj),
            Token::new("box", Pos::Noun),
        ];
        let doc = ParsedDoc::new(tokens, Vec::new(), Vec::new());
        let ratios = compute_pos_ratios(&doc, &compute_pos_counts(&doc));
        assert_eq!(ratios.adj_adv_ratio, 2.0);
        assert_eq!(ratios.verb_noun_ratio, 0.0);
    }

    #[test]
    fn test_empty_document() {
        let doc = ParsedDoc::default();
        let counts = compute_pos_counts(&doc);
        assert!(counts.is_empty());
        assert_eq!(compute_pos_ratios(&doc, &counts), PosRatios::default());
        assert!(collect_pos_words(&doc).is_empty());
    }

    #[test]
    fn test_words_take_first_category() {
        let words = collect_pos_words(&doc());
        assert_eq!(words[&PosCategory::Noun], vec!["regulation", "market"]);
        assert_eq!(words[&PosCategory::Pron], vec!["our", "they", "it"]);
        assert_eq!(words[&PosCategory::AuxModal], vec!["will"]);
        assert!(!words.contains_key(&PosCategory::Adp));
    }

    #[test]
    fn test_category_keys_serialize_upper_case() {
        let json = serde_json::to_string(&compute_pos_counts(&doc())).unwrap();
        assert_eq!(
            json,
            r#"{"NOUN":2,"VERB":2,"ADV":1,"PRON":3,"AUX_MODAL":1,"CONJ":1}"#
        );
    }
}
