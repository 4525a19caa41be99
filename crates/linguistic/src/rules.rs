//! Interrogative lens: question slots filled by independent extraction rules
//!
//! Each [`InterrogativeRule`] reads a [`ParsedDoc`] and returns text spans for
//! one [`Slot`]. A [`RuleTable`] runs its rules in order and merges their
//! spans per slot, dropping blanks and exact duplicates within a slot.

use crate::parsed::{ParsedDoc, Pos, Sentence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TEMPORAL_ADVERBS: &[&str] = &[
    "now", "today", "yesterday", "tonight", "tomorrow", "currently", "presently", "recently",
    "soon", "lately",
];

const PLACE_PREPOSITIONS: &[&str] = &["in", "at", "on", "inside", "into"];

const PLACE_NOUNS: &[&str] = &[
    "office", "city", "country", "parliament", "building", "room", "hall", "campus", "village",
    "town",
];

const PLACE_LABELS: &[&str] = &["GPE", "LOC", "FAC"];

const CAUSE_MARKERS: &[&str] = &["because", "since", "as", "cos", "cause"];

const CAUSE_PHRASES: &[&[&str]] = &[&["due", "to"], &["because", "of"]];

const CONSEQUENCE_MARKERS: &[&str] = &["so", "therefore", "thus", "hence"];

const CONSEQUENCE_OPENERS: &[&str] = &["so", "therefore", "thus", "hence", "consequently"];

const CONSEQUENCE_PHRASES: &[&[&str]] = &[
    &["as", "a", "result"],
    &["resulting", "in"],
    &["which", "led", "to"],
];

const MANNER_PHRASES: &[&[&str]] = &[
    &["in", "a", "way"],
    &["in", "this", "way"],
    &["in", "that", "way"],
    &["by", "means", "of"],
    &["as", "if"],
    &["as", "though"],
    &["in", "the", "manner"],
];

const MANNER_ADVERBS: &[&str] = &[
    "quickly", "slowly", "carefully", "happily", "loudly", "silently", "well", "badly",
    "easily", "hard", "fast", "smoothly", "suddenly", "gradually", "patiently", "eagerly",
    "reluctantly", "personally", "officially", "publicly", "privately", "together", "directly",
    "indirectly", "properly", "improperly", "correctly", "incorrectly", "clearly", "unclearly",
    "differently", "similarly", "briefly", "thoroughly", "precisely", "roughly", "strongly",
    "weakly", "safely", "dangerously", "successfully", "unsuccessfully",
];

const MEANS_PREPOSITIONS: &[&str] = &["by", "with", "through", "using", "via"];

const PURPOSE_PHRASES: &[&[&str]] = &[
    &["in", "order", "to"],
    &["so", "that"],
    &["so", "we", "can"],
    &["so", "they", "can"],
];

const ORIGIN_PREPOSITIONS: &[&str] = &["from", "since"];

/// Question slots of the interrogative lens
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Who,
    What,
    When,
    Where,
    Why,
    How,
    ByWhatMeans,
    TowardsWhatEnd,
    Whence,
    ByWhatConsequence,
}

impl Slot {
    pub const ALL: [Slot; 10] = [
        Slot::Who,
        Slot::What,
        Slot::When,
        Slot::Where,
        Slot::Why,
        Slot::How,
        Slot::ByWhatMeans,
        Slot::TowardsWhatEnd,
        Slot::Whence,
        Slot::ByWhatConsequence,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Who => "who",
            Slot::What => "what",
            Slot::When => "when",
            Slot::Where => "where",
            Slot::Why => "why",
            Slot::How => "how",
            Slot::ByWhatMeans => "by_what_means",
            Slot::TowardsWhatEnd => "towards_what_end",
            Slot::Whence => "whence",
            Slot::ByWhatConsequence => "by_what_consequence",
        }
    }
}

/// One extraction heuristic feeding a slot
#[derive(Debug, Clone, Copy)]
pub struct InterrogativeRule {
    pub slot: Slot,
    pub name: &'static str,
    pub extract: fn(&ParsedDoc) -> Vec<String>,
}

impl InterrogativeRule {
    #[must_use]
    pub const fn new(slot: Slot, name: &'static str, extract: fn(&ParsedDoc) -> Vec<String>) -> Self {
        Self {
            slot,
            name,
            extract,
        }
    }
}

/// Ordered set of interrogative rules
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<InterrogativeRule>,
}

impl RuleTable {
    /// Empty table; every slot is still reported by [`RuleTable::apply`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in English heuristics
    #[must_use]
    pub fn standard() -> Self {
        let rules = vec![
            InterrogativeRule::new(Slot::Who, "subject_subtrees", subject_subtrees),
            InterrogativeRule::new(Slot::What, "verb_predicates", verb_predicates),
            InterrogativeRule::new(Slot::When, "time_entities", time_entities),
            InterrogativeRule::new(Slot::When, "temporal_adverbs", temporal_adverbs),
            InterrogativeRule::new(Slot::Where, "place_entities", place_entities),
            InterrogativeRule::new(Slot::Where, "place_prepositions", place_prepositions),
            InterrogativeRule::new(Slot::Why, "cause_markers", cause_markers),
            InterrogativeRule::new(Slot::Why, "cause_phrases", cause_phrases),
            InterrogativeRule::new(Slot::Why, "preceding_cause", preceding_cause),
            InterrogativeRule::new(Slot::How, "manner_phrases", manner_phrases),
            InterrogativeRule::new(Slot::How, "manner_clauses", manner_clauses),
            InterrogativeRule::new(Slot::How, "manner_adverbs", manner_adverbs),
            InterrogativeRule::new(Slot::ByWhatMeans, "means_prepositions", means_prepositions),
            InterrogativeRule::new(Slot::ByWhatMeans, "means_phrases", means_phrases),
            InterrogativeRule::new(Slot::TowardsWhatEnd, "purpose_phrases", purpose_phrases),
            InterrogativeRule::new(Slot::TowardsWhatEnd, "infinitive_purpose", infinitive_purpose),
            InterrogativeRule::new(Slot::Whence, "origin_prepositions", origin_prepositions),
            InterrogativeRule::new(Slot::Whence, "origin_phrases", origin_phrases),
            InterrogativeRule::new(
                Slot::ByWhatConsequence,
                "consequence_markers",
                consequence_markers,
            ),
            InterrogativeRule::new(
                Slot::ByWhatConsequence,
                "consequence_phrases",
                consequence_phrases,
            ),
        ];
        Self { rules }
    }

    pub fn push(&mut self, rule: InterrogativeRule) {
        self.rules.push(rule);
    }

    #[must_use]
    pub fn rules(&self) -> &[InterrogativeRule] {
        &self.rules
    }

    /// Run every rule and collect spans per slot.
    ///
    /// All slots are present in the result. Within a slot spans keep the
    /// order the rules produced them; empty spans and repeats are skipped.
    #[must_use]
    pub fn apply(&self, doc: &ParsedDoc) -> BTreeMap<Slot, Vec<String>> {
        let mut lens: BTreeMap<Slot, Vec<String>> =
            Slot::ALL.into_iter().map(|s| (s, Vec::new())).collect();
        for rule in &self.rules {
            let spans = lens.entry(rule.slot).or_default();
            for span in (rule.extract)(doc) {
                let span = span.trim();
                if !span.is_empty() && !spans.iter().any(|s| s == span) {
                    spans.push(span.to_string());
                }
            }
        }
        lens
    }
}

fn lemma_in(doc: &ParsedDoc, i: usize, words: &[&str]) -> bool {
    words.contains(&doc.tokens[i].lemma_lower().as_str())
}

fn text_in(doc: &ParsedDoc, i: usize, words: &[&str]) -> bool {
    words.contains(&doc.tokens[i].lower().as_str())
}

/// Text from token `i` to the end of its sentence
fn rest_of_sentence(doc: &ParsedDoc, i: usize) -> String {
    let end = doc.sentence_of(i).map_or(doc.len(), |s| s.end);
    doc.span_text(i..end)
}

/// Text from token `i` through the subtree of `i`
fn head_and_subtree(doc: &ParsedDoc, i: usize) -> String {
    let subtree = doc.subtree(i);
    doc.span_text(subtree.start.min(i)..subtree.end.max(i + 1))
}

fn sentences_with_phrases(doc: &ParsedDoc, phrases: &[&[&str]]) -> Vec<String> {
    doc.sentences
        .iter()
        .filter(|s| phrases.iter().any(|p| doc.sentence_has_phrase(s, p)))
        .map(|s| doc.sentence_text(s))
        .collect()
}

/// First token of `sentence` that is not punctuation
fn opening_token(doc: &ParsedDoc, sentence: &Sentence) -> Option<usize> {
    sentence.range().find(|&i| !doc.tokens[i].is_punct())
}

fn subject_subtrees(doc: &ParsedDoc) -> Vec<String> {
    (0..doc.len())
        .filter(|&i| doc.tokens[i].dep.contains("subj"))
        .map(|i| doc.span_text(doc.subtree(i)))
        .collect()
}

fn verb_predicates(doc: &ParsedDoc) -> Vec<String> {
    let mut spans = Vec::new();
    for sentence in &doc.sentences {
        if doc.tokens[sentence.root].pos == Pos::Verb {
            spans.push(doc.span_text(doc.subtree(sentence.root)));
            continue;
        }
        for i in sentence.range() {
            if doc.tokens[i].pos == Pos::Verb {
                spans.push(doc.span_text(doc.subtree(i)));
            }
        }
    }
    spans
}

fn time_entities(doc: &ParsedDoc) -> Vec<String> {
    doc.entities
        .iter()
        .filter(|e| matches!(e.label.as_str(), "DATE" | "TIME"))
        .map(|e| doc.span_text(e.start..e.end))
        .collect()
}

fn temporal_adverbs(doc: &ParsedDoc) -> Vec<String> {
    doc.tokens
        .iter()
        .filter(|t| t.pos == Pos::Adv && TEMPORAL_ADVERBS.contains(&t.lemma_lower().as_str()))
        .map(|t| t.text.clone())
        .collect()
}

fn place_entities(doc: &ParsedDoc) -> Vec<String> {
    doc.entities
        .iter()
        .filter(|e| PLACE_LABELS.contains(&e.label.as_str()))
        .map(|e| doc.span_text(e.start..e.end))
        .collect()
}

fn place_prepositions(doc: &ParsedDoc) -> Vec<String> {
    let mut spans = Vec::new();
    for i in 0..doc.len() {
        if doc.tokens[i].pos != Pos::Adp || !lemma_in(doc, i, PLACE_PREPOSITIONS) {
            continue;
        }
        let Some(object) = doc
            .children(i)
            .find(|&c| matches!(doc.tokens[c].dep.as_str(), "pobj" | "obl"))
        else {
            continue;
        };
        let token = &doc.tokens[object];
        let is_place = token
            .ent_type
            .as_deref()
            .is_some_and(|label| PLACE_LABELS.contains(&label))
            || PLACE_NOUNS.contains(&token.lemma_lower().as_str());
        if is_place {
            spans.push(doc.span_text(i..doc.subtree(object).end));
        }
    }
    spans
}

fn cause_markers(doc: &ParsedDoc) -> Vec<String> {
    (0..doc.len())
        .filter(|&i| text_in(doc, i, CAUSE_MARKERS))
        .map(|i| rest_of_sentence(doc, i))
        .collect()
}

fn cause_phrases(doc: &ParsedDoc) -> Vec<String> {
    sentences_with_phrases(doc, CAUSE_PHRASES)
}

/// A sentence opening with a consequence connective explains its predecessor.
fn preceding_cause(doc: &ParsedDoc) -> Vec<String> {
    doc.sentences
        .windows(2)
        .filter(|pair| {
            let next = &pair[1];
            opening_token(doc, next).is_some_and(|i| {
                text_in(doc, i, CONSEQUENCE_OPENERS)
                    || doc
                        .find_phrase(i..next.end, &["as", "a", "result"])
                        .first()
                        == Some(&i)
            })
        })
        .map(|pair| doc.sentence_text(&pair[0]))
        .collect()
}

fn manner_phrases(doc: &ParsedDoc) -> Vec<String> {
    sentences_with_phrases(doc, MANNER_PHRASES)
}

/// "as" heading an adverbial clause, or "like" attached to a verb
fn manner_clauses(doc: &ParsedDoc) -> Vec<String> {
    doc.sentences
        .iter()
        .filter(|s| {
            s.range().any(|i| {
                let token = &doc.tokens[i];
                match token.lower().as_str() {
                    "as" => token.dep == "advcl",
                    "like" => token.dep == "prep" && doc.tokens[token.head].pos == Pos::Verb,
                    _ => false,
                }
            })
        })
        .map(|s| doc.sentence_text(s))
        .collect()
}

fn manner_adverbs(doc: &ParsedDoc) -> Vec<String> {
    doc.sentences
        .iter()
        .filter(|s| {
            s.range().any(|i| {
                let token = &doc.tokens[i];
                token.pos == Pos::Adv
                    && token.dep == "advmod"
                    && !lemma_in(doc, i, TEMPORAL_ADVERBS)
                    && lemma_in(doc, i, MANNER_ADVERBS)
            })
        })
        .map(|s| doc.sentence_text(s))
        .collect()
}

fn means_prepositions(doc: &ParsedDoc) -> Vec<String> {
    (0..doc.len())
        .filter(|&i| doc.tokens[i].pos == Pos::Adp && lemma_in(doc, i, MEANS_PREPOSITIONS))
        .map(|i| head_and_subtree(doc, i))
        .collect()
}

fn means_phrases(doc: &ParsedDoc) -> Vec<String> {
    sentences_with_phrases(doc, &[&["by", "means", "of"]])
}

fn purpose_phrases(doc: &ParsedDoc) -> Vec<String> {
    sentences_with_phrases(doc, PURPOSE_PHRASES)
}

/// "to" + verb, through the verb's dependents
fn infinitive_purpose(doc: &ParsedDoc) -> Vec<String> {
    (0..doc.len().saturating_sub(1))
        .filter(|&i| doc.tokens[i].lower() == "to" && doc.tokens[i + 1].pos == Pos::Verb)
        .map(|i| doc.span_text(i..doc.subtree(i + 1).end.max(i + 2)))
        .collect()
}

fn origin_prepositions(doc: &ParsedDoc) -> Vec<String> {
    (0..doc.len())
        .filter(|&i| doc.tokens[i].pos == Pos::Adp && text_in(doc, i, ORIGIN_PREPOSITIONS))
        .map(|i| head_and_subtree(doc, i))
        .collect()
}

fn origin_phrases(doc: &ParsedDoc) -> Vec<String> {
    sentences_with_phrases(doc, &[&["out", "of"]])
}

fn consequence_markers(doc: &ParsedDoc) -> Vec<String> {
    (0..doc.len())
        .filter(|&i| text_in(doc, i, CONSEQUENCE_MARKERS))
        .map(|i| rest_of_sentence(doc, i))
        .collect()
}

fn consequence_phrases(doc: &ParsedDoc) -> Vec<String> {
    sentences_with_phrases(doc, CONSEQUENCE_PHRASES)
}
