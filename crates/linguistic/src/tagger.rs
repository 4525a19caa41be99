//! Taggers turning text into a [`ParsedDoc`]

use crate::entities;
use crate::lexicon::{
    lookup, noun_lemma, strip_verb_suffix, verb_lemma, ADJECTIVES, ADJECTIVE_SUFFIXES,
    ADPOSITIONS, ADVERBS, AUXILIARIES, COORDINATORS, DETERMINERS, FLAT_ADVERBS,
    INTERJECTIONS, MODALS, NEGATIONS, NOT_ADJECTIVES, NOT_LY_ADVERBS, NOUN_EXCEPTIONS,
    NUMBER_WORDS, POSSESSIVES, PRONOUNS, SUBORDINATORS,
};
use crate::parsed::{ParsedDoc, Pos, Sentence, Token};
use crate::tokenize::{is_sentence_end, sentence_bounds, tokenize};
use crate::Result;
use tracing::debug;

/// Capability: tokenize, tag and parse text.
pub trait LinguisticTagger: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    fn parse(&self, text: &str) -> Result<ParsedDoc>;
}

/// Rule-based English tagger and dependency parser.
///
/// Part of speech comes from closed-class word lists, a verb lexicon with
/// inflection rules, and suffix heuristics. Dependencies are attached per
/// clause: the first finite verb heads its clause, noun phrases before it are
/// subjects, the first one after it is the object, prepositions attach to the
/// nearest preceding verb.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconTagger;

impl LexiconTagger {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LinguisticTagger for LexiconTagger {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn parse(&self, text: &str) -> Result<ParsedDoc> {
        let raw = tokenize(text);
        let mut tokens: Vec<Token> = raw
            .iter()
            .map(|r| {
                let mut token = Token::new(&r.text, Pos::X);
                token.whitespace = r.whitespace;
                token
            })
            .collect();

        let bounds = sentence_bounds(&raw);
        for &(start, end) in &bounds {
            tag_sentence(&mut tokens[start..end]);
        }

        let entities = entities::recognize(&mut tokens);

        let mut sentences = Vec::with_capacity(bounds.len());
        for &(start, end) in &bounds {
            let root = parse_sentence(&mut tokens[start..end], start);
            sentences.push(Sentence { start, end, root });
        }

        debug!(
            "Parsed {} tokens in {} sentences, {} entities",
            tokens.len(),
            sentences.len(),
            entities.len()
        );
        let doc = ParsedDoc::new(tokens, sentences, entities);
        doc.validate()?;
        Ok(doc)
    }
}

// ---------------------------------------------------------------------------
// Part of speech
// ---------------------------------------------------------------------------

fn set(token: &mut Token, pos: Pos, tag: &str, lemma: &str) {
    token.pos = pos;
    token.tag = tag.to_string();
    token.lemma = lemma.to_string();
}

fn punct_tag(text: &str) -> &'static str {
    if is_sentence_end(text) {
        "."
    } else {
        match text {
            "," => ",",
            ";" | ":" | "-" | "--" | "—" | "–" => ":",
            "(" | "[" | "{" => "-LRB-",
            ")" | "]" | "}" => "-RRB-",
            _ => "``",
        }
    }
}

fn is_numeric(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit())
        && word
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '%'))
}

fn closed_class(lower: &str) -> Option<(Pos, &'static str, String)> {
    let word = lower.to_string();
    let entry = if DETERMINERS.contains(&lower) {
        (Pos::Det, "DT", word)
    } else if POSSESSIVES.contains(&lower) {
        (Pos::Pron, "PRP$", word)
    } else if PRONOUNS.contains(&lower) {
        let tag = if lower.starts_with("wh") { "WP" } else { "PRP" };
        (Pos::Pron, tag, word)
    } else if let Some(lemma) = lookup(MODALS, lower) {
        (Pos::Aux, "MD", lemma.to_string())
    } else if let Some((_, lemma, tag)) = AUXILIARIES.iter().find(|(f, _, _)| *f == lower) {
        (Pos::Aux, *tag, (*lemma).to_string())
    } else if NEGATIONS.contains(&lower) {
        (Pos::Part, "RB", "not".to_string())
    } else if lower == "to" {
        (Pos::Part, "TO", word)
    } else if matches!(lower, "that" | "as" | "since") {
        (Pos::Sconj, "IN", word)
    } else if lower == "like" {
        (Pos::Adp, "IN", word)
    } else if ADVERBS.contains(&lower) {
        (Pos::Adv, "RB", word)
    } else if ADPOSITIONS.contains(&lower) {
        (Pos::Adp, "IN", word)
    } else if COORDINATORS.contains(&lower) {
        (Pos::Cconj, "CC", word)
    } else if SUBORDINATORS.contains(&lower) {
        (Pos::Sconj, "IN", word)
    } else if INTERJECTIONS.contains(&lower) {
        (Pos::Intj, "UH", word)
    } else {
        return None;
    };
    Some(entry)
}

fn open_class(lower: &str, text: &str, initial_capital: bool) -> (Pos, &'static str, String) {
    if FLAT_ADVERBS.contains(&lower) || ADJECTIVES.contains(&lower) {
        return (Pos::Adj, "JJ", lower.to_string());
    }
    if let Some((lemma, tag)) = verb_lemma(lower) {
        return (Pos::Verb, tag, lemma);
    }
    if lower.len() > 4 && lower.ends_with("ly") && !NOT_LY_ADVERBS.contains(&lower) {
        return (Pos::Adv, "RB", lower.to_string());
    }
    if !NOT_ADJECTIVES.contains(&lower)
        && ADJECTIVE_SUFFIXES
            .iter()
            .any(|s| lower.len() > s.len() + 2 && lower.ends_with(s))
    {
        return (Pos::Adj, "JJ", lower.to_string());
    }
    if !NOUN_EXCEPTIONS.contains(&lower) {
        if lower.len() > 5 && lower.ends_with("ing") {
            return (Pos::Verb, "VBG", strip_verb_suffix(lower));
        }
        if lower.len() > 4 && lower.ends_with("ed") {
            return (Pos::Verb, "VBD", strip_verb_suffix(lower));
        }
    }
    if initial_capital && !lower.ends_with('s') {
        return (Pos::Propn, "NNP", text.to_string());
    }
    let (lemma, tag) = noun_lemma(lower);
    (Pos::Noun, tag, lemma)
}

fn classify(text: &str, sentence_initial: bool) -> (Pos, &'static str, String) {
    let lower = text.to_lowercase();
    if !text.chars().any(char::is_alphanumeric) {
        return (Pos::Punct, punct_tag(text), text.to_string());
    }
    if is_numeric(&lower) || NUMBER_WORDS.contains(&lower.as_str()) {
        return (Pos::Num, "CD", lower);
    }

    let capitalized = text.chars().next().is_some_and(char::is_uppercase);
    let all_caps = text.chars().count() > 1
        && text.chars().any(char::is_alphabetic)
        && !text.chars().any(char::is_lowercase);
    let mid_sentence_capital = capitalized && !sentence_initial && lower != "i";

    if mid_sentence_capital && matches!(lower.as_str(), "may" | "march") {
        return (Pos::Propn, "NNP", text.to_string());
    }
    if let Some(entry) = closed_class(&lower) {
        return entry;
    }
    if mid_sentence_capital || all_caps {
        return (Pos::Propn, "NNP", text.to_string());
    }
    open_class(&lower, text, capitalized && sentence_initial)
}

fn is_noun_context(token: &Token) -> bool {
    matches!(token.pos, Pos::Det | Pos::Adj | Pos::Adp) || token.tag == "PRP$"
}

fn next_word(tokens: &[Token], i: usize) -> Option<&Token> {
    tokens.get(i + 1)
}

fn tag_sentence(tokens: &mut [Token]) {
    for i in 0..tokens.len() {
        let sentence_initial = tokens[..i].iter().all(Token::is_punct);
        let (pos, tag, lemma) = classify(&tokens[i].text, sentence_initial);
        set(&mut tokens[i], pos, tag, &lemma);
    }

    // verb forms used as nouns or participial adjectives
    for i in 0..tokens.len() {
        if tokens[i].pos != Pos::Verb {
            continue;
        }
        let after_modifier = i > 0 && is_noun_context(&tokens[i - 1]);
        let initial_subject = i == 0
            && next_word(tokens, i).is_some_and(|n| matches!(n.pos, Pos::Aux | Pos::Verb));
        if !(after_modifier || initial_subject) {
            continue;
        }
        let lower = tokens[i].lower();
        if matches!(tokens[i].tag.as_str(), "VBD" | "VBN") && after_modifier {
            set(&mut tokens[i], Pos::Adj, "JJ", &lower);
        } else {
            let (lemma, tag) = noun_lemma(&lower);
            set(&mut tokens[i], Pos::Noun, tag, &lemma);
        }
    }

    for i in 0..tokens.len() {
        let lower = tokens[i].lower();
        let prev_pos = i.checked_sub(1).map(|p| tokens[p].pos);
        let next = next_word(tokens, i).cloned();
        let next_pos = next.as_ref().map(|n| n.pos);

        match lower.as_str() {
            w if FLAT_ADVERBS.contains(&w) => {
                if prev_pos == Some(Pos::Verb) {
                    set(&mut tokens[i], Pos::Adv, "RB", w);
                }
            }
            "to" => {
                let infinitive = matches!(next_pos, Some(Pos::Verb))
                    || next
                        .as_ref()
                        .is_some_and(|n| n.pos == Pos::Aux && n.lemma == "be");
                if !infinitive {
                    set(&mut tokens[i], Pos::Adp, "IN", "to");
                }
            }
            "that" => {
                // "so that" keeps its subordinator reading
                let after_so = i > 0 && tokens[i - 1].lower() == "so";
                if after_so {
                    continue;
                }
                if matches!(
                    next_pos,
                    Some(Pos::Noun | Pos::Propn | Pos::Adj | Pos::Num)
                ) {
                    set(&mut tokens[i], Pos::Det, "DT", "that");
                } else if !matches!(next_pos, Some(Pos::Pron | Pos::Det)) {
                    set(&mut tokens[i], Pos::Pron, "WDT", "that");
                }
            }
            "like" => {
                let verbal = matches!(
                    prev_pos,
                    None | Some(Pos::Pron | Pos::Propn | Pos::Noun | Pos::Aux | Pos::Part)
                );
                if verbal {
                    set(&mut tokens[i], Pos::Verb, "VBP", "like");
                }
            }
            "as" => {
                if next_pos == Some(Pos::Det) {
                    set(&mut tokens[i], Pos::Adp, "IN", "as");
                }
            }
            "since" => {
                let temporal_object = next.as_ref().is_some_and(|n| {
                    matches!(n.pos, Pos::Num | Pos::Det | Pos::Propn)
                        || matches!(
                            n.lower().as_str(),
                            "yesterday" | "then" | "last" | "morning" | "today"
                        )
                });
                if temporal_object {
                    set(&mut tokens[i], Pos::Adp, "IN", "since");
                }
            }
            "before" | "after" | "until" => {
                if next.as_ref().is_some_and(|n| n.tag == "PRP") {
                    set(&mut tokens[i], Pos::Sconj, "IN", &lower);
                }
            }
            "so" => {
                if next.as_ref().is_some_and(|n| n.lower() == "that") {
                    set(&mut tokens[i], Pos::Sconj, "IN", "so");
                }
            }
            _ => {}
        }
    }

    // have/do are main verbs unless a verb follows
    for i in (0..tokens.len()).rev() {
        let token = &tokens[i];
        if token.pos != Pos::Aux || !matches!(token.lemma.as_str(), "have" | "do") {
            continue;
        }
        let governs_verb = tokens[i + 1..]
            .iter()
            .find(|t| !matches!(t.pos, Pos::Adv | Pos::Part) && t.tag != "PRP")
            .is_some_and(|t| t.pos == Pos::Verb);
        if !governs_verb {
            tokens[i].pos = Pos::Verb;
        }
    }
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Clause {
    start: usize,
    end: usize,
    subordinate: bool,
    head: Option<usize>,
}

const INTENSIFIERS: &[&str] = &["very", "really", "too", "quite", "rather", "almost", "so"];

fn is_clause_punct(token: &Token) -> bool {
    matches!(token.text.as_str(), "," | ";" | ":" | "-" | "--")
}

fn is_infinitive(tokens: &[Token], i: usize) -> bool {
    i > 0 && tokens[i - 1].pos == Pos::Part && tokens[i - 1].lower() == "to"
}

fn split_clauses(tokens: &[Token]) -> Vec<Clause> {
    let mut clauses = Vec::new();
    let mut start = 0;
    let mut subordinate = false;
    let open = |start: usize, end: usize, subordinate: bool, clauses: &mut Vec<Clause>| {
        if end > start {
            clauses.push(Clause {
                start,
                end,
                subordinate,
                head: None,
            });
        }
    };

    for i in 0..tokens.len() {
        let token = &tokens[i];
        let starts_subordinate =
            token.pos == Pos::Sconj && i > start && tokens[i - 1].pos != Pos::Sconj;
        let starts_coordinate = token.pos == Pos::Cconj && i > start && {
            let has_verb = tokens[start..i]
                .iter()
                .any(|t| matches!(t.pos, Pos::Verb | Pos::Aux));
            let rest_end = tokens[i + 1..]
                .iter()
                .position(|t| is_clause_punct(t) || t.pos == Pos::Sconj)
                .map_or(tokens.len(), |p| i + 1 + p);
            let rest_has_verb = tokens[i + 1..rest_end]
                .iter()
                .any(|t| matches!(t.pos, Pos::Verb | Pos::Aux));
            let verb_coordination = tokens
                .get(i + 1)
                .is_some_and(|t| matches!(t.pos, Pos::Verb | Pos::Aux));
            has_verb && rest_has_verb && !verb_coordination
        };

        if starts_subordinate || starts_coordinate {
            open(start, i, subordinate, &mut clauses);
            start = i;
            subordinate = starts_subordinate;
        }
        if is_clause_punct(token) {
            open(start, i + 1, subordinate, &mut clauses);
            start = i + 1;
            subordinate = false;
        }
        if i == start && token.pos == Pos::Sconj {
            subordinate = true;
        }
    }
    open(start, tokens.len(), subordinate, &mut clauses);

    for clause in &mut clauses {
        let range = clause.start..clause.end;
        clause.head = range
            .clone()
            .find(|&i| tokens[i].pos == Pos::Verb && !is_infinitive(tokens, i))
            .or_else(|| range.clone().find(|&i| tokens[i].pos == Pos::Verb))
            .or_else(|| range.clone().find(|&i| tokens[i].pos == Pos::Aux));
    }
    clauses
}

struct Arcs {
    arcs: Vec<Option<(usize, &'static str)>>,
}

impl Arcs {
    fn new(len: usize) -> Self {
        Self {
            arcs: vec![None; len],
        }
    }

    fn is_set(&self, i: usize) -> bool {
        self.arcs[i].is_some()
    }

    fn set(&mut self, i: usize, head: usize, dep: &'static str) {
        if self.arcs[i].is_none() {
            self.arcs[i] = Some((head, dep));
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct NounPhrase {
    start: usize,
    head: usize,
}

fn is_np_part(token: &Token) -> bool {
    matches!(
        token.pos,
        Pos::Det | Pos::Adj | Pos::Num | Pos::Noun | Pos::Propn
    ) || token.tag == "PRP$"
}

/// Find noun phrases in `clause` and attach their internal modifiers.
fn chunk_noun_phrases(tokens: &[Token], clause: &Clause, arcs: &mut Arcs) -> Vec<NounPhrase> {
    let mut phrases = Vec::new();
    let mut i = clause.start;
    while i < clause.end {
        let token = &tokens[i];
        if token.pos == Pos::Pron && token.tag != "PRP$" {
            phrases.push(NounPhrase { start: i, head: i });
            i += 1;
            continue;
        }
        if !is_np_part(token) {
            i += 1;
            continue;
        }

        let mut end = i;
        while end < clause.end
            && (is_np_part(&tokens[end])
                || (tokens[end].pos == Pos::Adv
                    && tokens.get(end + 1).is_some_and(|n| n.pos == Pos::Adj)))
        {
            end += 1;
        }
        let head = (i..end)
            .rev()
            .find(|&k| matches!(tokens[k].pos, Pos::Noun | Pos::Propn))
            .or_else(|| (i..end).rev().find(|&k| tokens[k].pos == Pos::Num));
        let Some(head) = head else {
            i = end.max(i + 1);
            continue;
        };

        for k in i..head {
            let dep = match tokens[k].pos {
                _ if tokens[k].tag == "PRP$" => "poss",
                Pos::Det => "det",
                Pos::Adj => "amod",
                Pos::Num => "nummod",
                Pos::Adv => {
                    arcs.set(k, k + 1, "advmod");
                    continue;
                }
                _ => "compound",
            };
            arcs.set(k, head, dep);
        }
        phrases.push(NounPhrase { start: i, head });
        i = head + 1;
    }
    phrases
}

fn nearest_before(
    tokens: &[Token],
    range: std::ops::Range<usize>,
    pred: impl Fn(&Token) -> bool,
) -> Option<usize> {
    range.rev().find(|&k| pred(&tokens[k]))
}

/// Attach every token of one sentence; returns the sentence-local root.
fn attach(tokens: &[Token]) -> (usize, Arcs) {
    let mut arcs = Arcs::new(tokens.len());
    let clauses = split_clauses(tokens);

    let root = clauses
        .iter()
        .find(|c| !c.subordinate && c.head.is_some())
        .or_else(|| clauses.iter().find(|c| c.head.is_some()))
        .and_then(|c| c.head)
        .or_else(|| tokens.iter().position(|t| t.pos.is_nominal()))
        .or_else(|| tokens.iter().position(|t| !t.is_punct()))
        .unwrap_or(0);
    arcs.set(root, root, "ROOT");

    for clause in &clauses {
        let range = clause.start..clause.end;
        let verb_before =
            |k: usize| nearest_before(tokens, clause.start..k, |t| t.pos == Pos::Verb);
        let verb_after = |k: usize| (k + 1..clause.end).find(|&j| tokens[j].pos == Pos::Verb);

        if let Some(head) = clause.head {
            if head != root {
                let first = &tokens[clause.start];
                if clause.subordinate {
                    arcs.set(head, root, "advcl");
                } else if matches!(first.tag.as_str(), "WP" | "WDT") {
                    let antecedent = nearest_before(tokens, 0..clause.start, |t| {
                        matches!(t.pos, Pos::Noun | Pos::Propn)
                    });
                    arcs.set(head, antecedent.unwrap_or(root), "relcl");
                } else {
                    arcs.set(head, root, "conj");
                }
            }
        }
        let clause_head = clause.head.unwrap_or(root);

        // verbal group
        for i in range.clone() {
            let token = &tokens[i];
            match token.pos {
                Pos::Verb if Some(i) != clause.head => {
                    if is_infinitive(tokens, i) {
                        arcs.set(i, verb_before(i).unwrap_or(clause_head), "xcomp");
                    } else {
                        arcs.set(i, clause_head, "conj");
                    }
                }
                Pos::Aux if Some(i) != clause.head => {
                    arcs.set(i, verb_after(i).unwrap_or(clause_head), "aux");
                }
                Pos::Part if token.lower() == "to" => {
                    if let Some(verb) = verb_after(i) {
                        arcs.set(i, verb, "aux");
                    }
                }
                Pos::Part => {
                    let target = verb_after(i)
                        .or_else(|| verb_before(i))
                        .unwrap_or(clause_head);
                    arcs.set(i, target, "neg");
                }
                _ => {}
            }
        }

        // noun phrases
        let phrases = chunk_noun_phrases(tokens, clause, &mut arcs);
        let mut has_subject = false;
        let mut objects: Vec<usize> = Vec::new();
        let mut previous_head: Option<usize> = None;
        for np in &phrases {
            let before = np.start.checked_sub(1).map(|p| &tokens[p]);
            if before.is_some_and(|t| t.pos == Pos::Adp) {
                arcs.set(np.head, np.start - 1, "pobj");
            } else if before.is_some_and(|t| t.pos == Pos::Cconj) && previous_head.is_some() {
                arcs.set(np.head, previous_head.unwrap_or(root), "conj");
            } else if let Some(head) = clause.head {
                if np.head < head {
                    if has_subject {
                        arcs.set(np.head, head, "npadvmod");
                    } else {
                        let passive = matches!(tokens[head].tag.as_str(), "VBD" | "VBN")
                            && (clause.start..head)
                                .any(|k| tokens[k].pos == Pos::Aux && tokens[k].lemma == "be");
                        arcs.set(np.head, head, if passive { "nsubjpass" } else { "nsubj" });
                        has_subject = true;
                    }
                } else {
                    let governor = nearest_before(tokens, clause.start..np.start, |t| {
                        matches!(t.pos, Pos::Verb | Pos::Aux)
                    })
                    .unwrap_or(head);
                    if tokens[governor].pos == Pos::Aux {
                        arcs.set(np.head, governor, "attr");
                    } else if objects.contains(&governor) {
                        arcs.set(np.head, governor, "npadvmod");
                    } else {
                        arcs.set(np.head, governor, "dobj");
                        objects.push(governor);
                    }
                }
            } else {
                arcs.set(np.head, root, "dep");
            }
            previous_head = Some(np.head);
        }

        // everything else
        for i in range.clone() {
            if arcs.is_set(i) {
                continue;
            }
            let token = &tokens[i];
            match token.pos {
                Pos::Adp => {
                    let has_object = phrases.iter().any(|np| np.start == i + 1);
                    let noun_before = i > 0
                        && matches!(tokens[i - 1].pos, Pos::Noun | Pos::Propn)
                        && token.lower() == "of";
                    let head = if noun_before {
                        Some(i - 1)
                    } else {
                        verb_before(i).or_else(|| {
                            nearest_before(tokens, clause.start..i, |t| {
                                matches!(t.pos, Pos::Noun | Pos::Propn)
                            })
                        })
                    };
                    let dep = if has_object { "prep" } else { "prt" };
                    arcs.set(i, head.unwrap_or(clause_head), dep);
                }
                Pos::Adv => {
                    let modifies_next = INTENSIFIERS.contains(&token.lower().as_str())
                        && tokens
                            .get(i + 1)
                            .is_some_and(|n| matches!(n.pos, Pos::Adj | Pos::Adv));
                    let head = if modifies_next {
                        i + 1
                    } else {
                        verb_before(i)
                            .or_else(|| verb_after(i))
                            .unwrap_or(clause_head)
                    };
                    arcs.set(i, head, "advmod");
                }
                Pos::Adj => {
                    let governor = nearest_before(tokens, clause.start..i, |t| {
                        matches!(t.pos, Pos::Verb | Pos::Aux)
                    });
                    arcs.set(i, governor.unwrap_or(clause_head), "acomp");
                }
                Pos::Cconj => {
                    let head = if i == clause.start {
                        root
                    } else {
                        nearest_before(tokens, clause.start..i, |t| {
                            !matches!(t.pos, Pos::Punct | Pos::Det | Pos::Adp)
                        })
                        .unwrap_or(clause_head)
                    };
                    arcs.set(i, head, "cc");
                }
                Pos::Sconj => {
                    arcs.set(i, verb_after(i).unwrap_or(clause_head), "mark");
                }
                Pos::Punct => arcs.set(i, root, "punct"),
                Pos::Intj => arcs.set(i, root, "intj"),
                _ => arcs.set(i, clause_head, "dep"),
            }
        }
    }

    for i in 0..tokens.len() {
        if !arcs.is_set(i) {
            arcs.set(i, root, "dep");
        }
    }
    (root, arcs)
}

/// Write dependency arcs into `tokens`; returns the document index of the root.
fn parse_sentence(tokens: &mut [Token], offset: usize) -> usize {
    if tokens.is_empty() {
        return offset;
    }
    let (root, arcs) = attach(tokens);
    for (token, arc) in tokens.iter_mut().zip(arcs.arcs) {
        let (head, dep) = arc.unwrap_or((root, "dep"));
        token.head = offset + head;
        token.dep = dep.to_string();
    }
    offset + root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedDoc {
        LexiconTagger::new().parse(text).unwrap()
    }

    fn find<'a>(doc: &'a ParsedDoc, text: &str) -> (usize, &'a Token) {
        doc.tokens
            .iter()
            .enumerate()
            .find(|(_, t)| t.text == text)
            .unwrap()
    }

    #[test]
    fn test_simple_clause() {
        let doc = parse("Maria met the mayor in Paris yesterday.");
        let tags: Vec<Pos> = doc.tokens.iter().map(|t| t.pos).collect();
        assert_eq!(
            tags,
            vec![
                Pos::Propn,
                Pos::Verb,
                Pos::Det,
                Pos::Noun,
                Pos::Adp,
                Pos::Propn,
                Pos::Adv,
                Pos::Punct
            ]
        );
        assert_eq!(doc.sentences.len(), 1);
        assert_eq!(doc.sentences[0].root, 1);

        let (_, maria) = find(&doc, "Maria");
        assert_eq!((maria.dep.as_str(), maria.head), ("nsubj", 1));
        let (_, mayor) = find(&doc, "mayor");
        assert_eq!((mayor.dep.as_str(), mayor.head), ("dobj", 1));
        let (_, paris) = find(&doc, "Paris");
        assert_eq!((paris.dep.as_str(), paris.head), ("pobj", 4));
        assert_eq!(paris.ent_type.as_deref(), Some("GPE"));
        let (_, met) = find(&doc, "met");
        assert_eq!(met.lemma, "meet");
    }

    #[test]
    fn test_subordinate_clause_and_passive() {
        let doc = parse("We stayed home because it rained. So the match was cancelled.");
        assert_eq!(doc.sentences.len(), 2);

        let (stayed, _) = find(&doc, "stayed");
        let (rained, rained_tok) = find(&doc, "rained");
        assert_eq!(doc.sentences[0].root, stayed);
        assert_eq!((rained_tok.dep.as_str(), rained_tok.head), ("advcl", stayed));
        let (_, because) = find(&doc, "because");
        assert_eq!((because.dep.as_str(), because.head), ("mark", rained));

        let (cancelled, _) = find(&doc, "cancelled");
        assert_eq!(doc.sentences[1].root, cancelled);
        let (_, matched) = find(&doc, "match");
        assert_eq!(matched.dep, "nsubjpass");
        assert_eq!(matched.pos, Pos::Noun);
    }

    #[test]
    fn test_infinitive_and_prepositions() {
        let doc = parse("The team travelled from Berlin by train to improve relations quickly.");
        let (travelled, _) = find(&doc, "travelled");
        let (improve, improve_tok) = find(&doc, "improve");
        assert_eq!((improve_tok.dep.as_str(), improve_tok.head), ("xcomp", travelled));
        let (_, to) = find(&doc, "to");
        assert_eq!((to.pos, to.head), (Pos::Part, improve));
        let (_, train) = find(&doc, "train");
        assert_eq!((train.pos, train.dep.as_str()), (Pos::Noun, "pobj"));
        let (_, quickly) = find(&doc, "quickly");
        assert_eq!((quickly.dep.as_str(), quickly.head), ("advmod", improve));
        assert_eq!(doc.subtree(improve), 7..11);
    }

    #[test]
    fn test_modals_and_coordination() {
        let doc = parse("She can swim and he will run quickly.");
        let (_, can) = find(&doc, "can");
        assert_eq!((can.pos, can.tag.as_str()), (Pos::Aux, "MD"));
        let (_, he) = find(&doc, "he");
        let (run, _) = find(&doc, "run");
        assert_eq!((he.dep.as_str(), he.head), ("nsubj", run));
    }

    #[test]
    fn test_heads_stay_in_sentence() {
        let doc = parse("Oh. Because of the storm, flights from London were delayed, so we waited.");
        for sentence in &doc.sentences {
            for i in sentence.range() {
                assert!(sentence.contains(doc.tokens[i].head), "token {i}");
                assert!(doc.is_descendant(i, sentence.root));
            }
        }
    }

    #[test]
    fn test_empty_text() {
        let doc = parse("   ");
        assert!(doc.is_empty());
        assert!(doc.sentences.is_empty());
    }
}
