//! Parsed document model shared by taggers and rules
//!
//! Tokens carry Universal POS tags, a Penn-style fine tag, a lemma, and a
//! dependency arc to their head (the root of a sentence is its own head).
//! Entities and sentences are half-open token ranges.

use crate::{LinguisticError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Universal part-of-speech tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Space,
    Sym,
    Verb,
    X,
}

impl Pos {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Pos::Adj => "ADJ",
            Pos::Adp => "ADP",
            Pos::Adv => "ADV",
            Pos::Aux => "AUX",
            Pos::Cconj => "CCONJ",
            Pos::Det => "DET",
            Pos::Intj => "INTJ",
            Pos::Noun => "NOUN",
            Pos::Num => "NUM",
            Pos::Part => "PART",
            Pos::Pron => "PRON",
            Pos::Propn => "PROPN",
            Pos::Punct => "PUNCT",
            Pos::Sconj => "SCONJ",
            Pos::Space => "SPACE",
            Pos::Sym => "SYM",
            Pos::Verb => "VERB",
            Pos::X => "X",
        }
    }

    /// Nouns, proper nouns and pronouns
    #[must_use]
    pub fn is_nominal(self) -> bool {
        matches!(self, Pos::Noun | Pos::Propn | Pos::Pron)
    }
}

/// One token of a parsed document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Whether the token was followed by whitespace in the source text
    pub whitespace: bool,
    pub lemma: String,
    pub pos: Pos,
    pub tag: String,
    pub dep: String,
    pub head: usize,
    pub ent_type: Option<String>,
}

impl Token {
    /// Token with lemma = lowercased text, no dependency arc and a trailing space.
    ///
    /// `head` starts at 0; [`ParsedDoc::new`] leaves it untouched, so callers
    /// building documents by hand must set arcs with [`Token::with_dep`].
    #[must_use]
    pub fn new(text: &str, pos: Pos) -> Self {
        Self {
            text: text.to_string(),
            whitespace: true,
            lemma: text.to_lowercase(),
            pos,
            tag: String::new(),
            dep: String::new(),
            head: 0,
            ent_type: None,
        }
    }

    #[must_use]
    pub fn with_lemma(mut self, lemma: &str) -> Self {
        self.lemma = lemma.to_string();
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    #[must_use]
    pub fn with_dep(mut self, dep: &str, head: usize) -> Self {
        self.dep = dep.to_string();
        self.head = head;
        self
    }

    #[must_use]
    pub fn with_ent(mut self, label: &str) -> Self {
        self.ent_type = Some(label.to_string());
        self
    }

    #[must_use]
    pub fn no_space(mut self) -> Self {
        self.whitespace = false;
        self
    }

    #[must_use]
    pub fn is_punct(&self) -> bool {
        self.pos == Pos::Punct
    }

    #[must_use]
    pub fn is_space(&self) -> bool {
        self.pos == Pos::Space
    }

    #[must_use]
    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }

    #[must_use]
    pub fn lemma_lower(&self) -> String {
        self.lemma.to_lowercase()
    }
}

/// Named entity over tokens `start..end`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Sentence over tokens `start..end` with its syntactic root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub start: usize,
    pub end: usize,
    pub root: usize,
}

impl Sentence {
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }
}

/// A tagged and parsed text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDoc {
    pub tokens: Vec<Token>,
    pub sentences: Vec<Sentence>,
    pub entities: Vec<Entity>,
}

impl ParsedDoc {
    #[must_use]
    pub fn new(tokens: Vec<Token>, sentences: Vec<Sentence>, entities: Vec<Entity>) -> Self {
        Self {
            tokens,
            sentences,
            entities,
        }
    }

    /// Check that every index in the parse points inside the document.
    pub fn validate(&self) -> Result<()> {
        let len = self.tokens.len();
        if let Some((i, t)) = self.tokens.iter().enumerate().find(|(_, t)| t.head >= len) {
            return Err(LinguisticError::MalformedParse(format!(
                "token {i} ({:?}) has head {} outside 0..{len}",
                t.text, t.head
            )));
        }
        for s in &self.sentences {
            if s.start > s.end || s.end > len || !s.contains(s.root) {
                return Err(LinguisticError::MalformedParse(format!(
                    "sentence {}..{} with root {} does not fit {len} tokens",
                    s.start, s.end, s.root
                )));
            }
        }
        for e in &self.entities {
            if e.start >= e.end || e.end > len {
                return Err(LinguisticError::MalformedParse(format!(
                    "entity {} spans {}..{}",
                    e.label, e.start, e.end
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Direct dependents of `index`
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(move |(i, t)| *i != index && t.head == index)
            .map(|(i, _)| i)
    }

    /// Whether `ancestor` dominates `index` (a token dominates itself).
    #[must_use]
    pub fn is_descendant(&self, index: usize, ancestor: usize) -> bool {
        let mut current = index;
        // a head chain longer than the document can only be a cycle
        for _ in 0..=self.tokens.len() {
            if current == ancestor {
                return true;
            }
            let Some(token) = self.tokens.get(current) else {
                return false;
            };
            if token.head == current {
                return false;
            }
            current = token.head;
        }
        false
    }

    /// Contiguous token range covering `index` and everything it dominates
    #[must_use]
    pub fn subtree(&self, index: usize) -> Range<usize> {
        let mut start = index;
        let mut end = index;
        for i in 0..self.tokens.len() {
            if self.is_descendant(i, index) {
                start = start.min(i);
                end = end.max(i);
            }
        }
        start..end + 1
    }

    /// Source text of tokens `range`, without trailing whitespace
    #[must_use]
    pub fn span_text(&self, range: Range<usize>) -> String {
        let end = range.end.min(self.tokens.len());
        let start = range.start.min(end);
        let mut out = String::new();
        for token in &self.tokens[start..end] {
            out.push_str(&token.text);
            if token.whitespace {
                out.push(' ');
            }
        }
        out.trim().to_string()
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.span_text(0..self.tokens.len())
    }

    #[must_use]
    pub fn sentence_text(&self, sentence: &Sentence) -> String {
        self.span_text(sentence.range())
    }

    /// Sentence containing token `index`
    #[must_use]
    pub fn sentence_of(&self, index: usize) -> Option<&Sentence> {
        self.sentences.iter().find(|s| s.contains(index))
    }

    /// Start positions in `range` where the lowercased tokens equal `phrase`
    #[must_use]
    pub fn find_phrase(&self, range: Range<usize>, phrase: &[&str]) -> Vec<usize> {
        if phrase.is_empty() || range.end > self.tokens.len() {
            return Vec::new();
        }
        let mut hits = Vec::new();
        let mut i = range.start;
        while i + phrase.len() <= range.end {
            if phrase
                .iter()
                .enumerate()
                .all(|(k, word)| self.tokens[i + k].lower() == *word)
            {
                hits.push(i);
            }
            i += 1;
        }
        hits
    }

    /// Whether `sentence` contains the phrase as a token sequence
    #[must_use]
    pub fn sentence_has_phrase(&self, sentence: &Sentence, phrase: &[&str]) -> bool {
        !self.find_phrase(sentence.range(), phrase).is_empty()
    }
}
