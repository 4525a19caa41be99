//! Linguistic analysis of transcript text
//!
//! Text is parsed by a [`LinguisticTagger`] into a [`ParsedDoc`] (tokens with
//! part of speech, lemma, dependency head and entity label). Two lenses run
//! over the parse:
//!
//! - the POS lens counts grammatical categories and derives ratios
//! - the interrogative lens fills ten question slots (who, what, when, ...)
//!   from a [`RuleTable`] of independent extraction rules
//!
//! The built-in [`LexiconTagger`] is a rule-based English tagger with no model
//! files. Statistical parsers plug in by implementing [`LinguisticTagger`].

mod entities;
pub mod lens;
mod lexicon;
pub mod parsed;
pub mod report;
pub mod rules;
pub mod tagger;
mod tokenize;

use thiserror::Error;
use video_analysis_common::ProcessingError;

pub use lens::{
    collect_pos_words, compute_pos_counts, compute_pos_ratios, PosCategory, PosRatios,
};
pub use parsed::{Entity, ParsedDoc, Pos, Sentence, Token};
pub use report::{clean_text, LinguisticReport, LinguisticStage};
pub use rules::{InterrogativeRule, RuleTable, Slot};
pub use tagger::{LexiconTagger, LinguisticTagger};

/// Linguistic stage errors
#[derive(Debug, Error)]
pub enum LinguisticError {
    #[error("Tagger failed: {0}")]
    Tagger(String),

    #[error("Malformed parse: {0}")]
    MalformedParse(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LinguisticError> for ProcessingError {
    fn from(err: LinguisticError) -> Self {
        match err {
            LinguisticError::Io(e) => ProcessingError::IoError(e),
            other => ProcessingError::ModelError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LinguisticError>;
