//! Linguistic stage: text cleanup, both lenses, JSON report

use crate::lens::{collect_pos_words, compute_pos_counts, compute_pos_ratios, PosCategory, PosRatios};
use crate::rules::{RuleTable, Slot};
use crate::tagger::LinguisticTagger;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Collapse whitespace runs to single spaces and trim the ends.
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Result document of the linguistic stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinguisticReport {
    /// Cleaned input text
    pub text: String,
    /// Tokens other than punctuation and whitespace
    #[serde(default)]
    pub token_count: usize,
    pub pos_counts: BTreeMap<PosCategory, usize>,
    pub pos_ratios: PosRatios,
    pub interrogative_lens: BTreeMap<Slot, Vec<String>>,
    pub pos_words: BTreeMap<PosCategory, Vec<String>>,
}

impl LinguisticReport {
    /// Write the report as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

/// Parses text with a tagger and runs the POS and interrogative lenses
pub struct LinguisticStage {
    tagger: Box<dyn LinguisticTagger>,
    rules: RuleTable,
}

impl LinguisticStage {
    /// Stage with the standard interrogative rules
    #[must_use]
    pub fn new(tagger: Box<dyn LinguisticTagger>) -> Self {
        Self::with_rules(tagger, RuleTable::standard())
    }

    #[must_use]
    pub fn with_rules(tagger: Box<dyn LinguisticTagger>, rules: RuleTable) -> Self {
        Self { tagger, rules }
    }

    #[must_use]
    pub fn tagger_name(&self) -> &str {
        self.tagger.name()
    }

    /// Analyze `text`. Tagger failures and malformed parses are returned as errors.
    pub fn analyze(&self, text: &str) -> Result<LinguisticReport> {
        let start = Instant::now();
        let text = clean_text(text);
        let doc = self.tagger.parse(&text)?;
        doc.validate()?;

        let pos_counts = compute_pos_counts(&doc);
        let pos_ratios = compute_pos_ratios(&doc, &pos_counts);
        let token_count = doc
            .tokens
            .iter()
            .filter(|t| !t.is_punct() && !t.is_space())
            .count();
        let interrogative_lens = self.rules.apply(&doc);
        let pos_words = collect_pos_words(&doc);

        debug!(
            "Tagger {} produced {} tokens in {} sentences",
            self.tagger.name(),
            doc.len(),
            doc.sentences.len()
        );
        info!(
            "Linguistic analysis: {} tokens, {} filled slots in {:.2}s",
            token_count,
            interrogative_lens.values().filter(|v| !v.is_empty()).count(),
            start.elapsed().as_secs_f64()
        );

        Ok(LinguisticReport {
            text,
            token_count,
            pos_counts,
            pos_ratios,
            interrogative_lens,
            pos_words,
        })
    }
}

impl std::fmt::Debug for LinguisticStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinguisticStage")
            .field("tagger", &self.tagger.name())
            .field("rules", &self.rules.rules().len())
            .finish()
    }
}
