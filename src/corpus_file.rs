/*!
 * JSON corpus documents.
 *
 * A corpus file carries everything needed to build and exercise a phrase
 * helper: the questions, the key terms with their renderings, substitutions,
 * key-term rules, rendering selection rules and any translations already
 * entered by the user.
 */

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::CorpusError;
use crate::phrase::key_term::{KeyTerm, KeyTermRule, SimpleKeyTerm};
use crate::phrase::provider::QuestionSource;
use crate::phrase::question::Question;
use crate::phrase::substitution::Substitution;
use crate::translation::rendering::RenderingSelectionRule;

/// A translation already entered for one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialTranslation {
    /// Position of the question in `questions`
    pub question: usize,

    /// The translation text
    pub translation: String,
}

/// Serialized corpus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusFile {
    #[serde(default)]
    pub questions: Vec<Question>,

    #[serde(default)]
    pub key_terms: Vec<SimpleKeyTerm>,

    #[serde(default)]
    pub substitutions: Vec<Substitution>,

    #[serde(default)]
    pub key_term_rules: Vec<KeyTermRule>,

    #[serde(default)]
    pub rendering_rules: Vec<RenderingSelectionRule>,

    #[serde(default)]
    pub translations: Vec<InitialTranslation>,
}

impl CorpusFile {
    /// Load a corpus from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| CorpusError::Load(format!("{}: {}", path.display(), e)))?;
        let corpus: CorpusFile = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| CorpusError::Parse(format!("{}: {}", path.display(), e)))?;
        corpus.validate()?;
        info!(
            "Loaded corpus {} with {} questions and {} key terms",
            path.display(),
            corpus.questions.len(),
            corpus.key_terms.len()
        );
        Ok(corpus)
    }

    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        let corpus: CorpusFile = serde_json::from_str(json)?;
        corpus.validate()?;
        Ok(corpus)
    }

    pub fn to_json(&self) -> Result<String, CorpusError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Position among the parsed phrases of the question at `question`.
    /// Blank questions are not parsed, so they have none.
    pub fn phrase_index(&self, question: usize) -> Option<usize> {
        let target = self.questions.get(question)?;
        if target.is_blank() {
            return None;
        }
        Some(self.questions[..question].iter().filter(|q| !q.is_blank()).count())
    }

    /// Check cross references inside the document.
    pub fn validate(&self) -> Result<(), CorpusError> {
        for entry in &self.translations {
            if entry.question >= self.questions.len() {
                return Err(CorpusError::Parse(format!(
                    "translation refers to question {} but the corpus has {}",
                    entry.question,
                    self.questions.len()
                )));
            }
        }
        for question in &self.questions {
            if question.end_ref < question.start_ref {
                return Err(CorpusError::Parse(format!(
                    "question '{}' ends before it starts ({} > {})",
                    question.text, question.start_ref, question.end_ref
                )));
            }
        }
        debug!("Corpus document is consistent");
        Ok(())
    }
}

impl QuestionSource for CorpusFile {
    fn questions(&self) -> Result<Vec<Question>, CorpusError> {
        Ok(self.questions.clone())
    }

    fn key_terms(&self) -> Result<Vec<Box<dyn KeyTerm>>, CorpusError> {
        Ok(self
            .key_terms
            .iter()
            .cloned()
            .map(|t| Box::new(t) as Box<dyn KeyTerm>)
            .collect())
    }

    fn substitutions(&self) -> Result<Vec<Substitution>, CorpusError> {
        Ok(self.substitutions.clone())
    }

    fn key_term_rules(&self) -> Result<Vec<KeyTermRule>, CorpusError> {
        Ok(self.key_term_rules.clone())
    }
}
