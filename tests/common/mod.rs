/*!
 * Common test utilities for the phrasekit test suite
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use phrasekit::{
    Config, CorpusError, KeyTerm, KeyTermRule, PhraseId, PhraseTranslationHelper, Question, QuestionSource,
    SimpleKeyTerm, Substitution,
};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Route library logging to the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// In-memory question source assembled with a builder
#[derive(Debug, Clone, Default)]
pub struct TestCorpus {
    pub questions: Vec<Question>,
    pub key_terms: Vec<SimpleKeyTerm>,
    pub substitutions: Vec<Substitution>,
    pub rules: Vec<KeyTermRule>,
}

impl TestCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key term whose id is its gloss
    pub fn key_term(mut self, gloss: &str, renderings: &[&str]) -> Self {
        self.key_terms.push(SimpleKeyTerm::new(gloss).with_renderings(renderings));
        self
    }

    /// Add a fully specified key term
    pub fn term(mut self, term: SimpleKeyTerm) -> Self {
        self.key_terms.push(term);
        self
    }

    /// Add a question without a reference
    pub fn phrase(self, text: &str) -> Self {
        self.question(Question::new("", 0, 0, text))
    }

    pub fn question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    pub fn substitution(mut self, substitution: Substitution) -> Self {
        self.substitutions.push(substitution);
        self
    }

    pub fn rule(mut self, rule: KeyTermRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Parse the corpus with the default configuration
    pub fn build(&self) -> PhraseTranslationHelper {
        init_logging();
        PhraseTranslationHelper::from_source(self, &Config::default()).expect("test corpus should parse")
    }
}

impl QuestionSource for TestCorpus {
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
        Ok(self.rules.clone())
    }
}

/// The six questions A to F used by the sorting and filtering tests, with
/// the references listed in `excluded` marked as excluded
pub fn sample_questions(corpus: TestCorpus, excluded: &[&str]) -> TestCorpus {
    let texts = [
        ("A", "What would God have me to say with respect to Paul?"),
        ("B", "What is Paul asking me to say with respect to that dog?"),
        ("C", "that dog"),
        ("D", "Is it okay for Paul me to talk with respect to God today?"),
        ("E", "that dog wishes this Paul and what is say radish"),
        ("F", "What is that dog?"),
    ];
    texts
        .iter()
        .enumerate()
        .fold(corpus, |corpus, (i, (reference, text))| {
            let verse = i as i32 + 1;
            let question = Question::new(reference, verse, verse, text);
            let question = if excluded.contains(reference) { question.exclude() } else { question };
            corpus.question(question)
        })
}

/// Id of the phrase at `index` in corpus order
pub fn phrase_id(helper: &PhraseTranslationHelper, index: usize) -> PhraseId {
    helper.unfiltered_phrases()[index].id()
}

/// Current translation of the phrase at `index` in corpus order
pub fn translation_of(helper: &PhraseTranslationHelper, index: usize) -> String {
    helper.unfiltered_phrases()[index].translation().to_string()
}

/// Whether the phrase at `index` in corpus order carries a user translation
pub fn is_user_translated(helper: &PhraseTranslationHelper, index: usize) -> bool {
    helper.unfiltered_phrases()[index].has_user_translation()
}

/// References of the phrases in the current view, in display order
pub fn view_references(helper: &PhraseTranslationHelper) -> Vec<String> {
    helper.phrases().map(|p| p.reference().to_string()).collect()
}

/// Literal parts of the phrase whose English text is `text`, each with the
/// number of phrases that own it
pub fn parts_with_owners(helper: &PhraseTranslationHelper, text: &str) -> Vec<(String, usize)> {
    let table = helper.part_table();
    let phrase = helper
        .unfiltered_phrases()
        .iter()
        .find(|p| p.original_phrase() == text)
        .unwrap_or_else(|| panic!("no phrase '{}'", text));
    phrase
        .translatable_parts()
        .map(|id| {
            let part = table.part(id);
            assert_eq!(part.words().len(), part.text().split(' ').count());
            (part.text(), part.owner_count())
        })
        .collect()
}

/// Expected parts in the shape returned by `parts_with_owners`
pub fn owned(parts: &[(&str, usize)]) -> Vec<(String, usize)> {
    parts.iter().map(|(text, owners)| (text.to_string(), *owners)).collect()
}
