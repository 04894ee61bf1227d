/*!
 * Question sources and the provider that turns them into a parsed corpus.
 */

use std::collections::BTreeSet;

use log::{debug, info};

use crate::app_config::ParserConfig;
use crate::errors::CorpusError;
use crate::phrase::key_term::{KeyTerm, KeyTermRule};
use crate::phrase::parser::{coalesce_sub_parts, PhraseParser};
use crate::phrase::part::{PartTable, PhraseId, PhrasePart};
use crate::phrase::question::Question;
use crate::phrase::substitution::Substitution;
use crate::phrase::translatable::TranslatablePhrase;
use crate::stemmer::{PorterStemmer, Stemmer};

/// Host-side supplier of the questions, key terms and parsing rules
pub trait QuestionSource {
    /// Every question, in corpus order
    fn questions(&self) -> Result<Vec<Question>, CorpusError>;

    /// Every key term that may be recognized
    fn key_terms(&self) -> Result<Vec<Box<dyn KeyTerm>>, CorpusError>;

    /// Rewrites applied to questions before parsing
    fn substitutions(&self) -> Result<Vec<Substitution>, CorpusError> {
        Ok(Vec::new())
    }

    /// Adjustments to key-term matching
    fn key_term_rules(&self) -> Result<Vec<KeyTermRule>, CorpusError> {
        Ok(Vec::new())
    }
}

/// A fully parsed corpus, ready to be managed
pub struct ParsedCorpus {
    pub phrases: Vec<TranslatablePhrase>,
    pub table: PartTable,
    pub key_terms: Vec<Box<dyn KeyTerm>>,
    pub key_term_rules: Vec<KeyTermRule>,
    /// Rules that affected at least one question
    pub fired_rules: BTreeSet<usize>,
}

/// Parses everything a question source supplies
pub struct QuestionProvider<'a> {
    source: &'a dyn QuestionSource,
    stemmer: Box<dyn Stemmer>,
    config: ParserConfig,
}

impl<'a> QuestionProvider<'a> {
    pub fn new(source: &'a dyn QuestionSource) -> Self {
        Self {
            source,
            stemmer: Box::new(PorterStemmer::new()),
            config: ParserConfig::default(),
        }
    }

    pub fn with_stemmer(mut self, stemmer: Box<dyn Stemmer>) -> Self {
        self.stemmer = stemmer;
        self
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Parse every non-excluded question and coalesce shared parts.
    /// Blank questions are dropped, so phrase ids count only the rest.
    pub fn parse(&self) -> Result<ParsedCorpus, CorpusError> {
        let supplied = self.source.questions()?;
        let supplied_count = supplied.len();
        let questions: Vec<Question> = supplied.into_iter().filter(|q| !q.is_blank()).collect();
        if questions.len() < supplied_count {
            debug!("Dropped {} blank questions", supplied_count - questions.len());
        }
        let key_terms = self.source.key_terms()?;
        let substitutions = self.source.substitutions()?;
        let key_term_rules = self.source.key_term_rules()?;

        let parser = PhraseParser::new(
            &key_terms,
            &key_term_rules,
            &substitutions,
            self.stemmer.as_ref(),
            &self.config,
        )?;

        let mut table = PartTable::new();
        let mut fired_rules = BTreeSet::new();
        let mut modified = Vec::with_capacity(questions.len());
        let mut all_parts: Vec<Vec<PhrasePart>> = Vec::with_capacity(questions.len());

        for (index, question) in questions.iter().enumerate() {
            if question.excluded {
                modified.push(parser.apply_substitutions(&question.text));
                all_parts.push(Vec::new());
                continue;
            }
            let outcome = parser.parse(
                &question.text,
                question.start_ref,
                question.end_ref,
                &mut table,
                PhraseId(index),
            );
            fired_rules.extend(outcome.fired_rules);
            modified.push(outcome.modified_text);
            all_parts.push(outcome.parts);
        }

        coalesce_sub_parts(&mut table, &mut all_parts, self.config.min_sub_part_words);

        let phrases: Vec<TranslatablePhrase> = questions
            .into_iter()
            .zip(modified)
            .zip(all_parts)
            .enumerate()
            .map(|(index, ((question, text), parts))| {
                TranslatablePhrase::new(PhraseId(index), question, text, parts)
            })
            .collect();

        info!(
            "Parsed {} questions into {} parts and {} key-term matches",
            phrases.len(),
            table.live_parts().count(),
            table.match_count()
        );

        Ok(ParsedCorpus {
            phrases,
            table,
            key_terms,
            key_term_rules,
            fired_rules,
        })
    }
}
