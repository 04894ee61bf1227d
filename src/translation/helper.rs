/*!
 * The phrase collection manager.
 *
 * `PhraseTranslationHelper` owns a parsed corpus and keeps a sorted, filtered
 * view over it. Translation edits go through the helper so that every edit
 * triggers a fresh inference pass over the whole corpus (unless a bulk load
 * is in progress).
 */

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::ops::Index;

use log::{debug, info, warn};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::app_config::{Config, InferenceConfig, OuterPunctuation, PhraseTypePunctuation};
use crate::errors::{CorpusError, PhraseError};
use crate::phrase::key_term::{KeyTerm, KeyTermRule};
use crate::phrase::part::{KeyTermMatchId, PartTable, PhraseId, PhrasePart};
use crate::phrase::provider::{ParsedCorpus, QuestionProvider, QuestionSource};
use crate::phrase::question::Question;
use crate::phrase::text::{to_nfc, whole_word_pattern};
use crate::phrase::translatable::{TranslatablePhrase, TypeOfPhrase};
use crate::translation::inference::{punctuation_for, InferenceEngine, InferenceSummary};
use crate::translation::rendering::{
    find_rendering_in_use, RenderingResolver, RenderingSelectionRule, SubstringDescriptor,
};

/// Orderings available for the phrase view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Phrases built from widely shared parts first
    #[default]
    Default,
    /// Alphabetically by the English question
    EnglishPhrase,
    /// By category, reference range and sequence number
    Reference,
    /// Alphabetically by the current translation
    Translation,
}

/// Restriction on the renderings of the key terms in a phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyTermFilterType {
    /// No restriction
    #[default]
    All,
    /// Every key term in the phrase has a rendering
    WithRenderings,
    /// At least one key term in the phrase has no rendering
    WithoutRenderings,
}

/// Caller-supplied test on `(start_ref, end_ref, reference)`
pub type ReferenceFilter<'f> = &'f dyn Fn(i32, i32, &str) -> bool;

/// Owns a parsed corpus, its view and its translation state
pub struct PhraseTranslationHelper {
    phrases: Vec<TranslatablePhrase>,
    table: PartTable,
    key_terms: Vec<Box<dyn KeyTerm>>,
    key_term_rules: Vec<KeyTermRule>,
    fired_rules: BTreeSet<usize>,
    config: InferenceConfig,
    resolver: RenderingResolver,
    punctuation: PhraseTypePunctuation,
    summary: InferenceSummary,

    /// Indices into `phrases`, in display order
    view: Vec<usize>,
    sort_by: SortBy,
    ascending: bool,
    bulk_loading: bool,
}

impl PhraseTranslationHelper {
    /// Take ownership of a parsed corpus and run a first inference pass.
    pub fn new(corpus: ParsedCorpus, config: &InferenceConfig) -> Result<Self, PhraseError> {
        if config.min_partial_match_chars == 0 {
            return Err(PhraseError::InvalidConfig(
                "min_partial_match_chars must be at least 1".to_string(),
            ));
        }
        let ParsedCorpus {
            phrases,
            table,
            key_terms,
            key_term_rules,
            fired_rules,
        } = corpus;

        let view = (0..phrases.len()).collect();
        let mut helper = Self {
            phrases,
            table,
            key_terms,
            key_term_rules,
            fired_rules,
            config: config.clone(),
            resolver: RenderingResolver::default(),
            punctuation: config.punctuation.clone(),
            summary: InferenceSummary::default(),
            view,
            sort_by: SortBy::Default,
            ascending: true,
            bulk_loading: false,
        };
        helper.verify_integrity()?;
        helper.recompute();
        helper.apply_sort();
        info!(
            "Managing {} phrases ({} excluded)",
            helper.phrases.len(),
            helper.phrases.iter().filter(|p| p.is_excluded()).count()
        );
        Ok(helper)
    }

    /// Parse everything `source` supplies and manage the result.
    pub fn from_source(source: &dyn QuestionSource, config: &Config) -> Result<Self, CorpusError> {
        let corpus = QuestionProvider::new(source)
            .with_config(config.parser.clone())
            .parse()?;
        Ok(Self::new(corpus, &config.inference)?)
    }

    fn engine(&self) -> InferenceEngine<'_> {
        InferenceEngine::new(&self.config, &self.key_terms, &self.resolver)
    }

    fn recompute(&mut self) {
        if self.bulk_loading {
            return;
        }
        let engine = InferenceEngine::new(&self.config, &self.key_terms, &self.resolver);
        let (summary, punctuation) = engine.recompute(&mut self.phrases, &mut self.table);
        self.summary = summary;
        self.punctuation = punctuation;
    }

    // View ------------------------------------------------------------------

    /// Number of phrases in the current view
    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// The i-th phrase of the current view
    pub fn get(&self, index: usize) -> Option<&TranslatablePhrase> {
        self.view.get(index).map(|i| &self.phrases[*i])
    }

    /// Phrases in the current view, in display order
    pub fn phrases(&self) -> impl Iterator<Item = &TranslatablePhrase> + '_ {
        self.view.iter().map(|i| &self.phrases[*i])
    }

    /// Every phrase, in corpus order
    pub fn unfiltered_phrases(&self) -> &[TranslatablePhrase] {
        &self.phrases
    }

    /// View position of the phrase built from `question`
    pub fn find_phrase(&self, question: &Question) -> Option<usize> {
        self.view
            .iter()
            .position(|i| self.phrases[*i].question().same_as(question))
    }

    pub fn phrase(&self, id: PhraseId) -> Result<&TranslatablePhrase, PhraseError> {
        self.phrases
            .get(id.index())
            .ok_or(PhraseError::UnknownPhrase(id.index()))
    }

    fn checked(&self, id: PhraseId) -> Result<usize, PhraseError> {
        if id.index() < self.phrases.len() {
            Ok(id.index())
        } else {
            Err(PhraseError::UnknownPhrase(id.index()))
        }
    }

    pub fn sort_order(&self) -> (SortBy, bool) {
        (self.sort_by, self.ascending)
    }

    /// Reorder the current view. Descending is the exact reverse of ascending.
    pub fn sort(&mut self, by: SortBy, ascending: bool) {
        self.sort_by = by;
        self.ascending = ascending;
        self.apply_sort();
        debug!("Sorted {} phrases by {:?} ({})", self.view.len(), by, if ascending { "ascending" } else { "descending" });
    }

    fn apply_sort(&mut self) {
        let mut view = std::mem::take(&mut self.view);
        match self.sort_by {
            SortBy::Default => {
                let keys: Vec<(usize, usize, usize)> = self.phrases.iter().map(|p| self.usage_key(p)).collect();
                view.sort_by(|a, b| {
                    let (ka, kb) = (keys[*a], keys[*b]);
                    kb.0.cmp(&ka.0)
                        .then(ka.1.cmp(&kb.1))
                        .then(kb.2.cmp(&ka.2))
                        .then(a.cmp(b))
                });
            }
            SortBy::EnglishPhrase => {
                let keys: Vec<String> = self.phrases.iter().map(|p| p.original_phrase().to_lowercase()).collect();
                view.sort_by(|a, b| keys[*a].cmp(&keys[*b]).then(a.cmp(b)));
            }
            SortBy::Reference => {
                view.sort_by(|a, b| compare_references(self.phrases[*a].question(), self.phrases[*b].question()).then(a.cmp(b)));
            }
            SortBy::Translation => {
                let keys: Vec<String> = self.phrases.iter().map(|p| p.translation().to_lowercase()).collect();
                view.sort_by(|a, b| keys[*a].cmp(&keys[*b]).then(a.cmp(b)));
            }
        }
        if !self.ascending {
            view.reverse();
        }
        self.view = view;
    }

    /// (fewest owners of any part, number of parts, most owners of any part)
    fn usage_key(&self, phrase: &TranslatablePhrase) -> (usize, usize, usize) {
        let counts: Vec<usize> = phrase
            .translatable_parts()
            .map(|id| self.table.part(id).owner_count())
            .collect();
        (
            counts.iter().copied().min().unwrap_or(0),
            counts.len(),
            counts.iter().copied().max().unwrap_or(0),
        )
    }

    /// Rebuild the view from the whole corpus, keeping the phrases that pass
    /// every filter, then reapply the current sort.
    pub fn filter(
        &mut self,
        text: Option<&str>,
        whole_word: bool,
        key_term_filter: KeyTermFilterType,
        reference_filter: Option<ReferenceFilter<'_>>,
        include_excluded: bool,
    ) {
        let matcher = text.filter(|t| !t.is_empty()).map(|t| text_matcher(t, whole_word));

        let view: Vec<usize> = (0..self.phrases.len())
            .filter(|i| {
                let phrase = &self.phrases[*i];
                if phrase.is_excluded() && !include_excluded {
                    return false;
                }
                if let Some(matcher) = &matcher {
                    if !matcher.is_match(phrase.original_phrase()) {
                        return false;
                    }
                }
                if let Some(accept) = reference_filter {
                    let question = phrase.question();
                    if !accept(question.start_ref, question.end_ref, &question.reference) {
                        return false;
                    }
                }
                self.passes_key_term_filter(phrase, key_term_filter)
            })
            .collect();

        info!(
            "Filter {:?} (whole word: {}, key terms: {:?}) kept {} of {} phrases",
            text.unwrap_or(""),
            whole_word,
            key_term_filter,
            view.len(),
            self.phrases.len()
        );
        self.view = view;
        self.apply_sort();
    }

    fn passes_key_term_filter(&self, phrase: &TranslatablePhrase, filter: KeyTermFilterType) -> bool {
        let engine = self.engine();
        let mut rendered = phrase
            .key_term_matches()
            .map(|id| !engine.renderings_for(&self.table, id).is_empty());
        match filter {
            KeyTermFilterType::All => true,
            KeyTermFilterType::WithRenderings => rendered.all(|r| r),
            KeyTermFilterType::WithoutRenderings => rendered.any(|r| !r),
        }
    }

    // Translations -----------------------------------------------------------

    /// Suppress inference until `end_bulk_load`.
    pub fn begin_bulk_load(&mut self) {
        debug!("Bulk load started");
        self.bulk_loading = true;
    }

    /// Resume inference with one full pass.
    pub fn end_bulk_load(&mut self) {
        self.bulk_loading = false;
        self.recompute();
        info!(
            "Bulk load finished: {} training phrases, {} phrases inferred",
            self.summary.training_phrases, self.summary.phrases_inferred
        );
    }

    pub fn is_bulk_loading(&self) -> bool {
        self.bulk_loading
    }

    /// Set (or with `None`/empty, clear) the user translation of a phrase.
    ///
    /// Untranslated phrases with identical parts accept the same translation;
    /// untranslated phrases with the same part pattern use this phrase as
    /// their template.
    pub fn set_translation(&mut self, id: PhraseId, translation: Option<&str>) -> Result<(), PhraseError> {
        let index = self.checked(id)?;
        if self.phrases[index].is_excluded() {
            warn!("Translating excluded phrase '{}'", self.phrases[index].original_phrase());
        }

        match translation.map(to_nfc).filter(|t| !t.is_empty()) {
            Some(text) => {
                for other in 0..self.phrases.len() {
                    let candidate = &self.phrases[other];
                    if other == index || candidate.has_user_translation() || candidate.is_excluded() {
                        continue;
                    }
                    let identical = candidate.parts_identical(&self.phrases[index]);
                    let same_pattern = candidate.part_pattern_matches(&self.phrases[index]);
                    if identical {
                        debug!("Phrase {} has the same parts; accepting '{}'", other, text);
                        self.phrases[other].set_user_translation(text.clone());
                    } else if same_pattern {
                        self.phrases[other].template_source = Some(id);
                    }
                }
                debug!("Phrase {} translated as '{}'", index, text);
                self.phrases[index].set_user_translation(text);
            }
            None => {
                debug!("Phrase {} translation cleared", index);
                let phrase = &mut self.phrases[index];
                phrase.clear_user_translation();
                phrase.set_inferred_translation(String::new());
            }
        }

        self.recompute();
        Ok(())
    }

    /// Accept or reject the translation shown for a phrase as the user's own.
    pub fn set_has_user_translation(&mut self, id: PhraseId, value: bool) -> Result<(), PhraseError> {
        let index = self.checked(id)?;
        let phrase = &mut self.phrases[index];
        phrase.set_has_user_translation(value);
        if !value {
            phrase.template_source = None;
        }
        self.recompute();
        Ok(())
    }

    /// Outer punctuation in effect for a type of phrase
    pub fn punctuation_for(&self, type_of_phrase: TypeOfPhrase) -> &OuterPunctuation {
        punctuation_for(&self.punctuation, type_of_phrase)
    }

    /// What the last inference pass did
    pub fn last_summary(&self) -> &InferenceSummary {
        &self.summary
    }

    // Key terms ---------------------------------------------------------------

    pub fn key_terms(&self) -> &[Box<dyn KeyTerm>] {
        &self.key_terms
    }

    pub fn part_table(&self) -> &PartTable {
        &self.table
    }

    /// Key-term rules that never affected any question
    pub fn unused_key_term_rules(&self) -> Vec<&KeyTermRule> {
        self.key_term_rules
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.fired_rules.contains(i))
            .map(|(_, rule)| rule)
            .collect()
    }

    fn checked_match(&self, id: KeyTermMatchId) -> Result<(), PhraseError> {
        match self.table.get_key_term_match(id.index()) {
            Some(_) => Ok(()),
            None => Err(PhraseError::InvariantViolation(format!(
                "unknown key-term match {}",
                id.index()
            ))),
        }
    }

    /// Where one of the match's renderings occurs in the phrase's translation,
    /// searching from byte offset `start`.
    pub fn find_term_rendering_in_use(
        &self,
        phrase: PhraseId,
        key_term: KeyTermMatchId,
        start: usize,
    ) -> Result<Option<SubstringDescriptor>, PhraseError> {
        let phrase = self.phrase(phrase)?;
        self.checked_match(key_term)?;
        let renderings = self.engine().renderings_for(&self.table, key_term);
        Ok(find_rendering_in_use(phrase.translation(), &renderings, start))
    }

    /// The rendering inferred translations use for a match in a phrase.
    pub fn resolved_rendering(&self, phrase: PhraseId, key_term: KeyTermMatchId) -> Result<String, PhraseError> {
        let phrase = self.phrase(phrase)?;
        self.checked_match(key_term)?;
        Ok(self
            .engine()
            .resolved_rendering(&self.table, key_term, phrase.original_phrase()))
    }

    /// Override (or with `None`, restore) the default rendering of a match.
    pub fn set_best_rendering(&mut self, key_term: KeyTermMatchId, rendering: Option<&str>) -> Result<(), PhraseError> {
        self.checked_match(key_term)?;
        let rendering = rendering.map(to_nfc).filter(|r| !r.is_empty());
        debug!("Best rendering of match {} set to {:?}", key_term.index(), rendering);
        self.table.key_term_match_mut(key_term).set_best_rendering(rendering);
        self.recompute();
        Ok(())
    }

    pub fn rendering_rules(&self) -> Vec<RenderingSelectionRule> {
        self.resolver.rules()
    }

    /// Replace the rendering selection rules wholesale.
    pub fn set_rendering_rules(&mut self, rules: Vec<RenderingSelectionRule>) -> Result<(), PhraseError> {
        self.resolver = RenderingResolver::new(rules)?;
        info!("Using {} rendering selection rules", self.resolver.rules().len());
        self.recompute();
        Ok(())
    }

    /// Check the corpus bookkeeping: owner sets, phrase ids and the view.
    pub fn verify_integrity(&self) -> Result<(), PhraseError> {
        let parts: Vec<&[PhrasePart]> = self.phrases.iter().map(|p| p.parts()).collect();
        self.table.verify_owners(&parts)?;

        for (index, phrase) in self.phrases.iter().enumerate() {
            if phrase.id().index() != index {
                return Err(PhraseError::InvariantViolation(format!(
                    "phrase at {} carries id {}",
                    index,
                    phrase.id().index()
                )));
            }
            if phrase.is_excluded() && !phrase.parts().is_empty() {
                return Err(PhraseError::InvariantViolation(format!(
                    "excluded phrase '{}' has parts",
                    phrase.original_phrase()
                )));
            }
        }

        if let Some(bad) = self.view.iter().find(|i| **i >= self.phrases.len()) {
            return Err(PhraseError::InvariantViolation(format!("view refers to phrase {}", bad)));
        }
        Ok(())
    }
}

impl Index<usize> for PhraseTranslationHelper {
    type Output = TranslatablePhrase;

    fn index(&self, index: usize) -> &TranslatablePhrase {
        &self.phrases[self.view[index]]
    }
}

/// Reference order: category, start, end, then sequence number.
fn compare_references(a: &Question, b: &Question) -> Ordering {
    a.category
        .cmp(&b.category)
        .then(a.start_ref.cmp(&b.start_ref))
        .then(a.end_ref.cmp(&b.end_ref))
        .then(a.sequence.cmp(&b.sequence))
}

/// Case-insensitive test for filter text. The text is always escaped, so any
/// input is taken literally.
enum TextMatcher {
    Pattern(Regex),
    Literal(String),
}

impl TextMatcher {
    fn is_match(&self, text: &str) -> bool {
        match self {
            TextMatcher::Pattern(regex) => regex.is_match(text),
            TextMatcher::Literal(needle) => text.to_lowercase().contains(needle.as_str()),
        }
    }
}

fn text_matcher(text: &str, whole_word: bool) -> TextMatcher {
    let escaped = regex::escape(text);
    let pattern = if whole_word {
        whole_word_pattern(text, &escaped)
    } else {
        escaped
    };
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => TextMatcher::Pattern(regex),
        Err(e) => {
            warn!("Filter '{}' could not be compiled ({}); matching as a substring", text, e);
            TextMatcher::Literal(text.to_lowercase())
        }
    }
}
