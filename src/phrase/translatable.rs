use crate::phrase::part::{KeyTermMatchId, PartId, PhraseId, PhrasePart};
use crate::phrase::question::Question;
use crate::phrase::text::trim_outer_punctuation;

/// Kind of sentence, judged from the English punctuation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeOfPhrase {
    Question,
    StatementOrImperative,
    Unknown,
}

impl TypeOfPhrase {
    /// Judged from the final character alone; a closing quote makes it `Unknown`.
    pub fn of(text: &str) -> Self {
        match text.trim_end().chars().last() {
            Some('?') => TypeOfPhrase::Question,
            Some('.') | Some('!') => TypeOfPhrase::StatementOrImperative,
            _ => TypeOfPhrase::Unknown,
        }
    }
}

/// A parsed question together with its translation state
#[derive(Debug, Clone)]
pub struct TranslatablePhrase {
    id: PhraseId,
    question: Question,
    modified_text: String,
    parts: Vec<PhrasePart>,
    type_of_phrase: TypeOfPhrase,
    translation: String,
    has_user_translation: bool,
    user_translation: Option<String>,
    /// Most recently edited phrase with the same part pattern
    pub(crate) template_source: Option<PhraseId>,
}

impl TranslatablePhrase {
    pub(crate) fn new(id: PhraseId, question: Question, modified_text: String, parts: Vec<PhrasePart>) -> Self {
        let type_of_phrase = TypeOfPhrase::of(&question.text);
        Self {
            id,
            question,
            modified_text,
            parts,
            type_of_phrase,
            translation: String::new(),
            has_user_translation: false,
            user_translation: None,
            template_source: None,
        }
    }

    pub fn id(&self) -> PhraseId {
        self.id
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    /// English text as supplied
    pub fn original_phrase(&self) -> &str {
        &self.question.text
    }

    /// English text after substitutions
    pub fn modified_phrase(&self) -> &str {
        &self.modified_text
    }

    pub fn reference(&self) -> &str {
        &self.question.reference
    }

    pub fn is_excluded(&self) -> bool {
        self.question.excluded
    }

    pub fn type_of_phrase(&self) -> TypeOfPhrase {
        self.type_of_phrase
    }

    /// Parts and key-term placeholders in order
    pub fn parts(&self) -> &[PhrasePart] {
        &self.parts
    }

    pub(crate) fn parts_mut(&mut self) -> &mut Vec<PhrasePart> {
        &mut self.parts
    }

    /// Literal parts only
    pub fn translatable_parts(&self) -> impl Iterator<Item = PartId> + '_ {
        self.parts.iter().filter_map(|p| match p {
            PhrasePart::Literal(id) => Some(*id),
            PhrasePart::KeyTerm(_) => None,
        })
    }

    pub fn translatable_part_count(&self) -> usize {
        self.translatable_parts().count()
    }

    /// Key-term placeholders only
    pub fn key_term_matches(&self) -> impl Iterator<Item = KeyTermMatchId> + '_ {
        self.parts.iter().filter_map(|p| match p {
            PhrasePart::KeyTerm(id) => Some(*id),
            PhrasePart::Literal(_) => None,
        })
    }

    pub fn translation(&self) -> &str {
        &self.translation
    }

    pub fn has_user_translation(&self) -> bool {
        self.has_user_translation
    }

    /// The last string the user entered, kept while the phrase shows an inferred value
    pub fn user_translation(&self) -> Option<&str> {
        self.user_translation.as_deref()
    }

    /// The translation with leading and trailing punctuation removed.
    pub fn user_trans_sans_outer_punctuation(&self) -> &str {
        trim_outer_punctuation(&self.translation)
    }

    /// Same literal parts in the same order, with key terms in the same
    /// positions (the terms themselves may differ).
    pub fn part_pattern_matches(&self, other: &TranslatablePhrase) -> bool {
        self.parts.len() == other.parts.len()
            && self.parts.iter().zip(other.parts.iter()).all(|pair| match pair {
                (PhrasePart::Literal(a), PhrasePart::Literal(b)) => a == b,
                (PhrasePart::KeyTerm(_), PhrasePart::KeyTerm(_)) => true,
                _ => false,
            })
    }

    /// Literal parts in order, with `None` standing for each key term. Two
    /// phrases have equal patterns exactly when `part_pattern_matches` holds.
    pub(crate) fn part_pattern(&self) -> Vec<Option<PartId>> {
        self.parts
            .iter()
            .map(|part| match part {
                PhrasePart::Literal(id) => Some(*id),
                PhrasePart::KeyTerm(_) => None,
            })
            .collect()
    }

    /// Exactly the same parts, key terms included.
    pub fn parts_identical(&self, other: &TranslatablePhrase) -> bool {
        !self.parts.is_empty() && self.parts == other.parts
    }

    pub(crate) fn set_user_translation(&mut self, translation: String) {
        self.translation = translation.clone();
        self.user_translation = Some(translation);
        self.has_user_translation = true;
    }

    pub(crate) fn clear_user_translation(&mut self) {
        self.user_translation = None;
        self.has_user_translation = false;
    }

    pub(crate) fn set_has_user_translation(&mut self, value: bool) {
        if let (true, Some(stored)) = (value, &self.user_translation) {
            self.translation = stored.clone();
        }
        self.has_user_translation = value;
    }

    pub(crate) fn set_inferred_translation(&mut self, translation: String) {
        if !self.has_user_translation {
            self.translation = translation;
        }
    }
}
