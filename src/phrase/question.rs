use serde::{Deserialize, Serialize};

/// One template question of the corpus, as supplied by a question source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// English text of the question
    pub text: String,

    /// Display form of the reference range (e.g. "MRK 1.1-3")
    #[serde(default)]
    pub reference: String,

    /// First verse of the range, as an ordered integer
    #[serde(default)]
    pub start_ref: i32,

    /// Last verse of the range, as an ordered integer
    #[serde(default)]
    pub end_ref: i32,

    /// Category (section type) index
    #[serde(default)]
    pub category: i32,

    /// Position within the category for the same range
    #[serde(default)]
    pub sequence: i32,

    /// Excluded questions are kept in the corpus but never parsed
    #[serde(default)]
    pub excluded: bool,
}

impl Question {
    pub fn new(reference: &str, start_ref: i32, end_ref: i32, text: &str) -> Self {
        Self {
            text: text.to_string(),
            reference: reference.to_string(),
            start_ref,
            end_ref,
            category: 0,
            sequence: 0,
            excluded: false,
        }
    }

    pub fn in_category(mut self, category: i32, sequence: i32) -> Self {
        self.category = category;
        self.sequence = sequence;
        self
    }

    pub fn exclude(mut self) -> Self {
        self.excluded = true;
        self
    }

    /// Questions with no text are dropped when a corpus is parsed.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Whether a key term occurring at `reference` is in scope for this question.
    pub fn covers(&self, reference: i32) -> bool {
        reference >= self.start_ref && reference <= self.end_ref
    }

    /// Same reference and text, ignoring category, sequence and exclusion.
    pub fn same_as(&self, other: &Question) -> bool {
        self.reference == other.reference
            && self.start_ref == other.start_ref
            && self.end_ref == other.end_ref
            && self.text == other.text
    }
}
