/*!
 * Key terms and the surface forms they are recognized by.
 *
 * A key term is supplied by the host: an id, an English gloss and the
 * vernacular renderings known for it. The gloss is expanded into the
 * English word sequences that count as an occurrence of the term.
 */

use serde::{Deserialize, Serialize};

use crate::app_config::ParserConfig;
use crate::phrase::text::words_of;

/// A glossed term with host-managed renderings.
pub trait KeyTerm: Send + Sync {
    /// Stable identifier of the term
    fn id(&self) -> &str;

    /// English gloss; may list alternatives and optional groups
    fn gloss(&self) -> &str;

    /// Vernacular renderings, default first. May be empty.
    fn renderings(&self) -> Vec<String>;

    /// Verses where the term occurs. Empty means it applies everywhere.
    fn references(&self) -> Vec<i32> {
        Vec::new()
    }
}

/// Plain owned key term, usable from JSON corpora and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleKeyTerm {
    pub id: String,
    pub gloss: String,
    #[serde(default)]
    pub renderings: Vec<String>,
    #[serde(default)]
    pub references: Vec<i32>,
}

impl SimpleKeyTerm {
    /// A term whose id is its gloss.
    pub fn new(gloss: &str) -> Self {
        Self {
            id: gloss.to_string(),
            gloss: gloss.to_string(),
            renderings: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_renderings(mut self, renderings: &[&str]) -> Self {
        self.renderings = renderings.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_references(mut self, references: &[i32]) -> Self {
        self.references = references.to_vec();
        self
    }
}

impl KeyTerm for SimpleKeyTerm {
    fn id(&self) -> &str {
        &self.id
    }

    fn gloss(&self) -> &str {
        &self.gloss
    }

    fn renderings(&self) -> Vec<String> {
        self.renderings.clone()
    }

    fn references(&self) -> Vec<i32> {
        self.references.clone()
    }
}

/// Host adjustment of how one key term is matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTermRule {
    /// Id of the term the rule applies to
    pub term_id: String,

    /// Extra English forms that also count as the term
    #[serde(default)]
    pub alternates: Vec<String>,

    /// Never match the term at all
    #[serde(default)]
    pub excluded: bool,
}

impl KeyTermRule {
    pub fn alternates(term_id: &str, alternates: &[&str]) -> Self {
        Self {
            term_id: term_id.to_string(),
            alternates: alternates.iter().map(|a| a.to_string()).collect(),
            excluded: false,
        }
    }

    pub fn excluded(term_id: &str) -> Self {
        Self {
            term_id: term_id.to_string(),
            alternates: Vec::new(),
            excluded: true,
        }
    }
}

/// Whether a term is in scope for a question covering `start..=end`.
pub fn in_scope(references: &[i32], start: i32, end: i32) -> bool {
    references.is_empty() || references.iter().any(|r| *r >= start && *r <= end)
}

/// Expand a gloss into the word sequences that count as the term.
pub fn surface_forms(gloss: &str, config: &ParserConfig) -> Vec<Vec<String>> {
    let mut forms: Vec<Vec<String>> = Vec::new();
    let alternatives = gloss.split(|c: char| config.gloss_separators.contains(c));
    for alternative in alternatives {
        for choice in expand_or_choices(alternative.trim()) {
            for expanded in expand_optional_groups(&choice, config.max_optional_groups) {
                push_form(&mut forms, words_of(&expanded));
                if config.optional_leading_to {
                    let lowered = expanded.trim_start().to_lowercase();
                    if let Some(rest) = lowered.strip_prefix("to ") {
                        push_form(&mut forms, words_of(rest));
                    }
                }
            }
        }
    }
    forms
}

/// Split `a or b` choices, giving each one the words before the first
/// choice and after the last: `high or drunk sailor` yields `high sailor`
/// and `drunk sailor`.
fn expand_or_choices(text: &str) -> Vec<String> {
    let mut segments: Vec<Vec<&str>> = vec![Vec::new()];
    for word in text.split_whitespace() {
        if word.eq_ignore_ascii_case("or") {
            segments.push(Vec::new());
        } else if let Some(segment) = segments.last_mut() {
            segment.push(word);
        }
    }
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
        return vec![text.to_string()];
    }

    let last_index = segments.len() - 1;
    let (leading, first_choice) = segments[0].split_at(segments[0].len() - 1);
    let (last_choice, trailing) = segments[last_index].split_at(1);
    // An "or" inside a parenthesized group is left to the optional-group expansion
    let unbalanced = segments.iter().any(|s| !balanced_groups(s));
    if unbalanced || !balanced_groups(leading) || !balanced_groups(trailing) {
        return vec![text.to_string()];
    }

    let mut choices: Vec<&[&str]> = vec![first_choice];
    choices.extend(segments[1..last_index].iter().map(Vec::as_slice));
    choices.push(last_choice);
    choices
        .into_iter()
        .map(|choice| {
            leading
                .iter()
                .chain(choice)
                .chain(trailing)
                .copied()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn balanced_groups(words: &[&str]) -> bool {
    let mut depth = 0i32;
    for c in words.iter().flat_map(|w| w.chars()) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn push_form(forms: &mut Vec<Vec<String>>, words: Vec<String>) {
    if !words.is_empty() && !forms.contains(&words) {
        forms.push(words);
    }
}

/// Every combination of including or leaving out the parenthesized groups.
/// Groups beyond `max_groups` are always included.
fn expand_optional_groups(text: &str, max_groups: usize) -> Vec<String> {
    let mut pieces: Vec<(String, bool)> = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' => {
                if depth == 0 && !current.is_empty() {
                    pieces.push((std::mem::take(&mut current), false));
                } else if depth > 0 {
                    current.push(c);
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    pieces.push((std::mem::take(&mut current), true));
                } else {
                    current.push(c);
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        pieces.push((current, depth > 0));
    }

    let optional: Vec<usize> = pieces
        .iter()
        .enumerate()
        .filter(|(_, (_, opt))| *opt)
        .map(|(i, _)| i)
        .take(max_groups)
        .collect();

    let mut results = Vec::with_capacity(1 << optional.len());
    for mask in 0..(1usize << optional.len()) {
        let mut form = String::new();
        for (i, (piece, _)) in pieces.iter().enumerate() {
            let skipped = optional
                .iter()
                .position(|o| *o == i)
                .is_some_and(|bit| mask & (1 << bit) != 0);
            if !skipped {
                form.push_str(piece);
            }
        }
        let collapsed = form.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() && !results.contains(&collapsed) {
            results.push(collapsed);
        }
    }
    results
}
