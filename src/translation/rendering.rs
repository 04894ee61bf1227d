/*!
 * Key-term rendering selection.
 *
 * Picks the vernacular rendering to substitute for a key term in an inferred
 * translation, using context rules over the English question, and locates
 * renderings that are already present in a user translation.
 */

use std::collections::HashMap;

use log::warn;
use parking_lot::Mutex;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::PhraseError;
use crate::phrase::text::{on_word_boundaries, to_nfc};

/// Placeholder in a question pattern that stands for the term's gloss
pub const TERM_PLACEHOLDER: &str = "{0}";

/// Context rule for choosing among a term's renderings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderingSelectionRule {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Regex over the English question; `{0}` is replaced by the term's gloss
    pub question_matching_pattern: String,

    /// Regex a rendering must match to be selected
    pub rendering_matching_pattern: String,

    /// Disabled rules are skipped
    #[serde(default)]
    pub disabled: bool,
}

impl RenderingSelectionRule {
    pub fn new(question_matching_pattern: &str, rendering_matching_pattern: &str) -> Self {
        Self {
            name: String::new(),
            question_matching_pattern: question_matching_pattern.to_string(),
            rendering_matching_pattern: rendering_matching_pattern.to_string(),
            disabled: false,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Check both patterns compile (the question pattern with a sample term).
    pub fn validate(&self) -> Result<(), PhraseError> {
        let sample = self.question_matching_pattern.replace(TERM_PLACEHOLDER, "term");
        Regex::new(&sample).map_err(|e| PhraseError::invalid_pattern(&self.question_matching_pattern, &e))?;
        Regex::new(&self.rendering_matching_pattern)
            .map_err(|e| PhraseError::invalid_pattern(&self.rendering_matching_pattern, &e))?;
        Ok(())
    }

    fn question_regex(&self, gloss: &str) -> Option<Regex> {
        let term: String = gloss.chars().filter(|c| *c != '(' && *c != ')').collect();
        let pattern = self
            .question_matching_pattern
            .replace(TERM_PLACEHOLDER, &regex::escape(term.trim()));
        match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!("Rendering rule '{}' does not compile for '{}': {}", self.name, gloss, e);
                None
            }
        }
    }
}

/// Location of a substring, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstringDescriptor {
    pub offset: usize,
    pub length: usize,
}

impl SubstringDescriptor {
    pub fn end_offset(&self) -> usize {
        self.offset + self.length
    }
}

/// The chosen rendering and the rule that chose it, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderingResolution {
    pub rendering: String,
    pub rule: Option<usize>,
}

struct CompiledRule {
    rule: RenderingSelectionRule,
    rendering_regex: Regex,
    /// Question pattern compiled per gloss; `None` when it does not compile
    question_regexes: Mutex<HashMap<String, Option<Regex>>>,
}

impl CompiledRule {
    fn question_regex(&self, gloss: &str) -> Option<Regex> {
        let mut cache = self.question_regexes.lock();
        if let Some(cached) = cache.get(gloss) {
            return cached.clone();
        }
        let compiled = self.rule.question_regex(gloss);
        cache.insert(gloss.to_string(), compiled.clone());
        compiled
    }
}

/// Applies rendering selection rules in order
#[derive(Default)]
pub struct RenderingResolver {
    rules: Vec<CompiledRule>,
}

impl RenderingResolver {
    pub fn new(rules: Vec<RenderingSelectionRule>) -> Result<Self, PhraseError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            rule.validate()?;
            let rendering_regex = Regex::new(&rule.rendering_matching_pattern)
                .map_err(|e| PhraseError::invalid_pattern(&rule.rendering_matching_pattern, &e))?;
            compiled.push(CompiledRule {
                rule,
                rendering_regex,
                question_regexes: Mutex::new(HashMap::new()),
            });
        }
        Ok(Self { rules: compiled })
    }

    pub fn rules(&self) -> Vec<RenderingSelectionRule> {
        self.rules.iter().map(|c| c.rule.clone()).collect()
    }

    /// Choose a rendering for a term given the English text it occurs in.
    ///
    /// The default is `best_override` when set, otherwise the first rendering.
    /// The first enabled rule whose question pattern matches and for which some
    /// rendering qualifies decides; the default wins among qualifying renderings.
    pub fn resolve(
        &self,
        gloss: &str,
        renderings: &[String],
        best_override: Option<&str>,
        english_context: &str,
    ) -> RenderingResolution {
        let default = best_override
            .map(str::to_string)
            .or_else(|| renderings.first().cloned())
            .unwrap_or_default();

        let mut candidates: Vec<&str> = Vec::with_capacity(renderings.len() + 1);
        if !default.is_empty() {
            candidates.push(&default);
        }
        for rendering in renderings {
            if !candidates.contains(&rendering.as_str()) {
                candidates.push(rendering);
            }
        }

        if candidates.len() > 1 {
            for (index, compiled) in self.rules.iter().enumerate() {
                if compiled.rule.disabled {
                    continue;
                }
                let Some(question_regex) = compiled.question_regex(gloss) else {
                    continue;
                };
                if !question_regex.is_match(english_context) {
                    continue;
                }
                if let Some(chosen) = candidates
                    .iter()
                    .find(|r| compiled.rendering_regex.is_match(r))
                {
                    return RenderingResolution {
                        rendering: chosen.to_string(),
                        rule: Some(index),
                    };
                }
            }
        }

        RenderingResolution {
            rendering: default,
            rule: None,
        }
    }
}

/// Find the earliest occurrence (on word boundaries, at or after byte offset
/// `start`) of any of the renderings. When two renderings start at the same
/// place the longer one wins.
pub fn find_rendering_in_use(text: &str, renderings: &[String], start: usize) -> Option<SubstringDescriptor> {
    if start > text.len() || !text.is_char_boundary(start) {
        return None;
    }
    let mut best: Option<SubstringDescriptor> = None;
    for rendering in renderings {
        let rendering = to_nfc(rendering);
        if rendering.is_empty() {
            continue;
        }
        let found = text[start..]
            .match_indices(rendering.as_str())
            .map(|(i, _)| start + i)
            .find(|offset| on_word_boundaries(text, *offset, offset + rendering.len()));
        if let Some(offset) = found {
            let candidate = SubstringDescriptor {
                offset,
                length: rendering.len(),
            };
            best = match best {
                Some(current)
                    if current.offset < candidate.offset
                        || (current.offset == candidate.offset && current.length >= candidate.length) =>
                {
                    Some(current)
                }
                _ => Some(candidate),
            };
        }
    }
    best
}
