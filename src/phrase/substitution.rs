use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::PhraseError;
use crate::phrase::text::whole_word_pattern;

/// Rewrite applied to question text before it is split into parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    /// Text (or regular expression) to find
    pub pattern: String,

    /// Replacement; `None` removes the match
    #[serde(default)]
    pub replacement: Option<String>,

    /// Treat `pattern` as a regular expression
    #[serde(default)]
    pub is_regex: bool,

    /// Match case exactly
    #[serde(default)]
    pub match_case: bool,
}

impl Substitution {
    /// A plain-text, case-insensitive, whole-word substitution.
    pub fn plain(pattern: &str, replacement: Option<&str>) -> Self {
        Self {
            pattern: pattern.to_string(),
            replacement: replacement.map(str::to_string),
            is_regex: false,
            match_case: false,
        }
    }

    /// A case-insensitive regular-expression substitution.
    pub fn regex(pattern: &str, replacement: Option<&str>) -> Self {
        Self {
            is_regex: true,
            ..Self::plain(pattern, replacement)
        }
    }

    pub fn case_sensitive(mut self) -> Self {
        self.match_case = true;
        self
    }

    /// Compile the rule, reporting a bad regular expression.
    pub fn compile(&self) -> Result<CompiledSubstitution, PhraseError> {
        let source = if self.is_regex {
            self.pattern.clone()
        } else {
            whole_word_pattern(&self.pattern, &regex::escape(&self.pattern))
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(!self.match_case)
            .build()
            .map_err(|e| PhraseError::invalid_pattern(&self.pattern, &e))?;
        Ok(CompiledSubstitution {
            regex,
            replacement: self.replacement.clone().unwrap_or_default(),
            expand: self.is_regex,
        })
    }
}

/// A substitution ready to run
#[derive(Debug, Clone)]
pub struct CompiledSubstitution {
    regex: Regex,
    replacement: String,
    expand: bool,
}

impl CompiledSubstitution {
    pub fn apply(&self, text: &str) -> String {
        if self.expand {
            self.regex.replace_all(text, self.replacement.as_str()).into_owned()
        } else {
            self.regex
                .replace_all(text, NoExpand(&self.replacement))
                .into_owned()
        }
    }
}

/// Compile every substitution, failing on the first invalid one.
pub fn compile_all(substitutions: &[Substitution]) -> Result<Vec<CompiledSubstitution>, PhraseError> {
    substitutions.iter().map(Substitution::compile).collect()
}
