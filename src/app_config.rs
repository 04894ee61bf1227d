use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles the configuration of the parser and the inference
/// engine, including loading and validating configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Phrase parser settings
    #[serde(default)]
    pub parser: ParserConfig,

    /// Translation inference settings
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Settings that control how questions are split into parts
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ParserConfig {
    /// Shortest existing part (in words) that may be carved out of a longer part
    #[serde(default = "default_min_sub_part_words")]
    pub min_sub_part_words: usize,

    /// Characters that separate alternative glosses of one key term
    #[serde(default = "default_gloss_separators")]
    pub gloss_separators: String,

    /// Whether a gloss starting with "to " also matches without it
    #[serde(default = "default_optional_leading_to")]
    pub optional_leading_to: bool,

    /// Maximum number of parenthesized optional groups expanded per gloss
    #[serde(default = "default_max_optional_groups")]
    pub max_optional_groups: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            min_sub_part_words: default_min_sub_part_words(),
            gloss_separators: default_gloss_separators(),
            optional_leading_to: default_optional_leading_to(),
            max_optional_groups: default_max_optional_groups(),
        }
    }
}

/// Settings for the translation inference engine
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InferenceConfig {
    /// Fall back to a shared partial-word substring when no whole-word span is shared
    #[serde(default = "default_partial_word_fallback")]
    pub partial_word_fallback: bool,

    /// Minimum length (in characters) of a partial-word fallback candidate
    #[serde(default = "default_min_partial_match_chars")]
    pub min_partial_match_chars: usize,

    /// Punctuation used for each phrase type until some has been learned
    #[serde(default)]
    pub punctuation: PhraseTypePunctuation,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            partial_word_fallback: default_partial_word_fallback(),
            min_partial_match_chars: default_min_partial_match_chars(),
            punctuation: PhraseTypePunctuation::default(),
        }
    }
}

/// Leading and trailing punctuation of one phrase type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct OuterPunctuation {
    #[serde(default)]
    pub initial: String,
    #[serde(default, rename = "final")]
    pub final_punctuation: String,
}

impl OuterPunctuation {
    pub fn new(initial: &str, final_punctuation: &str) -> Self {
        Self {
            initial: initial.to_string(),
            final_punctuation: final_punctuation.to_string(),
        }
    }
}

/// Default outer punctuation per phrase type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct PhraseTypePunctuation {
    #[serde(default)]
    pub question: OuterPunctuation,
    #[serde(default)]
    pub statement: OuterPunctuation,
    #[serde(default)]
    pub unknown: OuterPunctuation,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter to hand to the `log` facade
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

fn default_min_sub_part_words() -> usize {
    2
}

fn default_gloss_separators() -> String {
    ";,".to_string()
}

fn default_optional_leading_to() -> bool {
    true
}

fn default_max_optional_groups() -> usize {
    4
}

fn default_partial_word_fallback() -> bool {
    true
}

fn default_min_partial_match_chars() -> usize {
    3
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.parser.min_sub_part_words == 0 {
            return Err(anyhow!("parser.min_sub_part_words must be at least 1"));
        }

        if self.parser.max_optional_groups > 8 {
            return Err(anyhow!(
                "parser.max_optional_groups must not exceed 8 (got {})",
                self.parser.max_optional_groups
            ));
        }

        if self
            .parser
            .gloss_separators
            .chars()
            .any(|c| c.is_alphanumeric() || c.is_whitespace() || c == '(' || c == ')')
        {
            return Err(anyhow!(
                "parser.gloss_separators may only contain punctuation other than parentheses"
            ));
        }

        if self.inference.min_partial_match_chars == 0 {
            return Err(anyhow!("inference.min_partial_match_chars must be at least 1"));
        }

        Ok(())
    }
}
