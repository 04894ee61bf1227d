/*!
 * Error types for the phrasekit library.
 *
 * This module contains the error enums for the phrase model, corpus loading
 * and the command-line host, using the thiserror crate for ergonomic error
 * definitions.
 */

use thiserror::Error;

/// Errors raised by the phrase model, the parser and the inference engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhraseError {
    /// Internal bookkeeping no longer agrees with itself (a parser or inference bug)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A phrase id or view index that does not exist in the corpus
    #[error("Unknown phrase: {0}")]
    UnknownPhrase(usize),

    /// A user-supplied regular expression that does not compile
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Message from the regex compiler
        message: String,
    },

    /// Configuration values that cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PhraseError {
    /// Build an `InvalidPattern` error from a regex compilation failure.
    pub fn invalid_pattern(pattern: &str, error: &regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            message: error.to_string(),
        }
    }
}

/// Errors that can occur while loading a corpus from a question source
#[derive(Error, Debug)]
pub enum CorpusError {
    /// The corpus could not be read
    #[error("Failed to load corpus: {0}")]
    Load(String),

    /// The corpus was read but its content is malformed
    #[error("Failed to parse corpus: {0}")]
    Parse(String),

    /// A phrase-level error raised while building the corpus
    #[error("Phrase error: {0}")]
    Phrase(#[from] PhraseError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the phrase model
    #[error("Phrase error: {0}")]
    Phrase(#[from] PhraseError),

    /// Error from corpus loading
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for CorpusError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

impl From<std::io::Error> for CorpusError {
    fn from(error: std::io::Error) -> Self {
        Self::Load(error.to_string())
    }
}
