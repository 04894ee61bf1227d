/*!
 * # phrasekit - phrase decomposition and translation inference
 *
 * A Rust library for translating a corpus of template questions one phrase
 * at a time, with every translation the user enters reused across the rest
 * of the corpus.
 *
 * ## Features
 *
 * - Split questions into shared literal parts and key-term placeholders
 * - Recognize key terms by stem, with optional words, alternates and scope
 * - Infer part translations from the phrases the user has translated
 * - Pick key-term renderings with context-driven selection rules
 * - Sort and filter the corpus without touching the phrases themselves
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `stemmer`: Porter stemmer used for key-term matching
 * - `phrase`: The phrase model and parser:
 *   - `phrase::part`: The interned part registry
 *   - `phrase::parser`: Splitting questions into parts
 *   - `phrase::provider`: Question sources and corpus parsing
 * - `translation`: Translation management:
 *   - `translation::helper`: The collection manager
 *   - `translation::inference`: Cross-phrase inference
 *   - `translation::rendering`: Key-term rendering selection
 *   - `translation::shared`: Serialized access from several threads
 * - `corpus_file`: JSON corpus documents
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod corpus_file;
pub mod errors;
pub mod phrase;
pub mod stemmer;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use corpus_file::{CorpusFile, InitialTranslation};
pub use errors::{AppError, CorpusError, PhraseError};
pub use phrase::{
    KeyTerm, KeyTermRule, PhraseId, PhrasePart, Question, QuestionProvider, QuestionSource, SimpleKeyTerm,
    Substitution, TranslatablePhrase, TypeOfPhrase,
};
pub use stemmer::{PorterStemmer, Stemmer};
pub use translation::{
    KeyTermFilterType, PhraseTranslationHelper, RenderingSelectionRule, SharedPhraseHelper, SortBy,
};
