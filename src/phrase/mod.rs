/*!
 * Phrase model and parser.
 *
 * - `part`: the interned part registry
 * - `key_term`: key terms, gloss expansion and key-term rules
 * - `substitution`: question rewrites applied before parsing
 * - `question`: raw questions
 * - `translatable`: parsed phrases with their translation state
 * - `parser`: splitting questions into parts
 * - `provider`: question sources and corpus parsing
 * - `text`: shared text helpers
 */

pub mod key_term;
pub mod parser;
pub mod part;
pub mod provider;
pub mod question;
pub mod substitution;
pub mod text;
pub mod translatable;

pub use key_term::{KeyTerm, KeyTermRule, SimpleKeyTerm};
pub use parser::{ParseOutcome, PhraseParser};
pub use part::{KeyTermMatch, KeyTermMatchId, Part, PartId, PartTable, PhraseId, PhrasePart};
pub use provider::{ParsedCorpus, QuestionProvider, QuestionSource};
pub use question::Question;
pub use substitution::Substitution;
pub use translatable::{TranslatablePhrase, TypeOfPhrase};
