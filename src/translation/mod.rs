/*!
 * Translation management for a parsed corpus.
 *
 * - `helper`: the collection manager (view, sorting, filtering, edits)
 * - `inference`: cross-phrase translation inference
 * - `rendering`: key-term rendering selection and lookup
 * - `shared`: serialized multi-threaded access to a helper
 */

// Re-export main types for easier usage
pub use self::helper::{KeyTermFilterType, PhraseTranslationHelper, ReferenceFilter, SortBy};
pub use self::inference::{InferenceEngine, InferenceSummary};
pub use self::rendering::{RenderingResolution, RenderingResolver, RenderingSelectionRule, SubstringDescriptor};
pub use self::shared::SharedPhraseHelper;

// Submodules
pub mod helper;
pub mod inference;
pub mod rendering;
pub mod shared;
