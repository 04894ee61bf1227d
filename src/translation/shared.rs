/*!
 * Serialized access to one phrase helper from several threads.
 *
 * Every call takes the helper's lock for its whole duration, so edits, sorts
 * and filters issued from different threads run one at a time against a
 * single owner.
 */

use std::sync::Arc;

use log::trace;
use parking_lot::Mutex;

use crate::errors::PhraseError;
use crate::phrase::part::PhraseId;
use crate::translation::helper::{KeyTermFilterType, PhraseTranslationHelper, SortBy};

/// Cloneable handle to a phrase helper behind a mutex
#[derive(Clone)]
pub struct SharedPhraseHelper {
    inner: Arc<Mutex<PhraseTranslationHelper>>,
}

impl SharedPhraseHelper {
    pub fn new(helper: PhraseTranslationHelper) -> Self {
        Self {
            inner: Arc::new(Mutex::new(helper)),
        }
    }

    /// Run `f` with shared access to the helper.
    pub fn read<R>(&self, f: impl FnOnce(&PhraseTranslationHelper) -> R) -> R {
        let guard = self.inner.lock();
        f(&guard)
    }

    /// Run `f` with exclusive access to the helper.
    pub fn write<R>(&self, f: impl FnOnce(&mut PhraseTranslationHelper) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn set_translation(&self, id: PhraseId, translation: Option<&str>) -> Result<(), PhraseError> {
        trace!("Serialized edit of phrase {}", id.index());
        self.write(|helper| helper.set_translation(id, translation))
    }

    pub fn set_has_user_translation(&self, id: PhraseId, value: bool) -> Result<(), PhraseError> {
        self.write(|helper| helper.set_has_user_translation(id, value))
    }

    pub fn sort(&self, by: SortBy, ascending: bool) {
        self.write(|helper| helper.sort(by, ascending));
    }

    /// Text and key-term filtering; reference predicates need `write` directly.
    pub fn filter(&self, text: Option<&str>, whole_word: bool, key_term_filter: KeyTermFilterType, include_excluded: bool) {
        self.write(|helper| helper.filter(text, whole_word, key_term_filter, None, include_excluded));
    }

    /// Current translation of a phrase
    pub fn translation(&self, id: PhraseId) -> Result<String, PhraseError> {
        self.read(|helper| helper.phrase(id).map(|p| p.translation().to_string()))
    }

    pub fn len(&self) -> usize {
        self.read(|helper| helper.len())
    }

    pub fn is_empty(&self) -> bool {
        self.read(|helper| helper.is_empty())
    }
}
