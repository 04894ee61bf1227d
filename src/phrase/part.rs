/*!
 * Corpus-wide part registry.
 *
 * Parts and key-term matches are interned: one record per distinct
 * normalized word sequence (or per distinct set of matching key terms),
 * referenced from phrases by id. Each record keeps the set of phrases that
 * currently reference it, which is what cross-phrase inference works on.
 */

use std::collections::{BTreeSet, HashMap};

use crate::errors::PhraseError;

/// Index of a phrase in the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhraseId(pub(crate) usize);

impl PhraseId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a literal part in the part table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(pub(crate) usize);

impl PartId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a key-term match in the part table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyTermMatchId(pub(crate) usize);

impl KeyTermMatchId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One element of a parsed phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhrasePart {
    /// A translatable run of words
    Literal(PartId),
    /// A placeholder for a key term
    KeyTerm(KeyTermMatchId),
}

impl PhrasePart {
    pub fn is_key_term(&self) -> bool {
        matches!(self, PhrasePart::KeyTerm(_))
    }
}

/// A literal word sequence shared by every phrase containing it.
#[derive(Debug, Clone)]
pub struct Part {
    words: Vec<String>,
    owners: BTreeSet<PhraseId>,
    retired: bool,
    /// Ranked translation candidates, best first
    candidates: Vec<String>,
}

impl Part {
    fn new(words: Vec<String>) -> Self {
        Self {
            words,
            owners: BTreeSet::new(),
            retired: false,
            candidates: Vec::new(),
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// The words joined by single spaces.
    pub fn text(&self) -> String {
        self.words.join(" ")
    }

    pub fn owners(&self) -> impl Iterator<Item = PhraseId> + '_ {
        self.owners.iter().copied()
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Best-known translation, empty when nothing is known.
    pub fn translation(&self) -> &str {
        self.candidates.first().map(String::as_str).unwrap_or("")
    }

    /// All known translation candidates, best first.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub(crate) fn set_candidates(&mut self, candidates: Vec<String>) {
        self.candidates = candidates;
    }

    /// Whether the part was split away and is no longer referenced.
    pub fn is_retired(&self) -> bool {
        self.retired
    }
}

/// A key-term placeholder. Ambiguous matches keep every candidate term.
#[derive(Debug, Clone)]
pub struct KeyTermMatch {
    terms: Vec<usize>,
    owners: BTreeSet<PhraseId>,
    best_rendering: Option<String>,
}

impl KeyTermMatch {
    /// Indices (into the corpus key-term list) of every term this match could be.
    pub fn all_terms(&self) -> &[usize] {
        &self.terms
    }

    /// The term whose renderings are preferred.
    pub fn primary_term(&self) -> usize {
        self.terms[0]
    }

    pub fn is_ambiguous(&self) -> bool {
        self.terms.len() > 1
    }

    pub fn owners(&self) -> impl Iterator<Item = PhraseId> + '_ {
        self.owners.iter().copied()
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Rendering chosen by the user over the term's default, if any.
    pub fn best_rendering_override(&self) -> Option<&str> {
        self.best_rendering.as_deref()
    }

    pub(crate) fn set_best_rendering(&mut self, rendering: Option<String>) {
        self.best_rendering = rendering;
    }
}

/// Interned parts and key-term matches with their owning phrases.
#[derive(Debug, Default, Clone)]
pub struct PartTable {
    parts: Vec<Part>,
    part_index: HashMap<Vec<String>, PartId>,
    matches: Vec<KeyTermMatch>,
    match_index: HashMap<Vec<usize>, KeyTermMatchId>,
}

impl PartTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the part for this word sequence, creating it if needed.
    pub fn intern_part(&mut self, words: &[String]) -> PartId {
        if let Some(id) = self.part_index.get(words) {
            return *id;
        }
        let id = PartId(self.parts.len());
        self.parts.push(Part::new(words.to_vec()));
        self.part_index.insert(words.to_vec(), id);
        id
    }

    /// The live part for this word sequence, if one exists.
    pub fn find_part(&self, words: &[String]) -> Option<PartId> {
        self.part_index.get(words).copied()
    }

    /// Return the match for this set of terms, creating it if needed. The
    /// first term stays first; the rest are kept in ascending order.
    pub fn intern_match(&mut self, terms: &[usize]) -> KeyTermMatchId {
        let key = terms.to_vec();
        if let Some(id) = self.match_index.get(&key) {
            return *id;
        }
        let id = KeyTermMatchId(self.matches.len());
        self.matches.push(KeyTermMatch {
            terms: key.clone(),
            owners: BTreeSet::new(),
            best_rendering: None,
        });
        self.match_index.insert(key, id);
        id
    }

    pub fn part(&self, id: PartId) -> &Part {
        &self.parts[id.0]
    }

    pub(crate) fn part_mut(&mut self, id: PartId) -> &mut Part {
        &mut self.parts[id.0]
    }

    pub fn key_term_match(&self, id: KeyTermMatchId) -> &KeyTermMatch {
        &self.matches[id.0]
    }

    pub(crate) fn key_term_match_mut(&mut self, id: KeyTermMatchId) -> &mut KeyTermMatch {
        &mut self.matches[id.0]
    }

    /// Checked lookup of a part by raw index.
    pub fn get_part(&self, index: usize) -> Option<&Part> {
        self.parts.get(index)
    }

    /// Checked lookup of a key-term match by raw index.
    pub fn get_key_term_match(&self, index: usize) -> Option<&KeyTermMatch> {
        self.matches.get(index)
    }

    /// Parts still referenced by at least one phrase.
    pub fn live_parts(&self) -> impl Iterator<Item = (PartId, &Part)> {
        self.parts
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.retired && !p.owners.is_empty())
            .map(|(i, p)| (PartId(i), p))
    }

    /// Every key-term match with its id.
    pub fn key_term_matches(&self) -> impl Iterator<Item = (KeyTermMatchId, &KeyTermMatch)> {
        self.matches
            .iter()
            .enumerate()
            .map(|(i, m)| (KeyTermMatchId(i), m))
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn add_owner(&mut self, part: PhrasePart, owner: PhraseId) {
        match part {
            PhrasePart::Literal(id) => {
                self.parts[id.0].owners.insert(owner);
            }
            PhrasePart::KeyTerm(id) => {
                self.matches[id.0].owners.insert(owner);
            }
        }
    }

    pub fn owner_count(&self, part: PhrasePart) -> usize {
        match part {
            PhrasePart::Literal(id) => self.parts[id.0].owner_count(),
            PhrasePart::KeyTerm(id) => self.matches[id.0].owner_count(),
        }
    }

    /// Drop a part that has been split into smaller parts.
    pub(crate) fn retire_part(&mut self, id: PartId) {
        let part = &mut self.parts[id.0];
        part.retired = true;
        part.owners.clear();
        part.candidates.clear();
        self.part_index.remove(&part.words);
    }

    /// Check that owner sets agree with the phrases referencing each record.
    pub fn verify_owners(&self, phrase_parts: &[&[PhrasePart]]) -> Result<(), PhraseError> {
        let mut part_refs: Vec<BTreeSet<PhraseId>> = vec![BTreeSet::new(); self.parts.len()];
        let mut match_refs: Vec<BTreeSet<PhraseId>> = vec![BTreeSet::new(); self.matches.len()];

        for (index, parts) in phrase_parts.iter().enumerate() {
            for part in parts.iter() {
                match part {
                    PhrasePart::Literal(id) => {
                        let refs = part_refs.get_mut(id.0).ok_or_else(|| {
                            PhraseError::InvariantViolation(format!(
                                "phrase {} references missing part {}",
                                index, id.0
                            ))
                        })?;
                        if self.parts[id.0].retired {
                            return Err(PhraseError::InvariantViolation(format!(
                                "phrase {} references retired part '{}'",
                                index,
                                self.parts[id.0].text()
                            )));
                        }
                        refs.insert(PhraseId(index));
                    }
                    PhrasePart::KeyTerm(id) => {
                        let refs = match_refs.get_mut(id.0).ok_or_else(|| {
                            PhraseError::InvariantViolation(format!(
                                "phrase {} references missing key-term match {}",
                                index, id.0
                            ))
                        })?;
                        refs.insert(PhraseId(index));
                    }
                }
            }
        }

        for (i, part) in self.parts.iter().enumerate() {
            if part.owners != part_refs[i] {
                return Err(PhraseError::InvariantViolation(format!(
                    "part '{}' lists {} owners but is referenced by {}",
                    part.text(),
                    part.owners.len(),
                    part_refs[i].len()
                )));
            }
        }
        for (i, m) in self.matches.iter().enumerate() {
            if m.owners != match_refs[i] {
                return Err(PhraseError::InvariantViolation(format!(
                    "key-term match {} lists {} owners but is referenced by {}",
                    i,
                    m.owners.len(),
                    match_refs[i].len()
                )));
            }
        }
        Ok(())
    }
}
