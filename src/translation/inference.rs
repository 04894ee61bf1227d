/*!
 * Cross-phrase translation inference.
 *
 * Every recomputation starts from scratch: the user translations are the
 * training set, part translations are re-derived from them and every phrase
 * without a user translation is reassembled. The steps are:
 *
 * 1. locate the key-term renderings in each training translation;
 * 2. for parts shared by two or more training phrases, pick the whole-word
 *    span with the widest support (then the longest, then the earliest seen),
 *    falling back to the longest shared character run;
 * 3. a training phrase left with exactly one unexplained part and one
 *    unexplained stretch of text pairs the two;
 * 4. learn the outer punctuation used for each type of phrase;
 * 5. fill each remaining phrase from a matching translated template, or
 *    concatenate its parts' translations and key-term renderings.
 */

use std::collections::{BTreeSet, HashMap, HashSet};

use log::{debug, trace};

use crate::app_config::{InferenceConfig, OuterPunctuation, PhraseTypePunctuation};
use crate::phrase::key_term::KeyTerm;
use crate::phrase::part::{KeyTermMatchId, PartId, PartTable, PhrasePart};
use crate::phrase::text::{
    has_content, leading_punctuation, on_word_boundaries, to_nfc, tokens_in, trailing_punctuation,
    trim_outer_punctuation,
};
use crate::phrase::translatable::{TranslatablePhrase, TypeOfPhrase};
use crate::translation::rendering::{find_rendering_in_use, RenderingResolver, SubstringDescriptor};

/// What a recomputation did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferenceSummary {
    /// Distinct user-translated phrases used for training
    pub training_phrases: usize,
    /// Parts that ended up with at least one translation candidate
    pub parts_translated: usize,
    /// Phrases whose translation was inferred
    pub phrases_inferred: usize,
}

/// A user translation being taken apart
struct Training {
    phrase: usize,
    text: String,
    claimed: Vec<(usize, usize)>,
    assigned: HashSet<PartId>,
}

impl Training {
    fn new(phrase: usize, text: String) -> Self {
        Self {
            phrase,
            text,
            claimed: Vec::new(),
            assigned: HashSet::new(),
        }
    }

    fn claim(&mut self, start: usize, end: usize) {
        let at = self.claimed.partition_point(|(s, _)| *s < start);
        self.claimed.insert(at, (start, end));
    }

    /// Unclaimed stretches of the text, in order
    fn segments(&self) -> Vec<(usize, usize)> {
        let mut segments = Vec::new();
        let mut cursor = 0;
        for (s, e) in &self.claimed {
            if *s > cursor {
                segments.push((cursor, *s));
            }
            cursor = cursor.max(*e);
        }
        if cursor < self.text.len() {
            segments.push((cursor, self.text.len()));
        }
        segments
    }

    /// First unclaimed occurrence of `needle`, optionally on word boundaries.
    fn locate(&self, needle: &str, whole_word: bool) -> Option<(usize, usize)> {
        for (s, e) in self.segments() {
            let found = self.text[s..e]
                .match_indices(needle)
                .map(|(i, _)| (s + i, s + i + needle.len()))
                .find(|(start, end)| !whole_word || on_word_boundaries(&self.text, *start, *end));
            if found.is_some() {
                return found;
            }
        }
        None
    }
}

struct CandidateStats {
    phrases: BTreeSet<usize>,
    first_seen: usize,
}

/// Runs inference over a corpus
pub struct InferenceEngine<'a> {
    config: &'a InferenceConfig,
    key_terms: &'a [Box<dyn KeyTerm>],
    resolver: &'a RenderingResolver,
}

impl<'a> InferenceEngine<'a> {
    pub fn new(
        config: &'a InferenceConfig,
        key_terms: &'a [Box<dyn KeyTerm>],
        resolver: &'a RenderingResolver,
    ) -> Self {
        Self {
            config,
            key_terms,
            resolver,
        }
    }

    fn term_renderings(&self, table: &PartTable, id: KeyTermMatchId) -> Vec<String> {
        let mut renderings: Vec<String> = Vec::new();
        for term in table.key_term_match(id).all_terms() {
            if let Some(key_term) = self.key_terms.get(*term) {
                for rendering in key_term.renderings() {
                    let rendering = to_nfc(&rendering);
                    if !rendering.is_empty() && !renderings.contains(&rendering) {
                        renderings.push(rendering);
                    }
                }
            }
        }
        renderings
    }

    /// Every rendering of every term the match could be, override first.
    pub fn renderings_for(&self, table: &PartTable, id: KeyTermMatchId) -> Vec<String> {
        let mut renderings = self.term_renderings(table, id);
        if let Some(best) = table.key_term_match(id).best_rendering_override() {
            let best = to_nfc(best);
            renderings.retain(|r| *r != best);
            renderings.insert(0, best);
        }
        renderings
    }

    /// The rendering to show for a match inside the given English question.
    pub fn resolved_rendering(&self, table: &PartTable, id: KeyTermMatchId, english: &str) -> String {
        let key_term_match = table.key_term_match(id);
        let gloss = self
            .key_terms
            .get(key_term_match.primary_term())
            .map(|t| t.gloss().to_string())
            .unwrap_or_default();
        let renderings = self.term_renderings(table, id);
        let best = key_term_match.best_rendering_override().map(to_nfc);
        self.resolver
            .resolve(&gloss, &renderings, best.as_deref(), english)
            .rendering
    }

    /// Rendering of `id` in `text` at or after `start`, not overlapping `taken`.
    fn find_free_rendering(
        &self,
        text: &str,
        renderings: &[String],
        mut start: usize,
        taken: &[(usize, usize)],
    ) -> Option<SubstringDescriptor> {
        while let Some(found) = find_rendering_in_use(text, renderings, start) {
            let end = found.end_offset();
            if taken.iter().all(|(s, e)| end <= *s || found.offset >= *e) {
                return Some(found);
            }
            start = end;
        }
        None
    }

    /// Recompute every part translation and every inferred phrase translation.
    /// Returns the summary and the outer punctuation learned per phrase type.
    pub fn recompute(
        &self,
        phrases: &mut [TranslatablePhrase],
        table: &mut PartTable,
    ) -> (InferenceSummary, PhraseTypePunctuation) {
        for index in 0..table.part_count() {
            table.part_mut(PartId(index)).set_candidates(Vec::new());
        }

        let mut trainings = self.training_set(phrases);
        for training in trainings.iter_mut() {
            self.claim_key_terms(training, &phrases[training.phrase], table);
        }

        self.assign_shared_parts(phrases, table, &mut trainings);
        self.pair_remaining_parts(phrases, table, &trainings);

        let punctuation = self.learn_punctuation(phrases, &trainings);

        let view: &[TranslatablePhrase] = phrases;
        let parts: &PartTable = table;
        let templates = template_index(view);
        let inferred: Vec<Option<String>> = (0..view.len())
            .map(|index| {
                let phrase = &view[index];
                if phrase.has_user_translation() || phrase.is_excluded() {
                    return None;
                }
                Some(
                    self.from_template(view, index, parts, &templates)
                        .unwrap_or_else(|| self.from_parts(phrase, parts, &punctuation)),
                )
            })
            .collect();

        let mut phrases_inferred = 0;
        for (phrase, translation) in phrases.iter_mut().zip(inferred) {
            if let Some(translation) = translation {
                phrase.set_inferred_translation(translation);
                phrases_inferred += 1;
            }
        }

        let summary = InferenceSummary {
            training_phrases: trainings.len(),
            parts_translated: table
                .live_parts()
                .filter(|(_, p)| !p.candidates().is_empty())
                .count(),
            phrases_inferred,
        };
        debug!(
            "Inference used {} training phrases, translated {} parts, inferred {} phrases",
            summary.training_phrases, summary.parts_translated, summary.phrases_inferred
        );
        (summary, punctuation)
    }

    /// User-translated phrases in corpus order, one per distinct part structure.
    fn training_set(&self, phrases: &[TranslatablePhrase]) -> Vec<Training> {
        let mut trainings: Vec<Training> = Vec::new();
        for (index, phrase) in phrases.iter().enumerate() {
            if !phrase.has_user_translation() || phrase.is_excluded() || phrase.parts().is_empty() {
                continue;
            }
            let duplicate = trainings
                .iter()
                .any(|t| phrases[t.phrase].parts() == phrase.parts());
            if duplicate {
                continue;
            }
            trainings.push(Training::new(index, to_nfc(phrase.user_trans_sans_outer_punctuation())));
        }
        trainings
    }

    fn claim_key_terms(&self, training: &mut Training, phrase: &TranslatablePhrase, table: &PartTable) {
        let mut offsets: HashMap<KeyTermMatchId, usize> = HashMap::new();
        for id in phrase.key_term_matches() {
            let renderings = self.renderings_for(table, id);
            let start = offsets.get(&id).copied().unwrap_or(0);
            if let Some(found) = self.find_free_rendering(&training.text, &renderings, start, &training.claimed) {
                trace!(
                    "Rendering '{}' found in '{}'",
                    &training.text[found.offset..found.end_offset()],
                    training.text
                );
                training.claim(found.offset, found.end_offset());
                offsets.insert(id, found.end_offset());
            }
        }
    }

    fn assign_shared_parts(&self, phrases: &[TranslatablePhrase], table: &mut PartTable, trainings: &mut [Training]) {
        let mut support: HashMap<PartId, Vec<usize>> = HashMap::new();
        for (t, training) in trainings.iter().enumerate() {
            let mut seen = HashSet::new();
            for part in phrases[training.phrase].translatable_parts() {
                if seen.insert(part) {
                    support.entry(part).or_default().push(t);
                }
            }
        }

        let mut shared: Vec<(PartId, usize, usize)> = support
            .iter()
            .filter(|(_, owners)| owners.len() >= 2)
            .map(|(id, owners)| (*id, owners.len(), table.part(*id).word_count()))
            .collect();
        shared.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)).then(a.0.cmp(&b.0)));

        for (id, _, _) in shared {
            let owners = &support[&id];
            let mut whole_word = true;
            let mut ranked = self.whole_word_candidates(trainings, owners);
            if ranked.is_empty() && self.config.partial_word_fallback {
                ranked = self.longest_shared_run(trainings, owners).into_iter().collect();
                whole_word = false;
            }
            let Some(best) = ranked.first().cloned() else {
                trace!("No shared translation for '{}'", table.part(id).text());
                continue;
            };
            trace!("Part '{}' -> '{}'", table.part(id).text(), best);
            for t in owners {
                let training = &mut trainings[*t];
                if let Some((start, end)) = training.locate(&best, whole_word) {
                    training.claim(start, end);
                    training.assigned.insert(id);
                }
            }
            table.part_mut(id).set_candidates(ranked);
        }
    }

    /// Whole-word spans shared by at least two of the owners, best first.
    fn whole_word_candidates(&self, trainings: &[Training], owners: &[usize]) -> Vec<String> {
        let mut stats: HashMap<String, CandidateStats> = HashMap::new();
        let mut order = 0usize;
        for t in owners {
            let training = &trainings[*t];
            for (s, e) in training.segments() {
                let tokens = tokens_in(&training.text, s, e);
                for i in 0..tokens.len() {
                    for j in i..tokens.len() {
                        let span = &training.text[tokens[i].start..tokens[j].end];
                        let trimmed = trim_outer_punctuation(span);
                        let candidate = if trimmed.is_empty() { span } else { trimmed };
                        if candidate.is_empty() {
                            continue;
                        }
                        let entry = stats.entry(candidate.to_string()).or_insert_with(|| {
                            order += 1;
                            CandidateStats {
                                phrases: BTreeSet::new(),
                                first_seen: order,
                            }
                        });
                        entry.phrases.insert(*t);
                    }
                }
            }
        }

        let mut viable: Vec<(String, usize, usize, usize)> = stats
            .into_iter()
            .filter(|(_, s)| s.phrases.len() >= 2)
            .map(|(text, s)| {
                let chars = text.chars().count();
                (text, s.phrases.len(), chars, s.first_seen)
            })
            .collect();
        if viable.iter().any(|(text, ..)| has_content(text)) {
            viable.retain(|(text, ..)| has_content(text));
        }
        viable.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)).then(a.3.cmp(&b.3)));
        viable.into_iter().map(|(text, ..)| text).collect()
    }

    /// Longest run of characters (trimmed of outer punctuation) present in
    /// the unclaimed text of every owner.
    fn longest_shared_run(&self, trainings: &[Training], owners: &[usize]) -> Option<String> {
        let (first, rest) = owners.split_first()?;
        let reference = &trainings[*first];
        let min_chars = self.config.min_partial_match_chars;
        let mut best: Option<(String, usize)> = None;

        for (s, e) in reference.segments() {
            let bounds: Vec<usize> = reference.text[s..e]
                .char_indices()
                .map(|(i, _)| s + i)
                .chain(std::iter::once(e))
                .collect();
            let char_count = bounds.len() - 1;
            for a in 0..char_count {
                for b in (a + 1..=char_count).rev() {
                    let raw_chars = b - a;
                    let best_len = best.as_ref().map(|(_, n)| *n).unwrap_or(0);
                    if raw_chars < min_chars || raw_chars <= best_len {
                        break;
                    }
                    let trimmed = trim_outer_punctuation(&reference.text[bounds[a]..bounds[b]]);
                    let trimmed_chars = trimmed.chars().count();
                    if trimmed_chars < min_chars || trimmed_chars <= best_len || !has_content(trimmed) {
                        continue;
                    }
                    let shared = rest
                        .iter()
                        .all(|t| trainings[*t].locate(trimmed, false).is_some());
                    if shared {
                        best = Some((trimmed.to_string(), trimmed_chars));
                        break;
                    }
                }
            }
        }
        best.map(|(text, _)| text)
    }

    fn pair_remaining_parts(&self, phrases: &[TranslatablePhrase], table: &mut PartTable, trainings: &[Training]) {
        for training in trainings {
            let mut unassigned: Vec<PartId> = Vec::new();
            for part in phrases[training.phrase].translatable_parts() {
                if !training.assigned.contains(&part) && !unassigned.contains(&part) {
                    unassigned.push(part);
                }
            }
            let stretches: Vec<&str> = training
                .segments()
                .into_iter()
                .map(|(s, e)| trim_outer_punctuation(&training.text[s..e]))
                .filter(|text| has_content(text))
                .collect();
            if unassigned.len() != 1 || stretches.len() != 1 {
                continue;
            }
            let part = table.part_mut(unassigned[0]);
            let mut candidates = part.candidates().to_vec();
            let text = stretches[0].to_string();
            if !candidates.contains(&text) {
                trace!("Part '{}' paired with '{}'", part.text(), text);
                candidates.push(text);
                part.set_candidates(candidates);
            }
        }
    }

    fn learn_punctuation(&self, phrases: &[TranslatablePhrase], trainings: &[Training]) -> PhraseTypePunctuation {
        let defaults = &self.config.punctuation;
        PhraseTypePunctuation {
            question: self.learn_for(phrases, trainings, TypeOfPhrase::Question, &defaults.question),
            statement: self.learn_for(
                phrases,
                trainings,
                TypeOfPhrase::StatementOrImperative,
                &defaults.statement,
            ),
            unknown: self.learn_for(phrases, trainings, TypeOfPhrase::Unknown, &defaults.unknown),
        }
    }

    fn learn_for(
        &self,
        phrases: &[TranslatablePhrase],
        trainings: &[Training],
        type_of_phrase: TypeOfPhrase,
        default: &OuterPunctuation,
    ) -> OuterPunctuation {
        let mut initial: Vec<(String, usize)> = Vec::new();
        let mut final_punctuation: Vec<(String, usize)> = Vec::new();
        for training in trainings {
            let phrase = &phrases[training.phrase];
            if phrase.type_of_phrase() != type_of_phrase {
                continue;
            }
            let full = to_nfc(phrase.translation());
            if !has_content(&full) {
                continue;
            }
            // Only a single opening mark counts as opening punctuation.
            let leading = leading_punctuation(&full);
            let leading = if leading.chars().count() == 1 { leading } else { String::new() };
            tally(&mut initial, leading);
            tally(&mut final_punctuation, trailing_punctuation(&full));
        }
        if initial.is_empty() {
            return default.clone();
        }
        OuterPunctuation {
            initial: most_frequent(&initial),
            final_punctuation: most_frequent(&final_punctuation),
        }
    }

    /// Fill the phrase from a user-translated phrase with the same part pattern.
    fn from_template(
        &self,
        phrases: &[TranslatablePhrase],
        index: usize,
        table: &PartTable,
        templates: &TemplateIndex,
    ) -> Option<String> {
        let phrase = &phrases[index];
        let sources = templates.get(&phrase.part_pattern())?;
        let source_index = phrase
            .template_source
            .map(|id| id.index())
            .filter(|s| *s != index && sources.binary_search(s).is_ok())
            .or_else(|| sources.iter().copied().find(|s| *s != index))?;
        let source = &phrases[source_index];
        let text = to_nfc(source.translation());

        let mut spans: Vec<(usize, usize, usize)> = Vec::new();
        let mut taken: Vec<(usize, usize)> = Vec::new();
        let mut offsets: HashMap<KeyTermMatchId, usize> = HashMap::new();
        for (position, id) in source.key_term_matches().enumerate() {
            let renderings = self.renderings_for(table, id);
            let start = offsets.get(&id).copied().unwrap_or(0);
            let found = self.find_free_rendering(&text, &renderings, start, &taken)?;
            offsets.insert(id, found.end_offset());
            taken.push((found.offset, found.end_offset()));
            spans.push((found.offset, found.end_offset(), position));
        }

        let replacements: Vec<String> = phrase
            .key_term_matches()
            .map(|id| self.resolved_rendering(table, id, phrase.original_phrase()))
            .collect();
        if replacements.iter().any(String::is_empty) {
            return None;
        }

        spans.sort_unstable();
        let mut result = String::with_capacity(text.len());
        let mut cursor = 0;
        for (start, end, position) in spans {
            result.push_str(&text[cursor..start]);
            result.push_str(&replacements[position]);
            cursor = end;
        }
        result.push_str(&text[cursor..]);
        trace!("Phrase {} filled from template of phrase {}", index, source_index);
        Some(result)
    }

    /// Concatenate the parts' translations and the key-term renderings.
    fn from_parts(&self, phrase: &TranslatablePhrase, table: &PartTable, punctuation: &PhraseTypePunctuation) -> String {
        let mut used: Vec<&str> = Vec::new();
        let mut pieces: Vec<String> = Vec::new();
        for part in phrase.parts() {
            match part {
                PhrasePart::Literal(id) => {
                    let candidate = table
                        .part(*id)
                        .candidates()
                        .iter()
                        .find(|c| !used.contains(&c.as_str()));
                    if let Some(candidate) = candidate {
                        used.push(candidate.as_str());
                        pieces.push(candidate.clone());
                    }
                }
                PhrasePart::KeyTerm(id) => {
                    let rendering = self.resolved_rendering(table, *id, phrase.original_phrase());
                    if !rendering.is_empty() {
                        pieces.push(rendering);
                    }
                }
            }
        }
        let outer = punctuation_for(punctuation, phrase.type_of_phrase());
        format!("{}{}{}", outer.initial, pieces.join(" "), outer.final_punctuation)
    }
}

/// The punctuation configured or learned for a phrase type.
pub fn punctuation_for(punctuation: &PhraseTypePunctuation, type_of_phrase: TypeOfPhrase) -> &OuterPunctuation {
    match type_of_phrase {
        TypeOfPhrase::Question => &punctuation.question,
        TypeOfPhrase::StatementOrImperative => &punctuation.statement,
        TypeOfPhrase::Unknown => &punctuation.unknown,
    }
}

fn tally(counts: &mut Vec<(String, usize)>, value: String) {
    match counts.iter_mut().find(|(v, _)| *v == value) {
        Some((_, n)) => *n += 1,
        None => counts.push((value, 1)),
    }
}

/// User-translated phrases that can serve as templates, in corpus order,
/// keyed by part pattern.
type TemplateIndex = HashMap<Vec<Option<PartId>>, Vec<usize>>;

fn template_index(phrases: &[TranslatablePhrase]) -> TemplateIndex {
    let mut index = TemplateIndex::new();
    for (position, phrase) in phrases.iter().enumerate() {
        if phrase.has_user_translation() && !phrase.is_excluded() && !phrase.parts().is_empty() {
            index.entry(phrase.part_pattern()).or_default().push(position);
        }
    }
    index
}

/// Most frequent value; on a tie a non-empty value beats an empty one, then
/// the first seen wins.
fn most_frequent(counts: &[(String, usize)]) -> String {
    let mut best: Option<&(String, usize)> = None;
    for entry in counts {
        best = match best {
            Some(current)
                if current.1 > entry.1
                    || (current.1 == entry.1 && (!current.0.is_empty() || entry.0.is_empty())) =>
            {
                Some(current)
            }
            _ => Some(entry),
        };
    }
    best.map(|(value, _)| value.clone()).unwrap_or_default()
}
