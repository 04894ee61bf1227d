/*!
 * Splitting questions into parts.
 *
 * A question is rewritten by the substitutions, tokenized into normalized
 * words and scanned for key terms (longest stemmed match first, restricted
 * to terms in scope for the question's references). The word runs between
 * key terms become literal parts. Once every question is parsed,
 * `coalesce_sub_parts` breaks single-owner parts around existing parts so
 * that shared fragments are recognized across the corpus.
 */

use std::collections::{BTreeSet, HashMap};

use log::{debug, trace};

use crate::app_config::ParserConfig;
use crate::errors::PhraseError;
use crate::phrase::key_term::{in_scope, surface_forms, KeyTerm, KeyTermRule};
use crate::phrase::part::{PartId, PartTable, PhraseId, PhrasePart};
use crate::phrase::substitution::{compile_all, CompiledSubstitution, Substitution};
use crate::phrase::text::words_of;
use crate::stemmer::Stemmer;

/// Result of parsing one question
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Text after substitutions
    pub modified_text: String,
    /// Parts in order
    pub parts: Vec<PhrasePart>,
    /// Indices of the key-term rules that affected this question
    pub fired_rules: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
struct FormSource {
    term: usize,
    rule: Option<usize>,
}

/// Parser for one corpus: key-term forms are stemmed once up front.
pub struct PhraseParser<'a> {
    stemmer: &'a dyn Stemmer,
    substitutions: Vec<CompiledSubstitution>,
    forms: HashMap<Vec<String>, Vec<FormSource>>,
    excluded_forms: Vec<(usize, Vec<String>)>,
    references: Vec<Vec<i32>>,
    longest_form: usize,
}

impl<'a> PhraseParser<'a> {
    pub fn new(
        key_terms: &[Box<dyn KeyTerm>],
        rules: &[KeyTermRule],
        substitutions: &[Substitution],
        stemmer: &'a dyn Stemmer,
        config: &ParserConfig,
    ) -> Result<Self, PhraseError> {
        let mut parser = Self {
            stemmer,
            substitutions: compile_all(substitutions)?,
            forms: HashMap::new(),
            excluded_forms: Vec::new(),
            references: key_terms.iter().map(|t| t.references()).collect(),
            longest_form: 0,
        };

        let mut terms_by_id: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, term) in key_terms.iter().enumerate() {
            terms_by_id.entry(term.id()).or_default().push(index);
        }

        let mut excluded_terms: BTreeSet<usize> = BTreeSet::new();
        for (rule_index, rule) in rules.iter().enumerate() {
            let Some(terms) = terms_by_id.get(rule.term_id.as_str()) else {
                debug!("Key term rule for unknown term '{}'", rule.term_id);
                continue;
            };
            for term in terms {
                if rule.excluded {
                    excluded_terms.insert(*term);
                    for form in surface_forms(key_terms[*term].gloss(), config) {
                        let stems = parser.stem_all(&form);
                        parser.excluded_forms.push((rule_index, stems));
                    }
                }
            }
        }

        for (index, term) in key_terms.iter().enumerate() {
            if excluded_terms.contains(&index) {
                continue;
            }
            for form in surface_forms(term.gloss(), config) {
                parser.add_form(&form, FormSource { term: index, rule: None });
            }
        }

        for (rule_index, rule) in rules.iter().enumerate() {
            if rule.excluded {
                continue;
            }
            let Some(terms) = terms_by_id.get(rule.term_id.as_str()) else {
                continue;
            };
            for term in terms {
                for alternate in &rule.alternates {
                    let words = words_of(alternate);
                    if !words.is_empty() {
                        parser.add_form(&words, FormSource { term: *term, rule: Some(rule_index) });
                    }
                }
            }
        }

        debug!(
            "Prepared {} key-term forms for {} terms ({} excluded)",
            parser.forms.len(),
            key_terms.len(),
            excluded_terms.len()
        );
        Ok(parser)
    }

    fn stem_all(&self, words: &[String]) -> Vec<String> {
        words.iter().map(|w| self.stemmer.stem(w)).collect()
    }

    fn add_form(&mut self, words: &[String], source: FormSource) {
        let stems = self.stem_all(words);
        self.longest_form = self.longest_form.max(stems.len());
        let sources = self.forms.entry(stems).or_default();
        let duplicate = sources
            .iter()
            .any(|s| s.term == source.term && s.rule.is_none());
        if !duplicate {
            sources.push(source);
        }
    }

    /// Apply every substitution in order.
    pub fn apply_substitutions(&self, text: &str) -> String {
        self.substitutions
            .iter()
            .fold(text.to_string(), |acc, sub| sub.apply(&acc))
    }

    /// Split one question into parts, interning them in `table` with `owner`
    /// recorded as owning each one.
    pub fn parse(
        &self,
        text: &str,
        start_ref: i32,
        end_ref: i32,
        table: &mut PartTable,
        owner: PhraseId,
    ) -> ParseOutcome {
        let modified_text = self.apply_substitutions(text);
        let words = words_of(&modified_text);
        let stems = self.stem_all(&words);

        let mut parts = Vec::new();
        let mut fired: BTreeSet<usize> = BTreeSet::new();
        let mut literal: Vec<String> = Vec::new();
        let mut i = 0;
        while i < words.len() {
            match self.match_at(&stems, i, start_ref, end_ref) {
                Some((len, terms, rules)) => {
                    if !literal.is_empty() {
                        parts.push(PhrasePart::Literal(table.intern_part(&literal)));
                        literal.clear();
                    }
                    trace!("Key term match '{}' -> terms {:?}", words[i..i + len].join(" "), terms);
                    parts.push(PhrasePart::KeyTerm(table.intern_match(&terms)));
                    fired.extend(rules);
                    i += len;
                }
                None => {
                    literal.push(words[i].clone());
                    i += 1;
                }
            }
        }
        if !literal.is_empty() {
            parts.push(PhrasePart::Literal(table.intern_part(&literal)));
        }

        for (rule, form) in &self.excluded_forms {
            if !form.is_empty() && stems.windows(form.len()).any(|w| w == form.as_slice()) {
                fired.insert(*rule);
            }
        }

        for part in &parts {
            table.add_owner(*part, owner);
        }

        ParseOutcome {
            modified_text,
            parts,
            fired_rules: fired.into_iter().collect(),
        }
    }

    /// Longest in-scope key-term form starting at `start`.
    fn match_at(
        &self,
        stems: &[String],
        start: usize,
        start_ref: i32,
        end_ref: i32,
    ) -> Option<(usize, Vec<usize>, Vec<usize>)> {
        let max_len = self.longest_form.min(stems.len() - start);
        for len in (1..=max_len).rev() {
            let Some(sources) = self.forms.get(&stems[start..start + len]) else {
                continue;
            };
            let in_range: Vec<&FormSource> = sources
                .iter()
                .filter(|s| in_scope(&self.references[s.term], start_ref, end_ref))
                .collect();
            if in_range.is_empty() {
                continue;
            }
            let mut terms: Vec<usize> = in_range.iter().map(|s| s.term).collect();
            terms.sort_unstable();
            terms.dedup();
            let rules: Vec<usize> = in_range.iter().filter_map(|s| s.rule).collect();
            return Some((len, terms, rules));
        }
        None
    }
}

/// Break parts owned by a single phrase around existing shorter parts.
///
/// Longer parts are handled first. For each single-owner part the longest
/// existing live part contained in it (leftmost first, at least
/// `min_sub_part_words` long) replaces it, with the words before and after
/// becoming parts of their own.
pub fn coalesce_sub_parts(table: &mut PartTable, phrase_parts: &mut [Vec<PhrasePart>], min_sub_part_words: usize) {
    let min_sub = min_sub_part_words.max(1);
    let longest = table.live_parts().map(|(_, p)| p.word_count()).max().unwrap_or(0);
    let mut splits = 0usize;

    for len in (min_sub + 1..=longest).rev() {
        let candidates: Vec<PartId> = table
            .live_parts()
            .filter(|(_, p)| p.word_count() == len && p.owner_count() == 1)
            .map(|(id, _)| id)
            .collect();

        for id in candidates {
            let part = table.part(id);
            if part.is_retired() || part.owner_count() != 1 {
                continue;
            }
            let Some(owner) = part.owners().next() else {
                continue;
            };
            let words = part.words().to_vec();
            let Some((start, sub_len, sub)) = find_sub_part(table, &words, id, min_sub) else {
                continue;
            };

            let mut replacement = Vec::with_capacity(3);
            if start > 0 {
                replacement.push(PhrasePart::Literal(table.intern_part(&words[..start])));
            }
            replacement.push(PhrasePart::Literal(sub));
            if start + sub_len < words.len() {
                replacement.push(PhrasePart::Literal(table.intern_part(&words[start + sub_len..])));
            }

            let parts = &mut phrase_parts[owner.index()];
            let mut rebuilt = Vec::with_capacity(parts.len() + 2);
            for part in parts.iter() {
                if *part == PhrasePart::Literal(id) {
                    rebuilt.extend(replacement.iter().copied());
                } else {
                    rebuilt.push(*part);
                }
            }
            *parts = rebuilt;

            for piece in &replacement {
                table.add_owner(*piece, owner);
            }
            trace!(
                "Split '{}' around existing part '{}'",
                words.join(" "),
                table.part(sub).text()
            );
            table.retire_part(id);
            splits += 1;
        }
    }

    if splits > 0 {
        debug!("Coalesced {} single-owner parts around existing parts", splits);
    }
}

fn find_sub_part(table: &PartTable, words: &[String], whole: PartId, min_sub: usize) -> Option<(usize, usize, PartId)> {
    for sub_len in (min_sub..words.len()).rev() {
        for start in 0..=words.len() - sub_len {
            if let Some(found) = table.find_part(&words[start..start + sub_len]) {
                let part = table.part(found);
                if found != whole && !part.is_retired() && part.owner_count() > 0 {
                    return Some((start, sub_len, found));
                }
            }
        }
    }
    None
}
