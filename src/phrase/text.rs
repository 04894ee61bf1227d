/*!
 * Text helpers shared by the parser and the inference engine.
 *
 * Words of an English question are compared case-folded with outer
 * punctuation removed; translations are compared in Unicode NFC.
 */

use unicode_normalization::UnicodeNormalization;

/// Characters that count as punctuation when trimming outer punctuation.
pub fn is_punctuation(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}

/// Characters that `\b` in a regular expression treats as word characters.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether the text contains at least one letter or digit.
pub fn has_content(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

/// Strip leading and trailing punctuation and whitespace, keeping anything internal.
pub fn trim_outer_punctuation(text: &str) -> &str {
    text.trim_matches(|c: char| is_punctuation(c) || c.is_whitespace())
}

/// The run of punctuation (ignoring whitespace) at the start of the text.
pub fn leading_punctuation(text: &str) -> String {
    text.chars()
        .take_while(|c| is_punctuation(*c) || c.is_whitespace())
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// The run of punctuation (ignoring whitespace) at the end of the text.
pub fn trailing_punctuation(text: &str) -> String {
    let mut trailing: Vec<char> = text
        .chars()
        .rev()
        .take_while(|c| is_punctuation(*c) || c.is_whitespace())
        .filter(|c| !c.is_whitespace())
        .collect();
    trailing.reverse();
    trailing.into_iter().collect()
}

/// Canonical composition, so offsets and comparisons do not depend on how
/// accents were typed.
pub fn to_nfc(text: &str) -> String {
    text.nfc().collect()
}

/// Build a regex that matches `literal` (already escaped as `escaped`) only on
/// word boundaries. A boundary is only required on an edge whose character is
/// itself a word character; otherwise `\b` would demand a neighbouring word
/// character.
pub fn whole_word_pattern(literal: &str, escaped: &str) -> String {
    let mut pattern = String::with_capacity(escaped.len() + 4);
    if literal.chars().next().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(escaped);
    if literal.chars().last().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern
}

/// Whether `text[start..end]` sits on word boundaries.
pub fn on_word_boundaries(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    let first = text[start..end].chars().next();
    let last = text[start..end].chars().next_back();
    let left_ok = match (before, first) {
        (Some(b), Some(f)) => !(is_word_char(b) && is_word_char(f)),
        _ => true,
    };
    let right_ok = match (last, after) {
        (Some(l), Some(a)) => !(is_word_char(l) && is_word_char(a)),
        _ => true,
    };
    left_ok && right_ok
}

/// Normalize one whitespace-delimited token of English text into a word:
/// lowercase, curly apostrophes made straight, outer punctuation removed
/// except hyphens and a possessive apostrophe after `s`.
pub fn normalize_word(token: &str) -> Option<String> {
    let lowered: String = token
        .chars()
        .map(|c| if c == '\u{2019}' || c == '\u{2018}' { '\'' } else { c })
        .flat_map(char::to_lowercase)
        .collect();

    let start = lowered
        .char_indices()
        .find(|(_, c)| c.is_alphanumeric() || *c == '-')
        .map(|(i, _)| i)?;

    let chars: Vec<(usize, char)> = lowered[start..].char_indices().collect();
    let mut end = chars.len();
    while end > 0 {
        let c = chars[end - 1].1;
        let keep = c.is_alphanumeric()
            || c == '-'
            || (c == '\'' && end >= 2 && chars[end - 2].1 == 's');
        if keep {
            break;
        }
        end -= 1;
    }

    let word: String = chars[..end].iter().map(|(_, c)| *c).collect();
    if has_content(&word) {
        Some(word)
    } else {
        None
    }
}

/// Split English text into normalized words.
pub fn words_of(text: &str) -> Vec<String> {
    text.split_whitespace().filter_map(normalize_word).collect()
}

/// A whitespace-delimited token of a translation, with its outer punctuation
/// trimmed away. Offsets are byte offsets into the text it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
}

/// Tokens of `text[from..to]`, each trimmed of outer punctuation. Tokens that
/// consist only of punctuation are kept with their full extent.
pub fn tokens_in(text: &str, from: usize, to: usize) -> Vec<Token> {
    let slice = &text[from..to];
    let mut tokens = Vec::new();
    let mut token_start: Option<usize> = None;
    for (i, c) in slice.char_indices() {
        match (c.is_whitespace(), token_start) {
            (false, None) => token_start = Some(i),
            (true, Some(s)) => {
                tokens.push(trimmed_token(slice, s, i, from));
                token_start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = token_start {
        tokens.push(trimmed_token(slice, s, slice.len(), from));
    }
    tokens
}

fn trimmed_token(slice: &str, start: usize, end: usize, base: usize) -> Token {
    let raw = &slice[start..end];
    let trimmed = trim_outer_punctuation(raw);
    if trimmed.is_empty() {
        return Token { start: base + start, end: base + end };
    }
    let offset = raw.find(trimmed).unwrap_or(0);
    Token {
        start: base + start + offset,
        end: base + start + offset + trimmed.len(),
    }
}
