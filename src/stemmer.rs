/*!
 * Word stemming for key-term matching.
 *
 * The parser compares question words with key-term glosses by their stems so
 * that "Pharisees" matches the term "Pharisee" and "thinks" matches "think".
 * `PorterStemmer` implements the Porter algorithm with a few extensions:
 * - possessives (`'s` and a trailing `'` after `s`) are stripped
 * - `-ies` becomes `-y` before the usual `y` to `i` rule runs
 * - hyphenated words and a handful of pronoun-like nouns are never stemmed
 * - a final `e` following another `e` is kept (`pharisee`)
 */

/// Reduces a word to a root form used for comparison only.
pub trait Stemmer: Send + Sync {
    /// Stem a single lowercase word.
    fn stem(&self, word: &str) -> String;
}

/// Nouns that must survive stemming unchanged.
const SPECIAL_CASE_NOUNS: &[&str] = &[
    "morning",
    "olive",
    "someone",
    "anyone",
    "everyone",
    "something",
    "anything",
    "everything",
    "nothing",
    "somebody",
    "anybody",
    "everybody",
    "nobody",
];

/// Porter stemmer.
///
/// In staged mode stemming stops after the first stage that changed the
/// word, which keeps stems closer to the surface form.
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer {
    staged: bool,
}

impl PorterStemmer {
    /// Create a stemmer that runs every stage.
    pub fn new() -> Self {
        Self { staged: false }
    }

    /// Create a stemmer that stops after the first stage that changes the word.
    pub fn staged() -> Self {
        Self { staged: true }
    }

    /// Whether this stemmer runs in staged mode.
    pub fn is_staged(&self) -> bool {
        self.staged
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        let mut buffer = StemBuffer::new(word);
        buffer.run(self.staged);
        buffer.into_stem()
    }
}

/// Working state for one word. `k` is the index of the last character of the
/// current stem, `j` the end of the stem before the suffix being examined.
struct StemBuffer {
    b: Vec<char>,
    original_len: isize,
    k: isize,
    j: isize,
    changed: bool,
}

impl StemBuffer {
    fn new(word: &str) -> Self {
        let b: Vec<char> = word.chars().collect();
        let original_len = b.len() as isize;
        Self {
            b,
            original_len,
            k: original_len - 1,
            j: 0,
            changed: false,
        }
    }

    fn into_stem(self) -> String {
        let end = (self.k + 1).max(0) as usize;
        self.b[..end.min(self.b.len())].iter().collect()
    }

    fn at(&self, i: isize) -> char {
        self.b[i as usize]
    }

    fn untouched(&self) -> bool {
        !self.changed && self.k == self.original_len - 1
    }

    fn run(&mut self, staged: bool) {
        if self.k <= 1 {
            return;
        }

        let hyphenated = self.b.contains(&'-');
        self.step1a();
        if self.is_special_case_noun() || hyphenated {
            return;
        }

        if staged && !self.untouched() {
            return;
        }
        self.step1b();

        if staged && !self.untouched() {
            return;
        }
        self.step1c();
        self.step2();

        if staged && self.changed {
            return;
        }
        self.step3();

        if staged && self.changed {
            return;
        }
        self.step4();

        if staged && !self.untouched() {
            return;
        }
        self.step5();
    }

    fn is_consonant(&self, i: isize) -> bool {
        match self.at(i) {
            'a' | 'e' | 'i' | 'o' | 'u' => false,
            'y' => i == 0 || !self.is_consonant(i - 1),
            _ => true,
        }
    }

    /// Number of vowel-consonant sequences in `b[0..=j]`.
    fn measure(&self) -> usize {
        let mut n = 0;
        let mut i = 0;
        loop {
            if i > self.j {
                return n;
            }
            if !self.is_consonant(i) {
                break;
            }
            i += 1;
        }
        i += 1;
        loop {
            loop {
                if i > self.j {
                    return n;
                }
                if self.is_consonant(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
            n += 1;
            loop {
                if i > self.j {
                    return n;
                }
                if !self.is_consonant(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
        }
    }

    fn vowel_in_stem(&self) -> bool {
        (0..=self.j).any(|i| !self.is_consonant(i))
    }

    fn double_consonant(&self, at: isize) -> bool {
        at >= 1 && self.at(at) == self.at(at - 1) && self.is_consonant(at)
    }

    /// consonant-vowel-consonant ending at `i`, where the last consonant is not w, x or y
    fn cvc(&self, i: isize) -> bool {
        if i < 2 || !self.is_consonant(i) || self.is_consonant(i - 1) || !self.is_consonant(i - 2)
        {
            return false;
        }
        !matches!(self.at(i), 'w' | 'x' | 'y')
    }

    fn ends(&mut self, suffix: &str) -> bool {
        let suffix: Vec<char> = suffix.chars().collect();
        let len = suffix.len() as isize;
        let start = self.k - len + 1;
        if start < 0 {
            return false;
        }
        if self.b[start as usize..=self.k as usize] != suffix[..] {
            return false;
        }
        self.j = self.k - len;
        true
    }

    fn set_to(&mut self, replacement: &str) {
        let start = (self.j + 1) as usize;
        self.b.truncate(start);
        self.b.extend(replacement.chars());
        self.k = self.j + replacement.chars().count() as isize;
        self.changed = true;
    }

    fn replace_if_measured(&mut self, replacement: &str) {
        if self.measure() > 0 {
            self.set_to(replacement);
        }
    }

    fn is_special_case_noun(&mut self) -> bool {
        SPECIAL_CASE_NOUNS.iter().any(|noun| self.ends(noun))
    }

    /// Plurals and possessives.
    fn step1a(&mut self) {
        if self.ends("s'") {
            self.k -= 1;
        }
        if self.at(self.k) != 's' {
            return;
        }
        if self.ends("sses") {
            self.k -= 2;
        } else if self.ends("ies") {
            self.set_to("y");
        } else if self.ends("'s") {
            self.k -= 2;
        } else if self.at(self.k - 1) == 'u' {
            if self.original_len > 3 && self.k >= 2 {
                if self.ends("ous") {
                    self.k -= 3;
                } else if self.is_consonant(self.k - 2)
                    && self.at(self.k - 2) != 's'
                    && !self.ends("stus")
                {
                    self.k -= 1;
                }
            }
        } else if self.at(self.k - 1) != 's' {
            self.k -= 1;
        }
    }

    /// -eed, -ed and -ing.
    fn step1b(&mut self) {
        if self.ends("eed") {
            if self.measure() > 0 {
                self.k -= 1;
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.vowel_in_stem() {
            self.k = self.j;
            if self.ends("at") {
                self.set_to("ate");
            } else if self.ends("bl") {
                self.set_to("ble");
            } else if self.ends("iz") {
                self.set_to("ize");
            } else if self.double_consonant(self.k) {
                self.k -= 1;
                if matches!(self.at(self.k), 'l' | 's' | 'z') {
                    self.k += 1;
                }
            } else if self.measure() == 1 && self.cvc(self.k) {
                self.set_to("e");
            }
        }
    }

    /// Terminal y to i when the stem has another vowel and y follows a consonant.
    fn step1c(&mut self) {
        if self.ends("y") && self.k > 0 && self.is_consonant(self.k - 1) && self.vowel_in_stem() {
            let k = self.k as usize;
            self.b[k] = 'i';
            self.changed = true;
        }
    }

    /// Double suffixes to single ones (-ization to -ize and so on).
    fn step2(&mut self) {
        if self.k == 0 {
            return;
        }
        match self.at(self.k - 1) {
            'a' => {
                if self.ends("ational") {
                    self.replace_if_measured("ate");
                } else if self.ends("tional") {
                    self.replace_if_measured("tion");
                }
            }
            'c' => {
                if self.ends("enci") {
                    self.replace_if_measured("ence");
                } else if self.ends("anci") {
                    self.replace_if_measured("ance");
                }
            }
            'e' => {
                if self.ends("izer") {
                    self.replace_if_measured("ize");
                }
            }
            'l' => {
                if self.ends("bli") {
                    self.replace_if_measured("ble");
                } else if self.ends("ealli") {
                    self.set_to("eal");
                } else if self.ends("alli") {
                    self.replace_if_measured("al");
                } else if self.ends("ulli") {
                    let replacement = if self.j == 0 { "ull" } else { "ul" };
                    self.set_to(replacement);
                } else if self.ends("entli") {
                    self.replace_if_measured("ent");
                } else if self.changed && self.ends("eli") {
                    self.replace_if_measured("e");
                } else if self.ends("obeli") {
                    self.set_to("obel");
                } else if self.ends("ousli") {
                    self.replace_if_measured("ous");
                }
            }
            'o' => {
                if self.ends("ization") {
                    self.replace_if_measured("ize");
                } else if self.ends("ation") {
                    self.replace_if_measured("ate");
                } else if self.ends("ator") {
                    self.replace_if_measured("ate");
                }
            }
            's' => {
                if self.ends("alism") {
                    self.replace_if_measured("al");
                } else if self.ends("iveness") {
                    self.replace_if_measured("ive");
                } else if self.ends("fulness") {
                    self.replace_if_measured("ful");
                } else if self.ends("ousness") {
                    self.replace_if_measured("ous");
                }
            }
            't' => {
                if self.ends("aliti") {
                    self.replace_if_measured("al");
                } else if self.ends("iviti") {
                    self.replace_if_measured("ive");
                } else if self.ends("biliti") {
                    self.replace_if_measured("ble");
                }
            }
            'g' => {
                if self.ends("logi") {
                    self.replace_if_measured("log");
                }
            }
            _ => {}
        }
    }

    /// -ic-, -full, -ness and friends.
    fn step3(&mut self) {
        match self.at(self.k) {
            'e' => {
                if self.ends("icate") {
                    self.replace_if_measured("ic");
                } else if self.ends("ative") {
                    self.replace_if_measured("");
                } else if self.ends("alize") {
                    self.replace_if_measured("al");
                }
            }
            'i' => {
                if self.ends("iciti") {
                    self.replace_if_measured("ic");
                }
            }
            'l' => {
                if self.ends("ical") {
                    self.replace_if_measured("ic");
                } else if self.ends("ful") {
                    self.replace_if_measured("");
                }
            }
            's' => {
                if self.ends("ness") {
                    self.replace_if_measured("");
                }
            }
            _ => {}
        }
    }

    /// -ant, -ence and the like, in context <c>vcvc<v>.
    fn step4(&mut self) {
        if self.k == 0 {
            return;
        }
        let matched = match self.at(self.k - 1) {
            'a' => self.ends("al"),
            'c' => self.ends("ance") || self.ends("ence"),
            'e' => self.ends("er"),
            'i' => self.ends("ic"),
            'l' => self.ends("able") || self.ends("ible") || self.ends("ple"),
            'n' => self.ends("ant") || self.ends("ement") || self.ends("ment") || self.ends("ent"),
            'o' => {
                (self.ends("ion") && self.j >= 0 && matches!(self.at(self.j), 's' | 't'))
                    || self.ends("ou")
            }
            's' => self.ends("ism"),
            't' => self.ends("ate") || self.ends("iti"),
            'u' => self.ends("ous"),
            'v' => self.ends("ive"),
            'z' => self.ends("ize"),
            _ => false,
        };
        if matched && self.measure() > 1 {
            self.k = self.j;
        }
    }

    /// Final -e and -ll.
    fn step5(&mut self) {
        self.j = self.k;
        if self.at(self.k) == 'e' {
            if self.ends("ple") || self.ends("tle") || self.k < 3 {
                return;
            }
            let m = self.measure();
            if (m > 1 || (m == 1 && !self.cvc(self.k - 1))) && self.at(self.k - 1) != 'e' {
                self.k -= 1;
            }
        }
        if self.at(self.k) == 'l' && self.double_consonant(self.k) && self.measure() > 1 {
            self.k -= 1;
        }
    }
}
