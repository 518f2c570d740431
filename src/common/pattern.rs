//! Phrase compilation: many user phrases in, one case-insensitive matcher out.
//!
//! A phrase is literal text with two wildcards: `?` stands for exactly one
//! user-perceived character and `*` for any run of characters (including
//! none). Everything else is matched verbatim, so a phrase like `(c)` or
//! `$5` means exactly that text.

use crate::common::compilation::CompilableTo;
use crate::common::validation::Issue;
use regex::{Regex, RegexBuilder};
use unicode_segmentation::UnicodeSegmentation;

/// Matches exactly one user-perceived character.
pub const WILDCARD_ONE: &str = "?";
/// Matches zero or more characters of any kind.
pub const WILDCARD_ANY: &str = "*";

/// Scripts conventionally written without spaces between words. Letters in
/// these scripts never get boundary assertions.
const UNSPACED_CLASS: &str =
    r"[\p{Han}\p{Hiragana}\p{Katakana}\p{Hangul}\p{Bopomofo}\p{Thai}\p{Lao}\p{Khmer}\p{Myanmar}\x{30FC}]";

/// Approximates one extended grapheme cluster: CRLF, a regional indicator
/// pair, or a base character with its marks, skin tones and ZWJ sequels.
/// Case folding is switched off inside; it cannot change what "any
/// character" accepts and would only inflate the compiled program.
const ONE_GRAPHEME: &str = r"(?-i:\r\n|[\x{1F1E6}-\x{1F1FF}]{2}|\P{M}[\p{M}\x{1F3FB}-\x{1F3FF}]*(?:\x{200D}\P{M}[\p{M}\x{1F3FB}-\x{1F3FF}]*)*)";

const ANY_RUN: &str = r"(?s-i:.*)";

/// Upper bound on the compiled size of a phrase set. Every `?` costs a full
/// copy of the grapheme program, so sets with many of them need far more
/// room than the regex crate's default.
pub const SIZE_LIMIT: usize = 128 * (1 << 20);

lazy_static! {
    static ref WORD_START: Regex = Regex::new(r"^\w").unwrap();
    static ref UNSPACED_START: Regex = Regex::new(&format!("^{}", UNSPACED_CLASS)).unwrap();
    static ref BEFORE_BOUNDED: String = format!(r"(?:^|\W|{})", UNSPACED_CLASS);
    static ref AFTER_BOUNDED: String = format!(r"(?:$|\W|{})", UNSPACED_CLASS);
}

/// Whether a character needs a word boundary next to it when it sits at the
/// edge of a phrase.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BoundaryClass {
    /// Letters and digits of space-delimited scripts (Latin, Cyrillic,
    /// Greek, ...). A phrase edge made of one must not touch another.
    Bounded,
    /// CJK, Thai and friends, emoji, punctuation, symbols.
    Unbounded,
}

impl BoundaryClass {
    /// Classifies a grapheme by its base character.
    pub fn of(grapheme: &str) -> BoundaryClass {
        if WORD_START.is_match(grapheme) && !UNSPACED_START.is_match(grapheme) {
            BoundaryClass::Bounded
        } else {
            BoundaryClass::Unbounded
        }
    }
}

/// The set of phrases a user wants hidden. Order is kept but carries no
/// meaning; overlapping phrases are matched independently.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhraseSet {
    pub phrases: Vec<String>,
}

/// One phrase after translation into regex syntax, still without its
/// boundary assertions.
#[derive(Clone, Debug, PartialEq)]
pub struct TranslatedPhrase {
    pub body: String,
    pub leading: BoundaryClass,
    pub trailing: BoundaryClass,
    /// `true` when the phrase has no literal text at all (`*`, `??`).
    pub wildcard_only: bool,
}

/// The matcher built from a `PhraseSet`. It is a pure function of the
/// phrases it was compiled from.
#[derive(Clone, Debug, Default)]
pub struct CompiledMatcher {
    /// Usually a single regex for the whole set; one per surviving phrase
    /// when the set had to be split.
    regexes: Vec<Regex>,
}

/// Translates a single phrase. Returns `None` for the empty phrase, which
/// must never match anything.
pub fn translate(phrase: &str) -> Option<TranslatedPhrase> {
    if phrase.is_empty() {
        return None;
    }
    let graphemes: Vec<&str> = phrase.graphemes(true).collect();
    let mut body = String::new();
    for grapheme in &graphemes {
        match *grapheme {
            WILDCARD_ONE => body.push_str(ONE_GRAPHEME),
            WILDCARD_ANY => body.push_str(ANY_RUN),
            literal => body.push_str(&regex::escape(literal)),
        }
    }

    let is_literal = |g: &&&str| **g != WILDCARD_ONE && **g != WILDCARD_ANY;
    let first = graphemes.iter().find(is_literal);
    let last = graphemes.iter().rev().find(is_literal);
    let class_of = |g: Option<&&str>| match g {
        Some(grapheme) => BoundaryClass::of(grapheme),
        None => BoundaryClass::Unbounded,
    };

    Some(TranslatedPhrase {
        body,
        leading: class_of(first),
        trailing: class_of(last),
        wildcard_only: first.is_none(),
    })
}

impl PhraseSet {
    /// Assembles the combined regex source, or `None` when no phrase could
    /// ever match.
    ///
    /// Phrases are grouped by which of their edges need a boundary so that
    /// each boundary assertion appears at most once in the final pattern,
    /// whatever the number of phrases.
    pub fn to_regex_source(&self) -> Option<String> {
        regex_source(&self.phrases)
    }

    /// Compiles the set under an explicit size limit.
    ///
    /// The whole set is tried as one regex first. When that fails, each
    /// phrase is compiled on its own and only the phrases that still fail
    /// are dropped (with a warning), so one oversized phrase never takes the
    /// rest of the blacklist down with it. It is an error only when phrases
    /// were given and none of them survived.
    pub fn compile_within(&self, size_limit: usize) -> Result<CompiledMatcher, Issue> {
        let source = match self.to_regex_source() {
            Some(value) => value,
            None => return Ok(CompiledMatcher::never()),
        };
        let error = match build(&source, size_limit) {
            Ok(regex) => return Ok(CompiledMatcher { regexes: vec![regex] }),
            Err(error) => error,
        };
        warn!(
            "phrase set of {} phrases could not compile as a whole (`{}`), compiling phrases one at a time",
            self.phrases.len(),
            error
        );

        let mut regexes = Vec::new();
        let mut dropped = 0;
        for phrase in &self.phrases {
            let source = match regex_source(std::slice::from_ref(phrase)) {
                Some(value) => value,
                None => continue,
            };
            match build(&source, size_limit) {
                Ok(regex) => regexes.push(regex),
                Err(error) => {
                    warn!("dropping phrase `{}`: {}", phrase, error);
                    dropped += 1;
                }
            }
        }
        if regexes.is_empty() {
            return Err(Issue::Error(format!(
                "none of the {} phrases could compile (`{}`)",
                dropped, error
            )));
        }
        Ok(CompiledMatcher { regexes: regexes })
    }
}

fn build(source: &str, size_limit: usize) -> Result<Regex, regex::Error> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .size_limit(size_limit)
        .build()
}

fn regex_source(phrases: &[String]) -> Option<String> {
    // (leading bounded, trailing bounded)
    let mut groups: [Vec<String>; 4] = [vec![], vec![], vec![], vec![]];
    for phrase in phrases {
        let translated = match translate(phrase) {
            Some(value) => value,
            None => continue,
        };
        let index = match (translated.leading, translated.trailing) {
            (BoundaryClass::Bounded, BoundaryClass::Bounded) => 0,
            (BoundaryClass::Bounded, BoundaryClass::Unbounded) => 1,
            (BoundaryClass::Unbounded, BoundaryClass::Bounded) => 2,
            (BoundaryClass::Unbounded, BoundaryClass::Unbounded) => 3,
        };
        groups[index].push(translated.body);
    }

    let mut alternatives: Vec<String> = Vec::new();
    for (index, bodies) in groups.iter().enumerate() {
        if bodies.is_empty() {
            continue;
        }
        let before = if index <= 1 { BEFORE_BOUNDED.as_str() } else { "" };
        let after = if index % 2 == 0 { AFTER_BOUNDED.as_str() } else { "" };
        alternatives.push(format!("{}(?:{}){}", before, bodies.join("|"), after));
    }

    if alternatives.is_empty() {
        None
    } else {
        Some(alternatives.join("|"))
    }
}

impl From<Vec<String>> for PhraseSet {
    fn from(phrases: Vec<String>) -> PhraseSet {
        PhraseSet { phrases: phrases }
    }
}

impl<'a> From<Vec<&'a str>> for PhraseSet {
    fn from(phrases: Vec<&'a str>) -> PhraseSet {
        PhraseSet {
            phrases: phrases.into_iter().map(String::from).collect(),
        }
    }
}

impl CompilableTo<CompiledMatcher> for PhraseSet {
    fn compile(&self) -> Result<CompiledMatcher, Issue> {
        self.compile_within(SIZE_LIMIT)
    }
}

impl CompiledMatcher {
    /// A matcher that rejects every text.
    pub fn never() -> CompiledMatcher {
        CompiledMatcher { regexes: vec![] }
    }

    /// Checks whether any phrase occurs in `text`.
    pub fn test(&self, text: &str) -> bool {
        self.regexes.iter().any(|regex| regex.is_match(text))
    }
}
