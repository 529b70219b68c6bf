//! The compiled pattern and the external driver API (spec §3 "Pattern
//! (compiled)", §4.7): `match`/`search`/`fullmatch`/`finditer`/`findall`/
//! `sub`/`subn`/`split`, modeled on `regex/pattern.py`'s `Pattern` class
//! and `Match.expand`'s template grammar.
//!
//! `Pattern` wraps its compiled state in an [`Arc`] so cloning a pattern
//! (to share it across threads, or to stash one in every [`Match`] it
//! produces) is cheap, the same tradeoff the teacher's own matcher types
//! make for their compiled state.

use std::collections::HashMap;
use std::sync::Arc;

use bon::bon;

use crate::charset::{self, CodePoint};
use crate::error::{Error, PatternError};
use crate::flags::PatternFlags;
use crate::matched::Match;
use crate::nfa::{self, Nfa};
use crate::syntax::ast::Ast;
use crate::syntax::{parser, processor, tokenizer};
use crate::vm::simulator;

#[derive(Debug)]
struct Inner {
    text: String,
    flags: PatternFlags,
    raw_ast: Ast,
    processed_ast: Ast,
    nfa: Nfa,
    max_group_number: u32,
    name_to_group_number: HashMap<String, u32>,
}

/// A pattern compiled from source text, ready to match/search/substitute
/// against haystacks (spec §3, §4.7).
///
/// Compiling builds the whole pipeline once — tokens, raw AST, processed
/// AST, NFA — and the result is immutable afterwards: a `Pattern` can be
/// cloned cheaply and shared across threads for concurrent read-only use
/// (spec §5).
///
/// # Examples
/// ```
/// use pike_regex::{Pattern, PatternFlags};
///
/// let re = Pattern::new(r"([a-z0-9]+)@([a-z0-9]+\.[a-z0-9]+)").unwrap();
/// let m = re.search("text abc@def.com xyz@123.com").unwrap();
/// assert_eq!(m.group(0u32), Some("abc@def.com"));
/// assert_eq!(m.group(1u32), Some("abc"));
/// assert_eq!(m.group(2u32), Some("def.com"));
///
/// assert!(Pattern::compile("a{2,3}", PatternFlags::NOFLAG).unwrap().fullmatch("aaa").is_some());
/// ```
#[derive(Clone, Debug)]
pub struct Pattern {
    inner: Arc<Inner>,
}

#[bon]
impl Pattern {
    /// Builder form of [`Pattern::compile`], for the optional construction
    /// knobs: `.flags(..)` and `.eliminate_epsilons(false)` (the latter is
    /// mainly useful to exercise the "ε-elimination preserves language"
    /// property from spec §8 against the pre-elimination NFA; matching
    /// still works either way since [`crate::vm::simulator`] only ever
    /// follows transitions matching its zero-width predicate, trivial or
    /// not).
    ///
    /// # Examples
    /// ```
    /// use pike_regex::{Pattern, PatternFlags};
    /// let re = Pattern::builder("ABC").flags(PatternFlags::IGNORECASE).build().unwrap();
    /// assert!(re.fullmatch("abc").is_some());
    /// ```
    #[builder]
    fn build_pattern(
        #[builder(start_fn)] pattern: &str,
        #[builder(default)] flags: PatternFlags,
        #[builder(default = true)] eliminate_epsilons: bool,
    ) -> Result<Pattern, PatternError> {
        Pattern::compile_with(pattern, flags, eliminate_epsilons)
    }
}

impl Pattern {
    /// Compiles `pattern` with no flags set.
    pub fn new(pattern: &str) -> Result<Pattern, PatternError> {
        Pattern::compile(pattern, PatternFlags::NOFLAG)
    }

    /// Compiles `pattern` under `flags`, mirroring `regex_automata.compile`
    /// (spec §4.7). Fails with a [`PatternError`] carrying a multi-line
    /// caret diagnostic if `pattern` is malformed or uses an unsupported
    /// construct (spec §7).
    pub fn compile(pattern: &str, flags: PatternFlags) -> Result<Pattern, PatternError> {
        Pattern::compile_with(pattern, flags, true)
    }

    fn compile_with(pattern: &str, flags: PatternFlags, eliminate_epsilons: bool) -> Result<Pattern, PatternError> {
        let compiled = compile_pipeline(pattern, flags, eliminate_epsilons).map_err(|e| PatternError::new(pattern, e))?;
        Ok(Pattern { inner: Arc::new(compiled) })
    }

    /// The pattern source text this `Pattern` was compiled from.
    pub fn pattern_text(&self) -> &str {
        &self.inner.text
    }

    /// The effective flag set, after any inline `(?ims)` forms have been
    /// folded in by the tokenizer.
    pub fn flags(&self) -> PatternFlags {
        self.inner.flags
    }

    /// The raw AST, before bounded-repetition desugaring or the group-0
    /// wrap (spec §4.4). Exposed for introspection/testing only.
    pub fn raw_ast(&self) -> &Ast {
        &self.inner.raw_ast
    }

    /// The processed AST that was translated into the NFA.
    pub fn processed_ast(&self) -> &Ast {
        &self.inner.processed_ast
    }

    /// The compiled NFA.
    pub fn nfa(&self) -> &Nfa {
        &self.inner.nfa
    }

    /// The highest user-visible group number (group 0, the whole match,
    /// is not counted).
    pub fn max_group_number(&self) -> u32 {
        self.inner.max_group_number
    }

    /// Maps declared `(?P<name>...)` group names to their group number.
    pub fn group_name_to_number(&self) -> &HashMap<String, u32> {
        &self.inner.name_to_group_number
    }

    /// Anchored match attempt starting at the very beginning of `text`.
    /// Unlike [`Pattern::search`], does not try successive start
    /// positions.
    pub fn match_(&self, text: &str) -> Option<Match> {
        self.match_at(text, 0, None)
    }

    /// [`Pattern::match_`], but `text[start..end)` bounds the window the
    /// simulator may consume (`end = None` means "to the end of `text`").
    pub fn match_at(&self, text: &str, start: usize, end: Option<usize>) -> Option<Match> {
        self.run(text, start, end, false).into_iter().next()
    }

    /// First leftmost-longest match anywhere at or after position 0.
    pub fn search(&self, text: &str) -> Option<Match> {
        self.search_at(text, 0, None)
    }

    /// [`Pattern::search`], bounded to the `text[start..end)` window.
    pub fn search_at(&self, text: &str, start: usize, end: Option<usize>) -> Option<Match> {
        self.run(text, start, end, true).into_iter().next()
    }

    /// `match_(text)` if the match also reaches the end of `text`,
    /// otherwise `None` (spec §4.7, §8 "Anchoring").
    pub fn fullmatch(&self, text: &str) -> Option<Match> {
        let char_len = text.chars().count();
        self.match_(text).filter(|m| m.end(0u32) == Some(char_len))
    }

    /// Every non-overlapping match in `text`, in increasing `start` order
    /// (spec §4.7, §5 "Ordering guarantees").
    pub fn finditer(&self, text: &str) -> FindIter {
        FindIter { matches: self.run(text, 0, None, true).into_iter() }
    }

    /// Flattens [`Pattern::finditer`]: whole-match text if the pattern has
    /// no groups, the lone group's text if it has exactly one, otherwise a
    /// tuple (here, a `Vec`) of every group, `None` marking a
    /// non-participating group (spec §4.7, §8 scenario 7).
    pub fn findall(&self, text: &str) -> Vec<FindAllItem> {
        match self.max_group_number() {
            0 => self.finditer(text).map(|m| FindAllItem::Whole(m.group(0u32).unwrap_or_default().to_string())).collect(),
            1 => self.finditer(text).map(|m| FindAllItem::Group(m.group(1u32).map(str::to_string))).collect(),
            n => self
                .finditer(text)
                .map(|m| FindAllItem::Groups((1..=n).map(|i| m.group(i).map(str::to_string)).collect()))
                .collect(),
        }
    }

    /// Splits `text` on every match, interleaving the matched groups' text
    /// (spec §4.7, §8 scenario 6). `maxsplit = 0` means unlimited.
    /// Non-participating groups are represented as `None`, the rest
    /// (including the non-matched slices between/around matches) as
    /// `Some`.
    pub fn split(&self, text: &str, maxsplit: usize) -> Vec<Option<String>> {
        let chars: Vec<char> = text.chars().collect();
        let mut out = Vec::new();
        let mut last_end = 0usize;
        let mut n = 0usize;
        for m in self.finditer(text) {
            if maxsplit > 0 && n >= maxsplit {
                break;
            }
            let start = m.start(0u32).expect("group 0 always participates");
            let end = m.end(0u32).expect("group 0 always participates");
            out.push(Some(char_slice(&chars, last_end, start)));
            for i in 1..=self.max_group_number() {
                out.push(m.group(i).map(str::to_string));
            }
            last_end = end;
            n += 1;
        }
        out.push(Some(char_slice(&chars, last_end, chars.len())));
        out
    }

    /// Replaces every match (up to `count`, or all if `count == 0`) with
    /// `repl` and returns the resulting text. See [`Pattern::subn`] for
    /// the replacement count.
    pub fn sub(&self, repl: Replacement<'_>, text: &str, count: usize) -> String {
        self.subn(repl, text, count).0
    }

    /// [`Pattern::sub`], additionally returning the number of
    /// replacements made.
    pub fn subn(&self, repl: Replacement<'_>, text: &str, count: usize) -> (String, usize) {
        let chars: Vec<char> = text.chars().collect();
        let mut output = String::new();
        let mut last_end = 0usize;
        let mut n = 0usize;
        for m in self.finditer(text) {
            if count > 0 && n >= count {
                break;
            }
            let start = m.start(0u32).expect("group 0 always participates");
            output.push_str(&char_slice(&chars, last_end, start));
            match &repl {
                Replacement::Template(template) => output.push_str(&m.expand(template)),
                Replacement::Callback(f) => output.push_str(&f(&m)),
            }
            last_end = m.end(0u32).expect("group 0 always participates");
            n += 1;
        }
        output.push_str(&char_slice(&chars, last_end, chars.len()));
        (output, n)
    }

    fn run(&self, text: &str, start: usize, end: Option<usize>, search: bool) -> Vec<Match> {
        let original: Vec<char> = text.chars().collect();
        let lower = self.inner.flags.contains(PatternFlags::IGNORECASE);
        let codepoints: Vec<CodePoint> = original
            .iter()
            .map(|&c| {
                let cp = c as CodePoint;
                if lower {
                    charset::to_lower(cp)
                } else {
                    cp
                }
            })
            .collect();
        let end = end.unwrap_or(original.len());
        let group_count = self.inner.max_group_number as usize + 1;
        simulator::scan(&self.inner.nfa, group_count, &codepoints, start, end, search)
            .into_iter()
            .map(|raw| Match::new(self.clone(), &original, raw))
            .collect()
    }
}

fn char_slice(chars: &[char], start: usize, end: usize) -> String {
    chars[start.min(chars.len())..end.min(chars.len())].iter().collect()
}

fn compile_pipeline(pattern: &str, flags: PatternFlags, eliminate_epsilons: bool) -> Result<Inner, Error> {
    let tokenizer_out = tokenizer::tokenize(pattern, flags)?;
    let effective_flags = tokenizer_out.flags;
    let parse_out = parser::parse(tokenizer_out.tokens)?;
    let processed = processor::process(parse_out.ast.clone());
    let nfa = nfa::builder::build_with_options(&processed.ast, eliminate_epsilons);

    Ok(Inner {
        text: pattern.to_string(),
        flags: effective_flags,
        raw_ast: parse_out.ast,
        processed_ast: processed.ast,
        nfa,
        max_group_number: processed.max_group_number,
        name_to_group_number: parse_out.name_to_group_number,
    })
}

/// A single non-overlapping match, yielded lazily from the (eagerly
/// computed) scan — see [`crate::vm::simulator`] for why eager computation
/// is still an [`Iterator`] the caller can stop early.
pub struct FindIter {
    matches: std::vec::IntoIter<Match>,
}

impl Iterator for FindIter {
    type Item = Match;
    fn next(&mut self) -> Option<Match> {
        self.matches.next()
    }
}

/// One element of [`Pattern::findall`]'s result (spec §4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindAllItem {
    /// No groups in the pattern: the whole match text.
    Whole(String),
    /// Exactly one group in the pattern: that group's text, or `None` if
    /// it didn't participate.
    Group(Option<String>),
    /// More than one group: every group 1..=N, `None` marking a
    /// non-participating group.
    Groups(Vec<Option<String>>),
}

/// A [`Pattern::sub`]/[`Pattern::subn`] replacement: either a template
/// string expanded against each match (spec §4.7 `Match.expand`), or a
/// callback computing the replacement from the match directly.
pub enum Replacement<'a> {
    Template(&'a str),
    Callback(&'a dyn Fn(&Match) -> String),
}

impl<'a> From<&'a str> for Replacement<'a> {
    fn from(template: &'a str) -> Self {
        Replacement::Template(template)
    }
}

/// Expands `template`'s `\g<name-or-number>`, `\<digits>`,
/// `\[abfnrtv\\]`, `\xHH`, `\uHHHH`, `\UHHHHHHHH` escapes against `m`'s
/// captures (spec §4.7), modeled on `Match.expand`/`_get_expand_pattern`
/// in `regex/match.py`. Implemented as a hand-written scanner rather than
/// a self-hosted `Pattern`, unlike the original: the original's own
/// template grammar embeds a literal backslash inside a bracket
/// expression (`[abfnrtv\\]`), which this engine's tokenizer always
/// rejects as "unsupported" (spec §4.2 "escape sequences inside brackets
/// are rejected"), so the grammar can't be compiled with itself.
pub(crate) fn expand_template(m: &Match, template: &str) -> String {
    let chars: Vec<char> = template.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c != '\\' || i + 1 >= chars.len() {
            out.push(c);
            i += 1;
            continue;
        }
        let next = chars[i + 1];

        if next == 'g' && chars.get(i + 2) == Some(&'<') {
            if let Some(close) = chars[i + 3..].iter().position(|&c| c == '>') {
                let name_or_number: String = chars[i + 3..i + 3 + close].iter().collect();
                let value = match name_or_number.parse::<u32>() {
                    Ok(n) => m.group(n),
                    Err(_) => m.group(name_or_number.as_str()),
                };
                out.push_str(value.unwrap_or(""));
                i = i + 3 + close + 1;
                continue;
            }
        }

        if next.is_ascii_digit() {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            let digits: String = chars[i + 1..j].iter().collect();
            if let Ok(n) = digits.parse::<u32>() {
                out.push_str(m.group(n).unwrap_or(""));
                i = j;
                continue;
            }
        }

        if let Some(literal) = simple_escape(next) {
            out.push(literal);
            i += 2;
            continue;
        }

        if let Some((value, consumed)) = hex_escape(&chars[i..]) {
            out.push(value);
            i += consumed;
            continue;
        }

        out.push(c);
        out.push(next);
        i += 2;
    }
    out
}

fn simple_escape(c: char) -> Option<char> {
    match c {
        'a' => Some('\u{07}'),
        'b' => Some('\u{08}'),
        'f' => Some('\u{0C}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\u{0B}'),
        '\\' => Some('\\'),
        _ => None,
    }
}

/// Parses `\xHH`, `\uHHHH` or `\UHHHHHHHH` at the start of `rest` (which
/// begins with the leading `\`). Returns the decoded char and the number
/// of source chars consumed.
fn hex_escape(rest: &[char]) -> Option<(char, usize)> {
    let (kind, digit_count) = match rest.get(1)? {
        'x' => ('x', 2),
        'u' => ('u', 4),
        'U' => ('U', 8),
        _ => return None,
    };
    let _ = kind;
    let digits: String = rest.get(2..2 + digit_count)?.iter().collect();
    if digits.len() != digit_count {
        return None;
    }
    let value = u32::from_str_radix(&digits, 16).ok()?;
    let ch = char::from_u32(value)?;
    Some((ch, 2 + digit_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullmatch_requires_reaching_end_of_text() {
        let re = Pattern::new("lo*l").unwrap();
        assert!(re.fullmatch("looool").is_some());
        assert!(re.fullmatch("lolo").is_none());
    }

    #[test]
    fn bounded_repetition_rejects_out_of_range_counts() {
        let re = Pattern::new("a{2,3}").unwrap();
        assert!(re.fullmatch("a").is_none());
        assert!(re.fullmatch("aa").is_some());
        assert!(re.fullmatch("aaa").is_some());
        assert!(re.fullmatch("aaaa").is_none());
    }

    #[test]
    fn finditer_yields_three_non_overlapping_matches() {
        let re = Pattern::new("aa").unwrap();
        let spans: Vec<(usize, usize)> = re.finditer("aaaaaaa").map(|m| m.span(0u32).unwrap()).collect();
        assert_eq!(spans, vec![(0, 2), (2, 4), (4, 6)]);
    }

    #[test]
    fn findall_with_two_groups_yields_tuples() {
        let re = Pattern::new(r"(\w+)=(\d+)").unwrap();
        let items = re.findall("set width=20 and height=10");
        assert_eq!(
            items,
            vec![
                FindAllItem::Groups(vec![Some("width".into()), Some("20".into())]),
                FindAllItem::Groups(vec![Some("height".into()), Some("10".into())]),
            ]
        );
    }

    #[test]
    fn split_keeps_captured_separators() {
        let re = Pattern::new(r"(\W+)").unwrap();
        let pieces: Vec<Option<String>> = re.split("Words, words, words.", 0);
        let expected: Vec<Option<String>> = ["Words", ", ", "words", ", ", "words", ".", ""]
            .into_iter()
            .map(|s| Some(s.to_string()))
            .collect();
        assert_eq!(pieces, expected);
    }

    #[test]
    fn split_respects_maxsplit() {
        let re = Pattern::new(r"\W+").unwrap();
        let pieces: Vec<Option<String>> = re.split("Words, words, words.", 1);
        assert_eq!(pieces, vec![Some("Words".to_string()), Some("words, words.".to_string())]);
    }

    #[test]
    fn split_with_alternation_yields_none_for_non_participating_groups() {
        let re = Pattern::new(r"([a-z]+)|([0-9]+)").unwrap();
        let pieces = re.split("abc.132.def", 0);
        let expected: Vec<Option<String>> = vec![
            Some("".into()),
            Some("abc".into()),
            None,
            Some(".".into()),
            None,
            Some("132".into()),
            Some(".".into()),
            Some("def".into()),
            None,
            Some("".into()),
        ];
        assert_eq!(pieces, expected);
    }

    #[test]
    fn sub_replaces_every_match_with_template() {
        let re = Pattern::new(r"\d+").unwrap();
        assert_eq!(re.sub(Replacement::Template("#"), "a1b22c333", 0), "a#b#c#");
    }

    #[test]
    fn subn_reports_replacement_count_and_respects_limit() {
        let re = Pattern::new(r"\d+").unwrap();
        let (text, n) = re.subn(Replacement::Template("#"), "a1b22c333", 2);
        assert_eq!((text.as_str(), n), ("a#b#c333", 2));
    }

    #[test]
    fn sub_with_callback_sees_each_match() {
        let re = Pattern::new(r"[a-z]+").unwrap();
        let upper = |m: &Match| m.group(0u32).unwrap_or_default().to_uppercase();
        assert_eq!(re.sub(Replacement::Callback(&upper), "ab cd", 0), "AB CD");
    }

    #[test]
    fn expand_handles_named_numbered_and_escape_references() {
        let re = Pattern::new(r"(?P<year>\d{4})-(?P<month>\d{2})").unwrap();
        let m = re.search("2024-07").unwrap();
        assert_eq!(m.expand(r"\g<year>/\g<month> (\1)"), "2024/07 (2024)");
        assert_eq!(m.expand(r"\n\t"), "\n\t");
    }

    #[test]
    fn ignorecase_folds_matching_but_preserves_original_text() {
        let re = Pattern::compile("abc", PatternFlags::IGNORECASE).unwrap();
        let m = re.search("xxABCyy").unwrap();
        assert_eq!(m.group(0u32), Some("ABC"));
    }

    #[test]
    fn builder_supports_flags_and_epsilon_elimination_toggle() {
        let re = Pattern::builder("a+").flags(PatternFlags::NOFLAG).eliminate_epsilons(false).build().unwrap();
        assert!(re.fullmatch("aaa").is_some());
    }
}
