//! A single reported match (spec §3 "Match", §6). Modeled on
//! `regex/match.py`'s `Match` dataclass and on the teacher's own
//! [`Match`](ib-matcher's `matcher::matches::Match`) in its accessor
//! shape, but owns its captured text as `String`s rather than borrowing
//! `&str` slices: this engine operates on `Vec<char>`/code-point indices
//! internally (matching the Python source's string semantics), so there
//! is no contiguous byte slice to borrow group spans from.

use std::ops::Index;

use crate::pattern::Pattern;
use crate::vm::RawMatch;

/// One non-overlapping match produced by [`Pattern::search`],
/// [`Pattern::match_`], [`Pattern::fullmatch`], or [`Pattern::finditer`].
///
/// Group 0 is always present and denotes the whole match.
#[derive(Debug, Clone)]
pub struct Match {
    pattern: Pattern,
    text: String,
    /// `(start, end)` code-point offsets into `text`, indexed by group
    /// number; `None` if the group did not participate in this match.
    spans: Vec<Option<(usize, usize)>>,
}

impl Match {
    pub(crate) fn new(pattern: Pattern, text: &[char], raw: RawMatch) -> Self {
        let spans = raw.groups.iter().map(|g| g.span()).collect();
        Match { pattern, text: text.iter().collect(), spans }
    }

    /// `group()`/`group(0)`: the whole match. `group(i)`/`group(name)`:
    /// the given group's text, or `None` if it didn't participate.
    pub fn group(&self, i: impl GroupKey) -> Option<&str> {
        let n = i.resolve(&self.pattern)?;
        let (start, end) = *self.spans.get(n)?.as_ref()?;
        Some(&self.text[byte_range(&self.text, start, end)])
    }

    /// `group(i1, i2, …)`: a tuple-like `Vec` of each requested group.
    pub fn group_many<K: GroupKey>(&self, keys: impl IntoIterator<Item = K>) -> Vec<Option<&str>> {
        keys.into_iter().map(|k| self.group(k)).collect()
    }

    /// Groups `1..=max_group_number`, each substituted with `default` if
    /// it did not participate.
    pub fn groups<'a>(&'a self, default: Option<&'a str>) -> Vec<Option<&'a str>> {
        (1..=self.pattern.max_group_number())
            .map(|i| self.group(i as u32).or(default))
            .collect()
    }

    /// Every named group, substituted with `default` if unmatched.
    pub fn groupdict<'a>(&'a self, default: Option<&'a str>) -> Vec<(&'a str, Option<&'a str>)> {
        self.pattern
            .group_name_to_number()
            .iter()
            .map(|(name, &number)| (name.as_str(), self.group(number).or(default)))
            .collect()
    }

    pub fn start(&self, i: impl GroupKey) -> Option<usize> {
        self.span(i).map(|(s, _)| s)
    }

    pub fn end(&self, i: impl GroupKey) -> Option<usize> {
        self.span(i).map(|(_, e)| e)
    }

    pub fn span(&self, i: impl GroupKey) -> Option<(usize, usize)> {
        let n = i.resolve(&self.pattern)?;
        *self.spans.get(n)?
    }

    /// The pattern text this match's `Pattern` was compiled from.
    pub fn string(&self) -> &str {
        self.pattern.pattern_text()
    }

    /// Expands `template`'s `\g<name-or-number>`, `\<digits>`,
    /// `\[abfnrtv\\]`, `\xHH`, `\uHHHH`, `\UHHHHHHHH` escapes against this
    /// match's captures (spec §4.7).
    pub fn expand(&self, template: &str) -> String {
        crate::pattern::expand_template(self, template)
    }
}

impl Index<u32> for Match {
    type Output = str;
    fn index(&self, i: u32) -> &str {
        self.group(i).unwrap_or_default()
    }
}

impl<'a> Index<&'a str> for Match {
    type Output = str;
    fn index(&self, name: &'a str) -> &str {
        self.group(name).unwrap_or_default()
    }
}

fn byte_range(text: &str, start_char: usize, end_char: usize) -> std::ops::Range<usize> {
    let mut iter = text.char_indices();
    let start_byte = iter.clone().nth(start_char).map(|(i, _)| i).unwrap_or(text.len());
    let end_byte = iter.nth(end_char).map(|(i, _)| i).unwrap_or(text.len());
    start_byte..end_byte
}

/// A group selector: either a numeric group index or a symbolic name
/// (spec §6 "indexing `m[i|name]`").
pub trait GroupKey {
    fn resolve(&self, pattern: &Pattern) -> Option<usize>;
}

impl GroupKey for u32 {
    fn resolve(&self, pattern: &Pattern) -> Option<usize> {
        (*self <= pattern.max_group_number()).then_some(*self as usize)
    }
}

impl GroupKey for &str {
    fn resolve(&self, pattern: &Pattern) -> Option<usize> {
        pattern.group_name_to_number().get(*self).map(|&n| n as usize)
    }
}

impl GroupKey for &String {
    fn resolve(&self, pattern: &Pattern) -> Option<usize> {
        pattern.group_name_to_number().get(self.as_str()).map(|&n| n as usize)
    }
}

#[cfg(test)]
mod tests {
    use crate::flags::PatternFlags;
    use crate::pattern::Pattern;

    #[test]
    fn group_zero_is_the_whole_match_text() {
        let p = Pattern::compile("a+", PatternFlags::NOFLAG).unwrap();
        let m = p.search("xxaaayy").unwrap();
        assert_eq!(m.group(0u32), Some("aaa"));
        assert_eq!(m.span(0u32), Some((2, 5)));
    }

    #[test]
    fn named_and_numbered_group_access_agree() {
        let p = Pattern::compile(r"(?P<word>[a-z]+)", PatternFlags::NOFLAG).unwrap();
        let m = p.search("hello").unwrap();
        assert_eq!(m.group(1u32), m.group("word"));
    }

    #[test]
    fn non_participating_group_is_none() {
        let p = Pattern::compile("(a)|(b)", PatternFlags::NOFLAG).unwrap();
        let m = p.search("b").unwrap();
        assert_eq!(m.group(1u32), None);
        assert_eq!(m.group(2u32), Some("b"));
    }
}
