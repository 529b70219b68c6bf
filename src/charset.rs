//! Immutable sets of code points, represented as sorted, disjoint,
//! non-adjacent half-open ranges `[lo, hi)`, plus a `complement` flag
//! meaning "the set is the complement of these ranges over the universe
//! of code points plus the boundary sentinel `-1`".
//!
//! Modeled on `automata/rangeset.py` from the Python implementation this
//! engine is grounded on: same normalization rule (sort, then merge
//! touching/overlapping intervals), same complement-flag trick for `.`
//! and `[^...]`, same binary-search membership test.

use itertools::Itertools;

/// A code point used as a transition predicate operand. Non-negative values
/// are real code points; [`RangeSet::EOF`] (`-1`) is the boundary sentinel
/// for "before start of input" / "after end of input".
pub type CodePoint = i32;

/// A canonical, immutable set of code points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeSet {
    ranges: Vec<(CodePoint, CodePoint)>,
    complement: bool,
}

impl RangeSet {
    /// The sentinel standing in for "no character" at either edge of the
    /// input (before position 0, or at/after the end of the text).
    pub const EOF: CodePoint = -1;

    /// The empty set.
    pub fn empty() -> Self {
        RangeSet { ranges: Vec::new(), complement: false }
    }

    /// The set of all code points (and not the sentinel).
    pub fn all() -> Self {
        RangeSet { ranges: Vec::new(), complement: true }
    }

    pub fn from_values(values: impl IntoIterator<Item = CodePoint>) -> Self {
        Self::from_ranges(values.into_iter().map(|v| (v, v + 1)))
    }

    pub fn from_ranges(ranges: impl IntoIterator<Item = (CodePoint, CodePoint)>) -> Self {
        let mut rs: Vec<_> = ranges.into_iter().collect();
        rs.sort_unstable();
        RangeSet { ranges: Self::merge_sorted(rs), complement: false }
    }

    /// Returns the complement of this set (toggles the `complement` flag;
    /// does not touch the underlying ranges).
    pub fn complemented(mut self) -> Self {
        self.complement = !self.complement;
        self
    }

    fn merge_sorted(sorted: Vec<(CodePoint, CodePoint)>) -> Vec<(CodePoint, CodePoint)> {
        let mut out: Vec<(CodePoint, CodePoint)> = Vec::with_capacity(sorted.len());
        for (lo, hi) in sorted {
            if lo >= hi {
                continue; // empty subrange
            }
            match out.last_mut() {
                Some((_, last_hi)) if lo <= *last_hi => {
                    if hi > *last_hi {
                        *last_hi = hi;
                    }
                }
                _ => out.push((lo, hi)),
            }
        }
        out
    }

    pub fn ranges(&self) -> &[(CodePoint, CodePoint)] {
        &self.ranges
    }

    pub fn is_complement(&self) -> bool {
        self.complement
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty() && !self.complement
    }

    /// Binary search over `ranges` by `lo`, per spec §4.1.
    pub fn contains(&self, c: CodePoint) -> bool {
        let idx = self.ranges.partition_point(|&(lo, _)| lo <= c);
        let found = idx
            .checked_sub(1)
            .map(|i| {
                let (lo, hi) = self.ranges[i];
                c >= lo && c < hi
            })
            .unwrap_or(false);
        found != self.complement
    }

    /// Union of two non-complemented sets. Mixing complement polarities is
    /// never needed by this engine (bracket expressions only ever union
    /// non-complemented pieces and complement the whole class once, via a
    /// leading `^`), so that's the only combination implemented, matching
    /// `RangeSet.__or__` in the original source.
    pub fn union(&self, other: &RangeSet) -> RangeSet {
        debug_assert!(!self.complement && !other.complement);
        let merged = self
            .ranges
            .iter()
            .chain(other.ranges.iter())
            .copied()
            .sorted_unstable()
            .collect();
        RangeSet { ranges: Self::merge_sorted(merged), complement: false }
    }
}

pub fn word() -> RangeSet {
    RangeSet::from_ranges([
        (b'a' as CodePoint, b'z' as CodePoint + 1),
        (b'A' as CodePoint, b'Z' as CodePoint + 1),
        (b'0' as CodePoint, b'9' as CodePoint + 1),
    ])
    .union(&RangeSet::from_values([b'_' as CodePoint]))
}

pub fn nonword() -> RangeSet {
    word().complemented()
}

pub fn digit() -> RangeSet {
    RangeSet::from_ranges([(b'0' as CodePoint, b'9' as CodePoint + 1)])
}

pub fn nondigit() -> RangeSet {
    digit().complemented()
}

/// Matches `WHITESPACE_RANGESET` in the original source verbatim. That
/// Python set is built from `map(ord, "...\u2000-\u200a...")`, a plain
/// string literal iterated character by character rather than a character
/// range, so its members are the ASCII whitespace chars plus U+00A0,
/// U+1680, U+2000, the literal `-` (U+002D), U+200A, U+2028, U+2029,
/// U+202F, U+205F, U+3000 and U+FEFF -- not the codepoints strictly
/// between U+2000 and U+200A.
pub fn whitespace() -> RangeSet {
    let values = [
        0x0c, 0x0a, 0x0d, 0x09, 0x0b, 0x20, 0x00a0, 0x1680, 0x2000, 0x2d, 0x200a, 0x2028, 0x2029, 0x202f, 0x205f,
        0x3000, 0xfeff,
    ]
    .map(|c| c as CodePoint);
    RangeSet::from_values(values)
}

pub fn nonwhitespace() -> RangeSet {
    whitespace().complemented()
}

pub fn eof() -> RangeSet {
    RangeSet::from_values([RangeSet::EOF])
}

/// Lowers a single code point the way `IGNORECASE` lowers literals and
/// bracket-range endpoints at compile time, and the input text at match
/// time (spec §4.2, §4.6). No full Unicode case folding (e.g. `ß`) is
/// attempted, matching spec §9.
pub fn to_lower(c: CodePoint) -> CodePoint {
    if c < 0 {
        return c;
    }
    match char::from_u32(c as u32) {
        Some(ch) => ch.to_lowercase().next().map(|c| c as CodePoint).unwrap_or(c),
        None => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_overlapping_and_touching_ranges() {
        let a = RangeSet::from_ranges([(0, 5), (3, 8), (8, 10)]);
        let b = RangeSet::from_ranges([(0, 10)]);
        assert_eq!(a, b);
    }

    #[test]
    fn membership_respects_complement() {
        let digits = digit();
        assert!(digits.contains('5' as CodePoint));
        assert!(!digits.contains('a' as CodePoint));

        let nondigits = nondigit();
        assert!(!nondigits.contains('5' as CodePoint));
        assert!(nondigits.contains('a' as CodePoint));
        assert!(nondigits.contains(RangeSet::EOF));
    }

    #[test]
    fn word_includes_underscore_and_alnum() {
        let w = word();
        for c in "azAZ09_".chars() {
            assert!(w.contains(c as CodePoint), "{c} should be a word char");
        }
        assert!(!w.contains(' ' as CodePoint));
    }

    #[test]
    fn union_merges_and_dedups() {
        let a = RangeSet::from_ranges([(0, 3)]);
        let b = RangeSet::from_ranges([(2, 5)]);
        assert_eq!(a.union(&b), RangeSet::from_ranges([(0, 5)]));
    }

    #[test]
    fn equal_sets_built_from_different_range_lists_compare_equal() {
        let a = RangeSet::from_values([1, 2, 3, 4]);
        let b = RangeSet::from_ranges([(1, 3), (3, 5)]);
        assert_eq!(a, b);
    }
}
