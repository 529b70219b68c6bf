//! Pattern compilation flags (spec §6), a `bitflags` bitset the way the
//! teacher workspace already depends on `bitflags` for `ib-pinyin`'s
//! `PinyinNotation`.

use bitflags::bitflags;

bitflags! {
    /// Bitset of pattern compilation flags, mirroring `regex_automata`'s
    /// `PatternFlag` (`regex/flags.py`): `IGNORECASE`, `DOTALL`,
    /// `MULTILINE`, plus their one-letter aliases.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PatternFlags: u32 {
        /// No flags set.
        const NOFLAG = 0;
        /// Case-insensitive matching: literals and bracket-range endpoints
        /// are lowered at compile time, and the haystack is lowered before
        /// matching. Predefined classes (`\w`, `\d`, `\s`) are unaffected.
        const IGNORECASE = 1 << 0;
        /// `.` matches `\n` too.
        const DOTALL = 1 << 1;
        /// `^`/`$` match at line boundaries (around every `\n`) instead of
        /// only at the start/end of the whole input.
        const MULTILINE = 1 << 2;
    }
}

/// Alias for [`PatternFlags::IGNORECASE`].
pub const I: PatternFlags = PatternFlags::IGNORECASE;
/// Alias for [`PatternFlags::DOTALL`].
pub const S: PatternFlags = PatternFlags::DOTALL;
/// Alias for [`PatternFlags::MULTILINE`].
pub const M: PatternFlags = PatternFlags::MULTILINE;
