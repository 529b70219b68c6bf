/*!
A linear-time regular expression engine with capturing groups and
zero-width assertions.

`pike-regex` compiles a pattern through a small front end (tokenizer ->
recursive-descent parser -> AST processor) into a Thompson-style NFA,
then matches it against text with a parallel-state ("Pike VM") simulator
that reports leftmost-longest, non-overlapping matches. It deliberately
does not support backreferences, lookaround, possessive/lazy
quantifiers, Unicode properties beyond ASCII `\w`/`\d`/`\s`, or
conditional patterns — every match it finds comes from a state machine
with size bounded by the pattern, not from backtracking.

# Example

```
use pike_regex::Pattern;

let re = Pattern::new(r"(?P<user>[a-z0-9._%+-]+)@(?P<host>[a-z0-9.-]+)").unwrap();
let m = re.search("contact: alice@example.com today").unwrap();
assert_eq!(m.group(0u32), Some("alice@example.com"));
assert_eq!(m.group("user"), Some("alice"));
assert_eq!(m.group("host"), Some("example.com"));
```

Crate-root functions (e.g. [`search`], [`findall`]) mirror the methods
on [`Pattern`] for one-off uses that don't need to keep a compiled
pattern around.
*/

#![cfg_attr(feature = "doc", doc = document_features::document_features!())]

pub mod charset;
pub mod error;
pub mod flags;
pub mod matched;
pub mod nfa;
pub mod pattern;
pub mod syntax;
pub mod vm;

pub use error::{Error, ErrorKind, PatternError};
pub use flags::{PatternFlags, I, M, S};
pub use matched::{GroupKey, Match};
pub use pattern::{FindAllItem, FindIter, Pattern, Replacement};

/// Compiles `pattern` under `flags`, equivalent to
/// [`Pattern::compile`]. The free-function form mirrors the crate's own
/// top-level `compile`, for one-shot uses that don't keep the compiled
/// `Pattern` around.
pub fn compile(pattern: &str, flags: PatternFlags) -> Result<Pattern, PatternError> {
    Pattern::compile(pattern, flags)
}

/// Compiles `pattern` and attempts [`Pattern::fullmatch`] against `text`
/// in one call.
pub fn fullmatch(pattern: &str, text: &str, flags: PatternFlags) -> Result<Option<Match>, PatternError> {
    Ok(Pattern::compile(pattern, flags)?.fullmatch(text))
}

/// Compiles `pattern` and attempts [`Pattern::match_`] against `text` in
/// one call.
pub fn match_(pattern: &str, text: &str, flags: PatternFlags) -> Result<Option<Match>, PatternError> {
    Ok(Pattern::compile(pattern, flags)?.match_(text))
}

/// Compiles `pattern` and attempts [`Pattern::search`] against `text` in
/// one call.
pub fn search(pattern: &str, text: &str, flags: PatternFlags) -> Result<Option<Match>, PatternError> {
    Ok(Pattern::compile(pattern, flags)?.search(text))
}

/// Compiles `pattern` and runs [`Pattern::findall`] against `text` in one
/// call.
pub fn findall(pattern: &str, text: &str, flags: PatternFlags) -> Result<Vec<FindAllItem>, PatternError> {
    Ok(Pattern::compile(pattern, flags)?.findall(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_search_matches_pattern_method() {
        let direct = Pattern::new(r"\d+").unwrap().search("room 42").unwrap();
        let via_free_fn = search(r"\d+", "room 42", PatternFlags::NOFLAG).unwrap().unwrap();
        assert_eq!(direct.group(0u32), via_free_fn.group(0u32));
    }

    #[test]
    fn top_level_compile_surfaces_pattern_errors() {
        assert!(compile("a(b", PatternFlags::NOFLAG).is_err());
    }
}
