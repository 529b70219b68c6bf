//! Error taxonomy, modeled on `errors.py`: three distinguishable syntax
//! error kinds, plus [`PatternError`], the compile-time wrapper that adds
//! the multi-line caret diagnostic (spec §7).

use std::fmt;

/// Which stage of the front end rejected the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed syntax the tokenizer rejects outright (unterminated
    /// escape, malformed character class, malformed `{m,n}`, unclosed
    /// `(?...)` comment, empty/duplicate group name).
    Tokenizer,
    /// Syntactically recognizable but intentionally unimplemented
    /// (backreferences, lookaround, lazy/possessive quantifiers, `\u \U \x
    /// \N`, escapes inside `[...]`).
    Unsupported,
    /// The token stream does not match the grammar (leftover input,
    /// unexpected token).
    Parser,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Tokenizer => "tokenizer",
            ErrorKind::Unsupported => "unsupported syntax",
            ErrorKind::Parser => "parser",
        };
        f.write_str(s)
    }
}

/// A syntax error detected while compiling a pattern, carrying the 0-based
/// position in the pattern string at which the problem was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    position: usize,
}

impl Error {
    pub fn tokenizer(message: impl Into<String>, position: usize) -> Self {
        Error { kind: ErrorKind::Tokenizer, message: message.into(), position }
    }

    pub fn unsupported(message: impl Into<String>, position: usize) -> Self {
        Error { kind: ErrorKind::Unsupported, message: message.into(), position }
    }

    pub fn parser(message: impl Into<String>, position: usize) -> Self {
        Error { kind: ErrorKind::Parser, message: message.into(), position }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// 0-based position in the pattern string where the problem was
    /// detected.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error at position {}: {}", self.kind, self.position, self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Raised by [`crate::pattern::Pattern::compile`] when a pattern fails to
/// compile. Wraps the originating [`Error`] together with a multi-line
/// diagnostic: the message, the pattern text, and a caret pointing at
/// `error.position()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    error: Error,
    diagnostic: String,
}

impl PatternError {
    pub fn new(pattern: &str, error: Error) -> Self {
        let caret_chars: String = pattern.chars().take(error.position()).map(|_| ' ').collect();
        let diagnostic = format!("{error}\n\n{pattern}\n{caret_chars}^");
        PatternError { error, diagnostic }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn position(&self) -> usize {
        self.error.position()
    }

    /// The underlying [`Error`] this pattern error wraps.
    pub fn error(&self) -> &Error {
        &self.error
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.diagnostic)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_points_caret_at_error_position() {
        let err = Error::tokenizer("unfinished escape sequence", 3);
        let pattern_error = PatternError::new(r"ab\", err);
        let rendered = pattern_error.to_string();
        assert!(rendered.contains("unfinished escape sequence"));
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[2], r"ab\");
        assert_eq!(lines[3], "   ^");
    }
}
