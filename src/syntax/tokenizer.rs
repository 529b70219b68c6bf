//! Scans a pattern string into a token stream (spec §4.2), modeled on
//! `parser/tokenizer.py`. Tracks group numbering, declared symbolic group
//! names, and the effective flag set (inline `(?ims)` forms mutate it in
//! place, exactly as the Python tokenizer does).

use std::collections::HashSet;

use crate::charset::{self, CodePoint, RangeSet};
use crate::error::Error;
use crate::flags::PatternFlags;

use super::token::{BoundaryKind, Span, Token};

pub struct TokenizerOutput {
    pub tokens: Vec<Token>,
    pub flags: PatternFlags,
}

pub fn tokenize(pattern: &str, flags: PatternFlags) -> Result<TokenizerOutput, Error> {
    Tokenizer::new(pattern, flags).run()
}

struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    flags: PatternFlags,
    group_number: u32,
    group_names: HashSet<String>,
}

impl Tokenizer {
    fn new(pattern: &str, flags: PatternFlags) -> Self {
        Tokenizer {
            chars: pattern.chars().collect(),
            pos: 0,
            flags,
            group_number: 1,
            group_names: HashSet::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.pos];
        self.pos += 1;
        c
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::tokenizer(message, self.pos)
    }

    fn unsupported(&self, message: impl Into<String>) -> Error {
        Error::unsupported(message, self.pos)
    }

    fn ignorecase(&self) -> bool {
        self.flags.contains(PatternFlags::IGNORECASE)
    }

    fn fold(&self, c: char) -> CodePoint {
        let cp = c as CodePoint;
        if self.ignorecase() {
            charset::to_lower(cp)
        } else {
            cp
        }
    }

    fn run(mut self) -> Result<TokenizerOutput, Error> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '(' => {
                    if self.peek_at(1) == Some('?') {
                        if let Some(tok) = self.read_special_group()? {
                            tokens.push(tok);
                        }
                    } else {
                        tokens.push(self.read_capturing_lpar());
                    }
                }
                ')' => tokens.push(self.read_rpar()),
                '|' => tokens.push(self.read_pipe()),
                '*' => tokens.push(self.read_quantifier(0, None)?),
                '+' => tokens.push(self.read_quantifier(1, None)?),
                '?' => tokens.push(self.read_quantifier(0, Some(1))?),
                '{' => tokens.push(self.read_brace_or_literal()?),
                '.' => tokens.push(self.read_dot()),
                '[' => tokens.push(self.read_bracket()?),
                '^' | '$' => tokens.push(self.read_caret_dollar()),
                '\\' => tokens.push(self.read_escape()?),
                _ => tokens.push(self.read_literal_char()),
            }
        }
        Ok(TokenizerOutput { tokens, flags: self.flags })
    }

    fn read_capturing_lpar(&mut self) -> Token {
        let start = self.pos;
        self.advance();
        let number = self.group_number;
        self.group_number += 1;
        let end = self.pos;
        Token::LPar {
            span: Span::new(start, end),
            text: self.text(start, end),
            group_number: Some(number),
            non_capturing: false,
            symbolic_name: None,
        }
    }

    fn read_rpar(&mut self) -> Token {
        let start = self.pos;
        self.advance();
        let end = self.pos;
        Token::RPar { span: Span::new(start, end), text: self.text(start, end) }
    }

    fn read_pipe(&mut self) -> Token {
        let start = self.pos;
        self.advance();
        let end = self.pos;
        Token::Pipe { span: Span::new(start, end), text: self.text(start, end) }
    }

    fn read_quantifier(&mut self, min: u32, max: Option<u32>) -> Result<Token, Error> {
        let start = self.pos;
        self.advance();
        if matches!(self.peek(), Some('?') | Some('+')) {
            return Err(self.unsupported("lazy/possessive quantifiers are not supported"));
        }
        let end = self.pos;
        Ok(Token::Repetition { span: Span::new(start, end), text: self.text(start, end), min, max })
    }

    /// `{m,n}` / `{m,}` / `{,n}` / `{m}`. On malformed braces, restores
    /// `pos` and re-tokenizes `{` as a literal character, per spec §4.2.
    fn read_brace_or_literal(&mut self) -> Result<Token, Error> {
        let saved_pos = self.pos;
        if let Some(tok) = self.try_read_brace() {
            Ok(tok)
        } else {
            self.pos = saved_pos;
            Ok(self.read_literal_char())
        }
    }

    fn try_read_brace(&mut self) -> Option<Token> {
        let start = self.pos;
        if self.peek() != Some('{') {
            return None;
        }
        self.advance();

        let min_digits = self.read_digits();
        let min;
        let max;
        match self.peek() {
            Some(',') => {
                self.advance();
                let max_digits = self.read_digits();
                if self.peek() != Some('}') {
                    return None;
                }
                if min_digits.is_empty() && max_digits.is_empty() {
                    return None;
                }
                self.advance();
                min = if min_digits.is_empty() { 0 } else { min_digits.parse().ok()? };
                max = if max_digits.is_empty() { None } else { Some(max_digits.parse().ok()?) };
            }
            Some('}') => {
                if min_digits.is_empty() {
                    return None;
                }
                self.advance();
                min = min_digits.parse().ok()?;
                max = Some(min);
            }
            _ => return None,
        }
        if let Some(mx) = max {
            if mx < min {
                return None;
            }
        }
        let end = self.pos;
        Some(Token::Repetition { span: Span::new(start, end), text: self.text(start, end), min, max })
    }

    fn read_digits(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        s
    }

    fn read_dot(&mut self) -> Token {
        let start = self.pos;
        self.advance();
        let end = self.pos;
        let set = if self.flags.contains(PatternFlags::DOTALL) {
            RangeSet::all()
        } else {
            RangeSet::from_values([b'\n' as CodePoint]).complemented()
        };
        Token::CharacterSet { span: Span::new(start, end), text: self.text(start, end), set }
    }

    fn read_bracket(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        self.advance(); // consume '['

        let mut complement = false;
        if self.peek() == Some('^') {
            complement = true;
            self.advance();
        }

        let mut ranges: Vec<(CodePoint, CodePoint)> = Vec::new();
        let mut first = true;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated character class")),
                Some(']') if !first => {
                    self.advance();
                    break;
                }
                Some('\\') => return Err(self.unsupported("escape sequences are not supported inside character classes")),
                Some(c) => {
                    self.advance();
                    let lo = self.fold(c);
                    let is_range = self.peek() == Some('-') && !matches!(self.peek_at(1), None | Some(']'));
                    if is_range {
                        self.advance(); // consume '-'
                        let c2 = self.advance();
                        let hi = self.fold(c2);
                        if lo > hi {
                            return Err(self.error(format!("invalid character range {c}-{c2} (out of order)")));
                        }
                        ranges.push((lo, hi + 1));
                    } else {
                        ranges.push((lo, lo + 1));
                    }
                }
            }
            first = false;
        }

        let mut set = RangeSet::from_ranges(ranges);
        if complement {
            set = set.complemented();
        }
        let end = self.pos;
        Ok(Token::CharacterSet { span: Span::new(start, end), text: self.text(start, end), set })
    }

    fn read_caret_dollar(&mut self) -> Token {
        let start = self.pos;
        let c = self.advance();
        let multiline = self.flags.contains(PatternFlags::MULTILINE);
        let kind = match c {
            '^' => if multiline { BoundaryKind::LineStart } else { BoundaryKind::InputStart },
            '$' => if multiline { BoundaryKind::LineEnd } else { BoundaryKind::InputEnd },
            _ => unreachable!(),
        };
        let end = self.pos;
        Token::BoundaryAssertion { span: Span::new(start, end), text: self.text(start, end), kind }
    }

    fn read_literal_char(&mut self) -> Token {
        let start = self.pos;
        let c = self.advance();
        let end = self.pos;
        let cp = self.fold(c);
        Token::CharacterSet {
            span: Span::new(start, end),
            text: self.text(start, end),
            set: RangeSet::from_values([cp]),
        }
    }

    fn read_escape(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        self.advance(); // consume '\'
        let c = match self.peek() {
            None => return Err(self.error("unfinished escape sequence")),
            Some(c) => c,
        };

        let predefined = match c {
            'w' => Some(charset::word()),
            'W' => Some(charset::nonword()),
            'd' => Some(charset::digit()),
            'D' => Some(charset::nondigit()),
            's' => Some(charset::whitespace()),
            'S' => Some(charset::nonwhitespace()),
            _ => None,
        };
        if let Some(set) = predefined {
            self.advance();
            let end = self.pos;
            return Ok(Token::CharacterSet { span: Span::new(start, end), text: self.text(start, end), set });
        }

        let literal_control = match c {
            'a' => Some('\u{07}'),
            'f' => Some('\u{0C}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\u{0B}'),
            _ => None,
        };
        if let Some(lit) = literal_control {
            self.advance();
            let end = self.pos;
            return Ok(Token::CharacterSet {
                span: Span::new(start, end),
                text: self.text(start, end),
                set: RangeSet::from_values([lit as CodePoint]),
            });
        }

        let boundary = match c {
            'A' => Some(BoundaryKind::InputStart),
            'Z' => Some(BoundaryKind::InputEnd),
            'b' => Some(BoundaryKind::WordBoundary),
            'B' => Some(BoundaryKind::NonWordBoundary),
            _ => None,
        };
        if let Some(kind) = boundary {
            self.advance();
            let end = self.pos;
            return Ok(Token::BoundaryAssertion { span: Span::new(start, end), text: self.text(start, end), kind });
        }

        if matches!(c, 'u' | 'U' | 'x' | 'N') {
            return Err(self.unsupported(format!("\\{c} escapes are not supported")));
        }
        if c.is_ascii_digit() && c != '0' {
            return Err(self.unsupported("backreferences are not supported"));
        }

        self.advance();
        let end = self.pos;
        let cp = self.fold(c);
        Ok(Token::CharacterSet {
            span: Span::new(start, end),
            text: self.text(start, end),
            set: RangeSet::from_values([cp]),
        })
    }

    /// Dispatches on the form following `(?`. Returns `Ok(None)` for forms
    /// that mutate tokenizer state (inline flags) or are consumed silently
    /// (comments) without producing a token.
    fn read_special_group(&mut self) -> Result<Option<Token>, Error> {
        let start = self.pos;
        self.advance(); // '('
        self.advance(); // '?'

        match self.peek() {
            Some(':') => {
                self.advance();
                let end = self.pos;
                Ok(Some(Token::LPar {
                    span: Span::new(start, end),
                    text: self.text(start, end),
                    group_number: None,
                    non_capturing: true,
                    symbolic_name: None,
                }))
            }
            Some('P') if self.peek_at(1) == Some('<') => {
                self.advance(); // 'P'
                self.advance(); // '<'
                let mut name = String::new();
                loop {
                    match self.peek() {
                        None => return Err(self.error("unterminated group name")),
                        Some('>') => {
                            self.advance();
                            break;
                        }
                        Some(c) => {
                            name.push(c);
                            self.advance();
                        }
                    }
                }
                if name.is_empty() {
                    return Err(self.error("group name cannot be empty"));
                }
                if !self.group_names.insert(name.clone()) {
                    return Err(self.error(format!("duplicate group name {name:?}")));
                }
                let number = self.group_number;
                self.group_number += 1;
                let end = self.pos;
                Ok(Some(Token::LPar {
                    span: Span::new(start, end),
                    text: self.text(start, end),
                    group_number: Some(number),
                    non_capturing: false,
                    symbolic_name: Some(name),
                }))
            }
            Some('#') => {
                self.advance();
                loop {
                    match self.peek() {
                        None => return Err(self.error("unterminated (?#...) comment")),
                        Some(')') => {
                            self.advance();
                            break;
                        }
                        Some(_) => {
                            self.advance();
                        }
                    }
                }
                Ok(None)
            }
            Some('=') | Some('!') => Err(self.unsupported("lookahead is not supported")),
            Some('<') => Err(self.unsupported("lookbehind is not supported")),
            Some('>') => Err(self.unsupported("atomic groups are not supported")),
            Some('(') => Err(self.unsupported("conditional expressions are not supported")),
            Some(c) if matches!(c, 'i' | 'm' | 's' | 'I' | 'M' | 'S') => {
                loop {
                    match self.peek() {
                        Some(')') => {
                            self.advance();
                            break;
                        }
                        Some('i') | Some('I') => {
                            self.flags |= PatternFlags::IGNORECASE;
                            self.advance();
                        }
                        Some('m') | Some('M') => {
                            self.flags |= PatternFlags::MULTILINE;
                            self.advance();
                        }
                        Some('s') | Some('S') => {
                            self.flags |= PatternFlags::DOTALL;
                            self.advance();
                        }
                        _ => return Err(self.error("malformed inline flags")),
                    }
                }
                Ok(None)
            }
            _ => Err(self.error("unsupported or malformed (?...) syntax")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize_ok(pattern: &str) -> Vec<Token> {
        tokenize(pattern, PatternFlags::NOFLAG).unwrap().tokens
    }

    #[test]
    fn simple_literals_and_pipe() {
        let tokens = tokenize_ok("a|b");
        assert_eq!(tokens.len(), 3);
        assert!(matches!(tokens[1], Token::Pipe { .. }));
    }

    #[test]
    fn capturing_group_numbers_increase_left_to_right() {
        let tokens = tokenize_ok("(a(b))");
        let Token::LPar { group_number: Some(1), .. } = tokens[0] else { panic!("expected group 1") };
        let Token::LPar { group_number: Some(2), .. } = tokens[2] else { panic!("expected group 2") };
    }

    #[test]
    fn non_capturing_group_has_no_number() {
        let tokens = tokenize_ok("(?:ab)");
        let Token::LPar { group_number: None, non_capturing: true, .. } = tokens[0] else {
            panic!("expected non-capturing LPar")
        };
    }

    #[test]
    fn named_group_duplicate_name_fails() {
        let err = tokenize("(?P<x>a)(?P<x>b)", PatternFlags::NOFLAG).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Tokenizer);
    }

    #[test]
    fn malformed_brace_falls_back_to_literal() {
        let tokens = tokenize_ok("a{,}b");
        // "{,}" has no digits on either side -> malformed -> literal '{'
        assert!(matches!(&tokens[1], Token::CharacterSet { set, .. } if set.contains('{' as CodePoint)));
    }

    #[test]
    fn bounded_repetition_parses() {
        let tokens = tokenize_ok("a{2,5}");
        let Token::Repetition { min: 2, max: Some(5), .. } = tokens[1] else { panic!("expected {{2,5}}") };
    }

    #[test]
    fn lazy_quantifier_is_unsupported() {
        let err = tokenize("a*?", PatternFlags::NOFLAG).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Unsupported);
    }

    #[test]
    fn bracket_leading_bracket_and_dash_are_literal() {
        let tokens = tokenize_ok("[]a-]");
        let Token::CharacterSet { set, .. } = &tokens[0] else { panic!("expected class") };
        assert!(set.contains(']' as CodePoint));
        assert!(set.contains('a' as CodePoint));
        assert!(set.contains('-' as CodePoint));
    }

    #[test]
    fn bracket_escape_is_unsupported() {
        let err = tokenize(r"[\d]", PatternFlags::NOFLAG).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Unsupported);
    }

    #[test]
    fn backreference_is_unsupported() {
        let err = tokenize(r"(a)\1", PatternFlags::NOFLAG).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Unsupported);
    }

    #[test]
    fn inline_flags_mutate_effective_flags() {
        let out = tokenize("(?i)abc", PatternFlags::NOFLAG).unwrap();
        assert!(out.flags.contains(PatternFlags::IGNORECASE));
    }
}
