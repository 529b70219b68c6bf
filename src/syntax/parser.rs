//! Recursive-descent LL(1) parser over the token stream (spec §4.3),
//! modeled on `parser/parser.py`.
//!
//! ```text
//! E  -> F E'            E' -> "|" E | eps
//! F  -> G F'            F' -> G F' | eps
//! G  -> H G'            G' -> Repetition | eps
//! H  -> "(" E ")" | a
//! ```

use std::collections::HashMap;

use crate::error::Error;

use super::ast::Ast;
use super::token::Token;

pub struct ParseOutput {
    pub ast: Ast,
    pub name_to_group_number: HashMap<String, u32>,
}

pub fn parse(tokens: Vec<Token>) -> Result<ParseOutput, Error> {
    Parser { tokens, pos: 0, last_end: 0, names: HashMap::new() }.parse()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    last_end: usize,
    names: HashMap<String, u32>,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        self.last_end = t.span().end;
        self.pos += 1;
        t
    }

    fn starts_atom(&self) -> bool {
        matches!(self.peek(), Some(Token::LPar { .. }) | Some(Token::CharacterSet { .. }) | Some(Token::BoundaryAssertion { .. }))
    }

    fn error_here(&self, message: impl Into<String>) -> Error {
        let position = self.peek().map(|t| t.span().start).unwrap_or(self.last_end);
        Error::parser(message, position)
    }

    fn parse(mut self) -> Result<ParseOutput, Error> {
        let ast = self.parse_e()?;
        if self.peek().is_some() {
            return Err(self.error_here("unread input remaining (expected end of input)"));
        }
        Ok(ParseOutput { ast, name_to_group_number: self.names })
    }

    /// `E -> F E'`
    fn parse_e(&mut self) -> Result<Ast, Error> {
        if !self.starts_atom() {
            return Ok(Ast::Empty);
        }
        let f = self.parse_f()?;
        if matches!(self.peek(), Some(Token::Pipe { .. })) {
            self.advance();
            let rest = self.parse_e()?;
            Ok(Ast::union(f, rest))
        } else {
            Ok(f)
        }
    }

    /// `F -> G F'`, i.e. one or more concatenated atoms.
    fn parse_f(&mut self) -> Result<Ast, Error> {
        let mut node = self.parse_g()?;
        while self.starts_atom() {
            let next = self.parse_g()?;
            node = Ast::concat(node, next);
        }
        Ok(node)
    }

    /// `G -> H G'`
    fn parse_g(&mut self) -> Result<Ast, Error> {
        let h = self.parse_h()?;
        if matches!(self.peek(), Some(Token::Repetition { .. })) {
            let Token::Repetition { min, max, .. } = self.advance() else { unreachable!() };
            Ok(Ast::Repetition { inner: Box::new(h), min, max })
        } else {
            Ok(h)
        }
    }

    /// `H -> "(" E ")" | a`
    fn parse_h(&mut self) -> Result<Ast, Error> {
        match self.peek() {
            Some(Token::LPar { .. }) => {
                let tok = self.advance();
                let Token::LPar { group_number, non_capturing, symbolic_name, .. } = tok else { unreachable!() };
                let inner = self.parse_e()?;
                match self.peek() {
                    Some(Token::RPar { .. }) => {
                        self.advance();
                    }
                    _ => return Err(self.error_here("expected ')'")),
                }
                if non_capturing {
                    Ok(inner)
                } else {
                    let number = group_number.expect("capturing LPar always carries a group number");
                    if let Some(name) = symbolic_name.clone() {
                        self.names.insert(name, number);
                    }
                    Ok(Ast::group(number, symbolic_name, inner))
                }
            }
            Some(Token::CharacterSet { .. }) => {
                let tok = self.advance();
                let Token::CharacterSet { set, text, .. } = tok else { unreachable!() };
                Ok(Ast::CharacterSet { set, label: text })
            }
            Some(Token::BoundaryAssertion { .. }) => {
                let tok = self.advance();
                let Token::BoundaryAssertion { kind, .. } = tok else { unreachable!() };
                Ok(Ast::BoundaryAssertion { kind })
            }
            Some(other) => Err(self.error_here(format!("expected '(' or an atom, found {}", other.kind_name()))),
            None => Err(self.error_here("expected '(' or an atom, found end of input")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::PatternFlags;
    use crate::syntax::tokenizer::tokenize;

    fn parse_pattern(pattern: &str) -> Ast {
        let tokens = tokenize(pattern, PatternFlags::NOFLAG).unwrap().tokens;
        parse(tokens).unwrap().ast
    }

    #[test]
    fn union_of_concatenations() {
        let ast = parse_pattern("ab|c");
        assert!(matches!(ast, Ast::Union(..)));
    }

    #[test]
    fn group_wraps_inner_ast() {
        let ast = parse_pattern("(ab)");
        assert!(matches!(ast, Ast::Group { number: 1, .. }));
    }

    #[test]
    fn non_capturing_group_does_not_wrap() {
        let ast = parse_pattern("(?:ab)");
        assert!(matches!(ast, Ast::Concat(..)));
    }

    #[test]
    fn named_group_is_recorded() {
        let tokens = tokenize("(?P<year>a)", PatternFlags::NOFLAG).unwrap().tokens;
        let out = parse(tokens).unwrap();
        assert_eq!(out.name_to_group_number.get("year"), Some(&1));
    }

    #[test]
    fn empty_alternative_is_empty_ast() {
        let ast = parse_pattern("a|");
        let Ast::Union(_, rhs) = ast else { panic!("expected union") };
        assert!(matches!(*rhs, Ast::Empty));
    }

    #[test]
    fn trailing_input_after_unbalanced_paren_is_an_error() {
        let tokens = tokenize("(a))", PatternFlags::NOFLAG).unwrap().tokens;
        assert!(parse(tokens).is_err());
    }
}
