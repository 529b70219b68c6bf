//! Desugars bounded repetition into `Concat`/`Union`/`Iteration`, folds
//! trivial `Empty` nodes, and wraps the result in group 0 (spec §4.4),
//! modeled on `parser/ast_processor.py`.

use super::ast::Ast;

pub struct ProcessedAst {
    pub ast: Ast,
    pub max_group_number: u32,
}

pub fn process(raw_ast: Ast) -> ProcessedAst {
    let converted = convert(raw_ast);
    let wrapped = Ast::group(0, None, converted);
    let max_group_number = max_group_number(&wrapped).unwrap_or(0);
    ProcessedAst { ast: wrapped, max_group_number }
}

fn convert(node: Ast) -> Ast {
    match node {
        Ast::Empty => Ast::Empty,
        Ast::CharacterSet { .. } => node,
        Ast::BoundaryAssertion { .. } => node,
        Ast::Iteration(inner) => {
            let u = convert(*inner);
            match u {
                Ast::Empty => Ast::Empty,
                _ => Ast::iteration(u),
            }
        }
        Ast::Repetition { inner, min, max } => convert_repetition(convert(*inner), min, max),
        Ast::Union(u, v) => {
            let u = convert(*u);
            let v = convert(*v);
            if let (Ast::Empty, Ast::Empty) = (&u, &v) {
                Ast::Empty
            } else {
                Ast::union(u, v)
            }
        }
        Ast::Concat(u, v) => {
            let u = convert(*u);
            let v = convert(*v);
            match (u, v) {
                (Ast::Empty, w) => w,
                (w, Ast::Empty) => w,
                (u, v) => Ast::concat(u, v),
            }
        }
        Ast::Group { number, name, inner } => Ast::group(number, name, convert(*inner)),
    }
}

/// `x{m,n}` desugaring (spec §4.4):
/// - `x{0,inf}` -> `Iteration(x)`
/// - `x{m,inf}` -> `Concat(x^m, Iteration(x))`
/// - `x{m,n}`   -> `Concat(x^m, prefix(x, n-m))`, "0 to n-m copies of x".
fn convert_repetition(inner: Ast, min: u32, max: Option<u32>) -> Ast {
    let root = match max {
        None if min == 0 => Ast::iteration(inner),
        None => Ast::concat(iterated_concatenation(&inner, min), Ast::iteration(inner)),
        Some(mx) => Ast::concat(iterated_concatenation(&inner, min), iterated_prefix(&inner, mx - min)),
    };
    convert(root)
}

/// `x^n`: `n` concatenated copies of `node` (0 copies == `Empty`).
fn iterated_concatenation(node: &Ast, n: u32) -> Ast {
    let mut output = Ast::Empty;
    for _ in 0..n {
        output = Ast::concat(output, node.clone());
    }
    output
}

/// "0 to `n` copies of `node`", nested `n` deep.
fn iterated_prefix(node: &Ast, n: u32) -> Ast {
    let mut output = Ast::Empty;
    for _ in 0..n {
        output = Ast::union(Ast::Empty, Ast::concat(node.clone(), output));
    }
    output
}

fn max_group_number(node: &Ast) -> Option<u32> {
    let mut result: Option<u32> = None;
    for child in node.children() {
        if let Some(v) = max_group_number(child) {
            result = Some(result.map_or(v, |r| r.max(v)));
        }
    }
    if let Ast::Group { number, .. } = node {
        result = Some(result.map_or(*number, |r| r.max(*number)));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::PatternFlags;
    use crate::syntax::{parser, tokenizer};

    fn process_pattern(pattern: &str) -> ProcessedAst {
        let tokens = tokenizer::tokenize(pattern, PatternFlags::NOFLAG).unwrap().tokens;
        let raw = parser::parse(tokens).unwrap().ast;
        process(raw)
    }

    #[test]
    fn root_is_wrapped_in_group_zero() {
        let out = process_pattern("a");
        assert!(matches!(out.ast, Ast::Group { number: 0, .. }));
    }

    #[test]
    fn star_desugars_to_plain_iteration() {
        let out = process_pattern("a*");
        let Ast::Group { inner, .. } = out.ast else { panic!() };
        assert!(matches!(*inner, Ast::Iteration(_)));
    }

    #[test]
    fn bounded_repetition_has_no_remaining_repetition_nodes() {
        let out = process_pattern("a{2,3}");
        fn has_repetition(node: &Ast) -> bool {
            matches!(node, Ast::Repetition { .. }) || node.children().iter().any(|c| has_repetition(c))
        }
        assert!(!has_repetition(&out.ast));
    }

    #[test]
    fn max_group_number_counts_user_groups() {
        let out = process_pattern("(a)(b(c))");
        assert_eq!(out.max_group_number, 3);
    }

    #[test]
    fn max_group_number_is_zero_without_user_groups() {
        let out = process_pattern("abc");
        assert_eq!(out.max_group_number, 0);
    }

    #[test]
    fn empty_concat_folds_away() {
        // "(?:)" conceptually an empty non-capturing group concatenated with "a"
        let out = process_pattern("(?:)a");
        let Ast::Group { inner, .. } = out.ast else { panic!() };
        assert!(matches!(*inner, Ast::CharacterSet { .. }));
    }
}
