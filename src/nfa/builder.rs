//! Thompson-style AST -> NFA translation (spec §4.5), modeled on
//! `regex/nfa_builder.py`, extended with boundary assertions and capturing
//! groups which that module didn't yet have.

use std::collections::HashSet;

use crate::charset;
use crate::syntax::ast::Ast;
use crate::syntax::token::BoundaryKind;

use super::automaton::Nfa;
use super::transition::{Transition, TransitionPredicate};

/// Builds the ε-eliminated NFA for a processed (group-0-wrapped, already
/// desugared) AST.
pub fn build(ast: &Ast) -> Nfa {
    build_with_options(ast, true)
}

/// [`build`], optionally skipping ε-elimination — used by
/// `Pattern::builder().eliminate_epsilons(false)` to exercise the
/// simulator directly against the raw Thompson construction.
pub fn build_with_options(ast: &Ast, eliminate_epsilons: bool) -> Nfa {
    let nfa = convert(ast);
    if eliminate_epsilons {
        nfa.eliminate_trivial_epsilons()
    } else {
        nfa
    }
}

fn convert(node: &Ast) -> Nfa {
    match node {
        Ast::Empty => Nfa::single_state(0, true),
        Ast::CharacterSet { set, label } => {
            let mut nfa = Nfa::single_state(0, false);
            nfa.states.push(1);
            nfa.final_states = HashSet::from([1]);
            nfa.add_transition(0, Transition::consume(set.clone(), label.clone()), 1);
            nfa
        }
        Ast::BoundaryAssertion { kind } => {
            let mut nfa = Nfa::single_state(0, false);
            nfa.states.push(1);
            nfa.final_states = HashSet::from([1]);
            let predicates = boundary_predicates(*kind);
            nfa.add_transition(0, Transition::boundary(predicates, format!("{kind:?}")), 1);
            nfa
        }
        Ast::Concat(u, v) => Nfa::concat(&convert(u), &convert(v)),
        Ast::Union(u, v) => Nfa::union(&convert(u), &convert(v)),
        Ast::Iteration(u) => Nfa::iteration(&convert(u)),
        Ast::Group { number, inner, .. } => Nfa::group(&convert(inner), *number),
        Ast::Repetition { .. } => {
            unreachable!("bounded Repetition nodes are desugared before NFA construction")
        }
    }
}

fn boundary_predicates(kind: BoundaryKind) -> Vec<TransitionPredicate> {
    let word = charset::word();
    let nonword = charset::nonword();
    let eof = charset::eof();
    match kind {
        BoundaryKind::InputStart => vec![TransitionPredicate { previous: Some(eof), next: None }],
        BoundaryKind::InputEnd => vec![TransitionPredicate { previous: None, next: Some(eof) }],
        BoundaryKind::LineStart => {
            let set = charset::eof().union(&charset::RangeSet::from_values([b'\n' as charset::CodePoint]));
            vec![TransitionPredicate { previous: Some(set), next: None }]
        }
        BoundaryKind::LineEnd => {
            let set = charset::eof().union(&charset::RangeSet::from_values([b'\n' as charset::CodePoint]));
            vec![TransitionPredicate { previous: None, next: Some(set) }]
        }
        BoundaryKind::WordBoundary => vec![
            TransitionPredicate { previous: Some(word.clone()), next: Some(nonword.clone()) },
            TransitionPredicate { previous: Some(word), next: Some(eof.clone()) },
            TransitionPredicate { previous: Some(nonword.clone()), next: Some(charset::word()) },
            TransitionPredicate { previous: Some(eof), next: Some(charset::word()) },
        ],
        BoundaryKind::NonWordBoundary => vec![
            TransitionPredicate { previous: Some(word.clone()), next: Some(word) },
            TransitionPredicate { previous: Some(nonword.clone()), next: Some(nonword.clone()) },
            TransitionPredicate { previous: Some(nonword), next: Some(eof.clone()) },
            TransitionPredicate { previous: Some(eof), next: Some(charset::nonword()) },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::PatternFlags;
    use crate::syntax::{parser, processor, tokenizer};

    fn build_pattern(pattern: &str) -> Nfa {
        let tokens = tokenizer::tokenize(pattern, PatternFlags::NOFLAG).unwrap().tokens;
        let raw = parser::parse(tokens).unwrap().ast;
        let processed = processor::process(raw);
        build(&processed.ast)
    }

    #[test]
    fn wrapped_pattern_has_exactly_one_final_state() {
        let nfa = build_pattern("a(b|c)*d");
        assert_eq!(nfa.final_states.len(), 1);
    }

    #[test]
    fn states_are_pruned_to_reachable_set() {
        let nfa = build_pattern("ab");
        for s in nfa.transitions.keys() {
            assert!(nfa.states.contains(s));
        }
    }
}
