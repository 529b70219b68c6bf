//! The NFA layer: transitions, the automaton itself with Thompson-style
//! combinators and ε-elimination, and the AST -> NFA builder (spec §3 "NFA",
//! §4.5), modeled on `automata/nfa.py` and `regex/nfa_builder.py`.

pub mod automaton;
pub mod builder;
pub mod transition;

pub use automaton::{Nfa, StateId};
pub use transition::{Transition, TransitionPredicate};
