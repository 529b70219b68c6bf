//! Parallel-state NFA simulation (spec §4.6), modeled on
//! `regex/nfa_evaluator.py`'s `NFAEvaluator`.

pub mod head;
pub mod simulator;

pub use head::{GroupSpan, Head};
pub use simulator::{scan, RawMatch};
