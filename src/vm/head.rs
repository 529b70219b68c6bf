//! Simulator state (spec §3 "Head", §4.6): one parallel NFA evaluation,
//! carrying its own in-progress capture record. Modeled on
//! `NFAEvaluator.Head` in `regex/nfa_evaluator.py`, generalized from a
//! per-lineage state *set* to one explicit head per `(state, captures)`
//! combination so capture groups can be tracked precisely.

use crate::nfa::StateId;

/// One capturing group's span while being matched. `end = None` while the
/// group is still open (its closing transition hasn't been taken yet).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupSpan {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl GroupSpan {
    pub fn unmatched() -> Self {
        GroupSpan { start: None, end: None }
    }

    pub fn span(&self) -> Option<(usize, usize)> {
        match (self.start, self.end) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        }
    }
}

/// `groups` is indexed by group number, sized `max_group_number + 1` so
/// group 0 (the whole match, per the group-0 wrap in §4.4) lives at index 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Head {
    pub state: StateId,
    pub start: usize,
    pub position: usize,
    pub groups: Vec<GroupSpan>,
}

impl Head {
    pub fn new(state: StateId, start: usize, group_count: usize) -> Self {
        Head { state, start, position: start, groups: vec![GroupSpan::unmatched(); group_count] }
    }
}
