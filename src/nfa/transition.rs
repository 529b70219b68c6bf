//! NFA transition labels (spec §3 "Transition"): character-class
//! predicates, boundary predicates, and group-boundary tags.

use crate::charset::{CodePoint, RangeSet};

/// One `(previous, next)` operand pair. The predicate holds iff every
/// specified side contains its character; `None` means "unconstrained".
/// Both sides `None` is the "trivial ε" predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionPredicate {
    pub previous: Option<RangeSet>,
    pub next: Option<RangeSet>,
}

impl TransitionPredicate {
    pub fn trivial() -> Self {
        TransitionPredicate { previous: None, next: None }
    }

    pub fn next_in(set: RangeSet) -> Self {
        TransitionPredicate { previous: None, next: Some(set) }
    }

    pub fn is_trivial(&self) -> bool {
        self.previous.is_none() && self.next.is_none()
    }

    pub fn matches(&self, c_previous: CodePoint, c_next: CodePoint) -> bool {
        let prev_ok = self.previous.as_ref().map_or(true, |s| s.contains(c_previous));
        let next_ok = self.next.as_ref().map_or(true, |s| s.contains(c_next));
        prev_ok && next_ok
    }
}

/// A single NFA transition label. A transition matches iff **any** of its
/// predicates holds (empty predicate list means unconditional-true).
/// `consume_char = false` means the transition is zero-width.
/// `begin_group`/`end_group` mark capture-boundary actions performed when
/// the transition is taken.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Transition {
    pub predicates: Vec<TransitionPredicate>,
    pub consume_char: bool,
    pub begin_group: Option<u32>,
    pub end_group: Option<u32>,
    pub label: String,
}

impl Transition {
    pub fn trivial_epsilon() -> Self {
        Transition::default()
    }

    pub fn consume(set: RangeSet, label: String) -> Self {
        Transition {
            predicates: vec![TransitionPredicate::next_in(set)],
            consume_char: true,
            begin_group: None,
            end_group: None,
            label,
        }
    }

    pub fn boundary(predicates: Vec<TransitionPredicate>, label: String) -> Self {
        Transition { predicates, consume_char: false, begin_group: None, end_group: None, label }
    }

    pub fn begin_group(number: u32) -> Self {
        Transition { begin_group: Some(number), label: format!("({number}"), ..Transition::default() }
    }

    pub fn end_group(number: u32) -> Self {
        Transition { end_group: Some(number), label: format!("){number}"), ..Transition::default() }
    }

    /// A transition is eliminated during ε-elimination (spec §4.5) iff it
    /// is zero-width, carries no group marker, and its predicate is
    /// unconditionally true (empty list, or a single trivial predicate).
    pub fn is_trivial_epsilon(&self) -> bool {
        !self.consume_char
            && self.begin_group.is_none()
            && self.end_group.is_none()
            && (self.predicates.is_empty() || self.predicates.iter().all(|p| p.is_trivial()))
    }

    pub fn matches(&self, c_previous: CodePoint, c_next: CodePoint) -> bool {
        if self.predicates.is_empty() {
            true
        } else {
            self.predicates.iter().any(|p| p.matches(c_previous, c_next))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_epsilon_has_no_predicates_and_no_marks() {
        assert!(Transition::trivial_epsilon().is_trivial_epsilon());
    }

    #[test]
    fn group_marker_is_not_trivial() {
        assert!(!Transition::begin_group(1).is_trivial_epsilon());
    }

    #[test]
    fn consuming_transition_is_not_trivial() {
        let t = Transition::consume(RangeSet::from_values([b'a' as CodePoint]), "a".into());
        assert!(!t.is_trivial_epsilon());
        assert!(t.matches(-1, b'a' as CodePoint));
        assert!(!t.matches(-1, b'b' as CodePoint));
    }
}
