//! Parallel-state NFA simulation with leftmost-longest match emission
//! (spec §4.6), modeled on the structure of `NFAEvaluator.finditer` in
//! `regex/nfa_evaluator.py`: a per-position loop with a zero-width-closure
//! sub-step, a character-consumption sub-step, and a second zero-width
//! closure on the next position. Generalized beyond that module in one way:
//! heads carry full per-group capture records (the Python evaluator tracked
//! state *sets* only, with no capture wiring). Match emission stays
//! per-lineage, same as the original: each `start` position has its own
//! "entered final" / "left final" bookkeeping, keyed on that `start`, so a
//! head freshly seeded at a different position for `search` mode can never
//! mask an already-final lineage leaving final.
//!
//! `scan` runs the whole window eagerly and returns every match in order;
//! callers that want a lazy [`Iterator`] (`Pattern::finditer`) wrap the
//! resulting `Vec` rather than re-deriving this state machine per `next()`
//! call, trading a small amount of up-front work for a simulator that is
//! easy to read start to finish and confirm correct by inspection.

use std::collections::{HashMap, HashSet};

use crate::charset::{CodePoint, RangeSet};
use crate::nfa::Nfa;

use super::head::{GroupSpan, Head};

/// One matched occurrence in code-point-index coordinates, not yet
/// attached to source text or a `Pattern`.
#[derive(Debug, Clone)]
pub struct RawMatch {
    pub start: usize,
    pub end: usize,
    pub groups: Vec<GroupSpan>,
}

/// Runs the simulator over `chars[start..end]` (already case-folded by the
/// caller if `IGNORECASE` is set) and returns every non-overlapping match,
/// in increasing `start` order. `search = false` anchors the only head at
/// `start` and never seeds another.
pub fn scan(nfa: &Nfa, group_count: usize, chars: &[CodePoint], start: usize, end: usize, search: bool) -> Vec<RawMatch> {
    let start = start.min(chars.len());
    let end = end.min(chars.len());

    let mut matches = Vec::new();
    let mut heads = vec![Head::new(nfa.initial_state, start, group_count)];

    // Per-`start` bookkeeping, mirroring `NFAEvaluator`'s per-`Head`
    // `entered_final`/`left_final` flags: a lineage (all heads sharing one
    // `start`) only counts as "left final" once *its own* heads have
    // stopped reaching a final state, never because some other lineage's
    // heads happen to be in final or not right now.
    let mut entered_final: HashSet<usize> = HashSet::new();
    let mut last_final_by_start: HashMap<usize, Vec<Head>> = HashMap::new();
    let mut last_match_position: Option<usize> = None;
    let mut final_at_end: HashMap<usize, Vec<Head>> = HashMap::new();

    let mut p = start;
    loop {
        if search && p > start && last_match_position.map_or(true, |lm| p >= lm) {
            heads.push(Head::new(nfa.initial_state, p, group_count));
        }

        let c_previous: CodePoint = if p == start { RangeSet::EOF } else { chars[p - 1] };
        let c_next: CodePoint = if p < end { chars[p] } else { RangeSet::EOF };

        // Step 1's zero-width closure at position `p` doubles as step 3's
        // closure for the previous position's consume: both use the
        // transitions matching `(c_previous, c_next)` at `p`, so a single
        // closure per position is enough.
        heads = zero_width_closure(nfa, heads, c_previous, c_next);

        let mut current_final_by_start: HashMap<usize, Vec<Head>> = HashMap::new();
        for h in &heads {
            if nfa.final_states.contains(&h.state) {
                current_final_by_start.entry(h.start).or_default().push(h.clone());
            }
        }

        let mut left_final: Vec<usize> =
            entered_final.iter().copied().filter(|s| !current_final_by_start.contains_key(s)).collect();
        left_final.sort_unstable();

        // At most one lineage is reported per position (matching
        // `finditer`'s "yield and return" within a single step), leftmost
        // `start` first; any other lineage that left final this step stays
        // queued and is picked up on a later position.
        if let Some(&s) = left_final.first() {
            let emitted = last_final_by_start.get(&s).and_then(|finals| pick_best(finals));
            if let Some(m) = emitted {
                let e = m.end;
                matches.push(m);
                last_match_position = Some(e);
                heads.retain(|h| h.start >= e);
                entered_final.remove(&s);
                last_final_by_start.remove(&s);
                entered_final.retain(|&st| st >= e);
                last_final_by_start.retain(|&st, _| st >= e);
                current_final_by_start.retain(|&st, _| st >= e);
            }
        }

        for (&s, hs) in &current_final_by_start {
            entered_final.insert(s);
            last_final_by_start.insert(s, hs.clone());
        }
        final_at_end = current_final_by_start;

        if p == end {
            break;
        }

        heads = consume(nfa, heads, c_previous, c_next);
        p += 1;
    }

    if let Some(&s) = final_at_end.keys().min() {
        if let Some(m) = pick_best(&final_at_end[&s]) {
            matches.push(m);
        }
    }

    matches
}

/// Among heads in the unique final state, the one with the greatest
/// `position` wins (longest extent); ties broken by the smallest `start`
/// (spec §4.6 "leftmost longest").
fn pick_best(finals: &[Head]) -> Option<RawMatch> {
    let mut best: Option<&Head> = None;
    for h in finals {
        let take = match best {
            None => true,
            Some(b) => h.position > b.position || (h.position == b.position && h.start < b.start),
        };
        if take {
            best = Some(h);
        }
    }
    best.map(|h| RawMatch { start: h.start, end: h.position, groups: h.groups.clone() })
}

/// Closure of `heads` under zero-width transitions (boundary assertions and
/// group-boundary markers — trivial ε was already eliminated at compile
/// time) matching `(c_previous, c_next)`. Deduplicates by full structural
/// equality, which both bounds the head count and guarantees termination:
/// a cyclic zero-width path (e.g. a boundary-only `Iteration`) revisits the
/// same `(state, groups)` pair once its capture vector stabilizes, since
/// position never advances within a single closure pass.
fn zero_width_closure(nfa: &Nfa, heads: Vec<Head>, c_previous: CodePoint, c_next: CodePoint) -> Vec<Head> {
    let mut result = Vec::new();
    let mut seen: HashSet<Head> = HashSet::new();
    let mut queue: Vec<Head> = Vec::new();

    for h in heads {
        if seen.insert(h.clone()) {
            queue.push(h.clone());
            result.push(h);
        }
    }

    let mut i = 0;
    while i < queue.len() {
        let h = queue[i].clone();
        i += 1;
        let Some(by_transition) = nfa.transitions.get(&h.state) else { continue };
        for (t, targets) in by_transition {
            if t.consume_char || !t.matches(c_previous, c_next) {
                continue;
            }
            for &v in targets {
                let mut groups = h.groups.clone();
                if let Some(n) = t.begin_group {
                    groups[n as usize] = GroupSpan { start: Some(h.position), end: None };
                }
                if let Some(n) = t.end_group {
                    groups[n as usize].end = Some(h.position);
                }
                let next_head = Head { state: v, start: h.start, position: h.position, groups };
                if seen.insert(next_head.clone()) {
                    queue.push(next_head.clone());
                    result.push(next_head);
                }
            }
        }
    }

    result
}

/// Advances every head whose current state has a matching character-
/// consuming transition; heads with no such transition vanish (spec
/// §4.6 sub-step 2). Consuming transitions never carry group markers, so
/// capture vectors pass through unchanged.
fn consume(nfa: &Nfa, heads: Vec<Head>, c_previous: CodePoint, c_next: CodePoint) -> Vec<Head> {
    if c_next == RangeSet::EOF {
        return Vec::new();
    }
    let mut seen: HashSet<Head> = HashSet::new();
    let mut result = Vec::new();
    for h in heads {
        let Some(by_transition) = nfa.transitions.get(&h.state) else { continue };
        for (t, targets) in by_transition {
            if !t.consume_char || !t.matches(c_previous, c_next) {
                continue;
            }
            for &v in targets {
                let next_head = Head { state: v, start: h.start, position: h.position + 1, groups: h.groups.clone() };
                if seen.insert(next_head.clone()) {
                    result.push(next_head);
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::PatternFlags;
    use crate::nfa::builder;
    use crate::syntax::{parser, processor, tokenizer};

    fn compiled(pattern: &str) -> (Nfa, usize) {
        let tokens = tokenizer::tokenize(pattern, PatternFlags::NOFLAG).unwrap().tokens;
        let raw = parser::parse(tokens).unwrap().ast;
        let processed = processor::process(raw);
        (builder::build(&processed.ast), processed.max_group_number as usize + 1)
    }

    fn codepoints(s: &str) -> Vec<CodePoint> {
        s.chars().map(|c| c as CodePoint).collect()
    }

    #[test]
    fn anchored_match_of_star_repetition() {
        let (nfa, groups) = compiled("lo*l");
        let text = codepoints("looool");
        let matches = scan(&nfa, groups, &text, 0, text.len(), false);
        assert_eq!(matches.len(), 1);
        assert_eq!((matches[0].start, matches[0].end), (0, 6));
    }

    #[test]
    fn anchored_match_fails_when_input_is_longer() {
        let (nfa, groups) = compiled("lo*l");
        let text = codepoints("lolo");
        let matches = scan(&nfa, groups, &text, 0, text.len(), false);
        assert!(matches.is_empty() || matches[0].end != text.len());
    }

    #[test]
    fn finditer_finds_non_overlapping_repeats() {
        let (nfa, groups) = compiled("aa");
        let text = codepoints("aaaaaaa");
        let matches = scan(&nfa, groups, &text, 0, text.len(), true);
        let spans: Vec<(usize, usize)> = matches.iter().map(|m| (m.start, m.end)).collect();
        assert_eq!(spans, vec![(0, 2), (2, 4), (4, 6)]);
    }

    #[test]
    fn capture_group_spans_are_recorded() {
        let (nfa, groups) = compiled("([a-z0-9]+)@([a-z0-9]+)");
        let text = codepoints("abc@def");
        let matches = scan(&nfa, groups, &text, 0, text.len(), true);
        assert_eq!(matches.len(), 1);
        let g1 = matches[0].groups[1].span().unwrap();
        let g2 = matches[0].groups[2].span().unwrap();
        assert_eq!(&text[g1.0..g1.1], &codepoints("abc")[..]);
        assert_eq!(&text[g2.0..g2.1], &codepoints("def")[..]);
    }

    #[test]
    fn word_boundary_matches_at_start_of_word() {
        let (nfa, groups) = compiled(r"\bm");
        let text = codepoints("moon");
        let matches = scan(&nfa, groups, &text, 0, text.len(), true);
        assert_eq!((matches[0].start, matches[0].end), (0, 1));
    }

    #[test]
    fn word_boundary_matches_at_end_of_word() {
        let (nfa, groups) = compiled(r"oon\b");
        let text = codepoints("moon");
        let matches = scan(&nfa, groups, &text, 0, text.len(), true);
        assert_eq!((matches[0].start, matches[0].end), (1, 4));
    }

    #[test]
    fn bounded_repetition_respects_lower_and_upper_bound() {
        let (nfa, groups) = compiled("a{2,3}");
        for (text, should_match) in [("a", false), ("aa", true), ("aaa", true), ("aaaa", false)] {
            let cps = codepoints(text);
            let matches = scan(&nfa, groups, &cps, 0, cps.len(), false);
            let fullmatches = matches.iter().any(|m| m.start == 0 && m.end == cps.len());
            assert_eq!(fullmatches, should_match, "text={text}");
        }
    }
}
