//! The NFA data structure and trivial-ε-elimination (spec §3 "NFA", §4.5),
//! modeled on `automata/nfa.py`'s `NFA`/`get_epsilon_free_nfa`.

use std::collections::{HashMap, HashSet, VecDeque};

use super::transition::Transition;

pub type StateId = u32;

#[derive(Debug, Clone)]
pub struct Nfa {
    pub states: Vec<StateId>,
    pub initial_state: StateId,
    pub final_states: HashSet<StateId>,
    pub transitions: HashMap<StateId, HashMap<Transition, HashSet<StateId>>>,
}

impl Nfa {
    pub fn single_state(state: StateId, is_final: bool) -> Self {
        let mut final_states = HashSet::new();
        if is_final {
            final_states.insert(state);
        }
        Nfa { states: vec![state], initial_state: state, final_states, transitions: HashMap::new() }
    }

    pub fn max_state(&self) -> StateId {
        self.states.iter().copied().max().unwrap_or(0)
    }

    /// Adds `transition` from `from` to `to`, merging into any
    /// structurally-equal transition already leaving `from` (spec §9:
    /// adjacency maps keyed by transition identity must still merge
    /// structurally-equal transitions for ε-elimination to reach a
    /// fixpoint).
    pub fn add_transition(&mut self, from: StateId, transition: Transition, to: StateId) {
        self.transitions.entry(from).or_default().entry(transition).or_default().insert(to);
    }

    /// Renumbers every state, preserving `self.states`' order, starting at
    /// `x0` (mirrors `NFA.renumber_states` in the Python source).
    pub fn renumbered(&self, x0: StateId) -> Nfa {
        let map: HashMap<StateId, StateId> =
            self.states.iter().enumerate().map(|(i, &s)| (s, x0 + i as StateId)).collect();

        let states = self.states.iter().map(|s| map[s]).collect();
        let initial_state = map[&self.initial_state];
        let final_states = self.final_states.iter().map(|s| map[s]).collect();
        let mut transitions = HashMap::new();
        for (u, by_transition) in &self.transitions {
            let entry: &mut HashMap<Transition, HashSet<StateId>> = transitions.entry(map[u]).or_default();
            for (t, vs) in by_transition {
                entry.entry(t.clone()).or_default().extend(vs.iter().map(|v| map[v]));
            }
        }
        Nfa { states, initial_state, final_states, transitions }
    }

    /// Merges `other`'s states/transitions into `self` (assumes disjoint
    /// state numbering, i.e. `other` has already been renumbered).
    fn absorb(&mut self, other: &Nfa) {
        self.states.extend(other.states.iter().copied());
        for (u, by_transition) in &other.transitions {
            let entry = self.transitions.entry(*u).or_default();
            for (t, vs) in by_transition {
                entry.entry(t.clone()).or_default().extend(vs.iter().copied());
            }
        }
    }

    pub fn union(u: &Nfa, v: &Nfa) -> Nfa {
        let v = v.renumbered(u.max_state() + 1);
        let mut nfa = u.clone();
        nfa.absorb(&v);
        nfa.final_states.extend(v.final_states.iter().copied());

        let new_initial = nfa.max_state() + 1;
        nfa.states.push(new_initial);
        nfa.add_transition(new_initial, Transition::trivial_epsilon(), u.initial_state);
        nfa.add_transition(new_initial, Transition::trivial_epsilon(), v.initial_state);
        nfa.initial_state = new_initial;
        nfa
    }

    pub fn concat(u: &Nfa, v: &Nfa) -> Nfa {
        let v = v.renumbered(u.max_state() + 1);
        let mut nfa = u.clone();
        nfa.absorb(&v);
        nfa.final_states = v.final_states.clone();
        for s in &u.final_states {
            nfa.add_transition(*s, Transition::trivial_epsilon(), v.initial_state);
        }
        nfa
    }

    pub fn iteration(u: &Nfa) -> Nfa {
        let mut nfa = u.clone();
        for s in &u.final_states {
            nfa.add_transition(*s, Transition::trivial_epsilon(), nfa.initial_state);
        }
        let closure = nfa.trivial_epsilon_closure(&nfa.final_states.clone());
        nfa.final_states = closure;
        nfa
    }

    /// Wraps `u` in a capturing group: a new initial state reaches
    /// `u.initial_state` via a `begin_group(number)` transition, and a new
    /// final state is reached from every final of `u` via `end_group`.
    pub fn group(u: &Nfa, number: u32) -> Nfa {
        let mut nfa = u.clone();
        let new_initial = nfa.max_state() + 1;
        nfa.states.push(new_initial);
        nfa.add_transition(new_initial, Transition::begin_group(number), u.initial_state);

        let new_final = nfa.max_state() + 1;
        nfa.states.push(new_final);
        for s in &u.final_states {
            nfa.add_transition(*s, Transition::end_group(number), new_final);
        }

        nfa.initial_state = new_initial;
        nfa.final_states = HashSet::from([new_final]);
        nfa
    }

    /// The trivial-ε closure of `states`: every state reachable using only
    /// transitions with [`Transition::is_trivial_epsilon`].
    pub fn trivial_epsilon_closure(&self, states: &HashSet<StateId>) -> HashSet<StateId> {
        let mut closure: HashSet<StateId> = states.clone();
        let mut queue: VecDeque<StateId> = closure.iter().copied().collect();
        while let Some(u) = queue.pop_front() {
            if let Some(by_transition) = self.transitions.get(&u) {
                for (t, vs) in by_transition {
                    if t.is_trivial_epsilon() {
                        for &v in vs {
                            if closure.insert(v) {
                                queue.push_back(v);
                            }
                        }
                    }
                }
            }
        }
        closure
    }

    /// Eliminates trivial ε-transitions (spec §4.5): for each state `u`,
    /// copy into its outgoing set every non-trivial transition leaving any
    /// state in `u`'s trivial-ε closure, mark `u` final if the closure
    /// contains a final state, then prune to states reachable from
    /// `initial_state` and renumber. Non-trivial ε-transitions (boundary-
    /// or group-tag-carrying) are preserved.
    pub fn eliminate_trivial_epsilons(&self) -> Nfa {
        let mut final_states = self.final_states.clone();
        let mut transitions: HashMap<StateId, HashMap<Transition, HashSet<StateId>>> = HashMap::new();

        for &u in &self.states {
            let closure = self.trivial_epsilon_closure(&HashSet::from([u]));
            let entry = transitions.entry(u).or_default();
            for &v in &closure {
                if let Some(by_transition) = self.transitions.get(&v) {
                    for (t, vs) in by_transition {
                        if !t.is_trivial_epsilon() {
                            entry.entry(t.clone()).or_default().extend(vs.iter().copied());
                        }
                    }
                }
                if self.final_states.contains(&v) {
                    final_states.insert(u);
                }
            }
        }

        let reachable = Self::reachable_from(&transitions, self.initial_state);
        transitions.retain(|u, _| reachable.contains(u));
        for by_transition in transitions.values_mut() {
            for vs in by_transition.values_mut() {
                vs.retain(|v| reachable.contains(v));
            }
            by_transition.retain(|_, vs| !vs.is_empty());
        }
        transitions.retain(|_, by_transition| !by_transition.is_empty());

        let pruned = Nfa {
            states: reachable.iter().copied().collect(),
            initial_state: self.initial_state,
            final_states: final_states.into_iter().filter(|s| reachable.contains(s)).collect(),
            transitions,
        };
        pruned.renumbered_sorted()
    }

    fn reachable_from(
        transitions: &HashMap<StateId, HashMap<Transition, HashSet<StateId>>>,
        initial: StateId,
    ) -> HashSet<StateId> {
        let mut reachable = HashSet::from([initial]);
        let mut queue = VecDeque::from([initial]);
        while let Some(u) = queue.pop_front() {
            if let Some(by_transition) = transitions.get(&u) {
                for vs in by_transition.values() {
                    for &v in vs {
                        if reachable.insert(v) {
                            queue.push_back(v);
                        }
                    }
                }
            }
        }
        reachable
    }

    /// Renumbers states to a dense `0..states.len()` range, sorted by
    /// original id, for a stable/compact final representation.
    fn renumbered_sorted(&self) -> Nfa {
        let mut sorted = self.states.clone();
        sorted.sort_unstable();
        let map: HashMap<StateId, StateId> =
            sorted.iter().enumerate().map(|(i, &s)| (s, i as StateId)).collect();

        let states = sorted.iter().map(|s| map[s]).collect();
        let initial_state = map[&self.initial_state];
        let final_states = self.final_states.iter().map(|s| map[s]).collect();
        let mut transitions = HashMap::new();
        for (u, by_transition) in &self.transitions {
            let entry: &mut HashMap<Transition, HashSet<StateId>> = transitions.entry(map[u]).or_default();
            for (t, vs) in by_transition {
                entry.entry(t.clone()).or_default().extend(vs.iter().map(|v| map[v]));
            }
        }
        Nfa { states, initial_state, final_states, transitions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::{CodePoint, RangeSet};

    fn char_nfa(c: char) -> Nfa {
        let mut nfa = Nfa::single_state(0, false);
        nfa.states.push(1);
        nfa.final_states = HashSet::from([1]);
        nfa.add_transition(0, Transition::consume(RangeSet::from_values([c as CodePoint]), c.to_string()), 1);
        nfa
    }

    #[test]
    fn concat_chains_finals_to_next_initial() {
        let ab = Nfa::concat(&char_nfa('a'), &char_nfa('b'));
        assert_eq!(ab.final_states.len(), 1);
    }

    #[test]
    fn iteration_makes_initial_final_too() {
        let star = Nfa::iteration(&char_nfa('a'));
        assert!(star.final_states.contains(&star.initial_state));
    }

    #[test]
    fn elimination_preserves_single_final_state_count_after_group_wrap() {
        let inner = char_nfa('a');
        let wrapped = Nfa::group(&inner, 0);
        let eliminated = wrapped.eliminate_trivial_epsilons();
        assert_eq!(eliminated.final_states.len(), 1);
    }
}
