//! Backtracking Order Search
//!
//! Merges orbits one at a time into two growing relations (states and output
//! signals) until the state relation is a total order. Every accepted merge
//! pushes a `Step` holding a snapshot of both relations; a pair whose orbit
//! fits in neither orientation makes the search pop back to the most recent
//! step that can still be flipped.
//!
//! The search is an explicit state machine so it can be driven one
//! transition at a time:
//!
//! ```text
//! Searching --merge ok--> Searching
//! Searching --complete--> Succeeded
//! Searching --no pair---> Failed
//! Searching --conflict--> MergeFailed --> Backtracking
//! Backtracking --flip ok--> Searching
//! Backtracking --flip failed--> Backtracking
//! Backtracking --root reached--> Failed
//! ```

use super::closure::{is_order_constructed, transitive_closure};
use super::topological::topological_linearization;
use crate::domain::entities::{FailureReason, LinearOrder, Orbit, OrbitMap};
use crate::domain::errors::OrderConflict;
use crate::domain::value_objects::{OutputSignal, Pair, Relation, State};
use tracing::{debug, info, warn};

/// Frame of the search stack.
#[derive(Clone, Debug)]
pub struct Step {
    /// Index into the sorted candidates; `None` for the root.
    candidate: Option<usize>,
    reverted: bool,
    w: Relation<State>,
    w1: Relation<OutputSignal>,
}

impl Step {
    pub fn is_root(&self) -> bool {
        self.candidate.is_none()
    }

    pub fn is_reverted(&self) -> bool {
        self.reverted
    }

    pub fn state_relation(&self) -> &Relation<State> {
        &self.w
    }

    pub fn output_relation(&self) -> &Relation<OutputSignal> {
        &self.w1
    }
}

/// Where the search currently stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchState {
    Searching,
    /// Neither orientation of this pair's orbit fits on top of the stack.
    MergeFailed {
        pair: Pair<State>,
    },
    Backtracking,
    Succeeded(LinearOrder),
    Failed(FailureReason),
}

impl SearchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }
}

/// Counters reported when the search ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub steps_pushed: usize,
    pub backtracks: usize,
}

struct Merged {
    w: Relation<State>,
    w1: Relation<OutputSignal>,
    reverted: bool,
}

/// Backtracking search over orbits for a pair of total orders.
pub struct OrderSearch<'a> {
    states: &'a [State],
    output_signals: &'a [OutputSignal],
    /// Seed pairs by descending orbit power, ties in enumeration order.
    candidates: Vec<(Pair<State>, &'a Orbit)>,
    steps: Vec<Step>,
    state: SearchState,
    stats: SearchStats,
}

impl<'a> OrderSearch<'a> {
    /// Prepare a search rooted at the reflexive relations.
    ///
    /// `pairs` fixes the tiebreak between orbits of equal power; pairs with
    /// no entry in `orbits` are never chosen.
    pub fn new(
        states: &'a [State],
        output_signals: &'a [OutputSignal],
        orbits: &'a OrbitMap,
        pairs: &[Pair<State>],
    ) -> Self {
        let mut candidates: Vec<(Pair<State>, &'a Orbit)> = pairs
            .iter()
            .filter_map(|pair| orbits.get(pair).map(|orbit| (pair.clone(), orbit)))
            .collect();
        // Stable: equal powers keep enumeration order.
        candidates.sort_by(|a, b| b.1.power().cmp(&a.1.power()));

        let root = Step {
            candidate: None,
            reverted: false,
            w: Relation::reflexive(states),
            w1: Relation::reflexive(output_signals),
        };

        Self {
            states,
            output_signals,
            candidates,
            steps: vec![root],
            state: SearchState::Searching,
            stats: SearchStats::default(),
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Number of steps on the stack, root included.
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    pub fn top(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Pair chosen by a step, oriented the way it was merged.
    pub fn chosen_pair(&self, step: &Step) -> Option<Pair<State>> {
        let (pair, _) = &self.candidates[step.candidate?];
        Some(if step.reverted {
            pair.reverted()
        } else {
            pair.clone()
        })
    }

    /// Seed pairs in the order the search considers them.
    pub fn candidate_pairs(&self) -> impl Iterator<Item = &Pair<State>> {
        self.candidates.iter().map(|(pair, _)| pair)
    }

    /// Perform one transition and return the new state.
    pub fn advance(&mut self) -> &SearchState {
        let next = match std::mem::replace(&mut self.state, SearchState::Searching) {
            SearchState::Searching => self.search(),
            SearchState::MergeFailed { pair } => {
                debug!(%pair, depth = self.steps.len(), "Back iteration");
                self.stats.backtracks += 1;
                SearchState::Backtracking
            }
            SearchState::Backtracking => self.backtrack(),
            terminal => terminal,
        };
        self.state = next;
        &self.state
    }

    /// Drive the search to a terminal state.
    pub fn run(mut self) -> LinearOrder {
        while !self.state.is_terminal() {
            self.advance();
        }

        info!(
            steps_pushed = self.stats.steps_pushed,
            backtracks = self.stats.backtracks,
            resolved = matches!(self.state, SearchState::Succeeded(_)),
            "Order search finished"
        );

        match self.state {
            SearchState::Succeeded(order) => order,
            SearchState::Failed(reason) => LinearOrder::failure(reason),
            _ => LinearOrder::failure(FailureReason::SearchExhausted),
        }
    }

    fn search(&mut self) -> SearchState {
        let Some(prev) = self.steps.last() else {
            return SearchState::Failed(FailureReason::SearchExhausted);
        };

        if is_order_constructed(&prev.w, self.states.len()) {
            return self.finish(prev);
        }

        let Some(index) = self
            .candidates
            .iter()
            .position(|(pair, _)| !prev.w.decides(pair))
        else {
            warn!(
                decided = prev.w.len(),
                "No candidate pair left but order incomplete"
            );
            return SearchState::Failed(FailureReason::NoCandidatePair);
        };

        let (pair, orbit) = &self.candidates[index];
        debug!(%pair, power = orbit.power(), "Selected pair");

        match self.try_merge(prev, orbit) {
            Ok(merged) => {
                self.push(index, merged);
                SearchState::Searching
            }
            Err(e) => {
                debug!(%pair, error = %e, "Pair fits in neither orientation");
                SearchState::MergeFailed { pair: pair.clone() }
            }
        }
    }

    fn backtrack(&mut self) -> SearchState {
        while self.steps.last().is_some_and(Step::is_reverted) {
            self.steps.pop();
        }

        let Some(step) = self.steps.pop() else {
            return SearchState::Failed(FailureReason::SearchExhausted);
        };
        let Some(index) = step.candidate else {
            debug!("Back to the root of stack");
            return SearchState::Failed(FailureReason::SearchExhausted);
        };
        let Some(base) = self.steps.last() else {
            return SearchState::Failed(FailureReason::SearchExhausted);
        };

        let (pair, orbit) = &self.candidates[index];
        match self.merge_oriented(base, orbit, true) {
            Ok(merged) => {
                debug!(%pair, depth = self.steps.len(), "Flipped earlier decision");
                self.push(index, merged);
                SearchState::Searching
            }
            Err(e) => {
                debug!(%pair, error = %e, "Flip rejected, continuing back iteration");
                SearchState::Backtracking
            }
        }
    }

    fn finish(&self, prev: &Step) -> SearchState {
        let linearized = topological_linearization(&prev.w1, self.output_signals).and_then(
            |(output_sequence, output_order)| {
                let (state_sequence, _) = topological_linearization(&prev.w, self.states)?;
                Ok((state_sequence, output_sequence, output_order))
            },
        );

        match linearized {
            Ok((state_sequence, output_sequence, output_order)) => {
                SearchState::Succeeded(LinearOrder::Success {
                    state_order: prev.w.clone(),
                    output_order,
                    state_sequence,
                    output_sequence,
                })
            }
            Err(e) => {
                warn!(error = %e, "Constructed relation is not acyclic");
                SearchState::Failed(FailureReason::SearchExhausted)
            }
        }
    }

    fn push(&mut self, index: usize, merged: Merged) {
        self.steps.push(Step {
            candidate: Some(index),
            reverted: merged.reverted,
            w: merged.w,
            w1: merged.w1,
        });
        self.stats.steps_pushed += 1;
    }

    /// Merge the orbit as is, falling back to its reverse.
    fn try_merge(&self, base: &Step, orbit: &Orbit) -> Result<Merged, OrderConflict> {
        self.merge_oriented(base, orbit, false).or_else(|e| {
            debug!(error = %e, "Retrying with reverted orbit");
            self.merge_oriented(base, orbit, true)
        })
    }

    fn merge_oriented(
        &self,
        base: &Step,
        orbit: &Orbit,
        reverted: bool,
    ) -> Result<Merged, OrderConflict> {
        let mut w = base.w.clone();
        let mut w1 = base.w1.clone();

        if reverted {
            w.merge(&orbit.transition_orbit.reverted())?;
        } else {
            w.merge(&orbit.transition_orbit)?;
        }
        let w = transitive_closure(&w, self.states)?;

        if reverted {
            w1.merge(&orbit.output_orbit.reverted())?;
        } else {
            w1.merge(&orbit.output_orbit)?;
        }
        let w1 = transitive_closure(&w1, self.output_signals)?;

        Ok(Merged { w, w1, reverted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invariants::invariant_total_order;

    fn s(label: u32) -> State {
        State::new(label)
    }

    fn pair(l: u32, r: u32) -> Pair<State> {
        Pair::new(s(l), s(r))
    }

    fn out(name: &str) -> OutputSignal {
        OutputSignal::new(name)
    }

    fn orbit(transitions: &[(u32, u32)], outputs: &[(&str, &str)]) -> Orbit {
        Orbit::new(
            transitions.iter().map(|&(l, r)| pair(l, r)).collect(),
            outputs
                .iter()
                .map(|&(l, r)| Pair::new(out(l), out(r)))
                .collect(),
        )
    }

    fn all_pairs(n: u32) -> Vec<Pair<State>> {
        let mut pairs = Vec::new();
        for l in 1..=n {
            for r in (l + 1)..=n {
                pairs.push(pair(l, r));
            }
        }
        pairs
    }

    #[test]
    fn test_independent_pairs_follow_enumeration_order() {
        let states: Vec<State> = (1..=3).map(s).collect();
        let pairs = all_pairs(3);
        let orbits: OrbitMap = pairs
            .iter()
            .map(|p| (p.clone(), orbit(&[(p.left.id(), p.right.id())], &[])))
            .collect();

        let order = OrderSearch::new(&states, &[], &orbits, &pairs).run();

        assert_eq!(order.state_sequence(), Some(&[s(1), s(2), s(3)][..]));
        assert!(order.output_sequence().is_some_and(|seq| seq.is_empty()));
    }

    #[test]
    fn test_candidates_sorted_by_descending_power() {
        let states: Vec<State> = (1..=3).map(s).collect();
        let pairs = all_pairs(3);
        let mut orbits = OrbitMap::new();
        orbits.insert(pair(1, 2), orbit(&[(1, 2)], &[]));
        orbits.insert(pair(1, 3), orbit(&[(1, 3)], &[]));
        orbits.insert(pair(2, 3), orbit(&[(2, 3)], &[("x", "y")]));

        let search = OrderSearch::new(&states, &[], &orbits, &pairs);
        let order: Vec<_> = search.candidate_pairs().cloned().collect();

        assert_eq!(order, vec![pair(2, 3), pair(1, 2), pair(1, 3)]);
    }

    /// (1, 2) then (3, 4) are merged as is; (1, 3) then fits in neither
    /// orientation, so (3, 4) is flipped and (1, 3) goes in reverted.
    #[test]
    fn test_backtracking_flips_earlier_decision() {
        let states: Vec<State> = (1..=4).map(s).collect();
        let outputs: Vec<OutputSignal> = ["o1", "o2", "o3", "o4", "o5", "o6", "o7", "o8"]
            .into_iter()
            .map(out)
            .collect();
        let pairs = all_pairs(4);

        let mut orbits = OrbitMap::new();
        orbits.insert(
            pair(1, 2),
            orbit(
                &[(1, 2)],
                &[("o1", "o2"), ("o2", "o3"), ("o3", "o4"), ("o4", "o5")],
            ),
        );
        orbits.insert(
            pair(3, 4),
            orbit(&[(3, 4)], &[("o6", "o7"), ("o7", "o8"), ("o6", "o8")]),
        );
        orbits.insert(pair(1, 3), orbit(&[(1, 3), (2, 1), (3, 4)], &[]));
        orbits.insert(pair(1, 4), orbit(&[(1, 4)], &[]));
        orbits.insert(pair(2, 3), orbit(&[(2, 3)], &[]));
        orbits.insert(pair(2, 4), orbit(&[(2, 4)], &[]));

        let mut search = OrderSearch::new(&states, &outputs, &orbits, &pairs);

        // (1, 2), then (3, 4)
        assert_eq!(search.advance(), &SearchState::Searching);
        assert_eq!(search.advance(), &SearchState::Searching);
        assert_eq!(search.depth(), 3);

        assert_eq!(
            search.advance(),
            &SearchState::MergeFailed { pair: pair(1, 3) }
        );
        assert_eq!(search.advance(), &SearchState::Backtracking);

        // (3, 4) flipped on top of (1, 2)
        assert_eq!(search.advance(), &SearchState::Searching);
        assert_eq!(search.depth(), 3);
        let top = search.top().unwrap();
        assert!(top.is_reverted());
        assert_eq!(search.chosen_pair(top), Some(pair(4, 3)));

        let stats_before = search.stats();
        let order = search.run();

        assert_eq!(order.state_sequence(), Some(&[s(4), s(3), s(1), s(2)][..]));
        let expected: Vec<OutputSignal> = ["o8", "o7", "o6", "o1", "o2", "o3", "o4", "o5"]
            .into_iter()
            .map(out)
            .collect();
        assert_eq!(order.output_sequence(), Some(&expected[..]));
        assert_eq!(stats_before.backtracks, 1);

        match order {
            LinearOrder::Success {
                state_order,
                output_order,
                ..
            } => {
                assert!(invariant_total_order(&state_order, &states));
                assert!(invariant_total_order(&output_order, &outputs));
            }
            LinearOrder::Failure { reason } => panic!("unexpected failure: {reason}"),
        }
    }

    #[test]
    fn test_cyclic_orbit_exhausts_search() {
        let states: Vec<State> = (1..=3).map(s).collect();
        let pairs = all_pairs(3);
        let mut orbits = OrbitMap::new();
        orbits.insert(pair(1, 2), orbit(&[(1, 2), (2, 3), (3, 1)], &[]));
        orbits.insert(pair(1, 3), orbit(&[(1, 3)], &[]));
        orbits.insert(pair(2, 3), orbit(&[(2, 3)], &[]));

        let order = OrderSearch::new(&states, &[], &orbits, &pairs).run();

        assert_eq!(order.reason(), Some(&FailureReason::SearchExhausted));
    }

    #[test]
    fn test_missing_orbit_leaves_no_candidate() {
        let states: Vec<State> = (1..=3).map(s).collect();
        let pairs = all_pairs(3);
        let mut orbits = OrbitMap::new();
        orbits.insert(pair(1, 2), orbit(&[(1, 2)], &[]));

        let order = OrderSearch::new(&states, &[], &orbits, &pairs).run();

        assert_eq!(order.reason(), Some(&FailureReason::NoCandidatePair));
    }

    #[test]
    fn test_empty_automaton_is_trivially_ordered() {
        let orbits = OrbitMap::new();
        let outputs = vec![out("x")];

        let order = OrderSearch::new(&[], &outputs, &orbits, &[]).run();

        assert!(order.is_resolved());
        assert_eq!(order.output_sequence(), Some(&outputs[..]));
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let orbits = OrbitMap::new();
        let mut search = OrderSearch::new(&[], &[], &orbits, &[]);

        assert!(search.advance().is_terminal());
        assert!(search.advance().is_terminal());
        assert_eq!(search.stats().steps_pushed, 0);
    }
}
