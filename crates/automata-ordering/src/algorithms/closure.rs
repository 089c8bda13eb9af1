//! Transitive Closure with Antisymmetry Enforcement
//!
//! Depth-first reachability from every element. A reflected edge, i.e. a node
//! `to` whose finished closure already reaches back to `from`, means the merge
//! forced a cycle and is reported as an `OrderConflict`.

use crate::domain::errors::OrderConflict;
use crate::domain::value_objects::{Orderable, Pair, Relation};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Transitively close `relation` over `elements`.
///
/// Every element gains its reflexive pair. Fails if closing the relation
/// would put both `(a, b)` and `(b, a)` into it for some `a != b`.
pub fn transitive_closure<T: Orderable>(
    relation: &Relation<T>,
    elements: &[T],
) -> Result<Relation<T>, OrderConflict> {
    let mut adjacency: HashMap<&T, Vec<&T>> = HashMap::new();
    for pair in relation {
        adjacency.entry(&pair.left).or_default().push(&pair.right);
    }

    let mut closure: HashMap<&T, HashSet<&T>> =
        elements.iter().map(|t| (t, HashSet::new())).collect();

    for from in elements {
        // Taken out so the closures of other nodes stay readable during the walk.
        let mut reached = closure.remove(from).unwrap_or_default();
        let mut stack = vec![from];

        while let Some(to) = stack.pop() {
            if !reached.insert(to) {
                continue;
            }
            if to != from && closure.get(to).is_some_and(|c| c.contains(from)) {
                return Err(OrderConflict::new(format!(
                    "Closure reaches back from {} to {}",
                    to.label(),
                    from.label()
                )));
            }
            if let Some(next) = adjacency.get(to) {
                stack.extend(next.iter().copied().filter(|n| !reached.contains(*n)));
            }
        }

        trace!(from = %from.label(), reached = reached.len(), "Closed element");
        closure.insert(from, reached);
    }

    Ok(closure
        .into_iter()
        .flat_map(|(from, reached)| {
            reached
                .into_iter()
                .map(move |to| Pair::new(from.clone(), to.clone()))
        })
        .collect())
}

/// True iff a closed, antisymmetric relation over `n` elements is total.
pub fn is_order_constructed<T: Orderable>(relation: &Relation<T>, n: usize) -> bool {
    relation.len() == n * (n + 1) / 2
}

/// Every pair of the relation reversed.
pub fn revert<T: Orderable>(relation: &Relation<T>) -> Relation<T> {
    relation.reverted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invariants::{invariant_antisymmetric, invariant_transitively_closed};
    use crate::domain::value_objects::State;
    use proptest::prelude::*;

    fn states(labels: &[u32]) -> Vec<State> {
        labels.iter().copied().map(State::new).collect()
    }

    fn relation(pairs: &[(u32, u32)]) -> Relation<State> {
        pairs
            .iter()
            .map(|&(l, r)| Pair::new(State::new(l), State::new(r)))
            .collect()
    }

    #[test]
    fn test_closure_of_chains() {
        let input = relation(&[(1, 2), (2, 3), (3, 6), (4, 5), (5, 3)]);
        let expected = relation(&[
            (1, 2),
            (2, 3),
            (3, 6),
            (4, 5),
            (5, 3),
            (1, 3),
            (1, 6),
            (2, 6),
            (4, 3),
            (4, 6),
            (5, 6),
            (1, 1),
            (2, 2),
            (3, 3),
            (4, 4),
            (5, 5),
            (6, 6),
        ]);

        let closed = transitive_closure(&input, &states(&[1, 2, 3, 4, 5, 6])).unwrap();
        assert_eq!(closed, expected);
    }

    #[test]
    fn test_closure_detects_reflected_cycle() {
        let input = relation(&[(1, 2), (1, 3), (2, 3), (3, 1), (3, 4), (4, 4)]);

        let result = transitive_closure(&input, &states(&[1, 2, 3, 4]));
        assert!(result.is_err());
    }

    #[test]
    fn test_closure_of_empty_relation_is_reflexive() {
        let elements = states(&[1, 2, 3]);
        let closed = transitive_closure(&Relation::new(), &elements).unwrap();

        assert_eq!(closed, Relation::reflexive(&elements));
    }

    #[test]
    fn test_is_order_constructed() {
        let elements = states(&[1, 2, 3]);
        let total = transitive_closure(&relation(&[(1, 2), (2, 3)]), &elements).unwrap();
        let partial = transitive_closure(&relation(&[(1, 2)]), &elements).unwrap();

        assert!(is_order_constructed(&total, 3));
        assert!(!is_order_constructed(&partial, 3));
        assert!(is_order_constructed(&Relation::<State>::new(), 0));
    }

    fn arb_edges(n: u32) -> impl Strategy<Value = Vec<(u32, u32)>> {
        prop::collection::vec((1..=n, 1..=n), 0..20)
    }

    proptest! {
        #[test]
        fn prop_revert_is_involution(edges in arb_edges(6)) {
            let r = relation(&edges);
            prop_assert_eq!(revert(&revert(&r)), r);
        }

        #[test]
        fn prop_closure_of_forward_edges_succeeds(edges in arb_edges(6)) {
            // Edges pointing from smaller to larger labels can never close a cycle.
            let forward: Vec<_> = edges.into_iter().filter(|(l, r)| l < r).collect();
            let elements = states(&[1, 2, 3, 4, 5, 6]);

            let closed = transitive_closure(&relation(&forward), &elements).unwrap();
            prop_assert!(invariant_antisymmetric(&closed));
            prop_assert!(invariant_transitively_closed(&closed));
        }

        #[test]
        fn prop_closure_is_idempotent(edges in arb_edges(6)) {
            let elements = states(&[1, 2, 3, 4, 5, 6]);
            if let Ok(once) = transitive_closure(&relation(&edges), &elements) {
                let twice = transitive_closure(&once, &elements).unwrap();
                prop_assert_eq!(twice, once);
            }
        }

        #[test]
        fn prop_closure_result_is_antisymmetric(edges in arb_edges(6)) {
            let elements = states(&[1, 2, 3, 4, 5, 6]);
            if let Ok(closed) = transitive_closure(&relation(&edges), &elements) {
                prop_assert!(invariant_antisymmetric(&closed));
            }
        }

        #[test]
        fn prop_explicit_two_cycle_conflicts(
            edges in arb_edges(6),
            a in 1u32..=6,
            b in 1u32..=6,
        ) {
            prop_assume!(a != b);
            let mut with_cycle = edges;
            with_cycle.push((a, b));
            with_cycle.push((b, a));

            let result = transitive_closure(&relation(&with_cycle), &states(&[1, 2, 3, 4, 5, 6]));
            prop_assert!(result.is_err());
        }

        #[test]
        fn prop_total_chain_is_constructed(n in 0usize..8) {
            let elements: Vec<State> = (1..=n as u32).map(State::new).collect();
            let chain: Relation<State> = elements
                .windows(2)
                .map(|w| Pair::new(w[0], w[1]))
                .collect();

            let closed = transitive_closure(&chain, &elements).unwrap();
            prop_assert!(is_order_constructed(&closed, n));
        }
    }
}
