//! Domain invariants for Automata Ordering
//!
//! Pure predicates over relations. The search and closure engine are expected
//! to preserve all of them; tests and debug assertions check them.

use super::value_objects::{Orderable, Pair, Relation};
use std::collections::{HashMap, HashSet};

/// INVARIANT-1: Antisymmetry
/// No non-reflexive pair appears together with its reverse.
pub fn invariant_antisymmetric<T: Orderable>(relation: &Relation<T>) -> bool {
    relation
        .iter()
        .all(|pair| pair.is_reflexive() || !relation.contains(&pair.reverted()))
}

/// INVARIANT-2: Transitive closure
/// `(a, b)` and `(b, c)` in the relation imply `(a, c)`.
pub fn invariant_transitively_closed<T: Orderable>(relation: &Relation<T>) -> bool {
    let mut successors: HashMap<&T, Vec<&T>> = HashMap::new();
    for pair in relation {
        successors.entry(&pair.left).or_default().push(&pair.right);
    }

    for pair in relation {
        let Some(next) = successors.get(&pair.right) else {
            continue;
        };
        for right in next {
            if !relation.contains(&Pair::new(pair.left.clone(), (*right).clone())) {
                return false;
            }
        }
    }

    true
}

/// INVARIANT-3: Total order
/// Reflexive, transitively closed, antisymmetric and covering every pair of
/// `elements` in one orientation.
pub fn invariant_total_order<T: Orderable>(relation: &Relation<T>, elements: &[T]) -> bool {
    let n = elements.len();
    if relation.len() != n * (n + 1) / 2 {
        return false;
    }

    let members: HashSet<&T> = elements.iter().collect();
    let within = relation
        .iter()
        .all(|pair| members.contains(&pair.left) && members.contains(&pair.right));
    let reflexive = elements
        .iter()
        .all(|t| relation.contains(&Pair::new(t.clone(), t.clone())));

    within
        && reflexive
        && invariant_antisymmetric(relation)
        && invariant_transitively_closed(relation)
}

/// INVARIANT-4: Orbit respected
/// The order contains the orbit in one of its two orientations.
pub fn invariant_orbit_respected<T: Orderable>(order: &Relation<T>, orbit: &Relation<T>) -> bool {
    orbit.iter().all(|pair| order.contains(pair))
        || orbit.iter().all(|pair| order.contains(&pair.reverted()))
}
