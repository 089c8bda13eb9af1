//! Depth-First Topological Linearization
//!
//! Extends an acyclic relation to a total order: post-order DFS from every
//! unvisited element in declared order, then reverse the finish sequence.
//! O(V + E), deterministic for a fixed element order.

use crate::domain::errors::OrderConflict;
use crate::domain::value_objects::{Orderable, Pair, Relation};
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Finished,
}

/// Elements of `elements` sorted so that every edge of `relation` points forward.
///
/// Neighbours are visited in declared order. Reflexive pairs and pairs
/// mentioning elements outside `elements` are ignored. Fails on a cycle.
pub fn linearize<T: Orderable>(
    relation: &Relation<T>,
    elements: &[T],
) -> Result<Vec<T>, OrderConflict> {
    let index: HashMap<&T, usize> = elements.iter().enumerate().map(|(i, t)| (t, i)).collect();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); elements.len()];
    for pair in relation {
        if pair.is_reflexive() {
            continue;
        }
        if let (Some(&from), Some(&to)) = (index.get(&pair.left), index.get(&pair.right)) {
            adjacency[from].push(to);
        }
    }
    for neighbours in &mut adjacency {
        neighbours.sort_unstable();
        neighbours.dedup();
    }

    let mut marks = vec![Mark::Unvisited; elements.len()];
    let mut finished: Vec<usize> = Vec::with_capacity(elements.len());

    for root in 0..elements.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }

        // (node, position of the next neighbour to try)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        marks[root] = Mark::OnStack;

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            match adjacency[node].get(cursor).copied() {
                Some(next) => {
                    frame.1 += 1;
                    match marks[next] {
                        Mark::Unvisited => {
                            marks[next] = Mark::OnStack;
                            stack.push((next, 0));
                        }
                        Mark::OnStack => {
                            return Err(OrderConflict::new(format!(
                                "Cycle through {} and {}",
                                elements[node].label(),
                                elements[next].label()
                            )));
                        }
                        Mark::Finished => {}
                    }
                }
                None => {
                    marks[node] = Mark::Finished;
                    finished.push(node);
                    stack.pop();
                }
            }
        }
    }

    Ok(finished
        .into_iter()
        .rev()
        .map(|i| elements[i].clone())
        .collect())
}

/// Total order `{(seq[i], seq[j]) : i <= j}` of a sequence.
pub fn total_order_from_sequence<T: Orderable>(sequence: &[T]) -> Relation<T> {
    sequence
        .iter()
        .enumerate()
        .flat_map(|(i, left)| {
            sequence[i..]
                .iter()
                .map(move |right| Pair::new(left.clone(), right.clone()))
        })
        .collect()
}

/// Linearize `relation` and materialize the resulting total order.
pub fn topological_linearization<T: Orderable>(
    relation: &Relation<T>,
    elements: &[T],
) -> Result<(Vec<T>, Relation<T>), OrderConflict> {
    let sequence = linearize(relation, elements)?;
    let order = total_order_from_sequence(&sequence);
    Ok((sequence, order))
}
