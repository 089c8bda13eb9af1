//! Value objects for Automata Ordering
//!
//! States, signals, ordered pairs and relations over them.

use super::errors::OrderConflict;
use serde::{Deserialize, Serialize};
use std::collections::hash_set;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Capability of taking part in relation and order computations.
///
/// Both the closure engine and the merge logic of the search are written
/// once against this trait and used for states and output signals alike.
pub trait Orderable: Clone + Eq + Hash + Ord + fmt::Debug + Send + Sync {
    /// Human-readable label used in conflict messages and logs.
    fn label(&self) -> String;
}

/// Automaton state, identified and ordered by its numeric label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct State(u32);

impl State {
    pub fn new(label: u32) -> Self {
        Self(label)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Orderable for State {
    fn label(&self) -> String {
        self.0.to_string()
    }
}

/// Named input signal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InputSignal(String);

impl InputSignal {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InputSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named output signal, ordered by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputSignal(String);

impl OutputSignal {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutputSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Orderable for OutputSignal {
    fn label(&self) -> String {
        self.0.clone()
    }
}

/// Ordered pair `(left, right)`, read as "left precedes right".
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair<T> {
    pub left: T,
    pub right: T,
}

impl<T: Orderable> Pair<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// The pair with both sides swapped.
    pub fn reverted(&self) -> Self {
        Self {
            left: self.right.clone(),
            right: self.left.clone(),
        }
    }

    pub fn is_reflexive(&self) -> bool {
        self.left == self.right
    }
}

impl<T: Orderable> fmt::Display for Pair<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.left.label(), self.right.label())
    }
}

/// Set of ordered pairs, interpreted as "left precedes-or-equals right".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relation<T: Orderable> {
    pairs: HashSet<Pair<T>>,
}

impl<T: Orderable> Relation<T> {
    pub fn new() -> Self {
        Self {
            pairs: HashSet::new(),
        }
    }

    /// Relation holding only `(t, t)` for every element.
    pub fn reflexive(elements: &[T]) -> Self {
        elements
            .iter()
            .map(|t| Pair::new(t.clone(), t.clone()))
            .collect()
    }

    pub fn contains(&self, pair: &Pair<T>) -> bool {
        self.pairs.contains(pair)
    }

    /// True if the pair or its reverse is already decided.
    pub fn decides(&self, pair: &Pair<T>) -> bool {
        self.pairs.contains(pair) || self.pairs.contains(&pair.reverted())
    }

    /// Insert a pair. Returns `false` if it was already present.
    pub fn insert(&mut self, pair: Pair<T>) -> bool {
        self.pairs.insert(pair)
    }

    /// Insert a non-reflexive pair, refusing it if its reverse is present.
    ///
    /// Returns `Ok(false)` if the pair was already present.
    pub fn insert_oriented(&mut self, pair: Pair<T>) -> Result<bool, OrderConflict> {
        if !pair.is_reflexive() && self.pairs.contains(&pair.reverted()) {
            return Err(OrderConflict::symmetric_pair(&pair));
        }
        Ok(self.pairs.insert(pair))
    }

    /// Add every pair of `other`, failing on the first antisymmetry violation.
    pub fn merge(&mut self, other: &Relation<T>) -> Result<(), OrderConflict> {
        for pair in other.iter() {
            if !pair.is_reflexive() && self.pairs.contains(&pair.reverted()) {
                return Err(OrderConflict::new(format!(
                    "Can't merge relations as found symmetric pair for {}",
                    pair
                )));
            }
            self.pairs.insert(pair.clone());
        }
        Ok(())
    }

    /// Every pair mapped to its reverse.
    pub fn reverted(&self) -> Self {
        self.pairs.iter().map(Pair::reverted).collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, Pair<T>> {
        self.pairs.iter()
    }

    /// Pairs in sorted order, for stable logs and assertions.
    pub fn sorted_pairs(&self) -> Vec<Pair<T>> {
        let mut pairs: Vec<_> = self.pairs.iter().cloned().collect();
        pairs.sort();
        pairs
    }
}

impl<T: Orderable> Default for Relation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Orderable> FromIterator<Pair<T>> for Relation<T> {
    fn from_iter<I: IntoIterator<Item = Pair<T>>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl<T: Orderable> IntoIterator for Relation<T> {
    type Item = Pair<T>;
    type IntoIter = hash_set::IntoIter<Pair<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl<'a, T: Orderable> IntoIterator for &'a Relation<T> {
    type Item = &'a Pair<T>;
    type IntoIter = hash_set::Iter<'a, Pair<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl<T: Orderable> fmt::Display for Relation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.sorted_pairs().iter().map(Pair::to_string).collect();
        write!(f, "{{{}}}", rendered.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(label: u32) -> State {
        State::new(label)
    }

    fn pair(l: u32, r: u32) -> Pair<State> {
        Pair::new(s(l), s(r))
    }

    #[test]
    fn test_pair_reverted() {
        assert_eq!(pair(1, 2).reverted(), pair(2, 1));
        assert_eq!(pair(3, 3).reverted(), pair(3, 3));
    }

    #[test]
    fn test_pair_display() {
        let p = Pair::new(OutputSignal::new("x"), OutputSignal::new("y"));
        assert_eq!(p.to_string(), "(x, y)");
    }

    #[test]
    fn test_state_ordering_by_label() {
        assert!(s(1) < s(2));
        assert!(OutputSignal::new("w") < OutputSignal::new("x"));
    }

    #[test]
    fn test_relation_decides() {
        let relation: Relation<State> = [pair(1, 2)].into_iter().collect();

        assert!(relation.decides(&pair(1, 2)));
        assert!(relation.decides(&pair(2, 1)));
        assert!(!relation.decides(&pair(1, 3)));
    }

    #[test]
    fn test_merge_rejects_reverse_pair() {
        let mut relation: Relation<State> = [pair(1, 2)].into_iter().collect();
        let other: Relation<State> = [pair(3, 4), pair(2, 1)].into_iter().collect();

        assert!(relation.merge(&other).is_err());
    }

    #[test]
    fn test_merge_accepts_shared_reflexive_pairs() {
        let mut relation = Relation::reflexive(&[s(1), s(2)]);
        let other: Relation<State> = [pair(1, 1), pair(1, 2)].into_iter().collect();

        relation.merge(&other).unwrap();
        assert_eq!(relation.len(), 3);
    }

    #[test]
    fn test_insert_oriented() {
        let mut relation = Relation::new();

        assert!(relation.insert_oriented(pair(1, 2)).unwrap());
        assert!(!relation.insert_oriented(pair(1, 2)).unwrap());
        assert!(relation.insert_oriented(pair(2, 1)).is_err());
    }

    #[test]
    fn test_relation_display_is_sorted() {
        let relation: Relation<State> = [pair(2, 3), pair(1, 2)].into_iter().collect();
        assert_eq!(relation.to_string(), "{(1, 2), (2, 3)}");
    }
}
