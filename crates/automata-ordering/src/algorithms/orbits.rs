//! Orbit Computation
//!
//! The transition orbit of a seed pair is the smallest set of state pairs
//! containing the seed and closed under applying any input signal to both
//! sides at once. Its output orbit is the set of output pairs those state
//! pairs emit. Orbits of all pairs are computed in parallel with rayon and
//! shared through a concurrent cache so a worker can splice in a sub-orbit
//! another worker already finished.

use crate::config::OrderingConfig;
use crate::domain::entities::{Orbit, OrbitMap};
use crate::domain::errors::OrderConflict;
use crate::domain::value_objects::{OutputSignal, Pair, Relation, State};
use crate::ports::outbound::AutomatonModel;
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Add-only concurrent map from seed pair to its finished orbit.
///
/// Entries are never overwritten, so a reader either sees a complete orbit
/// or nothing and computes the orbit itself.
#[derive(Debug, Default)]
pub struct OrbitCache {
    orbits: DashMap<Pair<State>, Arc<Orbit>>,
}

impl OrbitCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an orbit unless one is already cached for `pair`.
    pub fn insert(&self, pair: Pair<State>, orbit: Orbit) {
        self.orbits.entry(pair).or_insert_with(|| Arc::new(orbit));
    }

    /// Cached orbit, cloned out of the shard so no lock is held by the caller.
    pub fn get(&self, pair: &Pair<State>) -> Option<Arc<Orbit>> {
        self.orbits.get(pair).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.orbits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orbits.is_empty()
    }

    pub fn into_map(self) -> OrbitMap {
        self.orbits
            .into_iter()
            .map(|(pair, orbit)| {
                let orbit = Arc::try_unwrap(orbit).unwrap_or_else(|shared| (*shared).clone());
                (pair, orbit)
            })
            .collect()
    }
}

/// All pairs `(s1, s2)` with `s1 < s2`, outer loop over `s1` in declared order.
pub fn find_all_state_pairs(states: &[State]) -> Vec<Pair<State>> {
    let mut pairs = Vec::new();
    for s1 in states {
        for s2 in states {
            if s1 < s2 {
                pairs.push(Pair::new(*s1, *s2));
            }
        }
    }
    pairs
}

/// Transition orbit of `seed`.
///
/// Fails if the orbit would contain some pair together with its reverse.
pub fn transition_orbit<M: AutomatonModel + ?Sized>(
    model: &M,
    seed: &Pair<State>,
    cache: &OrbitCache,
) -> Result<Relation<State>, OrderConflict> {
    let mut orbit = Relation::new();
    orbit.insert(seed.clone());

    let mut processed: HashSet<Pair<State>> = HashSet::new();
    let mut pending: VecDeque<Pair<State>> = VecDeque::from([seed.clone()]);

    while let Some(pair) = pending.pop_front() {
        if !processed.insert(pair.clone()) {
            continue;
        }

        for input in model.input_signals() {
            let (Some(left), Some(right)) = (
                model.target(&pair.left, input),
                model.target(&pair.right, input),
            ) else {
                continue;
            };
            let next = Pair::new(*left, *right);
            if next.is_reflexive() || orbit.contains(&next) {
                continue;
            }
            if orbit.contains(&next.reverted()) {
                return Err(conflict(&next, seed));
            }

            trace!(%pair, %input, %next, "Extending orbit");
            orbit.insert(next.clone());

            match cache.get(&next) {
                Some(cached) => {
                    for cached_pair in cached.transition_orbit.iter() {
                        if orbit.contains(&cached_pair.reverted()) {
                            return Err(conflict(cached_pair, seed));
                        }
                        if orbit.insert(cached_pair.clone()) {
                            pending.push_back(cached_pair.clone());
                        }
                    }
                    processed.insert(next);
                }
                None => pending.push_back(next),
            }
        }
    }

    Ok(orbit)
}

/// Output orbit induced by a transition orbit.
pub fn output_orbit<M: AutomatonModel + ?Sized>(
    model: &M,
    transition_orbit: &Relation<State>,
) -> Result<Relation<OutputSignal>, OrderConflict> {
    let mut orbit = Relation::new();

    for pair in transition_orbit {
        for input in model.input_signals() {
            let (Some(left), Some(right)) = (
                model.output(&pair.left, input),
                model.output(&pair.right, input),
            ) else {
                continue;
            };
            let output_pair = Pair::new(left.clone(), right.clone());
            if output_pair.is_reflexive() {
                continue;
            }
            orbit.insert_oriented(output_pair)?;
        }
    }

    Ok(orbit)
}

/// Transition orbit of `seed` together with its output orbit.
pub fn compute_orbit<M: AutomatonModel + ?Sized>(
    model: &M,
    seed: &Pair<State>,
    cache: &OrbitCache,
) -> Result<Orbit, OrderConflict> {
    let transitions = transition_orbit(model, seed, cache)?;
    let outputs = output_orbit(model, &transitions)?;
    Ok(Orbit::new(transitions, outputs))
}

/// Orbits of every pair in `pairs`.
///
/// Runs on the rayon pool when enabled and `pairs` reaches the configured
/// threshold. The first conflict raised by any worker halts the rest and is
/// returned; which one wins under concurrency is unspecified.
pub fn compute_all_orbits<M: AutomatonModel + ?Sized>(
    model: &M,
    pairs: &[Pair<State>],
    config: &OrderingConfig,
) -> Result<OrbitMap, OrderConflict> {
    let cache = OrbitCache::new();
    let halted = AtomicBool::new(false);

    let run = |pair: &Pair<State>| -> Result<(), OrderConflict> {
        if halted.load(Ordering::Acquire) {
            return Ok(());
        }
        match compute_orbit(model, pair, &cache) {
            Ok(orbit) => {
                cache.insert(pair.clone(), orbit);
                Ok(())
            }
            Err(e) => {
                halted.store(true, Ordering::Release);
                error!(%pair, error = %e, "Orbit computation failed");
                Err(e)
            }
        }
    };

    let parallel = config.parallel_orbits && pairs.len() >= config.parallel_threshold;
    debug!(pair_count = pairs.len(), parallel, "Computing orbits");

    if parallel {
        pairs.par_iter().try_for_each(run)?;
    } else {
        pairs.iter().try_for_each(run)?;
    }

    debug!(orbit_count = cache.len(), "Orbits computed");
    Ok(cache.into_map())
}

fn conflict(pair: &Pair<State>, seed: &Pair<State>) -> OrderConflict {
    OrderConflict::symmetric_pair_from_seed(pair, seed)
}
