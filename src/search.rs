use crate::data::{ParticipantId, PreviousPairs, Seed};
use crate::error::AssignmentError;
use crate::graph::CompatibilityGraph;
use crate::shuffle::seeded_shuffle;
use log::{debug, info, trace};
use std::collections::HashSet;

/// A gift cycle found by the search, and the attempt (1-based) that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub cycle: Vec<ParticipantId>,
    pub attempt: u32,
}

/// Randomized-restart backtracking search for a single cycle through every
/// participant. Edges in `soft_avoid` are tried after all others and a cycle
/// using fewer of them is preferred, but they are never refused outright.
pub struct CycleSearch<'a> {
    graph: &'a CompatibilityGraph,
    soft_avoid: &'a PreviousPairs,
}

impl<'a> CycleSearch<'a> {
    pub fn new(graph: &'a CompatibilityGraph, soft_avoid: &'a PreviousPairs) -> Self {
        Self { graph, soft_avoid }
    }

    /// Runs attempts `0..max_attempts`, attempt `k` using seed `base_seed + k`.
    pub fn run(&self, base_seed: Seed, max_attempts: u32) -> Result<Found, AssignmentError> {
        for k in 0..max_attempts {
            let seed = base_seed.wrapping_add(Seed::from(k));
            if let Some(cycle) = self.attempt(seed) {
                info!("Assignments generated successfully on attempt {}", k + 1);
                return Ok(Found {
                    cycle,
                    attempt: k + 1,
                });
            }
            debug!("Attempt {} (seed {}) found no cycle", k + 1, seed);
        }
        Err(AssignmentError::AttemptsExhausted {
            attempts: max_attempts,
        })
    }

    /// One shuffle-and-search pass. The shuffle picks the starting participant.
    pub fn attempt(&self, seed: Seed) -> Option<Vec<ParticipantId>> {
        let shuffled = seeded_shuffle(self.graph.participants(), seed);
        let start = *shuffled.first()?;
        trace!("Attempt with seed {} starts at participant {}", seed, start);
        self.cycle_from(start)
    }

    /// Depth-first search with an explicit stack. `path[i]` owns the candidate
    /// iterator `frames[i]` and the running count `repeats[i]` of previous-year
    /// pairs on the path up to it; popping a frame also pops and unvisits its node.
    ///
    /// A closed cycle with no previous-year pair is returned at once. One that
    /// repeats some is kept as the fallback while the search goes on looking
    /// for a cycle with fewer repeats, and branches that already repeat as
    /// many as the fallback are skipped. The fallback is returned if nothing
    /// better turns up.
    fn cycle_from(&self, start: ParticipantId) -> Option<Vec<ParticipantId>> {
        let total = self.graph.len();
        let mut visited: HashSet<ParticipantId> = HashSet::with_capacity(total);
        let mut path: Vec<ParticipantId> = Vec::with_capacity(total);
        let mut repeats: Vec<u32> = Vec::with_capacity(total);
        let mut frames: Vec<std::vec::IntoIter<ParticipantId>> = Vec::with_capacity(total);
        let mut fallback: Option<(u32, Vec<ParticipantId>)> = None;

        visited.insert(start);
        path.push(start);
        repeats.push(0);
        frames.push(self.candidates(start, &visited).into_iter());

        let mut expanded: u64 = 0;
        loop {
            if path.len() == total {
                if let (Some(&last), Some(&so_far)) = (path.last(), repeats.last()) {
                    if self.graph.has_edge(last, start) {
                        let cost = so_far + self.repeat_cost(last, start);
                        if cost == 0 {
                            trace!("Closed cycle from {} after {} expansions", start, expanded);
                            return Some(path);
                        }
                        if fallback.as_ref().is_none_or(|(best, _)| cost < *best) {
                            trace!("Cycle from {} repeating {} previous pair(s) kept as fallback", start, cost);
                            fallback = Some((cost, path.clone()));
                        }
                    }
                }
            }

            let Some(frame) = frames.last_mut() else {
                break;
            };
            match frame.next() {
                Some(node) => {
                    let (Some(&current), Some(&so_far)) = (path.last(), repeats.last()) else {
                        break;
                    };
                    let cost = so_far + self.repeat_cost(current, node);
                    if fallback.as_ref().is_some_and(|(best, _)| cost >= *best) {
                        continue;
                    }
                    expanded += 1;
                    visited.insert(node);
                    path.push(node);
                    repeats.push(cost);
                    frames.push(self.candidates(node, &visited).into_iter());
                }
                None => {
                    // dead end, backtrack
                    frames.pop();
                    repeats.pop();
                    if let Some(node) = path.pop() {
                        visited.remove(&node);
                    }
                }
            }
        }

        if let Some((cost, _)) = &fallback {
            debug!("No cycle from {} avoids previous pairs; best repeats {}", start, cost);
        }
        fallback.map(|(_, cycle)| cycle)
    }

    fn repeat_cost(&self, giver: ParticipantId, receiver: ParticipantId) -> u32 {
        u32::from(self.soft_avoid.contains(giver, receiver))
    }

    /// Unvisited receivers of `current`, previous-year pairs last, graph order otherwise.
    fn candidates(&self, current: ParticipantId, visited: &HashSet<ParticipantId>) -> Vec<ParticipantId> {
        let mut candidates: Vec<ParticipantId> = self
            .graph
            .receivers(current)
            .iter()
            .copied()
            .filter(|id| !visited.contains(id))
            .collect();
        candidates.sort_by_key(|&id| self.soft_avoid.contains(current, id));
        candidates
    }
}
