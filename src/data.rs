use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

// Type aliases for clarity
pub type ParticipantId = u64;
pub type Seed = i64;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;
pub const MAX_ATTEMPTS_CEILING: u32 = 10_000;

/// A member of the gift exchange. Name and email are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

/// One exclusion as stored by the caller. Applies in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionRecord {
    pub participant_id: ParticipantId,
    pub excluded_participant_id: ParticipantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A pairing from an earlier round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousPair {
    pub giver_id: ParticipantId,
    pub receiver_id: ParticipantId,
}

/// A single giver -> receiver pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub giver_id: ParticipantId,
    pub receiver_id: ParticipantId,
}

impl Assignment {
    pub fn new(giver_id: ParticipantId, receiver_id: ParticipantId) -> Self {
        Self {
            giver_id,
            receiver_id,
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.giver_id, self.receiver_id)
    }
}

/// Symmetric exclusion relation: identifier -> identifiers it may not be paired with.
#[derive(Debug, Clone, Default)]
pub struct ExclusionMap {
    excluded: HashMap<ParticipantId, HashSet<ParticipantId>>,
    reasons: HashMap<(ParticipantId, ParticipantId), String>,
}

impl ExclusionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the relation from stored records, adding the reverse direction of each.
    pub fn from_records(records: &[ExclusionRecord]) -> Self {
        let mut map = Self::new();
        for record in records {
            map.insert(record.participant_id, record.excluded_participant_id);
            if let Some(reason) = &record.reason {
                if !reason.is_empty() {
                    map.reasons
                        .insert(pair_key(record.participant_id, record.excluded_participant_id), reason.clone());
                }
            }
        }
        map
    }

    /// Forbids `a` and `b` from giving to each other. Self-exclusions are ignored.
    pub fn insert(&mut self, a: ParticipantId, b: ParticipantId) {
        if a == b {
            return;
        }
        self.excluded.entry(a).or_default().insert(b);
        self.excluded.entry(b).or_default().insert(a);
    }

    pub fn is_excluded(&self, giver: ParticipantId, receiver: ParticipantId) -> bool {
        self.excluded
            .get(&giver)
            .is_some_and(|set| set.contains(&receiver))
    }

    pub fn reason(&self, a: ParticipantId, b: ParticipantId) -> Option<&str> {
        self.reasons.get(&pair_key(a, b)).map(String::as_str)
    }

    /// Every identifier mentioned on either side of an exclusion.
    pub fn mentioned_ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.excluded.keys().copied()
    }

    /// Number of distinct unordered pairs.
    pub fn len(&self) -> usize {
        self.excluded.values().map(HashSet::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

fn pair_key(a: ParticipantId, b: ParticipantId) -> (ParticipantId, ParticipantId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Ordered (giver, receiver) pairs the search tries last.
#[derive(Debug, Clone, Default)]
pub struct PreviousPairs {
    pairs: HashSet<(ParticipantId, ParticipantId)>,
}

impl PreviousPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[PreviousPair]) -> Self {
        Self {
            pairs: records.iter().map(|p| (p.giver_id, p.receiver_id)).collect(),
        }
    }

    pub fn insert(&mut self, giver: ParticipantId, receiver: ParticipantId) {
        self.pairs.insert((giver, receiver));
    }

    pub fn contains(&self, giver: ParticipantId, receiver: ParticipantId) -> bool {
        self.pairs.contains(&(giver, receiver))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Options for one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub max_attempts: u32,
    pub seed: Seed,
}

impl GenerationOptions {
    pub fn new(seed: Seed) -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Options as they arrive over the wire; missing fields fall back to server defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    pub max_attempts: Option<u32>,
    pub seed: Option<Seed>,
}

/// The complete input for one generation request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationInput {
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub exclusions: Vec<ExclusionRecord>,
    #[serde(default)]
    pub previous_pairs: Vec<PreviousPair>,
    #[serde(default)]
    pub options: RequestOptions,
}

/// An externally produced assignment set to be checked against the hard rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationInput {
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub exclusions: Vec<ExclusionRecord>,
    pub assignments: Vec<Assignment>,
}

/// A complete, ordered list of assignments: giver i gives to receiver i.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentSet(Vec<Assignment>);

impl AssignmentSet {
    /// Turns a closed path into assignments, each node giving to its successor.
    pub fn from_cycle(cycle: &[ParticipantId]) -> Self {
        let assignments = cycle
            .iter()
            .enumerate()
            .map(|(i, &giver)| Assignment::new(giver, cycle[(i + 1) % cycle.len()]))
            .collect();
        Self(assignments)
    }

    pub fn receiver_of(&self, giver: ParticipantId) -> Option<ParticipantId> {
        self.0
            .iter()
            .find(|a| a.giver_id == giver)
            .map(|a| a.receiver_id)
    }

    pub fn giver_of(&self, receiver: ParticipantId) -> Option<ParticipantId> {
        self.0
            .iter()
            .find(|a| a.receiver_id == receiver)
            .map(|a| a.giver_id)
    }

    /// True when following receiver links from the first giver visits every
    /// giver once and comes back after exactly `len()` steps.
    pub fn is_single_cycle(&self) -> bool {
        let Some(first) = self.0.first() else {
            return false;
        };
        let start = first.giver_id;
        let mut seen = HashSet::with_capacity(self.0.len());
        let mut current = start;
        for _ in 0..self.0.len() {
            if !seen.insert(current) {
                return false;
            }
            match self.receiver_of(current) {
                Some(next) => current = next,
                None => return false,
            }
        }
        current == start
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Assignment] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Assignment> {
        self.0
    }
}

impl From<Vec<Assignment>> for AssignmentSet {
    fn from(assignments: Vec<Assignment>) -> Self {
        Self(assignments)
    }
}

impl<'a> IntoIterator for &'a AssignmentSet {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The final output of the generator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    pub assignments: AssignmentSet,
    /// Number of shuffle-and-search attempts used, starting at 1.
    pub attempts: u32,
    pub seed: Seed,
    /// Assignments that reproduce a pairing from the previous round.
    pub repeated_previous_pairs: Vec<Assignment>,
    pub avoided_previous: bool,
}
