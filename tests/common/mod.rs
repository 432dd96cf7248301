#![allow(dead_code)]

use santa_solver::{Assignment, AssignmentSet, ExclusionMap, Participant, ParticipantId};
use std::collections::HashSet;

pub fn participants(ids: &[ParticipantId]) -> Vec<Participant> {
    ids.iter()
        .map(|&id| Participant::new(id, format!("Person {id}"), format!("person{id}@example.com")))
        .collect()
}

pub fn exclusions(pairs: &[(ParticipantId, ParticipantId)]) -> ExclusionMap {
    let mut map = ExclusionMap::new();
    for &(a, b) in pairs {
        map.insert(a, b);
    }
    map
}

/// Asserts every hard rule, and that receiver links form one cycle.
pub fn assert_single_valid_cycle(set: &AssignmentSet, ids: &[ParticipantId], excluded: &ExclusionMap) {
    assert_eq!(set.len(), ids.len());
    let givers: HashSet<ParticipantId> = set.iter().map(|a| a.giver_id).collect();
    let receivers: HashSet<ParticipantId> = set.iter().map(|a| a.receiver_id).collect();
    let all: HashSet<ParticipantId> = ids.iter().copied().collect();
    assert_eq!(givers, all);
    assert_eq!(receivers, all);
    for &Assignment {
        giver_id,
        receiver_id,
    } in set
    {
        assert_ne!(giver_id, receiver_id, "self-assignment for {giver_id}");
        assert!(
            !excluded.is_excluded(giver_id, receiver_id),
            "excluded pair {giver_id} -> {receiver_id}"
        );
    }

    let start = ids[0];
    let mut current = start;
    for _ in 0..ids.len() {
        current = set.receiver_of(current).expect("every participant gives");
    }
    assert_eq!(current, start, "following receivers {} times must return to the start", ids.len());
    assert!(set.is_single_cycle());
}
