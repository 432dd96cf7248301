use crate::data::{Assignment, ExclusionMap, Participant, ParticipantId};
use crate::error::{AssignmentError, Violation};
use std::collections::HashSet;

/// Re-checks a finished assignment set against every hard rule.
///
/// Runs after each successful search no matter how the set was produced:
/// every id must be a participant, nobody gives to themselves, no excluded
/// pair appears, and each participant gives once and receives once.
pub fn validate(
    assignments: &[Assignment],
    participants: &[Participant],
    exclusions: &ExclusionMap,
) -> Result<(), AssignmentError> {
    let known: HashSet<ParticipantId> = participants.iter().map(|p| p.id).collect();
    let mut givers = HashSet::with_capacity(assignments.len());
    let mut receivers = HashSet::with_capacity(assignments.len());

    for assignment in assignments {
        let Assignment {
            giver_id,
            receiver_id,
        } = *assignment;

        for id in [giver_id, receiver_id] {
            if !known.contains(&id) {
                return Err(Violation::UnknownParticipant(id).into());
            }
        }
        if giver_id == receiver_id {
            return Err(Violation::SelfAssignment(giver_id).into());
        }
        if exclusions.is_excluded(giver_id, receiver_id) {
            return Err(Violation::ExcludedPair {
                giver: giver_id,
                receiver: receiver_id,
                reason: exclusions.reason(giver_id, receiver_id).map(str::to_string),
            }
            .into());
        }

        givers.insert(giver_id);
        receivers.insert(receiver_id);
    }

    let expected = known.len();
    if assignments.len() != expected || givers.len() != expected || receivers.len() != expected {
        return Err(Violation::Coverage {
            expected,
            assignments: assignments.len(),
            givers: givers.len(),
            receivers: receivers.len(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ExclusionRecord;

    fn trio() -> Vec<Participant> {
        vec![
            Participant::new(1, "Ann", "ann@example.com"),
            Participant::new(2, "Bob", "bob@example.com"),
            Participant::new(3, "Cy", "cy@example.com"),
        ]
    }

    fn set(pairs: &[(ParticipantId, ParticipantId)]) -> Vec<Assignment> {
        pairs.iter().map(|&(g, r)| Assignment::new(g, r)).collect()
    }

    #[test]
    fn accepts_a_valid_cycle() {
        assert_eq!(
            validate(&set(&[(1, 2), (2, 3), (3, 1)]), &trio(), &ExclusionMap::new()),
            Ok(())
        );
    }

    #[test]
    fn rejects_self_assignment() {
        let err = validate(&set(&[(1, 1), (2, 3), (3, 2)]), &trio(), &ExclusionMap::new()).unwrap_err();
        assert_eq!(err, AssignmentError::InvariantViolation(Violation::SelfAssignment(1)));
    }

    #[test]
    fn rejects_excluded_pair_in_either_direction() {
        let mut exclusions = ExclusionMap::new();
        exclusions.insert(3, 1);
        let err = validate(&set(&[(1, 2), (2, 3), (3, 1)]), &trio(), &exclusions).unwrap_err();
        assert_eq!(
            err,
            AssignmentError::InvariantViolation(Violation::ExcludedPair {
                giver: 3,
                receiver: 1,
                reason: None
            })
        );
    }

    #[test]
    fn excluded_pair_names_the_recorded_reason() {
        let exclusions = ExclusionMap::from_records(&[ExclusionRecord {
            participant_id: 1,
            excluded_participant_id: 2,
            reason: Some("married".to_string()),
        }]);
        let err = validate(&set(&[(1, 2), (2, 3), (3, 1)]), &trio(), &exclusions).unwrap_err();
        assert_eq!(
            err,
            AssignmentError::InvariantViolation(Violation::ExcludedPair {
                giver: 1,
                receiver: 2,
                reason: Some("married".to_string())
            })
        );
        assert!(err.to_string().ends_with("participant 1 is excluded from giving to participant 2 (married)"));
    }

    #[test]
    fn rejects_unknown_participant() {
        let err = validate(&set(&[(1, 2), (2, 9), (3, 1)]), &trio(), &ExclusionMap::new()).unwrap_err();
        assert_eq!(err, AssignmentError::InvariantViolation(Violation::UnknownParticipant(9)));
    }

    #[test]
    fn rejects_missing_and_repeated_receivers() {
        let err = validate(&set(&[(1, 2), (2, 1), (3, 1)]), &trio(), &ExclusionMap::new()).unwrap_err();
        assert!(matches!(
            err,
            AssignmentError::InvariantViolation(Violation::Coverage { receivers: 2, .. })
        ));

        let err = validate(&set(&[(1, 2), (2, 3)]), &trio(), &ExclusionMap::new()).unwrap_err();
        assert!(matches!(
            err,
            AssignmentError::InvariantViolation(Violation::Coverage { assignments: 2, .. })
        ));
    }

    #[test]
    fn rejects_extra_assignments() {
        let err = validate(
            &set(&[(1, 2), (2, 3), (3, 1), (1, 3)]),
            &trio(),
            &ExclusionMap::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AssignmentError::InvariantViolation(Violation::Coverage { assignments: 4, .. })
        ));
    }
}
