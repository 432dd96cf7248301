use crate::data::ParticipantId;
use thiserror::Error;

/// Smallest group that can form a gift cycle without reciprocal pairs.
pub const MIN_PARTICIPANTS: usize = 3;

pub const IMPOSSIBLE_MESSAGE: &str = "Assignment is mathematically impossible with current exclusions. \
     Please remove some exclusions or add more participants.";

pub const EXHAUSTED_MESSAGE: &str = "Unable to generate valid Secret Santa assignments after maximum attempts. \
     Please review exclusions and previous assignments.";

/// Why the constraint graph was rejected before any search ran.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Infeasibility {
    #[error("At least 3 participants are required for Secret Santa (got {count})")]
    TooFewParticipants { count: usize },

    #[error("participant {0} has no possible receivers")]
    NoReceivers(ParticipantId),

    #[error("participant {0} has no possible givers")]
    NoGivers(ParticipantId),

    /// Several givers can only give to the same receiver.
    #[error("participants {givers:?} can only give to participant {receiver}")]
    SharedForcedReceiver {
        receiver: ParticipantId,
        givers: Vec<ParticipantId>,
    },

    /// One giver is the only possible giver of several receivers.
    #[error("participant {giver} is the only possible giver for participants {receivers:?}")]
    SharedForcedGiver {
        giver: ParticipantId,
        receivers: Vec<ParticipantId>,
    },

    #[error("participants {0} and {1} could only give to each other")]
    ForcedPairCycle(ParticipantId, ParticipantId),
}

/// A generated assignment set that breaks one of the hard rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("participant {0} is not part of this group")]
    UnknownParticipant(ParticipantId),

    #[error("participant {0} is assigned to themselves")]
    SelfAssignment(ParticipantId),

    #[error("participant {giver} is excluded from giving to participant {receiver}{}", reason_suffix(.reason))]
    ExcludedPair {
        giver: ParticipantId,
        receiver: ParticipantId,
        reason: Option<String>,
    },

    #[error(
        "expected {expected} participants to give and receive once, found {assignments} assignments \
         covering {givers} givers and {receivers} receivers"
    )]
    Coverage {
        expected: usize,
        assignments: usize,
        givers: usize,
        receivers: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("{}", infeasible_message(.0))]
    InfeasibleConstraints(Infeasibility),

    #[error("{}", EXHAUSTED_MESSAGE)]
    AttemptsExhausted { attempts: u32 },

    #[error("generated assignments failed validation: {0}")]
    InvariantViolation(Violation),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl AssignmentError {
    /// Stable machine-readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            AssignmentError::InfeasibleConstraints(_) => "infeasible_constraints",
            AssignmentError::AttemptsExhausted { .. } => "attempts_exhausted",
            AssignmentError::InvariantViolation(_) => "invariant_violation",
            AssignmentError::InvalidInput(_) => "invalid_input",
        }
    }

    /// Only an exhausted search can succeed when called again with a larger budget.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AssignmentError::AttemptsExhausted { .. })
    }
}

impl From<Infeasibility> for AssignmentError {
    fn from(reason: Infeasibility) -> Self {
        AssignmentError::InfeasibleConstraints(reason)
    }
}

impl From<Violation> for AssignmentError {
    fn from(violation: Violation) -> Self {
        AssignmentError::InvariantViolation(violation)
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default()
}

fn infeasible_message(reason: &Infeasibility) -> String {
    match reason {
        Infeasibility::TooFewParticipants { .. } => reason.to_string(),
        other => format!("{IMPOSSIBLE_MESSAGE} ({other})"),
    }
}
