//! Submission phases
//!
//! `Idle → Submitting | Deleting → Succeeded | Failed → Idle`. Requests start
//! only from `Idle`.

use std::fmt::{self, Display, Formatter};

/// Where an editor is in its request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitPhase {
    /// Ready for a new request
    Idle,
    /// Create/update in flight
    Submitting,
    /// Delete in flight
    Deleting,
    /// Request succeeded; side effects running
    Succeeded,
    /// Request failed; error being surfaced
    Failed,
}

impl SubmitPhase {
    /// Whether a request is in flight
    #[inline]
    #[must_use]
    pub fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl Display for SubmitPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Deleting => "deleting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        })
    }
}

/// Validates a phase transition.
///
/// # Errors
/// `IllegalTransition` if `to` is not reachable from `from`.
pub fn validate_transition(from: SubmitPhase, to: SubmitPhase) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError::IllegalTransition { from, to })
    }
}

#[must_use]
pub fn allowed_transitions(from: SubmitPhase) -> Vec<SubmitPhase> {
    use SubmitPhase::*;
    match from {
        Idle => vec![Submitting, Deleting],
        Submitting | Deleting => vec![Succeeded, Failed],
        Succeeded | Failed => vec![Idle],
    }
}

/// Phase machine errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition not in the allowed table
    #[error("illegal transition {from} -> {to}")]
    IllegalTransition { from: SubmitPhase, to: SubmitPhase },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn idle_transitions() {
        assert!(validate_transition(SubmitPhase::Idle, SubmitPhase::Submitting).is_ok());
        assert!(validate_transition(SubmitPhase::Idle, SubmitPhase::Deleting).is_ok());

        // Invalid
        assert!(validate_transition(SubmitPhase::Idle, SubmitPhase::Succeeded).is_err());
        assert!(validate_transition(SubmitPhase::Submitting, SubmitPhase::Submitting).is_err());
        assert!(validate_transition(SubmitPhase::Failed, SubmitPhase::Submitting).is_err());
    }

    #[test]
    fn error_names_both_phases() {
        let err = validate_transition(SubmitPhase::Succeeded, SubmitPhase::Failed).unwrap_err();
        assert_eq!(err.to_string(), "illegal transition succeeded -> failed");
    }

    fn any_phase() -> impl Strategy<Value = SubmitPhase> {
        prop_oneof![
            Just(SubmitPhase::Idle),
            Just(SubmitPhase::Submitting),
            Just(SubmitPhase::Deleting),
            Just(SubmitPhase::Succeeded),
            Just(SubmitPhase::Failed),
        ]
    }

    proptest! {
        #[test]
        fn prop_requests_start_only_from_idle(from in any_phase()) {
            let starts = validate_transition(from, SubmitPhase::Submitting).is_ok();
            prop_assert_eq!(starts, from == SubmitPhase::Idle);
        }

        #[test]
        fn prop_every_busy_phase_returns_to_idle(from in any_phase()) {
            let mut phase = from;
            for _ in 0..2 {
                if phase == SubmitPhase::Idle {
                    break;
                }
                phase = *allowed_transitions(phase).last().unwrap();
            }
            prop_assert_eq!(phase, SubmitPhase::Idle);
        }
    }
}
