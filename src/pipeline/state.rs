//! Request pipeline state machine
//!
//! Deterministic finite state machine driving one prediction request:
//! - Safety: no invalid states reachable
//! - Liveness: every run ends in Rendered or Failed
//! - Determinism: unique next state per event

use crate::errors::{PredictError, Result};
use serde::{Deserialize, Serialize};

/// Request pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Request received, nothing checked yet
    Idle,

    /// Normalizing the submission and encoding it
    Validating,

    /// Classifier running on the encoded vector
    Predicting,

    /// Result produced (terminal)
    Rendered,

    /// Request ended with an error page (terminal)
    Failed,
}

/// Events that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Form submitted
    Submit,

    /// Submission encoded successfully
    InputAccepted,

    /// Submission rejected (empty or unknown symptoms)
    InputRejected,

    /// Classifier returned a result
    PredictionComplete,

    /// Classifier failed
    PredictionFailed,

    /// Model unavailable or internal error
    Abort,
}

impl PipelineState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Rendered | PipelineState::Failed)
    }

    /// Attempt state transition with validation
    ///
    /// Valid transitions:
    ///
    /// ```text
    /// Idle       -> Validating  (Submit)
    /// Validating -> Predicting  (InputAccepted)
    /// Validating -> Failed      (InputRejected)
    /// Predicting -> Rendered    (PredictionComplete)
    /// Predicting -> Failed      (PredictionFailed)
    /// Rendered   -> Rendered    (terminal)
    /// Failed     -> Failed      (terminal)
    /// Idle, Validating, Predicting -> Failed  (Abort)
    /// ```
    pub fn transition(&self, event: PipelineEvent) -> Result<PipelineState> {
        use PipelineEvent::*;
        use PipelineState::*;

        if event == Abort {
            return Ok(match self {
                Rendered => Rendered,
                _ => Failed,
            });
        }

        let next_state = match (self, event) {
            (Idle, Submit) => Validating,

            (Validating, InputAccepted) => Predicting,
            (Validating, InputRejected) => Failed,

            (Predicting, PredictionComplete) => Rendered,
            (Predicting, PredictionFailed) => Failed,

            (Rendered, _) => Rendered,
            (Failed, _) => Failed,

            (from, event) => {
                return Err(PredictError::InvalidTransition {
                    from: format!("{:?}", from),
                    to: format!("(via {:?})", event),
                    reason: format!("No valid transition from {:?} on {:?}", from, event),
                });
            }
        };

        Ok(next_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let s = PipelineState::Idle
            .transition(PipelineEvent::Submit)
            .unwrap()
            .transition(PipelineEvent::InputAccepted)
            .unwrap()
            .transition(PipelineEvent::PredictionComplete)
            .unwrap();
        assert_eq!(s, PipelineState::Rendered);
        assert!(s.is_terminal());
    }

    #[test]
    fn test_rejection_path() {
        let s = PipelineState::Validating
            .transition(PipelineEvent::InputRejected)
            .unwrap();
        assert_eq!(s, PipelineState::Failed);
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(PipelineState::Idle
            .transition(PipelineEvent::PredictionComplete)
            .is_err());
        assert!(PipelineState::Predicting
            .transition(PipelineEvent::Submit)
            .is_err());
    }

    #[test]
    fn test_abort_from_non_terminal_states() {
        for state in [
            PipelineState::Idle,
            PipelineState::Validating,
            PipelineState::Predicting,
        ] {
            assert_eq!(
                state.transition(PipelineEvent::Abort).unwrap(),
                PipelineState::Failed
            );
        }
        assert_eq!(
            PipelineState::Rendered
                .transition(PipelineEvent::Abort)
                .unwrap(),
            PipelineState::Rendered
        );
    }

    #[test]
    fn test_terminal_self_loops() {
        assert_eq!(
            PipelineState::Failed
                .transition(PipelineEvent::Submit)
                .unwrap(),
            PipelineState::Failed
        );
        assert_eq!(
            PipelineState::Rendered
                .transition(PipelineEvent::InputRejected)
                .unwrap(),
            PipelineState::Rendered
        );
    }
}
