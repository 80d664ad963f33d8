//! Interview state machine.

use serde::{Deserialize, Serialize};

/// Number of question/answer exchanges in one interview.
pub const MAX_QUESTIONS: u8 = 5;

/// The phases of an interview.
///
/// Progresses linearly: NotStarted → AwaitingAnswer (five answers) →
/// FeedbackPending → Completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewPhase {
    #[default]
    NotStarted,
    AwaitingAnswer,
    FeedbackPending,
    Completed,
}

impl InterviewPhase {
    /// Check if a transition from `self` to `target` is valid.
    ///
    /// `AwaitingAnswer → AwaitingAnswer` is the per-answer loop.
    pub fn can_transition_to(&self, target: InterviewPhase) -> bool {
        use InterviewPhase::*;
        matches!(
            (self, target),
            (NotStarted, AwaitingAnswer)
                | (AwaitingAnswer, AwaitingAnswer)
                | (AwaitingAnswer, FeedbackPending)
                | (FeedbackPending, Completed)
        )
    }

    /// Whether this phase is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Phase reached after an answer is recorded, given the new answer count.
    pub fn after_answer(answered: u8) -> InterviewPhase {
        if answered >= MAX_QUESTIONS {
            Self::FeedbackPending
        } else {
            Self::AwaitingAnswer
        }
    }
}

impl std::fmt::Display for InterviewPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotStarted => "not_started",
            Self::AwaitingAnswer => "awaiting_answer",
            Self::FeedbackPending => "feedback_pending",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}
