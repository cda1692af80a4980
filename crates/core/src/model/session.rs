use thiserror::Error;

use crate::model::{Answers, Choice, UserId};

/// Step value of the introduction screen.
pub const INTRO_STEP: i64 = -1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("step {0} is before the introduction")]
    StepBeforeIntro(i64),

    #[error("answer count ({answers}) does not match step ({step})")]
    AnswerCountMismatch { step: i64, answers: usize },

    #[error("step {step} is past the terminal step {total}")]
    StepPastTerminal { step: i64, total: usize },

    #[error("submitted flag set outside the terminal step")]
    SubmittedOutsideTerminal,
}

/// Where a session currently is, resolved against the configured question count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Intro,
    Question(usize),
    Terminal,
}

/// Full progress of one participant, carried in the encrypted token.
///
/// Invariant: `answers.len() == step` whenever `step >= 0`, and no answers
/// while on the introduction screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    user_id: UserId,
    step: i64,
    answers: Answers,
    submitted: bool,
}

impl SessionState {
    /// State of a session that has not started yet.
    #[must_use]
    pub fn intro(user_id: UserId) -> Self {
        Self {
            user_id,
            step: INTRO_STEP,
            answers: Answers::new(),
            submitted: false,
        }
    }

    /// Rehydrate a state from decoded token fields.
    ///
    /// Only checks the invariants that do not depend on configuration; use
    /// [`SessionState::check_bounds`] against the configured question count.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` if the step is below the introduction or the
    /// answer count does not match the step.
    pub fn from_parts(
        user_id: UserId,
        step: i64,
        answers: Answers,
        submitted: bool,
    ) -> Result<Self, SessionStateError> {
        if step < INTRO_STEP {
            return Err(SessionStateError::StepBeforeIntro(step));
        }
        let expected = usize::try_from(step.max(0)).map_err(|_| {
            SessionStateError::AnswerCountMismatch {
                step,
                answers: answers.len(),
            }
        })?;
        if answers.len() != expected {
            return Err(SessionStateError::AnswerCountMismatch {
                step,
                answers: answers.len(),
            });
        }
        if submitted && step == INTRO_STEP {
            return Err(SessionStateError::SubmittedOutsideTerminal);
        }

        Ok(Self {
            user_id,
            step,
            answers,
            submitted,
        })
    }

    /// Checks the step against the configured number of questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::StepPastTerminal` when the step exceeds
    /// `total`, or `SubmittedOutsideTerminal` when a non-terminal state claims
    /// to be submitted.
    pub fn check_bounds(&self, total: usize) -> Result<(), SessionStateError> {
        let terminal = i64::try_from(total).unwrap_or(i64::MAX);
        if self.step > terminal {
            return Err(SessionStateError::StepPastTerminal {
                step: self.step,
                total,
            });
        }
        if self.submitted && self.step != terminal {
            return Err(SessionStateError::SubmittedOutsideTerminal);
        }
        Ok(())
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn step(&self) -> i64 {
        self.step
    }

    #[must_use]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Resolves the step into a phase for a survey of `total` questions.
    #[must_use]
    pub fn phase(&self, total: usize) -> Phase {
        match usize::try_from(self.step) {
            Err(_) => Phase::Intro,
            Ok(index) if index < total => Phase::Question(index),
            Ok(_) => Phase::Terminal,
        }
    }

    /// The first question, with any previous answers discarded.
    #[must_use]
    pub fn started(&self) -> Self {
        Self {
            user_id: self.user_id.clone(),
            step: 0,
            answers: Answers::new(),
            submitted: false,
        }
    }

    /// The next step with `choice` recorded for the current question.
    #[must_use]
    pub fn answered(&self, choice: Choice) -> Self {
        Self {
            user_id: self.user_id.clone(),
            step: self.step + 1,
            answers: self.answers.with(choice),
            submitted: false,
        }
    }

    /// The same state, marked as persisted.
    #[must_use]
    pub fn mark_submitted(&self) -> Self {
        Self {
            submitted: true,
            ..self.clone()
        }
    }
}
