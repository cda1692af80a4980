use std::sync::Arc;

use survey_core::AssignmentEngine;
use survey_core::model::{
    Choice, MetadataPool, Phase, QuestionPlan, SessionState, SessionStateError, UserId,
};

use crate::error::FlowError;

/// Inbound user events the state machine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start,
    Choose(Choice),
    Submitted,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Pure state machine over `SessionState`.
///
/// Every method is a function of its inputs plus the static pool and the
/// configured question count; nothing here touches I/O.
#[derive(Debug, Clone)]
pub struct FlowController {
    pool: Arc<MetadataPool>,
    total_questions: usize,
}

impl FlowController {
    #[must_use]
    pub fn new(pool: Arc<MetadataPool>, total_questions: usize) -> Self {
        Self {
            pool,
            total_questions,
        }
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    /// Fails when the pool has nothing to offer; the whole flow halts then.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::MetadataUnavailable` for an empty pool.
    pub fn ensure_available(&self) -> Result<(), FlowError> {
        if self.pool.is_empty() {
            return Err(FlowError::MetadataUnavailable);
        }
        Ok(())
    }

    /// Recomputes the participant's plan from scratch.
    #[must_use]
    pub fn plan(&self, user_id: &UserId) -> QuestionPlan {
        AssignmentEngine::new(&self.pool, self.total_questions).plan(user_id)
    }

    /// Accepts a decoded state only if it fits this survey's question count.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` when the step is past the terminal step or
    /// a non-terminal state claims to be submitted.
    pub fn admit(&self, state: SessionState) -> Result<SessionState, SessionStateError> {
        state.check_bounds(self.total_questions)?;
        Ok(state)
    }

    #[must_use]
    pub fn phase(&self, state: &SessionState) -> Phase {
        state.phase(self.total_questions)
    }

    /// Applies one user event.
    ///
    /// Events that do not fit the current phase (stale forms after
    /// back-navigation, a second submit) leave the state unchanged.
    #[must_use]
    pub fn transition(
        &self,
        state: &SessionState,
        plan: &QuestionPlan,
        event: Event,
    ) -> SessionState {
        match (self.phase(state), event) {
            (Phase::Intro, Event::Start) => state.started(),
            (Phase::Question(index), Event::Choose(choice))
                if choice.is_selectable() && !plan.is_skipped(index) =>
            {
                state.answered(choice)
            }
            (Phase::Terminal, Event::Submitted) if !state.is_submitted() => {
                state.mark_submitted()
            }
            _ => state.clone(),
        }
    }

    /// One automatic skip: a question whose slot has no data advances with `NoData`.
    ///
    /// Returns `None` when the current phase needs no skip.
    #[must_use]
    pub fn auto_skip(&self, state: &SessionState, plan: &QuestionPlan) -> Option<SessionState> {
        match self.phase(state) {
            Phase::Question(index) if plan.is_skipped(index) => {
                Some(state.answered(Choice::NoData))
            }
            _ => None,
        }
    }

    /// Applies automatic skips until the state shows something or reaches the end.
    #[must_use]
    pub fn settle(&self, state: &SessionState, plan: &QuestionPlan) -> SessionState {
        let mut current = state.clone();
        while let Some(next) = self.auto_skip(&current, plan) {
            current = next;
        }
        current
    }
}
