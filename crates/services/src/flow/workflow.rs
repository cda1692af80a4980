use survey_core::ImageResolver;
use survey_core::model::{Choice, IdSource, Phase, SessionState};
use tracing::{debug, info, warn};

use super::controller::{Event, FlowController};
use super::screen::Screen;
use crate::codec::{StateCodec, Token};
use crate::error::FlowError;
use crate::submission_service::SubmissionService;

/// Actions a participant can post from a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Choose(Choice),
    Submit,
}

/// User-visible notices attached to a rendered step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SubmissionFailed(String),
}

/// Result of handling one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStep {
    pub state: SessionState,
    /// Authoritative address token after this request.
    pub token: Token,
    pub screen: Screen,
    /// True when the caller must publish `token` as the new address before rendering.
    pub redirect: bool,
    pub notice: Option<Notice>,
}

/// Orchestrates decode → plan → transition → encode for every request.
///
/// Holds no per-participant state; everything a request needs is in its token.
#[derive(Debug, Clone)]
pub struct SurveyFlowService {
    codec: StateCodec,
    controller: FlowController,
    resolver: ImageResolver,
    submissions: SubmissionService,
    ids: IdSource,
}

impl SurveyFlowService {
    #[must_use]
    pub fn new(
        codec: StateCodec,
        controller: FlowController,
        resolver: ImageResolver,
        submissions: SubmissionService,
    ) -> Self {
        Self {
            codec,
            controller,
            resolver,
            submissions,
            ids: IdSource::default(),
        }
    }

    #[must_use]
    pub fn with_id_source(mut self, ids: IdSource) -> Self {
        self.ids = ids;
        self
    }

    /// Handles a plain page load of the address carrying `token`.
    ///
    /// Pending automatic skips are applied here, before anything is shown.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::MetadataUnavailable` when no questions exist, or
    /// `FlowError::Codec` if the new state cannot be encoded.
    pub fn open(&self, token: Option<&str>) -> Result<FlowStep, FlowError> {
        self.controller.ensure_available()?;
        let (state, fresh) = self.resume(token);
        let plan = self.controller.plan(state.user_id());
        let settled = self.controller.settle(&state, &plan);

        if !fresh && settled == state {
            if let Some(raw) = token {
                return Ok(self.step(settled, Token::from_raw(raw), false, None, &plan));
            }
        }

        if settled != state {
            debug!(
                user_id = %settled.user_id(),
                from = state.step(),
                to = settled.step(),
                "auto-skipped empty questions"
            );
        }
        let token = self.codec.encode(&settled)?;
        Ok(self.step(settled, token, true, None, &plan))
    }

    /// Handles one posted action against the state carried by `token`.
    ///
    /// A missing or invalid token starts a new session instead of applying
    /// the action. A failed submission keeps the terminal state and returns a
    /// notice so the participant can retry.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::MetadataUnavailable` when no questions exist, or
    /// `FlowError::Codec` if the new state cannot be encoded.
    pub async fn apply(&self, token: Option<&str>, action: Action) -> Result<FlowStep, FlowError> {
        self.controller.ensure_available()?;
        let (state, fresh) = self.resume(token);
        let plan = self.controller.plan(state.user_id());
        if fresh {
            let token = self.codec.encode(&state)?;
            return Ok(self.step(state, token, true, None, &plan));
        }

        let current = self.controller.settle(&state, &plan);
        let next = match action {
            Action::Start => self.controller.transition(&current, &plan, Event::Start),
            Action::Choose(choice) => {
                self.controller
                    .transition(&current, &plan, Event::Choose(choice))
            }
            Action::Submit => {
                if self.controller.phase(&current) != Phase::Terminal || current.is_submitted() {
                    current.clone()
                } else {
                    match self
                        .submissions
                        .submit(current.user_id(), current.answers(), &plan)
                        .await
                    {
                        Ok(_) => self.controller.transition(&current, &plan, Event::Submitted),
                        Err(err) => {
                            warn!(user_id = %current.user_id(), error = %err, "submission failed");
                            let token = match token {
                                Some(raw) if current == state => Token::from_raw(raw),
                                _ => self.codec.encode(&current)?,
                            };
                            let notice = Some(Notice::SubmissionFailed(err.to_string()));
                            return Ok(self.step(current, token, false, notice, &plan));
                        }
                    }
                }
            }
        };
        let next = self.controller.settle(&next, &plan);

        debug!(
            user_id = %next.user_id(),
            action = ?action,
            from = state.step(),
            to = next.step(),
            "applied action"
        );
        let token = self.codec.encode(&next)?;
        Ok(self.step(next, token, true, None, &plan))
    }

    /// Decodes and admits the incoming state, or starts a fresh session.
    ///
    /// The boolean is true when a new identity was issued.
    fn resume(&self, token: Option<&str>) -> (SessionState, bool) {
        let Some(raw) = token.filter(|raw| !raw.is_empty()) else {
            return (self.fresh_state(), true);
        };

        let decoded = self.codec.decode(raw).map_err(|err| err.to_string()).and_then(
            |state| {
                self.controller
                    .admit(state)
                    .map_err(|err| err.to_string())
            },
        );
        match decoded {
            Ok(state) => (state, false),
            Err(reason) => {
                debug!(%reason, "discarding invalid token");
                (self.fresh_state(), true)
            }
        }
    }

    fn fresh_state(&self) -> SessionState {
        let state = SessionState::intro(self.ids.next_id());
        info!(user_id = %state.user_id(), "issued new session");
        state
    }

    fn step(
        &self,
        state: SessionState,
        token: Token,
        redirect: bool,
        notice: Option<Notice>,
        plan: &survey_core::model::QuestionPlan,
    ) -> FlowStep {
        let screen = Screen::for_state(
            &state,
            plan,
            self.controller.total_questions(),
            &self.resolver,
        );
        FlowStep {
            state,
            token,
            screen,
            redirect,
            notice,
        }
    }
}
