use services::flow::{ComparisonImages, FlowStep, Notice, Screen};

pub const PAGE_TITLE: &str = "EQ Survey";

/// One image column on a question page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageVm {
    pub caption: &'static str,
    pub url: Option<String>,
    pub highlight: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageBody {
    Intro {
        total_questions: usize,
    },
    Question {
        option_a: ImageVm,
        ground_truth: ImageVm,
        option_b: ImageVm,
    },
    Terminal {
        submitted: bool,
        notice: Option<String>,
    },
    Unavailable {
        message: String,
    },
}

/// Everything a rendered page needs, already formatted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageVm {
    pub title: &'static str,
    /// Form target carrying the current token; `None` on pages without forms.
    pub action_url: Option<String>,
    pub progress_label: Option<String>,
    /// Completed share of the survey in whole percent, clamped to `0..=100`.
    pub progress_percent: u32,
    pub body: PageBody,
}

/// Address of the page showing `token`.
#[must_use]
pub fn page_url(token: &str) -> String {
    format!("/?q={token}")
}

#[must_use]
pub fn map_flow_step(step: &FlowStep) -> PageVm {
    let (total, body) = match &step.screen {
        Screen::Intro { total_questions } => (
            *total_questions,
            PageBody::Intro {
                total_questions: *total_questions,
            },
        ),
        Screen::Question {
            total_questions,
            images,
            ..
        } => (*total_questions, question_body(images)),
        Screen::Terminal {
            total_questions,
            submitted,
        } => (
            *total_questions,
            PageBody::Terminal {
                submitted: *submitted,
                notice: step.notice.as_ref().map(notice_text),
            },
        ),
    };

    let step_index = step.state.step();
    PageVm {
        title: PAGE_TITLE,
        action_url: Some(page_url(step.token.as_str())),
        progress_label: Some(format!("Sample {} / {total}", step_index + 1)),
        progress_percent: progress_percent(step_index, total),
        body,
    }
}

/// Blocking page shown when no question metadata could be loaded.
#[must_use]
pub fn unavailable_page() -> PageVm {
    PageVm {
        title: PAGE_TITLE,
        action_url: None,
        progress_label: None,
        progress_percent: 0,
        body: PageBody::Unavailable {
            message: "Survey data is not available right now. Please try again later.".into(),
        },
    }
}

fn question_body(images: &ComparisonImages) -> PageBody {
    PageBody::Question {
        option_a: ImageVm {
            caption: "Option A",
            url: images.option_a.clone(),
            highlight: false,
        },
        ground_truth: ImageVm {
            caption: "Ground Truth",
            url: images.ground_truth.clone(),
            highlight: true,
        },
        option_b: ImageVm {
            caption: "Option B",
            url: images.option_b.clone(),
            highlight: false,
        },
    }
}

fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::SubmissionFailed(reason) => format!("Save failed: {reason}. Please try again."),
    }
}

fn progress_percent(step: i64, total: usize) -> u32 {
    let Ok(total) = i64::try_from(total) else {
        return 0;
    };
    if total == 0 {
        return 0;
    }
    let done = step.clamp(0, total);
    u32::try_from(done * 100 / total).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::Token;
    use survey_core::model::{Choice, SessionState, UserId};

    fn step_for(state: SessionState, screen: Screen, notice: Option<Notice>) -> FlowStep {
        FlowStep {
            state,
            token: Token::from_raw("tok"),
            screen,
            redirect: false,
            notice,
        }
    }

    fn uid() -> UserId {
        UserId::new("abc123").unwrap()
    }

    #[test]
    fn intro_shows_sample_zero() {
        let vm = map_flow_step(&step_for(
            SessionState::intro(uid()),
            Screen::Intro { total_questions: 37 },
            None,
        ));
        assert_eq!(vm.progress_label.as_deref(), Some("Sample 0 / 37"));
        assert_eq!(vm.progress_percent, 0);
        assert_eq!(vm.action_url.as_deref(), Some("/?q=tok"));
    }

    #[test]
    fn question_progress_counts_answered_samples() {
        let state = SessionState::intro(uid())
            .started()
            .answered(Choice::A)
            .answered(Choice::B);
        let vm = map_flow_step(&step_for(
            state,
            Screen::Question {
                index: 2,
                total_questions: 4,
                images: ComparisonImages::default(),
            },
            None,
        ));
        assert_eq!(vm.progress_label.as_deref(), Some("Sample 3 / 4"));
        assert_eq!(vm.progress_percent, 50);
        let PageBody::Question { ground_truth, .. } = vm.body else {
            panic!("expected question body");
        };
        assert!(ground_truth.highlight);
        assert_eq!(ground_truth.url, None);
    }

    #[test]
    fn failed_submission_carries_notice() {
        let state = SessionState::intro(uid()).started().answered(Choice::A);
        let vm = map_flow_step(&step_for(
            state,
            Screen::Terminal {
                total_questions: 1,
                submitted: false,
            },
            Some(Notice::SubmissionFailed("sink offline".into())),
        ));
        assert_eq!(vm.progress_percent, 100);
        assert_eq!(
            vm.body,
            PageBody::Terminal {
                submitted: false,
                notice: Some("Save failed: sink offline. Please try again.".into()),
            }
        );
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(progress_percent(-1, 10), 0);
        assert_eq!(progress_percent(15, 10), 100);
        assert_eq!(progress_percent(3, 0), 0);
    }
}
