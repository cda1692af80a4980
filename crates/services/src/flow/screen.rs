use survey_core::ImageResolver;
use survey_core::model::{Phase, QuestionPlan, SessionState};

/// Resolved image locations for one comparison; `None` means "no image".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonImages {
    pub ground_truth: Option<String>,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
}

/// What the participant should see for a settled state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Intro {
        total_questions: usize,
    },
    Question {
        index: usize,
        total_questions: usize,
        images: ComparisonImages,
    },
    Terminal {
        total_questions: usize,
        submitted: bool,
    },
}

impl Screen {
    /// Pure projection of a state onto the screen it renders as.
    #[must_use]
    pub fn for_state(
        state: &SessionState,
        plan: &QuestionPlan,
        total_questions: usize,
        resolver: &ImageResolver,
    ) -> Self {
        match state.phase(total_questions) {
            Phase::Intro => Screen::Intro { total_questions },
            Phase::Question(index) => {
                let images = plan
                    .variant(index)
                    .map(|variant| ComparisonImages {
                        ground_truth: resolver.resolve(variant.ground_truth()),
                        option_a: resolver.resolve(variant.option_a()),
                        option_b: resolver.resolve(variant.option_b()),
                    })
                    .unwrap_or_default();
                Screen::Question {
                    index,
                    total_questions,
                    images,
                }
            }
            Phase::Terminal => Screen::Terminal {
                total_questions,
                submitted: state.is_submitted(),
            },
        }
    }
}
