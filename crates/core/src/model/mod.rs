mod choice;
mod ids;
mod plan;
mod pool;
mod session;
mod submission;

pub use choice::{Answers, Choice, ChoiceError};
pub use ids::{GENERATED_USER_ID_LEN, IdSource, MAX_USER_ID_LEN, ParseUserIdError, UserId};
pub use plan::{PlannedQuestion, QuestionPlan};
pub use pool::{MetadataPool, Slot, Variant};
pub use session::{INTRO_STEP, Phase, SessionState, SessionStateError};
pub use submission::{SubmissionEntry, SubmissionRecord};
