use std::fmt;
use std::sync::Arc;

use storage::repository::SubmissionRepository;
use survey_core::model::{Answers, QuestionPlan, SubmissionRecord, UserId};
use tracing::{info, warn};

use crate::Clock;
use crate::error::SubmissionError;

/// Builds final submission rows and appends them to the configured sink.
#[derive(Clone)]
pub struct SubmissionService {
    clock: Clock,
    submissions: Arc<dyn SubmissionRepository>,
    total_questions: usize,
}

impl fmt::Debug for SubmissionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionService")
            .field("clock", &self.clock)
            .field("total_questions", &self.total_questions)
            .finish_non_exhaustive()
    }
}

impl SubmissionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        submissions: Arc<dyn SubmissionRepository>,
        total_questions: usize,
    ) -> Self {
        Self {
            clock,
            submissions,
            total_questions,
        }
    }

    /// Pads `answers` to the full question count, pairs them with the plan's
    /// variant indices, and appends one row.
    ///
    /// Nothing is retried here; a failure is reported and the caller decides.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::Storage` if the sink rejects the row.
    pub async fn submit(
        &self,
        user_id: &UserId,
        answers: &Answers,
        plan: &QuestionPlan,
    ) -> Result<SubmissionRecord, SubmissionError> {
        let record = SubmissionRecord::build(
            user_id.clone(),
            answers,
            plan,
            self.total_questions,
            self.clock.now(),
        );

        match self.submissions.append_submission(&record).await {
            Ok(()) => {
                info!(
                    user_id = %user_id,
                    entries = record.entries().len(),
                    "submission recorded"
                );
                Ok(record)
            }
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "submission sink rejected row");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use survey_core::model::{PlannedQuestion, Variant};
    use survey_core::time::fixed_clock;

    #[tokio::test]
    async fn submit_pads_answers_and_appends_one_row() {
        let repo = InMemoryRepository::new();
        let service = SubmissionService::new(fixed_clock(), Arc::new(repo.clone()), 4);
        let plan = QuestionPlan::new(vec![
            PlannedQuestion::selected(1, Variant::new("g", "a", "b")),
            PlannedQuestion::empty(),
            PlannedQuestion::selected(0, Variant::new("g", "a", "b")),
        ]);

        let record = service
            .submit(&UserId::new("abc123").unwrap(), &"AN".parse().unwrap(), &plan)
            .await
            .unwrap();

        assert_eq!(record.entry_codes(), vec!["A_1", "N_-1", "N_0", "N_-1"]);
        let rows = repo.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            vec!["2023-11-14 22:13:20", "abc123", "A_1", "N_-1", "N_0", "N_-1"]
        );
    }
}
