use chrono::{DateTime, Utc};
use std::fmt;

use crate::model::{Answers, Choice, QuestionPlan, UserId};
use crate::time::format_submission_timestamp;

/// One persisted `<code>_<variantIndex>` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionEntry {
    pub choice: Choice,
    pub variant_index: Option<usize>,
}

impl fmt::Display for SubmissionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant_index {
            Some(index) => write!(f, "{}_{index}", self.choice.code()),
            None => write!(f, "{}_-1", self.choice.code()),
        }
    }
}

/// Final answer record for a participant, created once at the terminal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    submitted_at: DateTime<Utc>,
    user_id: UserId,
    entries: Vec<SubmissionEntry>,
}

impl SubmissionRecord {
    /// Zip the (padded) answers with the plan's variant indices.
    ///
    /// Always yields exactly `total` entries; unanswered positions are
    /// recorded as `NoData`.
    #[must_use]
    pub fn build(
        user_id: UserId,
        answers: &Answers,
        plan: &QuestionPlan,
        total: usize,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let entries = answers
            .padded(total)
            .into_iter()
            .zip(plan.variant_indices(total))
            .map(|(choice, variant_index)| SubmissionEntry {
                choice,
                variant_index,
            })
            .collect();

        Self {
            submitted_at,
            user_id,
            entries,
        }
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn entries(&self) -> &[SubmissionEntry] {
        &self.entries
    }

    /// Entry cells in question order.
    #[must_use]
    pub fn entry_codes(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Row layout `[timestamp, userId, entries...]` used by append-only sinks.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(self.entries.len() + 2);
        row.push(format_submission_timestamp(self.submitted_at));
        row.push(self.user_id.to_string());
        row.extend(self.entry_codes());
        row
    }
}
