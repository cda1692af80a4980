use crate::model::Variant;

/// The variant a participant sees for one question, if the slot has data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedQuestion {
    selected: Option<(usize, Variant)>,
}

impl PlannedQuestion {
    /// A question whose slot holds no candidates.
    #[must_use]
    pub fn empty() -> Self {
        Self { selected: None }
    }

    #[must_use]
    pub fn selected(variant_index: usize, variant: Variant) -> Self {
        Self {
            selected: Some((variant_index, variant)),
        }
    }

    #[must_use]
    pub fn variant(&self) -> Option<&Variant> {
        self.selected.as_ref().map(|(_, variant)| variant)
    }

    #[must_use]
    pub fn variant_index(&self) -> Option<usize> {
        self.selected.as_ref().map(|(index, _)| *index)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }
}

/// Per-participant sequence of selected variants, one entry per planned slot.
///
/// Recomputed on every request from the participant id; never stored until
/// submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionPlan {
    questions: Vec<PlannedQuestion>,
}

impl QuestionPlan {
    #[must_use]
    pub fn new(questions: Vec<PlannedQuestion>) -> Self {
        Self { questions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&PlannedQuestion> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn questions(&self) -> &[PlannedQuestion] {
        &self.questions
    }

    /// Variant for question `index`; `None` for empty or unplanned slots.
    #[must_use]
    pub fn variant(&self, index: usize) -> Option<&Variant> {
        self.question(index).and_then(PlannedQuestion::variant)
    }

    /// True when question `index` has nothing to show and must be skipped.
    #[must_use]
    pub fn is_skipped(&self, index: usize) -> bool {
        self.variant(index).is_none()
    }

    /// Variant indices for the first `total` questions, `None` where nothing was drawn.
    #[must_use]
    pub fn variant_indices(&self, total: usize) -> Vec<Option<usize>> {
        (0..total)
            .map(|i| self.question(i).and_then(PlannedQuestion::variant_index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_cover_unplanned_positions() {
        let plan = QuestionPlan::new(vec![
            PlannedQuestion::selected(2, Variant::new("g", "a", "b")),
            PlannedQuestion::empty(),
        ]);
        assert_eq!(plan.variant_indices(4), vec![Some(2), None, None, None]);
        assert!(!plan.is_skipped(0));
        assert!(plan.is_skipped(1));
        assert!(plan.is_skipped(3));
    }
}
