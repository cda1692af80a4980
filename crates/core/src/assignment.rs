use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

use crate::model::{MetadataPool, PlannedQuestion, QuestionPlan, UserId};

/// Domain tag mixed into every seed so plan seeds never collide with other uses of the id.
const SEED_DOMAIN: &[u8] = b"survey-plan/v1";

//
// ─── ASSIGNMENT ENGINE ─────────────────────────────────────────────────────────
//

/// Deterministic per-participant variant selection.
///
/// The plan is a pure function of `(user_id, pool, total_questions)`: the same
/// inputs reproduce the same plan on any machine and after any restart.
///
/// # Examples
///
/// ```
/// # use survey_core::AssignmentEngine;
/// # use survey_core::model::{MetadataPool, Slot, UserId, Variant};
/// let pool = MetadataPool::new(vec![Slot::new(vec![
///     Variant::new("gt", "a", "b"),
///     Variant::new("gt2", "a2", "b2"),
/// ])]);
/// let engine = AssignmentEngine::new(&pool, 37);
/// let user = UserId::new("abc123").unwrap();
/// assert_eq!(engine.plan(&user), engine.plan(&user));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AssignmentEngine<'a> {
    pool: &'a MetadataPool,
    total_questions: usize,
}

impl<'a> AssignmentEngine<'a> {
    #[must_use]
    pub fn new(pool: &'a MetadataPool, total_questions: usize) -> Self {
        Self {
            pool,
            total_questions,
        }
    }

    /// Builds the plan for one participant.
    ///
    /// Covers the first `min(pool.len(), total_questions)` slots. Each
    /// non-empty slot consumes exactly one draw, in slot order; empty slots
    /// draw nothing.
    #[must_use]
    pub fn plan(&self, user_id: &UserId) -> QuestionPlan {
        let mut rng = ChaCha20Rng::from_seed(derive_seed(user_id));
        let planned = self.pool.len().min(self.total_questions);

        let questions = self
            .pool
            .slots()
            .iter()
            .take(planned)
            .map(|slot| {
                if slot.is_empty() {
                    return PlannedQuestion::empty();
                }
                let index = draw_index(&mut rng, slot.len());
                match slot.get(index) {
                    Some(variant) => PlannedQuestion::selected(index, variant.clone()),
                    None => PlannedQuestion::empty(),
                }
            })
            .collect();

        QuestionPlan::new(questions)
    }
}

/// Convenience wrapper over [`AssignmentEngine::plan`].
#[must_use]
pub fn plan(user_id: &UserId, pool: &MetadataPool, total_questions: usize) -> QuestionPlan {
    AssignmentEngine::new(pool, total_questions).plan(user_id)
}

//
// ─── SEEDING ───────────────────────────────────────────────────────────────────
//

/// Hashes the identifier into a full 256-bit seed.
///
/// The digest is uniform regardless of the identifier's length or alphabet,
/// so short or guessable ids still spread evenly over the variant range.
fn derive_seed(user_id: &UserId) -> [u8; 32] {
    let id = user_id.as_str().as_bytes();
    let mut hasher = Sha256::new();
    hasher.update(SEED_DOMAIN);
    hasher.update((id.len() as u64).to_le_bytes());
    hasher.update(id);
    hasher.finalize().into()
}

/// Maps one 64-bit draw onto `[0, len)` with a widening multiply.
///
/// Exactly one value is taken from the generator no matter what `len` is.
fn draw_index(rng: &mut ChaCha20Rng, len: usize) -> usize {
    let draw = u128::from(rng.next_u64());
    let scaled = (draw * len as u128) >> 64;
    usize::try_from(scaled).unwrap_or(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Slot, Variant};

    fn slot(len: usize, tag: &str) -> Slot {
        Slot::new(
            (0..len)
                .map(|i| Variant::new(format!("{tag}-gt{i}"), format!("{tag}-a{i}"), format!("{tag}-b{i}")))
                .collect(),
        )
    }

    fn uid(raw: &str) -> UserId {
        UserId::new(raw).unwrap()
    }

    #[test]
    fn plan_is_deterministic_per_user() {
        let pool = MetadataPool::new(vec![slot(4, "s0"), slot(7, "s1"), slot(2, "s2")]);
        let first = plan(&uid("abc123"), &pool, 37);
        let second = plan(&uid("abc123"), &pool.clone(), 37);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn selected_indices_stay_in_range_and_match_variants() {
        let pool = MetadataPool::new(vec![slot(3, "s0"), slot(1, "s1"), slot(5, "s2")]);
        for n in 0..50 {
            let plan = plan(&uid(&format!("user{n}")), &pool, 3);
            for (i, question) in plan.questions().iter().enumerate() {
                let index = question.variant_index().unwrap();
                let source = pool.slot(i).unwrap();
                assert!(index < source.len());
                assert_eq!(question.variant(), source.get(index));
            }
        }
    }

    #[test]
    fn empty_slots_draw_nothing() {
        let pool = MetadataPool::new(vec![slot(3, "s0"), Slot::default(), slot(3, "s2")]);
        let plan = plan(&uid("abc123"), &pool, 3);
        assert!(plan.question(1).unwrap().is_empty());
        assert_eq!(plan.question(1).unwrap().variant_index(), None);

        // With the empty slot removed, slot two takes the second draw in both cases.
        let compact = MetadataPool::new(vec![slot(3, "s0"), slot(3, "s2")]);
        let compact_plan = super::plan(&uid("abc123"), &compact, 2);
        assert_eq!(
            plan.question(2).unwrap().variant_index(),
            compact_plan.question(1).unwrap().variant_index()
        );
    }

    #[test]
    fn earlier_slot_sizes_do_not_shift_later_draws() {
        let small = MetadataPool::new(vec![slot(2, "s0"), slot(6, "s1")]);
        let large = MetadataPool::new(vec![slot(9, "s0"), slot(6, "s1")]);
        for n in 0..50 {
            let id = uid(&format!("p{n}"));
            assert_eq!(
                plan(&id, &small, 2).question(1).unwrap().variant_index(),
                plan(&id, &large, 2).question(1).unwrap().variant_index()
            );
        }
    }

    #[test]
    fn plan_is_truncated_to_total_questions() {
        let pool = MetadataPool::new(vec![slot(2, "s0"), slot(2, "s1"), slot(2, "s2")]);
        assert_eq!(plan(&uid("abc123"), &pool, 2).len(), 2);
        assert_eq!(plan(&uid("abc123"), &MetadataPool::empty(), 37).len(), 0);
    }

    #[test]
    fn different_users_spread_across_variants() {
        let pool = MetadataPool::new(vec![slot(3, "s0")]);
        let mut counts = [0_usize; 3];
        for n in 0..600 {
            let plan = plan(&uid(&format!("{n:06x}")), &pool, 1);
            counts[plan.question(0).unwrap().variant_index().unwrap()] += 1;
        }
        assert!(counts.iter().all(|&c| c > 120), "skewed counts: {counts:?}");
    }

    #[test]
    fn seeds_differ_between_ids() {
        assert_ne!(derive_seed(&uid("abc123")), derive_seed(&uid("abc124")));
    }
}
