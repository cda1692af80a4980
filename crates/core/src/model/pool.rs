use serde::{Deserialize, Serialize};

/// One candidate comparison for a question: a reference image and two options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String, String)", into = "(String, String, String)")]
pub struct Variant {
    ground_truth: String,
    option_a: String,
    option_b: String,
}

impl Variant {
    #[must_use]
    pub fn new(
        ground_truth: impl Into<String>,
        option_a: impl Into<String>,
        option_b: impl Into<String>,
    ) -> Self {
        Self {
            ground_truth: ground_truth.into(),
            option_a: option_a.into(),
            option_b: option_b.into(),
        }
    }

    #[must_use]
    pub fn ground_truth(&self) -> &str {
        &self.ground_truth
    }

    #[must_use]
    pub fn option_a(&self) -> &str {
        &self.option_a
    }

    #[must_use]
    pub fn option_b(&self) -> &str {
        &self.option_b
    }
}

impl From<(String, String, String)> for Variant {
    fn from((ground_truth, option_a, option_b): (String, String, String)) -> Self {
        Self {
            ground_truth,
            option_a,
            option_b,
        }
    }
}

impl From<Variant> for (String, String, String) {
    fn from(value: Variant) -> Self {
        (value.ground_truth, value.option_a, value.option_b)
    }
}

/// Candidate variants for one question position; may be empty.
///
/// `null` in the metadata file reads as an empty slot, the same as `[]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Vec<Variant>>", into = "Vec<Variant>")]
pub struct Slot(Vec<Variant>);

impl Slot {
    #[must_use]
    pub fn new(variants: Vec<Variant>) -> Self {
        Self(variants)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Variant> {
        self.0.get(index)
    }
}

impl From<Option<Vec<Variant>>> for Slot {
    fn from(variants: Option<Vec<Variant>>) -> Self {
        Self(variants.unwrap_or_default())
    }
}

impl From<Slot> for Vec<Variant> {
    fn from(slot: Slot) -> Self {
        slot.0
    }
}

/// Static, read-only pool of question slots shared by every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataPool(Vec<Slot>);

impl MetadataPool {
    #[must_use]
    pub fn new(slots: Vec<Slot>) -> Self {
        Self(slots)
    }

    /// A pool with no slots at all; nothing can be rendered from it.
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.0.get(index)
    }

    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.0
    }

    /// Number of slots that hold at least one variant.
    #[must_use]
    pub fn populated_slots(&self) -> usize {
        self.0.iter().filter(|slot| !slot.is_empty()).count()
    }
}

impl FromIterator<Slot> for MetadataPool {
    fn from_iter<I: IntoIterator<Item = Slot>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_parses_nested_triples() {
        let raw = r#"[[["gt1","a1","b1"],["gt2","a2","b2"]],[]]"#;
        let pool: MetadataPool = serde_json::from_str(raw).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.populated_slots(), 1);
        let first = pool.slot(0).unwrap().get(1).unwrap();
        assert_eq!(first.ground_truth(), "gt2");
        assert_eq!(first.option_a(), "a2");
        assert_eq!(first.option_b(), "b2");
        assert!(pool.slot(1).unwrap().is_empty());
    }

    #[test]
    fn null_slot_reads_as_empty() {
        let pool: MetadataPool = serde_json::from_str(r#"[null,[["gt","a","b"]]]"#).unwrap();
        assert_eq!(pool.len(), 2);
        assert!(pool.slot(0).unwrap().is_empty());
        assert_eq!(pool.populated_slots(), 1);
    }

    #[test]
    fn variant_requires_three_refs() {
        let parsed: Result<Variant, _> = serde_json::from_str(r#"["gt","a"]"#);
        assert!(parsed.is_err());
    }
}
