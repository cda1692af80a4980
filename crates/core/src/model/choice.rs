use std::fmt;
use std::str::FromStr;

use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChoiceError {
    #[error("invalid choice code: {0:?}")]
    InvalidCode(char),

    #[error("choice must be a single character, got {0:?}")]
    InvalidLength(String),
}

//
// ─── CHOICE ───────────────────────────────────────────────────────────────────
//

/// What a participant recorded for one question.
///
/// - `A` / `B`: the option judged closer to the ground truth
/// - `NoData`: the question had no candidate pair and was skipped automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    A,
    B,
    NoData,
}

impl Choice {
    /// Single-character code stored in tokens and submission rows.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Choice::A => 'A',
            Choice::B => 'B',
            Choice::NoData => 'N',
        }
    }

    /// Parses a single-character code.
    ///
    /// # Errors
    ///
    /// Returns `ChoiceError::InvalidCode` for anything other than `A`, `B`, or `N`.
    pub fn from_code(code: char) -> Result<Self, ChoiceError> {
        match code {
            'A' => Ok(Choice::A),
            'B' => Ok(Choice::B),
            'N' => Ok(Choice::NoData),
            other => Err(ChoiceError::InvalidCode(other)),
        }
    }

    /// True for choices a participant can make by pressing a button.
    #[must_use]
    pub const fn is_selectable(self) -> bool {
        matches!(self, Choice::A | Choice::B)
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Choice {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => Self::from_code(code),
            _ => Err(ChoiceError::InvalidLength(s.to_owned())),
        }
    }
}

//
// ─── ANSWERS ──────────────────────────────────────────────────────────────────
//

/// Ordered answers recorded so far, one per visited question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Answers(Vec<Choice>);

impl Answers {
    #[must_use]
    pub fn new() -> Self {
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
    pub fn get(&self, index: usize) -> Option<Choice> {
        self.0.get(index).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Choice] {
        &self.0
    }

    /// Returns a copy with `choice` appended.
    #[must_use]
    pub fn with(&self, choice: Choice) -> Self {
        let mut next = self.0.clone();
        next.push(choice);
        Self(next)
    }

    /// Returns exactly `total` choices, truncating or filling the tail with `NoData`.
    #[must_use]
    pub fn padded(&self, total: usize) -> Vec<Choice> {
        let mut out: Vec<Choice> = self.0.iter().copied().take(total).collect();
        out.resize(total, Choice::NoData);
        out
    }
}

impl fmt::Display for Answers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for choice in &self.0 {
            write!(f, "{}", choice.code())?;
        }
        Ok(())
    }
}

impl FromStr for Answers {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(Choice::from_code)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl FromIterator<Choice> for Answers {
    fn from_iter<I: IntoIterator<Item = Choice>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_parse_back() {
        for choice in [Choice::A, Choice::B, Choice::NoData] {
            assert_eq!(Choice::from_code(choice.code()).unwrap(), choice);
        }
        assert_eq!(Choice::from_code('x'), Err(ChoiceError::InvalidCode('x')));
    }

    #[test]
    fn choice_from_str_requires_one_char() {
        assert_eq!("B".parse::<Choice>().unwrap(), Choice::B);
        assert!("AB".parse::<Choice>().is_err());
        assert!("".parse::<Choice>().is_err());
    }

    #[test]
    fn only_a_and_b_are_selectable() {
        assert!(Choice::A.is_selectable());
        assert!(Choice::B.is_selectable());
        assert!(!Choice::NoData.is_selectable());
    }

    #[test]
    fn answers_parse_and_display() {
        let answers: Answers = "ABN".parse().unwrap();
        assert_eq!(answers.len(), 3);
        assert_eq!(answers.get(2), Some(Choice::NoData));
        assert_eq!(answers.to_string(), "ABN");
        assert!("AxB".parse::<Answers>().is_err());
    }

    #[test]
    fn padding_fills_the_tail_with_no_data() {
        let answers: Answers = "AB".parse().unwrap();
        assert_eq!(
            answers.padded(5),
            vec![
                Choice::A,
                Choice::B,
                Choice::NoData,
                Choice::NoData,
                Choice::NoData
            ]
        );
        assert_eq!(answers.padded(1), vec![Choice::A]);
    }
}
