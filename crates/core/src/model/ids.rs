use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Length of identifiers minted for new sessions.
pub const GENERATED_USER_ID_LEN: usize = 6;

/// Upper bound accepted when an identifier comes back from a token.
pub const MAX_USER_ID_LEN: usize = 64;

/// Error type for parsing a `UserId` from string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseUserIdError {
    #[error("user id is empty")]
    Empty,

    #[error("user id is too long: {len} characters")]
    TooLong { len: usize },

    #[error("user id contains an invalid character: {0:?}")]
    InvalidChar(char),
}

/// Opaque per-session participant identifier.
///
/// Minted once when a browser session first arrives without a valid token and
/// carried forward unchanged in every token after that.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a `UserId` from an existing identifier.
    ///
    /// # Errors
    ///
    /// Returns `ParseUserIdError` when the identifier is empty, longer than
    /// `MAX_USER_ID_LEN`, or contains whitespace/control characters.
    pub fn new(raw: impl Into<String>) -> Result<Self, ParseUserIdError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ParseUserIdError::Empty);
        }
        let len = raw.chars().count();
        if len > MAX_USER_ID_LEN {
            return Err(ParseUserIdError::TooLong { len });
        }
        if let Some(bad) = raw.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(ParseUserIdError::InvalidChar(bad));
        }
        Ok(Self(raw))
    }

    /// Mints a fresh short identifier from a random v4 UUID.
    #[must_use]
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(hex[..GENERATED_USER_ID_LEN].to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = ParseUserIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = ParseUserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Where new identifiers come from; injected like `Clock` so tests can pin ids.
#[derive(Debug, Clone, Default)]
pub enum IdSource {
    #[default]
    Random,
    Fixed(UserId),
}

impl IdSource {
    #[must_use]
    pub fn random() -> Self {
        Self::Random
    }

    #[must_use]
    pub fn fixed(id: UserId) -> Self {
        Self::Fixed(id)
    }

    /// Issues the identifier for a brand-new session.
    #[must_use]
    pub fn next_id(&self) -> UserId {
        match self {
            IdSource::Random => UserId::generate(),
            IdSource::Fixed(id) => id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_short_hex() {
        let id = UserId::generate();
        assert_eq!(id.as_str().len(), GENERATED_USER_ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn user_id_from_str() {
        let id: UserId = "abc123".parse().unwrap();
        assert_eq!(id.to_string(), "abc123");
    }

    #[test]
    fn user_id_rejects_empty_and_whitespace() {
        assert_eq!(UserId::new(""), Err(ParseUserIdError::Empty));
        assert_eq!(UserId::new("ab c"), Err(ParseUserIdError::InvalidChar(' ')));
    }

    #[test]
    fn user_id_rejects_overlong_values() {
        let raw = "x".repeat(MAX_USER_ID_LEN + 1);
        assert_eq!(
            UserId::new(raw),
            Err(ParseUserIdError::TooLong {
                len: MAX_USER_ID_LEN + 1
            })
        );
    }

    #[test]
    fn fixed_source_repeats_its_id() {
        let source = IdSource::fixed(UserId::new("abc123").unwrap());
        assert_eq!(source.next_id(), source.next_id());
    }

    #[test]
    fn random_source_mints_distinct_ids() {
        let source = IdSource::random();
        let ids: std::collections::HashSet<_> = (0..32).map(|_| source.next_id()).collect();
        assert!(ids.len() > 1);
    }

    #[test]
    fn serde_rejects_invalid_ids() {
        let parsed: Result<UserId, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());
        let parsed: UserId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(parsed.as_str(), "abc123");
    }
}
