//! Process configuration read once at startup.

use std::env;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

use survey_core::DEFAULT_TOTAL_QUESTIONS;
use survey_core::images::DEFAULT_IMAGE_URL_TEMPLATE;

use crate::error::ConfigError;
use crate::sheets::DEFAULT_SHEETS_RANGE;

pub const ENV_ENCRYPTION_KEY: &str = "SURVEY_ENCRYPTION_KEY";
pub const ENV_STORE_URL: &str = "SURVEY_STORE_URL";
pub const ENV_STORE_CREDENTIALS: &str = "SURVEY_STORE_CREDENTIALS";
pub const ENV_SHEETS_RANGE: &str = "SURVEY_SHEETS_RANGE";
pub const ENV_PAIRS_PATH: &str = "SURVEY_PAIRS_PATH";
pub const ENV_TOTAL_QUESTIONS: &str = "SURVEY_TOTAL_QUESTIONS";
pub const ENV_IMAGE_URL_TEMPLATE: &str = "SURVEY_IMAGE_URL_TEMPLATE";
pub const ENV_PORT: &str = "SURVEY_PORT";
pub const ENV_BIND: &str = "SURVEY_BIND";

pub const DEFAULT_PAIRS_PATH: &str = "./pairs_list.json";
pub const DEFAULT_PORT: u16 = 8501;

/// A configuration value that must never show up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

/// Where final submissions are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    Sqlite(String),
    Sheets {
        spreadsheet_id: String,
        credentials: Secret,
        range: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyConfig {
    pub encryption_key: Secret,
    pub store: StoreTarget,
    pub pairs_path: PathBuf,
    pub total_questions: usize,
    pub image_url_template: String,
    pub bind: IpAddr,
    pub port: u16,
}

impl SurveyConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required value is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which returns the raw value for a key.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required value is missing or malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let encryption_key = get(ENV_ENCRYPTION_KEY)
            .map(Secret::new)
            .ok_or(ConfigError::Missing(ENV_ENCRYPTION_KEY))?;
        let store_url = get(ENV_STORE_URL).ok_or(ConfigError::Missing(ENV_STORE_URL))?;
        let store = parse_store_target(
            &store_url,
            get(ENV_STORE_CREDENTIALS).map(Secret::new),
            get(ENV_SHEETS_RANGE),
        )?;

        let total_questions = match get(ENV_TOTAL_QUESTIONS) {
            Some(raw) => parse_positive(ENV_TOTAL_QUESTIONS, &raw)?,
            None => DEFAULT_TOTAL_QUESTIONS,
        };
        let port = match get(ENV_PORT) {
            Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    key: ENV_PORT,
                    reason: e.to_string(),
                }
            })?,
            None => DEFAULT_PORT,
        };
        let bind = match get(ENV_BIND) {
            Some(raw) => raw.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::Invalid {
                    key: ENV_BIND,
                    reason: e.to_string(),
                }
            })?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        Ok(Self {
            encryption_key,
            store,
            pairs_path: get(ENV_PAIRS_PATH)
                .unwrap_or_else(|| DEFAULT_PAIRS_PATH.to_string())
                .into(),
            total_questions,
            image_url_template: get(ENV_IMAGE_URL_TEMPLATE)
                .unwrap_or_else(|| DEFAULT_IMAGE_URL_TEMPLATE.to_string()),
            bind,
            port,
        })
    }
}

/// Parses `sqlite:…` or `sheets://<spreadsheet-id>`.
///
/// # Errors
///
/// Returns `ConfigError` for unknown schemes, an empty spreadsheet id, or a
/// Sheets target without credentials.
pub fn parse_store_target(
    url: &str,
    credentials: Option<Secret>,
    range: Option<String>,
) -> Result<StoreTarget, ConfigError> {
    if url.starts_with("sqlite:") {
        return Ok(StoreTarget::Sqlite(url.to_string()));
    }

    if let Some(id) = url.strip_prefix("sheets://") {
        let spreadsheet_id = id.trim_end_matches('/');
        if spreadsheet_id.is_empty() || spreadsheet_id.contains('/') {
            return Err(ConfigError::Invalid {
                key: ENV_STORE_URL,
                reason: "expected sheets://<spreadsheet-id>".into(),
            });
        }
        let credentials = credentials.ok_or(ConfigError::Missing(ENV_STORE_CREDENTIALS))?;
        return Ok(StoreTarget::Sheets {
            spreadsheet_id: spreadsheet_id.to_string(),
            credentials,
            range: range.unwrap_or_else(|| DEFAULT_SHEETS_RANGE.to_string()),
        });
    }

    Err(ConfigError::Invalid {
        key: ENV_STORE_URL,
        reason: format!("unsupported store url `{url}`"),
    })
}

fn parse_positive(key: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid {
            key,
            reason: "must be at least 1".into(),
        }),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}
