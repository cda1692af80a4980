//! Google Sheets submission sink over the `values:append` REST endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use storage::repository::{StorageError, SubmissionRepository};
use survey_core::model::SubmissionRecord;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_SHEETS_RANGE: &str = "Sheet1";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub range: String,
    pub base_url: String,
}

impl SheetsConfig {
    #[must_use]
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            range: DEFAULT_SHEETS_RANGE.to_string(),
            base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }
}

/// Supplies a bearer token for each Sheets request.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Unauthorized` if no token can be obtained.
    async fn access_token(&self) -> Result<String, StorageError>;
}

/// Tokens minted from a Google service-account key.
///
/// The account caches its token and mints a new one once it expires.
pub struct ServiceAccountTokens {
    account: CustomServiceAccount,
}

impl ServiceAccountTokens {
    /// Parses a service-account JSON key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unauthorized` if the key is malformed.
    pub fn from_json(key: &str) -> Result<Self, StorageError> {
        let account = CustomServiceAccount::from_json(key)
            .map_err(|e| StorageError::Unauthorized(format!("invalid service account key: {e}")))?;
        Ok(Self { account })
    }
}

impl std::fmt::Debug for ServiceAccountTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountTokens").finish_non_exhaustive()
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountTokens {
    async fn access_token(&self) -> Result<String, StorageError> {
        let token = self
            .account
            .token(&[SHEETS_SCOPE])
            .await
            .map_err(|e| StorageError::Unauthorized(format!("could not obtain access token: {e}")))?;
        Ok(token.as_str().to_string())
    }
}

/// Appends each submission as one spreadsheet row.
#[derive(Clone)]
pub struct SheetsRepository {
    client: Client,
    config: SheetsConfig,
    tokens: Arc<dyn AccessTokenSource>,
}

impl SheetsRepository {
    #[must_use]
    pub fn new(config: SheetsConfig, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            client: Client::new(),
            config,
            tokens,
        }
    }
}

impl std::fmt::Debug for SheetsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsRepository")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct AppendRequest<'a> {
    values: [&'a [String]; 1],
}

/// Endpoint for appending rows to `config.range`.
///
/// # Errors
///
/// Returns `StorageError::Connection` if the base URL cannot carry a path.
pub fn append_url(config: &SheetsConfig) -> Result<Url, StorageError> {
    let range_segment = format!("{}:append", config.range);
    let mut url =
        Url::parse(&config.base_url).map_err(|e| StorageError::Connection(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| StorageError::Connection("sheets base url cannot be a base".into()))?
        .pop_if_empty()
        .extend([
            "v4",
            "spreadsheets",
            config.spreadsheet_id.as_str(),
            "values",
            range_segment.as_str(),
        ]);
    url.query_pairs_mut()
        .append_pair("valueInputOption", "RAW")
        .append_pair("insertDataOption", "INSERT_ROWS");
    Ok(url)
}

#[async_trait]
impl SubmissionRepository for SheetsRepository {
    async fn append_submission(&self, record: &SubmissionRecord) -> Result<(), StorageError> {
        let url = append_url(&self.config)?;
        let row = record.to_row();
        let body = AppendRequest { values: [row.as_slice()] };
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(StorageError::Unauthorized(format!("sheets returned {status}")))
            }
            StatusCode::NOT_FOUND => Err(StorageError::NotFound),
            _ => Err(StorageError::Connection(format!("sheets returned {status}"))),
        }
    }
}
