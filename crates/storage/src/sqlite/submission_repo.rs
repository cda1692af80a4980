use sqlx::Row;
use survey_core::model::{SubmissionRecord, UserId};

use super::SqliteRepository;
use crate::repository::{StorageError, SubmissionRepository, SubmissionRow};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn map_submission_row(row: &sqlx::sqlite::SqliteRow) -> Result<SubmissionRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let submitted_at = row.try_get("submitted_at").map_err(ser)?;
    let user_id = UserId::new(row.try_get::<String, _>("user_id").map_err(ser)?).map_err(ser)?;
    let entries_json: String = row.try_get("entries").map_err(ser)?;
    let entries: Vec<String> = serde_json::from_str(&entries_json).map_err(ser)?;

    Ok(SubmissionRow {
        id,
        submitted_at,
        user_id,
        entries,
    })
}

#[async_trait::async_trait]
impl SubmissionRepository for SqliteRepository {
    async fn append_submission(&self, record: &SubmissionRecord) -> Result<(), StorageError> {
        let entries = serde_json::to_string(&record.entry_codes()).map_err(ser)?;

        sqlx::query(
            r"
                INSERT INTO submissions (submitted_at, user_id, entries)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(record.submitted_at())
        .bind(record.user_id().as_str())
        .bind(entries)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}

impl SqliteRepository {
    /// Most recent submissions first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails or a row cannot be decoded.
    pub async fn list_submission_rows(&self, limit: u32) -> Result<Vec<SubmissionRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, submitted_at, user_id, entries
                FROM submissions
                ORDER BY submitted_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_submission_row).collect()
    }

    /// Submissions recorded for one participant, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails or a row cannot be decoded.
    pub async fn submissions_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SubmissionRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, submitted_at, user_id, entries
                FROM submissions
                WHERE user_id = ?1
                ORDER BY submitted_at ASC, id ASC
            ",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_submission_row).collect()
    }

    /// Total number of stored submissions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    pub async fn count_submissions(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        u64::try_from(count).map_err(ser)
    }
}
