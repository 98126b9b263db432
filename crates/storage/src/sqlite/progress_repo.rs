use math_core::model::{LevelId, ProgressRecord, UserId};

use super::{SqliteRepository, mapping::map_progress_row};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(
        &self,
        user_id: UserId,
        level_id: LevelId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, level_id, correct_answers, total_attempts, score,
                   is_completed, completed_at
            FROM progress
            WHERE user_id = ?1 AND level_id = ?2
            ",
        )
        .bind(user_id.to_string())
        .bind(level_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|row| map_progress_row(&row)).transpose()
    }

    async fn upsert_progress(&self, progress: &ProgressRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO progress (
                user_id, level_id, correct_answers, total_attempts, score,
                is_completed, completed_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id, level_id) DO UPDATE SET
                correct_answers = excluded.correct_answers,
                total_attempts = excluded.total_attempts,
                score = excluded.score,
                is_completed = excluded.is_completed,
                completed_at = excluded.completed_at
            ",
        )
        .bind(progress.user_id().to_string())
        .bind(progress.level_id().to_string())
        .bind(i64::from(progress.correct_answers()))
        .bind(i64::from(progress.total_attempts()))
        .bind(i64::from(progress.score()))
        .bind(i64::from(progress.is_completed()))
        .bind(progress.completed_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn progress_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, level_id, correct_answers, total_attempts, score,
                   is_completed, completed_at
            FROM progress
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(map_progress_row(&row)?);
        }
        Ok(records)
    }
}
