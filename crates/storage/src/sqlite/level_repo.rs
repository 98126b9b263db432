use math_core::model::{Grade, Level, LevelId, Problem, ProblemId};

use super::{
    SqliteRepository,
    mapping::{grade_to_i64, map_level_row, map_problem_row, options_to_json},
};
use crate::repository::{LevelRepository, StorageError};

#[async_trait::async_trait]
impl LevelRepository for SqliteRepository {
    async fn insert_level(&self, level: &Level) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO levels (id, grade, level_number, name, description, problem_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(level.id().to_string())
        .bind(grade_to_i64(level.grade()))
        .bind(i64::from(level.level_number()))
        .bind(level.name().to_owned())
        .bind(level.description().map(ToOwned::to_owned))
        .bind(i64::from(level.problem_count()))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn insert_problem(&self, problem: &Problem) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO problems (id, level_id, question, answer, options, kind)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(problem.id().to_string())
        .bind(problem.level_id().to_string())
        .bind(problem.question().to_owned())
        .bind(problem.answer())
        .bind(options_to_json(problem.options())?)
        .bind(problem.kind().as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_level(&self, id: LevelId) -> Result<Level, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, grade, level_number, name, description, problem_count
            FROM levels
            WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_level_row(&row),
            None => Err(StorageError::NotFound),
        }
    }

    async fn levels_for_grade(&self, grade: Grade) -> Result<Vec<Level>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, grade, level_number, name, description, problem_count
            FROM levels
            WHERE grade = ?1
            ORDER BY level_number ASC
            ",
        )
        .bind(grade_to_i64(grade))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut levels = Vec::with_capacity(rows.len());
        for row in rows {
            levels.push(map_level_row(&row)?);
        }
        Ok(levels)
    }

    async fn get_problem(&self, id: ProblemId) -> Result<Problem, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, level_id, question, answer, options, kind
            FROM problems
            WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_problem_row(&row),
            None => Err(StorageError::NotFound),
        }
    }

    async fn problems_for_level(&self, level_id: LevelId) -> Result<Vec<Problem>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, level_id, question, answer, options, kind
            FROM problems
            WHERE level_id = ?1
            ORDER BY rowid ASC
            ",
        )
        .bind(level_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut problems = Vec::with_capacity(rows.len());
        for row in rows {
            problems.push(map_problem_row(&row)?);
        }
        Ok(problems)
    }
}
