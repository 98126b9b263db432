use math_core::model::{
    AttemptRecord, Grade, Level, LevelId, Problem, ProblemId, ProblemKind, ProgressRecord, User,
    UserId,
};
use sqlx::Row;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn user_id_from_str(s: &str) -> Result<UserId, StorageError> {
    s.parse::<UserId>().map_err(ser)
}

pub(crate) fn level_id_from_str(s: &str) -> Result<LevelId, StorageError> {
    s.parse::<LevelId>().map_err(ser)
}

pub(crate) fn problem_id_from_str(s: &str) -> Result<ProblemId, StorageError> {
    s.parse::<ProblemId>().map_err(ser)
}

/// Converts a `Grade` to its storage representation (0..=5).
pub(crate) fn grade_to_i64(grade: Grade) -> i64 {
    i64::from(grade.value())
}

/// Converts a stored integer grade (0..=5) back into `Grade`.
/// This must stay consistent with `grade_to_i64`.
pub(crate) fn grade_from_i64(value: i64) -> Result<Grade, StorageError> {
    let raw = u8::try_from(value)
        .map_err(|_| StorageError::Serialization(format!("invalid grade: {value}")))?;
    Grade::from_u8(raw).map_err(ser)
}

/// Options are persisted as a JSON array in a TEXT column.
pub(crate) fn options_to_json(options: &[i64]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn options_from_json(raw: &str) -> Result<Vec<i64>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_user_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
    let id = user_id_from_str(row.try_get::<String, _>("id").map_err(ser)?.as_str())?;
    let grade = grade_from_i64(row.try_get::<i64, _>("grade").map_err(ser)?)?;

    User::new(
        id,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<String, _>("avatar").map_err(ser)?,
        grade,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_level_row(row: &sqlx::sqlite::SqliteRow) -> Result<Level, StorageError> {
    let id = level_id_from_str(row.try_get::<String, _>("id").map_err(ser)?.as_str())?;
    let grade = grade_from_i64(row.try_get::<i64, _>("grade").map_err(ser)?)?;

    let level_number_i64: i64 = row.try_get("level_number").map_err(ser)?;
    let level_number = u32::try_from(level_number_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid level_number: {level_number_i64}")))?;

    let problem_count_i64: i64 = row.try_get("problem_count").map_err(ser)?;
    let problem_count = u32::try_from(problem_count_i64).map_err(|_| {
        StorageError::Serialization(format!("invalid problem_count: {problem_count_i64}"))
    })?;

    Level::new(
        id,
        grade,
        level_number,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<Option<String>, _>("description").map_err(ser)?,
        problem_count,
    )
    .map_err(ser)
}

pub(crate) fn map_problem_row(row: &sqlx::sqlite::SqliteRow) -> Result<Problem, StorageError> {
    let id = problem_id_from_str(row.try_get::<String, _>("id").map_err(ser)?.as_str())?;
    let level_id =
        level_id_from_str(row.try_get::<String, _>("level_id").map_err(ser)?.as_str())?;
    let options = options_from_json(row.try_get::<String, _>("options").map_err(ser)?.as_str())?;
    let kind =
        ProblemKind::parse(row.try_get::<String, _>("kind").map_err(ser)?.as_str()).map_err(ser)?;

    Problem::from_persisted(
        id,
        level_id,
        row.try_get::<String, _>("question").map_err(ser)?,
        row.try_get("answer").map_err(ser)?,
        options,
        kind,
    )
    .map_err(ser)
}

pub(crate) fn map_attempt_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<AttemptRecord, StorageError> {
    Ok(AttemptRecord {
        user_id: user_id_from_str(row.try_get::<String, _>("user_id").map_err(ser)?.as_str())?,
        problem_id: problem_id_from_str(
            row.try_get::<String, _>("problem_id").map_err(ser)?.as_str(),
        )?,
        answer: row.try_get("answer").map_err(ser)?,
        is_correct: row.try_get::<i64, _>("is_correct").map_err(ser)? != 0,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ProgressRecord, StorageError> {
    let count = |field: &'static str, v: i64| -> Result<u32, StorageError> {
        u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
    };

    ProgressRecord::from_persisted(
        user_id_from_str(row.try_get::<String, _>("user_id").map_err(ser)?.as_str())?,
        level_id_from_str(row.try_get::<String, _>("level_id").map_err(ser)?.as_str())?,
        count(
            "correct_answers",
            row.try_get::<i64, _>("correct_answers").map_err(ser)?,
        )?,
        count(
            "total_attempts",
            row.try_get::<i64, _>("total_attempts").map_err(ser)?,
        )?,
        count("score", row.try_get::<i64, _>("score").map_err(ser)?)?,
        row.try_get::<i64, _>("is_completed").map_err(ser)? != 0,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)
}
