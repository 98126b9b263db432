use chrono::{DateTime, Utc};

use crate::model::{ProblemId, UserId};

/// Record of a single answer submission, final or not.
///
/// Attempts are append-only: every submission is logged, including the
/// penalty-free first miss a 1st/2nd grader gets before their second
/// chance. Whether an attempt also counts toward progress is decided by
/// the finality policy, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub user_id: UserId,
    pub problem_id: ProblemId,
    pub answer: i64,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
}

impl AttemptRecord {
    #[must_use]
    pub fn new(
        user_id: UserId,
        problem_id: ProblemId,
        answer: i64,
        is_correct: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            problem_id,
            answer,
            is_correct,
            created_at,
        }
    }
}
