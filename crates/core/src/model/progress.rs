use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{LevelId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("total attempts ({total}) is less than correct answers ({correct})")]
    CountMismatch { correct: u32, total: u32 },

    #[error("score ({score}) does not mirror correct answers ({correct})")]
    ScoreMismatch { score: u32, correct: u32 },

    #[error("completed progress is missing its completion timestamp")]
    MissingCompletedAt,

    #[error("incomplete progress carries a completion timestamp")]
    UnexpectedCompletedAt,
}

/// Persisted cumulative counters for one (user, level) pair.
///
/// Created lazily on the first final attempt and updated additively after
/// that. `score` always mirrors `correct_answers`; `is_completed` moves
/// false→true at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    user_id: UserId,
    level_id: LevelId,
    correct_answers: u32,
    total_attempts: u32,
    score: u32,
    is_completed: bool,
    completed_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    /// Creates the record for a learner's first final attempt on a level.
    #[must_use]
    pub fn first_attempt(user_id: UserId, level_id: LevelId, is_correct: bool) -> Self {
        let correct = u32::from(is_correct);
        Self {
            user_id,
            level_id,
            correct_answers: correct,
            total_attempts: 1,
            score: correct,
            is_completed: false,
            completed_at: None,
        }
    }

    /// Rehydrate a progress record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the stored counters violate the record's
    /// invariants.
    pub fn from_persisted(
        user_id: UserId,
        level_id: LevelId,
        correct_answers: u32,
        total_attempts: u32,
        score: u32,
        is_completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Self, ProgressError> {
        if total_attempts < correct_answers {
            return Err(ProgressError::CountMismatch {
                correct: correct_answers,
                total: total_attempts,
            });
        }
        if score != correct_answers {
            return Err(ProgressError::ScoreMismatch {
                score,
                correct: correct_answers,
            });
        }
        if is_completed && completed_at.is_none() {
            return Err(ProgressError::MissingCompletedAt);
        }
        if !is_completed && completed_at.is_some() {
            return Err(ProgressError::UnexpectedCompletedAt);
        }

        Ok(Self {
            user_id,
            level_id,
            correct_answers,
            total_attempts,
            score,
            is_completed,
            completed_at,
        })
    }

    /// Applies one final attempt: bumps the attempt counter, and the
    /// correct counter when the answer was right. `score` stays in lockstep
    /// with `correct_answers`.
    pub fn record_attempt(&mut self, is_correct: bool) {
        self.correct_answers = self
            .correct_answers
            .saturating_add(u32::from(is_correct));
        self.total_attempts = self.total_attempts.saturating_add(1);
        self.score = self.correct_answers;
    }

    /// Marks the level completed at `at`.
    ///
    /// Completion is monotonic: once set, repeated calls keep the original
    /// timestamp and return it unchanged.
    pub fn complete(&mut self, at: DateTime<Utc>) -> DateTime<Utc> {
        if let Some(existing) = self.completed_at {
            return existing;
        }
        self.is_completed = true;
        self.completed_at = Some(at);
        at
    }

    /// Completion-gating accuracy: correct answers over the level's
    /// declared problem count. Deliberately not `correct / total_attempts`,
    /// which is what the UI shows as running accuracy.
    #[must_use]
    pub fn accuracy_for(&self, problem_count: u32) -> f64 {
        if problem_count == 0 || self.total_attempts == 0 {
            return 0.0;
        }
        f64::from(self.correct_answers) / f64::from(problem_count)
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn level_id(&self) -> LevelId {
        self.level_id
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.total_attempts
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn ids() -> (UserId, LevelId) {
        (UserId::generate(), LevelId::generate())
    }

    #[test]
    fn first_attempt_seeds_counters() {
        let (uid, lid) = ids();
        let wrong = ProgressRecord::first_attempt(uid, lid, false);
        assert_eq!(wrong.correct_answers(), 0);
        assert_eq!(wrong.total_attempts(), 1);
        assert_eq!(wrong.score(), 0);

        let right = ProgressRecord::first_attempt(uid, lid, true);
        assert_eq!(right.correct_answers(), 1);
        assert_eq!(right.score(), 1);
    }

    #[test]
    fn record_attempt_keeps_score_mirrored() {
        let (uid, lid) = ids();
        let mut progress = ProgressRecord::first_attempt(uid, lid, true);
        progress.record_attempt(false);
        progress.record_attempt(true);
        assert_eq!(progress.total_attempts(), 3);
        assert_eq!(progress.correct_answers(), 2);
        assert_eq!(progress.score(), progress.correct_answers());
    }

    #[test]
    fn completion_is_monotonic() {
        let (uid, lid) = ids();
        let mut progress = ProgressRecord::first_attempt(uid, lid, true);
        let first = progress.complete(fixed_now());
        let later = fixed_now() + chrono::Duration::hours(1);
        let second = progress.complete(later);
        assert_eq!(first, second);
        assert_eq!(progress.completed_at(), Some(first));
        assert!(progress.is_completed());
    }

    #[test]
    fn accuracy_uses_problem_count_not_attempts() {
        let (uid, lid) = ids();
        let mut progress = ProgressRecord::first_attempt(uid, lid, true);
        for _ in 0..3 {
            progress.record_attempt(true);
        }
        for _ in 0..3 {
            progress.record_attempt(false);
        }
        // 4 correct out of 7 attempts, but gated against 5 declared problems.
        assert!((progress.accuracy_for(5) - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn rehydration_rejects_bad_counters() {
        let (uid, lid) = ids();
        let err =
            ProgressRecord::from_persisted(uid, lid, 3, 2, 3, false, None).unwrap_err();
        assert_eq!(err, ProgressError::CountMismatch { correct: 3, total: 2 });

        let err =
            ProgressRecord::from_persisted(uid, lid, 2, 3, 1, false, None).unwrap_err();
        assert_eq!(err, ProgressError::ScoreMismatch { score: 1, correct: 2 });

        let err =
            ProgressRecord::from_persisted(uid, lid, 2, 3, 2, true, None).unwrap_err();
        assert_eq!(err, ProgressError::MissingCompletedAt);

        let err =
            ProgressRecord::from_persisted(uid, lid, 2, 3, 2, false, Some(fixed_now()))
                .unwrap_err();
        assert_eq!(err, ProgressError::UnexpectedCompletedAt);
    }
}
