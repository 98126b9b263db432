//! Answer-grading and finality policy.
//!
//! A submission is graded against the problem's answer, and the learner's
//! grade decides what happens on a miss: 1st and 2nd graders get one
//! penalty-free retry before the attempt counts, everyone else is scored
//! immediately. The functions here are pure; persistence is the caller's
//! concern.

use crate::model::Grade;

/// Minimum completion-gating accuracy: correct answers over the level's
/// declared problem count.
pub const PASS_ACCURACY: f64 = 0.8;

/// Outcome of grading one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradedSubmission {
    /// Whether the submitted answer equals the correct answer.
    pub is_correct: bool,
    /// True only for a 1st/2nd grader's first miss on a problem: the
    /// learner gets a scaffolded retry before the attempt counts.
    pub offers_second_chance: bool,
}

/// Grades a submitted answer.
#[must_use]
pub fn grade_submission(
    submitted: i64,
    correct: i64,
    grade: Grade,
    is_second_attempt: bool,
) -> GradedSubmission {
    let is_correct = submitted == correct;
    GradedSubmission {
        is_correct,
        offers_second_chance: !is_correct
            && grade.offers_second_chance()
            && !is_second_attempt,
    }
}

/// Whether this attempt counts toward persisted progress.
///
/// Final means: correct, or kindergarten, or 3rd grade and above, or
/// already a second attempt. Non-final attempts are still logged as
/// `AttemptRecord`s; they just do not touch the progress counters.
#[must_use]
pub fn is_final_attempt(is_correct: bool, grade: Grade, is_second_attempt: bool) -> bool {
    is_correct || grade == Grade::Kindergarten || grade.value() >= 3 || is_second_attempt
}

/// Whether the given accuracy clears the completion gate.
#[must_use]
pub fn meets_completion_threshold(accuracy: f64) -> bool {
    accuracy >= PASS_ACCURACY
}
