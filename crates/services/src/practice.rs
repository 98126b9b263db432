//! The practice-screen action handler: answer submission and level
//! completion against persisted progress.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use math_core::Clock;
use math_core::model::{AttemptRecord, ProblemId, ProgressRecord};
use math_core::policy::{self, GradedSubmission};
use storage::repository::{
    AttemptRepository, LevelRepository, ProgressRepository, UserRepository,
};

use crate::error::{PracticeError, not_found_as};
use crate::request::{CompleteLevel, PracticeRequest, SubmitAnswer};

/// Result of one answer submission, echoed back to the practice screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub problem_id: ProblemId,
    pub is_correct: bool,
    pub correct_answer: i64,
    /// True for a 1st/2nd grader's first miss: the screen offers a
    /// scaffolded retry instead of settling the problem.
    pub offers_second_chance: bool,
}

impl SubmissionOutcome {
    /// The session-machine view of this outcome.
    #[must_use]
    pub fn graded(&self) -> GradedSubmission {
        GradedSubmission {
            is_correct: self.is_correct,
            offers_second_chance: self.offers_second_chance,
        }
    }
}

/// Result of a level-completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Accuracy cleared the gate; the learner moves on to the dashboard.
    Completed { completed_at: DateTime<Utc> },
    /// Below the gate (or no progress yet); not an error.
    NeedsMorePractice,
}

/// Response for a dispatched `PracticeRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeResponse {
    Submission(SubmissionOutcome),
    Completion(CompletionOutcome),
}

/// Orchestrates grading, attempt logging, and progress updates.
///
/// Stateless per request: the transient play state lives with the client
/// in a `PracticeSession`; this service only touches durable records.
#[derive(Clone)]
pub struct PracticeService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
    levels: Arc<dyn LevelRepository>,
    attempts: Arc<dyn AttemptRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl PracticeService {
    #[must_use]
    pub fn new(
        clock: Clock,
        users: Arc<dyn UserRepository>,
        levels: Arc<dyn LevelRepository>,
        attempts: Arc<dyn AttemptRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            users,
            levels,
            attempts,
            progress,
        }
    }

    /// Dispatches a parsed request to the matching operation.
    ///
    /// # Errors
    ///
    /// Propagates the underlying operation's `PracticeError`.
    pub async fn handle(&self, request: PracticeRequest) -> Result<PracticeResponse, PracticeError> {
        match request {
            PracticeRequest::SubmitAnswer(submit) => self
                .submit_answer(submit)
                .await
                .map(PracticeResponse::Submission),
            PracticeRequest::CompleteLevel(complete) => self
                .complete_level(complete)
                .await
                .map(PracticeResponse::Completion),
        }
    }

    /// Grades one submission and applies the finality policy.
    ///
    /// Every submission is appended to the attempt log. Only final
    /// attempts (correct, kindergarten, 3rd grade and up, or a second
    /// attempt) touch the progress counters; a 1st/2nd grader's first
    /// miss is logged but deferred until their retry.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::ProblemNotFound` / `UserNotFound` when the
    /// referenced entities do not exist, or `PracticeError::Storage` on
    /// repository failures. Nothing is persisted before the lookups pass.
    pub async fn submit_answer(
        &self,
        submit: SubmitAnswer,
    ) -> Result<SubmissionOutcome, PracticeError> {
        let problem = not_found_as(
            self.levels.get_problem(submit.problem_id).await,
            PracticeError::ProblemNotFound,
        )?;
        let user = not_found_as(
            self.users.get_user(submit.user_id).await,
            PracticeError::UserNotFound,
        )?;

        let graded = policy::grade_submission(
            submit.answer,
            problem.answer(),
            user.grade(),
            submit.is_second_attempt,
        );

        let now = self.clock.now();
        self.attempts
            .append_attempt(&AttemptRecord::new(
                submit.user_id,
                submit.problem_id,
                submit.answer,
                graded.is_correct,
                now,
            ))
            .await?;

        if policy::is_final_attempt(graded.is_correct, user.grade(), submit.is_second_attempt) {
            let updated = match self
                .progress
                .get_progress(submit.user_id, submit.level_id)
                .await?
            {
                Some(mut existing) => {
                    existing.record_attempt(graded.is_correct);
                    existing
                }
                None => ProgressRecord::first_attempt(
                    submit.user_id,
                    submit.level_id,
                    graded.is_correct,
                ),
            };
            self.progress.upsert_progress(&updated).await?;
        }

        Ok(SubmissionOutcome {
            problem_id: submit.problem_id,
            is_correct: graded.is_correct,
            correct_answer: problem.answer(),
            offers_second_chance: graded.offers_second_chance,
        })
    }

    /// Checks the completion gate and, when cleared, marks the level
    /// completed.
    ///
    /// The gate divides correct answers by the level's declared problem
    /// count, not by total attempts. Missing or empty progress yields
    /// `NeedsMorePractice` without error. Completion is idempotent: a
    /// repeat request after success returns the original timestamp and
    /// mutates nothing.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::LevelNotFound` if the level does not exist,
    /// or `PracticeError::Storage` on repository failures.
    pub async fn complete_level(
        &self,
        complete: CompleteLevel,
    ) -> Result<CompletionOutcome, PracticeError> {
        let level = not_found_as(
            self.levels.get_level(complete.level_id).await,
            PracticeError::LevelNotFound,
        )?;

        let Some(mut progress) = self
            .progress
            .get_progress(complete.user_id, complete.level_id)
            .await?
        else {
            return Ok(CompletionOutcome::NeedsMorePractice);
        };

        let accuracy = progress.accuracy_for(level.problem_count());
        if !policy::meets_completion_threshold(accuracy) {
            return Ok(CompletionOutcome::NeedsMorePractice);
        }

        if let Some(existing) = progress.completed_at() {
            return Ok(CompletionOutcome::Completed {
                completed_at: existing,
            });
        }

        let completed_at = progress.complete(self.clock.now());
        self.progress.upsert_progress(&progress).await?;

        Ok(CompletionOutcome::Completed { completed_at })
    }
}
