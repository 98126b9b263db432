//! Client-local practice-session state machine.
//!
//! Tracks one learner working through one level: current problem index,
//! per-problem answer state, and the second-chance flag. This state lives
//! with the interacting client for the duration of a level play and is
//! never persisted; the durable counters are in `ProgressRecord`.

use thiserror::Error;

use crate::model::{Grade, InputMode};
use crate::policy::GradedSubmission;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("current problem is not awaiting a retry")]
    NotAwaitingRetry,

    #[error("current problem has not been answered")]
    ProblemUnanswered,

    #[error("already at the last problem")]
    AtLastProblem,

    #[error("session has no problems")]
    Empty,
}

/// Answer state of the problem currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProblemState {
    /// No submission yet, or retrying after a first miss.
    #[default]
    Unanswered,
    /// A 1st/2nd grader's first miss; a second chance is on offer.
    FirstWrong,
    /// Terminal for this problem: correct, or a final wrong answer.
    Answered,
}

/// Transient state for one learner playing one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSession {
    grade: Grade,
    problem_count: usize,
    current: usize,
    state: ProblemState,
    showing_second_chance: bool,
    score: u32,
    total_answered: u32,
}

impl PracticeSession {
    /// Starts a fresh session over `problem_count` problems.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the level has no problems.
    pub fn new(grade: Grade, problem_count: usize) -> Result<Self, SessionError> {
        Self::resume(grade, problem_count, 0, 0)
    }

    /// Resumes a session with counters seeded from existing progress,
    /// the way the level screen restores score/attempts on reload.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the level has no problems.
    pub fn resume(
        grade: Grade,
        problem_count: usize,
        score: u32,
        total_answered: u32,
    ) -> Result<Self, SessionError> {
        if problem_count == 0 {
            return Err(SessionError::Empty);
        }
        Ok(Self {
            grade,
            problem_count,
            current: 0,
            state: ProblemState::Unanswered,
            showing_second_chance: false,
            score,
            total_answered,
        })
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn state(&self) -> ProblemState {
        self.state
    }

    #[must_use]
    pub fn is_showing_second_chance(&self) -> bool {
        self.showing_second_chance
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_answered(&self) -> u32 {
        self.total_answered
    }

    #[must_use]
    pub fn input_mode(&self) -> InputMode {
        self.grade.input_mode()
    }

    #[must_use]
    pub fn is_last_problem(&self) -> bool {
        self.current + 1 >= self.problem_count
    }

    /// Whether counting hints are visible right now: kindergarten always,
    /// 1st/2nd only while retrying, 3rd grade and above never.
    #[must_use]
    pub fn shows_hints(&self) -> bool {
        self.grade.always_shows_hints()
            || (self.grade.offers_second_chance() && self.showing_second_chance)
    }

    /// Whether the learner may select or type an answer right now.
    #[must_use]
    pub fn can_select(&self) -> bool {
        if self.grade.always_shows_hints() {
            // Kindergarten interacts until the problem is settled.
            return self.state != ProblemState::Answered;
        }
        self.state == ProblemState::Unanswered || self.showing_second_chance
    }

    /// Folds a graded submission into the session.
    ///
    /// Correct or final-wrong outcomes settle the problem and bump the
    /// running counters; a first miss with a second chance on offer parks
    /// the problem in `FirstWrong` without counting anything.
    pub fn apply(&mut self, graded: GradedSubmission) {
        if graded.is_correct {
            self.score += 1;
            self.state = ProblemState::Answered;
            self.showing_second_chance = false;
            self.total_answered += 1;
        } else if graded.offers_second_chance {
            self.state = ProblemState::FirstWrong;
        } else {
            self.state = ProblemState::Answered;
            self.showing_second_chance = false;
            self.total_answered += 1;
        }
    }

    /// Takes the second chance: back to `Unanswered` with scaffolding on.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAwaitingRetry` unless the current problem
    /// is in `FirstWrong`.
    pub fn try_again(&mut self) -> Result<(), SessionError> {
        if self.state != ProblemState::FirstWrong {
            return Err(SessionError::NotAwaitingRetry);
        }
        self.state = ProblemState::Unanswered;
        self.showing_second_chance = true;
        Ok(())
    }

    /// Moves to the next problem, clearing per-problem state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ProblemUnanswered` if the current problem is
    /// not settled, or `SessionError::AtLastProblem` past the end.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        if self.state != ProblemState::Answered {
            return Err(SessionError::ProblemUnanswered);
        }
        if self.is_last_problem() {
            return Err(SessionError::AtLastProblem);
        }
        self.current += 1;
        self.state = ProblemState::Unanswered;
        self.showing_second_chance = false;
        Ok(())
    }

    /// Restarts from the first problem, keeping the running counters.
    /// Used when the learner re-runs a level to raise their accuracy.
    pub fn restart(&mut self) {
        self.current = 0;
        self.state = ProblemState::Unanswered;
        self.showing_second_chance = false;
    }

    /// Running accuracy shown in the header: score over answered attempts.
    /// Distinct from the completion gate, which divides by the level's
    /// declared problem count.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_answered == 0 {
            return 0;
        }
        let pct = f64::from(self.score) / f64::from(self.total_answered) * 100.0;
        pct.round() as u32
    }

    /// Percentage of the level worked through so far.
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        let settled = usize::from(self.state == ProblemState::Answered);
        let pct = (self.current + settled) as f64 / self.problem_count as f64 * 100.0;
        pct.round() as u32
    }

    /// Whether the learner may request level completion: every declared
    /// problem answered and running accuracy at least 80%.
    #[must_use]
    pub fn can_complete(&self) -> bool {
        self.total_answered as usize >= self.problem_count && self.accuracy_percent() >= 80
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::grade_submission;

    fn session(grade: Grade) -> PracticeSession {
        PracticeSession::new(grade, 5).unwrap()
    }

    #[test]
    fn empty_level_is_rejected() {
        assert_eq!(
            PracticeSession::new(Grade::First, 0).unwrap_err(),
            SessionError::Empty
        );
    }

    #[test]
    fn correct_answer_settles_and_counts() {
        let mut s = session(Grade::First);
        s.apply(grade_submission(5, 5, Grade::First, false));
        assert_eq!(s.state(), ProblemState::Answered);
        assert_eq!(s.score(), 1);
        assert_eq!(s.total_answered(), 1);
    }

    #[test]
    fn first_miss_parks_in_first_wrong_without_counting() {
        let mut s = session(Grade::First);
        s.apply(grade_submission(4, 5, Grade::First, false));
        assert_eq!(s.state(), ProblemState::FirstWrong);
        assert_eq!(s.total_answered(), 0);
        assert!(!s.shows_hints());
    }

    #[test]
    fn second_chance_cycle_shows_hints_then_counts() {
        let mut s = session(Grade::Second);
        s.apply(grade_submission(4, 5, Grade::Second, false));
        s.try_again().unwrap();
        assert_eq!(s.state(), ProblemState::Unanswered);
        assert!(s.is_showing_second_chance());
        assert!(s.shows_hints());
        assert!(s.can_select());

        // Second miss is final.
        s.apply(grade_submission(3, 5, Grade::Second, true));
        assert_eq!(s.state(), ProblemState::Answered);
        assert_eq!(s.total_answered(), 1);
        assert!(!s.is_showing_second_chance());
    }

    #[test]
    fn try_again_requires_first_wrong() {
        let mut s = session(Grade::First);
        assert_eq!(s.try_again().unwrap_err(), SessionError::NotAwaitingRetry);
    }

    #[test]
    fn third_grade_miss_is_terminal() {
        let mut s = session(Grade::Third);
        s.apply(grade_submission(4, 5, Grade::Third, false));
        assert_eq!(s.state(), ProblemState::Answered);
        assert_eq!(s.total_answered(), 1);
        assert!(!s.shows_hints());
    }

    #[test]
    fn kindergarten_always_shows_hints_and_selects_until_answered() {
        let mut s = session(Grade::Kindergarten);
        assert!(s.shows_hints());
        assert!(s.can_select());
        s.apply(grade_submission(4, 5, Grade::Kindergarten, false));
        assert!(!s.can_select());
        assert!(s.shows_hints());
    }

    #[test]
    fn advance_resets_per_problem_state() {
        let mut s = session(Grade::First);
        s.apply(grade_submission(4, 5, Grade::First, false));
        s.try_again().unwrap();
        s.apply(grade_submission(4, 5, Grade::First, true));
        s.advance().unwrap();
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.state(), ProblemState::Unanswered);
        assert!(!s.is_showing_second_chance());
    }

    #[test]
    fn advance_guards_unanswered_and_last_problem() {
        let mut s = PracticeSession::new(Grade::First, 1).unwrap();
        assert_eq!(s.advance().unwrap_err(), SessionError::ProblemUnanswered);
        s.apply(grade_submission(5, 5, Grade::First, false));
        assert_eq!(s.advance().unwrap_err(), SessionError::AtLastProblem);
    }

    #[test]
    fn accuracy_and_completion_gate() {
        let mut s = session(Grade::Third);
        for _ in 0..4 {
            s.apply(grade_submission(5, 5, Grade::Third, false));
            let _ = s.advance();
        }
        s.apply(grade_submission(4, 5, Grade::Third, false));
        assert_eq!(s.total_answered(), 5);
        assert_eq!(s.accuracy_percent(), 80);
        assert!(s.can_complete());
    }

    #[test]
    fn restart_keeps_counters() {
        let mut s = session(Grade::Third);
        s.apply(grade_submission(4, 5, Grade::Third, false));
        s.advance().unwrap();
        s.restart();
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.total_answered(), 1);
        assert_eq!(s.state(), ProblemState::Unanswered);
    }
}
