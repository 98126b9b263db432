use thiserror::Error;

use crate::model::{LevelId, ProblemId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur while building a `Problem`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProblemError {
    #[error("question text is empty")]
    EmptyQuestion,

    #[error("options do not contain the correct answer {answer}")]
    AnswerNotInOptions { answer: i64 },

    #[error("invalid problem kind: {0}")]
    InvalidKind(String),
}

//
// ─── PROBLEM KIND ─────────────────────────────────────────────────────────────
//

/// Arithmetic operation a problem exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    Addition,
    Subtraction,
}

impl ProblemKind {
    /// Storage/display token for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProblemKind::Addition => "addition",
            ProblemKind::Subtraction => "subtraction",
        }
    }

    /// Operator symbol used in question text.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            ProblemKind::Addition => '+',
            ProblemKind::Subtraction => '-',
        }
    }

    /// Parses the storage token back into a kind.
    ///
    /// # Errors
    ///
    /// Returns `ProblemError::InvalidKind` for unknown tokens.
    pub fn parse(s: &str) -> Result<Self, ProblemError> {
        match s {
            "addition" => Ok(Self::Addition),
            "subtraction" => Ok(Self::Subtraction),
            other => Err(ProblemError::InvalidKind(other.to_string())),
        }
    }
}

//
// ─── PROBLEM ──────────────────────────────────────────────────────────────────
//

/// A single arithmetic problem, immutable once generated.
///
/// `options` is the multiple-choice candidate list; it always contains the
/// correct answer and may repeat distractor values (the generator does not
/// deduplicate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    id: ProblemId,
    level_id: LevelId,
    question: String,
    answer: i64,
    options: Vec<i64>,
    kind: ProblemKind,
}

impl Problem {
    /// Creates a validated problem.
    ///
    /// # Errors
    ///
    /// Returns `ProblemError::EmptyQuestion` if the question text is blank, or
    /// `ProblemError::AnswerNotInOptions` if the choice list omits the answer.
    pub fn new(
        id: ProblemId,
        level_id: LevelId,
        question: impl Into<String>,
        answer: i64,
        options: Vec<i64>,
        kind: ProblemKind,
    ) -> Result<Self, ProblemError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(ProblemError::EmptyQuestion);
        }
        if !options.contains(&answer) {
            return Err(ProblemError::AnswerNotInOptions { answer });
        }

        Ok(Self {
            id,
            level_id,
            question,
            answer,
            options,
            kind,
        })
    }

    /// Rehydrate a problem from persisted storage.
    ///
    /// # Errors
    ///
    /// Applies the same validation as `new`.
    pub fn from_persisted(
        id: ProblemId,
        level_id: LevelId,
        question: String,
        answer: i64,
        options: Vec<i64>,
        kind: ProblemKind,
    ) -> Result<Self, ProblemError> {
        Self::new(id, level_id, question, answer, options, kind)
    }

    #[must_use]
    pub fn id(&self) -> ProblemId {
        self.id
    }

    #[must_use]
    pub fn level_id(&self) -> LevelId {
        self.level_id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn answer(&self) -> i64 {
        self.answer
    }

    #[must_use]
    pub fn options(&self) -> &[i64] {
        &self.options
    }

    #[must_use]
    pub fn kind(&self) -> ProblemKind {
        self.kind
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (ProblemId, LevelId) {
        (ProblemId::generate(), LevelId::generate())
    }

    #[test]
    fn builds_valid_problem() {
        let (pid, lid) = ids();
        let problem = Problem::new(
            pid,
            lid,
            "2 + 3 = ?",
            5,
            vec![3, 4, 5, 6],
            ProblemKind::Addition,
        )
        .unwrap();
        assert_eq!(problem.answer(), 5);
        assert_eq!(problem.kind().symbol(), '+');
    }

    #[test]
    fn rejects_empty_question() {
        let (pid, lid) = ids();
        let err = Problem::new(pid, lid, "  ", 5, vec![5], ProblemKind::Addition).unwrap_err();
        assert_eq!(err, ProblemError::EmptyQuestion);
    }

    #[test]
    fn rejects_options_without_answer() {
        let (pid, lid) = ids();
        let err =
            Problem::new(pid, lid, "2 + 3 = ?", 5, vec![3, 4, 6], ProblemKind::Addition)
                .unwrap_err();
        assert_eq!(err, ProblemError::AnswerNotInOptions { answer: 5 });
    }

    #[test]
    fn kind_token_roundtrip() {
        assert_eq!(
            ProblemKind::parse(ProblemKind::Subtraction.as_str()).unwrap(),
            ProblemKind::Subtraction
        );
        assert!(ProblemKind::parse("division").is_err());
    }
}
