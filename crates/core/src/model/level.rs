use thiserror::Error;

use crate::model::{Grade, LevelId};

/// Errors that can occur while building a `Level`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("level name is empty")]
    EmptyName,

    #[error("problem count must be greater than zero")]
    ZeroProblemCount,
}

/// A leveled set of practice problems for one grade.
///
/// `problem_count` is the level's declared size; completion accuracy is
/// gated against it, not against the learner's attempt count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    id: LevelId,
    grade: Grade,
    level_number: u32,
    name: String,
    description: Option<String>,
    problem_count: u32,
}

impl Level {
    /// Creates a validated level.
    ///
    /// # Errors
    ///
    /// Returns `LevelError::EmptyName` or `LevelError::ZeroProblemCount` on
    /// invalid input.
    pub fn new(
        id: LevelId,
        grade: Grade,
        level_number: u32,
        name: impl Into<String>,
        description: Option<String>,
        problem_count: u32,
    ) -> Result<Self, LevelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LevelError::EmptyName);
        }
        if problem_count == 0 {
            return Err(LevelError::ZeroProblemCount);
        }

        Ok(Self {
            id,
            grade,
            level_number,
            name,
            description,
            problem_count,
        })
    }

    #[must_use]
    pub fn id(&self) -> LevelId {
        self.id
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    #[must_use]
    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn problem_count(&self) -> u32 {
        self.problem_count
    }
}
