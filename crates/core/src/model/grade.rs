use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur when building a `Grade` from raw input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GradeError {
    #[error("invalid grade value: {0} (expected 0-5)")]
    InvalidGrade(u8),
}

//
// ─── GRADE ────────────────────────────────────────────────────────────────────
//

/// How a learner enters answers for their grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Pick one of the listed options (kindergarten and 1st grade).
    MultipleChoice,
    /// Type a number (2nd grade and above).
    Keyboard,
}

/// Learner's school-year level, kindergarten (0) through 5th grade.
///
/// The grade drives every per-learner policy decision: input modality,
/// second-chance eligibility, hint scaffolding, and the difficulty of
/// generated problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    Kindergarten,
    First,
    Second,
    Third,
    Fourth,
    Fifth,
}

impl Grade {
    /// Converts a numeric grade (0-5) to a `Grade`.
    ///
    /// # Errors
    ///
    /// Returns `GradeError::InvalidGrade` if the value is not in the range 0-5.
    pub fn from_u8(value: u8) -> Result<Self, GradeError> {
        match value {
            0 => Ok(Self::Kindergarten),
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            4 => Ok(Self::Fourth),
            5 => Ok(Self::Fifth),
            _ => Err(GradeError::InvalidGrade(value)),
        }
    }

    /// Returns the numeric grade value (0 for kindergarten).
    #[must_use]
    pub fn value(self) -> u8 {
        match self {
            Grade::Kindergarten => 0,
            Grade::First => 1,
            Grade::Second => 2,
            Grade::Third => 3,
            Grade::Fourth => 4,
            Grade::Fifth => 5,
        }
    }

    /// Human-readable grade name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Grade::Kindergarten => "Kindergarten",
            Grade::First => "1st Grade",
            Grade::Second => "2nd Grade",
            Grade::Third => "3rd Grade",
            Grade::Fourth => "4th Grade",
            Grade::Fifth => "5th Grade",
        }
    }

    /// All grades in ascending order.
    #[must_use]
    pub fn all() -> [Grade; 6] {
        [
            Grade::Kindergarten,
            Grade::First,
            Grade::Second,
            Grade::Third,
            Grade::Fourth,
            Grade::Fifth,
        ]
    }

    /// Answer input modality: multiple choice up to 1st grade, free
    /// numeric entry from 2nd grade on.
    #[must_use]
    pub fn input_mode(self) -> InputMode {
        if self.value() >= 2 {
            InputMode::Keyboard
        } else {
            InputMode::MultipleChoice
        }
    }

    /// Whether a wrong first answer earns a penalty-free retry.
    ///
    /// Only 1st and 2nd graders get a second chance; kindergarten sees
    /// hints up front instead, and 3rd grade and above get neither.
    #[must_use]
    pub fn offers_second_chance(self) -> bool {
        matches!(self, Grade::First | Grade::Second)
    }

    /// Whether counting hints are shown before any attempt.
    #[must_use]
    pub fn always_shows_hints(self) -> bool {
        matches!(self, Grade::Kindergarten)
    }

    /// Upper bound (inclusive) for operands in generated problems.
    #[must_use]
    pub fn operand_range(self) -> i64 {
        match self {
            Grade::Kindergarten => 5,
            Grade::First => 10,
            Grade::Second => 20,
            Grade::Third => 50,
            Grade::Fourth => 100,
            Grade::Fifth => 200,
        }
    }

    /// Number of problems seeded into this grade's level.
    #[must_use]
    pub fn problems_per_level(self) -> u32 {
        match self {
            Grade::Kindergarten => 5,
            Grade::First => 10,
            Grade::Second => 15,
            Grade::Third => 20,
            Grade::Fourth => 25,
            Grade::Fifth => 30,
        }
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8_roundtrip() {
        for grade in Grade::all() {
            assert_eq!(Grade::from_u8(grade.value()).unwrap(), grade);
        }
    }

    #[test]
    fn from_u8_rejects_out_of_range() {
        assert_eq!(Grade::from_u8(6), Err(GradeError::InvalidGrade(6)));
    }

    #[test]
    fn input_mode_splits_at_second_grade() {
        assert_eq!(Grade::Kindergarten.input_mode(), InputMode::MultipleChoice);
        assert_eq!(Grade::First.input_mode(), InputMode::MultipleChoice);
        assert_eq!(Grade::Second.input_mode(), InputMode::Keyboard);
        assert_eq!(Grade::Fifth.input_mode(), InputMode::Keyboard);
    }

    #[test]
    fn second_chance_only_for_first_and_second() {
        assert!(!Grade::Kindergarten.offers_second_chance());
        assert!(Grade::First.offers_second_chance());
        assert!(Grade::Second.offers_second_chance());
        assert!(!Grade::Third.offers_second_chance());
    }

    #[test]
    fn only_kindergarten_always_shows_hints() {
        let with_hints: Vec<_> = Grade::all()
            .into_iter()
            .filter(|g| g.always_shows_hints())
            .collect();
        assert_eq!(with_hints, vec![Grade::Kindergarten]);
    }
}
