//! Problem generation for level seeding.
//!
//! Mirrors the seeded curriculum: operand size grows with the grade,
//! kindergarten stays addition-only, and subtraction operands are swapped
//! so answers never go negative. Three distractors are derived from the
//! answer and shuffled in with it.

use rand::Rng;
use rand::seq::SliceRandom;

use math_core::model::{Grade, LevelId, Problem, ProblemError, ProblemId, ProblemKind};

/// Generates arithmetic problems for one level.
pub struct ProblemGenerator<R: Rng> {
    rng: R,
}

impl ProblemGenerator<rand::rngs::ThreadRng> {
    #[must_use]
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for ProblemGenerator<rand::rngs::ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ProblemGenerator<R> {
    /// Wraps an explicit RNG, mainly for deterministic tests.
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generates one problem for the grade.
    ///
    /// # Errors
    ///
    /// Returns `ProblemError` if the generated problem fails validation;
    /// with the bounds used here that indicates a generator bug.
    pub fn generate(
        &mut self,
        level_id: LevelId,
        grade: Grade,
    ) -> Result<Problem, ProblemError> {
        let kind = if grade == Grade::Kindergarten || self.rng.random_bool(0.5) {
            ProblemKind::Addition
        } else {
            ProblemKind::Subtraction
        };

        let max = grade.operand_range();
        let mut num1 = self.rng.random_range(1..=max);
        let mut num2 = self.rng.random_range(1..=max);
        if kind == ProblemKind::Subtraction && num2 > num1 {
            // Keep answers non-negative for young learners.
            std::mem::swap(&mut num1, &mut num2);
        }

        let answer = match kind {
            ProblemKind::Addition => num1 + num2,
            ProblemKind::Subtraction => num1 - num2,
        };

        let question = format!("{num1} {} {num2} = ?", kind.symbol());

        let mut options = vec![
            answer,
            (answer + self.rng.random_range(1..=5)).max(0),
            (answer - self.rng.random_range(1..=5)).max(0),
            (answer + self.rng.random_range(5..=14)).max(0),
        ];
        options.shuffle(&mut self.rng);

        Problem::new(ProblemId::generate(), level_id, question, answer, options, kind)
    }

    /// Generates `count` problems for the grade's level.
    ///
    /// # Errors
    ///
    /// Propagates the first `ProblemError` from `generate`.
    pub fn generate_batch(
        &mut self,
        level_id: LevelId,
        grade: Grade,
        count: u32,
    ) -> Result<Vec<Problem>, ProblemError> {
        let mut problems = Vec::with_capacity(count as usize);
        for _ in 0..count {
            problems.push(self.generate(level_id, grade)?);
        }
        Ok(problems)
    }
}
