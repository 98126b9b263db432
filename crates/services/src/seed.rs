//! Database seeding: one level per grade with generated problems.

use std::sync::Arc;

use rand::Rng;

use math_core::model::{Grade, Level, LevelId, ProblemKind};
use storage::repository::LevelRepository;

use crate::error::SeedError;
use crate::generator::ProblemGenerator;

/// What a seeding run created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub levels_created: u32,
    pub problems_created: u32,
}

/// Seeds the per-grade levels and their problems.
#[derive(Clone)]
pub struct SeedService {
    levels: Arc<dyn LevelRepository>,
}

impl SeedService {
    #[must_use]
    pub fn new(levels: Arc<dyn LevelRepository>) -> Self {
        Self { levels }
    }

    /// Creates one level per grade, each with the grade's declared number
    /// of generated problems. Grades that already have levels are left
    /// untouched, so re-running seed is safe.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` on level/problem validation or storage failures.
    pub async fn seed_all_grades<R: Rng>(
        &self,
        generator: &mut ProblemGenerator<R>,
    ) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();

        for grade in Grade::all() {
            if !self.levels.levels_for_grade(grade).await?.is_empty() {
                continue;
            }

            let level = build_level(grade)?;
            self.levels.insert_level(&level).await?;
            report.levels_created += 1;

            let problems =
                generator.generate_batch(level.id(), grade, grade.problems_per_level())?;
            for problem in &problems {
                self.levels.insert_problem(problem).await?;
                report.problems_created += 1;
            }
        }

        Ok(report)
    }
}

fn build_level(grade: Grade) -> Result<Level, math_core::model::LevelError> {
    // Kindergarten sticks to addition; everyone else gets a mix.
    let (name, description) = if grade == Grade::Kindergarten {
        (
            format!("{} - Addition", grade.display_name()),
            format!(
                "Simple {} problems for {}",
                ProblemKind::Addition.as_str(),
                grade.display_name()
            ),
        )
    } else {
        (
            format!("{} - Mixed Math", grade.display_name()),
            format!("Addition and subtraction problems for {}", grade.display_name()),
        )
    };

    Level::new(
        LevelId::generate(),
        grade,
        1,
        name,
        Some(description),
        grade.problems_per_level(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn seeds_every_grade_once() {
        let repo = Arc::new(InMemoryRepository::new());
        let seed = SeedService::new(repo.clone());
        let mut generator = ProblemGenerator::new();

        let report = seed.seed_all_grades(&mut generator).await.unwrap();
        assert_eq!(report.levels_created, 6);
        // 5 + 10 + 15 + 20 + 25 + 30 problems across the grades.
        assert_eq!(report.problems_created, 105);

        let kindergarten = repo.levels_for_grade(Grade::Kindergarten).await.unwrap();
        assert_eq!(kindergarten.len(), 1);
        assert_eq!(kindergarten[0].problem_count(), 5);
        let problems = repo.problems_for_level(kindergarten[0].id()).await.unwrap();
        assert_eq!(problems.len(), 5);

        // Re-running is a no-op.
        let rerun = seed.seed_all_grades(&mut generator).await.unwrap();
        assert_eq!(rerun, SeedReport::default());
    }
}
