//! Dashboard overview: a learner's progress across their grade's levels.

use std::sync::Arc;

use math_core::model::{Level, LevelId, ProgressRecord, User, UserId};
use storage::repository::{LevelRepository, ProgressRepository, StorageError, UserRepository};

use crate::error::OverviewError;

/// One dashboard row: a level and the learner's progress on it, if any.
///
/// Presentation-agnostic on purpose: no pre-formatted strings, the UI
/// decides how to render percentages and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelProgressItem {
    pub level: Level,
    pub progress: Option<ProgressRecord>,
}

impl LevelProgressItem {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.progress.as_ref().is_some_and(ProgressRecord::is_completed)
    }
}

/// Everything the dashboard needs for one learner.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOverview {
    pub user: User,
    pub levels: Vec<LevelProgressItem>,
}

impl DashboardOverview {
    #[must_use]
    pub fn completed_levels(&self) -> usize {
        self.levels.iter().filter(|item| item.is_completed()).count()
    }

    #[must_use]
    pub fn total_levels(&self) -> usize {
        self.levels.len()
    }

    /// Share of the grade's levels completed, as a 0-100 percentage.
    #[must_use]
    pub fn overall_percent(&self) -> u32 {
        if self.levels.is_empty() {
            return 0;
        }
        let pct = self.completed_levels() as f64 / self.levels.len() as f64 * 100.0;
        pct.round() as u32
    }

    /// First level in grade order without a completed progress row.
    #[must_use]
    pub fn next_level(&self) -> Option<LevelId> {
        self.levels
            .iter()
            .find(|item| !item.is_completed())
            .map(|item| item.level.id())
    }
}

/// Loads the dashboard view for a learner.
#[derive(Clone)]
pub struct OverviewService {
    users: Arc<dyn UserRepository>,
    levels: Arc<dyn LevelRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl OverviewService {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        levels: Arc<dyn LevelRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            users,
            levels,
            progress,
        }
    }

    /// Builds the overview for the given learner: the levels of their
    /// grade in order, each joined with their progress row if one exists.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::UserNotFound` for an unknown user, or
    /// `OverviewError::Storage` on repository failures.
    pub async fn load(&self, user_id: UserId) -> Result<DashboardOverview, OverviewError> {
        let user = self.users.get_user(user_id).await.map_err(|e| match e {
            StorageError::NotFound => OverviewError::UserNotFound,
            other => OverviewError::Storage(other),
        })?;

        let levels = self.levels.levels_for_grade(user.grade()).await?;
        let progress_rows = self.progress.progress_for_user(user_id).await?;

        let items = levels
            .into_iter()
            .map(|level| {
                let progress = progress_rows
                    .iter()
                    .find(|p| p.level_id() == level.id())
                    .cloned();
                LevelProgressItem { level, progress }
            })
            .collect();

        Ok(DashboardOverview { user, levels: items })
    }
}
