use async_trait::async_trait;
use math_core::model::{
    AttemptRecord, Grade, Level, LevelId, Problem, ProblemId, ProgressRecord, User, UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for learner profiles.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id already exists, or other
    /// storage errors.
    async fn insert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Fetch a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_user(&self, id: UserId) -> Result<User, StorageError>;

    /// List user profiles, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn list_users(&self, limit: u32) -> Result<Vec<User>, StorageError>;
}

/// Repository contract for levels and their problems.
#[async_trait]
pub trait LevelRepository: Send + Sync {
    /// Persist a new level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the level cannot be stored.
    async fn insert_level(&self, level: &Level) -> Result<(), StorageError>;

    /// Persist a seeded problem.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the problem cannot be stored.
    async fn insert_problem(&self, problem: &Problem) -> Result<(), StorageError>;

    /// Fetch a level by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_level(&self, id: LevelId) -> Result<Level, StorageError>;

    /// Levels for a grade, ordered by level number.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn levels_for_grade(&self, grade: Grade) -> Result<Vec<Level>, StorageError>;

    /// Fetch a problem by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_problem(&self, id: ProblemId) -> Result<Problem, StorageError>;

    /// All problems seeded for a level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn problems_for_level(&self, level_id: LevelId) -> Result<Vec<Problem>, StorageError>;
}

/// Append-only submission log.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Append one attempt record. Attempts are never updated or deleted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(&self, attempt: &AttemptRecord) -> Result<(), StorageError>;

    /// A user's attempts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn attempts_for_user(&self, user_id: UserId)
    -> Result<Vec<AttemptRecord>, StorageError>;
}

/// Per-(user, level) cumulative progress counters.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the progress row for a (user, level) pair, if one exists yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn get_progress(
        &self,
        user_id: UserId,
        level_id: LevelId,
    ) -> Result<Option<ProgressRecord>, StorageError>;

    /// Create or update the progress row for its (user, level) pair.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn upsert_progress(&self, progress: &ProgressRecord) -> Result<(), StorageError>;

    /// All progress rows for a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn progress_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProgressRecord>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<Mutex<Vec<User>>>,
    levels: Arc<Mutex<HashMap<LevelId, Level>>>,
    problems: Arc<Mutex<HashMap<ProblemId, Problem>>>,
    attempts: Arc<Mutex<Vec<AttemptRecord>>>,
    progress: Arc<Mutex<HashMap<(UserId, LevelId), ProgressRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        let mut guard = self.users.lock().map_err(lock_err)?;
        if guard.iter().any(|u| u.id() == user.id()) {
            return Err(StorageError::Conflict);
        }
        guard.push(user.clone());
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<User, StorageError> {
        let guard = self.users.lock().map_err(lock_err)?;
        guard
            .iter()
            .find(|u| u.id() == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_users(&self, limit: u32) -> Result<Vec<User>, StorageError> {
        let guard = self.users.lock().map_err(lock_err)?;
        Ok(guard.iter().take(limit as usize).cloned().collect())
    }
}

#[async_trait]
impl LevelRepository for InMemoryRepository {
    async fn insert_level(&self, level: &Level) -> Result<(), StorageError> {
        let mut guard = self.levels.lock().map_err(lock_err)?;
        guard.insert(level.id(), level.clone());
        Ok(())
    }

    async fn insert_problem(&self, problem: &Problem) -> Result<(), StorageError> {
        let mut guard = self.problems.lock().map_err(lock_err)?;
        guard.insert(problem.id(), problem.clone());
        Ok(())
    }

    async fn get_level(&self, id: LevelId) -> Result<Level, StorageError> {
        let guard = self.levels.lock().map_err(lock_err)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn levels_for_grade(&self, grade: Grade) -> Result<Vec<Level>, StorageError> {
        let guard = self.levels.lock().map_err(lock_err)?;
        let mut levels: Vec<Level> = guard
            .values()
            .filter(|l| l.grade() == grade)
            .cloned()
            .collect();
        levels.sort_by_key(Level::level_number);
        Ok(levels)
    }

    async fn get_problem(&self, id: ProblemId) -> Result<Problem, StorageError> {
        let guard = self.problems.lock().map_err(lock_err)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn problems_for_level(&self, level_id: LevelId) -> Result<Vec<Problem>, StorageError> {
        let guard = self.problems.lock().map_err(lock_err)?;
        Ok(guard
            .values()
            .filter(|p| p.level_id() == level_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn append_attempt(&self, attempt: &AttemptRecord) -> Result<(), StorageError> {
        let mut guard = self.attempts.lock().map_err(lock_err)?;
        guard.push(attempt.clone());
        Ok(())
    }

    async fn attempts_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AttemptRecord>, StorageError> {
        let guard = self.attempts.lock().map_err(lock_err)?;
        Ok(guard
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(
        &self,
        user_id: UserId,
        level_id: LevelId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self.progress.lock().map_err(lock_err)?;
        Ok(guard.get(&(user_id, level_id)).cloned())
    }

    async fn upsert_progress(&self, progress: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(lock_err)?;
        guard.insert(
            (progress.user_id(), progress.level_id()),
            progress.clone(),
        );
        Ok(())
    }

    async fn progress_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self.progress.lock().map_err(lock_err)?;
        Ok(guard
            .values()
            .filter(|p| p.user_id() == user_id)
            .cloned()
            .collect())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub levels: Arc<dyn LevelRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            users: Arc::new(repo.clone()),
            levels: Arc::new(repo.clone()),
            attempts: Arc::new(repo.clone()),
            progress: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use math_core::time::fixed_now;

    fn build_user() -> User {
        User::new(UserId::generate(), "Test", "🎓", Grade::First, fixed_now()).unwrap()
    }

    fn build_level(grade: Grade, number: u32) -> Level {
        Level::new(
            LevelId::generate(),
            grade,
            number,
            format!("Level {number}"),
            None,
            5,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn user_insert_is_unique() {
        let repo = InMemoryRepository::new();
        let user = build_user();
        repo.insert_user(&user).await.unwrap();
        assert!(matches!(
            repo.insert_user(&user).await,
            Err(StorageError::Conflict)
        ));
        assert_eq!(repo.get_user(user.id()).await.unwrap().name(), "Test");
    }

    #[tokio::test]
    async fn levels_for_grade_orders_by_number() {
        let repo = InMemoryRepository::new();
        repo.insert_level(&build_level(Grade::First, 2)).await.unwrap();
        repo.insert_level(&build_level(Grade::First, 1)).await.unwrap();
        repo.insert_level(&build_level(Grade::Second, 1)).await.unwrap();

        let levels = repo.levels_for_grade(Grade::First).await.unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].level_number(), 1);
    }

    #[tokio::test]
    async fn progress_upsert_replaces_per_pair() {
        let repo = InMemoryRepository::new();
        let user = build_user();
        let level = build_level(Grade::First, 1);

        let mut progress =
            ProgressRecord::first_attempt(user.id(), level.id(), true);
        repo.upsert_progress(&progress).await.unwrap();
        progress.record_attempt(false);
        repo.upsert_progress(&progress).await.unwrap();

        let fetched = repo
            .get_progress(user.id(), level.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.total_attempts(), 2);
        assert_eq!(fetched.correct_answers(), 1);
    }

    #[tokio::test]
    async fn missing_progress_is_none_not_error() {
        let repo = InMemoryRepository::new();
        let got = repo
            .get_progress(UserId::generate(), LevelId::generate())
            .await
            .unwrap();
        assert!(got.is_none());
    }
}
