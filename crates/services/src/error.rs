//! Shared error types for the services crate.

use thiserror::Error;

use math_core::model::{LevelError, ProblemError, ProgressError};
use storage::repository::StorageError;

/// Errors emitted by `PracticeService`.
///
/// The distinct not-found variants mirror the policy core's error surface:
/// each missing referenced entity is its own failure, never retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PracticeError {
    #[error("problem not found")]
    ProblemNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("level not found")]
    LevelNotFound,

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `OverviewService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OverviewError {
    #[error("user not found")]
    UserNotFound,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SeedService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Problem(#[from] ProblemError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Maps a repository `NotFound` to an entity-specific error, passing other
/// storage failures through.
pub(crate) fn not_found_as<T>(
    result: Result<T, StorageError>,
    as_err: PracticeError,
) -> Result<T, PracticeError> {
    result.map_err(|e| match e {
        StorageError::NotFound => as_err,
        other => PracticeError::Storage(other),
    })
}
