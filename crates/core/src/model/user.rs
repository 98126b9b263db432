use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Grade, UserId};

/// Maximum length for a learner's display name.
pub const MAX_NAME_LEN: usize = 20;

/// Errors that can occur while building a `User`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("name must be 1-{MAX_NAME_LEN} characters, got {len}")]
    InvalidName { len: usize },

    #[error("avatar is required")]
    EmptyAvatar,
}

/// A learner profile: display name, picked avatar, and school grade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    avatar: String,
    grade: Grade,
    created_at: DateTime<Utc>,
}

impl User {
    /// Creates a validated user profile.
    ///
    /// # Errors
    ///
    /// Returns `UserError::InvalidName` if the name is empty or longer than
    /// `MAX_NAME_LEN` characters, or `UserError::EmptyAvatar` if no avatar
    /// was picked.
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        avatar: impl Into<String>,
        grade: Grade,
        created_at: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let name = name.into();
        let len = name.chars().count();
        if len == 0 || len > MAX_NAME_LEN {
            return Err(UserError::InvalidName { len });
        }
        let avatar = avatar.into();
        if avatar.trim().is_empty() {
            return Err(UserError::EmptyAvatar);
        }

        Ok(Self {
            id,
            name,
            avatar,
            grade,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn avatar(&self) -> &str {
        &self.avatar
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
