//! Statically validated request parsing.
//!
//! The transport layer hands in raw string form fields; this module turns
//! them into typed actions with explicit required/optional fields. Every
//! conversion failure is a distinct, typed error rather than a silently
//! defaulted value.

use std::collections::HashMap;

use thiserror::Error;

use math_core::model::{LevelId, ProblemId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RequestError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid {field} value: {raw}")]
    InvalidField { field: &'static str, raw: String },

    #[error("unknown action: {0}")]
    UnknownAction(String),
}

/// One answer submission for a problem in a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAnswer {
    pub user_id: UserId,
    pub level_id: LevelId,
    pub problem_id: ProblemId,
    pub answer: i64,
    /// True when this submission is the retry after a first miss.
    /// Optional in the raw form; absent means a first attempt.
    pub is_second_attempt: bool,
}

/// A request to mark the level complete for this user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteLevel {
    pub user_id: UserId,
    pub level_id: LevelId,
}

/// A parsed practice-screen request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeRequest {
    SubmitAnswer(SubmitAnswer),
    CompleteLevel(CompleteLevel),
}

impl PracticeRequest {
    /// Parses raw form fields into a typed request.
    ///
    /// Recognized actions are `submit-answer` and `complete-level`;
    /// anything else is rejected as invalid input.
    ///
    /// # Errors
    ///
    /// Returns `RequestError` for a missing required field, a field that
    /// fails typed conversion, or an unknown action.
    pub fn parse<'a, I>(fields: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let fields: HashMap<&str, &str> = fields.into_iter().collect();

        let action = require(&fields, "action")?;
        match action {
            "submit-answer" => Ok(Self::SubmitAnswer(SubmitAnswer {
                user_id: parse_field(&fields, "userId")?,
                level_id: parse_field(&fields, "levelId")?,
                problem_id: parse_field(&fields, "problemId")?,
                answer: parse_field(&fields, "userAnswer")?,
                is_second_attempt: parse_bool_opt(&fields, "isSecondAttempt")?,
            })),
            "complete-level" => Ok(Self::CompleteLevel(CompleteLevel {
                user_id: parse_field(&fields, "userId")?,
                level_id: parse_field(&fields, "levelId")?,
            })),
            other => Err(RequestError::UnknownAction(other.to_string())),
        }
    }
}

fn require<'a>(
    fields: &HashMap<&str, &'a str>,
    name: &'static str,
) -> Result<&'a str, RequestError> {
    match fields.get(name) {
        Some(raw) if !raw.trim().is_empty() => Ok(raw),
        _ => Err(RequestError::MissingField(name)),
    }
}

fn parse_field<T: std::str::FromStr>(
    fields: &HashMap<&str, &str>,
    name: &'static str,
) -> Result<T, RequestError> {
    let raw = require(fields, name)?;
    raw.parse().map_err(|_| RequestError::InvalidField {
        field: name,
        raw: raw.to_string(),
    })
}

fn parse_bool_opt(
    fields: &HashMap<&str, &str>,
    name: &'static str,
) -> Result<bool, RequestError> {
    match fields.get(name) {
        None => Ok(false),
        Some(&"true") => Ok(true),
        Some(&"false") => Ok(false),
        Some(raw) => Err(RequestError::InvalidField {
            field: name,
            raw: (*raw).to_string(),
        }),
    }
}
