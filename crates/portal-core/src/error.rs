//! Domain error type for the portal core.
//!
//! Only outright contract violations surface here. Inputs that are unexpected
//! but not invalid (unknown release patterns, unmodeled media types, repeated
//! claims, first-time categories) resolve to safe defaults instead.

use crate::models::Role;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortalError {
    #[error("Month index out of range (expected 0-11): {0}")]
    InvalidMonth(u32),

    #[error("Weekday index out of range (expected 0-6): {0}")]
    InvalidWeekday(u32),

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Insufficient balance: requested {requested:.2}, available {available:.2}")]
    InsufficientBalance { requested: f64, available: f64 },

    #[error("Role '{role}' may not {action}")]
    PermissionDenied { role: Role, action: &'static str },

    #[error("Minimum age is {minimum}, applicant is {age}")]
    UnderMinimumAge { age: i32, minimum: i32 },

    #[error("Birth date {0} lies in the future")]
    InvalidBirthDate(chrono::NaiveDate),

    #[error("Duplicate item id: {0}")]
    DuplicateItem(String),

    #[error("No contribution with id: {0}")]
    UnknownContribution(String),

    #[error("Unknown series: {0}")]
    UnknownSeries(String),

    #[error("Episode {episode} already exists in series {series_id}")]
    DuplicateEpisode { series_id: String, episode: u32 },

    #[error("Invalid episode linkage for item {0}")]
    InvalidEpisode(String),
}

/// A convenience type alias for `Result<T, PortalError>`.
pub type PortalResult<T> = Result<T, PortalError>;
