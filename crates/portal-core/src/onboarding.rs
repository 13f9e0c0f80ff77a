//! Sign-up age gating.
//!
//! The applicant's age decides whether an account may be created at all and
//! which content rating and censorship level the session starts with.

use crate::clock::Clock;
use crate::config::OnboardingConfig;
use crate::error::{PortalError, PortalResult};
use crate::models::{AgeRating, CensorshipLevel, Role};
use crate::session::{AccessibilitySettings, Profile, SessionState};
use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

/// Whole years between `birth_date` and `today`
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Sign-up form contents
#[derive(Debug, Clone)]
pub struct SignUp {
    pub username: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub role: Role,
    pub language: String,
    pub accessibility: AccessibilitySettings,
}

/// Default rating and censorship for an age
pub fn content_defaults(age: i32, rules: &OnboardingConfig) -> (AgeRating, CensorshipLevel) {
    if age >= rules.adult_age {
        (AgeRating::Eighteen, CensorshipLevel::Low)
    } else {
        (AgeRating::Thirteen, CensorshipLevel::Strict)
    }
}

/// Validate the applicant's age as of the clock's today and open a fresh session
pub fn onboard(signup: SignUp, clock: &dyn Clock, rules: &OnboardingConfig) -> PortalResult<SessionState> {
    let today = clock.today();
    if signup.birth_date > today {
        return Err(PortalError::InvalidBirthDate(signup.birth_date));
    }

    let age = age_on(signup.birth_date, today);
    if age < rules.min_age {
        warn!(username = %signup.username, age, "Sign-up refused, below minimum age");
        return Err(PortalError::UnderMinimumAge {
            age,
            minimum: rules.min_age,
        });
    }

    let (age_rating_preference, censorship_level) = content_defaults(age, rules);
    info!(
        username = %signup.username,
        role = %signup.role,
        rating = %age_rating_preference,
        "Session opened"
    );

    Ok(SessionState::new(Profile {
        username: signup.username,
        full_name: signup.full_name,
        role: signup.role,
        birth_date: Some(signup.birth_date),
        age_rating_preference,
        censorship_level,
        language: signup.language,
        accessibility: signup.accessibility,
    }))
}
