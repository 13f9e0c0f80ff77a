//! Core library for the mastery portal.
//!
//! This crate provides the logic behind the portal's catalog views:
//! - Release scheduling and cycle phase tracking for series
//! - Per-category progress ledger and achievements
//! - Contributor payouts and reward claiming
//! - Session state shared behind a single lock
//! - Sign-up age gating
//! - Catalog loading and browsing
//! - Configuration and logging infrastructure

pub mod achievements;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod onboarding;
pub mod progress;
pub mod rewards;
pub mod schedule;
pub mod session;

// Re-export commonly used types
pub use achievements::{Achievement, AchievementBook};
pub use catalog::Catalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{PortalError, PortalResult};
pub use logging::LogConfig;
pub use models::*;
pub use progress::ProgressLedger;
pub use rewards::{compute_payout, ClaimOutcome, RewardLedger, RewardRates, Wallet};
pub use schedule::{compute_cycle_phase, is_release_day, CyclePhase, ReleaseScheduler};
pub use session::{Profile, SessionHandle, SessionState};

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
