//! Session state container.
//!
//! [`SessionState`] is the single mutable record for the signed-in user.
//! [`SessionHandle`] shares it behind one mutex so every command (mastery
//! gains, claims, wallet actions) observes a consistent snapshot.

use crate::achievements::{Achievement, AchievementBook, AchievementFacts};
use crate::clock::Clock;
use crate::config::ProgressConfig;
use crate::error::{PortalError, PortalResult};
use crate::models::{AgeRating, CensorshipLevel, MediaItem, Role};
use crate::progress::{self, ProgressLedger};
use crate::rewards::{ClaimOutcome, RewardEntry, RewardLedger, RewardRates, Wallet};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// Display preferences; carried through untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilitySettings {
    pub no_punctuation: bool,
    pub high_contrast: bool,
    pub screen_reader_optimized: bool,
    pub dyslexic_font: bool,
}

/// Identity and preferences of the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub birth_date: Option<NaiveDate>,
    pub age_rating_preference: AgeRating,
    pub censorship_level: CensorshipLevel,
    pub language: String,
    pub accessibility: AccessibilitySettings,
}

impl Profile {
    /// Adult defaults with no birth date on record
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        let username = username.into();
        Self {
            full_name: username.clone(),
            username,
            role,
            birth_date: None,
            age_rating_preference: AgeRating::Eighteen,
            censorship_level: CensorshipLevel::Low,
            language: "en".to_string(),
            accessibility: AccessibilitySettings::default(),
        }
    }
}

/// Mutable progress record of one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub profile: Profile,
    pub wallet: Wallet,
    pub session_minutes: u64,
    pub consumed_categories: ProgressLedger,
    pub insight_count: u32,
    pub cycle_start_month: u32,
    pub achievements: AchievementBook,
    pub rewards: RewardLedger,
}

impl SessionState {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            wallet: Wallet::default(),
            session_minutes: 0,
            consumed_categories: ProgressLedger::new(),
            insight_count: 0,
            cycle_start_month: 0,
            achievements: AchievementBook::new(),
            rewards: RewardLedger::new(),
        }
    }

    pub fn facts(&self) -> AchievementFacts {
        AchievementFacts {
            insight_count: self.insight_count,
            total_earnings: self.wallet.total_earnings,
            has_human_made_contribution: self
                .rewards
                .contributions()
                .iter()
                .any(|item| item.is_human_made),
        }
    }

    /// Ledger increment plus flat earnings and minutes, applied together
    pub fn gain_mastery(&mut self, category: &str, progress: &ProgressConfig) -> PortalResult<u64> {
        self.wallet.credit(progress.earning_per_consumption)?;
        self.session_minutes += progress.minutes_per_consumption;
        Ok(self.consumed_categories.record_consumption(category))
    }

    pub fn set_cycle_start_month(&mut self, month: u32) -> PortalResult<()> {
        if !self.profile.role.can_edit_cycle() {
            return Err(PortalError::PermissionDenied {
                role: self.profile.role,
                action: "edit the cycle start month",
            });
        }
        if month >= 12 {
            return Err(PortalError::InvalidMonth(month));
        }
        self.cycle_start_month = month;
        Ok(())
    }
}

/// Outcome of a mastery-gained event
#[derive(Debug, Clone, Serialize)]
pub struct MasteryGain {
    pub category: String,
    pub level: u64,
    pub display_percent: u64,
    pub total_earnings: f64,
    pub unlocked: Vec<Achievement>,
}

/// Shared handle over a session
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionState>>,
    rates: RewardRates,
    progress: ProgressConfig,
    clock: Arc<dyn Clock>,
}

impl SessionHandle {
    pub fn new(
        state: SessionState,
        rates: RewardRates,
        progress: ProgressConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
            rates,
            progress,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn evaluate_locked(&self, state: &mut SessionState) -> Vec<Achievement> {
        let facts = state.facts();
        let unlocked = state.achievements.evaluate(
            &facts,
            self.progress.earnings_milestone,
            self.clock.now(),
        );
        for achievement in &unlocked {
            info!(
                username = %state.profile.username,
                achievement = %achievement,
                name = achievement.name(),
                "Achievement unlocked"
            );
        }
        unlocked
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn rates(&self) -> &RewardRates {
        &self.rates
    }

    pub fn evaluate_achievements(&self) -> Vec<Achievement> {
        let mut state = self.lock();
        self.evaluate_locked(&mut state)
    }

    pub fn gain_mastery(&self, category: &str) -> PortalResult<MasteryGain> {
        let mut state = self.lock();
        let count = state.gain_mastery(category, &self.progress)?;
        info!(
            category,
            count,
            balance = state.wallet.total_earnings,
            "Mastery gained"
        );
        let unlocked = self.evaluate_locked(&mut state);

        Ok(MasteryGain {
            category: category.to_string(),
            level: progress::mastery_level(count),
            display_percent: progress::display_percent(count),
            total_earnings: state.wallet.total_earnings,
            unlocked,
        })
    }

    /// Count a generative insight delivered to the user
    pub fn record_insight(&self) -> Vec<Achievement> {
        let mut state = self.lock();
        state.insight_count += 1;
        self.evaluate_locked(&mut state)
    }

    pub fn contribute(&self, item: MediaItem) -> PortalResult<Vec<Achievement>> {
        let mut state = self.lock();
        state.rewards.contribute(item)?;
        Ok(self.evaluate_locked(&mut state))
    }

    pub fn claim(&self, item_id: &str, amount: f64) -> PortalResult<ClaimOutcome> {
        let mut state = self.lock();
        let SessionState {
            rewards, wallet, ..
        } = &mut *state;
        let outcome = rewards.claim(item_id, amount, wallet)?;
        self.evaluate_locked(&mut state);
        Ok(outcome)
    }

    pub fn claim_all(&self) -> PortalResult<f64> {
        let mut state = self.lock();
        let SessionState {
            rewards, wallet, ..
        } = &mut *state;
        let credited = rewards.claim_all(&self.rates, wallet)?;
        self.evaluate_locked(&mut state);
        Ok(credited)
    }

    pub fn unclaimed_rewards_total(&self) -> f64 {
        self.lock().rewards.unclaimed_total(&self.rates)
    }

    pub fn reward_entries(&self) -> Vec<RewardEntry> {
        self.lock().rewards.entries(&self.rates)
    }

    pub fn set_cycle_start_month(&self, month: u32) -> PortalResult<()> {
        let mut state = self.lock();
        if let Err(e) = state.set_cycle_start_month(month) {
            warn!(username = %state.profile.username, month, error = %e, "Cycle start month change refused");
            return Err(e);
        }
        info!(month, "Cycle start month updated");
        Ok(())
    }

    pub fn withdraw(&self, amount: f64) -> PortalResult<f64> {
        let mut state = self.lock();
        state.wallet.debit(amount)?;
        info!(amount, balance = state.wallet.total_earnings, "Withdrawal accepted");
        Ok(state.wallet.total_earnings)
    }

    pub fn donate(&self, amount: f64) -> PortalResult<f64> {
        let mut state = self.lock();
        state.wallet.debit(amount)?;
        info!(amount, balance = state.wallet.total_earnings, "Donation from balance");
        Ok(state.wallet.total_earnings)
    }
}
