//! Contributor payouts and the claimed/unclaimed partition.
//!
//! Each contributed item is claimable until an explicit claim moves it into
//! the claimed set. Claims never reverse, and claiming twice is a no-op.

use crate::error::{PortalError, PortalResult};
use crate::models::{MediaItem, MediaType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Unit rates applied to contributed media
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RewardRates {
    /// Currency per length unit of document-like media
    pub page_rate: f64,
    /// Currency per minute of video and podcast media
    pub minute_rate: f64,
}

impl Default for RewardRates {
    fn default() -> Self {
        Self {
            page_rate: 10.0,
            minute_rate: 10.0,
        }
    }
}

/// Payout for a contributed item. Unmodeled types pay nothing.
pub fn compute_payout(item: &MediaItem, rates: &RewardRates) -> f64 {
    let rate = match item.media_type {
        MediaType::Ebook | MediaType::Magazine | MediaType::Tabloid | MediaType::Paper => {
            rates.page_rate
        }
        MediaType::Video | MediaType::Podcast => rates.minute_rate,
        MediaType::Audiobook | MediaType::Film | MediaType::Series | MediaType::Unknown => {
            return 0.0
        }
    };
    item.duration as f64 * rate
}

pub(crate) fn check_amount(amount: f64) -> PortalResult<f64> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(PortalError::InvalidAmount(amount))
    }
}

/// User balance
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub total_earnings: f64,
    /// Portion of `total_earnings` that came from contribution payouts
    pub contributor_earnings: f64,
}

impl Wallet {
    pub fn credit(&mut self, amount: f64) -> PortalResult<()> {
        self.total_earnings += check_amount(amount)?;
        Ok(())
    }

    pub fn credit_contribution(&mut self, amount: f64) -> PortalResult<()> {
        let amount = check_amount(amount)?;
        self.total_earnings += amount;
        self.contributor_earnings += amount;
        Ok(())
    }

    /// Remove a strictly positive amount that the balance covers
    pub fn debit(&mut self, amount: f64) -> PortalResult<()> {
        let amount = check_amount(amount)?;
        if amount == 0.0 {
            return Err(PortalError::InvalidAmount(amount));
        }
        if amount > self.total_earnings {
            return Err(PortalError::InsufficientBalance {
                requested: amount,
                available: self.total_earnings,
            });
        }
        self.total_earnings -= amount;
        Ok(())
    }
}

/// Result of a single claim attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Claimed { amount: f64 },
    AlreadyClaimed,
}

/// Ledger row for a contributed item
#[derive(Debug, Clone, Serialize)]
pub struct RewardEntry {
    pub item_id: String,
    pub title: String,
    pub media_type: MediaType,
    pub duration: u32,
    pub unit: &'static str,
    pub payout: f64,
    pub claimed: bool,
}

/// Contributed items and the ids whose payout has been credited
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewardLedger {
    contributions: Vec<MediaItem>,
    claimed: BTreeSet<String>,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contributed item; ids must be unique
    pub fn contribute(&mut self, item: MediaItem) -> PortalResult<()> {
        if self.is_contributed(&item.id) {
            return Err(PortalError::DuplicateItem(item.id));
        }
        debug!(item_id = %item.id, media_type = %item.media_type, "Recorded contribution");
        self.contributions.push(item);
        Ok(())
    }

    pub fn contributions(&self) -> &[MediaItem] {
        &self.contributions
    }

    pub fn is_claimed(&self, item_id: &str) -> bool {
        self.claimed.contains(item_id)
    }

    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_contributed(&self, item_id: &str) -> bool {
        self.contributions.iter().any(|c| c.id == item_id)
    }

    /// Credit `amount` for a contributed `item_id` unless it was already claimed
    pub fn claim(&mut self, item_id: &str, amount: f64, wallet: &mut Wallet) -> PortalResult<ClaimOutcome> {
        let amount = check_amount(amount)?;
        if !self.is_contributed(item_id) {
            return Err(PortalError::UnknownContribution(item_id.to_string()));
        }
        if self.is_claimed(item_id) {
            debug!(item_id, "Claim ignored, already claimed");
            return Ok(ClaimOutcome::AlreadyClaimed);
        }

        wallet.credit_contribution(amount)?;
        self.claimed.insert(item_id.to_string());

        info!(item_id, amount, balance = wallet.total_earnings, "Reward claimed");
        Ok(ClaimOutcome::Claimed { amount })
    }

    fn unclaimed(&self, rates: &RewardRates) -> Vec<(String, f64)> {
        self.contributions
            .iter()
            .filter(|item| !self.is_claimed(&item.id))
            .map(|item| (item.id.clone(), compute_payout(item, rates)))
            .collect()
    }

    /// Sum of payouts not yet claimed
    pub fn unclaimed_total(&self, rates: &RewardRates) -> f64 {
        // An empty f64 sum is -0.0
        self.unclaimed(rates)
            .iter()
            .fold(0.0, |total, (_, amount)| total + *amount)
    }

    /// Claim every unclaimed contribution in turn; returns the credited total
    pub fn claim_all(&mut self, rates: &RewardRates, wallet: &mut Wallet) -> PortalResult<f64> {
        let mut credited = 0.0;
        for (item_id, amount) in self.unclaimed(rates) {
            if let ClaimOutcome::Claimed { amount } = self.claim(&item_id, amount, wallet)? {
                credited += amount;
            }
        }

        info!(credited, "Claimed all outstanding rewards");
        Ok(credited)
    }

    pub fn entries(&self, rates: &RewardRates) -> Vec<RewardEntry> {
        self.contributions
            .iter()
            .map(|item| RewardEntry {
                item_id: item.id.clone(),
                title: item.title.clone(),
                media_type: item.media_type,
                duration: item.duration,
                unit: item.media_type.duration_unit(),
                payout: compute_payout(item, rates),
                claimed: self.is_claimed(&item.id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgeRating;

    fn item(id: &str, media_type: MediaType, duration: u32) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            title: format!("Item {}", id),
            author: "Darewast Press".to_string(),
            media_type,
            duration,
            category: "Mathematics".to_string(),
            topic: "Calculus".to_string(),
            theme: String::new(),
            genre: String::new(),
            description: String::new(),
            age_rating: AgeRating::Thirteen,
            is_human_made: true,
            series_id: None,
            episode_number: None,
            release_frequency: None,
        }
    }

    #[test]
    fn test_payout_scenarios() {
        let rates = RewardRates {
            page_rate: 10.0,
            minute_rate: 10.0,
        };
        assert_eq!(compute_payout(&item("v", MediaType::Video, 30), &rates), 300.0);
        assert_eq!(compute_payout(&item("e", MediaType::Ebook, 60), &rates), 600.0);
        assert_eq!(compute_payout(&item("f", MediaType::Film, 90), &rates), 0.0);
        assert_eq!(compute_payout(&item("a", MediaType::Audiobook, 90), &rates), 0.0);
        assert_eq!(compute_payout(&item("u", MediaType::Unknown, 90), &rates), 0.0);
    }

    #[test]
    fn test_rates_are_independent() {
        let rates = RewardRates {
            page_rate: 2.0,
            minute_rate: 7.5,
        };
        assert_eq!(compute_payout(&item("p", MediaType::Paper, 10), &rates), 20.0);
        assert_eq!(compute_payout(&item("t", MediaType::Tabloid, 10), &rates), 20.0);
        assert_eq!(compute_payout(&item("m", MediaType::Magazine, 10), &rates), 20.0);
        assert_eq!(compute_payout(&item("c", MediaType::Podcast, 10), &rates), 75.0);
    }

    #[test]
    fn test_double_claim_credits_once() -> PortalResult<()> {
        let mut ledger = RewardLedger::new();
        let mut wallet = Wallet::default();
        ledger.contribute(item("a", MediaType::Video, 10))?;

        assert_eq!(
            ledger.claim("a", 100.0, &mut wallet)?,
            ClaimOutcome::Claimed { amount: 100.0 }
        );
        assert_eq!(ledger.claim("a", 100.0, &mut wallet)?, ClaimOutcome::AlreadyClaimed);

        assert_eq!(wallet.total_earnings, 100.0);
        assert_eq!(wallet.contributor_earnings, 100.0);
        Ok(())
    }

    #[test]
    fn test_claim_rejects_invalid_amounts() {
        let mut ledger = RewardLedger::new();
        let mut wallet = Wallet::default();
        ledger.contribute(item("a", MediaType::Video, 10)).unwrap();

        assert_eq!(
            ledger.claim("a", -1.0, &mut wallet),
            Err(PortalError::InvalidAmount(-1.0))
        );
        assert!(ledger.claim("a", f64::NAN, &mut wallet).is_err());
        assert!(!ledger.is_claimed("a"));
        assert_eq!(wallet.total_earnings, 0.0);
    }

    #[test]
    fn test_claim_requires_contribution() -> PortalResult<()> {
        let mut ledger = RewardLedger::new();
        let mut wallet = Wallet::default();

        assert_eq!(
            ledger.claim("ghost", 1000.0, &mut wallet),
            Err(PortalError::UnknownContribution("ghost".to_string()))
        );
        assert!(!ledger.is_claimed("ghost"));
        assert_eq!(wallet, Wallet::default());

        ledger.contribute(item("ghost", MediaType::Paper, 3))?;
        assert_eq!(
            ledger.claim("ghost", 30.0, &mut wallet)?,
            ClaimOutcome::Claimed { amount: 30.0 }
        );
        assert_eq!(wallet.contributor_earnings, 30.0);
        Ok(())
    }

    #[test]
    fn test_unclaimed_total_is_positive_zero() -> PortalResult<()> {
        let rates = RewardRates::default();
        let mut ledger = RewardLedger::new();
        let mut wallet = Wallet::default();

        let empty = ledger.unclaimed_total(&rates);
        assert_eq!(empty, 0.0);
        assert!(empty.is_sign_positive());

        ledger.contribute(item("A", MediaType::Video, 10))?;
        ledger.claim_all(&rates, &mut wallet)?;
        let settled = ledger.unclaimed_total(&rates);
        assert_eq!(settled, 0.0);
        assert!(settled.is_sign_positive());
        Ok(())
    }

    #[test]
    fn test_claim_all_scenario() -> PortalResult<()> {
        let rates = RewardRates::default();
        let mut ledger = RewardLedger::new();
        let mut wallet = Wallet::default();

        // A pays 100, B pays 50
        ledger.contribute(item("A", MediaType::Video, 10))?;
        ledger.contribute(item("B", MediaType::Paper, 5))?;
        assert_eq!(ledger.unclaimed_total(&rates), 150.0);

        ledger.claim("A", 100.0, &mut wallet)?;
        assert_eq!(ledger.unclaimed_total(&rates), 50.0);

        let credited = ledger.claim_all(&rates, &mut wallet)?;
        assert_eq!(credited, 50.0);
        assert_eq!(ledger.claim_all(&rates, &mut wallet)?, 0.0);

        assert_eq!(wallet.total_earnings, 150.0);
        assert_eq!(ledger.unclaimed_total(&rates), 0.0);
        Ok(())
    }

    #[test]
    fn test_claim_all_matches_unclaimed_total() -> PortalResult<()> {
        let rates = RewardRates {
            page_rate: 3.3,
            minute_rate: 1.7,
        };
        let types = [
            MediaType::Video,
            MediaType::Ebook,
            MediaType::Film,
            MediaType::Podcast,
            MediaType::Tabloid,
            MediaType::Audiobook,
        ];

        for claimed_mask in 0u32..(1 << types.len()) {
            let mut ledger = RewardLedger::new();
            let mut wallet = Wallet::default();
            for (i, media_type) in types.iter().enumerate() {
                ledger.contribute(item(&i.to_string(), *media_type, 7 + i as u32 * 11))?;
            }
            for i in 0..types.len() {
                if claimed_mask & (1 << i) != 0 {
                    ledger.claim(&i.to_string(), 1.0, &mut wallet)?;
                }
            }

            let expected = ledger.unclaimed_total(&rates);
            assert_eq!(ledger.claim_all(&rates, &mut wallet)?, expected);
        }
        Ok(())
    }

    #[test]
    fn test_duplicate_contribution_rejected() {
        let mut ledger = RewardLedger::new();
        ledger.contribute(item("A", MediaType::Video, 10)).unwrap();
        assert_eq!(
            ledger.contribute(item("A", MediaType::Paper, 5)),
            Err(PortalError::DuplicateItem("A".to_string()))
        );
    }

    #[test]
    fn test_wallet_debit() {
        let mut wallet = Wallet::default();
        wallet.credit(30.0).unwrap();

        assert!(matches!(
            wallet.debit(50.0),
            Err(PortalError::InsufficientBalance { .. })
        ));
        assert_eq!(wallet.debit(0.0), Err(PortalError::InvalidAmount(0.0)));
        wallet.debit(25.0).unwrap();
        assert_eq!(wallet.total_earnings, 5.0);
    }

    #[test]
    fn test_entries_report_claim_state() -> PortalResult<()> {
        let rates = RewardRates::default();
        let mut ledger = RewardLedger::new();
        let mut wallet = Wallet::default();
        ledger.contribute(item("A", MediaType::Video, 10))?;
        ledger.contribute(item("B", MediaType::Ebook, 4))?;
        ledger.claim("B", 40.0, &mut wallet)?;

        let entries = ledger.entries(&rates);
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].claimed);
        assert_eq!(entries[0].unit, "min");
        assert!(entries[1].claimed);
        assert_eq!(entries[1].payout, 40.0);
        Ok(())
    }
}
