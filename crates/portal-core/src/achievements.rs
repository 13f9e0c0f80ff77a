//! Achievement definitions and unlock bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The closed set of achievements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Achievement {
    #[serde(rename = "mastery_1")]
    MasterySeeker,
    #[serde(rename = "earner_1")]
    DeepScholar,
    #[serde(rename = "contributor_1")]
    TruthBearer,
}

pub const ALL_ACHIEVEMENTS: [Achievement; 3] = [
    Achievement::MasterySeeker,
    Achievement::DeepScholar,
    Achievement::TruthBearer,
];

/// Session facts the predicates are evaluated over
#[derive(Debug, Clone, Copy, Default)]
pub struct AchievementFacts {
    pub insight_count: u32,
    pub total_earnings: f64,
    pub has_human_made_contribution: bool,
}

impl Achievement {
    pub fn id(self) -> &'static str {
        match self {
            Achievement::MasterySeeker => "mastery_1",
            Achievement::DeepScholar => "earner_1",
            Achievement::TruthBearer => "contributor_1",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Achievement::MasterySeeker => "Mastery Seeker",
            Achievement::DeepScholar => "Deep Scholar",
            Achievement::TruthBearer => "Truth Bearer",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Achievement::MasterySeeker => "Consult pedagogy expert for the first time.",
            Achievement::DeepScholar => "Earn your first milestone in sessions.",
            Achievement::TruthBearer => "Contribute human-verified media.",
        }
    }

    pub fn is_satisfied(self, facts: &AchievementFacts, earnings_milestone: f64) -> bool {
        match self {
            Achievement::MasterySeeker => facts.insight_count >= 1,
            Achievement::DeepScholar => facts.total_earnings >= earnings_milestone,
            Achievement::TruthBearer => facts.has_human_made_contribution,
        }
    }
}

impl std::fmt::Display for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Unlocked achievements with their first unlock time. Never shrinks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementBook {
    unlocked: BTreeMap<Achievement, DateTime<Utc>>,
}

impl AchievementBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked.contains_key(&achievement)
    }

    pub fn unlocked_at(&self, achievement: Achievement) -> Option<DateTime<Utc>> {
        self.unlocked.get(&achievement).copied()
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Achievement, DateTime<Utc>)> + '_ {
        self.unlocked.iter().map(|(a, t)| (*a, *t))
    }

    /// Unlock every satisfied achievement not yet held; returns only the new ones
    pub fn evaluate(
        &mut self,
        facts: &AchievementFacts,
        earnings_milestone: f64,
        now: DateTime<Utc>,
    ) -> Vec<Achievement> {
        let mut newly_unlocked = Vec::new();
        for achievement in ALL_ACHIEVEMENTS {
            if self.is_unlocked(achievement) || !achievement.is_satisfied(facts, earnings_milestone) {
                continue;
            }
            self.unlocked.insert(achievement, now);
            newly_unlocked.push(achievement);
        }
        newly_unlocked
    }
}
