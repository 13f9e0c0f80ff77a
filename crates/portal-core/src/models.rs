//! Data models for the portal.
//!
//! This module defines the catalog records (media items and series) and the
//! closed enumerations the scheduler, ledger and reward calculator dispatch on.

use serde::{Deserialize, Serialize};

/// Nominal per-episode durations that the catalog treats as long-form,
/// daily-releasing content when a series carries no explicit cadence
pub const LONG_FORM_DURATIONS: [u32; 2] = [45, 60];

/// Kind of media item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Paper,
    Magazine,
    Tabloid,
    Ebook,
    Podcast,
    Audiobook,
    Video,
    Film,
    Series,
    /// Any catalog value this build does not model
    #[serde(other)]
    Unknown,
}

/// Coarse grouping of media types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFamily {
    /// Measured in pages or abstract length units
    Document,
    /// Measured in minutes
    Audio,
    /// Measured in minutes
    Audiovisual,
    Unclassified,
}

impl MediaType {
    pub fn family(self) -> MediaFamily {
        match self {
            MediaType::Paper | MediaType::Magazine | MediaType::Tabloid | MediaType::Ebook => {
                MediaFamily::Document
            }
            MediaType::Podcast | MediaType::Audiobook => MediaFamily::Audio,
            MediaType::Video | MediaType::Film | MediaType::Series => MediaFamily::Audiovisual,
            MediaType::Unknown => MediaFamily::Unclassified,
        }
    }

    /// Unit label for the overloaded `duration` field
    pub fn duration_unit(self) -> &'static str {
        match self.family() {
            MediaFamily::Document => "units",
            MediaFamily::Audio | MediaFamily::Audiovisual => "min",
            MediaFamily::Unclassified => "",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Paper => write!(f, "paper"),
            MediaType::Magazine => write!(f, "magazine"),
            MediaType::Tabloid => write!(f, "tabloid"),
            MediaType::Ebook => write!(f, "ebook"),
            MediaType::Podcast => write!(f, "podcast"),
            MediaType::Audiobook => write!(f, "audiobook"),
            MediaType::Video => write!(f, "video"),
            MediaType::Film => write!(f, "film"),
            MediaType::Series => write!(f, "series"),
            MediaType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Content age rating, ordered from youngest audience upwards
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeRating {
    #[serde(rename = "3+")]
    Three,
    #[serde(rename = "8+")]
    Eight,
    #[serde(rename = "13+")]
    Thirteen,
    #[serde(rename = "18+")]
    Eighteen,
}

impl std::fmt::Display for AgeRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgeRating::Three => write!(f, "3+"),
            AgeRating::Eight => write!(f, "8+"),
            AgeRating::Thirteen => write!(f, "13+"),
            AgeRating::Eighteen => write!(f, "18+"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CensorshipLevel {
    Strict,
    Medium,
    Low,
}

/// Named weekday subset governing when a series drops a new episode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReleasePattern {
    Mwf,
    Tts,
    Mt,
    Tf,
    Ws,
    Sunday,
    Daily,
    /// Unrecognised pattern; never releases
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ReleasePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleasePattern::Mwf => write!(f, "MWF"),
            ReleasePattern::Tts => write!(f, "TTS"),
            ReleasePattern::Mt => write!(f, "MT"),
            ReleasePattern::Tf => write!(f, "TF"),
            ReleasePattern::Ws => write!(f, "WS"),
            ReleasePattern::Sunday => write!(f, "SUNDAY"),
            ReleasePattern::Daily => write!(f, "DAILY"),
            ReleasePattern::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Explicit release cadence of a series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    /// Drops every day regardless of the weekday pattern
    Daily,
    /// Drops on the days named by the weekday pattern
    Periodic,
}

impl Cadence {
    /// Cadence implied by a nominal episode duration (legacy catalog rule)
    pub fn from_legacy_duration(duration: u32) -> Self {
        if LONG_FORM_DURATIONS.contains(&duration) {
            Cadence::Daily
        } else {
            Cadence::Periodic
        }
    }
}

/// Publication rhythm of standalone periodicals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseFrequency {
    Daily,
    Weekly,
    Monthly,
    Annually,
}

/// Actor role, ordered by privilege
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Consumer,
    Contributor,
    Publisher,
    Director,
}

impl Role {
    /// Only publishers and directors may move the cycle start month
    pub fn can_edit_cycle(self) -> bool {
        self >= Role::Publisher
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Consumer => write!(f, "consumer"),
            Role::Contributor => write!(f, "contributor"),
            Role::Publisher => write!(f, "publisher"),
            Role::Director => write!(f, "director"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consumer" => Ok(Role::Consumer),
            "contributor" => Ok(Role::Contributor),
            "publisher" => Ok(Role::Publisher),
            "director" => Ok(Role::Director),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s)),
        }
    }
}

/// A consumable content unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,

    #[serde(rename = "type")]
    pub media_type: MediaType,

    /// Minutes for time-based media, length units for documents
    pub duration: u32,

    // Classification tags
    pub category: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub description: String,

    pub age_rating: AgeRating,
    #[serde(default)]
    pub is_human_made: bool,

    // Series linkage
    #[serde(default)]
    pub series_id: Option<String>,
    #[serde(default)]
    pub episode_number: Option<u32>,

    #[serde(default)]
    pub release_frequency: Option<ReleaseFrequency>,
}

/// A recurring content program
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Series {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub category: String,
    #[serde(default)]
    pub description: String,

    /// Nominal per-episode duration in minutes
    pub duration: u32,

    // Schedule parameters
    pub episodes_per_period: u32,
    pub pattern: ReleasePattern,
    #[serde(default)]
    pub cadence: Option<Cadence>,
    #[serde(default)]
    pub cycle_start_month: u32,

    #[serde(default)]
    pub current_episodes: u32,
}

impl Series {
    /// Effective cadence: the explicit field when present, else the legacy
    /// duration rule
    pub fn cadence(&self) -> Cadence {
        self.cadence
            .unwrap_or_else(|| Cadence::from_legacy_duration(self.duration))
    }

    pub fn releases_daily(&self) -> bool {
        self.cadence() == Cadence::Daily
    }
}
