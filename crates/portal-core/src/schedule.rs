//! Release scheduling for recurring series.
//!
//! Answers two questions against a reference "today": whether a series drops
//! an episode on a given weekday, and where the current month sits within the
//! fixed three-month rotation that starts at the cycle start month.

use crate::clock::Clock;
use crate::error::{PortalError, PortalResult};
use crate::models::{ReleasePattern, Series};
use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Length of one release rotation in months
pub const CYCLE_LENGTH_MONTHS: u32 = 3;

/// Upper bound on "next episode" placeholders shown per series
pub const MAX_PLACEHOLDERS: u32 = 4;

const MWF: &[Weekday] = &[Weekday::Mon, Weekday::Wed, Weekday::Fri];
const TTS: &[Weekday] = &[Weekday::Tue, Weekday::Thu, Weekday::Sat];
const MT: &[Weekday] = &[Weekday::Mon, Weekday::Thu];
const TF: &[Weekday] = &[Weekday::Tue, Weekday::Fri];
const WS: &[Weekday] = &[Weekday::Wed, Weekday::Sat];
const SUNDAY: &[Weekday] = &[Weekday::Sun];

/// Built-in weekday set for a pattern; `DAILY` and unknown patterns have none
pub fn default_weekdays(pattern: ReleasePattern) -> &'static [Weekday] {
    match pattern {
        ReleasePattern::Mwf => MWF,
        ReleasePattern::Tts => TTS,
        ReleasePattern::Mt => MT,
        ReleasePattern::Tf => TF,
        ReleasePattern::Ws => WS,
        ReleasePattern::Sunday => SUNDAY,
        ReleasePattern::Daily | ReleasePattern::Unknown => &[],
    }
}

fn matches_pattern(pattern: ReleasePattern, days: &[Weekday], weekday: Weekday) -> bool {
    match pattern {
        ReleasePattern::Daily => true,
        ReleasePattern::Unknown => false,
        _ => days.contains(&weekday),
    }
}

/// Decide whether `weekday` is a drop day for `pattern`.
///
/// `high_frequency_override` forces daily behaviour for long-form content.
pub fn is_release_day(
    pattern: ReleasePattern,
    high_frequency_override: bool,
    weekday: Weekday,
) -> bool {
    high_frequency_override || matches_pattern(pattern, default_weekdays(pattern), weekday)
}

/// Convert a 0 (Sunday) to 6 (Saturday) weekday index
pub fn weekday_from_index(index: u32) -> PortalResult<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        _ => Err(PortalError::InvalidWeekday(index)),
    }
}

/// Position within the three-month rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CyclePhase {
    /// 1-indexed phase, always 1..=3
    pub phase: u32,
    /// `phase / 3 * 100`; the first month already counts as a third complete
    pub percent: f64,
}

fn check_month(month: u32) -> PortalResult<u32> {
    if month < 12 {
        Ok(month)
    } else {
        Err(PortalError::InvalidMonth(month))
    }
}

/// Phase of `current_month` in the rotation anchored at `cycle_start_month`.
///
/// Both months are 0-indexed (January = 0) and the rotation wraps across the
/// year boundary.
pub fn compute_cycle_phase(cycle_start_month: u32, current_month: u32) -> PortalResult<CyclePhase> {
    let start = check_month(cycle_start_month)?;
    let current = check_month(current_month)?;

    let months_since_start = (current + 12 - start) % 12;
    let phase = months_since_start % CYCLE_LENGTH_MONTHS + 1;

    Ok(CyclePhase {
        phase,
        percent: phase as f64 / CYCLE_LENGTH_MONTHS as f64 * 100.0,
    })
}

/// Number of "next episode" placeholders to show for a series
pub fn placeholder_count(episodes_per_period: u32, released: u32) -> u32 {
    episodes_per_period.saturating_sub(released).min(MAX_PLACEHOLDERS)
}

/// Released share of the period target, rounded to a whole percent
pub fn period_completion_percent(released: u32, episodes_per_period: u32) -> u32 {
    if episodes_per_period == 0 {
        return 0;
    }
    (released as f64 / episodes_per_period as f64 * 100.0).round() as u32
}

/// Weekday sets per release pattern
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PatternTable {
    pub mwf: Vec<Weekday>,
    pub tts: Vec<Weekday>,
    pub mt: Vec<Weekday>,
    pub tf: Vec<Weekday>,
    pub ws: Vec<Weekday>,
    pub sunday: Vec<Weekday>,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self {
            mwf: MWF.to_vec(),
            tts: TTS.to_vec(),
            mt: MT.to_vec(),
            tf: TF.to_vec(),
            ws: WS.to_vec(),
            sunday: SUNDAY.to_vec(),
        }
    }
}

impl PatternTable {
    pub fn weekdays(&self, pattern: ReleasePattern) -> &[Weekday] {
        match pattern {
            ReleasePattern::Mwf => &self.mwf,
            ReleasePattern::Tts => &self.tts,
            ReleasePattern::Mt => &self.mt,
            ReleasePattern::Tf => &self.tf,
            ReleasePattern::Ws => &self.ws,
            ReleasePattern::Sunday => &self.sunday,
            ReleasePattern::Daily | ReleasePattern::Unknown => &[],
        }
    }
}

/// Per-series view of today's schedule
#[derive(Debug, Clone, Serialize)]
pub struct SeriesSchedule {
    pub series_id: String,
    pub title: String,
    pub label: String,
    pub drops_today: bool,
    pub released: u32,
    pub episodes_per_period: u32,
    pub completion_percent: u32,
    pub placeholders: u32,
}

/// Scheduler bound to a weekday table and a clock
#[derive(Clone)]
pub struct ReleaseScheduler {
    table: PatternTable,
    clock: Arc<dyn Clock>,
}

impl ReleaseScheduler {
    pub fn new(table: PatternTable, clock: Arc<dyn Clock>) -> Self {
        Self { table, clock }
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// Drop-day check for a series on an explicit weekday
    pub fn is_release_day_for(&self, series: &Series, weekday: Weekday) -> bool {
        series.releases_daily()
            || matches_pattern(series.pattern, self.table.weekdays(series.pattern), weekday)
    }

    /// Drop-day check against the clock; "today" is read fresh on every call
    pub fn is_release_day_today(&self, series: &Series) -> bool {
        let weekday = self.clock.today().weekday();
        let drops = self.is_release_day_for(series, weekday);
        debug!(
            series_id = %series.id,
            pattern = %series.pattern,
            weekday = %weekday,
            drops,
            "Evaluated release day"
        );
        drops
    }

    /// Series that drop an episode today
    pub fn drops_today<'a>(&self, series: &'a [Series]) -> Vec<&'a Series> {
        let weekday = self.clock.today().weekday();
        series
            .iter()
            .filter(|s| self.is_release_day_for(s, weekday))
            .collect()
    }

    /// Human-readable schedule, e.g. "Mon / Wed / Fri"
    pub fn schedule_label(&self, series: &Series) -> String {
        if series.releases_daily() {
            return "Daily".to_string();
        }
        match series.pattern {
            ReleasePattern::Daily => "Daily".to_string(),
            ReleasePattern::Unknown => "Unscheduled".to_string(),
            pattern => self
                .table
                .weekdays(pattern)
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(" / "),
        }
    }

    /// Cycle phase for the clock's current month
    pub fn current_cycle_phase(&self, cycle_start_month: u32) -> PortalResult<CyclePhase> {
        compute_cycle_phase(cycle_start_month, self.clock.today().month0())
    }

    /// Full schedule row for a series given its released episode count
    pub fn describe(&self, series: &Series, released: u32) -> SeriesSchedule {
        SeriesSchedule {
            series_id: series.id.clone(),
            title: series.title.clone(),
            label: self.schedule_label(series),
            drops_today: self.is_release_day_today(series),
            released,
            episodes_per_period: series.episodes_per_period,
            completion_percent: period_completion_percent(released, series.episodes_per_period),
            placeholders: placeholder_count(series.episodes_per_period, released),
        }
    }
}
