//! XP totals, the level curve, and date-window rollover.
//!
//! The level is always derived from the cumulative total; it is never
//! stored independently of it. Daily and weekly counters are windowed:
//! they reset when the stored window no longer matches the clock.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::LEVEL_XP_SCALE;

/// Persisted XP state, one record per installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub total_xp: i64,
    pub daily_xp: i64,
    pub weekly_xp: i64,
    pub level: u32,
    /// Date of the last counter mutation.
    pub last_update: NaiveDate,
    /// Monday anchoring the current weekly window.
    pub week_start: NaiveDate,
}

impl ProgressState {
    /// Fresh state anchored to the given day.
    #[must_use]
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            total_xp: 0,
            daily_xp: 0,
            weekly_xp: 0,
            level: 1,
            last_update: today,
            week_start: week_start_for(today),
        }
    }

    /// Reset windowed counters whose stored window no longer contains
    /// `today`. Totals and level are untouched.
    pub fn roll_windows(&mut self, today: NaiveDate) {
        if self.last_update != today {
            log::debug!("daily window rolled over: {} -> {today}", self.last_update);
            self.daily_xp = 0;
            self.last_update = today;
        }
        let current_week = week_start_for(today);
        if self.week_start != current_week {
            log::debug!("weekly window rolled over: {} -> {current_week}", self.week_start);
            self.weekly_xp = 0;
            self.week_start = current_week;
        }
    }

    /// Apply a signed point delta to all counters and rederive the level.
    ///
    /// The cumulative total clamps at zero; the windowed counters may go
    /// transiently negative when a revoke under-runs points accrued in a
    /// prior window. Returns `true` when the level increased.
    pub fn apply_points(&mut self, points: i64) -> bool {
        let previous = self.level;
        self.total_xp = self.total_xp.saturating_add(points).max(0);
        self.daily_xp = self.daily_xp.saturating_add(points);
        self.weekly_xp = self.weekly_xp.saturating_add(points);
        self.level = calculate_level(self.total_xp);
        self.level > previous
    }
}

/// Level derived from cumulative XP: `floor(sqrt(total / 100)) + 1`.
/// Negative totals count as zero.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn calculate_level(total_xp: i64) -> u32 {
    let units = total_xp.max(0) as f64 / LEVEL_XP_SCALE as f64;
    units.sqrt().floor() as u32 + 1
}

/// XP at which `level` begins: `(level - 1)^2 * 100`.
#[must_use]
pub const fn level_floor_xp(level: u32) -> i64 {
    let base = level as i64 - 1;
    base * base * LEVEL_XP_SCALE
}

/// XP required to leave `level`: `level^2 * 100`.
#[must_use]
pub const fn level_ceiling_xp(level: u32) -> i64 {
    let base = level as i64;
    base * base * LEVEL_XP_SCALE
}

/// Most recent Monday at or before `date`. Weeks run Monday through
/// Sunday, so a Sunday maps to the Monday six days earlier.
#[must_use]
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date - chrono::Days::new(back)
}

/// Display-oriented snapshot of progress toward the next level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProgress {
    pub current_level: u32,
    /// XP accrued inside the current level.
    pub progress_xp: i64,
    /// XP spanned by the current level.
    pub needed_xp: i64,
    /// Percentage of the current level cleared, capped at 100.
    pub progress_percentage: f64,
    pub total_xp: i64,
    pub daily_xp: i64,
    pub weekly_xp: i64,
}

impl LevelProgress {
    /// Derive the view for a stored state.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn for_state(state: &ProgressState) -> Self {
        let floor = level_floor_xp(state.level);
        let ceiling = level_ceiling_xp(state.level);
        let progress_xp = state.total_xp - floor;
        // (2 * level - 1) * 100, always positive for level >= 1
        let needed_xp = ceiling - floor;
        let progress_percentage = (progress_xp as f64 / needed_xp as f64 * 100.0).min(100.0);
        Self {
            current_level: state.level,
            progress_xp,
            needed_xp,
            progress_percentage,
            total_xp: state.total_xp,
            daily_xp: state.daily_xp,
            weekly_xp: state.weekly_xp,
        }
    }
}
