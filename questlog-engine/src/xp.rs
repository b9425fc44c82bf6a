//! Award and revoke operations over the persisted progress state.
//!
//! This is the single authoritative place where points are earned or
//! reversed. Callers decide *when* a point event happens (completion
//! toggles, weekly bonuses); the engine owns the arithmetic, the window
//! rollover, and the persistence cycle.

use crate::constants::KEY_PROGRESS;
use crate::progress::{LevelProgress, ProgressState};
use crate::{Clock, EngineError, KeyValueStore, XpEngine};

/// Result of an [`XpEngine::award_xp`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardOutcome {
    /// Progress state after the award was applied and persisted.
    pub progress: ProgressState,
    /// Whether this award pushed the level up. Revokes never set this,
    /// even when they pull the level down.
    pub leveled_up: bool,
    /// The signed delta that was applied.
    pub points_added: i64,
    /// Opaque label describing where the points came from.
    pub source: String,
}

impl<S, C> XpEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// Current progress state, lazily initialized and persisted on first
    /// read. Malformed stored state is replaced with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the store cannot be read, or
    /// when persisting the lazily-created default state fails.
    pub fn progress(&self) -> Result<ProgressState, EngineError> {
        if let Some(state) = self.read_json::<ProgressState>(KEY_PROGRESS)? {
            return Ok(state);
        }
        let fresh = ProgressState::fresh(self.clock.today());
        self.write_json(KEY_PROGRESS, &fresh)?;
        Ok(fresh)
    }

    /// Award (positive) or revoke (negative) points.
    ///
    /// Stale daily/weekly windows are rolled over before the delta lands,
    /// the level is rederived from the new total, and the state is
    /// persisted. Within one day/week window, `award_xp(n)` followed by
    /// `award_xp(-n)` is an exact inverse.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the state cannot be read or
    /// the updated state cannot be persisted.
    pub fn award_xp(&self, points: i64, source: &str) -> Result<AwardOutcome, EngineError> {
        let mut state = self.progress()?;
        state.roll_windows(self.clock.today());
        let leveled_up = state.apply_points(points);
        self.write_json(KEY_PROGRESS, &state)?;

        log::debug!(
            "{points:+} xp from {source}: total {}, daily {}, weekly {}",
            state.total_xp,
            state.daily_xp,
            state.weekly_xp
        );
        if leveled_up {
            log::info!("reached level {}", state.level);
        }

        Ok(AwardOutcome {
            progress: state,
            leveled_up,
            points_added: points,
            source: source.to_string(),
        })
    }

    /// Display snapshot of progress toward the next level.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the state cannot be read.
    pub fn level_progress(&self) -> Result<LevelProgress, EngineError> {
        Ok(LevelProgress::for_state(&self.progress()?))
    }

    /// Clear all progress back to defaults. Irreversible; intended for
    /// debug re-initialization.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the store cannot be written.
    pub fn reset_xp(&self) -> Result<ProgressState, EngineError> {
        self.remove_key(KEY_PROGRESS)?;
        self.progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, MemoryStore};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn engine_at(day: NaiveDate) -> (XpEngine<MemoryStore, ManualClock>, MemoryStore, ManualClock) {
        let store = MemoryStore::new();
        let clock = ManualClock::at(day);
        (XpEngine::new(store.clone(), clock.clone()), store, clock)
    }

    #[test]
    fn progress_lazily_initializes_and_persists() {
        let (engine, store, _) = engine_at(date(2024, 1, 3));
        assert!(store.raw(KEY_PROGRESS).is_none());
        let state = engine.progress().expect("progress");
        assert_eq!(state, ProgressState::fresh(date(2024, 1, 3)));
        assert!(store.raw(KEY_PROGRESS).is_some());
    }

    #[test]
    fn malformed_progress_is_replaced_with_defaults() {
        let (engine, store, _) = engine_at(date(2024, 1, 3));
        store.seed(KEY_PROGRESS, "{not json");
        let state = engine.progress().expect("progress");
        assert_eq!(state, ProgressState::fresh(date(2024, 1, 3)));
    }

    #[test]
    fn award_reports_level_up_at_threshold() {
        let (engine, _, _) = engine_at(date(2024, 1, 3));
        let first = engine.award_xp(10, "habit_completion").expect("award");
        assert_eq!(first.progress.level, 1);
        assert!(!first.leveled_up);

        let second = engine.award_xp(90, "habit_completion").expect("award");
        assert_eq!(second.progress.total_xp, 100);
        assert_eq!(second.progress.level, 2);
        assert!(second.leveled_up);
        assert_eq!(second.points_added, 90);
        assert_eq!(second.source, "habit_completion");
    }

    #[test]
    fn revoke_is_exact_inverse_within_window() {
        let (engine, _, _) = engine_at(date(2024, 1, 3));
        engine.award_xp(120, "task_completion").expect("award");
        let before = engine.progress().expect("progress");
        engine.award_xp(15, "task_completion").expect("award");
        engine.award_xp(-15, "task_reversal").expect("revoke");
        assert_eq!(engine.progress().expect("progress"), before);
    }

    #[test]
    fn day_rollover_resets_daily_counter_only() {
        let (engine, _, clock) = engine_at(date(2024, 1, 2));
        engine.award_xp(40, "habit_completion").expect("award");

        clock.set_date(date(2024, 1, 3));
        let outcome = engine.award_xp(10, "habit_completion").expect("award");
        assert_eq!(outcome.progress.daily_xp, 10);
        assert_eq!(outcome.progress.weekly_xp, 50);
        assert_eq!(outcome.progress.total_xp, 50);
        assert_eq!(outcome.progress.last_update, date(2024, 1, 3));
    }

    #[test]
    fn week_rollover_resets_weekly_counter() {
        // 2024-01-05 is a Friday; the 8th the following Monday.
        let (engine, _, clock) = engine_at(date(2024, 1, 5));
        engine.award_xp(40, "habit_completion").expect("award");

        clock.set_date(date(2024, 1, 8));
        let outcome = engine.award_xp(10, "habit_completion").expect("award");
        assert_eq!(outcome.progress.weekly_xp, 10);
        assert_eq!(outcome.progress.daily_xp, 10);
        assert_eq!(outcome.progress.total_xp, 50);
        assert_eq!(outcome.progress.week_start, date(2024, 1, 8));
    }

    #[test]
    fn reset_returns_fresh_defaults() {
        let (engine, _, _) = engine_at(date(2024, 1, 3));
        engine.award_xp(500, "task_completion").expect("award");
        let state = engine.reset_xp().expect("reset");
        assert_eq!(state, ProgressState::fresh(date(2024, 1, 3)));
        assert_eq!(engine.progress().expect("progress").total_xp, 0);
    }
}
