//! Questlog Engine
//!
//! Platform-agnostic progression logic for the Questlog productivity app.
//! This crate provides the XP, leveling, streak, and weekly-commitment
//! mechanics without UI or platform-specific dependencies.

pub mod clock;
pub mod constants;
pub mod goals;
pub mod habits;
pub mod penalties;
pub mod profile;
pub mod progress;
pub mod reminders;
pub mod storage;
pub mod tasks;
pub mod weekly;
pub mod xp;

// Re-export commonly used types
pub use clock::{ManualClock, SystemClock};
pub use constants::{
    STREAK_BONUS_INTERVAL, XP_HABIT_COMPLETION, XP_STREAK_BONUS, XP_TASK_COMPLETION,
    XP_WEEKLY_GOAL_BONUS,
};
pub use goals::{Goal, NewGoal};
pub use habits::{Frequency, Habit, HabitToggle, NewHabit};
pub use penalties::{NewPenalty, Penalty};
pub use profile::Profile;
pub use progress::{
    LevelProgress, ProgressState, calculate_level, level_ceiling_xp, level_floor_xp,
    week_start_for,
};
pub use reminders::{NullReminders, ReminderScheduler};
pub use storage::MemoryStore;
pub use tasks::{NewTask, Task, TaskToggle};
pub use weekly::{CommitmentEntry, WeeklyCommitment, commitment_target};
pub use xp::AwardOutcome;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Trait for the string-keyed store that persists all engine state.
/// Platform-specific implementations should provide this.
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the raw value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Remove the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// Trait for the device-local wall clock.
///
/// All date-window logic (daily and weekly rollover, completion stamps)
/// reads time through this seam so hosts and tests control it.
pub trait Clock {
    /// The current calendar date, device-local.
    fn today(&self) -> chrono::NaiveDate;

    /// The current timestamp, device-local.
    fn now(&self) -> chrono::NaiveDateTime;
}

/// Errors surfaced by engine operations.
///
/// Absent or malformed stored state is not an error; it is replaced with
/// defaults on the next read (see [`XpEngine::progress`]). A store that
/// refuses a read or write outright is.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The backing store refused a read or write.
    #[error("storage operation failed")]
    Storage(#[source] anyhow::Error),
    /// A record id did not resolve to a stored record.
    #[error("unknown {kind} id: {id}")]
    UnknownRecord { kind: &'static str, id: String },
}

/// Main engine facade owning the store and clock handles.
///
/// Every operation is a synchronous read-modify-write against the store
/// with no internal suspension point, so a single-threaded host gets one
/// atomic step per UI action.
pub struct XpEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    store: S,
    clock: C,
}

impl<S, C> XpEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// Create a new engine with the provided store and clock.
    pub const fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Decode the JSON payload under `key`.
    ///
    /// A missing key reads as `None`. A payload that fails to parse also
    /// reads as `None` after a warning; the caller replaces it with
    /// defaults on the next write. A store that cannot be read at all is
    /// surfaced, never papered over with fabricated state.
    pub(crate) fn read_json<T>(&self, key: &str) -> Result<Option<T>, EngineError>
    where
        T: DeserializeOwned,
    {
        let raw = self
            .store
            .get(key)
            .map_err(|e| EngineError::Storage(anyhow::Error::new(e)))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                log::warn!("discarding malformed state under {key}: {err}");
                Ok(None)
            }
        }
    }

    /// Encode `value` as JSON and persist it under `key`.
    pub(crate) fn write_json<T>(&self, key: &str, value: &T) -> Result<(), EngineError>
    where
        T: Serialize,
    {
        let raw = serde_json::to_string(value)
            .map_err(|e| EngineError::Storage(anyhow::Error::new(e)))?;
        self.store
            .set(key, &raw)
            .map_err(|e| EngineError::Storage(anyhow::Error::new(e)))
    }

    pub(crate) fn remove_key(&self, key: &str) -> Result<(), EngineError> {
        self.store
            .remove(key)
            .map_err(|e| EngineError::Storage(anyhow::Error::new(e)))
    }

    /// Fresh record id: millisecond timestamp, bumped past collisions.
    pub(crate) fn generate_id<'a>(&self, existing: impl Iterator<Item = &'a str>) -> String {
        let taken: std::collections::HashSet<&str> = existing.collect();
        let mut candidate = self.clock.now().and_utc().timestamp_millis();
        loop {
            let id = candidate.to_string();
            if !taken.contains(id.as_str()) {
                return id;
            }
            candidate += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Debug, thiserror::Error)]
    #[error("store offline")]
    struct StoreDown;

    /// Store double whose reads and writes can be failed independently.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl KeyValueStore for FlakyStore {
        type Error = StoreDown;

        fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
            if self.fail_reads {
                return Err(StoreDown);
            }
            Ok(self.inner.raw(key))
        }

        fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
            if self.fail_writes {
                return Err(StoreDown);
            }
            self.inner.seed(key, value);
            Ok(())
        }

        fn remove(&self, _key: &str) -> Result<(), Self::Error> {
            if self.fail_writes {
                return Err(StoreDown);
            }
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn unreadable_store_surfaces_storage_error() {
        let store = FlakyStore {
            fail_reads: true,
            ..FlakyStore::default()
        };
        let engine = XpEngine::new(store, ManualClock::at(date(2024, 1, 1)));
        let err = engine.progress().expect_err("read failure must surface");
        assert!(matches!(err, EngineError::Storage(_)));
    }

    #[test]
    fn unwritable_store_surfaces_storage_error() {
        let store = FlakyStore {
            fail_writes: true,
            ..FlakyStore::default()
        };
        let engine = XpEngine::new(store, ManualClock::at(date(2024, 1, 1)));
        let err = engine
            .award_xp(10, "habit_completion")
            .expect_err("write failure must surface");
        assert!(matches!(err, EngineError::Storage(_)));
    }

    #[test]
    fn generated_ids_step_past_collisions() {
        let clock = ManualClock::at(date(2024, 3, 4));
        let engine = XpEngine::new(MemoryStore::new(), clock.clone());
        let first = engine.generate_id(std::iter::empty());
        let second = engine.generate_id(std::iter::once(first.as_str()));
        assert_ne!(first, second);
        let first_ms: i64 = first.parse().expect("numeric id");
        let second_ms: i64 = second.parse().expect("numeric id");
        assert_eq!(second_ms, first_ms + 1);
    }
}
