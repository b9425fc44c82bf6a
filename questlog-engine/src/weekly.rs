//! Weekly commitments: a pre-selected bundle of habits and tasks with a
//! derived XP target for the running week.
//!
//! Commitments never carry across week boundaries. A stored commitment
//! whose anchor Monday no longer matches the clock is discarded and
//! replaced with an empty one on the next read.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DAYS_PER_WEEK, KEY_WEEKLY, SOURCE_WEEKLY_GOAL, XP_HABIT_COMPLETION, XP_TASK_COMPLETION,
    XP_WEEKLY_GOAL_BONUS,
};
use crate::progress::week_start_for;
use crate::reminders::ReminderScheduler;
use crate::{Clock, EngineError, KeyValueStore, XpEngine};

/// Lightweight snapshot of a committed habit or task.
///
/// Snapshots are independent of later edits to the underlying record; a
/// renamed or deleted habit does not invalidate the week's plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentEntry {
    pub id: String,
    pub name: String,
}

impl CommitmentEntry {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One week's commitment, keyed by its anchor Monday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyCommitment {
    /// Monday anchoring the week this commitment belongs to.
    pub week_start: NaiveDate,
    /// Derived XP target, fixed when the commitment is set.
    pub target_xp: i64,
    pub habits: Vec<CommitmentEntry>,
    pub tasks: Vec<CommitmentEntry>,
    /// Flips true exactly once, when the weekly XP first reaches the
    /// target. Sole guard against double-awarding the bonus.
    pub completed: bool,
}

impl WeeklyCommitment {
    /// Empty commitment for the week anchored at `week_start`.
    #[must_use]
    pub const fn empty(week_start: NaiveDate) -> Self {
        Self {
            week_start,
            target_xp: 0,
            habits: Vec::new(),
            tasks: Vec::new(),
            completed: false,
        }
    }
}

/// Derived XP target for a selection: each daily habit counts once per
/// day of the week, each task once.
#[must_use]
pub fn commitment_target(habits: &[CommitmentEntry], tasks: &[CommitmentEntry]) -> i64 {
    let habit_xp = habits.len() as i64 * XP_HABIT_COMPLETION * DAYS_PER_WEEK;
    let task_xp = tasks.len() as i64 * XP_TASK_COMPLETION;
    habit_xp + task_xp
}

impl<S, C> XpEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// The commitment for the running week.
    ///
    /// A stored commitment from a previous week is discarded; a fresh
    /// empty commitment is persisted and returned in its place.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the store cannot be read or
    /// the replacement commitment cannot be persisted.
    pub fn current_commitment(&self) -> Result<WeeklyCommitment, EngineError> {
        let week = week_start_for(self.clock.today());
        if let Some(stored) = self.read_json::<WeeklyCommitment>(KEY_WEEKLY)? {
            if stored.week_start == week {
                return Ok(stored);
            }
            log::debug!("discarding weekly commitment anchored at {}", stored.week_start);
        }
        let fresh = WeeklyCommitment::empty(week);
        self.write_json(KEY_WEEKLY, &fresh)?;
        Ok(fresh)
    }

    /// Replace the running week's commitment with the given selection and
    /// ask the reminder collaborator for the weekly nudge.
    ///
    /// Any prior commitment for the week is overwritten unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the commitment cannot be
    /// persisted.
    pub fn set_commitment<R>(
        &self,
        habits: Vec<CommitmentEntry>,
        tasks: Vec<CommitmentEntry>,
        reminders: &mut R,
    ) -> Result<WeeklyCommitment, EngineError>
    where
        R: ReminderScheduler,
    {
        let commitment = WeeklyCommitment {
            week_start: week_start_for(self.clock.today()),
            target_xp: commitment_target(&habits, &tasks),
            habits,
            tasks,
            completed: false,
        };
        self.write_json(KEY_WEEKLY, &commitment)?;
        reminders.schedule_weekly_goal_reminder();
        Ok(commitment)
    }

    /// One-shot completion check for the running week's commitment.
    ///
    /// When the commitment is open, has a positive target, and the weekly
    /// XP accrued in the current window has reached it: mark it completed,
    /// award the bonus, and return `true`. Otherwise return `false` with
    /// no mutation. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when state cannot be read or the
    /// updated commitment/progress cannot be persisted.
    pub fn check_weekly_completion(&self) -> Result<bool, EngineError> {
        let mut commitment = self.current_commitment()?;
        if commitment.completed || commitment.target_xp <= 0 {
            return Ok(false);
        }

        let progress = self.progress()?;
        // Weekly XP still anchored to a previous week has not rolled over
        // yet and counts as zero here.
        let weekly_xp = if progress.week_start == commitment.week_start {
            progress.weekly_xp
        } else {
            0
        };
        if weekly_xp < commitment.target_xp {
            return Ok(false);
        }

        commitment.completed = true;
        self.write_json(KEY_WEEKLY, &commitment)?;
        self.award_xp(XP_WEEKLY_GOAL_BONUS, SOURCE_WEEKLY_GOAL)?;
        log::info!(
            "weekly commitment for {} completed at {} xp",
            commitment.week_start,
            weekly_xp
        );
        Ok(true)
    }
}
