//! Habit records: streak tracking and day-scoped completion toggles.
//!
//! Completion is per calendar day. Toggling a habit that is already in
//! the requested state is a no-op with respect to both the record and the
//! XP engine; the guard lives here so the award path stays idempotent at
//! the caller boundary.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::constants::{
    KEY_HABITS, SOURCE_HABIT_COMPLETION, SOURCE_HABIT_REVERSAL, STREAK_BONUS_INTERVAL,
    XP_HABIT_COMPLETION, XP_STREAK_BONUS,
};
use crate::reminders::ReminderScheduler;
use crate::xp::AwardOutcome;
use crate::{Clock, EngineError, KeyValueStore, XpEngine};

/// How often a habit recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(()),
        }
    }
}

/// A recurring habit with its streak state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub frequency: Frequency,
    /// Consecutive completions. Increments on completion, decrements by
    /// one (floored at zero) when a completion is undone.
    #[serde(default)]
    pub streak: u32,
    /// Date of the most recent completion, if still standing.
    #[serde(default)]
    pub last_completed: Option<NaiveDate>,
    /// Penalty points the host may apply when the habit is missed.
    #[serde(default)]
    pub penalty_on_failure: i32,
    /// Date the most recent streak bonus was granted. Lets an undo on the
    /// same day reverse exactly what the completion awarded.
    #[serde(default)]
    pub streak_bonus_at: Option<NaiveDate>,
}

impl Habit {
    /// Whether the habit has been checked off for `day`.
    #[must_use]
    pub fn completed_on(&self, day: NaiveDate) -> bool {
        self.last_completed == Some(day)
    }
}

/// Input for creating a habit.
#[derive(Debug, Clone, Default)]
pub struct NewHabit {
    pub name: String,
    pub description: String,
    pub frequency: Frequency,
    pub penalty_on_failure: i32,
    /// Daily reminder time handed to the host scheduler, if any.
    pub reminder: Option<NaiveTime>,
}

/// Outcome of a completion toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitToggle {
    /// The habit after the toggle.
    pub habit: Habit,
    /// False when the habit was already in the requested state and
    /// nothing happened.
    pub changed: bool,
    /// True when this completion pushed the streak onto a bonus
    /// milestone; hosts use it to celebrate.
    pub streak_milestone: bool,
    /// The XP award applied, absent for no-op toggles.
    pub award: Option<AwardOutcome>,
}

impl<S, C> XpEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// All stored habits.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the store cannot be read.
    pub fn habits(&self) -> Result<Vec<Habit>, EngineError> {
        Ok(self.read_json(KEY_HABITS)?.unwrap_or_default())
    }

    /// Create a habit, scheduling its reminder when a time was given.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the record cannot be
    /// persisted.
    pub fn add_habit<R>(&self, new: NewHabit, reminders: &mut R) -> Result<Habit, EngineError>
    where
        R: ReminderScheduler,
    {
        let mut habits = self.habits()?;
        let id = self.generate_id(habits.iter().map(|h| h.id.as_str()));
        let habit = Habit {
            id,
            name: new.name,
            description: new.description,
            frequency: new.frequency,
            streak: 0,
            last_completed: None,
            penalty_on_failure: new.penalty_on_failure,
            streak_bonus_at: None,
        };
        habits.push(habit.clone());
        self.write_json(KEY_HABITS, &habits)?;
        if let Some(at) = new.reminder {
            reminders.schedule_habit_reminder(&habit, at);
        }
        Ok(habit)
    }

    /// Delete a habit and cancel its reminders.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownRecord`] when no habit has the id,
    /// [`EngineError::Storage`] when the change cannot be persisted.
    pub fn delete_habit<R>(&self, id: &str, reminders: &mut R) -> Result<(), EngineError>
    where
        R: ReminderScheduler,
    {
        let mut habits = self.habits()?;
        let before = habits.len();
        habits.retain(|h| h.id != id);
        if habits.len() == before {
            return Err(EngineError::UnknownRecord {
                kind: "habit",
                id: id.to_string(),
            });
        }
        self.write_json(KEY_HABITS, &habits)?;
        reminders.cancel_habit_reminders(id);
        Ok(())
    }

    /// Toggle today's completion for a habit.
    ///
    /// Completing increments the streak, stamps today, and awards
    /// [`XP_HABIT_COMPLETION`], folding in [`XP_STREAK_BONUS`] when the
    /// new streak lands on a multiple of [`STREAK_BONUS_INTERVAL`].
    /// Undoing a same-day completion reverses exactly what that
    /// completion awarded and steps the streak back. Toggling into the
    /// state the habit is already in changes nothing and awards nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownRecord`] when no habit has the id,
    /// [`EngineError::Storage`] when persistence fails.
    pub fn toggle_habit(&self, id: &str, completed: bool) -> Result<HabitToggle, EngineError> {
        let today = self.clock.today();
        let mut habits = self.habits()?;
        let slot = habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| EngineError::UnknownRecord {
                kind: "habit",
                id: id.to_string(),
            })?;

        if completed == slot.completed_on(today) {
            return Ok(HabitToggle {
                habit: slot.clone(),
                changed: false,
                streak_milestone: false,
                award: None,
            });
        }

        let (points, source, milestone) = if completed {
            slot.streak += 1;
            slot.last_completed = Some(today);
            let milestone = slot.streak % STREAK_BONUS_INTERVAL == 0;
            let mut points = XP_HABIT_COMPLETION;
            if milestone {
                slot.streak_bonus_at = Some(today);
                points += XP_STREAK_BONUS;
            }
            (points, SOURCE_HABIT_COMPLETION, milestone)
        } else {
            let mut points = -XP_HABIT_COMPLETION;
            if slot.streak_bonus_at == Some(today) {
                slot.streak_bonus_at = None;
                points -= XP_STREAK_BONUS;
            }
            slot.streak = slot.streak.saturating_sub(1);
            slot.last_completed = None;
            (points, SOURCE_HABIT_REVERSAL, false)
        };

        let habit = slot.clone();
        self.write_json(KEY_HABITS, &habits)?;
        let award = self.award_xp(points, source)?;
        Ok(HabitToggle {
            habit,
            changed: true,
            streak_milestone: milestone,
            award: Some(award),
        })
    }
}
