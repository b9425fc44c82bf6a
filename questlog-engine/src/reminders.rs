//! Reminder scheduling contract for host platforms.
//!
//! The engine never schedules notifications itself; it tells the host
//! *what* to schedule or cancel and the host owns the platform plumbing
//! (permission prompts, notification channels, delivery).

use chrono::NaiveTime;

use crate::habits::Habit;

/// Trait for the host's local-notification scheduler.
pub trait ReminderScheduler {
    /// Schedule the recurring reminder for a habit at the given
    /// device-local time of day.
    fn schedule_habit_reminder(&mut self, habit: &Habit, at: NaiveTime);

    /// Cancel every pending reminder for the habit.
    fn cancel_habit_reminders(&mut self, habit_id: &str);

    /// Schedule the end-of-week nudge for the current commitment.
    fn schedule_weekly_goal_reminder(&mut self);
}

/// Host stub for platforms without notification support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReminders;

impl ReminderScheduler for NullReminders {
    fn schedule_habit_reminder(&mut self, _habit: &Habit, _at: NaiveTime) {}

    fn cancel_habit_reminders(&mut self, _habit_id: &str) {}

    fn schedule_weekly_goal_reminder(&mut self) {}
}
