//! Centralized point values and storage keys for Questlog progression.
//!
//! These values define the deterministic math for the XP system. Keeping
//! them together ensures that progression can only be adjusted via code
//! changes reviewed in version control, rather than through external
//! configuration.

// Storage keys -------------------------------------------------------------
pub(crate) const KEY_PROGRESS: &str = "questlog.progress";
pub(crate) const KEY_WEEKLY: &str = "questlog.weekly";
pub(crate) const KEY_HABITS: &str = "questlog.habits";
pub(crate) const KEY_TASKS: &str = "questlog.tasks";
pub(crate) const KEY_GOALS: &str = "questlog.goals";
pub(crate) const KEY_PENALTIES: &str = "questlog.penalties";
pub(crate) const KEY_PROFILE: &str = "questlog.profile";

// XP values ----------------------------------------------------------------
/// XP granted when a habit is checked off for the day.
pub const XP_HABIT_COMPLETION: i64 = 10;
/// XP granted when a task is completed.
pub const XP_TASK_COMPLETION: i64 = 15;
/// One-time bonus when the weekly commitment target is reached.
pub const XP_WEEKLY_GOAL_BONUS: i64 = 50;
/// Extra XP each time a habit streak reaches a multiple of
/// [`STREAK_BONUS_INTERVAL`].
pub const XP_STREAK_BONUS: i64 = 5;
/// Streak length between bonus awards.
pub const STREAK_BONUS_INTERVAL: u32 = 7;

// Level curve --------------------------------------------------------------
/// XP per squared-level unit: `level = floor(sqrt(total / SCALE)) + 1`.
pub(crate) const LEVEL_XP_SCALE: i64 = 100;

// Weekly targets -----------------------------------------------------------
/// A committed daily habit counts once per day of the week.
pub(crate) const DAYS_PER_WEEK: i64 = 7;

// XP sources ---------------------------------------------------------------
pub const SOURCE_HABIT_COMPLETION: &str = "habit_completion";
pub const SOURCE_HABIT_REVERSAL: &str = "habit_reversal";
pub const SOURCE_TASK_COMPLETION: &str = "task_completion";
pub const SOURCE_TASK_REVERSAL: &str = "task_reversal";
pub const SOURCE_WEEKLY_GOAL: &str = "weekly_goal_completion";
