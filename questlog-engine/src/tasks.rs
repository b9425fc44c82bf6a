//! Task records: one-shot items whose completion awards XP.
//!
//! Unlike habits, a task completes once; the stored `completed` flag is
//! the idempotence guard for the XP call.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{
    KEY_TASKS, SOURCE_TASK_COMPLETION, SOURCE_TASK_REVERSAL, XP_TASK_COMPLETION,
};
use crate::xp::AwardOutcome;
use crate::{Clock, EngineError, KeyValueStore, XpEngine};

/// A one-shot task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_on: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub deadline: Option<NaiveDate>,
    pub category: Option<String>,
}

/// Outcome of a completion toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskToggle {
    /// The task after the toggle.
    pub task: Task,
    /// False when the task was already in the requested state.
    pub changed: bool,
    /// The XP award applied, absent for no-op toggles.
    pub award: Option<AwardOutcome>,
}

impl<S, C> XpEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// All stored tasks.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the store cannot be read.
    pub fn tasks(&self) -> Result<Vec<Task>, EngineError> {
        Ok(self.read_json(KEY_TASKS)?.unwrap_or_default())
    }

    /// Create a task.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the record cannot be
    /// persisted.
    pub fn add_task(&self, new: NewTask) -> Result<Task, EngineError> {
        let mut tasks = self.tasks()?;
        let id = self.generate_id(tasks.iter().map(|t| t.id.as_str()));
        let task = Task {
            id,
            name: new.name,
            description: new.description,
            deadline: new.deadline,
            completed: false,
            completed_on: None,
            category: new.category,
        };
        tasks.push(task.clone());
        self.write_json(KEY_TASKS, &tasks)?;
        Ok(task)
    }

    /// Delete a task.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownRecord`] when no task has the id,
    /// [`EngineError::Storage`] when the change cannot be persisted.
    pub fn delete_task(&self, id: &str) -> Result<(), EngineError> {
        let mut tasks = self.tasks()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(EngineError::UnknownRecord {
                kind: "task",
                id: id.to_string(),
            });
        }
        self.write_json(KEY_TASKS, &tasks)
    }

    /// Toggle a task's completion.
    ///
    /// Completing stamps today and awards [`XP_TASK_COMPLETION`];
    /// un-completing clears the stamp and revokes the same amount.
    /// Re-toggling into the current state changes nothing and awards
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownRecord`] when no task has the id,
    /// [`EngineError::Storage`] when persistence fails.
    pub fn toggle_task(&self, id: &str, completed: bool) -> Result<TaskToggle, EngineError> {
        let mut tasks = self.tasks()?;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| EngineError::UnknownRecord {
                kind: "task",
                id: id.to_string(),
            })?;

        if completed == slot.completed {
            return Ok(TaskToggle {
                task: slot.clone(),
                changed: false,
                award: None,
            });
        }

        let (points, source) = if completed {
            slot.completed = true;
            slot.completed_on = Some(self.clock.today());
            (XP_TASK_COMPLETION, SOURCE_TASK_COMPLETION)
        } else {
            slot.completed = false;
            slot.completed_on = None;
            (-XP_TASK_COMPLETION, SOURCE_TASK_REVERSAL)
        };

        let task = slot.clone();
        self.write_json(KEY_TASKS, &tasks)?;
        let award = self.award_xp(points, source)?;
        Ok(TaskToggle {
            task,
            changed: true,
            award: Some(award),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, MemoryStore};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn engine_at(day: NaiveDate) -> XpEngine<MemoryStore, ManualClock> {
        XpEngine::new(MemoryStore::new(), ManualClock::at(day))
    }

    fn add_task(engine: &XpEngine<MemoryStore, ManualClock>, name: &str) -> Task {
        engine
            .add_task(NewTask {
                name: name.to_string(),
                ..NewTask::default()
            })
            .expect("add task")
    }

    #[test]
    fn completing_stamps_today_and_awards() {
        let engine = engine_at(date(2024, 1, 3));
        let task = add_task(&engine, "write report");

        let toggle = engine.toggle_task(&task.id, true).expect("toggle");
        assert!(toggle.changed);
        assert!(toggle.task.completed);
        assert_eq!(toggle.task.completed_on, Some(date(2024, 1, 3)));
        let award = toggle.award.expect("award");
        assert_eq!(award.points_added, XP_TASK_COMPLETION);
        assert_eq!(award.source, SOURCE_TASK_COMPLETION);
    }

    #[test]
    fn toggle_round_trip_restores_progress() {
        let engine = engine_at(date(2024, 1, 3));
        let task = add_task(&engine, "write report");
        let before = engine.progress().expect("progress");

        engine.toggle_task(&task.id, true).expect("complete");
        engine.toggle_task(&task.id, false).expect("uncomplete");

        assert_eq!(engine.progress().expect("progress"), before);
        let stored = &engine.tasks().expect("tasks")[0];
        assert!(!stored.completed);
        assert_eq!(stored.completed_on, None);
    }

    #[test]
    fn repeated_toggle_to_same_state_is_a_no_op() {
        let engine = engine_at(date(2024, 1, 3));
        let task = add_task(&engine, "write report");
        engine.toggle_task(&task.id, true).expect("complete");
        let before = engine.progress().expect("progress");

        let toggle = engine.toggle_task(&task.id, true).expect("again");
        assert!(!toggle.changed);
        assert!(toggle.award.is_none());
        assert_eq!(engine.progress().expect("progress"), before);

        let untouched = engine.toggle_task(&task.id, false).expect("off");
        assert!(untouched.changed);
        let again = engine.toggle_task(&task.id, false).expect("off again");
        assert!(!again.changed);
    }

    #[test]
    fn unknown_task_id_is_rejected() {
        let engine = engine_at(date(2024, 1, 3));
        let err = engine.toggle_task("nope", true).expect_err("unknown id");
        assert!(matches!(err, EngineError::UnknownRecord { kind: "task", .. }));
        let err = engine.delete_task("nope").expect_err("unknown id");
        assert!(matches!(err, EngineError::UnknownRecord { kind: "task", .. }));
    }
}
