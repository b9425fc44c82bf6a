//! Goal records: deadline-bound objectives.
//!
//! Goals never award XP; completion only mutates the record. The penalty
//! value is applied by the host when a deadline lapses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::KEY_GOALS;
use crate::{Clock, EngineError, KeyValueStore, XpEngine};

/// A deadline-bound goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_on: Option<NaiveDate>,
    /// Penalty points the host may apply when the deadline lapses.
    #[serde(default)]
    pub penalty_on_failure: i32,
}

/// Input for creating a goal.
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub name: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub penalty_on_failure: i32,
}

impl<S, C> XpEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// All stored goals.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the store cannot be read.
    pub fn goals(&self) -> Result<Vec<Goal>, EngineError> {
        Ok(self.read_json(KEY_GOALS)?.unwrap_or_default())
    }

    /// Create a goal.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the record cannot be
    /// persisted.
    pub fn add_goal(&self, new: NewGoal) -> Result<Goal, EngineError> {
        let mut goals = self.goals()?;
        let id = self.generate_id(goals.iter().map(|g| g.id.as_str()));
        let goal = Goal {
            id,
            name: new.name,
            description: new.description,
            deadline: new.deadline,
            completed: false,
            completed_on: None,
            penalty_on_failure: new.penalty_on_failure,
        };
        goals.push(goal.clone());
        self.write_json(KEY_GOALS, &goals)?;
        Ok(goal)
    }

    /// Delete a goal.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownRecord`] when no goal has the id,
    /// [`EngineError::Storage`] when the change cannot be persisted.
    pub fn delete_goal(&self, id: &str) -> Result<(), EngineError> {
        let mut goals = self.goals()?;
        let before = goals.len();
        goals.retain(|g| g.id != id);
        if goals.len() == before {
            return Err(EngineError::UnknownRecord {
                kind: "goal",
                id: id.to_string(),
            });
        }
        self.write_json(KEY_GOALS, &goals)
    }

    /// Set a goal's completion state, stamping or clearing the date.
    /// Writes nothing when the goal is already in the requested state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownRecord`] when no goal has the id,
    /// [`EngineError::Storage`] when persistence fails.
    pub fn toggle_goal(&self, id: &str, completed: bool) -> Result<Goal, EngineError> {
        let mut goals = self.goals()?;
        let slot = goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| EngineError::UnknownRecord {
                kind: "goal",
                id: id.to_string(),
            })?;

        if completed == slot.completed {
            return Ok(slot.clone());
        }

        slot.completed = completed;
        slot.completed_on = completed.then(|| self.clock.today());
        let goal = slot.clone();
        self.write_json(KEY_GOALS, &goals)?;
        Ok(goal)
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

    #[test]
    fn completion_stamps_date_without_touching_xp() {
        let engine = engine_at(date(2024, 1, 3));
        let goal = engine
            .add_goal(NewGoal {
                name: "run a 10k".to_string(),
                description: String::new(),
                deadline: date(2024, 6, 1),
                penalty_on_failure: 2,
            })
            .expect("add goal");

        let completed = engine.toggle_goal(&goal.id, true).expect("toggle");
        assert!(completed.completed);
        assert_eq!(completed.completed_on, Some(date(2024, 1, 3)));
        assert_eq!(engine.progress().expect("progress").total_xp, 0);

        let reverted = engine.toggle_goal(&goal.id, false).expect("toggle");
        assert!(!reverted.completed);
        assert_eq!(reverted.completed_on, None);
    }

    #[test]
    fn unknown_goal_id_is_rejected() {
        let engine = engine_at(date(2024, 1, 3));
        let err = engine.toggle_goal("nope", true).expect_err("unknown id");
        assert!(matches!(err, EngineError::UnknownRecord { kind: "goal", .. }));
    }
}
