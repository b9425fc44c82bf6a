//! Penalty records: demerits logged when habits or goals are missed.
//!
//! Penalties are plain records plus aggregate queries; the profile keeps
//! its own running tally (see [`crate::profile`]).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::constants::KEY_PENALTIES;
use crate::{Clock, EngineError, KeyValueStore, XpEngine};

/// One logged penalty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalty {
    pub id: String,
    pub reason: String,
    pub points: i32,
    /// Device-local timestamp the penalty was logged.
    pub recorded_at: NaiveDateTime,
}

/// Input for logging a penalty.
#[derive(Debug, Clone, Default)]
pub struct NewPenalty {
    pub reason: String,
    pub points: i32,
}

impl<S, C> XpEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// All logged penalties.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the store cannot be read.
    pub fn penalties(&self) -> Result<Vec<Penalty>, EngineError> {
        Ok(self.read_json(KEY_PENALTIES)?.unwrap_or_default())
    }

    /// Log a penalty.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the record cannot be
    /// persisted.
    pub fn add_penalty(&self, new: NewPenalty) -> Result<Penalty, EngineError> {
        let mut penalties = self.penalties()?;
        let id = self.generate_id(penalties.iter().map(|p| p.id.as_str()));
        let penalty = Penalty {
            id,
            reason: new.reason,
            points: new.points,
            recorded_at: self.clock.now(),
        };
        penalties.push(penalty.clone());
        self.write_json(KEY_PENALTIES, &penalties)?;
        Ok(penalty)
    }

    /// Delete a logged penalty.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownRecord`] when no penalty has the id,
    /// [`EngineError::Storage`] when the change cannot be persisted.
    pub fn delete_penalty(&self, id: &str) -> Result<(), EngineError> {
        let mut penalties = self.penalties()?;
        let before = penalties.len();
        penalties.retain(|p| p.id != id);
        if penalties.len() == before {
            return Err(EngineError::UnknownRecord {
                kind: "penalty",
                id: id.to_string(),
            });
        }
        self.write_json(KEY_PENALTIES, &penalties)
    }

    /// Sum of all logged penalty points.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the store cannot be read.
    pub fn penalty_total(&self) -> Result<i32, EngineError> {
        Ok(self
            .penalties()?
            .iter()
            .fold(0i32, |total, p| total.saturating_add(p.points)))
    }

    /// Penalties logged between `start` and `end`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the store cannot be read.
    pub fn penalties_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Penalty>, EngineError> {
        let mut penalties = self.penalties()?;
        penalties.retain(|p| {
            let day = p.recorded_at.date();
            day >= start && day <= end
        });
        Ok(penalties)
    }
}
