//! The single user profile and its running penalty tally.

use serde::{Deserialize, Serialize};

use crate::constants::KEY_PROFILE;
use crate::{Clock, EngineError, KeyValueStore, XpEngine};

/// Per-installation profile, created lazily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// Running penalty tally. Independent of the penalty records: deleting
    /// a logged penalty does not retroactively lower the tally.
    pub penalty_points: i32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Adventurer".to_string(),
            penalty_points: 0,
        }
    }
}

impl<S, C> XpEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// Current profile, lazily initialized and persisted on first read.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the store cannot be read or
    /// the lazily-created default cannot be persisted.
    pub fn profile(&self) -> Result<Profile, EngineError> {
        if let Some(profile) = self.read_json::<Profile>(KEY_PROFILE)? {
            return Ok(profile);
        }
        let fresh = Profile::default();
        self.write_json(KEY_PROFILE, &fresh)?;
        Ok(fresh)
    }

    /// Accrue penalty points onto the profile tally.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the profile cannot be read
    /// or persisted.
    pub fn add_penalty_points(&self, points: i32) -> Result<Profile, EngineError> {
        let mut profile = self.profile()?;
        profile.penalty_points = profile.penalty_points.saturating_add(points);
        self.write_json(KEY_PROFILE, &profile)?;
        Ok(profile)
    }
}
