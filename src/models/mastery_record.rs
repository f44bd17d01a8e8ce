//! Persisted per-item mastery, in its legacy and current shapes.

use super::difficulty::{Direction, DirectionalStrength, DifficultyLevel};
use super::encounter::EncounterLog;
use super::review_state::ReviewState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Everything the engine tracks for one word.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMasteryRecord {
    pub sm2: ReviewState,
    #[serde(default)]
    pub recognition_strength: u8,
    #[serde(default)]
    pub recognition_level: DifficultyLevel,
    #[serde(default)]
    pub production_strength: u8,
    #[serde(default)]
    pub production_level: DifficultyLevel,
    #[serde(default)]
    pub last_recognition_practice: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_production_practice: Option<DateTime<Utc>>,
    #[serde(default)]
    pub encounters: EncounterLog,
}

impl CurrentMasteryRecord {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            sm2: ReviewState::new(now),
            recognition_strength: 0,
            recognition_level: DifficultyLevel::Recognition,
            production_strength: 0,
            production_level: DifficultyLevel::Recognition,
            last_recognition_practice: None,
            last_production_practice: None,
            encounters: EncounterLog::new(),
        }
    }

    pub fn directional(&self, direction: Direction) -> DirectionalStrength {
        match direction {
            Direction::Recognition => DirectionalStrength {
                strength: self.recognition_strength,
                level: self.recognition_level,
                last_practiced: self.last_recognition_practice,
            },
            Direction::Production => DirectionalStrength {
                strength: self.production_strength,
                level: self.production_level,
                last_practiced: self.last_production_practice,
            },
        }
    }

    pub fn set_directional(&mut self, direction: Direction, state: DirectionalStrength) {
        match direction {
            Direction::Recognition => {
                self.recognition_strength = state.strength;
                self.recognition_level = state.level;
                self.last_recognition_practice = state.last_practiced;
            }
            Direction::Production => {
                self.production_strength = state.strength;
                self.production_level = state.level;
                self.last_production_practice = state.last_practiced;
            }
        }
    }
}

/// The single-scalar shape written before SM-2 scheduling existed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMasteryRecord {
    pub strength: f64,
    /// Kept as written; anything that is not a string is treated as missing.
    #[serde(default, deserialize_with = "string_or_none")]
    pub last_practiced: Option<String>,
    #[serde(default)]
    pub times_correct: u32,
    #[serde(default)]
    pub times_incorrect: u32,
}

fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

#[derive(Clone, Debug, PartialEq)]
pub enum MasteryRecord {
    Legacy(LegacyMasteryRecord),
    Current(CurrentMasteryRecord),
}

impl MasteryRecord {
    pub fn is_legacy(&self) -> bool {
        matches!(self, MasteryRecord::Legacy(_))
    }

    /// Upgrades legacy records; current records pass through.
    pub fn into_current(self, now: DateTime<Utc>) -> CurrentMasteryRecord {
        match self {
            MasteryRecord::Legacy(legacy) => super::migration::migrate_record(&legacy, now),
            MasteryRecord::Current(current) => current,
        }
    }
}
