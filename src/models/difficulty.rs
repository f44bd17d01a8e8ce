//! Progressive difficulty: recognition → cued recall → free recall.
//!
//! Every item keeps one strength scalar (0-100) per direction. Crossing a
//! threshold upward promotes immediately; falling back requires dropping a
//! further [`REGRESSION_BUFFER`] points below it, so an item hovering around a
//! threshold does not flip level on every answer. A single update moves at
//! most one band.

use super::exercise::ExerciseType;
use crate::shuffle::{Shuffler, shuffle_vec};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const CUED_RECALL_THRESHOLD: u8 = 40;
pub const FREE_RECALL_THRESHOLD: u8 = 70;
pub const REGRESSION_BUFFER: u8 = 10;

/// Production lagging recognition by more than this gets priority.
const DIRECTION_GAP: i16 = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    #[default]
    Recognition,
    CuedRecall,
    FreeRecall,
}

impl DifficultyLevel {
    /// Harder levels reward more; free recall also forgives more.
    pub fn strength_delta(self, correct: bool) -> i16 {
        match (self, correct) {
            (DifficultyLevel::Recognition, true) => 5,
            (DifficultyLevel::Recognition, false) => -10,
            (DifficultyLevel::CuedRecall, true) => 10,
            (DifficultyLevel::CuedRecall, false) => -15,
            (DifficultyLevel::FreeRecall, true) => 15,
            (DifficultyLevel::FreeRecall, false) => -10,
        }
    }

    /// Level implied by strength alone, ignoring hysteresis.
    pub fn for_strength(strength: u8) -> Self {
        if strength >= FREE_RECALL_THRESHOLD {
            DifficultyLevel::FreeRecall
        } else if strength >= CUED_RECALL_THRESHOLD {
            DifficultyLevel::CuedRecall
        } else {
            DifficultyLevel::Recognition
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Recognition,
    Production,
}

/// Level after an update, given the level before it and the new strength.
pub fn next_level(current: DifficultyLevel, strength: u8) -> DifficultyLevel {
    match current {
        DifficultyLevel::Recognition if strength >= CUED_RECALL_THRESHOLD => {
            DifficultyLevel::CuedRecall
        }
        DifficultyLevel::CuedRecall if strength >= FREE_RECALL_THRESHOLD => {
            DifficultyLevel::FreeRecall
        }
        DifficultyLevel::CuedRecall if strength < CUED_RECALL_THRESHOLD - REGRESSION_BUFFER => {
            DifficultyLevel::Recognition
        }
        DifficultyLevel::FreeRecall if strength < FREE_RECALL_THRESHOLD - REGRESSION_BUFFER => {
            DifficultyLevel::CuedRecall
        }
        level => level,
    }
}

/// Strength and level of one direction of one item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionalStrength {
    pub strength: u8,
    pub level: DifficultyLevel,
    pub last_practiced: Option<DateTime<Utc>>,
}

impl DirectionalStrength {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one answer. `answered_at` is the level the exercise was shown
    /// at; `None` means the direction's current level.
    pub fn apply_answer(
        &self,
        correct: bool,
        answered_at: Option<DifficultyLevel>,
        now: DateTime<Utc>,
    ) -> Self {
        let delta = answered_at.unwrap_or(self.level).strength_delta(correct);
        let strength = (self.strength as i16 + delta).clamp(0, 100) as u8;

        Self {
            strength,
            level: next_level(self.level, strength),
            last_practiced: Some(now),
        }
    }
}

/// Which direction the next exercise for an item should train.
pub fn prioritize_direction(recognition_strength: u8, production_strength: u8) -> Direction {
    if recognition_strength < CUED_RECALL_THRESHOLD {
        // comprehension first
        Direction::Recognition
    } else if recognition_strength as i16 - production_strength as i16 > DIRECTION_GAP {
        Direction::Production
    } else if production_strength >= FREE_RECALL_THRESHOLD {
        // both strong, keep recognition fresh
        Direction::Recognition
    } else {
        Direction::Production
    }
}

/// Picks one exercise type for `direction`, falling back to any candidate
/// when none trains that direction.
pub fn select_exercise(
    candidates: &[ExerciseType],
    direction: Direction,
    shuffler: &mut dyn Shuffler,
) -> Option<ExerciseType> {
    let matching: Vec<ExerciseType> = candidates
        .iter()
        .copied()
        .filter(|t| t.direction() == direction)
        .collect();

    let pool = if matching.is_empty() {
        candidates.to_vec()
    } else {
        matching
    };

    shuffle_vec(shuffler, pool).into_iter().next()
}

/// Presentation hints for an exercise at a given level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyMetadata {
    pub level: DifficultyLevel,
    pub show_hints: bool,
    pub word_bank: bool,
}

pub fn difficulty_metadata(level: DifficultyLevel) -> DifficultyMetadata {
    DifficultyMetadata {
        level,
        show_hints: level != DifficultyLevel::FreeRecall,
        word_bank: level == DifficultyLevel::Recognition,
    }
}

/// Days between practice sessions once a direction is no longer weak.
pub fn review_interval_days(direction: Direction, level: DifficultyLevel) -> i64 {
    match (direction, level) {
        (Direction::Recognition, DifficultyLevel::Recognition) => 1,
        (Direction::Recognition, DifficultyLevel::CuedRecall) => 3,
        (Direction::Recognition, DifficultyLevel::FreeRecall) => 7,
        (Direction::Production, DifficultyLevel::Recognition) => 1,
        (Direction::Production, DifficultyLevel::CuedRecall) => 2,
        (Direction::Production, DifficultyLevel::FreeRecall) => 5,
    }
}

fn interval_elapsed(
    state: &DirectionalStrength,
    direction: Direction,
    now: DateTime<Utc>,
) -> bool {
    match state.last_practiced {
        None => true,
        Some(last) => now - last >= Duration::days(review_interval_days(direction, state.level)),
    }
}

pub fn needs_recognition_practice(recognition: &DirectionalStrength, now: DateTime<Utc>) -> bool {
    recognition.strength < CUED_RECALL_THRESHOLD
        || interval_elapsed(recognition, Direction::Recognition, now)
}

/// Production is held back until recognition has reached cued recall strength.
pub fn needs_production_practice(
    recognition: &DirectionalStrength,
    production: &DirectionalStrength,
    now: DateTime<Utc>,
) -> bool {
    if recognition.strength < CUED_RECALL_THRESHOLD {
        return false;
    }
    production.strength < CUED_RECALL_THRESHOLD
        || interval_elapsed(production, Direction::Production, now)
}
