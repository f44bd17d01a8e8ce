//! The mastery engine: the single writer of learner state.
//!
//! Every entry point loads the affected record, applies one pure transition from
//! `models` and writes the result back before returning. Records that do not
//! exist yet are created with defaults on first write; legacy records are
//! upgraded and persisted the first time they are read.

use crate::analysis::calibration::{self, CalibrationRecord, CalibrationStats, ConfidenceLevel};
use crate::analysis::weakness::{self, CategoryWeakness, ErrorCategory, WeaknessRecord, WeaknessReport};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::database::{db, envelope};
use crate::error::{EngineError, EngineResult};
use crate::models::collocation::{
    self, Collocation, CollocationExercise, CollocationExerciseKind, CollocationIndex,
    CollocationMastery,
};
use crate::models::difficulty::{
    self, DifficultyLevel, DifficultyMetadata, Direction, DirectionalStrength,
};
use crate::models::encounter::SourceType;
use crate::models::exercise::ExerciseType;
use crate::models::mastery_record::{CurrentMasteryRecord, MasteryRecord};
use crate::models::migration;
use crate::models::review_state::ReviewState;
use crate::models::sm2::{self, Reviewable};
use crate::shuffle::{RandomShuffle, Shuffler};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// What to show next for one item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultySelection {
    pub direction: Direction,
    pub level: DifficultyLevel,
    pub exercise: ExerciseType,
    pub metadata: DifficultyMetadata,
    /// False when the chosen direction is not yet due for practice.
    pub needs_practice: bool,
}

/// An item whose SM-2 review is due, as listed in the review queue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueItem {
    pub item_id: String,
    pub review: ReviewState,
    pub days_overdue: i64,
    pub retention: f64,
}

impl Reviewable for DueItem {
    fn review_state(&self) -> &ReviewState {
        &self.review
    }
}

pub struct MasteryEngine {
    conn: Connection,
    clock: Box<dyn Clock>,
    shuffler: Box<dyn Shuffler>,
    config: EngineConfig,
    collocations: CollocationIndex,
}

impl MasteryEngine {
    /// Opens the store at `config.database_path` with the system clock.
    pub fn open(config: EngineConfig) -> EngineResult<Self> {
        let conn = db::init_database(&config.database_path)?;
        Ok(Self::with_connection(conn, config))
    }

    pub fn in_memory(config: EngineConfig) -> EngineResult<Self> {
        Ok(Self::with_connection(db::init_in_memory()?, config))
    }

    fn with_connection(conn: Connection, config: EngineConfig) -> Self {
        Self {
            conn,
            clock: Box::new(SystemClock),
            shuffler: Box::new(RandomShuffle),
            config,
            collocations: CollocationIndex::new(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_shuffler(mut self, shuffler: impl Shuffler + 'static) -> Self {
        self.shuffler = Box::new(shuffler);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ---- item records ----

    fn upgrade(&self, item_id: &str, record: MasteryRecord) -> EngineResult<CurrentMasteryRecord> {
        match record {
            MasteryRecord::Current(current) => Ok(current),
            MasteryRecord::Legacy(legacy) => {
                let current = migration::migrate_record(&legacy, self.now());
                db::save_item_record(item_id, &current, &self.conn)?;
                log::info!("migrated legacy mastery record for '{item_id}'");
                Ok(current)
            }
        }
    }

    /// The stored record, upgraded if needed. `None` for items never seen.
    pub fn mastery(&self, item_id: &str) -> EngineResult<Option<CurrentMasteryRecord>> {
        match db::load_item_record(item_id, &self.conn)? {
            Some(record) => self.upgrade(item_id, record).map(Some),
            None => Ok(None),
        }
    }

    fn load_or_default(&self, item_id: &str) -> EngineResult<CurrentMasteryRecord> {
        Ok(self
            .mastery(item_id)?
            .unwrap_or_else(|| CurrentMasteryRecord::new(self.now())))
    }

    /// Upgrades and stores a raw record handed over by an older store.
    /// Returns `None`, storing nothing, when the value is unreadable.
    pub fn migrate_if_needed(
        &self,
        item_id: &str,
        raw: Value,
    ) -> EngineResult<Option<CurrentMasteryRecord>> {
        let Some(record) = envelope::decode_value(raw) else {
            return Ok(None);
        };
        let was_legacy = record.is_legacy();
        let current = self.upgrade(item_id, record)?;
        if !was_legacy {
            db::save_item_record(item_id, &current, &self.conn)?;
        }
        Ok(Some(current))
    }

    pub fn record_encounter(&self, item_id: &str, source: SourceType) -> EngineResult<()> {
        let mut record = self.load_or_default(item_id)?;
        record
            .encounters
            .record(source, self.now(), self.config.encounter_history_cap);
        db::save_item_record(item_id, &record, &self.conn)
    }

    /// Applies an answer to the directional strength of an item. `level` is the
    /// level the exercise was shown at; `None` uses the direction's current one.
    pub fn record_answer(
        &self,
        item_id: &str,
        direction: Direction,
        correct: bool,
        level: Option<DifficultyLevel>,
    ) -> EngineResult<DirectionalStrength> {
        let mut record = self.load_or_default(item_id)?;
        let before = record.directional(direction);
        let after = before.apply_answer(correct, level, self.now());

        if after.level != before.level {
            log::debug!(
                "'{item_id}' {direction:?}: {:?} -> {:?} at strength {}",
                before.level,
                after.level,
                after.strength
            );
        }

        record.set_directional(direction, after);
        db::save_item_record(item_id, &record, &self.conn)?;
        Ok(after)
    }

    /// Runs one SM-2 review with a 0-5 quality grade. Grades above 5 count as 5.
    pub fn record_review(&self, item_id: &str, quality: u8) -> EngineResult<ReviewState> {
        let mut record = self.load_or_default(item_id)?;
        record.sm2 = sm2::advance(&record.sm2, quality, self.now());
        log::debug!(
            "'{item_id}' reviewed with quality {quality}, next in {} day(s)",
            record.sm2.interval
        );
        db::save_item_record(item_id, &record, &self.conn)?;
        Ok(record.sm2)
    }

    /// Unknown items are due.
    pub fn is_due(&self, item_id: &str) -> EngineResult<bool> {
        Ok(self
            .mastery(item_id)?
            .is_none_or(|record| sm2::is_due(&record.sm2, self.now())))
    }

    /// Stored items whose review is due, most urgent first.
    pub fn due_items(&self) -> EngineResult<Vec<DueItem>> {
        let now = self.now();
        let mut due = Vec::new();
        for (item_id, record) in db::load_all_item_records(&self.conn)? {
            let record = self.upgrade(&item_id, record)?;
            if sm2::is_due(&record.sm2, now) {
                due.push(DueItem {
                    days_overdue: sm2::days_overdue(&record.sm2, now),
                    retention: sm2::estimate_retention(&record.sm2, now),
                    item_id,
                    review: record.sm2,
                });
            }
        }

        Ok(sm2::sort_by_review_priority(&due, now)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Picks direction, level and exercise type for an item. `None` only when
    /// `candidates` is empty.
    pub fn get_difficulty_selection(
        &mut self,
        item_id: &str,
        candidates: &[ExerciseType],
    ) -> EngineResult<Option<DifficultySelection>> {
        let record = self.load_or_default(item_id)?;
        let now = self.now();
        let recognition = record.directional(Direction::Recognition);
        let production = record.directional(Direction::Production);

        let direction = difficulty::prioritize_direction(recognition.strength, production.strength);
        let Some(exercise) = difficulty::select_exercise(candidates, direction, self.shuffler.as_mut())
        else {
            return Ok(None);
        };

        let level = record.directional(direction).level;
        let needs_practice = match direction {
            Direction::Recognition => difficulty::needs_recognition_practice(&recognition, now),
            Direction::Production => {
                difficulty::needs_production_practice(&recognition, &production, now)
            }
        };

        Ok(Some(DifficultySelection {
            direction,
            level,
            exercise,
            metadata: difficulty::difficulty_metadata(level),
            needs_practice,
        }))
    }

    // ---- analytics ----

    /// Logs a self-rated confidence (1-3). Out-of-range values are ignored and
    /// reported as `false`.
    pub fn record_confidence(&self, confidence: u8, was_correct: bool) -> EngineResult<bool> {
        let Some(confidence_level) = ConfidenceLevel::from_u8(confidence) else {
            log::warn!("ignoring confidence rating {confidence}, expected 1-3");
            return Ok(false);
        };
        let record = CalibrationRecord {
            confidence_level,
            was_correct,
            recorded_at: self.now(),
        };
        db::append_calibration(&record, self.config.calibration_log_cap, &self.conn)?;
        Ok(true)
    }

    pub fn record_error(&self, category: ErrorCategory, item_id: &str) -> EngineResult<()> {
        let record = WeaknessRecord {
            error_category: category,
            timestamp: self.now(),
            affected_item_id: item_id.to_string(),
        };
        db::append_weakness(&record, self.config.weakness_log_cap, &self.conn)
    }

    pub fn get_calibration_stats(&self) -> EngineResult<CalibrationStats> {
        Ok(calibration::analyze(&db::load_calibration_log(&self.conn)?))
    }

    pub fn get_weakness_report(&self) -> EngineResult<WeaknessReport> {
        let log = db::load_weakness_log(&self.conn)?;
        Ok(weakness::analyze(&log, self.now(), self.config.top_weakness_count))
    }

    pub fn get_top_weaknesses(&self) -> EngineResult<Vec<CategoryWeakness>> {
        Ok(self.get_weakness_report()?.top_weaknesses)
    }

    // ---- collocations ----

    pub fn register_collocation(&mut self, collocation: Collocation) {
        self.collocations.insert(collocation);
    }

    pub fn collocations(&self) -> &CollocationIndex {
        &self.collocations
    }

    fn known_collocation(&self, collocation_id: &str) -> EngineResult<&Collocation> {
        self.collocations
            .get(collocation_id)
            .ok_or_else(|| EngineError::UnknownCollocation(collocation_id.to_string()))
    }

    pub fn collocation_mastery(&self, collocation_id: &str) -> EngineResult<CollocationMastery> {
        self.known_collocation(collocation_id)?;
        Ok(db::load_collocation_mastery(collocation_id, &self.conn)?.unwrap_or_default())
    }

    pub fn record_collocation_answer(
        &self,
        collocation_id: &str,
        correct: bool,
        kind: CollocationExerciseKind,
    ) -> EngineResult<CollocationMastery> {
        let mastery = self
            .collocation_mastery(collocation_id)?
            .record(correct, kind, self.now());
        db::save_collocation_mastery(collocation_id, &mastery, &self.conn)?;
        Ok(mastery)
    }

    /// Recognition strength of every stored word.
    fn word_strengths(&self) -> EngineResult<HashMap<String, u8>> {
        let mut strengths = HashMap::new();
        for (item_id, record) in db::load_all_item_records(&self.conn)? {
            let record = self.upgrade(&item_id, record)?;
            strengths.insert(item_id, record.recognition_strength);
        }
        Ok(strengths)
    }

    /// Up to `limit` collocations whose words are all known, in random order.
    pub fn select_collocations(&mut self, limit: usize) -> EngineResult<Vec<Collocation>> {
        let strengths = self.word_strengths()?;
        let lookup = |word_id: &str| strengths.get(word_id).copied();
        Ok(collocation::select_for_practice(
            self.collocations.iter(),
            &lookup,
            limit,
            self.shuffler.as_mut(),
        )
        .into_iter()
        .cloned()
        .collect())
    }

    /// All exercises for a collocation. Multiple-choice distractors come from
    /// the final words of the other registered collocations.
    pub fn collocation_exercises(
        &mut self,
        collocation_id: &str,
    ) -> EngineResult<Vec<CollocationExercise>> {
        let target = self.known_collocation(collocation_id)?.clone();
        let distractors: Vec<String> = self
            .collocations
            .iter()
            .filter(|c| c.id != target.id)
            .filter_map(|c| c.words.last().cloned())
            .collect();
        collocation::generate_exercises(&target, &distractors, self.shuffler.as_mut())
    }

    /// Wipes all learner data. Registered collocations stay.
    pub fn reset_all(&self) -> EngineResult<()> {
        db::reset_all(&self.conn)?;
        log::info!("all learner data cleared");
        Ok(())
    }
}
