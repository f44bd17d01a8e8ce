//! One-time upgrade from the legacy 0-100 strength scalar to SM-2 state.

use super::difficulty::DifficultyLevel;
use super::encounter::{EncounterLog, SourceType};
use super::mastery_record::{CurrentMasteryRecord, LegacyMasteryRecord};
use super::review_state::{DEFAULT_EASE_FACTOR, ReviewState};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// (lower bound, ease factor, interval days, repetitions), highest band first.
const STRENGTH_BANDS: [(f64, f64, u32, u32); 4] = [
    (80.0, 2.7, 14, 4), // mastered
    (60.0, 2.6, 7, 3),  // comfortable
    (40.0, 2.5, 3, 2),  // familiar
    (20.0, 2.3, 1, 1),  // learning
];

/// Parses an ISO-8601 timestamp as written by the legacy store.
/// Date-only values are taken as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Buckets a legacy strength into an SM-2 state. A missing or unparsable
/// `last_practiced` schedules from `now`.
pub fn migrate_strength_to_sm2(
    strength: f64,
    last_practiced: Option<&str>,
    now: DateTime<Utc>,
) -> ReviewState {
    let practiced = last_practiced.and_then(parse_timestamp);
    let base = practiced.unwrap_or(now);

    let (ease_factor, interval, repetitions) = STRENGTH_BANDS
        .iter()
        .find(|(lower, ..)| strength >= *lower)
        .map(|&(_, ease, interval, reps)| (ease, interval, reps))
        .unwrap_or((DEFAULT_EASE_FACTOR, 0, 0)); // new, NaN included

    ReviewState {
        ease_factor,
        interval,
        repetitions,
        next_review_date: base + Duration::days(interval as i64),
        last_review: practiced,
    }
}

/// Rebuilds encounter counts from legacy answer counters. The per-encounter
/// history was never stored, so it starts empty.
pub fn estimate_encounters(times_correct: u32, times_incorrect: u32) -> EncounterLog {
    EncounterLog::from_counts(
        SourceType::Exercise,
        times_correct.saturating_add(times_incorrect),
    )
}

/// Whether a raw stored value still has the legacy shape.
///
/// Checks, in order: must be a JSON object; must not already carry an `sm2`
/// sub-state; `strength` must be a number; a `lastPracticed` key must exist
/// (its value may be null).
pub fn needs_migration(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    if obj.contains_key("sm2") {
        return false;
    }
    if !obj.get("strength").is_some_and(Value::is_number) {
        return false;
    }
    obj.contains_key("lastPracticed")
}

/// Total conversion of a legacy record. The scalar strength seeds the
/// recognition direction; production starts from scratch.
pub fn migrate_record(legacy: &LegacyMasteryRecord, now: DateTime<Utc>) -> CurrentMasteryRecord {
    let sm2 = migrate_strength_to_sm2(legacy.strength, legacy.last_practiced.as_deref(), now);
    let strength = if legacy.strength.is_finite() {
        legacy.strength.round().clamp(0.0, 100.0) as u8
    } else {
        0
    };

    if legacy.times_correct > 0 || legacy.times_incorrect > 0 {
        log::debug!(
            "migrating {} legacy answers as exercise encounters without history",
            legacy.times_correct.saturating_add(legacy.times_incorrect)
        );
    }

    let mut record = CurrentMasteryRecord::new(now);
    record.last_recognition_practice = sm2.last_review;
    record.sm2 = sm2;
    record.recognition_strength = strength;
    record.recognition_level = DifficultyLevel::for_strength(strength);
    record.encounters = estimate_encounters(legacy.times_correct, legacy.times_incorrect);
    record
}
