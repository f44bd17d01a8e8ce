use chrono::{Duration, TimeZone, Utc};
use mastery_engine::analysis::calibration::CalibrationTendency;
use mastery_engine::analysis::ErrorCategory;
use mastery_engine::clock::{Clock, FixedClock};
use mastery_engine::models::collocation::{CollocationExerciseKind, check_answer};
use mastery_engine::models::{Collocation, DifficultyLevel, Direction, ReviewSession};
use mastery_engine::shuffle::SeededShuffle;
use mastery_engine::{EngineConfig, MasteryEngine};
use serde_json::json;
use std::rc::Rc;

fn engine() -> (MasteryEngine, Rc<FixedClock>) {
    let clock = Rc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap()));
    let engine = MasteryEngine::in_memory(EngineConfig::default())
        .unwrap()
        .with_clock(Rc::clone(&clock))
        .with_shuffler(SeededShuffle::new(7));
    (engine, clock)
}

#[test]
fn free_recall_production_climbs_to_full_strength() {
    let (engine, clock) = engine();
    let mut strengths = Vec::new();
    for _ in 0..7 {
        let state = engine
            .record_answer("qamar", Direction::Production, true, Some(DifficultyLevel::FreeRecall))
            .unwrap();
        strengths.push(state.strength);
        clock.advance_days(1);
    }

    assert_eq!(strengths, vec![15, 30, 45, 60, 75, 90, 100]);
    let record = engine.mastery("qamar").unwrap().unwrap();
    assert_eq!(record.production_strength, 100);
    assert_eq!(record.production_level, DifficultyLevel::FreeRecall);
    assert_eq!(record.recognition_strength, 0);
}

#[test]
fn collocation_becomes_producible() {
    let (mut engine, _) = engine();
    engine.register_collocation(
        Collocation::new(
            "hatha-kitab",
            "هَذَا كِتَابٌ",
            vec!["hatha".into(), "kitab".into()],
            Some("this is a book".into()),
        )
        .unwrap(),
    );

    let check = check_answer("هذا كتاب", "هَذَا كِتَابٌ");
    assert!(check.correct);
    let mastery = engine
        .record_collocation_answer("hatha-kitab", check.correct, CollocationExerciseKind::Translation)
        .unwrap();
    assert!(mastery.can_produce);

    let reordered = check_answer("كِتَابٌ هَذَا", "هَذَا كِتَابٌ");
    assert!(!reordered.correct);
    assert!(reordered.feedback.is_some());
}

#[test]
fn legacy_store_is_upgraded_and_scheduled() {
    let (engine, clock) = engine();
    let now = clock.now();
    let practiced = (now - Duration::days(20)).to_rfc3339();

    engine
        .migrate_if_needed("shajara", json!({"strength": 65, "lastPracticed": practiced}))
        .unwrap()
        .unwrap();
    engine
        .migrate_if_needed("nahr", json!({"strength": 90, "lastPracticed": null}))
        .unwrap()
        .unwrap();

    // shajara: 7-day interval from 20 days ago; nahr: 14 days from now
    assert!(engine.is_due("shajara").unwrap());
    assert!(!engine.is_due("nahr").unwrap());

    let mut session = ReviewSession::start(&engine).unwrap();
    assert_eq!(session.current_item().unwrap().item_id, "shajara");
    session.grade_current(&engine, 5).unwrap();
    assert!(session.is_completed());
    assert!(!engine.is_due("shajara").unwrap());
}

#[test]
fn analytics_accumulate_across_calls() {
    let (engine, clock) = engine();
    for i in 0..12 {
        engine.record_confidence(3, i % 2 == 0).unwrap();
    }
    assert_eq!(
        engine.get_calibration_stats().unwrap().tendency,
        CalibrationTendency::Overconfident
    );

    for _ in 0..3 {
        engine.record_error(ErrorCategory::WordOrder, "jumla").unwrap();
    }
    assert!(engine.get_top_weaknesses().unwrap().is_empty());

    clock.advance_days(1);
    for _ in 0..3 {
        engine.record_error(ErrorCategory::DefiniteArticle, "al-walad").unwrap();
    }
    let report = engine.get_weakness_report().unwrap();
    assert!(report.has_enough_data);
    assert_eq!(report.top_weaknesses.len(), 2);

    engine.reset_all().unwrap();
    assert_eq!(engine.get_calibration_stats().unwrap().total, 0);
}
