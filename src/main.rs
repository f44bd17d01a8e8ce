use mastery_engine::*;

use analysis::ErrorCategory;
use models::collocation::CollocationExerciseKind;
use models::{Collocation, Direction, DifficultyLevel, ExerciseType, ReviewSession, SourceType};
use std::path::Path;

const SAMPLE_WORDS: &[(&str, &str)] = &[
    ("hatha", "هَذَا"),
    ("kitab", "كِتَابٌ"),
    ("fi", "فِي"),
    ("bayt", "البَيْتِ"),
];

fn main() -> EngineResult<()> {
    env_logger::init();

    let config = EngineConfig::load(Path::new("mastery.toml"))?;
    let mut engine = MasteryEngine::open(config)?;

    engine.register_collocation(Collocation::new(
        "hatha-kitab",
        "هَذَا كِتَابٌ",
        vec!["hatha".into(), "kitab".into()],
        Some("this is a book".into()),
    )?);
    engine.register_collocation(Collocation::new(
        "fi-albayt",
        "فِي البَيْتِ",
        vec!["fi".into(), "bayt".into()],
        Some("in the house".into()),
    )?);

    if engine.mastery(SAMPLE_WORDS[0].0)?.is_none() {
        for (id, arabic) in SAMPLE_WORDS {
            engine.record_encounter(id, SourceType::Reading)?;
            let level = Some(DifficultyLevel::FreeRecall);
            engine.record_answer(id, Direction::Recognition, true, level)?;
            engine.record_answer(id, Direction::Recognition, true, None)?;
            println!("Seeded '{}' ({})", id, arabic);
        }
        engine.record_error(ErrorCategory::Preposition, "fi")?;
        println!("Sample data created!");
    }

    let mut session = ReviewSession::start(&engine)?;
    while !session.is_completed() {
        println!("{}", session.phase_message());
        session.grade_current(&engine, 4)?;
    }

    for id in ["kitab", "bayt"] {
        if let Some(selection) = engine.get_difficulty_selection(id, &ExerciseType::ALL)? {
            println!(
                "{}: {:?} at {:?} via {:?}",
                id, selection.direction, selection.level, selection.exercise
            );
        }
    }

    for collocation in engine.select_collocations(2)? {
        let mastery = engine.record_collocation_answer(
            &collocation.id,
            true,
            CollocationExerciseKind::CompleteMissing,
        )?;
        println!("{} -> strength {}", collocation.text(), mastery.strength);
    }

    engine.record_confidence(3, true)?;
    let stats = engine.get_calibration_stats()?;
    println!("Calibration: {:?} over {} answers", stats.tendency, stats.total);

    for weakness in engine.get_top_weaknesses()? {
        println!("Weakness: {} ({} errors)", weakness.category.as_str(), weakness.count);
    }

    Ok(())
}
