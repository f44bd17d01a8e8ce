pub mod arabic;
pub mod collocation;
pub mod difficulty;
pub mod encounter;
pub mod exercise;
pub mod mastery_record;
pub mod migration;
pub mod review_session;
pub mod review_state;
pub mod sm2;

pub use collocation::{Collocation, CollocationIndex, CollocationMastery};
pub use difficulty::{DifficultyLevel, Direction, DirectionalStrength};
pub use encounter::{EncounterLog, SourceType};
pub use exercise::ExerciseType;
pub use mastery_record::{CurrentMasteryRecord, LegacyMasteryRecord, MasteryRecord};
pub use review_session::ReviewSession;
pub use review_state::ReviewState;
