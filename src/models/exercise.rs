//! Exercise types the content layer can render, each tagged with the skill it trains.

use super::difficulty::Direction;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    /// Arabic on the front, meaning on the back.
    Flashcard,
    /// See the Arabic word, pick the English meaning.
    MeaningChoice,
    /// Hear the Arabic word, pick the English meaning.
    ListeningChoice,
    Matching,
    /// See the English meaning, pick the Arabic word.
    ReverseChoice,
    /// Type the Arabic word from its English meaning.
    Translation,
    /// Type the missing Arabic word of a sentence.
    FillBlank,
    /// Arrange Arabic words from a bank into a sentence.
    SentenceBuilder,
    /// Hear the Arabic word and spell it.
    Dictation,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 9] = [
        ExerciseType::Flashcard,
        ExerciseType::MeaningChoice,
        ExerciseType::ListeningChoice,
        ExerciseType::Matching,
        ExerciseType::ReverseChoice,
        ExerciseType::Translation,
        ExerciseType::FillBlank,
        ExerciseType::SentenceBuilder,
        ExerciseType::Dictation,
    ];

    pub fn direction(self) -> Direction {
        match self {
            ExerciseType::Flashcard
            | ExerciseType::MeaningChoice
            | ExerciseType::ListeningChoice
            | ExerciseType::Matching => Direction::Recognition,
            ExerciseType::ReverseChoice
            | ExerciseType::Translation
            | ExerciseType::FillBlank
            | ExerciseType::SentenceBuilder
            | ExerciseType::Dictation => Direction::Production,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_a_direction() {
        let recognition = ExerciseType::ALL
            .iter()
            .filter(|t| t.direction() == Direction::Recognition)
            .count();
        assert_eq!(recognition, 4);
        assert_eq!(ExerciseType::Translation.direction(), Direction::Production);
        assert_eq!(ExerciseType::MeaningChoice.direction(), Direction::Recognition);
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&ExerciseType::FillBlank).unwrap();
        assert_eq!(json, "\"fill_blank\"");
    }
}
