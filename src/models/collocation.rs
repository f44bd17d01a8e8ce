//! Multi-word phrases (collocations) and their mastery.
//!
//! A collocation is practised only once every word in it is independently
//! known. Its strength is a single scalar like a word's, with larger steps.

use super::arabic;
use crate::error::{EngineError, EngineResult};
use crate::shuffle::{Shuffler, shuffle_vec};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MIN_COMPONENT_STRENGTH: u8 = 20;
pub const CORRECT_DELTA: i16 = 12;
pub const INCORRECT_DELTA: i16 = -15;

const MIN_WORDS: usize = 2;
const MAX_WORDS: usize = 4;
const DISTRACTOR_COUNT: usize = 3;
const BLANK: &str = "___";

const DEMONSTRATIVES: &[&str] = &["هذا", "هذه", "ذلك", "تلك", "هؤلاء", "اولئك"];
const PREPOSITIONS: &[&str] = &[
    "في", "على", "الى", "عن", "مع", "بين", "تحت", "فوق", "امام", "خلف", "عند", "قبل", "بعد",
];
const QUESTION_WORDS: &[&str] = &["ما", "ماذا", "اين", "كيف", "متى", "لماذا", "هل", "كم", "اي"];
const PRONOUNS: &[&str] = &["انا", "انت", "انتم", "هو", "هي", "نحن", "هم"];
/// "من" reads as "from" or "who".
const MIN_OR_MAN: &str = "من";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollocationType {
    DemonstrativeNoun,
    PrepositionNoun,
    QuestionPattern,
    PronounPredicate,
    /// Possessive construct: bare noun followed by a definite noun.
    Idafa,
    NounAdjective,
}

/// Classifies a phrase from its first one or two words.
pub fn detect_type(words: &[String]) -> CollocationType {
    let normalized: Vec<String> = words.iter().map(|w| arabic::normalize(w)).collect();
    let Some(first) = normalized.first().map(String::as_str) else {
        return CollocationType::NounAdjective;
    };
    let second = normalized.get(1).map(String::as_str);

    if first == MIN_OR_MAN {
        return match second {
            None => CollocationType::QuestionPattern,
            Some(next) if PRONOUNS.contains(&next) || DEMONSTRATIVES.contains(&next) => {
                CollocationType::QuestionPattern
            }
            Some(_) => CollocationType::PrepositionNoun,
        };
    }
    if DEMONSTRATIVES.contains(&first) {
        return CollocationType::DemonstrativeNoun;
    }
    if PREPOSITIONS.contains(&first) {
        return CollocationType::PrepositionNoun;
    }
    if QUESTION_WORDS.contains(&first) {
        return CollocationType::QuestionPattern;
    }
    if PRONOUNS.contains(&first) {
        return CollocationType::PronounPredicate;
    }
    match second {
        Some(next) if !first.starts_with("ال") && next.starts_with("ال") => CollocationType::Idafa,
        _ => CollocationType::NounAdjective,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collocation {
    pub id: String,
    /// Arabic words in reading order, diacritics preserved for display.
    pub words: Vec<String>,
    /// Vocabulary ids of `words`, position for position.
    pub word_ids: Vec<String>,
    pub english: Option<String>,
    pub collocation_type: CollocationType,
}

impl Collocation {
    pub fn new(
        id: &str,
        arabic_text: &str,
        word_ids: Vec<String>,
        english: Option<String>,
    ) -> EngineResult<Self> {
        let words: Vec<String> = arabic_text.split_whitespace().map(str::to_string).collect();

        if !(MIN_WORDS..=MAX_WORDS).contains(&words.len()) {
            return Err(EngineError::InvalidCollocation {
                id: id.to_string(),
                reason: format!("expected {MIN_WORDS}-{MAX_WORDS} words, got {}", words.len()),
            });
        }
        if word_ids.len() != words.len() {
            return Err(EngineError::InvalidCollocation {
                id: id.to_string(),
                reason: format!("{} words but {} word ids", words.len(), word_ids.len()),
            });
        }

        let collocation_type = detect_type(&words);
        Ok(Self {
            id: id.to_string(),
            words,
            word_ids,
            english: english.filter(|e| !e.trim().is_empty()),
            collocation_type,
        })
    }

    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HidePosition {
    First,
    #[default]
    Last,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollocationExerciseKind {
    CompleteMissing,
    Translation,
    MultipleChoice,
}

impl CollocationExerciseKind {
    /// Picking from options is recognition; the rest make the learner produce Arabic.
    pub fn is_production(self) -> bool {
        self != CollocationExerciseKind::MultipleChoice
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollocationExercise {
    CompleteMissing {
        collocation_id: String,
        prompt: String,
        answer: String,
        hidden: HidePosition,
        english: Option<String>,
    },
    Translation {
        collocation_id: String,
        prompt: String,
        answer: String,
    },
    MultipleChoice {
        collocation_id: String,
        prompt: String,
        options: Vec<String>,
        correct_index: usize,
    },
}

impl CollocationExercise {
    pub fn kind(&self) -> CollocationExerciseKind {
        match self {
            CollocationExercise::CompleteMissing { .. } => CollocationExerciseKind::CompleteMissing,
            CollocationExercise::Translation { .. } => CollocationExerciseKind::Translation,
            CollocationExercise::MultipleChoice { .. } => CollocationExerciseKind::MultipleChoice,
        }
    }

    pub fn answer(&self) -> &str {
        match self {
            CollocationExercise::CompleteMissing { answer, .. }
            | CollocationExercise::Translation { answer, .. } => answer,
            CollocationExercise::MultipleChoice {
                options,
                correct_index,
                ..
            } => options.get(*correct_index).map(String::as_str).unwrap_or_default(),
        }
    }
}

fn blanked(words: &[String], hidden_idx: usize) -> String {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| if i == hidden_idx { BLANK } else { w.as_str() })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn complete_missing_exercise(collocation: &Collocation, hide: HidePosition) -> CollocationExercise {
    let hidden_idx = match hide {
        HidePosition::First => 0,
        HidePosition::Last => collocation.words.len().saturating_sub(1),
    };

    CollocationExercise::CompleteMissing {
        collocation_id: collocation.id.clone(),
        prompt: blanked(&collocation.words, hidden_idx),
        answer: collocation.words.get(hidden_idx).cloned().unwrap_or_default(),
        hidden: hide,
        english: collocation.english.clone(),
    }
}

/// English → Arabic; only possible when the collocation has a gloss.
pub fn translation_exercise(collocation: &Collocation) -> Option<CollocationExercise> {
    collocation
        .english
        .as_ref()
        .map(|english| CollocationExercise::Translation {
            collocation_id: collocation.id.clone(),
            prompt: english.clone(),
            answer: collocation.text(),
        })
}

/// Up to three distractors that differ from the answer and from each other
/// once normalized.
fn usable_distractors(answer: &str, distractors: &[String]) -> Vec<String> {
    let answer_key = arabic::normalize(answer);
    let mut picked: Vec<String> = Vec::with_capacity(DISTRACTOR_COUNT);
    for d in distractors {
        let key = arabic::normalize(d);
        if key.is_empty() || key == answer_key || picked.iter().any(|p| arabic::normalize(p) == key) {
            continue;
        }
        picked.push(d.clone());
        if picked.len() == DISTRACTOR_COUNT {
            break;
        }
    }
    picked
}

/// The last word hidden, offered among three distractors in shuffled order.
pub fn multiple_choice_exercise(
    collocation: &Collocation,
    distractors: &[String],
    shuffler: &mut dyn Shuffler,
) -> EngineResult<CollocationExercise> {
    if collocation.words.len() < MIN_WORDS {
        return Err(EngineError::Contract(format!(
            "multiple choice needs a multi-word collocation, '{}' has {} word(s)",
            collocation.id,
            collocation.words.len()
        )));
    }

    let hidden_idx = collocation.words.len() - 1;
    let answer = collocation.words[hidden_idx].clone();

    let picked = usable_distractors(&answer, distractors);
    if picked.len() < DISTRACTOR_COUNT {
        return Err(EngineError::Contract(format!(
            "multiple choice for '{}' needs {DISTRACTOR_COUNT} distinct distractors, got {}",
            collocation.id,
            picked.len()
        )));
    }

    let mut options = vec![answer.clone()];
    options.extend(picked);
    let options = shuffle_vec(shuffler, options);
    let correct_index = options.iter().position(|o| *o == answer).unwrap_or(0);

    Ok(CollocationExercise::MultipleChoice {
        collocation_id: collocation.id.clone(),
        prompt: blanked(&collocation.words, hidden_idx),
        options,
        correct_index,
    })
}

/// Every exercise a collocation supports with the given distractor pool.
/// Multiple choice is left out when the pool has too few distinct distractors.
pub fn generate_exercises(
    collocation: &Collocation,
    distractors: &[String],
    shuffler: &mut dyn Shuffler,
) -> EngineResult<Vec<CollocationExercise>> {
    let mut exercises = vec![complete_missing_exercise(collocation, HidePosition::Last)];
    exercises.extend(translation_exercise(collocation));
    let multiple_choice_possible = collocation.words.len() >= MIN_WORDS
        && collocation
            .words
            .last()
            .is_some_and(|answer| usable_distractors(answer, distractors).len() == DISTRACTOR_COUNT);
    if multiple_choice_possible {
        exercises.push(multiple_choice_exercise(collocation, distractors, shuffler)?);
    }
    Ok(exercises)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum AnswerVerdict {
    Correct,
    WordOrder,
    Partial { matched: usize, total: usize },
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCheck {
    pub correct: bool,
    pub verdict: AnswerVerdict,
    pub feedback: Option<String>,
}

impl AnswerCheck {
    fn incorrect() -> Self {
        Self {
            correct: false,
            verdict: AnswerVerdict::Incorrect,
            feedback: None,
        }
    }
}

/// Grades a typed answer, ignoring diacritics and punctuation.
pub fn check_answer(user_answer: &str, expected: &str) -> AnswerCheck {
    let given = arabic::words(user_answer);
    let wanted = arabic::words(expected);

    if given.is_empty() || wanted.is_empty() {
        return AnswerCheck::incorrect();
    }
    if given == wanted {
        return AnswerCheck {
            correct: true,
            verdict: AnswerVerdict::Correct,
            feedback: None,
        };
    }

    let mut given_sorted = given.clone();
    given_sorted.sort();
    let mut wanted_sorted = wanted.clone();
    wanted_sorted.sort();
    if given_sorted == wanted_sorted {
        return AnswerCheck {
            correct: false,
            verdict: AnswerVerdict::WordOrder,
            feedback: Some("All the words are right, but the word order is wrong.".to_string()),
        };
    }

    let mut pool = given;
    let matched = wanted
        .iter()
        .filter(|w| match pool.iter().position(|g| g == *w) {
            Some(idx) => {
                pool.swap_remove(idx);
                true
            }
            None => false,
        })
        .count();

    let total = wanted.len();
    if matched > 0 && matched < total {
        return AnswerCheck {
            correct: false,
            verdict: AnswerVerdict::Partial { matched, total },
            feedback: Some(format!("{matched} of {total} words are correct.")),
        };
    }
    AnswerCheck::incorrect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollocationMastery {
    pub strength: u8,
    pub times_correct: u32,
    pub times_incorrect: u32,
    /// Set by the first correct production answer and never cleared.
    pub can_produce: bool,
    pub last_practiced: Option<DateTime<Utc>>,
}

impl CollocationMastery {
    pub fn record(&self, correct: bool, kind: CollocationExerciseKind, now: DateTime<Utc>) -> Self {
        let delta = if correct { CORRECT_DELTA } else { INCORRECT_DELTA };
        let mut next = self.clone();
        next.strength = (self.strength as i16 + delta).clamp(0, 100) as u8;
        if correct {
            next.times_correct += 1;
            next.can_produce |= kind.is_production();
        } else {
            next.times_incorrect += 1;
        }
        next.last_practiced = Some(now);
        next
    }
}

/// True when every word of the collocation is known well enough on its own.
/// Words with no recorded strength count as 0.
pub fn is_eligible(collocation: &Collocation, word_strength: &dyn Fn(&str) -> Option<u8>) -> bool {
    collocation
        .word_ids
        .iter()
        .all(|id| word_strength(id).unwrap_or(0) >= MIN_COMPONENT_STRENGTH)
}

pub fn select_for_practice<'a>(
    collocations: impl IntoIterator<Item = &'a Collocation>,
    word_strength: &dyn Fn(&str) -> Option<u8>,
    limit: usize,
    shuffler: &mut dyn Shuffler,
) -> Vec<&'a Collocation> {
    let eligible: Vec<&Collocation> = collocations
        .into_iter()
        .filter(|c| is_eligible(c, word_strength))
        .collect();

    let mut selected = shuffle_vec(shuffler, eligible);
    selected.truncate(limit);
    selected
}

/// Collocations by id and by component word, owned by one engine instance.
#[derive(Clone, Debug, Default)]
pub struct CollocationIndex {
    by_id: HashMap<String, Collocation>,
    by_word: HashMap<String, Vec<String>>,
    order: Vec<String>,
}

impl CollocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_collocations(collocations: impl IntoIterator<Item = Collocation>) -> Self {
        let mut index = Self::new();
        for c in collocations {
            index.insert(c);
        }
        index
    }

    /// Adds or replaces a collocation.
    pub fn insert(&mut self, collocation: Collocation) {
        if let Some(previous) = self.by_id.remove(&collocation.id) {
            for word_id in &previous.word_ids {
                if let Some(ids) = self.by_word.get_mut(word_id) {
                    ids.retain(|id| *id != previous.id);
                }
            }
        } else {
            self.order.push(collocation.id.clone());
        }

        for word_id in &collocation.word_ids {
            let ids = self.by_word.entry(word_id.clone()).or_default();
            if !ids.contains(&collocation.id) {
                ids.push(collocation.id.clone());
            }
        }
        self.by_id.insert(collocation.id.clone(), collocation);
    }

    pub fn get(&self, id: &str) -> Option<&Collocation> {
        self.by_id.get(id)
    }

    pub fn for_word(&self, word_id: &str) -> Vec<&Collocation> {
        self.by_word
            .get(word_id)
            .map(|ids| ids.iter().filter_map(|id| self.by_id.get(id)).collect())
            .unwrap_or_default()
    }

    /// Collocations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Collocation> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shuffle::{IdentityShuffle, RandomShuffle};
    use chrono::TimeZone;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("w{i}")).collect()
    }

    fn colloc(arabic_text: &str, english: Option<&str>) -> Collocation {
        let n = arabic_text.split_whitespace().count();
        Collocation::new("c1", arabic_text, ids(n), english.map(str::to_string)).unwrap()
    }

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn distractors() -> Vec<String> {
        words("قَلَمٌ بَابٌ بَيْتٌ")
    }

    #[test]
    fn test_new_rejects_bad_sizes() {
        assert!(Collocation::new("c", "كِتَابٌ", ids(1), None).is_err());
        assert!(Collocation::new("c", "a b c d e", ids(5), None).is_err());
        assert!(Collocation::new("c", "هَذَا كِتَابٌ", ids(1), None).is_err());
        assert!(Collocation::new("c", "هَذَا كِتَابٌ", ids(2), Some("  ".into())).unwrap().english.is_none());
    }

    #[test]
    fn test_detect_type() {
        assert_eq!(detect_type(&words("هَذَا كِتَابٌ")), CollocationType::DemonstrativeNoun);
        assert_eq!(detect_type(&words("فِي البَيْتِ")), CollocationType::PrepositionNoun);
        assert_eq!(detect_type(&words("إِلَى المَدْرَسَةِ")), CollocationType::PrepositionNoun);
        assert_eq!(detect_type(&words("أَيْنَ الكِتَابُ")), CollocationType::QuestionPattern);
        assert_eq!(detect_type(&words("أَنَا طَالِبٌ")), CollocationType::PronounPredicate);
        assert_eq!(detect_type(&words("بَابُ البَيْتِ")), CollocationType::Idafa);
        assert_eq!(detect_type(&words("البَيْتُ الكَبِيرُ")), CollocationType::NounAdjective);
        assert_eq!(detect_type(&words("بَيْتٌ كَبِيرٌ")), CollocationType::NounAdjective);
    }

    #[test]
    fn test_detect_type_disambiguates_min() {
        assert_eq!(detect_type(&words("مَنْ هُوَ")), CollocationType::QuestionPattern);
        assert_eq!(detect_type(&words("مَنْ هَذَا")), CollocationType::QuestionPattern);
        assert_eq!(detect_type(&words("مِنَ البَيْتِ")), CollocationType::PrepositionNoun);
        assert_eq!(detect_type(&words("مِنْ")), CollocationType::QuestionPattern);
    }

    #[test]
    fn test_complete_missing_hides_last_by_default() {
        let c = colloc("فِي البَيْتِ الكَبِيرِ", Some("in the big house"));
        let CollocationExercise::CompleteMissing { prompt, answer, .. } =
            complete_missing_exercise(&c, HidePosition::default())
        else {
            panic!("wrong exercise kind");
        };
        assert_eq!(prompt, "فِي البَيْتِ ___");
        assert_eq!(answer, "الكَبِيرِ");

        let first = complete_missing_exercise(&c, HidePosition::First);
        assert_eq!(first.answer(), "فِي");
    }

    #[test]
    fn test_translation_requires_gloss() {
        assert!(translation_exercise(&colloc("هَذَا كِتَابٌ", None)).is_none());
        let ex = translation_exercise(&colloc("هَذَا كِتَابٌ", Some("this is a book"))).unwrap();
        assert_eq!(ex.answer(), "هَذَا كِتَابٌ");
        assert!(ex.kind().is_production());
    }

    #[test]
    fn test_generate_exercises() {
        let c = colloc("هَذَا كِتَابٌ", Some("this is a book"));
        let all = generate_exercises(&c, &distractors(), &mut IdentityShuffle).unwrap();
        let kinds: Vec<_> = all.iter().map(CollocationExercise::kind).collect();
        assert_eq!(
            kinds,
            vec![
                CollocationExerciseKind::CompleteMissing,
                CollocationExerciseKind::Translation,
                CollocationExerciseKind::MultipleChoice
            ]
        );

        let without = generate_exercises(&c, &words("قَلَمٌ بَابٌ"), &mut IdentityShuffle).unwrap();
        assert_eq!(without.len(), 2);
    }

    #[test]
    fn test_generate_exercises_skips_multiple_choice_on_thin_pool() {
        let c = colloc("هَذَا كِتَابٌ", None);
        // four entries, but only one distinct word besides the answer
        let pool = words("كتاب كِتَابٌ البَيْتِ البيت");
        let exercises = generate_exercises(&c, &pool, &mut IdentityShuffle).unwrap();
        let kinds: Vec<_> = exercises.iter().map(CollocationExercise::kind).collect();
        assert_eq!(kinds, vec![CollocationExerciseKind::CompleteMissing]);

        // asked for directly, the same pool is still a caller error
        let err = multiple_choice_exercise(&c, &pool, &mut IdentityShuffle).unwrap_err();
        assert!(matches!(err, EngineError::Contract(_)));
    }

    #[test]
    fn test_multiple_choice_on_single_word_is_contract_error() {
        let mut c = colloc("هَذَا كِتَابٌ", None);
        c.words.truncate(1);
        let err = multiple_choice_exercise(&c, &distractors(), &mut IdentityShuffle).unwrap_err();
        assert!(matches!(err, EngineError::Contract(_)));
    }

    #[test]
    fn test_multiple_choice_skips_answer_among_distractors() {
        let c = colloc("هَذَا كِتَابٌ", None);
        let pool = words("كتاب قَلَمٌ بَابٌ بَيْتٌ");
        let ex = multiple_choice_exercise(&c, &pool, &mut IdentityShuffle).unwrap();
        let CollocationExercise::MultipleChoice { options, correct_index, .. } = ex else {
            panic!("wrong exercise kind");
        };
        assert_eq!(options.len(), 4);
        assert_eq!(options[correct_index], "كِتَابٌ");
        assert_eq!(options.iter().filter(|o| arabic::normalize(o) == "كتاب").count(), 1);
    }

    #[test]
    fn test_multiple_choice_shuffle_is_not_order_preserving() {
        let c = colloc("هَذَا كِتَابٌ", None);
        let mut positions = [0usize; 4];
        let mut shuffler = RandomShuffle;
        for _ in 0..400 {
            let ex = multiple_choice_exercise(&c, &distractors(), &mut shuffler).unwrap();
            if let CollocationExercise::MultipleChoice { correct_index, .. } = ex {
                positions[correct_index] += 1;
            }
        }
        // each slot expects ~100 hits; 40 is far outside chance for a uniform shuffle
        for count in positions {
            assert!(count > 40, "correct option position is skewed: {positions:?}");
        }
    }

    #[test]
    fn test_check_answer_word_order() {
        let result = check_answer("كِتَابٌ هَذَا", "هَذَا كِتَابٌ");
        assert!(!result.correct);
        assert_eq!(result.verdict, AnswerVerdict::WordOrder);
        assert!(result.feedback.unwrap().contains("word order"));
    }

    #[test]
    fn test_check_answer_ignores_diacritics() {
        let result = check_answer("هذا كتاب", "هَذَا كِتَابٌ");
        assert!(result.correct);
        assert_eq!(result.verdict, AnswerVerdict::Correct);
    }

    #[test]
    fn test_check_answer_partial_and_wrong() {
        let partial = check_answer("فِي المَدْرَسَةِ", "فِي البَيْتِ");
        assert_eq!(partial.verdict, AnswerVerdict::Partial { matched: 1, total: 2 });
        assert_eq!(partial.feedback.as_deref(), Some("1 of 2 words are correct."));

        let wrong = check_answer("قَلَمٌ", "هَذَا كِتَابٌ");
        assert_eq!(wrong, AnswerCheck::incorrect());

        let empty = check_answer("   ", "هَذَا كِتَابٌ");
        assert!(!empty.correct && empty.feedback.is_none());
    }

    #[test]
    fn test_mastery_record_and_sticky_can_produce() {
        let now = Utc.with_ymd_and_hms(2024, 2, 2, 8, 0, 0).unwrap();
        let m = CollocationMastery::default();

        let m = m.record(true, CollocationExerciseKind::MultipleChoice, now);
        assert_eq!(m.strength, 12);
        assert!(!m.can_produce);

        let m = m.record(true, CollocationExerciseKind::CompleteMissing, now);
        assert_eq!(m.strength, 24);
        assert!(m.can_produce);

        let m = m.record(false, CollocationExerciseKind::Translation, now);
        assert_eq!(m.strength, 9);
        assert!(m.can_produce);
        assert_eq!((m.times_correct, m.times_incorrect), (2, 1));

        let m = m.record(false, CollocationExerciseKind::Translation, now);
        assert_eq!(m.strength, 0);
        assert_eq!(m.last_practiced, Some(now));
    }

    #[test]
    fn test_selection_requires_every_component() {
        let strong = Collocation::new("a", "هَذَا كِتَابٌ", vec!["this".into(), "book".into()], None).unwrap();
        let mixed = Collocation::new("b", "فِي البَيْتِ", vec!["in".into(), "house".into()], None).unwrap();
        let unknown = Collocation::new("c", "بَيْتٌ كَبِيرٌ", vec!["house2".into(), "big".into()], None).unwrap();
        let all = vec![strong, mixed, unknown];

        let strengths: HashMap<&str, u8> =
            HashMap::from([("this", 60), ("book", 20), ("in", 95), ("house", 19), ("big", 80)]);
        let lookup = |id: &str| strengths.get(id).copied();

        let picked = select_for_practice(&all, &lookup, 10, &mut IdentityShuffle);
        let picked_ids: Vec<&str> = picked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(picked_ids, vec!["a"]);
    }

    #[test]
    fn test_selection_is_capped() {
        let all: Vec<Collocation> = (0..6)
            .map(|i| Collocation::new(&format!("c{i}"), "هَذَا كِتَابٌ", ids(2), None).unwrap())
            .collect();
        let lookup = |_: &str| Some(50u8);
        assert_eq!(select_for_practice(&all, &lookup, 4, &mut RandomShuffle).len(), 4);
        assert!(select_for_practice(&all, &lookup, 0, &mut RandomShuffle).is_empty());
    }

    #[test]
    fn test_index_by_word_and_replace() {
        let a = Collocation::new("a", "هَذَا كِتَابٌ", vec!["this".into(), "book".into()], None).unwrap();
        let b = Collocation::new("b", "كِتَابٌ كَبِيرٌ", vec!["book".into(), "big".into()], None).unwrap();
        let mut index = CollocationIndex::from_collocations([a, b]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.for_word("book").len(), 2);

        let a2 = Collocation::new("a", "هَذَا بَيْتٌ", vec!["this".into(), "house".into()], None).unwrap();
        index.insert(a2);
        assert_eq!(index.len(), 2);
        assert_eq!(index.for_word("book").len(), 1);
        assert_eq!(index.for_word("house")[0].id, "a");
        let order: Vec<&str> = index.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }
}
