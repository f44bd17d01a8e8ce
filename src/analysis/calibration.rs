//! Confidence calibration: does the learner's self-rated confidence match
//! how often they are actually right?

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fewer records than this and no tendency is reported.
pub const MIN_SAMPLES: usize = 10;
/// Each half of the log needs this many records for a trend.
const MIN_TREND_SAMPLES: usize = 5;
/// Mean (actual - expected) beyond this marks a tendency.
const BIAS_TOLERANCE: f64 = 0.10;
/// Score points between halves that count as a change.
const TREND_TOLERANCE: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ConfidenceLevel {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl ConfidenceLevel {
    pub const ALL: [ConfidenceLevel; 3] =
        [ConfidenceLevel::Low, ConfidenceLevel::Medium, ConfidenceLevel::High];

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(ConfidenceLevel::Low),
            2 => Some(ConfidenceLevel::Medium),
            3 => Some(ConfidenceLevel::High),
            _ => None,
        }
    }

    /// Accuracy a well-calibrated learner shows at this confidence.
    pub fn expected_accuracy(self) -> f64 {
        match self {
            ConfidenceLevel::Low => 0.50,
            ConfidenceLevel::Medium => 0.75,
            ConfidenceLevel::High => 0.90,
        }
    }
}

impl TryFrom<u8> for ConfidenceLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or_else(|| format!("confidence level must be 1-3, got {value}"))
    }
}

impl From<ConfidenceLevel> for u8 {
    fn from(level: ConfidenceLevel) -> u8 {
        level as u8
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationRecord {
    pub confidence_level: ConfidenceLevel,
    pub was_correct: bool,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalibrationTendency {
    WellCalibrated,
    Overconfident,
    Underconfident,
    InsufficientData,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationTrend {
    Improving,
    Stable,
    Declining,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCalibration {
    pub level: ConfidenceLevel,
    pub count: usize,
    pub correct: usize,
    /// `None` when no answer was given at this level.
    pub actual_accuracy: Option<f64>,
    pub expected_accuracy: f64,
    /// actual - expected; negative means overconfident at this level.
    pub difference: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationStats {
    pub total: usize,
    pub levels: Vec<LevelCalibration>,
    /// 0-100, 100 = accuracy matches confidence at every level.
    pub score: Option<f64>,
    /// Answer-weighted mean of the per-level differences.
    pub bias: Option<f64>,
    pub tendency: CalibrationTendency,
    pub trend: CalibrationTrend,
}

fn level_breakdown(records: &[CalibrationRecord]) -> Vec<LevelCalibration> {
    ConfidenceLevel::ALL
        .iter()
        .map(|&level| {
            let (count, correct) = records
                .iter()
                .filter(|r| r.confidence_level == level)
                .fold((0, 0), |(n, c), r| (n + 1, c + r.was_correct as usize));
            let actual = (count > 0).then(|| correct as f64 / count as f64);

            LevelCalibration {
                level,
                count,
                correct,
                actual_accuracy: actual,
                expected_accuracy: level.expected_accuracy(),
                difference: actual.map(|a| a - level.expected_accuracy()),
            }
        })
        .collect()
}

/// (score, bias) over the levels that have answers.
fn score_and_bias(levels: &[LevelCalibration]) -> Option<(f64, f64)> {
    let total: usize = levels.iter().map(|l| l.count).sum();
    if total == 0 {
        return None;
    }
    let (abs_sum, signed_sum) = levels
        .iter()
        .filter_map(|l| l.difference.map(|d| (l.count as f64, d)))
        .fold((0.0, 0.0), |(a, s), (n, d)| (a + n * d.abs(), s + n * d));

    let total = total as f64;
    let score = (100.0 * (1.0 - abs_sum / total)).clamp(0.0, 100.0);
    Some((score, signed_sum / total))
}

pub fn calibration_score(records: &[CalibrationRecord]) -> Option<f64> {
    score_and_bias(&level_breakdown(records)).map(|(score, _)| score)
}

/// Compares the newer half of the log (records are oldest first) with the older half.
pub fn calibration_trend(records: &[CalibrationRecord]) -> CalibrationTrend {
    let mid = records.len() / 2;
    let (older, newer) = records.split_at(mid);
    if older.len() < MIN_TREND_SAMPLES || newer.len() < MIN_TREND_SAMPLES {
        return CalibrationTrend::Stable;
    }

    match (calibration_score(older), calibration_score(newer)) {
        (Some(before), Some(after)) if after - before > TREND_TOLERANCE => CalibrationTrend::Improving,
        (Some(before), Some(after)) if before - after > TREND_TOLERANCE => CalibrationTrend::Declining,
        _ => CalibrationTrend::Stable,
    }
}

pub fn analyze(records: &[CalibrationRecord]) -> CalibrationStats {
    let levels = level_breakdown(records);
    let summary = score_and_bias(&levels);

    let tendency = match summary {
        _ if records.len() < MIN_SAMPLES => CalibrationTendency::InsufficientData,
        None => CalibrationTendency::InsufficientData,
        Some((_, bias)) if bias < -BIAS_TOLERANCE => CalibrationTendency::Overconfident,
        Some((_, bias)) if bias > BIAS_TOLERANCE => CalibrationTendency::Underconfident,
        Some(_) => CalibrationTendency::WellCalibrated,
    };

    CalibrationStats {
        total: records.len(),
        levels,
        score: summary.map(|(score, _)| score),
        bias: summary.map(|(_, bias)| bias),
        tendency,
        trend: calibration_trend(records),
    }
}
