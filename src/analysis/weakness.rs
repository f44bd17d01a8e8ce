//! Error-pattern detection across exercise mistakes.
//!
//! Errors are grouped by linguistic category; each category gets a severity
//! from how often it occurs and a trend from the last week against the week
//! before. The ranked list drives targeted practice.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Below this many recorded errors the report carries no top weaknesses.
pub const MIN_ERRORS: usize = 5;
pub const DEFAULT_TOP_COUNT: usize = 3;

const SEVERE_COUNT: usize = 8;
const MODERATE_COUNT: usize = 4;
const TREND_WINDOW_DAYS: i64 = 7;
const IMPROVING_RATIO: f64 = 0.75;
const WORSENING_RATIO: f64 = 1.25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Vocabulary,
    Spelling,
    Diacritics,
    GenderAgreement,
    DefiniteArticle,
    CaseEnding,
    WordOrder,
    Preposition,
    VerbConjugation,
    PluralForm,
    Pronoun,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 11] = [
        ErrorCategory::Vocabulary,
        ErrorCategory::Spelling,
        ErrorCategory::Diacritics,
        ErrorCategory::GenderAgreement,
        ErrorCategory::DefiniteArticle,
        ErrorCategory::CaseEnding,
        ErrorCategory::WordOrder,
        ErrorCategory::Preposition,
        ErrorCategory::VerbConjugation,
        ErrorCategory::PluralForm,
        ErrorCategory::Pronoun,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Vocabulary => "vocabulary",
            ErrorCategory::Spelling => "spelling",
            ErrorCategory::Diacritics => "diacritics",
            ErrorCategory::GenderAgreement => "gender_agreement",
            ErrorCategory::DefiniteArticle => "definite_article",
            ErrorCategory::CaseEnding => "case_ending",
            ErrorCategory::WordOrder => "word_order",
            ErrorCategory::Preposition => "preposition",
            ErrorCategory::VerbConjugation => "verb_conjugation",
            ErrorCategory::PluralForm => "plural_form",
            ErrorCategory::Pronoun => "pronoun",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaknessRecord {
    pub error_category: ErrorCategory,
    pub timestamp: DateTime<Utc>,
    pub affected_item_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn from_count(count: usize) -> Self {
        if count >= SEVERE_COUNT {
            Severity::Severe
        } else if count >= MODERATE_COUNT {
            Severity::Moderate
        } else {
            Severity::Mild
        }
    }

    fn weight(self) -> f64 {
        match self {
            Severity::Mild => 1.0,
            Severity::Moderate => 1.5,
            Severity::Severe => 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaknessTrend {
    Improving,
    Stable,
    Worsening,
}

impl WeaknessTrend {
    /// Compares error counts of the recent window with the window before it.
    pub fn from_windows(recent: usize, older: usize) -> Self {
        match (recent, older) {
            (0, 0) => WeaknessTrend::Stable,
            (_, 0) => WeaknessTrend::Worsening,
            _ if (recent as f64) < older as f64 * IMPROVING_RATIO => WeaknessTrend::Improving,
            _ if (recent as f64) > older as f64 * WORSENING_RATIO => WeaknessTrend::Worsening,
            _ => WeaknessTrend::Stable,
        }
    }

    fn weight(self) -> f64 {
        match self {
            WeaknessTrend::Improving => 0.75,
            WeaknessTrend::Stable => 1.0,
            WeaknessTrend::Worsening => 1.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWeakness {
    pub category: ErrorCategory,
    pub count: usize,
    /// Share of all recorded errors, 0-1.
    pub frequency: f64,
    pub severity: Severity,
    pub trend: WeaknessTrend,
    pub priority: f64,
    /// Distinct items that produced this error, most recent first.
    pub affected_items: Vec<String>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaknessReport {
    pub has_enough_data: bool,
    pub total_errors: usize,
    /// Every category with at least one error, highest priority first.
    pub categories: Vec<CategoryWeakness>,
    pub top_weaknesses: Vec<CategoryWeakness>,
}

pub fn analyze(records: &[WeaknessRecord], now: DateTime<Utc>, top_count: usize) -> WeaknessReport {
    let total = records.len();
    let window = Duration::days(TREND_WINDOW_DAYS);

    let mut grouped: HashMap<ErrorCategory, Vec<&WeaknessRecord>> = HashMap::new();
    for record in records {
        grouped.entry(record.error_category).or_default().push(record);
    }
    for group in grouped.values_mut() {
        group.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }

    let mut categories: Vec<CategoryWeakness> = ErrorCategory::ALL
        .iter()
        .filter_map(|category| grouped.get(category).map(|group| (*category, group)))
        .map(|(category, group)| {
            let recent = group.iter().filter(|r| now - r.timestamp < window).count();
            let older = group
                .iter()
                .filter(|r| {
                    let age = now - r.timestamp;
                    age >= window && age < window * 2
                })
                .count();

            let mut affected_items: Vec<String> = Vec::new();
            for r in group.iter() {
                if !affected_items.contains(&r.affected_item_id) {
                    affected_items.push(r.affected_item_id.clone());
                }
            }

            let count = group.len();
            let severity = Severity::from_count(count);
            let trend = WeaknessTrend::from_windows(recent, older);

            CategoryWeakness {
                category,
                count,
                frequency: count as f64 / total as f64,
                severity,
                trend,
                priority: count as f64 * severity.weight() * trend.weight(),
                affected_items,
                last_seen: group[0].timestamp,
            }
        })
        .collect();

    // stable: equal priority and count keep category order
    categories.sort_by(|a, b| {
        b.priority
            .partial_cmp(&a.priority)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.count.cmp(&a.count))
    });

    let has_enough_data = total >= MIN_ERRORS;
    let top_weaknesses = if has_enough_data {
        categories.iter().take(top_count).cloned().collect()
    } else {
        Vec::new()
    };

    WeaknessReport {
        has_enough_data,
        total_errors: total,
        categories,
        top_weaknesses,
    }
}
