//! Per-item log of where and when a word was seen.
//!
//! Independent of strength: it answers "has this item been met often enough",
//! e.g. before a word is allowed into harder exercise types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAP: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Exercise,
    Flashcard,
    Reading,
    Listening,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub timestamp: DateTime<Utc>,
    pub source_type: SourceType,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterCounts {
    pub exercise: u32,
    pub flashcard: u32,
    pub reading: u32,
    pub listening: u32,
}

impl EncounterCounts {
    pub fn get(&self, source: SourceType) -> u32 {
        match source {
            SourceType::Exercise => self.exercise,
            SourceType::Flashcard => self.flashcard,
            SourceType::Reading => self.reading,
            SourceType::Listening => self.listening,
        }
    }

    fn bump(&mut self, source: SourceType, by: u32) {
        let slot = match source {
            SourceType::Exercise => &mut self.exercise,
            SourceType::Flashcard => &mut self.flashcard,
            SourceType::Reading => &mut self.reading,
            SourceType::Listening => &mut self.listening,
        };
        *slot = slot.saturating_add(by);
    }
}

/// Most-recent-first, capped history plus lifetime counts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncounterLog {
    pub history: VecDeque<Encounter>,
    pub by_source: EncounterCounts,
    pub total: u32,
}

impl EncounterLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds counts without history, as when only legacy counters are known.
    pub fn from_counts(source: SourceType, count: u32) -> Self {
        let mut log = Self::new();
        log.by_source.bump(source, count);
        log.total = count;
        log
    }

    pub fn record(&mut self, source: SourceType, now: DateTime<Utc>, cap: usize) {
        self.history.push_front(Encounter {
            timestamp: now,
            source_type: source,
        });
        self.history.truncate(cap);

        self.by_source.bump(source, 1);
        self.total = self.total.saturating_add(1);
    }

    pub fn has_seen_at_least(&self, times: u32) -> bool {
        self.total >= times
    }

    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.history.front().map(|e| e.timestamp)
    }
}
