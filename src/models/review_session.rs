//! Multi-round review over due items.
//! Items graded below 3 come back in the next round until every item passes.

use crate::engine::{DueItem, MasteryEngine};
use crate::error::EngineResult;
use crate::models::review_state::ReviewState;

const PASSING_QUALITY: u8 = 3;

#[derive(Clone, Debug)]
pub struct SessionItem {
    pub item_id: String,
    pub review: ReviewState,
    /// Passed in the current round.
    pub passed: bool,
}

/// Walks through items in review-priority order, one round at a time.
#[derive(Clone, Debug)]
pub struct ReviewSession {
    items: Vec<SessionItem>,
    current_round: Vec<usize>,
    current_index: usize,
    round_number: usize,
}

impl ReviewSession {
    /// Session over everything the engine reports as due.
    pub fn start(engine: &MasteryEngine) -> EngineResult<Self> {
        Ok(Self::from_due_items(engine.due_items()?))
    }

    pub fn from_due_items(due: Vec<DueItem>) -> Self {
        let items: Vec<SessionItem> = due
            .into_iter()
            .map(|d| SessionItem {
                item_id: d.item_id,
                review: d.review,
                passed: false,
            })
            .collect();
        let current_round = (0..items.len()).collect();

        Self {
            items,
            current_round,
            current_index: 0,
            round_number: 1,
        }
    }

    pub fn current_item(&self) -> Option<&SessionItem> {
        self.current_round
            .get(self.current_index)
            .and_then(|&idx| self.items.get(idx))
    }

    /// Grades the current item through the engine's SM-2 path and moves on.
    pub fn grade_current(&mut self, engine: &MasteryEngine, quality: u8) -> EngineResult<()> {
        let Some(&idx) = self.current_round.get(self.current_index) else {
            return Ok(());
        };
        if let Some(item) = self.items.get_mut(idx) {
            item.review = engine.record_review(&item.item_id, quality)?;
            item.passed = quality >= PASSING_QUALITY;
        }
        self.advance();
        Ok(())
    }

    fn advance(&mut self) {
        if self.current_index + 1 < self.current_round.len() {
            self.current_index += 1;
        } else {
            self.start_next_round();
        }
    }

    /// Keeps the items that failed this round; an empty list ends the session.
    fn start_next_round(&mut self) {
        let failed: Vec<usize> = self
            .current_round
            .iter()
            .copied()
            .filter(|&idx| self.items.get(idx).is_some_and(|item| !item.passed))
            .collect();

        self.current_index = 0;
        if failed.is_empty() {
            self.current_round.clear();
            return;
        }

        self.round_number += 1;
        log::debug!("review round {}: {} item(s) to retry", self.round_number, failed.len());
        self.current_round = failed;
    }

    pub fn round_number(&self) -> usize {
        self.round_number
    }

    pub fn remaining_count(&self) -> usize {
        self.current_round.len().saturating_sub(self.current_index)
    }

    pub fn is_completed(&self) -> bool {
        self.current_round.is_empty()
    }

    pub fn items(&self) -> &[SessionItem] {
        &self.items
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round 1: {} items", self.current_round.len())
        } else {
            format!(
                "Round {} (retry): {} items",
                self.round_number,
                self.current_round.len()
            )
        }
    }
}
