//! SM-2 (SuperMemo 2) spaced repetition algorithm implementation.
//!
//! The SM-2 algorithm calculates optimal review intervals based on recall quality:
//! - Each item has an ease factor (EF) that adjusts based on performance
//! - Quality grades 0-2: repetitions reset and the item comes back the next day
//! - Quality grades 3-5: Increase interval progressively (1 day → 6 days → EF multiplier)
//! - EF is adjusted after each review and has a minimum value of 1.3
//!
//! Besides the update rule this module answers the scheduling questions callers
//! ask about a state: is it due, how late is it, and how much of it is likely
//! still remembered.

use super::review_state::{MIN_EASE_FACTOR, ReviewState};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
/// Longest interval ever scheduled, about a century.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Calculates the next review state according to the SM-2 algorithm.
/// quality: 0-5 (0 = complete blackout, 5 = perfect response). Values above 5
/// are clamped to 5 and graded as a perfect response.
///
/// Intervals are capped at [`MAX_INTERVAL_DAYS`].
pub fn advance(state: &ReviewState, quality: u8, now: DateTime<Utc>) -> ReviewState {
    let quality = quality.min(5); // Clamp to 0-5

    let q = quality as f64;
    let new_ef = (state.ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02)))
        .max(MIN_EASE_FACTOR);

    let (new_interval, new_repetitions) = if quality < 3 {
        // Lapse: start over, but see the item again tomorrow
        (1, 0)
    } else {
        let new_reps = state.repetitions + 1;
        let new_int = match new_reps {
            1 => 1,
            2 => 6,
            _ => (state.interval as f64 * new_ef)
                .round()
                .min(MAX_INTERVAL_DAYS as f64) as u32,
        };
        (new_int, new_reps)
    };

    ReviewState {
        ease_factor: new_ef,
        interval: new_interval,
        repetitions: new_repetitions,
        next_review_date: now
            .checked_add_signed(Duration::days(new_interval as i64))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
        last_review: Some(now),
    }
}

pub fn is_due(state: &ReviewState, now: DateTime<Utc>) -> bool {
    state.next_review_date <= now
}

/// Whole days past the due date (floored), 0 when not yet due.
pub fn days_overdue(state: &ReviewState, now: DateTime<Utc>) -> i64 {
    let late = (now - state.next_review_date).num_seconds();
    late.div_euclid(SECONDS_PER_DAY).max(0)
}

/// Whole days until the due date (ceiled), 0 when already due.
pub fn days_until_review(state: &ReviewState, now: DateTime<Utc>) -> i64 {
    let ahead = (state.next_review_date - now).num_seconds();
    if ahead <= 0 {
        return 0;
    }
    (ahead + SECONDS_PER_DAY - 1).div_euclid(SECONDS_PER_DAY)
}

/// Exponential forgetting estimate `R = exp(-overdue / (interval * EF))`.
///
/// Items that are not overdue are assumed fully retained. Lateness is measured
/// in fractional days so that any overdue state lands strictly below 1.
pub fn estimate_retention(state: &ReviewState, now: DateTime<Utc>) -> f64 {
    if now <= state.next_review_date {
        return 1.0;
    }
    let overdue_days =
        (now - state.next_review_date).num_milliseconds() as f64 / (SECONDS_PER_DAY * 1000) as f64;
    let stability = state.interval.max(1) as f64 * state.ease_factor;

    (-overdue_days / stability).exp().clamp(0.0, 1.0)
}

/// Anything that carries an SM-2 state can be put in a review queue.
pub trait Reviewable {
    fn review_state(&self) -> &ReviewState;
}

impl Reviewable for ReviewState {
    fn review_state(&self) -> &ReviewState {
        self
    }
}

/// Orders items for review: most overdue first, then lowest estimated retention.
///
/// Returns a new ordering of references; the input slice is left untouched and
/// ties keep their original relative order.
pub fn sort_by_review_priority<'a, T: Reviewable>(items: &'a [T], now: DateTime<Utc>) -> Vec<&'a T> {
    let mut keyed: Vec<(i64, f64, &T)> = items
        .iter()
        .map(|item| {
            let state = item.review_state();
            (days_overdue(state, now), estimate_retention(state, now), item)
        })
        .collect();

    keyed.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
    });

    keyed.into_iter().map(|(_, _, item)| item).collect()
}

/// Maps a plain correct/incorrect outcome to an SM-2 quality.
pub fn quality_from_outcome(correct: bool, was_hard: bool) -> u8 {
    match (correct, was_hard) {
        (false, _) => 1,
        (true, true) => 3,
        (true, false) => 4,
    }
}

/// Four-button self rating shown after a flashcard is revealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewRating {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewRating {
    pub fn quality(self) -> u8 {
        match self {
            ReviewRating::Again => 1,
            ReviewRating::Hard => 3,
            ReviewRating::Good => 4,
            ReviewRating::Easy => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn state_with(ease: f64, interval: u32, repetitions: u32) -> ReviewState {
        ReviewState {
            ease_factor: ease,
            interval,
            repetitions,
            next_review_date: start(),
            last_review: None,
        }
    }

    #[test]
    fn test_first_review() {
        let next = advance(&ReviewState::new(start()), 4, start());
        assert_eq!(next.interval, 1);
        assert_eq!(next.repetitions, 1);
        assert_eq!(next.next_review_date, start() + Duration::days(1));
        assert_eq!(next.last_review, Some(start()));
    }

    #[test]
    fn test_second_review() {
        let next = advance(&state_with(2.5, 1, 1), 4, start());
        assert_eq!(next.interval, 6);
        assert_eq!(next.repetitions, 2);
    }

    #[test]
    fn test_third_review_multiplies_by_ease() {
        let next = advance(&state_with(2.5, 6, 2), 4, start());
        assert_eq!(next.repetitions, 3);
        assert_eq!(next.interval, 15);
    }

    #[test]
    fn test_quality_below_3_resets() {
        let next = advance(&state_with(2.5, 10, 5), 2, start());
        assert_eq!(next.interval, 1);
        assert_eq!(next.repetitions, 0);
        // EF should still be updated
        assert!(next.ease_factor < 2.5);
    }

    #[test]
    fn test_ease_change_by_quality() {
        let base = state_with(2.5, 6, 2);
        assert!((advance(&base, 4, start()).ease_factor - 2.5).abs() < 1e-9);
        assert!(advance(&base, 5, start()).ease_factor > 2.5);
        assert!(advance(&base, 3, start()).ease_factor < 2.5);
        assert!(advance(&base, 2, start()).ease_factor < advance(&base, 3, start()).ease_factor);
    }

    #[test]
    fn test_ef_floor() {
        let next = advance(&state_with(1.3, 1, 1), 0, start());
        assert!((next.ease_factor - MIN_EASE_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_quality_is_clamped() {
        let base = state_with(2.5, 6, 2);
        assert_eq!(advance(&base, 9, start()), advance(&base, 5, start()));
    }

    #[test]
    fn test_long_perfect_streak_stays_in_range() {
        let mut state = ReviewState::new(start());
        let mut now = start();
        for _ in 0..40 {
            state = advance(&state, 5, now);
            assert!(state.interval <= MAX_INTERVAL_DAYS);
            assert!(state.next_review_date > now);
            now = state.next_review_date;
        }
        assert_eq!(state.interval, MAX_INTERVAL_DAYS);
        assert_eq!(state.repetitions, 40);
    }

    #[test]
    fn test_capped_interval_at_end_of_time_saturates() {
        let near_end = DateTime::<Utc>::MAX_UTC - Duration::days(10);
        let next = advance(&state_with(2.5, MAX_INTERVAL_DAYS, 20), 5, near_end);
        assert_eq!(next.interval, MAX_INTERVAL_DAYS);
        assert_eq!(next.next_review_date, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_due_and_day_counts() {
        let mut state = ReviewState::new(start());
        state.next_review_date = start() + Duration::hours(36);

        assert!(!is_due(&state, start()));
        assert_eq!(days_until_review(&state, start()), 2);
        assert_eq!(days_overdue(&state, start()), 0);

        let later = start() + Duration::days(4);
        assert!(is_due(&state, later));
        assert_eq!(days_overdue(&state, later), 2);
        assert_eq!(days_until_review(&state, later), 0);
    }

    #[test]
    fn test_retention_is_one_until_due() {
        let mut state = state_with(2.5, 6, 2);
        state.next_review_date = start() + Duration::days(1);
        assert_eq!(estimate_retention(&state, start()), 1.0);

        state.next_review_date = start();
        assert_eq!(estimate_retention(&state, start()), 1.0);
    }

    #[test]
    fn test_retention_decreases_with_lateness() {
        let state = state_with(2.5, 6, 2);
        let mut previous = 1.0;
        for hours in [1, 12, 24, 72, 240] {
            let r = estimate_retention(&state, start() + Duration::hours(hours));
            assert!(r > 0.0 && r < 1.0);
            assert!(r < previous);
            previous = r;
        }
    }

    #[test]
    fn test_zero_interval_retention_is_finite() {
        let state = state_with(2.5, 0, 0);
        let r = estimate_retention(&state, start() + Duration::days(2));
        assert!(r.is_finite() && r > 0.0 && r < 1.0);
    }

    #[test]
    fn test_sort_by_review_priority() {
        let mut very_late = state_with(2.5, 6, 2);
        very_late.next_review_date = start() - Duration::days(10);
        let mut late_short = state_with(1.3, 1, 1);
        late_short.next_review_date = start() - Duration::days(2) - Duration::hours(1);
        let mut late_long = state_with(2.5, 30, 4);
        late_long.next_review_date = start() - Duration::days(2) - Duration::hours(1);
        let mut upcoming = state_with(2.5, 6, 2);
        upcoming.next_review_date = start() + Duration::days(3);

        let items = vec![upcoming.clone(), late_long.clone(), very_late.clone(), late_short.clone()];
        let sorted = sort_by_review_priority(&items, start());

        assert_eq!(sorted, vec![&very_late, &late_short, &late_long, &upcoming]);
        // input untouched
        assert_eq!(items[0], upcoming);
        assert_eq!(items[2], very_late);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut a = state_with(2.5, 6, 2);
        a.next_review_date = start() + Duration::days(1);
        let mut b = state_with(2.1, 3, 1);
        b.next_review_date = start() + Duration::days(5);
        let mut c = state_with(2.7, 1, 1);
        c.next_review_date = start() + Duration::days(2);

        let items = vec![a.clone(), b.clone(), c.clone()];
        let sorted = sort_by_review_priority(&items, start());
        assert_eq!(sorted, vec![&a, &b, &c]);
    }

    #[test]
    fn test_quality_mappers() {
        assert_eq!(quality_from_outcome(false, false), 1);
        assert_eq!(quality_from_outcome(false, true), 1);
        assert_eq!(quality_from_outcome(true, true), 3);
        assert_eq!(quality_from_outcome(true, false), 4);

        assert_eq!(ReviewRating::Again.quality(), 1);
        assert_eq!(ReviewRating::Hard.quality(), 3);
        assert_eq!(ReviewRating::Good.quality(), 4);
        assert_eq!(ReviewRating::Easy.quality(), 5);
    }

    proptest! {
        #[test]
        fn prop_ease_never_below_floor(qualities in proptest::collection::vec(0u8..=5, 1..60)) {
            let mut state = ReviewState::new(start());
            for q in qualities {
                state = advance(&state, q, start());
                prop_assert!(state.ease_factor >= MIN_EASE_FACTOR);
                prop_assert!(state.interval <= MAX_INTERVAL_DAYS);
            }
        }

        #[test]
        fn prop_failure_always_resets(
            ease in 1.3f64..4.0,
            interval in 0u32..400,
            repetitions in 0u32..30,
            quality in 0u8..3,
        ) {
            let next = advance(&state_with(ease, interval, repetitions), quality, start());
            prop_assert_eq!(next.repetitions, 0);
            prop_assert_eq!(next.interval, 1);
        }

        #[test]
        fn prop_first_two_successes_are_one_then_six(ease in 1.3f64..4.0, q1 in 3u8..=5, q2 in 3u8..=5) {
            let mut fresh = ReviewState::new(start());
            fresh.ease_factor = ease;
            let first = advance(&fresh, q1, start());
            let second = advance(&first, q2, start());
            prop_assert_eq!(first.interval, 1);
            prop_assert_eq!(second.interval, 6);
        }

        #[test]
        fn prop_next_review_is_last_review_plus_interval(qualities in proptest::collection::vec(0u8..=5, 1..20)) {
            let mut state = ReviewState::new(start());
            let mut now = start();
            for q in qualities {
                state = advance(&state, q, now);
                prop_assert_eq!(state.next_review_date, now + Duration::days(state.interval as i64));
                if state.repetitions == 0 {
                    prop_assert!(state.interval <= 1);
                }
                now += Duration::hours(30);
            }
        }
    }
}
