// ABOUTME: Streak calculation over distinct activity days
// ABOUTME: Single-pass current and longest consecutive-day streaks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Streak calculation.
//!
//! Works over the user's distinct activity days (UTC), newest first, as
//! returned by `Database::get_activity_days`. A day counts once no matter
//! how many sessions it holds. The current streak only counts if the most
//! recent activity day is today or yesterday; otherwise it is 0. Both
//! streaks come out of one linear scan.

use chrono::NaiveDate;
use serde::Serialize;

/// Current and longest consecutive-day activity streaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    /// Consecutive days ending today or yesterday
    pub current_streak_days: u32,
    /// Longest consecutive-day run on record
    pub longest_streak_days: u32,
    /// Total distinct days with at least one activity
    pub total_active_days: u32,
}

/// Compute streaks from distinct activity days sorted newest first
#[must_use]
pub fn compute_streaks(days_desc: &[NaiveDate], today: NaiveDate) -> StreakSummary {
    if days_desc.is_empty() {
        return StreakSummary {
            current_streak_days: 0,
            longest_streak_days: 0,
            total_active_days: 0,
        };
    }

    // Current streak: walk back from the newest day while days stay
    // consecutive, anchored at today or yesterday.
    let newest = days_desc[0];
    let anchor_gap = (today - newest).num_days();
    let mut current = 0u32;
    if (0..=1).contains(&anchor_gap) {
        current = 1;
        for pair in days_desc.windows(2) {
            if (pair[0] - pair[1]).num_days() == 1 {
                current += 1;
            } else {
                break;
            }
        }
    }

    // Longest streak: track run lengths across the whole scan.
    let mut longest = 1u32;
    let mut run = 1u32;
    for pair in days_desc.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    StreakSummary {
        current_streak_days: current,
        longest_streak_days: longest,
        total_active_days: u32::try_from(days_desc.len()).unwrap_or(u32::MAX),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn empty_history_yields_zero_streaks() {
        let summary = compute_streaks(&[], d("2025-06-10"));
        assert_eq!(summary.current_streak_days, 0);
        assert_eq!(summary.longest_streak_days, 0);
        assert_eq!(summary.total_active_days, 0);
    }

    #[test]
    fn streak_ending_today_counts() {
        let days = [d("2025-06-10"), d("2025-06-09"), d("2025-06-08")];
        let summary = compute_streaks(&days, d("2025-06-10"));
        assert_eq!(summary.current_streak_days, 3);
        assert_eq!(summary.longest_streak_days, 3);
        assert_eq!(summary.total_active_days, 3);
    }

    #[test]
    fn streak_ending_yesterday_still_counts() {
        let days = [d("2025-06-09"), d("2025-06-08")];
        let summary = compute_streaks(&days, d("2025-06-10"));
        assert_eq!(summary.current_streak_days, 2);
    }

    #[test]
    fn stale_history_breaks_the_current_streak() {
        let days = [d("2025-06-07"), d("2025-06-06"), d("2025-06-05")];
        let summary = compute_streaks(&days, d("2025-06-10"));
        assert_eq!(summary.current_streak_days, 0);
        assert_eq!(summary.longest_streak_days, 3);
    }

    #[test]
    fn longest_streak_can_be_in_the_past() {
        let days = [
            d("2025-06-10"),
            d("2025-06-05"),
            d("2025-06-04"),
            d("2025-06-03"),
            d("2025-06-02"),
            d("2025-05-20"),
        ];
        let summary = compute_streaks(&days, d("2025-06-10"));
        assert_eq!(summary.current_streak_days, 1);
        assert_eq!(summary.longest_streak_days, 4);
        assert_eq!(summary.total_active_days, 6);
    }

    #[test]
    fn single_stale_day_counts_only_toward_longest() {
        let days = [d("2025-01-01")];
        let summary = compute_streaks(&days, d("2025-06-10"));
        assert_eq!(summary.current_streak_days, 0);
        assert_eq!(summary.longest_streak_days, 1);
    }
}
